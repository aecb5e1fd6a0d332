//! Handler für Bestätigungsanfragen (Einfüge-Modus, Löschen einer Messung).
//!
//! Eine Anfrage ist ein Unterbrechungspunkt: bis zur Antwort kann der Nutzer
//! weiter klicken. Bei der Antwort wird daher geprüft, ob Ticket, Generation
//! und Messung noch aktuell sind.

use crate::app::events::{ConfirmAction, Notification};
use crate::app::host::EngineHost;
use crate::app::rejection::{EditRejection, EditResult};
use crate::app::state::{AddModeState, PendingConfirmation};
use crate::app::MeasureState;
use crate::core::MeasureId;

use super::editing;

/// Legt eine Bestätigungsanfrage an (ersetzt eine ältere offene Anfrage).
pub fn request(
    state: &mut MeasureState,
    host: &mut EngineHost<'_>,
    action: ConfirmAction,
    measure_id: MeasureId,
) -> EditResult {
    if state.session.is_measuring() {
        return Err(EditRejection::InputInvalid("Messung läuft noch"));
    }
    let measure = state
        .completed_measure(measure_id)
        .ok_or(EditRejection::missing("abgeschlossene Messung", measure_id))?;
    if action == ConfirmAction::EnterAddMode && measure.mode.max_points().is_some() {
        return Err(EditRejection::InputInvalid("Messung hat eine feste Punktanzahl"));
    }

    let ticket = state.allocate_ticket();
    if let Some(previous) = state.pending_confirmation.replace(PendingConfirmation {
        ticket,
        action,
        measure_id,
        generation: state.generation,
    }) {
        log::debug!("Offene Bestätigung {} durch {} ersetzt", previous.ticket, ticket);
    }
    host.notify(Notification::ConfirmationRequested {
        ticket,
        action,
        measure_id,
    });
    Ok(())
}

/// Verarbeitet die Antwort des Hosts auf eine Bestätigungsanfrage.
pub fn resolve(
    state: &mut MeasureState,
    host: &mut EngineHost<'_>,
    ticket: u64,
    accepted: bool,
) -> EditResult {
    let pending = match state.pending_confirmation.take() {
        Some(pending) if pending.ticket == ticket => pending,
        other => {
            state.pending_confirmation = other;
            return Err(EditRejection::LookupMiss {
                what: "Bestätigungs-Ticket",
                measure_id: None,
            });
        }
    };

    if !accepted {
        return Err(EditRejection::ConfirmationDeclined);
    }
    if pending.generation != state.generation
        || state.session.is_measuring()
        || state.completed_measure(pending.measure_id).is_none()
    {
        return Err(EditRejection::missing(
            "aktuelle Messung (veraltete Bestätigung)",
            pending.measure_id,
        ));
    }

    match pending.action {
        ConfirmAction::EnterAddMode => {
            state.add_mode = Some(AddModeState {
                measure_id: pending.measure_id,
            });
            host.notify(Notification::AddModeEntered {
                measure_id: pending.measure_id,
            });
            log::info!("Einfüge-Modus für Messung {} aktiv", pending.measure_id);
            Ok(())
        }
        ConfirmAction::RemoveMeasure => editing::delete_measure(state, host, pending.measure_id),
    }
}

/// Beendet den Einfüge-Modus (falls aktiv).
pub fn exit_add_mode(state: &mut MeasureState, host: &mut EngineHost<'_>) -> EditResult {
    match state.add_mode.take() {
        Some(add_mode) => {
            log::debug!("Einfüge-Modus für Messung {} beendet", add_mode.measure_id);
            host.notify(Notification::AddModeExited);
            Ok(())
        }
        None => Err(EditRejection::InputInvalid("Einfüge-Modus nicht aktiv")),
    }
}
