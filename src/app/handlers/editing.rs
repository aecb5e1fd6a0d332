//! Handler für Einfügen, Entfernen und Löschen von Punkten/Messungen
//! sowie den Neuaufbau aus der Registry.

use glam::DVec3;

use crate::app::events::Notification;
use crate::app::host::EngineHost;
use crate::app::reconnect::{self, RemovalOutcome};
use crate::app::rejection::{EditRejection, EditResult};
use crate::app::MeasureState;
use crate::core::{Measure, MeasureFilter, MeasureId};
use crate::scene::PrimitiveId;

/// Fügt einen Punkt in ein Segment der Messung im Einfüge-Modus ein.
///
/// Der Einfüge-Modus endet nach einer erfolgreichen Einfügung.
pub fn insert_point(
    state: &mut MeasureState,
    host: &mut EngineHost<'_>,
    measure_id: MeasureId,
    line: Option<PrimitiveId>,
    position: DVec3,
) -> EditResult {
    if state.add_mode.map(|a| a.measure_id) != Some(measure_id) {
        return Err(EditRejection::InputInvalid("Einfüge-Modus nicht aktiv"));
    }
    if state.completed_measure(measure_id).is_none() {
        return Err(EditRejection::missing("abgeschlossene Messung", measure_id));
    }

    let MeasureState {
        measures,
        visuals: index,
        primitives,
        options,
        ..
    } = state;
    let measure = measures
        .get_mut(&measure_id)
        .ok_or(EditRejection::missing("Messung", measure_id))?;
    let segment = reconnect::locate_segment(measure, index.get(measure_id), line, position)
        .ok_or(EditRejection::missing("Segment", measure_id))?;
    let visuals = index.entry(measure_id);

    let min_spacing = options.duplicate_epsilon;
    let inserted = {
        let mut sync = host.synchronizer(primitives, options);
        reconnect::insert_point(&mut sync, measure, visuals, segment, position, min_spacing)?
    };

    log::info!(
        "Punkt in Messung {} an Index {} eingefügt (Segment {})",
        measure_id,
        inserted,
        segment
    );
    host.publish(measure);
    state.touch();

    state.add_mode = None;
    host.notify(Notification::AddModeExited);
    Ok(())
}

/// Entfernt einen Punkt einer abgeschlossenen Messung und verbindet die Nachbarn.
///
/// Bliebe nur ein Punkt übrig, wird die ganze Messung gelöscht.
pub fn remove_point(
    state: &mut MeasureState,
    host: &mut EngineHost<'_>,
    measure_id: MeasureId,
    position: DVec3,
) -> EditResult {
    if state.session.is_measuring() {
        return Err(EditRejection::InputInvalid("Messung läuft noch"));
    }
    let coordinate = state
        .completed_measure(measure_id)
        .ok_or(EditRejection::missing("abgeschlossene Messung", measure_id))?
        .find_coordinate(position, state.options.pick_tolerance)
        .ok_or(EditRejection::missing("Punkt", measure_id))?;

    let MeasureState {
        measures,
        visuals: index,
        primitives,
        options,
        ..
    } = state;
    let measure = measures
        .get_mut(&measure_id)
        .ok_or(EditRejection::missing("Messung", measure_id))?;
    let visuals = index.entry(measure_id);

    let outcome = {
        let mut sync = host.synchronizer(primitives, options);
        reconnect::remove_point(&mut sync, measure, visuals, coordinate)?
    };

    match outcome {
        RemovalOutcome::MeasureEmptied => {
            log::info!("Letzter Punkt entfernt, lösche Messung {}", measure_id);
            delete_measure(state, host, measure_id)
        }
        RemovalOutcome::Reconnected | RemovalOutcome::ClosureDropped => {
            log::info!(
                "Punkt {} aus Messung {} entfernt{}",
                coordinate,
                measure_id,
                if outcome == RemovalOutcome::ClosureDropped {
                    ", Umfang geöffnet"
                } else {
                    ""
                }
            );
            host.publish(measure);
            state.touch();
            Ok(())
        }
    }
}

/// Löscht eine Messung samt aller Primitive aus Engine und Registry.
pub fn delete_measure(
    state: &mut MeasureState,
    host: &mut EngineHost<'_>,
    measure_id: MeasureId,
) -> EditResult {
    if state.measures.shift_remove(&measure_id).is_none() {
        return Err(EditRejection::missing("Messung", measure_id));
    }
    if let Some(visuals) = state.visuals.remove(measure_id) {
        let mut sync = host.synchronizer(&mut state.primitives, &state.options);
        sync.remove_all(visuals);
    }
    if state.add_mode.is_some_and(|a| a.measure_id == measure_id) {
        state.add_mode = None;
        host.notify(Notification::AddModeExited);
    }
    host.unpublish(measure_id);
    state.touch();
    log::info!("Messung {} gelöscht", measure_id);
    Ok(())
}

/// Übernimmt abgeschlossene Messungen aus der Registry und baut ihre Primitive auf.
///
/// Bereits bekannte Messungen bleiben unverändert. Messungen, deren
/// Parallel-Listen neu vermessen werden mussten, werden zurückgeschrieben.
pub fn restore_from_registry(
    state: &mut MeasureState,
    host: &mut EngineHost<'_>,
    filter: MeasureFilter,
) -> EditResult {
    let imported: Vec<Measure> = host
        .registry
        .get_all(filter)
        .into_iter()
        .filter(|m| m.is_completed() && !state.measures.contains_key(&m.id))
        .cloned()
        .collect();

    let count = imported.len();
    for original in imported {
        let mut measure = original.clone();
        let visuals = {
            let mut sync = host.synchronizer(&mut state.primitives, &state.options);
            sync.build_measure(&mut measure)
        };
        if measure != original {
            host.publish(&measure);
        }
        state.reserve_label_index(measure.mode, measure.label_index);
        *state.visuals.entry(measure.id) = visuals;
        state.measures.insert(measure.id, measure);
    }

    if count > 0 {
        state.touch();
    }
    log::info!("{} Messungen aus der Registry übernommen", count);
    Ok(())
}
