//! Handler für Moduswechsel, Deaktivierung und Abbruch laufender Eingaben.

use crate::app::events::Notification;
use crate::app::host::EngineHost;
use crate::app::rejection::EditResult;
use crate::app::visuals::PrimitiveStatus;
use crate::app::{drag, session, MeasureState};
use crate::core::MeasureMode;

/// Bricht alle laufenden Eingaben ab.
///
/// Drag zurücksetzen (Kamera wieder frei), alle `Moving`-Primitive entfernen,
/// die aktive Messung abschließen bzw. verwerfen, Einfüge-Modus und offene
/// Bestätigungen aufheben.
pub fn cancel_interaction(state: &mut MeasureState, host: &mut EngineHost<'_>) -> EditResult {
    drag::cancel(state, host);

    {
        let MeasureState {
            primitives,
            options,
            session,
            ..
        } = state;
        let mut sync = host.synchronizer(primitives, options);
        sync.clear_preview(&mut session.preview);
    }

    let stray = state.primitives.ids_with_status(PrimitiveStatus::Moving);
    if !stray.is_empty() {
        log::warn!("{} verwaiste Vorschau-Primitive entfernt", stray.len());
        let mut sync = host.synchronizer(&mut state.primitives, &state.options);
        for id in stray {
            sync.remove_primitive(id);
        }
    }

    session::finalize(state, host, None)?;

    if state.add_mode.take().is_some() {
        host.notify(Notification::AddModeExited);
    }
    state.pending_confirmation = None;
    Ok(())
}

/// Wechselt den Messmodus und aktiviert die Engine.
pub fn set_mode(
    state: &mut MeasureState,
    host: &mut EngineHost<'_>,
    mode: MeasureMode,
) -> EditResult {
    cancel_interaction(state, host)?;
    state.active_mode = mode;
    state.enabled = true;
    log::info!("Messmodus: {}", mode);
    Ok(())
}

/// Deaktiviert die Engine; weitere Eingaben werden bis zum nächsten Moduswechsel verworfen.
pub fn deactivate(state: &mut MeasureState, host: &mut EngineHost<'_>) -> EditResult {
    cancel_interaction(state, host)?;
    state.enabled = false;
    host.surface.set_camera_input_enabled(true);
    log::info!("Mess-Engine deaktiviert");
    Ok(())
}
