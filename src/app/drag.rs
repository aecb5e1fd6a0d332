//! DragController: Verschieben eines abgeschlossenen Punkts per Drag.
//!
//! Zustände: `Idle → Armed → Dragging → Idle`. Erst wenn der Pointer sich
//! weiter als `drag_threshold_px` vom Druckpunkt entfernt, beginnt der Drag;
//! ein Loslassen darunter ist ein normaler Klick ohne Mutation.
//!
//! Während des Drags werden nur die Segmente am gezogenen Punkt neu vermessen
//! (Endpunkt: eines, Innenpunkt und Schließpunkt: zwei). Die Koordinaten der
//! Messung ändern sich erst beim Loslassen.

use glam::{DVec2, DVec3};

use super::host::EngineHost;
use super::rejection::{EditRejection, EditResult};
use super::segment_sync::SegmentMeasurement;
use super::state::MeasureState;
use super::visuals::{FeatureOwner, PrimitiveStatus};
use crate::core::{Measure, MeasureId};
use crate::scene::{PointStyle, PrimitiveId};

/// Laufende Drag-Geste
#[derive(Debug, Clone, PartialEq)]
pub struct DragGesture {
    /// Betroffene Messung
    pub measure_id: MeasureId,
    /// Alle Koordinaten-Indizes des gezogenen Punkts (Schließpunkt: 0 und n-1)
    pub indices: Vec<usize>,
    /// Segmente am gezogenen Punkt
    pub segments: Vec<usize>,
    /// Punkt-Primitiv
    pub point: PrimitiveId,
    /// Position vor dem Drag
    pub original_position: DVec3,
    /// Aktuelle Position
    pub current_position: DVec3,
    /// Bildschirmposition beim Drücken
    pub press_screen: DVec2,
    live: Vec<(usize, SegmentMeasurement)>,
}

/// Phase des Drag-Controllers
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragPhase {
    /// Kein Drag
    #[default]
    Idle,
    /// Pointer auf einem Punkt gedrückt, Schwelle noch nicht überschritten
    Armed(DragGesture),
    /// Punkt wird gezogen
    Dragging(DragGesture),
}

/// Zustand der Drag-Bearbeitung
#[derive(Debug, Clone, Default)]
pub struct DragController {
    /// Aktuelle Phase
    pub phase: DragPhase,
}

impl DragController {
    /// Erstellt einen Controller im Zustand `Idle`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Kein Drag armiert oder aktiv?
    pub fn is_idle(&self) -> bool {
        matches!(self.phase, DragPhase::Idle)
    }

    /// Wird gerade gezogen?
    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, DragPhase::Dragging(_))
    }

    /// Laufende Geste (armiert oder aktiv).
    pub fn gesture(&self) -> Option<&DragGesture> {
        match &self.phase {
            DragPhase::Idle => None,
            DragPhase::Armed(gesture) | DragPhase::Dragging(gesture) => Some(gesture),
        }
    }
}

/// Vorläufige Messung mit verschobenem Punkt (ohne Bodenpunkte).
fn provisional(measure: &Measure, gesture: &DragGesture) -> Measure {
    let mut preview = Measure::new(measure.id, measure.mode, measure.label_index);
    preview.coordinates = measure.coordinates.clone();
    for &i in &gesture.indices {
        if let Some(c) = preview.coordinates.get_mut(i) {
            *c = gesture.current_position;
        }
    }
    preview.records = measure.records.clone();
    preview.status = measure.status;
    preview.closed = measure.closed;
    preview
}

/// Pointer auf einem abgeschlossenen Punkt gedrückt: Geste armieren, Kamera sperren.
pub fn begin(
    state: &mut MeasureState,
    host: &mut EngineHost<'_>,
    measure_id: MeasureId,
    position: DVec3,
    screen: DVec2,
) -> EditResult {
    if !state.drag.is_idle() {
        return Err(EditRejection::InputInvalid("Drag läuft bereits"));
    }
    if state.session.is_measuring() {
        return Err(EditRejection::InputInvalid("Drag während laufender Messung"));
    }
    let measure = state
        .completed_measure(measure_id)
        .ok_or(EditRejection::missing("abgeschlossene Messung", measure_id))?;
    let index = measure
        .find_coordinate(position, state.options.pick_tolerance)
        .ok_or(EditRejection::missing("Punkt", measure_id))?;
    let indices = measure.indices_for(index);
    let segments = measure.segments_touching(&indices);
    let original_position = measure.coordinates[index];
    let point = state
        .visuals
        .get(measure_id)
        .and_then(|v| v.points.get(index).copied())
        .ok_or(EditRejection::missing("Punkt-Primitiv", measure_id))?;

    host.surface.set_camera_input_enabled(false);
    log::debug!(
        "Drag armiert: Messung {}, Indizes {:?}, Segmente {:?}",
        measure_id,
        indices,
        segments
    );
    state.drag.phase = DragPhase::Armed(DragGesture {
        measure_id,
        indices,
        segments,
        point,
        original_position,
        current_position: original_position,
        press_screen: screen,
        live: Vec::new(),
    });
    Ok(())
}

/// Zeigt die Geste an der aktuellen Position: betroffene Segmente als `Moving`
/// neu aufbauen, Labels, Summen-Label und Polygon in place aktualisieren.
fn apply_position(
    state: &mut MeasureState,
    host: &mut EngineHost<'_>,
    position: DVec3,
) -> EditResult {
    let MeasureState {
        measures,
        visuals: index,
        primitives,
        options,
        drag,
        ..
    } = state;
    let DragPhase::Dragging(gesture) = &mut drag.phase else {
        return Ok(());
    };
    let measure = measures
        .get(&gesture.measure_id)
        .ok_or(EditRejection::missing("Messung", gesture.measure_id))?;
    let visuals = index.entry(gesture.measure_id);

    gesture.current_position = position;
    let mut preview = provisional(measure, gesture);
    let owner = FeatureOwner::of(measure);
    let metric = measure.mode.metric();

    let mut sync = host.synchronizer(primitives, options);
    sync.move_point(gesture.point, position, PointStyle::Highlighted);

    gesture.live.clear();
    for &segment in &gesture.segments {
        let Some((start, end)) = preview.segment_endpoints(segment) else {
            continue;
        };
        let measurement = sync.measure(start, end, metric);
        if let Some(handles) = visuals.segments.get_mut(segment) {
            sync.refresh_segment(
                owner,
                handles,
                start,
                end,
                PrimitiveStatus::Moving,
                &measurement,
            );
        }
        if let Some(distance) = preview.records.distances.get_mut(segment) {
            *distance = measurement.distance;
        }
        gesture.live.push((segment, measurement));
    }

    preview.recompute_total();
    sync.sync_total_label(&preview, visuals, PrimitiveStatus::Moving);
    sync.sync_polygon(&preview, visuals, PrimitiveStatus::Moving);
    Ok(())
}

/// Pointer bewegt: Schwelle prüfen, danach Geste an der neuen Position zeigen.
pub fn drag_move(
    state: &mut MeasureState,
    host: &mut EngineHost<'_>,
    position: Option<DVec3>,
    screen: DVec2,
) -> EditResult {
    match std::mem::take(&mut state.drag.phase) {
        DragPhase::Idle => return Err(EditRejection::InputInvalid("kein Drag aktiv")),
        DragPhase::Armed(gesture) => {
            if gesture.press_screen.distance(screen) <= state.options.drag_threshold_px {
                state.drag.phase = DragPhase::Armed(gesture);
                return Ok(());
            }
            host.surface
                .update_point(gesture.point, gesture.original_position, PointStyle::Highlighted);
            log::debug!("Drag gestartet: Messung {}", gesture.measure_id);
            state.drag.phase = DragPhase::Dragging(gesture);
        }
        dragging @ DragPhase::Dragging(_) => state.drag.phase = dragging,
    }

    match position {
        Some(position) => apply_position(state, host, position),
        None => Err(EditRejection::InputInvalid("Drag ohne Weltposition")),
    }
}

/// Pointer losgelassen: unter der Schwelle nur zurücksetzen, sonst übernehmen.
///
/// Die neue Position wird an allen Indizes des Punkts eingetragen
/// (Schließpunkt: 0 und n-1 gemeinsam), die betroffenen Segmente werden als
/// `Completed` neu aufgebaut und die Messung in die Registry geschrieben.
pub fn end(
    state: &mut MeasureState,
    host: &mut EngineHost<'_>,
    position: Option<DVec3>,
) -> EditResult {
    match &state.drag.phase {
        DragPhase::Idle => return Err(EditRejection::InputInvalid("kein Drag aktiv")),
        DragPhase::Armed(_) => {
            state.drag.phase = DragPhase::Idle;
            host.surface.set_camera_input_enabled(true);
            log::debug!("Loslassen unter der Drag-Schwelle, als Klick behandelt");
            return Ok(());
        }
        DragPhase::Dragging(_) => {}
    }

    if let Some(position) = position {
        apply_position(state, host, position)?;
    }
    commit(state, host)
}

fn commit(state: &mut MeasureState, host: &mut EngineHost<'_>) -> EditResult {
    let DragPhase::Dragging(gesture) = std::mem::take(&mut state.drag.phase) else {
        return Ok(());
    };
    host.surface.set_camera_input_enabled(true);

    let MeasureState {
        measures,
        visuals: index,
        primitives,
        options,
        ..
    } = state;
    let measure = measures
        .get_mut(&gesture.measure_id)
        .ok_or(EditRejection::missing("Messung", gesture.measure_id))?;
    let visuals = index.entry(gesture.measure_id);
    let position = gesture.current_position;

    for &i in &gesture.indices {
        if let Some(c) = measure.coordinates.get_mut(i) {
            *c = position;
        }
    }

    let owner = FeatureOwner::of(measure);
    let metric = measure.mode.metric();
    {
        let mut sync = host.synchronizer(primitives, options);
        for &segment in &gesture.segments {
            let Some((start, end)) = measure.segment_endpoints(segment) else {
                continue;
            };
            let measurement = gesture
                .live
                .iter()
                .find(|(s, _)| *s == segment)
                .map(|(_, m)| m.clone())
                .unwrap_or_else(|| sync.measure(start, end, metric));
            if let Some(handles) = visuals.segments.get_mut(segment) {
                sync.refresh_segment(
                    owner,
                    handles,
                    start,
                    end,
                    PrimitiveStatus::Completed,
                    &measurement,
                );
            }
            if let Some(distance) = measure.records.distances.get_mut(segment) {
                *distance = measurement.distance;
            }
            if let Some(samples) = measure.interpolated_points.get_mut(segment) {
                *samples = measurement.samples;
            }
        }

        measure.recompute_total();
        sync.move_point(gesture.point, position, PointStyle::Default);
        sync.sync_total_label(measure, visuals, PrimitiveStatus::Completed);
        sync.sync_polygon(measure, visuals, PrimitiveStatus::Completed);
    }

    log::info!(
        "Punkt von Messung {} verschoben: {:?} → {:?}",
        gesture.measure_id,
        gesture.original_position,
        position
    );
    host.publish(measure);
    state.touch();
    Ok(())
}

/// Bricht einen Drag ab und stellt den Zustand vor dem Drag wieder her.
pub fn cancel(state: &mut MeasureState, host: &mut EngineHost<'_>) {
    let gesture = match std::mem::take(&mut state.drag.phase) {
        DragPhase::Idle => return,
        DragPhase::Armed(_) => {
            host.surface.set_camera_input_enabled(true);
            return;
        }
        DragPhase::Dragging(gesture) => gesture,
    };
    host.surface.set_camera_input_enabled(true);

    let MeasureState {
        measures,
        visuals: index,
        primitives,
        options,
        ..
    } = state;
    let Some(measure) = measures.get(&gesture.measure_id) else {
        return;
    };
    let visuals = index.entry(gesture.measure_id);
    let owner = FeatureOwner::of(measure);

    let mut sync = host.synchronizer(primitives, options);
    for &segment in &gesture.segments {
        let (Some((start, end)), Some(distance), Some(samples)) = (
            measure.segment_endpoints(segment),
            measure.records.distances.get(segment),
            measure.interpolated_points.get(segment),
        ) else {
            continue;
        };
        let measurement = SegmentMeasurement {
            distance: *distance,
            samples: samples.clone(),
        };
        if let Some(handles) = visuals.segments.get_mut(segment) {
            sync.refresh_segment(
                owner,
                handles,
                start,
                end,
                PrimitiveStatus::Completed,
                &measurement,
            );
        }
    }
    sync.move_point(gesture.point, gesture.original_position, PointStyle::Default);
    sync.sync_total_label(measure, visuals, PrimitiveStatus::Completed);
    sync.sync_polygon(measure, visuals, PrimitiveStatus::Completed);
    log::debug!("Drag von Messung {} abgebrochen", gesture.measure_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::events::Notification;
    use crate::app::session;
    use crate::core::{FlatTerrain, InMemoryRegistry, MeasureMode};
    use crate::scene::RecordingSurface;
    use crate::shared::MeasureOptions;
    use approx::assert_relative_eq;

    struct Fixture {
        state: MeasureState,
        surface: RecordingSurface,
        terrain: FlatTerrain,
        registry: InMemoryRegistry,
    }

    impl Fixture {
        /// Abgeschlossene Distanz (0,0) → (10,0) → (10,10) mit ID 1.
        fn with_measure() -> Self {
            let mut state = MeasureState::with_id_seed(MeasureOptions::default(), 1);
            state.active_mode = MeasureMode::Distance;
            let mut fx = Self {
                state,
                surface: RecordingSurface::new(),
                terrain: FlatTerrain::new(0.0),
                registry: InMemoryRegistry::new(),
            };
            for (x, y) in [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)] {
                fx.run(|s, h| session::place_point(s, h, DVec3::new(x, y, 0.0)))
                    .0
                    .expect("Punkt");
            }
            fx.run(|s, h| session::finalize(s, h, None)).0.expect("Abschluss");
            fx
        }

        fn run(
            &mut self,
            f: impl FnOnce(&mut MeasureState, &mut EngineHost<'_>) -> EditResult,
        ) -> (EditResult, Vec<Notification>) {
            let mut host = EngineHost::new(&mut self.surface, &self.terrain, &mut self.registry);
            let result = f(&mut self.state, &mut host);
            (result, host.into_notifications())
        }

        fn cancel(&mut self) {
            self.run(|s, h| {
                cancel(s, h);
                Ok(())
            });
        }
    }

    #[test]
    fn test_schwelle_trennt_klick_und_drag() {
        let mut fx = Fixture::with_measure();
        fx.run(|s, h| begin(s, h, 1, DVec3::new(10.0, 0.0, 0.0), DVec2::new(100.0, 100.0)))
            .0
            .expect("Armieren");
        assert!(matches!(fx.state.drag.phase, DragPhase::Armed(_)));

        fx.run(|s, h| drag_move(s, h, Some(DVec3::new(10.1, 0.0, 0.0)), DVec2::new(102.0, 101.0)))
            .0
            .expect("Bewegung");
        assert!(matches!(fx.state.drag.phase, DragPhase::Armed(_)));

        fx.run(|s, h| drag_move(s, h, Some(DVec3::new(10.0, 5.0, 0.0)), DVec2::new(100.0, 150.0)))
            .0
            .expect("Bewegung");
        assert!(fx.state.drag.is_dragging());
    }

    #[test]
    fn test_abbruch_waehrend_drag_stellt_geometrie_her() {
        let mut fx = Fixture::with_measure();
        let visuals = fx.state.visuals.get(1).cloned().expect("Visuals");
        let point = visuals.points[1];
        let label = visuals.segments[0].label;
        let label_before = fx.surface.get(label).cloned();

        fx.run(|s, h| begin(s, h, 1, DVec3::new(10.0, 0.0, 0.0), DVec2::new(100.0, 100.0)))
            .0
            .expect("Armieren");
        fx.run(|s, h| drag_move(s, h, Some(DVec3::new(10.0, 5.0, 0.0)), DVec2::new(100.0, 150.0)))
            .0
            .expect("Bewegung");
        assert!(!fx.state.primitives.ids_with_status(PrimitiveStatus::Moving).is_empty());
        assert_ne!(fx.surface.get(label).cloned(), label_before);

        fx.cancel();

        assert!(fx.state.drag.is_idle());
        assert!(fx.surface.camera_input_enabled());
        assert!(fx.state.primitives.ids_with_status(PrimitiveStatus::Moving).is_empty());
        let measure = &fx.state.measures[&1];
        assert_eq!(measure.coordinates[1], DVec3::new(10.0, 0.0, 0.0));
        assert_relative_eq!(measure.records.total_distance, 20.0, epsilon = 1e-9);
        assert_eq!(
            fx.surface.get(point).map(|p| p.positions.clone()),
            Some(vec![DVec3::new(10.0, 0.0, 0.0)])
        );
        assert_eq!(fx.surface.get(label).cloned(), label_before);
    }

    #[test]
    fn test_abbruch_im_armierten_zustand_gibt_kamera_frei() {
        let mut fx = Fixture::with_measure();
        let created = fx.surface.stats().created;

        fx.run(|s, h| begin(s, h, 1, DVec3::new(0.0, 0.0, 0.0), DVec2::new(10.0, 10.0)))
            .0
            .expect("Armieren");
        assert!(!fx.surface.camera_input_enabled());

        fx.cancel();

        assert!(fx.state.drag.is_idle());
        assert!(fx.surface.camera_input_enabled());
        assert_eq!(fx.surface.stats().created, created);
        assert_eq!(fx.state.measures[&1].coordinates[0], DVec3::ZERO);
    }
}
