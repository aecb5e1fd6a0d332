//! CoordinateSession: Zustandsmaschine für Platzieren, Fortsetzen und
//! Abschließen einer Messung.
//!
//! Zustände: `Idle → Measuring → Completed`, `Completed → Measuring` per Resume.
//! Die Session hält keine eigene Koordinatenliste, sondern nur die ID der
//! aktiven Messung in `MeasureState::measures`.

use glam::DVec3;

use super::events::Notification;
use super::host::EngineHost;
use super::rejection::{EditRejection, EditResult};
use super::state::MeasureState;
use super::visuals::{FeatureOwner, PrimitiveStatus, SegmentHandles};
use crate::core::{Measure, MeasureId, MeasureMode, MeasureStatus};

/// Phase der Session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// Noch keine Messung begonnen
    #[default]
    Idle,
    /// Eine Messung nimmt Punkte auf
    Measuring,
    /// Letzte Messung abgeschlossen
    Completed,
}

/// Zustand der Punkt-Platzierung
#[derive(Debug, Clone, Default)]
pub struct CoordinateSession {
    /// Aktuelle Phase
    pub phase: SessionPhase,
    /// Messung, die gerade Punkte aufnimmt
    pub active: Option<MeasureId>,
    /// Neue Punkte werden vorne eingefügt (Fortsetzen am ersten Punkt)
    pub reverse: bool,
    /// Vorschau-Segment vom Endpunkt zur Pointer-Position
    pub preview: Option<SegmentHandles>,
}

impl CoordinateSession {
    /// Erstellt eine Session im Zustand `Idle`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Nimmt gerade eine Messung Punkte auf?
    pub fn is_measuring(&self) -> bool {
        self.phase == SessionPhase::Measuring && self.active.is_some()
    }

    /// ID der Messung, die gerade Punkte aufnimmt.
    pub fn measuring_id(&self) -> Option<MeasureId> {
        self.active.filter(|_| self.phase == SessionPhase::Measuring)
    }

    fn begin(&mut self, measure_id: MeasureId, reverse: bool) {
        self.phase = SessionPhase::Measuring;
        self.active = Some(measure_id);
        self.reverse = reverse;
    }

    fn finish(&mut self, phase: SessionPhase) {
        self.phase = phase;
        self.active = None;
        self.reverse = false;
    }

    /// Wachsender Endpunkt der Messung (bei `reverse` der erste Punkt).
    pub fn growing_end(&self, measure: &Measure) -> Option<DVec3> {
        if self.reverse {
            measure.first()
        } else {
            measure.last()
        }
    }

    /// Gegenüberliegender Endpunkt der Messung.
    pub fn fixed_end(&self, measure: &Measure) -> Option<DVec3> {
        if self.reverse {
            measure.last()
        } else {
            measure.first()
        }
    }
}

fn start_measure(state: &mut MeasureState, mode: MeasureMode) -> MeasureId {
    let id = state.allocate_measure_id();
    let label_index = state.next_label_index(mode);
    state.measures.insert(id, Measure::new(id, mode, label_index));
    state.visuals.entry(id);
    state.session.begin(id, false);
    log::info!("Neue Messung {} ({}, Nr. {}) begonnen", id, mode, label_index);
    id
}

/// Hängt einen Punkt an die aktive Messung an (bzw. stellt ihn voran) und
/// erstellt nur das neueste Segment.
fn append_coordinate(
    state: &mut MeasureState,
    host: &mut EngineHost<'_>,
    measure_id: MeasureId,
    position: DVec3,
) -> EditResult {
    let MeasureState {
        measures,
        visuals: index,
        primitives,
        options,
        session,
        ..
    } = state;
    let measure = measures
        .get_mut(&measure_id)
        .ok_or(EditRejection::missing("aktive Messung", measure_id))?;
    let visuals = index.entry(measure_id);

    let mut sync = host.synchronizer(primitives, options);
    sync.clear_preview(&mut session.preview);

    let point = sync.create_point(FeatureOwner::of(measure), position, PrimitiveStatus::Pending);
    if session.reverse {
        measure.coordinates.insert(0, position);
        visuals.points.insert(0, point);
        sync.prepend_segment(measure, visuals, PrimitiveStatus::Pending);
    } else {
        measure.coordinates.push(position);
        visuals.points.push(point);
        sync.append_segment(measure, visuals, PrimitiveStatus::Pending);
    }
    measure.recompute_total();
    Ok(())
}

/// Platziert einen Punkt: neue Messung im Zustand `Idle`, sonst Fortsetzung.
///
/// Punkte näher als `duplicate_epsilon` an einem bestehenden Punkt des Modus
/// werden verworfen. Der Höhen-Modus schließt nach dem zweiten Punkt automatisch ab.
pub fn place_point(
    state: &mut MeasureState,
    host: &mut EngineHost<'_>,
    position: DVec3,
) -> EditResult {
    if !state.enabled {
        return Err(EditRejection::InputInvalid("Engine deaktiviert"));
    }
    let mode = state.active_mode;
    let epsilon = state.options.duplicate_epsilon;
    if state.point_index(mode).has_point_within(position, epsilon) {
        host.notify(Notification::NearExistingPoint { position });
        return Err(EditRejection::GeometryDegenerate(
            "Punkt zu nah an bestehendem Punkt",
        ));
    }

    let measure_id = match state.session.measuring_id() {
        Some(id) => id,
        None => start_measure(state, mode),
    };
    append_coordinate(state, host, measure_id, position)?;
    state.record_placement(mode, measure_id, position);

    let Some(measure) = state.measures.get(&measure_id) else {
        return Err(EditRejection::missing("aktive Messung", measure_id));
    };
    log::debug!(
        "Punkt {:?} zu Messung {} hinzugefügt ({} Punkte)",
        position,
        measure_id,
        measure.coordinates.len()
    );
    host.publish(measure);

    let reached_max = mode
        .max_points()
        .is_some_and(|max| measure.coordinates.len() >= max);
    if reached_max {
        finalize(state, host, None)?;
    }
    Ok(())
}

/// Schließt die aktive Messung ab.
///
/// Optional wird vorher ein letzter Punkt an der Pointer-Position angehängt.
/// Umfangs- und Flächen-Messungen mit mindestens drei Punkten werden
/// geschlossen. Eine Messung mit weniger als zwei Punkten wird verworfen.
/// Ohne aktive Messung ist der Aufruf ein No-op.
pub fn finalize(
    state: &mut MeasureState,
    host: &mut EngineHost<'_>,
    position: Option<DVec3>,
) -> EditResult {
    let Some(measure_id) = state.session.measuring_id() else {
        log::debug!("Abschluss ohne aktive Messung ignoriert");
        return Ok(());
    };
    let mode = state.active_mode;

    if let Some(position) = position {
        let has_room = state
            .measures
            .get(&measure_id)
            .is_some_and(|m| mode.max_points().map_or(true, |max| m.coordinates.len() < max));
        let epsilon = state.options.duplicate_epsilon;
        if has_room && !state.point_index(mode).has_point_within(position, epsilon) {
            append_coordinate(state, host, measure_id, position)?;
        }
    }

    let MeasureState {
        measures,
        visuals: index,
        primitives,
        options,
        session,
        ..
    } = state;

    let Some(measure) = measures.get_mut(&measure_id) else {
        session.finish(SessionPhase::Idle);
        return Err(EditRejection::missing("aktive Messung", measure_id));
    };

    if measure.coordinates.len() < 2 {
        let mut sync = host.synchronizer(primitives, options);
        sync.clear_preview(&mut session.preview);
        if let Some(visuals) = index.remove(measure_id) {
            sync.remove_all(visuals);
        }
        measures.shift_remove(&measure_id);
        session.finish(SessionPhase::Idle);
        host.unpublish(measure_id);
        state.touch();
        log::info!("Messung {} mit weniger als zwei Punkten verworfen", measure_id);
        return Ok(());
    }

    let visuals = index.entry(measure_id);
    {
        let mut sync = host.synchronizer(primitives, options);
        sync.clear_preview(&mut session.preview);

        if measure.mode.closes_loop() && !measure.closed && measure.coordinates.len() >= 3 {
            if let Some(first) = measure.first() {
                measure.coordinates.push(first);
                sync.append_segment(measure, visuals, PrimitiveStatus::Completed);
                measure.closed = true;
            }
        }

        measure.status = MeasureStatus::Completed;
        measure.recompute_total();
        sync.set_status_all(visuals, PrimitiveStatus::Completed);
        sync.sync_total_label(measure, visuals, PrimitiveStatus::Completed);
        sync.sync_polygon(measure, visuals, PrimitiveStatus::Completed);
    }
    session.finish(SessionPhase::Completed);

    log::info!(
        "Messung {} abgeschlossen: {} Punkte, Summe {:.3}{}",
        measure_id,
        measure.coordinates.len(),
        measure.records.total_distance,
        if measure.closed { " (geschlossen)" } else { "" }
    );
    host.publish(measure);
    state.touch();
    Ok(())
}

/// Setzt eine abgeschlossene Messung an einem ihrer Endpunkte fort.
///
/// Beim ersten Punkt werden weitere Punkte vorne eingefügt.
pub fn resume(
    state: &mut MeasureState,
    host: &mut EngineHost<'_>,
    measure_id: MeasureId,
    position: DVec3,
) -> EditResult {
    if state.session.is_measuring() {
        return Err(EditRejection::InputInvalid("Messung läuft bereits"));
    }
    let active_mode = state.active_mode;
    let tolerance = state.options.pick_tolerance;

    let MeasureState {
        measures,
        visuals: index,
        primitives,
        options,
        session,
        ..
    } = state;
    let measure = measures
        .get_mut(&measure_id)
        .ok_or(EditRejection::missing("Messung", measure_id))?;
    if measure.mode != active_mode || !measure.is_completed() {
        return Err(EditRejection::InputInvalid(
            "keine abgeschlossene Messung des aktiven Modus",
        ));
    }
    if measure.mode.max_points().is_some() {
        return Err(EditRejection::InputInvalid("Messung hat eine feste Punktanzahl"));
    }
    let coordinate = measure
        .find_coordinate(position, tolerance)
        .ok_or(EditRejection::missing("Endpunkt", measure_id))?;
    if !measure.is_terminal(coordinate) {
        return Err(EditRejection::InputInvalid("Punkt ist kein Endpunkt"));
    }

    let visuals = index.entry(measure_id);
    {
        let mut sync = host.synchronizer(primitives, options);
        sync.remove_total_label(visuals);
        sync.set_status_all(visuals, PrimitiveStatus::Pending);
    }
    measure.status = MeasureStatus::Pending;
    session.begin(measure_id, coordinate == 0);

    log::info!(
        "Messung {} wird am {} Punkt fortgesetzt",
        measure_id,
        if coordinate == 0 { "ersten" } else { "letzten" }
    );
    host.publish(measure);
    state.touch();
    Ok(())
}

/// Aktualisiert das Vorschau-Segment vom wachsenden Endpunkt zur Pointer-Position.
pub fn update_preview(
    state: &mut MeasureState,
    host: &mut EngineHost<'_>,
    position: DVec3,
) -> EditResult {
    let Some(measure_id) = state.session.measuring_id() else {
        return Err(EditRejection::InputInvalid("keine aktive Messung"));
    };
    let MeasureState {
        measures,
        primitives,
        options,
        session,
        ..
    } = state;
    let measure = measures
        .get(&measure_id)
        .ok_or(EditRejection::missing("aktive Messung", measure_id))?;
    let Some(anchor) = session.growing_end(measure) else {
        return Ok(());
    };

    let mut sync = host.synchronizer(primitives, options);
    sync.sync_preview(FeatureOwner::of(measure), &mut session.preview, anchor, position);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FlatTerrain, InMemoryRegistry, MeasurementRegistry};
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
        fn new(mode: MeasureMode) -> Self {
            let mut state = MeasureState::with_id_seed(MeasureOptions::default(), 1);
            state.active_mode = mode;
            Self {
                state,
                surface: RecordingSurface::new(),
                terrain: FlatTerrain::new(0.0),
                registry: InMemoryRegistry::new(),
            }
        }

        fn run(
            &mut self,
            f: impl FnOnce(&mut MeasureState, &mut EngineHost<'_>) -> EditResult,
        ) -> (EditResult, Vec<Notification>) {
            let mut host = EngineHost::new(&mut self.surface, &self.terrain, &mut self.registry);
            let result = f(&mut self.state, &mut host);
            (result, host.into_notifications())
        }

        fn place(&mut self, x: f64, y: f64) -> EditResult {
            self.run(|s, h| place_point(s, h, DVec3::new(x, y, 0.0))).0
        }
    }

    #[test]
    fn test_punkte_und_abschluss() {
        let mut fx = Fixture::new(MeasureMode::Distance);
        fx.place(0.0, 0.0).expect("erster Punkt");
        fx.place(10.0, 0.0).expect("zweiter Punkt");
        let (result, notes) = fx.run(|s, h| finalize(s, h, None));
        result.expect("Abschluss");

        let measure = fx.registry.get(1).expect("Messung in Registry");
        assert!(measure.is_completed());
        assert_eq!(measure.records.distances.len(), 1);
        assert_relative_eq!(measure.records.total_distance, 10.0, epsilon = 1e-9);
        assert_eq!(notes, vec![Notification::MeasureUpdated { id: 1 }]);
        assert!(!fx.state.session.is_measuring());
    }

    #[test]
    fn test_doppelter_punkt_wird_verworfen() {
        let mut fx = Fixture::new(MeasureMode::Distance);
        fx.place(0.0, 0.0).expect("erster Punkt");
        let (result, notes) = fx.run(|s, h| place_point(s, h, DVec3::new(0.2, 0.0, 0.0)));
        assert!(matches!(result, Err(EditRejection::GeometryDegenerate(_))));
        assert!(matches!(notes[0], Notification::NearExistingPoint { .. }));
        assert_eq!(fx.state.measures[&1].coordinates.len(), 1);
    }

    #[test]
    fn test_abschluss_mit_einem_punkt_verwirft_messung() {
        let mut fx = Fixture::new(MeasureMode::Distance);
        fx.place(0.0, 0.0).expect("erster Punkt");
        let (result, notes) = fx.run(|s, h| finalize(s, h, None));
        result.expect("Abschluss");
        assert!(fx.state.measures.is_empty());
        assert!(fx.registry.is_empty());
        assert!(fx.surface.is_empty());
        assert_eq!(notes, vec![Notification::MeasureRemoved { id: 1 }]);
    }

    #[test]
    fn test_hoehe_schliesst_nach_zwei_punkten_ab() {
        let mut fx = Fixture::new(MeasureMode::Height);
        fx.run(|s, h| place_point(s, h, DVec3::new(0.0, 0.0, 3.0)))
            .0
            .expect("erster Punkt");
        fx.run(|s, h| place_point(s, h, DVec3::new(20.0, 0.0, 10.5)))
            .0
            .expect("zweiter Punkt");

        let measure = &fx.state.measures[&1];
        assert!(measure.is_completed());
        assert_relative_eq!(measure.records.total_distance, 7.5, epsilon = 1e-9);
        assert!(!fx.state.session.is_measuring());
    }

    #[test]
    fn test_fortsetzen_am_ersten_punkt_stellt_voran() {
        let mut fx = Fixture::new(MeasureMode::Distance);
        fx.place(0.0, 0.0).expect("erster Punkt");
        fx.place(10.0, 0.0).expect("zweiter Punkt");
        fx.run(|s, h| finalize(s, h, None)).0.expect("Abschluss");

        fx.run(|s, h| resume(s, h, 1, DVec3::ZERO))
            .0
            .expect("Fortsetzen");
        assert!(fx.state.session.reverse);
        assert_eq!(fx.state.measures[&1].status, MeasureStatus::Pending);

        fx.place(-5.0, 0.0).expect("vorne anfügen");
        let measure = &fx.state.measures[&1];
        assert_eq!(measure.coordinates[0], DVec3::new(-5.0, 0.0, 0.0));
        assert_eq!(measure.records.distances.len(), 2);
        assert_relative_eq!(measure.records.distances[0], 5.0, epsilon = 1e-9);
        assert_eq!(fx.state.visuals.get(1).map(|v| v.points.len()), Some(3));
    }

    #[test]
    fn test_abschluss_ist_idempotent() {
        let mut fx = Fixture::new(MeasureMode::Distance);
        fx.place(0.0, 0.0).expect("erster Punkt");
        fx.place(10.0, 0.0).expect("zweiter Punkt");
        fx.run(|s, h| finalize(s, h, None)).0.expect("Abschluss");
        let before = fx.registry.upsert_count();
        let primitives = fx.surface.len();

        let (result, notes) = fx.run(|s, h| finalize(s, h, None));
        result.expect("zweiter Abschluss");
        assert!(notes.is_empty());
        assert_eq!(fx.registry.upsert_count(), before);
        assert_eq!(fx.surface.len(), primitives);
    }
}
