//! Mapping von Eingabe-Events auf mutierende Engine-Commands.

use glam::DVec3;

use super::events::{InputEvent, InputKind, MeasureCommand, PointerButton};
use super::MeasureState;
use crate::core::{FeatureId, FeatureKind, Measure};
use crate::scene::PrimitiveId;

/// Ein Feature dieser Engine unter dem Pointer
#[derive(Debug, Clone, Copy)]
struct Pick {
    feature: FeatureId,
    primitive: Option<PrimitiveId>,
    /// Gespeicherte Punktposition, sonst die Weltposition des Events
    position: DVec3,
}

/// Sucht das vorderste Feature der gewünschten Art im aktiven Modus.
fn find_pick(
    state: &MeasureState,
    event: &InputEvent,
    world: DVec3,
    kind: FeatureKind,
) -> Option<Pick> {
    event.picked_features.iter().find_map(|picked| {
        let feature = picked.parsed()?;
        if feature.kind != kind
            || feature.mode != state.active_mode
            || !state.measures.contains_key(&feature.measure_id)
        {
            return None;
        }
        let stored = picked
            .primitive
            .filter(|_| kind == FeatureKind::Point)
            .and_then(|id| state.primitives.get(id))
            .and_then(|meta| meta.positions.first().copied());
        Some(Pick {
            feature,
            primitive: picked.primitive,
            position: stored.unwrap_or(world),
        })
    })
}

/// Wie `find_pick`, aber nur für abgeschlossene Messungen.
fn find_completed_pick<'a>(
    state: &'a MeasureState,
    event: &InputEvent,
    world: DVec3,
    kind: FeatureKind,
) -> Option<(Pick, &'a Measure)> {
    let pick = find_pick(state, event, world, kind)?;
    let measure = state.completed_measure(pick.feature.measure_id)?;
    Some((pick, measure))
}

/// Übersetzt ein `InputEvent` in eine Sequenz ausführbarer `MeasureCommand`s.
pub fn map_input_to_commands(state: &MeasureState, event: &InputEvent) -> Vec<MeasureCommand> {
    if !state.enabled {
        return Vec::new();
    }

    match event.kind {
        InputKind::Move => match (state.session.is_measuring(), event.world_point) {
            (true, Some(position)) => vec![MeasureCommand::UpdatePreview { position }],
            _ => Vec::new(),
        },
        InputKind::DragStart => map_drag_start(state, event),
        InputKind::DragMove if !state.drag.is_idle() => vec![MeasureCommand::DragMove {
            position: event.world_point,
            screen: event.screen_point,
        }],
        InputKind::DragEnd if !state.drag.is_idle() => vec![MeasureCommand::DragEnd {
            position: event.world_point,
            screen: event.screen_point,
        }],
        InputKind::DragMove | InputKind::DragEnd => Vec::new(),
        InputKind::Click => {
            // Keine Klicks, solange ein Drag armiert oder aktiv ist
            if !state.drag.is_idle() {
                return Vec::new();
            }
            let Some(world) = event.world_point else {
                return Vec::new();
            };
            match event.button {
                PointerButton::Primary => map_primary_click(state, event, world),
                PointerButton::Secondary => map_secondary_click(state, event, world),
                PointerButton::Middle => map_middle_click(state, event, world),
            }
        }
    }
}

fn map_drag_start(state: &MeasureState, event: &InputEvent) -> Vec<MeasureCommand> {
    if state.session.is_measuring() || state.add_mode.is_some() || !state.drag.is_idle() {
        return Vec::new();
    }
    let Some(world) = event.world_point else {
        return Vec::new();
    };
    match find_completed_pick(state, event, world, FeatureKind::Point) {
        Some((pick, measure)) => vec![MeasureCommand::DragBegin {
            measure_id: measure.id,
            position: pick.position,
            screen: event.screen_point,
        }],
        None => Vec::new(),
    }
}

fn map_primary_click(
    state: &MeasureState,
    event: &InputEvent,
    world: DVec3,
) -> Vec<MeasureCommand> {
    let tolerance = state.options.pick_tolerance;

    if let Some(add_mode) = state.add_mode {
        return match find_pick(state, event, world, FeatureKind::Line)
            .filter(|pick| pick.feature.measure_id == add_mode.measure_id)
        {
            Some(pick) => vec![MeasureCommand::InsertPoint {
                measure_id: add_mode.measure_id,
                line: pick.primitive,
                position: world,
            }],
            None => vec![MeasureCommand::ExitAddMode],
        };
    }

    if let Some(active_id) = state.session.measuring_id() {
        let pick = find_pick(state, event, world, FeatureKind::Point)
            .filter(|pick| pick.feature.measure_id == active_id);
        if let (Some(pick), Some(measure)) = (pick, state.measures.get(&active_id)) {
            let near = |p: Option<DVec3>| p.is_some_and(|p| p.distance(pick.position) <= tolerance);
            let closes = measure.mode.closes_loop()
                && measure.coordinates.len() >= 3
                && near(state.session.fixed_end(measure));
            let revisits = near(state.session.growing_end(measure));
            if closes || revisits {
                return vec![MeasureCommand::Finalize { position: None }];
            }
        }
        return vec![MeasureCommand::PlacePoint { position: world }];
    }

    if let Some((pick, measure)) = find_completed_pick(state, event, world, FeatureKind::Point) {
        let terminal = measure
            .find_coordinate(pick.position, tolerance)
            .is_some_and(|i| measure.is_terminal(i));
        if terminal && measure.mode.max_points().is_none() {
            return vec![MeasureCommand::Resume {
                measure_id: measure.id,
                position: pick.position,
            }];
        }
    }

    vec![MeasureCommand::PlacePoint { position: world }]
}

fn map_secondary_click(
    state: &MeasureState,
    event: &InputEvent,
    world: DVec3,
) -> Vec<MeasureCommand> {
    if state.session.is_measuring() {
        return vec![MeasureCommand::Finalize {
            position: Some(world),
        }];
    }
    if state.add_mode.is_some() {
        return vec![MeasureCommand::ExitAddMode];
    }
    if let Some((pick, measure)) = find_completed_pick(state, event, world, FeatureKind::Point) {
        return vec![MeasureCommand::RemovePoint {
            measure_id: measure.id,
            position: pick.position,
        }];
    }
    if let Some((_, measure)) = find_completed_pick(state, event, world, FeatureKind::Line) {
        return vec![MeasureCommand::RequestRemoveMeasure {
            measure_id: measure.id,
        }];
    }
    Vec::new()
}

fn map_middle_click(state: &MeasureState, event: &InputEvent, world: DVec3) -> Vec<MeasureCommand> {
    if state.session.is_measuring() {
        return Vec::new();
    }
    match find_completed_pick(state, event, world, FeatureKind::Line) {
        Some((_, measure)) => vec![MeasureCommand::RequestAddMode {
            measure_id: measure.id,
        }],
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests;
