use glam::{DVec2, DVec3};

use crate::app::events::{InputEvent, InputKind, MeasureCommand, PickedFeature, PointerButton};
use crate::app::session::SessionPhase;
use crate::app::state::AddModeState;
use crate::app::MeasureState;
use crate::core::{Measure, MeasureMode, MeasureStatus};
use crate::shared::MeasureOptions;

use super::map_input_to_commands;

fn p(x: f64, y: f64) -> DVec3 {
    DVec3::new(x, y, 0.0)
}

fn state_with(mode: MeasureMode, coords: &[DVec3], status: MeasureStatus) -> MeasureState {
    let mut state = MeasureState::with_id_seed(MeasureOptions::default(), 100);
    state.active_mode = mode;
    let mut measure = Measure::new(7, mode, 1);
    measure.coordinates = coords.to_vec();
    measure.status = status;
    state.measures.insert(7, measure);
    if status == MeasureStatus::Pending {
        state.session.phase = SessionPhase::Measuring;
        state.session.active = Some(7);
    }
    state
}

fn click(button: PointerButton, at: DVec3) -> InputEvent {
    InputEvent::click(at).with_button(button)
}

#[test]
fn click_without_world_point_is_ignored() {
    let state = MeasureState::new();
    let event = InputEvent::new(InputKind::Click, None, DVec2::ZERO);

    assert!(map_input_to_commands(&state, &event).is_empty());
}

#[test]
fn idle_primary_click_places_point() {
    let state = MeasureState::new();

    let commands = map_input_to_commands(&state, &InputEvent::click(p(1.0, 2.0)));

    assert_eq!(
        commands,
        vec![MeasureCommand::PlacePoint {
            position: p(1.0, 2.0)
        }]
    );
}

#[test]
fn disabled_engine_maps_nothing() {
    let mut state = MeasureState::new();
    state.enabled = false;

    assert!(map_input_to_commands(&state, &InputEvent::click(p(1.0, 2.0))).is_empty());
}

#[test]
fn move_updates_preview_only_while_measuring() {
    let idle = MeasureState::new();
    let event = InputEvent::new(InputKind::Move, Some(p(3.0, 0.0)), DVec2::ZERO);
    assert!(map_input_to_commands(&idle, &event).is_empty());

    let measuring = state_with(MeasureMode::Distance, &[p(0.0, 0.0)], MeasureStatus::Pending);
    assert_eq!(
        map_input_to_commands(&measuring, &event),
        vec![MeasureCommand::UpdatePreview {
            position: p(3.0, 0.0)
        }]
    );
}

#[test]
fn click_on_terminal_point_resumes_completed_measure() {
    let state = state_with(
        MeasureMode::Distance,
        &[p(0.0, 0.0), p(10.0, 0.0)],
        MeasureStatus::Completed,
    );
    let event = InputEvent::click(p(10.1, 0.0))
        .with_pick(PickedFeature::new("annotate_distance_point_7"));

    let commands = map_input_to_commands(&state, &event);

    assert_eq!(
        commands,
        vec![MeasureCommand::Resume {
            measure_id: 7,
            position: p(10.1, 0.0)
        }]
    );
}

#[test]
fn point_of_other_mode_is_not_a_pick() {
    let state = state_with(
        MeasureMode::Distance,
        &[p(0.0, 0.0), p(10.0, 0.0)],
        MeasureStatus::Completed,
    );
    let event =
        InputEvent::click(p(10.0, 0.0)).with_pick(PickedFeature::new("annotate_area_point_7"));

    let commands = map_input_to_commands(&state, &event);

    assert!(matches!(commands[0], MeasureCommand::PlacePoint { .. }));
}

#[test]
fn click_on_first_point_closes_perimeter() {
    let state = state_with(
        MeasureMode::Perimeter,
        &[p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0)],
        MeasureStatus::Pending,
    );
    let event = InputEvent::click(p(0.2, 0.0))
        .with_pick(PickedFeature::new("annotate_perimeter_point_7"));

    let commands = map_input_to_commands(&state, &event);

    assert_eq!(commands, vec![MeasureCommand::Finalize { position: None }]);
}

#[test]
fn click_on_first_point_of_open_path_places_point() {
    let state = state_with(
        MeasureMode::Distance,
        &[p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0)],
        MeasureStatus::Pending,
    );
    let event = InputEvent::click(p(0.0, 0.0))
        .with_pick(PickedFeature::new("annotate_distance_point_7"));

    let commands = map_input_to_commands(&state, &event);

    assert!(matches!(commands[0], MeasureCommand::PlacePoint { .. }));
}

#[test]
fn secondary_click_finalizes_at_pointer_while_measuring() {
    let state = state_with(MeasureMode::Distance, &[p(0.0, 0.0)], MeasureStatus::Pending);

    let commands = map_input_to_commands(&state, &click(PointerButton::Secondary, p(4.0, 4.0)));

    assert_eq!(
        commands,
        vec![MeasureCommand::Finalize {
            position: Some(p(4.0, 4.0))
        }]
    );
}

#[test]
fn secondary_click_removes_point_or_requests_measure_removal() {
    let state = state_with(
        MeasureMode::Distance,
        &[p(0.0, 0.0), p(10.0, 0.0), p(20.0, 0.0)],
        MeasureStatus::Completed,
    );

    let on_point = click(PointerButton::Secondary, p(10.0, 0.0))
        .with_pick(PickedFeature::new("annotate_distance_point_7"))
        .with_pick(PickedFeature::new("annotate_distance_line_7"));
    assert_eq!(
        map_input_to_commands(&state, &on_point),
        vec![MeasureCommand::RemovePoint {
            measure_id: 7,
            position: p(10.0, 0.0)
        }]
    );

    let on_line = click(PointerButton::Secondary, p(5.0, 0.0))
        .with_pick(PickedFeature::new("annotate_distance_line_7"));
    assert_eq!(
        map_input_to_commands(&state, &on_line),
        vec![MeasureCommand::RequestRemoveMeasure { measure_id: 7 }]
    );
}

#[test]
fn middle_click_on_line_requests_add_mode() {
    let state = state_with(
        MeasureMode::Distance,
        &[p(0.0, 0.0), p(10.0, 0.0)],
        MeasureStatus::Completed,
    );
    let event = click(PointerButton::Middle, p(5.0, 0.0))
        .with_pick(PickedFeature::new("annotate_distance_line_7"));

    assert_eq!(
        map_input_to_commands(&state, &event),
        vec![MeasureCommand::RequestAddMode { measure_id: 7 }]
    );
}

#[test]
fn add_mode_click_inserts_on_line_and_exits_elsewhere() {
    let mut state = state_with(
        MeasureMode::Distance,
        &[p(0.0, 0.0), p(10.0, 0.0)],
        MeasureStatus::Completed,
    );
    state.add_mode = Some(AddModeState { measure_id: 7 });

    let on_line = InputEvent::click(p(5.0, 0.0)).with_pick(PickedFeature {
        id: "annotate_distance_line_7".into(),
        primitive: Some(42),
    });
    assert_eq!(
        map_input_to_commands(&state, &on_line),
        vec![MeasureCommand::InsertPoint {
            measure_id: 7,
            line: Some(42),
            position: p(5.0, 0.0)
        }]
    );

    let elsewhere = InputEvent::click(p(50.0, 50.0));
    assert_eq!(
        map_input_to_commands(&state, &elsewhere),
        vec![MeasureCommand::ExitAddMode]
    );
}

#[test]
fn drag_start_on_completed_point_begins_drag() {
    let state = state_with(
        MeasureMode::Distance,
        &[p(0.0, 0.0), p(10.0, 0.0)],
        MeasureStatus::Completed,
    );
    let event = InputEvent::new(InputKind::DragStart, Some(p(10.0, 0.0)), DVec2::new(40.0, 30.0))
        .with_pick(PickedFeature::new("annotate_distance_point_7"));

    assert_eq!(
        map_input_to_commands(&state, &event),
        vec![MeasureCommand::DragBegin {
            measure_id: 7,
            position: p(10.0, 0.0),
            screen: DVec2::new(40.0, 30.0)
        }]
    );
}

#[test]
fn drag_move_without_armed_drag_is_ignored() {
    let state = MeasureState::new();
    let event = InputEvent::new(InputKind::DragMove, Some(p(1.0, 1.0)), DVec2::ZERO);

    assert!(map_input_to_commands(&state, &event).is_empty());
}
