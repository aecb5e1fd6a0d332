//! Application-Layer: Controller, State, Events und Use-Cases.

pub mod command_log;
pub mod controller;
pub mod drag;
pub mod events;
pub mod handlers;
pub mod host;
mod intent_mapping;
pub mod reconnect;
pub mod rejection;
pub mod segment_sync;
pub mod session;
/// Engine State
///
/// Dieses Modul verwaltet den Zustand der Engine (Messungen, Primitive, Session, Drag).
pub mod state;
pub mod visuals;

pub use command_log::CommandLog;
pub use controller::MeasureController;
pub use drag::{DragController, DragGesture, DragPhase};
pub use events::{
    ConfirmAction, InputEvent, InputKind, MeasureCommand, Notification, PickedFeature,
    PointerButton,
};
pub use host::EngineHost;
pub use intent_mapping::map_input_to_commands;
pub use reconnect::RemovalOutcome;
pub use rejection::{EditRejection, EditResult};
pub use segment_sync::{measure_segment, SegmentMeasurement, SegmentSynchronizer};
pub use session::{CoordinateSession, SessionPhase};
pub use state::{AddModeState, MeasureState, PendingConfirmation};
pub use visuals::{
    FeatureOwner, MeasureVisuals, PrimitiveMeta, PrimitiveStatus, PrimitiveTable, SegmentHandles,
    VisualIndex,
};
