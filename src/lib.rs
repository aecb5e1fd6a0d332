//! Terrain Measure Editor Library.
//! Interaktive Mess-Engine (Distanz, Umfang, Fläche, Profil, Höhe) als Library
//! exportiert für Host-Anwendungen, Tests und Wiederverwendung.

pub mod app;
pub mod core;
pub mod scene;
pub mod shared;

pub use app::{
    EditRejection, InputEvent, InputKind, MeasureCommand, MeasureController, MeasureState,
    Notification, PointerButton,
};
pub use core::{
    FeatureId, FeatureKind, FlatTerrain, Heightmap, InMemoryRegistry, Measure, MeasureFilter,
    MeasureId, MeasureMode, MeasureStatus, MeasurementRegistry, NoTerrain, TerrainSampler,
    WorldBounds,
};
pub use scene::{RecordingSurface, SceneSurface};
pub use shared::MeasureOptions;
