//! Core-Domänentypen: Messungen, Registry, Terrain, Spatial-Index, Feature-IDs.

pub mod feature_id;
pub mod geometry;
pub mod heightmap;
/// Kanonischer Mess-Datensatz
///
/// - Measure: Koordinaten, Status, Segmentlängen, Bodenpunkte
/// - MeasureMode: Distanz, Umfang, Fläche, Profil, Höhe
pub mod measure;
pub mod registry;
pub mod spatial;
pub mod terrain;
pub mod units;

pub use feature_id::{FeatureId, FeatureKind, FEATURE_NAMESPACE};
pub use heightmap::{Heightmap, WorldBounds};
pub use measure::{Measure, MeasureId, MeasureMode, MeasureRecords, MeasureStatus, SegmentMetric};
pub use registry::{InMemoryRegistry, MeasureFilter, MeasurementRegistry};
pub use spatial::{PointIndex, PointMatch};
pub use terrain::{FlatTerrain, NoTerrain, TerrainSampler};
pub use units::{format_area, format_distance};
