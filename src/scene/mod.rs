//! Render-Oberfläche: externe Schnittstelle und aufzeichnende In-Memory-Implementierung.

pub mod recording;
pub mod surface;

pub use recording::{RecordedPrimitive, RecordedShape, RecordingSurface, SurfaceStats};
pub use surface::{LineStyle, PointStyle, PrimitiveId, SceneSurface};
