//! In-Memory-Oberfläche, die alle Primitive und Aufrufe mitschreibt.
//!
//! Wird von der Replay-Binary und den Tests als Render-Oberfläche verwendet.

use std::collections::HashMap;

use glam::DVec3;

use super::{LineStyle, PointStyle, PrimitiveId, SceneSurface};

/// Art eines aufgezeichneten Primitivs
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedShape {
    /// Punkt
    Point(PointStyle),
    /// Polyline
    Polyline(LineStyle),
    /// Label mit Text und Hintergrund-Sichtbarkeit
    Label {
        /// Angezeigter Text
        text: String,
        /// Hintergrund sichtbar
        show_background: bool,
    },
    /// Polygon
    Polygon,
}

/// Ein lebendes Primitiv auf der Oberfläche
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedPrimitive {
    /// Feature-ID (für Picking)
    pub feature_id: String,
    /// Art und Darstellung
    pub shape: RecordedShape,
    /// Positionen (Punkt/Label: genau eine)
    pub positions: Vec<DVec3>,
}

/// Zähler über alle Oberflächen-Aufrufe
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SurfaceStats {
    /// Erstellte Primitive
    pub created: usize,
    /// Entfernte Primitive
    pub removed: usize,
    /// Label-Updates an Ort und Stelle
    pub label_updates: usize,
    /// Punkt-Updates
    pub point_updates: usize,
    /// Polygon-Updates
    pub polygon_updates: usize,
}

/// Aufzeichnende Render-Oberfläche.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    primitives: HashMap<PrimitiveId, RecordedPrimitive>,
    next_id: PrimitiveId,
    camera_input_enabled: bool,
    stats: SurfaceStats,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingSurface {
    /// Erstellt eine leere Oberfläche mit aktiver Kamera-Eingabe.
    pub fn new() -> Self {
        Self {
            primitives: HashMap::new(),
            next_id: 1,
            camera_input_enabled: true,
            stats: SurfaceStats::default(),
        }
    }

    fn insert(
        &mut self,
        feature_id: &str,
        shape: RecordedShape,
        positions: Vec<DVec3>,
    ) -> PrimitiveId {
        let id = self.next_id;
        self.next_id += 1;
        self.stats.created += 1;
        self.primitives.insert(
            id,
            RecordedPrimitive {
                feature_id: feature_id.to_string(),
                shape,
                positions,
            },
        );
        id
    }

    /// Primitiv per Handle.
    pub fn get(&self, id: PrimitiveId) -> Option<&RecordedPrimitive> {
        self.primitives.get(&id)
    }

    /// Anzahl lebender Primitive.
    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    /// Gibt zurück ob keine Primitive existieren.
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Alle lebenden Primitive mit exakt dieser Feature-ID.
    pub fn with_feature_id<'a>(
        &'a self,
        feature_id: &'a str,
    ) -> impl Iterator<Item = (PrimitiveId, &'a RecordedPrimitive)> + 'a {
        self.primitives
            .iter()
            .filter(move |(_, p)| p.feature_id == feature_id)
            .map(|(id, p)| (*id, p))
    }

    /// Anzahl lebender Polylines.
    pub fn polyline_count(&self) -> usize {
        self.count(|s| matches!(s, RecordedShape::Polyline(_)))
    }

    /// Anzahl lebender Labels.
    pub fn label_count(&self) -> usize {
        self.count(|s| matches!(s, RecordedShape::Label { .. }))
    }

    /// Anzahl lebender Punkte.
    pub fn point_count(&self) -> usize {
        self.count(|s| matches!(s, RecordedShape::Point(_)))
    }

    /// Anzahl lebender Polygone.
    pub fn polygon_count(&self) -> usize {
        self.count(|s| matches!(s, RecordedShape::Polygon))
    }

    fn count(&self, pred: impl Fn(&RecordedShape) -> bool) -> usize {
        self.primitives.values().filter(|p| pred(&p.shape)).count()
    }

    /// Ist die Kamera-Eingabe aktiv?
    pub fn camera_input_enabled(&self) -> bool {
        self.camera_input_enabled
    }

    /// Aufruf-Zähler.
    pub fn stats(&self) -> SurfaceStats {
        self.stats
    }
}

impl SceneSurface for RecordingSurface {
    fn add_point(&mut self, feature_id: &str, position: DVec3, style: PointStyle) -> PrimitiveId {
        self.insert(feature_id, RecordedShape::Point(style), vec![position])
    }

    fn add_polyline(
        &mut self,
        feature_id: &str,
        positions: &[DVec3],
        style: LineStyle,
    ) -> PrimitiveId {
        self.insert(feature_id, RecordedShape::Polyline(style), positions.to_vec())
    }

    fn add_label(
        &mut self,
        feature_id: &str,
        position: DVec3,
        text: &str,
        show_background: bool,
    ) -> PrimitiveId {
        self.insert(
            feature_id,
            RecordedShape::Label {
                text: text.to_string(),
                show_background,
            },
            vec![position],
        )
    }

    fn add_polygon(&mut self, feature_id: &str, positions: &[DVec3]) -> PrimitiveId {
        self.insert(feature_id, RecordedShape::Polygon, positions.to_vec())
    }

    fn update_point(&mut self, id: PrimitiveId, position: DVec3, style: PointStyle) {
        if let Some(p) = self.primitives.get_mut(&id) {
            p.positions = vec![position];
            p.shape = RecordedShape::Point(style);
            self.stats.point_updates += 1;
        }
    }

    fn update_label(
        &mut self,
        id: PrimitiveId,
        position: DVec3,
        text: &str,
        show_background: bool,
    ) {
        if let Some(p) = self.primitives.get_mut(&id) {
            p.positions = vec![position];
            p.shape = RecordedShape::Label {
                text: text.to_string(),
                show_background,
            };
            self.stats.label_updates += 1;
        }
    }

    fn update_polygon(&mut self, id: PrimitiveId, positions: &[DVec3]) {
        if let Some(p) = self.primitives.get_mut(&id) {
            p.positions = positions.to_vec();
            self.stats.polygon_updates += 1;
        }
    }

    fn remove(&mut self, id: PrimitiveId) -> bool {
        let removed = self.primitives.remove(&id).is_some();
        if removed {
            self.stats.removed += 1;
        }
        removed
    }

    fn set_camera_input_enabled(&mut self, enabled: bool) {
        self.camera_input_enabled = enabled;
    }
}
