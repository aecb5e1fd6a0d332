//! Schnittstelle zur externen Render-Oberfläche.
//!
//! Die Oberfläche besitzt die eigentlichen Visuals und das Hit-Testing.
//! Die Engine kennt Primitive nur über ihre Handles; Status und Positionen
//! führt sie selbst in einer Seitentabelle (`app::visuals::PrimitiveTable`).

use glam::DVec3;

/// Handle eines Primitivs auf der Oberfläche
pub type PrimitiveId = u64;

/// Darstellung eines Messpunkts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointStyle {
    /// Standard-Darstellung
    #[default]
    Default,
    /// Hervorgehoben (wird gerade gezogen)
    Highlighted,
}

/// Darstellung einer Segment-Linie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineStyle {
    /// Durchgezogen
    #[default]
    Solid,
    /// Gestrichelt (Vorschau / Drag)
    Dashed,
}

/// Externe Render-Oberfläche für Punkte, Linien, Labels und Polygone.
pub trait SceneSurface {
    /// Fügt einen Punkt hinzu.
    fn add_point(&mut self, feature_id: &str, position: DVec3, style: PointStyle) -> PrimitiveId;

    /// Fügt eine Polyline hinzu.
    fn add_polyline(&mut self, feature_id: &str, positions: &[DVec3], style: LineStyle)
        -> PrimitiveId;

    /// Fügt ein Text-Label hinzu.
    fn add_label(
        &mut self,
        feature_id: &str,
        position: DVec3,
        text: &str,
        show_background: bool,
    ) -> PrimitiveId;

    /// Fügt ein Polygon hinzu.
    fn add_polygon(&mut self, feature_id: &str, positions: &[DVec3]) -> PrimitiveId;

    /// Verschiebt einen Punkt und setzt seine Darstellung.
    fn update_point(&mut self, id: PrimitiveId, position: DVec3, style: PointStyle);

    /// Aktualisiert ein Label an Ort und Stelle (kein Neuaufbau, kein Flackern).
    fn update_label(&mut self, id: PrimitiveId, position: DVec3, text: &str, show_background: bool);

    /// Ersetzt die Eckpunkte eines Polygons.
    fn update_polygon(&mut self, id: PrimitiveId, positions: &[DVec3]);

    /// Entfernt ein Primitiv. Gibt `false` zurück, wenn es nicht existierte.
    fn remove(&mut self, id: PrimitiveId) -> bool;

    /// Schaltet Kamera-/Pan-Eingaben ein oder aus.
    fn set_camera_input_enabled(&mut self, enabled: bool);
}
