//! Zentrale Konfiguration der Mess-Engine.
//!
//! `MeasureOptions` enthält alle zur Laufzeit änderbaren Werte.
//! Die `const`-Werte bleiben als Fallback/Default erhalten.

use serde::{Deserialize, Serialize};

// ── Platzieren ──────────────────────────────────────────────────────

/// Mindestabstand (Welteinheiten) zu jedem bereits platzierten Punkt des Modus.
pub const DUPLICATE_EPSILON: f64 = 0.3;
/// Toleranz für das Wiederfinden eines Punkts anhand seiner Position.
pub const PICK_TOLERANCE: f64 = 0.5;

// ── Segmente ────────────────────────────────────────────────────────

/// Abstand der Bodenpunkte entlang eines Segments.
pub const INTERPOLATION_SPACING: f64 = 3.0;
/// Obergrenze der Bodenpunkte pro Segment.
pub const MAX_INTERPOLATED_POINTS: usize = 2000;
/// Label-Hintergrund für fertige Segmente anzeigen.
pub const LABEL_BACKGROUND: bool = true;

// ── Drag ────────────────────────────────────────────────────────────

/// Bildschirm-Verschiebung (Pixel), ab der aus einem Klick ein Drag wird.
pub const DRAG_THRESHOLD_PX: f64 = 5.0;

// ── Laufzeit-Optionen (serialisierbar) ─────────────────────────────

/// Alle zur Laufzeit änderbaren Engine-Optionen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasureOptions {
    /// Mindestabstand neuer Punkte zu bestehenden Punkten
    pub duplicate_epsilon: f64,
    /// Positions-Toleranz beim Wiederfinden gepickter Punkte
    pub pick_tolerance: f64,
    /// Abstand der interpolierten Bodenpunkte (empfohlen 2–4)
    pub interpolation_spacing: f64,
    /// Maximale Bodenpunkte pro Segment
    pub max_interpolated_points: usize,
    /// Label-Hintergrund anzeigen
    pub label_background: bool,
    /// Drag-Schwelle in Pixeln
    pub drag_threshold_px: f64,
}

impl Default for MeasureOptions {
    fn default() -> Self {
        Self {
            duplicate_epsilon: DUPLICATE_EPSILON,
            pick_tolerance: PICK_TOLERANCE,
            interpolation_spacing: INTERPOLATION_SPACING,
            max_interpolated_points: MAX_INTERPOLATED_POINTS,
            label_background: LABEL_BACKGROUND,
            drag_threshold_px: DRAG_THRESHOLD_PX,
        }
    }
}

impl MeasureOptions {
    /// Lädt Optionen aus einer TOML-Datei. Bei Fehler: Standardwerte.
    pub fn load_from_file(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<Self>(&content) {
                Ok(opts) => {
                    log::info!("Optionen geladen aus: {}", path.display());
                    opts.sanitized()
                }
                Err(e) => {
                    log::warn!("Optionen-Datei fehlerhaft, verwende Standardwerte: {}", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Keine Optionen-Datei gefunden, verwende Standardwerte");
                Self::default()
            }
        }
    }

    /// Speichert Optionen als TOML-Datei.
    pub fn save_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        log::info!("Optionen gespeichert nach: {}", path.display());
        Ok(())
    }

    /// Ersetzt unbrauchbare Werte (≤ 0, NaN) durch Standardwerte.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.duplicate_epsilon >= 0.0) {
            self.duplicate_epsilon = defaults.duplicate_epsilon;
        }
        if !(self.pick_tolerance > 0.0) {
            self.pick_tolerance = defaults.pick_tolerance;
        }
        if !(self.interpolation_spacing > 0.0) {
            self.interpolation_spacing = defaults.interpolation_spacing;
        }
        if self.max_interpolated_points < 2 {
            self.max_interpolated_points = defaults.max_interpolated_points;
        }
        if !(self.drag_threshold_px >= 0.0) {
            self.drag_threshold_px = defaults.drag_threshold_px;
        }
        self
    }
}
