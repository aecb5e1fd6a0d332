//! Terrain-Sampling als externe Schnittstelle (gebündelte Höhenabfrage).
//!
//! Die Z-Achse ist die Höhe. Ein Sampler darf "nicht verfügbar" melden;
//! die Segment-Messung fällt dann auf die gerade Sehne zurück.

use glam::DVec3;

/// Gebündelte Höhenabfrage für Weltpositionen.
pub trait TerrainSampler {
    /// Liefert je Position die Geländehöhe oder `None`, wenn kein Terrain verfügbar ist.
    fn sample_heights(&self, positions: &[DVec3]) -> Option<Vec<f64>>;

    /// Klemmt alle Positionen auf das Gelände (Z = Geländehöhe).
    fn clamp_to_ground(&self, positions: &[DVec3]) -> Option<Vec<DVec3>> {
        let heights = self.sample_heights(positions)?;
        if heights.len() != positions.len() {
            log::warn!(
                "Terrain lieferte {} Höhen für {} Positionen, verwerfe Ergebnis",
                heights.len(),
                positions.len()
            );
            return None;
        }
        Some(
            positions
                .iter()
                .zip(heights)
                .map(|(p, h)| DVec3::new(p.x, p.y, h))
                .collect(),
        )
    }
}

/// Ebenes Gelände auf konstanter Höhe.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatTerrain {
    /// Geländehöhe
    pub height: f64,
}

impl FlatTerrain {
    /// Erstellt ebenes Gelände auf `height`.
    pub fn new(height: f64) -> Self {
        Self { height }
    }
}

impl TerrainSampler for FlatTerrain {
    fn sample_heights(&self, positions: &[DVec3]) -> Option<Vec<f64>> {
        Some(vec![self.height; positions.len()])
    }
}

/// Kein Terrain geladen: Messungen nutzen die gerade Sehne.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTerrain;

impl TerrainSampler for NoTerrain {
    fn sample_heights(&self, _positions: &[DVec3]) -> Option<Vec<f64>> {
        None
    }
}

impl<T: TerrainSampler + ?Sized> TerrainSampler for Box<T> {
    fn sample_heights(&self, positions: &[DVec3]) -> Option<Vec<f64>> {
        (**self).sample_heights(positions)
    }
}
