//! Heightmap als Terrain-Sampler (Graustufen-Raster mit Welt-Ausdehnung).
//!
//! Erkennt beim Laden die Bit-Tiefe (8-Bit oder 16-Bit) und normalisiert
//! die Pixelwerte auf [0.0, 1.0]. Die Höhe ergibt sich aus
//! `normalisierter_wert × height_scale`.

use anyhow::{ensure, Context, Result};
use glam::DVec3;
use image::{DynamicImage, GenericImageView};

use super::TerrainSampler;

/// Welt-Ausdehnung der Heightmap in der XY-Ebene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBounds {
    /// Minimale X-Koordinate
    pub min_x: f64,
    /// Minimale Y-Koordinate
    pub min_y: f64,
    /// Maximale X-Koordinate
    pub max_x: f64,
    /// Maximale Y-Koordinate
    pub max_y: f64,
}

impl WorldBounds {
    /// Erstellt Bounds aus Kantenlänge (zentriert bei 0,0)
    pub fn from_map_size(size: f64) -> Self {
        let half = size / 2.0;
        Self {
            min_x: -half,
            min_y: -half,
            max_x: half,
            max_y: half,
        }
    }
}

/// Heightmap für Geländehöhen
pub struct Heightmap {
    /// Normalisierte Grauwerte [0.0, 1.0], zeilenweise gespeichert
    pixels: Vec<f32>,
    width: u32,
    height: u32,
    world_bounds: WorldBounds,
    height_scale: f64,
    bit_depth: u8,
}

impl Heightmap {
    /// Erstellt eine Heightmap aus einem zeilenweisen Raster normalisierter Werte.
    pub fn from_grid(
        pixels: Vec<f32>,
        width: u32,
        height: u32,
        world_bounds: WorldBounds,
        height_scale: f64,
    ) -> Result<Self> {
        ensure!(width >= 2 && height >= 2, "Heightmap braucht mindestens 2x2 Pixel");
        ensure!(
            pixels.len() == (width as usize) * (height as usize),
            "Heightmap-Raster hat {} Werte, erwartet {}x{}",
            pixels.len(),
            width,
            height
        );
        Ok(Self {
            pixels,
            width,
            height,
            world_bounds,
            height_scale,
            bit_depth: 32,
        })
    }

    /// Lädt eine Heightmap-Bilddatei mit expliziten World-Bounds.
    pub fn load(path: &str, world_bounds: WorldBounds, height_scale: f64) -> Result<Self> {
        let image = image::open(path)
            .with_context(|| format!("Fehler beim Laden der Heightmap: {}", path))?;
        Self::from_image(image, world_bounds, height_scale)
    }

    fn from_image(
        image: DynamicImage,
        world_bounds: WorldBounds,
        height_scale: f64,
    ) -> Result<Self> {
        let (width, height) = image.dimensions();

        let bit_depth = match image.color() {
            image::ColorType::L16
            | image::ColorType::La16
            | image::ColorType::Rgb16
            | image::ColorType::Rgba16 => 16u8,
            _ => 8u8,
        };

        let pixels: Vec<f32> = if bit_depth == 16 {
            let luma16 = image.into_luma16();
            luma16.pixels().map(|p| p[0] as f32 / 65535.0).collect()
        } else {
            let luma8 = image.into_luma8();
            luma8.pixels().map(|p| p[0] as f32 / 255.0).collect()
        };

        let mut map = Self::from_grid(pixels, width, height, world_bounds, height_scale)?;
        map.bit_depth = bit_depth;

        log::info!(
            "Heightmap geladen: {}x{} Pixel, {}-Bit, Bereich ({:.1}, {:.1}) bis ({:.1}, {:.1})",
            width,
            height,
            bit_depth,
            world_bounds.min_x,
            world_bounds.min_y,
            world_bounds.max_x,
            world_bounds.max_y
        );

        Ok(map)
    }

    /// Geländehöhe an einer XY-Position (bilineare Interpolation, außerhalb geklemmt).
    pub fn sample_height(&self, x: f64, y: f64) -> f64 {
        let b = &self.world_bounds;
        let nx = ((x - b.min_x) / (b.max_x - b.min_x)).clamp(0.0, 1.0);
        let ny = ((y - b.min_y) / (b.max_y - b.min_y)).clamp(0.0, 1.0);

        let px = nx * (self.width - 1) as f64;
        let py = ny * (self.height - 1) as f64;

        let x0 = px.floor() as u32;
        let y0 = py.floor() as u32;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);
        let fx = px - x0 as f64;
        let fy = py - y0 as f64;

        let top = lerp(self.grayscale(x0, y0), self.grayscale(x1, y0), fx);
        let bottom = lerp(self.grayscale(x0, y1), self.grayscale(x1, y1), fx);
        let value = lerp(top, bottom, fy);

        log::trace!(
            "Heightmap-Sample ({:.3}, {:.3}) -> pixel ({:.3}, {:.3}) -> {:.4}",
            x,
            y,
            px,
            py,
            value
        );

        value * self.height_scale
    }

    fn grayscale(&self, x: u32, y: u32) -> f64 {
        self.pixels[(y * self.width + x) as usize] as f64
    }

    /// Gibt die Dimensionen der Heightmap zurück
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Erkannte Bit-Tiefe (8, 16 oder 32 bei Raster-Eingabe)
    pub fn bit_depth(&self) -> u8 {
        self.bit_depth
    }

    /// Gibt die verwendeten World-Bounds zurück
    pub fn world_bounds(&self) -> &WorldBounds {
        &self.world_bounds
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

impl TerrainSampler for Heightmap {
    fn sample_heights(&self, positions: &[DVec3]) -> Option<Vec<f64>> {
        Some(
            positions
                .iter()
                .map(|p| self.sample_height(p.x, p.y))
                .collect(),
        )
    }
}
