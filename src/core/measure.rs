//! Der kanonische Mess-Datensatz (Measure) mit Modus, Status und abgeleiteten Records.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Stabile ID einer Messung (Session-Zeitstempel oder übernommene externe ID)
pub type MeasureId = u64;

/// Art der Messung
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasureMode {
    /// Offener Mehrpunkt-Pfad mit Gesamtlänge
    #[default]
    Distance,
    /// Geschlossener Umfang (erster = letzter Punkt)
    Perimeter,
    /// Geschlossenes Polygon mit Flächenangabe
    Area,
    /// Offener Pfad, dessen Bodenpunkte ein Höhenprofil speisen
    Profile,
    /// Höhendifferenz zwischen genau zwei Punkten
    Height,
}

/// Wie die Länge eines Segments bestimmt wird
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentMetric {
    /// Pfadlänge entlang der auf das Terrain geklemmten Zwischenpunkte
    Ground,
    /// Betrag der Höhendifferenz der Endpunkte
    Vertical,
}

impl MeasureMode {
    /// Alle bekannten Modi
    pub const ALL: [MeasureMode; 5] = [
        MeasureMode::Distance,
        MeasureMode::Perimeter,
        MeasureMode::Area,
        MeasureMode::Profile,
        MeasureMode::Height,
    ];

    /// Token für Feature-IDs (ohne Unterstriche)
    pub fn token(&self) -> &'static str {
        match self {
            MeasureMode::Distance => "distance",
            MeasureMode::Perimeter => "perimeter",
            MeasureMode::Area => "area",
            MeasureMode::Profile => "profile",
            MeasureMode::Height => "height",
        }
    }

    /// Parst ein Feature-ID-Token.
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.token() == token)
    }

    /// Schließt der Modus den Pfad beim Abschluss zu einer Schleife?
    pub fn closes_loop(&self) -> bool {
        matches!(self, MeasureMode::Perimeter | MeasureMode::Area)
    }

    /// Maximale Punktanzahl (danach wird automatisch abgeschlossen).
    pub fn max_points(&self) -> Option<usize> {
        match self {
            MeasureMode::Height => Some(2),
            _ => None,
        }
    }

    /// Hat der Modus eine Polygon-Fläche?
    pub fn has_polygon(&self) -> bool {
        matches!(self, MeasureMode::Area)
    }

    /// Metrik für Segmentlängen.
    pub fn metric(&self) -> SegmentMetric {
        match self {
            MeasureMode::Height => SegmentMetric::Vertical,
            _ => SegmentMetric::Ground,
        }
    }
}

impl std::fmt::Display for MeasureMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

/// Bearbeitungsstatus einer Messung
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasureStatus {
    /// Noch in Bearbeitung
    #[default]
    Pending,
    /// Abgeschlossen
    Completed,
}

/// Abgeleitete Messwerte
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasureRecords {
    /// Länge je Segment, `distances.len() == coordinates.len() - 1`
    pub distances: Vec<f64>,
    /// Summe aller Segmentlängen
    pub total_distance: f64,
    /// Polygonfläche (nur Flächen-Modus, nur wenn geschlossen)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
}

/// Eine Mehrpunkt-Messung
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    /// Stabile ID
    pub id: MeasureId,
    /// Art der Messung
    pub mode: MeasureMode,
    /// Geordnete Weltpositionen; bei geschlossenem Umfang ist die erste gleich der letzten
    pub coordinates: Vec<DVec3>,
    /// Bearbeitungsstatus
    pub status: MeasureStatus,
    /// Segmentlängen und Summen
    pub records: MeasureRecords,
    /// Bodenpunkte je Segment, index-gleich mit `records.distances`
    pub interpolated_points: Vec<Vec<DVec3>>,
    /// Laufende Nummer für die Anzeige
    pub label_index: u32,
    /// Umfangs-Flag: erster und letzter Punkt sind per Konstruktion identisch
    #[serde(default)]
    pub closed: bool,
}

impl Measure {
    /// Erstellt eine leere, offene Messung im Status `Pending`.
    pub fn new(id: MeasureId, mode: MeasureMode, label_index: u32) -> Self {
        Self {
            id,
            mode,
            coordinates: Vec::new(),
            status: MeasureStatus::Pending,
            records: MeasureRecords::default(),
            interpolated_points: Vec::new(),
            label_index,
            closed: false,
        }
    }

    /// Anzahl der Segmente.
    pub fn segment_count(&self) -> usize {
        self.coordinates.len().saturating_sub(1)
    }

    /// Prüft die Index-Gleichheit der parallelen Listen.
    pub fn is_consistent(&self) -> bool {
        let expected = self.segment_count();
        self.records.distances.len() == expected && self.interpolated_points.len() == expected
    }

    /// Ist die Messung abgeschlossen?
    pub fn is_completed(&self) -> bool {
        self.status == MeasureStatus::Completed
    }

    /// Erste Koordinate.
    pub fn first(&self) -> Option<DVec3> {
        self.coordinates.first().copied()
    }

    /// Letzte Koordinate.
    pub fn last(&self) -> Option<DVec3> {
        self.coordinates.last().copied()
    }

    /// Koordinaten ohne das schließende Duplikat eines Umfangs.
    pub fn distinct_coordinates(&self) -> &[DVec3] {
        if self.closed && self.coordinates.len() > 1 {
            &self.coordinates[..self.coordinates.len() - 1]
        } else {
            &self.coordinates
        }
    }

    /// Endpunkte des Segments `segment` (Index in `distances`).
    pub fn segment_endpoints(&self, segment: usize) -> Option<(DVec3, DVec3)> {
        let start = *self.coordinates.get(segment)?;
        let end = *self.coordinates.get(segment + 1)?;
        Some((start, end))
    }

    /// Summiert die Segmentlängen neu auf.
    pub fn recompute_total(&mut self) {
        self.records.total_distance = self.records.distances.iter().sum();
        self.records.area = if self.mode.has_polygon() && self.closed {
            Some(super::geometry::polygon_area(self.distinct_coordinates()))
        } else {
            None
        };
    }

    /// Findet den Koordinaten-Index, der `position` innerhalb von `tolerance` am nächsten liegt.
    ///
    /// Bei einem geschlossenen Umfang wird der Schließpunkt immer als Index 0 gemeldet.
    pub fn find_coordinate(&self, position: DVec3, tolerance: f64) -> Option<usize> {
        self.distinct_coordinates()
            .iter()
            .enumerate()
            .map(|(i, c)| (i, c.distance(position)))
            .filter(|(_, d)| *d <= tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    /// Alle Koordinaten-Indizes, die zum selben Punkt gehören wie `index`.
    ///
    /// Der Schließpunkt eines Umfangs entspricht Index 0 und `n - 1` gleichzeitig.
    pub fn indices_for(&self, index: usize) -> Vec<usize> {
        let n = self.coordinates.len();
        if self.closed && n > 1 && (index == 0 || index == n - 1) {
            vec![0, n - 1]
        } else {
            vec![index]
        }
    }

    /// Segment-Indizes, die einen der angegebenen Koordinaten-Indizes berühren
    /// (sortiert, ohne Duplikate).
    pub fn segments_touching(&self, indices: &[usize]) -> Vec<usize> {
        let segment_count = self.segment_count();
        let mut segments: Vec<usize> = indices
            .iter()
            .flat_map(|&i| {
                let before = i.checked_sub(1);
                let after = (i < segment_count).then_some(i);
                before.into_iter().chain(after)
            })
            .collect();
        segments.sort_unstable();
        segments.dedup();
        segments
    }

    /// Ist `index` ein offener Endpunkt (erster oder letzter Punkt eines offenen Pfads)?
    pub fn is_terminal(&self, index: usize) -> bool {
        !self.closed && (index == 0 || index + 1 == self.coordinates.len())
    }
}
