//! Seitentabelle der Render-Primitive (Status + Positionen je Handle) und
//! ID-indizierte Zuordnung Messung → Punkte/Segmente/Labels.
//!
//! Die Tabellen sind transient und gelten nur für die aktuelle Session.
//! Die Render-Oberfläche kennt weder Status noch Positionen; beides führt
//! ausschließlich die Engine hier.

use std::collections::HashMap;

use glam::DVec3;

use crate::core::{FeatureId, FeatureKind, Measure, MeasureId, MeasureMode, MeasureStatus};
use crate::scene::PrimitiveId;

/// Bearbeitungsstatus eines Primitivs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveStatus {
    /// Gehört zu einer Messung in Bearbeitung
    Pending,
    /// Vorschau oder Drag, wird pro Pointer-Tick neu aufgebaut
    Moving,
    /// Gehört zu einer abgeschlossenen Messung
    Completed,
}

impl From<MeasureStatus> for PrimitiveStatus {
    fn from(status: MeasureStatus) -> Self {
        match status {
            MeasureStatus::Pending => PrimitiveStatus::Pending,
            MeasureStatus::Completed => PrimitiveStatus::Completed,
        }
    }
}

/// Besitzer eines Primitivs (Messung + Modus), liefert die Feature-IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureOwner {
    /// Besitzende Messung
    pub measure_id: MeasureId,
    /// Modus der Messung
    pub mode: MeasureMode,
}

impl FeatureOwner {
    /// Besitzer aus einer Messung.
    pub fn of(measure: &Measure) -> Self {
        Self {
            measure_id: measure.id,
            mode: measure.mode,
        }
    }

    /// Feature-ID-String für ein Primitiv dieser Messung.
    pub fn feature_id(&self, kind: FeatureKind) -> String {
        FeatureId::new(self.mode, kind, self.measure_id).to_string()
    }
}

/// Engine-seitige Metadaten eines Primitivs
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveMeta {
    /// Besitzende Messung
    pub measure_id: MeasureId,
    /// Art des Primitivs
    pub kind: FeatureKind,
    /// Aktueller Status
    pub status: PrimitiveStatus,
    /// Positionen, die das Primitiv darstellt (Segment: Start und Ende)
    pub positions: Vec<DVec3>,
}

/// Seitentabelle: Primitiv-Handle → Metadaten.
#[derive(Debug, Clone, Default)]
pub struct PrimitiveTable {
    entries: HashMap<PrimitiveId, PrimitiveMeta>,
}

impl PrimitiveTable {
    /// Erstellt eine leere Tabelle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registriert ein Primitiv (ersetzt vorhandene Metadaten).
    pub fn insert(&mut self, id: PrimitiveId, meta: PrimitiveMeta) {
        self.entries.insert(id, meta);
    }

    /// Entfernt ein Primitiv aus der Tabelle.
    pub fn remove(&mut self, id: PrimitiveId) -> Option<PrimitiveMeta> {
        self.entries.remove(&id)
    }

    /// Metadaten eines Primitivs.
    pub fn get(&self, id: PrimitiveId) -> Option<&PrimitiveMeta> {
        self.entries.get(&id)
    }

    /// Setzt den Status eines Primitivs. Unbekannte Handles werden ignoriert.
    pub fn set_status(&mut self, id: PrimitiveId, status: PrimitiveStatus) {
        if let Some(meta) = self.entries.get_mut(&id) {
            meta.status = status;
        }
    }

    /// Ersetzt die Positionen eines Primitivs.
    pub fn set_positions(&mut self, id: PrimitiveId, positions: Vec<DVec3>) {
        if let Some(meta) = self.entries.get_mut(&id) {
            meta.positions = positions;
        }
    }

    /// Alle Handles mit dem angegebenen Status (aufsteigend sortiert).
    pub fn ids_with_status(&self, status: PrimitiveStatus) -> Vec<PrimitiveId> {
        let mut ids: Vec<PrimitiveId> = self
            .entries
            .iter()
            .filter(|(_, meta)| meta.status == status)
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Anzahl der Handles einer Messung.
    pub fn count_for_measure(&self, measure_id: MeasureId) -> usize {
        self.entries
            .values()
            .filter(|meta| meta.measure_id == measure_id)
            .count()
    }

    /// Anzahl registrierter Primitive.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Gibt `true` zurück, wenn keine Primitive registriert sind.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Linie und Label eines Segments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentHandles {
    /// Polyline
    pub line: PrimitiveId,
    /// Distanz-Label
    pub label: PrimitiveId,
}

/// Alle Primitive einer Messung.
///
/// `points` ist index-gleich mit den eindeutigen Koordinaten (der Schließpunkt
/// eines Umfangs teilt sich den Punkt mit Index 0), `segments` index-gleich mit
/// `records.distances`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasureVisuals {
    /// Punkt-Primitive
    pub points: Vec<PrimitiveId>,
    /// Segment-Primitive
    pub segments: Vec<SegmentHandles>,
    /// Summen-Label
    pub total_label: Option<PrimitiveId>,
    /// Flächen-Polygon
    pub polygon: Option<PrimitiveId>,
}

impl MeasureVisuals {
    /// Alle Handles dieser Messung.
    pub fn all_ids(&self) -> Vec<PrimitiveId> {
        let mut ids = self.points.clone();
        ids.extend(self.segments.iter().flat_map(|s| [s.line, s.label]));
        ids.extend(self.total_label);
        ids.extend(self.polygon);
        ids
    }

    /// Segment-Index einer Linie.
    pub fn segment_of_line(&self, line: PrimitiveId) -> Option<usize> {
        self.segments.iter().position(|s| s.line == line)
    }
}

/// Zuordnung Messung → Primitive.
#[derive(Debug, Clone, Default)]
pub struct VisualIndex {
    by_measure: HashMap<MeasureId, MeasureVisuals>,
}

impl VisualIndex {
    /// Erstellt einen leeren Index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Primitive einer Messung.
    pub fn get(&self, measure_id: MeasureId) -> Option<&MeasureVisuals> {
        self.by_measure.get(&measure_id)
    }

    /// Primitive einer Messung (mutabel, legt bei Bedarf einen leeren Eintrag an).
    pub fn entry(&mut self, measure_id: MeasureId) -> &mut MeasureVisuals {
        self.by_measure.entry(measure_id).or_default()
    }

    /// Entfernt den Eintrag einer Messung.
    pub fn remove(&mut self, measure_id: MeasureId) -> Option<MeasureVisuals> {
        self.by_measure.remove(&measure_id)
    }

    /// Anzahl der Messungen mit Primitiven.
    pub fn len(&self) -> usize {
        self.by_measure.len()
    }

    /// Gibt `true` zurück, wenn keine Messung Primitive hat.
    pub fn is_empty(&self) -> bool {
        self.by_measure.is_empty()
    }
}
