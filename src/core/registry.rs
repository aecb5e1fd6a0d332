//! MeasurementRegistry: Lese/Schreib-Vertrag des externen Mess-Speichers.
//!
//! Die Registry ist autoritativ für alle ausstehenden und abgeschlossenen
//! Messungen; nachgelagerte UI (Diagramm, Log-Tabelle) liest nach jedem
//! `upsert` neu aus ihr.

use anyhow::Result;
use indexmap::IndexMap;

use super::{Measure, MeasureId, MeasureMode, MeasureStatus};

/// Auswahl für `get_all`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeasureFilter {
    /// Alle Messungen
    #[default]
    All,
    /// Nur Messungen eines Modus
    Mode(MeasureMode),
    /// Nur Messungen mit einem Status
    Status(MeasureStatus),
}

impl MeasureFilter {
    /// Prüft ob eine Messung dem Filter entspricht.
    pub fn matches(&self, measure: &Measure) -> bool {
        match self {
            MeasureFilter::All => true,
            MeasureFilter::Mode(mode) => measure.mode == *mode,
            MeasureFilter::Status(status) => measure.status == *status,
        }
    }
}

/// Schlüssel-basierter Speicher für Messungen.
pub trait MeasurementRegistry {
    /// Messung per ID.
    fn get(&self, id: MeasureId) -> Option<&Measure>;

    /// Alle Messungen, die dem Filter entsprechen (in Einfüge-Reihenfolge).
    fn get_all(&self, filter: MeasureFilter) -> Vec<&Measure>;

    /// Fügt eine Messung ein oder ersetzt sie.
    fn upsert(&mut self, measure: Measure);

    /// Entfernt eine Messung; gibt sie zurück falls vorhanden.
    fn remove(&mut self, id: MeasureId) -> Option<Measure>;
}

/// In-Memory-Registry mit stabiler Einfüge-Reihenfolge.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistry {
    measures: IndexMap<MeasureId, Measure>,
    upsert_count: usize,
}

impl InMemoryRegistry {
    /// Erstellt eine leere Registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Anzahl gespeicherter Messungen.
    pub fn len(&self) -> usize {
        self.measures.len()
    }

    /// Gibt zurück ob die Registry leer ist.
    pub fn is_empty(&self) -> bool {
        self.measures.is_empty()
    }

    /// Anzahl aller bisherigen `upsert`-Aufrufe.
    pub fn upsert_count(&self) -> usize {
        self.upsert_count
    }

    /// Serialisiert alle Messungen als JSON-Array.
    pub fn to_json(&self) -> Result<String> {
        let all: Vec<&Measure> = self.measures.values().collect();
        Ok(serde_json::to_string_pretty(&all)?)
    }
}

impl MeasurementRegistry for InMemoryRegistry {
    fn get(&self, id: MeasureId) -> Option<&Measure> {
        self.measures.get(&id)
    }

    fn get_all(&self, filter: MeasureFilter) -> Vec<&Measure> {
        self.measures
            .values()
            .filter(|m| filter.matches(m))
            .collect()
    }

    fn upsert(&mut self, measure: Measure) {
        self.upsert_count += 1;
        self.measures.insert(measure.id, measure);
    }

    fn remove(&mut self, id: MeasureId) -> Option<Measure> {
        self.measures.shift_remove(&id)
    }
}
