//! Engine State — zentrale Datenhaltung der Mess-Engine.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use glam::DVec3;
use indexmap::IndexMap;

use super::drag::DragController;
use super::events::ConfirmAction;
use super::session::CoordinateSession;
use super::visuals::{PrimitiveTable, VisualIndex};
use super::CommandLog;
use crate::core::{Measure, MeasureId, MeasureMode, PointIndex};
use crate::shared::MeasureOptions;

/// Aktiver Einfüge-Modus für genau eine abgeschlossene Messung
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddModeState {
    /// Messung, in deren Segmente eingefügt wird
    pub measure_id: MeasureId,
}

/// Offene Bestätigungsanfrage an den Host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingConfirmation {
    /// Ticket, mit dem der Host antwortet
    pub ticket: u64,
    /// Angefragte Aktion
    pub action: ConfirmAction,
    /// Betroffene Messung
    pub measure_id: MeasureId,
    /// State-Generation zum Zeitpunkt der Anfrage
    pub generation: u64,
}

/// Gesamter Engine-Zustand
pub struct MeasureState {
    /// Aktiver Messmodus
    pub active_mode: MeasureMode,
    /// Engine aktiv (deaktiviert: alle Eingaben werden verworfen)
    pub enabled: bool,
    /// Laufzeit-Optionen
    pub options: MeasureOptions,
    /// Alle bekannten Messungen (Einfüge-Reihenfolge)
    pub measures: IndexMap<MeasureId, Measure>,
    /// Primitive je Messung
    pub visuals: VisualIndex,
    /// Status/Positionen je Primitiv
    pub primitives: PrimitiveTable,
    /// Zustandsmaschine für Punkt-Platzierung
    pub session: CoordinateSession,
    /// Zustandsmaschine für Drag-Bearbeitung
    pub drag: DragController,
    /// Aktiver Einfüge-Modus
    pub add_mode: Option<AddModeState>,
    /// Offene Bestätigungsanfrage
    pub pending_confirmation: Option<PendingConfirmation>,
    /// Log aller ausgeführten Commands
    pub command_log: CommandLog,
    /// Wird bei jeder Mutation einer Messung erhöht
    pub generation: u64,
    point_index: PointIndex,
    point_index_key: Option<(u64, MeasureMode)>,
    next_measure_id: MeasureId,
    next_ticket: u64,
    label_counters: HashMap<MeasureMode, u32>,
}

impl Default for MeasureState {
    fn default() -> Self {
        Self::new()
    }
}

impl MeasureState {
    /// Erstellt einen Zustand mit Standard-Optionen.
    pub fn new() -> Self {
        Self::with_options(MeasureOptions::default())
    }

    /// Erstellt einen Zustand; Mess-IDs starten beim aktuellen Zeitstempel (ms).
    pub fn with_options(options: MeasureOptions) -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(1);
        Self::with_id_seed(options, seed)
    }

    /// Erstellt einen Zustand mit fester Start-ID (deterministisch für Tests und Replays).
    pub fn with_id_seed(options: MeasureOptions, seed: MeasureId) -> Self {
        Self {
            active_mode: MeasureMode::default(),
            enabled: true,
            options,
            measures: IndexMap::new(),
            visuals: VisualIndex::new(),
            primitives: PrimitiveTable::new(),
            session: CoordinateSession::new(),
            drag: DragController::new(),
            add_mode: None,
            pending_confirmation: None,
            command_log: CommandLog::new(),
            generation: 0,
            point_index: PointIndex::empty(),
            point_index_key: None,
            next_measure_id: seed,
            next_ticket: 1,
            label_counters: HashMap::new(),
        }
    }

    /// Vergibt eine neue, noch unbenutzte Mess-ID.
    pub fn allocate_measure_id(&mut self) -> MeasureId {
        while self.measures.contains_key(&self.next_measure_id) {
            self.next_measure_id += 1;
        }
        let id = self.next_measure_id;
        self.next_measure_id += 1;
        id
    }

    /// Nächste laufende Anzeige-Nummer für einen Modus (beginnt bei 1).
    pub fn next_label_index(&mut self, mode: MeasureMode) -> u32 {
        let counter = self.label_counters.entry(mode).or_insert(1);
        let index = *counter;
        *counter += 1;
        index
    }

    /// Stellt sicher, dass neue Nummern nach `label_index` vergeben werden.
    pub fn reserve_label_index(&mut self, mode: MeasureMode, label_index: u32) {
        let counter = self.label_counters.entry(mode).or_insert(1);
        *counter = (*counter).max(label_index.saturating_add(1));
    }

    /// Vergibt ein neues Bestätigungs-Ticket.
    pub fn allocate_ticket(&mut self) -> u64 {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        ticket
    }

    /// Markiert eine Mutation (invalidiert Punkt-Index und offene Bestätigungen).
    pub fn touch(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    /// Markiert das Platzieren eines Punkts.
    ///
    /// Ist der Punkt-Index für `mode` aktuell, wird der Punkt direkt eingefügt
    /// statt den Index bei der nächsten Abfrage neu aufzubauen.
    pub fn record_placement(&mut self, mode: MeasureMode, measure_id: MeasureId, position: DVec3) {
        let current = self.point_index_key == Some((self.generation, mode));
        self.touch();
        if current {
            self.point_index.insert(measure_id, position);
            self.point_index_key = Some((self.generation, mode));
        }
    }

    /// Punkt-Index über alle Messungen eines Modus (lazy neu aufgebaut).
    pub fn point_index(&mut self, mode: MeasureMode) -> &PointIndex {
        let key = (self.generation, mode);
        if self.point_index_key != Some(key) {
            self.point_index =
                PointIndex::from_measures(self.measures.values().filter(|m| m.mode == mode));
            self.point_index_key = Some(key);
        }
        &self.point_index
    }

    /// Abgeschlossene Messung des aktiven Modus.
    pub fn completed_measure(&self, id: MeasureId) -> Option<&Measure> {
        self.measures
            .get(&id)
            .filter(|m| m.is_completed() && m.mode == self.active_mode)
    }

    /// Messungen eines Modus.
    pub fn measures_of_mode(&self, mode: MeasureMode) -> impl Iterator<Item = &Measure> {
        self.measures.values().filter(move |m| m.mode == mode)
    }
}
