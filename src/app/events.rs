//! Eingabe-Events (Intents), Engine-Commands und Rückmeldungen.
//!
//! Intents sind normalisierte Eingaben der Host-Oberfläche ohne Mutationslogik.
//! Das Intent-Mapping übersetzt sie anhand des Zustands in Commands, die der
//! Controller ausführt. Rückmeldungen gehen als Rückgabewert an den Host.

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

use crate::core::{FeatureId, MeasureFilter, MeasureId, MeasureMode};
use crate::scene::PrimitiveId;

/// Art eines Eingabe-Events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    /// Klick (Pointer gedrückt und ohne Drag losgelassen)
    Click,
    /// Pointer-Bewegung ohne gedrückte Taste
    Move,
    /// Pointer gedrückt (möglicher Drag-Beginn)
    DragStart,
    /// Pointer mit gedrückter Taste bewegt
    DragMove,
    /// Pointer losgelassen
    DragEnd,
}

/// Maustaste eines Klicks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerButton {
    /// Linke Taste
    #[default]
    Primary,
    /// Rechte Taste
    Secondary,
    /// Mittlere Taste
    Middle,
}

/// Ein von der Oberfläche gepicktes Feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickedFeature {
    /// Opake Feature-ID `<namespace>_<mode>_<type>_<measureId>`
    pub id: String,
    /// Handle des gepickten Primitivs, falls die Oberfläche es mitliefert
    #[serde(default)]
    pub primitive: Option<PrimitiveId>,
}

impl PickedFeature {
    /// Feature ohne Handle.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            primitive: None,
        }
    }

    /// Parst die Feature-ID (fremde oder ungültige IDs ergeben `None`).
    pub fn parsed(&self) -> Option<FeatureId> {
        FeatureId::parse(&self.id)
    }
}

/// Normalisiertes Eingabe-Event der Host-Oberfläche
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputEvent {
    /// Art des Events
    pub kind: InputKind,
    /// Maustaste (nur für Klicks relevant)
    #[serde(default)]
    pub button: PointerButton,
    /// Weltposition unter dem Pointer (fehlt, wenn nichts pickbar war)
    #[serde(default)]
    pub world_point: Option<DVec3>,
    /// Bildschirmposition in Pixeln
    #[serde(default)]
    pub screen_point: DVec2,
    /// Gepickte Features, vorderstes zuerst
    #[serde(default)]
    pub picked_features: Vec<PickedFeature>,
}

impl InputEvent {
    /// Erstellt ein Event ohne Picks.
    pub fn new(kind: InputKind, world_point: Option<DVec3>, screen_point: DVec2) -> Self {
        Self {
            kind,
            button: PointerButton::Primary,
            world_point,
            screen_point,
            picked_features: Vec::new(),
        }
    }

    /// Linksklick an einer Weltposition.
    pub fn click(world_point: DVec3) -> Self {
        Self::new(InputKind::Click, Some(world_point), DVec2::ZERO)
    }

    /// Setzt die Maustaste.
    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }

    /// Hängt ein gepicktes Feature an.
    pub fn with_pick(mut self, feature: PickedFeature) -> Self {
        self.picked_features.push(feature);
        self
    }
}

/// Aktion, die eine Bestätigung durch den Nutzer benötigt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmAction {
    /// Einfüge-Modus für eine abgeschlossene Messung betreten
    EnterAddMode,
    /// Ganze Messung (Linienzug) löschen
    RemoveMeasure,
}

/// Mutierende Commands der Engine
#[derive(Debug, Clone, PartialEq)]
pub enum MeasureCommand {
    /// Punkt platzieren (neue Messung oder Fortsetzung)
    PlacePoint { position: DVec3 },
    /// Messung abschließen, optional mit letztem Punkt an der Pointer-Position
    Finalize { position: Option<DVec3> },
    /// Abgeschlossene Messung an einem Endpunkt fortsetzen
    Resume { measure_id: MeasureId, position: DVec3 },
    /// Vorschau-Segment zur Pointer-Position aktualisieren
    UpdatePreview { position: DVec3 },
    /// Punkt in ein Segment einfügen (Einfüge-Modus)
    InsertPoint {
        measure_id: MeasureId,
        line: Option<PrimitiveId>,
        position: DVec3,
    },
    /// Punkt einer abgeschlossenen Messung entfernen
    RemovePoint { measure_id: MeasureId, position: DVec3 },
    /// Bestätigung für den Einfüge-Modus anfordern
    RequestAddMode { measure_id: MeasureId },
    /// Bestätigung für das Löschen einer Messung anfordern
    RequestRemoveMeasure { measure_id: MeasureId },
    /// Antwort auf eine Bestätigungsanfrage
    ResolveConfirmation { ticket: u64, accepted: bool },
    /// Einfüge-Modus verlassen
    ExitAddMode,
    /// Pointer auf einem abgeschlossenen Punkt gedrückt
    DragBegin {
        measure_id: MeasureId,
        position: DVec3,
        screen: DVec2,
    },
    /// Pointer mit gedrückter Taste bewegt
    DragMove { position: Option<DVec3>, screen: DVec2 },
    /// Pointer losgelassen
    DragEnd { position: Option<DVec3>, screen: DVec2 },
    /// Abgeschlossene Messungen aus der Registry übernehmen
    RestoreFromRegistry { filter: MeasureFilter },
    /// Modus wechseln (bricht laufende Eingaben ab)
    SetMode { mode: MeasureMode },
    /// Engine deaktivieren (bricht laufende Eingaben ab)
    Deactivate,
}

/// Rückmeldung an den Host (ersetzt einen globalen Event-Bus)
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// Punkt lag zu nah an einem bestehenden Punkt und wurde verworfen
    NearExistingPoint { position: DVec3 },
    /// Messung wurde in die Registry geschrieben
    MeasureUpdated { id: MeasureId },
    /// Messung wurde aus der Registry entfernt
    MeasureRemoved { id: MeasureId },
    /// Host soll den Nutzer fragen und mit `ResolveConfirmation` antworten
    ConfirmationRequested {
        ticket: u64,
        action: ConfirmAction,
        measure_id: MeasureId,
    },
    /// Einfüge-Modus aktiv
    AddModeEntered { measure_id: MeasureId },
    /// Einfüge-Modus beendet
    AddModeExited,
}
