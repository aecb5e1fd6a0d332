//! Lokal behandelte Ablehnungen von Bearbeitungsschritten.
//!
//! Keine dieser Ablehnungen ist fatal: der Controller protokolliert sie und
//! verarbeitet das nächste Event normal weiter.

use thiserror::Error;

use crate::core::MeasureId;

/// Grund, aus dem ein Bearbeitungsschritt nicht ausgeführt wurde.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditRejection {
    /// Fehlende Weltposition oder unbekanntes Feature
    #[error("ungültige Eingabe: {0}")]
    InputInvalid(&'static str),
    /// Messung oder Punkt nicht gefunden
    #[error("nicht gefunden: {what} (Messung {measure_id:?})")]
    LookupMiss {
        /// Was gesucht wurde
        what: &'static str,
        /// Betroffene Messung, falls bekannt
        measure_id: Option<MeasureId>,
    },
    /// Degenerierte Geometrie (Null-Segment, zu wenige Punkte)
    #[error("degenerierte Geometrie: {0}")]
    GeometryDegenerate(&'static str),
    /// Nutzer hat die Bestätigung abgelehnt
    #[error("Bestätigung abgelehnt")]
    ConfirmationDeclined,
}

impl EditRejection {
    /// Kurzform für `LookupMiss` mit bekannter Messung.
    pub fn missing(what: &'static str, measure_id: MeasureId) -> Self {
        Self::LookupMiss {
            what,
            measure_id: Some(measure_id),
        }
    }

    /// Soll die Ablehnung als Warnung (statt Debug) protokolliert werden?
    pub fn is_warning(&self) -> bool {
        matches!(self, EditRejection::LookupMiss { .. })
    }
}

/// Ergebnis eines Bearbeitungsschritts
pub type EditResult<T = ()> = Result<T, EditRejection>;
