//! Feature-Handler für MeasureCommand-Verarbeitung.
//!
//! Jeder Handler gruppiert die Command-Ausführung eines Feature-Bereichs.
//! Der Controller dispatcht an die passende Handler-Funktion.

pub mod confirmation;
pub mod editing;
pub mod mode;
