//! Gemeinsam genutzte Typen: Laufzeit-Optionen.

pub mod options;

pub use options::MeasureOptions;
