//! Label-Texte mit größenabhängigen Einheiten.

/// Schwelle für Kilometer-Anzeige
const KM_THRESHOLD: f64 = 1000.0;
/// Schwelle für Quadratkilometer-Anzeige
const KM2_THRESHOLD: f64 = 1_000_000.0;

/// Formatiert eine Länge: < 1 → cm, 1–1000 → m, ≥ 1000 → km.
pub fn format_distance(meters: f64) -> String {
    let meters = meters.abs();
    if meters < 1.0 {
        format!("{:.2} cm", meters * 100.0)
    } else if meters < KM_THRESHOLD {
        format!("{:.2} m", meters)
    } else {
        format!("{:.2} km", meters / KM_THRESHOLD)
    }
}

/// Formatiert eine Fläche: < 1 → cm², 1–1.000.000 → m², ≥ 1.000.000 → km².
pub fn format_area(square_meters: f64) -> String {
    let area = square_meters.abs();
    if area < 1.0 {
        format!("{:.2} cm²", area * 10_000.0)
    } else if area < KM2_THRESHOLD {
        format!("{:.2} m²", area)
    } else {
        format!("{:.2} km²", area / KM2_THRESHOLD)
    }
}
