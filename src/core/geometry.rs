//! Rein-mathematische Segment- und Polygon-Hilfen (ohne Terrain-Abhängigkeit).

use glam::DVec3;

/// Interpoliert Punkte entlang eines Segments im Abstand `spacing` (inkl. Start und Ende).
///
/// Die Anzahl der Teilstücke wird auf `max_points - 1` begrenzt.
pub fn interpolate_segment(
    start: DVec3,
    end: DVec3,
    spacing: f64,
    max_points: usize,
) -> Vec<DVec3> {
    let length = start.distance(end);
    if length <= f64::EPSILON || spacing <= 0.0 {
        return vec![start, end];
    }

    let max_steps = max_points.max(2) - 1;
    let steps = ((length / spacing).ceil() as usize).clamp(1, max_steps);

    (0..=steps)
        .map(|i| start.lerp(end, i as f64 / steps as f64))
        .collect()
}

/// Summe der Abstände aufeinanderfolgender Punkte.
pub fn path_length(points: &[DVec3]) -> f64 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Fläche eines (nicht zwingend ebenen) Polygons nach Newell.
///
/// `points` enthält jeden Eckpunkt genau einmal; das Polygon wird implizit geschlossen.
pub fn polygon_area(points: &[DVec3]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let normal = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .fold(DVec3::ZERO, |acc, (a, b)| acc + a.cross(*b));
    normal.length() * 0.5
}

/// Schwerpunkt der Eckpunkte.
pub fn centroid(points: &[DVec3]) -> Option<DVec3> {
    if points.is_empty() {
        return None;
    }
    let sum = points.iter().fold(DVec3::ZERO, |acc, p| acc + *p);
    Some(sum / points.len() as f64)
}

/// Mittelpunkt eines Segments (Label-Position).
pub fn midpoint(start: DVec3, end: DVec3) -> DVec3 {
    (start + end) * 0.5
}

/// Kürzester Abstand eines Punkts zu einem Segment.
pub fn distance_to_segment(point: DVec3, start: DVec3, end: DVec3) -> f64 {
    let delta = end - start;
    let len_sq = delta.length_squared();
    if len_sq <= f64::EPSILON {
        return point.distance(start);
    }
    let t = ((point - start).dot(delta) / len_sq).clamp(0.0, 1.0);
    point.distance(start + delta * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_interpolation_enthaelt_endpunkte() {
        let points = interpolate_segment(DVec3::ZERO, DVec3::new(10.0, 0.0, 0.0), 3.0, 100);
        assert_eq!(points.len(), 5);
        assert_eq!(points[0], DVec3::ZERO);
        assert_eq!(points[4], DVec3::new(10.0, 0.0, 0.0));
        assert_relative_eq!(path_length(&points), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_interpolation_begrenzt_punktanzahl() {
        let points = interpolate_segment(DVec3::ZERO, DVec3::new(1000.0, 0.0, 0.0), 2.0, 11);
        assert_eq!(points.len(), 11);
    }

    #[test]
    fn test_polygon_area_quadrat() {
        let square = [
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(10.0, 0.0, 0.0),
            DVec3::new(10.0, 10.0, 0.0),
            DVec3::new(0.0, 10.0, 0.0),
        ];
        assert_relative_eq!(polygon_area(&square), 100.0, epsilon = 1e-9);
        assert_relative_eq!(polygon_area(&square[..2]), 0.0);
    }

    #[test]
    fn test_distance_to_segment() {
        let d = distance_to_segment(
            DVec3::new(5.0, 3.0, 0.0),
            DVec3::ZERO,
            DVec3::new(10.0, 0.0, 0.0),
        );
        assert_relative_eq!(d, 3.0);
        let beyond = distance_to_segment(
            DVec3::new(13.0, 4.0, 0.0),
            DVec3::ZERO,
            DVec3::new(10.0, 0.0, 0.0),
        );
        assert_relative_eq!(beyond, 5.0);
    }
}
