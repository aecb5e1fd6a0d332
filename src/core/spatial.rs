//! Spatial-Index (KD-Tree) über alle platzierten Messpunkte eines Modus.

use glam::DVec3;
use kiddo::{KdTree, SquaredEuclidean};

use super::{Measure, MeasureId};

/// Ergebnis einer Distanzabfrage gegen den Punkt-Index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointMatch {
    /// Messung, zu der der Punkt gehört
    pub measure_id: MeasureId,
    /// Position des gefundenen Punkts
    pub position: DVec3,
    /// Euklidische Distanz zum Suchpunkt
    pub distance: f64,
}

/// Read-only Index über Messpunkte.
#[derive(Debug, Clone)]
pub struct PointIndex {
    tree: KdTree<f64, 3>,
    entries: Vec<(MeasureId, DVec3)>,
}

impl Default for PointIndex {
    fn default() -> Self {
        Self::empty()
    }
}

impl PointIndex {
    /// Erstellt einen leeren Index.
    pub fn empty() -> Self {
        Self {
            tree: (&Vec::<[f64; 3]>::new()).into(),
            entries: Vec::new(),
        }
    }

    /// Baut den Index aus den übergebenen Messungen (Schließpunkte nur einmal).
    pub fn from_measures<'a>(measures: impl IntoIterator<Item = &'a Measure>) -> Self {
        let entries: Vec<(MeasureId, DVec3)> = measures
            .into_iter()
            .flat_map(|m| m.distinct_coordinates().iter().map(move |c| (m.id, *c)))
            .collect();

        let points: Vec<[f64; 3]> = entries.iter().map(|(_, p)| p.to_array()).collect();
        let tree: KdTree<f64, 3> = (&points).into();

        Self { tree, entries }
    }

    /// Fügt einen einzelnen Punkt hinzu, ohne den Baum neu aufzubauen.
    pub fn insert(&mut self, measure_id: MeasureId, position: DVec3) {
        self.tree.add(&position.to_array(), self.entries.len() as u64);
        self.entries.push((measure_id, position));
    }

    /// Anzahl indexierter Punkte.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Gibt `true` zurück, wenn keine Punkte im Index liegen.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Findet den nächsten Punkt zur Weltposition.
    pub fn nearest(&self, query: DVec3) -> Option<PointMatch> {
        if self.is_empty() {
            return None;
        }
        let result = self
            .tree
            .nearest_one::<SquaredEuclidean>(&query.to_array());
        let (measure_id, position) = *self.entries.get(result.item as usize)?;
        Some(PointMatch {
            measure_id,
            position,
            distance: result.distance.sqrt(),
        })
    }

    /// Findet alle Punkte innerhalb eines Radius (aufsteigend nach Distanz).
    pub fn within_radius(&self, query: DVec3, radius: f64) -> Vec<PointMatch> {
        if self.is_empty() || radius.is_sign_negative() {
            return Vec::new();
        }

        let mut results = self
            .tree
            .within::<SquaredEuclidean>(&query.to_array(), radius * radius)
            .into_iter()
            .filter_map(|entry| {
                let (measure_id, position) = *self.entries.get(entry.item as usize)?;
                Some(PointMatch {
                    measure_id,
                    position,
                    distance: entry.distance.sqrt(),
                })
            })
            .collect::<Vec<_>>();

        results.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        results
    }

    /// Liegt ein Punkt näher als `epsilon` an `query`?
    pub fn has_point_within(&self, query: DVec3, epsilon: f64) -> bool {
        self.nearest(query).is_some_and(|hit| hit.distance < epsilon)
    }
}
