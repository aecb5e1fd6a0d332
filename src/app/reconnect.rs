//! ReconnectionResolver: minimale Neuverbindung beim Einfügen und Entfernen von Punkten.
//!
//! Jede Operation spliced `coordinates`, `records.distances`,
//! `interpolated_points` und die Segment-Handles an denselben Positionen,
//! sodass `distances.len() == coordinates.len() - 1` direkt danach gilt.
//! Unberührte Segmente bleiben bestehen.

use glam::DVec3;

use super::rejection::{EditRejection, EditResult};
use super::segment_sync::SegmentSynchronizer;
use super::visuals::{FeatureOwner, MeasureVisuals, PrimitiveStatus, SegmentHandles};
use crate::core::{geometry, Measure};
use crate::scene::PrimitiveId;

/// Ergebnis einer Punkt-Entfernung
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalOutcome {
    /// Punkt entfernt, Nachbarn verbunden
    Reconnected,
    /// Punkt entfernt, Umfang hatte nur noch drei Positionen und ist jetzt offen
    ClosureDropped,
    /// Es bliebe höchstens ein Punkt übrig: die ganze Messung ist zu löschen
    MeasureEmptied,
}

/// Findet das Segment zu einer gepickten Linie, sonst das nächstgelegene Segment.
pub fn locate_segment(
    measure: &Measure,
    visuals: Option<&MeasureVisuals>,
    line: Option<PrimitiveId>,
    position: DVec3,
) -> Option<usize> {
    let by_handle = line.zip(visuals).and_then(|(line, v)| v.segment_of_line(line));
    if by_handle.is_some() {
        return by_handle;
    }
    (0..measure.segment_count())
        .filter_map(|segment| {
            let (start, end) = measure.segment_endpoints(segment)?;
            Some((segment, geometry::distance_to_segment(position, start, end)))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(segment, _)| segment)
}

/// Ersetzt die Segmente `(i-1, i)` und `(i, i+1)` durch ein Segment `(i-1, i+1)`
/// und entfernt Koordinate `i`.
fn bridge(
    sync: &mut SegmentSynchronizer<'_>,
    measure: &mut Measure,
    visuals: &mut MeasureVisuals,
    index: usize,
) {
    let (prev, next) = (measure.coordinates[index - 1], measure.coordinates[index + 1]);
    let measurement = sync.measure(prev, next, measure.mode.metric());
    let handles = sync.create_segment(
        FeatureOwner::of(measure),
        prev,
        next,
        PrimitiveStatus::Completed,
        &measurement,
    );

    let replaced: Vec<SegmentHandles> = visuals
        .segments
        .splice(index - 1..=index, [handles])
        .collect();
    for old in replaced {
        sync.remove_segment(old);
    }
    measure
        .records
        .distances
        .splice(index - 1..=index, [measurement.distance]);
    measure
        .interpolated_points
        .splice(index - 1..=index, [measurement.samples]);
    measure.coordinates.remove(index);
}

/// Entfernt das erste Segment samt erster Koordinate.
fn drop_first(
    sync: &mut SegmentSynchronizer<'_>,
    measure: &mut Measure,
    visuals: &mut MeasureVisuals,
) {
    if !visuals.segments.is_empty() {
        let handles = visuals.segments.remove(0);
        sync.remove_segment(handles);
    }
    measure.records.distances.remove(0);
    measure.interpolated_points.remove(0);
    measure.coordinates.remove(0);
}

/// Entfernt das letzte Segment samt letzter Koordinate.
fn drop_last(
    sync: &mut SegmentSynchronizer<'_>,
    measure: &mut Measure,
    visuals: &mut MeasureVisuals,
) {
    if let Some(handles) = visuals.segments.pop() {
        sync.remove_segment(handles);
    }
    measure.records.distances.pop();
    measure.interpolated_points.pop();
    measure.coordinates.pop();
}

fn remove_point_primitive(
    sync: &mut SegmentSynchronizer<'_>,
    visuals: &mut MeasureVisuals,
    index: usize,
) {
    if index < visuals.points.len() {
        let point = visuals.points.remove(index);
        sync.remove_primitive(point);
    }
}

/// Entfernt den gemeinsamen Start-/Endpunkt eines Umfangs und verbindet über
/// den Umbruch: neue Kante vom früheren Index `n-2` zum früheren Index 1.
fn remove_closing_point(
    sync: &mut SegmentSynchronizer<'_>,
    measure: &mut Measure,
    visuals: &mut MeasureVisuals,
) {
    drop_last(sync, measure, visuals);
    drop_first(sync, measure, visuals);
    if let Some(first) = measure.first() {
        measure.coordinates.push(first);
    }
    sync.append_segment(measure, visuals, PrimitiveStatus::Completed);
    remove_point_primitive(sync, visuals, 0);
}

/// Entfernt die Koordinate `index` einer abgeschlossenen Messung.
///
/// Bleibt höchstens ein Punkt übrig, wird nichts verändert und
/// `MeasureEmptied` gemeldet; der Aufrufer löscht dann die ganze Messung.
pub fn remove_point(
    sync: &mut SegmentSynchronizer<'_>,
    measure: &mut Measure,
    visuals: &mut MeasureVisuals,
    index: usize,
) -> EditResult<RemovalOutcome> {
    let n = measure.coordinates.len();
    if index >= n {
        return Err(EditRejection::missing("Koordinate", measure.id));
    }
    if !measure.is_consistent() {
        return Err(EditRejection::GeometryDegenerate("Parallel-Listen inkonsistent"));
    }

    if measure.closed {
        if n < 4 {
            return Err(EditRejection::GeometryDegenerate("Umfang mit weniger als drei Punkten"));
        }
        if index == 0 || index == n - 1 {
            remove_closing_point(sync, measure, visuals);
        } else {
            bridge(sync, measure, visuals, index);
            remove_point_primitive(sync, visuals, index);
        }
    } else {
        if n <= 2 {
            return Ok(RemovalOutcome::MeasureEmptied);
        }
        if index == 0 {
            drop_first(sync, measure, visuals);
        } else if index == n - 1 {
            drop_last(sync, measure, visuals);
        } else {
            bridge(sync, measure, visuals, index);
        }
        remove_point_primitive(sync, visuals, index);
    }

    let mut outcome = RemovalOutcome::Reconnected;
    if measure.closed && measure.coordinates.len() == 3 {
        // Kein 2-Punkt-Umfang: Schließung aufgeben, Pfad bleibt erhalten.
        // Erster und letzter Punkt fallen zusammen (Hin- und Rückweg), daher
        // zwei deckungsgleiche Punkt-Primitive an derselben Position.
        measure.closed = false;
        if let Some(last) = measure.last() {
            let owner = FeatureOwner::of(measure);
            let point = sync.create_point(owner, last, PrimitiveStatus::Completed);
            visuals.points.push(point);
        }
        outcome = RemovalOutcome::ClosureDropped;
    }

    measure.recompute_total();
    sync.sync_total_label(measure, visuals, PrimitiveStatus::Completed);
    sync.sync_polygon(measure, visuals, PrimitiveStatus::Completed);
    Ok(outcome)
}

/// Fügt `position` in das Segment `segment` ein.
///
/// Das Originalsegment wird durch zwei neue ersetzt; gibt den neuen
/// Koordinaten-Index zurück.
pub fn insert_point(
    sync: &mut SegmentSynchronizer<'_>,
    measure: &mut Measure,
    visuals: &mut MeasureVisuals,
    segment: usize,
    position: DVec3,
    min_spacing: f64,
) -> EditResult<usize> {
    if measure
        .mode
        .max_points()
        .is_some_and(|max| measure.coordinates.len() >= max)
    {
        return Err(EditRejection::GeometryDegenerate(
            "Messung hat bereits die feste Punktanzahl",
        ));
    }
    let (start, end) = measure
        .segment_endpoints(segment)
        .ok_or(EditRejection::missing("Segment", measure.id))?;
    if position.distance(start) < min_spacing || position.distance(end) < min_spacing {
        return Err(EditRejection::GeometryDegenerate(
            "Einfügepunkt liegt auf einem Segment-Endpunkt",
        ));
    }
    if !measure.is_consistent() {
        return Err(EditRejection::GeometryDegenerate("Parallel-Listen inkonsistent"));
    }

    let owner = FeatureOwner::of(measure);
    let metric = measure.mode.metric();
    let first = sync.measure(start, position, metric);
    let second = sync.measure(position, end, metric);
    let first_handles =
        sync.create_segment(owner, start, position, PrimitiveStatus::Completed, &first);
    let second_handles =
        sync.create_segment(owner, position, end, PrimitiveStatus::Completed, &second);

    let replaced: Vec<SegmentHandles> = visuals
        .segments
        .splice(segment..=segment, [first_handles, second_handles])
        .collect();
    for old in replaced {
        sync.remove_segment(old);
    }
    measure
        .records
        .distances
        .splice(segment..=segment, [first.distance, second.distance]);
    measure
        .interpolated_points
        .splice(segment..=segment, [first.samples, second.samples]);

    let index = segment + 1;
    measure.coordinates.insert(index, position);
    let point = sync.create_point(owner, position, PrimitiveStatus::Completed);
    visuals.points.insert(index.min(visuals.points.len()), point);

    measure.recompute_total();
    sync.sync_total_label(measure, visuals, PrimitiveStatus::Completed);
    sync.sync_polygon(measure, visuals, PrimitiveStatus::Completed);
    Ok(index)
}
