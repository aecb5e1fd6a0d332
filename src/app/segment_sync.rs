//! SegmentSynchronizer: hält Linie, Label, Summen-Label und Polygon einer
//! Messung mit ihren Koordinaten und Segmentlängen konsistent.
//!
//! Pro Segment existiert genau eine Linie und genau ein Label. Linien-Geometrie
//! gilt als unveränderlich und wird bei jeder Änderung neu aufgebaut; Labels
//! werden an Ort und Stelle aktualisiert (kein Flackern).

use glam::DVec3;

use super::visuals::{
    FeatureOwner, MeasureVisuals, PrimitiveMeta, PrimitiveStatus, PrimitiveTable, SegmentHandles,
};
use crate::core::{
    format_area, format_distance, geometry, FeatureKind, Measure, SegmentMetric, TerrainSampler,
};
use crate::scene::{LineStyle, PointStyle, PrimitiveId, SceneSurface};
use crate::shared::MeasureOptions;

/// Ergebnis einer Segment-Messung
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentMeasurement {
    /// Segmentlänge (Bodenpfad, Sehne oder Höhendifferenz je nach Metrik)
    pub distance: f64,
    /// Interpolierte Bodenpunkte (inkl. Start und Ende)
    pub samples: Vec<DVec3>,
}

/// Misst ein Segment entlang des Geländes.
///
/// Interpoliert Punkte im Abstand `interpolation_spacing`, klemmt sie gebündelt
/// auf das Terrain und summiert die Teilstrecken. Ohne Terrain wird die gerade
/// Sehne verwendet. Die vertikale Metrik liefert den Betrag der Höhendifferenz.
pub fn measure_segment(
    terrain: &dyn TerrainSampler,
    options: &MeasureOptions,
    start: DVec3,
    end: DVec3,
    metric: SegmentMetric,
) -> SegmentMeasurement {
    let samples = geometry::interpolate_segment(
        start,
        end,
        options.interpolation_spacing,
        options.max_interpolated_points,
    );

    let (samples, ground) = match terrain.clamp_to_ground(&samples) {
        Some(clamped) => (clamped, true),
        None => (samples, false),
    };

    let distance = match metric {
        SegmentMetric::Vertical => (end.z - start.z).abs(),
        SegmentMetric::Ground if ground => geometry::path_length(&samples),
        SegmentMetric::Ground => start.distance(end),
    };

    SegmentMeasurement { distance, samples }
}

/// Position und Text des Summen-Labels.
///
/// Flächen stehen im Schwerpunkt, Längen am letzten Punkt.
fn total_label_content(measure: &Measure) -> Option<(DVec3, String)> {
    if measure.coordinates.len() < 2 {
        return None;
    }
    match measure.records.area {
        Some(area) => Some((
            geometry::centroid(measure.distinct_coordinates())?,
            format_area(area),
        )),
        None => Some((measure.last()?, format_distance(measure.records.total_distance))),
    }
}

fn line_style(status: PrimitiveStatus) -> LineStyle {
    match status {
        PrimitiveStatus::Moving => LineStyle::Dashed,
        PrimitiveStatus::Pending | PrimitiveStatus::Completed => LineStyle::Solid,
    }
}

/// Synchronisiert Primitive auf der Render-Oberfläche mit einer Messung.
pub struct SegmentSynchronizer<'a> {
    surface: &'a mut dyn SceneSurface,
    terrain: &'a dyn TerrainSampler,
    primitives: &'a mut PrimitiveTable,
    options: &'a MeasureOptions,
}

impl<'a> SegmentSynchronizer<'a> {
    /// Erstellt einen Synchronizer für einen Bearbeitungsschritt.
    pub fn new(
        surface: &'a mut dyn SceneSurface,
        terrain: &'a dyn TerrainSampler,
        primitives: &'a mut PrimitiveTable,
        options: &'a MeasureOptions,
    ) -> Self {
        Self {
            surface,
            terrain,
            primitives,
            options,
        }
    }

    /// Misst ein Segment mit dem Terrain dieses Synchronizers.
    pub fn measure(&self, start: DVec3, end: DVec3, metric: SegmentMetric) -> SegmentMeasurement {
        measure_segment(self.terrain, self.options, start, end, metric)
    }

    fn register(
        &mut self,
        id: PrimitiveId,
        owner: FeatureOwner,
        kind: FeatureKind,
        status: PrimitiveStatus,
        positions: Vec<DVec3>,
    ) {
        self.primitives.insert(
            id,
            PrimitiveMeta {
                measure_id: owner.measure_id,
                kind,
                status,
                positions,
            },
        );
    }

    fn show_background(&self, status: PrimitiveStatus) -> bool {
        self.options.label_background && status != PrimitiveStatus::Moving
    }

    fn add_line(
        &mut self,
        owner: FeatureOwner,
        start: DVec3,
        end: DVec3,
        status: PrimitiveStatus,
        samples: &[DVec3],
    ) -> PrimitiveId {
        let line = self
            .surface
            .add_polyline(&owner.feature_id(FeatureKind::Line), samples, line_style(status));
        self.register(line, owner, FeatureKind::Line, status, vec![start, end]);
        line
    }

    /// Erstellt Linie und Label eines Segments.
    pub fn create_segment(
        &mut self,
        owner: FeatureOwner,
        start: DVec3,
        end: DVec3,
        status: PrimitiveStatus,
        measurement: &SegmentMeasurement,
    ) -> SegmentHandles {
        let line = self.add_line(owner, start, end, status, &measurement.samples);
        let label = self.surface.add_label(
            &owner.feature_id(FeatureKind::Label),
            geometry::midpoint(start, end),
            &format_distance(measurement.distance),
            self.show_background(status),
        );
        self.register(label, owner, FeatureKind::Label, status, vec![start, end]);
        SegmentHandles { line, label }
    }

    /// Baut die Linie eines Segments neu auf und aktualisiert das Label in place.
    pub fn refresh_segment(
        &mut self,
        owner: FeatureOwner,
        handles: &mut SegmentHandles,
        start: DVec3,
        end: DVec3,
        status: PrimitiveStatus,
        measurement: &SegmentMeasurement,
    ) {
        self.remove_primitive(handles.line);
        handles.line = self.add_line(owner, start, end, status, &measurement.samples);
        self.update_label(handles.label, start, end, measurement.distance, status);
    }

    /// Aktualisiert ein Segment-Label (Position, Text, Hintergrund).
    pub fn update_label(
        &mut self,
        label: PrimitiveId,
        start: DVec3,
        end: DVec3,
        distance: f64,
        status: PrimitiveStatus,
    ) {
        self.surface.update_label(
            label,
            geometry::midpoint(start, end),
            &format_distance(distance),
            self.show_background(status),
        );
        self.primitives.set_positions(label, vec![start, end]);
        self.primitives.set_status(label, status);
    }

    /// Entfernt Linie und Label eines Segments.
    pub fn remove_segment(&mut self, handles: SegmentHandles) {
        self.remove_primitive(handles.line);
        self.remove_primitive(handles.label);
    }

    /// Entfernt ein einzelnes Primitiv von Oberfläche und Seitentabelle.
    pub fn remove_primitive(&mut self, id: PrimitiveId) {
        if !self.surface.remove(id) {
            log::debug!("Primitiv {} war auf der Oberfläche nicht mehr vorhanden", id);
        }
        self.primitives.remove(id);
    }

    /// Erstellt ein Punkt-Primitiv.
    pub fn create_point(
        &mut self,
        owner: FeatureOwner,
        position: DVec3,
        status: PrimitiveStatus,
    ) -> PrimitiveId {
        let id = self.surface.add_point(
            &owner.feature_id(FeatureKind::Point),
            position,
            PointStyle::Default,
        );
        self.register(id, owner, FeatureKind::Point, status, vec![position]);
        id
    }

    /// Verschiebt ein Punkt-Primitiv und setzt seine Darstellung.
    pub fn move_point(&mut self, id: PrimitiveId, position: DVec3, style: PointStyle) {
        self.surface.update_point(id, position, style);
        self.primitives.set_positions(id, vec![position]);
    }

    /// Hängt das Segment zwischen den letzten beiden Koordinaten an.
    pub fn append_segment(
        &mut self,
        measure: &mut Measure,
        visuals: &mut MeasureVisuals,
        status: PrimitiveStatus,
    ) {
        let n = measure.coordinates.len();
        if n < 2 {
            return;
        }
        let (start, end) = (measure.coordinates[n - 2], measure.coordinates[n - 1]);
        let measurement = self.measure(start, end, measure.mode.metric());
        let owner = FeatureOwner::of(measure);
        let handles = self.create_segment(owner, start, end, status, &measurement);
        measure.records.distances.push(measurement.distance);
        measure.interpolated_points.push(measurement.samples);
        visuals.segments.push(handles);
    }

    /// Stellt das Segment zwischen den ersten beiden Koordinaten voran.
    pub fn prepend_segment(
        &mut self,
        measure: &mut Measure,
        visuals: &mut MeasureVisuals,
        status: PrimitiveStatus,
    ) {
        if measure.coordinates.len() < 2 {
            return;
        }
        let (start, end) = (measure.coordinates[0], measure.coordinates[1]);
        let measurement = self.measure(start, end, measure.mode.metric());
        let owner = FeatureOwner::of(measure);
        let handles = self.create_segment(owner, start, end, status, &measurement);
        measure.records.distances.insert(0, measurement.distance);
        measure.interpolated_points.insert(0, measurement.samples);
        visuals.segments.insert(0, handles);
    }

    /// Zeigt das Vorschau-Segment vom Ankerpunkt zur Pointer-Position.
    pub fn sync_preview(
        &mut self,
        owner: FeatureOwner,
        preview: &mut Option<SegmentHandles>,
        anchor: DVec3,
        pointer: DVec3,
    ) {
        let measurement = self.measure(anchor, pointer, owner.mode.metric());
        match preview {
            Some(handles) => self.refresh_segment(
                owner,
                handles,
                anchor,
                pointer,
                PrimitiveStatus::Moving,
                &measurement,
            ),
            None => {
                *preview = Some(self.create_segment(
                    owner,
                    anchor,
                    pointer,
                    PrimitiveStatus::Moving,
                    &measurement,
                ));
            }
        }
    }

    /// Entfernt das Vorschau-Segment.
    pub fn clear_preview(&mut self, preview: &mut Option<SegmentHandles>) {
        if let Some(handles) = preview.take() {
            self.remove_segment(handles);
        }
    }

    /// Erstellt oder aktualisiert das Summen-Label.
    pub fn sync_total_label(
        &mut self,
        measure: &Measure,
        visuals: &mut MeasureVisuals,
        status: PrimitiveStatus,
    ) {
        let Some((position, text)) = total_label_content(measure) else {
            self.remove_total_label(visuals);
            return;
        };
        let show_background = self.show_background(status);
        match visuals.total_label {
            Some(id) => {
                self.surface.update_label(id, position, &text, show_background);
                self.primitives.set_positions(id, vec![position]);
                self.primitives.set_status(id, status);
            }
            None => {
                let owner = FeatureOwner::of(measure);
                let id = self.surface.add_label(
                    &owner.feature_id(FeatureKind::Total),
                    position,
                    &text,
                    show_background,
                );
                self.register(id, owner, FeatureKind::Total, status, vec![position]);
                visuals.total_label = Some(id);
            }
        }
    }

    /// Entfernt das Summen-Label.
    pub fn remove_total_label(&mut self, visuals: &mut MeasureVisuals) {
        if let Some(id) = visuals.total_label.take() {
            self.remove_primitive(id);
        }
    }

    /// Hält das Flächen-Polygon synchron (nur geschlossene Flächen-Messungen).
    pub fn sync_polygon(
        &mut self,
        measure: &Measure,
        visuals: &mut MeasureVisuals,
        status: PrimitiveStatus,
    ) {
        let corners = measure.distinct_coordinates();
        let wanted = measure.mode.has_polygon() && measure.closed && corners.len() >= 3;

        match (visuals.polygon, wanted) {
            (Some(id), true) => {
                self.surface.update_polygon(id, corners);
                self.primitives.set_positions(id, corners.to_vec());
                self.primitives.set_status(id, status);
            }
            (None, true) => {
                let owner = FeatureOwner::of(measure);
                let id = self
                    .surface
                    .add_polygon(&owner.feature_id(FeatureKind::Polygon), corners);
                self.register(id, owner, FeatureKind::Polygon, status, corners.to_vec());
                visuals.polygon = Some(id);
            }
            (Some(id), false) => {
                self.remove_primitive(id);
                visuals.polygon = None;
            }
            (None, false) => {}
        }
    }

    /// Setzt den Status aller Primitive einer Messung.
    pub fn set_status_all(&mut self, visuals: &MeasureVisuals, status: PrimitiveStatus) {
        for id in visuals.all_ids() {
            self.primitives.set_status(id, status);
        }
    }

    /// Entfernt alle Primitive einer Messung.
    pub fn remove_all(&mut self, visuals: MeasureVisuals) {
        for id in visuals.all_ids() {
            self.remove_primitive(id);
        }
    }

    /// Baut alle Primitive einer Messung aus dem Datensatz auf.
    ///
    /// Inkonsistente Parallel-Listen werden vorher komplett neu vermessen.
    pub fn build_measure(&mut self, measure: &mut Measure) -> MeasureVisuals {
        if !measure.is_consistent() {
            log::warn!(
                "Messung {} inkonsistent ({} Koordinaten, {} Distanzen), vermesse neu",
                measure.id,
                measure.coordinates.len(),
                measure.records.distances.len()
            );
            let metric = measure.mode.metric();
            let measurements: Vec<SegmentMeasurement> = measure
                .coordinates
                .windows(2)
                .map(|w| self.measure(w[0], w[1], metric))
                .collect();
            measure.records.distances = measurements.iter().map(|m| m.distance).collect();
            measure.interpolated_points = measurements.into_iter().map(|m| m.samples).collect();
        }
        measure.recompute_total();

        let owner = FeatureOwner::of(measure);
        let status = PrimitiveStatus::from(measure.status);
        let mut visuals = MeasureVisuals::default();

        for position in measure.distinct_coordinates().to_vec() {
            let id = self.create_point(owner, position, status);
            visuals.points.push(id);
        }

        for segment in 0..measure.segment_count() {
            let Some((start, end)) = measure.segment_endpoints(segment) else {
                continue;
            };
            let measurement = SegmentMeasurement {
                distance: measure.records.distances[segment],
                samples: measure.interpolated_points[segment].clone(),
            };
            let handles = self.create_segment(owner, start, end, status, &measurement);
            visuals.segments.push(handles);
        }

        if measure.is_completed() {
            self.sync_total_label(measure, &mut visuals, status);
        }
        self.sync_polygon(measure, &mut visuals, status);
        visuals
    }
}
