//! Bündelt die externen Kollaborateure für einen Bearbeitungsschritt.

use super::events::Notification;
use super::segment_sync::SegmentSynchronizer;
use super::visuals::PrimitiveTable;
use crate::core::{Measure, MeasureId, MeasurementRegistry, TerrainSampler};
use crate::scene::SceneSurface;
use crate::shared::MeasureOptions;

/// Oberfläche, Terrain und Registry plus gesammelte Rückmeldungen eines Aufrufs.
pub struct EngineHost<'a> {
    /// Render-Oberfläche
    pub surface: &'a mut dyn SceneSurface,
    /// Terrain-Sampler
    pub terrain: &'a dyn TerrainSampler,
    /// Mess-Registry
    pub registry: &'a mut dyn MeasurementRegistry,
    notifications: Vec<Notification>,
}

impl<'a> EngineHost<'a> {
    /// Erstellt einen Host für einen Aufruf.
    pub fn new(
        surface: &'a mut dyn SceneSurface,
        terrain: &'a dyn TerrainSampler,
        registry: &'a mut dyn MeasurementRegistry,
    ) -> Self {
        Self {
            surface,
            terrain,
            registry,
            notifications: Vec::new(),
        }
    }

    /// Synchronizer über Oberfläche und Terrain dieses Hosts.
    pub fn synchronizer<'s>(
        &'s mut self,
        primitives: &'s mut PrimitiveTable,
        options: &'s MeasureOptions,
    ) -> SegmentSynchronizer<'s> {
        SegmentSynchronizer::new(&mut *self.surface, self.terrain, primitives, options)
    }

    /// Sammelt eine Rückmeldung.
    pub fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    /// Schreibt eine Messung in die Registry und meldet die Änderung.
    pub fn publish(&mut self, measure: &Measure) {
        self.registry.upsert(measure.clone());
        self.notify(Notification::MeasureUpdated { id: measure.id });
    }

    /// Entfernt eine Messung aus der Registry (falls dort vorhanden).
    pub fn unpublish(&mut self, id: MeasureId) {
        if self.registry.remove(id).is_some() {
            self.notify(Notification::MeasureRemoved { id });
        }
    }

    /// Gibt alle gesammelten Rückmeldungen zurück.
    pub fn into_notifications(self) -> Vec<Notification> {
        self.notifications
    }
}
