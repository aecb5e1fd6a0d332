//! Engine-Controller für zentrale Event-Verarbeitung.

use super::events::{ConfirmAction, InputEvent, MeasureCommand, Notification};
use super::handlers;
use super::host::EngineHost;
use super::{drag, intent_mapping, session, MeasureState};
use crate::core::{MeasureFilter, MeasureMode, MeasurementRegistry, TerrainSampler};
use crate::scene::SceneSurface;

/// Orchestriert Eingabe-Events und Commands auf den `MeasureState`.
///
/// Besitzt die externen Kollaborateure (Render-Oberfläche, Terrain, Registry)
/// und reicht sie pro Aufruf gebündelt an die Handler weiter.
pub struct MeasureController<S, T, R> {
    surface: S,
    terrain: T,
    registry: R,
}

impl<S, T, R> MeasureController<S, T, R>
where
    S: SceneSurface,
    T: TerrainSampler,
    R: MeasurementRegistry,
{
    /// Erstellt einen neuen Controller.
    pub fn new(surface: S, terrain: T, registry: R) -> Self {
        Self {
            surface,
            terrain,
            registry,
        }
    }

    /// Render-Oberfläche.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Render-Oberfläche (mutabel).
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Terrain-Sampler.
    pub fn terrain(&self) -> &T {
        &self.terrain
    }

    /// Ersetzt den Terrain-Sampler (bestehende Messungen bleiben unverändert).
    pub fn set_terrain(&mut self, terrain: T) {
        self.terrain = terrain;
    }

    /// Mess-Registry.
    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Mess-Registry (mutabel).
    pub fn registry_mut(&mut self) -> &mut R {
        &mut self.registry
    }

    /// Zerlegt den Controller in seine Kollaborateure.
    pub fn into_parts(self) -> (S, T, R) {
        (self.surface, self.terrain, self.registry)
    }

    /// Verarbeitet ein Eingabe-Event über Event->Command Mapping.
    pub fn handle_input(
        &mut self,
        state: &mut MeasureState,
        event: &InputEvent,
    ) -> Vec<Notification> {
        let commands = intent_mapping::map_input_to_commands(state, event);
        if commands.is_empty() {
            log::trace!("Event {:?} ohne Command", event.kind);
        }

        let mut notifications = Vec::new();
        for command in commands {
            notifications.extend(self.handle_command(state, command));
        }
        notifications
    }

    /// Führt einen mutierenden Command auf dem `MeasureState` aus.
    ///
    /// Ablehnungen werden protokolliert und nie weitergereicht: ein einzelnes
    /// fehlerhaftes Event darf die Session nicht beenden.
    pub fn handle_command(
        &mut self,
        state: &mut MeasureState,
        command: MeasureCommand,
    ) -> Vec<Notification> {
        state.command_log.record(&command);
        let mut host = EngineHost::new(&mut self.surface, &self.terrain, &mut self.registry);

        let result = {
            let host = &mut host;
            match &command {
                // === Platzieren ===
                MeasureCommand::PlacePoint { position } => {
                    session::place_point(state, host, *position)
                }
                MeasureCommand::Finalize { position } => session::finalize(state, host, *position),
                MeasureCommand::Resume {
                    measure_id,
                    position,
                } => session::resume(state, host, *measure_id, *position),
                MeasureCommand::UpdatePreview { position } => {
                    session::update_preview(state, host, *position)
                }

                // === Einfügen & Entfernen ===
                MeasureCommand::InsertPoint {
                    measure_id,
                    line,
                    position,
                } => handlers::editing::insert_point(state, host, *measure_id, *line, *position),
                MeasureCommand::RemovePoint {
                    measure_id,
                    position,
                } => handlers::editing::remove_point(state, host, *measure_id, *position),
                MeasureCommand::RestoreFromRegistry { filter } => {
                    handlers::editing::restore_from_registry(state, host, *filter)
                }

                // === Bestätigungen ===
                MeasureCommand::RequestAddMode { measure_id } => handlers::confirmation::request(
                    state,
                    host,
                    ConfirmAction::EnterAddMode,
                    *measure_id,
                ),
                MeasureCommand::RequestRemoveMeasure { measure_id } => {
                    handlers::confirmation::request(
                        state,
                        host,
                        ConfirmAction::RemoveMeasure,
                        *measure_id,
                    )
                }
                MeasureCommand::ResolveConfirmation { ticket, accepted } => {
                    handlers::confirmation::resolve(state, host, *ticket, *accepted)
                }
                MeasureCommand::ExitAddMode => handlers::confirmation::exit_add_mode(state, host),

                // === Drag ===
                MeasureCommand::DragBegin {
                    measure_id,
                    position,
                    screen,
                } => drag::begin(state, host, *measure_id, *position, *screen),
                MeasureCommand::DragMove { position, screen } => {
                    drag::drag_move(state, host, *position, *screen)
                }
                MeasureCommand::DragEnd { position, .. } => drag::end(state, host, *position),

                // === Modus ===
                MeasureCommand::SetMode { mode } => handlers::mode::set_mode(state, host, *mode),
                MeasureCommand::Deactivate => handlers::mode::deactivate(state, host),
                }
        };

        if let Err(rejection) = result {
            if rejection.is_warning() {
                log::warn!("{:?} abgelehnt: {}", command, rejection);
            } else {
                log::debug!("{:?} abgelehnt: {}", command, rejection);
            }
        }

        host.into_notifications()
    }

    /// Wechselt den Messmodus (bricht laufende Eingaben ab).
    pub fn set_mode(&mut self, state: &mut MeasureState, mode: MeasureMode) -> Vec<Notification> {
        self.handle_command(state, MeasureCommand::SetMode { mode })
    }

    /// Deaktiviert die Engine (bricht laufende Eingaben ab).
    pub fn deactivate(&mut self, state: &mut MeasureState) -> Vec<Notification> {
        self.handle_command(state, MeasureCommand::Deactivate)
    }

    /// Beantwortet eine Bestätigungsanfrage.
    pub fn resolve_confirmation(
        &mut self,
        state: &mut MeasureState,
        ticket: u64,
        accepted: bool,
    ) -> Vec<Notification> {
        self.handle_command(state, MeasureCommand::ResolveConfirmation { ticket, accepted })
    }

    /// Beendet den Einfüge-Modus.
    pub fn exit_add_mode(&mut self, state: &mut MeasureState) -> Vec<Notification> {
        self.handle_command(state, MeasureCommand::ExitAddMode)
    }

    /// Übernimmt abgeschlossene Messungen aus der Registry und baut ihre Primitive auf.
    pub fn restore_from_registry(
        &mut self,
        state: &mut MeasureState,
        filter: MeasureFilter,
    ) -> Vec<Notification> {
        self.handle_command(state, MeasureCommand::RestoreFromRegistry { filter })
    }
}
