//! Terrain Measure Editor (Replay-Binary).
//!
//! Spielt ein JSON-Skript aus Eingabe-Events gegen die Mess-Engine ab und
//! gibt die Registry anschließend als JSON aus.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use terrain_measure_editor::app::Notification;
use terrain_measure_editor::{
    FlatTerrain, Heightmap, InMemoryRegistry, InputEvent, MeasureController, MeasureMode,
    MeasureOptions, MeasureState, RecordingSurface, TerrainSampler, WorldBounds,
};

#[derive(Debug, Parser)]
#[command(name = "terrain-measure-editor", version, about = "Mess-Engine für 3D-Karten")]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Spielt ein Event-Skript ab und gibt die Registry aus
    Replay {
        /// JSON-Datei mit einem Array aus Events und Steuer-Einträgen
        script: PathBuf,
        /// Start-Modus (distance, perimeter, area, profile, height)
        #[arg(long, default_value = "distance", value_parser = parse_mode)]
        mode: MeasureMode,
        /// TOML-Datei mit Optionen
        #[arg(long)]
        options: Option<PathBuf>,
        /// Graustufen-Heightmap (PNG) als Terrain
        #[arg(long)]
        heightmap: Option<PathBuf>,
        /// Kantenlänge der Karte in Metern (Heightmap zentriert bei 0,0)
        #[arg(long, default_value_t = 2048.0)]
        map_size: f64,
        /// Höhe eines voll weißen Heightmap-Pixels in Metern
        #[arg(long, default_value_t = 255.0)]
        height_scale: f64,
    },
    /// Optionen-Datei verwalten
    Options {
        /// Schreibt die Standard-Optionen nach `<path>`
        #[arg(long)]
        write: PathBuf,
    },
}

fn parse_mode(token: &str) -> Result<MeasureMode, String> {
    MeasureMode::from_token(token).ok_or_else(|| format!("unbekannter Messmodus: {}", token))
}

/// Steuer-Eintrag im Replay-Skript
#[derive(Debug, Deserialize)]
#[serde(tag = "control", rename_all = "snake_case")]
enum ControlEntry {
    SetMode { mode: MeasureMode },
    /// Beantwortet die zuletzt angefragte Bestätigung
    Confirm { accept: bool },
    ExitAddMode,
    Deactivate,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ScriptEntry {
    Control(ControlEntry),
    Event(InputEvent),
}

fn main() -> Result<()> {
    ReplayRunner::run()
}

struct ReplayRunner;

impl ReplayRunner {
    fn run() -> Result<()> {
        // Logger initialisieren
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();

        log::info!(
            "Terrain Measure Editor v{} startet...",
            env!("CARGO_PKG_VERSION")
        );

        match Cli::parse().command {
            CliCommand::Replay {
                script,
                mode,
                options,
                heightmap,
                map_size,
                height_scale,
            } => {
                let options = options
                    .as_deref()
                    .map(MeasureOptions::load_from_file)
                    .unwrap_or_default();
                let terrain: Box<dyn TerrainSampler> = match heightmap {
                    Some(path) => Box::new(
                        Heightmap::load(
                            &path.to_string_lossy(),
                            WorldBounds::from_map_size(map_size),
                            height_scale,
                        )
                        .context("Terrain konnte nicht geladen werden")?,
                    ),
                    None => Box::new(FlatTerrain::new(0.0)),
                };
                let json = Self::replay(&script, mode, options, terrain)?;
                println!("{}", json);
                Ok(())
            }
            CliCommand::Options { write } => MeasureOptions::default()
                .save_to_file(&write)
                .with_context(|| {
                    format!(
                        "Optionen konnten nicht geschrieben werden: {}",
                        write.display()
                    )
                }),
        }
    }

    fn replay(
        script: &Path,
        mode: MeasureMode,
        options: MeasureOptions,
        terrain: Box<dyn TerrainSampler>,
    ) -> Result<String> {
        let content = std::fs::read_to_string(script)
            .with_context(|| format!("Skript nicht lesbar: {}", script.display()))?;
        let entries: Vec<ScriptEntry> = serde_json::from_str(&content)
            .with_context(|| format!("Skript fehlerhaft: {}", script.display()))?;

        let mut state = MeasureState::with_options(options);
        let mut controller =
            MeasureController::new(RecordingSurface::new(), terrain, InMemoryRegistry::new());
        controller.set_mode(&mut state, mode);

        let mut last_ticket = None;
        for (index, entry) in entries.iter().enumerate() {
            let notifications = match entry {
                ScriptEntry::Event(event) => controller.handle_input(&mut state, event),
                ScriptEntry::Control(ControlEntry::SetMode { mode }) => {
                    controller.set_mode(&mut state, *mode)
                }
                ScriptEntry::Control(ControlEntry::Confirm { accept }) => match last_ticket.take() {
                    Some(ticket) => controller.resolve_confirmation(&mut state, ticket, *accept),
                    None => {
                        log::warn!("Eintrag {}: keine offene Bestätigung", index);
                        Vec::new()
                    }
                },
                ScriptEntry::Control(ControlEntry::ExitAddMode) => {
                    controller.exit_add_mode(&mut state)
                }
                ScriptEntry::Control(ControlEntry::Deactivate) => controller.deactivate(&mut state),
            };

            for notification in notifications {
                log::debug!("Eintrag {}: {:?}", index, notification);
                if let Notification::ConfirmationRequested { ticket, .. } = notification {
                    last_ticket = Some(ticket);
                }
            }
        }

        let stats = controller.surface().stats();
        log::info!(
            "{} Einträge abgespielt, {} Befehle, Oberfläche: {:?}",
            entries.len(),
            state.command_log.len(),
            stats
        );
        controller.registry().to_json()
    }
}
