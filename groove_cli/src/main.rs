use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use groove_core::schedule::build_schedule;
use groove_core::sync::PlaybackSynchronizer;
use groove_core::{EngineConfig, ResolvedLevel};
use level_schema::{LevelDefinition, Millis};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod simulate;

use simulate::{describe, run_simulation, SimulationOptions};

#[derive(Debug, Parser)]
#[command(name = "groove")]
#[command(about = "Rhythm level checker and run simulator", long_about = None)]
struct Cli {
    /// Engine settings (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate a level.
    Check { level: String },
    /// Print the countdown and the absolute event schedule.
    Schedule { level: String },
    /// List the built-in levels.
    Levels,
    /// Play a level with scripted attempts.
    Simulate {
        level: String,
        /// Attempt time in ms after playback start, >= 0. Repeatable.
        #[arg(long = "hit", allow_negative_numbers = true)]
        hits: Vec<Millis>,
        /// Audio clock reading when the run starts.
        #[arg(long, default_value_t = 0.0)]
        audio_offset_ms: Millis,
        /// Print only the result as JSON.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("failed to initialise logging")?;

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Command::Check { level } => {
            let (def, resolved) = load_resolved(&level)?;
            println!(
                "ok: {} \"{}\" ({} events, {} bpm)",
                def.id,
                def.title,
                resolved.events.len(),
                resolved.bpm
            );
        }
        Command::Schedule { level } => {
            let (_, resolved) = load_resolved(&level)?;
            print_schedule(&resolved, &config);
        }
        Command::Levels => {
            for level in level_loader::list_levels()? {
                println!(
                    "{:>3}  {:<24} {:>4} bpm  {} events",
                    level.id,
                    level.title,
                    level.bpm,
                    level.events.len()
                );
            }
        }
        Command::Simulate {
            level,
            hits,
            audio_offset_ms,
            json,
        } => {
            let def = load_definition(&level)?;
            let options = SimulationOptions {
                hits_ms: hits,
                audio_offset_ms,
                config,
            };
            let report = run_simulation(&def, &options)
                .with_context(|| format!("simulation failed: {level}"))?;

            let Some(result) = report.result else {
                bail!("simulation did not complete: {level}");
            };

            if json {
                let out = serde_json::to_string_pretty(&result)
                    .context("failed to serialize result")?;
                println!("{out}");
            } else {
                println!("Time(ms) | Event");
                println!("---------|------------------");
                for (at, event) in &report.timeline {
                    println!("{at:8.1} | {}", describe(event));
                }
                println!(
                    "grade {:?}, {} star(s), combo max {}",
                    result.grade(),
                    result.stars(),
                    result.combo_max
                );
            }
        }
    }

    Ok(())
}

fn load_config(path: &Path) -> anyhow::Result<EngineConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("failed to parse config: {}", path.display()))
}

/// A path to a level JSON file, or the id of a built-in level.
fn load_definition(level: &str) -> anyhow::Result<LevelDefinition> {
    let path = Path::new(level);
    if path.exists() {
        return level_loader::load_level_json_from_path(path);
    }
    match level_loader::get_level(level)? {
        Some(def) => Ok(def),
        None => bail!("no level file or built-in level named {level:?}"),
    }
}

fn load_resolved(level: &str) -> anyhow::Result<(LevelDefinition, ResolvedLevel)> {
    let def = load_definition(level)?;
    let resolved =
        ResolvedLevel::resolve(&def).with_context(|| format!("invalid level: {level}"))?;
    Ok((def, resolved))
}

fn print_schedule(level: &ResolvedLevel, config: &EngineConfig) {
    let sync = PlaybackSynchronizer::new(level.bpm, config.countdown.clone());
    println!(
        "{} \"{}\" at {} bpm, {:.1}ms per count",
        level.id,
        level.title,
        level.bpm,
        sync.count_ms()
    );

    for step in sync.countdown_plan() {
        let label = step.label.as_deref().unwrap_or("-");
        let marker = if step.starts_playback { " (align to beat)" } else { "" };
        println!("countdown {:8.1} | {label}{marker}", step.at_ms);
    }

    println!("Offset(ms) | Beat   | Symbol");
    println!("-----------|--------|-------");
    for event in build_schedule(level, 0) {
        println!("{:10.1} | {:6.2} | {}", event.offset_ms, event.beat, event.symbol);
    }
}
