use std::sync::atomic::Ordering;
use std::sync::Arc;

use anyhow::bail;
use atomic_float::AtomicF64;
use groove_core::audio::{AudioCommand, AudioHandle};
use groove_core::time::ManualClock;
use groove_core::{Engine, EngineConfig, EngineEvent};
use level_schema::{LevelDefinition, Millis, RunResult};
use tracing::{debug, warn};

// Upper bound on loop activations; a playing run always ends well before.
const MAX_STEPS: usize = 1_000_000;

#[derive(Debug, Clone, Default)]
pub struct SimulationOptions {
    /// Attempt times, relative to playback start.
    pub hits_ms: Vec<Millis>,
    /// Audio clock reading when the engine clock reads zero.
    pub audio_offset_ms: Millis,
    pub config: EngineConfig,
}

#[derive(Debug)]
pub struct SimulationReport {
    pub timeline: Vec<(Millis, EngineEvent)>,
    pub audio_commands: Vec<AudioCommand>,
    pub started_at_ms: Option<Millis>,
    pub result: Option<RunResult>,
}

/// Plays a level against a manual clock, jumping straight to each timer or
/// scripted attempt.
pub fn run_simulation(
    def: &LevelDefinition,
    options: &SimulationOptions,
) -> anyhow::Result<SimulationReport> {
    if let Some(hit) = options.hits_ms.iter().find(|h| !h.is_finite() || **h < 0.0) {
        bail!("hit times must be finite and >= 0 (got {hit})");
    }

    let clock = ManualClock::new(0.0);
    let audio_time = Arc::new(AtomicF64::new(options.audio_offset_ms));
    let (audio, audio_rx) = AudioHandle::new(audio_time.clone());
    let mut engine = Engine::new(clock.clone(), audio, options.config.clone());
    engine.load_level(def)?;

    let mut hits = options.hits_ms.clone();
    hits.sort_by(f64::total_cmp);
    let mut next_hit = 0;

    let mut timeline = Vec::new();
    let mut now = 0.0;
    let mut result = engine.start()?;
    timeline.extend(engine.drain_events().into_iter().map(|e| (now, e)));

    let mut steps = 0;
    while result.is_none() {
        steps += 1;
        if steps > MAX_STEPS {
            warn!(steps, "simulation did not finish");
            break;
        }

        let hit_at = engine
            .started_at_ms()
            .and_then(|start| hits.get(next_hit).map(|h| start + h));
        let (at, is_hit) = match (engine.next_timer_due(), hit_at) {
            (Some(timer), Some(hit)) if hit < timer => (hit, true),
            (Some(timer), _) => (timer, false),
            (None, Some(hit)) => (hit, true),
            (None, None) => break,
        };

        now = at.max(now);
        clock.set(now);
        audio_time.store(now + options.audio_offset_ms, Ordering::Release);

        result = if is_hit {
            next_hit += 1;
            engine.attempt()
        } else {
            engine.pump()
        };
        timeline.extend(engine.drain_events().into_iter().map(|e| (now, e)));
    }

    let audio_commands: Vec<AudioCommand> = audio_rx.try_iter().collect();
    debug!(steps, commands = audio_commands.len(), "simulation finished");

    Ok(SimulationReport {
        timeline,
        audio_commands,
        started_at_ms: engine.started_at_ms(),
        result,
    })
}

pub fn describe(event: &EngineEvent) -> String {
    match event {
        EngineEvent::Countdown { label: Some(label) } => format!("countdown {label}"),
        EngineEvent::Countdown { label: None } => "countdown cleared".to_string(),
        EngineEvent::Started { generation } => format!("playback started (run {generation})"),
        EngineEvent::Hit {
            event,
            classification,
            delta_ms,
        } => format!(
            "{classification:?} {} {} ({delta_ms:+.1}ms)",
            event.id, event.symbol
        ),
        EngineEvent::Miss { event: Some(event) } => {
            format!("Miss {} {} (expired)", event.id, event.symbol)
        }
        EngineEvent::Miss { event: None } => "Miss (no event in window)".to_string(),
        EngineEvent::Completed(result) => format!(
            "completed: {} score={} accuracy={:.2}",
            if result.success { "success" } else { "fail" },
            result.score,
            result.accuracy
        ),
        EngineEvent::AudioFailed { message } => format!("audio failed: {message}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use level_schema::BeatEvent;

    fn two_beats() -> LevelDefinition {
        LevelDefinition {
            id: "sim".to_string(),
            title: String::new(),
            bpm: 120,
            events: vec![
                BeatEvent {
                    beat: 0.0,
                    symbol: "bd".to_string(),
                },
                BeatEvent {
                    beat: 1.0,
                    symbol: "sn".to_string(),
                },
            ],
            scoring: None,
            completion: None,
            source: Some("s(\"bd sn\")".to_string()),
        }
    }

    #[test]
    fn scripted_hits_complete_the_run() {
        let options = SimulationOptions {
            hits_ms: vec![500.0, 0.0],
            ..SimulationOptions::default()
        };
        let report = run_simulation(&two_beats(), &options).unwrap();
        let result = report.result.unwrap();
        assert!(result.success);
        assert_eq!(result.score, 200);
        assert_eq!(report.started_at_ms, Some(1500.0));
        assert_eq!(report.audio_commands[0], AudioCommand::SetTempo { bpm: 120 });
    }

    #[test]
    fn no_hits_expire_everything() {
        let report = run_simulation(&two_beats(), &SimulationOptions::default()).unwrap();
        let result = report.result.unwrap();
        assert!(!result.success);
        assert_eq!(result.hit_counts.miss, 2);
    }

    #[test]
    fn negative_hit_is_rejected() {
        let options = SimulationOptions {
            hits_ms: vec![0.0, -150.0],
            ..SimulationOptions::default()
        };
        let err = run_simulation(&two_beats(), &options).unwrap_err();
        assert_eq!(err.to_string(), "hit times must be finite and >= 0 (got -150)");
    }

    #[test]
    fn describe_is_readable() {
        assert_eq!(
            describe(&EngineEvent::Countdown {
                label: Some("GO".to_string())
            }),
            "countdown GO"
        );
        assert_eq!(
            describe(&EngineEvent::Miss { event: None }),
            "Miss (no event in window)"
        );
    }
}
