use level_schema::{
    BeatEvent, CompletionThresholds, LevelDefinition, Millis, PointTable, ScoringConfig,
    TimingWindows,
};

use crate::LevelError;

/// A level definition with defaults applied and every field validated. Built once
/// per `load_level`; the engine never reads the raw definition again.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLevel {
    pub id: String,
    pub title: String,
    pub bpm: u32,
    pub events: Vec<BeatEvent>,
    pub windows: TimingWindows,
    pub points: PointTable,
    pub completion: CompletionThresholds,
    pub source: Option<String>,
}

impl ResolvedLevel {
    pub fn resolve(def: &LevelDefinition) -> Result<Self, LevelError> {
        let with_id = |err: LevelError| err.with_level_id(def.id.clone());

        if def.id.trim().is_empty() {
            return Err(LevelError::new("E1401", "level id must not be empty"));
        }
        if def.bpm == 0 {
            return Err(with_id(LevelError::new("E1001", "bpm must be > 0")));
        }

        let mut previous_beat = 0.0;
        for (index, event) in def.events.iter().enumerate() {
            if !event.beat.is_finite() || event.beat < 0.0 {
                return Err(with_id(
                    LevelError::new(
                        "E1101",
                        format!("beat index must be finite and >= 0 (got {})", event.beat),
                    )
                    .with_event_index(index),
                ));
            }
            if event.beat < previous_beat {
                return Err(with_id(
                    LevelError::new(
                        "E1102",
                        format!(
                            "beat indices must be non-decreasing ({} after {})",
                            event.beat, previous_beat
                        ),
                    )
                    .with_event_index(index),
                ));
            }
            previous_beat = event.beat;
        }

        let scoring = def.scoring.unwrap_or_default();
        validate_scoring(&scoring).map_err(with_id)?;

        let completion = def.completion.unwrap_or_default();
        if !completion.min_accuracy.is_finite() || !(0.0..=1.0).contains(&completion.min_accuracy) {
            return Err(with_id(LevelError::new(
                "E1301",
                format!(
                    "minAccuracy must be within [0, 1] (got {})",
                    completion.min_accuracy
                ),
            )));
        }

        Ok(Self {
            id: def.id.clone(),
            title: def.title.clone(),
            bpm: def.bpm,
            events: def.events.clone(),
            windows: scoring.windows_ms,
            points: scoring.points,
            completion,
            source: def.source.clone().filter(|s| !s.trim().is_empty()),
        })
    }

    /// Length of one beat in milliseconds.
    pub fn beat_ms(&self) -> Millis {
        60_000.0 / self.bpm as f64
    }
}

fn validate_scoring(scoring: &ScoringConfig) -> Result<(), LevelError> {
    let w = &scoring.windows_ms;
    let finite = w.perfect.is_finite() && w.good.is_finite() && w.miss.is_finite();
    if !finite || !(0.0 < w.perfect && w.perfect < w.good && w.good < w.miss) {
        return Err(LevelError::new(
            "E1201",
            format!(
                "windows must satisfy 0 < perfect < good < miss (got {}/{}/{})",
                w.perfect, w.good, w.miss
            ),
        ));
    }

    let p = &scoring.points;
    if p.perfect < p.good {
        return Err(LevelError::new(
            "E1202",
            format!(
                "points must satisfy perfect >= good (got {}/{})",
                p.perfect, p.good
            ),
        ));
    }
    if p.miss != 0 {
        return Err(LevelError::new(
            "E1203",
            format!("miss points must be 0 (got {})", p.miss),
        ));
    }
    Ok(())
}
