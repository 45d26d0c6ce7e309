//! Countdown planning and beat alignment against the audio clock.

use level_schema::Millis;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountdownConfig {
    /// Shown one per count. The last label triggers the beat-aligned start.
    pub labels: Vec<String>,
    /// Tempos below this get `slow_tempo_beats_per_count` beats per count.
    pub slow_tempo_threshold: u32,
    pub slow_tempo_beats_per_count: u32,
    /// Emit a cleared label one count after the last one.
    pub clear_after_last: bool,
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            labels: ["3", "2", "1", "GO"].map(String::from).to_vec(),
            slow_tempo_threshold: 80,
            slow_tempo_beats_per_count: 2,
            clear_after_last: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountdownStep {
    /// `None` clears the displayed label.
    pub label: Option<String>,
    /// Delay from the start of the countdown.
    pub at_ms: Millis,
    pub starts_playback: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSynchronizer {
    bpm: u32,
    config: CountdownConfig,
}

impl PlaybackSynchronizer {
    pub fn new(bpm: u32, config: CountdownConfig) -> Self {
        Self { bpm, config }
    }

    pub fn beat_ms(&self) -> Millis {
        60_000.0 / self.bpm as f64
    }

    pub fn beats_per_count(&self) -> u32 {
        if self.bpm < self.config.slow_tempo_threshold {
            self.config.slow_tempo_beats_per_count.max(1)
        } else {
            1
        }
    }

    pub fn count_ms(&self) -> Millis {
        f64::from(self.beats_per_count()) * self.beat_ms()
    }

    pub fn countdown_plan(&self) -> Vec<CountdownStep> {
        let count_ms = self.count_ms();
        let last = self.config.labels.len().saturating_sub(1);

        let mut steps: Vec<CountdownStep> = self
            .config
            .labels
            .iter()
            .enumerate()
            .map(|(i, label)| CountdownStep {
                label: Some(label.clone()),
                at_ms: i as f64 * count_ms,
                starts_playback: i == last,
            })
            .collect();

        if steps.is_empty() {
            // Without labels playback is aligned straight away.
            steps.push(CountdownStep {
                label: None,
                at_ms: 0.0,
                starts_playback: true,
            });
        } else if self.config.clear_after_last {
            steps.push(CountdownStep {
                label: None,
                at_ms: steps.len() as f64 * count_ms,
                starts_playback: false,
            });
        }
        steps
    }

    /// Delay from `audio_now_ms` to the next beat boundary at or after it.
    pub fn beat_aligned_delay_ms(&self, audio_now_ms: Millis) -> Millis {
        (next_beat_boundary_ms(audio_now_ms, self.beat_ms()) - audio_now_ms).max(0.0)
    }
}

pub fn next_beat_boundary_ms(now_ms: Millis, beat_ms: Millis) -> Millis {
    (now_ms / beat_ms).ceil() * beat_ms
}
