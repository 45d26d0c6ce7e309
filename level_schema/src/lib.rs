use serde::{Deserialize, Serialize};

pub mod result;

pub use result::{Grade, HitCounts, RunResult};

pub type Millis = f64;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LevelDefinition {
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Beats per minute.
    pub bpm: u32,
    #[serde(default)]
    pub events: Vec<BeatEvent>,
    #[serde(default)]
    pub scoring: Option<ScoringConfig>,
    #[serde(default)]
    pub completion: Option<CompletionThresholds>,
    /// Program text handed to the audio engine when playback begins.
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BeatEvent {
    /// Position in beats from run start. Fractional beats are allowed.
    pub beat: f64,
    pub symbol: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ScoringConfig {
    #[serde(default)]
    pub windows_ms: TimingWindows,
    #[serde(default)]
    pub points: PointTable,
}

/// Half-width timing windows, measured from the event's absolute time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TimingWindows {
    pub perfect: Millis,
    pub good: Millis,
    pub miss: Millis,
}

impl Default for TimingWindows {
    fn default() -> Self {
        Self {
            perfect: 80.0,
            good: 160.0,
            miss: 220.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PointTable {
    pub perfect: u32,
    pub good: u32,
    #[serde(default)]
    pub miss: u32,
}

impl Default for PointTable {
    fn default() -> Self {
        Self {
            perfect: 100,
            good: 60,
            miss: 0,
        }
    }
}

impl PointTable {
    pub fn for_classification(&self, classification: Classification) -> u32 {
        match classification {
            Classification::Perfect => self.perfect,
            Classification::Good => self.good,
            Classification::Miss => self.miss,
            Classification::Pending => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CompletionThresholds {
    #[serde(default)]
    pub min_accuracy: f64,
    #[serde(default)]
    pub min_combo: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    #[default]
    Pending,
    Perfect,
    Good,
    Miss,
}

impl Classification {
    pub fn is_pending(self) -> bool {
        self == Classification::Pending
    }

    /// Perfect and good both count as a hit.
    pub fn is_hit(self) -> bool {
        matches!(self, Classification::Perfect | Classification::Good)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_without_scoring_or_completion_parses() {
        let v = serde_json::json!({
            "id": "1",
            "bpm": 100,
            "events": [
                { "beat": 0, "symbol": "bd" },
                { "beat": 1.5, "symbol": "sn" }
            ]
        });

        let level: LevelDefinition = serde_json::from_value(v).unwrap();
        assert_eq!(level.id, "1");
        assert_eq!(level.bpm, 100);
        assert_eq!(level.events.len(), 2);
        assert_eq!(level.events[1].beat, 1.5);
        assert!(level.scoring.is_none());
        assert!(level.completion.is_none());
        assert!(level.source.is_none());
        assert_eq!(level.title, "");
    }

    #[test]
    fn scoring_uses_camel_case_and_fills_defaults() {
        let v = serde_json::json!({
            "windowsMs": { "perfect": 50, "good": 100, "miss": 150 }
        });

        let scoring: ScoringConfig = serde_json::from_value(v).unwrap();
        assert_eq!(scoring.windows_ms.perfect, 50.0);
        assert_eq!(scoring.windows_ms.miss, 150.0);
        assert_eq!(scoring.points, PointTable::default());
    }

    #[test]
    fn completion_thresholds_parse_camel_case() {
        let v = serde_json::json!({ "minAccuracy": 0.8, "minCombo": 2 });
        let completion: CompletionThresholds = serde_json::from_value(v).unwrap();
        assert_eq!(completion.min_accuracy, 0.8);
        assert_eq!(completion.min_combo, 2);
    }

    #[test]
    fn classification_serializes_lowercase() {
        let json = serde_json::to_value(Classification::Perfect).unwrap();
        assert_eq!(json, "perfect");
        assert!(Classification::Good.is_hit());
        assert!(!Classification::Miss.is_hit());
        assert!(Classification::Pending.is_pending());
    }

    #[test]
    fn points_lookup_by_classification() {
        let points = PointTable::default();
        assert_eq!(points.for_classification(Classification::Perfect), 100);
        assert_eq!(points.for_classification(Classification::Good), 60);
        assert_eq!(points.for_classification(Classification::Miss), 0);
    }
}
