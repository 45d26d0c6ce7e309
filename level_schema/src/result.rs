use serde::{Deserialize, Serialize};

use crate::{Classification, Millis};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HitCounts {
    pub perfect: u32,
    pub good: u32,
    pub miss: u32,
}

impl HitCounts {
    pub fn hits(&self) -> u32 {
        self.perfect + self.good
    }

    pub fn record(&mut self, classification: Classification) {
        match classification {
            Classification::Perfect => self.perfect += 1,
            Classification::Good => self.good += 1,
            Classification::Miss => self.miss += 1,
            Classification::Pending => {}
        }
    }
}

/// Outcome of one completed run. Collaborators key history records on these
/// fields, so the serialized shape must not change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub level_id: String,
    pub score: u64,
    pub accuracy: f64,
    pub combo_max: u32,
    pub duration_ms: Millis,
    pub hit_counts: HitCounts,
    pub success: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    S,
    A,
    B,
    C,
}

impl RunResult {
    pub fn grade(&self) -> Grade {
        if self.accuracy >= 0.95 {
            Grade::S
        } else if self.accuracy >= 0.9 {
            Grade::A
        } else if self.accuracy >= 0.8 {
            Grade::B
        } else {
            Grade::C
        }
    }

    pub fn stars(&self) -> u8 {
        if self.accuracy >= 0.95 {
            3
        } else if self.accuracy >= 0.85 {
            2
        } else if self.accuracy >= 0.7 {
            1
        } else {
            0
        }
    }
}
