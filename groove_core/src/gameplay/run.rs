use level_schema::CompletionThresholds;
use tracing::debug;

use super::judge::Scoreboard;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunStatus {
    #[default]
    Idle,
    Counting,
    Playing,
    Success,
    Fail,
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunStatus::Success | RunStatus::Fail)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionVerdict {
    pub accuracy: f64,
    pub success: bool,
}

/// Success needs the accuracy and combo thresholds met and no misses at all,
/// whiffs included.
pub fn evaluate_completion(
    board: &Scoreboard,
    total_events: usize,
    thresholds: &CompletionThresholds,
) -> CompletionVerdict {
    let accuracy = if total_events == 0 {
        1.0
    } else {
        f64::from(board.hit_counts.hits()) / total_events as f64
    };
    let success = accuracy >= thresholds.min_accuracy
        && board.combo_max >= thresholds.min_combo
        && board.hit_counts.miss == 0;
    CompletionVerdict { accuracy, success }
}

/// Owns the run status and the run generation. Every `start` and `stop` bumps
/// the generation so callbacks captured under an older one can tell they are
/// stale.
#[derive(Debug, Default)]
pub struct RunStateMachine {
    status: RunStatus,
    generation: u64,
}

impl RunStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    /// Begins a new run in `Counting`. Returns the new generation.
    pub fn start(&mut self) -> u64 {
        self.generation += 1;
        debug!(from = ?self.status, generation = self.generation, "run counting in");
        self.status = RunStatus::Counting;
        self.generation
    }

    /// Counting -> Playing. Ignored when `generation` is stale or the run is
    /// not counting.
    pub fn advance_to_play(&mut self, generation: u64) -> bool {
        if !self.is_current(generation) || self.status != RunStatus::Counting {
            return false;
        }
        self.status = RunStatus::Playing;
        debug!(generation, "run playing");
        true
    }

    /// Forces `Idle` from any other state. Returns false when already idle.
    pub fn stop(&mut self) -> bool {
        if self.status == RunStatus::Idle {
            return false;
        }
        self.generation += 1;
        debug!(from = ?self.status, generation = self.generation, "run stopped");
        self.status = RunStatus::Idle;
        true
    }

    /// Moves an active run into its terminal state. Returns true only for the
    /// first call of a run.
    pub fn complete(&mut self, success: bool) -> bool {
        if !matches!(self.status, RunStatus::Counting | RunStatus::Playing) {
            return false;
        }
        self.status = if success {
            RunStatus::Success
        } else {
            RunStatus::Fail
        };
        true
    }
}
