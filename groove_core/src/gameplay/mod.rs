pub mod judge;
pub mod run;

pub use judge::{Judgement, JudgmentEngine, Scoreboard};
pub use run::{evaluate_completion, CompletionVerdict, RunStateMachine, RunStatus};
