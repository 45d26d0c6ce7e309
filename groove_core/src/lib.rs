//! Rhythm judgment and beat-synchronized playback scheduling.
//!
//! [`Engine`] is the entry point. Everything it drives is also usable on its
//! own: [`gameplay::JudgmentEngine`] for timing judgments,
//! [`sync::PlaybackSynchronizer`] for countdowns and beat alignment.

pub mod audio;
pub mod engine;
pub mod error;
pub mod events;
pub mod gameplay;
pub mod input;
pub mod level;
pub mod schedule;
pub mod sync;
pub mod time;

pub use engine::{Engine, EngineConfig, LastJudgement, RunState};
pub use error::{EngineError, LevelError, LevelErrorKind};
pub use events::EngineEvent;
pub use level::ResolvedLevel;
