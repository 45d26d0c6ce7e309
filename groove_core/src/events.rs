use level_schema::{Classification, Millis, RunResult};

use crate::gameplay::Judgement;
use crate::schedule::ScheduledEvent;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// `None` clears the countdown label.
    Countdown {
        label: Option<String>,
    },
    Started {
        generation: u64,
    },
    Hit {
        event: ScheduledEvent,
        classification: Classification,
        delta_ms: Millis,
    },
    /// `event` is `None` for a whiff.
    Miss {
        event: Option<ScheduledEvent>,
    },
    Completed(RunResult),
    AudioFailed {
        message: String,
    },
}

impl From<Judgement> for EngineEvent {
    fn from(judgement: Judgement) -> Self {
        match judgement {
            Judgement::Hit {
                event,
                classification,
                delta_ms,
            } => EngineEvent::Hit {
                event,
                classification,
                delta_ms,
            },
            Judgement::Miss { event } => EngineEvent::Miss { event },
        }
    }
}

/// An event tagged with the run generation it was emitted under.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Notification {
    pub(crate) generation: u64,
    pub(crate) event: EngineEvent,
}
