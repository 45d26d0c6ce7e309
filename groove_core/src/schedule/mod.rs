use std::fmt;

use level_schema::{Classification, Millis};

use crate::level::ResolvedLevel;

/// Identity of a scheduled event. The run generation makes identities unique
/// across runs; the index keeps two events at the same offset apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId {
    pub generation: u64,
    pub index: usize,
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}#{}", self.generation, self.index)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledEvent {
    pub id: EventId,
    pub beat: f64,
    /// Absolute time from run start.
    pub offset_ms: Millis,
    pub symbol: String,
    pub classification: Classification,
}

pub fn beat_offset_ms(beat: f64, bpm: u32) -> Millis {
    beat * (60_000.0 / bpm as f64)
}

/// Materializes the level's beat events into absolute offsets, all pending.
pub fn build_schedule(level: &ResolvedLevel, generation: u64) -> Vec<ScheduledEvent> {
    level
        .events
        .iter()
        .enumerate()
        .map(|(index, event)| ScheduledEvent {
            id: EventId { generation, index },
            beat: event.beat,
            offset_ms: beat_offset_ms(event.beat, level.bpm),
            symbol: event.symbol.clone(),
            classification: Classification::Pending,
        })
        .collect()
}
