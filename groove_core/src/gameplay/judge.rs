use level_schema::{Classification, HitCounts, Millis, PointTable, TimingWindows};

use crate::schedule::ScheduledEvent;

#[derive(Debug, Clone, PartialEq)]
pub enum Judgement {
    Hit {
        event: ScheduledEvent,
        classification: Classification,
        /// Signed: negative when early.
        delta_ms: Millis,
    },
    /// `event` is `None` for a whiff (an attempt with no candidate).
    Miss { event: Option<ScheduledEvent> },
}

impl Judgement {
    pub fn classification(&self) -> Classification {
        match self {
            Judgement::Hit { classification, .. } => *classification,
            Judgement::Miss { .. } => Classification::Miss,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Scoreboard {
    pub score: u64,
    pub combo: u32,
    pub combo_max: u32,
    pub hit_counts: HitCounts,
}

impl Scoreboard {
    fn record_hit(&mut self, classification: Classification, points: u32) {
        self.score += u64::from(points);
        self.combo += 1;
        self.combo_max = self.combo_max.max(self.combo);
        self.hit_counts.record(classification);
    }

    fn record_miss(&mut self) {
        self.combo = 0;
        self.hit_counts.miss += 1;
    }
}

/// Classifies attempts against one run's schedule and expires events whose
/// windows have closed.
pub struct JudgmentEngine {
    events: Vec<ScheduledEvent>,
    windows: TimingWindows,
    points: PointTable,
    board: Scoreboard,
    /// Index of the first pending event. Everything before it is resolved.
    cursor: usize,
    pending: usize,
}

impl JudgmentEngine {
    pub fn new(events: Vec<ScheduledEvent>, windows: TimingWindows, points: PointTable) -> Self {
        let pending = events
            .iter()
            .filter(|e| e.classification.is_pending())
            .count();
        let mut engine = Self {
            events,
            windows,
            points,
            board: Scoreboard::default(),
            cursor: 0,
            pending,
        };
        engine.advance_cursor();
        engine
    }

    pub fn events(&self) -> &[ScheduledEvent] {
        &self.events
    }

    pub fn board(&self) -> &Scoreboard {
        &self.board
    }

    pub fn total(&self) -> usize {
        self.events.len()
    }

    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn is_complete(&self) -> bool {
        self.pending == 0
    }

    /// Hits over total events; 1.0 for an empty schedule.
    pub fn accuracy(&self) -> f64 {
        if self.events.is_empty() {
            return 1.0;
        }
        f64::from(self.board.hit_counts.hits()) / self.events.len() as f64
    }

    /// Marks every pending event whose miss window has fully elapsed as a miss,
    /// in schedule order.
    pub fn on_tick(&mut self, elapsed_ms: Millis) -> Vec<Judgement> {
        let mut results = Vec::new();

        let mut idx = self.cursor;
        while idx < self.events.len() {
            let event = &mut self.events[idx];
            if !event.classification.is_pending() {
                idx += 1;
                continue;
            }
            // Offsets are non-decreasing, so the first live event ends the scan.
            if elapsed_ms - event.offset_ms <= self.windows.miss {
                break;
            }

            event.classification = Classification::Miss;
            let expired = event.clone();
            self.pending -= 1;
            self.board.record_miss();
            results.push(Judgement::Miss {
                event: Some(expired),
            });
            idx += 1;
        }

        self.advance_cursor();
        results
    }

    /// Judges one player action. Picks the first pending event in schedule
    /// order that lies within the good window, not the nearest one.
    pub fn on_attempt(&mut self, elapsed_ms: Millis) -> Judgement {
        let mut selected = None;

        for idx in self.cursor..self.events.len() {
            let event = &self.events[idx];
            if !event.classification.is_pending() {
                continue;
            }
            let delta = elapsed_ms - event.offset_ms;
            if delta.abs() <= self.windows.good {
                selected = Some((idx, delta));
                break;
            }
            if -delta > self.windows.good {
                // This and every later event are still too far ahead.
                break;
            }
        }

        let Some((idx, delta)) = selected else {
            self.board.record_miss();
            return Judgement::Miss { event: None };
        };

        let classification = if delta.abs() <= self.windows.perfect {
            Classification::Perfect
        } else {
            Classification::Good
        };

        let event = &mut self.events[idx];
        event.classification = classification;
        let hit = event.clone();
        self.pending -= 1;
        self.board
            .record_hit(classification, self.points.for_classification(classification));
        self.advance_cursor();

        Judgement::Hit {
            event: hit,
            classification,
            delta_ms: delta,
        }
    }

    fn advance_cursor(&mut self) {
        while self.cursor < self.events.len() && !self.events[self.cursor].classification.is_pending()
        {
            self.cursor += 1;
        }
    }
}
