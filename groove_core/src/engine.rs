//! The engine facade: owns one level, its run state, and the cooperative loop
//! that drives countdown, beat-aligned start, and per-frame judgment.

use crossbeam_channel::{unbounded, Receiver, Sender};
use level_schema::{Classification, HitCounts, LevelDefinition, Millis, RunResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::audio::AudioPort;
use crate::events::{EngineEvent, Notification};
use crate::gameplay::{evaluate_completion, Judgement, JudgmentEngine, RunStateMachine, RunStatus};
use crate::input::{events::Attempt, AttemptQueue};
use crate::level::ResolvedLevel;
use crate::schedule::{build_schedule, ScheduledEvent};
use crate::sync::{CountdownConfig, CountdownStep, PlaybackSynchronizer};
use crate::time::{Clock, TimerQueue};
use crate::EngineError;

const MIN_FRAME_INTERVAL_MS: Millis = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Delay between loop activations while playing.
    pub frame_interval_ms: Millis,
    pub countdown: CountdownConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 16.0,
            countdown: CountdownConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerKind {
    CountdownStep(usize),
    BeatAlignedStart,
    Frame,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LastJudgement {
    pub classification: Classification,
    /// `None` for a whiff.
    pub symbol: Option<String>,
}

/// Read-only snapshot of the current run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunState {
    pub status: RunStatus,
    pub generation: u64,
    pub elapsed_ms: Millis,
    pub score: u64,
    pub combo: u32,
    pub combo_max: u32,
    pub hit_counts: HitCounts,
    pub events: Vec<ScheduledEvent>,
    pub last_judgement: Option<LastJudgement>,
}

struct Session {
    level: ResolvedLevel,
    sync: PlaybackSynchronizer,
    countdown: Vec<CountdownStep>,
    judge: JudgmentEngine,
    started_at_ms: Option<Millis>,
    elapsed_ms: Millis,
    last_judgement: Option<LastJudgement>,
}

impl Session {
    fn new(level: ResolvedLevel, config: &EngineConfig, generation: u64) -> Self {
        let sync = PlaybackSynchronizer::new(level.bpm, config.countdown.clone());
        let countdown = sync.countdown_plan();
        let judge = fresh_judge(&level, generation);
        Self {
            level,
            sync,
            countdown,
            judge,
            started_at_ms: None,
            elapsed_ms: 0.0,
            last_judgement: None,
        }
    }

    fn reset(&mut self, generation: u64) {
        self.judge = fresh_judge(&self.level, generation);
        self.started_at_ms = None;
        self.elapsed_ms = 0.0;
        self.last_judgement = None;
    }
}

fn fresh_judge(level: &ResolvedLevel, generation: u64) -> JudgmentEngine {
    JudgmentEngine::new(build_schedule(level, generation), level.windows, level.points)
}

pub struct Engine<C, A> {
    clock: C,
    audio: A,
    config: EngineConfig,
    machine: RunStateMachine,
    session: Option<Session>,
    timers: TimerQueue<TimerKind>,
    attempts: AttemptQueue,
    notify_tx: Sender<Notification>,
    notify_rx: Receiver<Notification>,
}

impl<C: Clock, A: AudioPort> Engine<C, A> {
    pub fn new(clock: C, audio: A, config: EngineConfig) -> Self {
        let (notify_tx, notify_rx) = unbounded();
        Self {
            clock,
            audio,
            config,
            machine: RunStateMachine::new(),
            session: None,
            timers: TimerQueue::new(),
            attempts: AttemptQueue::new(),
            notify_tx,
            notify_rx,
        }
    }

    /// Validates and installs a level. An invalid level leaves the engine
    /// untouched.
    pub fn load_level(&mut self, def: &LevelDefinition) -> Result<(), EngineError> {
        let level = ResolvedLevel::resolve(def)?;
        self.stop();
        debug!(
            level = %level.id,
            bpm = level.bpm,
            events = level.events.len(),
            "level loaded"
        );
        self.session = Some(Session::new(level, &self.config, self.machine.generation()));
        Ok(())
    }

    /// Resets the run and begins the countdown. A level with no events
    /// completes immediately and its result is returned.
    pub fn start(&mut self) -> Result<Option<RunResult>, EngineError> {
        if self.session.is_none() {
            return Err(EngineError::NoLevelLoaded);
        }
        if matches!(self.machine.status(), RunStatus::Counting | RunStatus::Playing) {
            self.stop();
        }

        let generation = self.machine.start();
        let dropped = self.attempts.clear();
        if dropped > 0 {
            trace!(dropped, "discarded attempts queued before start");
        }

        let (complete, step_offsets) = {
            let session = self.session.as_mut().ok_or(EngineError::NoLevelLoaded)?;
            session.reset(generation);
            let offsets: Vec<Millis> = session.countdown.iter().map(|s| s.at_ms).collect();
            (session.judge.is_complete(), offsets)
        };

        if complete {
            return Ok(self.check_completion());
        }

        let now = self.clock.now_ms();
        for (step, at_ms) in step_offsets.into_iter().enumerate() {
            self.timers
                .schedule(now + at_ms, generation, TimerKind::CountdownStep(step));
        }
        Ok(self.fire_due_timers(now))
    }

    /// Aborts the run without producing a result.
    pub fn stop(&mut self) {
        if self.machine.stop() {
            self.audio.stop();
            self.attempts.clear();
        }
    }

    /// Judges one player action at the current clock reading. Ignored unless
    /// playing.
    pub fn attempt(&mut self) -> Option<RunResult> {
        if self.machine.status() != RunStatus::Playing {
            trace!(status = ?self.machine.status(), "attempt ignored");
            return None;
        }
        let elapsed = self.advance_elapsed(self.clock.now_ms())?;
        if let Some(result) = self.expire(elapsed) {
            return Some(result);
        }
        self.judge_attempt(elapsed)
    }

    /// One cooperative step: fires every timer due at the current clock
    /// reading, including the loop activation.
    pub fn pump(&mut self) -> Option<RunResult> {
        let now = self.clock.now_ms();
        self.fire_due_timers(now)
    }

    pub fn state(&self) -> RunState {
        let status = self.machine.status();
        let generation = self.machine.generation();
        let Some(session) = &self.session else {
            return RunState {
                status,
                generation,
                ..RunState::default()
            };
        };
        let board = session.judge.board();
        RunState {
            status,
            generation,
            elapsed_ms: session.elapsed_ms,
            score: board.score,
            combo: board.combo,
            combo_max: board.combo_max,
            hit_counts: board.hit_counts,
            events: session.judge.events().to_vec(),
            last_judgement: session.last_judgement.clone(),
        }
    }

    pub fn status(&self) -> RunStatus {
        self.machine.status()
    }

    pub fn generation(&self) -> u64 {
        self.machine.generation()
    }

    pub fn level(&self) -> Option<&ResolvedLevel> {
        self.session.as_ref().map(|s| &s.level)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn countdown_plan(&self) -> &[CountdownStep] {
        match &self.session {
            Some(session) => &session.countdown,
            None => &[],
        }
    }

    /// Clock reading at which the current run began playing.
    pub fn started_at_ms(&self) -> Option<Millis> {
        self.session.as_ref().and_then(|s| s.started_at_ms)
    }

    /// When the next timer is due, stale ones included.
    pub fn next_timer_due(&self) -> Option<Millis> {
        self.timers.peek_due()
    }

    /// Sender for attempts made outside the engine's turn. Each attempt is
    /// stamped with the engine clock reading at the moment of the action.
    pub fn attempt_sender(&self) -> Sender<Attempt> {
        self.attempts.sender()
    }

    /// Takes every pending notification of the current run.
    pub fn drain_events(&self) -> Vec<EngineEvent> {
        let current = self.machine.generation();
        self.notify_rx
            .try_iter()
            .filter_map(|n| {
                if n.generation == current {
                    Some(n.event)
                } else {
                    trace!(generation = n.generation, current, "dropping stale notification");
                    None
                }
            })
            .collect()
    }

    fn frame_interval(&self) -> Millis {
        self.config.frame_interval_ms.max(MIN_FRAME_INTERVAL_MS)
    }

    fn emit(&self, event: EngineEvent) {
        let _ = self.notify_tx.send(Notification {
            generation: self.machine.generation(),
            event,
        });
    }

    fn fire_due_timers(&mut self, now: Millis) -> Option<RunResult> {
        let mut completed = None;
        while let Some(timer) = self.timers.pop_due(now) {
            if !self.machine.is_current(timer.generation) {
                trace!(kind = ?timer.kind, generation = timer.generation, "discarding stale timer");
                continue;
            }
            match timer.kind {
                TimerKind::CountdownStep(step) => self.on_countdown_step(step, now, timer.generation),
                TimerKind::BeatAlignedStart => {
                    self.on_beat_aligned_start(timer.due_ms, timer.generation)
                }
                TimerKind::Frame => {
                    if let Some(result) = self.on_frame(now, timer.generation) {
                        completed = Some(result);
                    }
                }
            }
        }
        completed
    }

    fn on_countdown_step(&mut self, step: usize, now: Millis, generation: u64) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let Some(plan) = session.countdown.get(step).cloned() else {
            return;
        };
        let bpm = session.level.bpm;

        if plan.label.is_some() || !plan.starts_playback {
            self.emit(EngineEvent::Countdown {
                label: plan.label.clone(),
            });
        }
        if !plan.starts_playback {
            return;
        }

        self.audio.set_tempo(bpm);
        let audio_now = self.audio.now_ms();
        let delay = match self.session.as_ref() {
            Some(session) => session.sync.beat_aligned_delay_ms(audio_now),
            None => return,
        };
        debug!(audio_now, delay, generation, "beat-aligned start scheduled");
        self.timers
            .schedule(now + delay, generation, TimerKind::BeatAlignedStart);
    }

    /// `aligned_ms` is the beat boundary the start was scheduled for, so a
    /// late pump does not shift time zero.
    fn on_beat_aligned_start(&mut self, aligned_ms: Millis, generation: u64) {
        if !self.machine.advance_to_play(generation) {
            return;
        }
        let dropped = self.attempts.clear();
        if dropped > 0 {
            trace!(dropped, "discarded attempts made during countdown");
        }
        let source = match self.session.as_mut() {
            Some(session) => {
                session.started_at_ms = Some(aligned_ms);
                session.elapsed_ms = 0.0;
                session.level.source.clone()
            }
            None => return,
        };
        self.emit(EngineEvent::Started { generation });

        if let Some(source) = source {
            if let Err(err) = self.audio.evaluate(&source) {
                warn!(error = %err, "audio engine rejected level source");
                self.emit(EngineEvent::AudioFailed {
                    message: format!("{err:#}"),
                });
            }
        }
        self.timers.schedule(aligned_ms, generation, TimerKind::Frame);
    }

    fn on_frame(&mut self, now: Millis, generation: u64) -> Option<RunResult> {
        if self.machine.status() != RunStatus::Playing {
            return None;
        }
        let elapsed = self.advance_elapsed(now)?;
        trace!(elapsed, "frame");

        if let Some(result) = self.expire(elapsed) {
            return Some(result);
        }

        while let Some(attempt) = self.attempts.pop() {
            let started = self.started_at_ms()?;
            if attempt.timestamp_ms < started {
                trace!(at = attempt.timestamp_ms, started, "attempt predates playback");
                continue;
            }
            if let Some(result) = self.judge_attempt(attempt.timestamp_ms - started) {
                let dropped = self.attempts.clear();
                if dropped > 0 {
                    trace!(dropped, "discarded attempts after completion");
                }
                return Some(result);
            }
        }

        let next = now + self.frame_interval();
        self.timers.schedule(next, generation, TimerKind::Frame);
        None
    }

    fn advance_elapsed(&mut self, now: Millis) -> Option<Millis> {
        let session = self.session.as_mut()?;
        let elapsed = now - session.started_at_ms?;
        session.elapsed_ms = elapsed;
        Some(elapsed)
    }

    fn expire(&mut self, elapsed: Millis) -> Option<RunResult> {
        let judgements = self.session.as_mut()?.judge.on_tick(elapsed);
        for judgement in judgements {
            self.record(judgement);
        }
        self.check_completion()
    }

    fn judge_attempt(&mut self, elapsed: Millis) -> Option<RunResult> {
        let judgement = self.session.as_mut()?.judge.on_attempt(elapsed);
        self.record(judgement);
        self.check_completion()
    }

    fn record(&mut self, judgement: Judgement) {
        match &judgement {
            Judgement::Hit {
                event,
                classification,
                delta_ms,
            } => trace!(id = %event.id, ?classification, delta_ms, "hit"),
            Judgement::Miss { event: Some(event) } => trace!(id = %event.id, "expired"),
            Judgement::Miss { event: None } => trace!("whiff"),
        }

        if let Some(session) = self.session.as_mut() {
            let symbol = match &judgement {
                Judgement::Hit { event, .. } => Some(event.symbol.clone()),
                Judgement::Miss { event } => event.as_ref().map(|e| e.symbol.clone()),
            };
            session.last_judgement = Some(LastJudgement {
                classification: judgement.classification(),
                symbol,
            });
        }
        self.emit(judgement.into());
    }

    fn check_completion(&mut self) -> Option<RunResult> {
        let session = self.session.as_ref()?;
        if !session.judge.is_complete() {
            return None;
        }

        let board = *session.judge.board();
        let verdict =
            evaluate_completion(&board, session.judge.total(), &session.level.completion);
        let result = RunResult {
            level_id: session.level.id.clone(),
            score: board.score,
            accuracy: verdict.accuracy,
            combo_max: board.combo_max,
            duration_ms: session.elapsed_ms,
            hit_counts: board.hit_counts,
            success: verdict.success,
        };

        if !self.machine.complete(verdict.success) {
            return None;
        }
        info!(
            level = %result.level_id,
            score = result.score,
            accuracy = result.accuracy,
            success = result.success,
            "run complete"
        );
        self.emit(EngineEvent::Completed(result.clone()));
        Some(result)
    }
}
