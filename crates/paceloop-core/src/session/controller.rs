//! Walk session orchestration.
//!
//! The controller owns the phase state machine and the resource handles
//! around it. Tick handling is split in two: [`resolve_tick`] decides
//! what an elapsed-second observation means without touching anything,
//! and [`SessionController::on_tick`] applies the outcome and dispatches
//! the side effects (cue, wake lock, persistence). That keeps the
//! transition logic auditable independently of any host render cycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::events::Event;
use crate::session::clock::{now_ms, WallClockTimer};
use crate::session::cues::{CueDispatcher, CuePreference};
use crate::session::phase::{self, Phase};
use crate::session::wake::ResourceGuard;

/// Durations a session may be configured with, in minutes. Which of
/// these a given user may pick is an entitlement decision made outside
/// this crate; the engine only refuses values not on the grid at all.
pub const DURATION_CHOICES_MIN: [u32; 4] = [15, 30, 45, 60];

/// Length of one fast or slow window.
pub const DEFAULT_PHASE_LEN_SECS: u64 = 180;

/// Immutable per-session configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub total_duration_secs: u64,
    pub phase_len_secs: u64,
    pub cue_preference: CuePreference,
    pub haptics: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            total_duration_secs: 15 * 60,
            phase_len_secs: DEFAULT_PHASE_LEN_SECS,
            cue_preference: CuePreference::default(),
            haptics: true,
        }
    }
}

impl SessionConfig {
    /// Build a config for one of the supported durations.
    pub fn for_duration(
        minutes: u32,
        cue_preference: CuePreference,
        haptics: bool,
    ) -> Result<Self, ValidationError> {
        if !DURATION_CHOICES_MIN.contains(&minutes) {
            return Err(ValidationError::UnsupportedDuration { minutes });
        }
        Ok(Self {
            total_duration_secs: u64::from(minutes) * 60,
            phase_len_secs: DEFAULT_PHASE_LEN_SECS,
            cue_preference,
            haptics,
        })
    }

    pub fn duration_min(&self) -> u32 {
        (self.total_duration_secs / 60) as u32
    }
}

/// Terminal patch written to the session record on stop/completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUpdate {
    pub completed_at: Option<DateTime<Utc>>,
    pub intervals_completed: u64,
    pub is_completed: bool,
}

/// Persistence collaborator. Writes are fire-and-forget: the controller
/// logs failures and keeps its in-memory state regardless.
pub trait SessionStore {
    fn create_session(
        &mut self,
        actor_id: &str,
        duration_min: u32,
    ) -> Result<String, Box<dyn std::error::Error>>;

    fn update_session(
        &mut self,
        session_id: &str,
        update: &SessionUpdate,
    ) -> Result<(), Box<dyn std::error::Error>>;
}

/// Serializable session state, parked in storage between host
/// invocations the same way the timer state is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub phase: Phase,
    #[serde(default)]
    pub session_id: Option<String>,
    /// Dedup marker: interval index of the most recently fired
    /// transition. Monotonically non-decreasing while a session runs.
    #[serde(default)]
    pub last_fired_interval: Option<u64>,
    #[serde(default)]
    pub intervals_completed: u64,
    #[serde(default)]
    pub config: SessionConfig,
    #[serde(default)]
    pub timer: WallClockTimer,
}

/// What a single elapsed-second observation means for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TickOutcome {
    Ignore,
    Complete,
    Transition { interval_index: u64, phase: Phase },
}

/// Pure tick resolution. Completion is checked before pause
/// suppression, and the dedup marker guarantees a boundary fires at
/// most once no matter how often the same elapsed value is delivered.
fn resolve_tick(state: &SessionState, elapsed_secs: u64) -> TickOutcome {
    if state.phase == Phase::Stopped {
        return TickOutcome::Ignore;
    }
    if elapsed_secs >= state.config.total_duration_secs {
        return TickOutcome::Complete;
    }
    if state.phase == Phase::Paused {
        return TickOutcome::Ignore;
    }
    if !phase::is_boundary(elapsed_secs, state.config.phase_len_secs) {
        return TickOutcome::Ignore;
    }
    let slot = phase::resolve_phase(elapsed_secs, state.config.phase_len_secs);
    if let Some(marker) = state.last_fired_interval {
        if slot.interval_index <= marker {
            return TickOutcome::Ignore;
        }
    }
    TickOutcome::Transition {
        interval_index: slot.interval_index,
        phase: slot.phase,
    }
}

/// Top-level orchestrator for one walk session.
pub struct SessionController {
    state: SessionState,
    actor_id: Option<String>,
    store: Box<dyn SessionStore>,
    cues: CueDispatcher,
    wake: ResourceGuard,
}

impl SessionController {
    pub fn new(
        state: SessionState,
        actor_id: Option<String>,
        store: Box<dyn SessionStore>,
        cues: CueDispatcher,
        wake: ResourceGuard,
    ) -> Self {
        Self {
            state,
            actor_id,
            store,
            cues,
            wake,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Hand the serializable state back for parking. The wake guard is
    /// dropped here, which releases the lock on this exit path too.
    pub fn into_state(self) -> SessionState {
        self.state
    }

    pub fn current_phase(&self) -> Phase {
        self.state.phase
    }

    pub fn is_active(&self) -> bool {
        self.state.phase != Phase::Stopped
    }

    pub fn intervals_completed(&self) -> u64 {
        self.state.intervals_completed
    }

    pub fn time_elapsed_at(&self, now_ms: u64) -> u64 {
        self.state.timer.elapsed_secs_at(now_ms)
    }

    pub fn time_elapsed(&self) -> u64 {
        self.time_elapsed_at(now_ms())
    }

    pub fn time_remaining_at(&self, now_ms: u64) -> u64 {
        self.state
            .config
            .total_duration_secs
            .saturating_sub(self.time_elapsed_at(now_ms))
    }

    pub fn time_remaining(&self) -> u64 {
        self.time_remaining_at(now_ms())
    }

    /// Whole-session progress, 0..=100.
    pub fn progress_at(&self, now_ms: u64) -> f64 {
        let total = self.state.config.total_duration_secs;
        if total == 0 {
            return 0.0;
        }
        (self.time_elapsed_at(now_ms) as f64 / total as f64 * 100.0).min(100.0)
    }

    pub fn progress(&self) -> f64 {
        self.progress_at(now_ms())
    }

    /// Progress within the current phase-length window, 0..=100.
    pub fn phase_progress_at(&self, now_ms: u64) -> f64 {
        let len = self.state.config.phase_len_secs.max(1);
        (self.time_elapsed_at(now_ms) % len) as f64 / len as f64 * 100.0
    }

    pub fn phase_progress(&self) -> f64 {
        self.phase_progress_at(now_ms())
    }

    pub fn snapshot_at(&self, now_ms: u64) -> Event {
        Event::StateSnapshot {
            phase: self.state.phase,
            elapsed_secs: self.time_elapsed_at(now_ms),
            remaining_secs: self.time_remaining_at(now_ms),
            intervals_completed: self.state.intervals_completed,
            progress_pct: self.progress_at(now_ms),
            phase_progress_pct: self.phase_progress_at(now_ms),
            at: Utc::now(),
        }
    }

    pub fn snapshot(&self) -> Event {
        self.snapshot_at(now_ms())
    }

    /// Forward a detected user interaction to the cue layer so a
    /// suspended audio pipeline can be unlocked early.
    pub fn notify_interaction(&mut self) {
        self.cues.notify_interaction();
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a session. Interval 0 is entered immediately: the fast cue
    /// fires without waiting for a boundary tick. No-op when a session
    /// is already underway or no actor is available.
    pub fn start_walk_at(&mut self, config: SessionConfig, now_ms: u64) -> Option<Event> {
        if self.state.phase != Phase::Stopped {
            return None;
        }
        let Some(actor_id) = self.actor_id.clone() else {
            log::debug!("start_walk without an actor is a no-op");
            return None;
        };
        let session_id = match self.store.create_session(&actor_id, config.duration_min()) {
            Ok(id) => Some(id),
            Err(e) => {
                // The walk still runs; only the history record is lost.
                log::error!("failed to create session record: {e}");
                None
            }
        };
        let duration_secs = config.total_duration_secs;
        self.state.config = config;
        self.state.session_id = session_id.clone();
        self.state.intervals_completed = 0;
        self.state.last_fired_interval = Some(0);
        self.state.phase = Phase::Fast;
        self.state.timer.stop();
        self.state.timer.start_at(now_ms);
        self.wake.acquire();
        self.cues.play_transition(Phase::Fast);
        Some(Event::WalkStarted {
            session_id,
            duration_secs,
            phase: Phase::Fast,
            at: Utc::now(),
        })
    }

    pub fn start_walk(&mut self, config: SessionConfig) -> Option<Event> {
        self.start_walk_at(config, now_ms())
    }

    /// Process one elapsed-second observation. Safe under repeated or
    /// non-increasing values: re-delivery of a second that already fired
    /// is absorbed by the dedup marker, and a completed session ignores
    /// everything.
    pub fn on_tick(&mut self, elapsed_secs: u64) -> Option<Event> {
        match resolve_tick(&self.state, elapsed_secs) {
            TickOutcome::Ignore => None,
            TickOutcome::Complete => Some(self.finish(true, elapsed_secs)),
            TickOutcome::Transition {
                interval_index,
                phase,
            } => {
                self.state.phase = phase;
                self.state.last_fired_interval = Some(interval_index);
                if phase == Phase::Fast {
                    // A full fast+slow cycle just closed.
                    self.state.intervals_completed = phase::cycles_completed(interval_index);
                }
                self.cues.play_transition(phase);
                Some(Event::PhaseChanged {
                    phase,
                    interval_index,
                    intervals_completed: self.state.intervals_completed,
                    at: Utc::now(),
                })
            }
        }
    }

    /// Pull pending ticks from the timer and process them in order.
    /// After a suspension this replays every missed second, so no
    /// boundary is skipped; processing halts as soon as the session
    /// reaches a terminal state.
    pub fn poll_at(&mut self, now_ms: u64) -> Vec<Event> {
        let mut events = Vec::new();
        for second in self.state.timer.poll_at(now_ms) {
            if let Some(event) = self.on_tick(second) {
                events.push(event);
            }
            if self.state.phase == Phase::Stopped {
                break;
            }
        }
        events
    }

    pub fn poll(&mut self) -> Vec<Event> {
        self.poll_at(now_ms())
    }

    /// Toggle pause. Pausing freezes the timer and suppresses
    /// transitions; resuming recomputes the phase from the true elapsed
    /// time, not the phase frozen at pause.
    pub fn pause_walk_at(&mut self, now_ms: u64) -> Option<Event> {
        match self.state.phase {
            Phase::Stopped => None,
            Phase::Paused => {
                self.state.timer.resume_at(now_ms);
                let elapsed = self.state.timer.elapsed_secs_at(now_ms);
                let cycle = self.state.config.phase_len_secs.max(1) * 2;
                self.state.phase = if elapsed % cycle < self.state.config.phase_len_secs.max(1) {
                    Phase::Fast
                } else {
                    Phase::Slow
                };
                Some(Event::WalkResumed {
                    phase: self.state.phase,
                    elapsed_secs: elapsed,
                    at: Utc::now(),
                })
            }
            Phase::Fast | Phase::Slow => {
                self.state.timer.pause_at(now_ms);
                self.state.phase = Phase::Paused;
                Some(Event::WalkPaused {
                    elapsed_secs: self.state.timer.elapsed_secs_at(now_ms),
                    at: Utc::now(),
                })
            }
        }
    }

    pub fn pause_walk(&mut self) -> Option<Event> {
        self.pause_walk_at(now_ms())
    }

    /// End the session explicitly. Completion status is judged from the
    /// elapsed time at the moment of the stop. No-op when stopped.
    pub fn stop_walk_at(&mut self, now_ms: u64) -> Option<Event> {
        if self.state.phase == Phase::Stopped {
            return None;
        }
        let elapsed = self.state.timer.elapsed_secs_at(now_ms);
        let completed = elapsed >= self.state.config.total_duration_secs;
        Some(self.finish(completed, elapsed))
    }

    pub fn stop_walk(&mut self) -> Option<Event> {
        self.stop_walk_at(now_ms())
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Single terminal path for completion, explicit stop, and teardown:
    /// one persistence write, phase to `Stopped`, timer and wake lock
    /// released. Clearing `session_id` first makes a second write
    /// impossible even if this is re-entered.
    fn finish(&mut self, completed: bool, elapsed_secs: u64) -> Event {
        if let Some(session_id) = self.state.session_id.take() {
            let update = SessionUpdate {
                completed_at: Some(Utc::now()),
                intervals_completed: self.state.intervals_completed,
                is_completed: completed,
            };
            if let Err(e) = self.store.update_session(&session_id, &update) {
                log::error!("failed to finalize session record: {e}");
            }
        }
        let intervals_completed = self.state.intervals_completed;
        let duration_secs = self.state.config.total_duration_secs;
        self.state.phase = Phase::Stopped;
        self.state.timer.stop();
        self.wake.release();
        if completed {
            Event::WalkCompleted {
                intervals_completed,
                duration_secs,
                at: Utc::now(),
            }
        } else {
            Event::WalkStopped {
                elapsed_secs,
                intervals_completed,
                at: Utc::now(),
            }
        }
    }
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("state", &self.state)
            .field("actor_id", &self.actor_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::cues::{CueOutput, ToneSpec};
    use crate::session::wake::WakeLock;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct StoreLog {
        created: Vec<(String, u32)>,
        updates: Vec<(String, SessionUpdate)>,
        fail_create: bool,
    }

    struct RecordingStore(Rc<RefCell<StoreLog>>);

    impl SessionStore for RecordingStore {
        fn create_session(
            &mut self,
            actor_id: &str,
            duration_min: u32,
        ) -> Result<String, Box<dyn std::error::Error>> {
            let mut log = self.0.borrow_mut();
            if log.fail_create {
                return Err("storage offline".into());
            }
            log.created.push((actor_id.to_string(), duration_min));
            Ok(format!("session-{}", log.created.len()))
        }

        fn update_session(
            &mut self,
            session_id: &str,
            update: &SessionUpdate,
        ) -> Result<(), Box<dyn std::error::Error>> {
            self.0
                .borrow_mut()
                .updates
                .push((session_id.to_string(), update.clone()));
            Ok(())
        }
    }

    struct RecordingCues(Rc<RefCell<Vec<Phase>>>);

    impl CueOutput for RecordingCues {
        fn play_tone(&mut self, tone: ToneSpec) -> Result<(), Box<dyn std::error::Error>> {
            self.0.borrow_mut().push(if tone.frequency_hz == 1000 {
                Phase::Fast
            } else {
                Phase::Slow
            });
            Ok(())
        }

        fn speak(&mut self, _phrase: &str) -> Result<(), Box<dyn std::error::Error>> {
            Ok(())
        }

        fn vibrate(&mut self, _pattern: &[u64]) -> Result<(), Box<dyn std::error::Error>> {
            Ok(())
        }
    }

    struct RecordingLock(Rc<RefCell<(u32, u32)>>);

    impl WakeLock for RecordingLock {
        fn acquire(&mut self) -> Result<(), Box<dyn std::error::Error>> {
            self.0.borrow_mut().0 += 1;
            Ok(())
        }

        fn release(&mut self) -> Result<(), Box<dyn std::error::Error>> {
            self.0.borrow_mut().1 += 1;
            Ok(())
        }
    }

    struct Harness {
        controller: SessionController,
        store: Rc<RefCell<StoreLog>>,
        cues: Rc<RefCell<Vec<Phase>>>,
        lock: Rc<RefCell<(u32, u32)>>,
    }

    fn harness_with_actor(actor: Option<&str>) -> Harness {
        let store = Rc::new(RefCell::new(StoreLog::default()));
        let cues = Rc::new(RefCell::new(Vec::new()));
        let lock = Rc::new(RefCell::new((0, 0)));
        let controller = SessionController::new(
            SessionState::default(),
            actor.map(String::from),
            Box::new(RecordingStore(store.clone())),
            CueDispatcher::new(CuePreference::Beep, false, Box::new(RecordingCues(cues.clone()))),
            ResourceGuard::new(Box::new(RecordingLock(lock.clone()))),
        );
        Harness {
            controller,
            store,
            cues,
            lock,
        }
    }

    fn harness() -> Harness {
        harness_with_actor(Some("walker-1"))
    }

    fn config_15min() -> SessionConfig {
        SessionConfig::for_duration(15, CuePreference::Beep, false).unwrap()
    }

    #[test]
    fn start_enters_fast_and_cues_interval_zero() {
        let mut h = harness();
        let event = h.controller.start_walk_at(config_15min(), 0);
        assert!(matches!(event, Some(Event::WalkStarted { .. })));
        assert_eq!(h.controller.current_phase(), Phase::Fast);
        assert!(h.controller.is_active());
        assert_eq!(*h.cues.borrow(), vec![Phase::Fast]);
        assert_eq!(h.store.borrow().created, vec![("walker-1".to_string(), 15)]);
        assert_eq!(h.lock.borrow().0, 1);
    }

    #[test]
    fn start_is_noop_without_actor() {
        let mut h = harness_with_actor(None);
        assert!(h.controller.start_walk_at(config_15min(), 0).is_none());
        assert_eq!(h.controller.current_phase(), Phase::Stopped);
        assert!(h.store.borrow().created.is_empty());
    }

    #[test]
    fn start_is_noop_while_active() {
        let mut h = harness();
        h.controller.start_walk_at(config_15min(), 0);
        assert!(h.controller.start_walk_at(config_15min(), 5_000).is_none());
        assert_eq!(h.store.borrow().created.len(), 1);
    }

    #[test]
    fn create_failure_still_starts_the_walk() {
        let mut h = harness();
        h.store.borrow_mut().fail_create = true;
        let event = h.controller.start_walk_at(config_15min(), 0);
        assert!(matches!(
            event,
            Some(Event::WalkStarted {
                session_id: None,
                ..
            })
        ));
        assert_eq!(h.controller.current_phase(), Phase::Fast);
        // Terminal write is skipped with no record to update.
        h.controller.stop_walk_at(60_000);
        assert!(h.store.borrow().updates.is_empty());
    }

    #[test]
    fn boundary_ticks_change_phase() {
        let mut h = harness();
        h.controller.start_walk_at(config_15min(), 0);
        assert!(h.controller.on_tick(179).is_none());
        let event = h.controller.on_tick(180);
        match event {
            Some(Event::PhaseChanged {
                phase,
                interval_index,
                ..
            }) => {
                assert_eq!(phase, Phase::Slow);
                assert_eq!(interval_index, 1);
            }
            other => panic!("expected PhaseChanged, got {other:?}"),
        }
        assert_eq!(h.controller.current_phase(), Phase::Slow);
    }

    #[test]
    fn repeated_elapsed_values_never_refire() {
        let mut h = harness();
        h.controller.start_walk_at(config_15min(), 0);
        assert!(h.controller.on_tick(180).is_some());
        assert!(h.controller.on_tick(180).is_none());
        assert!(h.controller.on_tick(179).is_none());
        assert!(h.controller.on_tick(180).is_none());
        // Only the start cue and one transition cue.
        assert_eq!(*h.cues.borrow(), vec![Phase::Fast, Phase::Slow]);
    }

    #[test]
    fn suspension_replay_fires_each_boundary_once() {
        let mut h = harness();
        h.controller.start_walk_at(config_15min(), 0);
        let _ = h.controller.poll_at(10_000);
        assert_eq!(h.controller.state().timer.last_emitted_elapsed_secs(), 10);
        // Process suspended until start + 605s.
        let events = h.controller.poll_at(605_000);
        let fired: Vec<(Phase, u64)> = events
            .iter()
            .filter_map(|e| match e {
                Event::PhaseChanged {
                    phase,
                    interval_index,
                    ..
                } => Some((*phase, *interval_index)),
                _ => None,
            })
            .collect();
        assert_eq!(
            fired,
            vec![(Phase::Slow, 1), (Phase::Fast, 2), (Phase::Slow, 3)]
        );
        assert_eq!(h.controller.current_phase(), Phase::Slow);
        assert_eq!(h.controller.intervals_completed(), 1);
        assert_eq!(
            *h.cues.borrow(),
            vec![Phase::Fast, Phase::Slow, Phase::Fast, Phase::Slow]
        );
    }

    #[test]
    fn pause_suppresses_transitions() {
        let mut h = harness();
        h.controller.start_walk_at(config_15min(), 0);
        let _ = h.controller.poll_at(100_000);
        let paused = h.controller.pause_walk_at(100_000);
        assert!(matches!(paused, Some(Event::WalkPaused { .. })));
        assert_eq!(h.controller.current_phase(), Phase::Paused);
        // A boundary crossing while paused changes nothing.
        assert!(h.controller.on_tick(180).is_none());
        assert_eq!(h.controller.current_phase(), Phase::Paused);
        assert_eq!(*h.cues.borrow(), vec![Phase::Fast]);
    }

    #[test]
    fn resume_rederives_phase_from_true_elapsed() {
        let mut h = harness();
        h.controller.start_walk_at(config_15min(), 0);
        // 200s in: second interval, slow phase.
        let _ = h.controller.poll_at(200_000);
        assert_eq!(h.controller.current_phase(), Phase::Slow);
        h.controller.pause_walk_at(200_000);
        // Long pause; elapsed stays frozen at 200s.
        let resumed = h.controller.pause_walk_at(900_000);
        match resumed {
            Some(Event::WalkResumed {
                phase,
                elapsed_secs,
                ..
            }) => {
                assert_eq!(phase, Phase::Slow);
                assert_eq!(elapsed_secs, 200);
            }
            other => panic!("expected WalkResumed, got {other:?}"),
        }
        // Timer continues from 200s: boundary at 360 arrives 160s later.
        let events = h.controller.poll_at(900_000 + 160_000);
        assert!(events.iter().any(|e| matches!(
            e,
            Event::PhaseChanged {
                phase: Phase::Fast,
                interval_index: 2,
                ..
            }
        )));
    }

    #[test]
    fn completion_writes_exactly_one_terminal_update() {
        let mut h = harness();
        h.controller.start_walk_at(config_15min(), 0);
        let event = h.controller.on_tick(900);
        assert!(matches!(event, Some(Event::WalkCompleted { .. })));
        assert_eq!(h.controller.current_phase(), Phase::Stopped);
        assert!(!h.controller.is_active());
        // No further processing after completion.
        assert!(h.controller.on_tick(901).is_none());
        assert!(h.controller.stop_walk_at(901_000).is_none());
        let log = h.store.borrow();
        assert_eq!(log.updates.len(), 1);
        let (id, update) = &log.updates[0];
        assert_eq!(id, "session-1");
        assert!(update.is_completed);
        assert!(update.completed_at.is_some());
        assert_eq!(h.lock.borrow().1, 1);
    }

    #[test]
    fn completion_via_poll_stops_the_burst() {
        let mut h = harness();
        h.controller.start_walk_at(config_15min(), 0);
        // Suspended past the end of the session.
        let events = h.controller.poll_at(2_000_000);
        assert!(matches!(events.last(), Some(Event::WalkCompleted { .. })));
        assert_eq!(h.store.borrow().updates.len(), 1);
        // Transitions before the 900s mark still fired, in order.
        let changes = events
            .iter()
            .filter(|e| matches!(e, Event::PhaseChanged { .. }))
            .count();
        assert_eq!(changes, 4); // 180, 360, 540, 720
    }

    #[test]
    fn early_stop_is_not_a_completion() {
        let mut h = harness();
        h.controller.start_walk_at(config_15min(), 0);
        let _ = h.controller.poll_at(200_000);
        let event = h.controller.stop_walk_at(200_000);
        match event {
            Some(Event::WalkStopped { elapsed_secs, .. }) => assert_eq!(elapsed_secs, 200),
            other => panic!("expected WalkStopped, got {other:?}"),
        }
        let log = h.store.borrow();
        assert_eq!(log.updates.len(), 1);
        assert!(!log.updates[0].1.is_completed);
        assert_eq!(h.controller.current_phase(), Phase::Stopped);
        assert!(h.controller.state().session_id.is_none());
        assert_eq!(h.lock.borrow().1, 1);
    }

    #[test]
    fn stop_past_duration_counts_as_completed() {
        let mut h = harness();
        h.controller.start_walk_at(config_15min(), 0);
        // Timer ran past the total but no tick was processed yet.
        let event = h.controller.stop_walk_at(950_000);
        assert!(matches!(event, Some(Event::WalkCompleted { .. })));
        assert!(h.store.borrow().updates[0].1.is_completed);
    }

    #[test]
    fn intervals_complete_on_reentry_to_fast() {
        let mut h = harness();
        h.controller.start_walk_at(config_15min(), 0);
        h.controller.on_tick(180);
        assert_eq!(h.controller.intervals_completed(), 0);
        h.controller.on_tick(360);
        assert_eq!(h.controller.intervals_completed(), 1);
        h.controller.on_tick(540);
        assert_eq!(h.controller.intervals_completed(), 1);
        h.controller.on_tick(720);
        assert_eq!(h.controller.intervals_completed(), 2);
    }

    #[test]
    fn progress_math() {
        let mut h = harness();
        h.controller.start_walk_at(config_15min(), 0);
        assert_eq!(h.controller.time_elapsed_at(450_000), 450);
        assert_eq!(h.controller.time_remaining_at(450_000), 450);
        assert!((h.controller.progress_at(450_000) - 50.0).abs() < f64::EPSILON);
        // 450 % 180 = 90 -> halfway through the window.
        assert!((h.controller.phase_progress_at(450_000) - 50.0).abs() < f64::EPSILON);
        // Progress clamps at 100 past the end.
        assert!((h.controller.progress_at(2_000_000) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn state_roundtrips_through_serde() {
        let mut h = harness();
        h.controller.start_walk_at(config_15min(), 0);
        let _ = h.controller.poll_at(200_000);
        let json = serde_json::to_string(h.controller.state()).unwrap();
        let state: SessionState = serde_json::from_str(&json).unwrap();
        assert_eq!(state.phase, Phase::Slow);
        assert_eq!(state.last_fired_interval, Some(1));
        assert_eq!(state.session_id.as_deref(), Some("session-1"));
    }

    #[test]
    fn unsupported_duration_is_rejected() {
        assert!(SessionConfig::for_duration(25, CuePreference::Beep, true).is_err());
        for minutes in DURATION_CHOICES_MIN {
            assert!(SessionConfig::for_duration(minutes, CuePreference::Beep, true).is_ok());
        }
    }
}
