mod clock;
mod controller;
mod cues;
mod phase;
mod wake;

pub use clock::WallClockTimer;
pub use controller::{
    SessionConfig, SessionController, SessionState, SessionStore, SessionUpdate,
    DEFAULT_PHASE_LEN_SECS, DURATION_CHOICES_MIN,
};
pub use cues::{
    CueDispatcher, CueOutput, CuePreference, NullCueOutput, ToneSpec, FAST_PHRASE, FAST_TONE,
    FAST_VIBRATION, SLOW_PHRASE, SLOW_TONE, SLOW_VIBRATION,
};
pub use phase::{cycles_completed, is_boundary, resolve_phase, Phase, PhaseSlot};
pub use wake::{NoopWakeLock, ResourceGuard, WakeLock};
