//! # Paceloop Core Library
//!
//! Core engine for Paceloop, a guided interval-walking coach: the user
//! alternates through fixed-length fast and slow walking phases for a
//! configured total duration, with audio/haptic cues at each transition.
//!
//! The engine is built to survive host suspension. Elapsed time is
//! always derived from wall-clock deltas, never from a tick counter, and
//! any gap in tick delivery is replayed second by second so phase
//! transitions fire exactly once no matter how long the process was
//! parked.
//!
//! ## Key Components
//!
//! - [`SessionController`]: phase state machine and cue/resource orchestration
//! - [`WallClockTimer`]: suspension-safe elapsed-time tracking
//! - [`CueDispatcher`]: best-effort audio and haptic transition cues
//! - [`Database`]: session history and parked engine state (SQLite)
//! - [`Config`]: TOML user preferences

pub mod error;
pub mod events;
pub mod session;
pub mod storage;

pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::Event;
pub use session::{
    CueDispatcher, CueOutput, CuePreference, NoopWakeLock, NullCueOutput, Phase, ResourceGuard,
    SessionConfig, SessionController, SessionState, SessionStore, SessionUpdate, ToneSpec,
    WakeLock, WallClockTimer,
};
pub use storage::{Config, Database, Stats, WalkSessionRow};
