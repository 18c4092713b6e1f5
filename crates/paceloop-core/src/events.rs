use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::Phase;

/// Every observable state change in the walk engine produces an Event.
/// The CLI prints them as JSON; a GUI host would poll for them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    WalkStarted {
        session_id: Option<String>,
        duration_secs: u64,
        phase: Phase,
        at: DateTime<Utc>,
    },
    PhaseChanged {
        phase: Phase,
        interval_index: u64,
        intervals_completed: u64,
        at: DateTime<Utc>,
    },
    WalkPaused {
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    WalkResumed {
        phase: Phase,
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    /// The session reached its configured total duration.
    WalkCompleted {
        intervals_completed: u64,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    /// The session was ended by the user before completion.
    WalkStopped {
        elapsed_secs: u64,
        intervals_completed: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: Phase,
        elapsed_secs: u64,
        remaining_secs: u64,
        intervals_completed: u64,
        progress_pct: f64,
        phase_progress_pct: f64,
        at: DateTime<Utc>,
    },
}
