//! Pure phase arithmetic.
//!
//! Everything in this module is a function of its arguments only, so the
//! live 1 Hz tick path and the post-suspension replay path resolve the
//! same elapsed second to the same answer.

use serde::{Deserialize, Serialize};

/// Walking intensity state for a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Fast,
    Slow,
    Paused,
    #[default]
    Stopped,
}

impl Phase {
    /// `Fast` and `Slow` are the states in which time is ticking.
    pub fn is_active(self) -> bool {
        matches!(self, Phase::Fast | Phase::Slow)
    }
}

/// Result of resolving an elapsed time against the phase grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseSlot {
    /// Zero-based count of whole phase-length windows since start.
    pub interval_index: u64,
    /// `Fast` on even intervals, `Slow` on odd ones.
    pub phase: Phase,
}

/// Map an elapsed-seconds value to its interval index and phase.
pub fn resolve_phase(elapsed_secs: u64, phase_len_secs: u64) -> PhaseSlot {
    let len = phase_len_secs.max(1);
    let interval_index = elapsed_secs / len;
    let phase = if interval_index % 2 == 0 {
        Phase::Fast
    } else {
        Phase::Slow
    };
    PhaseSlot {
        interval_index,
        phase,
    }
}

/// A transition event occurs exactly when elapsed time lands on a
/// positive multiple of the phase length.
pub fn is_boundary(elapsed_secs: u64, phase_len_secs: u64) -> bool {
    let len = phase_len_secs.max(1);
    elapsed_secs > 0 && elapsed_secs % len == 0
}

/// Full fast+slow cycles finished once `interval_index` has been entered.
pub fn cycles_completed(interval_index: u64) -> u64 {
    interval_index / 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn boundary_table_for_180s_phases() {
        let cases = [
            (0, Phase::Fast, false),
            (179, Phase::Fast, false),
            (180, Phase::Slow, true),
            (359, Phase::Slow, false),
            (360, Phase::Fast, true),
        ];
        for (elapsed, phase, boundary) in cases {
            assert_eq!(resolve_phase(elapsed, 180).phase, phase, "at {elapsed}s");
            assert_eq!(is_boundary(elapsed, 180), boundary, "at {elapsed}s");
        }
    }

    #[test]
    fn interval_index_steps_on_boundaries() {
        assert_eq!(resolve_phase(0, 180).interval_index, 0);
        assert_eq!(resolve_phase(179, 180).interval_index, 0);
        assert_eq!(resolve_phase(180, 180).interval_index, 1);
        assert_eq!(resolve_phase(540, 180).interval_index, 3);
    }

    #[test]
    fn cycles_close_when_fast_reenters() {
        assert_eq!(cycles_completed(0), 0);
        assert_eq!(cycles_completed(1), 0);
        assert_eq!(cycles_completed(2), 1);
        assert_eq!(cycles_completed(7), 3);
    }

    #[test]
    fn zero_phase_length_does_not_panic() {
        let slot = resolve_phase(42, 0);
        assert_eq!(slot.interval_index, 42);
        assert!(!is_boundary(0, 0));
    }

    proptest! {
        #[test]
        fn resolve_is_deterministic(elapsed in 0u64..1_000_000, len in 1u64..10_000) {
            let a = resolve_phase(elapsed, len);
            let b = resolve_phase(elapsed, len);
            prop_assert_eq!(a, b);
            prop_assert_eq!(a.interval_index, elapsed / len);
            let expect = if (elapsed / len) % 2 == 0 { Phase::Fast } else { Phase::Slow };
            prop_assert_eq!(a.phase, expect);
        }

        #[test]
        fn boundary_implies_index_change(elapsed in 1u64..1_000_000, len in 1u64..10_000) {
            if is_boundary(elapsed, len) {
                let before = resolve_phase(elapsed - 1, len).interval_index;
                let at = resolve_phase(elapsed, len).interval_index;
                prop_assert_eq!(at, before + 1);
            }
        }
    }
}
