//! Transition cue dispatch.
//!
//! Cues are an enhancement, never a correctness requirement: every
//! failure at the capability seam is caught, logged, and ignored. The
//! fast and slow patterns are deliberately distinct in both pitch and
//! repetition so they can be told apart without looking at a screen.

use serde::{Deserialize, Serialize};

use super::phase::Phase;

/// Audio cue mode, fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CuePreference {
    #[default]
    Beep,
    Voice,
}

/// A patterned tone: `repeats` pulses of `frequency_hz` lasting
/// `duration_ms` each, with `gap_ms` between pulses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToneSpec {
    pub frequency_hz: u32,
    pub duration_ms: u64,
    pub repeats: u32,
    pub gap_ms: u64,
}

/// Two quick high beeps announce the fast phase.
pub const FAST_TONE: ToneSpec = ToneSpec {
    frequency_hz: 1000,
    duration_ms: 150,
    repeats: 2,
    gap_ms: 200,
};

/// One long low beep announces the slow phase.
pub const SLOW_TONE: ToneSpec = ToneSpec {
    frequency_hz: 600,
    duration_ms: 300,
    repeats: 1,
    gap_ms: 0,
};

pub const FAST_PHRASE: &str = "Walk fast";
pub const SLOW_PHRASE: &str = "Walk slow";

/// Vibration on/off durations in milliseconds, per phase.
pub const FAST_VIBRATION: &[u64] = &[100, 50, 100];
pub const SLOW_VIBRATION: &[u64] = &[300];

/// Platform capability seam for producing cues.
///
/// Each method is independently optional: an implementation that lacks a
/// capability returns an error and the dispatcher degrades silently.
pub trait CueOutput {
    /// Bring the audio pipeline to a usable state. Platforms with
    /// autoplay policies may refuse until a user interaction has
    /// happened; the dispatcher retries before every emission.
    fn activate(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }

    fn play_tone(&mut self, tone: ToneSpec) -> Result<(), Box<dyn std::error::Error>>;

    fn speak(&mut self, phrase: &str) -> Result<(), Box<dyn std::error::Error>>;

    fn vibrate(&mut self, pattern: &[u64]) -> Result<(), Box<dyn std::error::Error>>;
}

/// Cue output that does nothing, for headless hosts and tests.
#[derive(Debug, Default)]
pub struct NullCueOutput;

impl CueOutput for NullCueOutput {
    fn play_tone(&mut self, _tone: ToneSpec) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }

    fn speak(&mut self, _phrase: &str) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }

    fn vibrate(&mut self, _pattern: &[u64]) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }
}

/// Emits the configured audio and haptic cues on phase transitions.
pub struct CueDispatcher {
    preference: CuePreference,
    haptics: bool,
    output: Box<dyn CueOutput>,
    activated: bool,
}

impl CueDispatcher {
    pub fn new(preference: CuePreference, haptics: bool, output: Box<dyn CueOutput>) -> Self {
        Self {
            preference,
            haptics,
            output,
            activated: false,
        }
    }

    pub fn preference(&self) -> CuePreference {
        self.preference
    }

    /// Opportunistic activation hook; call on any detected user
    /// interaction so the first transition cue is not lost to an
    /// autoplay policy.
    pub fn notify_interaction(&mut self) {
        self.ensure_active();
    }

    fn ensure_active(&mut self) {
        if self.activated {
            return;
        }
        match self.output.activate() {
            Ok(()) => self.activated = true,
            Err(e) => log::warn!("audio activation failed, will retry: {e}"),
        }
    }

    /// Emit the cue for a transition into `phase`. Non-active phases
    /// produce nothing.
    pub fn play_transition(&mut self, phase: Phase) {
        if !phase.is_active() {
            return;
        }
        self.ensure_active();
        let audio = match (self.preference, phase) {
            (CuePreference::Beep, Phase::Fast) => self.output.play_tone(FAST_TONE),
            (CuePreference::Beep, _) => self.output.play_tone(SLOW_TONE),
            (CuePreference::Voice, Phase::Fast) => self.output.speak(FAST_PHRASE),
            (CuePreference::Voice, _) => self.output.speak(SLOW_PHRASE),
        };
        if let Err(e) = audio {
            log::warn!("audio cue failed: {e}");
        }
        if self.haptics {
            let pattern = if phase == Phase::Fast {
                FAST_VIBRATION
            } else {
                SLOW_VIBRATION
            };
            if let Err(e) = self.output.vibrate(pattern) {
                log::warn!("haptic cue failed: {e}");
            }
        }
    }
}

impl std::fmt::Debug for CueDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CueDispatcher")
            .field("preference", &self.preference)
            .field("haptics", &self.haptics)
            .field("activated", &self.activated)
            .finish()
    }
}
