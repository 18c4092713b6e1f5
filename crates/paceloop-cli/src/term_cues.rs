//! Terminal rendition of the cue capability surface.
//!
//! Tones become BEL pulses, voice cues become printed phrases, and
//! haptics are simply absent (the dispatcher degrades without them).

use std::io::Write;
use std::time::Duration;

use paceloop_core::{CueOutput, ToneSpec};

#[derive(Debug, Default)]
pub struct TerminalCueOutput;

impl CueOutput for TerminalCueOutput {
    fn play_tone(&mut self, tone: ToneSpec) -> Result<(), Box<dyn std::error::Error>> {
        let mut out = std::io::stdout();
        for pulse in 0..tone.repeats {
            if pulse > 0 {
                std::thread::sleep(Duration::from_millis(tone.gap_ms));
            }
            write!(out, "\x07")?;
            out.flush()?;
        }
        Ok(())
    }

    fn speak(&mut self, phrase: &str) -> Result<(), Box<dyn std::error::Error>> {
        println!("cue: {phrase}");
        Ok(())
    }

    fn vibrate(&mut self, _pattern: &[u64]) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }
}
