//! # Grid Quantization
//!
//! Snaps times to a musical grid derived from the selected note duration and
//! the time signature.
//!
//! ## Reference Tempo
//! The grid is computed at a fixed reference tempo (120 BPM unless configured
//! otherwise), NOT at the song's tempo. Changing playback speed therefore never
//! moves grid lines or snap points.
//!
//! ## Grid Size
//! ```text
//! beat_duration     = 60 / reference_tempo
//! grid_size_in_beats = duration_fraction * beat_type      (1/4 in 4/4 = 1 beat)
//! grid_size         = beat_duration * grid_size_in_beats / 2
//! ```
//! The halving keeps the drawn subdivision lines on snap points.
//!
//! ## Example
//! ```rust
//! use keyroll::{NoteDuration, Quantizer, TimeSignature};
//!
//! let q = Quantizer::new(120.0, TimeSignature::default());
//! assert_eq!(q.grid_size(NoteDuration::Quarter), 0.25);
//! assert_eq!(q.snap(0.3, NoteDuration::Quarter), 0.25);
//! assert_eq!(q.snap(0.4, NoteDuration::Quarter), 0.5);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EditError;

/// Selected note duration token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub enum NoteDuration {
    #[serde(rename = "1/16")]
    Sixteenth,
    #[serde(rename = "1/8")]
    Eighth,
    #[serde(rename = "1/4")]
    Quarter,
    #[serde(rename = "1/2")]
    Half,
    #[serde(rename = "1")]
    Whole,
}

impl NoteDuration {
    const ORDER: [NoteDuration; 5] = [
        NoteDuration::Sixteenth,
        NoteDuration::Eighth,
        NoteDuration::Quarter,
        NoteDuration::Half,
        NoteDuration::Whole,
    ];

    /// Fraction of a whole note.
    pub fn fraction(self) -> f64 {
        match self {
            NoteDuration::Sixteenth => 1.0 / 16.0,
            NoteDuration::Eighth => 1.0 / 8.0,
            NoteDuration::Quarter => 1.0 / 4.0,
            NoteDuration::Half => 1.0 / 2.0,
            NoteDuration::Whole => 1.0,
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            NoteDuration::Sixteenth => "1/16",
            NoteDuration::Eighth => "1/8",
            NoteDuration::Quarter => "1/4",
            NoteDuration::Half => "1/2",
            NoteDuration::Whole => "1",
        }
    }

    /// Next shorter duration, saturating at 1/16.
    pub fn shorter(self) -> Self {
        let i = Self::ORDER.iter().position(|d| *d == self).unwrap_or(0);
        Self::ORDER[i.saturating_sub(1)]
    }

    /// Next longer duration, saturating at a whole note.
    pub fn longer(self) -> Self {
        let i = Self::ORDER.iter().position(|d| *d == self).unwrap_or(0);
        Self::ORDER[(i + 1).min(Self::ORDER.len() - 1)]
    }
}

impl Default for NoteDuration {
    fn default() -> Self {
        NoteDuration::Quarter
    }
}

impl FromStr for NoteDuration {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1/16" | "sixteenth" => Ok(NoteDuration::Sixteenth),
            "1/8" | "eighth" => Ok(NoteDuration::Eighth),
            "1/4" | "quarter" => Ok(NoteDuration::Quarter),
            "1/2" | "half" => Ok(NoteDuration::Half),
            "1" | "1/1" | "whole" => Ok(NoteDuration::Whole),
            _ => Err(EditError::UnknownDuration(s.to_string())),
        }
    }
}

impl fmt::Display for NoteDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Time signature (e.g., 4/4, 3/4, 6/8)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSignature {
    pub beats: u8,
    pub beat_type: u8,
}

impl Default for TimeSignature {
    fn default() -> Self {
        TimeSignature {
            beats: 4,
            beat_type: 4,
        }
    }
}

/// Grid snapping at a fixed reference tempo.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantizer {
    reference_tempo: f64,
    time_signature: TimeSignature,
}

impl Quantizer {
    pub fn new(reference_tempo: f64, time_signature: TimeSignature) -> Self {
        Self {
            reference_tempo,
            time_signature,
        }
    }

    pub fn time_signature(&self) -> TimeSignature {
        self.time_signature
    }

    pub fn set_time_signature(&mut self, time_signature: TimeSignature) {
        self.time_signature = time_signature;
    }

    /// Seconds per beat at the reference tempo.
    pub fn beat_duration(&self) -> f64 {
        60.0 / self.reference_tempo
    }

    pub fn grid_size_in_beats(&self, duration: NoteDuration) -> f64 {
        duration.fraction() * self.time_signature.beat_type as f64
    }

    /// Distance between snap points, in seconds.
    pub fn grid_size(&self, duration: NoteDuration) -> f64 {
        self.beat_duration() * self.grid_size_in_beats(duration) / 2.0
    }

    /// Length in seconds of a note of `duration` at the reference tempo.
    pub fn note_length(&self, duration: NoteDuration) -> f64 {
        self.beat_duration() * self.grid_size_in_beats(duration)
    }

    /// Shortest duration any note may have: one 1/16 grid unit.
    pub fn minimum_duration(&self) -> f64 {
        self.grid_size(NoteDuration::Sixteenth)
    }

    /// Round `time` to the nearest grid point; never negative.
    pub fn snap(&self, time: f64, duration: NoteDuration) -> f64 {
        let grid = self.grid_size(duration);
        ((time / grid).round() * grid).max(0.0)
    }

    /// Round a dragged duration to the grid with a floor of one grid unit.
    pub fn snap_duration(&self, length: f64, duration: NoteDuration) -> f64 {
        let grid = self.grid_size(duration);
        ((length / grid).round() * grid).max(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quantizer() -> Quantizer {
        Quantizer::new(120.0, TimeSignature::default())
    }

    #[test]
    fn test_grid_sizes_in_common_time() {
        let q = quantizer();
        assert_eq!(q.beat_duration(), 0.5);
        assert_eq!(q.grid_size(NoteDuration::Sixteenth), 0.0625);
        assert_eq!(q.grid_size(NoteDuration::Eighth), 0.125);
        assert_eq!(q.grid_size(NoteDuration::Quarter), 0.25);
        assert_eq!(q.grid_size(NoteDuration::Whole), 1.0);
        assert_eq!(q.note_length(NoteDuration::Quarter), 0.5);
        assert_eq!(q.minimum_duration(), 0.0625);
    }

    #[test]
    fn test_beat_type_scales_grid() {
        let q = Quantizer::new(120.0, TimeSignature { beats: 6, beat_type: 8 });
        // A quarter note is two eighth-note beats in 6/8
        assert_eq!(q.grid_size_in_beats(NoteDuration::Quarter), 2.0);
        assert_eq!(q.grid_size(NoteDuration::Quarter), 0.5);
    }

    #[test]
    fn test_snap_rounds_to_nearest() {
        let q = quantizer();
        assert_eq!(q.snap(0.0, NoteDuration::Quarter), 0.0);
        assert_eq!(q.snap(0.12, NoteDuration::Quarter), 0.0);
        assert_eq!(q.snap(0.13, NoteDuration::Quarter), 0.25);
        assert_eq!(q.snap(1.9, NoteDuration::Half), 2.0);
        assert_eq!(q.snap(-0.3, NoteDuration::Quarter), 0.0);
    }

    #[test]
    fn test_snap_idempotent() {
        let q = quantizer();
        for duration in NoteDuration::ORDER {
            let mut t = 0.0;
            while t < 20.0 {
                let once = q.snap(t, duration);
                assert_eq!(q.snap(once, duration), once, "t={} duration={}", t, duration);
                t += 0.0137;
            }
        }
    }

    #[test]
    fn test_snap_duration_floor() {
        let q = quantizer();
        assert_eq!(q.snap_duration(0.01, NoteDuration::Quarter), 0.25);
        assert_eq!(q.snap_duration(0.6, NoteDuration::Quarter), 0.5);
        assert_eq!(q.snap_duration(0.7, NoteDuration::Eighth), 0.75);
    }

    #[test]
    fn test_duration_cycling_saturates() {
        assert_eq!(NoteDuration::Sixteenth.shorter(), NoteDuration::Sixteenth);
        assert_eq!(NoteDuration::Quarter.shorter(), NoteDuration::Eighth);
        assert_eq!(NoteDuration::Quarter.longer(), NoteDuration::Half);
        assert_eq!(NoteDuration::Whole.longer(), NoteDuration::Whole);
    }

    #[test]
    fn test_duration_parsing() {
        assert_eq!("1/8".parse::<NoteDuration>().unwrap(), NoteDuration::Eighth);
        assert_eq!("whole".parse::<NoteDuration>().unwrap(), NoteDuration::Whole);
        assert!("1/3".parse::<NoteDuration>().is_err());
    }
}
