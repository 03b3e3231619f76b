//! # Music Theory Module
//!
//! Interval tables and the note generators built on them.
//!
//! ## Purpose
//! The generative editing tools never place pitches by hand. They ask this
//! module for:
//! 1. **Chords** - the pitches of a chord type stacked on a root (Add-Chord tool)
//! 2. **Runs** - the scale or arpeggio pitches between two pitches (Run tool)
//! 3. **Detection** - a root and chord label for a set of simultaneous notes
//!
//! ## Sub-modules
//! - `intervals` - `ChordType`, `ScaleType`, `RunPattern` and their interval tables
//! - `generate` - chord and run pitch generators
//! - `detect` - chord detection with inversion/voicing description
//!
//! ## Pitch Classes
//! Pitches are MIDI numbers (0-127, middle C = 60). Interval sets are stored as
//! 12-bit pitch-class masks (`PitchClassSet`), so "is this interval present" is
//! a single bit test regardless of octave.
//!
//! ## Example
//! ```rust
//! use keyroll::theory::{chord_pitches, detect_chord, ChordType};
//!
//! let pitches = chord_pitches(60, ChordType::Major);
//! assert_eq!(pitches, vec![60, 64, 67]);
//!
//! let chord = detect_chord(&pitches).unwrap();
//! assert_eq!(chord.root, 60);
//! assert_eq!(chord.label, "Major");
//! ```

mod detect;
mod generate;
mod intervals;


pub use detect::{detect_chord, label_chords, ChordLabel, DetectedChord, Inversion, Voicing};
pub use generate::{chord_pitches, run_pitches};
pub use intervals::{
    parse_key, pitch_name, ChordType, PitchClassSet, RunPattern, ScaleType, ARPEGGIO_SUFFIX,
};
