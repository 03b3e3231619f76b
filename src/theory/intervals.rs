//! Interval tables for chords and scales
//!
//! Chord intervals may exceed an octave (9th chords); scale intervals are
//! always within one octave and start at 0.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EditError;

/// Run pattern names ending in this suffix are arpeggios of the named chord
/// (`"min7-arp"`), everything else names a scale.
pub const ARPEGGIO_SUFFIX: &str = "-arp";

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Set of pitch classes (0 = root .. 11 = major seventh) as a 12-bit mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PitchClassSet(u16);

impl PitchClassSet {
    pub const fn empty() -> Self {
        PitchClassSet(0)
    }

    /// Build a set from semitone intervals; intervals above an octave fold down.
    pub const fn from_intervals(intervals: &[u8]) -> Self {
        let mut mask = 0u16;
        let mut i = 0;
        while i < intervals.len() {
            mask |= 1 << (intervals[i] % 12);
            i += 1;
        }
        PitchClassSet(mask)
    }

    /// Pitch classes of `pitches` measured from `root`.
    pub fn relative_to(root: u8, pitches: &[u8]) -> Self {
        let mut mask = 0u16;
        for &p in pitches {
            let interval = (p as i16 - root as i16).rem_euclid(12);
            mask |= 1 << interval;
        }
        PitchClassSet(mask)
    }

    pub fn contains(self, interval: u8) -> bool {
        self.0 & (1 << (interval % 12)) != 0
    }

    pub fn is_subset_of(self, other: PitchClassSet) -> bool {
        self.0 & !other.0 == 0
    }

    pub fn len(self) -> u32 {
        self.0.count_ones()
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn union(self, other: PitchClassSet) -> PitchClassSet {
        PitchClassSet(self.0 | other.0)
    }

    pub fn difference(self, other: PitchClassSet) -> PitchClassSet {
        PitchClassSet(self.0 & !other.0)
    }
}

/// Chord types available to the Add-Chord tool and to arpeggio runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChordType {
    Major,
    Minor,
    Diminished,
    Augmented,
    Sus2,
    Sus4,
    Power,
    Major6,
    Minor6,
    Dominant7,
    Major7,
    Minor7,
    MinorMajor7,
    HalfDiminished7,
    Diminished7,
    Add9,
    Dominant9,
    Major9,
    Minor9,
}

impl ChordType {
    pub const ALL: [ChordType; 19] = [
        ChordType::Major,
        ChordType::Minor,
        ChordType::Diminished,
        ChordType::Augmented,
        ChordType::Sus2,
        ChordType::Sus4,
        ChordType::Power,
        ChordType::Major6,
        ChordType::Minor6,
        ChordType::Dominant7,
        ChordType::Major7,
        ChordType::Minor7,
        ChordType::MinorMajor7,
        ChordType::HalfDiminished7,
        ChordType::Diminished7,
        ChordType::Add9,
        ChordType::Dominant9,
        ChordType::Major9,
        ChordType::Minor9,
    ];

    /// Semitone intervals above the root, ascending.
    pub fn intervals(self) -> &'static [u8] {
        match self {
            ChordType::Major => &[0, 4, 7],
            ChordType::Minor => &[0, 3, 7],
            ChordType::Diminished => &[0, 3, 6],
            ChordType::Augmented => &[0, 4, 8],
            ChordType::Sus2 => &[0, 2, 7],
            ChordType::Sus4 => &[0, 5, 7],
            ChordType::Power => &[0, 7],
            ChordType::Major6 => &[0, 4, 7, 9],
            ChordType::Minor6 => &[0, 3, 7, 9],
            ChordType::Dominant7 => &[0, 4, 7, 10],
            ChordType::Major7 => &[0, 4, 7, 11],
            ChordType::Minor7 => &[0, 3, 7, 10],
            ChordType::MinorMajor7 => &[0, 3, 7, 11],
            ChordType::HalfDiminished7 => &[0, 3, 6, 10],
            ChordType::Diminished7 => &[0, 3, 6, 9],
            ChordType::Add9 => &[0, 4, 7, 14],
            ChordType::Dominant9 => &[0, 4, 7, 10, 14],
            ChordType::Major9 => &[0, 4, 7, 11, 14],
            ChordType::Minor9 => &[0, 3, 7, 10, 14],
        }
    }

    /// Short name used by the toolbar and in run pattern names.
    pub fn token(self) -> &'static str {
        match self {
            ChordType::Major => "major",
            ChordType::Minor => "minor",
            ChordType::Diminished => "dim",
            ChordType::Augmented => "aug",
            ChordType::Sus2 => "sus2",
            ChordType::Sus4 => "sus4",
            ChordType::Power => "5",
            ChordType::Major6 => "6",
            ChordType::Minor6 => "m6",
            ChordType::Dominant7 => "7",
            ChordType::Major7 => "maj7",
            ChordType::Minor7 => "m7",
            ChordType::MinorMajor7 => "mmaj7",
            ChordType::HalfDiminished7 => "m7b5",
            ChordType::Diminished7 => "dim7",
            ChordType::Add9 => "add9",
            ChordType::Dominant9 => "9",
            ChordType::Major9 => "maj9",
            ChordType::Minor9 => "m9",
        }
    }

    /// Display label, also used by chord detection.
    pub fn label(self) -> &'static str {
        match self {
            ChordType::Major => "Major",
            ChordType::Minor => "Minor",
            ChordType::Diminished => "Diminished",
            ChordType::Augmented => "Augmented",
            ChordType::Sus2 => "Sus2",
            ChordType::Sus4 => "Sus4",
            ChordType::Power => "Power",
            ChordType::Major6 => "Major 6th",
            ChordType::Minor6 => "Minor 6th",
            ChordType::Dominant7 => "Dominant 7th",
            ChordType::Major7 => "Major 7th",
            ChordType::Minor7 => "Minor 7th",
            ChordType::MinorMajor7 => "Minor-Major 7th",
            ChordType::HalfDiminished7 => "Half-Diminished 7th",
            ChordType::Diminished7 => "Diminished 7th",
            ChordType::Add9 => "Add 9",
            ChordType::Dominant9 => "Dominant 9th",
            ChordType::Major9 => "Major 9th",
            ChordType::Minor9 => "Minor 9th",
        }
    }
}

impl FromStr for ChordType {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        // Common aliases first; "M" and "m" are case sensitive.
        let alias = match trimmed {
            "" | "M" | "maj" => Some(ChordType::Major),
            "m" | "min" | "-" => Some(ChordType::Minor),
            "+" => Some(ChordType::Augmented),
            "°" => Some(ChordType::Diminished),
            "dom7" => Some(ChordType::Dominant7),
            "min7" | "-7" => Some(ChordType::Minor7),
            "M7" => Some(ChordType::Major7),
            "min9" => Some(ChordType::Minor9),
            _ => None,
        };
        if let Some(chord) = alias {
            return Ok(chord);
        }
        let lower = trimmed.to_ascii_lowercase();
        ChordType::ALL
            .iter()
            .copied()
            .find(|c| c.token() == trimmed || c.label().to_ascii_lowercase() == lower)
            .ok_or_else(|| EditError::UnknownChordType(s.to_string()))
    }
}

impl fmt::Display for ChordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Scales available to the Run tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScaleType {
    Chromatic,
    Major,
    NaturalMinor,
    HarmonicMinor,
    MelodicMinor,
    Dorian,
    Phrygian,
    Lydian,
    Mixolydian,
    Locrian,
    MajorPentatonic,
    MinorPentatonic,
    Blues,
    WholeTone,
}

impl ScaleType {
    pub const ALL: [ScaleType; 14] = [
        ScaleType::Chromatic,
        ScaleType::Major,
        ScaleType::NaturalMinor,
        ScaleType::HarmonicMinor,
        ScaleType::MelodicMinor,
        ScaleType::Dorian,
        ScaleType::Phrygian,
        ScaleType::Lydian,
        ScaleType::Mixolydian,
        ScaleType::Locrian,
        ScaleType::MajorPentatonic,
        ScaleType::MinorPentatonic,
        ScaleType::Blues,
        ScaleType::WholeTone,
    ];

    pub fn intervals(self) -> &'static [u8] {
        match self {
            ScaleType::Chromatic => &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
            ScaleType::Major => &[0, 2, 4, 5, 7, 9, 11],
            ScaleType::NaturalMinor => &[0, 2, 3, 5, 7, 8, 10],
            ScaleType::HarmonicMinor => &[0, 2, 3, 5, 7, 8, 11],
            ScaleType::MelodicMinor => &[0, 2, 3, 5, 7, 9, 11],
            ScaleType::Dorian => &[0, 2, 3, 5, 7, 9, 10],
            ScaleType::Phrygian => &[0, 1, 3, 5, 7, 8, 10],
            ScaleType::Lydian => &[0, 2, 4, 6, 7, 9, 11],
            ScaleType::Mixolydian => &[0, 2, 4, 5, 7, 9, 10],
            ScaleType::Locrian => &[0, 1, 3, 5, 6, 8, 10],
            ScaleType::MajorPentatonic => &[0, 2, 4, 7, 9],
            ScaleType::MinorPentatonic => &[0, 3, 5, 7, 10],
            ScaleType::Blues => &[0, 3, 5, 6, 7, 10],
            ScaleType::WholeTone => &[0, 2, 4, 6, 8, 10],
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            ScaleType::Chromatic => "chromatic",
            ScaleType::Major => "major",
            ScaleType::NaturalMinor => "minor",
            ScaleType::HarmonicMinor => "harmonic-minor",
            ScaleType::MelodicMinor => "melodic-minor",
            ScaleType::Dorian => "dorian",
            ScaleType::Phrygian => "phrygian",
            ScaleType::Lydian => "lydian",
            ScaleType::Mixolydian => "mixolydian",
            ScaleType::Locrian => "locrian",
            ScaleType::MajorPentatonic => "major-pentatonic",
            ScaleType::MinorPentatonic => "minor-pentatonic",
            ScaleType::Blues => "blues",
            ScaleType::WholeTone => "whole-tone",
        }
    }

    pub fn pitch_classes(self) -> PitchClassSet {
        PitchClassSet::from_intervals(self.intervals())
    }
}

impl FromStr for ScaleType {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '_'], "-");
        if normalized == "natural-minor" || normalized == "aeolian" {
            return Ok(ScaleType::NaturalMinor);
        }
        if normalized == "ionian" {
            return Ok(ScaleType::Major);
        }
        ScaleType::ALL
            .iter()
            .copied()
            .find(|scale| scale.token() == normalized)
            .ok_or_else(|| EditError::UnknownScale(s.to_string()))
    }
}

/// What the Run tool lays out between its two pitches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RunPattern {
    Scale(ScaleType),
    Arpeggio(ChordType),
}

impl RunPattern {
    pub fn name(self) -> String {
        match self {
            RunPattern::Scale(scale) => scale.token().to_string(),
            RunPattern::Arpeggio(chord) => format!("{}{}", chord.token(), ARPEGGIO_SUFFIX),
        }
    }
}

impl Default for RunPattern {
    fn default() -> Self {
        RunPattern::Scale(ScaleType::Major)
    }
}

impl FromStr for RunPattern {
    type Err = EditError;

    /// `"dorian"` is a scale run, `"maj7-arp"` an arpeggio of a major seventh.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().strip_suffix(ARPEGGIO_SUFFIX) {
            Some(chord) => chord
                .parse::<ChordType>()
                .map(RunPattern::Arpeggio)
                .map_err(|_| EditError::UnknownScale(s.to_string())),
            None => s.parse::<ScaleType>().map(RunPattern::Scale),
        }
    }
}

/// Parse a key name ("C", "F#", "Bb", "eb") to a pitch class 0-11.
pub fn parse_key(name: &str) -> Result<u8, EditError> {
    let mut chars = name.trim().chars();
    let letter = chars.next().map(|c| c.to_ascii_uppercase());
    let base: i8 = match letter {
        Some('C') => 0,
        Some('D') => 2,
        Some('E') => 4,
        Some('F') => 5,
        Some('G') => 7,
        Some('A') => 9,
        Some('B') => 11,
        _ => return Err(EditError::UnknownKey(name.to_string())),
    };
    let accidental: i8 = match chars.as_str() {
        "" => 0,
        "#" | "♯" => 1,
        "b" | "♭" => -1,
        _ => return Err(EditError::UnknownKey(name.to_string())),
    };
    Ok((base + accidental).rem_euclid(12) as u8)
}

/// Name of a pitch with octave, middle C = "C4".
pub fn pitch_name(pitch: u8) -> String {
    let octave = pitch as i16 / 12 - 1;
    format!("{}{}", NOTE_NAMES[(pitch % 12) as usize], octave)
}

/// Name of a pitch class without octave.
pub(crate) fn pitch_class_name(pitch: u8) -> &'static str {
    NOTE_NAMES[(pitch % 12) as usize]
}
