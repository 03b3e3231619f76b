//! Chord detection
//!
//! Finds a root and chord label for a set of pitches sounding together.
//!
//! Every pitch present is tried as the root. For each candidate root the
//! pitch classes of the notes are measured from it and compared with the
//! pattern table: a pattern matches when all of its *required* intervals are
//! present and no present interval falls outside its *allowed* set.
//!
//! Several (root, pattern) pairs can match the same notes, e.g. C-E-G-A is both
//! C Major 6th and A Minor 7th. Ties are broken by, in order:
//! 1. fewest allowed intervals left unused (the tightest description wins)
//! 2. a root equal to the bass note
//! 3. position in the pattern table

use serde::Serialize;

use super::intervals::{pitch_class_name, ChordType, PitchClassSet};

struct ChordPattern {
    chord: ChordType,
    required: PitchClassSet,
    allowed: PitchClassSet,
}

const fn pattern(chord: ChordType, required: &[u8], allowed: &[u8]) -> ChordPattern {
    ChordPattern {
        chord,
        required: PitchClassSet::from_intervals(required),
        allowed: PitchClassSet::from_intervals(allowed),
    }
}

// Sevenths and ninths may omit the fifth.
const PATTERNS: [ChordPattern; 19] = [
    pattern(ChordType::Major, &[0, 4, 7], &[0, 4, 7]),
    pattern(ChordType::Minor, &[0, 3, 7], &[0, 3, 7]),
    pattern(ChordType::Dominant7, &[0, 4, 10], &[0, 4, 7, 10]),
    pattern(ChordType::Major7, &[0, 4, 11], &[0, 4, 7, 11]),
    pattern(ChordType::Minor7, &[0, 3, 10], &[0, 3, 7, 10]),
    pattern(ChordType::MinorMajor7, &[0, 3, 11], &[0, 3, 7, 11]),
    pattern(ChordType::HalfDiminished7, &[0, 3, 6, 10], &[0, 3, 6, 10]),
    pattern(ChordType::Diminished7, &[0, 3, 6, 9], &[0, 3, 6, 9]),
    pattern(ChordType::Diminished, &[0, 3, 6], &[0, 3, 6]),
    pattern(ChordType::Augmented, &[0, 4, 8], &[0, 4, 8]),
    pattern(ChordType::Sus4, &[0, 5, 7], &[0, 5, 7]),
    pattern(ChordType::Sus2, &[0, 2, 7], &[0, 2, 7]),
    pattern(ChordType::Major6, &[0, 4, 9], &[0, 4, 7, 9]),
    pattern(ChordType::Minor6, &[0, 3, 9], &[0, 3, 7, 9]),
    pattern(ChordType::Dominant9, &[0, 2, 4, 10], &[0, 2, 4, 7, 10]),
    pattern(ChordType::Major9, &[0, 2, 4, 11], &[0, 2, 4, 7, 11]),
    pattern(ChordType::Minor9, &[0, 2, 3, 10], &[0, 2, 3, 7, 10]),
    pattern(ChordType::Add9, &[0, 2, 4], &[0, 2, 4, 7]),
    pattern(ChordType::Power, &[0, 7], &[0, 7]),
];

/// Which chord tone is in the bass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Inversion {
    Root,
    First,
    Second,
    Third,
    /// Bass is a chord tone that is not a third, fifth or seventh (e.g. a ninth).
    Slash,
}

impl Inversion {
    fn from_bass_interval(interval: u8) -> Self {
        match interval % 12 {
            0 => Inversion::Root,
            3 | 4 => Inversion::First,
            5..=8 => Inversion::Second,
            9..=11 => Inversion::Third,
            _ => Inversion::Slash,
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Inversion::Root => "root position",
            Inversion::First => "1st inversion",
            Inversion::Second => "2nd inversion",
            Inversion::Third => "3rd inversion",
            Inversion::Slash => "slash chord",
        }
    }
}

/// Spacing of the chord tones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Voicing {
    /// Everything within one octave.
    Close,
    /// Wider than an octave, no single gap of an octave or more.
    Open,
    /// At least one gap of an octave or more between neighbours.
    Spread,
}

impl Voicing {
    fn from_pitches(sorted: &[u8]) -> Self {
        let span = match (sorted.first(), sorted.last()) {
            (Some(&lo), Some(&hi)) => hi - lo,
            _ => 0,
        };
        let widest_gap = sorted.windows(2).map(|w| w[1] - w[0]).max().unwrap_or(0);
        if span <= 12 {
            Voicing::Close
        } else if widest_gap >= 12 {
            Voicing::Spread
        } else {
            Voicing::Open
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Voicing::Close => "close voicing",
            Voicing::Open => "open voicing",
            Voicing::Spread => "spread voicing",
        }
    }
}

/// Result of chord detection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedChord {
    /// Lowest sounding pitch of the root's pitch class.
    pub root: u8,
    pub root_name: &'static str,
    pub chord: ChordType,
    pub label: &'static str,
    pub inversion: Inversion,
    pub voicing: Voicing,
}

impl DetectedChord {
    /// e.g. "C Major (1st inversion, close voicing)"
    pub fn description(&self) -> String {
        format!(
            "{} {} ({}, {})",
            self.root_name,
            self.label,
            self.inversion.describe(),
            self.voicing.describe()
        )
    }
}

/// Detect the chord formed by `pitches` (order and duplicates don't matter).
///
/// Returns `None` for fewer than two distinct pitch classes or when no pattern
/// matches.
///
/// # Examples
/// ```
/// use keyroll::theory::{detect_chord, Inversion};
///
/// let chord = detect_chord(&[64, 67, 72]).unwrap();
/// assert_eq!(chord.root, 72);
/// assert_eq!(chord.label, "Major");
/// assert_eq!(chord.inversion, Inversion::First);
///
/// assert!(detect_chord(&[60, 61, 62]).is_none());
/// ```
pub fn detect_chord(pitches: &[u8]) -> Option<DetectedChord> {
    let mut sorted = pitches.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    let bass = *sorted.first()?;
    if PitchClassSet::relative_to(bass, &sorted).len() < 2 {
        return None;
    }

    // (unused allowed intervals, root is not bass, table index, root)
    let mut best: Option<(u32, bool, usize, u8)> = None;
    let mut tried = PitchClassSet::empty();
    for &root in &sorted {
        if tried.contains(root % 12) {
            continue;
        }
        tried = PitchClassSet::from_intervals(&[root % 12]).union(tried);
        let present = PitchClassSet::relative_to(root, &sorted);
        for (index, pattern) in PATTERNS.iter().enumerate() {
            if !pattern.required.is_subset_of(present) || !present.is_subset_of(pattern.allowed) {
                continue;
            }
            let key = (
                pattern.allowed.difference(present).len(),
                root % 12 != bass % 12,
                index,
                root,
            );
            if best.map_or(true, |b| (key.0, key.1, key.2) < (b.0, b.1, b.2)) {
                best = Some(key);
            }
        }
    }

    let (_, _, index, root) = best?;
    let chord = PATTERNS[index].chord;
    Some(DetectedChord {
        root,
        root_name: pitch_class_name(root),
        chord,
        label: chord.label(),
        inversion: Inversion::from_bass_interval(((bass as i16 - root as i16).rem_euclid(12)) as u8),
        voicing: Voicing::from_pitches(&sorted),
    })
}

/// A chord found at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChordLabel {
    pub time: f64,
    pub chord: DetectedChord,
}

/// Cluster `(start_time, pitch)` events into simultaneous sets and label each.
///
/// Events are treated as simultaneous when they start within `tolerance`
/// seconds of the first event of the set. Input need not be sorted.
pub fn label_chords(events: &[(f64, u8)], tolerance: f64) -> Vec<ChordLabel> {
    let mut sorted = events.to_vec();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut labels = Vec::new();
    let mut i = 0;
    while i < sorted.len() {
        let start = sorted[i].0;
        let mut j = i;
        while j < sorted.len() && sorted[j].0 - start <= tolerance {
            j += 1;
        }
        let pitches: Vec<u8> = sorted[i..j].iter().map(|e| e.1).collect();
        if let Some(chord) = detect_chord(&pitches) {
            labels.push(ChordLabel { time: start, chord });
        }
        i = j;
    }
    labels
}
