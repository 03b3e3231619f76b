//! Chord and run pitch generators

use std::collections::BTreeSet;

use super::intervals::{ChordType, RunPattern};

/// Pitches of `chord` stacked on `root`, ascending.
///
/// Chord tones that would land above MIDI 127 are dropped rather than wrapped.
///
/// # Examples
/// ```
/// use keyroll::theory::{chord_pitches, ChordType};
///
/// assert_eq!(chord_pitches(60, ChordType::Major), vec![60, 64, 67]);
/// assert_eq!(chord_pitches(62, ChordType::Minor7), vec![62, 65, 69, 72]);
/// assert_eq!(chord_pitches(125, ChordType::Major), vec![125]);
/// ```
pub fn chord_pitches(root: u8, chord: ChordType) -> Vec<u8> {
    chord
        .intervals()
        .iter()
        .map(|&interval| root as u16 + interval as u16)
        .filter(|&pitch| pitch <= 127)
        .map(|pitch| pitch as u8)
        .collect()
}

/// Ordered pitches a run passes through from `from` to `to`, both inclusive
/// when they belong to the pattern.
///
/// Scale runs keep every pitch in the span whose pitch class (relative to
/// `key`) is in the scale. Arpeggio runs stack the chord's intervals on the key
/// root in every octave, then keep the ones inside the span.
///
/// The result ascends when `to >= from` and descends otherwise.
///
/// # Examples
/// ```
/// use keyroll::theory::{run_pitches, RunPattern, ScaleType, ChordType};
///
/// let c_major = run_pitches(RunPattern::Scale(ScaleType::Major), 0, 60, 72);
/// assert_eq!(c_major, vec![60, 62, 64, 65, 67, 69, 71, 72]);
///
/// let down = run_pitches(RunPattern::Arpeggio(ChordType::Major), 0, 67, 55);
/// assert_eq!(down, vec![67, 64, 60, 55]);
/// ```
pub fn run_pitches(pattern: RunPattern, key: u8, from: u8, to: u8) -> Vec<u8> {
    let low = from.min(to);
    let high = from.max(to);
    let key = key % 12;

    let mut pitches: Vec<u8> = match pattern {
        RunPattern::Scale(scale) => {
            let classes = scale.pitch_classes();
            (low..=high)
                .filter(|&p| classes.contains(((p as i16 - key as i16).rem_euclid(12)) as u8))
                .collect()
        }
        RunPattern::Arpeggio(chord) => {
            let mut stacked = BTreeSet::new();
            // Octave -1 so that ninths of the octave below reach the span.
            for octave in -1i16..=10 {
                for &interval in chord.intervals() {
                    let pitch = key as i16 + octave * 12 + interval as i16;
                    if pitch >= low as i16 && pitch <= high as i16 {
                        stacked.insert(pitch as u8);
                    }
                }
            }
            stacked.into_iter().collect()
        }
    };

    if to < from {
        pitches.reverse();
    }
    pitches
}
