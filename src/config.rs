//! # Editor Configuration
//!
//! Tunables of the editing engine. Every field has a default, so a YAML file
//! only needs the keys it changes:
//!
//! ```yaml
//! noteCap: 5000
//! timeSignature: { beats: 3, beatType: 4 }
//! palette: ["#ff0000", "#00ff00"]
//! ```
//!
//! ## Example
//! ```rust
//! use keyroll::EditorConfig;
//!
//! let config = EditorConfig::from_yaml("noteCap: 5000\nsnapToGrid: false\n")?;
//! assert_eq!(config.note_cap, 5000);
//! assert!(!config.snap_to_grid);
//! assert_eq!(config.reference_tempo, 120.0);
//! # Ok::<(), keyroll::EditError>(())
//! ```

use serde::{Deserialize, Serialize};

use crate::error::EditError;
use crate::note::DEFAULT_NOTE_CAP;
use crate::quantize::TimeSignature;
use crate::selection::DEFAULT_PALETTE;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Hard limit on notes in the document.
    pub note_cap: usize,
    /// BPM the snap grid is computed at; independent of `tempo`.
    pub reference_tempo: f64,
    /// Song tempo, used for bar counts.
    pub tempo: f64,
    pub time_signature: TimeSignature,
    pub snap_to_grid: bool,
    /// Group colours, cycled in order.
    pub palette: Vec<String>,
    /// Distance from the top/bottom edge (px) that starts auto-scroll while dragging.
    pub autoscroll_margin: f64,
    /// Pixels scrolled per auto-scroll tick.
    pub autoscroll_step: f64,
    pub autoscroll_interval_ms: f64,
    /// Length and spacing of every note laid down by the Run tool, in seconds.
    pub run_note_duration: f64,
    /// Notes starting within this many seconds count as simultaneous.
    pub chord_tolerance: f64,
    /// New notes below this pitch are assigned to the left hand.
    pub hand_split_pitch: u8,
    /// Scroll the view along with the playhead.
    pub follow_playback: bool,
    /// Minimum time between visible-note recomputations.
    pub frame_interval_ms: f64,
    /// Height in pixels of the resize handles at either end of a note.
    pub handle_size: f64,
    /// Velocity for newly created notes.
    pub default_velocity: f64,
    /// Maximum number of undo steps kept.
    pub history_depth: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        EditorConfig {
            note_cap: DEFAULT_NOTE_CAP,
            reference_tempo: 120.0,
            tempo: 120.0,
            time_signature: TimeSignature::default(),
            snap_to_grid: true,
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
            autoscroll_margin: 40.0,
            autoscroll_step: 10.0,
            autoscroll_interval_ms: 16.0,
            run_note_duration: 0.125,
            chord_tolerance: 0.05,
            hand_split_pitch: 60,
            follow_playback: true,
            frame_interval_ms: 16.0,
            handle_size: 6.0,
            default_velocity: 0.8,
            history_depth: 200,
        }
    }
}

impl EditorConfig {
    /// Parse and validate a YAML configuration.
    pub fn from_yaml(source: &str) -> Result<Self, EditError> {
        let config: EditorConfig = if source.trim().is_empty() {
            EditorConfig::default()
        } else {
            serde_yaml::from_str(source)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EditError> {
        if self.note_cap == 0 {
            return Err(EditError::InvalidConfig("note cap must be positive".to_string()));
        }
        if !(self.reference_tempo > 0.0) || !(self.tempo > 0.0) {
            return Err(EditError::InvalidConfig(format!(
                "tempos must be positive (reference {}, song {})",
                self.reference_tempo, self.tempo
            )));
        }
        if self.time_signature.beats == 0 || !self.time_signature.beat_type.is_power_of_two() {
            return Err(EditError::InvalidConfig(format!(
                "time signature {}/{} is not supported",
                self.time_signature.beats, self.time_signature.beat_type
            )));
        }
        if self.palette.is_empty() {
            return Err(EditError::InvalidConfig("palette must not be empty".to_string()));
        }
        if !(self.run_note_duration > 0.0) {
            return Err(EditError::InvalidConfig(
                "run note duration must be positive".to_string(),
            ));
        }
        if !(self.autoscroll_interval_ms > 0.0) || !(self.frame_interval_ms > 0.0) {
            return Err(EditError::InvalidConfig(
                "timer intervals must be positive".to_string(),
            ));
        }
        if self.hand_split_pitch > 127 {
            return Err(EditError::InvalidConfig(format!(
                "hand split pitch {} is outside 0-127",
                self.hand_split_pitch
            )));
        }
        Ok(())
    }

    /// Seconds in one bar at the song tempo.
    pub fn bar_duration(&self) -> f64 {
        let quarter = 60.0 / self.tempo;
        let beat = quarter * 4.0 / self.time_signature.beat_type as f64;
        beat * self.time_signature.beats as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(EditorConfig::from_yaml("").unwrap(), EditorConfig::default());
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let config = EditorConfig::from_yaml(
            "timeSignature:\n  beats: 6\n  beatType: 8\ntempo: 90\n",
        )
        .unwrap();
        assert_eq!(config.time_signature, TimeSignature { beats: 6, beat_type: 8 });
        assert_eq!(config.tempo, 90.0);
        assert_eq!(config.note_cap, DEFAULT_NOTE_CAP);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            EditorConfig::from_yaml("noteCap: 0"),
            Err(EditError::InvalidConfig(_))
        ));
        assert!(matches!(
            EditorConfig::from_yaml("palette: []"),
            Err(EditError::InvalidConfig(_))
        ));
        assert!(matches!(
            EditorConfig::from_yaml("timeSignature: { beats: 4, beatType: 3 }"),
            Err(EditError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_malformed_yaml() {
        assert!(matches!(
            EditorConfig::from_yaml("noteCap: [1, 2"),
            Err(EditError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_bar_duration() {
        let config = EditorConfig::default();
        assert_eq!(config.bar_duration(), 2.0);
        let waltz = EditorConfig {
            time_signature: TimeSignature { beats: 3, beat_type: 4 },
            tempo: 60.0,
            ..EditorConfig::default()
        };
        assert_eq!(waltz.bar_duration(), 3.0);
    }
}
