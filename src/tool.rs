//! # Tool State
//!
//! Exactly one editing tool is active at any time. The active tool is a single
//! enum value carrying its own parameters, so "two tools active at once" cannot
//! be represented.
//!
//! Parameters outlive activation: the toolbar can change the chord type while
//! the Run tool is active, and the next time Add-Chord is activated it picks the
//! new chord type up.
//!
//! Every activation bumps an epoch counter. Gestures remember the epoch they
//! started in; a gesture whose epoch no longer matches is stale and is
//! cancelled instead of committed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EditError;
use crate::quantize::NoteDuration;
use crate::theory::{ChordType, RunPattern};

/// Tool identity without parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolKind {
    Select,
    AddNote,
    AddChord,
    Spacer,
    Text,
    Run,
}

impl ToolKind {
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Select => "select",
            ToolKind::AddNote => "add-note",
            ToolKind::AddChord => "add-chord",
            ToolKind::Spacer => "spacer",
            ToolKind::Text => "text",
            ToolKind::Run => "run",
        }
    }

    /// Single-key shortcut (without modifiers).
    pub fn from_hotkey(key: char) -> Option<ToolKind> {
        match key.to_ascii_lowercase() {
            'v' => Some(ToolKind::Select),
            'n' => Some(ToolKind::AddNote),
            'c' => Some(ToolKind::AddChord),
            'g' => Some(ToolKind::Spacer),
            't' => Some(ToolKind::Text),
            'r' => Some(ToolKind::Run),
            _ => None,
        }
    }
}

impl FromStr for ToolKind {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "select" | "idle" => Ok(ToolKind::Select),
            "add-note" | "note" => Ok(ToolKind::AddNote),
            "add-chord" | "chord" => Ok(ToolKind::AddChord),
            "spacer" => Ok(ToolKind::Spacer),
            "text" => Ok(ToolKind::Text),
            "run" => Ok(ToolKind::Run),
            _ => Err(EditError::UnknownTool(s.to_string())),
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The active tool with the parameters it runs with.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "tool")]
pub enum Tool {
    Select,
    AddNote,
    AddChord { chord: ChordType },
    /// Seconds to insert (positive) or remove (negative).
    Spacer { amount: f64 },
    Text { text: String, font: String },
    /// `key` is a pitch class 0-11.
    Run { pattern: RunPattern, key: u8 },
}

impl Tool {
    pub fn kind(&self) -> ToolKind {
        match self {
            Tool::Select => ToolKind::Select,
            Tool::AddNote => ToolKind::AddNote,
            Tool::AddChord { .. } => ToolKind::AddChord,
            Tool::Spacer { .. } => ToolKind::Spacer,
            Tool::Text { .. } => ToolKind::Text,
            Tool::Run { .. } => ToolKind::Run,
        }
    }
}

/// Remembered per-tool parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolParameters {
    pub duration: NoteDuration,
    pub chord: ChordType,
    pub spacer_amount: f64,
    pub text: String,
    pub font: String,
    pub run_pattern: RunPattern,
    pub run_key: u8,
}

impl Default for ToolParameters {
    fn default() -> Self {
        ToolParameters {
            duration: NoteDuration::Quarter,
            chord: ChordType::Major,
            spacer_amount: 1.0,
            text: String::new(),
            font: "sans-serif".to_string(),
            run_pattern: RunPattern::default(),
            run_key: 0,
        }
    }
}

/// Single source of truth for which tool is active.
#[derive(Debug, Clone)]
pub struct ToolState {
    active: Tool,
    params: ToolParameters,
    epoch: u64,
}

impl ToolState {
    pub fn new(params: ToolParameters) -> Self {
        ToolState {
            active: Tool::Select,
            params,
            epoch: 0,
        }
    }

    pub fn active(&self) -> &Tool {
        &self.active
    }

    pub fn kind(&self) -> ToolKind {
        self.active.kind()
    }

    pub fn params(&self) -> &ToolParameters {
        &self.params
    }

    pub fn duration(&self) -> NoteDuration {
        self.params.duration
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Make `kind` the only active tool.
    pub fn activate(&mut self, kind: ToolKind) {
        self.active = self.build(kind);
        self.epoch += 1;
    }

    /// Drop back to Select. Returns false if Select was already active.
    pub fn reset(&mut self) -> bool {
        if self.active == Tool::Select {
            return false;
        }
        self.activate(ToolKind::Select);
        true
    }

    /// Apply a parameter change, refreshing the active tool if it uses it.
    ///
    /// The epoch is left alone: changing a parameter does not abandon a gesture.
    pub fn update_params<F>(&mut self, change: F)
    where
        F: FnOnce(&mut ToolParameters),
    {
        change(&mut self.params);
        self.active = self.build(self.active.kind());
    }

    fn build(&self, kind: ToolKind) -> Tool {
        let p = &self.params;
        match kind {
            ToolKind::Select => Tool::Select,
            ToolKind::AddNote => Tool::AddNote,
            ToolKind::AddChord => Tool::AddChord { chord: p.chord },
            ToolKind::Spacer => Tool::Spacer {
                amount: p.spacer_amount,
            },
            ToolKind::Text => Tool::Text {
                text: p.text.clone(),
                font: p.font.clone(),
            },
            ToolKind::Run => Tool::Run {
                pattern: p.run_pattern,
                key: p.run_key,
            },
        }
    }
}
