//! Outbound events
//!
//! The engine never calls into the renderer, audio engine or history
//! collaborator. It queues events; the host drains them with
//! [`Editor::take_events`](super::Editor::take_events) after each input.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::error::EditError;
use crate::note::{Note, NoteId};
use crate::selection::GroupId;
use crate::tool::ToolKind;

/// State after a committed mutation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorSnapshot {
    pub notes: Arc<Vec<Note>>,
    pub groups: BTreeMap<NoteId, GroupId>,
    pub group_colors: BTreeMap<GroupId, String>,
}

/// Figures for the status bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub note_count: usize,
    pub note_cap: usize,
    pub bar_count: usize,
    pub selected_count: usize,
    pub can_undo: bool,
    pub can_redo: bool,
}

/// Per-frame view of what is on screen and what is sounding.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameSnapshot {
    pub scroll_position: f64,
    pub visible: Vec<NoteId>,
    /// Pitches sounding at the playhead.
    pub active_pitches: Vec<u8>,
    /// Distinct pitches of the selected notes.
    pub selected_pitches: Vec<u8>,
}

/// Marquee rectangle in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarqueeRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Uncommitted notes to draw as ghosts (tool preview or paste preview).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewSnapshot {
    pub notes: Vec<Note>,
    pub marquee: Option<MarqueeRect>,
    pub paste: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "payload")]
pub enum EditorEvent {
    Changed(EditorSnapshot),
    Status(StatusReport),
    Frame(FrameSnapshot),
    Preview(PreviewSnapshot),
    ToolChanged(ToolKind),
    /// A rejected operation the user should hear about.
    Warning(#[serde(serialize_with = "serialize_error")] EditError),
}

fn serialize_error<S: Serializer>(error: &EditError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&error.to_string())
}
