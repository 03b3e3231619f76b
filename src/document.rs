//! Document handed across the persistence boundary
//!
//! The engine performs no I/O. A load collaborator hands it a [`Document`]
//! and a save collaborator asks for the current one.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::note::{Note, NoteId};
use crate::selection::GroupId;

/// Free text placed on the roll with the Text tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextAnnotation {
    pub id: u64,
    pub time: f64,
    pub pitch: u8,
    pub text: String,
    #[serde(default)]
    pub font: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Document {
    pub notes: Vec<Note>,
    pub groups: BTreeMap<NoteId, GroupId>,
    pub group_colors: BTreeMap<GroupId, String>,
    pub annotations: Vec<TextAnnotation>,
}
