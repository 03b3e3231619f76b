//! # Selection Groups
//!
//! Multi-select is organised in groups: every selecting gesture (marquee drag,
//! click, paste, run commit, chord commit) creates one fresh group holding just
//! the notes it touched, and that group replaces whatever was selected before.
//! Moves and resizes act on the whole group of the note under the pointer.
//!
//! Two explicit maps back this:
//! - note id → group id (a note not in the map is unselected)
//! - group id → display colour, assigned the first time a note joins the group
//!   by cycling the palette with the current number of distinct groups
//!
//! Colours of groups that no longer have any member are pruned together with
//! the membership.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::note::NoteId;

/// Identifier of a selection group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub u32);

pub const DEFAULT_PALETTE: [&str; 8] = [
    "#4f9dde", "#e0793a", "#5bb85d", "#d9534f", "#9b6fce", "#c9a227", "#3fb5b0", "#d46fa8",
];

/// note → group and group → colour maps.
#[derive(Debug, Clone)]
pub struct Selection {
    groups: HashMap<NoteId, GroupId>,
    colors: HashMap<GroupId, String>,
    palette: Vec<String>,
    next_group: u32,
}

impl Selection {
    pub fn new(palette: Vec<String>) -> Self {
        let palette = if palette.is_empty() {
            DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect()
        } else {
            palette
        };
        Selection {
            groups: HashMap::new(),
            colors: HashMap::new(),
            palette,
            next_group: 1,
        }
    }

    /// Allocate a group id that has never been used in this session.
    pub fn start_new_group(&mut self) -> GroupId {
        let id = GroupId(self.next_group);
        self.next_group += 1;
        id
    }

    /// Put `notes` in `group`, assigning the group a colour on first use.
    pub fn assign<I>(&mut self, notes: I, group: GroupId)
    where
        I: IntoIterator<Item = NoteId>,
    {
        let mut added = false;
        for note in notes {
            self.groups.insert(note, group);
            added = true;
        }
        if added && !self.colors.contains_key(&group) {
            let distinct = self.colors.len();
            let color = self.palette[distinct % self.palette.len()].clone();
            self.colors.insert(group, color);
        }
        self.prune_colors();
    }

    /// Discard the current selection and select `notes` as one new group.
    pub fn replace_with<I>(&mut self, notes: I) -> GroupId
    where
        I: IntoIterator<Item = NoteId>,
    {
        self.clear();
        let group = self.start_new_group();
        self.assign(notes, group);
        group
    }

    pub fn clear(&mut self) {
        self.groups.clear();
        self.colors.clear();
    }

    pub fn color_of(&self, group: GroupId) -> Option<&str> {
        self.colors.get(&group).map(String::as_str)
    }

    pub fn group_of(&self, note: NoteId) -> Option<GroupId> {
        self.groups.get(&note).copied()
    }

    pub fn is_selected(&self, note: NoteId) -> bool {
        self.groups.contains_key(&note)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// All notes of `group`.
    pub fn members(&self, group: GroupId) -> HashSet<NoteId> {
        self.groups
            .iter()
            .filter(|(_, g)| **g == group)
            .map(|(n, _)| *n)
            .collect()
    }

    pub fn selected_ids(&self) -> HashSet<NoteId> {
        self.groups.keys().copied().collect()
    }

    /// Deselect a whole group and drop its colour.
    pub fn remove_group(&mut self, group: GroupId) {
        self.groups.retain(|_, g| *g != group);
        self.colors.remove(&group);
    }

    /// Forget notes for which `exists` is false, and colours left without members.
    pub fn prune<F>(&mut self, exists: F)
    where
        F: Fn(NoteId) -> bool,
    {
        self.groups.retain(|note, _| exists(*note));
        self.prune_colors();
    }

    fn prune_colors(&mut self) {
        let live: HashSet<GroupId> = self.groups.values().copied().collect();
        self.colors.retain(|group, _| live.contains(group));
    }

    /// Ordered copies of both maps, for snapshots and saving.
    pub fn to_maps(&self) -> (BTreeMap<NoteId, GroupId>, BTreeMap<GroupId, String>) {
        (
            self.groups.iter().map(|(n, g)| (*n, *g)).collect(),
            self.colors.iter().map(|(g, c)| (*g, c.clone())).collect(),
        )
    }

    /// Restore maps handed over by a load collaborator.
    pub fn restore(
        &mut self,
        groups: BTreeMap<NoteId, GroupId>,
        colors: BTreeMap<GroupId, String>,
    ) {
        self.groups = groups.into_iter().collect();
        self.colors = colors.into_iter().collect();
        let highest = self.groups.values().map(|g| g.0).max().unwrap_or(0);
        self.next_group = self.next_group.max(highest + 1);
        let mut missing: Vec<GroupId> = self
            .groups
            .values()
            .copied()
            .filter(|g| !self.colors.contains_key(g))
            .collect();
        missing.sort();
        missing.dedup();
        for group in missing {
            let color = self.palette[self.colors.len() % self.palette.len()].clone();
            self.colors.insert(group, color);
        }
        self.prune_colors();
    }
}
