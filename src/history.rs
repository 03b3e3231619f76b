//! Undo/redo history
//!
//! Edits are stored as reversible records of just the notes they touched, not
//! as copies of the whole document.

use std::collections::{HashSet, VecDeque};

use crate::document::TextAnnotation;
use crate::note::{Note, NoteCollection, NoteId};

/// One reversible edit.
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    Insert(Vec<Note>),
    Remove(Vec<Note>),
    /// Same notes before and after (matched by id).
    Modify { before: Vec<Note>, after: Vec<Note> },
    Annotate(TextAnnotation),
}

impl Edit {
    fn inverse(&self) -> Edit {
        match self {
            Edit::Insert(notes) => Edit::Remove(notes.clone()),
            Edit::Remove(notes) => Edit::Insert(notes.clone()),
            Edit::Modify { before, after } => Edit::Modify {
                before: after.clone(),
                after: before.clone(),
            },
            Edit::Annotate(annotation) => Edit::Annotate(annotation.clone()),
        }
    }
}

/// Apply `edit` to the collection and annotation list.
///
/// `Annotate` toggles: it removes the annotation if present, otherwise adds it.
pub(crate) fn apply(edit: &Edit, notes: &mut NoteCollection, annotations: &mut Vec<TextAnnotation>) {
    match edit {
        Edit::Insert(inserted) => notes.insert_unchecked(inserted.clone()),
        Edit::Remove(removed) => {
            let ids: HashSet<NoteId> = removed.iter().map(|n| n.id).collect();
            notes.remove_ids(&ids);
        }
        Edit::Modify { after, .. } => notes.replace(after),
        Edit::Annotate(annotation) => {
            if let Some(i) = annotations.iter().position(|a| a.id == annotation.id) {
                annotations.remove(i);
            } else {
                annotations.push(annotation.clone());
                annotations.sort_by(|a, b| a.time.total_cmp(&b.time));
            }
        }
    }
}

/// Bounded undo and redo stacks.
#[derive(Debug, Clone)]
pub struct History {
    undo: VecDeque<Edit>,
    redo: Vec<Edit>,
    depth: usize,
}

impl History {
    pub fn new(depth: usize) -> Self {
        History {
            undo: VecDeque::new(),
            redo: Vec::new(),
            depth,
        }
    }

    /// Record an edit that has already been applied. Clears redo.
    pub fn record(&mut self, edit: Edit) {
        if let Edit::Modify { before, after } = &edit {
            if before == after {
                return;
            }
        }
        self.redo.clear();
        self.undo.push_back(edit);
        while self.undo.len() > self.depth {
            self.undo.pop_front();
        }
    }

    /// Pop the latest edit and return what must be applied to revert it.
    pub fn undo(&mut self) -> Option<Edit> {
        let edit = self.undo.pop_back()?;
        let inverse = edit.inverse();
        self.redo.push(edit);
        Some(inverse)
    }

    /// Pop the latest undone edit and return it for re-application.
    pub fn redo(&mut self) -> Option<Edit> {
        let edit = self.redo.pop()?;
        self.undo.push_back(edit.clone());
        Some(edit)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
