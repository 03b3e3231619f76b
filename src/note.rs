//! # Notes and the Note Collection
//!
//! The note collection is the authoritative, time-ordered list of notes and the
//! only state the renderer, audio engine and persistence layer consume.
//!
//! ## Invariants
//! - Sorted by `start_time` ascending after every mutation (ties keep insertion order)
//! - `start_time >= 0`, `0 <= pitch <= 127`, `duration >= minimum duration`
//! - `len() <= cap()`; inserts that would exceed the cap are rejected whole
//!
//! ## Copy-on-write
//! Notes live behind an `Arc<Vec<Note>>`. Handing a snapshot to a reader is a
//! reference-count bump; the vector is only cloned when it is mutated while a
//! reader still holds an older snapshot.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::EditError;

/// Default cap on the number of notes in a document.
pub const DEFAULT_NOTE_CAP: usize = 20_000;

/// Opaque note identifier, unique within a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(pub u64);

/// A single pitched event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    /// MIDI pitch, middle C = 60.
    pub pitch: u8,
    /// Seconds from the start of the piece.
    pub start_time: f64,
    /// Seconds.
    pub duration: f64,
    /// 0.0 - 1.0
    #[serde(default = "default_velocity")]
    pub velocity: f64,
    #[serde(default)]
    pub is_left_hand: bool,
}

fn default_velocity() -> f64 {
    0.8
}

impl Note {
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    /// True when the note's `[start, end]` interval intersects `[from, to]`.
    pub fn overlaps(&self, from: f64, to: f64) -> bool {
        self.start_time <= to && self.end_time() >= from
    }

    /// True while the note is sounding at `time`.
    pub fn sounds_at(&self, time: f64) -> bool {
        time >= self.start_time && time < self.end_time()
    }

    /// Clamp fields back into their valid ranges.
    pub(crate) fn sanitize(&mut self, minimum_duration: f64) {
        if !self.start_time.is_finite() || self.start_time < 0.0 {
            self.start_time = 0.0;
        }
        if !self.duration.is_finite() || self.duration < minimum_duration {
            self.duration = minimum_duration;
        }
        self.pitch = self.pitch.min(127);
        self.velocity = if self.velocity.is_finite() {
            self.velocity.clamp(0.0, 1.0)
        } else {
            default_velocity()
        };
    }
}

/// Time-ordered, capacity-limited note list.
#[derive(Debug, Clone)]
pub struct NoteCollection {
    notes: Arc<Vec<Note>>,
    cap: usize,
}

impl NoteCollection {
    pub fn new(cap: usize) -> Self {
        NoteCollection {
            notes: Arc::new(Vec::new()),
            cap,
        }
    }

    /// Build a collection from loaded notes, sorting and clamping them.
    ///
    /// Rejects the whole list if it is longer than `cap`. A note repeating an
    /// id seen earlier in the list gets a fresh id above every loaded one.
    pub fn from_notes(
        mut notes: Vec<Note>,
        cap: usize,
        minimum_duration: f64,
    ) -> Result<Self, EditError> {
        if notes.len() > cap {
            return Err(EditError::CapacityExceeded {
                requested: notes.len(),
                available: cap,
                cap,
            });
        }
        let mut next_id = notes.iter().map(|n| n.id.0).max().unwrap_or(0) + 1;
        let mut seen = HashSet::with_capacity(notes.len());
        for note in notes.iter_mut() {
            note.sanitize(minimum_duration);
            if !seen.insert(note.id) {
                note.id = NoteId(next_id);
                next_id += 1;
            }
        }
        sort_by_time(&mut notes);
        Ok(NoteCollection {
            notes: Arc::new(notes),
            cap,
        })
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn remaining(&self) -> usize {
        self.cap.saturating_sub(self.notes.len())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Note> {
        self.notes.iter()
    }

    pub fn as_slice(&self) -> &[Note] {
        &self.notes
    }

    /// Shared, immutable view of the current notes.
    pub fn snapshot(&self) -> Arc<Vec<Note>> {
        Arc::clone(&self.notes)
    }

    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    pub fn contains(&self, id: NoteId) -> bool {
        self.get(id).is_some()
    }

    /// Highest id in use, if any.
    pub fn max_id(&self) -> Option<NoteId> {
        self.notes.iter().map(|n| n.id).max()
    }

    /// End of the last sounding note, in seconds.
    pub fn end_time(&self) -> f64 {
        self.notes.iter().map(Note::end_time).fold(0.0, f64::max)
    }

    /// Fails if `count` more notes would not fit.
    pub fn check_capacity(&self, count: usize) -> Result<(), EditError> {
        if self.notes.len() + count > self.cap {
            return Err(EditError::CapacityExceeded {
                requested: count,
                available: self.remaining(),
                cap: self.cap,
            });
        }
        Ok(())
    }

    /// Insert all of `batch` or none of it.
    pub fn insert_batch(&mut self, batch: Vec<Note>) -> Result<(), EditError> {
        self.check_capacity(batch.len())?;
        self.insert_unchecked(batch);
        Ok(())
    }

    /// Insert without a capacity check. Used to restore notes that were
    /// removed earlier (undo), which cannot overflow.
    pub(crate) fn insert_unchecked(&mut self, batch: Vec<Note>) {
        if batch.is_empty() {
            return;
        }
        let notes = Arc::make_mut(&mut self.notes);
        notes.extend(batch);
        sort_by_time(notes);
    }

    /// Remove every note whose id is in `ids`, returning the removed notes.
    pub fn remove_ids(&mut self, ids: &HashSet<NoteId>) -> Vec<Note> {
        if ids.is_empty() || !self.notes.iter().any(|n| ids.contains(&n.id)) {
            return Vec::new();
        }
        let notes = Arc::make_mut(&mut self.notes);
        let mut removed = Vec::new();
        notes.retain(|n| {
            if ids.contains(&n.id) {
                removed.push(n.clone());
                false
            } else {
                true
            }
        });
        removed
    }

    /// Apply `edit` to every note in `ids` and re-sort.
    ///
    /// Returns the notes as they were before the edit.
    pub fn update<F>(&mut self, ids: &HashSet<NoteId>, mut edit: F) -> Vec<Note>
    where
        F: FnMut(&mut Note),
    {
        if ids.is_empty() || !self.notes.iter().any(|n| ids.contains(&n.id)) {
            return Vec::new();
        }
        let notes = Arc::make_mut(&mut self.notes);
        let mut before = Vec::new();
        for note in notes.iter_mut().filter(|n| ids.contains(&n.id)) {
            before.push(note.clone());
            edit(note);
        }
        sort_by_time(notes);
        before
    }

    /// Overwrite notes by id with the given states (matched on `id`).
    pub fn replace(&mut self, states: &[Note]) {
        if states.is_empty() {
            return;
        }
        let notes = Arc::make_mut(&mut self.notes);
        for state in states {
            if let Some(note) = notes.iter_mut().find(|n| n.id == state.id) {
                *note = state.clone();
            }
        }
        sort_by_time(notes);
    }

    /// Notes whose `[start, end]` intersects `[from, to]` and whose pitch is in
    /// `[low, high]`, all bounds inclusive.
    pub fn in_region(&self, from: f64, to: f64, low: u8, high: u8) -> Vec<NoteId> {
        self.notes
            .iter()
            .filter(|n| n.pitch >= low && n.pitch <= high && n.overlaps(from, to))
            .map(|n| n.id)
            .collect()
    }
}

fn sort_by_time(notes: &mut [Note]) {
    notes.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
}
