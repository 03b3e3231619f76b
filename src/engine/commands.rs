//! Editing commands shared by pointer, keyboard and toolbar input.

use std::collections::HashSet;

use tracing::{debug, info};

use super::gesture::PastePreviewNote;
use super::{clamp_pitch_delta, shifted_pitch, Editor};
use crate::document::TextAnnotation;
use crate::error::EditError;
use crate::history::Edit;
use crate::note::{Note, NoteId};
use crate::theory::{chord_pitches, detect_chord, label_chords, ChordLabel, ChordType, DetectedChord};

impl Editor {
    /// Add one note of the selected duration at `pitch`, snapping `time` to the grid.
    pub fn add_note_at(&mut self, pitch: u8, time: f64) -> Result<NoteId, EditError> {
        let start = self.snap_time(time);
        let length = self.quantizer.note_length(self.duration());
        let note = self.build_note(pitch, start, length);
        let ids = self.insert_notes(vec![note], false)?;
        debug!(pitch, start, "note added");
        Ok(ids[0])
    }

    /// Add every note of `chord` rooted at `root` as one batch and select it.
    pub fn add_chord_at(
        &mut self,
        root: u8,
        time: f64,
        chord: ChordType,
    ) -> Result<Vec<NoteId>, EditError> {
        let start = self.snap_time(time);
        let length = self.quantizer.note_length(self.duration());
        let batch: Vec<Note> = chord_pitches(root, chord)
            .into_iter()
            .map(|p| self.build_note(p, start, length))
            .collect();
        let ids = self.insert_notes(batch, true)?;
        debug!(root, chord = chord.token(), notes = ids.len(), "chord added");
        Ok(ids)
    }

    /// Insert a run with the current run pattern between two points and select it.
    pub fn add_run(
        &mut self,
        start_pitch: u8,
        start_time: f64,
        end_pitch: u8,
        end_time: f64,
    ) -> Result<Vec<NoteId>, EditError> {
        let start_time = self.snap_time(start_time);
        let batch = self.run_notes(start_pitch, start_time, end_pitch, end_time);
        let ids = self.insert_notes(batch, true)?;
        debug!(start_pitch, end_pitch, notes = ids.len(), "run added");
        Ok(ids)
    }

    /// Remove every selected note. Returns how many were removed.
    ///
    /// A drag still in progress is cancelled first, so it never commits
    /// against notes that are gone.
    pub fn delete_selection(&mut self) -> usize {
        let ids = self.selection.selected_ids();
        if ids.is_empty() {
            return 0;
        }
        self.cancel_gesture();
        let removed = self.notes.remove_ids(&ids);
        self.selection.clear();
        let count = removed.len();
        if !removed.is_empty() {
            self.history.record(Edit::Remove(removed));
        }
        debug!(notes = count, "selection deleted");
        self.notify_changed();
        count
    }

    pub fn select_all(&mut self) {
        if self.notes.is_empty() {
            return;
        }
        let ids: Vec<NoteId> = self.notes.iter().map(|n| n.id).collect();
        self.selection.replace_with(ids);
        self.notify_changed();
    }

    pub fn clear_selection(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        self.selection.clear();
        self.notify_changed();
    }

    /// Copy the selected notes. An empty selection leaves the clipboard alone.
    pub fn copy(&mut self) -> usize {
        let ids = self.selection.selected_ids();
        if ids.is_empty() {
            return 0;
        }
        self.clipboard = self
            .notes
            .iter()
            .filter(|n| ids.contains(&n.id))
            .cloned()
            .collect();
        debug!(notes = self.clipboard.len(), "copied");
        self.clipboard.len()
    }

    pub fn cut(&mut self) -> usize {
        let copied = self.copy();
        if copied > 0 {
            self.delete_selection();
        }
        copied
    }

    /// Arm the paste preview, or commit it if it is already armed.
    pub fn paste(&mut self) {
        if self.paste_preview.is_some() {
            let _ = self.commit_paste();
            return;
        }
        if self.clipboard.is_empty() {
            return;
        }
        self.cancel_gesture();
        self.preview.clear();
        self.paste_preview = Some(self.place_clipboard(self.paste_target()));
        debug!(notes = self.clipboard.len(), "paste armed");
        self.push_preview(None);
    }

    /// Where a paste lands: keyboard cursor, else the pointer if it is over the surface.
    fn paste_target(&self) -> Option<(u8, f64)> {
        if let Some(cursor) = self.cursor {
            return Some((cursor.pitch, cursor.time));
        }
        let (x, y) = self.last_pointer?;
        if !self.view.contains_client(x, y) {
            return None;
        }
        let (_, _, pitch, time) = self.locate(x, y);
        Some((pitch, time))
    }

    /// Clipboard notes shifted so the lowest pitch and earliest time land on the target.
    ///
    /// Without a target the notes keep their copied positions.
    fn place_clipboard(&self, target: Option<(u8, f64)>) -> Vec<PastePreviewNote> {
        let (pitch_delta, time_delta) = match target {
            Some((pitch, time)) => {
                let lowest = self.clipboard.iter().map(|n| n.pitch).min().unwrap_or(pitch);
                let earliest = self
                    .clipboard
                    .iter()
                    .map(|n| n.start_time)
                    .fold(f64::INFINITY, f64::min);
                let delta = clamp_pitch_delta(&self.clipboard, pitch as i32 - lowest as i32);
                (delta, self.snap_time(time) - earliest)
            }
            None => (0, 0.0),
        };
        self.clipboard
            .iter()
            .map(|n| PastePreviewNote {
                source: n.clone(),
                paste_pitch: shifted_pitch(n.pitch, pitch_delta),
                paste_time: (n.start_time + time_delta).max(0.0),
            })
            .collect()
    }

    pub(crate) fn update_paste_preview(&mut self, pitch: u8, time: f64) {
        if self.paste_preview.is_some() {
            self.paste_preview = Some(self.place_clipboard(Some((pitch, time))));
        }
    }

    /// Insert the previewed notes as a fresh, selected group.
    pub fn commit_paste(&mut self) -> Result<Vec<NoteId>, EditError> {
        let Some(preview) = self.paste_preview.take() else {
            return Ok(Vec::new());
        };
        self.push_preview(None);
        let batch: Vec<Note> = preview.iter().map(PastePreviewNote::as_note).collect();
        let ids = self.insert_notes(batch, true)?;
        debug!(notes = ids.len(), "paste committed");
        Ok(ids)
    }

    /// Discard the paste preview without touching the notes.
    pub fn cancel_paste(&mut self) {
        if self.paste_preview.take().is_some() {
            debug!("paste cancelled");
            self.push_preview(None);
        }
    }

    /// Move the selection by semitones and grid steps of the selected duration.
    ///
    /// The pitch shift is limited so the group keeps its shape at 0 and 127.
    pub fn nudge(&mut self, semitones: i32, grid_steps: i32) -> bool {
        let ids = self.selection.selected_ids();
        if ids.is_empty() {
            return false;
        }
        let selected: Vec<Note> = self
            .notes
            .iter()
            .filter(|n| ids.contains(&n.id))
            .cloned()
            .collect();
        let pitch_delta = clamp_pitch_delta(&selected, semitones);
        let time_delta = self.grid() * grid_steps as f64;
        self.modify_notes(&ids, |n| {
            n.pitch = shifted_pitch(n.pitch, pitch_delta);
            n.start_time = (n.start_time + time_delta).max(0.0);
        })
    }

    pub fn set_velocity(&mut self, velocity: f64) -> bool {
        if !velocity.is_finite() {
            return false;
        }
        let ids = self.selection.selected_ids();
        let velocity = velocity.clamp(0.0, 1.0);
        self.modify_notes(&ids, |n| n.velocity = velocity)
    }

    pub fn adjust_velocity(&mut self, delta: f64) -> bool {
        if !delta.is_finite() {
            return false;
        }
        let ids = self.selection.selected_ids();
        self.modify_notes(&ids, |n| n.velocity = (n.velocity + delta).clamp(0.0, 1.0))
    }

    pub fn set_left_hand(&mut self, left: bool) -> bool {
        let ids = self.selection.selected_ids();
        self.modify_notes(&ids, |n| n.is_left_hand = left)
    }

    /// Shift every note starting at or after `time` by `amount` seconds.
    ///
    /// Removing time never pulls a note earlier than `time` itself.
    pub fn insert_space(&mut self, time: f64, amount: f64) -> bool {
        if amount == 0.0 || !amount.is_finite() {
            return false;
        }
        let at = self.snap_time(time);
        let ids: HashSet<NoteId> = self
            .notes
            .iter()
            .filter(|n| n.start_time >= at)
            .map(|n| n.id)
            .collect();
        let shifted = self.modify_notes(&ids, |n| n.start_time = (n.start_time + amount).max(at));
        if shifted {
            debug!(at, amount, notes = ids.len(), "space inserted");
        }
        shifted
    }

    /// Place a text annotation. Blank text is ignored.
    pub fn add_annotation(&mut self, time: f64, pitch: u8, text: &str, font: &str) -> Option<u64> {
        if text.trim().is_empty() {
            return None;
        }
        let annotation = TextAnnotation {
            id: self.next_annotation_id,
            time: self.snap_time(time),
            pitch: pitch.min(127),
            text: text.to_string(),
            font: font.to_string(),
        };
        self.next_annotation_id += 1;
        let id = annotation.id;
        let edit = Edit::Annotate(annotation);
        self.apply_edit(&edit);
        self.history.record(edit);
        debug!(id, "annotation added");
        self.notify_changed();
        Some(id)
    }

    pub fn remove_annotation(&mut self, id: u64) -> bool {
        let Some(annotation) = self.annotations.iter().find(|a| a.id == id).cloned() else {
            return false;
        };
        let edit = Edit::Annotate(annotation);
        self.apply_edit(&edit);
        self.history.record(edit);
        self.notify_changed();
        true
    }

    pub fn undo(&mut self) -> bool {
        self.cancel_interaction();
        let Some(edit) = self.history.undo() else {
            return false;
        };
        self.apply_edit(&edit);
        info!(notes = self.notes.len(), "undo");
        self.notify_changed();
        true
    }

    pub fn redo(&mut self) -> bool {
        self.cancel_interaction();
        let Some(edit) = self.history.redo() else {
            return false;
        };
        self.apply_edit(&edit);
        info!(notes = self.notes.len(), "redo");
        self.notify_changed();
        true
    }

    /// Chord names for every cluster of notes starting together.
    pub fn chord_labels(&self) -> Vec<ChordLabel> {
        let events: Vec<(f64, u8)> = self.notes.iter().map(|n| (n.start_time, n.pitch)).collect();
        label_chords(&events, self.config.chord_tolerance)
    }

    /// Chord formed by the selected notes, if they spell one.
    pub fn selected_chord(&self) -> Option<DetectedChord> {
        let pitches: Vec<u8> = self
            .notes
            .iter()
            .filter(|n| self.selection.is_selected(n.id))
            .map(|n| n.pitch)
            .collect();
        detect_chord(&pitches)
    }
}
