//! # Interaction Engine
//!
//! Turns pointer and keyboard input into edits of the note collection.
//!
//! ## Data flow
//! ```text
//! input event ─► dispatch by active tool ─► CoordinateTransform (+ Quantizer)
//!             ─► Selection / theory generators ─► NoteCollection
//!             ─► EditorEvent queue (drained by the host)
//! ```
//!
//! ## Ownership
//! [`Editor`] owns every piece of mutable state: the notes, both selection
//! maps, the tool state, the clipboard, the paste preview and the gesture in
//! flight. Collaborators only see immutable snapshots handed out through
//! [`Editor::take_events`]; nothing is shared behind their back.
//!
//! ## Failures
//! Gesture handlers never fail. An insert that would overflow the note cap is
//! rejected whole and reported as [`EditorEvent::Warning`]. Out-of-range
//! pitches and negative times are clamped. Commands that need a selection do
//! nothing without one.
//!
//! ## Example
//! ```
//! use keyroll::{Editor, EditorConfig, PointerEvent, ToolKind};
//!
//! let mut editor = Editor::new(EditorConfig::default());
//! editor.set_tool(ToolKind::AddChord);
//! editor.set_chord_type("major").unwrap();
//!
//! let x = editor.transform().pitch_to_pixel_x(60);
//! let y = editor.transform().time_to_pixel_y(1.0, 0.0);
//! editor.pointer_down(PointerEvent::at(x, y));
//! editor.pointer_up(PointerEvent::at(x, y));
//!
//! let pitches: Vec<u8> = editor.notes().iter().map(|n| n.pitch).collect();
//! assert_eq!(pitches, vec![60, 64, 67]);
//! ```

mod commands;
mod events;
mod frame;
mod gesture;
mod input;
mod keyboard;
mod pointer;

#[cfg(test)]
mod tests;

pub use events::{
    EditorEvent, EditorSnapshot, FrameSnapshot, MarqueeRect, PreviewSnapshot, StatusReport,
};
pub use gesture::Handle;
pub use input::{Key, KeyEvent, Modifiers, PointerEvent};

use std::collections::{HashSet, VecDeque};
use std::mem;

use tracing::{debug, info, warn};

use crate::config::EditorConfig;
use crate::document::{Document, TextAnnotation};
use crate::error::EditError;
use crate::history::{self, Edit, History};
use crate::note::{Note, NoteCollection, NoteId};
use crate::quantize::{NoteDuration, Quantizer, TimeSignature};
use crate::selection::Selection;
use crate::theory::{ChordType, RunPattern, ScaleType};
use crate::tool::{Tool, ToolKind, ToolParameters, ToolState};
use crate::transform::{is_black_key, CoordinateTransform, ViewState};

use gesture::{AutoScroll, Gesture, PastePreviewNote};

/// Keyboard-driven insertion point for the generative tools.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    pub pitch: u8,
    pub time: f64,
}

/// Throttle state for [`Editor::tick`].
#[derive(Debug, Clone, Default)]
struct FrameClock {
    last_frame_ms: Option<f64>,
    last_frame: Option<FrameSnapshot>,
    playback_time: Option<f64>,
}

/// The interactive note-editing engine.
#[derive(Debug, Clone)]
pub struct Editor {
    config: EditorConfig,
    quantizer: Quantizer,
    view: ViewState,
    notes: NoteCollection,
    selection: Selection,
    tools: ToolState,
    annotations: Vec<TextAnnotation>,
    history: History,
    clipboard: Vec<Note>,
    paste_preview: Option<Vec<PastePreviewNote>>,
    gesture: Option<Gesture>,
    /// Ghost notes of the active generative tool.
    preview: Vec<Note>,
    cursor: Option<Cursor>,
    /// Start point of a keyboard-driven run.
    run_anchor: Option<Cursor>,
    /// Last pointer position in client coordinates.
    last_pointer: Option<(f64, f64)>,
    autoscroll: AutoScroll,
    clock: FrameClock,
    events: VecDeque<EditorEvent>,
    next_note_id: u64,
    next_annotation_id: u64,
}

impl Editor {
    /// Create an empty editor with the default view geometry.
    ///
    /// `config` is trusted as given; configs from [`EditorConfig::from_yaml`]
    /// are already validated. Use [`Editor::try_with_view`] for hand-built ones.
    pub fn new(config: EditorConfig) -> Self {
        Self::with_view(config, ViewState::default())
    }

    /// Like [`Editor::with_view`], but rejects a config that fails
    /// [`EditorConfig::validate`].
    pub fn try_with_view(config: EditorConfig, view: ViewState) -> Result<Self, EditError> {
        config.validate()?;
        Ok(Self::with_view(config, view))
    }

    pub fn with_view(config: EditorConfig, mut view: ViewState) -> Self {
        view.pitch_range = view.pitch_range.normalized();
        let quantizer = Quantizer::new(config.reference_tempo, config.time_signature);
        Editor {
            quantizer,
            view,
            notes: NoteCollection::new(config.note_cap),
            selection: Selection::new(config.palette.clone()),
            tools: ToolState::new(ToolParameters::default()),
            annotations: Vec::new(),
            history: History::new(config.history_depth),
            clipboard: Vec::new(),
            paste_preview: None,
            gesture: None,
            preview: Vec::new(),
            cursor: None,
            run_anchor: None,
            last_pointer: None,
            autoscroll: AutoScroll::default(),
            clock: FrameClock::default(),
            events: VecDeque::new(),
            next_note_id: 1,
            next_annotation_id: 1,
            config,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn quantizer(&self) -> &Quantizer {
        &self.quantizer
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Transform for the current view geometry.
    pub fn transform(&self) -> CoordinateTransform {
        CoordinateTransform::new(&self.view)
    }

    pub fn notes(&self) -> &NoteCollection {
        &self.notes
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn tool(&self) -> &Tool {
        self.tools.active()
    }

    pub fn tool_kind(&self) -> ToolKind {
        self.tools.kind()
    }

    pub fn tool_parameters(&self) -> &ToolParameters {
        self.tools.params()
    }

    pub fn annotations(&self) -> &[TextAnnotation] {
        &self.annotations
    }

    pub fn clipboard(&self) -> &[Note] {
        &self.clipboard
    }

    pub fn cursor(&self) -> Option<Cursor> {
        self.cursor
    }

    /// Ghost notes currently previewed (tool preview or paste preview).
    pub fn preview_notes(&self) -> Vec<Note> {
        match &self.paste_preview {
            Some(preview) => preview.iter().map(|p| p.as_note()).collect(),
            None => self.preview.clone(),
        }
    }

    pub fn is_pasting(&self) -> bool {
        self.paste_preview.is_some()
    }

    pub fn is_dragging(&self) -> bool {
        self.gesture.is_some()
    }

    pub fn is_autoscrolling(&self) -> bool {
        self.autoscroll.is_active()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Drain every event queued since the last call.
    pub fn take_events(&mut self) -> Vec<EditorEvent> {
        self.events.drain(..).collect()
    }

    // Document boundary

    /// Replace the whole editing state with a loaded document.
    ///
    /// History and any gesture in flight are discarded; the clipboard is kept.
    pub fn load(&mut self, document: Document) -> Result<(), EditError> {
        let notes = NoteCollection::from_notes(
            document.notes,
            self.config.note_cap,
            self.quantizer.minimum_duration(),
        )?;
        self.cancel_interaction();
        self.notes = notes;
        self.selection = Selection::new(self.config.palette.clone());
        self.selection.restore(document.groups, document.group_colors);
        let notes = &self.notes;
        self.selection.prune(|id| notes.contains(id));
        self.annotations = document.annotations;
        self.annotations.sort_by(|a, b| a.time.total_cmp(&b.time));
        self.history.clear();
        self.next_note_id = self.notes.max_id().map_or(1, |id| id.0 + 1);
        self.next_annotation_id = self.annotations.iter().map(|a| a.id + 1).max().unwrap_or(1);
        info!(
            notes = self.notes.len(),
            annotations = self.annotations.len(),
            "loaded document"
        );
        self.notify_changed();
        Ok(())
    }

    /// Current document for a save collaborator.
    pub fn document(&self) -> Document {
        let (groups, group_colors) = self.selection.to_maps();
        Document {
            notes: self.notes.as_slice().to_vec(),
            groups,
            group_colors,
            annotations: self.annotations.clone(),
        }
    }

    // View

    /// Replace the view geometry, keeping the engine's scroll position.
    pub fn set_view(&mut self, view: ViewState) {
        let scroll = self.view.scroll_position;
        self.view = view;
        self.view.scroll_position = scroll;
        self.view.pitch_range = self.view.pitch_range.normalized();
        self.clock.last_frame = None;
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.view.container_width = width.max(0.0);
        self.view.container_height = height.max(0.0);
        self.clock.last_frame = None;
    }

    pub fn set_surface_origin(&mut self, left: f64, top: f64) {
        self.view.surface_left = left;
        self.view.surface_top = top;
    }

    pub fn set_zoom(&mut self, pixels_per_second: f64, height_factor: f64) {
        if pixels_per_second > 0.0 {
            self.view.pixels_per_second = pixels_per_second;
        }
        if height_factor > 0.0 {
            self.view.height_factor = height_factor;
        }
        self.clock.last_frame = None;
    }

    pub fn set_scroll(&mut self, seconds: f64) {
        self.view.scroll_position = seconds.max(0.0);
    }

    // Tools and toolbar parameters

    /// Make `kind` the active tool, cancelling whatever the previous tool was doing.
    pub fn set_tool(&mut self, kind: ToolKind) {
        self.cancel_interaction();
        self.tools.activate(kind);
        debug!(tool = kind.name(), "tool activated");
        self.events.push_back(EditorEvent::ToolChanged(kind));
        self.refresh_hover_preview();
    }

    pub fn set_tool_by_name(&mut self, name: &str) -> Result<(), EditError> {
        let kind = name.parse::<ToolKind>()?;
        self.set_tool(kind);
        Ok(())
    }

    /// Cancel every gesture and preview and fall back to Select.
    ///
    /// Used for Escape, focus loss and presses outside the surface.
    pub fn force_clear(&mut self) {
        self.cancel_interaction();
        if self.tools.reset() {
            debug!("tools reset");
            self.events.push_back(EditorEvent::ToolChanged(ToolKind::Select));
        }
    }

    /// The surface lost focus.
    pub fn blur(&mut self) {
        self.force_clear();
    }

    pub fn set_duration(&mut self, duration: NoteDuration) {
        self.tools.update_params(|p| p.duration = duration);
        self.refresh_hover_preview();
    }

    pub fn set_duration_by_name(&mut self, token: &str) -> Result<(), EditError> {
        let duration = token.parse::<NoteDuration>()?;
        self.set_duration(duration);
        Ok(())
    }

    /// Set the Add-Chord chord type from a toolbar token such as `"min7"`.
    pub fn set_chord_type(&mut self, token: &str) -> Result<(), EditError> {
        let chord = token.parse::<ChordType>()?;
        self.set_chord(chord);
        Ok(())
    }

    pub fn set_chord(&mut self, chord: ChordType) {
        self.tools.update_params(|p| p.chord = chord);
        self.refresh_hover_preview();
    }

    /// Set the Run pattern and key, e.g. `("dorian", "D")` or `("maj7-arp", "F#")`.
    pub fn set_run(&mut self, pattern: &str, key: &str) -> Result<(), EditError> {
        let pattern = pattern.parse::<RunPattern>()?;
        let key = crate::theory::parse_key(key)?;
        self.set_run_pattern(pattern, key);
        Ok(())
    }

    pub fn set_run_pattern(&mut self, pattern: RunPattern, key: u8) {
        self.tools.update_params(|p| {
            p.run_pattern = pattern;
            p.run_key = key % 12;
        });
        self.refresh_hover_preview();
    }

    pub fn set_run_scale(&mut self, scale: ScaleType, key: u8) {
        self.set_run_pattern(RunPattern::Scale(scale), key);
    }

    pub fn set_spacer_amount(&mut self, seconds: f64) {
        if seconds.is_finite() {
            self.tools.update_params(|p| p.spacer_amount = seconds);
        }
    }

    pub fn set_text(&mut self, text: &str, font: &str) {
        self.tools.update_params(|p| {
            p.text = text.to_string();
            p.font = font.to_string();
        });
    }

    pub fn set_snap_to_grid(&mut self, snap: bool) {
        self.config.snap_to_grid = snap;
    }

    pub fn set_time_signature(&mut self, time_signature: TimeSignature) -> Result<(), EditError> {
        let mut config = self.config.clone();
        config.time_signature = time_signature;
        config.validate()?;
        self.config = config;
        self.quantizer.set_time_signature(time_signature);
        self.push_status();
        Ok(())
    }

    /// Song tempo; only affects bar counting, never the grid.
    pub fn set_tempo(&mut self, tempo: f64) -> Result<(), EditError> {
        let mut config = self.config.clone();
        config.tempo = tempo;
        config.validate()?;
        self.config = config;
        self.push_status();
        Ok(())
    }

    // Shared helpers for the submodules

    fn duration(&self) -> NoteDuration {
        self.tools.duration()
    }

    /// Snap to the active grid if snapping is on, otherwise only clamp at 0.
    fn snap_time(&self, time: f64) -> f64 {
        if self.config.snap_to_grid {
            self.quantizer.snap(time, self.duration())
        } else {
            time.max(0.0)
        }
    }

    fn snap_length(&self, length: f64) -> f64 {
        if self.config.snap_to_grid {
            self.quantizer.snap_duration(length, self.duration())
        } else {
            length.max(self.quantizer.minimum_duration())
        }
    }

    fn grid(&self) -> f64 {
        self.quantizer.grid_size(self.duration())
    }

    /// Surface-local position, pitch and raw (unsnapped) time under a client point.
    fn locate(&self, client_x: f64, client_y: f64) -> (f64, f64, u8, f64) {
        let (x, y) = self.view.to_local(client_x, client_y);
        let transform = self.transform();
        let pitch = transform.pixel_x_to_pitch(x);
        let time = transform.pixel_y_to_time(y, self.view.scroll_position);
        (x, y, pitch, time)
    }

    /// Topmost note under a surface-local point and which part was grabbed.
    ///
    /// Black-key notes are drawn over white-key notes and win ties.
    fn hit_test(&self, x: f64, y: f64) -> Option<(NoteId, Handle)> {
        let transform = self.transform();
        let scroll = self.view.scroll_position;
        let handle = self.config.handle_size;
        let hit = |note: &&Note| {
            let (left, width) = transform.key_span(note.pitch);
            if x < left || x > left + width {
                return false;
            }
            let top = transform.time_to_pixel_y(note.end_time(), scroll);
            let bottom = transform.time_to_pixel_y(note.start_time, scroll);
            y >= top && y <= bottom
        };
        let note = self
            .notes
            .iter()
            .rev()
            .filter(|n| is_black_key(n.pitch))
            .find(hit)
            .or_else(|| self.notes.iter().rev().filter(|n| !is_black_key(n.pitch)).find(hit))?;

        let top = transform.time_to_pixel_y(note.end_time(), scroll);
        let bottom = transform.time_to_pixel_y(note.start_time, scroll);
        // Handles only make sense when the body is still grabbable between them
        let grabbed = if bottom - top < handle * 3.0 {
            Handle::Body
        } else if y - top <= handle {
            Handle::Top
        } else if bottom - y <= handle {
            Handle::Bottom
        } else {
            Handle::Body
        };
        Some((note.id, grabbed))
    }

    /// A new note without an id; ids are handed out when it is inserted.
    fn build_note(&self, pitch: u8, start_time: f64, duration: f64) -> Note {
        Note {
            id: NoteId(0),
            pitch: pitch.min(127),
            start_time: start_time.max(0.0),
            duration: duration.max(self.quantizer.minimum_duration()),
            velocity: self.config.default_velocity,
            is_left_hand: pitch < self.config.hand_split_pitch,
        }
    }

    /// Insert `batch` as one atomic edit, optionally selecting it as a new group.
    ///
    /// On overflow nothing changes and a warning event is queued.
    fn insert_notes(
        &mut self,
        mut batch: Vec<Note>,
        select: bool,
    ) -> Result<Vec<NoteId>, EditError> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }
        if let Err(err) = self.notes.check_capacity(batch.len()) {
            warn!(requested = batch.len(), count = self.notes.len(), "insert rejected: {}", err);
            self.events.push_back(EditorEvent::Warning(err.clone()));
            return Err(err);
        }
        for note in batch.iter_mut() {
            note.id = NoteId(self.next_note_id);
            self.next_note_id += 1;
        }
        let ids: Vec<NoteId> = batch.iter().map(|n| n.id).collect();
        self.notes.insert_unchecked(batch.clone());
        self.history.record(Edit::Insert(batch));
        if select {
            self.selection.replace_with(ids.iter().copied());
        }
        self.notify_changed();
        Ok(ids)
    }

    /// Current states of the notes in `before`, for a `Modify` record.
    fn states_of(&self, before: &[Note]) -> Vec<Note> {
        before
            .iter()
            .filter_map(|n| self.notes.get(n.id).cloned())
            .collect()
    }

    /// Edit every note in `ids` and record the change as one undo step.
    fn modify_notes<F>(&mut self, ids: &HashSet<NoteId>, edit: F) -> bool
    where
        F: FnMut(&mut Note),
    {
        let before = self.notes.update(ids, edit);
        if before.is_empty() {
            return false;
        }
        let after = self.states_of(&before);
        self.history.record(Edit::Modify { before, after });
        self.notify_changed();
        true
    }

    fn apply_edit(&mut self, edit: &Edit) {
        history::apply(edit, &mut self.notes, &mut self.annotations);
        let notes = &self.notes;
        self.selection.prune(|id| notes.contains(id));
    }

    /// Drop the gesture, restoring any notes it moved, and every preview.
    fn cancel_interaction(&mut self) {
        self.cancel_gesture();
        self.cursor = None;
        self.run_anchor = None;
        if self.paste_preview.take().is_some() {
            debug!("paste preview cancelled");
            self.push_preview(None);
        }
    }

    /// Figures for the status bar right now.
    pub fn status(&self) -> StatusReport {
        let end = self.notes.end_time();
        let bar = self.config.bar_duration();
        let bar_count = if end > 0.0 && bar > 0.0 {
            (end / bar).ceil() as usize
        } else {
            0
        };
        StatusReport {
            note_count: self.notes.len(),
            note_cap: self.notes.cap(),
            bar_count,
            selected_count: self.selection.len(),
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        }
    }

    pub fn snapshot(&self) -> EditorSnapshot {
        let (groups, group_colors) = self.selection.to_maps();
        EditorSnapshot {
            notes: self.notes.snapshot(),
            groups,
            group_colors,
        }
    }

    /// Queue an event, replacing a pending event of the same kind at the back.
    ///
    /// A drag emits a change per pointer move; only the newest one matters.
    fn push_coalesced(&mut self, event: EditorEvent) {
        if let Some(last) = self.events.back_mut() {
            if mem::discriminant(last) == mem::discriminant(&event) {
                *last = event;
                return;
            }
        }
        self.events.push_back(event);
    }

    fn push_status(&mut self) {
        let status = self.status();
        self.push_coalesced(EditorEvent::Status(status));
    }

    fn notify_changed(&mut self) {
        // Keep Changed immediately before Status so both coalesce as a pair
        if let Some(EditorEvent::Status(_)) = self.events.back() {
            self.events.pop_back();
        }
        let snapshot = self.snapshot();
        self.push_coalesced(EditorEvent::Changed(snapshot));
        self.push_status();
        self.clock.last_frame = None;
    }

    fn push_preview(&mut self, marquee: Option<MarqueeRect>) {
        let preview = PreviewSnapshot {
            notes: self.preview_notes(),
            marquee,
            paste: self.paste_preview.is_some(),
        };
        self.push_coalesced(EditorEvent::Preview(preview));
    }
}

impl PastePreviewNote {
    fn as_note(&self) -> Note {
        Note {
            pitch: self.paste_pitch,
            start_time: self.paste_time,
            ..self.source.clone()
        }
    }
}

/// Largest part of `delta` that keeps every note of `notes` within 0-127.
///
/// Used for group moves so the group stays rigid at the keyboard's ends.
fn clamp_pitch_delta(notes: &[Note], delta: i32) -> i32 {
    let lowest = notes.iter().map(|n| n.pitch as i32).min().unwrap_or(0);
    let highest = notes.iter().map(|n| n.pitch as i32).max().unwrap_or(127);
    delta.clamp(-lowest, 127 - highest)
}

fn shifted_pitch(pitch: u8, delta: i32) -> u8 {
    (pitch as i32 + delta).clamp(0, 127) as u8
}
