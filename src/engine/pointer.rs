//! Pointer dispatch by active tool.

use tracing::debug;

use super::events::MarqueeRect;
use super::gesture::{DragState, Gesture, GestureKind, Handle, ResizeState};
use super::{clamp_pitch_delta, shifted_pitch, Editor, PointerEvent};
use crate::history::Edit;
use crate::note::Note;
use crate::theory::{chord_pitches, run_pitches};
use crate::tool::Tool;

impl Editor {
    pub fn pointer_down(&mut self, event: PointerEvent) {
        self.last_pointer = Some((event.x, event.y));
        if !self.view.contains_client(event.x, event.y) {
            self.force_clear();
            return;
        }
        if self.gesture.is_some() {
            // A press without a release (pointer captured elsewhere)
            self.cancel_gesture();
        }
        let (x, y, pitch, time) = self.locate(event.x, event.y);

        if self.paste_preview.is_some() {
            self.update_paste_preview(pitch, time);
            let _ = self.commit_paste();
            return;
        }

        match self.tools.active().clone() {
            Tool::Select => self.select_press(event, x, y, time),
            Tool::AddNote => {
                let _ = self.add_note_at(pitch, time);
            }
            Tool::AddChord { chord } => {
                let _ = self.add_chord_at(pitch, time, chord);
            }
            Tool::Run { .. } => {
                let start_time = self.snap_time(time);
                self.gesture = Some(Gesture::new(
                    self.tools.epoch(),
                    GestureKind::Run {
                        start_pitch: pitch,
                        start_time,
                    },
                ));
                self.preview = self.run_notes(pitch, start_time, pitch, start_time);
                debug!(pitch, start_time, "run started");
                self.push_preview(None);
            }
            Tool::Spacer { amount } => {
                self.insert_space(time, amount);
            }
            Tool::Text { text, font } => {
                let _ = self.add_annotation(time, pitch, &text, &font);
            }
        }
    }

    pub fn pointer_move(&mut self, event: PointerEvent) {
        self.last_pointer = Some((event.x, event.y));
        let (_, y, pitch, time) = self.locate(event.x, event.y);

        if self.paste_preview.is_some() {
            self.update_paste_preview(pitch, time);
            self.push_preview(None);
            return;
        }
        if self.gesture.is_none() {
            self.hover(pitch, time);
            return;
        }
        if self.gesture_is_stale() {
            self.cancel_gesture();
            return;
        }
        self.drag_to(event.x, event.y);
        self.update_autoscroll(y);
    }

    pub fn pointer_up(&mut self, event: PointerEvent) {
        self.last_pointer = Some((event.x, event.y));
        if self.gesture.is_none() {
            return;
        }
        if self.gesture_is_stale() {
            self.cancel_gesture();
            return;
        }
        self.drag_to(event.x, event.y);
        self.autoscroll.cancel();
        let Some(gesture) = self.gesture.take() else {
            return;
        };

        match gesture.kind {
            GestureKind::Marquee { .. } => {
                debug!(selected = self.selection.len(), "marquee committed");
                self.push_preview(None);
            }
            GestureKind::Move(DragState { originals, .. })
            | GestureKind::Resize(ResizeState { originals, .. }) => {
                let after = self.states_of(&originals);
                if after.len() == originals.len() && after != originals {
                    debug!(notes = after.len(), "drag committed");
                    self.history.record(Edit::Modify {
                        before: originals,
                        after,
                    });
                    self.notify_changed();
                }
            }
            GestureKind::Run { .. } => {
                let batch = std::mem::take(&mut self.preview);
                self.push_preview(None);
                if let Ok(ids) = self.insert_notes(batch, true) {
                    debug!(notes = ids.len(), "run committed");
                }
            }
        }
    }

    /// Gesture started under a tool that is no longer active.
    fn gesture_is_stale(&self) -> bool {
        self.gesture
            .as_ref()
            .is_some_and(|g| g.epoch != self.tools.epoch())
    }

    pub(crate) fn cancel_gesture(&mut self) {
        if let Some(gesture) = self.gesture.take() {
            if gesture.changed {
                if let Some(originals) = gesture.originals() {
                    self.notes.replace(originals);
                    self.notify_changed();
                }
            }
            debug!(gesture = gesture.name(), "gesture cancelled");
        }
        self.autoscroll.cancel();
        if !self.preview.is_empty() {
            self.preview.clear();
            self.push_preview(None);
        }
    }

    fn select_press(&mut self, event: PointerEvent, x: f64, y: f64, time: f64) {
        let epoch = self.tools.epoch();
        let Some((id, handle)) = self.hit_test(x, y) else {
            if !event.modifiers.shift && !self.selection.is_empty() {
                self.selection.clear();
                self.notify_changed();
            }
            let group = self.selection.start_new_group();
            self.gesture = Some(Gesture::new(
                epoch,
                GestureKind::Marquee {
                    origin_x: x,
                    origin_y: y,
                    origin_scroll: self.view.scroll_position,
                    current_x: x,
                    current_y: y,
                    group,
                    extend: event.modifiers.shift,
                },
            ));
            debug!(x, y, "marquee started");
            return;
        };

        if event.click_count >= 2 {
            if let Some(group) = self.selection.group_of(id) {
                self.selection.remove_group(group);
                debug!(group = group.0, "group deselected");
                self.notify_changed();
            }
            return;
        }

        if !self.selection.is_selected(id) {
            if event.modifiers.shift {
                let group = self.selection.start_new_group();
                self.selection.assign([id], group);
            } else {
                self.selection.replace_with([id]);
            }
            self.notify_changed();
        }

        let Some(anchor) = self.notes.get(id).cloned() else {
            return;
        };
        let members = match self.selection.group_of(id) {
            Some(group) => self.selection.members(group),
            None => [id].into_iter().collect(),
        };
        let originals: Vec<Note> = self
            .notes
            .iter()
            .filter(|n| members.contains(&n.id))
            .cloned()
            .collect();

        let kind = match handle {
            Handle::Body => GestureKind::Move(DragState {
                anchor_pitch: anchor.pitch,
                anchor_start: anchor.start_time,
                grab_offset: time - anchor.start_time,
                originals,
            }),
            Handle::Top | Handle::Bottom => GestureKind::Resize(ResizeState {
                anchor: id,
                handle,
                originals,
            }),
        };
        let gesture = Gesture::new(epoch, kind);
        debug!(gesture = gesture.name(), note = id.0, "drag started");
        self.gesture = Some(gesture);
    }

    /// Re-apply the in-flight gesture for the pointer at a client position.
    ///
    /// Also called by the auto-scroll timer after the scroll moved under a
    /// stationary pointer.
    pub(crate) fn drag_to(&mut self, client_x: f64, client_y: f64) {
        let (x, y, pitch, time) = self.locate(client_x, client_y);
        let Some(mut gesture) = self.gesture.take() else {
            return;
        };
        match &mut gesture.kind {
            GestureKind::Marquee {
                current_x,
                current_y,
                ..
            } => {
                *current_x = x;
                *current_y = y;
                self.update_marquee(&gesture.kind);
            }
            GestureKind::Move(drag) => {
                gesture.changed |= self.apply_move(drag, pitch, time);
            }
            GestureKind::Resize(resize) => {
                gesture.changed |= self.apply_resize(resize, time);
            }
            GestureKind::Run {
                start_pitch,
                start_time,
            } => {
                self.preview = self.run_notes(*start_pitch, *start_time, pitch, time);
                self.push_preview(None);
            }
        }
        self.gesture = Some(gesture);
    }

    fn update_marquee(&mut self, kind: &GestureKind) {
        let GestureKind::Marquee {
            origin_x,
            origin_y,
            origin_scroll,
            current_x,
            current_y,
            group,
            extend,
        } = *kind
        else {
            return;
        };
        let transform = self.transform();
        let scroll = self.view.scroll_position;
        // The press point stays pinned to the time it had when pressed
        let origin_time = transform.pixel_y_to_time(origin_y, origin_scroll);
        let current_time = transform.pixel_y_to_time(current_y, scroll);
        let low = transform.pixel_x_to_pitch(origin_x.min(current_x));
        let high = transform.pixel_x_to_pitch(origin_x.max(current_x));
        let ids = self.notes.in_region(
            origin_time.min(current_time),
            origin_time.max(current_time),
            low,
            high,
        );

        let before = self.selection.to_maps();
        if extend {
            self.selection.remove_group(group);
        } else {
            self.selection.clear();
        }
        self.selection.assign(ids, group);
        if self.selection.to_maps() != before {
            self.notify_changed();
        }

        let origin_y_now = transform.time_to_pixel_y(origin_time, scroll);
        let rect = MarqueeRect {
            left: origin_x.min(current_x),
            top: origin_y_now.min(current_y),
            width: (origin_x - current_x).abs(),
            height: (origin_y_now - current_y).abs(),
        };
        self.push_preview(Some(rect));
    }

    /// Translate the anchor's group rigidly. Returns true if anything moved.
    fn apply_move(&mut self, drag: &DragState, pitch: u8, time: f64) -> bool {
        let new_start = self.snap_time(time - drag.grab_offset);
        let time_delta = new_start - drag.anchor_start;
        let pitch_delta = clamp_pitch_delta(
            &drag.originals,
            pitch as i32 - drag.anchor_pitch as i32,
        );
        let moved: Vec<Note> = drag
            .originals
            .iter()
            .map(|n| Note {
                pitch: shifted_pitch(n.pitch, pitch_delta),
                start_time: (n.start_time + time_delta).max(0.0),
                ..n.clone()
            })
            .collect();
        if self.states_of(&drag.originals) == moved {
            return false;
        }
        self.notes.replace(&moved);
        self.notify_changed();
        true
    }

    /// Give the anchor's group a new duration from the dragged edge.
    fn apply_resize(&mut self, resize: &ResizeState, time: f64) -> bool {
        let Some(anchor) = resize.originals.iter().find(|n| n.id == resize.anchor) else {
            return false;
        };
        let new_duration = match resize.handle {
            Handle::Top => self.snap_length(time - anchor.start_time),
            Handle::Bottom => self.snap_length(anchor.end_time() - time),
            Handle::Body => return false,
        };
        let resized: Vec<Note> = resize
            .originals
            .iter()
            .map(|n| {
                let start_time = match resize.handle {
                    Handle::Bottom => (n.end_time() - new_duration).max(0.0),
                    _ => n.start_time,
                };
                Note {
                    start_time,
                    duration: new_duration,
                    ..n.clone()
                }
            })
            .collect();
        if self.states_of(&resize.originals) == resized {
            return false;
        }
        self.notes.replace(&resized);
        self.notify_changed();
        true
    }

    /// Arm or cancel auto-scroll from the pointer's local y while dragging.
    fn update_autoscroll(&mut self, y: f64) {
        let scrolls = matches!(
            self.gesture.as_ref().map(|g| &g.kind),
            Some(GestureKind::Marquee { .. } | GestureKind::Move(_) | GestureKind::Resize(_))
        );
        let margin = self.config.autoscroll_margin;
        let lane = self.view.lane_height();
        if !scrolls {
            self.autoscroll.cancel();
        } else if y < margin {
            self.autoscroll.arm(1.0);
        } else if y > lane - margin && y <= lane && self.view.scroll_position > 0.0 {
            self.autoscroll.arm(-1.0);
        } else {
            self.autoscroll.cancel();
        }
    }

    /// Evenly spaced run notes from the start point toward the pointer.
    ///
    /// Spacing and length come from the run note duration, not the selected
    /// note duration. Time walks backward when the pointer is earlier than
    /// the start; notes that would land before 0 are dropped.
    pub(crate) fn run_notes(
        &self,
        start_pitch: u8,
        start_time: f64,
        pitch: u8,
        time: f64,
    ) -> Vec<Note> {
        let params = self.tools.params();
        let (pattern, key) = (params.run_pattern, params.run_key);
        let step = self.config.run_note_duration;
        let direction = if time < start_time { -1.0 } else { 1.0 };
        let pitches = run_pitches(pattern, key, start_pitch, pitch);
        let mut notes = Vec::with_capacity(pitches.len());
        for (i, p) in pitches.into_iter().enumerate() {
            let at = start_time + direction * step * i as f64;
            if at < 0.0 {
                break;
            }
            notes.push(self.build_note(p, at, step));
        }
        notes
    }

    /// Ghost notes for the generative tools at a pitch/time.
    fn tool_preview(&self, pitch: u8, time: f64) -> Vec<Note> {
        let start = self.snap_time(time);
        let length = self.quantizer.note_length(self.duration());
        match self.tools.active().clone() {
            Tool::AddNote => vec![self.build_note(pitch, start, length)],
            Tool::AddChord { chord } => chord_pitches(pitch, chord)
                .into_iter()
                .map(|p| self.build_note(p, start, length))
                .collect(),
            Tool::Run { .. } => match self.run_anchor {
                Some(anchor) => self.run_notes(anchor.pitch, anchor.time, pitch, start),
                None => self.run_notes(pitch, start, pitch, start),
            },
            _ => Vec::new(),
        }
    }

    fn hover(&mut self, pitch: u8, time: f64) {
        if self.cursor.is_some() {
            return;
        }
        let preview = self.tool_preview(pitch, time);
        if preview != self.preview {
            self.preview = preview;
            self.push_preview(None);
        }
    }

    /// Recompute the tool preview after a tool or parameter change.
    pub(crate) fn refresh_hover_preview(&mut self) {
        let target = match (self.cursor, self.last_pointer) {
            (Some(cursor), _) => Some((cursor.pitch, cursor.time)),
            (None, Some((x, y))) if self.view.contains_client(x, y) => {
                let (_, _, pitch, time) = self.locate(x, y);
                Some((pitch, time))
            }
            _ => None,
        };
        let preview = match target {
            Some((pitch, time)) => self.tool_preview(pitch, time),
            None => Vec::new(),
        };
        if preview != self.preview {
            self.preview = preview;
            self.push_preview(None);
        }
    }
}
