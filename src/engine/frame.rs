//! Per-frame scheduling.
//!
//! The host calls [`Editor::tick`] from its animation-frame callback. One tick
//! fires the auto-scroll timer if it is due, follows the playhead and, at most
//! once per frame interval, recomputes which notes are visible and sounding.

use tracing::trace;

use super::events::{EditorEvent, FrameSnapshot};
use super::gesture::GestureKind;
use super::Editor;

impl Editor {
    /// Advance timers to `now_ms`. `playback_time` is the transport position
    /// in seconds while playing.
    pub fn tick(&mut self, now_ms: f64, playback_time: Option<f64>) {
        self.clock.playback_time = playback_time;
        self.fire_autoscroll(now_ms);
        if let Some(time) = playback_time {
            self.follow_playback(time);
        }

        let due = match self.clock.last_frame_ms {
            None => true,
            Some(last) => now_ms - last >= self.config.frame_interval_ms,
        };
        if !due {
            return;
        }
        self.clock.last_frame_ms = Some(now_ms);
        let frame = self.frame_snapshot();
        if self.clock.last_frame.as_ref() != Some(&frame) {
            trace!(visible = frame.visible.len(), "frame");
            self.clock.last_frame = Some(frame.clone());
            self.push_coalesced(EditorEvent::Frame(frame));
        }
    }

    fn fire_autoscroll(&mut self, now_ms: f64) {
        let dragging = matches!(
            self.gesture.as_ref().map(|g| &g.kind),
            Some(GestureKind::Marquee { .. } | GestureKind::Move(_) | GestureKind::Resize(_))
        );
        if !dragging {
            self.autoscroll.cancel();
            return;
        }
        let Some(direction) = self.autoscroll.poll(now_ms, self.config.autoscroll_interval_ms)
        else {
            return;
        };
        let step = self.transform().pixels_to_seconds(self.config.autoscroll_step);
        let scroll = (self.view.scroll_position + direction * step).max(0.0);
        if scroll == self.view.scroll_position {
            self.autoscroll.cancel();
            return;
        }
        self.view.scroll_position = scroll;
        // The content moved under a still pointer: re-apply the drag there
        if let Some((x, y)) = self.last_pointer {
            self.drag_to(x, y);
        }
    }

    /// Page the view when the playhead leaves the visible window.
    fn follow_playback(&mut self, time: f64) {
        if !self.config.follow_playback || self.gesture.is_some() {
            return;
        }
        let (start, end) = self.view.visible_time_range();
        if time < start || time >= end {
            self.view.scroll_position = time.max(0.0);
        }
    }

    /// Immutable view of what is on screen and sounding right now.
    pub fn frame_snapshot(&self) -> FrameSnapshot {
        let (start, end) = self.view.visible_time_range();
        let range = self.view.pitch_range;
        let visible = self
            .notes
            .iter()
            .filter(|n| range.contains(n.pitch) && n.overlaps(start, end))
            .map(|n| n.id)
            .collect();

        let mut active_pitches: Vec<u8> = match self.clock.playback_time {
            Some(time) => self
                .notes
                .iter()
                .filter(|n| n.sounds_at(time))
                .map(|n| n.pitch)
                .collect(),
            None => Vec::new(),
        };
        active_pitches.sort_unstable();
        active_pitches.dedup();

        let mut selected_pitches: Vec<u8> = self
            .notes
            .iter()
            .filter(|n| self.selection.is_selected(n.id))
            .map(|n| n.pitch)
            .collect();
        selected_pitches.sort_unstable();
        selected_pitches.dedup();

        FrameSnapshot {
            scroll_position: self.view.scroll_position,
            visible,
            active_pitches,
            selected_pitches,
        }
    }
}
