//! In-flight gesture state
//!
//! At most one gesture runs at a time. Each remembers the tool epoch it
//! started in so that a gesture outliving its tool is detected and cancelled.

use crate::note::{Note, NoteId};
use crate::selection::GroupId;

/// Which part of a note the pointer grabbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    Body,
    /// Later edge (end time); dragging it keeps the start fixed.
    Top,
    /// Earlier edge (start time); dragging it keeps the end fixed.
    Bottom,
}

#[derive(Debug, Clone)]
pub(crate) struct DragState {
    pub anchor_pitch: u8,
    pub anchor_start: f64,
    /// Pointer time minus anchor start at press, so the note doesn't jump.
    pub grab_offset: f64,
    /// Every note of the anchor's group as it was at press.
    pub originals: Vec<Note>,
}

#[derive(Debug, Clone)]
pub(crate) struct ResizeState {
    pub anchor: NoteId,
    pub handle: Handle,
    pub originals: Vec<Note>,
}

#[derive(Debug, Clone)]
pub(crate) enum GestureKind {
    Marquee {
        /// Surface-local press position.
        origin_x: f64,
        origin_y: f64,
        /// Scroll at press; the press point's time is fixed to it.
        origin_scroll: f64,
        current_x: f64,
        current_y: f64,
        group: GroupId,
        /// Shift-marquee keeps the groups selected before it.
        extend: bool,
    },
    Move(DragState),
    Resize(ResizeState),
    Run {
        start_pitch: u8,
        start_time: f64,
    },
}

#[derive(Debug, Clone)]
pub(crate) struct Gesture {
    pub epoch: u64,
    pub kind: GestureKind,
    pub changed: bool,
}

impl Gesture {
    pub fn new(epoch: u64, kind: GestureKind) -> Self {
        Gesture {
            epoch,
            kind,
            changed: false,
        }
    }

    /// Notes to restore if the gesture is cancelled.
    pub fn originals(&self) -> Option<&[Note]> {
        match &self.kind {
            GestureKind::Move(drag) => Some(&drag.originals),
            GestureKind::Resize(resize) => Some(&resize.originals),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self.kind {
            GestureKind::Marquee { .. } => "marquee",
            GestureKind::Move(_) => "move",
            GestureKind::Resize(_) => "resize",
            GestureKind::Run { .. } => "run",
        }
    }
}

/// A clipboard note placed relative to the cursor.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PastePreviewNote {
    pub source: Note,
    pub paste_pitch: u8,
    pub paste_time: f64,
}

/// Repeating auto-scroll timer driven by [`Editor::tick`](super::Editor::tick).
#[derive(Debug, Clone, Default)]
pub(crate) struct AutoScroll {
    timer: Option<AutoScrollTimer>,
}

#[derive(Debug, Clone, Copy)]
struct AutoScrollTimer {
    /// +1.0 scrolls toward later times, -1.0 toward earlier.
    direction: f64,
    last_fire_ms: Option<f64>,
}

impl AutoScroll {
    pub fn arm(&mut self, direction: f64) {
        match &mut self.timer {
            Some(timer) => timer.direction = direction,
            None => {
                self.timer = Some(AutoScrollTimer {
                    direction,
                    last_fire_ms: None,
                })
            }
        }
    }

    /// Returns true if a timer was running.
    pub fn cancel(&mut self) -> bool {
        self.timer.take().is_some()
    }

    pub fn is_active(&self) -> bool {
        self.timer.is_some()
    }

    /// Direction to scroll if the timer is due at `now_ms`.
    pub fn poll(&mut self, now_ms: f64, interval_ms: f64) -> Option<f64> {
        let timer = self.timer.as_mut()?;
        let due = match timer.last_fire_ms {
            None => true,
            Some(last) => now_ms - last >= interval_ms,
        };
        if !due {
            return None;
        }
        timer.last_fire_ms = Some(now_ms);
        Some(timer.direction)
    }
}
