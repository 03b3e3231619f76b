//! Keyboard shortcuts and the keyboard cursor.
//!
//! | Key                     | Effect                                          |
//! |-------------------------|-------------------------------------------------|
//! | Escape                  | cancel everything, back to Select               |
//! | Cmd+C / Cmd+X / Cmd+V   | copy / cut / paste (second paste commits)       |
//! | Cmd+Z, Cmd+Shift+Z, Cmd+Y | undo / redo                                   |
//! | Cmd+A                   | select all                                      |
//! | Space                   | commit an armed paste                           |
//! | Delete / Backspace      | delete the selection                            |
//! | `,` / `.`               | shorter / longer note duration                  |
//! | arrows (Select)         | nudge selection: time by grid, pitch by semitone |
//! | arrows (generative)     | move the cursor; Enter commits at it            |
//! | v n c g t r             | tool hotkeys                                    |
//!
//! Shift widens horizontal steps to an octave.

use tracing::debug;

use super::{Cursor, Editor, Key, KeyEvent};
use crate::tool::{Tool, ToolKind};

impl Editor {
    /// Handle a key press. Returns false if the key means nothing here, so
    /// the host can let the browser handle it.
    pub fn key_down(&mut self, event: KeyEvent) -> bool {
        let shift = event.modifiers.shift;
        if event.modifiers.command {
            return match event.key {
                Key::Char('c') => {
                    self.copy();
                    true
                }
                Key::Char('x') => {
                    self.cut();
                    true
                }
                Key::Char('v') => {
                    self.paste();
                    true
                }
                Key::Char('z') if !shift => {
                    self.undo();
                    true
                }
                Key::Char('z') | Key::Char('y') => {
                    self.redo();
                    true
                }
                Key::Char('a') => {
                    self.select_all();
                    true
                }
                _ => false,
            };
        }

        match event.key {
            Key::Escape => {
                self.force_clear();
                true
            }
            Key::Space => {
                if self.paste_preview.is_some() {
                    let _ = self.commit_paste();
                    true
                } else {
                    false
                }
            }
            Key::Delete | Key::Backspace => {
                self.delete_selection();
                true
            }
            Key::Comma => {
                self.set_duration(self.duration().shorter());
                true
            }
            Key::Period => {
                self.set_duration(self.duration().longer());
                true
            }
            Key::Enter => self.commit_at_cursor(),
            Key::ArrowUp => self.arrow(0, 1),
            Key::ArrowDown => self.arrow(0, -1),
            Key::ArrowLeft => self.arrow(if shift { -12 } else { -1 }, 0),
            Key::ArrowRight => self.arrow(if shift { 12 } else { 1 }, 0),
            Key::Char(c) => match ToolKind::from_hotkey(c) {
                Some(kind) => {
                    self.set_tool(kind);
                    true
                }
                None => false,
            },
        }
    }

    fn uses_cursor(&self) -> bool {
        matches!(
            self.tools.active(),
            Tool::AddNote | Tool::AddChord { .. } | Tool::Run { .. }
        )
    }

    fn arrow(&mut self, semitones: i32, grid_steps: i32) -> bool {
        if self.uses_cursor() {
            self.move_cursor(semitones, grid_steps);
            return true;
        }
        if self.paste_preview.is_some() || self.gesture.is_some() {
            return false;
        }
        self.nudge(semitones, grid_steps)
    }

    /// Move the keyboard cursor, placing it first if there is none.
    pub fn move_cursor(&mut self, semitones: i32, grid_steps: i32) {
        let range = self.view.pitch_range;
        let mut cursor = match self.cursor {
            Some(cursor) => cursor,
            None => {
                let start = self.snap_time(self.view.scroll_position);
                Cursor {
                    pitch: range.clamp(60),
                    time: start,
                }
            }
        };
        cursor.pitch = range.clamp(cursor.pitch as i32 + semitones);
        cursor.time = self.snap_time(cursor.time + self.grid() * grid_steps as f64);
        self.cursor = Some(cursor);

        if self.paste_preview.is_some() {
            self.update_paste_preview(cursor.pitch, cursor.time);
            self.push_preview(None);
        } else {
            self.refresh_hover_preview();
        }
    }

    /// Enter: commit the active generative tool at the keyboard cursor.
    ///
    /// A run needs two presses: the first fixes its start.
    fn commit_at_cursor(&mut self) -> bool {
        let Some(cursor) = self.cursor else {
            return false;
        };
        match self.tools.active().clone() {
            Tool::AddNote => {
                let _ = self.add_note_at(cursor.pitch, cursor.time);
            }
            Tool::AddChord { chord } => {
                let _ = self.add_chord_at(cursor.pitch, cursor.time, chord);
            }
            Tool::Run { .. } => match self.run_anchor.take() {
                None => {
                    debug!(pitch = cursor.pitch, time = cursor.time, "run start set");
                    self.run_anchor = Some(cursor);
                    self.refresh_hover_preview();
                }
                Some(anchor) => {
                    let _ = self.add_run(anchor.pitch, anchor.time, cursor.pitch, cursor.time);
                    self.refresh_hover_preview();
                }
            },
            _ => return false,
        }
        true
    }
}
