//! # Session Replay
//!
//! Drives an [`Editor`] from a YAML script instead of a browser. Used by the
//! `keyroll` binary and handy for reproducing editing bugs.
//!
//! ## Session Format
//! ```yaml
//! config:                 # EditorConfig, every key optional
//!   noteCap: 500
//! view:                   # ViewState, every key optional
//!   containerWidth: 1040
//! document:               # initial notes, groups and annotations
//!   notes:
//!     - { id: 1, pitch: 60, startTime: 0.0, duration: 0.5 }
//! actions:
//!   - { action: setTool, tool: add-chord }
//!   - { action: setChord, chord: min7 }
//!   - { action: click, pitch: 62, time: 1.0 }
//!   - { action: drag, from: { pitch: 62, time: 1.2 }, to: { pitch: 64, time: 2.2 } }
//!   - { action: key, key: "z", modifiers: { command: true } }
//! ```
//!
//! Pointer actions take musical coordinates (`pitch`, `time`) which are
//! converted to client pixels with the session's view. The raw `down`, `move`
//! and `up` actions take client pixels directly.
//!
//! ## Example
//! ```rust
//! use keyroll::replay::{run_session, Session};
//!
//! let session = Session::from_yaml(
//!     "actions:\n  - { action: setTool, tool: add-chord }\n  - { action: click, pitch: 60, time: 0 }\n",
//! )?;
//! let report = run_session(session)?;
//! assert_eq!(report.document.notes.len(), 3);
//! assert_eq!(report.chords[0].chord.label, "Major");
//! # Ok::<(), keyroll::EditError>(())
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::EditorConfig;
use crate::document::Document;
use crate::engine::{Editor, EditorEvent, Key, KeyEvent, Modifiers, PointerEvent, StatusReport};
use crate::error::EditError;
use crate::theory::ChordLabel;
use crate::transform::ViewState;

/// A point on the roll in musical coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub pitch: u8,
    pub time: f64,
}

/// One scripted input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Action {
    SetTool {
        tool: String,
    },
    SetDuration {
        duration: String,
    },
    SetChord {
        chord: String,
    },
    SetRun {
        pattern: String,
        key: String,
    },
    SetSpacer {
        amount: f64,
    },
    SetText {
        text: String,
        #[serde(default)]
        font: String,
    },
    SetSnap {
        snap: bool,
    },
    Click {
        pitch: u8,
        time: f64,
        #[serde(default)]
        modifiers: Modifiers,
        #[serde(default)]
        double: bool,
    },
    /// Press at `from`, move through `steps` intermediate points, release at `to`.
    Drag {
        from: Point,
        to: Point,
        #[serde(default)]
        modifiers: Modifiers,
        #[serde(default = "default_steps")]
        steps: u32,
    },
    Hover {
        pitch: u8,
        time: f64,
    },
    Down(PointerEvent),
    Move(PointerEvent),
    Up(PointerEvent),
    /// A DOM key name such as `"Escape"`, `"ArrowUp"` or `"c"`.
    Key {
        key: String,
        #[serde(default)]
        modifiers: Modifiers,
    },
    #[serde(rename_all = "camelCase")]
    Tick {
        now_ms: f64,
        #[serde(default)]
        playback_time: Option<f64>,
    },
    Scroll {
        seconds: f64,
    },
}

fn default_steps() -> u32 {
    4
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    pub config: EditorConfig,
    pub view: ViewState,
    pub document: Document,
    pub actions: Vec<Action>,
}

impl Session {
    pub fn from_yaml(source: &str) -> Result<Self, EditError> {
        let session: Session = serde_yaml::from_str(source)?;
        session.config.validate()?;
        Ok(session)
    }
}

/// What a replay leaves behind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayReport {
    pub document: Document,
    pub chords: Vec<ChordLabel>,
    pub status: StatusReport,
    /// User-facing warnings raised along the way (e.g. capacity rejections).
    pub warnings: Vec<String>,
}

impl ReplayReport {
    pub fn to_yaml(&self) -> Result<String, EditError> {
        serde_yaml::to_string(self).map_err(|e| EditError::Output(e.to_string()))
    }
}

/// Replay every action of `session` on a fresh editor.
///
/// Stops at the first action that cannot be applied.
pub fn run_session(session: Session) -> Result<ReplayReport, EditError> {
    let mut editor = Editor::try_with_view(session.config, session.view)?;
    editor.load(session.document)?;
    let mut warnings = Vec::new();

    for (index, action) in session.actions.iter().enumerate() {
        let step = index + 1;
        debug!(step, ?action, "replaying");
        apply(&mut editor, action).map_err(|e| EditError::Script {
            step,
            message: e.to_string(),
        })?;
        for event in editor.take_events() {
            if let EditorEvent::Warning(err) = event {
                warnings.push(err.to_string());
            }
        }
    }

    let chords = editor.chord_labels();
    info!(
        actions = session.actions.len(),
        notes = editor.notes().len(),
        chords = chords.len(),
        "replay finished"
    );
    Ok(ReplayReport {
        document: editor.document(),
        chords,
        status: editor.status(),
        warnings,
    })
}

fn client_point(editor: &Editor, point: Point) -> (f64, f64) {
    let view = editor.view();
    let transform = editor.transform();
    (
        view.surface_left + transform.pitch_to_pixel_x(point.pitch),
        view.surface_top + transform.time_to_pixel_y(point.time, view.scroll_position),
    )
}

fn pointer(editor: &Editor, point: Point, modifiers: Modifiers) -> PointerEvent {
    let (x, y) = client_point(editor, point);
    PointerEvent::at(x, y).with_modifiers(modifiers)
}

fn apply(editor: &mut Editor, action: &Action) -> Result<(), EditError> {
    match action {
        Action::SetTool { tool } => editor.set_tool_by_name(tool)?,
        Action::SetDuration { duration } => editor.set_duration_by_name(duration)?,
        Action::SetChord { chord } => editor.set_chord_type(chord)?,
        Action::SetRun { pattern, key } => editor.set_run(pattern, key)?,
        Action::SetSpacer { amount } => editor.set_spacer_amount(*amount),
        Action::SetText { text, font } => editor.set_text(text, font),
        Action::SetSnap { snap } => editor.set_snap_to_grid(*snap),
        Action::Click {
            pitch,
            time,
            modifiers,
            double,
        } => {
            let point = Point {
                pitch: *pitch,
                time: *time,
            };
            let mut event = pointer(editor, point, *modifiers);
            if *double {
                event = event.double();
            }
            editor.pointer_down(event);
            editor.pointer_up(event);
        }
        Action::Drag {
            from,
            to,
            modifiers,
            steps,
        } => {
            editor.pointer_down(pointer(editor, *from, *modifiers));
            let steps = (*steps).max(1);
            // Positions are recomputed per step since the drag may scroll the view
            for i in 1..=steps {
                let t = i as f64 / steps as f64;
                let pitch = from.pitch as f64 + (to.pitch as f64 - from.pitch as f64) * t;
                let point = Point {
                    pitch: pitch.round().clamp(0.0, 127.0) as u8,
                    time: from.time + (to.time - from.time) * t,
                };
                editor.pointer_move(pointer(editor, point, *modifiers));
            }
            editor.pointer_up(pointer(editor, *to, *modifiers));
        }
        Action::Hover { pitch, time } => {
            let point = Point {
                pitch: *pitch,
                time: *time,
            };
            editor.pointer_move(pointer(editor, point, Modifiers::NONE));
        }
        Action::Down(event) => editor.pointer_down(*event),
        Action::Move(event) => editor.pointer_move(*event),
        Action::Up(event) => editor.pointer_up(*event),
        Action::Key { key, modifiers } => {
            let key = key
                .parse::<Key>()
                .map_err(|()| EditError::UnknownKey(key.clone()))?;
            editor.key_down(KeyEvent::with_modifiers(key, *modifiers));
        }
        Action::Tick {
            now_ms,
            playback_time,
        } => editor.tick(*now_ms, *playback_time),
        Action::Scroll { seconds } => editor.set_scroll(*seconds),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_defaults() {
        let session = Session::from_yaml("actions: []\n").unwrap();
        assert_eq!(session.config, EditorConfig::default());
        assert!(session.document.notes.is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = Session::from_yaml("config:\n  noteCap: 0\n");
        assert!(matches!(result, Err(EditError::InvalidConfig(_))));
    }

    #[test]
    fn test_bad_step_reports_its_index() {
        let session = Session::from_yaml(
            "actions:\n  - { action: setTool, tool: run }\n  - { action: setRun, pattern: bebop, key: C }\n",
        )
        .unwrap();
        match run_session(session) {
            Err(EditError::Script { step, message }) => {
                assert_eq!(step, 2);
                assert!(message.contains("bebop"));
            }
            other => panic!("expected script error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_key_name() {
        let session = Session::from_yaml("actions:\n  - { action: key, key: F13 }\n").unwrap();
        assert!(matches!(
            run_session(session),
            Err(EditError::Script { step: 1, .. })
        ));
    }

    #[test]
    fn test_drag_moves_note_and_undo_key() {
        let source = r#"
document:
  notes:
    - { id: 1, pitch: 60, startTime: 1.0, duration: 0.5 }
actions:
  - { action: drag, from: { pitch: 60, time: 1.2 }, to: { pitch: 67, time: 2.2 } }
"#;
        let report = run_session(Session::from_yaml(source).unwrap()).unwrap();
        let moved = &report.document.notes[0];
        assert_eq!(moved.pitch, 67);
        assert_eq!(moved.start_time, 2.0);
        assert!(report.status.can_undo);

        let undo = format!(
            "{}  - {{ action: key, key: z, modifiers: {{ command: true }} }}\n",
            source.trim_start()
        );
        let report = run_session(Session::from_yaml(&undo).unwrap()).unwrap();
        assert_eq!(report.document.notes[0].pitch, 60);
        assert_eq!(report.document.notes[0].start_time, 1.0);
    }

    #[test]
    fn test_capacity_warning_is_reported() {
        let source = r#"
config:
  noteCap: 2
actions:
  - { action: setTool, tool: add-chord }
  - { action: click, pitch: 60, time: 0 }
"#;
        let report = run_session(Session::from_yaml(source).unwrap()).unwrap();
        assert!(report.document.notes.is_empty());
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].starts_with("Note limit reached"));
    }

    #[test]
    fn test_report_yaml_shape() {
        let session = Session::from_yaml(
            "actions:\n  - { action: setTool, tool: note }\n  - { action: click, pitch: 64, time: 0.5 }\n",
        )
        .unwrap();
        let yaml = run_session(session).unwrap().to_yaml().unwrap();
        assert!(yaml.contains("startTime: 0.5"));
        assert!(yaml.contains("noteCount: 1"));
    }
}
