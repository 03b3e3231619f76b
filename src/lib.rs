pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod history;
pub mod note;
pub mod quantize;
pub mod replay;
pub mod selection;
pub mod theory;
pub mod tool;
pub mod transform;

pub use config::EditorConfig;
pub use document::{Document, TextAnnotation};
pub use engine::{
    Cursor, Editor, EditorEvent, EditorSnapshot, FrameSnapshot, Handle, Key, KeyEvent,
    MarqueeRect, Modifiers, PointerEvent, PreviewSnapshot, StatusReport,
};
pub use error::EditError;
pub use note::{Note, NoteCollection, NoteId, DEFAULT_NOTE_CAP};
pub use quantize::{NoteDuration, Quantizer, TimeSignature};
pub use replay::{run_session, Action, ReplayReport, Session};
pub use selection::{GroupId, Selection};
pub use tool::{Tool, ToolKind, ToolParameters};
pub use transform::{CoordinateTransform, PitchRange, ViewState};

/// Replay a YAML editing session and return the resulting report as YAML.
/// This is the main entry point for the command-line tool.
pub fn replay(source: &str) -> Result<String, EditError> {
    let session = Session::from_yaml(source)?;
    run_session(session)?.to_yaml()
}
