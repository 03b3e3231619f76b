//! # Error Types
//!
//! This module defines the error type shared by the editing engine, its
//! configuration loader and the replay CLI.
//!
//! Most interaction problems are NOT errors: out-of-range pitches and times are
//! clamped, commands on an empty selection do nothing, and gestures whose tool
//! was switched away are cancelled. What remains is listed here.
//!
//! ## Error Types
//! - `CapacityExceeded` - An insert would push the note collection over its cap
//! - `UnknownChordType` / `UnknownScale` / `UnknownDuration` / `UnknownTool` / `UnknownKey`
//!   - A toolbar parameter that does not name anything the engine knows
//! - `InvalidConfig` / `ConfigParse` - Rejected editor configuration
//! - `Script` - A replay script step that cannot be applied
//! - `Output` - The replay result could not be rendered
//!
//! ## Usage
//! ```rust
//! use keyroll::{EditError, Editor, EditorConfig};
//!
//! let mut editor = Editor::new(EditorConfig::default());
//! match editor.set_chord_type("major") {
//!     Ok(()) => {}
//!     Err(EditError::UnknownChordType(name)) => eprintln!("no chord called {}", name),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    /// Inserting would exceed the note cap.
    ///
    /// The whole operation is rejected; nothing is inserted.
    ///
    /// # Example
    /// ```
    /// # use keyroll::EditError;
    /// let err = EditError::CapacityExceeded { requested: 3, available: 1, cap: 20000 };
    /// assert_eq!(
    ///     err.to_string(),
    ///     "Note limit reached: cannot add 3 notes (1 of 20000 slots left)"
    /// );
    /// ```
    #[error("Note limit reached: cannot add {requested} notes ({available} of {cap} slots left)")]
    CapacityExceeded {
        requested: usize,
        available: usize,
        cap: usize,
    },

    #[error("Unknown chord type: {0}")]
    UnknownChordType(String),

    #[error("Unknown scale or arpeggio pattern: {0}")]
    UnknownScale(String),

    #[error("Unknown note duration: {0}")]
    UnknownDuration(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Unknown key: {0}")]
    UnknownKey(String),

    /// Configuration parsed but holds values the engine cannot run with.
    ///
    /// # Example
    /// ```
    /// # use keyroll::EditError;
    /// let err = EditError::InvalidConfig("note cap must be positive".to_string());
    /// assert_eq!(err.to_string(), "Invalid configuration: note cap must be positive");
    /// ```
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Could not parse configuration: {0}")]
    ConfigParse(String),

    #[error("Script error at step {step}: {message}")]
    Script { step: usize, message: String },

    #[error("Could not write output: {0}")]
    Output(String),
}

impl From<serde_yaml::Error> for EditError {
    fn from(e: serde_yaml::Error) -> Self {
        EditError::ConfigParse(e.to_string())
    }
}
