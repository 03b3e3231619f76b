use keyroll::{
    Document, EditError, Editor, EditorConfig, Key, KeyEvent, Modifiers, PointerEvent, ToolKind,
    ViewState,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[derive(Serialize)]
struct EditorError {
    message: String,
    kind: &'static str,
}

fn error_kind(e: &EditError) -> &'static str {
    match e {
        EditError::CapacityExceeded { .. } => "capacity",
        EditError::UnknownChordType(_)
        | EditError::UnknownScale(_)
        | EditError::UnknownDuration(_)
        | EditError::UnknownTool(_)
        | EditError::UnknownKey(_) => "unknown-name",
        EditError::InvalidConfig(_) | EditError::ConfigParse(_) => "config",
        EditError::Script { .. } => "script",
        EditError::Output(_) => "output",
    }
}

fn to_js_error(e: EditError) -> JsValue {
    let error = EditorError {
        message: e.to_string(),
        kind: error_kind(&e),
    };
    match serde_json::to_string(&error) {
        Ok(json) => JsValue::from_str(&json),
        Err(_) => JsValue::from_str(&error.message),
    }
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn modifiers(shift: bool, command: bool, alt: bool) -> Modifiers {
    Modifiers {
        shift,
        command,
        alt,
    }
}

/// A piano-roll editor bound to one canvas.
///
/// Every input method returns nothing; call `takeEvents` afterwards to drain
/// the changes, previews and warnings the input produced.
#[wasm_bindgen]
pub struct PianoRoll {
    editor: Editor,
}

#[wasm_bindgen]
impl PianoRoll {
    /// Create an editor from an optional YAML configuration.
    #[wasm_bindgen(constructor)]
    pub fn new(config: Option<String>) -> Result<PianoRoll, JsValue> {
        let config = match config {
            Some(source) => EditorConfig::from_yaml(&source).map_err(to_js_error)?,
            None => EditorConfig::default(),
        };
        Ok(PianoRoll {
            editor: Editor::new(config),
        })
    }

    /// Replace the view geometry with a JS object shaped like `ViewState`.
    #[wasm_bindgen(js_name = setView)]
    pub fn set_view(&mut self, view: JsValue) -> Result<(), JsValue> {
        let view: ViewState =
            serde_wasm_bindgen::from_value(view).map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.editor.set_view(view);
        Ok(())
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.editor.resize(width, height);
    }

    #[wasm_bindgen(js_name = setSurfaceOrigin)]
    pub fn set_surface_origin(&mut self, left: f64, top: f64) {
        self.editor.set_surface_origin(left, top);
    }

    #[wasm_bindgen(js_name = setZoom)]
    pub fn set_zoom(&mut self, pixels_per_second: f64, height_factor: f64) {
        self.editor.set_zoom(pixels_per_second, height_factor);
    }

    #[wasm_bindgen(js_name = setScroll)]
    pub fn set_scroll(&mut self, seconds: f64) {
        self.editor.set_scroll(seconds);
    }

    /// Load a document given as JSON.
    pub fn load(&mut self, json: &str) -> Result<(), JsValue> {
        let document: Document =
            serde_json::from_str(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.editor.load(document).map_err(to_js_error)
    }

    /// The current document as JSON.
    pub fn save(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.editor.document()).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(js_name = setTool)]
    pub fn set_tool(&mut self, name: &str) -> Result<(), JsValue> {
        self.editor.set_tool_by_name(name).map_err(to_js_error)
    }

    pub fn tool(&self) -> String {
        self.editor.tool_kind().name().to_string()
    }

    #[wasm_bindgen(js_name = setDuration)]
    pub fn set_duration(&mut self, token: &str) -> Result<(), JsValue> {
        self.editor.set_duration_by_name(token).map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = setChord)]
    pub fn set_chord(&mut self, token: &str) -> Result<(), JsValue> {
        self.editor.set_chord_type(token).map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = setRun)]
    pub fn set_run(&mut self, pattern: &str, key: &str) -> Result<(), JsValue> {
        self.editor.set_run(pattern, key).map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = setSpacerAmount)]
    pub fn set_spacer_amount(&mut self, seconds: f64) {
        self.editor.set_spacer_amount(seconds);
    }

    #[wasm_bindgen(js_name = setText)]
    pub fn set_text(&mut self, text: &str, font: &str) {
        self.editor.set_text(text, font);
    }

    #[wasm_bindgen(js_name = setSnapToGrid)]
    pub fn set_snap_to_grid(&mut self, snap: bool) {
        self.editor.set_snap_to_grid(snap);
    }

    #[wasm_bindgen(js_name = setTempo)]
    pub fn set_tempo(&mut self, tempo: f64) -> Result<(), JsValue> {
        self.editor.set_tempo(tempo).map_err(to_js_error)
    }

    /// Set the velocity (0-1) of every selected note. False without a selection.
    #[wasm_bindgen(js_name = setVelocity)]
    pub fn set_velocity(&mut self, velocity: f64) -> bool {
        self.editor.set_velocity(velocity)
    }

    #[wasm_bindgen(js_name = adjustVelocity)]
    pub fn adjust_velocity(&mut self, delta: f64) -> bool {
        self.editor.adjust_velocity(delta)
    }

    #[wasm_bindgen(js_name = setLeftHand)]
    pub fn set_left_hand(&mut self, left: bool) -> bool {
        self.editor.set_left_hand(left)
    }

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(
        &mut self,
        x: f64,
        y: f64,
        shift: bool,
        command: bool,
        alt: bool,
        click_count: u8,
    ) {
        let mut event = PointerEvent::at(x, y).with_modifiers(modifiers(shift, command, alt));
        event.click_count = click_count.max(1);
        self.editor.pointer_down(event);
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f64, y: f64, shift: bool, command: bool, alt: bool) {
        let event = PointerEvent::at(x, y).with_modifiers(modifiers(shift, command, alt));
        self.editor.pointer_move(event);
    }

    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self, x: f64, y: f64, shift: bool, command: bool, alt: bool) {
        let event = PointerEvent::at(x, y).with_modifiers(modifiers(shift, command, alt));
        self.editor.pointer_up(event);
    }

    /// Handle a `KeyboardEvent.key`. Returns true if the key was consumed and
    /// the browser default should be prevented.
    #[wasm_bindgen(js_name = keyDown)]
    pub fn key_down(&mut self, key: &str, shift: bool, command: bool, alt: bool) -> bool {
        match key.parse::<Key>() {
            Ok(key) => self
                .editor
                .key_down(KeyEvent::with_modifiers(key, modifiers(shift, command, alt))),
            Err(()) => false,
        }
    }

    /// Window lost focus.
    pub fn blur(&mut self) {
        self.editor.blur();
    }

    /// Escape from anything, back to the select tool.
    #[wasm_bindgen(js_name = forceClear)]
    pub fn force_clear(&mut self) {
        self.editor.force_clear();
    }

    /// Call from `requestAnimationFrame`.
    pub fn tick(&mut self, now_ms: f64, playback_time: Option<f64>) {
        self.editor.tick(now_ms, playback_time);
    }

    pub fn undo(&mut self) -> bool {
        self.editor.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.editor.redo()
    }

    /// Drain queued events as an array of `{ type, payload }` objects.
    #[wasm_bindgen(js_name = takeEvents)]
    pub fn take_events(&mut self) -> Result<JsValue, JsValue> {
        to_js(&self.editor.take_events())
    }

    #[wasm_bindgen(js_name = chordLabels)]
    pub fn chord_labels(&self) -> Result<JsValue, JsValue> {
        to_js(&self.editor.chord_labels())
    }

    pub fn status(&self) -> Result<JsValue, JsValue> {
        to_js(&self.editor.status())
    }
}

/// Tool names accepted by `setTool`, in toolbar order.
#[wasm_bindgen(js_name = toolNames)]
pub fn tool_names() -> Vec<String> {
    [
        ToolKind::Select,
        ToolKind::AddNote,
        ToolKind::AddChord,
        ToolKind::Run,
        ToolKind::Spacer,
        ToolKind::Text,
    ]
    .iter()
    .map(|kind| kind.name().to_string())
    .collect()
}

/// Replay a YAML session and return the report as YAML.
#[wasm_bindgen]
pub fn replay(source: &str) -> Result<String, JsValue> {
    keyroll::replay(source).map_err(to_js_error)
}
