//! # Coordinate Transform
//!
//! Maps musical time/pitch to pixel positions on the editing surface and back.
//!
//! ## Layout
//! ```text
//!   y = 0  ┌──────────────────────────────┐  later times
//!          │   notes scroll downwards     │
//!          │   toward the keyboard        │
//!          ├──────────────────────────────┤  y = container_height - keyboard_height
//!          │ keyboard  (time = scroll)    │
//!          └──────────────────────────────┘  y = container_height
//! ```
//!
//! ### Time ↔ Y
//! Linear: `y = container_height - keyboard_height - (time - scroll) * pixels_per_second`.
//!
//! ### Pitch ↔ X
//! Non-uniform. The visible pitch range is divided among its WHITE keys; each
//! white key gets an equal column. A black key is centered on the boundary
//! between its two white neighbours and is narrower (60% of a white key).
//! The same layout is used for note placement, hit testing and the keyboard
//! drawing, otherwise clicks resolve to the wrong pitch around E/F and B/C.
//!
//! `pitch_to_pixel_x` returns the CENTER of a key, so that
//! `pixel_x_to_pitch(pitch_to_pixel_x(p)) == p` for every pitch in range.

use serde::{Deserialize, Serialize};

/// Width of a black key relative to a white key.
pub const BLACK_KEY_RATIO: f64 = 0.6;

const BLACK_PITCH_CLASSES: [bool; 12] = [
    false, true, false, true, false, false, true, false, true, false, true, false,
];

pub fn is_black_key(pitch: u8) -> bool {
    BLACK_PITCH_CLASSES[(pitch % 12) as usize]
}

/// Inclusive pitch range shown on the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PitchRange {
    pub min: u8,
    pub max: u8,
}

impl PitchRange {
    /// The same range with its ends in order and inside 0-127.
    pub fn normalized(self) -> Self {
        let (low, high) = if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        };
        PitchRange {
            min: low.min(127),
            max: high.min(127),
        }
    }

    pub fn contains(&self, pitch: u8) -> bool {
        pitch >= self.min && pitch <= self.max
    }

    pub fn clamp(&self, pitch: i32) -> u8 {
        pitch.clamp(self.min as i32, self.max as i32) as u8
    }
}

impl Default for PitchRange {
    /// Full 88-key piano, A0 to C8.
    fn default() -> Self {
        PitchRange { min: 21, max: 108 }
    }
}

/// Geometry of the editing surface, owned by the host view.
///
/// The engine only ever writes `scroll_position`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewState {
    /// Time (seconds) sitting on the keyboard line.
    pub scroll_position: f64,
    /// Pixels per second before `height_factor` is applied.
    pub pixels_per_second: f64,
    /// Vertical zoom.
    pub height_factor: f64,
    pub pitch_range: PitchRange,
    pub container_width: f64,
    pub container_height: f64,
    pub keyboard_height: f64,
    /// Client-space position of the surface's top-left corner.
    pub surface_left: f64,
    pub surface_top: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            scroll_position: 0.0,
            pixels_per_second: 100.0,
            height_factor: 1.0,
            pitch_range: PitchRange::default(),
            container_width: 1040.0,
            container_height: 700.0,
            keyboard_height: 100.0,
            surface_left: 0.0,
            surface_top: 0.0,
        }
    }
}

impl ViewState {
    /// Zoom-scaled pixels per second.
    pub fn effective_pixels_per_second(&self) -> f64 {
        (self.pixels_per_second * self.height_factor).max(f64::EPSILON)
    }

    /// Client coordinates to surface-local coordinates.
    pub fn to_local(&self, client_x: f64, client_y: f64) -> (f64, f64) {
        (client_x - self.surface_left, client_y - self.surface_top)
    }

    pub fn contains_client(&self, client_x: f64, client_y: f64) -> bool {
        let (x, y) = self.to_local(client_x, client_y);
        x >= 0.0 && y >= 0.0 && x <= self.container_width && y <= self.container_height
    }

    /// Height of the note lane above the keyboard.
    pub fn lane_height(&self) -> f64 {
        (self.container_height - self.keyboard_height).max(0.0)
    }

    /// Times visible in the note lane: `(scroll, scroll + lane / pps)`.
    pub fn visible_time_range(&self) -> (f64, f64) {
        let span = self.lane_height() / self.effective_pixels_per_second();
        (self.scroll_position, self.scroll_position + span)
    }
}

/// Bidirectional time/pitch ↔ pixel mapping for one view geometry.
///
/// Cheap to build; construct one per event from the current [`ViewState`].
#[derive(Debug, Clone)]
pub struct CoordinateTransform {
    range: PitchRange,
    lane_bottom: f64,
    pixels_per_second: f64,
    white_width: f64,
    black_width: f64,
    /// Number of white keys strictly below each pitch of the range, indexed from `range.min`.
    whites_before: Vec<u32>,
    white_count: u32,
}

impl CoordinateTransform {
    pub fn new(view: &ViewState) -> Self {
        let range = view.pitch_range.normalized();
        let mut whites_before = Vec::with_capacity(range.max.saturating_sub(range.min) as usize + 1);
        let mut count = 0u32;
        for pitch in range.min..=range.max {
            whites_before.push(count);
            if !is_black_key(pitch) {
                count += 1;
            }
        }
        let white_width = view.container_width / count.max(1) as f64;
        CoordinateTransform {
            range,
            lane_bottom: view.container_height - view.keyboard_height,
            pixels_per_second: view.effective_pixels_per_second(),
            white_width,
            black_width: white_width * BLACK_KEY_RATIO,
            whites_before,
            white_count: count,
        }
    }

    pub fn pitch_range(&self) -> PitchRange {
        self.range
    }

    pub fn white_key_width(&self) -> f64 {
        self.white_width
    }

    pub fn time_to_pixel_y(&self, time: f64, scroll_position: f64) -> f64 {
        self.lane_bottom - (time - scroll_position) * self.pixels_per_second
    }

    /// Inverse of [`time_to_pixel_y`](Self::time_to_pixel_y), clamped at 0.
    pub fn pixel_y_to_time(&self, y: f64, scroll_position: f64) -> f64 {
        (scroll_position + (self.lane_bottom - y) / self.pixels_per_second).max(0.0)
    }

    /// Seconds covered by `pixels` of vertical distance.
    pub fn pixels_to_seconds(&self, pixels: f64) -> f64 {
        pixels / self.pixels_per_second
    }

    fn slot(&self, pitch: u8) -> u32 {
        let clamped = pitch.clamp(self.range.min, self.range.max);
        self.whites_before[(clamped - self.range.min) as usize]
    }

    /// Left edge and width of the key (and note column) for `pitch`.
    pub fn key_span(&self, pitch: u8) -> (f64, f64) {
        let boundary = self.slot(pitch) as f64 * self.white_width;
        if is_black_key(pitch) {
            (boundary - self.black_width / 2.0, self.black_width)
        } else {
            (boundary, self.white_width)
        }
    }

    /// Horizontal center of the key for `pitch`.
    pub fn pitch_to_pixel_x(&self, pitch: u8) -> f64 {
        let (left, width) = self.key_span(pitch);
        left + width / 2.0
    }

    /// Pitch under horizontal position `x`, clamped to the visible range.
    ///
    /// Black keys sit on top of the white ones, so they are tested first.
    pub fn pixel_x_to_pitch(&self, x: f64) -> u8 {
        let half_black = self.black_width / 2.0;
        for pitch in self.range.min..=self.range.max {
            if !is_black_key(pitch) {
                continue;
            }
            let boundary = self.slot(pitch) as f64 * self.white_width;
            if (x - boundary).abs() <= half_black {
                return pitch;
            }
        }

        if self.white_count == 0 {
            return self.range.min;
        }
        let index = (x / self.white_width).floor().clamp(0.0, (self.white_count - 1) as f64) as u32;
        (self.range.min..=self.range.max)
            .find(|&p| !is_black_key(p) && self.slot(p) == index)
            .unwrap_or(self.range.min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_every_pitch_full_keyboard() {
        let view = ViewState::default();
        let t = CoordinateTransform::new(&view);
        for pitch in view.pitch_range.min..=view.pitch_range.max {
            assert_eq!(t.pixel_x_to_pitch(t.pitch_to_pixel_x(pitch)), pitch, "pitch {}", pitch);
        }
    }

    #[test]
    fn test_round_trip_narrow_range_starting_on_black_key() {
        let view = ViewState {
            pitch_range: PitchRange { min: 61, max: 75 },
            container_width: 333.0,
            ..ViewState::default()
        };
        let t = CoordinateTransform::new(&view);
        for pitch in 61..=75 {
            assert_eq!(t.pixel_x_to_pitch(t.pitch_to_pixel_x(pitch)), pitch, "pitch {}", pitch);
        }
    }

    #[test]
    fn test_white_keys_share_width_equally() {
        // C4..B4 has seven white keys
        let view = ViewState {
            pitch_range: PitchRange { min: 60, max: 71 },
            container_width: 700.0,
            ..ViewState::default()
        };
        let t = CoordinateTransform::new(&view);
        assert_eq!(t.white_key_width(), 100.0);
        assert_eq!(t.key_span(60), (0.0, 100.0));
        assert_eq!(t.key_span(64), (200.0, 100.0));
        assert_eq!(t.key_span(65), (300.0, 100.0));
        // C# straddles the C/D boundary
        assert_eq!(t.key_span(61), (70.0, 60.0));
        assert_eq!(t.pitch_to_pixel_x(61), 100.0);
    }

    #[test]
    fn test_octave_boundary_resolution() {
        let view = ViewState {
            pitch_range: PitchRange { min: 60, max: 71 },
            container_width: 700.0,
            ..ViewState::default()
        };
        let t = CoordinateTransform::new(&view);
        // No black key between E and F: the boundary belongs to F
        assert_eq!(t.pixel_x_to_pitch(299.0), 64);
        assert_eq!(t.pixel_x_to_pitch(300.0), 65);
        // Near the C/D boundary the black key wins
        assert_eq!(t.pixel_x_to_pitch(95.0), 61);
        assert_eq!(t.pixel_x_to_pitch(65.0), 60);
    }

    #[test]
    fn test_pitch_is_monotonic_in_x() {
        let view = ViewState::default();
        let t = CoordinateTransform::new(&view);
        let mut last = 0.0;
        for pitch in view.pitch_range.min..=view.pitch_range.max {
            let x = t.pitch_to_pixel_x(pitch);
            assert!(x > last || pitch == view.pitch_range.min);
            last = x;
        }
    }

    #[test]
    fn test_x_outside_surface_clamps_to_range() {
        let view = ViewState::default();
        let t = CoordinateTransform::new(&view);
        assert_eq!(t.pixel_x_to_pitch(-50.0), 21);
        assert_eq!(t.pixel_x_to_pitch(5000.0), 108);
    }

    #[test]
    fn test_inverted_range_is_put_in_order() {
        let view = ViewState {
            pitch_range: PitchRange { min: 72, max: 60 },
            ..ViewState::default()
        };
        let t = CoordinateTransform::new(&view);
        assert_eq!(t.pitch_range(), PitchRange { min: 60, max: 72 });
        assert_eq!(t.pixel_x_to_pitch(t.pitch_to_pixel_x(64)), 64);
        // Pitches outside the range fall back to its nearest end
        assert_eq!(t.key_span(28), t.key_span(60));
    }

    #[test]
    fn test_range_above_midi_is_capped() {
        let view = ViewState {
            pitch_range: PitchRange { min: 120, max: 200 },
            ..ViewState::default()
        };
        let t = CoordinateTransform::new(&view);
        assert_eq!(t.pitch_range(), PitchRange { min: 120, max: 127 });
        assert_eq!(t.pixel_x_to_pitch(1.0e6), 127);
    }

    #[test]
    fn test_time_mapping() {
        let view = ViewState::default();
        let t = CoordinateTransform::new(&view);
        // Keyboard line is at 600px
        assert_eq!(t.time_to_pixel_y(0.0, 0.0), 600.0);
        assert_eq!(t.time_to_pixel_y(2.0, 0.0), 400.0);
        assert_eq!(t.time_to_pixel_y(2.0, 1.0), 500.0);
        assert_eq!(t.pixel_y_to_time(400.0, 0.0), 2.0);
        assert_eq!(t.pixel_y_to_time(500.0, 1.0), 2.0);
        // Below the keyboard line at scroll 0 clamps to 0
        assert_eq!(t.pixel_y_to_time(650.0, 0.0), 0.0);
    }

    #[test]
    fn test_height_factor_zooms_time() {
        let view = ViewState {
            height_factor: 2.0,
            ..ViewState::default()
        };
        let t = CoordinateTransform::new(&view);
        assert_eq!(t.time_to_pixel_y(1.0, 0.0), 400.0);
        assert_eq!(view.visible_time_range(), (0.0, 3.0));
    }
}
