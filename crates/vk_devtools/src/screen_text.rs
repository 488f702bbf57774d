//! Text drawn over the game screen (HUD counters, menu captions). The game
//! composes runs in logical screen pixels; the overlay maps them to egui
//! points for the current window size.

#[derive(Debug, Clone, PartialEq)]
pub struct ScreenText {
    pub x: f32,
    pub y: f32,
    /// Glyph height in logical pixels.
    pub size: f32,
    pub color: [f32; 4],
    pub text: String,
}

impl ScreenText {
    pub fn new(x: f32, y: f32, text: impl Into<String>) -> Self {
        Self {
            x,
            y,
            size: 8.0,
            color: [1.0, 1.0, 1.0, 1.0],
            text: text.into(),
        }
    }

    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }
}

/// Where the logical screen sits inside the window, in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextPlacement {
    pub origin: (f32, f32),
    /// Physical pixels per logical pixel.
    pub scale: f32,
    pub pixels_per_point: f32,
}

impl TextPlacement {
    /// Logical screen pixel to egui point.
    pub fn to_points(&self, x: f32, y: f32) -> (f32, f32) {
        let ppp = self.pixels_per_point.max(f32::EPSILON);
        (
            (self.origin.0 + x * self.scale) / ppp,
            (self.origin.1 + y * self.scale) / ppp,
        )
    }

    pub fn font_points(&self, size: f32) -> f32 {
        size * self.scale / self.pixels_per_point.max(f32::EPSILON)
    }
}
