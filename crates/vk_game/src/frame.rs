//! Draw list for one presented frame.
//!
//! Scene and game rendering only compose colored rectangles and text runs
//! here; turning them into GPU buffers happens in `to_batch`, so everything
//! upstream stays testable without a device.

use vk_devtools::ScreenText;
use vk_render::QuadBatch;

use crate::constants::{SIDE_MARGINS, TOP_MARGIN};
use crate::geometry::Aabb;
use crate::object::ObjectKind;
use crate::tilemap::Layer;

/// What a quad depicts. Used by the debug overlay and by tests that check
/// draw order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawTag {
    Backdrop,
    Tile(Layer),
    Object(ObjectKind),
    ChestReveal,
    LootReveal,
    BossLoot,
    BossDoor,
    Enemy,
    Trader,
    TraderPopup,
    Player,
    Weapon,
    Hitbox,
    Hud,
    GameOver,
    /// Title, menu and ending artwork.
    Screen,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawQuad {
    /// Screen pixels, top-left corner.
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    pub color: [f32; 4],
    /// Draw the border only.
    pub outline: bool,
    pub tag: DrawTag,
}

#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub quads: Vec<DrawQuad>,
    pub texts: Vec<ScreenText>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Room pixels to screen pixels.
    pub fn world_to_screen(x: i32, y: i32) -> (i32, i32) {
        (x + SIDE_MARGINS, y + TOP_MARGIN)
    }

    pub fn world_rect(&mut self, rect: Aabb, color: [f32; 4], tag: DrawTag) {
        let (x, y) = Self::world_to_screen(rect.x, rect.y);
        self.push(x, y, rect.w, rect.h, color, false, tag);
    }

    pub fn world_outline(&mut self, rect: Aabb, color: [f32; 4]) {
        let (x, y) = Self::world_to_screen(rect.x, rect.y);
        self.push(x, y, rect.w, rect.h, color, true, DrawTag::Hitbox);
    }

    pub fn screen_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: [f32; 4], tag: DrawTag) {
        self.push(x, y, w, h, color, false, tag);
    }

    pub fn text(&mut self, text: ScreenText) {
        self.texts.push(text);
    }

    pub fn count(&self, tag: DrawTag) -> usize {
        self.quads.iter().filter(|q| q.tag == tag).count()
    }

    /// Index of the first quad with `tag`, for draw-order checks.
    #[cfg(test)]
    pub fn first_index(&self, tag: DrawTag) -> Option<usize> {
        self.quads.iter().position(|q| q.tag == tag)
    }

    #[cfg(test)]
    pub fn has_text(&self, needle: &str) -> bool {
        self.texts.iter().any(|t| t.text.contains(needle))
    }

    pub fn to_batch(&self, batch: &mut QuadBatch) {
        batch.clear();
        for q in &self.quads {
            let (x, y, w, h) = (q.x as f32, q.y as f32, q.w as f32, q.h as f32);
            if q.outline {
                batch.push_outline(x, y, w, h, 1.0, q.color);
            } else {
                batch.push_rect(x, y, w, h, q.color);
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn push(&mut self, x: i32, y: i32, w: i32, h: i32, color: [f32; 4], outline: bool, tag: DrawTag) {
        if w <= 0 || h <= 0 {
            return;
        }
        self.quads.push(DrawQuad {
            x,
            y,
            w,
            h,
            color,
            outline,
            tag,
        });
    }
}

/// Flat palette: each tile code gets a stable color, darker in the back layer.
pub fn tile_color(code: i32, layer: Layer) -> [f32; 4] {
    let hash = (code as u32).wrapping_mul(2_654_435_761);
    let r = 0.25 + ((hash >> 8) & 0xff) as f32 / 255.0 * 0.45;
    let g = 0.20 + ((hash >> 16) & 0xff) as f32 / 255.0 * 0.35;
    let b = 0.25 + ((hash >> 24) & 0xff) as f32 / 255.0 * 0.45;
    let shade = match layer {
        Layer::Back => 0.45,
        Layer::Mid => 0.85,
        Layer::Front => 1.0,
    };
    [r * shade, g * shade, b * shade, 1.0]
}

pub fn with_alpha(color: [f32; 4], alpha: f32) -> [f32; 4] {
    [color[0], color[1], color[2], alpha]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_rect_applies_room_margins() {
        let mut frame = Frame::new();
        frame.world_rect(Aabb::new(16, 0, 16, 16), [1.0; 4], DrawTag::Player);
        assert_eq!(frame.quads[0].x, 0);
        assert_eq!(frame.quads[0].y, TOP_MARGIN);
    }

    #[test]
    fn empty_rects_are_dropped() {
        let mut frame = Frame::new();
        frame.screen_rect(0, 0, 0, 8, [1.0; 4], DrawTag::Hud);
        assert!(frame.quads.is_empty());
    }

    #[test]
    fn batch_expands_outlines() {
        let mut frame = Frame::new();
        frame.world_outline(Aabb::new(0, 0, 10, 10), [1.0; 4]);
        frame.screen_rect(0, 0, 4, 4, [1.0; 4], DrawTag::Hud);
        let mut batch = QuadBatch::new();
        frame.to_batch(&mut batch);
        assert_eq!(batch.quad_count(), 5);
    }

    #[test]
    fn tile_colors_are_stable_and_shaded() {
        assert_eq!(tile_color(108, Layer::Mid), tile_color(108, Layer::Mid));
        assert!(tile_color(108, Layer::Back)[0] < tile_color(108, Layer::Front)[0]);
    }
}
