use glam::IVec2;

use crate::constants::{BOSS_DOOR_HEIGHT, BOSS_DOOR_POS, BOSS_DOOR_WIDTH};
use crate::frame::{DrawTag, Frame};
use crate::geometry::Aabb;

const OPEN_ANIM_FRAMES: i32 = 24;

/// The locked door guarding the boss room. Once open it stays open.
#[derive(Debug, Clone)]
pub struct BossDoor {
    pos: IVec2,
    open: bool,
    /// Steps since opening, capped at the animation length.
    open_ticks: i32,
}

impl BossDoor {
    pub fn new() -> Self {
        Self {
            pos: BOSS_DOOR_POS,
            open: false,
            open_ticks: 0,
        }
    }

    pub fn hitbox(&self) -> Aabb {
        Aabb::from_bottom_left(self.pos, BOSS_DOOR_WIDTH, BOSS_DOOR_HEIGHT)
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Returns true only on the call that actually opened it.
    pub fn open(&mut self) -> bool {
        if self.open {
            return false;
        }
        log::info!("Boss door opened");
        self.open = true;
        true
    }

    pub fn update(&mut self) {
        if self.open && self.open_ticks < OPEN_ANIM_FRAMES {
            self.open_ticks += 1;
        }
    }

    pub fn render(&self, frame: &mut Frame) {
        let mut body = self.hitbox();
        // The leaf swings away while opening, leaving the frame post.
        let closed_h = BOSS_DOOR_HEIGHT * (OPEN_ANIM_FRAMES - self.open_ticks) / OPEN_ANIM_FRAMES;
        body.h = closed_h.max(4);
        frame.world_rect(body, [0.45, 0.30, 0.15, 1.0], DrawTag::BossDoor);
    }
}

impl Default for BossDoor {
    fn default() -> Self {
        Self::new()
    }
}
