use crate::geometry::Aabb;
use crate::player::Look;

/// Swing animation frames; only the last one hurts.
pub const FRAME_COUNT: usize = 3;
pub const ACTIVE_FRAME: usize = 2;
const FRAME_TICKS: i32 = 6;
/// Height of the lash, measured from the top of the player's box.
const LASH_OFFSET_Y: i32 = 6;
const LASH_HEIGHT: i32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeaponKind {
    Whip,
    Chain,
}

impl WeaponKind {
    pub fn reach(self) -> i32 {
        match self {
            Self::Whip => 24,
            Self::Chain => 40,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Whip => "whip",
            Self::Chain => "chain",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Weapon {
    kind: WeaponKind,
    /// Current swing frame, `None` while not attacking.
    frame: Option<usize>,
    ticks: i32,
}

impl Weapon {
    pub fn new() -> Self {
        Self {
            kind: WeaponKind::Whip,
            frame: None,
            ticks: 0,
        }
    }

    pub fn kind(&self) -> WeaponKind {
        self.kind
    }

    pub fn set_kind(&mut self, kind: WeaponKind) {
        if self.kind != kind {
            log::debug!("Weapon {} -> {}", self.kind.label(), kind.label());
        }
        self.kind = kind;
    }

    /// Begin a swing. Ignored while one is already running.
    pub fn start_attack(&mut self) -> bool {
        if self.frame.is_some() {
            return false;
        }
        self.frame = Some(0);
        self.ticks = 0;
        true
    }

    pub fn is_attacking(&self) -> bool {
        self.frame.is_some()
    }

    pub fn frame(&self) -> Option<usize> {
        self.frame
    }

    pub fn is_active_frame(&self) -> bool {
        self.frame == Some(ACTIVE_FRAME)
    }

    pub fn update(&mut self) {
        let Some(frame) = self.frame else {
            return;
        };
        self.ticks += 1;
        if self.ticks < FRAME_TICKS {
            return;
        }
        self.ticks = 0;
        self.frame = if frame + 1 < FRAME_COUNT {
            Some(frame + 1)
        } else {
            None
        };
    }

    /// Cancel any swing in progress.
    pub fn reset(&mut self) {
        self.frame = None;
        self.ticks = 0;
    }

    /// Area the weapon hurts this frame, if any.
    pub fn hitbox_on_attack(&self, body: &Aabb, look: Look) -> Option<Aabb> {
        if !self.is_active_frame() {
            return None;
        }
        Some(self.lash_box(body, look))
    }

    /// Area the weapon covers on its current frame, for drawing.
    pub fn drawn_box(&self, body: &Aabb, look: Look) -> Option<Aabb> {
        let frame = self.frame?;
        let mut lash = self.lash_box(body, look);
        if frame != ACTIVE_FRAME {
            // Wind-up frames sit behind the player's head.
            lash.w = 8;
            lash.x = match look {
                Look::Right => body.x - 8,
                Look::Left => body.right(),
            };
            lash.y -= 4;
        }
        Some(lash)
    }

    fn lash_box(&self, body: &Aabb, look: Look) -> Aabb {
        let reach = self.kind.reach();
        let x = match look {
            Look::Right => body.right(),
            Look::Left => body.x - reach,
        };
        Aabb::new(x, body.y + LASH_OFFSET_Y, reach, LASH_HEIGHT)
    }
}

impl Default for Weapon {
    fn default() -> Self {
        Self::new()
    }
}
