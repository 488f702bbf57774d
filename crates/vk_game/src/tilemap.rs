//! The active room's tile layers and the queries gameplay runs against them.
//!
//! Only the mid layer carries gameplay meaning: solids, breakable bricks and
//! the invisible exit/win markers. Back and front layers are scenery drawn
//! behind and in front of the entities. The one exception is the win marker,
//! which may be painted into the front layer as well.

use crate::geometry::Aabb;

pub mod tile {
    /// Player start marker, cleared to air on load.
    pub const PLAYER_START: i32 = -2;
    /// Explicitly empty cell, cleared to air on load.
    pub const EMPTY: i32 = -1;
    pub const AIR: i32 = 0;
    pub const BRICK_A: i32 = 131;
    pub const BRICK_B: i32 = 132;
    pub const EXIT_LEFT: i32 = 500;
    pub const EXIT_RIGHT: i32 = 501;
    pub const EXIT_TOP: i32 = 502;
    pub const EXIT_BOTTOM: i32 = 503;
    pub const INVISIBLE_WALL: i32 = 550;
    pub const WIN: i32 = 551;

    pub fn is_breakable(code: i32) -> bool {
        code == BRICK_A || code == BRICK_B
    }

    pub fn is_solid(code: i32) -> bool {
        (1..EXIT_LEFT).contains(&code) || code == INVISIBLE_WALL
    }

    /// Markers that are never drawn outside the debug view.
    pub fn is_marker(code: i32) -> bool {
        code >= EXIT_LEFT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Back,
    Mid,
    Front,
}

#[derive(Debug, Clone)]
pub struct TileMap {
    width: i32,
    height: i32,
    tile_size: i32,
    back: Vec<i32>,
    mid: Vec<i32>,
    front: Vec<i32>,
}

impl TileMap {
    pub fn new(width: i32, height: i32, tile_size: i32) -> Self {
        let cells = (width.max(0) * height.max(0)) as usize;
        Self {
            width,
            height,
            tile_size,
            back: vec![tile::AIR; cells],
            mid: vec![tile::AIR; cells],
            front: vec![tile::AIR; cells],
        }
    }

    /// Replace all three layers. Each must hold `width * height` cells.
    pub fn load(
        &mut self,
        mid: Vec<i32>,
        front: Vec<i32>,
        back: Vec<i32>,
        width: i32,
        height: i32,
    ) -> Result<(), String> {
        let cells = (width.max(0) * height.max(0)) as usize;
        for (name, layer) in [("back", &back), ("mid", &mid), ("front", &front)] {
            if layer.len() != cells {
                return Err(format!(
                    "Tile map load failed: {name} layer has {} cells, expected {cells}",
                    layer.len()
                ));
            }
        }
        self.width = width;
        self.height = height;
        self.back = back;
        self.mid = mid;
        self.front = front;
        Ok(())
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn tile_size(&self) -> i32 {
        self.tile_size
    }

    pub fn height_px(&self) -> i32 {
        self.height * self.tile_size
    }

    pub fn layer(&self, layer: Layer) -> &[i32] {
        match layer {
            Layer::Back => &self.back,
            Layer::Mid => &self.mid,
            Layer::Front => &self.front,
        }
    }

    pub fn tile(&self, layer: Layer, col: i32, row: i32) -> i32 {
        match self.index(col, row) {
            Some(i) => self.layer(layer)[i],
            None => tile::AIR,
        }
    }

    /// Out-of-bounds cells are never solid.
    pub fn is_solid(&self, col: i32, row: i32) -> bool {
        tile::is_solid(self.tile(Layer::Mid, col, row))
    }

    pub fn test_collision_left(&self, hitbox: &Aabb) -> bool {
        self.any_mid(hitbox, |code| code == tile::EXIT_LEFT)
    }

    pub fn test_collision_right(&self, hitbox: &Aabb) -> bool {
        self.any_mid(hitbox, |code| code == tile::EXIT_RIGHT)
    }

    pub fn test_collision_top(&self, hitbox: &Aabb) -> bool {
        self.any_mid(hitbox, |code| code == tile::EXIT_TOP)
    }

    pub fn test_collision_bottom(&self, hitbox: &Aabb) -> bool {
        self.any_mid(hitbox, |code| code == tile::EXIT_BOTTOM)
    }

    pub fn test_collision_win(&self, hitbox: &Aabb) -> bool {
        self.cells_under(hitbox).any(|i| self.mid[i] == tile::WIN || self.front[i] == tile::WIN)
    }

    pub fn test_collision_breakable_brick(&self, hitbox: &Aabb) -> bool {
        self.any_mid(hitbox, tile::is_breakable)
    }

    pub fn collides_solid(&self, hitbox: &Aabb) -> bool {
        self.any_mid(hitbox, tile::is_solid)
    }

    /// Standing check: something solid directly under the box.
    pub fn test_collision_ground(&self, hitbox: &Aabb) -> bool {
        self.collides_solid(&Aabb::new(hitbox.x, hitbox.bottom(), hitbox.w, 1))
    }

    /// Clear every breakable brick in the room. Returns how many went.
    pub fn turn_into_air(&mut self) -> usize {
        let mut cleared = 0;
        for code in self.mid.iter_mut().filter(|code| tile::is_breakable(**code)) {
            *code = tile::AIR;
            cleared += 1;
        }
        cleared
    }

    fn index(&self, col: i32, row: i32) -> Option<usize> {
        if col < 0 || col >= self.width || row < 0 || row >= self.height {
            return None;
        }
        Some((row * self.width + col) as usize)
    }

    fn any_mid(&self, hitbox: &Aabb, pred: impl Fn(i32) -> bool) -> bool {
        self.cells_under(hitbox).any(|i| pred(self.mid[i]))
    }

    /// Indices of in-bounds cells the box touches.
    fn cells_under(&self, hitbox: &Aabb) -> impl Iterator<Item = usize> + '_ {
        let empty = hitbox.is_empty();
        let ts = self.tile_size.max(1);
        let col0 = hitbox.x.div_euclid(ts).max(0);
        let col1 = (hitbox.right() - 1).div_euclid(ts).min(self.width - 1);
        let row0 = hitbox.y.div_euclid(ts).max(0);
        let row1 = (hitbox.bottom() - 1).div_euclid(ts).min(self.height - 1);
        let width = self.width;
        (row0..=row1)
            .flat_map(move |row| (col0..=col1).map(move |col| (row * width + col) as usize))
            .filter(move |_| !empty)
    }
}
