use glam::IVec2;
use serde::Deserialize;

use crate::constants::TILE_SIZE;
use crate::geometry::Aabb;
use crate::level::RoomId;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    // Hazards: only the whip reaches them, and they drop loot.
    Fire,
    Candle,
    // Direct pickups.
    Chain,
    Shield,
    Boots,
    Wings,
    HeartSmall,
    HeartBig,
    KeyChest,
    KeyDoor,
    BossBall,
    // Chests need the chest key.
    ChestChain,
    ChestShield,
    ChestBoots,
    ChestWings,
    ChestHeart,
}

impl ObjectKind {
    pub fn is_hazard(self) -> bool {
        matches!(self, Self::Fire | Self::Candle)
    }

    pub fn is_chest(self) -> bool {
        self.chest_loot().is_some()
    }

    /// What a chest turns into once opened.
    pub fn chest_loot(self) -> Option<ObjectKind> {
        match self {
            Self::ChestChain => Some(Self::Chain),
            Self::ChestShield => Some(Self::Shield),
            Self::ChestBoots => Some(Self::Boots),
            Self::ChestWings => Some(Self::Wings),
            Self::ChestHeart => Some(Self::HeartBig),
            _ => None,
        }
    }

    /// Physical size in pixels (width, height).
    pub fn size(self) -> (i32, i32) {
        match self {
            Self::Fire => (16, 32),
            Self::Candle => (8, 16),
            Self::HeartSmall => (8, 8),
            Self::KeyChest | Self::KeyDoor => (16, 8),
            Self::BossBall => (16, 16),
            _ if self.is_chest() => (16, 16),
            _ => (14, 14),
        }
    }

    pub fn color(self) -> [f32; 4] {
        match self {
            Self::Fire => [0.95, 0.45, 0.10, 1.0],
            Self::Candle => [0.95, 0.85, 0.40, 1.0],
            Self::Chain => [0.65, 0.65, 0.70, 1.0],
            Self::Shield => [0.35, 0.55, 0.90, 1.0],
            Self::Boots => [0.55, 0.35, 0.20, 1.0],
            Self::Wings => [0.90, 0.90, 1.00, 1.0],
            Self::HeartSmall | Self::HeartBig => [0.90, 0.15, 0.25, 1.0],
            Self::KeyChest => [0.85, 0.75, 0.20, 1.0],
            Self::KeyDoor => [0.75, 0.80, 0.85, 1.0],
            Self::BossBall => [0.85, 0.25, 0.85, 1.0],
            _ => [0.60, 0.40, 0.15, 1.0],
        }
    }
}

/// Loot a hazard releases when whipped, and how far it travels to the floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LootDrop {
    pub kind: ObjectKind,
    pub drop: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickupObject {
    pub kind: ObjectKind,
    /// Bottom-left pixel.
    pub pos: IVec2,
    pub room: RoomId,
    pub loot: Option<LootDrop>,
}

impl PickupObject {
    pub fn new(kind: ObjectKind, pos: IVec2, room: RoomId) -> Self {
        Self {
            kind,
            pos,
            room,
            loot: None,
        }
    }

    pub fn hazard(kind: ObjectKind, pos: IVec2, room: RoomId, loot: LootDrop) -> Self {
        Self {
            kind,
            pos,
            room,
            loot: Some(loot),
        }
    }

    /// Placement on a tile: the object sits on the cell's bottom row.
    pub fn cell_position(col: i32, row: i32) -> IVec2 {
        IVec2::new(col * TILE_SIZE, row * TILE_SIZE + TILE_SIZE - 1)
    }

    pub fn hitbox(&self) -> Aabb {
        let (w, h) = self.kind.size();
        Aabb::from_bottom_left(self.pos, w, h)
    }
}
