//! Level catalog: every room's three tile layers plus the starting object
//! placements, loaded from one JSON file.
//!
//! A room is keyed by `(level, floor)`. Rooms with a breakable wall ship a
//! second mid layer (`mid_broken`) that replaces the intact one once the wall
//! has been smashed, and a `wall_break` reward fired at that moment.

use glam::IVec2;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::constants::{LEVEL_HEIGHT, LEVEL_WIDTH};
use crate::object::{LootDrop, ObjectKind, PickupObject};
use crate::tilemap::tile;

const SUPPORTED_VERSION: &str = "0.1";

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomId {
    pub level: i32,
    pub floor: i32,
}

impl RoomId {
    pub const fn new(level: i32, floor: i32) -> Self {
        Self { level, floor }
    }
}

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.level, self.floor)
    }
}

/// Row-major rows of tile codes.
pub type TileGrid = Vec<Vec<i32>>;

#[derive(Debug, Deserialize, Clone)]
pub struct LevelCatalog {
    pub version: String,
    pub catalog_id: String,
    #[serde(default = "default_width")]
    pub width: i32,
    #[serde(default = "default_height")]
    pub height: i32,
    pub rooms: Vec<RoomLayers>,
    #[serde(default)]
    pub objects: Vec<ObjectPlacement>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RoomLayers {
    pub level: i32,
    pub floor: i32,
    pub back: TileGrid,
    pub mid: TileGrid,
    pub front: TileGrid,
    #[serde(default)]
    pub mid_broken: Option<TileGrid>,
    #[serde(default)]
    pub wall_break: Option<WallBreak>,
}

/// What appears when a room's breakable wall comes down.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WallBreak {
    Object { kind: ObjectKind, x: i32, y: i32 },
    /// The trader shows up once per run.
    Trader { x: i32, y: i32 },
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ObjectPlacement {
    pub kind: ObjectKind,
    pub level: i32,
    pub floor: i32,
    pub col: i32,
    pub row: i32,
    #[serde(default)]
    pub loot: Option<ObjectKind>,
    /// Pixels between the hazard and the floor its loot lands on.
    #[serde(default)]
    pub drop: i32,
}

impl ObjectPlacement {
    pub fn room(&self) -> RoomId {
        RoomId::new(self.level, self.floor)
    }
}

impl RoomLayers {
    pub fn id(&self) -> RoomId {
        RoomId::new(self.level, self.floor)
    }

    /// The collision layer, honouring the room's wall state.
    pub fn mid_layer(&self, wall_broken: bool) -> &TileGrid {
        match (&self.mid_broken, wall_broken) {
            (Some(broken), true) => broken,
            _ => &self.mid,
        }
    }

    pub fn has_breakable_wall(&self) -> bool {
        self.mid_broken.is_some()
    }
}

impl LevelCatalog {
    pub fn room(&self, id: RoomId) -> Option<&RoomLayers> {
        self.rooms.iter().find(|room| room.id() == id)
    }

    pub fn contains(&self, id: RoomId) -> bool {
        self.room(id).is_some()
    }

    /// Objects present at the start of a run.
    pub fn spawn_objects(&self) -> Vec<PickupObject> {
        self.objects
            .iter()
            .map(|placement| {
                let pos: IVec2 = PickupObject::cell_position(placement.col, placement.row);
                match placement.loot {
                    Some(kind) => PickupObject::hazard(
                        placement.kind,
                        pos,
                        placement.room(),
                        LootDrop {
                            kind,
                            drop: placement.drop,
                        },
                    ),
                    None => PickupObject::new(placement.kind, pos, placement.room()),
                }
            })
            .collect()
    }
}

pub struct LevelWatcher {
    catalog_path: PathBuf,
    last_seen_modified: Option<SystemTime>,
}

impl LevelWatcher {
    pub fn new(catalog_path: PathBuf) -> Self {
        let last_seen_modified = modified_time(&catalog_path);
        Self {
            catalog_path,
            last_seen_modified,
        }
    }

    pub fn path(&self) -> &Path {
        &self.catalog_path
    }

    pub fn should_reload(&mut self) -> bool {
        let current = modified_time(&self.catalog_path);
        match (self.last_seen_modified, current) {
            (Some(old), Some(now)) if now > old => {
                self.last_seen_modified = Some(now);
                true
            }
            (None, Some(now)) => {
                self.last_seen_modified = Some(now);
                true
            }
            _ => false,
        }
    }
}

pub fn load_catalog_from_path(catalog_path: &Path) -> Result<LevelCatalog, String> {
    let raw = fs::read_to_string(catalog_path)
        .map_err(|e| format!("Failed to read level catalog {}: {e}", catalog_path.display()))?;
    let catalog: LevelCatalog = serde_json::from_str(&raw).map_err(|e| {
        format!(
            "Failed to parse level catalog JSON {}: {e}",
            catalog_path.display()
        )
    })?;
    validate_catalog(&catalog)?;
    log::info!(
        "Loaded level catalog '{}': {} rooms, {} objects",
        catalog.catalog_id,
        catalog.rooms.len(),
        catalog.objects.len()
    );
    Ok(catalog)
}

fn validate_catalog(catalog: &LevelCatalog) -> Result<(), String> {
    if catalog.version != SUPPORTED_VERSION {
        return Err(format!(
            "Level validation failed: unsupported version '{}' (expected '{SUPPORTED_VERSION}')",
            catalog.version
        ));
    }
    if catalog.width != LEVEL_WIDTH || catalog.height != LEVEL_HEIGHT {
        return Err(format!(
            "Level validation failed: room size {}x{} must be {LEVEL_WIDTH}x{LEVEL_HEIGHT}",
            catalog.width, catalog.height
        ));
    }
    if catalog.rooms.is_empty() {
        return Err("Level validation failed: rooms array is empty".to_string());
    }

    let mut room_ids = HashSet::new();
    for room in &catalog.rooms {
        let id = room.id();
        if !room_ids.insert(id) {
            return Err(format!("Level validation failed: duplicate room {id}"));
        }
        if room.level < 1 || !(0..=1).contains(&room.floor) {
            return Err(format!(
                "Level validation failed: room {id} is outside levels >= 1 and floors 0..=1"
            ));
        }
        check_grid(catalog, id, "back", &room.back)?;
        check_grid(catalog, id, "mid", &room.mid)?;
        check_grid(catalog, id, "front", &room.front)?;
        if let Some(broken) = &room.mid_broken {
            check_grid(catalog, id, "mid_broken", broken)?;
        }
        if room.mid_broken.is_some() != room.wall_break.is_some() {
            return Err(format!(
                "Level validation failed: room {id} must declare 'mid_broken' and 'wall_break' together"
            ));
        }
    }

    if catalog.objects.is_empty() {
        log::warn!(
            "Level catalog '{}' places no objects. This is allowed but often accidental.",
            catalog.catalog_id
        );
    }
    for placement in &catalog.objects {
        let id = placement.room();
        if !room_ids.contains(&id) {
            return Err(format!(
                "Level validation failed: {:?} placed in unknown room {id}",
                placement.kind
            ));
        }
        if !(0..catalog.width).contains(&placement.col) || !(0..catalog.height).contains(&placement.row) {
            return Err(format!(
                "Level validation failed: {:?} in room {id} at ({}, {}) is outside the room",
                placement.kind, placement.col, placement.row
            ));
        }
        match (placement.kind.is_hazard(), placement.loot) {
            (true, None) => {
                return Err(format!(
                    "Level validation failed: {:?} in room {id} must declare 'loot'",
                    placement.kind
                ));
            }
            (true, Some(_)) if placement.drop <= 0 => {
                return Err(format!(
                    "Level validation failed: {:?} in room {id} needs a positive 'drop'",
                    placement.kind
                ));
            }
            (false, Some(_)) => {
                return Err(format!(
                    "Level validation failed: only fire and candles carry loot, not {:?} in room {id}",
                    placement.kind
                ));
            }
            _ => {}
        }
    }

    Ok(())
}

fn check_grid(catalog: &LevelCatalog, id: RoomId, layer: &str, grid: &TileGrid) -> Result<(), String> {
    if grid.len() != catalog.height as usize {
        return Err(format!(
            "Level validation failed: room {id} layer '{layer}' has {} rows, expected {}",
            grid.len(),
            catalog.height
        ));
    }
    for (row, cells) in grid.iter().enumerate() {
        if cells.len() != catalog.width as usize {
            return Err(format!(
                "Level validation failed: room {id} layer '{layer}' row {row} has {} cells, expected {}",
                cells.len(),
                catalog.width
            ));
        }
        if let Some(bad) = cells.iter().find(|&&code| code < tile::PLAYER_START) {
            return Err(format!(
                "Level validation failed: room {id} layer '{layer}' row {row} has unknown tile code {bad}"
            ));
        }
    }
    Ok(())
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).ok()?.modified().ok()
}

const fn default_width() -> i32 {
    LEVEL_WIDTH
}

const fn default_height() -> i32 {
    LEVEL_HEIGHT
}

/// Small hand-built catalogs for scene tests.
#[cfg(test)]
pub mod fixtures {
    use super::*;
    use crate::constants::{LEVEL_HEIGHT, LEVEL_WIDTH};

    pub const FLOOR_ROW: usize = 11;

    pub fn blank_grid() -> TileGrid {
        vec![vec![tile::AIR; LEVEL_WIDTH as usize]; LEVEL_HEIGHT as usize]
    }

    /// Room with a solid floor on row 11 and nothing else.
    pub fn floor_room(level: i32, floor: i32) -> RoomLayers {
        let mut mid = blank_grid();
        for cell in mid[FLOOR_ROW].iter_mut() {
            *cell = 1;
        }
        RoomLayers {
            level,
            floor,
            back: blank_grid(),
            mid,
            front: blank_grid(),
            mid_broken: None,
            wall_break: None,
        }
    }

    /// Paint a full column of the mid layer, above the floor.
    pub fn with_mid_column(mut room: RoomLayers, col: usize, code: i32) -> RoomLayers {
        for row in room.mid.iter_mut().take(FLOOR_ROW) {
            row[col] = code;
        }
        room
    }

    pub fn catalog(rooms: Vec<RoomLayers>, objects: Vec<ObjectPlacement>) -> LevelCatalog {
        LevelCatalog {
            version: SUPPORTED_VERSION.to_string(),
            catalog_id: "fixture".to_string(),
            width: LEVEL_WIDTH,
            height: LEVEL_HEIGHT,
            rooms,
            objects,
        }
    }

    pub fn placement(kind: ObjectKind, room: RoomId, col: i32, row: i32) -> ObjectPlacement {
        ObjectPlacement {
            kind,
            level: room.level,
            floor: room.floor,
            col,
            row,
            loot: None,
            drop: 0,
        }
    }

    pub fn hazard(kind: ObjectKind, room: RoomId, col: i32, row: i32, loot: ObjectKind, drop: i32) -> ObjectPlacement {
        ObjectPlacement {
            loot: Some(loot),
            drop,
            ..placement(kind, room, col, row)
        }
    }
}
