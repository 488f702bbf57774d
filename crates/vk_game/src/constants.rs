//! Screen geometry, room geometry and gameplay timings. All durations are in
//! fixed 60 Hz steps.

use glam::IVec2;

pub const TILE_SIZE: i32 = 16;
pub const LEVEL_WIDTH: i32 = 18;
pub const LEVEL_HEIGHT: i32 = 13;

pub const WINDOW_WIDTH: i32 = 256;
pub const WINDOW_HEIGHT: i32 = 240;
/// Room column 0 and column 17 sit just outside the screen.
pub const SIDE_MARGINS: i32 = -TILE_SIZE;
/// Room row 0 sits under the HUD strip.
pub const TOP_MARGIN: i32 = 30;
pub const HUD_HEIGHT: i32 = 46;

pub const LEVEL_CATALOG_PATH: &str = "assets/levels/castle.json";

// Re-entry points after a room transition. `None` axes keep the player's
// coordinate from before the load.
pub const LEFT_ENTRY_X: i32 = TILE_SIZE + 3;
pub const RIGHT_ENTRY_X: i32 = WINDOW_WIDTH - 3;
pub const TOP_ENTRY_Y: i32 = 48;
pub const BOTTOM_ENTRY_Y: i32 = 150;
pub const BOSS_ENTRY: IVec2 = IVec2::new(19, 170);

pub const PLAYER_START: IVec2 = IVec2::new(20, 144);
pub const PLAYER_RESPAWN: IVec2 = IVec2::new(20, 140);

pub const CHEST_REVEAL_FRAMES: i32 = 60;
pub const BUFF_DISPLAY_FRAMES: i32 = 60;

pub const ZOMBIE_SPAWN_FRAMES: i32 = 120;
pub const ZOMBIE_SPAWN: IVec2 = IVec2::new(236, 175);
pub const BAT_SPAWN_FRAMES: i32 = 240;
pub const BAT_SPAWN_X: i32 = 236;

pub const BOSS_SPAWN: IVec2 = IVec2::new(100, 100);
pub const BOSS_LOOT_FRAMES: i32 = 60;
pub const BOSS_LOOT_START_Y: i32 = 100;

pub const BOSS_DOOR_POS: IVec2 = IVec2::new(15 * TILE_SIZE + 8, 2 * TILE_SIZE + 48);
pub const BOSS_DOOR_WIDTH: i32 = 8;
pub const BOSS_DOOR_HEIGHT: i32 = 48;

pub const TRADER_POPUP_POS: IVec2 = IVec2::new(176, 120);
pub const TRADER_POPUP_SIZE: IVec2 = IVec2::new(128, 32);

// Game-level screens.
pub const TRANSITION_FRAMES: i32 = 30;
pub const INTRO_BACKGROUND_FRAMES: i32 = 120;
pub const MENU_PLAY_FRAMES: i32 = 120;
pub const INTRODUCTION_FRAMES: i32 = 360;
pub const GAME_OVER_FRAMES: i32 = 300;
pub const GAME_WIN_FRAMES: i32 = 1800;
