//! One run through the castle: the active room, everything in it, and the
//! rules that move the player between rooms.
//!
//! Per fixed step `update` runs, in order: debug keys, the room transition
//! check, the win tile, the two reveal machines, the spawn timers, the wall
//! break, the boss fight bookkeeping, HUD buffs, the boss door, music, then
//! enemies, the player and finally the pickup collisions. `render` only reads
//! state and composes a `Frame`.

use std::collections::HashSet;
use std::sync::Arc;

use glam::IVec2;
use vk_core::countdown::Countdown;
use vk_core::debug_mode::DebugMode;
use vk_core::input::{InputState, Key};
use vk_devtools::{OverlayStats, ScreenText};

use crate::audio::AudioPlayer;
use crate::constants::{
    BAT_SPAWN_FRAMES, BAT_SPAWN_X, BOSS_SPAWN, LEVEL_HEIGHT, LEVEL_WIDTH, PLAYER_RESPAWN,
    PLAYER_START, TILE_SIZE, TRADER_POPUP_POS, TRADER_POPUP_SIZE, WINDOW_HEIGHT, WINDOW_WIDTH,
    ZOMBIE_SPAWN, ZOMBIE_SPAWN_FRAMES,
};
use crate::door::BossDoor;
use crate::enemy::EnemyManager;
use crate::frame::{tile_color, with_alpha, DrawTag, Frame};
use crate::geometry::Aabb;
use crate::hud::{render_hud, Buff, HudBuffs, HudView};
use crate::level::{LevelCatalog, RoomId, TileGrid, WallBreak};
use crate::object::{ObjectKind, PickupObject};
use crate::player::{Player, PlayerIntent};
use crate::reveal::{BossLoot, ChestReveal, LootReveal, Reward};
use crate::tilemap::{tile, Layer, TileMap};
use crate::transition::{self, EdgeContacts};
use crate::weapon::WeaponKind;

pub const LEVEL_MUSIC: &str = "VampireKiller";
pub const BOSS_MUSIC: &str = "BossMusic";

const FIRST_ROOM: RoomId = RoomId::new(1, 0);
const CASTLE_HALL: RoomId = RoomId::new(4, 0);
const BOSS_ANTEROOM: RoomId = RoomId::new(7, 1);
const BOSS_ROOM: RoomId = RoomId::new(8, 1);
const BOSS_LEVEL: i32 = 8;
const ZOMBIE_ROOMS: [RoomId; 4] = [
    RoomId::new(4, 0),
    RoomId::new(5, 0),
    RoomId::new(5, 1),
    RoomId::new(6, 1),
];
const BAT_ROOM: RoomId = RoomId::new(4, 1);

const SCENE_MUSIC: &[(&str, &str)] = &[
    ("audio/Music/02 Vampire Killer.ogg", LEVEL_MUSIC),
    ("audio/Music/08 Poison Mind.ogg", BOSS_MUSIC),
];
const SCENE_SOUNDS: &[(&str, &str)] = &[
    ("audio/SFX/17.wav", "Collect"),
    ("audio/SFX/25.wav", "OpenChest"),
    ("audio/SFX/02.wav", "BreakWalls"),
    ("audio/SFX/03.wav", "EnterCastle"),
    ("audio/SFX/01.wav", "GetDoorKey"),
    ("audio/SFX/12.wav", "GetHeart"),
    ("audio/SFX/05.wav", "OpenDoor"),
    ("audio/SFX/08.wav", "Attack"),
];

/// Debug shortcuts that jump straight to a room.
const ROOM_KEYS: &[(Key, RoomId)] = &[
    (Key::Num1, RoomId::new(1, 0)),
    (Key::Num2, RoomId::new(2, 0)),
    (Key::Num3, RoomId::new(3, 0)),
    (Key::Num4, RoomId::new(4, 0)),
    (Key::Num5, RoomId::new(5, 0)),
    (Key::Num6, RoomId::new(6, 0)),
    (Key::Num7, RoomId::new(7, 0)),
    (Key::Num8, RoomId::new(4, 1)),
    (Key::Num9, RoomId::new(5, 1)),
    (Key::Num0, RoomId::new(6, 1)),
    (Key::O, RoomId::new(7, 1)),
    (Key::P, RoomId::new(8, 1)),
];

pub struct Scene {
    catalog: Arc<LevelCatalog>,
    /// Hot-reloaded catalog, swapped in at the next room load.
    pending_catalog: Option<Arc<LevelCatalog>>,
    map: TileMap,
    room: RoomId,
    player: Player,
    objects: Vec<PickupObject>,
    broken_walls: HashSet<RoomId>,
    trader_spawned: bool,
    popup_dismissed: bool,

    chest: ChestReveal,
    loot: LootReveal,
    boss_loot: BossLoot,
    boss_spawned: bool,
    zombie_timer: Countdown,
    bat_timer: Countdown,
    buffs: HudBuffs,
    door: BossDoor,

    audio: AudioPlayer,
    enemies: EnemyManager,
    debug: DebugMode,
    game_over: bool,
}

impl Scene {
    /// Build a fresh run: register the scene's audio, clear whatever the
    /// enemy manager kept from the last run, place every catalog object and
    /// load the first room.
    pub fn init(
        catalog: Arc<LevelCatalog>,
        mut audio: AudioPlayer,
        mut enemies: EnemyManager,
    ) -> Result<Self, String> {
        enemies.reset();
        for &(path, name) in SCENE_MUSIC {
            audio.create_music(path, name);
            audio.set_music_loop_status(name, true);
        }
        for &(path, name) in SCENE_SOUNDS {
            audio.create_sound(path, name);
        }

        let objects = catalog.spawn_objects();
        if objects.is_empty() {
            log::warn!("Level catalog '{}' places no objects", catalog.catalog_id);
        }

        let mut scene = Self {
            map: TileMap::new(LEVEL_WIDTH, LEVEL_HEIGHT, TILE_SIZE),
            catalog,
            pending_catalog: None,
            room: FIRST_ROOM,
            player: Player::new(PLAYER_START),
            objects,
            broken_walls: HashSet::new(),
            trader_spawned: false,
            popup_dismissed: false,
            chest: ChestReveal::default(),
            loot: LootReveal::default(),
            boss_loot: BossLoot::new(),
            boss_spawned: false,
            zombie_timer: Countdown::new(ZOMBIE_SPAWN_FRAMES),
            bat_timer: Countdown::new(BAT_SPAWN_FRAMES),
            buffs: HudBuffs::default(),
            door: BossDoor::new(),
            audio,
            enemies,
            debug: DebugMode::Off,
            game_over: false,
        };
        scene
            .load_level(FIRST_ROOM)
            .map_err(|e| format!("Scene init failed: {e}"))?;
        log::info!(
            "Scene ready: {} objects across {} rooms",
            scene.objects.len(),
            scene.catalog.rooms.len()
        );
        Ok(scene)
    }

    /// Replace the active room with `room` from the catalog. On error nothing
    /// about the current room changes.
    pub fn load_level(&mut self, room: RoomId) -> Result<(), String> {
        let catalog = self.pending_catalog.as_ref().unwrap_or(&self.catalog);
        let layers = catalog.room(room).ok_or_else(|| {
            format!(
                "Level load failed: room {room} is not in catalog '{}'",
                catalog.catalog_id
            )
        })?;

        let wall_broken = layers.has_breakable_wall() && self.broken_walls.contains(&room);
        let mut start = None;
        let back = flatten_layer(&layers.back, &mut start);
        let mid = flatten_layer(layers.mid_layer(wall_broken), &mut start);
        let front = flatten_layer(&layers.front, &mut start);
        self.map.load(mid, front, back, LEVEL_WIDTH, LEVEL_HEIGHT)?;

        if let Some(catalog) = self.pending_catalog.take() {
            log::info!("Level catalog '{}' now active", catalog.catalog_id);
            self.catalog = catalog;
        }
        if let Some(pos) = start {
            self.player.set_pos(pos);
        }
        self.room = room;
        self.enemies.destroy_enemies();
        if room == FIRST_ROOM && self.player.init_hud() {
            log::debug!("HUD initialised");
        }
        log::info!(
            "Loaded room {room}{}",
            if wall_broken { " (wall broken)" } else { "" }
        );
        Ok(())
    }

    pub fn update(&mut self, input: &InputState) {
        if self.game_over {
            return;
        }

        if input.is_just_pressed(Key::F2) {
            self.cycle_debug_mode();
        }
        if self.debug.is_enabled() {
            self.handle_debug_keys(input);
        }

        self.resolve_transition();

        if self.map.test_collision_win(&self.player.hitbox()) {
            self.win();
        }

        if let Some(reward) = self.chest.tick() {
            self.spawn_reward(reward);
        }
        if let Some(reward) = self.loot.tick() {
            self.spawn_reward(reward);
        }

        self.tick_spawn_timers();
        self.try_break_wall();

        if self.room.level == BOSS_LEVEL && self.enemies.is_boss_dead() {
            if let Some(reward) = self.boss_loot.tick() {
                log::info!("Boss dropped its orb at {:?}", reward.pos);
                self.spawn_reward(reward);
            }
        }
        if self.room.level == BOSS_LEVEL && !self.boss_spawned {
            self.enemies.spawn_boss(BOSS_SPAWN);
            self.boss_spawned = true;
        }

        self.buffs.tick();
        self.check_boss_door();
        self.select_music();

        self.door.update();
        self.enemies.update(&self.map, &mut self.player);
        if self.enemies.take_popup_dismissal() {
            self.popup_dismissed = true;
        }
        let intent = PlayerIntent {
            move_x: input.horizontal_axis(),
            jump_pressed: input.is_just_pressed(Key::Up),
            attack_pressed: input.is_just_pressed(Key::Space),
        };
        self.player.update(intent, &self.map);
        self.check_collisions();
        self.resolve_death();
    }

    /// Apply each pickup in the active room against the player and weapon.
    pub fn check_collisions(&mut self) {
        let body = self.player.hitbox();
        let lash = self.player.attack_hitbox();
        let mut i = 0;
        while i < self.objects.len() {
            let obj = self.objects[i].clone();
            if obj.room != self.room {
                i += 1;
                continue;
            }
            let consumed = if obj.kind.is_hazard() {
                match lash {
                    Some(lash) if lash.overlaps(&obj.hitbox()) => {
                        self.strike_hazard(&obj);
                        true
                    }
                    _ => false,
                }
            } else if body.overlaps(&obj.hitbox()) {
                self.collect(&obj)
            } else {
                false
            };
            if consumed {
                self.objects.remove(i);
            } else {
                i += 1;
            }
        }
    }

    pub fn render(&self) -> Frame {
        let mut frame = Frame::new();
        frame.screen_rect(0, 0, WINDOW_WIDTH, WINDOW_HEIGHT, [0.0, 0.0, 0.0, 1.0], DrawTag::Backdrop);

        if !self.player.is_dead() {
            self.render_layer(&mut frame, Layer::Back);
            self.render_layer(&mut frame, Layer::Mid);
            if self.debug.draws_sprites() {
                self.render_sprites(&mut frame);
            }
            if self.debug.draws_hitboxes() {
                self.render_hitboxes(&mut frame);
            }
            self.render_layer(&mut frame, Layer::Front);
        }

        if self.game_over {
            frame.world_rect(
                Aabb::new(TILE_SIZE, 0, WINDOW_WIDTH, WINDOW_HEIGHT),
                [0.05, 0.0, 0.0, 1.0],
                DrawTag::GameOver,
            );
            frame.text(ScreenText::new(92.0, 120.0, "GAME OVER").with_size(10.0));
        }

        if self.debug.is_enabled() {
            let label = if self.player.is_god_mode() {
                "GOD MODE : ON"
            } else {
                "GOD MODE : OFF"
            };
            frame.text(ScreenText::new(10.0, 50.0, label).with_color([0.78, 0.78, 0.78, 1.0]));
        }

        render_hud(&mut frame, &self.hud_view());
        frame
    }

    /// Drop everything the run owns. The scene is unusable afterwards.
    pub fn release(&mut self) {
        self.audio.stop_all_music();
        self.enemies.destroy_enemies();
        self.objects.clear();
        self.chest = ChestReveal::default();
        self.loot = LootReveal::default();
        log::info!("Scene released");
    }

    /// Out of lives and the death animation has finished.
    pub fn player_is_dead(&self) -> bool {
        self.player.lives() <= 0 && self.player.is_dead()
    }

    pub fn player_has_won(&self) -> bool {
        self.player.has_won()
    }

    /// Hand back the injected collaborators once the run is over.
    pub fn into_parts(self) -> (AudioPlayer, EnemyManager) {
        (self.audio, self.enemies)
    }

    pub fn set_pending_catalog(&mut self, catalog: Arc<LevelCatalog>) {
        log::info!(
            "Level catalog '{}' queued for the next room load",
            catalog.catalog_id
        );
        self.pending_catalog = Some(catalog);
    }

    pub fn cycle_debug_mode(&mut self) {
        self.debug = self.debug.next();
        log::info!("Debug view: {}", self.debug);
    }

    pub fn debug_mode(&self) -> DebugMode {
        self.debug
    }

    pub fn room(&self) -> RoomId {
        self.room
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn audio(&self) -> &AudioPlayer {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut AudioPlayer {
        &mut self.audio
    }

    pub fn enemies(&self) -> &EnemyManager {
        &self.enemies
    }

    #[cfg(test)]
    pub fn tile_map(&self) -> &TileMap {
        &self.map
    }

    pub fn objects(&self) -> &[PickupObject] {
        &self.objects
    }

    pub fn spawn_object(&mut self, obj: PickupObject) {
        log::debug!("{:?} placed at {:?} in {}", obj.kind, obj.pos, obj.room);
        self.objects.push(obj);
    }

    #[cfg(test)]
    pub fn chest_reveal(&self) -> &ChestReveal {
        &self.chest
    }

    #[cfg(test)]
    pub fn loot_reveal(&self) -> &LootReveal {
        &self.loot
    }

    pub fn door(&self) -> &BossDoor {
        &self.door
    }

    pub fn buffs(&self) -> &HudBuffs {
        &self.buffs
    }

    pub fn is_wall_broken(&self, room: RoomId) -> bool {
        self.broken_walls.contains(&room)
    }

    pub fn fill_stats(&self, stats: &mut OverlayStats) {
        let wall = if self.is_wall_broken(self.room) { " wall broken" } else { "" };
        stats.room_label = format!("{}{wall}", self.room);
        let pos = self.player.pos();
        stats.player_label = format!(
            "Player ({}, {}) {:?} life {} lives {}",
            pos.x,
            pos.y,
            self.player.state(),
            self.player.life(),
            self.player.lives()
        );
        stats.inventory_label = format!(
            "Hearts {}  {}  chest key {}  door key {}  shield {}",
            self.player.hearts(),
            self.player.weapon().kind().label(),
            self.player.has_chest_key(),
            self.player.has_door_key(),
            self.player.has_shield()
        );
        stats.reveal_label = format!(
            "chest {}  loot {}",
            if self.chest.is_active() { "opening" } else { "idle" },
            match self.loot.countdown() {
                Some(n) => format!("falling ({n})"),
                None => "idle".to_string(),
            }
        );
        stats.object_count = self.objects.iter().filter(|o| o.room == self.room).count() as u32;
        stats.enemy_count = self.enemies.len() as u32;
        stats.debug_mode_label = self.debug.label().to_string();
        stats.god_mode = self.player.is_god_mode();
    }

    fn handle_debug_keys(&mut self, input: &InputState) {
        if let Some(&(key, room)) = ROOM_KEYS.iter().find(|(key, _)| input.is_just_pressed(*key)) {
            // Outdoor floors sit one tile higher.
            if matches!(key, Key::Num1 | Key::Num2 | Key::Num3) {
                let pos = self.player.pos();
                self.player.set_pos(IVec2::new(pos.x, pos.y - TILE_SIZE));
            }
            if let Err(err) = self.load_level(room) {
                log::error!("{err}");
            }
            return;
        }

        let at = self.player.pos();
        if input.is_just_pressed(Key::C) {
            self.player.weapon_mut().set_kind(WeaponKind::Chain);
        } else if input.is_just_pressed(Key::F3) {
            self.win();
        } else if input.is_just_pressed(Key::F1) {
            self.player.toggle_god_mode();
        } else if input.is_just_pressed(Key::F4) {
            if !self.player.is_god_mode() {
                self.player.start_dying();
            }
        } else if input.is_just_pressed(Key::F5) {
            self.player.decr_life(8);
        } else if input.is_just_pressed(Key::F6) {
            self.player.incr_hearts(99);
        } else if input.is_just_pressed(Key::G) {
            self.enemies.spawn_zombie(at);
        } else if input.is_just_pressed(Key::H) {
            self.enemies.spawn_bat(at);
        } else if input.is_just_pressed(Key::J) {
            self.enemies.spawn_boss(at);
        } else if input.is_just_pressed(Key::K) {
            self.enemies.spawn_trader(at);
        } else if input.is_just_pressed(Key::L) {
            self.spawn_object(PickupObject::new(ObjectKind::Shield, at, self.room));
        }
    }

    fn resolve_transition(&mut self) {
        let Some(edge) = EdgeContacts::probe(&self.map, &self.player.hitbox()).first() else {
            return;
        };
        let route = transition::resolve(self.room, edge);
        let before = self.player.pos();
        match self.load_level(route.target) {
            Ok(()) => {
                self.player.set_pos(route.entry.position(before));
                if let Some(cue) = route.cue {
                    self.audio.play_sound_by_name(cue);
                }
            }
            Err(err) => log::error!("Room transition {edge:?} from {}: {err}", self.room),
        }
    }

    fn win(&mut self) {
        self.audio.stop_music_by_name(LEVEL_MUSIC);
        self.audio.stop_music_by_name(BOSS_MUSIC);
        self.player.win();
    }

    fn spawn_reward(&mut self, reward: Reward) {
        self.spawn_object(PickupObject::new(reward.kind, reward.pos, self.room));
    }

    fn tick_spawn_timers(&mut self) {
        self.zombie_timer.tick();
        if self.zombie_timer.is_negative() && ZOMBIE_ROOMS.contains(&self.room) {
            self.enemies.spawn_zombie(ZOMBIE_SPAWN);
            self.zombie_timer.rearm();
        }

        self.bat_timer.tick();
        if self.bat_timer.is_negative() && self.room == BAT_ROOM {
            self.enemies
                .spawn_bat(IVec2::new(BAT_SPAWN_X, self.player.pos().y));
            self.bat_timer.rearm();
        }
    }

    fn try_break_wall(&mut self) {
        let Some(lash) = self.player.attack_hitbox() else {
            return;
        };
        if self.broken_walls.contains(&self.room) {
            return;
        }
        let Some(reward) = self.catalog.room(self.room).and_then(|r| r.wall_break) else {
            return;
        };
        if !self.map.test_collision_breakable_brick(&lash) {
            return;
        }

        let cleared = self.map.turn_into_air();
        self.broken_walls.insert(self.room);
        self.audio.play_sound_by_name("BreakWalls");
        log::info!("Wall broken in {} ({cleared} bricks)", self.room);

        match reward {
            WallBreak::Object { kind, x, y } => {
                self.spawn_object(PickupObject::new(kind, IVec2::new(x, y), self.room));
            }
            WallBreak::Trader { x, y } => {
                if !self.trader_spawned {
                    self.enemies.spawn_trader(IVec2::new(x, y));
                    self.trader_spawned = true;
                }
            }
        }
    }

    fn check_boss_door(&mut self) {
        if self.room != BOSS_ANTEROOM || self.door.is_open() {
            return;
        }
        if !self.player.hitbox().overlaps(&self.door.hitbox()) {
            return;
        }
        if self.player.has_door_key() {
            if self.door.open() {
                self.audio.play_sound_by_name("OpenDoor");
            }
        } else {
            self.player.nudge_x(-1);
        }
    }

    fn select_music(&mut self) {
        if self.player.has_won() {
            return;
        }
        let (wanted, other) = if self.room == BOSS_ROOM {
            (BOSS_MUSIC, LEVEL_MUSIC)
        } else {
            (LEVEL_MUSIC, BOSS_MUSIC)
        };
        if self.audio.is_music_playing(other) {
            self.audio.stop_music_by_name(other);
        }
        self.audio.play_music_by_name(wanted);
    }

    fn strike_hazard(&mut self, hazard: &PickupObject) {
        self.audio.play_sound_by_name("Attack");
        match hazard.loot {
            Some(loot) => self.loot.trigger(loot.kind, hazard.pos, loot.drop),
            None => log::warn!("{:?} at {:?} had no loot", hazard.kind, hazard.pos),
        }
    }

    /// Returns whether the object is used up.
    fn collect(&mut self, obj: &PickupObject) -> bool {
        match obj.kind {
            ObjectKind::Chain => {
                self.audio.play_sound_by_name("Collect");
                self.player.weapon_mut().set_kind(WeaponKind::Chain);
            }
            ObjectKind::BossBall => {
                self.audio.play_sound_by_name("Collect");
                self.win();
            }
            ObjectKind::HeartBig => {
                self.audio.play_sound_by_name("GetHeart");
                self.player.incr_hearts(5);
                self.buffs.set(Buff::Heart);
            }
            ObjectKind::HeartSmall => {
                self.audio.play_sound_by_name("GetHeart");
                self.player.incr_hearts(1);
            }
            ObjectKind::Boots => {
                self.audio.play_sound_by_name("Collect");
                self.buffs.set(Buff::Boots);
            }
            ObjectKind::Wings => {
                self.audio.play_sound_by_name("Collect");
                self.buffs.set(Buff::Wings);
            }
            ObjectKind::Shield => {
                self.audio.play_sound_by_name("Collect");
                if !self.player.has_shield() {
                    self.player.set_shield(true);
                }
                self.buffs.set(Buff::Shield);
            }
            ObjectKind::KeyChest => {
                if self.player.has_chest_key() {
                    return false;
                }
                self.audio.play_sound_by_name("Collect");
                self.player.set_chest_key(true);
            }
            ObjectKind::KeyDoor => {
                if self.player.has_door_key() {
                    return false;
                }
                self.audio.play_sound_by_name("GetDoorKey");
                self.player.set_door_key(true);
            }
            ObjectKind::ChestChain
            | ObjectKind::ChestShield
            | ObjectKind::ChestBoots
            | ObjectKind::ChestWings
            | ObjectKind::ChestHeart => {
                if !self.player.has_chest_key() {
                    return false;
                }
                self.player.set_chest_key(false);
                self.audio.play_sound_by_name("OpenChest");
                self.chest.trigger(obj.kind, obj.pos);
            }
            ObjectKind::Fire | ObjectKind::Candle => {}
        }
        true
    }

    fn resolve_death(&mut self) {
        if self.player.life() == 0 && !self.player.is_god_mode() {
            self.player.start_dying();
        }
        if !self.player.is_dead() {
            return;
        }

        self.audio.stop_music_by_name(LEVEL_MUSIC);
        self.audio.stop_music_by_name(BOSS_MUSIC);
        if self.player.lives() <= 0 {
            log::info!("Game over in {}", self.room);
            self.game_over = true;
            return;
        }

        self.player.respawn(PLAYER_RESPAWN);
        self.boss_spawned = false;
        let restart = if self.room.level > 3 { CASTLE_HALL } else { FIRST_ROOM };
        if let Err(err) = self.load_level(restart) {
            log::error!("Respawn failed: {err}");
        }
    }

    fn hud_view(&self) -> HudView {
        HudView {
            score: self.player.score(),
            level: self.room.level,
            hearts: self.player.hearts(),
            lives: self.player.lives(),
            life: self.player.life(),
            boss_life: (self.room.level == BOSS_LEVEL).then(|| self.enemies.boss_life()),
            has_chest_key: self.player.has_chest_key(),
            has_door_key: self.player.has_door_key(),
            has_chain: self.player.weapon().kind() == WeaponKind::Chain,
            has_shield: self.player.has_shield(),
            buff: self.buffs.shown(),
        }
    }

    fn render_layer(&self, frame: &mut Frame, layer: Layer) {
        let markers = self.debug.draws_hitboxes();
        for row in 0..self.map.height() {
            for col in 0..self.map.width() {
                let code = self.map.tile(layer, col, row);
                if code == tile::AIR {
                    continue;
                }
                let cell = Aabb::new(col * TILE_SIZE, row * TILE_SIZE, TILE_SIZE, TILE_SIZE);
                if tile::is_marker(code) {
                    if markers {
                        frame.world_outline(cell, [0.3, 0.3, 1.0, 0.6]);
                    }
                    continue;
                }
                frame.world_rect(cell, tile_color(code, layer), DrawTag::Tile(layer));
            }
        }
    }

    fn render_sprites(&self, frame: &mut Frame) {
        for obj in self.objects.iter().filter(|o| o.room == self.room) {
            frame.world_rect(obj.hitbox(), obj.kind.color(), DrawTag::Object(obj.kind));
        }
        self.enemies.render(frame);

        if let ChestReveal::Opening { pos, .. } = self.chest {
            let lid = self.chest.anim_frame().unwrap_or(0) as f32;
            let color = [0.60 + lid * 0.1, 0.40 + lid * 0.1, 0.15, 1.0];
            frame.world_rect(Aabb::from_bottom_left(pos, TILE_SIZE, TILE_SIZE), color, DrawTag::ChestReveal);
        }

        if self.room == BOSS_ANTEROOM {
            self.door.render(frame);
        }

        if let Some(falling) = self.loot.current() {
            let (w, h) = falling.kind.size();
            frame.world_rect(
                Aabb::from_bottom_left(falling.pos, w, h),
                falling.kind.color(),
                DrawTag::LootReveal,
            );
        }

        if self.room.level == BOSS_LEVEL && self.enemies.is_boss_dead() && self.boss_loot.is_falling() {
            let countdown = self.boss_loot.countdown();
            if countdown > 0 {
                let base = ObjectKind::BossBall.color();
                let color = if countdown % 30 > 15 { base } else { with_alpha(base, 0.5) };
                frame.world_rect(
                    Aabb::from_bottom_left(self.boss_loot.current_pos(), TILE_SIZE, TILE_SIZE),
                    color,
                    DrawTag::BossLoot,
                );
            }
        }

        if self.enemies.trader_popup() && !self.popup_dismissed {
            frame.world_rect(
                Aabb::new(TRADER_POPUP_POS.x, TRADER_POPUP_POS.y, TRADER_POPUP_SIZE.x, TRADER_POPUP_SIZE.y),
                [0.1, 0.1, 0.2, 0.9],
                DrawTag::TraderPopup,
            );
        }

        let delay = self.player.damaged_delay();
        if delay == 0 || delay % 12 < 6 {
            let color = if self.player.is_dying() {
                [0.5, 0.2, 0.2, 1.0]
            } else {
                [0.80, 0.55, 0.35, 1.0]
            };
            frame.world_rect(self.player.hitbox(), color, DrawTag::Player);
        }
        if let Some(lash) = self.player.weapon().drawn_box(&self.player.hitbox(), self.player.look()) {
            frame.world_rect(lash, [0.85, 0.85, 0.80, 1.0], DrawTag::Weapon);
        }
    }

    fn render_hitboxes(&self, frame: &mut Frame) {
        if self.room == BOSS_ANTEROOM {
            frame.world_outline(self.door.hitbox(), [0.6, 0.2, 0.8, 1.0]);
        }
        for obj in self.objects.iter().filter(|o| o.room == self.room) {
            frame.world_outline(obj.hitbox(), [1.0, 1.0, 0.0, 1.0]);
        }
        self.enemies.render_debug(frame);
        frame.world_outline(self.player.hitbox(), [0.0, 1.0, 0.0, 1.0]);
        if let Some(lash) = self.player.attack_hitbox() {
            frame.world_outline(lash, [1.0, 0.0, 0.0, 1.0]);
        }
    }
}

/// Flatten one layer row-major, clearing sentinels. A player start marker
/// overwrites `start`, so the last one scanned wins.
fn flatten_layer(grid: &TileGrid, start: &mut Option<IVec2>) -> Vec<i32> {
    let mut cells = Vec::with_capacity((LEVEL_WIDTH * LEVEL_HEIGHT) as usize);
    for (row, line) in grid.iter().enumerate() {
        for (col, &code) in line.iter().enumerate() {
            cells.push(match code {
                tile::EMPTY => tile::AIR,
                tile::PLAYER_START => {
                    *start = Some(PickupObject::cell_position(col as i32, row as i32));
                    tile::AIR
                }
                _ => code,
            });
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{BOSS_LOOT_FRAMES, BOSS_LOOT_START_Y, BUFF_DISPLAY_FRAMES};
    use crate::enemy::{EnemyKind, BOSS_MAX_LIFE};
    use crate::level::fixtures::*;
    use crate::level::RoomLayers;
    use crate::player::MAX_LIFE;

    fn scene_with(rooms: Vec<RoomLayers>, objects: Vec<crate::level::ObjectPlacement>) -> Scene {
        let mut all = rooms;
        if !all.iter().any(|r| r.id() == FIRST_ROOM) {
            all.push(floor_room(1, 0));
        }
        Scene::init(Arc::new(catalog(all, objects)), AudioPlayer::new(), EnemyManager::new())
            .expect("fixture scene should init")
    }

    fn step(scene: &mut Scene, input: &mut InputState) {
        scene.update(input);
        input.end_frame();
    }

    fn idle(scene: &mut Scene, steps: usize) {
        let mut input = InputState::new();
        for _ in 0..steps {
            step(scene, &mut input);
        }
    }

    /// Tap attack and step until the swing reaches its hurting frame.
    fn swing(scene: &mut Scene) {
        let mut input = InputState::new();
        input.tap(Key::Space);
        step(scene, &mut input);
        for _ in 0..30 {
            if scene.player().attack_hitbox().is_some() {
                return;
            }
            step(scene, &mut input);
        }
        panic!("swing never reached its active frame");
    }

    fn count_kind(scene: &Scene, kind: ObjectKind) -> usize {
        scene.objects().iter().filter(|o| o.kind == kind).count()
    }

    #[test]
    fn init_starts_in_first_room_with_music() {
        let mut scene = scene_with(vec![], vec![]);
        assert_eq!(scene.room(), FIRST_ROOM);
        assert_eq!(scene.player().pos(), PLAYER_START);
        idle(&mut scene, 1);
        assert!(scene.audio().is_music_playing(LEVEL_MUSIC));
        assert!(scene.audio().is_music_looping(BOSS_MUSIC));
    }

    #[test]
    fn init_fails_without_first_room() {
        let only_hall = catalog(vec![floor_room(4, 0)], vec![]);
        let err = Scene::init(Arc::new(only_hall), AudioPlayer::new(), EnemyManager::new())
            .err()
            .expect("missing first room must fail");
        assert!(err.contains("(1,0)"));
    }

    #[test]
    fn unsupported_room_leaves_state_untouched() {
        let mut scene = scene_with(vec![], vec![]);
        scene.player_mut().set_pos(IVec2::new(50, 175));
        scene.enemies.spawn_zombie(IVec2::new(200, 175));
        let tiles_before = scene.tile_map().layer(Layer::Mid).to_vec();

        let err = scene.load_level(RoomId::new(9, 0)).expect_err("room 9 does not exist");
        assert!(err.contains("(9,0)"));
        assert_eq!(scene.room(), FIRST_ROOM);
        assert_eq!(scene.player().pos(), IVec2::new(50, 175));
        assert_eq!(scene.enemies().len(), 1);
        assert_eq!(scene.tile_map().layer(Layer::Mid), tiles_before.as_slice());
    }

    #[test]
    fn sentinels_are_cleared_and_front_start_wins() {
        let mut room = floor_room(2, 0);
        room.back[1][1] = tile::PLAYER_START;
        room.mid[4][6] = tile::EMPTY;
        room.front[5][3] = tile::PLAYER_START;
        let mut scene = scene_with(vec![room], vec![]);

        scene.load_level(RoomId::new(2, 0)).expect("room 2 loads");
        assert_eq!(scene.player().pos(), IVec2::new(3 * 16, 5 * 16 + 15));
        let map = scene.tile_map();
        assert_eq!(map.tile(Layer::Back, 1, 1), tile::AIR);
        assert_eq!(map.tile(Layer::Mid, 6, 4), tile::AIR);
        assert_eq!(map.tile(Layer::Front, 3, 5), tile::AIR);
        assert!(map.layer(Layer::Mid).iter().all(|&c| c >= 0));
    }

    #[test]
    fn right_edge_moves_to_next_level_at_left_margin() {
        let first = with_mid_column(floor_room(1, 0), 17, tile::EXIT_RIGHT);
        let mut scene = scene_with(vec![first, floor_room(2, 0)], vec![]);
        scene.player_mut().set_pos(IVec2::new(265, 175));
        idle(&mut scene, 1);
        assert_eq!(scene.room(), RoomId::new(2, 0));
        assert_eq!(scene.player().pos(), IVec2::new(19, 175));
    }

    #[test]
    fn castle_gate_plays_entry_cue() {
        let gate = with_mid_column(floor_room(3, 0), 17, tile::EXIT_RIGHT);
        let mut scene = scene_with(vec![gate, floor_room(4, 0)], vec![]);
        scene.load_level(RoomId::new(3, 0)).expect("gate loads");
        scene.player_mut().set_pos(IVec2::new(265, 175));
        idle(&mut scene, 1);
        assert_eq!(scene.room(), CASTLE_HALL);
        assert_eq!(scene.audio().sound_count("EnterCastle"), 1);
    }

    #[test]
    fn failed_transition_keeps_the_room() {
        let dead_end = with_mid_column(floor_room(2, 0), 17, tile::EXIT_RIGHT);
        let mut scene = scene_with(vec![dead_end], vec![]);
        scene.load_level(RoomId::new(2, 0)).expect("room 2 loads");
        scene.player_mut().set_pos(IVec2::new(265, 175));
        idle(&mut scene, 1);
        assert_eq!(scene.room(), RoomId::new(2, 0));
    }

    #[test]
    fn win_tile_in_front_layer_ends_the_run() {
        let mut room = floor_room(2, 0);
        room.front[10][10] = tile::WIN;
        let mut scene = scene_with(vec![room], vec![]);
        scene.load_level(RoomId::new(2, 0)).expect("room 2 loads");
        idle(&mut scene, 1);
        scene.player_mut().set_pos(IVec2::new(160, 175));
        idle(&mut scene, 1);
        assert!(scene.player_has_won());
        assert!(scene.audio().playing_music().is_empty());
    }

    #[test]
    fn candle_hit_drops_loot_after_the_drop_distance() {
        let candle = hazard(ObjectKind::Candle, FIRST_ROOM, 8, 9, ObjectKind::HeartSmall, 32);
        let mut scene = scene_with(vec![], vec![candle]);
        scene.player_mut().set_pos(IVec2::new(110, 175));
        swing(&mut scene);

        assert_eq!(count_kind(&scene, ObjectKind::Candle), 0);
        assert_eq!(scene.loot_reveal().countdown(), Some(32));
        assert_eq!(scene.audio().sound_count("Attack"), 1);

        idle(&mut scene, 32);
        assert_eq!(count_kind(&scene, ObjectKind::HeartSmall), 0);
        idle(&mut scene, 1);
        let heart = scene
            .objects()
            .iter()
            .find(|o| o.kind == ObjectKind::HeartSmall)
            .expect("heart should have landed");
        assert_eq!(heart.pos, IVec2::new(128, 9 * 16 + 15 + 33));
        assert!(!scene.loot_reveal().is_active());
    }

    #[test]
    fn objects_in_other_rooms_are_ignored() {
        let far = placement(ObjectKind::HeartBig, RoomId::new(2, 0), 7, 10);
        let mut scene = scene_with(vec![floor_room(2, 0)], vec![far]);
        scene.player_mut().set_pos(IVec2::new(112, 175));
        idle(&mut scene, 3);
        assert_eq!(count_kind(&scene, ObjectKind::HeartBig), 1);
        assert_eq!(scene.player().hearts(), crate::player::START_HEARTS);
    }

    #[test]
    fn pickups_apply_their_effects() {
        let objects = vec![
            placement(ObjectKind::HeartBig, FIRST_ROOM, 7, 10),
            placement(ObjectKind::Shield, FIRST_ROOM, 7, 10),
            placement(ObjectKind::Chain, FIRST_ROOM, 7, 10),
        ];
        let mut scene = scene_with(vec![], objects);
        scene.player_mut().set_pos(IVec2::new(112, 175));
        idle(&mut scene, 1);

        assert!(scene.objects().is_empty());
        assert_eq!(scene.player().hearts(), crate::player::START_HEARTS + 5);
        assert!(scene.player().has_shield());
        assert_eq!(scene.player().weapon().kind(), WeaponKind::Chain);
        assert_eq!(scene.buffs().shown(), Some(Buff::Shield));
        assert_eq!(scene.audio().sound_count("Collect"), 2);
        assert_eq!(scene.audio().sound_count("GetHeart"), 1);
    }

    #[test]
    fn boots_wings_and_small_hearts_set_their_flags() {
        let objects = vec![
            placement(ObjectKind::Boots, FIRST_ROOM, 7, 10),
            placement(ObjectKind::Wings, FIRST_ROOM, 7, 10),
            placement(ObjectKind::HeartSmall, FIRST_ROOM, 7, 10),
        ];
        let mut scene = scene_with(vec![], objects);
        scene.player_mut().set_pos(IVec2::new(112, 175));
        idle(&mut scene, 1);

        assert!(scene.objects().is_empty());
        assert_eq!(scene.player().hearts(), crate::player::START_HEARTS + 1);
        assert!(scene.buffs().is_active(Buff::Boots));
        assert!(scene.buffs().is_active(Buff::Wings));
        assert!(!scene.buffs().is_active(Buff::Heart));
        assert!(!scene.player().has_shield());
        assert_eq!(scene.buffs().shown(), Some(Buff::Boots));
        assert_eq!(scene.audio().sound_count("Collect"), 2);
        assert_eq!(scene.audio().sound_count("GetHeart"), 1);

        idle(&mut scene, BUFF_DISPLAY_FRAMES as usize - 1);
        assert!(scene.buffs().is_active(Buff::Boots));
        idle(&mut scene, 1);
        assert_eq!(scene.buffs().shown(), None);
    }

    #[test]
    fn held_keys_are_not_picked_up_again() {
        let objects = vec![
            placement(ObjectKind::KeyChest, FIRST_ROOM, 7, 10),
            placement(ObjectKind::KeyDoor, FIRST_ROOM, 7, 10),
        ];
        let mut scene = scene_with(vec![], objects);
        scene.player_mut().set_chest_key(true);
        scene.player_mut().set_door_key(true);
        scene.player_mut().set_pos(IVec2::new(112, 175));
        idle(&mut scene, 2);
        assert_eq!(scene.objects().len(), 2);
        assert_eq!(scene.audio().sound_count("Collect"), 0);
        assert_eq!(scene.audio().sound_count("GetDoorKey"), 0);
    }

    #[test]
    fn chest_without_key_stays_closed() {
        let chest = placement(ObjectKind::ChestHeart, FIRST_ROOM, 7, 10);
        let mut scene = scene_with(vec![], vec![chest]);
        scene.player_mut().set_pos(IVec2::new(112, 175));
        idle(&mut scene, 2);
        assert_eq!(count_kind(&scene, ObjectKind::ChestHeart), 1);
        assert!(!scene.chest_reveal().is_active());
    }

    #[test]
    fn chest_with_key_opens_into_its_loot() {
        let chest = placement(ObjectKind::ChestWings, FIRST_ROOM, 7, 10);
        let mut scene = scene_with(vec![], vec![chest]);
        scene.player_mut().set_chest_key(true);
        scene.player_mut().set_pos(IVec2::new(112, 175));
        idle(&mut scene, 1);
        assert!(scene.chest_reveal().is_active());
        assert!(!scene.player().has_chest_key());
        assert_eq!(scene.audio().sound_count("OpenChest"), 1);

        // Step away so the wings are not collected the moment they appear.
        scene.player_mut().set_pos(IVec2::new(40, 175));
        idle(&mut scene, 60);
        assert_eq!(count_kind(&scene, ObjectKind::Wings), 1);
        assert!(!scene.chest_reveal().is_active());
    }

    fn breakable_room() -> RoomLayers {
        let mut room = with_mid_column(floor_room(6, 0), 9, tile::BRICK_A);
        room.mid_broken = Some(floor_room(6, 0).mid);
        room.wall_break = Some(WallBreak::Object {
            kind: ObjectKind::KeyDoor,
            x: 144,
            y: 160,
        });
        room
    }

    #[test]
    fn wall_breaks_once_and_drops_the_key_once() {
        let mut scene = scene_with(vec![breakable_room()], vec![]);
        let room = RoomId::new(6, 0);
        scene.load_level(room).expect("room 6 loads");
        scene.player_mut().set_pos(IVec2::new(125, 175));

        swing(&mut scene);
        // The wall check runs before the player moves, so it sees the lash a step later.
        idle(&mut scene, 1);
        assert!(scene.is_wall_broken(room));
        assert_eq!(count_kind(&scene, ObjectKind::KeyDoor), 1);
        assert_eq!(scene.audio().sound_count("BreakWalls"), 1);
        assert!(!scene.tile_map().is_solid(9, 5));

        idle(&mut scene, 20);
        swing(&mut scene);
        assert_eq!(count_kind(&scene, ObjectKind::KeyDoor), 1);
        assert_eq!(scene.audio().sound_count("BreakWalls"), 1);

        scene.load_level(room).expect("room 6 reloads");
        assert_eq!(scene.tile_map().tile(Layer::Mid, 9, 5), tile::AIR);
    }

    #[test]
    fn trader_wall_spawns_the_trader_once() {
        let mut room = with_mid_column(floor_room(7, 1), 9, tile::BRICK_B);
        room.mid_broken = Some(floor_room(7, 1).mid);
        room.wall_break = Some(WallBreak::Trader { x: 205, y: 175 });
        let mut scene = scene_with(vec![room], vec![]);
        scene.load_level(BOSS_ANTEROOM).expect("anteroom loads");
        scene.player_mut().set_pos(IVec2::new(125, 175));
        swing(&mut scene);
        idle(&mut scene, 1);
        assert!(scene.enemies().has_trader());
    }

    #[test]
    fn door_opens_once_with_key() {
        let mut scene = scene_with(vec![floor_room(7, 1)], vec![]);
        scene.load_level(BOSS_ANTEROOM).expect("anteroom loads");
        scene.player_mut().set_door_key(true);
        for _ in 0..5 {
            scene.player_mut().set_pos(IVec2::new(244, 80));
            idle(&mut scene, 1);
        }
        assert!(scene.door().is_open());
        assert_eq!(scene.audio().sound_count("OpenDoor"), 1);
    }

    #[test]
    fn door_pushes_back_without_key() {
        let mut scene = scene_with(vec![floor_room(7, 1)], vec![]);
        scene.load_level(BOSS_ANTEROOM).expect("anteroom loads");
        scene.player_mut().set_pos(IVec2::new(244, 80));
        idle(&mut scene, 1);
        assert!(!scene.door().is_open());
        assert_eq!(scene.player().pos().x, 243);
    }

    #[test]
    fn zombies_spawn_only_in_their_rooms() {
        let mut scene = scene_with(vec![floor_room(4, 0)], vec![]);
        scene.player_mut().set_pos(IVec2::new(40, 175));
        idle(&mut scene, ZOMBIE_SPAWN_FRAMES as usize + 5);
        assert_eq!(scene.enemies().count(EnemyKind::Zombie), 0);

        // The expired timer fires as soon as a spawning room is entered.
        scene.load_level(CASTLE_HALL).expect("hall loads");
        scene.player_mut().set_pos(IVec2::new(40, 175));
        idle(&mut scene, 1);
        assert_eq!(scene.enemies().count(EnemyKind::Zombie), 1);
    }

    #[test]
    fn bats_spawn_at_player_height_in_their_room() {
        let mut scene = scene_with(vec![floor_room(4, 1)], vec![]);
        scene.load_level(BAT_ROOM).expect("bat room loads");
        scene.player_mut().set_pos(IVec2::new(40, 175));
        idle(&mut scene, BAT_SPAWN_FRAMES as usize);
        assert_eq!(scene.enemies().count(EnemyKind::Bat), 0);

        idle(&mut scene, 1);
        let y = scene.player().pos().y;
        // Spawned at x 236, then one step of flight to the left.
        assert_eq!(scene.enemies().positions(EnemyKind::Bat), vec![IVec2::new(BAT_SPAWN_X - 1, y)]);
        assert_eq!(scene.enemies().count(EnemyKind::Zombie), 0);
        assert_eq!(scene.bat_timer.remaining(), BAT_SPAWN_FRAMES);
    }

    #[test]
    fn bats_stay_away_from_other_rooms() {
        let mut scene = scene_with(vec![], vec![]);
        scene.player_mut().set_pos(IVec2::new(40, 175));
        idle(&mut scene, BAT_SPAWN_FRAMES as usize + 5);
        assert_eq!(scene.enemies().count(EnemyKind::Bat), 0);
    }

    #[test]
    fn dead_boss_drops_the_orb_and_collecting_it_wins() {
        let mut scene = scene_with(vec![floor_room(8, 1)], vec![]);
        scene.load_level(BOSS_ROOM).expect("boss room loads");
        scene.player_mut().set_pos(IVec2::new(19, 175));
        idle(&mut scene, 1);
        assert_eq!(scene.enemies().count(EnemyKind::Boss), 1);

        scene.enemies.defeat_boss();
        idle(&mut scene, 30);
        assert!(scene.render().count(DrawTag::BossLoot) > 0);
        idle(&mut scene, BOSS_LOOT_FRAMES as usize - 30);
        assert_eq!(count_kind(&scene, ObjectKind::BossBall), 0);

        idle(&mut scene, 1);
        let orb = scene
            .objects()
            .iter()
            .find(|o| o.kind == ObjectKind::BossBall)
            .expect("orb should have dropped");
        assert_eq!(orb.pos, IVec2::new(WINDOW_WIDTH / 2, BOSS_LOOT_START_Y + BOSS_LOOT_FRAMES + 1));
        assert_eq!(orb.room, BOSS_ROOM);
        assert!(!scene.player_has_won());

        idle(&mut scene, 30);
        assert_eq!(count_kind(&scene, ObjectKind::BossBall), 1);

        scene.player_mut().set_pos(IVec2::new(WINDOW_WIDTH / 2, 175));
        idle(&mut scene, 1);
        assert_eq!(count_kind(&scene, ObjectKind::BossBall), 0);
        assert!(scene.player_has_won());
        assert_eq!(scene.audio().sound_count("Collect"), 1);
        assert!(scene.audio().playing_music().is_empty());
    }

    #[test]
    fn new_run_ignores_the_previous_boss_result() {
        let mut beaten = EnemyManager::new();
        beaten.spawn_boss(BOSS_SPAWN);
        beaten.defeat_boss();
        beaten.destroy_enemies();
        assert!(beaten.is_boss_dead());

        let catalog = catalog(vec![floor_room(1, 0), floor_room(8, 1)], vec![]);
        let mut scene = Scene::init(Arc::new(catalog), AudioPlayer::new(), beaten)
            .expect("fixture scene should init");
        assert!(!scene.enemies().is_boss_dead());

        scene.load_level(BOSS_ROOM).expect("boss room loads");
        scene.player_mut().set_pos(IVec2::new(19, 175));
        idle(&mut scene, 1);
        assert_eq!(scene.enemies().count(EnemyKind::Boss), 1);
        assert_eq!(scene.enemies().boss_life(), BOSS_MAX_LIFE);
        assert_eq!(scene.boss_loot.countdown(), BOSS_LOOT_FRAMES);
    }

    #[test]
    fn boss_room_switches_music_and_spawns_boss() {
        let mut scene = scene_with(vec![floor_room(8, 1)], vec![]);
        idle(&mut scene, 1);
        assert!(scene.audio().is_music_playing(LEVEL_MUSIC));
        scene.load_level(BOSS_ROOM).expect("boss room loads");
        scene.player_mut().set_pos(IVec2::new(19, 175));
        idle(&mut scene, 1);
        assert_eq!(scene.audio().playing_music(), vec![BOSS_MUSIC]);
        assert_eq!(scene.enemies().count(EnemyKind::Boss), 1);
    }

    #[test]
    fn last_death_latches_game_over() {
        let mut scene = scene_with(vec![], vec![]);
        scene.player_mut().set_pos(IVec2::new(40, 175));
        scene.player_mut().set_lives(0);
        scene.player_mut().decr_life(MAX_LIFE);
        for _ in 0..200 {
            idle(&mut scene, 1);
            if scene.player_is_dead() {
                break;
            }
        }
        assert!(scene.player_is_dead());
        idle(&mut scene, 30);
        assert!(scene.player_is_dead());
        assert_eq!(scene.room(), FIRST_ROOM);
        assert!(scene.audio().playing_music().is_empty());
        assert!(scene.render().count(DrawTag::GameOver) > 0);
    }

    #[test]
    fn death_with_lives_left_respawns_in_the_castle() {
        let mut scene = scene_with(vec![floor_room(5, 0), floor_room(4, 0)], vec![]);
        scene.load_level(RoomId::new(5, 0)).expect("room 5 loads");
        scene.player_mut().set_shield(true);
        scene.player_mut().decr_life(MAX_LIFE);
        idle(&mut scene, 120);
        assert!(!scene.player_is_dead());
        assert_eq!(scene.room(), CASTLE_HALL);
        assert_eq!(scene.player().lives(), crate::player::START_LIVES - 1);
        assert_eq!(scene.player().life(), MAX_LIFE);
        assert!(!scene.player().has_shield());
    }

    #[test]
    fn render_draws_layers_in_order() {
        let mut room = floor_room(2, 0);
        room.back[2][2] = 7;
        room.front[3][3] = 9;
        let objects = vec![placement(ObjectKind::Candle, RoomId::new(2, 0), 8, 9)];
        let mut scene = scene_with(vec![room], objects);
        scene.load_level(RoomId::new(2, 0)).expect("room 2 loads");

        let frame = scene.render();
        let back = frame.first_index(DrawTag::Tile(Layer::Back)).expect("back tiles");
        let mid = frame.first_index(DrawTag::Tile(Layer::Mid)).expect("mid tiles");
        let obj = frame
            .first_index(DrawTag::Object(ObjectKind::Candle))
            .expect("candle");
        let player = frame.first_index(DrawTag::Player).expect("player");
        let front = frame.first_index(DrawTag::Tile(Layer::Front)).expect("front tiles");
        let hud = frame.first_index(DrawTag::Hud).expect("hud");
        assert!(back < mid && mid < obj && obj < player && player < front && front < hud);
        assert_eq!(frame.count(DrawTag::Hitbox), 0);
        assert!(frame.has_text("000000"));
    }

    #[test]
    fn debug_views_toggle_sprites_and_hitboxes() {
        let mut scene = scene_with(vec![], vec![]);
        let mut input = InputState::new();
        input.tap(Key::F2);
        step(&mut scene, &mut input);
        assert_eq!(scene.debug_mode(), DebugMode::SpritesAndHitboxes);
        let frame = scene.render();
        assert!(frame.count(DrawTag::Hitbox) > 0);
        assert_eq!(frame.count(DrawTag::Player), 1);
        assert!(frame.has_text("GOD MODE : OFF"));

        input.tap(Key::F2);
        step(&mut scene, &mut input);
        let frame = scene.render();
        assert_eq!(frame.count(DrawTag::Player), 0);
        assert!(frame.count(DrawTag::Hitbox) > 0);
    }

    #[test]
    fn debug_keys_need_debug_mode() {
        let mut scene = scene_with(vec![floor_room(4, 0)], vec![]);
        let mut input = InputState::new();
        input.tap(Key::Num4);
        step(&mut scene, &mut input);
        assert_eq!(scene.room(), FIRST_ROOM);

        scene.cycle_debug_mode();
        input.tap(Key::Num4);
        step(&mut scene, &mut input);
        assert_eq!(scene.room(), CASTLE_HALL);

        input.tap(Key::F6);
        step(&mut scene, &mut input);
        assert_eq!(scene.player().hearts(), crate::player::START_HEARTS + 99);
    }

    #[test]
    fn pending_catalog_applies_on_next_load() {
        let mut scene = scene_with(vec![], vec![]);
        let mut with_hall = catalog(vec![floor_room(1, 0), floor_room(4, 0)], vec![]);
        with_hall.catalog_id = "reloaded".to_string();
        scene.set_pending_catalog(Arc::new(with_hall));
        scene.load_level(CASTLE_HALL).expect("new catalog has the hall");
        assert_eq!(scene.catalog.catalog_id, "reloaded");
    }
}
