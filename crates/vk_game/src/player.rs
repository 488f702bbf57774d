//! The player: integer platformer movement against the tile map, the weapon,
//! and everything the HUD shows (life, lives, hearts, score, keys).
//!
//! Movement is axis-separable like the rest of the collision code: X is
//! resolved first, then Y from the corrected X, one pixel at a time so no
//! step can tunnel through a 16 px tile.

use glam::IVec2;

use crate::geometry::Aabb;
use crate::tilemap::TileMap;
use crate::weapon::{Weapon, WeaponKind};

pub const PLAYER_WIDTH: i32 = 12;
pub const PLAYER_HEIGHT: i32 = 30;
pub const MAX_LIFE: i32 = 16;
pub const START_LIVES: i32 = 3;
pub const START_HEARTS: i32 = 5;
const WALK_SPEED: i32 = 1;
const JUMP_FORCE: i32 = 4;
/// Steps between each +1 of downward speed.
const GRAVITY_DELAY: i32 = 3;
const MAX_FALL_SPEED: i32 = 4;
/// Invulnerability after taking a hit.
const DAMAGE_FRAMES: i32 = 60;
const DYING_FRAMES: i32 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Look {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    Walking,
    Airborne,
    Dying,
    Dead,
}

/// One step of player intent, decoupled from the keyboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerIntent {
    /// -1, 0 or +1.
    pub move_x: i32,
    pub jump_pressed: bool,
    pub attack_pressed: bool,
}

#[derive(Debug, Clone)]
pub struct Player {
    pos: IVec2,
    look: Look,
    state: PlayerState,
    weapon: Weapon,
    vel_y: i32,
    gravity_ticks: i32,
    grounded: bool,

    life: i32,
    lives: i32,
    hearts: i32,
    score: i32,
    has_shield: bool,
    has_chest_key: bool,
    has_door_key: bool,

    won: bool,
    god_mode: bool,
    damaged_delay: i32,
    dying_timer: i32,
    hud_initialised: bool,
}

impl Player {
    pub fn new(pos: IVec2) -> Self {
        Self {
            pos,
            look: Look::Right,
            state: PlayerState::Idle,
            weapon: Weapon::new(),
            vel_y: 0,
            gravity_ticks: 0,
            grounded: false,
            life: MAX_LIFE,
            lives: START_LIVES,
            hearts: START_HEARTS,
            score: 0,
            has_shield: false,
            has_chest_key: false,
            has_door_key: false,
            won: false,
            god_mode: false,
            damaged_delay: 0,
            dying_timer: 0,
            hud_initialised: false,
        }
    }

    /// First-visit HUD setup. Later calls are ignored.
    pub fn init_hud(&mut self) -> bool {
        if self.hud_initialised {
            return false;
        }
        self.hud_initialised = true;
        self.score = 0;
        self.lives = START_LIVES;
        self.hearts = START_HEARTS;
        self.life = MAX_LIFE;
        true
    }

    pub fn pos(&self) -> IVec2 {
        self.pos
    }

    pub fn set_pos(&mut self, pos: IVec2) {
        self.pos = pos;
    }

    /// Shift horizontally without collision, e.g. pushed back by a door.
    pub fn nudge_x(&mut self, dx: i32) {
        self.pos.x += dx;
    }

    pub fn hitbox(&self) -> Aabb {
        Aabb::from_bottom_left(self.pos, PLAYER_WIDTH, PLAYER_HEIGHT)
    }

    pub fn look(&self) -> Look {
        self.look
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn weapon(&self) -> &Weapon {
        &self.weapon
    }

    pub fn weapon_mut(&mut self) -> &mut Weapon {
        &mut self.weapon
    }

    /// Weapon damage area for this step, only on the swing's active frame.
    pub fn attack_hitbox(&self) -> Option<Aabb> {
        self.weapon.hitbox_on_attack(&self.hitbox(), self.look)
    }

    pub fn life(&self) -> i32 {
        self.life
    }

    pub fn lives(&self) -> i32 {
        self.lives
    }

    pub fn hearts(&self) -> i32 {
        self.hearts
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn add_score(&mut self, points: i32) {
        self.score += points;
    }

    pub fn incr_hearts(&mut self, n: i32) {
        self.hearts += n;
    }

    #[cfg(test)]
    pub fn set_lives(&mut self, lives: i32) {
        self.lives = lives;
    }

    pub fn has_shield(&self) -> bool {
        self.has_shield
    }

    pub fn set_shield(&mut self, held: bool) {
        self.has_shield = held;
    }

    pub fn has_chest_key(&self) -> bool {
        self.has_chest_key
    }

    pub fn set_chest_key(&mut self, held: bool) {
        self.has_chest_key = held;
    }

    pub fn has_door_key(&self) -> bool {
        self.has_door_key
    }

    pub fn set_door_key(&mut self, held: bool) {
        self.has_door_key = held;
    }

    pub fn win(&mut self) {
        if !self.won {
            log::info!("Player won");
        }
        self.won = true;
    }

    pub fn has_won(&self) -> bool {
        self.won
    }

    pub fn is_god_mode(&self) -> bool {
        self.god_mode
    }

    pub fn toggle_god_mode(&mut self) {
        self.god_mode = !self.god_mode;
        log::info!("God mode: {}", if self.god_mode { "ON" } else { "OFF" });
    }

    pub fn damaged_delay(&self) -> i32 {
        self.damaged_delay
    }

    /// Take a hit unless invulnerable. The shield halves damage.
    pub fn take_hit(&mut self, damage: i32) -> bool {
        if self.god_mode || self.damaged_delay > 0 || self.is_dying() || self.is_dead() {
            return false;
        }
        let damage = if self.has_shield { (damage / 2).max(1) } else { damage };
        self.decr_life(damage);
        self.damaged_delay = DAMAGE_FRAMES;
        true
    }

    /// Raw life loss, bypassing invulnerability but not god mode.
    pub fn decr_life(&mut self, n: i32) {
        if self.god_mode {
            return;
        }
        self.life = (self.life - n).max(0);
    }

    pub fn is_dying(&self) -> bool {
        self.state == PlayerState::Dying
    }

    pub fn is_dead(&self) -> bool {
        self.state == PlayerState::Dead
    }

    pub fn start_dying(&mut self) {
        if self.is_dying() || self.is_dead() {
            return;
        }
        log::info!("Player dying at {:?}", self.pos);
        self.state = PlayerState::Dying;
        self.dying_timer = DYING_FRAMES;
        self.weapon.reset();
    }

    /// Spend a life and come back at `pos` with fresh life and hearts. The
    /// shield and the chest key are lost; the door key stays.
    pub fn respawn(&mut self, pos: IVec2) {
        self.lives -= 1;
        self.pos = pos;
        self.state = PlayerState::Idle;
        self.look = Look::Right;
        self.weapon.reset();
        self.weapon.set_kind(WeaponKind::Whip);
        self.vel_y = 0;
        self.gravity_ticks = 0;
        self.grounded = false;
        self.life = MAX_LIFE;
        self.hearts = START_HEARTS;
        self.has_shield = false;
        self.has_chest_key = false;
        self.damaged_delay = 0;
        self.dying_timer = 0;
    }

    pub fn update(&mut self, intent: PlayerIntent, map: &TileMap) {
        match self.state {
            PlayerState::Dead => return,
            PlayerState::Dying => {
                self.dying_timer -= 1;
                if self.dying_timer <= 0 {
                    self.state = PlayerState::Dead;
                    log::info!("Player dead, {} lives left", self.lives);
                }
                return;
            }
            _ => {}
        }

        if self.damaged_delay > 0 {
            self.damaged_delay -= 1;
        }

        self.weapon.update();
        if intent.attack_pressed {
            self.weapon.start_attack();
        }
        let attacking = self.weapon.is_attacking();

        // Grounded swings root the player; airborne swings keep momentum.
        let dx = if attacking && self.grounded {
            0
        } else {
            intent.move_x.signum() * WALK_SPEED
        };
        if dx != 0 && !attacking {
            self.look = if dx < 0 { Look::Left } else { Look::Right };
        }
        self.step_x(dx, map);

        if self.grounded && intent.jump_pressed && !attacking {
            self.vel_y = -JUMP_FORCE;
            self.gravity_ticks = 0;
            self.grounded = false;
        }
        if !self.grounded {
            self.gravity_ticks += 1;
            if self.gravity_ticks >= GRAVITY_DELAY {
                self.gravity_ticks = 0;
                self.vel_y = (self.vel_y + 1).min(MAX_FALL_SPEED);
            }
        }
        self.step_y(self.vel_y, map);

        self.grounded = self.vel_y >= 0 && map.test_collision_ground(&self.hitbox());
        if self.grounded {
            self.vel_y = 0;
            self.gravity_ticks = 0;
        }

        self.state = if !self.grounded {
            PlayerState::Airborne
        } else if dx != 0 {
            PlayerState::Walking
        } else {
            PlayerState::Idle
        };

        // Falling out of the room is fatal, god mode or not.
        if self.hitbox().y > map.height_px() {
            self.life = 0;
        }
    }

    fn step_x(&mut self, dx: i32, map: &TileMap) {
        let dir = dx.signum();
        for _ in 0..dx.abs() {
            if map.collides_solid(&self.hitbox().translated(dir, 0)) {
                break;
            }
            self.pos.x += dir;
        }
    }

    fn step_y(&mut self, dy: i32, map: &TileMap) {
        let dir = dy.signum();
        for _ in 0..dy.abs() {
            if map.collides_solid(&self.hitbox().translated(0, dir)) {
                // Head bump ends the rise; landing is picked up by the ground test.
                self.vel_y = 0;
                break;
            }
            self.pos.y += dir;
        }
    }
}
