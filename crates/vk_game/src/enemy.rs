//! Enemies and the trader NPC.
//!
//! The scene only asks for spawns, a per-step update against the current tile
//! map, and a few queries (boss state, trader popup). Each kind has a fixed,
//! frame-counted movement pattern.

use glam::IVec2;

use crate::frame::{DrawTag, Frame};
use crate::geometry::Aabb;
use crate::player::{Look, Player};
use crate::tilemap::TileMap;

pub const BOSS_MAX_LIFE: i32 = 16;
const BOSS_HIT_COOLDOWN: i32 = 30;
/// Area the boss patrols, in room pixels.
const BOSS_ARENA: Aabb = Aabb::new(16, 48, 256, 128);
const BAT_WAVE_PERIOD: i32 = 64;
const BAT_WAVE_AMPLITUDE: i32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyKind {
    Zombie,
    Bat,
    Boss,
}

impl EnemyKind {
    fn size(self) -> (i32, i32) {
        match self {
            Self::Zombie => (16, 32),
            Self::Bat => (16, 16),
            Self::Boss => (48, 24),
        }
    }

    fn life(self) -> i32 {
        match self {
            Self::Zombie | Self::Bat => 1,
            Self::Boss => BOSS_MAX_LIFE,
        }
    }

    fn contact_damage(self) -> i32 {
        match self {
            Self::Zombie | Self::Bat => 2,
            Self::Boss => 3,
        }
    }

    fn points(self) -> i32 {
        match self {
            Self::Zombie => 100,
            Self::Bat => 200,
            Self::Boss => 3000,
        }
    }

    fn color(self) -> [f32; 4] {
        match self {
            Self::Zombie => [0.35, 0.55, 0.35, 1.0],
            Self::Bat => [0.45, 0.30, 0.55, 1.0],
            Self::Boss => [0.25, 0.10, 0.30, 1.0],
        }
    }
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pub kind: EnemyKind,
    /// Bottom-left pixel.
    pub pos: IVec2,
    look: Look,
    life: i32,
    age: i32,
    origin_y: i32,
    velocity: IVec2,
    hit_cooldown: i32,
}

impl Enemy {
    fn new(kind: EnemyKind, pos: IVec2, look: Look) -> Self {
        let dir = if look == Look::Left { -1 } else { 1 };
        Self {
            kind,
            pos,
            look,
            life: kind.life(),
            age: 0,
            origin_y: pos.y,
            velocity: IVec2::new(dir, 1),
            hit_cooldown: 0,
        }
    }

    pub fn hitbox(&self) -> Aabb {
        let (w, h) = self.kind.size();
        Aabb::from_bottom_left(self.pos, w, h)
    }

    fn step(&mut self, map: &TileMap) {
        self.age += 1;
        if self.hit_cooldown > 0 {
            self.hit_cooldown -= 1;
        }
        let dir = if self.look == Look::Left { -1 } else { 1 };
        match self.kind {
            EnemyKind::Zombie => {
                if !map.test_collision_ground(&self.hitbox()) {
                    self.pos.y += 2;
                } else if self.age % 2 == 0 {
                    self.pos.x += dir;
                }
            }
            EnemyKind::Bat => {
                self.pos.x += dir;
                self.pos.y = self.origin_y + triangle_wave(self.age, BAT_WAVE_PERIOD, BAT_WAVE_AMPLITUDE);
            }
            EnemyKind::Boss => {
                let next = self.hitbox().translated(self.velocity.x, self.velocity.y);
                if next.x < BOSS_ARENA.x || next.right() > BOSS_ARENA.right() {
                    self.velocity.x = -self.velocity.x;
                }
                if next.y < BOSS_ARENA.y || next.bottom() > BOSS_ARENA.bottom() {
                    self.velocity.y = -self.velocity.y;
                }
                // Dives are slow; a step every other frame.
                if self.age % 2 == 0 {
                    self.pos += self.velocity;
                }
            }
        }
    }

    fn is_offscreen(&self, map: &TileMap) -> bool {
        let bounds = Aabb::new(-32, -32, map.width() * map.tile_size() + 64, map.height_px() + 64);
        !self.hitbox().overlaps(&bounds)
    }
}

/// Symmetric integer wave in `-amplitude..=amplitude`.
fn triangle_wave(t: i32, period: i32, amplitude: i32) -> i32 {
    let quarter = (period / 4).max(1);
    let phase = t.rem_euclid(period);
    let ramp = |p: i32| p * amplitude / quarter;
    match phase / quarter {
        0 => ramp(phase),
        1 => amplitude - ramp(phase - quarter),
        2 => -ramp(phase - 2 * quarter),
        _ => -amplitude + ramp(phase - 3 * quarter),
    }
}

#[derive(Debug, Clone)]
struct Trader {
    pos: IVec2,
    touching: bool,
}

impl Trader {
    fn hitbox(&self) -> Aabb {
        Aabb::from_bottom_left(self.pos, 16, 32)
    }
}

#[derive(Debug, Default)]
pub struct EnemyManager {
    enemies: Vec<Enemy>,
    trader: Option<Trader>,
    boss_defeated: bool,
    popup_dismissed: bool,
}

impl EnemyManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn_zombie(&mut self, pos: IVec2) {
        log::debug!("Zombie spawned at {pos:?}");
        self.enemies.push(Enemy::new(EnemyKind::Zombie, pos, Look::Left));
    }

    pub fn spawn_bat(&mut self, pos: IVec2) {
        log::debug!("Bat spawned at {pos:?}");
        self.enemies.push(Enemy::new(EnemyKind::Bat, pos, Look::Left));
    }

    pub fn spawn_boss(&mut self, pos: IVec2) {
        log::info!("Boss spawned at {pos:?}");
        self.enemies.retain(|e| e.kind != EnemyKind::Boss);
        self.enemies.push(Enemy::new(EnemyKind::Boss, pos, Look::Right));
        self.boss_defeated = false;
    }

    pub fn spawn_trader(&mut self, pos: IVec2) {
        log::info!("Trader appeared at {pos:?}");
        self.trader = Some(Trader { pos, touching: false });
    }

    /// Remove every enemy and the trader. The boss result is kept.
    pub fn destroy_enemies(&mut self) {
        self.enemies.clear();
        self.trader = None;
    }

    /// Forget everything from a previous run, including the boss result.
    pub fn reset(&mut self) {
        self.destroy_enemies();
        self.boss_defeated = false;
        self.popup_dismissed = false;
    }

    /// Kill the boss outright, as if the last hit landed this step.
    #[cfg(test)]
    pub fn defeat_boss(&mut self) {
        self.enemies.retain(|e| e.kind != EnemyKind::Boss);
        self.boss_defeated = true;
    }

    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }

    pub fn count(&self, kind: EnemyKind) -> usize {
        self.enemies.iter().filter(|e| e.kind == kind).count()
    }

    #[cfg(test)]
    pub fn positions(&self, kind: EnemyKind) -> Vec<IVec2> {
        self.enemies.iter().filter(|e| e.kind == kind).map(|e| e.pos).collect()
    }

    #[cfg(test)]
    pub fn has_trader(&self) -> bool {
        self.trader.is_some()
    }

    fn boss(&self) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.kind == EnemyKind::Boss)
    }

    pub fn is_boss_dead(&self) -> bool {
        self.boss_defeated
    }

    /// Boss life for the HUD bar; full before the fight, zero after.
    pub fn boss_life(&self) -> i32 {
        match self.boss() {
            Some(boss) => boss.life,
            None if self.boss_defeated => 0,
            None => BOSS_MAX_LIFE,
        }
    }

    /// The trader's popup shows while the player stands next to them.
    pub fn trader_popup(&self) -> bool {
        self.trader.as_ref().is_some_and(|t| t.touching)
    }

    /// True once, when the player first walks away from the trader.
    pub fn take_popup_dismissal(&mut self) -> bool {
        std::mem::take(&mut self.popup_dismissed)
    }

    pub fn update(&mut self, map: &TileMap, player: &mut Player) {
        let body = player.hitbox();
        let lash = player.attack_hitbox();

        for enemy in &mut self.enemies {
            enemy.step(map);
            if let Some(lash) = lash {
                if enemy.hit_cooldown == 0 && lash.overlaps(&enemy.hitbox()) {
                    enemy.life -= 1;
                    if enemy.kind == EnemyKind::Boss {
                        enemy.hit_cooldown = BOSS_HIT_COOLDOWN;
                    }
                }
            }
            if enemy.life > 0 && body.overlaps(&enemy.hitbox()) {
                player.take_hit(enemy.kind.contact_damage());
            }
        }

        let mut defeated_boss = false;
        self.enemies.retain(|enemy| {
            if enemy.life <= 0 {
                player.add_score(enemy.kind.points());
                if enemy.kind == EnemyKind::Boss {
                    defeated_boss = true;
                }
                return false;
            }
            !enemy.is_offscreen(map)
        });
        if defeated_boss {
            log::info!("Boss defeated");
            self.boss_defeated = true;
        }

        if let Some(trader) = &mut self.trader {
            let touching = body.overlaps(&trader.hitbox());
            if trader.touching && !touching {
                self.popup_dismissed = true;
            }
            trader.touching = touching;
        }
    }

    pub fn render(&self, frame: &mut Frame) {
        for enemy in &self.enemies {
            let color = if enemy.hit_cooldown % 4 >= 2 {
                [1.0, 1.0, 1.0, 1.0]
            } else {
                enemy.kind.color()
            };
            frame.world_rect(enemy.hitbox(), color, DrawTag::Enemy);
        }
        if let Some(trader) = &self.trader {
            frame.world_rect(trader.hitbox(), [0.70, 0.55, 0.30, 1.0], DrawTag::Trader);
        }
    }

    pub fn render_debug(&self, frame: &mut Frame) {
        for enemy in &self.enemies {
            frame.world_outline(enemy.hitbox(), [1.0, 0.5, 0.0, 1.0]);
        }
        if let Some(trader) = &self.trader {
            frame.world_outline(trader.hitbox(), [0.0, 1.0, 1.0, 1.0]);
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::PlayerIntent;

    const W: i32 = 18;
    const H: i32 = 13;

    fn floor_map() -> TileMap {
        let mut mid = vec![0; (W * H) as usize];
        for col in 0..W {
            mid[(11 * W + col) as usize] = 108;
        }
        let mut map = TileMap::new(W, H, 16);
        map.load(mid, vec![0; (W * H) as usize], vec![0; (W * H) as usize], W, H)
            .expect("layers should fit");
        map
    }

    /// Swing until the weapon's active frame is live.
    fn ready_swing(player: &mut Player, map: &TileMap) {
        player.update(
            PlayerIntent {
                attack_pressed: true,
                ..Default::default()
            },
            map,
        );
        while player.attack_hitbox().is_none() {
            player.update(PlayerIntent::default(), map);
        }
    }

    #[test]
    fn triangle_wave_spans_amplitude() {
        assert_eq!(triangle_wave(0, 64, 12), 0);
        assert_eq!(triangle_wave(16, 64, 12), 12);
        assert_eq!(triangle_wave(32, 64, 12), 0);
        assert_eq!(triangle_wave(48, 64, 12), -12);
        assert_eq!(triangle_wave(64, 64, 12), 0);
    }

    #[test]
    fn zombie_walks_left_and_despawns_off_room() {
        let map = floor_map();
        let mut player = Player::new(IVec2::new(400, 175));
        let mut enemies = EnemyManager::new();
        enemies.spawn_zombie(IVec2::new(236, 175));
        for _ in 0..10 {
            enemies.update(&map, &mut player);
        }
        assert_eq!(enemies.enemies[0].pos.x, 231);
        for _ in 0..600 {
            enemies.update(&map, &mut player);
        }
        assert!(enemies.is_empty());
    }

    #[test]
    fn contact_hurts_player_once_per_invulnerability_window() {
        let map = floor_map();
        let mut player = Player::new(IVec2::new(100, 175));
        let mut enemies = EnemyManager::new();
        enemies.spawn_bat(IVec2::new(100, 170));
        enemies.update(&map, &mut player);
        enemies.update(&map, &mut player);
        assert_eq!(player.life(), crate::player::MAX_LIFE - 2);
    }

    #[test]
    fn whip_kills_zombie_and_scores() {
        let map = floor_map();
        let mut player = Player::new(IVec2::new(100, 175));
        player.update(PlayerIntent::default(), &map);
        ready_swing(&mut player, &map);
        let mut enemies = EnemyManager::new();
        enemies.spawn_zombie(IVec2::new(118, 175));
        enemies.update(&map, &mut player);
        assert_eq!(enemies.count(EnemyKind::Zombie), 0);
        assert_eq!(player.score(), 100);
    }

    #[test]
    fn boss_life_tracks_fight_state() {
        let mut enemies = EnemyManager::new();
        assert_eq!(enemies.boss_life(), BOSS_MAX_LIFE);
        assert!(!enemies.is_boss_dead());
        enemies.spawn_boss(IVec2::new(100, 100));
        assert_eq!(enemies.count(EnemyKind::Boss), 1);
        enemies.enemies[0].life = 1;
        assert_eq!(enemies.boss_life(), 1);

        let map = floor_map();
        let mut player = Player::new(IVec2::new(20, 175));
        enemies.enemies[0].life = 0;
        enemies.update(&map, &mut player);
        assert!(enemies.is_boss_dead());
        assert_eq!(enemies.boss_life(), 0);
        assert_eq!(player.score(), 3000);
    }

    #[test]
    fn reset_forgets_the_last_run() {
        let mut enemies = EnemyManager::new();
        enemies.spawn_boss(IVec2::new(100, 100));
        enemies.defeat_boss();
        enemies.spawn_zombie(IVec2::new(236, 175));
        enemies.spawn_trader(IVec2::new(205, 175));
        enemies.popup_dismissed = true;

        enemies.destroy_enemies();
        assert!(enemies.is_boss_dead());

        enemies.reset();
        assert!(enemies.is_empty());
        assert!(!enemies.has_trader());
        assert!(!enemies.is_boss_dead());
        assert_eq!(enemies.boss_life(), BOSS_MAX_LIFE);
        assert!(!enemies.take_popup_dismissal());
    }

    #[test]
    fn boss_stays_inside_arena() {
        let map = floor_map();
        let mut player = Player::new(IVec2::new(-100, 175));
        let mut enemies = EnemyManager::new();
        enemies.spawn_boss(IVec2::new(100, 100));
        for _ in 0..2000 {
            enemies.update(&map, &mut player);
            let b = enemies.boss().expect("boss alive").hitbox();
            assert!(b.x >= BOSS_ARENA.x - 1 && b.right() <= BOSS_ARENA.right() + 1);
            assert!(b.y >= BOSS_ARENA.y - 1 && b.bottom() <= BOSS_ARENA.bottom() + 1);
        }
    }

    #[test]
    fn trader_popup_dismisses_once_player_leaves() {
        let map = floor_map();
        let mut player = Player::new(IVec2::new(205, 175));
        let mut enemies = EnemyManager::new();
        enemies.spawn_trader(IVec2::new(205, 175));
        enemies.update(&map, &mut player);
        assert!(enemies.trader_popup());
        assert!(!enemies.take_popup_dismissal());

        player.set_pos(IVec2::new(100, 175));
        enemies.update(&map, &mut player);
        assert!(!enemies.trader_popup());
        assert!(enemies.take_popup_dismissal());
        assert!(!enemies.take_popup_dismissal());
    }

    #[test]
    fn destroy_clears_enemies_and_trader() {
        let mut enemies = EnemyManager::new();
        enemies.spawn_zombie(IVec2::new(236, 175));
        enemies.spawn_trader(IVec2::new(205, 175));
        enemies.destroy_enemies();
        assert!(enemies.is_empty());
        assert!(!enemies.has_trader());
    }
}
