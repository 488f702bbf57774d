//! Delayed rewards. Opening a chest, whipping a candle and beating the boss
//! all show a short animation before the actual pickup object exists.
//!
//! Each machine is a single slot: a new trigger while one is running replaces
//! the pending reward instead of queueing behind it.

use glam::IVec2;

use crate::constants::{BOSS_LOOT_FRAMES, BOSS_LOOT_START_Y, CHEST_REVEAL_FRAMES, WINDOW_WIDTH};
use crate::object::ObjectKind;

/// A pickup ready to be placed in the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reward {
    pub kind: ObjectKind,
    pub pos: IVec2,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChestReveal {
    #[default]
    Idle,
    Opening {
        chest: ObjectKind,
        pos: IVec2,
        countdown: i32,
    },
}

impl ChestReveal {
    /// Start opening `chest`. A chest opened mid-reveal takes over the slot
    /// but the running countdown is kept.
    pub fn trigger(&mut self, chest: ObjectKind, pos: IVec2) {
        let countdown = match *self {
            Self::Opening { countdown, .. } => countdown,
            Self::Idle => CHEST_REVEAL_FRAMES,
        };
        *self = Self::Opening {
            chest,
            pos,
            countdown,
        };
    }

    /// Advance one step; yields the chest's contents when the lid is open.
    pub fn tick(&mut self) -> Option<Reward> {
        let Self::Opening {
            chest,
            pos,
            countdown,
        } = self
        else {
            return None;
        };
        *countdown -= 1;
        if *countdown != 0 {
            return None;
        }
        let reward = chest.chest_loot().map(|kind| Reward { kind, pos: *pos });
        *self = Self::Idle;
        reward
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Opening { .. })
    }

    /// Animation frame 0..=3 on a 30-step cycle.
    pub fn anim_frame(&self) -> Option<usize> {
        let Self::Opening { countdown, .. } = self else {
            return None;
        };
        let t = countdown.rem_euclid(30);
        Some(match t {
            0..=7 => 0,
            8..=15 => 1,
            16..=22 => 2,
            _ => 3,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LootReveal {
    #[default]
    Idle,
    Opening {
        loot: ObjectKind,
        origin: IVec2,
        countdown: i32,
        /// Pixels travelled below `origin` so far.
        offset_y: i32,
    },
}

impl LootReveal {
    /// Release `loot` from a hazard at `origin`, landing after `drop` steps.
    pub fn trigger(&mut self, loot: ObjectKind, origin: IVec2, drop: i32) {
        *self = Self::Opening {
            loot,
            origin,
            countdown: drop,
            offset_y: 0,
        };
    }

    /// Advance one step; yields the loot once the countdown goes negative.
    pub fn tick(&mut self) -> Option<Reward> {
        let Self::Opening {
            loot,
            origin,
            countdown,
            offset_y,
        } = self
        else {
            return None;
        };
        *countdown -= 1;
        *offset_y += 1;
        if *countdown >= 0 {
            return None;
        }
        let reward = Reward {
            kind: *loot,
            pos: *origin + IVec2::new(0, *offset_y),
        };
        *self = Self::Idle;
        Some(reward)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Opening { .. })
    }

    pub fn countdown(&self) -> Option<i32> {
        match self {
            Self::Opening { countdown, .. } => Some(*countdown),
            Self::Idle => None,
        }
    }

    /// Where the falling loot is drawn this step.
    pub fn current(&self) -> Option<Reward> {
        match *self {
            Self::Opening {
                loot,
                origin,
                offset_y,
                ..
            } => Some(Reward {
                kind: loot,
                pos: origin + IVec2::new(0, offset_y),
            }),
            Self::Idle => None,
        }
    }
}

/// The orb that drops after the boss dies. Fires at most once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BossLoot {
    countdown: i32,
    offset_y: i32,
    spawned: bool,
}

impl BossLoot {
    pub fn new() -> Self {
        Self {
            countdown: BOSS_LOOT_FRAMES,
            offset_y: 0,
            spawned: false,
        }
    }

    pub fn tick(&mut self) -> Option<Reward> {
        if self.spawned {
            return None;
        }
        self.countdown -= 1;
        self.offset_y += 1;
        if self.countdown >= 0 {
            return None;
        }
        self.spawned = true;
        Some(Reward {
            kind: ObjectKind::BossBall,
            pos: self.current_pos(),
        })
    }

    pub fn current_pos(&self) -> IVec2 {
        IVec2::new(WINDOW_WIDTH / 2, BOSS_LOOT_START_Y + self.offset_y)
    }

    /// Falling and not yet spawned, with time left on the clock.
    pub fn is_falling(&self) -> bool {
        !self.spawned && self.offset_y > 0
    }

    #[cfg(test)]
    pub fn is_spawned(&self) -> bool {
        self.spawned
    }

    pub fn countdown(&self) -> i32 {
        self.countdown
    }
}

impl Default for BossLoot {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chest_reveals_mapped_loot_after_sixty_steps() {
        let mut chest = ChestReveal::default();
        chest.trigger(ObjectKind::ChestHeart, IVec2::new(192, 175));
        for _ in 0..59 {
            assert_eq!(chest.tick(), None);
        }
        assert_eq!(
            chest.tick(),
            Some(Reward {
                kind: ObjectKind::HeartBig,
                pos: IVec2::new(192, 175)
            })
        );
        assert!(!chest.is_active());
    }

    #[test]
    fn chest_retrigger_replaces_reward_but_keeps_clock() {
        let mut chest = ChestReveal::default();
        chest.trigger(ObjectKind::ChestBoots, IVec2::new(48, 47));
        for _ in 0..50 {
            chest.tick();
        }
        chest.trigger(ObjectKind::ChestShield, IVec2::new(48, 111));
        for _ in 0..9 {
            assert_eq!(chest.tick(), None);
        }
        let reward = chest.tick().expect("shared clock should expire");
        assert_eq!(reward.kind, ObjectKind::Shield);
        assert_eq!(reward.pos, IVec2::new(48, 111));
    }

    #[test]
    fn chest_anim_cycles_four_frames() {
        let mut chest = ChestReveal::default();
        assert_eq!(chest.anim_frame(), None);
        chest.trigger(ObjectKind::ChestWings, IVec2::ZERO);
        let mut seen = [false; 4];
        for _ in 0..30 {
            seen[chest.anim_frame().expect("opening")] = true;
            chest.tick();
        }
        assert_eq!(seen, [true; 4]);
    }

    #[test]
    fn loot_spawns_on_the_negative_crossing() {
        let mut loot = LootReveal::default();
        loot.trigger(ObjectKind::HeartSmall, IVec2::new(128, 143), 32);
        assert_eq!(loot.countdown(), Some(32));
        for _ in 0..32 {
            assert_eq!(loot.tick(), None);
        }
        assert_eq!(loot.countdown(), Some(0));
        let reward = loot.tick().expect("crossing below zero spawns");
        assert_eq!(reward.kind, ObjectKind::HeartSmall);
        assert_eq!(reward.pos, IVec2::new(128, 176));
        assert!(!loot.is_active());
    }

    #[test]
    fn loot_retrigger_restarts_everything() {
        let mut loot = LootReveal::default();
        loot.trigger(ObjectKind::HeartSmall, IVec2::new(80, 143), 16);
        for _ in 0..10 {
            loot.tick();
        }
        loot.trigger(ObjectKind::Chain, IVec2::new(208, 143), 16);
        assert_eq!(loot.current().map(|r| r.pos), Some(IVec2::new(208, 143)));
        for _ in 0..16 {
            assert_eq!(loot.tick(), None);
        }
        assert_eq!(loot.tick().map(|r| r.kind), Some(ObjectKind::Chain));
    }

    #[test]
    fn boss_loot_fires_once() {
        let mut orb = BossLoot::new();
        let mut spawned = Vec::new();
        for _ in 0..200 {
            if let Some(reward) = orb.tick() {
                spawned.push(reward);
            }
        }
        assert_eq!(spawned.len(), 1);
        assert_eq!(spawned[0].kind, ObjectKind::BossBall);
        assert_eq!(spawned[0].pos, IVec2::new(128, 100 + 61));
        assert!(orb.is_spawned());
    }
}
