//! The status strip across the top of the screen, and the short-lived pickup
//! icons it shows.

use vk_core::countdown::Countdown;
use vk_devtools::ScreenText;

use crate::constants::{BUFF_DISPLAY_FRAMES, HUD_HEIGHT, WINDOW_WIDTH};
use crate::frame::{DrawTag, Frame};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Buff {
    Boots,
    Wings,
    Shield,
    Heart,
}

impl Buff {
    fn color(self) -> [f32; 4] {
        match self {
            Self::Boots => [0.55, 0.35, 0.20, 1.0],
            Self::Wings => [0.90, 0.90, 1.00, 1.0],
            Self::Shield => [0.35, 0.55, 0.90, 1.0],
            Self::Heart => [0.90, 0.15, 0.25, 1.0],
        }
    }
}

/// A flag that clears itself after a fixed number of steps.
#[derive(Debug, Clone, Copy)]
pub struct BuffTimer {
    active: bool,
    timer: Countdown,
}

impl BuffTimer {
    pub fn new() -> Self {
        Self {
            active: false,
            timer: Countdown::new(BUFF_DISPLAY_FRAMES),
        }
    }

    /// Raise the flag. Raising it again while shown does not extend it.
    pub fn set(&mut self) {
        self.active = true;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn tick(&mut self) {
        if !self.active {
            return;
        }
        if self.timer.tick() <= 0 {
            self.active = false;
            self.timer.rearm();
        }
    }
}

impl Default for BuffTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HudBuffs {
    boots: BuffTimer,
    wings: BuffTimer,
    shield: BuffTimer,
    heart: BuffTimer,
}

impl HudBuffs {
    fn timer_mut(&mut self, buff: Buff) -> &mut BuffTimer {
        match buff {
            Buff::Boots => &mut self.boots,
            Buff::Wings => &mut self.wings,
            Buff::Shield => &mut self.shield,
            Buff::Heart => &mut self.heart,
        }
    }

    pub fn set(&mut self, buff: Buff) {
        self.timer_mut(buff).set();
    }

    pub fn is_active(&self, buff: Buff) -> bool {
        match buff {
            Buff::Boots => self.boots.is_active(),
            Buff::Wings => self.wings.is_active(),
            Buff::Shield => self.shield.is_active(),
            Buff::Heart => self.heart.is_active(),
        }
    }

    pub fn tick(&mut self) {
        self.boots.tick();
        self.wings.tick();
        self.shield.tick();
        self.heart.tick();
    }

    /// The one icon the HUD has room for.
    pub fn shown(&self) -> Option<Buff> {
        [Buff::Boots, Buff::Wings, Buff::Shield, Buff::Heart]
            .into_iter()
            .find(|&buff| self.is_active(buff))
    }
}

/// Everything the strip displays, gathered by the scene.
#[derive(Debug, Clone, Default)]
pub struct HudView {
    pub score: i32,
    pub level: i32,
    pub hearts: i32,
    pub lives: i32,
    pub life: i32,
    /// Boss life in the boss room, `None` elsewhere.
    pub boss_life: Option<i32>,
    pub has_chest_key: bool,
    pub has_door_key: bool,
    pub has_chain: bool,
    pub has_shield: bool,
    pub buff: Option<Buff>,
}

const BAR_X: i32 = 68;
const ICON: i32 = 16;

pub fn render_hud(frame: &mut Frame, hud: &HudView) {
    frame.screen_rect(0, 0, WINDOW_WIDTH, HUD_HEIGHT, [0.024, 0.024, 0.024, 1.0], DrawTag::Hud);

    frame.text(ScreenText::new(12.0, 14.0, "SCORE-"));
    frame.text(ScreenText::new(65.0, 14.0, format!("{:06}", hud.score)));
    frame.text(ScreenText::new(121.0, 14.0, "STAGE"));
    let stage = if hud.level <= 3 { "00" } else { "01" };
    frame.text(ScreenText::new(165.0, 14.0, stage));
    frame.text(ScreenText::new(201.0, 14.0, format!("{:02}", hud.hearts.max(0))));
    frame.text(ScreenText::new(237.0, 14.0, format!("{:02}", hud.lives.max(0))));
    frame.text(ScreenText::new(12.0, 26.0, "PLAYER"));
    frame.text(ScreenText::new(12.0, 35.0, "ENEMY"));

    if hud.life > 0 {
        frame.screen_rect(BAR_X, 28, hud.life * 2, 4, [0.97, 0.69, 0.56, 1.0], DrawTag::Hud);
    }
    let boss_bar = hud.boss_life.map_or(64, |life| life.max(0) * 4);
    frame.screen_rect(BAR_X, 37, boss_bar, 4, [0.69, 0.024, 0.024, 1.0], DrawTag::Hud);

    if hud.has_chain {
        frame.screen_rect(136, 26, ICON, ICON, [0.65, 0.65, 0.70, 1.0], DrawTag::Hud);
    }
    if hud.has_chest_key {
        frame.screen_rect(156, 26, ICON, ICON, [0.85, 0.75, 0.20, 1.0], DrawTag::Hud);
    }
    if hud.has_door_key {
        frame.screen_rect(172, 26, ICON, ICON, [0.75, 0.80, 0.85, 1.0], DrawTag::Hud);
    }
    match hud.buff {
        Some(buff) => frame.screen_rect(216, 26, ICON, ICON, buff.color(), DrawTag::Hud),
        None if hud.has_shield => {
            frame.screen_rect(208, 26, ICON, ICON, Buff::Shield.color(), DrawTag::Hud)
        }
        None => {}
    }
}
