//! Top-level flow: title screens, the main menu, the intro cutscene, a run of
//! the castle, and the ending. Every screen wait is a frame count.
//!
//! The game owns the audio player and enemy manager between runs and lends
//! them to the `Scene` for the duration of one.

use std::sync::Arc;

use vk_core::countdown::Countdown;
use vk_core::input::{InputState, Key};
use vk_devtools::{OverlayStats, ScreenText};

use crate::audio::AudioPlayer;
use crate::constants::{
    GAME_OVER_FRAMES, GAME_WIN_FRAMES, INTRODUCTION_FRAMES, INTRO_BACKGROUND_FRAMES,
    MENU_PLAY_FRAMES, TRANSITION_FRAMES, WINDOW_HEIGHT, WINDOW_WIDTH,
};
use crate::enemy::EnemyManager;
use crate::frame::{DrawTag, Frame};
use crate::level::LevelCatalog;
use crate::scene::{Scene, LEVEL_MUSIC};

const PROLOGUE_MUSIC: &str = "Prologue";
const GAME_OVER_MUSIC: &str = "GameOver";
const ENDING_MUSIC: &str = "Unused";

const GAME_MUSIC: &[(&str, &str)] = &[
    ("audio/Music/15 Unused.ogg", ENDING_MUSIC),
    ("audio/Music/10 Game Over.ogg", GAME_OVER_MUSIC),
    ("audio/Music/01 Prologue.ogg", PROLOGUE_MUSIC),
];

const PAN_START: i32 = 200;
const WALK_IN_START: i32 = 240;
/// Introduction frames left when the player stops walking and faces the gate.
const WALK_IN_END: i32 = 121;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    IntroUpc,
    Transition1,
    IntroBackground,
    Transition2,
    MainMenu,
    MenuPlay,
    Introduction,
    Playing,
    GameWin,
}

impl GameState {
    pub fn label(self) -> &'static str {
        match self {
            Self::IntroUpc => "Intro (UPC)",
            Self::Transition1 => "Transition 1",
            Self::IntroBackground => "Intro background",
            Self::Transition2 => "Transition 2",
            Self::MainMenu => "Main menu",
            Self::MenuPlay => "Menu (play)",
            Self::Introduction => "Introduction",
            Self::Playing => "Playing",
            Self::GameWin => "Game win",
        }
    }
}

impl std::fmt::Display for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// What the app loop should do after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Game {
    state: GameState,
    catalog: Arc<LevelCatalog>,
    scene: Option<Scene>,
    /// Held only while no scene is running.
    audio: AudioPlayer,
    enemies: EnemyManager,
    /// Frames left on the current timed screen.
    screen_timer: Countdown,
    lose_timer: Countdown,
    pan: i32,
    walk_in_x: i32,
}

impl Game {
    pub fn new(catalog: Arc<LevelCatalog>) -> Self {
        let mut audio = AudioPlayer::new();
        for &(path, name) in GAME_MUSIC {
            audio.create_music(path, name);
            audio.set_music_loop_status(name, false);
        }
        Self {
            state: GameState::IntroUpc,
            catalog,
            scene: None,
            audio,
            enemies: EnemyManager::new(),
            screen_timer: Countdown::new(0),
            lose_timer: Countdown::new(GAME_OVER_FRAMES),
            pan: PAN_START,
            walk_in_x: WALK_IN_START,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn scene_mut(&mut self) -> Option<&mut Scene> {
        self.scene.as_mut()
    }

    /// Whichever audio player is live right now.
    pub fn audio(&self) -> &AudioPlayer {
        match &self.scene {
            Some(scene) => scene.audio(),
            None => &self.audio,
        }
    }

    pub fn audio_mut(&mut self) -> &mut AudioPlayer {
        match &mut self.scene {
            Some(scene) => scene.audio_mut(),
            None => &mut self.audio,
        }
    }

    /// Use `catalog` for the next run. A running scene picks it up at its
    /// next room load.
    pub fn set_catalog(&mut self, catalog: Arc<LevelCatalog>) {
        if let Some(scene) = &mut self.scene {
            if !catalog.contains(scene.room()) {
                log::warn!(
                    "Catalog '{}' has no room {}; the current room stays until the next exit",
                    catalog.catalog_id,
                    scene.room()
                );
            }
            scene.set_pending_catalog(catalog.clone());
        }
        self.catalog = catalog;
    }

    /// One fixed step. Errors are scene init failures and end the app.
    pub fn update(&mut self, input: &InputState) -> Result<Flow, String> {
        self.audio_mut().update();

        let quit = input.is_just_pressed(Key::Escape);
        match self.state {
            GameState::IntroUpc => {
                if quit {
                    return Ok(Flow::Quit);
                }
                if input.is_just_pressed(Key::Space) {
                    self.enter(GameState::Transition1);
                }
                if input.is_just_pressed(Key::Num0) {
                    self.begin_play()?;
                }
            }
            GameState::Transition1 | GameState::IntroBackground | GameState::Transition2 => {
                if quit {
                    return Ok(Flow::Quit);
                }
                if self.screen_timer.tick() <= 0 {
                    let next = match self.state {
                        GameState::Transition1 => GameState::IntroBackground,
                        GameState::IntroBackground => GameState::Transition2,
                        _ => GameState::MainMenu,
                    };
                    self.enter(next);
                }
            }
            GameState::MainMenu => {
                if quit {
                    return Ok(Flow::Quit);
                }
                if input.is_just_pressed(Key::Space) {
                    self.enter(GameState::MenuPlay);
                }
            }
            GameState::MenuPlay => {
                if quit {
                    return Ok(Flow::Quit);
                }
                self.audio.play_music_by_name(PROLOGUE_MUSIC);
                if self.screen_timer.tick() == 0 {
                    self.enter(GameState::Introduction);
                }
            }
            GameState::Introduction => {
                if quit {
                    return Ok(Flow::Quit);
                }
                let left = self.screen_timer.tick();
                if left % 12 == 0 {
                    self.pan -= 1;
                }
                if left % 2 == 0 {
                    self.walk_in_x -= 1;
                }
                if left == 0 {
                    self.audio.stop_music_by_name(PROLOGUE_MUSIC);
                    self.begin_play()?;
                }
            }
            GameState::GameWin => {
                if quit {
                    return Ok(Flow::Quit);
                }
                if self.audio.is_music_playing(PROLOGUE_MUSIC) {
                    self.audio.stop_music_by_name(PROLOGUE_MUSIC);
                }
                self.audio.play_music_by_name(ENDING_MUSIC);
                let left = self.screen_timer.tick();
                if left % 4 == 0 {
                    self.pan -= 1;
                }
                if left == 0 {
                    self.audio.stop_music_by_name(ENDING_MUSIC);
                    self.enter(GameState::MainMenu);
                }
            }
            GameState::Playing => self.update_playing(input),
        }
        Ok(Flow::Continue)
    }

    pub fn render(&self) -> Frame {
        let mut frame = Frame::new();
        match self.state {
            GameState::Playing => {
                if let Some(scene) = &self.scene {
                    return scene.render();
                }
            }
            GameState::IntroUpc => {
                frame.text(ScreenText::new(84.0, 100.0, "UPC  PRESENTS").with_size(10.0));
                frame.text(ScreenText::new(64.0, 200.0, "PUSH SPACE KEY"));
            }
            GameState::Transition1 | GameState::Transition2 => {}
            GameState::IntroBackground => render_castle(&mut frame, 0),
            GameState::MainMenu => render_title(&mut frame, true),
            GameState::MenuPlay => {
                // The prompt blinks three frames on, three off.
                render_title(&mut frame, self.screen_timer.remaining() % 6 >= 3);
            }
            GameState::Introduction => self.render_introduction(&mut frame),
            GameState::GameWin => {
                frame.screen_rect(0, self.pan, WINDOW_WIDTH, WINDOW_HEIGHT, [0.10, 0.05, 0.15, 1.0], DrawTag::Screen);
                frame.text(ScreenText::new(88.0, (self.pan + 40) as f32, "CONGRATULATIONS").with_size(10.0));
                frame.text(ScreenText::new(104.0, (self.pan + 80) as f32, "THE END"));
            }
        }
        frame
    }

    pub fn fill_stats(&self, stats: &mut OverlayStats) {
        stats.state_label = self.state.to_string();
        stats.audio_label = self.audio().status_label();
        match &self.scene {
            Some(scene) => scene.fill_stats(stats),
            None => {
                stats.room_label = "-".to_string();
                stats.player_label.clear();
                stats.inventory_label.clear();
                stats.reveal_label.clear();
                stats.object_count = 0;
                stats.enemy_count = 0;
            }
        }
    }

    fn update_playing(&mut self, input: &InputState) {
        let Some(scene) = self.scene.as_mut() else {
            log::error!("Playing without a scene, back to the menu");
            self.enter(GameState::MainMenu);
            return;
        };

        if input.is_just_pressed(Key::Escape) {
            scene.audio_mut().stop_music_by_name(LEVEL_MUSIC);
            self.finish_play();
            self.enter(GameState::MainMenu);
        } else if scene.player_is_dead() {
            let audio = scene.audio_mut();
            audio.stop_music_by_name(LEVEL_MUSIC);
            audio.play_music_by_name(GAME_OVER_MUSIC);
            if self.lose_timer.tick() == 0 {
                self.finish_play();
                self.audio.stop_music_by_name(GAME_OVER_MUSIC);
                self.lose_timer.rearm();
                self.enter(GameState::MainMenu);
            }
        } else if scene.player_has_won() {
            self.finish_play();
            self.enter(GameState::GameWin);
        } else {
            scene.update(input);
        }
    }

    fn begin_play(&mut self) -> Result<(), String> {
        let audio = std::mem::take(&mut self.audio);
        let enemies = std::mem::take(&mut self.enemies);
        let scene = Scene::init(self.catalog.clone(), audio, enemies)?;
        self.scene = Some(scene);
        self.lose_timer.rearm();
        self.enter(GameState::Playing);
        Ok(())
    }

    /// Tear down the run and take the collaborators back.
    fn finish_play(&mut self) {
        let Some(mut scene) = self.scene.take() else {
            return;
        };
        scene.release();
        let (audio, enemies) = scene.into_parts();
        self.audio = audio;
        self.enemies = enemies;
    }

    fn enter(&mut self, state: GameState) {
        let frames = match state {
            GameState::Transition1 | GameState::Transition2 => TRANSITION_FRAMES,
            GameState::IntroBackground => INTRO_BACKGROUND_FRAMES,
            GameState::MenuPlay => MENU_PLAY_FRAMES,
            GameState::Introduction => INTRODUCTION_FRAMES,
            GameState::GameWin => GAME_WIN_FRAMES,
            _ => 0,
        };
        self.screen_timer = Countdown::new(frames);
        if matches!(state, GameState::Introduction | GameState::GameWin | GameState::MainMenu) {
            self.pan = PAN_START;
            self.walk_in_x = WALK_IN_START;
        }
        log::info!("Game state: {} -> {}", self.state, state);
        self.state = state;
    }

    fn render_introduction(&self, frame: &mut Frame) {
        let left = self.screen_timer.remaining();
        render_castle(frame, 40);
        frame.screen_rect(self.pan, 72, 64, 16, [0.55, 0.55, 0.60, 1.0], DrawTag::Screen);

        let wing = if left % 6 < 3 { [0.35, 0.1, 0.4, 1.0] } else { [0.5, 0.2, 0.55, 1.0] };
        frame.screen_rect(self.pan - 80, 60, 16, 16, wing, DrawTag::Screen);
        frame.screen_rect(250 - self.pan, self.pan - 92, 16, 16, wing, DrawTag::Screen);

        let x = if left < WALK_IN_END { 124 } else { self.walk_in_x };
        frame.screen_rect(x, 175, 16, 32, [0.80, 0.55, 0.35, 1.0], DrawTag::Player);
        frame.screen_rect(0, 0, WINDOW_WIDTH, 46, [0.024, 0.024, 0.024, 1.0], DrawTag::Hud);
    }
}

fn render_castle(frame: &mut Frame, y: i32) {
    frame.screen_rect(0, y, WINDOW_WIDTH, WINDOW_HEIGHT - y, [0.05, 0.05, 0.12, 1.0], DrawTag::Screen);
    frame.screen_rect(96, y + 40, 64, 120, [0.02, 0.02, 0.04, 1.0], DrawTag::Screen);
    frame.screen_rect(80, y + 24, 16, 136, [0.02, 0.02, 0.04, 1.0], DrawTag::Screen);
    frame.screen_rect(160, y + 24, 16, 136, [0.02, 0.02, 0.04, 1.0], DrawTag::Screen);
}

fn render_title(frame: &mut Frame, show_prompt: bool) {
    frame.screen_rect(0, 0, WINDOW_WIDTH, WINDOW_HEIGHT, [0.0, 0.0, 0.0, 1.0], DrawTag::Screen);
    frame.text(ScreenText::new(72.0, 80.0, "VAMPIRE KILLER").with_size(12.0).with_color([0.85, 0.15, 0.15, 1.0]));
    if show_prompt {
        frame.text(ScreenText::new(64.0, 160.0, "PUSH SPACE KEY"));
    }
}
