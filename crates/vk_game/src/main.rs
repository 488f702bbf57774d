//! Vampire Killer: main loop and application entry point.
//!
//! winit drives the event loop via `ApplicationHandler`. All simulation runs
//! inside `RedrawRequested` on a fixed 60 Hz step (see `TimeState`):
//!
//!   1. `begin_frame()` -- measure wall-clock delta, feed the accumulator
//!   2. `while should_step()` -- one `Game::update` per fixed step
//!   3. Compose the frame's draw list and upload it as one quad batch
//!   4. Draw the quads letterboxed into the window, then the egui layer
//!
//! Hot reload: the level catalog is watched via mtime polling and swapped in
//! at frame boundaries. A running scene picks it up at its next room load.

mod audio;
mod constants;
mod door;
mod enemy;
mod frame;
mod game;
mod geometry;
mod hud;
mod level;
mod object;
mod player;
#[cfg(test)]
mod replay;
mod reveal;
mod scene;
mod tilemap;
mod transition;
mod weapon;

use std::path::PathBuf;
use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Fullscreen, Window, WindowId};

use vk_core::input::{InputState, Key};
use vk_core::time::TimeState;
use vk_devtools::{DebugOverlay, OverlayStats, TextPlacement};
use vk_platform::window::{PlatformConfig, SCREEN_HEIGHT, SCREEN_WIDTH};
use vk_render::{letterbox, Camera2D, GpuContext, QuadBatch, QuadPipeline};

use constants::LEVEL_CATALOG_PATH;
use game::{Flow, Game};
use level::{load_catalog_from_path, LevelCatalog, LevelWatcher};

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.024,
    g: 0.024,
    b: 0.024,
    a: 1.0,
};

/// Everything that exists once the window and GPU surface are available.
struct EngineState {
    window: Arc<Window>,
    gpu: GpuContext,
    time: TimeState,
    input: InputState,
    camera: Camera2D,
    quad_pipeline: QuadPipeline,
    batch: QuadBatch,
    debug_overlay: DebugOverlay,

    catalog_watcher: LevelWatcher,
    game: Game,
}

impl EngineState {
    fn new(window: Arc<Window>, catalog: Arc<LevelCatalog>) -> Self {
        let gpu = GpuContext::new(window.clone()).expect("Failed to initialise GPU");
        let camera = Camera2D::new(SCREEN_WIDTH, SCREEN_HEIGHT);
        let quad_pipeline = QuadPipeline::new(&gpu.device, gpu.surface_format, &camera);
        let debug_overlay = DebugOverlay::new(&gpu.device, gpu.surface_format, &window);

        Self {
            window,
            gpu,
            time: TimeState::new(),
            input: InputState::new(),
            camera,
            quad_pipeline,
            batch: QuadBatch::new(),
            debug_overlay,
            catalog_watcher: LevelWatcher::new(PathBuf::from(LEVEL_CATALOG_PATH)),
            game: Game::new(catalog),
        }
    }

    fn reload_catalog(&mut self, reason: &str) {
        match load_catalog_from_path(self.catalog_watcher.path()) {
            Ok(catalog) => {
                log::info!("Level catalog reloaded ({reason})");
                self.game.set_catalog(Arc::new(catalog));
            }
            // Keep playing on the last good catalog.
            Err(err) => log::error!("Level catalog reload failed ({reason}): {err}"),
        }
    }

    fn apply_overlay_actions(&mut self, actions: &vk_devtools::OverlayActions) {
        if actions.cycle_debug_mode {
            if let Some(scene) = self.game.scene_mut() {
                scene.cycle_debug_mode();
            }
        }
        if actions.toggle_god_mode {
            if let Some(scene) = self.game.scene_mut() {
                scene.player_mut().toggle_god_mode();
            }
        }
        if actions.toggle_pause {
            self.time.paused = !self.time.paused;
            log::info!(
                "Simulation {}",
                if self.time.paused { "PAUSED" } else { "RESUMED" }
            );
        }
        if actions.single_step {
            self.time.request_single_step();
        }
        if actions.reload_levels {
            self.reload_catalog("overlay");
        }
    }
}

struct App {
    config: PlatformConfig,
    catalog: Arc<LevelCatalog>,
    state: Option<EngineState>,
}

impl App {
    fn new(catalog: Arc<LevelCatalog>) -> Self {
        Self {
            config: PlatformConfig::default(),
            catalog,
            state: None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let window = vk_platform::window::create_window(event_loop, &self.config);
        self.state = Some(EngineState::new(window, self.catalog.clone()));
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let state = match self.state.as_mut() {
            Some(s) => s,
            None => return,
        };

        let egui_consumed = state
            .debug_overlay
            .handle_window_event(&state.window, &event);

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting.");
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                let w = physical_size.width;
                let h = physical_size.height;
                if w > 0 && h > 0 {
                    state.gpu.resize(w, h);
                    log::info!("Resized to {}x{}", w, h);
                }
            }

            WindowEvent::Focused(false) => state.input.clear(),

            WindowEvent::KeyboardInput { event, .. } if !egui_consumed => {
                let PhysicalKey::Code(key_code) = event.physical_key else {
                    return;
                };
                let pressed = event.state == ElementState::Pressed;
                match key_code {
                    KeyCode::F12 if pressed && !event.repeat => state.debug_overlay.toggle(),
                    KeyCode::KeyF if pressed && !event.repeat => {
                        let fullscreen = match state.window.fullscreen() {
                            Some(_) => None,
                            None => Some(Fullscreen::Borderless(None)),
                        };
                        state.window.set_fullscreen(fullscreen);
                    }
                    _ => {
                        if let Some(game_key) = map_key(key_code) {
                            if pressed {
                                state.input.key_down(game_key);
                            } else {
                                state.input.key_up(game_key);
                            }
                        }
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                if state.gpu.size.0 == 0 || state.gpu.size.1 == 0 {
                    return;
                }

                // Catalog edits land between frames, never mid-step.
                if state.catalog_watcher.should_reload() {
                    state.reload_catalog("file watcher");
                }

                state.time.begin_frame();
                while state.time.should_step() {
                    match state.game.update(&state.input) {
                        Ok(Flow::Continue) => {}
                        Ok(Flow::Quit) => {
                            log::info!("Quit from {}", state.game.state());
                            event_loop.exit();
                            return;
                        }
                        Err(err) => {
                            log::error!("{err}");
                            event_loop.exit();
                            return;
                        }
                    }
                    // Later steps this frame must not replay the same presses.
                    state.input.end_frame();
                }
                for cue in state.game.audio_mut().drain_cues() {
                    log::trace!("Audio cue: {cue:?}");
                }

                // Render phase reads finalized simulation state from this frame.
                let frame = state.game.render();
                frame.to_batch(&mut state.batch);
                state.quad_pipeline.update_camera(&state.gpu.queue, &state.camera);
                state
                    .quad_pipeline
                    .upload(&state.gpu.device, &state.gpu.queue, &state.batch);

                let Some((output, view)) = state.gpu.begin_frame() else {
                    return;
                };

                let viewport = letterbox(state.gpu.size, (SCREEN_WIDTH, SCREEN_HEIGHT));
                let placement = TextPlacement {
                    origin: (viewport.x, viewport.y),
                    scale: viewport.scale(SCREEN_WIDTH),
                    pixels_per_point: state.window.scale_factor() as f32,
                };

                let mut stats = OverlayStats {
                    quad_count: state.batch.quad_count() as u32,
                    text_runs: frame.texts.len() as u32,
                    paused: state.time.paused,
                    ..Default::default()
                };
                state.game.fill_stats(&mut stats);

                let (egui_primitives, egui_textures_delta, overlay_actions) = state
                    .debug_overlay
                    .prepare(&state.window, &state.time, &stats, &frame.texts, placement);
                state.apply_overlay_actions(&overlay_actions);

                let screen_descriptor = egui_wgpu::ScreenDescriptor {
                    size_in_pixels: [state.gpu.size.0, state.gpu.size.1],
                    pixels_per_point: state.window.scale_factor() as f32,
                };

                let mut encoder =
                    state
                        .gpu
                        .device
                        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                            label: Some("Render Encoder"),
                        });

                state.quad_pipeline.draw(
                    &mut encoder,
                    &view,
                    viewport,
                    (state.batch.indices.len()) as u32,
                    CLEAR_COLOR,
                );

                state.debug_overlay.upload(
                    &state.gpu.device,
                    &state.gpu.queue,
                    &mut encoder,
                    &egui_primitives,
                    &egui_textures_delta,
                    &screen_descriptor,
                );

                {
                    let mut egui_pass = encoder
                        .begin_render_pass(&wgpu::RenderPassDescriptor {
                            label: Some("egui Render Pass"),
                            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                                view: &view,
                                resolve_target: None,
                                ops: wgpu::Operations {
                                    load: wgpu::LoadOp::Load,
                                    store: wgpu::StoreOp::Store,
                                },
                            })],
                            depth_stencil_attachment: None,
                            ..Default::default()
                        })
                        .forget_lifetime();

                    state
                        .debug_overlay
                        .paint(&mut egui_pass, &egui_primitives, &screen_descriptor);
                }

                state.debug_overlay.cleanup(&egui_textures_delta);

                state.gpu.queue.submit(std::iter::once(encoder.finish()));
                output.present();
            }

            _ => {}
        }
    }
}

fn map_key(key_code: KeyCode) -> Option<Key> {
    match key_code {
        KeyCode::ArrowLeft => Some(Key::Left),
        KeyCode::ArrowRight => Some(Key::Right),
        KeyCode::ArrowUp => Some(Key::Up),
        KeyCode::ArrowDown => Some(Key::Down),
        KeyCode::Escape => Some(Key::Escape),
        KeyCode::Space => Some(Key::Space),
        KeyCode::F1 => Some(Key::F1),
        KeyCode::F2 => Some(Key::F2),
        KeyCode::F3 => Some(Key::F3),
        KeyCode::F4 => Some(Key::F4),
        KeyCode::F5 => Some(Key::F5),
        KeyCode::F6 => Some(Key::F6),
        KeyCode::Digit0 => Some(Key::Num0),
        KeyCode::Digit1 => Some(Key::Num1),
        KeyCode::Digit2 => Some(Key::Num2),
        KeyCode::Digit3 => Some(Key::Num3),
        KeyCode::Digit4 => Some(Key::Num4),
        KeyCode::Digit5 => Some(Key::Num5),
        KeyCode::Digit6 => Some(Key::Num6),
        KeyCode::Digit7 => Some(Key::Num7),
        KeyCode::Digit8 => Some(Key::Num8),
        KeyCode::Digit9 => Some(Key::Num9),
        KeyCode::KeyC => Some(Key::C),
        KeyCode::KeyG => Some(Key::G),
        KeyCode::KeyH => Some(Key::H),
        KeyCode::KeyJ => Some(Key::J),
        KeyCode::KeyK => Some(Key::K),
        KeyCode::KeyL => Some(Key::L),
        KeyCode::KeyO => Some(Key::O),
        KeyCode::KeyP => Some(Key::P),
        _ => None,
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Vampire Killer starting...");

    let catalog = match load_catalog_from_path(&PathBuf::from(LEVEL_CATALOG_PATH)) {
        Ok(catalog) => Arc::new(catalog),
        Err(err) => {
            log::error!("{err}");
            std::process::exit(1);
        }
    };

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(catalog);
    event_loop.run_app(&mut app).expect("Event loop error");
}
