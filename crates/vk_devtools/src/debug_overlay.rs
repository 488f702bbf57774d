//! egui layer drawn on top of the quad pass: HUD text every frame, plus the
//! debug window when it is toggled on.
//!
//! egui needs a split render because `egui_wgpu::Renderer::render()` takes a
//! `RenderPass<'static>` while `begin_render_pass` borrows the encoder:
//!
//!   1. `prepare()` -- run UI logic and tessellate
//!   2. `upload()`  -- textures and buffers (borrows the encoder mutably)
//!   3. `paint()`   -- draw into a pass detached with `forget_lifetime()`
//!   4. `cleanup()` -- free textures egui dropped

use vk_core::time::TimeState;
use winit::window::Window;

use crate::screen_text::{ScreenText, TextPlacement};

#[derive(Debug, Clone, Default)]
pub struct OverlayStats {
    pub quad_count: u32,
    pub text_runs: u32,
    /// Top-level game state, e.g. "Playing".
    pub state_label: String,
    /// Active room, e.g. "(6,0) wall broken".
    pub room_label: String,
    pub player_label: String,
    pub inventory_label: String,
    pub reveal_label: String,
    pub audio_label: String,
    pub object_count: u32,
    pub enemy_count: u32,
    pub debug_mode_label: String,
    pub god_mode: bool,
    pub paused: bool,
}

#[derive(Debug, Clone, Default)]
pub struct OverlayActions {
    pub cycle_debug_mode: bool,
    pub toggle_god_mode: bool,
    pub toggle_pause: bool,
    /// Advance one fixed step while paused.
    pub single_step: bool,
    /// Re-read the level catalog from disk now.
    pub reload_levels: bool,
}

pub struct DebugOverlay {
    pub egui_ctx: egui::Context,
    pub egui_winit_state: egui_winit::State,
    pub egui_renderer: egui_wgpu::Renderer,
    pub visible: bool,
}

impl DebugOverlay {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        window: &Window,
    ) -> Self {
        let egui_ctx = egui::Context::default();
        let egui_winit_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            window,
            None,
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(device, surface_format, None, 1, false);

        Self {
            egui_ctx,
            egui_winit_state,
            egui_renderer,
            visible: false,
        }
    }

    pub fn handle_window_event(
        &mut self,
        window: &Window,
        event: &winit::event::WindowEvent,
    ) -> bool {
        let response = self.egui_winit_state.on_window_event(window, event);
        // Keyboard input always belongs to the game; only clicks on the
        // debug window are swallowed.
        response.consumed && self.visible
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
        log::info!("Debug overlay: {}", if self.visible { "ON" } else { "OFF" });
    }

    pub fn prepare(
        &mut self,
        window: &Window,
        time: &TimeState,
        stats: &OverlayStats,
        texts: &[ScreenText],
        placement: TextPlacement,
    ) -> (
        Vec<egui::ClippedPrimitive>,
        egui::TexturesDelta,
        OverlayActions,
    ) {
        let mut actions = OverlayActions::default();
        let raw_input = self.egui_winit_state.take_egui_input(window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            paint_screen_text(ctx, texts, placement);

            if !self.visible {
                return;
            }
            egui::Window::new("Debug")
                .default_pos([10.0, 10.0])
                .show(ctx, |ui| {
                    ui.label(format!("FPS: {:.1}", time.smoothed_fps));
                    ui.label(format!("Frame time: {:.2} ms", time.smoothed_frame_time_ms));
                    ui.label(format!("Steps this frame: {}", time.steps_this_frame));
                    ui.label(format!(
                        "Total steps: {} ({:.1} s simulated)",
                        time.fixed_step_count,
                        time.sim_seconds()
                    ));
                    ui.label(format!("Quads: {}  Text runs: {}", stats.quad_count, stats.text_runs));

                    ui.separator();
                    ui.label(format!("State: {}", stats.state_label));
                    ui.label(format!("Room: {}", stats.room_label));
                    ui.label(&stats.player_label);
                    ui.label(&stats.inventory_label);
                    ui.label(format!("Reveals: {}", stats.reveal_label));
                    ui.label(format!("Audio: {}", stats.audio_label));
                    ui.label(format!(
                        "Objects in room: {}  Enemies: {}",
                        stats.object_count, stats.enemy_count
                    ));

                    ui.separator();
                    ui.horizontal(|ui| {
                        ui.label(format!("Debug view: {}", stats.debug_mode_label));
                        if ui.button("Cycle").clicked() {
                            actions.cycle_debug_mode = true;
                        }
                    });
                    let god_label = if stats.god_mode { "God mode: ON" } else { "God mode: OFF" };
                    if ui.button(god_label).clicked() {
                        actions.toggle_god_mode = true;
                    }
                    if ui.button("Reload levels").clicked() {
                        actions.reload_levels = true;
                    }

                    ui.separator();
                    ui.horizontal(|ui| {
                        let pause_label = if stats.paused { "Resume" } else { "Pause" };
                        if ui.button(pause_label).clicked() {
                            actions.toggle_pause = true;
                        }
                        if stats.paused && ui.button("Step").clicked() {
                            actions.single_step = true;
                        }
                    });
                    if stats.paused {
                        ui.label("\u{23f8} PAUSED");
                    }
                });
        });

        self.egui_winit_state
            .handle_platform_output(window, full_output.platform_output);

        let primitives = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        (primitives, full_output.textures_delta, actions)
    }

    /// Upload textures and update buffers. Call before creating the egui render pass.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        primitives: &[egui::ClippedPrimitive],
        textures_delta: &egui::TexturesDelta,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.egui_renderer
            .update_buffers(device, queue, encoder, primitives, screen_descriptor);
    }

    /// Render into an existing render pass. Call after `upload()`.
    pub fn paint(
        &self,
        render_pass: &mut wgpu::RenderPass<'static>,
        primitives: &[egui::ClippedPrimitive],
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        self.egui_renderer
            .render(render_pass, primitives, screen_descriptor);
    }

    pub fn cleanup(&mut self, textures_delta: &egui::TexturesDelta) {
        for id in &textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

fn paint_screen_text(ctx: &egui::Context, texts: &[ScreenText], placement: TextPlacement) {
    if texts.is_empty() {
        return;
    }
    let painter = ctx.layer_painter(egui::LayerId::new(
        egui::Order::Background,
        egui::Id::new("screen_text"),
    ));
    for run in texts {
        let (x, y) = placement.to_points(run.x, run.y);
        painter.text(
            egui::pos2(x, y),
            egui::Align2::LEFT_TOP,
            &run.text,
            egui::FontId::monospace(placement.font_points(run.size)),
            to_color32(run.color),
        );
    }
}

fn to_color32(color: [f32; 4]) -> egui::Color32 {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    egui::Color32::from_rgba_unmultiplied(
        channel(color[0]),
        channel(color[1]),
        channel(color[2]),
        channel(color[3]),
    )
}
