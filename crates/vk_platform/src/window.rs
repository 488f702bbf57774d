use std::sync::Arc;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes};

/// Logical resolution of the game screen. Everything is composed at this
/// size and scaled up by the window.
pub const SCREEN_WIDTH: u32 = 256;
pub const SCREEN_HEIGHT: u32 = 240;

pub struct PlatformConfig {
    pub title: String,
    pub scale: u32,
    /// Upscaled window keeps whole pixels when resized.
    pub resizable: bool,
}

impl PlatformConfig {
    pub fn width(&self) -> u32 {
        SCREEN_WIDTH * self.scale.max(1)
    }

    pub fn height(&self) -> u32 {
        SCREEN_HEIGHT * self.scale.max(1)
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            title: "Vampire Killer".to_string(),
            scale: 3,
            resizable: true,
        }
    }
}

pub fn create_window(event_loop: &ActiveEventLoop, config: &PlatformConfig) -> Arc<Window> {
    let attrs = WindowAttributes::default()
        .with_title(&config.title)
        .with_resizable(config.resizable)
        .with_min_inner_size(winit::dpi::LogicalSize::new(SCREEN_WIDTH, SCREEN_HEIGHT))
        .with_inner_size(winit::dpi::LogicalSize::new(config.width(), config.height()));

    let window = event_loop
        .create_window(attrs)
        .expect("Failed to create window");
    log::info!(
        "Window created: {}x{} (scale {})",
        config.width(),
        config.height(),
        config.scale
    );
    Arc::new(window)
}
