pub mod debug_overlay;
pub mod screen_text;

pub use debug_overlay::{DebugOverlay, OverlayActions, OverlayStats};
pub use screen_text::{ScreenText, TextPlacement};
