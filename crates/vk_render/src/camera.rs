use glam::{Mat4, Vec2};

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

/// Pixel-space camera: (0,0) is the top-left of the logical screen and Y
/// grows downward, matching tile and entity coordinates.
pub struct Camera2D {
    /// World-space point drawn at the screen's top-left corner.
    pub offset: Vec2,
    pub screen: (u32, u32),
}

impl Camera2D {
    pub fn new(screen_width: u32, screen_height: u32) -> Self {
        Self {
            offset: Vec2::ZERO,
            screen: (screen_width, screen_height),
        }
    }

    pub fn view_proj(&self) -> Mat4 {
        Mat4::orthographic_rh(
            self.offset.x,
            self.offset.x + self.screen.0 as f32,
            self.offset.y + self.screen.1 as f32,
            self.offset.y,
            -1.0,
            1.0,
        )
    }

    pub fn build_uniform(&self) -> CameraUniform {
        CameraUniform {
            view_proj: self.view_proj().to_cols_array_2d(),
        }
    }
}

/// Region of the window the logical screen is drawn into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    /// Window pixels per logical pixel.
    pub fn scale(&self, screen_width: u32) -> f32 {
        self.width / screen_width as f32
    }
}

/// Fit the logical screen into the window with bars on the sides or top.
/// Whole-number scales are preferred so pixels stay square; windows smaller
/// than the screen fall back to a fractional fit.
pub fn letterbox(window: (u32, u32), screen: (u32, u32)) -> Viewport {
    let (ww, wh) = (window.0.max(1) as f32, window.1.max(1) as f32);
    let (sw, sh) = (screen.0.max(1) as f32, screen.1.max(1) as f32);
    let fit = (ww / sw).min(wh / sh);
    let scale = if fit >= 1.0 { fit.floor() } else { fit };
    let width = sw * scale;
    let height = sh * scale;
    Viewport {
        x: ((ww - width) / 2.0).floor(),
        y: ((wh - height) / 2.0).floor(),
        width,
        height,
    }
}
