#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl QuadVertex {
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // position
                wgpu::VertexAttribute {
                    offset: std::mem::offset_of!(QuadVertex, position) as wgpu::BufferAddress,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                // color
                wgpu::VertexAttribute {
                    offset: std::mem::offset_of!(QuadVertex, color) as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// CPU-side mesh of axis-aligned colored rectangles, rebuilt every frame.
#[derive(Debug, Default)]
pub struct QuadBatch {
    pub vertices: Vec<QuadVertex>,
    pub indices: Vec<u32>,
}

impl QuadBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }

    pub fn quad_count(&self) -> usize {
        self.indices.len() / 6
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Append a rectangle whose top-left corner is `(x, y)` in screen pixels.
    pub fn push_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: [f32; 4]) {
        if w <= 0.0 || h <= 0.0 || color[3] <= 0.0 {
            return;
        }
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&[
            QuadVertex { position: [x, y], color },
            QuadVertex { position: [x + w, y], color },
            QuadVertex { position: [x + w, y + h], color },
            QuadVertex { position: [x, y + h], color },
        ]);
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    /// Rectangle outline of the given thickness, drawn inside the bounds.
    pub fn push_outline(&mut self, x: f32, y: f32, w: f32, h: f32, thickness: f32, color: [f32; 4]) {
        let t = thickness.min(w / 2.0).min(h / 2.0);
        self.push_rect(x, y, w, t, color);
        self.push_rect(x, y + h - t, w, t, color);
        self.push_rect(x, y + t, t, h - 2.0 * t, color);
        self.push_rect(x + w - t, y + t, t, h - 2.0 * t, color);
    }
}
