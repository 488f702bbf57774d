pub mod camera;
pub mod gpu_context;
pub mod quad_pipeline;
pub mod vertex;

pub use camera::{letterbox, Camera2D, CameraUniform, Viewport};
pub use gpu_context::GpuContext;
pub use quad_pipeline::QuadPipeline;
pub use vertex::{QuadBatch, QuadVertex};
