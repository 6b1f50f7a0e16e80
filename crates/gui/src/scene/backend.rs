//! The seam between the scene lifecycle and whatever draws it.

use glam::{Mat4, Vec3};
use thiserror::Error;

use super::mesh::{Lighting, MeshData};

/// Drawable area in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height; 1.0 while the surface is collapsed
    pub fn aspect(&self) -> f32 {
        if self.width == 0 || self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// Per-frame inputs for a backend render call
#[derive(Debug, Clone, Copy)]
pub struct FrameParams {
    pub view_projection: Mat4,
    pub camera_position: Vec3,
    pub lighting: Lighting,
    pub background: [f32; 3],
    pub size: SurfaceSize,
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("no graphics context is available")]
    NoContext,
    #[error("shader program failed to build: {0}")]
    Shader(String),
    #[error("GPU allocation failed: {0}")]
    Allocation(String),
}

/// A render target that owns GPU-side resources.
///
/// The lifecycle manager is the only caller. It guarantees that every mesh it
/// uploads is released exactly once and that the surface is detached before
/// it is destroyed.
pub trait RenderBackend {
    /// Handle to an uploaded mesh
    type Mesh;

    fn create_surface(&mut self, size: SurfaceSize) -> Result<(), BackendError>;
    /// Make the surface visible in the host
    fn attach_surface(&mut self);
    fn detach_surface(&mut self);
    fn destroy_surface(&mut self);
    fn resize_surface(&mut self, size: SurfaceSize);

    fn upload_mesh(&mut self, mesh: &MeshData) -> Result<Self::Mesh, BackendError>;
    fn release_mesh(&mut self, mesh: Self::Mesh);

    fn render(&mut self, frame: &FrameParams, meshes: &[Self::Mesh]);
}
