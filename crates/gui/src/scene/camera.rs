use glam::{Mat4, Vec3, Vec4};

use crate::state::settings::CameraSettings;

/// Perspective camera looking from `position` at `target`, +Y up
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    /// Vertical field of view (radians)
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    /// Point the camera looks at
    pub target: Vec3,
}

impl PerspectiveCamera {
    /// Camera placed per settings, looking at the origin
    pub fn from_settings(settings: &CameraSettings, aspect: f32) -> Self {
        Self {
            fov: settings.fov_degrees.to_radians(),
            aspect,
            near: settings.near,
            far: settings.far,
            position: Vec3::from_array(settings.position),
            target: Vec3::ZERO,
        }
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    /// View matrix (world -> camera)
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    /// Projection matrix (camera -> clip)
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov, self.aspect, self.near, self.far)
    }

    /// Combined view-projection matrix
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Unit vector from the camera towards its target
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize_or_zero()
    }

    pub fn up(&self) -> Vec3 {
        self.right().cross(self.forward()).normalize_or_zero()
    }

    /// Project a world point to normalized device coordinates.
    /// Returns `None` for points behind the camera.
    pub fn project(&self, point: Vec3) -> Option<Vec3> {
        let p = self.view_projection() * Vec4::new(point.x, point.y, point.z, 1.0);
        if p.w <= 0.0 {
            return None;
        }
        Some(p.truncate() / p.w)
    }
}
