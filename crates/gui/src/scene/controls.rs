//! Orbit navigation around a target point.
//!
//! Input methods only queue deltas. `update()` applies them to the camera,
//! with exponential damping when enabled, so it must run once per frame.

use std::f32::consts::FRAC_PI_2;

use glam::{Quat, Vec3};

use super::camera::PerspectiveCamera;
use crate::state::settings::ControlsSettings;

/// Radians of orbit per pixel of pointer drag
const ROTATE_SPEED: f32 = 0.005;
/// World units of pan per pixel, per unit of camera distance
const PAN_SPEED: f32 = 0.001;
/// Keeps the polar angle off the poles where the basis degenerates
const POLE_EPSILON: f32 = 1e-6;

/// Position relative to the target in spherical form (three.js convention:
/// `theta` around +Y from +Z, `phi` down from +Y)
#[derive(Debug, Clone, Copy, PartialEq)]
struct Spherical {
    radius: f32,
    theta: f32,
    phi: f32,
}

impl Spherical {
    fn from_offset(v: Vec3) -> Self {
        let radius = v.length();
        if radius == 0.0 {
            return Self {
                radius,
                theta: 0.0,
                phi: 0.0,
            };
        }
        Self {
            radius,
            theta: v.x.atan2(v.z),
            phi: (v.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> Vec3 {
        let s = self.phi.sin() * self.radius;
        Vec3::new(s * self.theta.sin(), self.phi.cos() * self.radius, s * self.theta.cos())
    }
}

pub struct OrbitControls {
    pub target: Vec3,
    settings: ControlsSettings,
    delta_theta: f32,
    delta_phi: f32,
    /// Multiplicative zoom queued for the next update
    scale: f32,
    /// Pending pan in pixels
    pan: [f32; 2],
}

impl OrbitControls {
    pub fn new(settings: &ControlsSettings) -> Self {
        Self {
            target: Vec3::new(0.0, settings.target_height, 0.0),
            settings: settings.clone(),
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
            pan: [0.0, 0.0],
        }
    }

    pub fn settings(&self) -> &ControlsSettings {
        &self.settings
    }

    /// Orbit by a pointer drag in pixels
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.delta_theta -= dx * ROTATE_SPEED;
        self.delta_phi -= dy * ROTATE_SPEED;
    }

    /// Positive `delta` moves the camera closer
    pub fn zoom(&mut self, delta: f32) {
        self.scale *= (1.0 - delta).max(0.05);
    }

    /// Slide camera and target together by a pointer drag in pixels
    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.pan[0] += dx;
        self.pan[1] += dy;
    }

    /// True while queued motion has not yet decayed
    pub fn is_moving(&self) -> bool {
        self.delta_theta.abs() > 1e-5
            || self.delta_phi.abs() > 1e-5
            || self.pan[0].abs() > 1e-3
            || self.pan[1].abs() > 1e-3
    }

    /// Apply queued motion and constraints to the camera
    pub fn update(&mut self, camera: &mut PerspectiveCamera) {
        let factor = if self.settings.damping {
            self.settings.damping_factor
        } else {
            1.0
        };

        let mut s = Spherical::from_offset(camera.position - self.target);
        s.theta += self.delta_theta * factor;
        s.phi += self.delta_phi * factor;

        let min_phi = self.settings.min_polar_angle.max(POLE_EPSILON);
        let max_phi = self.settings.max_polar_angle.min(std::f32::consts::PI - POLE_EPSILON);
        s.phi = s.phi.clamp(min_phi, max_phi.max(min_phi));
        s.radius = (s.radius * self.scale).clamp(self.settings.min_distance, self.settings.max_distance);

        let pan_scale = s.radius * PAN_SPEED * factor;
        let shift = camera.right() * (-self.pan[0] * pan_scale) + camera.up() * (self.pan[1] * pan_scale);
        self.target += shift;

        camera.position = self.target + s.to_offset();
        camera.look_at(self.target);

        self.scale = 1.0;
        if self.settings.damping {
            let keep = 1.0 - factor;
            self.delta_theta *= keep;
            self.delta_phi *= keep;
            self.pan = [self.pan[0] * keep, self.pan[1] * keep];
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
            self.pan = [0.0, 0.0];
        }
    }

    /// Swing the camera a quarter turn about +Y around the target
    pub fn rotate90(&mut self, camera: &mut PerspectiveCamera) {
        let offset = camera.position - self.target;
        camera.position = self.target + Quat::from_rotation_y(FRAC_PI_2) * offset;
        self.update(camera);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::settings::CameraSettings;
    use approx::assert_relative_eq;

    fn setup() -> (OrbitControls, PerspectiveCamera) {
        let controls = OrbitControls::new(&ControlsSettings::default());
        let camera = PerspectiveCamera::from_settings(&CameraSettings::default(), 1.0);
        (controls, camera)
    }

    #[test]
    fn test_rotate90_quarter_turn() {
        let (mut controls, mut camera) = setup();
        controls.target = Vec3::ZERO;
        camera.position = Vec3::new(0.0, 100.0, 500.0);
        controls.rotate90(&mut camera);
        assert_relative_eq!(camera.position.x, 500.0, epsilon = 1e-2);
        assert_relative_eq!(camera.position.y, 100.0, epsilon = 1e-2);
        assert_relative_eq!(camera.position.z, 0.0, epsilon = 1e-2);
        assert_eq!(camera.target, Vec3::ZERO);
    }

    #[test]
    fn test_four_quarter_turns_return_home() {
        let (mut controls, mut camera) = setup();
        controls.update(&mut camera);
        let start = camera.position;
        for _ in 0..4 {
            controls.rotate90(&mut camera);
        }
        assert_relative_eq!(camera.position.distance(start), 0.0, epsilon = 1e-2);
    }

    #[test]
    fn test_distance_is_clamped() {
        let (mut controls, mut camera) = setup();
        controls.zoom(0.99);
        controls.update(&mut camera);
        assert_relative_eq!(camera.position.distance(controls.target), 200.0, epsilon = 1e-2);

        for _ in 0..20 {
            controls.zoom(-1.0);
        }
        controls.update(&mut camera);
        assert_relative_eq!(camera.position.distance(controls.target), 3000.0, epsilon = 1e-1);
    }

    #[test]
    fn test_damping_spreads_rotation_over_frames() {
        let (mut controls, mut camera) = setup();
        controls.update(&mut camera);
        let before = camera.position;
        controls.rotate(100.0, 0.0);
        controls.update(&mut camera);
        let first_step = camera.position.distance(before);
        assert!(first_step > 0.0);
        assert!(controls.is_moving());

        let mid = camera.position;
        controls.update(&mut camera);
        let second_step = camera.position.distance(mid);
        assert!(second_step < first_step);
    }

    #[test]
    fn test_polar_angle_stays_above_ground_pole() {
        let (mut controls, mut camera) = setup();
        controls.rotate(0.0, 1.0e6);
        for _ in 0..10 {
            controls.update(&mut camera);
        }
        assert!(camera.position.is_finite());
        assert!(camera.position.distance(controls.target) >= 199.9);
    }

    #[test]
    fn test_initial_target_height() {
        let (controls, _) = setup();
        assert_eq!(controls.target, Vec3::new(0.0, 125.0, 0.0));
    }
}
