//! Application settings

use serde::{Deserialize, Serialize};
use shared::Units;

/// 2D sketch editor settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SketchSettings {
    /// Display units for length labels
    pub units: Units,
    /// Stroke width given to newly drawn walls
    pub tool_size: u32,
    /// Canvas size on startup
    pub canvas_size: [f64; 2],
    /// Smallest canvas the extend operations may produce
    pub min_canvas_size: [f64; 2],
    /// Resize step per pointer move while dragging a canvas edge
    pub drag_extend_step: f64,
    /// Resize step per click on an extend button
    pub button_extend_step: f64,
    /// Extra distance (canvas units) around a wall stroke that still counts as a hit
    pub pick_tolerance: f64,
}

impl Default for SketchSettings {
    fn default() -> Self {
        Self {
            units: Units::Feet,
            tool_size: 3,
            canvas_size: [800.0, 600.0],
            min_canvas_size: [400.0, 300.0],
            drag_extend_step: 20.0,
            button_extend_step: 50.0,
            pick_tolerance: 4.0,
        }
    }
}

/// Smallest accepted extend step and fallback room size
const MIN_POSITIVE: f64 = 1.0;

/// `value` when finite and at least `min`, otherwise `fallback` floored at `min`
fn at_least(value: f64, min: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.max(min)
    } else {
        fallback.max(min)
    }
}

impl SketchSettings {
    fn sanitize(&mut self) {
        let d = Self::default();
        self.drag_extend_step = at_least(self.drag_extend_step, MIN_POSITIVE, d.drag_extend_step);
        self.button_extend_step = at_least(self.button_extend_step, MIN_POSITIVE, d.button_extend_step);
        for i in 0..2 {
            self.min_canvas_size[i] = at_least(self.min_canvas_size[i], MIN_POSITIVE, d.min_canvas_size[i]);
            self.canvas_size[i] = at_least(self.canvas_size[i], self.min_canvas_size[i], d.canvas_size[i]);
        }
        self.pick_tolerance = at_least(self.pick_tolerance, 0.0, d.pick_tolerance);
    }
}

/// Camera placement for a freshly mounted scene
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Vertical field of view (degrees)
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near: 1.0,
            far: 10_000.0,
            position: [-500.0, 750.0, 1000.0],
        }
    }
}

/// Orbit controls tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    pub damping: bool,
    pub damping_factor: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Polar angle range (radians from +Y)
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    /// Height of the orbit target above the floor
    pub target_height: f32,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            damping: true,
            damping_factor: 0.1,
            min_distance: 200.0,
            max_distance: 3000.0,
            min_polar_angle: 0.0,
            max_polar_angle: std::f32::consts::PI,
            target_height: 125.0,
        }
    }
}

impl ControlsSettings {
    /// Restore ordered, finite ranges so `f32::clamp` never sees `min > max`
    fn sanitize(&mut self) {
        let d = Self::default();
        if !(self.min_distance.is_finite() && self.max_distance.is_finite()) {
            self.min_distance = d.min_distance;
            self.max_distance = d.max_distance;
        }
        self.min_distance = self.min_distance.max(0.0);
        self.max_distance = self.max_distance.max(0.0);
        if self.min_distance > self.max_distance {
            std::mem::swap(&mut self.min_distance, &mut self.max_distance);
        }

        if !(self.min_polar_angle.is_finite() && self.max_polar_angle.is_finite()) {
            self.min_polar_angle = d.min_polar_angle;
            self.max_polar_angle = d.max_polar_angle;
        }
        if self.min_polar_angle > self.max_polar_angle {
            std::mem::swap(&mut self.min_polar_angle, &mut self.max_polar_angle);
        }

        self.damping_factor = if self.damping_factor.is_finite() {
            self.damping_factor.clamp(0.01, 1.0)
        } else {
            d.damping_factor
        };
    }
}

/// 3D scene derivation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    pub wall_height: f32,
    pub wall_thickness: f32,
    /// Side length of the square room used when the layout is empty
    pub fallback_room_size: f64,
    pub wall_color: [u8; 3],
    pub floor_color: [u8; 3],
    pub background_color: [u8; 3],
    pub ambient_intensity: f32,
    pub directional_intensity: f32,
    pub directional_position: [f32; 3],
    pub camera: CameraSettings,
    pub controls: ControlsSettings,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            wall_height: 250.0,
            wall_thickness: 10.0,
            fallback_room_size: 1000.0,
            wall_color: [0x15, 0x65, 0xC0],
            floor_color: [0xF5, 0xF5, 0xF5],
            background_color: [0xFF, 0xFF, 0xFF],
            ambient_intensity: 0.6,
            directional_intensity: 0.8,
            directional_position: [500.0, 1000.0, 500.0],
            camera: CameraSettings::default(),
            controls: ControlsSettings::default(),
        }
    }
}

impl SceneSettings {
    fn sanitize(&mut self) {
        self.fallback_room_size = at_least(self.fallback_room_size, MIN_POSITIVE, Self::default().fallback_room_size);
        self.controls.sanitize();
    }
}

/// UI settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// Font size in points
    pub font_size: f32,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self { font_size: 14.0 }
    }
}

/// All application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub sketch: SketchSettings,
    pub scene: SceneSettings,
    pub ui: UiSettings,
}

impl AppSettings {
    /// Load settings from file, or return default if not found
    pub fn load() -> Self {
        if let Some(dirs) = directories::ProjectDirs::from("com", "decora", "floorplan") {
            let config_path = dirs.config_dir().join("settings.json");
            if let Ok(json) = std::fs::read_to_string(&config_path) {
                match serde_json::from_str::<Self>(&json) {
                    Ok(settings) => return settings.sanitized(),
                    Err(e) => tracing::warn!("Ignoring unreadable {}: {e}", config_path.display()),
                }
            }
        }
        Self::default()
    }

    /// Repair values a hand-edited file may carry that the app cannot run with
    pub fn sanitized(mut self) -> Self {
        self.sketch.sanitize();
        self.scene.sanitize();
        self
    }

    /// Save settings to file
    pub fn save(&self) {
        if let Some(dirs) = directories::ProjectDirs::from("com", "decora", "floorplan") {
            let config_dir = dirs.config_dir();
            if std::fs::create_dir_all(config_dir).is_ok() {
                let config_path = config_dir.join("settings.json");
                if let Ok(json) = serde_json::to_string_pretty(self) {
                    if let Err(e) = std::fs::write(&config_path, json) {
                        tracing::warn!("Failed to write {}: {e}", config_path.display());
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_fills_defaults() {
        let json = r#"{"sketch":{"units":"meters"},"scene":{"wall_height":300.0}}"#;
        let s: AppSettings = serde_json::from_str(json).unwrap();
        assert_eq!(s.sketch.units, Units::Meters);
        assert_eq!(s.sketch.tool_size, 3);
        assert_eq!(s.sketch.button_extend_step, 50.0);
        assert_eq!(s.scene.wall_height, 300.0);
        assert_eq!(s.scene.controls.max_distance, 3000.0);
    }

    #[test]
    fn test_sanitize_orders_distance_range() {
        let json = r#"{"scene":{"controls":{"min_distance":5000.0,"max_distance":100.0}}}"#;
        let s = serde_json::from_str::<AppSettings>(json).unwrap().sanitized();
        assert_eq!(s.scene.controls.min_distance, 100.0);
        assert_eq!(s.scene.controls.max_distance, 5000.0);

        // The repaired range drives the orbit clamp without panicking
        let mut camera = crate::scene::camera::PerspectiveCamera::from_settings(&s.scene.camera, 1.0);
        let mut controls = crate::scene::controls::OrbitControls::new(&s.scene.controls);
        controls.update(&mut camera);
        let distance = (camera.position - controls.target).length();
        assert!((100.0..=5000.0).contains(&distance));
    }

    #[test]
    fn test_sanitize_floors_sizes_and_steps() {
        let json = r#"{
            "sketch":{"drag_extend_step":-20.0,"button_extend_step":0.0},
            "scene":{"fallback_room_size":-5.0,"controls":{"damping_factor":7.0}}
        }"#;
        let s = serde_json::from_str::<AppSettings>(json).unwrap().sanitized();
        assert!(s.sketch.drag_extend_step > 0.0);
        assert!(s.sketch.button_extend_step > 0.0);
        assert!(s.scene.fallback_room_size > 0.0);
        assert_eq!(s.scene.controls.damping_factor, 1.0);

        let scene = crate::scene::build_scene(&shared::FloorplanLayout::default(), &s.scene);
        assert!(scene.floor_size[0] > 0.0 && scene.floor_size[1] > 0.0);
    }

    #[test]
    fn test_sanitize_keeps_valid_settings() {
        let s = AppSettings::default().sanitized();
        assert_eq!(s.scene.controls.min_distance, 200.0);
        assert_eq!(s.scene.fallback_room_size, 1000.0);
        assert_eq!(s.sketch.canvas_size, [800.0, 600.0]);
    }

    #[test]
    fn test_extend_steps_stay_distinct() {
        let s = SketchSettings::default();
        assert_eq!(s.drag_extend_step, 20.0);
        assert_eq!(s.button_extend_step, 50.0);
    }
}
