//! Pure derivation of 3D scene geometry from a 2D layout.
//!
//! Sketch coordinates map onto the ground plane as `x -> x`, `y -> z`. The
//! layout's bounding box is recentered on the world origin.

use serde::{Deserialize, Serialize};
use shared::FloorplanLayout;

use crate::state::settings::SceneSettings;

/// Placement of one wall on the ground plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallGeometry {
    /// Centerline length
    pub length: f64,
    /// Midpoint `[x, z]` relative to the layout center
    pub center: [f64; 2],
    /// Rotation about +Y that aligns the local X axis with the wall
    pub rotation_y: f64,
}

impl WallGeometry {
    fn from_segment(points: [f64; 4], origin: [f64; 2]) -> Self {
        let [x1, z1, x2, z2] = points;
        let (dx, dz) = (x2 - x1, z2 - z1);
        Self {
            length: dx.hypot(dz),
            center: [(x1 + x2) / 2.0 - origin[0], (z1 + z2) / 2.0 - origin[1]],
            rotation_y: -dz.atan2(dx),
        }
    }
}

/// Axis-aligned floor rectangle in world space.
///
/// Consumed by the furniture placement collaborator to keep items on the floor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_z: f64,
    pub max_z: f64,
}

impl FloorBounds {
    /// Rectangle of `width × depth` centered on the origin
    pub fn centered(width: f64, depth: f64) -> Self {
        Self {
            min_x: -width / 2.0,
            max_x: width / 2.0,
            min_z: -depth / 2.0,
            max_z: depth / 2.0,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn depth(&self) -> f64 {
        self.max_z - self.min_z
    }

    pub fn contains(&self, x: f64, z: f64) -> bool {
        (self.min_x..=self.max_x).contains(&x) && (self.min_z..=self.max_z).contains(&z)
    }

    /// Nearest point on the floor
    pub fn clamp(&self, x: f64, z: f64) -> (f64, f64) {
        (x.clamp(self.min_x, self.max_x), z.clamp(self.min_z, self.max_z))
    }
}

/// Everything the 3D view needs to know about a layout
#[derive(Debug, Clone, PartialEq)]
pub struct SceneGeometry {
    pub walls: Vec<WallGeometry>,
    /// Floor `[width, depth]`, centered on the origin
    pub floor_size: [f64; 2],
    pub bounds: FloorBounds,
    /// True when the layout was empty and a default room was substituted
    pub is_fallback: bool,
}

/// Derive walls, floor and bounds from a layout.
///
/// Total: an empty layout yields a square room of `fallback_room_size`, and
/// degenerate layouts yield zero-area floors.
pub fn build_scene(layout: &FloorplanLayout, settings: &SceneSettings) -> SceneGeometry {
    if layout.is_empty() {
        return fallback_room(settings.fallback_room_size);
    }

    let mut min = [f64::INFINITY; 2];
    let mut max = [f64::NEG_INFINITY; 2];
    for wall in &layout.walls {
        let [x1, y1, x2, y2] = wall.points;
        min[0] = min[0].min(x1).min(x2);
        max[0] = max[0].max(x1).max(x2);
        min[1] = min[1].min(y1).min(y2);
        max[1] = max[1].max(y1).max(y2);
    }
    let center = [(min[0] + max[0]) / 2.0, (min[1] + max[1]) / 2.0];

    let walls = layout
        .walls
        .iter()
        .map(|w| WallGeometry::from_segment(w.points, center))
        .collect();

    let width = max[0] - min[0];
    let depth = max[1] - min[1];
    SceneGeometry {
        walls,
        floor_size: [width, depth],
        bounds: FloorBounds::centered(width, depth),
        is_fallback: false,
    }
}

fn fallback_room(size: f64) -> SceneGeometry {
    let half = size / 2.0;
    let quarter = std::f64::consts::FRAC_PI_2;
    let wall = |center: [f64; 2], rotation_y: f64| WallGeometry {
        length: size,
        center,
        rotation_y,
    };
    SceneGeometry {
        walls: vec![
            wall([0.0, -half], 0.0),
            wall([0.0, half], 0.0),
            wall([-half, 0.0], quarter),
            wall([half, 0.0], quarter),
        ],
        floor_size: [size, size],
        bounds: FloorBounds::centered(size, size),
        is_fallback: true,
    }
}
