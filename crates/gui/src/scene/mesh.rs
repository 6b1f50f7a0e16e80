use glam::{Mat4, Quat, Vec3};

use super::builder::SceneGeometry;
use crate::state::settings::SceneSettings;

/// Floats per interleaved vertex: position(3) + normal(3) + color(3)
pub const VERTEX_STRIDE: usize = 9;

/// CPU-side mesh data: interleaved [pos.x, pos.y, pos.z, norm.x, norm.y, norm.z, r, g, b]
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / VERTEX_STRIDE
    }

    pub fn position(&self, i: usize) -> Vec3 {
        let b = i * VERTEX_STRIDE;
        Vec3::new(self.vertices[b], self.vertices[b + 1], self.vertices[b + 2])
    }

    /// Apply an affine transform to positions and normals in place
    pub fn transform(&mut self, m: &Mat4) {
        for v in self.vertices.chunks_exact_mut(VERTEX_STRIDE) {
            let p = m.transform_point3(Vec3::new(v[0], v[1], v[2]));
            let n = m
                .transform_vector3(Vec3::new(v[3], v[4], v[5]))
                .normalize_or_zero();
            v[..6].copy_from_slice(&[p.x, p.y, p.z, n.x, n.y, n.z]);
        }
    }

    /// Axis-aligned bounds `(min, max)`; `None` for an empty mesh
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        (0..self.vertex_count()).map(|i| self.position(i)).fold(None, |acc, p| match acc {
            None => Some((p, p)),
            Some((lo, hi)) => Some((lo.min(p), hi.max(p))),
        })
    }
}

/// Ambient plus one directional light, both white
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    pub ambient: f32,
    pub directional: f32,
    pub directional_position: Vec3,
}

impl Lighting {
    pub fn from_settings(settings: &SceneSettings) -> Self {
        Self {
            ambient: settings.ambient_intensity,
            directional: settings.directional_intensity,
            directional_position: Vec3::from_array(settings.directional_position),
        }
    }

    /// Unit vector pointing from the origin towards the light
    pub fn direction(&self) -> Vec3 {
        self.directional_position.normalize_or_zero()
    }
}

/// Meshes and lights for one mounted scene
#[derive(Debug, Clone)]
pub struct SceneMeshes {
    pub walls: Vec<MeshData>,
    pub floor: MeshData,
    pub lighting: Lighting,
    pub background: [f32; 3],
}

impl SceneMeshes {
    /// Walls first, floor last
    pub fn iter(&self) -> impl Iterator<Item = &MeshData> {
        self.walls.iter().chain(std::iter::once(&self.floor))
    }

    pub fn len(&self) -> usize {
        self.walls.len() + 1
    }
}

pub fn rgb(c: [u8; 3]) -> [f32; 3] {
    [c[0] as f32 / 255.0, c[1] as f32 / 255.0, c[2] as f32 / 255.0]
}

/// Turn derived geometry into renderable meshes.
///
/// Each wall is a `length × wall_height × wall_thickness` box standing on the
/// floor; the floor is a single quad at `y = 0`.
pub fn build_meshes(geometry: &SceneGeometry, settings: &SceneSettings) -> SceneMeshes {
    let wall_color = rgb(settings.wall_color);
    let walls = geometry
        .walls
        .iter()
        .map(|w| {
            let mut mesh = cube(w.length as f32, settings.wall_height, settings.wall_thickness, wall_color);
            let placement = Mat4::from_rotation_translation(
                Quat::from_rotation_y(w.rotation_y as f32),
                Vec3::new(w.center[0] as f32, settings.wall_height / 2.0, w.center[1] as f32),
            );
            mesh.transform(&placement);
            mesh
        })
        .collect();

    let [fw, fd] = geometry.floor_size;
    SceneMeshes {
        walls,
        floor: floor_quad(fw as f32, fd as f32, rgb(settings.floor_color)),
        lighting: Lighting::from_settings(settings),
        background: rgb(settings.background_color),
    }
}

pub fn cube(w: f32, h: f32, d: f32, color: [f32; 3]) -> MeshData {
    let hw = w * 0.5;
    let hh = h * 0.5;
    let hd = d * 0.5;

    let faces: [([Vec3; 4], Vec3); 6] = [
        // Front (+Z)
        ([Vec3::new(-hw, -hh, hd), Vec3::new(hw, -hh, hd), Vec3::new(hw, hh, hd), Vec3::new(-hw, hh, hd)], Vec3::Z),
        // Back (-Z)
        ([Vec3::new(hw, -hh, -hd), Vec3::new(-hw, -hh, -hd), Vec3::new(-hw, hh, -hd), Vec3::new(hw, hh, -hd)], Vec3::NEG_Z),
        // Right (+X)
        ([Vec3::new(hw, -hh, hd), Vec3::new(hw, -hh, -hd), Vec3::new(hw, hh, -hd), Vec3::new(hw, hh, hd)], Vec3::X),
        // Left (-X)
        ([Vec3::new(-hw, -hh, -hd), Vec3::new(-hw, -hh, hd), Vec3::new(-hw, hh, hd), Vec3::new(-hw, hh, -hd)], Vec3::NEG_X),
        // Top (+Y)
        ([Vec3::new(-hw, hh, hd), Vec3::new(hw, hh, hd), Vec3::new(hw, hh, -hd), Vec3::new(-hw, hh, -hd)], Vec3::Y),
        // Bottom (-Y)
        ([Vec3::new(-hw, -hh, -hd), Vec3::new(hw, -hh, -hd), Vec3::new(hw, -hh, hd), Vec3::new(-hw, -hh, hd)], Vec3::NEG_Y),
    ];

    let mut vertices = Vec::with_capacity(24 * VERTEX_STRIDE);
    let mut indices = Vec::with_capacity(36);
    for (quad, normal) in &faces {
        push_quad(&mut vertices, &mut indices, quad, *normal, color);
    }
    MeshData { vertices, indices }
}

/// Horizontal quad at `y = 0` facing +Y, centered on the origin
pub fn floor_quad(width: f32, depth: f32, color: [f32; 3]) -> MeshData {
    let (hw, hd) = (width * 0.5, depth * 0.5);
    let quad = [
        Vec3::new(-hw, 0.0, hd),
        Vec3::new(hw, 0.0, hd),
        Vec3::new(hw, 0.0, -hd),
        Vec3::new(-hw, 0.0, -hd),
    ];
    let mut vertices = Vec::with_capacity(4 * VERTEX_STRIDE);
    let mut indices = Vec::with_capacity(6);
    push_quad(&mut vertices, &mut indices, &quad, Vec3::Y, color);
    MeshData { vertices, indices }
}

fn push_quad(vertices: &mut Vec<f32>, indices: &mut Vec<u32>, quad: &[Vec3; 4], n: Vec3, c: [f32; 3]) {
    let base = (vertices.len() / VERTEX_STRIDE) as u32;
    for v in quad {
        vertices.extend_from_slice(&[v.x, v.y, v.z, n.x, n.y, n.z, c[0], c[1], c[2]]);
    }
    indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
}
