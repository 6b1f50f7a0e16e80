//! 3D viewer: geometry derivation, meshes, camera, orbit controls and the
//! mount/teardown lifecycle that owns render resources.

pub mod backend;
pub mod builder;
pub mod camera;
pub mod controls;
pub mod lifecycle;
pub mod mesh;

pub use backend::{BackendError, FrameParams, RenderBackend, SurfaceSize};
pub use builder::{build_scene, FloorBounds, SceneGeometry, WallGeometry};
pub use lifecycle::{LifecycleState, SceneError, SceneInfo, SceneLifecycle, TickOutcome};
pub use mesh::{build_meshes, MeshData, SceneMeshes};
