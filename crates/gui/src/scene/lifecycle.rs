//! Mount and teardown of the 3D scene.
//!
//! `SceneLifecycle` owns every render resource of the viewer. At most one
//! scene is active at a time; mounting again tears the previous one down
//! first, and unmounting twice is harmless.

use shared::FloorplanLayout;
use thiserror::Error;
use uuid::Uuid;

use super::backend::{BackendError, FrameParams, RenderBackend, SurfaceSize};
use super::builder::{build_scene, FloorBounds, SceneGeometry};
use super::camera::PerspectiveCamera;
use super::controls::OrbitControls;
use super::mesh::{build_meshes, Lighting};
use crate::state::settings::SceneSettings;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("could not create the 3D render surface: {0}")]
    Surface(#[source] BackendError),
    #[error("could not upload {what} to the GPU: {source}")]
    MeshUpload {
        what: String,
        #[source]
        source: BackendError,
    },
}

/// Observable lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Active,
    Disposed,
}

/// Result of one frame-loop step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A frame was rendered; schedule the next one
    Continue,
    /// Nothing is mounted; stop scheduling
    Idle,
}

/// Summary of a successful mount
#[derive(Debug, Clone, PartialEq)]
pub struct SceneInfo {
    pub id: Uuid,
    pub wall_count: usize,
    pub bounds: FloorBounds,
    pub is_fallback: bool,
}

/// Resources of one mounted scene
struct ActiveScene<M> {
    id: Uuid,
    camera: PerspectiveCamera,
    controls: OrbitControls,
    geometry: SceneGeometry,
    meshes: Vec<M>,
    lighting: Lighting,
    background: [f32; 3],
    size: SurfaceSize,
    loop_running: bool,
    resize_subscribed: bool,
    frames: u64,
}

enum Stage<M> {
    Uninitialized,
    Active(Box<ActiveScene<M>>),
    Disposed,
}

pub struct SceneLifecycle<B: RenderBackend> {
    backend: B,
    settings: SceneSettings,
    stage: Stage<B::Mesh>,
}

impl<B: RenderBackend> SceneLifecycle<B> {
    pub fn new(backend: B, settings: SceneSettings) -> Self {
        Self {
            backend,
            settings,
            stage: Stage::Uninitialized,
        }
    }

    pub fn state(&self) -> LifecycleState {
        match self.stage {
            Stage::Uninitialized => LifecycleState::Uninitialized,
            Stage::Active(_) => LifecycleState::Active,
            Stage::Disposed => LifecycleState::Disposed,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.stage, Stage::Active(_))
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn settings(&self) -> &SceneSettings {
        &self.settings
    }

    /// Settings take effect on the next mount
    pub fn set_settings(&mut self, settings: SceneSettings) {
        self.settings = settings;
    }

    fn active(&self) -> Option<&ActiveScene<B::Mesh>> {
        match &self.stage {
            Stage::Active(scene) => Some(scene.as_ref()),
            _ => None,
        }
    }

    fn active_mut(&mut self) -> Option<&mut ActiveScene<B::Mesh>> {
        match &mut self.stage {
            Stage::Active(scene) => Some(scene.as_mut()),
            _ => None,
        }
    }

    pub fn floor_bounds(&self) -> Option<FloorBounds> {
        self.active().map(|s| s.geometry.bounds)
    }

    pub fn camera(&self) -> Option<&PerspectiveCamera> {
        self.active().map(|s| &s.camera)
    }

    /// Controls together with the camera they drive
    pub fn controls_mut(&mut self) -> Option<(&mut OrbitControls, &mut PerspectiveCamera)> {
        self.active_mut().map(|s| (&mut s.controls, &mut s.camera))
    }

    /// Id of the mounted scene
    pub fn scene_id(&self) -> Option<Uuid> {
        self.active().map(|s| s.id)
    }

    /// Frames rendered by the mounted scene
    pub fn frame_count(&self) -> u64 {
        self.active().map_or(0, |s| s.frames)
    }

    /// Build and upload a scene for `layout`, replacing any mounted one
    pub fn mount(&mut self, host: SurfaceSize, layout: &FloorplanLayout) -> Result<SceneInfo, SceneError> {
        if self.is_active() {
            tracing::info!("remounting: tearing down the previous scene");
            self.teardown();
        }

        let id = Uuid::new_v4();
        let mut camera = PerspectiveCamera::from_settings(&self.settings.camera, host.aspect());

        if let Err(e) = self.backend.create_surface(host) {
            tracing::error!(%id, "surface creation failed: {e}");
            self.stage = Stage::Disposed;
            return Err(SceneError::Surface(e));
        }
        self.backend.attach_surface();

        let geometry = build_scene(layout, &self.settings);
        let meshes = build_meshes(&geometry, &self.settings);

        let mut uploaded = Vec::with_capacity(meshes.len());
        for (i, mesh) in meshes.iter().enumerate() {
            match self.backend.upload_mesh(mesh) {
                Ok(handle) => uploaded.push(handle),
                Err(source) => {
                    let what = if i < meshes.walls.len() {
                        format!("wall {i}")
                    } else {
                        "the floor".to_string()
                    };
                    tracing::error!(%id, "{what} upload failed: {source}");
                    for handle in uploaded {
                        self.backend.release_mesh(handle);
                    }
                    self.backend.detach_surface();
                    self.backend.destroy_surface();
                    self.stage = Stage::Disposed;
                    return Err(SceneError::MeshUpload { what, source });
                }
            }
        }

        let mut controls = OrbitControls::new(&self.settings.controls);
        controls.update(&mut camera);

        let info = SceneInfo {
            id,
            wall_count: geometry.walls.len(),
            bounds: geometry.bounds,
            is_fallback: geometry.is_fallback,
        };
        tracing::info!(
            %id,
            walls = info.wall_count,
            fallback = info.is_fallback,
            width = host.width,
            height = host.height,
            "scene mounted"
        );

        self.stage = Stage::Active(Box::new(ActiveScene {
            id,
            camera,
            controls,
            geometry,
            meshes: uploaded,
            lighting: meshes.lighting,
            background: meshes.background,
            size: host,
            loop_running: true,
            resize_subscribed: true,
            frames: 0,
        }));
        Ok(info)
    }

    /// Release everything; no-op when nothing is mounted
    pub fn unmount(&mut self) {
        if self.is_active() {
            self.teardown();
        }
    }

    fn teardown(&mut self) {
        let Stage::Active(mut scene) = std::mem::replace(&mut self.stage, Stage::Disposed) else {
            return;
        };
        scene.loop_running = false;
        let released = scene.meshes.len();
        for handle in scene.meshes.drain(..) {
            self.backend.release_mesh(handle);
        }
        self.backend.detach_surface();
        self.backend.destroy_surface();
        scene.resize_subscribed = false;
        tracing::info!(id = %scene.id, meshes = released, frames = scene.frames, "scene disposed");
    }

    /// Advance one frame: update controls, render once
    pub fn tick(&mut self) -> TickOutcome {
        let Stage::Active(scene) = &mut self.stage else {
            return TickOutcome::Idle;
        };
        if !scene.loop_running {
            return TickOutcome::Idle;
        }
        scene.controls.update(&mut scene.camera);
        let frame = FrameParams {
            view_projection: scene.camera.view_projection(),
            camera_position: scene.camera.position,
            lighting: scene.lighting,
            background: scene.background,
            size: scene.size,
        };
        self.backend.render(&frame, &scene.meshes);
        scene.frames += 1;
        TickOutcome::Continue
    }

    /// Follow a host resize; ignored while unmounted
    pub fn resize(&mut self, host: SurfaceSize) {
        let Stage::Active(scene) = &mut self.stage else {
            tracing::trace!("resize ignored: no scene mounted");
            return;
        };
        if !scene.resize_subscribed || scene.size == host {
            return;
        }
        scene.size = host;
        scene.camera.set_aspect(host.aspect());
        self.backend.resize_surface(host);
        tracing::debug!(width = host.width, height = host.height, "scene resized");
    }
}

impl<B: RenderBackend> Drop for SceneLifecycle<B> {
    fn drop(&mut self) {
        self.unmount();
    }
}
