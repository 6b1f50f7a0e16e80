//! Headless test harness for the sketch → 3D flow.
//!
//! `RecordingBackend` stands in for the GPU: it hands out opaque mesh handles,
//! counts live resources and logs every call so tests can check teardown
//! order. `TestHarness` drives the same state transitions as the app.

use std::collections::HashSet;

use shared::FloorplanLayout;

use crate::scene::backend::{BackendError, FrameParams, RenderBackend, SurfaceSize};
use crate::scene::lifecycle::{SceneError, SceneInfo, SceneLifecycle, TickOutcome};
use crate::scene::mesh::MeshData;
use crate::state::sketch::PointerEvent;
use crate::state::{AppSettings, AppState};

/// One call into the backend, in order of arrival
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    CreateSurface(SurfaceSize),
    Attach,
    Detach,
    DestroySurface,
    Resize(SurfaceSize),
    Upload(u64),
    Release(u64),
    Render { meshes: usize },
}

/// Handle to a recorded mesh; deliberately not `Clone`
#[derive(Debug, PartialEq, Eq)]
pub struct RecordedMesh {
    pub id: u64,
    pub vertex_count: usize,
}

#[derive(Debug, Default)]
pub struct RecordingBackend {
    events: Vec<BackendEvent>,
    live_surfaces: usize,
    attached: usize,
    live_meshes: HashSet<u64>,
    next_mesh: u64,
    renders: usize,
    /// Releases of handles that were not live
    bad_releases: usize,
    fail_surface: bool,
    fail_upload_after: Option<usize>,
    uploads_on_surface: usize,
    last_frame: Option<FrameParams>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `create_surface` call fail
    pub fn fail_surface(mut self) -> Self {
        self.fail_surface = true;
        self
    }

    /// Let `n` uploads per surface succeed, then fail
    pub fn fail_upload_after(mut self, n: usize) -> Self {
        self.fail_upload_after = Some(n);
        self
    }

    /// Stop injecting failures
    pub fn heal(&mut self) {
        self.fail_surface = false;
        self.fail_upload_after = None;
    }

    pub fn events(&self) -> &[BackendEvent] {
        &self.events
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    pub fn live_surfaces(&self) -> usize {
        self.live_surfaces
    }

    pub fn attached_surfaces(&self) -> usize {
        self.attached
    }

    pub fn live_meshes(&self) -> usize {
        self.live_meshes.len()
    }

    pub fn render_count(&self) -> usize {
        self.renders
    }

    pub fn bad_releases(&self) -> usize {
        self.bad_releases
    }

    pub fn last_frame(&self) -> Option<&FrameParams> {
        self.last_frame.as_ref()
    }

    /// True when nothing is allocated
    pub fn is_clean(&self) -> bool {
        self.live_surfaces == 0 && self.attached == 0 && self.live_meshes.is_empty()
    }
}

impl RenderBackend for RecordingBackend {
    type Mesh = RecordedMesh;

    fn create_surface(&mut self, size: SurfaceSize) -> Result<(), BackendError> {
        if self.fail_surface {
            return Err(BackendError::NoContext);
        }
        self.events.push(BackendEvent::CreateSurface(size));
        self.live_surfaces += 1;
        self.uploads_on_surface = 0;
        Ok(())
    }

    fn attach_surface(&mut self) {
        self.events.push(BackendEvent::Attach);
        self.attached += 1;
    }

    fn detach_surface(&mut self) {
        self.events.push(BackendEvent::Detach);
        self.attached = self.attached.saturating_sub(1);
    }

    fn destroy_surface(&mut self) {
        self.events.push(BackendEvent::DestroySurface);
        self.live_surfaces = self.live_surfaces.saturating_sub(1);
    }

    fn resize_surface(&mut self, size: SurfaceSize) {
        self.events.push(BackendEvent::Resize(size));
    }

    fn upload_mesh(&mut self, mesh: &MeshData) -> Result<RecordedMesh, BackendError> {
        if let Some(limit) = self.fail_upload_after {
            if self.uploads_on_surface >= limit {
                return Err(BackendError::Allocation("out of buffer memory".into()));
            }
        }
        let id = self.next_mesh;
        self.next_mesh += 1;
        self.uploads_on_surface += 1;
        self.live_meshes.insert(id);
        self.events.push(BackendEvent::Upload(id));
        Ok(RecordedMesh {
            id,
            vertex_count: mesh.vertex_count(),
        })
    }

    fn release_mesh(&mut self, mesh: RecordedMesh) {
        if !self.live_meshes.remove(&mesh.id) {
            self.bad_releases += 1;
        }
        self.events.push(BackendEvent::Release(mesh.id));
    }

    fn render(&mut self, frame: &FrameParams, meshes: &[RecordedMesh]) {
        self.renders += 1;
        self.last_frame = Some(*frame);
        self.events.push(BackendEvent::Render {
            meshes: meshes.len(),
        });
    }
}

/// App state plus a scene lifecycle on a recording backend
pub struct TestHarness {
    pub state: AppState,
    pub scene: SceneLifecycle<RecordingBackend>,
    pub host: SurfaceSize,
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl TestHarness {
    /// Harness with default settings and a healthy backend
    pub fn new() -> Self {
        Self::with_backend(RecordingBackend::new())
    }

    pub fn with_backend(backend: RecordingBackend) -> Self {
        let settings = AppSettings::default();
        let scene = SceneLifecycle::new(backend, settings.scene.clone());
        Self {
            state: AppState::with_settings(settings),
            scene,
            host: SurfaceSize::new(1200, 800),
        }
    }

    pub fn backend(&self) -> &RecordingBackend {
        self.scene.backend()
    }

    // ── Sketch ────────────────────────────────────────────────

    /// Drag a wall from `from` to `to` in canvas coordinates
    pub fn draw_wall(&mut self, from: [f64; 2], to: [f64; 2]) {
        let sketch = &mut self.state.sketch;
        sketch.handle_pointer(PointerEvent::Down(from));
        sketch.handle_pointer(PointerEvent::Move(to));
        sketch.handle_pointer(PointerEvent::Up);
    }

    pub fn wall_count(&self) -> usize {
        self.state.sketch.walls().len()
    }

    // ── Screens ───────────────────────────────────────────────

    /// Submit the drawing and mount the 3D view, as the toolbar button does
    pub fn furnish(&mut self) -> Result<SceneInfo, SceneError> {
        let layout = self.state.open_furnish();
        self.mount(&layout)
    }

    /// Mount an arbitrary layout on the current screen
    pub fn mount(&mut self, layout: &FloorplanLayout) -> Result<SceneInfo, SceneError> {
        let result = self.scene.mount(self.host, layout);
        if let Err(e) = &result {
            self.state.notices.error(e.to_string());
        }
        result
    }

    /// Leave the 3D view
    pub fn back(&mut self) {
        self.scene.unmount();
        self.state.back_to_sketch();
    }

    /// Run up to `n` frame-loop steps; returns how many rendered
    pub fn run_frames(&mut self, n: usize) -> usize {
        (0..n)
            .take_while(|_| self.scene.tick() == TickOutcome::Continue)
            .count()
    }

    pub fn resize_host(&mut self, width: u32, height: u32) {
        self.host = SurfaceSize::new(width, height);
        self.scene.resize(self.host);
    }
}
