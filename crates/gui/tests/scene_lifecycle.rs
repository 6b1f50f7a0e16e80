//! Lifecycle tests against the recording backend.
//!
//! Every mount must be matched by a full release, whatever path leads out of
//! the 3D view.

use floorplan_gui_lib::harness::{BackendEvent, RecordingBackend, TestHarness};
use floorplan_gui_lib::scene::{LifecycleState, SceneError, SurfaceSize, TickOutcome};
use shared::{FloorplanLayout, Units, WallSegment};

fn square_room(side: f64) -> FloorplanLayout {
    let walls = vec![
        WallSegment::new([0.0, 0.0, side, 0.0], 3.0),
        WallSegment::new([side, 0.0, side, side], 3.0),
        WallSegment::new([side, side, 0.0, side], 3.0),
        WallSegment::new([0.0, side, 0.0, 0.0], 3.0),
    ];
    FloorplanLayout::new(walls, Units::Feet)
}

#[test]
fn test_mount_uploads_walls_and_floor() {
    let mut h = TestHarness::new();
    assert_eq!(h.scene.state(), LifecycleState::Uninitialized);

    let info = h.mount(&square_room(400.0)).unwrap();
    assert_eq!(info.wall_count, 4);
    assert!(!info.is_fallback);
    assert_eq!(h.scene.state(), LifecycleState::Active);
    assert_eq!(h.scene.scene_id(), Some(info.id));

    let backend = h.backend();
    assert_eq!(backend.live_surfaces(), 1);
    assert_eq!(backend.attached_surfaces(), 1);
    assert_eq!(backend.live_meshes(), 5);
    assert_eq!(
        &backend.events()[..2],
        &[BackendEvent::CreateSurface(SurfaceSize::new(1200, 800)), BackendEvent::Attach]
    );
}

#[test]
fn test_second_mount_replaces_first() {
    let mut h = TestHarness::new();
    let first = h.mount(&square_room(400.0)).unwrap();
    let second = h.mount(&square_room(200.0)).unwrap();
    assert_ne!(first.id, second.id);

    let backend = h.backend();
    assert_eq!(backend.live_surfaces(), 1);
    assert_eq!(backend.attached_surfaces(), 1);
    assert_eq!(backend.live_meshes(), 5);
    assert_eq!(backend.bad_releases(), 0);

    // The old surface is gone before the new one is created
    let creates: Vec<usize> = backend
        .events()
        .iter()
        .enumerate()
        .filter(|(_, e)| matches!(e, BackendEvent::CreateSurface(_)))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(creates.len(), 2);
    let destroy = backend
        .events()
        .iter()
        .position(|e| *e == BackendEvent::DestroySurface)
        .unwrap();
    assert!(creates[0] < destroy && destroy < creates[1]);
}

#[test]
fn test_unmount_releases_in_order() {
    let mut h = TestHarness::new();
    h.mount(&square_room(400.0)).unwrap();
    h.run_frames(3);
    h.scene.backend_mut().clear_events();

    h.scene.unmount();

    let events = h.backend().events();
    assert_eq!(events.len(), 7);
    assert!(events[..5].iter().all(|e| matches!(e, BackendEvent::Release(_))));
    assert_eq!(events[5], BackendEvent::Detach);
    assert_eq!(events[6], BackendEvent::DestroySurface);
    assert!(h.backend().is_clean());
    assert_eq!(h.scene.state(), LifecycleState::Disposed);
}

#[test]
fn test_unmount_twice_is_noop() {
    let mut h = TestHarness::new();
    h.mount(&square_room(400.0)).unwrap();
    h.scene.unmount();
    let after_first = h.backend().events().len();

    h.scene.unmount();
    assert_eq!(h.backend().events().len(), after_first);
    assert_eq!(h.backend().bad_releases(), 0);
    assert!(h.backend().is_clean());
}

#[test]
fn test_unmount_before_mount_is_noop() {
    let mut h = TestHarness::new();
    h.scene.unmount();
    assert!(h.backend().events().is_empty());
    assert_eq!(h.scene.state(), LifecycleState::Uninitialized);
}

#[test]
fn test_surface_failure_leaves_nothing_behind() {
    let mut h = TestHarness::with_backend(RecordingBackend::new().fail_surface());
    h.draw_wall([100.0, 100.0], [300.0, 100.0]);

    let err = h.furnish().unwrap_err();
    assert!(matches!(err, SceneError::Surface(_)));
    assert_eq!(h.scene.state(), LifecycleState::Disposed);
    assert!(h.backend().is_clean());
    assert_eq!(h.state.notices.len(), 1);
    assert_eq!(h.run_frames(3), 0);
    assert_eq!(h.backend().render_count(), 0);
}

#[test]
fn test_upload_failure_releases_partial_meshes() {
    let mut h = TestHarness::with_backend(RecordingBackend::new().fail_upload_after(2));

    let err = h.mount(&square_room(400.0)).unwrap_err();
    match err {
        SceneError::MeshUpload { what, .. } => assert_eq!(what, "wall 2"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(h.backend().is_clean());
    assert_eq!(h.backend().bad_releases(), 0);
    assert_eq!(h.scene.state(), LifecycleState::Disposed);
}

#[test]
fn test_floor_upload_failure_is_named() {
    // Four walls succeed, the floor is the fifth upload
    let mut h = TestHarness::with_backend(RecordingBackend::new().fail_upload_after(4));
    let err = h.mount(&square_room(400.0)).unwrap_err();
    assert!(err.to_string().contains("the floor"));
    assert!(h.backend().is_clean());
}

#[test]
fn test_remount_after_healing() {
    let mut h = TestHarness::with_backend(RecordingBackend::new().fail_surface());
    assert!(h.mount(&square_room(400.0)).is_err());

    h.scene.backend_mut().heal();
    h.mount(&square_room(400.0)).unwrap();
    assert!(h.scene.is_active());
    assert_eq!(h.backend().live_meshes(), 5);
}

#[test]
fn test_tick_renders_only_while_mounted() {
    let mut h = TestHarness::new();
    assert_eq!(h.scene.tick(), TickOutcome::Idle);

    h.mount(&square_room(400.0)).unwrap();
    assert_eq!(h.run_frames(5), 5);
    assert_eq!(h.scene.frame_count(), 5);
    assert_eq!(h.backend().render_count(), 5);
    assert_eq!(h.backend().events().last(), Some(&BackendEvent::Render { meshes: 5 }));

    h.scene.unmount();
    assert_eq!(h.scene.tick(), TickOutcome::Idle);
    assert_eq!(h.run_frames(5), 0);
    assert_eq!(h.backend().render_count(), 5);
}

#[test]
fn test_resize_follows_host_only_while_mounted() {
    let mut h = TestHarness::new();
    h.resize_host(640, 480);
    assert!(!h.backend().events().iter().any(|e| matches!(e, BackendEvent::Resize(_))));

    h.mount(&square_room(400.0)).unwrap();
    h.resize_host(800, 600);
    h.resize_host(800, 600);
    let resizes = h
        .backend()
        .events()
        .iter()
        .filter(|e| matches!(e, BackendEvent::Resize(_)))
        .count();
    assert_eq!(resizes, 1);
    let aspect = h.scene.camera().unwrap().aspect;
    assert!((aspect - 800.0 / 600.0).abs() < 1e-6);

    h.scene.unmount();
    h.resize_host(1024, 768);
    let resizes_after = h
        .backend()
        .events()
        .iter()
        .filter(|e| matches!(e, BackendEvent::Resize(_)))
        .count();
    assert_eq!(resizes_after, 1);
}
