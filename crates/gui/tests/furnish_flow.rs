//! End-to-end: draw walls, open the 3D view, look around, go back.

use approx::assert_relative_eq;
use floorplan_gui_lib::harness::TestHarness;
use floorplan_gui_lib::scene::mesh::rgb;
use floorplan_gui_lib::state::Screen;
use shared::{LayoutPayload, Units};

#[test]
fn test_sketch_to_3d_and_back() {
    let mut h = TestHarness::new();
    h.draw_wall([100.0, 100.0], [500.0, 100.0]);
    h.draw_wall([500.0, 100.0], [500.0, 400.0]);
    assert_eq!(h.wall_count(), 2);

    let info = h.furnish().unwrap();
    assert!(h.state.screen.is_furnish());
    assert_eq!(info.wall_count, 2);
    assert!(!info.is_fallback);
    assert_relative_eq!(info.bounds.width(), 400.0);
    assert_relative_eq!(info.bounds.depth(), 300.0);
    assert_eq!(h.run_frames(10), 10);

    h.back();
    assert!(matches!(h.state.screen, Screen::Sketch));
    assert!(h.backend().is_clean());
    // The drawing survives the round trip untouched
    assert_eq!(h.wall_count(), 2);
    assert_eq!(h.state.sketch.walls()[0].points, [100.0, 100.0, 500.0, 100.0]);
}

#[test]
fn test_furnish_with_empty_drawing_shows_fallback_room() {
    let mut h = TestHarness::new();
    let info = h.furnish().unwrap();
    assert!(info.is_fallback);
    assert_eq!(info.wall_count, 4);
    assert_relative_eq!(info.bounds.width(), 1000.0);
    assert_eq!(h.backend().live_meshes(), 5);
    assert!(h.state.notices.is_empty());
}

#[test]
fn test_layout_is_a_snapshot() {
    let mut h = TestHarness::new();
    h.draw_wall([100.0, 100.0], [300.0, 100.0]);
    h.furnish().unwrap();

    let Screen::Furnish { layout } = &h.state.screen else {
        panic!("expected the furnish screen");
    };
    let handed_over = layout.clone();

    // Editing the sketch afterwards does not reach the mounted layout
    h.state.sketch.clear();
    let Screen::Furnish { layout } = &h.state.screen else {
        panic!("expected the furnish screen");
    };
    assert_eq!(*layout, handed_over);
    assert_eq!(layout.walls.len(), 1);
}

#[test]
fn test_frame_carries_scene_settings() {
    let mut h = TestHarness::new();
    h.furnish().unwrap();
    h.run_frames(1);

    let settings = h.scene.settings().clone();
    let frame = h.backend().last_frame().unwrap();
    assert_eq!(frame.background, rgb(settings.background_color));
    assert_relative_eq!(frame.lighting.ambient, settings.ambient_intensity);
    assert_relative_eq!(frame.lighting.directional, settings.directional_intensity);
    assert_eq!(frame.size, h.host);
}

#[test]
fn test_rotate90_keeps_orbit_distance() {
    let mut h = TestHarness::new();
    h.furnish().unwrap();
    h.run_frames(1);

    let (target, before) = {
        let (controls, camera) = h.scene.controls_mut().unwrap();
        (controls.target, camera.position)
    };
    {
        let (controls, camera) = h.scene.controls_mut().unwrap();
        controls.rotate90(camera);
    }
    let after = h.scene.camera().unwrap().position;

    let (old, new) = (before - target, after - target);
    assert_relative_eq!(new.length(), old.length(), epsilon = 1e-2);
    assert_relative_eq!(new.y, old.y, epsilon = 1e-2);
    assert_relative_eq!(new.x, old.z, epsilon = 1e-2);
    assert_relative_eq!(new.z, -old.x, epsilon = 1e-2);
}

#[test]
fn test_drag_orbit_moves_camera_over_frames() {
    let mut h = TestHarness::new();
    h.furnish().unwrap();
    h.run_frames(1);
    let start = h.scene.camera().unwrap().position;

    if let Some((controls, _)) = h.scene.controls_mut() {
        controls.rotate(120.0, 0.0);
    }
    h.run_frames(30);
    let end = h.scene.camera().unwrap().position;
    assert!(end.distance(start) > 1.0);
}

#[test]
fn test_layout_json_drives_the_viewer() {
    let json = r#"{ "layout": [
        { "points": [0, 0, 600, 0], "thickness": 4 },
        { "points": [600, 0, 600, 400], "thickness": 4 }
    ] }"#;
    let layout = LayoutPayload::from_json(json).unwrap().into_layout();
    assert_eq!(layout.units, Units::Feet);

    let mut h = TestHarness::new();
    h.state.sketch.load_layout(layout);
    let info = h.furnish().unwrap();
    assert_eq!(info.wall_count, 2);
    assert!(info.bounds.contains(0.0, 0.0));
    assert_relative_eq!(info.bounds.width(), 600.0);
}

#[test]
fn test_back_then_furnish_again() {
    let mut h = TestHarness::new();
    h.draw_wall([100.0, 100.0], [300.0, 100.0]);
    let first = h.furnish().unwrap();
    h.back();
    h.draw_wall([300.0, 100.0], [300.0, 300.0]);
    let second = h.furnish().unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(second.wall_count, 2);
    assert_eq!(h.backend().live_surfaces(), 1);
    assert_eq!(h.backend().bad_releases(), 0);
}
