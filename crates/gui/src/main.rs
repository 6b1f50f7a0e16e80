mod app;
mod ui;
mod viewport;

// Re-export library modules so that `crate::state`, `crate::scene`, etc.
// resolve to the lib crate types everywhere in the binary.
pub use floorplan_gui_lib::export;
pub use floorplan_gui_lib::scene;
pub use floorplan_gui_lib::sketch;
pub use floorplan_gui_lib::state;

use app::FloorplanApp;
use shared::{FloorplanLayout, LayoutPayload};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "floorplan_gui=info,floorplan_gui_lib=info".into()),
        )
        .init();

    // Parse --layout <path> argument
    let initial_layout = parse_layout_arg();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Decora Floorplan Designer")
            .with_inner_size([1200.0, 900.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        "floorplan-gui",
        native_options,
        Box::new(move |cc| Ok(Box::new(FloorplanApp::new(cc, initial_layout)))),
    ) {
        tracing::error!("Failed to start application: {e}");
    }
}

fn parse_layout_arg() -> Option<FloorplanLayout> {
    let args: Vec<String> = std::env::args().collect();
    let path = args
        .iter()
        .position(|a| a == "--layout")
        .and_then(|i| args.get(i + 1))?;

    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("Failed to read layout file {path}: {e}");
            return None;
        }
    };
    match LayoutPayload::from_json(&json) {
        Ok(payload) => {
            let layout = payload.into_layout();
            tracing::info!("Loaded layout from {path} ({} walls)", layout.walls.len());
            Some(layout)
        }
        Err(e) => {
            tracing::error!("Failed to parse layout JSON from {path}: {e}");
            None
        }
    }
}
