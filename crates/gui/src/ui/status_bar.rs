use egui::Ui;

use crate::scene::FloorBounds;
use crate::state::{AppState, Screen};

pub fn show(ui: &mut Ui, state: &AppState, floor: Option<FloorBounds>) {
    ui.horizontal(|ui| {
        match &state.screen {
            Screen::Sketch => {
                let sketch = &state.sketch;
                ui.weak(format!("Tool: {}", sketch.tool.label()));
                ui.separator();
                ui.weak(format!("Walls: {}", sketch.walls().len()));
                ui.separator();
                ui.weak(format!("Canvas: {}", sketch.canvas_dimensions_label()));
                if sketch.is_extending() {
                    ui.separator();
                    ui.colored_label(egui::Color32::YELLOW, "Resizing canvas");
                }
            }
            Screen::Furnish { layout } => {
                ui.weak(format!("Walls: {}", layout.walls.len()));
                if let Some(bounds) = floor {
                    ui.separator();
                    ui.weak(format!("Floor: {:.0} × {:.0}", bounds.width(), bounds.depth()));
                }
                ui.separator();
                ui.weak("Drag to orbit, right-drag to pan, scroll to zoom, Esc to go back");
            }
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.weak(concat!("Decora v", env!("CARGO_PKG_VERSION")));
        });
    });
}
