use egui::Ui;
use shared::Units;

use crate::export::DEFAULT_PIXEL_RATIO;
use crate::state::sketch::{ExtendDirection, SketchTool, TOOL_SIZE_RANGE};
use crate::state::AppState;

/// Toolbar requests the app has to carry out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SketchAction {
    /// Submit the drawing and open the 3D view
    Furnish,
}

pub fn show(ui: &mut Ui, state: &mut AppState) -> Option<SketchAction> {
    let mut action = None;
    ui.horizontal(|ui| {
        for tool in [SketchTool::Draw, SketchTool::Delete] {
            let active = state.sketch.tool == tool;
            if ui.selectable_label(active, tool.label()).clicked() {
                state.sketch.set_tool(tool);
            }
        }

        ui.separator();
        show_tool_size(ui, state);

        ui.separator();
        show_units(ui, state);

        ui.separator();
        show_extend_buttons(ui, state);

        ui.separator();
        if ui.button("Clear").clicked() {
            state.sketch.clear();
        }
        if ui.button("Download").clicked() {
            download_png(state);
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let furnish = egui::Button::new(egui::RichText::new("Furnish in 3D").strong())
                .fill(crate::app::BRAND_BLUE);
            if ui.add(furnish).clicked() {
                action = Some(SketchAction::Furnish);
            }
        });
    });
    action
}

fn show_tool_size(ui: &mut Ui, state: &mut AppState) {
    ui.label("Size");
    let (lo, hi) = TOOL_SIZE_RANGE;
    let size = state.sketch.tool_size();
    if ui.add_enabled(size > lo, egui::Button::new("−")).clicked() {
        state.sketch.shrink_tool_size();
    }
    ui.monospace(format!("{size:>2}"));
    if ui.add_enabled(size < hi, egui::Button::new("+")).clicked() {
        state.sketch.grow_tool_size();
    }
}

fn show_units(ui: &mut Ui, state: &mut AppState) {
    let mut units = state.sketch.units;
    egui::ComboBox::from_id_salt("sketch_units")
        .selected_text(units.label())
        .width(80.0)
        .show_ui(ui, |ui| {
            for &u in Units::all() {
                ui.selectable_value(&mut units, u, u.label());
            }
        });
    if units != state.sketch.units {
        state.sketch.set_units(units);
        state.settings.sketch.units = units;
    }
}

fn show_extend_buttons(ui: &mut Ui, state: &mut AppState) {
    ui.label("Canvas");
    for &dir in ExtendDirection::all() {
        let (glyph, hint) = match dir {
            ExtendDirection::Up => ("⬆", "Shrink from the top"),
            ExtendDirection::Down => ("⬇", "Extend downwards"),
            ExtendDirection::Left => ("⬅", "Shrink from the left"),
            ExtendDirection::Right => ("➡", "Extend to the right"),
        };
        if ui.small_button(glyph).on_hover_text(hint).clicked() && !state.sketch.extend_by_button(dir) {
            tracing::debug!(?dir, "canvas already at minimum size");
        }
    }
}

/// Export the drawing and ask where to save it
pub fn download_png(state: &mut AppState) {
    let bytes = match state.sketch.export_png(DEFAULT_PIXEL_RATIO) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!("Export failed: {e}");
            state.notices.error(format!("Export failed: {e}"));
            return;
        }
    };
    let Some(path) = rfd::FileDialog::new()
        .set_title("Save drawing")
        .add_filter("PNG", &["png"])
        .set_file_name("floorplan.png")
        .save_file()
    else {
        return;
    };
    match std::fs::write(&path, &bytes) {
        Ok(()) => {
            tracing::info!("Saved drawing to {}", path.display());
            state.notices.info(format!("Saved {}", path.display()));
        }
        Err(e) => {
            tracing::error!("Failed to write {}: {e}", path.display());
            state.notices.error(format!("Could not save {}: {e}", path.display()));
        }
    }
}
