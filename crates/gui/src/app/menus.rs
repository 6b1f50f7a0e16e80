//! Application menu bar and settings window

use eframe::egui;
use shared::{LayoutPayload, Units};

use crate::state::AppState;
use crate::ui::sketch_toolbar;

/// Show the file menu
pub fn file_menu(ui: &mut egui::Ui, state: &mut AppState) {
    ui.menu_button("File", |ui| {
        let sketching = !state.screen.is_furnish();
        if ui.add_enabled(sketching, egui::Button::new("New drawing")).clicked() {
            state.sketch.clear();
            ui.close_menu();
        }
        if ui.add_enabled(sketching, egui::Button::new("Open layout…")).clicked() {
            ui.close_menu();
            open_layout(state);
        }
        if ui.button("Save layout…").clicked() {
            ui.close_menu();
            save_layout(state);
        }
        ui.separator();
        if ui.add_enabled(sketching, egui::Button::new("Export PNG…")).clicked() {
            ui.close_menu();
            sketch_toolbar::download_png(state);
        }
        ui.separator();
        if ui.button("Quit").clicked() {
            ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
        }
    });
}

fn open_layout(state: &mut AppState) {
    let Some(path) = rfd::FileDialog::new()
        .set_title("Open layout")
        .add_filter("JSON", &["json"])
        .pick_file()
    else {
        return;
    };
    let loaded = std::fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|json| LayoutPayload::from_json(&json).map_err(|e| e.to_string()));
    match loaded {
        Ok(payload) => {
            let layout = payload.into_layout();
            tracing::info!("Loaded layout from {} ({} walls)", path.display(), layout.walls.len());
            state.sketch.load_layout(layout);
        }
        Err(e) => {
            tracing::error!("Failed to open {}: {e}", path.display());
            state.notices.error(format!("Could not open {}: {e}", path.display()));
        }
    }
}

fn save_layout(state: &mut AppState) {
    let Some(path) = rfd::FileDialog::new()
        .set_title("Save layout")
        .add_filter("JSON", &["json"])
        .set_file_name("floorplan.json")
        .save_file()
    else {
        return;
    };
    let payload = LayoutPayload::from(&state.sketch.submit());
    let written = payload
        .to_json()
        .map_err(|e| e.to_string())
        .and_then(|json| std::fs::write(&path, json).map_err(|e| e.to_string()));
    match written {
        Ok(()) => {
            tracing::info!("Saved layout to {}", path.display());
            state.notices.info(format!("Saved {}", path.display()));
        }
        Err(e) => {
            tracing::error!("Failed to save layout: {e}");
            state.notices.error(format!("Could not save layout: {e}"));
        }
    }
}

/// Show the view menu
pub fn view_menu(ui: &mut egui::Ui, state: &mut AppState) {
    ui.menu_button("View", |ui| {
        ui.checkbox(&mut state.sketch.grid_visible, "Grid");
        if ui.button("Fit canvas to window").clicked() {
            let size = ui.ctx().screen_rect().size();
            state.sketch.fit_to_host([size.x as f64, size.y as f64]);
            ui.close_menu();
        }
    });
}

/// Show the settings menu
pub fn settings_menu(ui: &mut egui::Ui, state: &mut AppState) {
    ui.menu_button("Settings", |ui| {
        if ui.button("Preferences…").clicked() {
            state.show_settings_window = true;
            ui.close_menu();
        }
    });
}

/// Show the settings window
pub fn settings_window(ctx: &egui::Context, state: &mut AppState) {
    let mut open = state.show_settings_window;
    egui::Window::new("Preferences")
        .open(&mut open)
        .resizable(true)
        .default_width(380.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                show_sketch_settings(ui, state);
                show_scene_settings(ui, state);
                show_ui_settings(ui, state);
                show_settings_buttons(ui, state);
            });
        });
    state.show_settings_window = open;
}

fn show_sketch_settings(ui: &mut egui::Ui, state: &mut AppState) {
    ui.heading("Drawing");
    let s = &mut state.settings.sketch;
    let mut changed = false;

    ui.horizontal(|ui| {
        ui.label("Units");
        egui::ComboBox::from_id_salt("units_combo")
            .selected_text(s.units.label())
            .show_ui(ui, |ui| {
                for &u in Units::all() {
                    changed |= ui.selectable_value(&mut s.units, u, u.label()).changed();
                }
            });
    });
    ui.horizontal(|ui| {
        ui.label("Drag extend step");
        changed |= ui
            .add(egui::DragValue::new(&mut s.drag_extend_step).range(5.0..=200.0))
            .changed();
    });
    ui.horizontal(|ui| {
        ui.label("Button extend step");
        changed |= ui
            .add(egui::DragValue::new(&mut s.button_extend_step).range(5.0..=500.0))
            .changed();
    });
    ui.horizontal(|ui| {
        ui.label("Eraser tolerance");
        changed |= ui
            .add(egui::DragValue::new(&mut s.pick_tolerance).range(0.0..=20.0))
            .changed();
    });

    if changed {
        state.sketch.set_units(s.units);
        state.sketch.apply_settings(s);
    }
    ui.add_space(10.0);
}

fn show_scene_settings(ui: &mut egui::Ui, state: &mut AppState) {
    ui.heading("3D view");
    ui.weak("Applied the next time the 3D view opens");
    let s = &mut state.settings.scene;

    ui.horizontal(|ui| {
        ui.label("Wall height");
        ui.add(egui::DragValue::new(&mut s.wall_height).range(10.0..=1000.0));
    });
    ui.horizontal(|ui| {
        ui.label("Wall thickness");
        ui.add(egui::DragValue::new(&mut s.wall_thickness).range(1.0..=100.0));
    });
    for (label, color) in [
        ("Wall color", &mut s.wall_color),
        ("Floor color", &mut s.floor_color),
        ("Background", &mut s.background_color),
    ] {
        ui.horizontal(|ui| {
            ui.label(label);
            let mut c = egui::Color32::from_rgb(color[0], color[1], color[2]);
            if ui.color_edit_button_srgba(&mut c).changed() {
                *color = [c.r(), c.g(), c.b()];
            }
        });
    }
    ui.checkbox(&mut s.controls.damping, "Smooth camera motion");
    ui.horizontal(|ui| {
        ui.label("Zoom range");
        ui.add(egui::DragValue::new(&mut s.controls.min_distance).range(10.0..=s.controls.max_distance));
        ui.add(egui::DragValue::new(&mut s.controls.max_distance).range(s.controls.min_distance..=20_000.0));
    });
    ui.add_space(10.0);
}

fn show_ui_settings(ui: &mut egui::Ui, state: &mut AppState) {
    ui.heading("Interface");
    ui.horizontal(|ui| {
        ui.label("Font size");
        ui.add(
            egui::DragValue::new(&mut state.settings.ui.font_size)
                .speed(0.5)
                .range(8.0..=24.0)
                .suffix(" pt"),
        );
    });
    ui.add_space(10.0);
}

fn show_settings_buttons(ui: &mut egui::Ui, state: &mut AppState) {
    ui.separator();
    ui.horizontal(|ui| {
        if ui.button("Save").clicked() {
            state.settings.save();
        }
        if ui.button("Reset").clicked() {
            state.settings = crate::state::settings::AppSettings::default();
            state.sketch.apply_settings(&state.settings.sketch);
        }
        if ui.button("Close").clicked() {
            state.show_settings_window = false;
        }
    });
}
