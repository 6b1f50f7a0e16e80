//! Main application module

mod keyboard;
mod menus;
mod styles;

pub use styles::BRAND_BLUE;

use eframe::egui;
use shared::FloorplanLayout;

use crate::state::AppState;
use crate::ui::sketch_canvas::SketchCanvas;
use crate::ui::sketch_toolbar::SketchAction;
use crate::ui::{notices, sketch_toolbar, status_bar};
use crate::viewport::{ScenePanel, ViewerAction};

/// Main application
pub struct FloorplanApp {
    state: AppState,
    canvas: SketchCanvas,
    scene: ScenePanel,
    /// Last applied font size (to detect changes)
    last_font_size: f32,
}

impl FloorplanApp {
    pub fn new(cc: &eframe::CreationContext<'_>, initial_layout: Option<FloorplanLayout>) -> Self {
        let mut state = AppState::default();

        if let Some(layout) = initial_layout {
            state.sketch.load_layout(layout);
        }

        // Apply initial styles with font size from settings
        styles::configure_styles(&cc.egui_ctx, state.settings.ui.font_size);

        let scene = ScenePanel::new(cc.gl.clone(), state.settings.scene.clone());
        if cc.gl.is_none() {
            tracing::warn!("No OpenGL context; the 3D view will be unavailable");
        }

        let last_font_size = state.settings.ui.font_size;
        Self {
            state,
            canvas: SketchCanvas::default(),
            scene,
            last_font_size,
        }
    }

    fn open_furnish(&mut self) {
        self.state.open_furnish();
        self.scene.request_mount(self.state.settings.scene.clone());
    }

    fn back_to_sketch(&mut self) {
        self.scene.unmount();
        self.state.back_to_sketch();
    }
}

impl eframe::App for FloorplanApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply font size if changed
        if self.state.settings.ui.font_size != self.last_font_size {
            styles::apply_font_size(ctx, self.state.settings.ui.font_size);
            self.last_font_size = self.state.settings.ui.font_size;
        }

        if keyboard::handle_keyboard(ctx, &mut self.state) == Some(keyboard::Shortcut::Back) {
            self.back_to_sketch();
        }

        // ── Menu bar ──────────────────────────────────────────
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                menus::file_menu(ui, &mut self.state);
                menus::view_menu(ui, &mut self.state);
                menus::settings_menu(ui, &mut self.state);
            });
        });

        // ── Settings window ──────────────────────────────────
        menus::settings_window(ctx, &mut self.state);

        // ── Toolbar ───────────────────────────────────────────
        let furnish = self.state.screen.is_furnish();
        let mut sketch_action = None;
        let mut viewer_action = None;
        egui::TopBottomPanel::top("toolbar")
            .frame(
                egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(8, 4)),
            )
            .show(ctx, |ui| {
                if furnish {
                    viewer_action = crate::viewport::toolbar(ui, &self.scene);
                } else {
                    sketch_action = sketch_toolbar::show(ui, &mut self.state);
                }
            });

        if let Some(SketchAction::Furnish) = sketch_action {
            self.open_furnish();
        }
        match viewer_action {
            Some(ViewerAction::Back) => self.back_to_sketch(),
            Some(ViewerAction::Rotate90) => self.scene.rotate90(),
            None => {}
        }

        // ── Status bar ───────────────────────────────────────
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(22.0)
            .frame(
                egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(8, 2)),
            )
            .show(ctx, |ui| {
                status_bar::show(ui, &self.state, self.scene.floor_bounds());
            });

        // ── Central panel: sketch canvas or 3D viewer ────────
        let furnish = self.state.screen.is_furnish();
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                if furnish {
                    self.scene.show(ui, &mut self.state);
                } else {
                    self.canvas.show(ui, &mut self.state);
                }
            });

        // ── Banners ──────────────────────────────────────────
        notices::show(ctx, &mut self.state.notices);
    }

    fn on_exit(&mut self, _gl: Option<&glow::Context>) {
        self.scene.unmount();
        self.state.settings.save();
    }
}
