//! 3D room viewer panel with OpenGL rendering

mod gl_renderer;

use std::sync::Arc;

use egui::Ui;

use crate::scene::{FloorBounds, SceneLifecycle, SurfaceSize, TickOutcome};
use crate::state::{AppState, SceneSettings, Screen};
use gl_renderer::GlowBackend;

/// Requests from the viewer toolbar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerAction {
    Back,
    Rotate90,
}

/// Hosts the scene lifecycle inside the central panel
pub struct ScenePanel {
    lifecycle: SceneLifecycle<GlowBackend>,
    /// Mount on the next frame, once the panel size is known
    mount_requested: bool,
}

impl ScenePanel {
    pub fn new(gl: Option<Arc<glow::Context>>, settings: SceneSettings) -> Self {
        Self {
            lifecycle: SceneLifecycle::new(GlowBackend::new(gl), settings),
            mount_requested: false,
        }
    }

    pub fn request_mount(&mut self, settings: SceneSettings) {
        self.lifecycle.set_settings(settings);
        self.mount_requested = true;
    }

    pub fn unmount(&mut self) {
        self.mount_requested = false;
        self.lifecycle.unmount();
    }

    pub fn rotate90(&mut self) {
        if let Some((controls, camera)) = self.lifecycle.controls_mut() {
            controls.rotate90(camera);
        }
    }

    pub fn floor_bounds(&self) -> Option<FloorBounds> {
        self.lifecycle.floor_bounds()
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle.is_active()
    }

    pub fn show(&mut self, ui: &mut Ui, state: &mut AppState) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());
        let ppp = ui.ctx().pixels_per_point();
        let size = SurfaceSize::new(
            (rect.width() * ppp).round().max(0.0) as u32,
            (rect.height() * ppp).round().max(0.0) as u32,
        );

        if self.mount_requested {
            self.mount_requested = false;
            if let Screen::Furnish { layout } = &state.screen {
                if let Err(e) = self.lifecycle.mount(size, layout) {
                    tracing::error!("3D view unavailable: {e}");
                    state.notices.error(format!("3D view unavailable: {e}"));
                }
            }
        }

        if !self.lifecycle.is_active() {
            ui.painter().rect_filled(rect, 0.0, ui.visuals().extreme_bg_color);
            ui.painter().text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "The 3D view could not be started",
                egui::FontId::proportional(16.0),
                ui.visuals().weak_text_color(),
            );
            return;
        }

        self.lifecycle.resize(size);
        self.handle_camera_input(ui, &response);

        if self.lifecycle.tick() == TickOutcome::Continue {
            ui.ctx().request_repaint();
            if ui.is_rect_visible(rect) {
                ui.painter().add(self.lifecycle.backend().paint_callback(rect));
            }
        }
    }

    fn handle_camera_input(&mut self, ui: &Ui, response: &egui::Response) {
        let Some((controls, _)) = self.lifecycle.controls_mut() else {
            return;
        };
        if response.dragged_by(egui::PointerButton::Primary) {
            let d = response.drag_delta();
            controls.rotate(d.x, d.y);
        }
        if response.dragged_by(egui::PointerButton::Secondary) || response.dragged_by(egui::PointerButton::Middle) {
            let d = response.drag_delta();
            controls.pan(d.x, d.y);
        }
        if response.hovered() {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll.abs() > 0.1 {
                controls.zoom(scroll * 0.001);
            }
        }
    }
}

/// Toolbar shown above the 3D view
pub fn toolbar(ui: &mut Ui, panel: &ScenePanel) -> Option<ViewerAction> {
    let mut action = None;
    ui.horizontal(|ui| {
        if ui.button("⬅ Back to drawing").clicked() {
            action = Some(ViewerAction::Back);
        }
        ui.separator();
        if ui
            .add_enabled(panel.is_active(), egui::Button::new("⟳ Rotate 90°"))
            .clicked()
        {
            action = Some(ViewerAction::Rotate90);
        }
    });
    action
}
