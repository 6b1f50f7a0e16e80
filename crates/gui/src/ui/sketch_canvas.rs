//! Interactive 2D drawing surface

use egui::{Color32, Pos2, Rect, Sense, Stroke, Ui, Vec2};

use crate::sketch::display::{Rgba, SketchShape};
use crate::state::sketch::{ExtendDirection, PointerEvent};
use crate::state::AppState;

/// Thickness of the drag handles along the canvas edges
const HANDLE_SIZE: f32 = 10.0;

#[derive(Default)]
pub struct SketchCanvas {
    /// Screen size the canvas was last fitted to
    last_host: Option<Vec2>,
}

impl SketchCanvas {
    pub fn show(&mut self, ui: &mut Ui, state: &mut AppState) {
        let host = ui.ctx().screen_rect().size();
        if self.last_host != Some(host) {
            state.sketch.fit_to_host([host.x as f64, host.y as f64]);
            self.last_host = Some(host);
        }

        egui::ScrollArea::both().auto_shrink([false, false]).show(ui, |ui| {
            let [w, h] = state.sketch.viewport().size;
            let (rect, response) = ui.allocate_exact_size(
                egui::vec2(w as f32 + HANDLE_SIZE, h as f32 + HANDLE_SIZE),
                Sense::click_and_drag(),
            );
            let canvas = Rect::from_min_size(rect.min, egui::vec2(w as f32, h as f32));

            Self::handle_edges(ui, canvas, state);
            Self::handle_pointer(ui, &response, canvas, state);

            if ui.is_rect_visible(rect) {
                paint(ui, canvas, state);
            }
        });
    }

    fn handle_edges(ui: &mut Ui, canvas: Rect, state: &mut AppState) {
        let edges = [
            (
                ExtendDirection::Right,
                Rect::from_min_max(
                    egui::pos2(canvas.max.x, canvas.min.y),
                    egui::pos2(canvas.max.x + HANDLE_SIZE, canvas.max.y),
                ),
                egui::CursorIcon::ResizeHorizontal,
            ),
            (
                ExtendDirection::Down,
                Rect::from_min_max(
                    egui::pos2(canvas.min.x, canvas.max.y),
                    egui::pos2(canvas.max.x, canvas.max.y + HANDLE_SIZE),
                ),
                egui::CursorIcon::ResizeVertical,
            ),
        ];
        for (dir, handle, cursor) in edges {
            let id = ui.id().with(("extend_handle", dir as u8));
            let response = ui.interact(handle, id, Sense::drag()).on_hover_cursor(cursor);
            if response.drag_started() {
                state.sketch.begin_extend(dir);
            }
            if response.dragged() && response.drag_delta() != Vec2::ZERO {
                let pos = response.interact_pointer_pos().unwrap_or(handle.center());
                state.sketch.handle_pointer(PointerEvent::Move(local(canvas, pos)));
            }
            if response.drag_stopped() {
                state.sketch.handle_pointer(PointerEvent::Up);
            }
            let fill = if response.hovered() || response.dragged() {
                Color32::from_white_alpha(60)
            } else {
                Color32::from_white_alpha(20)
            };
            ui.painter().rect_filled(handle, 0.0, fill);
        }
    }

    fn handle_pointer(ui: &Ui, response: &egui::Response, canvas: Rect, state: &mut AppState) {
        if state.sketch.is_extending() {
            return;
        }
        let pointer = ui.input(|i| i.pointer.clone());
        if response.hovered() && pointer.primary_pressed() {
            if let Some(pos) = pointer.interact_pos() {
                if canvas.contains(pos) {
                    state.sketch.handle_pointer(PointerEvent::Down(local(canvas, pos)));
                }
            }
        } else if state.sketch.is_drawing() {
            if let Some(pos) = pointer.interact_pos() {
                state.sketch.handle_pointer(PointerEvent::Move(local(canvas, pos)));
            }
        }
        if pointer.primary_released() && state.sketch.is_drawing() {
            state.sketch.handle_pointer(PointerEvent::Up);
        }
    }
}

/// Screen position → canvas coordinates
fn local(canvas: Rect, pos: Pos2) -> [f64; 2] {
    [(pos.x - canvas.min.x) as f64, (pos.y - canvas.min.y) as f64]
}

fn color(c: Rgba) -> Color32 {
    Color32::from_rgba_unmultiplied(c[0], c[1], c[2], c[3])
}

fn paint(ui: &Ui, canvas: Rect, state: &AppState) {
    let frame = state.sketch.display_list();
    let painter = ui.painter_at(canvas);
    let [ox, oy] = frame.origin;
    let to_screen = |x: f64, y: f64| canvas.min + egui::vec2((x + ox) as f32, (y + oy) as f32);

    for shape in &frame.shapes {
        match shape {
            SketchShape::Rect { min, size, color: c } => {
                let min = to_screen(min[0], min[1]);
                let rect = Rect::from_min_size(min, egui::vec2(size[0] as f32, size[1] as f32));
                painter.rect_filled(rect, 0.0, color(*c));
            }
            SketchShape::Line { points, width, color: c } => {
                painter.line_segment(
                    [to_screen(points[0], points[1]), to_screen(points[2], points[3])],
                    Stroke::new(*width as f32, color(*c)),
                );
            }
            SketchShape::Stroke {
                points, width, color: c, ..
            } => {
                let a = to_screen(points[0], points[1]);
                let b = to_screen(points[2], points[3]);
                let c = color(*c);
                let w = *width as f32;
                painter.line_segment([a, b], Stroke::new(w, c));
                painter.circle_filled(a, w / 2.0, c);
                painter.circle_filled(b, w / 2.0, c);
            }
            SketchShape::Text {
                pos,
                text,
                size,
                max_width,
                color: c,
            } => {
                let mut font = egui::FontId::proportional(*size as f32);
                if let Some(max) = max_width {
                    let width = painter.layout_no_wrap(text.clone(), font.clone(), color(*c)).size().x;
                    if width > *max as f32 {
                        font.size *= *max as f32 / width;
                    }
                }
                painter.text(to_screen(pos[0], pos[1]), egui::Align2::LEFT_TOP, text, font, color(*c));
            }
        }
    }
}
