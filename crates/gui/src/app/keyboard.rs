//! Keyboard shortcut handling

use eframe::egui;

use crate::state::sketch::SketchTool;
use crate::state::AppState;

/// Shortcuts the app has to act on itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    /// Leave the 3D view
    Back,
}

/// Handle keyboard shortcuts for the application
pub fn handle_keyboard(ctx: &egui::Context, state: &mut AppState) -> Option<Shortcut> {
    // Don't handle shortcuts when a text field is focused
    if ctx.memory(|m| m.focused().is_some()) {
        return None;
    }

    ctx.input(|i| {
        if state.screen.is_furnish() {
            // Escape: back to the drawing
            if i.key_pressed(egui::Key::Escape) {
                return Some(Shortcut::Back);
            }
            return None;
        }

        // P / E: pencil / eraser
        if i.key_pressed(egui::Key::P) && !i.modifiers.command {
            state.sketch.set_tool(SketchTool::Draw);
        }
        if i.key_pressed(egui::Key::E) && !i.modifiers.command {
            state.sketch.set_tool(SketchTool::Delete);
        }
        // [ / ]: stroke width
        if i.key_pressed(egui::Key::OpenBracket) {
            state.sketch.shrink_tool_size();
        }
        if i.key_pressed(egui::Key::CloseBracket) {
            state.sketch.grow_tool_size();
        }
        // G: toggle grid
        if i.key_pressed(egui::Key::G) && !i.modifiers.command {
            state.sketch.grid_visible = !state.sketch.grid_visible;
        }
        None
    })
}
