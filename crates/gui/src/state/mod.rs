pub mod settings;
pub mod sketch;

use shared::FloorplanLayout;

pub use settings::{AppSettings, SceneSettings, SketchSettings};
use sketch::SketchEditor;

/// Which screen the application shows
#[derive(Debug, Clone, Default)]
pub enum Screen {
    /// 2D wall drawing
    #[default]
    Sketch,
    /// 3D viewer for a submitted layout
    Furnish { layout: FloorplanLayout },
}

impl Screen {
    pub fn is_furnish(&self) -> bool {
        matches!(self, Screen::Furnish { .. })
    }
}

/// Severity of a banner message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub id: u64,
    pub level: NoticeLevel,
    pub message: String,
}

/// Dismissible banners layered over the current screen
#[derive(Debug, Default)]
pub struct Notices {
    items: Vec<Notice>,
    next_id: u64,
}

impl Notices {
    pub fn info(&mut self, message: impl Into<String>) -> u64 {
        self.push(NoticeLevel::Info, message.into())
    }

    pub fn error(&mut self, message: impl Into<String>) -> u64 {
        self.push(NoticeLevel::Error, message.into())
    }

    fn push(&mut self, level: NoticeLevel, message: String) -> u64 {
        // Repeated failures show a single banner
        if let Some(existing) = self.items.iter().find(|n| n.level == level && n.message == message) {
            return existing.id;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.items.push(Notice { id, level, message });
        id
    }

    pub fn dismiss(&mut self, id: u64) {
        self.items.retain(|n| n.id != id);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.items.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

/// Combined application state
pub struct AppState {
    pub screen: Screen,
    pub sketch: SketchEditor,
    pub settings: AppSettings,
    pub notices: Notices,
    /// Show settings window
    pub show_settings_window: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_settings(AppSettings::load())
    }
}

impl AppState {
    pub fn with_settings(settings: AppSettings) -> Self {
        Self {
            screen: Screen::Sketch,
            sketch: SketchEditor::new(&settings.sketch),
            settings,
            notices: Notices::default(),
            show_settings_window: false,
        }
    }

    /// Hand the current drawing over to the 3D viewer
    pub fn open_furnish(&mut self) -> FloorplanLayout {
        let layout = self.sketch.submit();
        tracing::info!(walls = layout.walls.len(), units = ?layout.units, "opening 3D view");
        self.screen = Screen::Furnish {
            layout: layout.clone(),
        };
        layout
    }

    /// Return to the drawing, which is left exactly as it was submitted
    pub fn back_to_sketch(&mut self) {
        self.screen = Screen::Sketch;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::sketch::PointerEvent;

    #[test]
    fn test_notices_dedupe_and_dismiss() {
        let mut n = Notices::default();
        let a = n.error("surface lost");
        let b = n.error("surface lost");
        assert_eq!(a, b);
        let c = n.info("saved");
        assert_eq!(n.len(), 2);
        n.dismiss(a);
        assert_eq!(n.iter().map(|x| x.id).collect::<Vec<_>>(), vec![c]);
    }

    #[test]
    fn test_furnish_roundtrip_keeps_sketch() {
        let mut app = AppState::with_settings(AppSettings::default());
        app.sketch.handle_pointer(PointerEvent::Down([0.0, 0.0]));
        app.sketch.handle_pointer(PointerEvent::Move([100.0, 0.0]));
        app.sketch.handle_pointer(PointerEvent::Up);

        assert_eq!(app.open_furnish().walls.len(), 1);
        assert!(app.screen.is_furnish());
        app.back_to_sketch();
        assert!(!app.screen.is_furnish());
        assert_eq!(app.sketch.walls().len(), 1);
    }
}
