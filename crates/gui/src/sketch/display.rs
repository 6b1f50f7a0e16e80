//! Backend-neutral description of what the sketch canvas shows.
//!
//! The egui canvas and the PNG exporter both paint from the same list, so the
//! exported image is exactly what the editor state describes.

use crate::grid;
use crate::state::sketch::{SketchEditor, SketchTool};

/// RGBA color, straight alpha
pub type Rgba = [u8; 4];

pub const CANVAS_FILL: Rgba = [13, 43, 80, 128];
pub const GRID_COLOR: Rgba = [255, 255, 255, 38];
pub const GRID_LINE_WIDTH: f64 = 0.5;
pub const WALL_COLOR: Rgba = [0x42, 0xA5, 0xF5, 255];
pub const WALL_DELETE_COLOR: Rgba = [0xFF, 0x4D, 0x4F, 255];
pub const LABEL_COLOR: Rgba = [255, 255, 255, 255];
pub const LABEL_SIZE: f64 = 12.0;
/// Labels sit this far above the wall midpoint
pub const LABEL_OFFSET: f64 = 15.0;
pub const WATERMARK_COLOR: Rgba = [0x15, 0x65, 0xC0, 255];
pub const WATERMARK_SIZE: f64 = 25.0;
/// Watermark anchor, measured back from the canvas' bottom-right corner
pub const WATERMARK_INSET: [f64; 2] = [100.0, 30.0];
/// Widest the watermark may run, leaving a margin before the right edge
pub const WATERMARK_MAX_WIDTH: f64 = WATERMARK_INSET[0] - 10.0;

/// One drawable primitive in drawing-layer coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum SketchShape {
    Rect {
        min: [f64; 2],
        size: [f64; 2],
        color: Rgba,
    },
    /// Hairline (grid)
    Line {
        points: [f64; 4],
        width: f64,
        color: Rgba,
    },
    /// Wall stroke with round caps
    Stroke {
        index: usize,
        points: [f64; 4],
        width: f64,
        color: Rgba,
    },
    /// Text anchored at its top-left corner
    Text {
        pos: [f64; 2],
        text: String,
        size: f64,
        /// Painters narrow the text to fit when set
        max_width: Option<f64>,
        color: Rgba,
    },
}

/// Everything needed to paint one frame of the sketch canvas
#[derive(Debug, Clone, PartialEq)]
pub struct SketchFrame {
    /// Canvas size in canvas units
    pub size: [f64; 2],
    /// Translation from drawing-layer to canvas coordinates
    pub origin: [f64; 2],
    /// Back-to-front
    pub shapes: Vec<SketchShape>,
}

impl SketchFrame {
    /// Number of shapes of a given kind, mostly for tests
    pub fn count(&self, pred: impl Fn(&SketchShape) -> bool) -> usize {
        self.shapes.iter().filter(|s| pred(s)).count()
    }
}

impl SketchEditor {
    /// Build the display list for the current state
    pub fn display_list(&self) -> SketchFrame {
        let vp = self.viewport();
        let [w, h] = vp.size;
        // The visible canvas expressed in drawing-layer coordinates
        let canvas_min = [-vp.origin[0], -vp.origin[1]];
        let mut shapes = Vec::new();

        if let Some(overlay) = &self.overlay {
            shapes.push(SketchShape::Rect {
                min: canvas_min,
                size: [w, h],
                color: overlay.backdrop,
            });
        }

        shapes.push(SketchShape::Rect {
            min: canvas_min,
            size: [w, h],
            color: CANVAS_FILL,
        });

        if self.grid_visible {
            shapes.extend(grid::grid_lines(canvas_min, [w, h]).into_iter().map(|points| SketchShape::Line {
                points,
                width: GRID_LINE_WIDTH,
                color: GRID_COLOR,
            }));
        }

        let wall_color = match self.tool {
            SketchTool::Draw => WALL_COLOR,
            SketchTool::Delete => WALL_DELETE_COLOR,
        };
        for (index, wall) in self.walls().iter().enumerate() {
            shapes.push(SketchShape::Stroke {
                index,
                points: wall.points,
                width: wall.thickness,
                color: wall_color,
            });
            let [mx, my] = wall.midpoint();
            shapes.push(SketchShape::Text {
                pos: [mx, my - LABEL_OFFSET],
                text: self.length_label(wall),
                size: LABEL_SIZE,
                max_width: None,
                color: LABEL_COLOR,
            });
        }

        if let Some(overlay) = &self.overlay {
            shapes.push(SketchShape::Text {
                pos: [
                    canvas_min[0] + w - WATERMARK_INSET[0],
                    canvas_min[1] + h - WATERMARK_INSET[1],
                ],
                text: overlay.watermark.clone(),
                size: WATERMARK_SIZE,
                max_width: Some(WATERMARK_MAX_WIDTH),
                color: WATERMARK_COLOR,
            });
        }

        SketchFrame {
            size: vp.size,
            origin: vp.origin,
            shapes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::sketch::{ExportOverlay, ExtendDirection, PointerEvent};

    fn is_grid(s: &SketchShape) -> bool {
        matches!(s, SketchShape::Line { .. })
    }

    #[test]
    fn test_walls_have_strokes_and_labels() {
        let mut e = SketchEditor::default();
        e.handle_pointer(PointerEvent::Down([0.0, 0.0]));
        e.handle_pointer(PointerEvent::Move([100.0, 0.0]));
        e.handle_pointer(PointerEvent::Up);
        let frame = e.display_list();
        assert_eq!(frame.count(|s| matches!(s, SketchShape::Stroke { .. })), 1);
        assert!(frame.shapes.iter().any(|s| matches!(
            s,
            SketchShape::Text { text, pos, .. } if text == "5.0 feet" && *pos == [50.0, -15.0]
        )));
    }

    #[test]
    fn test_hidden_grid_and_overlay() {
        let mut e = SketchEditor::default();
        assert_eq!(e.display_list().count(is_grid), 41 + 31);

        e.grid_visible = false;
        e.overlay = Some(ExportOverlay::default());
        let frame = e.display_list();
        assert_eq!(frame.count(is_grid), 0);
        assert!(matches!(frame.shapes.first(), Some(SketchShape::Rect { color, .. }) if *color == [255; 4]));
        assert!(matches!(
            frame.shapes.last(),
            Some(SketchShape::Text { text, pos, .. }) if text == "DECORA" && *pos == [700.0, 570.0]
        ));
    }

    #[test]
    fn test_backdrop_follows_shifted_origin() {
        let mut e = SketchEditor::default();
        assert!(e.extend_by_button(ExtendDirection::Left));
        let frame = e.display_list();
        assert_eq!(frame.origin, [50.0, 0.0]);
        assert!(matches!(
            frame.shapes.first(),
            Some(SketchShape::Rect { min, size, .. }) if *min == [-50.0, 0.0] && *size == [750.0, 600.0]
        ));
        // Grid still lands on snap points and spans the whole canvas
        let xs: Vec<f64> = frame
            .shapes
            .iter()
            .filter_map(|s| match s {
                SketchShape::Line { points, .. } if points[0] == points[2] => Some(points[0]),
                _ => None,
            })
            .collect();
        assert_eq!(xs.first(), Some(&-40.0));
        assert_eq!(xs.last(), Some(&700.0));
    }

    #[test]
    fn test_delete_tool_recolors_walls() {
        let mut e = SketchEditor::default();
        e.handle_pointer(PointerEvent::Down([0.0, 0.0]));
        e.handle_pointer(PointerEvent::Up);
        e.set_tool(SketchTool::Delete);
        let frame = e.display_list();
        assert!(frame.shapes.iter().any(|s| matches!(
            s,
            SketchShape::Stroke { color, .. } if *color == WALL_DELETE_COLOR
        )));
    }
}
