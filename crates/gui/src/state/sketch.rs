use shared::{FloorplanLayout, Units, WallSegment};

use crate::grid::{self, GRID_STEP};
use crate::sketch::geometry::pick_wall;
use crate::state::settings::SketchSettings;

/// Smallest and largest stroke width the tool size control allows
pub const TOOL_SIZE_RANGE: (u32, u32) = (1, 10);

// ============================================================================
// Tools and input
// ============================================================================

/// Currently active sketch tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SketchTool {
    #[default]
    Draw,
    Delete,
}

impl SketchTool {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Draw => "Pencil",
            Self::Delete => "Eraser",
        }
    }
}

/// Direction of a canvas extend gesture or button.
///
/// `Right`/`Down` grow the canvas, `Left`/`Up` shrink it from that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendDirection {
    Up,
    Down,
    Left,
    Right,
}

impl ExtendDirection {
    pub fn all() -> &'static [ExtendDirection] {
        &[Self::Up, Self::Left, Self::Right, Self::Down]
    }
}

/// Pointer input in canvas coordinates (relative to the canvas' top-left corner)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down([f64; 2]),
    Move([f64; 2]),
    Up,
}

/// Which handler receives the next pointer event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// A canvas-extend gesture owns the pointer
    Extending(ExtendDirection),
    /// A wall is being dragged out
    Drawing,
    /// Idle with the draw tool
    Draw,
    /// Idle with the delete tool
    Delete,
}

/// What a pointer event changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SketchChange {
    None,
    WallStarted(usize),
    WallMoved(usize),
    WallFinished(usize),
    WallDeleted(usize),
    CanvasResized,
    ExtendFinished,
}

// ============================================================================
// Viewport
// ============================================================================

/// Visible canvas size and pan offset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SketchViewport {
    pub size: [f64; 2],
    pub origin: [f64; 2],
}

impl SketchViewport {
    pub fn width(&self) -> f64 {
        self.size[0]
    }

    pub fn height(&self) -> f64 {
        self.size[1]
    }
}

/// Temporary decoration shown only while the drawing is being exported
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOverlay {
    pub backdrop: [u8; 4],
    pub watermark: String,
}

impl Default for ExportOverlay {
    fn default() -> Self {
        Self {
            backdrop: [255, 255, 255, 255],
            watermark: "DECORA".to_string(),
        }
    }
}

// ============================================================================
// Editor
// ============================================================================

/// The 2D wall drawing surface
pub struct SketchEditor {
    walls: Vec<WallSegment>,
    pub tool: SketchTool,
    pub units: Units,
    tool_size: u32,
    viewport: SketchViewport,
    drawing: bool,
    extending: Option<ExtendDirection>,
    /// Background grid visibility
    pub grid_visible: bool,
    /// Export-only decoration
    pub overlay: Option<ExportOverlay>,
    limits: SketchSettings,
}

impl Default for SketchEditor {
    fn default() -> Self {
        Self::new(&SketchSettings::default())
    }
}

impl SketchEditor {
    pub fn new(settings: &SketchSettings) -> Self {
        let (lo, hi) = TOOL_SIZE_RANGE;
        Self {
            walls: Vec::new(),
            tool: SketchTool::Draw,
            units: settings.units,
            tool_size: settings.tool_size.clamp(lo, hi),
            viewport: SketchViewport {
                size: settings.canvas_size,
                origin: [0.0, 0.0],
            },
            drawing: false,
            extending: None,
            grid_visible: true,
            overlay: None,
            limits: settings.clone(),
        }
    }

    // --- Accessors ---

    pub fn walls(&self) -> &[WallSegment] {
        &self.walls
    }

    pub fn viewport(&self) -> SketchViewport {
        self.viewport
    }

    pub fn tool_size(&self) -> u32 {
        self.tool_size
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    pub fn is_extending(&self) -> bool {
        self.extending.is_some()
    }

    /// Resolve which handler owns the pointer right now
    pub fn input_mode(&self) -> InputMode {
        if let Some(dir) = self.extending {
            InputMode::Extending(dir)
        } else if self.drawing {
            InputMode::Drawing
        } else {
            match self.tool {
                SketchTool::Draw => InputMode::Draw,
                SketchTool::Delete => InputMode::Delete,
            }
        }
    }

    // --- Tool state ---

    pub fn set_tool(&mut self, tool: SketchTool) {
        self.tool = tool;
        // A drag in progress is finished as-is
        self.drawing = false;
    }

    pub fn set_units(&mut self, units: Units) {
        self.units = units;
    }

    pub fn set_tool_size(&mut self, size: u32) {
        let (lo, hi) = TOOL_SIZE_RANGE;
        self.tool_size = size.clamp(lo, hi);
    }

    pub fn grow_tool_size(&mut self) {
        self.set_tool_size(self.tool_size + 1);
    }

    pub fn shrink_tool_size(&mut self) {
        self.set_tool_size(self.tool_size.saturating_sub(1));
    }

    /// Pick up edited extend steps and pick tolerance; walls and canvas are kept
    pub fn apply_settings(&mut self, settings: &SketchSettings) {
        self.limits = settings.clone();
    }

    /// Remove every wall
    pub fn clear(&mut self) {
        self.walls.clear();
        self.drawing = false;
    }

    // --- Pointer routing ---

    /// Single entry point for pointer input
    pub fn handle_pointer(&mut self, event: PointerEvent) -> SketchChange {
        let mode = self.input_mode();
        let change = match (mode, event) {
            (InputMode::Extending(dir), PointerEvent::Move(_)) => {
                let step = self.limits.drag_extend_step;
                if self.extend(dir, step) {
                    SketchChange::CanvasResized
                } else {
                    SketchChange::None
                }
            }
            (InputMode::Extending(_), PointerEvent::Up) => {
                self.extending = None;
                SketchChange::ExtendFinished
            }
            (InputMode::Extending(_), PointerEvent::Down(_)) => SketchChange::None,

            (InputMode::Draw, PointerEvent::Down(pos)) => self.start_wall(pos),
            (InputMode::Drawing, PointerEvent::Move(pos)) => self.move_wall_end(pos),
            (InputMode::Drawing, PointerEvent::Up) => {
                self.drawing = false;
                SketchChange::WallFinished(self.walls.len().saturating_sub(1))
            }
            (InputMode::Delete, PointerEvent::Down(pos)) => {
                match pick_wall(&self.walls, self.to_layer(pos), self.limits.pick_tolerance) {
                    Some(index) => {
                        self.delete_wall(index);
                        SketchChange::WallDeleted(index)
                    }
                    None => SketchChange::None,
                }
            }
            _ => SketchChange::None,
        };
        if change != SketchChange::None {
            tracing::debug!(?mode, ?event, ?change, "sketch input");
        }
        change
    }

    /// Remove the wall at `index`; out-of-range indices are ignored
    pub fn delete_wall(&mut self, index: usize) -> Option<WallSegment> {
        if index < self.walls.len() {
            Some(self.walls.remove(index))
        } else {
            None
        }
    }

    /// Index of the wall rendered under a canvas-space point
    pub fn wall_at(&self, pos: [f64; 2]) -> Option<usize> {
        pick_wall(&self.walls, self.to_layer(pos), self.limits.pick_tolerance)
    }

    fn start_wall(&mut self, pos: [f64; 2]) -> SketchChange {
        let [x, y] = self.to_layer(pos);
        let (sx, sy) = grid::snap(x, y);
        self.walls.push(WallSegment::at(sx, sy, self.tool_size as f64));
        self.drawing = true;
        SketchChange::WallStarted(self.walls.len() - 1)
    }

    fn move_wall_end(&mut self, pos: [f64; 2]) -> SketchChange {
        let [x, y] = self.to_layer(pos);
        let (sx, sy) = grid::snap(x, y);
        match self.walls.last_mut() {
            Some(wall) => {
                wall.set_end(sx, sy);
                SketchChange::WallMoved(self.walls.len() - 1)
            }
            None => {
                self.drawing = false;
                SketchChange::None
            }
        }
    }

    /// Canvas coordinates → drawing-layer coordinates
    fn to_layer(&self, pos: [f64; 2]) -> [f64; 2] {
        [pos[0] - self.viewport.origin[0], pos[1] - self.viewport.origin[1]]
    }

    // --- Canvas extension ---

    /// Start a drag-to-extend gesture; drawing input is suppressed until pointer up
    pub fn begin_extend(&mut self, direction: ExtendDirection) {
        self.drawing = false;
        self.extending = Some(direction);
    }

    /// Apply one button click worth of extension
    pub fn extend_by_button(&mut self, direction: ExtendDirection) -> bool {
        let step = self.limits.button_extend_step;
        self.extend(direction, step)
    }

    /// Grow or shrink the canvas by `step`; returns false when a shrink would
    /// go below the minimum size
    fn extend(&mut self, direction: ExtendDirection, step: f64) -> bool {
        let [min_w, min_h] = self.limits.min_canvas_size;
        let vp = &mut self.viewport;
        match direction {
            ExtendDirection::Right => vp.size[0] += step,
            ExtendDirection::Down => vp.size[1] += step,
            ExtendDirection::Left => {
                if vp.size[0] - step < min_w {
                    return false;
                }
                vp.size[0] -= step;
                vp.origin[0] += step;
            }
            ExtendDirection::Up => {
                if vp.size[1] - step < min_h {
                    return false;
                }
                vp.size[1] -= step;
                vp.origin[1] += step;
            }
        }
        true
    }

    /// Fit the canvas to the host window, keeping the startup size as a floor
    pub fn fit_to_host(&mut self, available: [f64; 2]) {
        let [base_w, base_h] = self.limits.canvas_size;
        self.viewport.size = [
            base_w.max(available[0] - 100.0),
            base_h.max(available[1] - 200.0),
        ];
    }

    // --- Labels ---

    /// Wall length in the active display unit, rounded to one decimal
    pub fn display_length(&self, wall: &WallSegment) -> f64 {
        let value = grid::to_display_units(wall.length(), self.units);
        (value * 10.0).round() / 10.0
    }

    pub fn length_label(&self, wall: &WallSegment) -> String {
        format!("{:.1} {}", self.display_length(wall), self.units.label())
    }

    /// "W unit × H unit" for the current canvas
    pub fn canvas_dimensions_label(&self) -> String {
        let factor = self.units.conversion_factor();
        let w = (self.viewport.width() / GRID_STEP * factor).round();
        let h = (self.viewport.height() / GRID_STEP * factor).round();
        let unit = self.units.label();
        format!("{w} {unit} × {h} {unit}")
    }

    // --- Handoff ---

    /// Copy the finished drawing out for the 3D viewer
    pub fn submit(&self) -> FloorplanLayout {
        FloorplanLayout::new(self.walls.clone(), self.units)
    }

    /// Replace the drawing with a loaded layout
    pub fn load_layout(&mut self, layout: FloorplanLayout) {
        self.walls = layout.walls;
        self.units = layout.units;
        self.drawing = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor() -> SketchEditor {
        SketchEditor::default()
    }

    fn drag(e: &mut SketchEditor, from: [f64; 2], moves: &[[f64; 2]]) {
        e.handle_pointer(PointerEvent::Down(from));
        for &m in moves {
            e.handle_pointer(PointerEvent::Move(m));
        }
        e.handle_pointer(PointerEvent::Up);
    }

    // --- Drawing ---

    #[test]
    fn test_drag_creates_snapped_wall() {
        let mut e = editor();
        drag(&mut e, [11.0, 9.0], &[[50.0, 7.0], [97.0, 3.0]]);
        assert_eq!(e.walls().len(), 1);
        assert_eq!(e.walls()[0].points, [20.0, 0.0, 100.0, 0.0]);
        assert_eq!(e.walls()[0].thickness, 3.0);
        assert!(!e.is_drawing());
    }

    #[test]
    fn test_committed_coordinates_are_grid_multiples() {
        let mut e = editor();
        drag(&mut e, [3.3, 47.1], &[[123.4, 9.9], [277.7, 351.2]]);
        drag(&mut e, [-13.0, 501.0], &[[88.8, 88.8]]);
        for wall in e.walls() {
            for v in wall.points {
                assert!(grid::is_on_grid(v), "{v} is off grid");
            }
        }
    }

    #[test]
    fn test_only_second_endpoint_moves() {
        let mut e = editor();
        e.handle_pointer(PointerEvent::Down([40.0, 40.0]));
        e.handle_pointer(PointerEvent::Move([200.0, 40.0]));
        e.handle_pointer(PointerEvent::Move([200.0, 120.0]));
        assert_eq!(e.walls()[0].start(), [40.0, 40.0]);
        assert_eq!(e.walls()[0].end(), [200.0, 120.0]);
    }

    #[test]
    fn test_click_without_move_keeps_point_wall() {
        let mut e = editor();
        drag(&mut e, [60.0, 60.0], &[]);
        assert_eq!(e.walls().len(), 1);
        assert!(e.walls()[0].is_degenerate());
    }

    #[test]
    fn test_move_without_drawing_is_ignored() {
        let mut e = editor();
        let change = e.handle_pointer(PointerEvent::Move([100.0, 100.0]));
        assert_eq!(change, SketchChange::None);
        assert!(e.walls().is_empty());
    }

    #[test]
    fn test_snap_is_relative_to_origin() {
        let mut e = editor();
        assert!(e.extend_by_button(ExtendDirection::Left));
        // origin.x is now 50
        drag(&mut e, [60.0, 0.0], &[[150.0, 0.0]]);
        assert_eq!(e.walls()[0].points, [20.0, 0.0, 100.0, 0.0]);
    }

    // --- Deleting ---

    #[test]
    fn test_delete_tool_removes_clicked_wall() {
        let mut e = editor();
        drag(&mut e, [0.0, 0.0], &[[100.0, 0.0]]);
        drag(&mut e, [0.0, 100.0], &[[100.0, 100.0]]);
        e.set_tool(SketchTool::Delete);
        let change = e.handle_pointer(PointerEvent::Down([50.0, 101.0]));
        assert_eq!(change, SketchChange::WallDeleted(1));
        assert_eq!(e.walls().len(), 1);
        assert_eq!(e.walls()[0].points, [0.0, 0.0, 100.0, 0.0]);
    }

    #[test]
    fn test_delete_tool_does_not_draw() {
        let mut e = editor();
        e.set_tool(SketchTool::Delete);
        drag(&mut e, [0.0, 0.0], &[[100.0, 0.0]]);
        assert!(e.walls().is_empty());
    }

    #[test]
    fn test_delete_out_of_range_is_noop() {
        let mut e = editor();
        assert!(e.delete_wall(3).is_none());
    }

    // --- Extending ---

    #[test]
    fn test_extend_gesture_suppresses_drawing() {
        let mut e = editor();
        e.begin_extend(ExtendDirection::Right);
        e.handle_pointer(PointerEvent::Down([10.0, 10.0]));
        e.handle_pointer(PointerEvent::Move([20.0, 10.0]));
        e.handle_pointer(PointerEvent::Move([30.0, 10.0]));
        assert_eq!(e.handle_pointer(PointerEvent::Up), SketchChange::ExtendFinished);
        assert!(e.walls().is_empty());
        assert_eq!(e.viewport().size, [840.0, 600.0]);
        assert!(!e.is_extending());
    }

    #[test]
    fn test_shrink_shifts_origin() {
        let mut e = editor();
        e.begin_extend(ExtendDirection::Up);
        e.handle_pointer(PointerEvent::Move([0.0, 0.0]));
        assert_eq!(e.viewport().size, [800.0, 580.0]);
        assert_eq!(e.viewport().origin, [0.0, 20.0]);
    }

    #[test]
    fn test_shrink_refuses_below_minimum() {
        let mut e = editor();
        // 800 -> 400 in eight clicks, the ninth is refused
        for _ in 0..8 {
            assert!(e.extend_by_button(ExtendDirection::Left));
        }
        assert!(!e.extend_by_button(ExtendDirection::Left));
        assert_eq!(e.viewport().size[0], 400.0);
        assert_eq!(e.viewport().origin[0], 400.0);
    }

    #[test]
    fn test_button_and_drag_steps_differ() {
        let mut e = editor();
        e.extend_by_button(ExtendDirection::Down);
        assert_eq!(e.viewport().size[1], 650.0);
        e.begin_extend(ExtendDirection::Down);
        e.handle_pointer(PointerEvent::Move([0.0, 0.0]));
        assert_eq!(e.viewport().size[1], 670.0);
    }

    #[test]
    fn test_fit_to_host_keeps_floor() {
        let mut e = editor();
        e.fit_to_host([1500.0, 1000.0]);
        assert_eq!(e.viewport().size, [1400.0, 800.0]);
        e.fit_to_host([600.0, 500.0]);
        assert_eq!(e.viewport().size, [800.0, 600.0]);
    }

    // --- Labels and tool state ---

    #[test]
    fn test_length_labels() {
        let mut e = editor();
        let wall = WallSegment::new([0.0, 0.0, 100.0, 0.0], 3.0);
        assert_eq!(e.length_label(&wall), "5.0 feet");
        e.set_units(Units::Meters);
        assert_eq!(e.length_label(&wall), "1.5 meters");
        assert_eq!(e.canvas_dimensions_label(), "12 meters × 9 meters");
    }

    #[test]
    fn test_tool_size_is_clamped() {
        let mut e = editor();
        e.set_tool_size(0);
        assert_eq!(e.tool_size(), 1);
        e.shrink_tool_size();
        assert_eq!(e.tool_size(), 1);
        e.set_tool_size(42);
        assert_eq!(e.tool_size(), 10);
        e.grow_tool_size();
        assert_eq!(e.tool_size(), 10);
    }

    #[test]
    fn test_submit_copies_layout() {
        let mut e = editor();
        drag(&mut e, [0.0, 0.0], &[[100.0, 0.0]]);
        let layout = e.submit();
        e.clear();
        assert_eq!(layout.walls.len(), 1);
        assert!(e.walls().is_empty());
    }
}
