//! PNG export of the 2D sketch.
//!
//! The canvas is rasterized from its display list with `imageproc`, so the
//! exported file does not depend on the GPU or on egui's text renderer.

use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_rect_mut, draw_line_segment_mut, Blend,
};
use imageproc::rect::Rect;
use thiserror::Error;

use crate::sketch::display::{SketchFrame, SketchShape};
use crate::state::sketch::{ExportOverlay, SketchEditor};

/// Pixel ratio used by the toolbar's download button
pub const DEFAULT_PIXEL_RATIO: f64 = 2.0;

/// Largest output edge in pixels
const MAX_EDGE_PX: u32 = 16_384;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("pixel ratio must be a positive finite number, got {0}")]
    InvalidPixelRatio(f64),
    #[error("canvas of {width}x{height} px exceeds the export limit")]
    TooLarge { width: f64, height: f64 },
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Export-time decoration for the editor.
///
/// Hides the grid and installs the overlay on creation, puts both back on
/// drop. Restoration therefore happens on every exit path.
struct ExportScope<'a> {
    editor: &'a mut SketchEditor,
    grid_was_visible: bool,
    previous_overlay: Option<ExportOverlay>,
}

impl<'a> ExportScope<'a> {
    fn enter(editor: &'a mut SketchEditor) -> Self {
        let grid_was_visible = editor.grid_visible;
        let previous_overlay = editor.overlay.replace(ExportOverlay::default());
        editor.grid_visible = false;
        Self {
            editor,
            grid_was_visible,
            previous_overlay,
        }
    }
}

impl Drop for ExportScope<'_> {
    fn drop(&mut self) {
        self.editor.overlay = self.previous_overlay.take();
        self.editor.grid_visible = self.grid_was_visible;
    }
}

impl SketchEditor {
    /// Render the drawing to PNG bytes at `pixel_ratio` pixels per canvas unit.
    ///
    /// The grid is hidden and a white backdrop plus watermark are added for the
    /// duration of the call only.
    pub fn export_png(&mut self, pixel_ratio: f64) -> Result<Vec<u8>, ExportError> {
        let scope = ExportScope::enter(self);
        let frame = scope.editor.display_list();
        let mut image = rasterize(&frame, pixel_ratio)?;
        drop(scope);
        // Float blending over the opaque backdrop can leave alpha at 254
        flatten_alpha(&mut image);

        let bytes = encode_png(&image)?;
        tracing::info!(
            width = image.width(),
            height = image.height(),
            bytes = bytes.len(),
            "sketch exported"
        );
        Ok(bytes)
    }
}

/// Paint a display list into a fresh RGBA image
pub fn rasterize(frame: &SketchFrame, pixel_ratio: f64) -> Result<RgbaImage, ExportError> {
    if !pixel_ratio.is_finite() || pixel_ratio <= 0.0 {
        return Err(ExportError::InvalidPixelRatio(pixel_ratio));
    }
    let width = (frame.size[0] * pixel_ratio).round();
    let height = (frame.size[1] * pixel_ratio).round();
    if !(1.0..=MAX_EDGE_PX as f64).contains(&width) || !(1.0..=MAX_EDGE_PX as f64).contains(&height) {
        return Err(ExportError::TooLarge { width, height });
    }

    let mut canvas = Blend(RgbaImage::new(width as u32, height as u32));
    let [ox, oy] = frame.origin;
    let px = |x: f64, y: f64| ((x + ox) * pixel_ratio, (y + oy) * pixel_ratio);

    for shape in &frame.shapes {
        match shape {
            SketchShape::Rect { min, size, color } => {
                let (x, y) = px(min[0], min[1]);
                fill_rect(&mut canvas, x, y, size[0] * pixel_ratio, size[1] * pixel_ratio, *color);
            }
            SketchShape::Line { points, color, .. } => {
                let (x1, y1) = px(points[0], points[1]);
                let (x2, y2) = px(points[2], points[3]);
                draw_line_segment_mut(
                    &mut canvas,
                    (x1 as f32, y1 as f32),
                    (x2 as f32, y2 as f32),
                    Rgba(*color),
                );
            }
            SketchShape::Stroke {
                points,
                width,
                color,
                ..
            } => {
                let (x1, y1) = px(points[0], points[1]);
                let (x2, y2) = px(points[2], points[3]);
                stroke_round(&mut canvas, [x1, y1, x2, y2], width * pixel_ratio, *color);
            }
            SketchShape::Text {
                pos,
                text,
                size,
                max_width,
                color,
            } => {
                let (x, y) = px(pos[0], pos[1]);
                let max_width = max_width.map(|w| w * pixel_ratio);
                draw_text(&mut canvas, [x, y], size * pixel_ratio, max_width, text, *color);
            }
        }
    }

    Ok(canvas.0)
}

/// Force every pixel fully opaque
fn flatten_alpha(image: &mut RgbaImage) {
    for pixel in image.pixels_mut() {
        pixel[3] = 255;
    }
}

/// Encode an image as PNG
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

fn fill_rect(canvas: &mut Blend<RgbaImage>, x: f64, y: f64, w: f64, h: f64, color: [u8; 4]) {
    let (w, h) = (w.ceil(), h.ceil());
    if w < 1.0 || h < 1.0 {
        return;
    }
    let rect = Rect::at(x.floor() as i32, y.floor() as i32).of_size(w as u32, h as u32);
    draw_filled_rect_mut(canvas, rect, Rgba(color));
}

/// Thick line with round caps, stamped as overlapping discs.
///
/// Stamping keeps zero-length walls visible as dots.
fn stroke_round(canvas: &mut Blend<RgbaImage>, p: [f64; 4], width: f64, color: [u8; 4]) {
    let radius = (width / 2.0).max(0.5);
    let (dx, dy) = (p[2] - p[0], p[3] - p[1]);
    let len = (dx * dx + dy * dy).sqrt();
    let spacing = (radius / 2.0).max(0.5);
    let steps = (len / spacing).ceil() as usize;
    // Opaque stamps only; overlapping translucent discs would darken
    let color = [color[0], color[1], color[2], 255];
    for i in 0..=steps {
        let t = if steps == 0 { 0.0 } else { i as f64 / steps as f64 };
        let center = ((p[0] + dx * t).round() as i32, (p[1] + dy * t).round() as i32);
        draw_filled_circle_mut(canvas, center, radius.round() as i32, Rgba(color));
    }
}

// ============================================================================
// Bitmap text
// ============================================================================

const GLYPH_COLS: usize = 5;
const GLYPH_ROWS: usize = 7;
/// Horizontal advance in glyph cells (glyph plus one cell of spacing)
const GLYPH_ADVANCE: f64 = 6.0;

/// Horizontal extent of `chars` glyphs with cells `cell_width` wide
fn text_width(chars: usize, cell_width: f64) -> f64 {
    (chars as f64 * GLYPH_ADVANCE - 1.0).max(0.0) * cell_width
}

/// Draw `text` with its top-left corner at `pos`, `size` pixels tall.
///
/// With `max_width` set, glyph cells are narrowed so the text fits.
fn draw_text(
    canvas: &mut Blend<RgbaImage>,
    pos: [f64; 2],
    size: f64,
    max_width: Option<f64>,
    text: &str,
    color: [u8; 4],
) {
    let cell_h = size / GLYPH_ROWS as f64;
    let mut cell_w = cell_h;
    if let Some(max) = max_width {
        let natural = text_width(text.chars().count(), cell_h);
        if natural > max {
            cell_w *= max / natural;
        }
    }
    // Cells are filled on whole pixels; keep the last column inside the budget
    let draw_w = cell_w.floor().max(1.0);

    let [x, y] = pos;
    let mut cursor = x;
    for ch in text.chars() {
        if let Some(rows) = glyph(ch) {
            for (r, bits) in rows.iter().enumerate() {
                for c in 0..GLYPH_COLS {
                    if bits & (1 << (GLYPH_COLS - 1 - c)) != 0 {
                        let gx = cursor + c as f64 * cell_w;
                        let gy = y + r as f64 * cell_h;
                        fill_rect(canvas, gx, gy, draw_w, cell_h, color);
                    }
                }
            }
        }
        cursor += GLYPH_ADVANCE * cell_w;
    }
}

/// 5x7 glyph rows, most significant of the low five bits is the left column.
/// Lowercase letters render as uppercase; unknown characters are blank.
fn glyph(ch: char) -> Option<[u8; GLYPH_ROWS]> {
    let rows = match ch.to_ascii_uppercase() {
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1E],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x11, 0x0A, 0x04, 0x04, 0x04],
        'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        _ => return None,
    };
    Some(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sketch::display::{WATERMARK_COLOR, WATERMARK_INSET, WATERMARK_MAX_WIDTH};
    use crate::state::sketch::PointerEvent;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    /// Blending goes through floats, allow one step of rounding
    fn close(a: [u8; 4], b: [u8; 4]) -> bool {
        a.iter().zip(b).all(|(x, y)| x.abs_diff(y) <= 1)
    }

    fn editor_with_wall() -> SketchEditor {
        let mut e = SketchEditor::default();
        e.handle_pointer(PointerEvent::Down([100.0, 100.0]));
        e.handle_pointer(PointerEvent::Move([300.0, 100.0]));
        e.handle_pointer(PointerEvent::Up);
        e
    }

    #[test]
    fn test_export_produces_png_at_pixel_ratio() {
        let mut e = editor_with_wall();
        let bytes = e.export_png(DEFAULT_PIXEL_RATIO).unwrap();
        assert_eq!(&bytes[..8], &PNG_SIGNATURE);

        let img = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (1600, 1200));
    }

    #[test]
    fn test_export_restores_grid_and_clears_overlay() {
        let mut e = editor_with_wall();
        e.export_png(1.0).unwrap();
        assert!(e.grid_visible);
        assert!(e.overlay.is_none());
        assert_eq!(e.walls().len(), 1);
    }

    #[test]
    fn test_failed_export_still_restores() {
        let mut e = editor_with_wall();
        let err = e.export_png(0.0).unwrap_err();
        assert!(matches!(err, ExportError::InvalidPixelRatio(_)));
        assert!(e.grid_visible);
        assert!(e.overlay.is_none());
    }

    #[test]
    fn test_exported_image_has_backdrop_wall_and_watermark() {
        let mut e = editor_with_wall();
        let img = image::load_from_memory(&e.export_png(2.0).unwrap())
            .unwrap()
            .to_rgba8();

        // Opaque backdrop under the translucent canvas fill
        let bg = img.get_pixel(10, 10);
        assert_eq!(bg[3], 255);
        assert!(bg[0] < 255);

        // Wall centerline at y = 100 canvas units
        let wall = img.get_pixel(400, 200);
        assert!(close(wall.0, crate::sketch::display::WALL_COLOR));

        // Top-left cell of the "D" in the watermark
        let mark = img.get_pixel(1402, 1142);
        assert!(close(mark.0, WATERMARK_COLOR));
    }

    #[test]
    fn test_exported_image_is_fully_opaque() {
        let mut e = editor_with_wall();
        let img = image::load_from_memory(&e.export_png(DEFAULT_PIXEL_RATIO).unwrap())
            .unwrap()
            .to_rgba8();
        assert!(img.pixels().all(|p| p[3] == 255));
    }

    #[test]
    fn test_watermark_fits_inside_image() {
        for ratio in [1.0, DEFAULT_PIXEL_RATIO, 3.0] {
            let mut e = SketchEditor::default();
            let img = image::load_from_memory(&e.export_png(ratio).unwrap())
                .unwrap()
                .to_rgba8();
            let rightmost = img
                .enumerate_pixels()
                .filter(|(_, _, p)| close(p.0, WATERMARK_COLOR))
                .map(|(x, _, _)| x)
                .max()
                .unwrap();

            let anchor = ((800.0 - WATERMARK_INSET[0]) * ratio) as u32;
            let budget = (WATERMARK_MAX_WIDTH * ratio) as u32;
            assert!(rightmost > anchor + budget / 2, "watermark squeezed at ratio {ratio}");
            assert!(rightmost <= anchor + budget, "watermark overruns at ratio {ratio}");
            assert!(rightmost + 5 < img.width());
        }
    }

    #[test]
    fn test_text_width_counts_spacing_between_glyphs() {
        assert_eq!(text_width(0, 3.0), 0.0);
        assert_eq!(text_width(1, 3.0), 15.0);
        assert_eq!(text_width(6, 1.0), 35.0);
    }

    #[test]
    fn test_hidden_grid_stays_hidden() {
        let mut e = SketchEditor::default();
        e.grid_visible = false;
        e.export_png(1.0).unwrap();
        assert!(!e.grid_visible);
    }

    #[test]
    fn test_glyph_lookup() {
        assert_eq!(glyph('d'), glyph('D'));
        assert!(glyph(' ').is_none());
        assert!(glyph('5').is_some());
    }
}
