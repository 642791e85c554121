//! Adaptive on-image text annotation.
//!
//! The same layout routine serves two surfaces: each mosaic tile (box = the
//! tile) and the annotated original (box = the well's annotation rect). The
//! chosen scale differs between them because the boxes differ.
//!
//! Layout steps:
//! 1. base scale `clamp(min(w, h) * 0.004, 0.3, 1.0)`, measure all lines;
//! 2. if the widest line exceeds 80% of the box width, shrink proportionally
//!    (clamped to `[0.2, 1.0]`) and re-measure;
//! 3. overlay only: if the stacked height exceeds 30% of the box height,
//!    shrink again and re-measure;
//! 4. center the block vertically, keeping the first baseline inside a 5 px
//!    margin (the bottom bound wins when both cannot hold);
//! 5. center every line horizontally by its own width.

mod font;
mod overlay;

pub use font::{draw_text, measure_text, TextSize};
pub use overlay::{annotate_overlay, annotate_tile, draw_box_outline, draw_grid_lines};

use image::{Rgb, RgbImage};

use crate::grid::BoxRect;

const BASE_SCALE_PER_PX: f64 = 0.004;
const MIN_BASE_SCALE: f64 = 0.3;
const MIN_SCALE: f64 = 0.2;
const MAX_SCALE: f64 = 1.0;
const WIDTH_FILL: f64 = 0.8;
const OVERLAY_HEIGHT_FILL: f64 = 0.3;
/// Minimum distance kept between the text block and the box edges.
pub const EDGE_MARGIN_PX: i32 = 5;

/// Which surface a layout is computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    /// Mosaic tile: width constraint only.
    Tile,
    /// Annotation box on the original image: width and height constraints.
    Overlay,
}

/// Colors and stroke width used by the renderer.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AnnotationStyle {
    /// Grid lines on the annotated original.
    pub grid_color: [u8; 3],
    /// Sampling box outline on the annotated original.
    pub box_color: [u8; 3],
    /// Per-well text on the annotated original.
    pub overlay_text_color: [u8; 3],
    /// Per-well text on mosaic tiles.
    pub tile_text_color: [u8; 3],
    /// Stroke width of grid lines and box outlines, in pixels.
    pub line_thickness: u32,
}

impl Default for AnnotationStyle {
    fn default() -> Self {
        Self {
            grid_color: [0, 0, 255],
            box_color: [255, 0, 0],
            overlay_text_color: [255, 0, 0],
            tile_text_color: [0, 0, 0],
            line_thickness: 2,
        }
    }
}

/// One positioned line of text.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    /// Left edge.
    pub x: i32,
    pub baseline_y: i32,
    pub size: TextSize,
}

/// Result of fitting a list of lines into a box.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    pub scale: f64,
    pub lines: Vec<PlacedLine>,
    /// Widest measured line at `scale`.
    pub max_width: u32,
    /// Tallest measured line at `scale`.
    pub max_height: u32,
    /// Inter-line gap at `scale`.
    pub baseline: u32,
}

struct Measured {
    sizes: Vec<TextSize>,
    max_width: u32,
    max_height: u32,
    baseline: u32,
}

fn measure_all(lines: &[&str], scale: f64) -> Measured {
    let sizes: Vec<TextSize> = lines.iter().map(|l| measure_text(l, scale)).collect();
    Measured {
        max_width: sizes.iter().map(|s| s.width).max().unwrap_or(0),
        max_height: sizes.iter().map(|s| s.height).max().unwrap_or(0),
        baseline: sizes.iter().map(|s| s.baseline).max().unwrap_or(0),
        sizes,
    }
}

/// Choose a scale and position for `lines` inside `bounds`.
pub fn layout_text<S: AsRef<str>>(lines: &[S], bounds: BoxRect, mode: LayoutMode) -> TextLayout {
    let texts: Vec<&str> = lines.iter().map(|l| l.as_ref()).collect();
    let box_w = bounds.width().max(0);
    let box_h = bounds.height().max(0);

    let mut scale = (box_w.min(box_h) as f64 * BASE_SCALE_PER_PX).clamp(MIN_BASE_SCALE, MAX_SCALE);
    let mut m = measure_all(&texts, scale);

    let max_text_w = box_w as f64 * WIDTH_FILL;
    if m.max_width as f64 > max_text_w {
        scale = (scale * max_text_w / m.max_width as f64).clamp(MIN_SCALE, MAX_SCALE);
        m = measure_all(&texts, scale);
    }

    let n = texts.len() as i32;
    if mode == LayoutMode::Overlay && n > 0 {
        let max_text_h = box_h as f64 * OVERLAY_HEIGHT_FILL;
        let stacked = ((m.max_height + m.baseline) as i32 * n) as f64;
        if stacked > max_text_h {
            scale = (scale * max_text_h / stacked).clamp(MIN_SCALE, MAX_SCALE);
            m = measure_all(&texts, scale);
        }
    }

    let max_h = m.max_height as i32;
    let gap = m.baseline as i32;
    let line_step = max_h + gap;
    let total = max_h * n + gap * (n - 1).max(0);

    let centered = bounds.y0 + (box_h - total).div_euclid(2) + max_h;
    let lowest = bounds.y0 + EDGE_MARGIN_PX + max_h;
    let highest = bounds.y1 - EDGE_MARGIN_PX - gap - (n - 1).max(0) * line_step;
    let first_baseline = centered.max(lowest).min(highest);

    let placed = texts
        .iter()
        .zip(&m.sizes)
        .enumerate()
        .map(|(k, (text, size))| PlacedLine {
            text: (*text).to_string(),
            x: bounds.x0 + (box_w - size.width as i32).div_euclid(2),
            baseline_y: first_baseline + k as i32 * line_step,
            size: *size,
        })
        .collect();

    TextLayout {
        scale,
        lines: placed,
        max_width: m.max_width,
        max_height: m.max_height,
        baseline: m.baseline,
    }
}

/// Render a computed layout.
pub fn draw_layout(img: &mut RgbImage, layout: &TextLayout, color: Rgb<u8>) {
    for line in &layout.lines {
        draw_text(img, &line.text, line.x, line.baseline_y, layout.scale, color);
    }
}
