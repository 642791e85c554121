//! Drawing on the working image and on mosaic tiles.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

use super::{draw_layout, layout_text, AnnotationStyle, LayoutMode, TextLayout};
use crate::grid::{BoxRect, PlateGrid, WellBox};

/// Draw the interior grid lines of `grid`, `thickness` px wide and centered
/// on each line position.
pub fn draw_grid_lines(img: &mut RgbImage, grid: &PlateGrid, color: Rgb<u8>, thickness: u32) {
    if thickness == 0 {
        return;
    }
    let (w, h) = img.dimensions();
    let half = (thickness / 2) as i32;
    for y in grid.horizontal_lines() {
        draw_filled_rect_mut(img, Rect::at(0, y as i32 - half).of_size(w, thickness), color);
    }
    for x in grid.vertical_lines() {
        draw_filled_rect_mut(img, Rect::at(x as i32 - half, 0).of_size(thickness, h), color);
    }
}

/// Outline `rect` with a `thickness` px stroke centered on its edges.
/// Parts outside the image are clipped.
pub fn draw_box_outline(img: &mut RgbImage, rect: BoxRect, color: Rgb<u8>, thickness: u32) {
    if thickness == 0 {
        return;
    }
    let half = (thickness / 2) as i32;
    let outer_w = (rect.width().max(0) as u32) + thickness;
    let outer_h = (rect.height().max(0) as u32) + thickness;
    let x0 = rect.x0 - half;
    let y0 = rect.y0 - half;

    let edges = [
        Rect::at(x0, y0).of_size(outer_w, thickness),
        Rect::at(x0, rect.y1 - half).of_size(outer_w, thickness),
        Rect::at(x0, y0).of_size(thickness, outer_h),
        Rect::at(rect.x1 - half, y0).of_size(thickness, outer_h),
    ];
    for edge in edges {
        draw_filled_rect_mut(img, edge, color);
    }
}

/// Lay out and draw `lines` across a whole mosaic tile.
pub fn annotate_tile<S: AsRef<str>>(
    tile: &mut RgbImage,
    lines: &[S],
    style: &AnnotationStyle,
) -> TextLayout {
    let bounds = BoxRect {
        x0: 0,
        y0: 0,
        x1: tile.width() as i32,
        y1: tile.height() as i32,
    };
    let layout = layout_text(lines, bounds, LayoutMode::Tile);
    draw_layout(tile, &layout, Rgb(style.tile_text_color));
    layout
}

/// Draw a well's sampling box and its text onto the annotated original.
pub fn annotate_overlay<S: AsRef<str>>(
    img: &mut RgbImage,
    well: &WellBox,
    lines: &[S],
    style: &AnnotationStyle,
) -> TextLayout {
    draw_box_outline(
        img,
        well.annotation_rect,
        Rgb(style.box_color),
        style.line_thickness,
    );
    let layout = layout_text(lines, well.annotation_rect, LayoutMode::Overlay);
    draw_layout(img, &layout, Rgb(style.overlay_text_color));
    layout
}
