//! Shared test utilities for synthetic plate images.

use image::{Rgb, RgbImage};

/// Uniformly colored `w x h` plate image.
pub(crate) fn solid_plate(w: u32, h: u32, rgb: [u8; 3]) -> RgbImage {
    RgbImage::from_pixel(w, h, Rgb(rgb))
}

/// Fill the `w x h` rectangle at `(x, y)` with `rgb`, clipped to the image.
pub(crate) fn paint_rect(img: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, rgb: [u8; 3]) {
    let x1 = (x + w).min(img.width());
    let y1 = (y + h).min(img.height());
    for yy in y..y1 {
        for xx in x..x1 {
            img.put_pixel(xx, yy, Rgb(rgb));
        }
    }
}

/// Count pixels of exactly `rgb`.
pub(crate) fn count_color(img: &RgbImage, rgb: [u8; 3]) -> usize {
    img.pixels().filter(|p| p.0 == rgb).count()
}

/// Count pixels that differ from `rgb`.
pub(crate) fn count_other(img: &RgbImage, rgb: [u8; 3]) -> usize {
    img.pixels().filter(|p| p.0 != rgb).count()
}
