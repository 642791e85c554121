//! TrueType text rendering for well labels.
//!
//! Labels use an embedded DejaVu Sans Mono face. A layout scale of `1.0`
//! maps to a 28 px font, so the ascent at scale `s` is about `22 s` px and
//! every glyph advances the same width.

use std::sync::OnceLock;

use ab_glyph::{Font, FontRef, PxScale, ScaleFont};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};

/// Embedded font data - DejaVu Sans Mono.
const FONT_DATA: &[u8] = include_bytes!("../../assets/DejaVuSansMono.ttf");

/// Font pixel height at layout scale 1.0.
const PX_HEIGHT_AT_UNIT_SCALE: f64 = 28.0;

/// Pixel extents of one rendered line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextSize {
    pub width: u32,
    /// Font ascent above the baseline; independent of the line's content.
    pub height: u32,
    /// Font descent kept below the baseline before the next line.
    pub baseline: u32,
}

fn font() -> Option<&'static FontRef<'static>> {
    static FONT: OnceLock<Option<FontRef<'static>>> = OnceLock::new();
    FONT.get_or_init(|| match FontRef::try_from_slice(FONT_DATA) {
        Ok(font) => Some(font),
        Err(err) => {
            tracing::warn!("Failed to load label font: {}", err);
            None
        }
    })
    .as_ref()
}

fn px_scale(scale: f64) -> PxScale {
    PxScale::from((scale.max(0.0) * PX_HEIGHT_AT_UNIT_SCALE) as f32)
}

/// Measure `text` at `scale`. All-zero if the font is unavailable.
pub fn measure_text(text: &str, scale: f64) -> TextSize {
    let Some(font) = font() else {
        return TextSize::default();
    };
    let px = px_scale(scale);
    let scaled = font.as_scaled(px);
    let (width, _) = text_size(px, font, text);
    TextSize {
        width,
        height: scaled.ascent().round() as u32,
        baseline: (-scaled.descent()).round() as u32,
    }
}

/// Draw `text` with its left edge at `x` and its baseline at `baseline_y`.
///
/// Glyphs are anti-aliased against the existing pixels and clipped to the
/// image.
pub fn draw_text(
    img: &mut RgbImage,
    text: &str,
    x: i32,
    baseline_y: i32,
    scale: f64,
    color: Rgb<u8>,
) {
    let Some(font) = font() else {
        return;
    };
    let px = px_scale(scale);
    let ascent = font.as_scaled(px).ascent().round() as i32;
    draw_text_mut(img, color, x, baseline_y - ascent, px, font, text);
}
