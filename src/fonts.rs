//! Font selection by pixel height.
//!
//! Renderers ask for text "N pixels tall" because their regions scale with
//! the window. Only bitmap fonts are bundled, so [`SizedFont::get_size`]
//! picks the tallest font that still fits and remembers the choice per
//! height.

use std::collections::HashMap;

use embedded_graphics::mono_font::ascii::{FONT_4X6, FONT_5X8, FONT_6X10, FONT_6X13, FONT_9X15, FONT_10X20};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use profont::{PROFONT_12_POINT, PROFONT_14_POINT, PROFONT_18_POINT, PROFONT_24_POINT};
use tracing::debug;

use crate::surface::Surface;

/// Every bundled font, in no particular order.
const FONTS: [&MonoFont<'static>; 10] = [
    &FONT_4X6,
    &FONT_5X8,
    &FONT_6X10,
    &FONT_6X13,
    &FONT_9X15,
    &FONT_10X20,
    &PROFONT_12_POINT,
    &PROFONT_14_POINT,
    &PROFONT_18_POINT,
    &PROFONT_24_POINT,
];

/// Tallest bundled font whose glyphs fit in `px_height`, or the smallest font.
pub fn select_font(px_height: u32) -> &'static MonoFont<'static> {
    FONTS
        .into_iter()
        .filter(|f| f.character_size.height <= px_height)
        .max_by_key(|f| f.character_size.height)
        .or_else(|| FONTS.into_iter().min_by_key(|f| f.character_size.height))
        .unwrap_or(&FONT_6X10)
}

/// A named font source that caches the font chosen for each pixel height.
pub struct SizedFont {
    name: &'static str,
    sizes: HashMap<u32, &'static MonoFont<'static>>,
}

impl SizedFont {
    /// `name` only shows up in debug logs ("time rendering", "footer", ...).
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            sizes: HashMap::new(),
        }
    }

    /// Font for text `px_height` pixels tall.
    pub fn get_size(&mut self, px_height: u32) -> &'static MonoFont<'static> {
        let name = self.name;
        *self.sizes.entry(px_height).or_insert_with(|| {
            let font = select_font(px_height);
            debug!(
                font = name,
                px_height,
                glyph_height = font.character_size.height,
                "selecting font size"
            );
            font
        })
    }

    /// Number of heights resolved so far.
    pub fn cached_sizes(&self) -> usize { self.sizes.len() }
}

/// Pixel size `text` occupies when drawn with `font`.
pub fn text_size(text: &str, font: &MonoFont<'_>) -> Size {
    let chars = text.chars().count() as u32;
    if chars == 0 {
        return Size::new(0, font.character_size.height);
    }
    let width = chars * font.character_size.width + (chars - 1) * font.character_spacing;
    Size::new(width, font.character_size.height)
}

/// Render `text` onto a transparent surface that exactly fits it.
pub fn render_text(text: &str, font: &MonoFont<'_>, color: Rgb565) -> Surface {
    let mut surface = Surface::new(text_size(text, font));
    Text::with_baseline(text, Point::zero(), MonoTextStyle::new(font, color), Baseline::Top)
        .draw(&mut surface)
        .ok();
    surface
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::WHITE;

    #[test]
    fn test_select_font_fits_height() {
        for px in [6, 8, 10, 13, 15, 20, 24, 30, 48, 100] {
            let font = select_font(px);
            assert!(font.character_size.height <= px, "font too tall for {px}px");
        }
    }

    #[test]
    fn test_select_font_prefers_tallest_fit() {
        let font = select_font(20);
        assert!(font.character_size.height >= FONT_10X20.character_size.height);
    }

    #[test]
    fn test_select_font_tiny_falls_back_to_smallest() {
        assert_eq!(select_font(1).character_size, FONT_4X6.character_size);
    }

    #[test]
    fn test_sized_font_caches_per_height() {
        let mut font = SizedFont::new("test");
        let a = font.get_size(20);
        let b = font.get_size(20);
        assert!(core::ptr::eq(a, b));
        assert_eq!(font.cached_sizes(), 1);
        font.get_size(10);
        assert_eq!(font.cached_sizes(), 2);
    }

    #[test]
    fn test_text_size() {
        let size = text_size("12:34", &FONT_6X10);
        assert_eq!(size, Size::new(5 * 6, 10));
        assert_eq!(text_size("", &FONT_6X10), Size::new(0, 10));
    }

    #[test]
    fn test_render_text_draws_something() {
        let surface = render_text("88", &FONT_6X10, WHITE);
        assert_eq!(surface.size(), Size::new(12, 10));
        assert!(surface.opaque_pixel_count() > 0);
    }
}
