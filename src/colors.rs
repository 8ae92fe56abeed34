//! Color constants and color helpers for the departure display.
//!
//! The display works in `Rgb565` throughout, the same format the simulator
//! window and the off-screen [`Surface`](crate::surface::Surface) store.
//! Route colors arrive from the transit API as 24-bit hex strings and are
//! converted with [`parse_hex_color`].

use embedded_graphics::pixelcolor::{Rgb565, Rgb888, RgbColor};

// =============================================================================
// Standard Colors (from RgbColor trait)
// =============================================================================

/// Pure black. Screen background.
pub const BLACK: Rgb565 = Rgb565::BLACK;

/// Pure white. Default text color.
pub const WHITE: Rgb565 = Rgb565::WHITE;

// =============================================================================
// Custom Colors (application-specific)
// =============================================================================

/// Brand blue used for the header bar and as the fallback route color.
/// RGB888 #1C57CF expressed as RGB565 (3, 21, 25).
pub const NYSSE_BLUE: Rgb565 = Rgb565::new(3, 21, 25);

/// Dark gray for divider lines and the progress bar track.
pub const GRAY: Rgb565 = Rgb565::new(8, 16, 8);

/// Background of the embed area behind route maps.
pub const EMBED_BACKGROUND: Rgb565 = Rgb565::new(2, 5, 3);

/// Outline drawn under route lines so light route colors stay visible.
pub const LINE_OUTLINE: Rgb565 = Rgb565::new(1, 2, 1);

/// Light gray for secondary text (schedule-only times, status) and progress fill.
pub const LIGHT_GRAY: Rgb565 = Rgb565::new(22, 44, 22);

// =============================================================================
// Color Helpers
// =============================================================================

/// Parse a route color as sent by the transit API (`"1C57CF"` or `"#1c57cf"`).
///
/// Returns `None` for anything that is not exactly six hex digits.
pub fn parse_hex_color(hex: &str) -> Option<Rgb565> {
    let hex = hex.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let value = u32::from_str_radix(hex, 16).ok()?;
    let rgb = Rgb888::new((value >> 16) as u8, (value >> 8) as u8, value as u8);
    Some(Rgb565::from(rgb))
}

/// Pick black or white text for a given background.
///
/// Uses ITU-R BT.601 luminance with the integer approximation
/// `(77*R + 150*G + 29*B) >> 8` on 8-bit expanded channels.
pub fn text_color_for_bg(bg_color: Rgb565) -> Rgb565 {
    if luminance(bg_color) < 128 { WHITE } else { BLACK }
}

/// Perceptual luminance (0..=255) of an `Rgb565` color.
#[inline]
fn luminance(color: Rgb565) -> u32 {
    let r5 = u32::from(color.r());
    let g6 = u32::from(color.g());
    let b5 = u32::from(color.b());

    // Replicate high bits into low bits when expanding 5/6-bit channels
    let r8 = (r5 << 3) | (r5 >> 2);
    let g8 = (g6 << 2) | (g6 >> 4);
    let b8 = (b5 << 3) | (b5 >> 2);

    (r8 * 77 + g8 * 150 + b8 * 29) >> 8
}
