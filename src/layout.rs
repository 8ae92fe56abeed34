//! Screen regions for the departure display.
//!
//! The window size comes from the config, so the regions are computed once
//! at startup (and again if the size ever changes) instead of being
//! compile-time constants. All drawing code positions itself from a
//! [`Layout`] rather than recomputing fractions every frame.
//!
//! ```text
//! ┌──────────────────────────────┐
//! │ Stop name             12:34  │  header   (1/12 of height)
//! ├──────────────────────────────┤
//! │ 3   Hervanta          12:36  │
//! │ 8   Atala             12:41  │  departures (rest)
//! │ ...                          │
//! ├──────────────────────────────┤
//! │                              │
//! │       embed (route map)      │  embed    (3/8 of height)
//! │                              │
//! ├══════════════════════════════┤  progress bar
//! │            nysse.fi  [icons] │  footer   (1/16 of height)
//! └──────────────────────────────┘
//! ```

use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

// =============================================================================
// Proportions
// =============================================================================

/// Header height as a fraction of the screen height (numerator, denominator).
const HEADER_FRACTION: (u32, u32) = (1, 12);

/// Embed height as a fraction of the screen height.
const EMBED_FRACTION: (u32, u32) = (3, 8);

/// Footer height as a fraction of the screen height.
const FOOTER_FRACTION: (u32, u32) = (1, 16);

/// Number of departure rows that fit is height / this.
const ROW_DIVISOR: u32 = 16;

/// Progress bar thickness in pixels.
pub const PROGRESS_BAR_HEIGHT: u32 = 3;

/// Minimum row height so tiny windows still render legible text.
const MIN_ROW_HEIGHT: u32 = 12;

#[inline]
const fn fraction(total: u32, (num, den): (u32, u32)) -> u32 { total * num / den }

/// Pixel rectangles for every screen region.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    pub screen: Size,
    pub header: Rectangle,
    pub departures: Rectangle,
    pub embed: Rectangle,
    pub progress: Rectangle,
    pub footer: Rectangle,
    /// Height of one departure row.
    pub row_height: u32,
    /// Gap between text and region edges.
    pub content_spacing: u32,
}

impl Layout {
    /// Compute all regions for a screen of `screen` pixels.
    pub fn new(screen: Size) -> Self {
        let w = screen.width;
        let h = screen.height;

        let header_h = fraction(h, HEADER_FRACTION);
        let embed_h = fraction(h, EMBED_FRACTION);
        let footer_h = fraction(h, FOOTER_FRACTION);
        let departures_h = h.saturating_sub(header_h + embed_h + PROGRESS_BAR_HEIGHT + footer_h);

        let departures_y = header_h;
        let embed_y = departures_y + departures_h;
        let progress_y = embed_y + embed_h;
        let footer_y = progress_y + PROGRESS_BAR_HEIGHT;

        Self {
            screen,
            header: Rectangle::new(Point::zero(), Size::new(w, header_h)),
            departures: Rectangle::new(Point::new(0, departures_y as i32), Size::new(w, departures_h)),
            embed: Rectangle::new(Point::new(0, embed_y as i32), Size::new(w, embed_h)),
            progress: Rectangle::new(Point::new(0, progress_y as i32), Size::new(w, PROGRESS_BAR_HEIGHT)),
            footer: Rectangle::new(Point::new(0, footer_y as i32), Size::new(w, footer_h)),
            row_height: (h / ROW_DIVISOR).max(MIN_ROW_HEIGHT),
            content_spacing: (h / 64).max(2),
        }
    }

    /// How many departure rows fit in the departures region.
    pub fn max_rows(&self) -> usize { (self.departures.size.height / self.row_height) as usize }
}
