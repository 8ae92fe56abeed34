//! Low-level drawing primitives shared across widgets and embeds.
//!
//! # Route Line
//!
//! [`draw_route_line`] draws a remapped pattern as a connected polyline in
//! two passes: a wider dark outline first, then the route color on top. This
//! keeps light route colors readable against the embed background. The first
//! and last points get filled circles marking the terminal stops.
//!
//! # Progress Bar
//!
//! [`draw_progress_bar`] fills the track and then the elapsed fraction. The
//! fill width is clamped so out-of-range progress never draws past the track.

use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, Polyline, PrimitiveStyle, PrimitiveStyleBuilder, Rectangle};
use embedded_graphics::text::Text;

use crate::colors::{LINE_OUTLINE, NYSSE_BLUE, text_color_for_bg};
use crate::styles::{CENTERED, PROGRESS_FILL, PROGRESS_TRACK};
use crate::transit::RouteInfo;

/// Extra outline thickness on each side of the route stroke.
const OUTLINE_PX: u32 = 2;

/// Terminal stop markers are this many line widths across, plus their outline.
const MARKER_SCALE: u32 = 3;

/// Draw a route polyline with an outline and terminal markers.
///
/// # Parameters
/// - `points`: Pixel positions in drawing order
/// - `color`: Route color for the inner stroke and markers
/// - `width`: Inner stroke width in pixels (clamped to at least 1)
///
/// A single point draws only its marker. No points draws nothing.
pub fn draw_route_line<D>(display: &mut D, points: &[Point], color: Rgb565, width: u32)
where
    D: DrawTarget<Color = Rgb565>,
{
    let (Some(&first), Some(&last)) = (points.first(), points.last()) else {
        return;
    };
    let width = width.max(1);

    let outline_style = PrimitiveStyle::with_stroke(LINE_OUTLINE, width + OUTLINE_PX * 2);
    let route_style = PrimitiveStyle::with_stroke(color, width);

    if points.len() >= 2 {
        let line = Polyline::new(points);
        line.into_styled(outline_style).draw(display).ok();
        line.into_styled(route_style).draw(display).ok();
    }

    let marker_style = PrimitiveStyleBuilder::new()
        .fill_color(color)
        .stroke_color(LINE_OUTLINE)
        .stroke_width(OUTLINE_PX)
        .build();
    let diameter = width * MARKER_SCALE + OUTLINE_PX * 2;
    for center in [first, last] {
        Circle::with_center(center, diameter)
            .into_styled(marker_style)
            .draw(display)
            .ok();
    }
}

/// Draw a horizontal progress bar filling `area` left to right.
pub fn draw_progress_bar<D>(display: &mut D, area: Rectangle, progress: f32)
where
    D: DrawTarget<Color = Rgb565>,
{
    area.into_styled(PROGRESS_TRACK).draw(display).ok();

    let filled = (area.size.width as f32 * progress.clamp(0.0, 1.0)).round() as u32;
    if filled > 0 {
        Rectangle::new(area.top_left, Size::new(filled, area.size.height))
            .into_styled(PROGRESS_FILL)
            .draw(display)
            .ok();
    }
}

/// Draw a colored route badge with the line number centred in it.
///
/// Routes without a color use the brand blue. The text color is picked for
/// contrast against the badge.
pub fn draw_route_badge<D>(display: &mut D, area: Rectangle, route: &RouteInfo, font: &MonoFont<'_>)
where
    D: DrawTarget<Color = Rgb565>,
{
    let bg = route.color.unwrap_or(NYSSE_BLUE);
    area.into_styled(PrimitiveStyle::with_fill(bg)).draw(display).ok();

    let style = MonoTextStyle::new(font, text_color_for_bg(bg));
    Text::with_text_style(&route.short_name, area.center(), style, CENTERED)
        .draw(display)
        .ok();
}
