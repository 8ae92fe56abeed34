//! Header bar and departure list.
//!
//! Both widgets clear their whole region before drawing, so the host can
//! redraw either one in isolation when its data changes without leaving
//! remnants of longer text behind.

use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, Rectangle};
use embedded_graphics::text::Text;
use time::UtcOffset;

use super::primitives::draw_route_badge;
use crate::colors::{BLACK, LIGHT_GRAY, WHITE};
use crate::fonts::text_size;
use crate::renderers::time::format_time;
use crate::styles::{DIVIDER_STYLE, HEADER_FILL, LEFT_MIDDLE, RIGHT_MIDDLE};
use crate::surface::Surface;
use crate::transit::Stoptime;

/// Route badges are wide enough for this many characters ("8B" plus padding).
const BADGE_CHARS: u32 = 4;

/// Longest prefix of `text` that fits in `max_width` pixels with `font`.
pub fn fit_text<'a>(text: &'a str, font: &MonoFont<'_>, max_width: u32) -> &'a str {
    let advance = font.character_size.width + font.character_spacing;
    if advance == 0 {
        return text;
    }
    // n glyphs take n * advance - spacing pixels
    let max_chars = ((max_width + font.character_spacing) / advance) as usize;
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Draw the header bar: stop name on the left, pre-rendered clock on the right.
pub fn draw_header<D>(
    display: &mut D,
    area: Rectangle,
    stop_name: &str,
    font: &MonoFont<'_>,
    clock: &Surface,
    spacing: u32,
) where
    D: DrawTarget<Color = Rgb565>,
{
    area.into_styled(HEADER_FILL).draw(display).ok();

    let mid_y = area.center().y;
    let clock_size = clock.size();
    let clock_x = area.top_left.x + area.size.width as i32 - spacing as i32 - clock_size.width as i32;
    clock
        .blit(display, Point::new(clock_x, mid_y - clock_size.height as i32 / 2))
        .ok();

    let name_width = (clock_x - area.top_left.x - 2 * spacing as i32).max(0) as u32;
    let name = fit_text(stop_name, font, name_width);
    Text::with_text_style(
        name,
        Point::new(area.top_left.x + spacing as i32, mid_y),
        MonoTextStyle::new(font, WHITE),
        LEFT_MIDDLE,
    )
    .draw(display)
    .ok();
}

/// Draw one row per departure: route badge, headsign, departure time.
///
/// ```text
/// [ 3 ] Hervanta                 12:36
/// ─────────────────────────────────────
/// [8B ] Atala                    12:41
/// ```
///
/// Realtime predictions are drawn in white, schedule-only times in gray.
/// Rows that don't fit in `area` are dropped.
pub fn draw_departures<D>(
    display: &mut D,
    area: Rectangle,
    rows: &[Stoptime],
    row_height: u32,
    font: &MonoFont<'_>,
    spacing: u32,
    offset: UtcOffset,
) where
    D: DrawTarget<Color = Rgb565>,
{
    display.fill_solid(&area, BLACK).ok();

    let fitting = (area.size.height / row_height.max(1)) as usize;
    let rows = &rows[..rows.len().min(fitting)];

    let left = area.top_left.x + spacing as i32;
    let right = area.top_left.x + area.size.width as i32 - spacing as i32;
    let badge_width = BADGE_CHARS * (font.character_size.width + font.character_spacing);
    let badge_height = row_height.saturating_sub(spacing).max(1);
    let time_width = text_size("00:00", font).width;

    for (i, departure) in rows.iter().enumerate() {
        let top = area.top_left.y + (i as u32 * row_height) as i32;
        let mid_y = top + row_height as i32 / 2;

        let badge = Rectangle::with_center(
            Point::new(left + badge_width as i32 / 2, mid_y),
            Size::new(badge_width, badge_height),
        );
        draw_route_badge(display, badge, &departure.route, font);

        if let Some(departs) = departure.departure_time(offset) {
            let color = if departure.realtime { WHITE } else { LIGHT_GRAY };
            Text::with_text_style(
                &format_time(departs.time()),
                Point::new(right, mid_y),
                MonoTextStyle::new(font, color),
                RIGHT_MIDDLE,
            )
            .draw(display)
            .ok();
        }

        let headsign_x = left + badge_width as i32 + spacing as i32;
        let headsign_width = (right - time_width as i32 - spacing as i32 - headsign_x).max(0) as u32;
        Text::with_text_style(
            fit_text(&departure.headsign, font, headsign_width),
            Point::new(headsign_x, mid_y),
            MonoTextStyle::new(font, WHITE),
            LEFT_MIDDLE,
        )
        .draw(display)
        .ok();

        if i + 1 < rows.len() {
            let y = top + row_height as i32 - 1;
            Line::new(Point::new(left, y), Point::new(right, y))
                .into_styled(DIVIDER_STYLE)
                .draw(display)
                .ok();
        }
    }
}

#[cfg(test)]
mod tests {
    use embedded_graphics::mono_font::ascii::FONT_6X10;
    use time::macros::offset;

    use super::*;
    use crate::colors::NYSSE_BLUE;
    use crate::transit::RouteInfo;

    fn departure(headsign: &str, realtime: bool) -> Stoptime {
        Stoptime {
            headsign: headsign.into(),
            route: RouteInfo {
                short_name: "3".into(),
                color: None,
            },
            pattern_code: "p".into(),
            service_day: 1_709_244_000,
            scheduled_departure: 8 * 3600,
            realtime_departure: 8 * 3600,
            realtime,
        }
    }

    #[test]
    fn test_fit_text() {
        // 6px glyphs, no spacing
        assert_eq!(fit_text("Hervanta", &FONT_6X10, 100), "Hervanta");
        assert_eq!(fit_text("Hervanta", &FONT_6X10, 30), "Herva");
        assert_eq!(fit_text("Hervanta", &FONT_6X10, 0), "");
        assert_eq!(fit_text("Pyynikintori", &FONT_6X10, 11), "P");
    }

    #[test]
    fn test_fit_text_multibyte() {
        assert_eq!(fit_text("Hämeenpuisto", &FONT_6X10, 12), "Hä");
    }

    #[test]
    fn test_header_fills_and_places_clock() {
        let mut surface = Surface::new(Size::new(200, 30));
        let clock = Surface::filled(Size::new(20, 10), WHITE);
        let area = Rectangle::new(Point::zero(), Size::new(200, 30));
        draw_header(&mut surface, area, "Keskustori", &FONT_6X10, &clock, 5);

        assert_eq!(surface.pixel(Point::new(199, 0)), Some(NYSSE_BLUE));
        // Clock spans x 175..195, y 9..19
        assert_eq!(surface.pixel(Point::new(175, 15)), Some(WHITE));
        assert_eq!(surface.pixel(Point::new(196, 15)), Some(NYSSE_BLUE));
    }

    #[test]
    fn test_departures_draw_rows_and_clear_rest() {
        let mut surface = Surface::filled(Size::new(200, 100), WHITE);
        let area = Rectangle::new(Point::zero(), Size::new(200, 100));
        let rows = [departure("Hervanta", true), departure("Atala", false)];
        draw_departures(&mut surface, area, &rows, 20, &FONT_6X10, 4, offset!(+2));

        // Badge of the first row uses the default route color
        assert_eq!(surface.pixel(Point::new(5, 10)), Some(NYSSE_BLUE));
        // Below the last row the region is cleared
        assert_eq!(surface.pixel(Point::new(100, 80)), Some(BLACK));
    }

    #[test]
    fn test_schedule_only_time_is_gray() {
        let mut surface = Surface::new(Size::new(200, 20));
        let area = Rectangle::new(Point::zero(), Size::new(200, 20));
        draw_departures(&mut surface, area, &[departure("Atala", false)], 20, &FONT_6X10, 4, offset!(+2));

        let time_region = (150..196).flat_map(|x| (0..20).map(move |y| Point::new(x, y)));
        let colors: Vec<_> = time_region.filter_map(|p| surface.pixel(p)).collect();
        assert!(colors.contains(&LIGHT_GRAY));
        assert!(!colors.contains(&WHITE));
    }
}
