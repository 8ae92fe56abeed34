//! Loading screen shown while the first departures are fetched.
//!
//! # Visual Layout
//!
//! ```text
//! ┌────────────────────────────────────┐
//! │                                    │
//! │              nysse.fi              │  brand, large
//! │        Loading stop 3522...        │  status, small
//! │                                    │
//! └────────────────────────────────────┘
//! ```
//!
//! The first fetch blocks the render thread, so the screen is drawn once
//! and presented before the request rather than animated.

use core::fmt::Write;

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::text::Text;
use embedded_graphics_simulator::{SimulatorDisplay, SimulatorEvent, Window};
use heapless::String;

use crate::colors::{LIGHT_GRAY, NYSSE_BLUE, WHITE};
use crate::fonts::select_font;
use crate::styles::CENTERED;

/// Brand text height as a fraction of the screen width.
const BRAND_WIDTH_DIVISOR: u32 = 10;

/// Draw the loading screen for `stopcode` over the whole display.
pub fn draw_loading_screen<D>(display: &mut D, stopcode: u32)
where
    D: DrawTarget<Color = Rgb565> + OriginDimensions,
{
    let size = display.size();
    display.clear(NYSSE_BLUE).ok();

    let center = Point::new(size.width as i32 / 2, size.height as i32 / 2);
    let brand_font = select_font(size.width / BRAND_WIDTH_DIVISOR);
    let status_font = select_font(brand_font.character_size.height / 2);

    Text::with_text_style("nysse.fi", center, MonoTextStyle::new(brand_font, WHITE), CENTERED)
        .draw(display)
        .ok();

    let mut status: String<32> = String::new();
    let _ = write!(status, "Loading stop {stopcode}...");
    let status_pos = center + Point::new(0, brand_font.character_size.height as i32);
    Text::with_text_style(&status, status_pos, MonoTextStyle::new(status_font, LIGHT_GRAY), CENTERED)
        .draw(display)
        .ok();
}

/// Present the loading screen in the simulator window.
///
/// Returns `false` if the window was closed.
pub fn run_loading_screen(display: &mut SimulatorDisplay<Rgb565>, window: &mut Window, stopcode: u32) -> bool {
    draw_loading_screen(display, stopcode);
    window.update(display);
    !window.events().any(|ev| matches!(ev, SimulatorEvent::Quit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Surface;

    #[test]
    fn test_loading_screen_fills_background() {
        let mut surface = Surface::new(Size::new(360, 640));
        draw_loading_screen(&mut surface, 3522);

        assert_eq!(surface.pixel(Point::new(0, 0)), Some(NYSSE_BLUE));
        assert_eq!(surface.pixel(Point::new(359, 639)), Some(NYSSE_BLUE));
    }

    #[test]
    fn test_loading_screen_draws_text_near_center() {
        let mut surface = Surface::new(Size::new(360, 640));
        draw_loading_screen(&mut surface, 3522);

        let has = |color| (280..360).any(|y| (0..360).any(|x| surface.pixel(Point::new(x, y)) == Some(color)));
        assert!(has(WHITE), "brand text should be drawn");
        assert!(has(LIGHT_GRAY), "status text should be drawn");
    }
}
