//! Clock text.

use core::fmt::Write;

use embedded_graphics::pixelcolor::Rgb565;
use heapless::String;
use time::Time;

use crate::fonts::{SizedFont, render_text};
use crate::surface::Surface;

/// `HH:MM`, 24-hour.
pub fn format_time(time: Time) -> String<5> {
    let mut s = String::new();
    let _ = write!(s, "{:02}:{:02}", time.hour(), time.minute());
    s
}

pub struct TimeRenderer {
    font: SizedFont,
}

impl TimeRenderer {
    pub fn new() -> Self {
        Self {
            font: SizedFont::new("time rendering"),
        }
    }

    /// Render `time` as `HH:MM` using the tallest font that fits `px_height`.
    pub fn render_time(&mut self, px_height: u32, time: Time, color: Rgb565) -> Surface {
        let font = self.font.get_size(px_height);
        render_text(&format_time(time), font, color)
    }
}

impl Default for TimeRenderer {
    fn default() -> Self { Self::new() }
}
