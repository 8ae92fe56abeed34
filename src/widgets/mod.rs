//! Widget components for the departure display.
//!
//! - [`header`]: Header bar (stop name, clock) and the departure rows
//! - [`primitives`]: Route line, route badge and progress bar
//!
//! Widgets are generic over `DrawTarget<Color = Rgb565>` so they draw the
//! same way into the simulator window and into an off-screen
//! [`Surface`](crate::surface::Surface).
//!
//! Fixed styles come from [`styles`](crate::styles). Text colors that depend
//! on a route color are picked with
//! [`text_color_for_bg`](crate::colors::text_color_for_bg).

mod header;
mod primitives;

pub use header::{draw_departures, draw_header, fit_text};
pub use primitives::{draw_progress_bar, draw_route_badge, draw_route_line};
