//! Cached text and image composition for fixed parts of the screen.
//!
//! Renderers return a [`Surface`](crate::surface::Surface) that the host
//! blits into place, so the expensive work (font selection, image scaling)
//! happens once per size rather than once per frame.

pub mod footer;
pub mod time;

pub use footer::FooterRenderer;
pub use time::TimeRenderer;
