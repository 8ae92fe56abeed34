//! Full-screen views shown outside the main departure layout.
//!
//! - **Loading Screen** ([`loading`]): brand and status text while the first
//!   departures are fetched
//!
//! Screens that run in the simulator window return `false` if the window is
//! closed, so the application can exit before entering the main loop.

mod loading;

pub use loading::{draw_loading_screen, run_loading_screen};
