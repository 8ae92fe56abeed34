// Crate-level lints: Allow common graphics patterns that pedantic lints flag
#![allow(clippy::cast_possible_truncation)] // Intentional f32->i32, u32->i32 casts for pixel math
#![allow(clippy::cast_precision_loss)] // u32/i32->f32 in graphics calculations
#![allow(clippy::cast_possible_wrap)] // u32->i32 wrapping is acceptable for screen-sized values
#![allow(clippy::cast_sign_loss)] // i32->u32 where we know sign is positive
#![allow(clippy::too_many_arguments)] // draw functions take region, style and data together

//! Kiosk departure display for a single transit stop.
//!
//! The screen shows a header with the stop name and clock, the upcoming
//! departures, a rotating embed panel (currently the route map of each
//! departure in turn) with a progress bar, and a branded footer.
//!
//! ```text
//! config.json ──► Config ──► DepartureBoard ◄── StopSource ◄─┐
//!                                 │                          │
//!                                 ▼                          │ DigitransitClient
//!                         EmbedRotation ──► LineEmbed ◄── PatternSource
//!                                 │
//!                                 ▼
//!            widgets / renderers ──► Surface / SimulatorDisplay
//! ```
//!
//! All drawing is written against `DrawTarget<Color = Rgb565>`, so the same
//! code paints into the desktop simulator window and into off-screen
//! [`surface::Surface`]s that tests inspect pixel by pixel.

pub mod board;
pub mod colors;
pub mod config;
pub mod embeds;
pub mod fonts;
pub mod geometry;
pub mod layout;
pub mod render;
pub mod renderers;
pub mod screens;
pub mod styles;
pub mod surface;
pub mod transit;
pub mod widgets;
