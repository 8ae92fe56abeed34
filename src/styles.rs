//! Pre-computed text and primitive styles.
//!
//! `TextStyle` and `PrimitiveStyle` constructors are const fn in
//! embedded-graphics 0.8, so the fixed styles live here as constants and the
//! draw functions reference them instead of building them every frame.
//! Character styles depend on a runtime font size (see [`crate::fonts`]) and
//! are built where they are used.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::primitives::PrimitiveStyle;
use embedded_graphics::text::{Alignment, Baseline, TextStyle, TextStyleBuilder};

use crate::colors::{GRAY, LIGHT_GRAY, NYSSE_BLUE};

// =============================================================================
// Text Alignment Styles
// =============================================================================

/// Left-aligned, vertically centred on the anchor. Stop name and headsigns.
pub const LEFT_MIDDLE: TextStyle = TextStyleBuilder::new()
    .alignment(Alignment::Left)
    .baseline(Baseline::Middle)
    .build();

/// Right-aligned, vertically centred on the anchor. Departure times.
pub const RIGHT_MIDDLE: TextStyle = TextStyleBuilder::new()
    .alignment(Alignment::Right)
    .baseline(Baseline::Middle)
    .build();

/// Centered both ways. Route badges and loading screen messages.
pub const CENTERED: TextStyle = TextStyleBuilder::new()
    .alignment(Alignment::Center)
    .baseline(Baseline::Middle)
    .build();

// =============================================================================
// Primitive Styles
// =============================================================================

/// Header bar background.
pub const HEADER_FILL: PrimitiveStyle<Rgb565> = PrimitiveStyle::with_fill(NYSSE_BLUE);

/// 1px separator between departure rows.
pub const DIVIDER_STYLE: PrimitiveStyle<Rgb565> = PrimitiveStyle::with_stroke(GRAY, 1);

/// Unfilled part of the embed progress bar.
pub const PROGRESS_TRACK: PrimitiveStyle<Rgb565> = PrimitiveStyle::with_fill(GRAY);

/// Filled part of the embed progress bar.
pub const PROGRESS_FILL: PrimitiveStyle<Rgb565> = PrimitiveStyle::with_fill(LIGHT_GRAY);
