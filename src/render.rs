//! Render state tracking for optimized display updates.
//!
//! The kiosk screen changes slowly: the clock once a minute, the departure
//! list once per successful poll, the footer only on resize. This module
//! tracks what was last drawn so the host loop only redraws regions whose
//! inputs changed.
//!
//! # Update Strategy
//!
//! | Element | Update Frequency | Strategy |
//! |---------|-----------------|----------|
//! | Header | On minute change / new stop data | Conditional redraw |
//! | Departures | On new board generation | Conditional redraw |
//! | Embed + progress | Every frame | Always redraw (progress animates) |
//! | Footer | Once per window size | Draw-once tracking |
//!
//! # Display Clears
//!
//! When the whole display has to be repainted (the loading screen is still
//! showing when the main loop takes over), call
//! [`RenderState::mark_display_cleared`] so every region is considered dirty
//! on the next frame. [`RenderState::needs_full_redraw`] tells the host when
//! to clear the display first.

use embedded_graphics::prelude::Size;
use time::{Date, OffsetDateTime};

/// Identifies the minute shown by the clock.
type MinuteKey = (Date, u8, u8);

fn minute_key(now: OffsetDateTime) -> MinuteKey { (now.date(), now.hour(), now.minute()) }

/// Tracks render state for conditional redraws of the kiosk regions.
pub struct RenderState {
    /// Whether this is the first frame (need full redraw).
    first_frame: bool,

    /// Whether the display was cleared since the last frame.
    display_cleared: bool,

    /// Minute the header clock last showed.
    prev_minute: Option<MinuteKey>,

    /// Board generation the header last showed (stop name).
    prev_header_generation: Option<u64>,

    /// Board generation the departure list last showed.
    prev_departures_generation: Option<u64>,

    /// Size the footer was last drawn at.
    footer_size: Option<Size>,
}

impl RenderState {
    /// Create a new render state for first frame.
    pub const fn new() -> Self {
        Self {
            first_frame: true,
            display_cleared: false,
            prev_minute: None,
            prev_header_generation: None,
            prev_departures_generation: None,
            footer_size: None,
        }
    }

    /// Whether every region is about to be redrawn (first frame or after a clear).
    #[inline]
    pub const fn needs_full_redraw(&self) -> bool { self.first_frame || self.display_cleared }

    /// Check if the header (stop name and clock) needs redrawing.
    pub fn check_header_dirty(&mut self, now: OffsetDateTime, generation: u64) -> bool {
        let minute = minute_key(now);
        let dirty = self.needs_full_redraw()
            || self.prev_minute != Some(minute)
            || self.prev_header_generation != Some(generation);

        self.prev_minute = Some(minute);
        self.prev_header_generation = Some(generation);
        dirty
    }

    /// Check if the departure list needs redrawing.
    pub fn check_departures_dirty(&mut self, generation: u64) -> bool {
        let dirty = self.needs_full_redraw() || self.prev_departures_generation != Some(generation);
        self.prev_departures_generation = Some(generation);
        dirty
    }

    /// Check if the footer needs drawing at `size`.
    pub fn check_footer_dirty(&mut self, size: Size) -> bool {
        let dirty = self.needs_full_redraw() || self.footer_size != Some(size);
        self.footer_size = Some(size);
        dirty
    }

    /// Mark that the display was cleared externally.
    pub const fn mark_display_cleared(&mut self) { self.display_cleared = true; }

    /// Call at end of frame to reset per-frame state.
    pub const fn end_frame(&mut self) {
        self.first_frame = false;
        self.display_cleared = false;
    }
}

impl Default for RenderState {
    fn default() -> Self { Self::new() }
}

// =============================================================================
// Unit Tests
// =============================================================================
