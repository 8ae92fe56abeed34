#![allow(clippy::cast_possible_truncation)] // u32 pixel math on screen-sized values

//! Desktop kiosk host for the departure display.
//!
//! Loads `./config.json` (writing the defaults on first run), opens a
//! simulator window of the configured size and runs the frame loop until the
//! window is closed. The configuration is saved again on quit.
//!
//! # Frame Loop
//!
//! | Step | Frequency |
//! |------|-----------|
//! | Poll departures | Every `poll_rate` seconds |
//! | Header (stop name, clock) | On minute change / new data |
//! | Departure rows | On new data |
//! | Embed + progress bar | Every frame |
//! | Footer | Once per window size |
//!
//! Frames are paced to `framerate`; zero or negative runs uncapped.
//!
//! # Logging
//!
//! Controlled by `RUST_LOG` (default `info`), e.g.
//! `RUST_LOG=nysse_display=debug`.
//!
//! # Local Time
//!
//! The local UTC offset is read once at startup, before any threads exist,
//! and falls back to UTC if it can't be determined.

use std::rc::Rc;
use std::thread;
use std::time::Instant;

use anyhow::{Context, Result};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics_simulator::{OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window};
use nysse_display::board::DepartureBoard;
use nysse_display::colors::{BLACK, EMBED_BACKGROUND, WHITE};
use nysse_display::config::{CONFIG_PATH, Config};
use nysse_display::embeds::{self, EmbedRotation};
use nysse_display::fonts::SizedFont;
use nysse_display::layout::Layout;
use nysse_display::render::RenderState;
use nysse_display::renderers::{FooterRenderer, TimeRenderer};
use nysse_display::screens::run_loading_screen;
use nysse_display::surface::Surface;
use nysse_display::transit::DigitransitClient;
use nysse_display::widgets::{draw_departures, draw_header, draw_progress_bar};
use time::{OffsetDateTime, UtcOffset};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const WINDOW_TITLE: &str = "Nysse departures";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let offset = UtcOffset::current_local_offset().unwrap_or_else(|e| {
        warn!("could not determine local UTC offset, using UTC: {e}");
        UtcOffset::UTC
    });

    let config = Config::load(CONFIG_PATH).with_context(|| format!("failed to load {CONFIG_PATH}"))?;
    run(&config, offset)?;
    config
        .save(CONFIG_PATH)
        .with_context(|| format!("failed to save {CONFIG_PATH}"))
}

fn run(config: &Config, offset: UtcOffset) -> Result<()> {
    let credentials = config.credentials();
    if credentials.is_none() {
        warn!("client_id and client_secret are not set, the API will likely reject requests");
    }
    if config.fullscreen {
        warn!("fullscreen is not supported by the simulator window, ignoring");
    }
    if config.hide_mouse {
        info!("hide_mouse is not supported by the simulator window, ignoring");
    }

    let client = Rc::new(
        DigitransitClient::new(config.endpoint.clone(), credentials).context("failed to build HTTP client")?,
    );

    let layout = Layout::new(config.window_size());
    let mut display: SimulatorDisplay<Rgb565> = SimulatorDisplay::new(layout.screen);
    let output_settings = OutputSettingsBuilder::new().scale(1).build();
    let mut window = Window::new(WINDOW_TITLE, &output_settings);

    if !run_loading_screen(&mut display, &mut window, config.stopcode) {
        return Ok(());
    }

    // ==========================================================================
    // Main Loop State
    // ==========================================================================

    let mut board = DepartureBoard::from_config(config);
    let mut rotation = EmbedRotation::new(embeds::create_all(&config.enabled_embeds, &client));
    if rotation.is_empty() {
        info!("no embeds enabled");
    }

    let mut render_state = RenderState::new();
    // The loading screen is still on the display
    render_state.mark_display_cleared();
    let mut time_renderer = TimeRenderer::new();
    let mut footer_renderer = FooterRenderer::new();
    let mut header_font = SizedFont::new("header");
    let mut row_font = SizedFont::new("departures");
    let mut embed_surface = Surface::new(layout.embed.size);
    let mut fed_generation = None;
    let frame_time = config.frame_time();

    info!(stopcode = config.stopcode, width = layout.screen.width, height = layout.screen.height, "display started");

    // ==========================================================================
    // Main Render Loop
    // ==========================================================================

    'frames: loop {
        let frame_start = Instant::now();

        for ev in window.events() {
            if matches!(ev, SimulatorEvent::Quit) {
                break 'frames;
            }
        }

        let now = OffsetDateTime::now_utc().to_offset(offset);

        board.poll_if_due(client.as_ref(), frame_start);
        let generation = board.generation();
        if fed_generation != Some(generation) {
            rotation.update_departures(board.departures());
            fed_generation = Some(generation);
        }

        if render_state.needs_full_redraw() {
            display.clear(BLACK).ok();
        }

        if render_state.check_header_dirty(now, generation) {
            let header_height = layout.header.size.height;
            let clock = time_renderer.render_time(header_height * 3 / 5, now.time(), WHITE);
            draw_header(
                &mut display,
                layout.header,
                board.stop_name(),
                header_font.get_size(header_height / 2),
                &clock,
                layout.content_spacing,
            );
        }

        if render_state.check_departures_dirty(generation) {
            draw_departures(
                &mut display,
                layout.departures,
                board.visible(layout.max_rows()),
                layout.row_height,
                row_font.get_size(layout.row_height / 2),
                layout.content_spacing,
                offset,
            );
        }

        if let Some((embed, progress)) = rotation.tick(frame_start) {
            embed_surface.clear(EMBED_BACKGROUND).ok();
            embed.render(&mut embed_surface, layout.content_spacing, now, progress);
            embed_surface.blit(&mut display, layout.embed.top_left).ok();
            draw_progress_bar(&mut display, layout.progress, progress);
        }

        if render_state.check_footer_dirty(layout.footer.size) {
            display.fill_solid(&layout.footer, BLACK).ok();
            footer_renderer
                .render_footer(layout.footer.size)
                .blit(&mut display, layout.footer.top_left)
                .ok();
        }

        render_state.end_frame();
        window.update(&display);

        if let Some(rest) = frame_time.and_then(|target| target.checked_sub(frame_start.elapsed())) {
            thread::sleep(rest);
        }
    }

    info!("window closed");
    Ok(())
}
