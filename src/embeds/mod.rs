//! Rotating information panels shown below the departure list.
//!
//! An embed is any type implementing [`Embed`]. The host builds them by name
//! from the `enabled_embeds` setting with [`create`] and cycles through them
//! with an [`EmbedRotation`]:
//!
//! 1. `on_enable` when an embed becomes active
//! 2. `render` every frame while active, with `progress` going from 0 to 1
//! 3. `on_disable` once its `requested_duration` has elapsed
//!
//! Embeds draw into an off-screen [`Surface`] the size of the embed region,
//! which keeps the trait object-safe.

pub mod line;

use std::rc::Rc;
use std::time::{Duration, Instant};

use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::surface::Surface;
use crate::transit::{PatternSource, Stoptime};
use line::LineEmbed;

pub trait Embed {
    /// Registry name used in `enabled_embeds`.
    fn name(&self) -> &'static str;

    fn on_enable(&mut self);

    fn on_disable(&mut self);

    /// Called whenever the departure board has new data.
    fn update_departures(&mut self, _departures: &[Stoptime]) {}

    fn render(&mut self, surface: &mut Surface, content_spacing: u32, time: OffsetDateTime, progress: f32);

    /// How long this embed stays on screen per turn.
    fn requested_duration(&self) -> Duration;
}

/// Build an embed from an `enabled_embeds` entry (`name` or `name:arg:arg`).
///
/// Returns `None` and logs a warning for unknown names.
pub fn create<S>(entry: &str, source: &Rc<S>) -> Option<Box<dyn Embed>>
where
    S: PatternSource + 'static,
{
    let mut parts = entry.split(':');
    let name = parts.next().unwrap_or_default().trim();
    let args: Vec<&str> = parts.collect();

    match name {
        line::NAME => Some(Box::new(LineEmbed::new(Rc::clone(source), &args))),
        _ => {
            warn!(embed = name, "unknown embed, skipping");
            None
        }
    }
}

/// Build every embed in `entries`, skipping unknown names.
pub fn create_all<S>(entries: &[String], source: &Rc<S>) -> Vec<Box<dyn Embed>>
where
    S: PatternSource + 'static,
{
    entries.iter().filter_map(|entry| create(entry, source)).collect()
}

/// Cycles through embeds, giving each its requested time on screen.
pub struct EmbedRotation {
    embeds: Vec<Box<dyn Embed>>,
    active: usize,
    /// When the active embed was enabled. `None` before the first tick.
    started: Option<Instant>,
}

impl EmbedRotation {
    pub fn new(embeds: Vec<Box<dyn Embed>>) -> Self {
        Self {
            embeds,
            active: 0,
            started: None,
        }
    }

    pub fn is_empty(&self) -> bool { self.embeds.is_empty() }

    /// Forward new departures to every embed, active or not.
    pub fn update_departures(&mut self, departures: &[Stoptime]) {
        for embed in &mut self.embeds {
            embed.update_departures(departures);
        }
    }

    /// Advance the rotation to `now`.
    ///
    /// Returns the active embed and its progress in `[0, 1]`, or `None` when
    /// no embeds are configured.
    pub fn tick(&mut self, now: Instant) -> Option<(&mut dyn Embed, f32)> {
        if self.embeds.is_empty() {
            return None;
        }

        let started = match self.started {
            Some(started) => started,
            None => {
                self.embeds[self.active].on_enable();
                info!(embed = self.embeds[self.active].name(), "embed enabled");
                self.started = Some(now);
                now
            }
        };

        let mut elapsed = now.saturating_duration_since(started);
        if elapsed >= self.embeds[self.active].requested_duration() {
            self.embeds[self.active].on_disable();
            self.active = (self.active + 1) % self.embeds.len();
            self.embeds[self.active].on_enable();
            debug!(embed = self.embeds[self.active].name(), "embed switched");
            self.started = Some(now);
            elapsed = Duration::ZERO;
        }

        let embed = self.embeds[self.active].as_mut();
        let duration = embed.requested_duration();
        let progress = if duration.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f32() / duration.as_secs_f32()).clamp(0.0, 1.0)
        };
        Some((embed, progress))
    }

    /// Name of the active embed, once the rotation has started.
    #[cfg(test)]
    fn active_name(&self) -> Option<&'static str> {
        self.started?;
        self.embeds.get(self.active).map(|e| e.name())
    }
}
