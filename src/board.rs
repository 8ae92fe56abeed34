//! Departure board state.
//!
//! Holds the most recent successful fetch for the configured stop and decides
//! when the next one is due. A failed poll leaves the previous list on screen;
//! the next attempt waits a full `poll_rate` like any other.

use std::time::{Duration, Instant};

use tracing::{debug, error, info};

use crate::config::Config;
use crate::transit::{StopSource, Stoptime};

pub struct DepartureBoard {
    stopcode: u32,
    departure_count: u32,
    visible_count: Option<u32>,
    ignore_headsigns: Vec<String>,
    poll_interval: Duration,

    last_poll: Option<Instant>,
    stop_name: String,
    departures: Vec<Stoptime>,
    /// Bumped whenever `departures` or `stop_name` change.
    generation: u64,
}

impl DepartureBoard {
    pub fn from_config(config: &Config) -> Self {
        Self {
            stopcode: config.stopcode,
            departure_count: config.departure_count,
            visible_count: config.visible_count,
            ignore_headsigns: config.ignore_headsigns.clone(),
            poll_interval: config.poll_interval(),
            last_poll: None,
            stop_name: String::new(),
            departures: Vec::new(),
            generation: 0,
        }
    }

    /// Whether a poll is due at `now`.
    pub fn is_due(&self, now: Instant) -> bool {
        self.last_poll
            .is_none_or(|last| now.saturating_duration_since(last) >= self.poll_interval)
    }

    /// Fetch departures if a poll is due.
    ///
    /// Returns `true` only when new data replaced the board's contents.
    pub fn poll_if_due<S: StopSource + ?Sized>(&mut self, source: &S, now: Instant) -> bool {
        if !self.is_due(now) {
            return false;
        }
        self.last_poll = Some(now);

        match source.fetch_stop(self.stopcode, self.departure_count) {
            Ok(stop) => {
                let fetched = stop.stoptimes.len();
                let departures: Vec<_> = stop
                    .stoptimes
                    .into_iter()
                    .filter(|st| !self.ignore_headsigns.contains(&st.headsign))
                    .collect();
                debug!(fetched, kept = departures.len(), "departures updated");

                if self.stop_name != stop.name {
                    info!(stop = %stop.name, "showing stop");
                }
                if self.stop_name != stop.name || self.departures != departures {
                    self.generation += 1;
                }
                self.stop_name = stop.name;
                self.departures = departures;
                true
            }
            Err(e) => {
                error!(stopcode = self.stopcode, "failed to fetch departures: {e}");
                false
            }
        }
    }

    pub fn stop_name(&self) -> &str { &self.stop_name }

    pub fn departures(&self) -> &[Stoptime] { &self.departures }

    /// Rows to draw: `visible_count` if configured, otherwise as many as fit.
    pub fn visible(&self, max_rows: usize) -> &[Stoptime] {
        let rows = self.visible_count.map_or(max_rows, |n| n as usize);
        &self.departures[..rows.min(self.departures.len())]
    }

    pub fn generation(&self) -> u64 { self.generation }
}
