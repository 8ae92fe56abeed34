//! Transit data: stop departures and route pattern geometry.
//!
//! The display talks to a GraphQL transit API through two small traits so
//! the rest of the crate never depends on HTTP directly:
//!
//! - [`StopSource`]: upcoming departures for a stop (polled by the
//!   [`DepartureBoard`](crate::board::DepartureBoard)).
//! - [`PatternSource`]: the path a route pattern takes (drawn by the
//!   [`LineEmbed`](crate::embeds::line::LineEmbed)).
//!
//! [`DigitransitClient`] implements both. Tests substitute in-memory fakes.
//!
//! Every call is blocking and made from the render thread. A slow API stalls
//! the frame that issued the request, and nothing retries on failure.

mod client;

pub use client::{DigitransitClient, FEED_ID, stop_gtfs_id};

use embedded_graphics::pixelcolor::Rgb565;
use thiserror::Error;
use time::{OffsetDateTime, UtcOffset};

use crate::geometry::Coordinate;

/// Error type for transit API calls.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport failure, timeout or non-success HTTP status.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    /// Response body was not the expected JSON shape.
    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),
    /// The API answered with GraphQL errors.
    #[error("graphql error: {0}")]
    Graphql(String),
    /// The requested stop or pattern does not exist.
    #[error("{0} not found")]
    NotFound(String),
}

/// Route identity shown next to a departure or on a route map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteInfo {
    /// Line number as shown to passengers ("3", "8B").
    pub short_name: String,
    /// Route color, if the API supplied a valid one.
    pub color: Option<Rgb565>,
}

/// Ordered path of one route pattern.
#[derive(Clone, Debug, PartialEq)]
pub struct PatternGeometry {
    pub code: String,
    pub route: RouteInfo,
    pub points: Vec<Coordinate>,
}

/// One scheduled or predicted departure from the stop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stoptime {
    pub headsign: String,
    pub route: RouteInfo,
    /// Pattern the trip follows, used to look up its geometry.
    pub pattern_code: String,
    /// Unix time of the service day's reference midnight.
    pub service_day: i64,
    /// Seconds after `service_day`.
    pub scheduled_departure: i64,
    /// Seconds after `service_day`, equal to the schedule without realtime data.
    pub realtime_departure: i64,
    /// Whether `realtime_departure` is a live prediction.
    pub realtime: bool,
}

impl Stoptime {
    /// Best-known departure as a Unix timestamp.
    pub const fn departure_unix(&self) -> i64 { self.service_day + self.realtime_departure }

    /// Best-known departure in the given local offset.
    pub fn departure_time(&self, offset: UtcOffset) -> Option<OffsetDateTime> {
        OffsetDateTime::from_unix_timestamp(self.departure_unix())
            .ok()
            .map(|t| t.to_offset(offset))
    }
}

/// A stop's name and its upcoming departures.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StopDepartures {
    pub name: String,
    pub stoptimes: Vec<Stoptime>,
}

/// Fetches route pattern geometry.
pub trait PatternSource {
    fn fetch_pattern_geometry(&self, pattern_code: &str) -> Result<PatternGeometry, FetchError>;
}

/// Fetches upcoming departures for a stop.
pub trait StopSource {
    fn fetch_stop(&self, stopcode: u32, count: u32) -> Result<StopDepartures, FetchError>;
}
