//! Blocking GraphQL client for the Digitransit routing API.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use super::{FetchError, PatternGeometry, PatternSource, RouteInfo, StopDepartures, StopSource, Stoptime};
use crate::colors::parse_hex_color;
use crate::config::Credentials;
use crate::geometry::Coordinate;

/// GTFS feed that stop codes are resolved against.
pub const FEED_ID: &str = "tampere";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const SUBSCRIPTION_KEY_HEADER: &str = "digitransit-subscription-key";
const CLIENT_ID_HEADER: &str = "x-client-id";

const STOP_QUERY: &str = r"query Stop($id: String!, $count: Int!) {
  stop(id: $id) {
    name
    stoptimesWithoutPatterns(numberOfDepartures: $count) {
      scheduledDeparture
      realtimeDeparture
      realtime
      serviceDay
      headsign
      trip {
        pattern { code }
        route { shortName color }
      }
    }
  }
}";

const PATTERN_QUERY: &str = r"query Pattern($id: String!) {
  pattern(id: $id) {
    code
    route { shortName color }
    geometry { lat lon }
  }
}";

/// Full GTFS id for a numeric stop code.
pub fn stop_gtfs_id(stopcode: u32) -> String { format!("{FEED_ID}:{stopcode}") }

pub struct DigitransitClient {
    http: Client,
    endpoint: String,
    credentials: Option<Credentials>,
}

impl DigitransitClient {
    /// Requests go unauthenticated when `credentials` is `None`; the API will
    /// usually reject them, which surfaces as a [`FetchError::Http`].
    pub fn new(endpoint: impl Into<String>, credentials: Option<Credentials>) -> Result<Self, FetchError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            credentials,
        })
    }

    fn query<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T, FetchError> {
        let mut request = self.http.post(&self.endpoint).json(&GraphqlRequest { query, variables });
        if let Some(creds) = &self.credentials {
            request = request
                .header(SUBSCRIPTION_KEY_HEADER, &creds.client_secret)
                .header(CLIENT_ID_HEADER, &creds.client_id);
        }
        let body = request.send()?.error_for_status()?.text()?;
        parse_response(&body)
    }
}

impl PatternSource for DigitransitClient {
    fn fetch_pattern_geometry(&self, pattern_code: &str) -> Result<PatternGeometry, FetchError> {
        debug!(pattern_code, "fetching pattern geometry");
        let data: PatternData = self.query(PATTERN_QUERY, json!({ "id": pattern_code }))?;
        into_geometry(data, pattern_code)
    }
}

impl StopSource for DigitransitClient {
    fn fetch_stop(&self, stopcode: u32, count: u32) -> Result<StopDepartures, FetchError> {
        let id = stop_gtfs_id(stopcode);
        debug!(stop = %id, count, "fetching departures");
        let data: StopData = self.query(STOP_QUERY, json!({ "id": id, "count": count }))?;
        into_departures(data, &id)
    }
}

// =============================================================================
// Wire Format
// =============================================================================

#[derive(Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
    variables: Value,
}

#[derive(Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Deserialize)]
struct PatternData {
    pattern: Option<WirePattern>,
}

#[derive(Deserialize)]
struct WirePattern {
    code: String,
    route: WireRoute,
    geometry: Option<Vec<WireCoordinate>>,
}

#[derive(Deserialize)]
struct WireCoordinate {
    lat: f64,
    lon: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireRoute {
    short_name: Option<String>,
    color: Option<String>,
}

#[derive(Deserialize)]
struct StopData {
    stop: Option<WireStop>,
}

#[derive(Deserialize)]
struct WireStop {
    name: String,
    #[serde(rename = "stoptimesWithoutPatterns")]
    stoptimes: Option<Vec<WireStoptime>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireStoptime {
    scheduled_departure: i64,
    realtime_departure: i64,
    realtime: bool,
    service_day: i64,
    headsign: Option<String>,
    trip: WireTrip,
}

#[derive(Deserialize)]
struct WireTrip {
    pattern: WirePatternRef,
    route: WireRoute,
}

#[derive(Deserialize)]
struct WirePatternRef {
    code: String,
}

impl From<WireRoute> for RouteInfo {
    fn from(route: WireRoute) -> Self {
        Self {
            short_name: route.short_name.unwrap_or_default(),
            color: route.color.as_deref().and_then(parse_hex_color),
        }
    }
}

impl From<WireStoptime> for Stoptime {
    fn from(st: WireStoptime) -> Self {
        Self {
            headsign: st.headsign.unwrap_or_default(),
            route: st.trip.route.into(),
            pattern_code: st.trip.pattern.code,
            service_day: st.service_day,
            scheduled_departure: st.scheduled_departure,
            realtime_departure: st.realtime_departure,
            realtime: st.realtime,
        }
    }
}

/// Unwrap a GraphQL envelope, turning reported errors into [`FetchError::Graphql`].
fn parse_response<T: DeserializeOwned>(body: &str) -> Result<T, FetchError> {
    let response: GraphqlResponse<T> = serde_json::from_str(body)?;
    if !response.errors.is_empty() {
        let messages: Vec<_> = response.errors.into_iter().map(|e| e.message).collect();
        return Err(FetchError::Graphql(messages.join("; ")));
    }
    response
        .data
        .ok_or_else(|| FetchError::Graphql("response contained no data".into()))
}

fn into_geometry(data: PatternData, pattern_code: &str) -> Result<PatternGeometry, FetchError> {
    let pattern = data
        .pattern
        .ok_or_else(|| FetchError::NotFound(format!("pattern {pattern_code}")))?;
    Ok(PatternGeometry {
        code: pattern.code,
        route: pattern.route.into(),
        points: pattern
            .geometry
            .unwrap_or_default()
            .into_iter()
            .map(|c| Coordinate::new(c.lon, c.lat))
            .collect(),
    })
}

fn into_departures(data: StopData, stop_id: &str) -> Result<StopDepartures, FetchError> {
    let stop = data
        .stop
        .ok_or_else(|| FetchError::NotFound(format!("stop {stop_id}")))?;
    Ok(StopDepartures {
        name: stop.name,
        stoptimes: stop.stoptimes.unwrap_or_default().into_iter().map(Into::into).collect(),
    })
}
