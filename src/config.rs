//! User configuration stored in `config.json`.
//!
//! The file is plain JSON preceded by a C-style comment block listing every
//! available setting with its type and default:
//!
//! ```text
//! /*
//! Available settings (json):
//!
//! stopcode: int (Default: 3522)
//! ...
//! client_secret: REQUIRED<str>
//! */
//! {
//!     "client_id": "...",
//!     "client_secret": "...",
//!     "stopcode": 1234
//! }
//! ```
//!
//! # Loading
//!
//! - Missing file: a warning is logged, the defaults are written out (comment
//!   block included) and returned.
//! - Comment blocks before the first `{` are stripped before parsing.
//! - Keys that are not settings are kept as-is (and logged) so a newer config
//!   survives a round trip through an older binary.
//! - Malformed JSON is an error. The host treats it as fatal at startup.
//!
//! # Saving
//!
//! Only settings that differ from their default are written. Required settings
//! (`client_id`, `client_secret`) are always written, as `null` when unset, so
//! the keys stay visible to whoever edits the file next.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use embedded_graphics::prelude::Size;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

/// Default GraphQL endpoint (Digitransit, Waltti router).
pub const DEFAULT_ENDPOINT: &str = "https://api.digitransit.fi/routing/v1/routers/waltti/index/graphql";

/// Path the host loads at startup and saves on quit.
pub const CONFIG_PATH: &str = "./config.json";

/// Settings that have no usable default and must be filled in by the user.
const REQUIRED_KEYS: [&str; 2] = ["client_id", "client_secret"];

/// Type names shown in the available-settings comment, in field order.
const SETTING_TYPES: [(&str, &str); 13] = [
    ("stopcode", "int"),
    ("ignore_headsigns", "list<str>"),
    ("departure_count", "int"),
    ("visible_count", "int | null"),
    ("poll_rate", "int"),
    ("endpoint", "str"),
    ("window_size", "list<int>"),
    ("fullscreen", "bool"),
    ("framerate", "int"),
    ("hide_mouse", "bool"),
    ("enabled_embeds", "list<str>"),
    ("client_id", "REQUIRED<str>"),
    ("client_secret", "REQUIRED<str>"),
];

static COMMENT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("comment block pattern is valid"));

/// Error type for config operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error while reading/writing the config file.
    #[error("config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Malformed JSON or a value of the wrong type.
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// The JSON document is valid but not an object.
    #[error("config root must be a JSON object")]
    NotAnObject,
}

/// API credentials, present only when both required settings are filled in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

/// All user-tunable settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Stop number as printed on the stop sign.
    pub stopcode: u32,
    /// Departures with one of these headsigns are hidden.
    pub ignore_headsigns: Vec<String>,
    /// How many departures to request from the API.
    pub departure_count: u32,
    /// Rows to show; `None` shows as many as fit.
    pub visible_count: Option<u32>,
    /// Seconds between departure polls.
    pub poll_rate: u64,
    pub endpoint: String,
    /// `[width, height]` in pixels.
    pub window_size: [u32; 2],
    pub fullscreen: bool,
    /// Frames per second; zero or negative runs uncapped.
    pub framerate: i32,
    pub hide_mouse: bool,
    /// Embed names (optionally `name:arg:arg`) in rotation order.
    pub enabled_embeds: Vec<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// Keys that are not settings, kept verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stopcode: 3522,
            ignore_headsigns: Vec::new(),
            departure_count: 10,
            visible_count: None,
            poll_rate: 30,
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            window_size: [360, 640],
            fullscreen: false,
            framerate: -1,
            hide_mouse: true,
            enabled_embeds: Vec::new(),
            client_id: None,
            client_secret: None,
            extra: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Load settings from `path`, creating the file with defaults when missing.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "no config found, creating one with default settings");
                let config = Self::default();
                config.save(path)?;
                return Ok(config);
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let value: Value = serde_json::from_str(&strip_comment_preamble(&content))?;
        if !value.is_object() {
            return Err(ConfigError::NotAnObject);
        }
        let config: Self = serde_json::from_value(value)?;
        for key in config.extra.keys() {
            warn!(key = %key, "unknown config key, keeping it as-is");
        }
        debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Write non-default settings to `path` below the available-settings comment.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let json = to_indented_json(&Value::Object(self.non_default_fields()?))?;
        let content = format!("/*\n{}\n*/\n{json}", Self::available_settings());
        fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Human-readable listing of every setting, its type and default.
    pub fn available_settings() -> String {
        let defaults = match serde_json::to_value(Self::default()) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };

        let mut out = String::from("Available settings (json):\n");
        for (key, type_name) in SETTING_TYPES {
            let _ = write!(out, "\n{key}: {type_name}");
            if REQUIRED_KEYS.contains(&key) {
                continue;
            }
            if let Some(default) = defaults.get(key) {
                let _ = write!(out, " (Default: {})", to_spaced_json(default));
            }
        }
        out
    }

    /// Window size as an embedded-graphics `Size`.
    pub fn window_size(&self) -> Size { Size::new(self.window_size[0], self.window_size[1]) }

    /// Interval between departure polls.
    pub fn poll_interval(&self) -> Duration { Duration::from_secs(self.poll_rate) }

    /// Target frame time, or `None` when running uncapped.
    pub fn frame_time(&self) -> Option<Duration> {
        u32::try_from(self.framerate)
            .ok()
            .filter(|fps| *fps > 0)
            .map(|fps| Duration::from_secs(1) / fps)
    }

    /// Both API credentials, if set.
    pub fn credentials(&self) -> Option<Credentials> {
        Some(Credentials {
            client_id: self.client_id.clone()?,
            client_secret: self.client_secret.clone()?,
        })
    }

    fn non_default_fields(&self) -> Result<Map<String, Value>, ConfigError> {
        let Value::Object(current) = serde_json::to_value(self)? else {
            return Err(ConfigError::NotAnObject);
        };
        let Value::Object(defaults) = serde_json::to_value(Self::default())? else {
            return Err(ConfigError::NotAnObject);
        };

        Ok(current
            .into_iter()
            .filter(|(key, value)| REQUIRED_KEYS.contains(&key.as_str()) || defaults.get(key) != Some(value))
            .collect())
    }
}

/// Remove `/* ... */` blocks that appear before the JSON body.
fn strip_comment_preamble(content: &str) -> String {
    match content.find('{') {
        Some(body_start) => {
            let (preamble, body) = content.split_at(body_start);
            let mut out = COMMENT_BLOCK.replace_all(preamble, "").into_owned();
            out.push_str(body);
            out
        }
        None => COMMENT_BLOCK.replace_all(content, "").into_owned(),
    }
}

/// Single-line JSON with a space after every `,` and `:`.
struct SpacedFormatter;

impl serde_json::ser::Formatter for SpacedFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }
}

/// Render a default for the settings comment, e.g. `[360, 640]`.
fn to_spaced_json(value: &Value) -> String {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, SpacedFormatter);
    match value.serialize(&mut ser) {
        Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
        Err(_) => value.to_string(),
    }
}

/// Pretty-print with 4-space indentation.
fn to_indented_json(value: &Value) -> Result<String, ConfigError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
