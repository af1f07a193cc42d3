//! Application configuration structures.

use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Page requested once per run to obtain upstream session cookies
    #[serde(default = "defaults::source_url")]
    pub source_url: String,

    /// Base URL of the upstream read API
    #[serde(default = "defaults::api_url")]
    pub api_url: String,

    /// Path under `api_url` of the hourly readings endpoint
    #[serde(default = "defaults::data_path")]
    pub data_path: String,

    /// Distance between fetch windows, in hours
    #[serde(default = "defaults::dt_hours")]
    pub dt_hours: u32,

    /// Offset appended to upstream timestamps (e.g. `-0300`)
    #[serde(default = "defaults::utc_offset")]
    pub utc_offset: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Extra attempts for upstream reads that get no response at all
    #[serde(default)]
    pub retries: u32,

    /// Pause between window requests in milliseconds
    #[serde(default)]
    pub request_delay_ms: u64,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Downstream ingestion API
    #[serde(default)]
    pub api: ApiConfig,

    /// Station code to series id mapping, in declaration order
    #[serde(default)]
    pub codigos: StationMap,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load `primary`, or `fallback` with a warning when `primary` does not exist.
    pub fn load_with_fallback(primary: impl AsRef<Path>, fallback: impl AsRef<Path>) -> Result<Self> {
        let primary = primary.as_ref();
        if primary.is_file() {
            return Self::load(primary);
        }

        let fallback = fallback.as_ref();
        log::warn!(
            "Config file {} not found. Loading {}",
            primary.display(),
            fallback.display()
        );
        Self::load(fallback)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.source_url.trim().is_empty() {
            return Err(AppError::validation("source_url is empty"));
        }
        url::Url::parse(&self.source_url)?;
        if self.api_url.trim().is_empty() {
            return Err(AppError::validation("api_url is empty"));
        }
        url::Url::parse(&self.api_url)?;
        if self.dt_hours == 0 {
            return Err(AppError::validation("dt_hours must be > 0"));
        }
        if self.timeout_secs == 0 {
            return Err(AppError::validation("timeout_secs must be > 0"));
        }
        if !is_valid_offset(&self.utc_offset) {
            return Err(AppError::validation(format!(
                "utc_offset '{}' must look like -0300 or +0100",
                self.utc_offset
            )));
        }
        if self.api.url.trim().is_empty() {
            return Err(AppError::validation("api.url is empty"));
        }
        if self.codigos.is_empty() {
            return Err(AppError::validation("No stations defined in codigos"));
        }
        if self.api.token.trim().is_empty() {
            log::warn!("api.token is empty; uploads will be rejected by the server");
        }
        Ok(())
    }

    /// Resolve the series id configured for a station code.
    pub fn series_id(&self, code: &str) -> Result<i64> {
        self.codigos
            .get(code)
            .ok_or_else(|| AppError::UnknownStation(code.to_string()))
    }

    /// Configured stations in declaration order.
    pub fn stations(&self) -> &[Station] {
        self.codigos.as_slice()
    }

    /// Distance between consecutive fetch windows.
    pub fn window_step(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.dt_hours))
    }

    /// Suffix appended verbatim to upstream `fecha` values.
    pub fn timestamp_suffix(&self) -> String {
        format!(".000{}", self.utc_offset)
    }

    /// HTTP request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Pause between upstream window requests.
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_url: defaults::source_url(),
            api_url: defaults::api_url(),
            data_path: defaults::data_path(),
            dt_hours: defaults::dt_hours(),
            utc_offset: defaults::utc_offset(),
            timeout_secs: defaults::timeout(),
            retries: 0,
            request_delay_ms: 0,
            user_agent: defaults::user_agent(),
            api: ApiConfig::default(),
            codigos: defaults::codigos(),
        }
    }
}

fn is_valid_offset(offset: &str) -> bool {
    let bytes = offset.as_bytes();
    bytes.len() == 5
        && matches!(bytes[0], b'+' | b'-')
        && bytes[1..].iter().all(u8::is_ascii_digit)
}

/// Downstream ingestion API credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the a5 API
    #[serde(default = "defaults::a5_url")]
    pub url: String,

    /// Bearer token
    #[serde(default)]
    pub token: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: defaults::a5_url(),
            token: String::new(),
        }
    }
}

/// A configured tide gauge and the series it feeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Station {
    pub code: String,
    pub series_id: i64,
}

/// Ordered `codigos` table.
///
/// Deserialized from a TOML/JSON map but kept as a list so the fleet runs
/// stations in the order the file declares them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StationMap(Vec<Station>);

impl StationMap {
    pub fn new(stations: Vec<Station>) -> Self {
        Self(stations)
    }

    pub fn get(&self, code: &str) -> Option<i64> {
        self.0
            .iter()
            .find(|s| s.code == code)
            .map(|s| s.series_id)
    }

    pub fn as_slice(&self) -> &[Station] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for StationMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for station in &self.0 {
            map.serialize_entry(&station.code, &station.series_id)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for StationMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct StationMapVisitor;

        impl<'de> Visitor<'de> for StationMapVisitor {
            type Value = StationMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a table of station code to series id")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<StationMap, A::Error> {
                let mut stations: Vec<Station> = Vec::new();
                while let Some((code, series_id)) = access.next_entry::<String, i64>()? {
                    if stations.iter().any(|s| s.code == code) {
                        return Err(serde::de::Error::custom(format!(
                            "duplicate station code '{code}'"
                        )));
                    }
                    stations.push(Station { code, series_id });
                }
                Ok(StationMap(stations))
            }
        }

        deserializer.deserialize_map(StationMapVisitor)
    }
}

mod defaults {
    use super::{Station, StationMap};

    pub fn source_url() -> String {
        "https://shn.geoportal.hidro.gob.ar/".into()
    }
    pub fn api_url() -> String {
        "https://shn.geoportal.hidro.gob.ar".into()
    }
    pub fn data_path() -> String {
        "api/v1/AlturasHorarias/ValoresGrafico".into()
    }
    pub fn dt_hours() -> u32 {
        10
    }
    pub fn utc_offset() -> String {
        "-0300".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; sihn-sync/0.1)".into()
    }
    pub fn a5_url() -> String {
        "https://alerta.ina.gob.ar/a5".into()
    }
    pub fn codigos() -> StationMap {
        StationMap(vec![Station {
            code: "SFER".to_string(),
            series_id: 52,
        }])
    }
}
