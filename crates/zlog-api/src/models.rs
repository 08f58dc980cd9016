// Wire models for the ZLog backend.
//
// Every type here is deserialized leniently: absent or null fields fall
// back to defaults so a partially populated record never fails a whole
// payload. List endpoints go through `Listing`, which accepts both the
// bare-array and the wrapped-object shapes the backend has used.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

// ── Identifiers ─────────────────────────────────────────────────────

/// A record identifier as sent by the backend: numeric or textual.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Identifier of a project, always carried as a string on the client.
///
/// The backend may emit it as a number; both forms deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProjectId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for ProjectId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl<'de> Deserialize<'de> for ProjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RecordId::deserialize(deserializer).map(|id| Self(id.to_string()))
    }
}

// ── Project ─────────────────────────────────────────────────────────

/// A project owning a stream of request logs.
///
/// The API key is a secret: it is held in a [`SecretString`], redacted
/// from `Debug`, and only exposed through [`Project::api_key`].
#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "secret_opt")]
    api_key: Option<SecretString>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Project {
    pub fn new(
        id: impl Into<ProjectId>,
        name: impl Into<String>,
        api_key: Option<SecretString>,
        created_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            api_key,
            created_at,
        }
    }

    /// Name for display; falls back to the id for unnamed projects.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            self.id.as_str()
        } else {
            &self.name
        }
    }

    /// The ingestion API key, if the backend returned one.
    pub fn api_key(&self) -> Option<&SecretString> {
        self.api_key.as_ref()
    }

    /// The API key with everything but its edges hidden.
    pub fn masked_api_key(&self) -> Option<String> {
        self.api_key.as_ref().map(|k| mask_secret(k.expose_secret()))
    }
}

/// Mask a secret for display: `abcd…wxyz`, or all bullets when too short
/// to reveal anything safely.
pub fn mask_secret(secret: &str) -> String {
    let len = secret.chars().count();
    if len <= 8 {
        return "•".repeat(len.max(4));
    }
    let head: String = secret.chars().take(4).collect();
    let tail: String = secret.chars().skip(len - 4).collect();
    format!("{head}…{tail}")
}

// ── LogEntry ────────────────────────────────────────────────────────

/// One logged API request. Order within a page is the backend's.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LogEntry {
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_default")]
    pub method: String,
    #[serde(default, deserialize_with = "null_default")]
    pub path: String,
    #[serde(default, deserialize_with = "null_default")]
    pub status: u16,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default, deserialize_with = "lenient_millis")]
    pub latency_ms: Option<u64>,
    #[serde(default)]
    pub message: Option<String>,
}

impl LogEntry {
    /// Stable key for list rendering: the id, or a composite of the row's
    /// timestamp, path and method when the backend sent none.
    pub fn row_key(&self) -> String {
        match &self.id {
            Some(id) => id.to_string(),
            None => format!(
                "{}-{}-{}",
                self.time.map(|t| t.timestamp_millis()).unwrap_or_default(),
                self.path,
                self.method
            ),
        }
    }
}

// ── StatsSnapshot ───────────────────────────────────────────────────

/// Aggregate counters for one project. Missing fields read as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StatsSnapshot {
    #[serde(deserialize_with = "null_default")]
    pub total: u64,
    #[serde(alias = "last24h", deserialize_with = "null_default")]
    pub last_24h: u64,
    #[serde(deserialize_with = "lenient_counts")]
    pub by_status: BTreeMap<String, u64>,
}

impl StatsSnapshot {
    /// Count for a status class (`"5xx"`) or exact code (`"404"`); 0 if absent.
    pub fn count_for(&self, key: &str) -> u64 {
        self.by_status.get(key).copied().unwrap_or(0)
    }

    /// Server-error count (the `"5xx"` bucket).
    pub fn errors(&self) -> u64 {
        self.count_for("5xx")
    }
}

// ── Snippets ────────────────────────────────────────────────────────

/// Integration snippet templates served by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Snippets {
    #[serde(default)]
    pub express: Option<String>,
    #[serde(default)]
    pub hono: Option<String>,
}

// ── Listing normalization ───────────────────────────────────────────

/// Raw body of a list endpoint, prior to normalization.
///
/// Contract: the backend returns either a bare array of records or an
/// object wrapping that array under a named field. Both normalize to the
/// same `Vec<T>`. Any other shape normalizes to an empty list, and
/// individual records that fail to decode are skipped.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct Listing(Value);

impl Listing {
    pub fn new(body: Value) -> Self {
        Self(body)
    }

    /// Normalize into the record sequence, preserving backend order.
    pub fn into_items<T: DeserializeOwned>(self, field: &str) -> Vec<T> {
        let raw = match self.0 {
            Value::Array(items) => items,
            Value::Object(mut map) => match map.remove(field) {
                Some(Value::Array(items)) => items,
                _ => {
                    warn!(field, "list response has no array under expected field");
                    return Vec::new();
                }
            },
            other => {
                warn!(kind = value_kind(&other), "unrecognized list response shape");
                return Vec::new();
            }
        };

        let total = raw.len();
        let items: Vec<T> = raw
            .into_iter()
            .filter_map(|v| match serde_json::from_value(v) {
                Ok(item) => Some(item),
                Err(e) => {
                    debug!(error = %e, "skipping malformed record");
                    None
                }
            })
            .collect();
        if items.len() < total {
            warn!(skipped = total - items.len(), field, "dropped malformed records");
        }
        items
    }
}

fn value_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ── Lenient field helpers ───────────────────────────────────────────

/// Treat an explicit `null` like an absent field.
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Status buckets with `null` counts read as zero instead of failing the
/// whole snapshot.
fn lenient_counts<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<String, u64>, D::Error> {
    Ok(Option::<BTreeMap<String, Option<u64>>>::deserialize(deserializer)?
        .unwrap_or_default()
        .into_iter()
        .map(|(status, count)| (status, count.unwrap_or(0)))
        .collect())
}

fn secret_opt<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<SecretString>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?
        .filter(|s| !s.is_empty())
        .map(SecretString::from))
}

fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    Ok(Option::<Value>::deserialize(deserializer)?
        .as_ref()
        .and_then(parse_timestamp))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::as_conversions)]
fn lenient_millis<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64)),
        _ => None,
    })
}

/// Parse RFC 3339, naive ISO-8601 (assumed UTC), or a unix timestamp in
/// seconds or milliseconds.
pub(crate) fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
                    .iter()
                    .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                    .map(|naive| naive.and_utc())
            }),
        Value::Number(n) => n.as_i64().and_then(|ts| {
            if ts.abs() >= 100_000_000_000 {
                DateTime::from_timestamp_millis(ts)
            } else {
                DateTime::from_timestamp(ts, 0)
            }
        }),
        _ => None,
    }
}
