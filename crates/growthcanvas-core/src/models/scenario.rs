use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub type ScenarioId = i64;

/// A named set of forecasting inputs owned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub id: ScenarioId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub investment: Option<f64>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Parse an RFC 3339 timestamp, or a naive `YYYY-MM-DDTHH:MM:SS[.f]` taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

// Unparseable timestamps become None rather than failing the whole scenario list.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

/// Body for creating or duplicating a scenario
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScenarioInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Partial update; unset fields are left alone by the backend.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScenarioUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
}

impl ScenarioUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.is_default.is_none()
    }
}

/// Which scenario a forecast request targets.
///
/// `Default` addresses the backend's default-scenario endpoints, which take
/// no id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioRef {
    Id(ScenarioId),
    Default,
}

impl ScenarioRef {
    /// Path prefix for this scenario's forecast endpoints
    pub fn base_path(&self) -> String {
        match self {
            ScenarioRef::Id(id) => format!("/api/scenarios/{}", id),
            ScenarioRef::Default => "/api".to_string(),
        }
    }
}

impl From<ScenarioId> for ScenarioRef {
    fn from(id: ScenarioId) -> Self {
        ScenarioRef::Id(id)
    }
}

impl fmt::Display for ScenarioRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScenarioRef::Id(id) => write!(f, "{}", id),
            ScenarioRef::Default => f.write_str("default"),
        }
    }
}

impl FromStr for ScenarioRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("default") {
            return Ok(ScenarioRef::Default);
        }
        s.parse::<ScenarioId>()
            .map(ScenarioRef::Id)
            .map_err(|_| format!("expected a scenario id or 'default', got '{}'", s))
    }
}

/// Pick the scenario to show first: the requested one if it exists, else the
/// default, else the first listed.
pub fn select_scenario(scenarios: &[Scenario], requested: Option<ScenarioId>) -> Option<&Scenario> {
    requested
        .and_then(|id| scenarios.iter().find(|s| s.id == id))
        .or_else(|| scenarios.iter().find(|s| s.is_default))
        .or_else(|| scenarios.first())
}
