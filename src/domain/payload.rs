//! Analysis payload model and schema variant detection.
//!
//! The upstream analysis API serves one JSON document per analysis. Two
//! payload generations are in circulation: the legacy signal-only shape and
//! the extended shape that adds per-row VaR columns plus precomputed scalar
//! summaries. Presence of the `average_var_95` scalar is the single fact
//! that distinguishes them.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::domain::error::RiskviewError;

/// Which upstream payload generation a document belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVariant {
    Legacy,
    Extended,
}

impl SchemaVariant {
    /// Extended iff the payload carries the `average_var_95` scalar.
    ///
    /// The decision is binary and payload-wide; all downstream column
    /// selection branches on it exactly once.
    pub fn detect(payload: &AnalysisPayload) -> Self {
        if payload.average_var_95.is_some() {
            Self::Extended
        } else {
            Self::Legacy
        }
    }

    pub fn is_extended(self) -> bool {
        self == Self::Extended
    }
}

/// One analysis document as served by the upstream API.
///
/// Immutable after receipt. `data` holds the raw time-series row objects
/// until a [`crate::domain::frame::TimeSeriesFrame`] is built from them; it
/// is never serialized back out, so [`AnalysisPayload::metadata`] naturally
/// yields the document sans `data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisPayload {
    #[serde(deserialize_with = "de_numeric_id")]
    pub id: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_p_l: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_var_95: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_var_99: Option<f64>,

    #[serde(default, skip_serializing)]
    pub data: Option<Vec<Map<String, Value>>>,

    /// Any other scalar metadata (`name`, `path`, `ma_period`, ...),
    /// forwarded to presentation untouched.
    #[serde(flatten)]
    pub meta: Map<String, Value>,
}

impl AnalysisPayload {
    pub fn from_json(document: &str) -> Result<Self, RiskviewError> {
        serde_json::from_str(document).map_err(|e| RiskviewError::MalformedPayload {
            reason: e.to_string(),
        })
    }

    /// The payload as a JSON object with `data` stripped.
    pub fn metadata(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// Listing entry: metadata with the internal `path` also dropped.
    pub fn summary(&self) -> AnalysisSummary {
        let mut meta = self.metadata();
        meta.remove("id");
        meta.remove("path");
        AnalysisSummary { id: self.id, meta }
    }
}

/// One line of an analysis listing, ordered by id.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSummary {
    pub id: i64,
    #[serde(flatten)]
    pub meta: Map<String, Value>,
}

/// The upstream API is inconsistent about id typing: older documents carry
/// `"id": "7"`, newer ones `"id": 7`. Accept both.
fn de_numeric_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match &value {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| serde::de::Error::custom(format!("id {n} is not an integer"))),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| serde::de::Error::custom(format!("id {s:?} is not numeric"))),
        other => Err(serde::de::Error::custom(format!(
            "id must be an integer or numeric string, got {other}"
        ))),
    }
}
