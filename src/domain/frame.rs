//! Date-indexed time-series frame built from raw payload rows.
//!
//! Row objects arrive as loose JSON; conversion into typed rows happens here,
//! at the boundary, so table and chart logic never touch untyped values.
//! Column presence is recorded separately from row values: a column that no
//! row object ever mentions is *absent* (a schema problem), while a mentioned
//! column may still hold nulls (ordinary data).

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::domain::error::RiskviewError;
use crate::domain::payload::AnalysisPayload;

/// One row of the analysis time series.
///
/// `ma` and `p_l` are optional because the upstream rolling windows leave
/// leading nulls; `var_95`/`var_99` only carry values under the extended
/// schema, and even there only on some rows.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesRow {
    pub date: NaiveDate,
    pub adj_close: f64,
    pub ma: Option<f64>,
    pub sig: Option<i64>,
    pub p_l: Option<f64>,
    pub var_95: Option<f64>,
    pub var_99: Option<f64>,
}

impl TimeSeriesRow {
    /// True when this row records an actual position change (`sig` non-null
    /// and non-zero).
    pub fn has_position(&self) -> bool {
        matches!(self.sig, Some(s) if s != 0)
    }
}

/// Which optional columns appeared in the source row objects at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColumnSet {
    pub sig: bool,
    pub var_95: bool,
    pub var_99: bool,
}

/// Ordered (Date ascending) sequence of rows plus column presence.
///
/// Invariant: at least one row. Constructors reject empty input with
/// `MalformedPayload`.
#[derive(Debug, Clone)]
pub struct TimeSeriesFrame {
    pub rows: Vec<TimeSeriesRow>,
    pub columns: ColumnSet,
}

impl TimeSeriesFrame {
    /// Build the frame from a payload's `data`, failing with
    /// `MalformedPayload` when `data` is missing or empty.
    pub fn from_payload(payload: &AnalysisPayload) -> Result<Self, RiskviewError> {
        let records = payload
            .data
            .as_ref()
            .ok_or_else(|| RiskviewError::MalformedPayload {
                reason: "data is missing".into(),
            })?;
        Self::from_records(records)
    }

    /// Convert raw row objects into typed rows, recording column presence
    /// and sorting by date ascending.
    pub fn from_records(records: &[Map<String, Value>]) -> Result<Self, RiskviewError> {
        if records.is_empty() {
            return Err(RiskviewError::MalformedPayload {
                reason: "data is empty".into(),
            });
        }

        let columns = ColumnSet {
            sig: records.iter().any(|r| r.contains_key("sig")),
            var_95: records.iter().any(|r| r.contains_key("var_95")),
            var_99: records.iter().any(|r| r.contains_key("var_99")),
        };

        let mut rows = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            rows.push(parse_row(index, record)?);
        }
        rows.sort_by_key(|row| row.date);

        Ok(Self { rows, columns })
    }

    /// Build a frame directly from typed rows; column presence is derived
    /// from whether any row carries a value.
    pub fn from_rows(mut rows: Vec<TimeSeriesRow>) -> Result<Self, RiskviewError> {
        if rows.is_empty() {
            return Err(RiskviewError::MalformedPayload {
                reason: "data is empty".into(),
            });
        }
        let columns = ColumnSet {
            sig: rows.iter().any(|r| r.sig.is_some()),
            var_95: rows.iter().any(|r| r.var_95.is_some()),
            var_99: rows.iter().any(|r| r.var_99.is_some()),
        };
        rows.sort_by_key(|row| row.date);
        Ok(Self { rows, columns })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Date of the most recent position change, if any row has one.
    pub fn last_position_date(&self) -> Option<NaiveDate> {
        self.rows
            .iter()
            .rev()
            .find(|row| row.has_position())
            .map(|row| row.date)
    }

    /// Realized P&L summed over *all* rows; null entries contribute nothing.
    pub fn total_p_l(&self) -> f64 {
        self.rows.iter().filter_map(|row| row.p_l).sum()
    }

    /// First and last dates of the (sorted) frame.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.rows.first(), self.rows.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date)),
            _ => None,
        }
    }
}

fn parse_row(index: usize, record: &Map<String, Value>) -> Result<TimeSeriesRow, RiskviewError> {
    Ok(TimeSeriesRow {
        date: parse_date(index, record)?,
        adj_close: required_f64(index, record, "Adj Close")?,
        ma: optional_f64(index, record, "ma")?,
        sig: optional_signal(index, record)?,
        p_l: optional_f64(index, record, "p_l")?,
        var_95: optional_f64(index, record, "var_95")?,
        var_99: optional_f64(index, record, "var_99")?,
    })
}

fn parse_date(index: usize, record: &Map<String, Value>) -> Result<NaiveDate, RiskviewError> {
    let value = record
        .get("Date")
        .ok_or_else(|| malformed(index, "Date is missing"))?;
    let text = value
        .as_str()
        .ok_or_else(|| malformed(index, "Date is not a string"))?;
    // Tolerate ISO timestamps ("2020-01-01T00:00:00"); only the date part
    // is meaningful here.
    let date_part = text.split('T').next().unwrap_or(text);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| malformed(index, format!("invalid Date {text:?}")))
}

fn required_f64(
    index: usize,
    record: &Map<String, Value>,
    key: &str,
) -> Result<f64, RiskviewError> {
    optional_f64(index, record, key)?.ok_or_else(|| malformed(index, format!("{key} is missing")))
}

fn optional_f64(
    index: usize,
    record: &Map<String, Value>,
    key: &str,
) -> Result<Option<f64>, RiskviewError> {
    match record.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| malformed(index, format!("{key} is not a finite number"))),
        Some(other) => Err(malformed(index, format!("{key} is not a number: {other}"))),
    }
}

/// `sig` travels through a float-typed upstream column, so `1.0` and `1`
/// both mean buy. Anything non-integral is rejected.
fn optional_signal(index: usize, record: &Map<String, Value>) -> Result<Option<i64>, RiskviewError> {
    match record.get("sig") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                return Ok(Some(i));
            }
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 => Ok(Some(f as i64)),
                _ => Err(malformed(index, format!("sig is not an integral number: {n}"))),
            }
        }
        Some(other) => Err(malformed(index, format!("sig is not a number: {other}"))),
    }
}

fn malformed(index: usize, reason: impl std::fmt::Display) -> RiskviewError {
    RiskviewError::MalformedPayload {
        reason: format!("row {index}: {reason}"),
    }
}
