#![allow(dead_code)]

use chrono::NaiveDate;
use serde_json::{Map, Value, json};

use riskview::domain::error::RiskviewError;
use riskview::domain::frame::TimeSeriesFrame;
use riskview::domain::payload::AnalysisPayload;
use riskview::domain::report::ChartArtifact;
use riskview::ports::chart_port::ChartPort;

pub const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

pub fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, day).unwrap()
}

/// A legacy-shape row object; the `sig` key is always present, as it is in
/// real upstream documents.
pub fn record(day: u32, close: f64, ma: Option<f64>, sig: Option<i64>, p_l: Option<f64>) -> Value {
    json!({
        "Date": format!("2020-01-{day:02}"),
        "Adj Close": close,
        "ma": ma,
        "sig": sig,
        "p_l": p_l,
    })
}

/// An extended-shape row object with the VaR columns.
pub fn record_with_var(
    day: u32,
    close: f64,
    sig: Option<i64>,
    p_l: Option<f64>,
    var_95: Option<f64>,
    var_99: Option<f64>,
) -> Value {
    json!({
        "Date": format!("2020-01-{day:02}"),
        "Adj Close": close,
        "ma": close - 1.0,
        "sig": sig,
        "p_l": p_l,
        "var_95": var_95,
        "var_99": var_99,
    })
}

pub fn legacy_payload(id: i64, rows: Vec<Value>) -> AnalysisPayload {
    payload_from_value(json!({ "id": id, "name": "fixture", "data": rows }))
}

pub fn extended_payload(
    id: i64,
    total_p_l: f64,
    avg_95: f64,
    avg_99: f64,
    rows: Vec<Value>,
) -> AnalysisPayload {
    payload_from_value(json!({
        "id": id,
        "total_p_l": total_p_l,
        "average_var_95": avg_95,
        "average_var_99": avg_99,
        "data": rows,
    }))
}

pub fn payload_from_value(value: Value) -> AnalysisPayload {
    AnalysisPayload::from_json(&value.to_string()).unwrap()
}

pub fn records_from(rows: &[Value]) -> Vec<Map<String, Value>> {
    rows.iter()
        .map(|row| row.as_object().unwrap().clone())
        .collect()
}

pub fn frame_from(rows: &[Value]) -> TimeSeriesFrame {
    TimeSeriesFrame::from_records(&records_from(rows)).unwrap()
}

/// Chart stub that honors the port contract (marker anchor required) without
/// a drawing backend.
pub struct MockChartPort {
    pub bytes: Vec<u8>,
}

impl MockChartPort {
    pub fn new() -> Self {
        Self {
            bytes: b"mock-chart-bytes".to_vec(),
        }
    }
}

impl ChartPort for MockChartPort {
    fn render(&self, frame: &TimeSeriesFrame) -> Result<ChartArtifact, RiskviewError> {
        frame
            .last_position_date()
            .ok_or(RiskviewError::NoTradingPosition)?;
        Ok(ChartArtifact::from_png_bytes(&self.bytes))
    }
}
