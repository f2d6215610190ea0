//! Report bundle assembly.
//!
//! The assembler is the single orchestration point of the pipeline: frame
//! construction, schema decision, table build, chart render (through the
//! port), and scalar selection all happen here, producing the one immutable
//! value handed to the presentation layer.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::domain::error::RiskviewError;
use crate::domain::frame::TimeSeriesFrame;
use crate::domain::payload::{AnalysisPayload, SchemaVariant};
use crate::domain::signal_table::SignalTable;
use crate::ports::chart_port::ChartPort;

/// A rasterized chart, held as base64 text so it can be embedded directly
/// in markup or shipped as JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartArtifact {
    base64: String,
}

impl ChartArtifact {
    pub fn from_png_bytes(bytes: &[u8]) -> Self {
        Self {
            base64: STANDARD.encode(bytes),
        }
    }

    pub fn as_base64(&self) -> &str {
        &self.base64
    }

    pub fn into_base64(self) -> String {
        self.base64
    }

    /// Recover the raw image bytes. The round-trip through base64 is the
    /// artifact's whole contract.
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(&self.base64)
    }
}

/// The render-ready aggregate handed to the (external) presentation layer.
///
/// Field names and nullability are identical across schema variants so a
/// single template can consume either: the VaR averages are simply null
/// under legacy payloads.
#[derive(Debug, Clone, Serialize)]
pub struct ReportBundle {
    /// Analysis metadata, `data` stripped.
    pub analysis: Map<String, Value>,
    /// Base64-encoded PNG of the overlay chart.
    pub ts_chart: String,
    /// Signal table rendered as HTML markup.
    pub sig_table: String,
    pub total_p_l: Option<f64>,
    pub avg_var_95: Option<f64>,
    pub avg_var_99: Option<f64>,
}

/// Run the full rendering pipeline for one payload.
pub fn render_report(
    payload: &AnalysisPayload,
    chart: &dyn ChartPort,
) -> Result<ReportBundle, RiskviewError> {
    let frame = TimeSeriesFrame::from_payload(payload)?;
    let variant = SchemaVariant::detect(payload);
    let table = SignalTable::build(&frame, variant)?;
    let artifact = chart.render(&frame)?;
    Ok(assemble(payload, &frame, variant, &table, artifact))
}

/// Merge the pipeline outputs with the payload's scalar metadata.
///
/// Extended payloads arrive with their summary statistics precomputed
/// upstream; legacy payloads only carry per-row P&L, so the total is summed
/// here over the whole frame (not just the signal rows).
pub fn assemble(
    payload: &AnalysisPayload,
    frame: &TimeSeriesFrame,
    variant: SchemaVariant,
    table: &SignalTable,
    artifact: ChartArtifact,
) -> ReportBundle {
    let (total_p_l, avg_var_95, avg_var_99) = match variant {
        SchemaVariant::Extended => (
            payload.total_p_l,
            payload.average_var_95,
            payload.average_var_99,
        ),
        SchemaVariant::Legacy => (Some(frame.total_p_l()), None, None),
    };

    ReportBundle {
        analysis: payload.metadata(),
        ts_chart: artifact.into_base64(),
        sig_table: table.to_html(),
        total_p_l,
        avg_var_95,
        avg_var_99,
    }
}
