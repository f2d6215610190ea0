//! Signal table: filter, relabel, project, render.
//!
//! The table restricts the frame to signal-bearing dates and remaps numeric
//! signal codes to trader-facing labels. Which rows qualify depends on the
//! schema variant: legacy filters on the signal itself, extended on the
//! presence of a daily VaR figure (so extended tables may carry rows with no
//! signal at all — VaR is tracked there regardless of trading activity).

use chrono::NaiveDate;

use crate::domain::error::RiskviewError;
use crate::domain::frame::TimeSeriesFrame;
use crate::domain::payload::SchemaVariant;

/// A signal value after relabeling.
///
/// `1` and `-1` become labels; any other value that survives the row filter
/// passes through untransformed, and null renders as an empty cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalCell {
    Buy,
    Sell,
    Code(i64),
    Empty,
}

impl SignalCell {
    fn from_sig(sig: Option<i64>) -> Self {
        match sig {
            Some(1) => Self::Buy,
            Some(-1) => Self::Sell,
            Some(other) => Self::Code(other),
            None => Self::Empty,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Buy => "Buy".to_string(),
            Self::Sell => "Sell".to_string(),
            Self::Code(code) => code.to_string(),
            Self::Empty => String::new(),
        }
    }
}

/// One projected, relabeled table row.
///
/// `var_95`/`var_99` stay `None` under the legacy projection.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalRow {
    pub date: NaiveDate,
    pub sig: SignalCell,
    pub p_l: Option<f64>,
    pub var_95: Option<f64>,
    pub var_99: Option<f64>,
}

/// Rows restricted to signal-bearing dates, chronological order preserved.
#[derive(Debug, Clone)]
pub struct SignalTable {
    pub rows: Vec<SignalRow>,
    pub variant: SchemaVariant,
}

impl SignalTable {
    /// Filter and project the frame according to the schema variant.
    ///
    /// Fails with `SchemaMismatch` when the filter column (`sig` for legacy,
    /// `var_95` for extended) never appeared in the source rows.
    pub fn build(
        frame: &TimeSeriesFrame,
        variant: SchemaVariant,
    ) -> Result<Self, RiskviewError> {
        let rows = match variant {
            SchemaVariant::Legacy => {
                if !frame.columns.sig {
                    return Err(RiskviewError::SchemaMismatch {
                        column: "sig".into(),
                    });
                }
                frame
                    .rows
                    .iter()
                    .filter(|row| row.has_position())
                    .map(|row| SignalRow {
                        date: row.date,
                        sig: SignalCell::from_sig(row.sig),
                        p_l: row.p_l,
                        var_95: None,
                        var_99: None,
                    })
                    .collect()
            }
            SchemaVariant::Extended => {
                if !frame.columns.var_95 {
                    return Err(RiskviewError::SchemaMismatch {
                        column: "var_95".into(),
                    });
                }
                frame
                    .rows
                    .iter()
                    .filter(|row| row.var_95.is_some())
                    .map(|row| SignalRow {
                        date: row.date,
                        sig: SignalCell::from_sig(row.sig),
                        p_l: row.p_l,
                        var_95: row.var_95,
                        var_99: row.var_99,
                    })
                    .collect()
            }
        };

        Ok(Self { rows, variant })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render the table as HTML markup for the presentation layer.
    ///
    /// Always emits a complete `<table>` (header included) so the consuming
    /// template is shape-stable even when no rows survive the filter.
    pub fn to_html(&self) -> String {
        let mut out = String::from("<table class=\"sig-table\">\n  <thead>\n    <tr>");
        out.push_str("<th>Date</th><th>sig</th><th>p_l</th>");
        if self.variant.is_extended() {
            out.push_str("<th>var_95</th><th>var_99</th>");
        }
        out.push_str("</tr>\n  </thead>\n  <tbody>\n");

        for row in &self.rows {
            out.push_str(&format!(
                "    <tr><td>{}</td><td>{}</td><td>{}</td>",
                row.date.format("%Y-%m-%d"),
                row.sig.label(),
                format_cell(row.p_l, 2),
            ));
            if self.variant.is_extended() {
                out.push_str(&format!(
                    "<td>{}</td><td>{}</td>",
                    format_cell(row.var_95, 4),
                    format_cell(row.var_99, 4),
                ));
            }
            out.push_str("</tr>\n");
        }

        out.push_str("  </tbody>\n</table>\n");
        out
    }
}

fn format_cell(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{v:.decimals$}"),
        None => String::new(),
    }
}
