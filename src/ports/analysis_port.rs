//! Analysis source port trait.
//!
//! The production source is the remote analysis API, implemented outside
//! this crate; the bundled [`crate::adapters::json_file_adapter`] serves the
//! CLI and tests.

use crate::domain::error::RiskviewError;
use crate::domain::payload::{AnalysisPayload, AnalysisSummary};

pub trait AnalysisPort {
    fn fetch_analysis(&self, id: i64) -> Result<AnalysisPayload, RiskviewError>;

    /// Available analyses, ordered by id ascending, metadata only.
    fn list_analyses(&self) -> Result<Vec<AnalysisSummary>, RiskviewError>;
}
