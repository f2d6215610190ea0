//! Domain error types.

/// Top-level error type for riskview.
///
/// Every pipeline failure is terminal for the current request; no partial
/// bundle is ever produced alongside one of these.
#[derive(Debug, thiserror::Error)]
pub enum RiskviewError {
    #[error("malformed payload: {reason}")]
    MalformedPayload { reason: String },

    #[error("schema mismatch: column {column} is absent from the time series")]
    SchemaMismatch { column: String },

    #[error("no trading position: every row has a null or zero signal")]
    NoTradingPosition,

    #[error("chart render failed: {reason}")]
    ChartRender { reason: String },

    #[error("analysis {id} not found")]
    AnalysisNotFound { id: i64 },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&RiskviewError> for std::process::ExitCode {
    fn from(err: &RiskviewError) -> Self {
        let code: u8 = match err {
            RiskviewError::Io(_) => 1,
            RiskviewError::ConfigParse { .. }
            | RiskviewError::ConfigMissing { .. }
            | RiskviewError::ConfigInvalid { .. } => 2,
            RiskviewError::AnalysisNotFound { .. } => 3,
            RiskviewError::MalformedPayload { .. } => 4,
            RiskviewError::SchemaMismatch { .. } => 5,
            RiskviewError::NoTradingPosition => 6,
            RiskviewError::ChartRender { .. } => 7,
        };
        std::process::ExitCode::from(code)
    }
}
