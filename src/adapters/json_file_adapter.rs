//! Directory-of-JSON analysis source adapter.
//!
//! Serves `AnalysisPayload` documents from a directory laid out as
//! `<dir>/<id>.json`. Stands in for the remote analysis API when working
//! from captured payloads (and in tests).

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::error::RiskviewError;
use crate::domain::payload::{AnalysisPayload, AnalysisSummary};
use crate::ports::analysis_port::AnalysisPort;
use crate::ports::config_port::ConfigPort;

#[derive(Debug)]
pub struct JsonFileAdapter {
    dir: PathBuf,
}

impl JsonFileAdapter {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, RiskviewError> {
        let dir = config
            .get_string("source", "dir")
            .ok_or_else(|| RiskviewError::ConfigMissing {
                section: "source".into(),
                key: "dir".into(),
            })?;
        Ok(Self::new(dir))
    }

    fn load(&self, path: &Path) -> Result<AnalysisPayload, RiskviewError> {
        let document = fs::read_to_string(path)?;
        serde_json::from_str(&document).map_err(|e| RiskviewError::MalformedPayload {
            reason: format!("{}: {e}", path.display()),
        })
    }
}

impl AnalysisPort for JsonFileAdapter {
    fn fetch_analysis(&self, id: i64) -> Result<AnalysisPayload, RiskviewError> {
        let path = self.dir.join(format!("{id}.json"));
        if !path.is_file() {
            return Err(RiskviewError::AnalysisNotFound { id });
        }
        self.load(&path)
    }

    fn list_analyses(&self) -> Result<Vec<AnalysisSummary>, RiskviewError> {
        let mut summaries = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            summaries.push(self.load(&path)?.summary());
        }
        summaries.sort_by_key(|summary| summary.id);
        Ok(summaries)
    }
}
