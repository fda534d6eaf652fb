//! Analysis run record and its request/outcome shapes.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of an analysis run. There is no failure state: a run that aborts
/// stays in `Draft`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisState {
    #[default]
    Draft,
    Done,
}

impl std::fmt::Display for AnalysisState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisState::Draft => write!(f, "draft"),
            AnalysisState::Done => write!(f, "done"),
        }
    }
}

/// Parameters of one analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Base path holding `apriori.json` and the notes of core modules.
    pub upgrade_path: Option<PathBuf>,
    /// Skip loading `apriori.json`; no renames or merges are known.
    #[serde(default)]
    pub without_apriori: bool,
    /// Write per-module notes files in addition to the aggregated log.
    #[serde(default = "default_write_files")]
    pub write_files: bool,
    /// Declared version of the remote (pre-upgrade) system, e.g. `13.0`.
    pub remote_version: String,
}

fn default_write_files() -> bool {
    true
}

impl AnalysisRequest {
    pub fn new(upgrade_path: impl Into<PathBuf>, remote_version: impl Into<String>) -> Self {
        Self {
            upgrade_path: Some(upgrade_path.into()),
            without_apriori: false,
            write_files: true,
            remote_version: remote_version.into(),
        }
    }

    pub fn without_apriori(mut self) -> Self {
        self.without_apriori = true;
        self
    }

    pub fn with_write_files(mut self, write_files: bool) -> Self {
        self.write_files = write_files;
        self
    }
}

/// What the command surface returns for a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub analysis_id: Uuid,
    pub status: AnalysisState,
    pub analysis_date: Option<DateTime<Utc>>,
    pub log: String,
}
