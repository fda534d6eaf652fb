//! Error taxonomy for upgrade analysis.
//!
//! Only [`ConfigurationError`] and [`SnapshotError`] stop a run. Resolution and
//! write failures are per module: the orchestrator turns them into banners in
//! the aggregated log via [`banner`].

use std::path::PathBuf;

use super::record::Family;

/// User-facing misconfiguration detected before any reconciliation work.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("no upgrade path configured")]
    MissingUpgradePath,

    #[error("could not import apriori.json: file {} not found", path.display())]
    AprioriNotFound { path: PathBuf },

    #[error("could not read apriori file {}: {source}", path.display())]
    AprioriUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("the contents of apriori.json is not valid json: {0}")]
    InvalidAprioriJson(#[source] serde_json::Error),

    #[error("invalid contents of apriori.json: no key '{key}'")]
    MissingAprioriKey { key: &'static str },

    #[error("invalid contents of apriori.json: key '{key}' must map names to names")]
    MalformedAprioriKey { key: &'static str },

    #[error("unsupported remote version '{0}'")]
    InvalidVersion(String),
}

/// Failures of the snapshot collaborators.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("could not read snapshot {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse snapshot {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("remote connection has no record store named '{name}'")]
    UnknownStore { name: String },

    #[error("expected {expected} records, read returned a {found} record")]
    FamilyMismatch { expected: Family, found: Family },

    #[error("snapshot backend error: {0}")]
    Backend(String),
}

/// A module key that maps to no installed module.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("module not in list of installed modules")]
pub struct ResolutionError {
    pub module: String,
}

/// Migration notes could not be written for one module.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("could not find module path of '{module}'")]
    ModulePathUnknown { module: String },

    #[error("could not create migrations directory {}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not open file {} for writing", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that abort an analysis run.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// Result type for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Render a recorded per-module failure as an aggregated-log banner line.
pub fn banner(err: &dyn std::fmt::Display) -> String {
    format!("ERROR: {err}:\n")
}
