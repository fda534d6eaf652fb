//! Domain models for upgrade analysis.
//!
//! - `record`: snapshot records per family and the `Record` trait
//! - `change`: report entries and attribute deltas
//! - `run`: the analysis run request, state and outcome
//! - `error`: error taxonomy

pub mod change;
pub mod error;
pub mod record;
pub mod run;

pub use change::{AttributeDelta, ChangeEntry, ChangeKind, GENERAL};
pub use error::{
    banner, AnalysisError, ConfigurationError, ResolutionError, Result, SnapshotError, WriteError,
};
pub use record::{Family, FieldRecord, Identity, ModelKind, ModelRecord, Record, XmlIdRecord};
pub use run::{AnalysisOutcome, AnalysisRequest, AnalysisState};
