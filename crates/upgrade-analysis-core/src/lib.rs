//! Upgrade Analysis Core Library
//!
//! Compares the data-model snapshot of a system before an upgrade with the one
//! after it and produces per-module migration notes.
//!
//! Re-exports core components for programmatic access.

pub mod analysis;
pub mod apriori;
pub mod diff;
pub mod domain;
pub mod identity;
pub mod modules;
pub mod notes;
pub mod obs;
pub mod report;
pub mod snapshot;
pub mod telemetry;

/// Crate version, reported by the CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use analysis::{run_analysis, UpgradeAnalysis, IGNORED_MODULES};
pub use apriori::{AprioriMap, Mapping, NameKind, APRIORI_FILE_NAME};
pub use diff::fields::{magic_field_options, MAGIC_FIELDS};
pub use diff::{
    owning_modules, reconcile, reconcile_with, FamilyReport, ReconcileOptions, ReconcileStats,
};
pub use domain::{
    banner, AnalysisError, AnalysisOutcome, AnalysisRequest, AnalysisState, AttributeDelta,
    ChangeEntry, ChangeKind, ConfigurationError, Family, FieldRecord, Identity, ModelKind,
    ModelRecord, Record, ResolutionError, Result, SnapshotError, WriteError, XmlIdRecord, GENERAL,
};
pub use identity::{Normalized, Normalizer, Provenance};
pub use modules::{InstalledModule, ModuleRegistry, StaticModuleRegistry};
pub use notes::{NotesWriter, GENERAL_LOG_FILE_NAME, NOTES_FILE_NAME};
pub use report::{AnalysisReport, NOTHING_CHANGED};
pub use snapshot::file::{load_local, load_remote, RemoteDocument, SnapshotDocument};
pub use snapshot::memory::{MemoryConnection, MemorySnapshot};
pub use snapshot::shim::{ShimRegistry, StoreShim, LEGACY_RECORD_STORE, RECORD_STORE};
pub use snapshot::{RecordId, RemoteConnection, Snapshot, SnapshotResult, SnapshotSource, StoredRecord};
