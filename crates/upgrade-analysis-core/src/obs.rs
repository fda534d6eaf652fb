//! Structured observability hooks for analysis runs.
//!
//! This module provides:
//! - Run-scoped tracing spans via the `AnalysisSpan` RAII guard
//! - Emission functions for key lifecycle events: start, family reconciled,
//!   module unresolved, notes written, finish
//!
//! Filter with `UPGRADE_ANALYSIS_LOG` (see [`crate::telemetry`]).

use tracing::{info, warn};

use crate::diff::FamilyReport;

/// RAII guard that enters an analysis-scoped span for the duration of a run.
///
/// # Example
///
/// ```ignore
/// let _span = AnalysisSpan::enter(&analysis.id.to_string());
/// // every event now carries analysis_id
/// ```
pub struct AnalysisSpan {
    _span: tracing::span::EnteredSpan,
}

impl AnalysisSpan {
    pub fn enter(analysis_id: &str) -> Self {
        let span = tracing::info_span!("upgrade_analysis.run", analysis_id = %analysis_id);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: analysis started against a remote version.
pub fn emit_analysis_started(analysis_id: &str, remote_version: &str, with_apriori: bool) {
    info!(
        event = "analysis.started",
        analysis_id = %analysis_id,
        remote_version = %remote_version,
        with_apriori = with_apriori,
    );
}

/// Emit event: remote store chosen for the declared version.
pub fn emit_store_selected(remote_version: &str, store: &str) {
    info!(event = "analysis.store_selected", remote_version = %remote_version, store = %store);
}

/// Emit event: one family reconciled, with its accounting.
pub fn emit_family_reconciled(report: &FamilyReport) {
    let stats = &report.stats;
    info!(
        event = "analysis.family_reconciled",
        family = %report.family,
        remote = stats.remote,
        local = stats.local,
        changed = stats.changed,
        remapped = stats.remapped,
        removed = stats.removed,
        added = stats.added,
    );
}

/// Emit event: a module key maps to no installed module.
pub fn emit_module_unresolved(module: &str) {
    warn!(event = "analysis.module_unresolved", module = %module);
}

/// Emit event: notes written for a module.
pub fn emit_notes_written(module: &str, path: &std::path::Path) {
    info!(event = "analysis.notes_written", module = %module, path = %path.display());
}

/// Emit event: notes for a module could not be written (warning level).
pub fn emit_notes_write_failed(module: &str, error: &dyn std::fmt::Display) {
    warn!(event = "analysis.notes_write_failed", module = %module, error = %error);
}

/// Emit event: analysis finished.
pub fn emit_analysis_finished(analysis_id: &str, duration_ms: u64, modules: usize, log_bytes: usize) {
    info!(
        event = "analysis.finished",
        analysis_id = %analysis_id,
        duration_ms = duration_ms,
        modules = modules,
        log_bytes = log_bytes,
    );
}
