//! The upgrade analysis run.
//!
//! An [`UpgradeAnalysis`] starts in `draft`, captures both snapshots,
//! reconciles the three families, renders one section per module key and
//! routes each section to its notes file or the aggregated log. It becomes
//! `done` only once the log is stored.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::time::Instant;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::apriori::AprioriMap;
use crate::diff::fields::magic_field_options;
use crate::diff::{owning_modules, reconcile, reconcile_with};
use crate::domain::error::{banner, ConfigurationError, ResolutionError};
use crate::domain::{AnalysisOutcome, AnalysisRequest, AnalysisState, Result, GENERAL};
use crate::identity::Normalizer;
use crate::modules::{InstalledModule, ModuleRegistry};
use crate::notes::{NotesWriter, GENERAL_LOG_FILE_NAME};
use crate::obs;
use crate::report::AnalysisReport;
use crate::snapshot::shim::ShimRegistry;
use crate::snapshot::{RemoteConnection, Snapshot, SnapshotSource};

/// Module keys never reported on: the analysis tooling itself.
pub const IGNORED_MODULES: [&str; 2] = ["openupgrade_records", "upgrade_analysis"];

/// Module owning the copy of the aggregated log.
const BASE_MODULE: &str = "base";

/// One analysis run.
#[derive(Debug, Clone)]
pub struct UpgradeAnalysis {
    pub id: Uuid,
    pub request: AnalysisRequest,
    pub state: AnalysisState,
    pub log: Option<String>,
    pub analysis_date: Option<DateTime<Utc>>,
    shims: ShimRegistry,
}

impl UpgradeAnalysis {
    pub fn new(request: AnalysisRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            request,
            state: AnalysisState::Draft,
            log: None,
            analysis_date: None,
            shims: ShimRegistry::standard(),
        }
    }

    /// Replace the version shims used to pick the remote store.
    pub fn with_shims(mut self, shims: ShimRegistry) -> Self {
        self.shims = shims;
        self
    }

    /// Run the analysis. On error the run stays in `draft` with no log.
    pub async fn analyze(
        &mut self,
        connection: &dyn RemoteConnection,
        local: &dyn SnapshotSource,
        modules: &dyn ModuleRegistry,
    ) -> Result<()> {
        let analysis_id = self.id.to_string();
        let _span = obs::AnalysisSpan::enter(&analysis_id);
        let started = Instant::now();
        obs::emit_analysis_started(
            &analysis_id,
            &self.request.remote_version,
            !self.request.without_apriori,
        );

        let upgrade_path = self.upgrade_path()?;
        let apriori = if self.request.without_apriori {
            None
        } else {
            Some(AprioriMap::load(&upgrade_path)?)
        };

        let store = self.shims.resolve(&self.request.remote_version)?;
        obs::emit_store_selected(&self.request.remote_version, store);
        let remote = Snapshot::capture(connection.store(store)?).await?;
        let local = Snapshot::capture(local).await?;

        let apriori = apriori.as_ref();
        let report = AnalysisReport {
            fields: reconcile_with(&remote.fields, &local.fields, apriori, &magic_field_options()),
            models: reconcile(&remote.models, &local.models, apriori),
            xmlids: reconcile(&remote.xmlids, &local.xmlids, apriori),
        };
        for family in [&report.models, &report.fields, &report.xmlids] {
            obs::emit_family_reconciled(family);
        }

        let keys = module_keys(&remote, &local, &report);
        let installed = modules.by_name();
        let writer = NotesWriter::new(&upgrade_path);
        let normalizer = Normalizer::new(apriori);

        let mut log = String::new();
        for key in &keys {
            let text = report.render_module(key);
            if key == GENERAL {
                log.push_str(&text);
                continue;
            }
            let mapped = normalizer.module(key);
            if !installed.contains_key(mapped) {
                obs::emit_module_unresolved(key);
                log.push_str(&banner(&ResolutionError {
                    module: key.clone(),
                }));
                log.push_str(&text);
                continue;
            }
            let Some(module) = installed.get(key.as_str()) else {
                if !report.is_unchanged(key) {
                    log.push_str(&format!(
                        "NOTE: module '{key}' was renamed or merged into '{mapped}':\n"
                    ));
                    log.push_str(&text);
                }
                continue;
            };
            if self.request.write_files {
                match writer.write(module, &text) {
                    Ok(path) => obs::emit_notes_written(key, &path),
                    Err(err) => {
                        obs::emit_notes_write_failed(key, &err);
                        log.push_str(&banner(&err));
                    }
                }
            }
            log.push_str(&text);
        }

        if self.request.write_files {
            write_general_log(&writer, &installed, &log);
        }

        obs::emit_analysis_finished(
            &analysis_id,
            started.elapsed().as_millis() as u64,
            keys.len(),
            log.len(),
        );
        self.log = Some(log);
        self.analysis_date = Some(Utc::now());
        self.state = AnalysisState::Done;
        Ok(())
    }

    pub fn outcome(&self) -> AnalysisOutcome {
        AnalysisOutcome {
            analysis_id: self.id,
            status: self.state,
            analysis_date: self.analysis_date,
            log: self.log.clone().unwrap_or_default(),
        }
    }

    fn upgrade_path(&self) -> std::result::Result<PathBuf, ConfigurationError> {
        self.request
            .upgrade_path
            .clone()
            .filter(|path| !path.as_os_str().is_empty())
            .ok_or(ConfigurationError::MissingUpgradePath)
    }
}

/// Create a run for `request`, analyze, and return its outcome.
pub async fn run_analysis(
    request: AnalysisRequest,
    connection: &dyn RemoteConnection,
    local: &dyn SnapshotSource,
    modules: &dyn ModuleRegistry,
) -> Result<AnalysisOutcome> {
    let mut analysis = UpgradeAnalysis::new(request);
    analysis.analyze(connection, local, modules).await?;
    Ok(analysis.outcome())
}

/// `general` first, then every raw or owning module in order, minus the
/// ignored ones.
fn module_keys(remote: &Snapshot, local: &Snapshot, report: &AnalysisReport) -> Vec<String> {
    let mut modules: BTreeSet<String> = remote
        .modules()
        .chain(local.modules())
        .map(str::to_string)
        .collect();
    modules.extend(owning_modules([&report.models, &report.fields, &report.xmlids]));
    modules.remove(GENERAL);

    std::iter::once(GENERAL.to_string())
        .chain(modules)
        .filter(|key| !IGNORED_MODULES.contains(&key.as_str()))
        .collect()
}

fn write_general_log(writer: &NotesWriter, installed: &BTreeMap<String, InstalledModule>, log: &str) {
    let Some(base) = installed.get(BASE_MODULE) else {
        return;
    };
    match writer.write_named(base, GENERAL_LOG_FILE_NAME, log) {
        Ok(path) => obs::emit_notes_written(GENERAL, &path),
        Err(err) => obs::emit_notes_write_failed(GENERAL, &err),
    }
}
