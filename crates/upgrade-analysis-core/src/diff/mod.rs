//! Snapshot reconciliation.
//!
//! This module provides:
//! - The generic engine (`reconcile`, `reconcile_with`) over any [`Record`] family
//! - Per-family attribute comparison (`fields`, `models`, `xmlids` submodules)
//!
//! One call reconciles one family; mixing families is ruled out by the type
//! parameter.

pub mod fields;
pub mod models;
pub mod xmlids;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::apriori::AprioriMap;
use crate::domain::{ChangeEntry, ChangeKind, Family, Identity, Record, GENERAL};
use crate::identity::{Normalizer, Provenance};

/// Knobs for [`reconcile_with`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Records whose identity `name` is listed here are skipped on both sides.
    pub ignored_names: BTreeSet<String>,
}

impl ReconcileOptions {
    pub fn ignoring<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ignored_names: names.into_iter().map(Into::into).collect(),
        }
    }

    fn skips(&self, identity: &Identity) -> bool {
        self.ignored_names.contains(&identity.name)
    }
}

/// Record accounting for one family.
///
/// Every remote record is ignored, a duplicate, unchanged, changed, remapped or
/// removed. Every local record is ignored, a duplicate, matched or added.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileStats {
    pub remote: usize,
    pub local: usize,
    pub ignored_remote: usize,
    pub ignored_local: usize,
    pub duplicate_remote: usize,
    pub duplicate_local: usize,
    pub unchanged: usize,
    pub changed: usize,
    /// Matched through a rename or merge.
    pub remapped: usize,
    pub removed: usize,
    pub added: usize,
    /// Local records claimed by more than one remote record (module merges).
    pub shared_local: usize,
}

impl ReconcileStats {
    /// Whether every input record is accounted for exactly once.
    pub fn is_balanced(&self) -> bool {
        let matched = self.unchanged + self.changed + self.remapped;
        let remote_ok =
            self.remote == self.ignored_remote + self.duplicate_remote + matched + self.removed;
        let local_ok = self.local
            == self.ignored_local + self.duplicate_local + matched - self.shared_local + self.added;
        remote_ok && local_ok
    }

    /// `#`-prefixed summary lines for the `general` section.
    pub fn summary_lines(&self, family: Family) -> Vec<String> {
        vec![
            format!(
                "# {family} records: {} remote, {} local",
                self.remote, self.local
            ),
            format!("# Unchanged: {}", self.unchanged),
            format!("# Changed: {}", self.changed),
            format!("# Renamed or merged: {}", self.remapped),
            format!("# Removed: {}", self.removed),
            format!("# Added: {}", self.added),
            format!(
                "# Ignored: {}",
                self.ignored_remote + self.ignored_local + self.duplicate_remote + self.duplicate_local
            ),
        ]
    }
}

/// Reconciliation result for one family: entries grouped by owning module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyReport {
    pub family: Family,
    /// Owning module → entries, each list sorted by identity.
    pub changes: BTreeMap<String, Vec<ChangeEntry>>,
    pub stats: ReconcileStats,
}

impl FamilyReport {
    fn new(family: Family) -> Self {
        Self {
            family,
            changes: BTreeMap::new(),
            stats: ReconcileStats::default(),
        }
    }

    /// Entries owned by `module` (empty when it has none).
    pub fn entries(&self, module: &str) -> &[ChangeEntry] {
        self.changes.get(module).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.changes.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.changes.values().all(Vec::is_empty)
    }

    /// Total number of entries, `noted` cross-references included.
    pub fn len(&self) -> usize {
        self.changes.values().map(Vec::len).sum()
    }

    fn push(&mut self, entry: ChangeEntry) {
        self.changes
            .entry(entry.owner().to_string())
            .or_default()
            .push(entry);
    }
}

/// Reconcile two collections of one family without skipping anything.
pub fn reconcile<R: Record>(remote: &[R], local: &[R], apriori: Option<&AprioriMap>) -> FamilyReport {
    reconcile_with(remote, local, apriori, &ReconcileOptions::default())
}

/// Reconcile two collections of one family.
///
/// Remote identities are normalized through `apriori` and looked up among
/// the raw local identities. Matches yield no entry when nothing differs,
/// a `changed` entry when attributes differ, and a single `renamed`/`merged`
/// entry when normalization rewrote the identity. A remote record whose
/// normalized identity is absent locally falls back to its raw identity when
/// that one is present and unclaimed. Remote leftovers are `removed`, local
/// leftovers `added`. Duplicates are noted in `general`.
pub fn reconcile_with<R: Record>(
    remote: &[R],
    local: &[R],
    apriori: Option<&AprioriMap>,
    options: &ReconcileOptions,
) -> FamilyReport {
    let normalizer = Normalizer::new(apriori);
    let mut report = FamilyReport::new(R::FAMILY);
    let mut stats = ReconcileStats {
        remote: remote.len(),
        local: local.len(),
        ..ReconcileStats::default()
    };

    let (remote_by_id, remote_dups) = index(remote, options, &mut stats.ignored_remote);
    let (local_by_id, local_dups) = index(local, options, &mut stats.ignored_local);
    stats.duplicate_remote = remote_dups.len();
    stats.duplicate_local = local_dups.len();

    let mut claimed: BTreeMap<&Identity, usize> = BTreeMap::new();
    let mut entries = Vec::new();
    let mut unmatched = Vec::new();

    for (raw, record) in &remote_by_id {
        let normalized = normalizer.normalize(raw);
        match local_by_id.get_key_value(&normalized.identity) {
            Some((local_id, local_record)) => {
                *claimed.entry(local_id).or_default() += 1;
                let deltas = record.deltas(local_record, &normalizer);
                let kind = match normalized.provenance {
                    Provenance::Merged => ChangeKind::Merged,
                    Provenance::Renamed => ChangeKind::Renamed,
                    Provenance::Unchanged if deltas.is_empty() => {
                        stats.unchanged += 1;
                        continue;
                    }
                    Provenance::Unchanged => ChangeKind::Changed,
                };
                if kind == ChangeKind::Changed {
                    stats.changed += 1;
                } else {
                    stats.remapped += 1;
                }
                entries.push(
                    ChangeEntry::new(R::FAMILY, kind, (*raw).clone(), normalized.identity)
                        .with_detail(join(deltas.iter().map(ToString::to_string))),
                );
            }
            None => unmatched.push((raw, *record, normalized.identity)),
        }
    }

    // Raw fallback runs after every normalized match has claimed its record.
    for (raw, record, normalized) in unmatched {
        let fallback = local_by_id
            .get_key_value(raw)
            .filter(|(local_id, _)| !claimed.contains_key(*local_id));
        match fallback {
            Some((local_id, local_record)) => {
                *claimed.entry(local_id).or_default() += 1;
                let deltas = record.deltas(local_record, &normalizer);
                if deltas.is_empty() {
                    stats.unchanged += 1;
                    continue;
                }
                stats.changed += 1;
                entries.push(
                    ChangeEntry::new(R::FAMILY, ChangeKind::Changed, raw.clone(), raw.clone())
                        .with_detail(join(deltas.iter().map(ToString::to_string))),
                );
            }
            None => {
                stats.removed += 1;
                entries.push(
                    ChangeEntry::new(R::FAMILY, ChangeKind::Removed, raw.clone(), normalized)
                        .with_detail(join(record.summary(false))),
                );
            }
        }
    }

    for (raw, record) in &local_by_id {
        if !claimed.contains_key(raw) {
            stats.added += 1;
            entries.push(
                ChangeEntry::new(R::FAMILY, ChangeKind::Added, (*raw).clone(), (*raw).clone())
                    .with_detail(join(record.summary(true))),
            );
        }
    }
    stats.shared_local = claimed.values().map(|n| n - 1).sum();

    for entry in entries {
        if let Some(note) = R::general_note(&entry) {
            let id = entry.after.clone();
            report.push(
                ChangeEntry::new(R::FAMILY, ChangeKind::Noted, id.clone(), id).with_detail(note),
            );
        }
        report.push(entry);
    }
    for (side, duplicates) in [("remote", remote_dups), ("local", local_dups)] {
        for id in duplicates {
            let note = format!(
                "duplicate {} record {id} in {side} snapshot not compared",
                R::FAMILY
            );
            report.push(
                ChangeEntry::new(R::FAMILY, ChangeKind::Noted, id.clone(), id).with_detail(note),
            );
        }
    }
    for list in report.changes.values_mut() {
        list.sort();
    }

    debug_assert!(stats.is_balanced(), "unbalanced reconciliation: {stats:?}");
    report.stats = stats;
    report
}

/// Key records by raw identity, keeping the first of any duplicates.
///
/// Returns the index and the identities of the duplicates left out.
fn index<'r, R: Record>(
    records: &'r [R],
    options: &ReconcileOptions,
    ignored: &mut usize,
) -> (BTreeMap<Identity, &'r R>, Vec<Identity>) {
    let mut by_id = BTreeMap::new();
    let mut duplicates = Vec::new();
    for record in records {
        let id = record.identity();
        if options.skips(&id) {
            *ignored += 1;
            continue;
        }
        if by_id.contains_key(&id) {
            let family = R::FAMILY;
            warn!(family = %family, identity = %id, "duplicate record ignored");
            duplicates.push(id);
            continue;
        }
        by_id.insert(id, record);
    }
    (by_id, duplicates)
}

fn join<I>(parts: I) -> String
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    parts
        .into_iter()
        .map(|p| p.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Owning modules that received entries in any of `reports`, `general` excluded.
pub fn owning_modules<'r>(reports: impl IntoIterator<Item = &'r FamilyReport>) -> BTreeSet<String> {
    reports
        .into_iter()
        .flat_map(|report| report.modules())
        .filter(|module| *module != GENERAL)
        .map(str::to_string)
        .collect()
}
