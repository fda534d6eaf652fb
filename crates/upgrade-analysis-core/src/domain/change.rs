//! Change entries: the lines of an analysis report.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::record::{Family, Identity};

/// Catch-all bucket for entries not attributable to a single module.
pub const GENERAL: &str = "general";

/// Classification of one reconciled record.
///
/// The declaration order is the tie-break order within a module section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Removed,
    Added,
    Renamed,
    Merged,
    Changed,
    /// Cross-reference in the `general` bucket. Not part of record accounting.
    Noted,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeKind::Removed => "removed",
            ChangeKind::Added => "added",
            ChangeKind::Renamed => "renamed",
            ChangeKind::Merged => "merged",
            ChangeKind::Changed => "changed",
            ChangeKind::Noted => "noted",
        };
        f.write_str(s)
    }
}

/// A single attribute difference between a remote record and its local match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AttributeDelta {
    /// A valued attribute changed.
    Value {
        attribute: String,
        before: String,
        after: String,
    },
    /// A boolean attribute flipped; `now` is the local value.
    Flag { attribute: String, now: bool },
}

impl AttributeDelta {
    pub fn value(attribute: &str, before: impl Into<String>, after: impl Into<String>) -> Self {
        AttributeDelta::Value {
            attribute: attribute.to_string(),
            before: before.into(),
            after: after.into(),
        }
    }

    pub fn flag(attribute: &str, now: bool) -> Self {
        AttributeDelta::Flag {
            attribute: attribute.to_string(),
            now,
        }
    }

    pub fn attribute(&self) -> &str {
        match self {
            AttributeDelta::Value { attribute, .. } | AttributeDelta::Flag { attribute, .. } => {
                attribute
            }
        }
    }
}

impl fmt::Display for AttributeDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeDelta::Value {
                attribute,
                before,
                after,
            } => write!(f, "{attribute} is now '{after}' ('{before}')"),
            AttributeDelta::Flag {
                attribute,
                now: true,
            } => write!(f, "now {attribute}"),
            AttributeDelta::Flag {
                attribute,
                now: false,
            } => write!(f, "not {attribute} anymore"),
        }
    }
}

/// One line of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEntry {
    pub family: Family,
    pub kind: ChangeKind,
    /// Identity as captured remotely (equal to `after` for added entries).
    pub before: Identity,
    /// Post-upgrade identity; its module owns the entry.
    pub after: Identity,
    pub detail: Option<String>,
}

impl ChangeEntry {
    pub fn new(family: Family, kind: ChangeKind, before: Identity, after: Identity) -> Self {
        Self {
            family,
            kind,
            before,
            after,
            detail: None,
        }
    }

    /// Attach a detail; empty text leaves the entry without one.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        self.detail = (!detail.is_empty()).then_some(detail);
        self
    }

    /// Module whose section lists this entry.
    pub fn owner(&self) -> &str {
        match self.kind {
            ChangeKind::Noted => GENERAL,
            _ => &self.after.module,
        }
    }

    fn sort_key(&self) -> (&Identity, ChangeKind, &Identity) {
        (&self.after, self.kind, &self.before)
    }
}

impl PartialOrd for ChangeEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ChangeEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.sort_key()
            .cmp(&other.sort_key())
            .then_with(|| self.family.cmp(&other.family))
            .then_with(|| self.detail.cmp(&other.detail))
    }
}

impl fmt::Display for ChangeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let detail = self.detail.as_deref().unwrap_or_default();
        let text = match self.kind {
            ChangeKind::Noted => return f.write_str(detail),
            ChangeKind::Added => join("NEW", detail, " "),
            ChangeKind::Removed => join("DEL", detail, " "),
            ChangeKind::Changed => detail.to_string(),
            ChangeKind::Renamed => join(&format!("renamed from {}", self.before), detail, ", "),
            ChangeKind::Merged => join(&format!("merged from {}", self.before), detail, ", "),
        };
        write!(f, "{}: {}", self.after.padded(), text)
    }
}

fn join(head: &str, tail: &str, sep: &str) -> String {
    if tail.is_empty() {
        head.to_string()
    } else {
        format!("{head}{sep}{tail}")
    }
}
