//! Migration-notes rendering.
//!
//! Turns the three family reports into one text block per module key:
//! models, then fields, then xml records, each under a literal banner.

use serde::{Deserialize, Serialize};

use crate::diff::FamilyReport;
use crate::domain::{ChangeEntry, GENERAL};

/// Banner closing a module section whose three families are all empty.
pub const NOTHING_CHANGED: &str = "---nothing has changed in this module--";

/// The three reconciled families of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub models: FamilyReport,
    pub fields: FamilyReport,
    pub xmlids: FamilyReport,
}

impl AnalysisReport {
    /// Render the section of `module` as plain text. Pure; never writes.
    ///
    /// The `general` section also carries each family's statistics.
    pub fn render_module(&self, module: &str) -> String {
        let sections = [
            ("Models", &self.models),
            ("Fields", &self.fields),
            ("XML records", &self.xmlids),
        ];

        let mut out = String::new();
        let mut any = false;
        for (title, report) in sections {
            out.push_str(&format!("---{title} in module '{module}'---\n"));
            let entries = report.entries(module);
            any |= !entries.is_empty();
            push_lines(&mut out, entries);
            if module == GENERAL {
                for line in report.stats.summary_lines(report.family) {
                    out.push_str(&line);
                    out.push('\n');
                }
                any = true;
            }
        }
        if !any {
            out.push_str(NOTHING_CHANGED);
            out.push('\n');
        }
        out
    }

    /// Whether `module` owns no entry in any family.
    pub fn is_unchanged(&self, module: &str) -> bool {
        [&self.models, &self.fields, &self.xmlids]
            .iter()
            .all(|report| report.entries(module).is_empty())
    }
}

fn push_lines(out: &mut String, entries: &[ChangeEntry]) {
    for entry in entries {
        out.push_str(&entry.to_string());
        out.push('\n');
    }
}
