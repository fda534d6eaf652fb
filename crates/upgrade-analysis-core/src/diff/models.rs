//! Model family comparison.

use crate::domain::{
    AttributeDelta, ChangeEntry, ChangeKind, Family, Identity, ModelKind, ModelRecord, Record,
};
use crate::identity::Normalizer;

impl Record for ModelRecord {
    const FAMILY: Family = Family::Model;

    fn identity(&self) -> Identity {
        Identity::of_model(&self.module, &self.model)
    }

    fn deltas(&self, local: &Self, normalizer: &Normalizer<'_>) -> Vec<AttributeDelta> {
        let mut deltas = Vec::new();
        if self.kind != local.kind {
            deltas.push(AttributeDelta::value(
                "model_type",
                self.kind.to_string(),
                local.kind.to_string(),
            ));
        }
        if self.label != local.label {
            deltas.push(AttributeDelta::value(
                "label",
                self.label.as_deref().unwrap_or_default(),
                local.label.as_deref().unwrap_or_default(),
            ));
        }
        let original = self.original_module.as_deref().map(|m| normalizer.module(m));
        if original != local.original_module.as_deref() {
            deltas.push(AttributeDelta::value(
                "original_module",
                self.original_module.as_deref().unwrap_or_default(),
                local.original_module.as_deref().unwrap_or_default(),
            ));
        }
        deltas
    }

    fn summary(&self, _added: bool) -> Vec<String> {
        match self.kind {
            ModelKind::Regular => Vec::new(),
            kind => vec![format!("[{kind}]")],
        }
    }

    fn general_note(entry: &ChangeEntry) -> Option<String> {
        let (before, after) = (&entry.before, &entry.after);
        let note = match entry.kind {
            ChangeKind::Added => format!("new model {} [module {}]", after.model, after.module),
            ChangeKind::Removed => {
                format!("obsolete model {} [module {}]", before.model, after.module)
            }
            ChangeKind::Renamed if before.model != after.model => format!(
                "obsolete model {} (renamed to {}) [module {}]",
                before.model, after.model, after.module
            ),
            ChangeKind::Merged if before.model != after.model => format!(
                "obsolete model {} (merged into {}) [module {}]",
                before.model, after.model, after.module
            ),
            _ => return None,
        };
        Some(note)
    }
}
