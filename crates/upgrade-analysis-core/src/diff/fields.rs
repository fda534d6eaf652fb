//! Field family comparison.

use crate::domain::{AttributeDelta, Family, FieldRecord, Identity, Record};
use crate::identity::Normalizer;

use super::ReconcileOptions;

/// Bookkeeping columns every model carries; never worth a migration note.
pub const MAGIC_FIELDS: &[&str] = &["create_date", "create_uid", "id", "write_date", "write_uid"];

/// Options the orchestrator uses for the field family.
pub fn magic_field_options() -> ReconcileOptions {
    ReconcileOptions::ignoring(MAGIC_FIELDS.iter().copied())
}

fn opt(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or_default()
}

impl Record for FieldRecord {
    const FAMILY: Family = Family::Field;

    fn identity(&self) -> Identity {
        Identity::new(&self.module, &self.model, &self.name)
    }

    fn deltas(&self, local: &Self, normalizer: &Normalizer<'_>) -> Vec<AttributeDelta> {
        let mut deltas = Vec::new();
        if self.kind != local.kind {
            deltas.push(AttributeDelta::value("type", &self.kind, &local.kind));
        }
        // The target model may itself have been renamed.
        let relation = self.relation.as_deref().map(|r| normalizer.model(r));
        if relation != local.relation.as_deref() {
            deltas.push(AttributeDelta::value(
                "relation",
                opt(&self.relation),
                opt(&local.relation),
            ));
        }
        if self.selection_keys != local.selection_keys {
            deltas.push(AttributeDelta::value(
                "selection_keys",
                format!("[{}]", self.selection_keys.join(", ")),
                format!("[{}]", local.selection_keys.join(", ")),
            ));
        }
        if self.label != local.label {
            deltas.push(AttributeDelta::value(
                "label",
                opt(&self.label),
                opt(&local.label),
            ));
        }
        for (attribute, before, after) in [
            ("stored", self.stored, local.stored),
            ("computed", self.computed, local.computed),
            ("related", self.related, local.related),
            ("required", self.required, local.required),
        ] {
            if before != after {
                deltas.push(AttributeDelta::flag(attribute, after));
            }
        }
        deltas
    }

    fn summary(&self, added: bool) -> Vec<String> {
        let mut parts = vec![format!("type: {}", self.kind)];
        if let Some(relation) = &self.relation {
            parts.push(format!("relation: {relation}"));
        }
        if self.required {
            parts.push("required".to_string());
        }
        if !self.selection_keys.is_empty() {
            parts.push(format!("selection_keys: [{}]", self.selection_keys.join(", ")));
        }
        if added {
            if self.computed {
                parts.push("computed".to_string());
            }
            if self.related {
                parts.push("related".to_string());
            }
            if !self.stored {
                parts.push("not stored".to_string());
            }
        }
        parts
    }
}
