//! XML id family comparison.

use crate::domain::{AttributeDelta, Family, Identity, Record, XmlIdRecord};
use crate::identity::Normalizer;

fn value(v: &Option<String>) -> &str {
    v.as_deref().unwrap_or_default()
}

impl Record for XmlIdRecord {
    const FAMILY: Family = Family::XmlId;

    fn identity(&self) -> Identity {
        Identity::new(&self.module, &self.model, &self.name)
    }

    fn deltas(&self, local: &Self, _normalizer: &Normalizer<'_>) -> Vec<AttributeDelta> {
        let mut deltas = Vec::new();
        if self.noupdate != local.noupdate {
            deltas.push(AttributeDelta::flag("noupdate", local.noupdate));
        }
        for (attribute, before, after) in [
            ("prefix", &self.prefix, &local.prefix),
            ("suffix", &self.suffix, &local.suffix),
            ("domain", &self.domain, &local.domain),
        ] {
            if before != after {
                deltas.push(AttributeDelta::value(attribute, value(before), value(after)));
            }
        }
        deltas
    }

    fn summary(&self, _added: bool) -> Vec<String> {
        let mut parts = Vec::new();
        if self.noupdate {
            parts.push("noupdate".to_string());
        }
        if let Some(domain) = &self.domain {
            parts.push(format!("domain: {domain}"));
        }
        parts
    }
}
