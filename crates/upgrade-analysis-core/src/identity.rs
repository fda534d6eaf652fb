//! Identity normalization: raw snapshot identity to post-upgrade identity.
//!
//! The model component is resolved first, then the module component. Module
//! ownership of a model follows the model's current name, so the order is fixed.

use serde::{Deserialize, Serialize};

use crate::apriori::{AprioriMap, Mapping, NameKind};
use crate::domain::Identity;

/// Whether normalization rewrote an identity, and how.
///
/// Ordered so that combining two rewrites keeps the stronger one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    #[default]
    Unchanged,
    Renamed,
    Merged,
}

impl Provenance {
    pub fn is_rewritten(self) -> bool {
        self != Provenance::Unchanged
    }
}

impl From<Mapping> for Provenance {
    fn from(mapping: Mapping) -> Self {
        match mapping {
            Mapping::Renamed => Provenance::Renamed,
            Mapping::Merged => Provenance::Merged,
        }
    }
}

/// A normalized identity together with how it was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub identity: Identity,
    pub provenance: Provenance,
}

/// Applies an optional [`AprioriMap`] to identities and bare names.
///
/// Without a map every operation is the identity function.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer<'a> {
    apriori: Option<&'a AprioriMap>,
}

impl<'a> Normalizer<'a> {
    pub fn new(apriori: Option<&'a AprioriMap>) -> Self {
        Self { apriori }
    }

    /// New name of a module.
    pub fn module<'n>(&self, name: &'n str) -> &'n str
    where
        'a: 'n,
    {
        self.name(NameKind::Module, name).0
    }

    /// New name of a model.
    pub fn model<'n>(&self, name: &'n str) -> &'n str
    where
        'a: 'n,
    {
        self.name(NameKind::Model, name).0
    }

    fn name<'n>(&self, kind: NameKind, name: &'n str) -> (&'n str, Provenance)
    where
        'a: 'n,
    {
        match self.apriori.and_then(|map| map.resolve(kind, name)) {
            Some((new, mapping)) => (new, mapping.into()),
            None => (name, Provenance::Unchanged),
        }
    }

    /// Canonicalize `identity` into the identity it carries after the upgrade.
    pub fn normalize(&self, identity: &Identity) -> Normalized {
        let (model, model_provenance) = self.name(NameKind::Model, &identity.model);
        let (module, module_provenance) = self.name(NameKind::Module, &identity.module);
        Normalized {
            identity: Identity::new(module, model, identity.name.clone()),
            provenance: model_provenance.max(module_provenance),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn without_apriori_is_identity() {
        let id = Identity::new("sale", "sale.order", "note");
        let normalized = Normalizer::new(None).normalize(&id);
        assert_eq!(normalized.identity, id);
        assert_eq!(normalized.provenance, Provenance::Unchanged);
    }

    #[test]
    fn model_rename_is_flagged() {
        let map = AprioriMap::empty().with_renamed_model("sale.order.line", "sale.line");
        let normalized =
            Normalizer::new(Some(&map)).normalize(&Identity::new("sale", "sale.order.line", "price"));
        assert_eq!(normalized.identity, Identity::new("sale", "sale.line", "price"));
        assert_eq!(normalized.provenance, Provenance::Renamed);
    }

    #[test]
    fn model_and_module_merges_compose() {
        let map = AprioriMap::empty()
            .with_merged_module("a", "b")
            .with_merged_model("x", "y");
        let normalized = Normalizer::new(Some(&map)).normalize(&Identity::new("a", "x", "f"));
        assert_eq!(normalized.identity, Identity::new("b", "y", "f"));
        assert_eq!(normalized.provenance, Provenance::Merged);
    }

    #[test]
    fn merge_dominates_rename() {
        let map = AprioriMap::empty()
            .with_renamed_model("x", "y")
            .with_merged_module("a", "b");
        let normalized = Normalizer::new(Some(&map)).normalize(&Identity::new("a", "x", "f"));
        assert_eq!(normalized.provenance, Provenance::Merged);
    }

    #[test]
    fn bare_name_lookups() {
        let map = AprioriMap::empty()
            .with_renamed_module("account_voucher", "account")
            .with_merged_model("account.invoice", "account.move");
        let normalizer = Normalizer::new(Some(&map));
        assert_eq!(normalizer.module("account_voucher"), "account");
        assert_eq!(normalizer.module("stock"), "stock");
        assert_eq!(normalizer.model("account.invoice"), "account.move");
    }
}
