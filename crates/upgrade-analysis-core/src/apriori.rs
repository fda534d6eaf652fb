//! Operator-supplied rename and merge knowledge (`apriori.json`).
//!
//! The file is a JSON object with exactly four required keys, each mapping an
//! old name to its new or surviving name:
//!
//! ```json
//! {
//!   "renamed_modules": {"account_voucher": "account"},
//!   "merged_modules": {"sale_stock_margin": "sale_margin"},
//!   "renamed_models": {"sale.order.line": "sale.line"},
//!   "merged_models": {"account.invoice": "account.move"}
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;

use crate::domain::error::ConfigurationError;

/// Conventional file name at the upgrade path.
pub const APRIORI_FILE_NAME: &str = "apriori.json";

const RENAMED_MODULES: &str = "renamed_modules";
const MERGED_MODULES: &str = "merged_modules";
const RENAMED_MODELS: &str = "renamed_models";
const MERGED_MODELS: &str = "merged_models";

/// Which namespace a lookup addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Module,
    Model,
}

/// How an old name reaches its new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Mapping {
    Renamed,
    Merged,
}

/// Read-only view over the four rename/merge mappings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AprioriMap {
    renamed_modules: BTreeMap<String, String>,
    merged_modules: BTreeMap<String, String>,
    renamed_models: BTreeMap<String, String>,
    merged_models: BTreeMap<String, String>,
}

impl AprioriMap {
    /// A map that knows no renames or merges.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from a parsed JSON document, requiring all four keys.
    pub fn from_value(value: &Value) -> Result<Self, ConfigurationError> {
        Ok(Self {
            renamed_modules: mapping(value, RENAMED_MODULES)?,
            merged_modules: mapping(value, MERGED_MODULES)?,
            renamed_models: mapping(value, RENAMED_MODELS)?,
            merged_models: mapping(value, MERGED_MODELS)?,
        })
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigurationError> {
        let value: Value =
            serde_json::from_str(raw).map_err(ConfigurationError::InvalidAprioriJson)?;
        Self::from_value(&value)
    }

    /// Load `apriori.json` from `upgrade_path`.
    pub fn load(upgrade_path: &Path) -> Result<Self, ConfigurationError> {
        let path = upgrade_path.join(APRIORI_FILE_NAME);
        let raw = std::fs::read_to_string(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ConfigurationError::AprioriNotFound { path: path.clone() }
            } else {
                ConfigurationError::AprioriUnreadable {
                    path: path.clone(),
                    source,
                }
            }
        })?;
        let map = Self::from_json_str(&raw)?;
        tracing::debug!(
            path = %path.display(),
            renamed_modules = map.renamed_modules.len(),
            merged_modules = map.merged_modules.len(),
            renamed_models = map.renamed_models.len(),
            merged_models = map.merged_models.len(),
            "apriori loaded"
        );
        Ok(map)
    }

    /// Add a module rename (builder pattern).
    pub fn with_renamed_module(mut self, old: impl Into<String>, new: impl Into<String>) -> Self {
        self.renamed_modules.insert(old.into(), new.into());
        self
    }

    pub fn with_merged_module(mut self, old: impl Into<String>, into: impl Into<String>) -> Self {
        self.merged_modules.insert(old.into(), into.into());
        self
    }

    pub fn with_renamed_model(mut self, old: impl Into<String>, new: impl Into<String>) -> Self {
        self.renamed_models.insert(old.into(), new.into());
        self
    }

    pub fn with_merged_model(mut self, old: impl Into<String>, into: impl Into<String>) -> Self {
        self.merged_models.insert(old.into(), into.into());
        self
    }

    /// The new name of `name` and how it got there, if any mapping applies.
    ///
    /// A rename wins over a merge listing the same old name.
    pub fn resolve(&self, kind: NameKind, name: &str) -> Option<(&str, Mapping)> {
        let (renamed, merged) = match kind {
            NameKind::Module => (&self.renamed_modules, &self.merged_modules),
            NameKind::Model => (&self.renamed_models, &self.merged_models),
        };
        renamed
            .get(name)
            .map(|new| (new.as_str(), Mapping::Renamed))
            .or_else(|| merged.get(name).map(|new| (new.as_str(), Mapping::Merged)))
    }

    /// The new name of `name`, or `name` itself when nothing maps it.
    pub fn lookup<'a>(&'a self, kind: NameKind, name: &'a str) -> &'a str {
        self.resolve(kind, name).map_or(name, |(new, _)| new)
    }

    pub fn renamed_modules(&self) -> &BTreeMap<String, String> {
        &self.renamed_modules
    }

    pub fn merged_modules(&self) -> &BTreeMap<String, String> {
        &self.merged_modules
    }

    pub fn renamed_models(&self) -> &BTreeMap<String, String> {
        &self.renamed_models
    }

    pub fn merged_models(&self) -> &BTreeMap<String, String> {
        &self.merged_models
    }
}

fn mapping(value: &Value, key: &'static str) -> Result<BTreeMap<String, String>, ConfigurationError> {
    let entry = value
        .get(key)
        .ok_or(ConfigurationError::MissingAprioriKey { key })?;
    let object = entry
        .as_object()
        .ok_or(ConfigurationError::MalformedAprioriKey { key })?;
    object
        .iter()
        .map(|(old, new)| {
            new.as_str()
                .map(|new| (old.clone(), new.to_string()))
                .ok_or(ConfigurationError::MalformedAprioriKey { key })
        })
        .collect()
}
