//! Installed-module bookkeeping of the local system.
//!
//! The orchestrator needs to know which modules are installed, at which
//! version, and where their sources live so notes can be written next to them.
//! A JSON document `{"modules": [...]}` can back a [`StaticModuleRegistry`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::error::SnapshotError;
use crate::snapshot::SnapshotResult;

/// One installed module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledModule {
    pub name: String,
    pub installed_version: String,
    /// Core modules live directly under the upgrade path.
    #[serde(default)]
    pub core: bool,
    /// Source directory of a non-core module.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl InstalledModule {
    pub fn new(name: impl Into<String>, installed_version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            installed_version: installed_version.into(),
            core: false,
            path: None,
        }
    }

    pub fn core(mut self) -> Self {
        self.core = true;
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Source directory: `<upgrade_path>/<name>` for core modules, the
    /// declared path otherwise.
    pub fn directory(&self, upgrade_path: &Path) -> Option<PathBuf> {
        if self.core {
            Some(upgrade_path.join(&self.name))
        } else {
            self.path.clone()
        }
    }
}

/// Source of the installed modules.
pub trait ModuleRegistry: Send + Sync {
    fn installed(&self) -> Vec<InstalledModule>;

    /// Installed modules keyed by name.
    fn by_name(&self) -> BTreeMap<String, InstalledModule> {
        self.installed()
            .into_iter()
            .map(|module| (module.name.clone(), module))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct ModulesDocument {
    #[serde(default)]
    modules: Vec<InstalledModule>,
}

/// A fixed list of installed modules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticModuleRegistry {
    modules: Vec<InstalledModule>,
}

impl StaticModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_module(mut self, module: InstalledModule) -> Self {
        self.modules.push(module);
        self
    }

    /// Load a `{"modules": [...]}` document.
    pub fn from_json_file(path: &Path) -> SnapshotResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let doc: ModulesDocument =
            serde_json::from_str(&raw).map_err(|source| SnapshotError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self {
            modules: doc.modules,
        })
    }
}

impl ModuleRegistry for StaticModuleRegistry {
    fn installed(&self) -> Vec<InstalledModule> {
        self.modules.clone()
    }
}
