//! Version-dependent selection of the remote record store.
//!
//! Older remote systems keep their snapshot records under a different store
//! name. The registry maps a minimum major version to the store to read.

use crate::domain::error::ConfigurationError;

/// Store used by remote systems before major version 14.
pub const LEGACY_RECORD_STORE: &str = "openupgrade.record";

/// Store used from major version 14 on, and by the local system.
pub const RECORD_STORE: &str = "upgrade.record";

/// One rule: from `min_major` on, read `store`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreShim {
    pub min_major: u32,
    pub store: String,
}

/// Ordered set of [`StoreShim`] rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShimRegistry {
    shims: Vec<StoreShim>,
}

impl Default for ShimRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl ShimRegistry {
    /// An empty registry; every lookup fails until a shim is added.
    pub fn empty() -> Self {
        Self { shims: Vec::new() }
    }

    /// Legacy store below 14, current store from 14 on.
    pub fn standard() -> Self {
        Self::empty()
            .with_shim(0, LEGACY_RECORD_STORE)
            .with_shim(14, RECORD_STORE)
    }

    /// Add a rule (builder pattern). A rule for an existing threshold replaces it.
    pub fn with_shim(mut self, min_major: u32, store: impl Into<String>) -> Self {
        self.shims.retain(|shim| shim.min_major != min_major);
        self.shims.push(StoreShim {
            min_major,
            store: store.into(),
        });
        self.shims.sort_by_key(|shim| shim.min_major);
        self
    }

    /// Store to read for a remote declaring `version` (e.g. `13.0`, `16`).
    pub fn resolve(&self, version: &str) -> Result<&str, ConfigurationError> {
        let major = major_version(version)
            .ok_or_else(|| ConfigurationError::InvalidVersion(version.to_string()))?;
        self.shims
            .iter()
            .rev()
            .find(|shim| shim.min_major <= major)
            .map(|shim| shim.store.as_str())
            .ok_or_else(|| ConfigurationError::InvalidVersion(version.to_string()))
    }
}

fn major_version(version: &str) -> Option<u32> {
    version.trim().split('.').next()?.parse().ok()
}
