//! Migration notes files.
//!
//! Layout: `<module dir>/migrations/<installed version>/upgrade_analysis.txt`.
//! Files are written through a temporary file in the target directory and
//! persisted over the previous notes.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::domain::error::WriteError;
use crate::modules::InstalledModule;

/// Per-module notes file name.
pub const NOTES_FILE_NAME: &str = "upgrade_analysis.txt";

/// Aggregated log copy written next to `base`'s notes.
pub const GENERAL_LOG_FILE_NAME: &str = "upgrade_general_log.txt";

/// Writes notes files below module directories.
#[derive(Debug, Clone)]
pub struct NotesWriter {
    upgrade_path: PathBuf,
}

impl NotesWriter {
    pub fn new(upgrade_path: impl Into<PathBuf>) -> Self {
        Self {
            upgrade_path: upgrade_path.into(),
        }
    }

    /// `<module dir>/migrations/<installed version>`.
    pub fn notes_dir(&self, module: &InstalledModule) -> Result<PathBuf, WriteError> {
        let dir = module
            .directory(&self.upgrade_path)
            .ok_or_else(|| WriteError::ModulePathUnknown {
                module: module.name.clone(),
            })?;
        Ok(dir.join("migrations").join(&module.installed_version))
    }

    /// Write `content` as the module's `upgrade_analysis.txt`.
    pub fn write(&self, module: &InstalledModule, content: &str) -> Result<PathBuf, WriteError> {
        self.write_named(module, NOTES_FILE_NAME, content)
    }

    /// Write `content` as `file_name` in the module's notes directory.
    pub fn write_named(
        &self,
        module: &InstalledModule,
        file_name: &str,
        content: &str,
    ) -> Result<PathBuf, WriteError> {
        let dir = self.notes_dir(module)?;
        std::fs::create_dir_all(&dir).map_err(|source| WriteError::CreateDir {
            path: dir.clone(),
            source,
        })?;
        let path = dir.join(file_name);
        persist(&dir, &path, content).map_err(|source| WriteError::Open {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

fn persist(dir: &Path, path: &Path, content: &str) -> std::io::Result<()> {
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
