use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use airbundle_core::ArchiveType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLayout {
    root: PathBuf,
}

impl StoreLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn bundles_dir(&self) -> PathBuf {
        self.root.join("bundles")
    }

    pub fn bundle_dir(&self, bundle_id: &str) -> PathBuf {
        self.bundles_dir().join(bundle_id)
    }

    pub fn scratch_dir(&self) -> PathBuf {
        self.root.join("scratch")
    }

    pub fn scratch_archive_path(&self, archive_type: ArchiveType) -> PathBuf {
        self.scratch_dir()
            .join(format!("bundle.{}", archive_type.scratch_extension()))
    }

    pub fn scratch_extract_dir(&self) -> PathBuf {
        self.scratch_dir().join("extracted")
    }

    pub fn prefs_dir(&self) -> PathBuf {
        self.root.join("prefs")
    }

    pub fn ensure_base_dirs(&self) -> Result<()> {
        for dir in [self.bundles_dir(), self.scratch_dir(), self.prefs_dir()] {
            fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
        Ok(())
    }
}
