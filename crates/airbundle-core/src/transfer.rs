use std::path::Path;

use anyhow::Result;
use thiserror::Error;

pub trait Fetcher: Send + Sync {
    fn download(
        &self,
        url: &str,
        destination: &Path,
        on_progress: &mut dyn FnMut(f64),
    ) -> Result<()>;
}

pub trait Extractor: Send + Sync {
    fn extract(&self, archive_path: &Path, destination_dir: &Path) -> Result<()>;
}

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("invalid bundle id")]
    InvalidBundleId(#[source] anyhow::Error),
    #[error("download failed for '{url}'")]
    Download {
        url: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("archive extraction failed")]
    Extract(#[source] anyhow::Error),
    #[error("extracted artifact does not contain an entry file")]
    MissingEntryFile,
    #[error("failed publishing bundle into the store")]
    Publish(#[source] anyhow::Error),
    #[error("published bundle failed entry verification")]
    PublishVerification,
    #[error("preference store update failed")]
    Prefs(#[source] anyhow::Error),
}

impl InstallError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Download { .. } | Self::Publish(_) | Self::Prefs(_)
        )
    }
}
