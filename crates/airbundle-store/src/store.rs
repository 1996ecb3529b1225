use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use airbundle_core::{
    validate_bundle_id, ArchiveType, Extractor, Fetcher, InstallError, ENTRY_FILE_NAME,
    MAX_ENTRY_SEARCH_DEPTH,
};

use crate::fs_utils::{
    find_file_by_name, move_dir_or_copy, read_recency, remove_dir_if_exists, write_recency_stamp,
};
use crate::layout::StoreLayout;
use crate::prefs::PreferenceStore;

pub const ACTIVE_BUNDLE_KEY: &str = "bundle.active-path";
pub const CHANNEL_KEY: &str = "bundle.channel";

pub struct BundleStore {
    layout: StoreLayout,
    prefs: PreferenceStore,
    fallback_entry: PathBuf,
    fetcher: Box<dyn Fetcher>,
    extractor: Box<dyn Extractor>,
    install_gate: Mutex<()>,
}

impl BundleStore {
    pub fn open(
        root: impl Into<PathBuf>,
        app_version: &str,
        fallback_entry: impl Into<PathBuf>,
        fetcher: Box<dyn Fetcher>,
        extractor: Box<dyn Extractor>,
    ) -> Result<Self> {
        let layout = StoreLayout::new(root);
        layout.ensure_base_dirs()?;
        let prefs = PreferenceStore::open(layout.prefs_dir(), app_version)?;

        Ok(Self {
            layout,
            prefs,
            fallback_entry: fallback_entry.into(),
            fetcher,
            extractor,
            install_gate: Mutex::new(()),
        })
    }

    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    pub fn prefs(&self) -> &PreferenceStore {
        &self.prefs
    }

    pub fn fallback_entry(&self) -> &Path {
        &self.fallback_entry
    }

    pub fn current_bundle_path(&self) -> PathBuf {
        let pointer = match self.prefs.get(ACTIVE_BUNDLE_KEY) {
            Ok(pointer) => pointer,
            Err(err) => {
                warn!("failed reading active bundle pointer: {err:#}");
                None
            }
        };

        if let Some(pointer) = pointer {
            let path = PathBuf::from(&pointer);
            if path.is_file() {
                return path;
            }

            debug!("clearing stale bundle pointer: {pointer}");
            if let Err(err) = self.prefs.set(ACTIVE_BUNDLE_KEY, None) {
                warn!("failed clearing stale bundle pointer: {err:#}");
            }
        }

        self.fallback_entry.clone()
    }

    pub fn set_pointer(&self, path: Option<&Path>) -> Result<()> {
        match path {
            Some(path) => {
                let value = path
                    .to_str()
                    .with_context(|| format!("bundle path is not valid UTF-8: {}", path.display()))?;
                self.prefs.set(ACTIVE_BUNDLE_KEY, Some(value))
            }
            None => self.prefs.set(ACTIVE_BUNDLE_KEY, None),
        }
    }

    pub fn set_channel(&self, channel: &str) -> Result<()> {
        self.prefs.set(CHANNEL_KEY, Some(channel))
    }

    pub fn channel(&self) -> Result<Option<String>> {
        self.prefs.get(CHANNEL_KEY)
    }

    pub fn install(
        &self,
        bundle_id: &str,
        source_url: Option<&str>,
        on_progress: &mut dyn FnMut(f64),
    ) -> bool {
        let _gate = match self.install_gate.lock() {
            Ok(gate) => gate,
            Err(poisoned) => poisoned.into_inner(),
        };

        match self.run_install(bundle_id, source_url, on_progress) {
            Ok(()) => true,
            Err(err) => {
                let retryable = err.is_retryable();
                let err = anyhow::Error::new(err);
                warn!(bundle_id, retryable, "bundle install failed: {err:#}");
                false
            }
        }
    }

    fn run_install(
        &self,
        bundle_id: &str,
        source_url: Option<&str>,
        on_progress: &mut dyn FnMut(f64),
    ) -> Result<(), InstallError> {
        let source_url = source_url.map(str::trim).filter(|url| !url.is_empty());
        let Some(source_url) = source_url else {
            self.set_pointer(None).map_err(InstallError::Prefs)?;
            return Ok(());
        };

        validate_bundle_id(bundle_id).map_err(InstallError::InvalidBundleId)?;

        let bundle_dir = self.layout.bundle_dir(bundle_id);
        if let Some(entry) = self.installed_entry(&bundle_dir)? {
            debug!(bundle_id, "bundle already installed; refreshing");
            write_recency_stamp(&bundle_dir).map_err(InstallError::Publish)?;
            self.set_pointer(Some(&entry)).map_err(InstallError::Prefs)?;
            self.prune_bundles();
            return Ok(());
        }

        if bundle_dir.exists() {
            debug!(bundle_id, "removing bundle directory with no entry file");
            remove_dir_if_exists(&bundle_dir).map_err(InstallError::Publish)?;
        }

        let entry = match self.stage_and_publish(source_url, &bundle_dir, on_progress) {
            Ok(entry) => entry,
            Err(err) => {
                let _ = remove_dir_if_exists(&self.layout.scratch_dir());
                return Err(err);
            }
        };

        write_recency_stamp(&bundle_dir).map_err(InstallError::Publish)?;
        self.set_pointer(Some(&entry)).map_err(InstallError::Prefs)?;
        self.prune_bundles();
        let _ = remove_dir_if_exists(&self.layout.scratch_dir());
        Ok(())
    }

    fn stage_and_publish(
        &self,
        source_url: &str,
        bundle_dir: &Path,
        on_progress: &mut dyn FnMut(f64),
    ) -> Result<PathBuf, InstallError> {
        let scratch = self.layout.scratch_dir();
        remove_dir_if_exists(&scratch).map_err(InstallError::Publish)?;

        let archive_type = ArchiveType::infer_from_url(source_url).unwrap_or(ArchiveType::Zip);
        let archive_path = self.layout.scratch_archive_path(archive_type);
        self.fetcher
            .download(source_url, &archive_path, on_progress)
            .map_err(|source| InstallError::Download {
                url: source_url.to_string(),
                source,
            })?;

        let extract_dir = self.layout.scratch_extract_dir();
        fs::create_dir_all(&extract_dir)
            .with_context(|| format!("failed to create {}", extract_dir.display()))
            .map_err(InstallError::Extract)?;
        self.extractor
            .extract(&archive_path, &extract_dir)
            .map_err(InstallError::Extract)?;

        find_file_by_name(&extract_dir, ENTRY_FILE_NAME, MAX_ENTRY_SEARCH_DEPTH)
            .map_err(InstallError::Extract)?
            .ok_or(InstallError::MissingEntryFile)?;

        // A concurrent writer could have published this id since the cache-hit check.
        remove_dir_if_exists(bundle_dir).map_err(InstallError::Publish)?;
        move_dir_or_copy(&extract_dir, bundle_dir).map_err(InstallError::Publish)?;

        match find_file_by_name(bundle_dir, ENTRY_FILE_NAME, MAX_ENTRY_SEARCH_DEPTH) {
            Ok(Some(entry)) => Ok(entry),
            Ok(None) => {
                let _ = remove_dir_if_exists(bundle_dir);
                Err(InstallError::PublishVerification)
            }
            Err(err) => {
                let _ = remove_dir_if_exists(bundle_dir);
                Err(InstallError::Publish(err))
            }
        }
    }

    fn installed_entry(&self, bundle_dir: &Path) -> Result<Option<PathBuf>, InstallError> {
        if !bundle_dir.is_dir() {
            return Ok(None);
        }
        find_file_by_name(bundle_dir, ENTRY_FILE_NAME, MAX_ENTRY_SEARCH_DEPTH)
            .map_err(InstallError::Publish)
    }

    fn prune_bundles(&self) {
        if let Err(err) = self.prune_bundles_inner() {
            warn!("failed pruning stale bundles: {err:#}");
        }
    }

    fn prune_bundles_inner(&self) -> Result<()> {
        let bundles_dir = self.layout.bundles_dir();
        let mut generations: Vec<(u128, PathBuf)> = Vec::new();
        for entry in fs::read_dir(&bundles_dir)
            .with_context(|| format!("failed to read {}", bundles_dir.display()))?
        {
            let entry = entry
                .with_context(|| format!("failed to read {}", bundles_dir.display()))?;
            let path = entry.path();
            if path.is_dir() {
                generations.push((read_recency(&path), path));
            }
        }

        generations.sort_by(|a, b| b.0.cmp(&a.0));
        for (_, path) in generations.into_iter().skip(1) {
            debug!("pruning stale bundle: {}", path.display());
            remove_dir_if_exists(&path)?;
        }
        Ok(())
    }
}
