use std::path::{Path, PathBuf};

use anyhow::Result;

use airbundle_core::{Extractor, Fetcher};
use airbundle_fetch::{HttpFetcher, ShellExtractor};
use airbundle_store::BundleStore;

pub struct UpdateClient {
    store: BundleStore,
    app_version: Option<String>,
}

impl UpdateClient {
    pub fn open(
        root: impl Into<PathBuf>,
        app_version: Option<&str>,
        fallback_entry: impl Into<PathBuf>,
        fetcher: Box<dyn Fetcher>,
        extractor: Box<dyn Extractor>,
    ) -> Result<Self> {
        let store = BundleStore::open(
            root,
            app_version.unwrap_or_default(),
            fallback_entry,
            fetcher,
            extractor,
        )?;
        Ok(Self {
            store,
            app_version: app_version.map(str::to_string),
        })
    }

    pub fn open_with_defaults(
        root: impl Into<PathBuf>,
        app_version: Option<&str>,
        fallback_entry: impl Into<PathBuf>,
    ) -> Result<Self> {
        let fetcher = HttpFetcher::new()?;
        Self::open(
            root,
            app_version,
            fallback_entry,
            Box::new(fetcher),
            Box::new(ShellExtractor),
        )
    }

    pub fn store(&self) -> &BundleStore {
        &self.store
    }

    pub fn app_version(&self) -> Option<&str> {
        self.app_version.as_deref()
    }

    pub fn current_bundle_path(&self) -> PathBuf {
        self.store.current_bundle_path()
    }

    pub fn install(
        &self,
        bundle_id: &str,
        source_url: Option<&str>,
        on_progress: &mut dyn FnMut(f64),
    ) -> bool {
        self.store.install(bundle_id, source_url, on_progress)
    }

    pub fn set_channel(&self, channel: &str) -> Result<()> {
        self.store.set_channel(channel)
    }

    pub fn channel(&self) -> Result<Option<String>> {
        self.store.channel()
    }

    pub fn fallback_entry(&self) -> &Path {
        self.store.fallback_entry()
    }
}
