use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

const NAMESPACE_FILE_PREFIX: &str = "prefs-";
const NAMESPACE_FILE_SUFFIX: &str = ".toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PreferenceFile {
    #[serde(default)]
    values: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct PreferenceStore {
    prefs_root: PathBuf,
    namespace: String,
}

impl PreferenceStore {
    pub fn open(prefs_root: impl Into<PathBuf>, app_version: &str) -> Result<Self> {
        let prefs_root = prefs_root.into();
        fs::create_dir_all(&prefs_root)
            .with_context(|| format!("failed to create {}", prefs_root.display()))?;

        let store = Self {
            prefs_root,
            namespace: sanitize_namespace(app_version),
        };
        store.prune_stale_namespaces()?;
        Ok(store)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.values.get(key).cloned())
    }

    pub fn set(&self, key: &str, value: Option<&str>) -> Result<()> {
        let mut state = self.load()?;
        match value {
            Some(value) => {
                state.values.insert(key.to_string(), value.to_string());
            }
            None => {
                if state.values.remove(key).is_none() {
                    return Ok(());
                }
            }
        }
        self.save(&state)
    }

    fn namespace_file_name(&self) -> String {
        format!("{NAMESPACE_FILE_PREFIX}{}{NAMESPACE_FILE_SUFFIX}", self.namespace)
    }

    fn namespace_file_path(&self) -> PathBuf {
        self.prefs_root.join(self.namespace_file_name())
    }

    fn load(&self) -> Result<PreferenceFile> {
        let path = self.namespace_file_path();
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(PreferenceFile::default());
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed reading preferences: {}", path.display()));
            }
        };

        toml::from_str(&raw)
            .with_context(|| format!("failed parsing preferences: {}", path.display()))
    }

    fn save(&self, state: &PreferenceFile) -> Result<()> {
        fs::create_dir_all(&self.prefs_root)
            .with_context(|| format!("failed to create {}", self.prefs_root.display()))?;

        let path = self.namespace_file_path();
        let content = toml::to_string(state)
            .with_context(|| format!("failed serializing preferences: {}", path.display()))?;
        fs::write(&path, content)
            .with_context(|| format!("failed writing preferences: {}", path.display()))
    }

    fn prune_stale_namespaces(&self) -> Result<()> {
        let keep = self.namespace_file_name();
        let entries = match fs::read_dir(&self.prefs_root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("failed to read {}", self.prefs_root.display())
                });
            }
        };

        for entry in entries {
            let entry = entry
                .with_context(|| format!("failed to read {}", self.prefs_root.display()))?;
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if !name.starts_with(NAMESPACE_FILE_PREFIX) || !name.ends_with(NAMESPACE_FILE_SUFFIX) {
                continue;
            }
            if name == keep {
                continue;
            }

            let path = entry.path();
            debug!("pruning stale preference namespace: {}", path.display());
            fs::remove_file(&path).with_context(|| {
                format!("failed pruning stale preference namespace: {}", path.display())
            })?;
        }
        Ok(())
    }
}

fn sanitize_namespace(app_version: &str) -> String {
    let trimmed = app_version.trim();
    if trimmed.is_empty() {
        return "unversioned".to_string();
    }

    trimmed
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '.' || ch == '-' || ch == '_' {
                ch
            } else {
                '-'
            }
        })
        .collect()
}
