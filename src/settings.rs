//! Persisted token and platform.
//!
//! Forms receive a [`SettingsStore`] instead of reaching for process-wide state, so the
//! same form logic runs against the on-disk store or an in-memory one in tests.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::config::config_dir;
use crate::error::ApiError;
use crate::types::Platform;

pub const TOKEN_KEY: &str = "apiToken";
pub const PLATFORM_KEY: &str = "apiPlatform";

/// String key-value settings
pub trait SettingsStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), ApiError>;
}

/// Stored token, or empty.
pub fn load_token(store: &dyn SettingsStore) -> String {
    store.get(TOKEN_KEY).unwrap_or_default()
}

/// Stored platform; unknown values fall back to the default.
pub fn load_platform(store: &dyn SettingsStore) -> Platform {
    match store.get(PLATFORM_KEY) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(platform = %raw, "unknown stored platform, using default");
            Platform::default()
        }),
        None => Platform::default(),
    }
}

pub fn save_credentials(
    store: &mut dyn SettingsStore,
    token: &str,
    platform: Platform,
) -> Result<(), ApiError> {
    store.set(TOKEN_KEY, token)?;
    store.set(PLATFORM_KEY, platform.as_str())
}

/// Settings kept in memory only
#[derive(Debug, Default, Clone)]
pub struct MemorySettingsStore {
    values: HashMap<String, String>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ApiError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Settings persisted as a flat JSON object, rewritten on every `set`
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileSettingsStore {
    pub fn default_path() -> PathBuf {
        config_dir().join("settings.json")
    }

    /// Open the store at `path`. A missing or unreadable file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "ignoring malformed settings");
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), ApiError> {
        let io_err = |source| ApiError::Settings {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, content).map_err(io_err)
    }
}

impl SettingsStore for FileSettingsStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ApiError> {
        self.values.insert(key.to_string(), value.to_string());
        self.persist()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("api-tester-settings-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn defaults_when_nothing_is_stored() {
        let store = MemorySettingsStore::new();
        assert_eq!(load_token(&store), "");
        assert_eq!(load_platform(&store), Platform::ThreeTs);
    }

    #[test]
    fn unknown_platform_falls_back_to_default() {
        let mut store = MemorySettingsStore::new();
        store.set(PLATFORM_KEY, "silver").unwrap();
        assert_eq!(load_platform(&store), Platform::ThreeTs);
    }

    #[test]
    fn credentials_round_trip_through_memory() {
        let mut store = MemorySettingsStore::new();
        save_credentials(&mut store, "tok.wr", Platform::Gold).unwrap();
        assert_eq!(load_token(&store), "tok.wr");
        assert_eq!(load_platform(&store), Platform::Gold);
    }

    #[test]
    fn file_store_survives_reopen() {
        let path = tmp_path("reopen.json");
        let mut store = FileSettingsStore::open(&path);
        save_credentials(&mut store, "abc", Platform::Gold).unwrap();

        let reopened = FileSettingsStore::open(&path);
        assert_eq!(reopened.get(TOKEN_KEY).as_deref(), Some("abc"));
        assert_eq!(load_platform(&reopened), Platform::Gold);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn malformed_file_starts_empty() {
        let path = tmp_path("malformed.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "not json").unwrap();
        let store = FileSettingsStore::open(&path);
        assert_eq!(store.get(TOKEN_KEY), None);
        let _ = std::fs::remove_file(&path);
    }
}
