use crate::error::ImportError;
use crate::model::ImportMethod;
use log::{debug, warn};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub type DomainPreferences = HashMap<String, ImportMethod>;

/// Persistent mapping from domain to the import method that worked there.
///
/// Writes are read-modify-write with no locking; a single writer is assumed.
pub trait PreferenceStore {
    fn load(&self) -> Result<DomainPreferences, ImportError>;
    fn save(&mut self, domain: &str, method: ImportMethod) -> Result<(), ImportError>;
}

/// Keeps preferences for the lifetime of the process only
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    preferences: DomainPreferences,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preferences(preferences: DomainPreferences) -> Self {
        MemoryStore { preferences }
    }
}

impl PreferenceStore for MemoryStore {
    fn load(&self) -> Result<DomainPreferences, ImportError> {
        Ok(self.preferences.clone())
    }

    fn save(&mut self, domain: &str, method: ImportMethod) -> Result<(), ImportError> {
        self.preferences.insert(domain.to_string(), method);
        Ok(())
    }
}

/// Stores preferences as a JSON object in a file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for JsonFileStore {
    fn load(&self) -> Result<DomainPreferences, ImportError> {
        if !self.path.exists() {
            return Ok(DomainPreferences::new());
        }
        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(DomainPreferences::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    fn save(&mut self, domain: &str, method: ImportMethod) -> Result<(), ImportError> {
        let mut preferences = self.load().unwrap_or_else(|e| {
            warn!("Replacing unreadable preferences in {}: {}", self.path.display(), e);
            DomainPreferences::new()
        });
        preferences.insert(domain.to_string(), method);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&preferences)?)?;
        debug!("Saved {} -> {} to {}", domain, method, self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        store.save("example.com", ImportMethod::HtmlParse).unwrap();
        store
            .save("example.com", ImportMethod::StructuredExtraction)
            .unwrap();
        let preferences = store.load().unwrap();
        assert_eq!(preferences.len(), 1);
        assert_eq!(
            preferences["example.com"],
            ImportMethod::StructuredExtraction
        );
    }

    #[test]
    fn test_json_file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("prefs.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_json_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs.json");
        let mut store = JsonFileStore::new(&path);

        store.save("food52.com", ImportMethod::HtmlParse).unwrap();
        store.save("tasty.co", ImportMethod::UrlImport).unwrap();

        let reopened = JsonFileStore::new(&path);
        let preferences = reopened.load().unwrap();
        assert_eq!(preferences["food52.com"], ImportMethod::HtmlParse);
        assert_eq!(preferences["tasty.co"], ImportMethod::UrlImport);

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"html\""));
    }

    #[test]
    fn test_json_file_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, "not json").unwrap();
        let store = JsonFileStore::new(&path);
        assert!(matches!(store.load(), Err(ImportError::JsonError(_))));
    }

    #[test]
    fn test_json_file_store_save_replaces_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, r#"{"example.com": "auto"}"#).unwrap();

        let mut store = JsonFileStore::new(&path);
        store.save("tasty.co", ImportMethod::UrlImport).unwrap();

        let preferences = store.load().unwrap();
        assert_eq!(preferences.len(), 1);
        assert_eq!(preferences["tasty.co"], ImportMethod::UrlImport);
    }
}
