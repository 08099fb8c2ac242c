//! Small key-value store for the selected gender.
//!
//! Convenience persistence only: the wizard never reads it back into a
//! session on its own.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::RwLock;

use crate::error::StorageError;
use crate::onboarding::model::Gender;

/// Key under which the gender is stored.
pub const GENDER_KEY: &str = "gender";

#[async_trait]
pub trait GenderStore: Send + Sync {
    async fn save_gender(&self, gender: Gender) -> Result<(), StorageError>;

    async fn load_gender(&self) -> Result<Option<Gender>, StorageError>;

    async fn clear(&self) -> Result<(), StorageError>;
}

/// JSON file store: `{"gender": "female"}`.
pub struct FileGenderStore {
    path: PathBuf,
}

impl FileGenderStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    async fn read_map(&self) -> Result<HashMap<String, serde_json::Value>, StorageError> {
        match fs::read_to_string(&self.path).await {
            Ok(raw) if raw.trim().is_empty() => Ok(HashMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_map(
        &self,
        map: &HashMap<String, serde_json::Value>,
    ) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let raw = serde_json::to_string_pretty(map)?;
        fs::write(&self.path, raw).await?;
        Ok(())
    }
}

#[async_trait]
impl GenderStore for FileGenderStore {
    async fn save_gender(&self, gender: Gender) -> Result<(), StorageError> {
        let mut map = self.read_map().await?;
        map.insert(GENDER_KEY.to_string(), serde_json::to_value(gender)?);
        self.write_map(&map).await
    }

    async fn load_gender(&self) -> Result<Option<Gender>, StorageError> {
        let map = self.read_map().await?;
        match map.get(GENDER_KEY) {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    async fn clear(&self) -> Result<(), StorageError> {
        let mut map = self.read_map().await?;
        if map.remove(GENDER_KEY).is_some() {
            self.write_map(&map).await?;
        }
        Ok(())
    }
}

/// In-memory store, used when no storage path is configured.
#[derive(Default)]
pub struct MemoryGenderStore {
    gender: RwLock<Option<Gender>>,
}

impl MemoryGenderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GenderStore for MemoryGenderStore {
    async fn save_gender(&self, gender: Gender) -> Result<(), StorageError> {
        *self.gender.write().await = Some(gender);
        Ok(())
    }

    async fn load_gender(&self) -> Result<Option<Gender>, StorageError> {
        Ok(*self.gender.read().await)
    }

    async fn clear(&self) -> Result<(), StorageError> {
        *self.gender.write().await = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileGenderStore::new(dir.path().join("prefs/storage.json"));

        assert_eq!(store.load_gender().await.unwrap(), None);
        store.save_gender(Gender::Male).await.unwrap();
        assert_eq!(store.load_gender().await.unwrap(), Some(Gender::Male));

        let raw = std::fs::read_to_string(dir.path().join("prefs/storage.json")).unwrap();
        assert!(raw.contains("\"gender\": \"male\""));
    }

    #[tokio::test]
    async fn file_store_preserves_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, r#"{"theme": "dark"}"#).unwrap();

        let store = FileGenderStore::new(path.clone());
        store.save_gender(Gender::Female).await.unwrap();
        store.clear().await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("theme"));
        assert!(!raw.contains("gender"));
    }

    #[tokio::test]
    async fn file_store_reports_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileGenderStore::new(path);
        assert!(matches!(
            store.load_gender().await,
            Err(StorageError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn memory_store_roundtrip() {
        let store = MemoryGenderStore::new();
        store.save_gender(Gender::Female).await.unwrap();
        assert_eq!(store.load_gender().await.unwrap(), Some(Gender::Female));
        store.clear().await.unwrap();
        assert_eq!(store.load_gender().await.unwrap(), None);
    }
}
