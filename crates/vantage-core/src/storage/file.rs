use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use uuid::Uuid;

use crate::config::StorageConfig;
use crate::record::AnalysisRecord;

use super::error::StorageError;
use super::AnalysisStore;

/// File-based storage implementation.
///
/// One pretty-printed JSON document per analysis:
/// ```text
/// {data_dir}/analyses/
///   {analysis-id}.json
/// ```
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at the given directory.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Creates a store in the configured analyses directory.
    pub fn with_config(config: &StorageConfig) -> Self {
        Self::new(config.analyses_path())
    }

    fn record_file(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    async fn ensure_dir(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| StorageError::io(&self.dir, e))
    }

    async fn write(&self, id: &str, record: &AnalysisRecord) -> Result<(), StorageError> {
        let path = self.record_file(id);
        let json = serde_json::to_string_pretty(record)?;
        fs::write(&path, json)
            .await
            .map_err(|e| StorageError::io(&path, e))
    }
}

#[async_trait]
impl AnalysisStore for FileStore {
    async fn insert(&self, record: &AnalysisRecord) -> Result<String, StorageError> {
        self.ensure_dir().await?;

        let id = Uuid::new_v4().to_string();
        let mut stored = record.clone();
        stored.id = Some(id.clone());
        self.write(&id, &stored).await?;

        Ok(id)
    }

    async fn update(&self, record: &AnalysisRecord) -> Result<(), StorageError> {
        let id = record.id.as_deref().ok_or(StorageError::MissingId)?;
        if !fs::try_exists(self.record_file(id)).await.unwrap_or(false) {
            return Err(StorageError::NotFound(id.to_string()));
        }
        self.write(id, record).await
    }

    async fn load(&self, id: &str) -> Result<AnalysisRecord, StorageError> {
        let path = self.record_file(id);
        let json = match fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(id.to_string()))
            }
            Err(e) => return Err(StorageError::io(&path, e)),
        };

        Ok(serde_json::from_str(&json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AnalysisReport, AnalysisRequest};
    use crate::status::AnalysisStatus;
    use tempfile::TempDir;

    fn create_test_store() -> (FileStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path().join("analyses"));
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_insert_and_load() {
        let (store, _temp) = create_test_store();

        let record = AnalysisRecord::new(AnalysisRequest::new("saúde"));
        let id = store.insert(&record).await.unwrap();

        let loaded = store.load(&id).await.unwrap();
        assert_eq!(loaded.id.as_deref(), Some(id.as_str()));
        assert_eq!(loaded.status, AnalysisStatus::Processing);
        assert_eq!(loaded.input.segment(), "saúde");
    }

    #[tokio::test]
    async fn test_update_completed() {
        let (store, _temp) = create_test_store();

        let mut record = AnalysisRecord::new(AnalysisRequest::new("fitness"));
        record.id = Some(store.insert(&record).await.unwrap());
        record.complete(AnalysisReport::default()).unwrap();
        store.update(&record).await.unwrap();

        let loaded = store.load(record.id.as_deref().unwrap()).await.unwrap();
        assert!(loaded.is_completed());
        assert!(loaded.result.is_some());
    }

    #[tokio::test]
    async fn test_update_requires_existing_record() {
        let (store, _temp) = create_test_store();

        let mut record = AnalysisRecord::new(AnalysisRequest::new("fitness"));
        assert!(matches!(store.update(&record).await, Err(StorageError::MissingId)));

        record.id = Some("missing".to_string());
        assert!(matches!(store.update(&record).await, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_load_missing() {
        let (store, _temp) = create_test_store();
        assert!(matches!(store.load("nope").await, Err(StorageError::NotFound(_))));
    }
}
