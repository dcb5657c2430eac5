mod error;
mod file;
mod memory;
mod supabase;

pub use error::StorageError;
pub use file::FileStore;
pub use memory::MemoryStore;
pub use supabase::SupabaseStore;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::StorageConfig;
use crate::record::AnalysisRecord;

/// Trait for analysis storage backends.
///
/// Implementations persist analysis records to various systems
/// (hosted database, file system, memory).
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    /// Stores a new record and returns its assigned id.
    async fn insert(&self, record: &AnalysisRecord) -> Result<String, StorageError>;

    /// Overwrites the stored record with the same id.
    async fn update(&self, record: &AnalysisRecord) -> Result<(), StorageError>;

    /// Loads a record by id.
    async fn load(&self, id: &str) -> Result<AnalysisRecord, StorageError>;
}

/// Builds the configured backend; `None` when persistence is disabled.
pub fn from_config(config: &StorageConfig) -> Result<Option<Arc<dyn AnalysisStore>>, StorageError> {
    let store: Arc<dyn AnalysisStore> = match config.backend.to_lowercase().as_str() {
        "none" | "" => return Ok(None),
        "supabase" => Arc::new(SupabaseStore::from_config(config)?),
        "file" => Arc::new(FileStore::with_config(config)),
        "memory" => Arc::new(MemoryStore::new()),
        other => {
            return Err(StorageError::Config(format!(
                "unknown storage backend '{}'",
                other
            )))
        }
    };
    Ok(Some(store))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(backend: &str) -> StorageConfig {
        StorageConfig {
            backend: backend.to_string(),
            ..StorageConfig::default()
        }
    }

    #[test]
    fn test_default_backend_disabled() {
        assert!(from_config(&StorageConfig::default()).unwrap().is_none());
    }

    #[test]
    fn test_file_and_memory_backends() {
        assert!(from_config(&config("file")).unwrap().is_some());
        assert!(from_config(&config("memory")).unwrap().is_some());
    }

    #[test]
    fn test_unknown_backend() {
        assert!(matches!(from_config(&config("mongo")), Err(StorageError::Config(_))));
    }

    #[test]
    fn test_supabase_without_credentials() {
        assert!(from_config(&config("supabase")).is_err());
    }
}
