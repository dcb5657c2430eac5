use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use crate::record::AnalysisRecord;

use super::error::StorageError;
use super::AnalysisStore;

/// Process-local store. Records are lost on exit.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, AnalysisRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn records(&self) -> MutexGuard<'_, HashMap<String, AnalysisRecord>> {
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl AnalysisStore for MemoryStore {
    async fn insert(&self, record: &AnalysisRecord) -> Result<String, StorageError> {
        let id = Uuid::new_v4().to_string();
        let mut stored = record.clone();
        stored.id = Some(id.clone());
        self.records().insert(id.clone(), stored);
        Ok(id)
    }

    async fn update(&self, record: &AnalysisRecord) -> Result<(), StorageError> {
        let id = record.id.as_deref().ok_or(StorageError::MissingId)?;
        let mut records = self.records();
        match records.get_mut(id) {
            Some(stored) => {
                *stored = record.clone();
                Ok(())
            }
            None => Err(StorageError::NotFound(id.to_string())),
        }
    }

    async fn load(&self, id: &str) -> Result<AnalysisRecord, StorageError> {
        self.records()
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(id.to_string()))
    }
}
