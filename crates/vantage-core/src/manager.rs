use std::sync::Arc;

use tracing::{info, warn};

use crate::analysis::{AnalysisReport, AnalysisRequest};
use crate::record::AnalysisRecord;
use crate::storage::AnalysisStore;

/// Tracks analyses through their lifecycle with best-effort persistence.
///
/// Storage failures never fail a request: they are logged and the
/// analysis proceeds unpersisted.
#[derive(Clone, Default)]
pub struct AnalysisManager {
    store: Option<Arc<dyn AnalysisStore>>,
}

impl AnalysisManager {
    pub fn new(store: Option<Arc<dyn AnalysisStore>>) -> Self {
        Self { store }
    }

    /// A manager that persists nothing.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    /// Inserts a `processing` record for the request.
    ///
    /// Returns the stored record with its id, or None when persistence is
    /// disabled or the insert failed.
    pub async fn begin(&self, request: &AnalysisRequest) -> Option<AnalysisRecord> {
        let store = self.store.as_ref()?;
        let mut record = AnalysisRecord::new(request.clone());

        match store.insert(&record).await {
            Ok(id) => {
                info!(analysis_id = %id, "Analysis record created");
                record.id = Some(id);
                Some(record)
            }
            Err(e) => {
                warn!(error = %e, "Failed to save initial analysis record");
                None
            }
        }
    }

    /// Attaches the report, marks the record `completed` and stores it.
    ///
    /// Returns the id when the update was written.
    pub async fn complete(
        &self,
        mut record: AnalysisRecord,
        report: &AnalysisReport,
    ) -> Option<String> {
        let store = self.store.as_ref()?;
        let id = record.id.clone()?;

        if let Err(e) = record.complete(report.clone()) {
            warn!(analysis_id = %id, error = %e, "Refusing status change");
            return None;
        }

        match store.update(&record).await {
            Ok(()) => {
                info!(analysis_id = %id, "Analysis record completed");
                Some(id)
            }
            Err(e) => {
                warn!(analysis_id = %id, error = %e, "Failed to update analysis record");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::AnalysisStatus;
    use crate::storage::{MemoryStore, StorageError};
    use async_trait::async_trait;

    fn create_test_manager() -> (AnalysisManager, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let manager = AnalysisManager::new(Some(store.clone() as Arc<dyn AnalysisStore>));
        (manager, store)
    }

    struct BrokenStore;

    #[async_trait]
    impl AnalysisStore for BrokenStore {
        async fn insert(&self, _record: &AnalysisRecord) -> Result<String, StorageError> {
            Err(StorageError::Api {
                status: 503,
                message: "down".to_string(),
            })
        }

        async fn update(&self, _record: &AnalysisRecord) -> Result<(), StorageError> {
            Err(StorageError::MissingId)
        }

        async fn load(&self, id: &str) -> Result<AnalysisRecord, StorageError> {
            Err(StorageError::NotFound(id.to_string()))
        }
    }

    #[tokio::test]
    async fn test_begin_and_complete() {
        let (manager, store) = create_test_manager();

        let record = manager.begin(&AnalysisRequest::new("saúde")).await.unwrap();
        let id = record.id.clone().unwrap();
        assert_eq!(store.load(&id).await.unwrap().status, AnalysisStatus::Processing);

        let completed = manager.complete(record, &AnalysisReport::default()).await;
        assert_eq!(completed.as_deref(), Some(id.as_str()));
        assert!(store.load(&id).await.unwrap().is_completed());
    }

    #[tokio::test]
    async fn test_complete_twice_refused() {
        let (manager, store) = create_test_manager();

        let mut record = manager.begin(&AnalysisRequest::new("saúde")).await.unwrap();
        record.complete(AnalysisReport::default()).unwrap();
        store.update(&record).await.unwrap();

        assert!(manager.complete(record, &AnalysisReport::default()).await.is_none());
    }

    #[tokio::test]
    async fn test_disabled_manager() {
        let manager = AnalysisManager::disabled();
        assert!(!manager.is_enabled());
        assert!(manager.begin(&AnalysisRequest::new("saúde")).await.is_none());
    }

    #[tokio::test]
    async fn test_storage_failures_are_swallowed() {
        let manager = AnalysisManager::new(Some(Arc::new(BrokenStore)));
        assert!(manager.begin(&AnalysisRequest::new("saúde")).await.is_none());

        let mut record = AnalysisRecord::new(AnalysisRequest::new("saúde"));
        record.id = Some("1".to_string());
        assert!(manager.complete(record, &AnalysisReport::default()).await.is_none());
    }
}
