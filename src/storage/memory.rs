use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::{DocumentMedium, StorageError};
use crate::models::StoreDocument;

/// Process-local medium. Clones share the same document, so a test can keep a
/// handle to inject failures or latency after handing one to the store.
#[derive(Clone, Default)]
pub struct MemoryMedium {
    doc: Arc<Mutex<Option<StoreDocument>>>,
    failing: Arc<AtomicBool>,
    latency: Arc<Mutex<Duration>>,
}

impl MemoryMedium {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(doc: StoreDocument) -> Self {
        let medium = Self::new();
        if let Ok(mut slot) = medium.doc.lock() {
            *slot = Some(doc);
        }
        medium
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_latency(&self, latency: Duration) {
        if let Ok(mut l) = self.latency.lock() {
            *l = latency;
        }
    }

    pub fn snapshot(&self) -> Option<StoreDocument> {
        self.doc.lock().ok().and_then(|d| d.clone())
    }

    async fn simulate(&self) -> Result<(), StorageError> {
        let latency = self.latency.lock().map(|l| *l).unwrap_or_default();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("medium offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentMedium for MemoryMedium {
    async fn load(&self) -> Result<Option<StoreDocument>, StorageError> {
        self.simulate().await?;
        Ok(self.snapshot())
    }

    async fn save(&self, doc: &StoreDocument) -> Result<(), StorageError> {
        self.simulate().await?;
        let mut slot = self
            .doc
            .lock()
            .map_err(|_| StorageError::Unavailable("memory medium poisoned".to_string()))?;
        *slot = Some(doc.clone());
        Ok(())
    }
}
