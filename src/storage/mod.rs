//! Whole-document persistence for the site's store.
//!
//! [`DocumentStore`] sits in front of a [`DocumentMedium`] and keeps an
//! in-process copy of the last document it saw or was asked to write.
//!
//! Consistency caveat: when the medium cannot be read (I/O error, malformed
//! JSON, timeout) `read` returns that in-process copy instead of failing. On
//! an ephemeral deployment disk this keeps bookings flowing, but the copy can
//! be stale with respect to other processes sharing the medium. Writes
//! always update the copy first, so later reads in the same process observe
//! the latest intended state even if the medium rejected it. The one
//! exception is a timed-out write inside [`DocumentStore::update`], which is
//! reported to the caller and therefore rolled back in the copy too. A
//! timed-out file write may still land on disk afterwards.

pub mod file;
pub mod memory;

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;

use crate::config::{AppConfig, IN_MEMORY};
use crate::errors::AppError;
use crate::models::StoreDocument;

pub use file::JsonFileMedium;
pub use memory::MemoryMedium;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed store document: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("storage timed out after {0:?}")]
    Timeout(Duration),
}

/// Backing bytes for the store document.
#[async_trait]
pub trait DocumentMedium: Send + Sync {
    /// `Ok(None)` when no document has been written yet.
    async fn load(&self) -> Result<Option<StoreDocument>, StorageError>;
    async fn save(&self, doc: &StoreDocument) -> Result<(), StorageError>;
}

pub struct DocumentStore {
    medium: Box<dyn DocumentMedium>,
    cache: Mutex<StoreDocument>,
    // Serializes read-check-write sequences across requests.
    writer: tokio::sync::Mutex<()>,
    io_timeout: Duration,
}

impl DocumentStore {
    pub fn new(medium: Box<dyn DocumentMedium>, io_timeout: Duration) -> Self {
        Self {
            medium,
            cache: Mutex::new(StoreDocument::default()),
            writer: tokio::sync::Mutex::new(()),
            io_timeout,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let medium: Box<dyn DocumentMedium> = if config.data_file == IN_MEMORY {
            tracing::warn!("DATA_FILE is {IN_MEMORY}; bookings will not survive a restart");
            Box::new(MemoryMedium::new())
        } else {
            tracing::info!(path = %config.data_file, "using JSON file store");
            Box::new(JsonFileMedium::new(&config.data_file))
        };
        Self::new(medium, Duration::from_millis(config.storage_timeout_ms))
    }

    /// Copy of the in-process document, without touching the medium.
    pub fn cached(&self) -> StoreDocument {
        self.cache.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn set_cached(&self, doc: &StoreDocument) {
        if let Ok(mut cache) = self.cache.lock() {
            *cache = doc.clone();
        }
    }

    /// Latest document from the medium, falling back to the in-process copy
    /// when the medium is unreadable. Does not refresh that copy: only
    /// locked sections do, so a slow read cannot overwrite a newer commit.
    ///
    /// A missing document is seeded under the writer lock.
    pub async fn read(&self) -> StoreDocument {
        match timeout(self.io_timeout, self.medium.load()).await {
            Ok(Ok(Some(doc))) => doc,
            Ok(Ok(None)) => {
                let _guard = self.writer.lock().await;
                self.read_locked().await
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "store read failed, using in-memory copy");
                self.cached()
            }
            Err(_) => {
                tracing::warn!(
                    timeout = ?self.io_timeout,
                    "store read timed out, using in-memory copy"
                );
                self.cached()
            }
        }
    }

    // Caller holds `writer`.
    async fn read_locked(&self) -> StoreDocument {
        match timeout(self.io_timeout, self.medium.load()).await {
            Ok(Ok(Some(doc))) => {
                self.set_cached(&doc);
                doc
            }
            Ok(Ok(None)) => {
                let seed = self.cached();
                if let Err(e) = self.persist(&seed).await {
                    tracing::warn!(error = %e, "failed to create store document");
                }
                seed
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "store read failed, using in-memory copy");
                self.cached()
            }
            Err(_) => {
                tracing::warn!(
                    timeout = ?self.io_timeout,
                    "store read timed out, using in-memory copy"
                );
                self.cached()
            }
        }
    }

    /// Replace the document. The in-process copy is updated even when the
    /// medium write fails.
    pub async fn write(&self, doc: &StoreDocument) -> Result<(), StorageError> {
        let _guard = self.writer.lock().await;
        self.write_locked(doc).await
    }

    // Caller holds `writer`.
    async fn write_locked(&self, doc: &StoreDocument) -> Result<(), StorageError> {
        self.set_cached(doc);
        self.persist(doc).await
    }

    async fn persist(&self, doc: &StoreDocument) -> Result<(), StorageError> {
        match timeout(self.io_timeout, self.medium.save(doc)).await {
            Ok(result) => result,
            Err(_) => Err(StorageError::Timeout(self.io_timeout)),
        }
    }

    /// Run `apply` against the current document under the writer lock and
    /// persist the result if it changed anything.
    ///
    /// An error from `apply` aborts without writing. A medium I/O failure is
    /// logged and tolerated (the in-process copy carries the change). A
    /// timeout restores the in-process copy to its state before `apply` and
    /// is reported as [`AppError::Internal`].
    pub async fn update<T, F>(&self, apply: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut StoreDocument) -> Result<T, AppError>,
    {
        let _guard = self.writer.lock().await;

        let before = self.read_locked().await;
        let mut doc = before.clone();
        let value = apply(&mut doc)?;

        if doc == before {
            return Ok(value);
        }

        match self.write_locked(&doc).await {
            Ok(()) => Ok(value),
            Err(e @ StorageError::Timeout(_)) => {
                self.set_cached(&before);
                tracing::error!(error = %e, "store write timed out, change rolled back");
                Err(e.into())
            }
            Err(e) => {
                tracing::warn!(error = %e, "store write failed, change kept in memory only");
                Ok(value)
            }
        }
    }
}
