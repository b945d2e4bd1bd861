use async_trait::async_trait;
use chrono::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::queries::{Error, Result};
use crate::update::{StateUpdate, UpdateBody, UpdateTag};

/// Persistent chain of state updates
#[async_trait]
pub trait UpdateStore: Send + Sync {
    /// Append an update to the chain
    async fn store_update(&self, update: &UpdateBody, created: NaiveDateTime) -> Result<()>;

    /// Updates since the last snapshot, oldest first
    async fn load_updates(&self) -> Result<Vec<StateUpdate>>;
}

/// Keeps the chain of updates in memory. Used for local runs without
/// PostgreSQL and in tests.
#[derive(Clone, Default)]
pub struct MemoryStore {
    updates: Arc<Mutex<Vec<(NaiveDateTime, UpdateBody)>>>,
    closed: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Reject every write until `reopen` is called
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn reopen(&self) {
        self.closed.store(false, Ordering::SeqCst);
    }

    /// All stored bodies, oldest first
    pub async fn bodies(&self) -> Vec<UpdateBody> {
        self.updates
            .lock()
            .await
            .iter()
            .map(|(_, body)| body.clone())
            .collect()
    }
}

#[async_trait]
impl UpdateStore for MemoryStore {
    async fn store_update(&self, update: &UpdateBody, created: NaiveDateTime) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(Error::Closed);
        }
        self.updates.lock().await.push((created, update.clone()));
        Ok(())
    }

    async fn load_updates(&self) -> Result<Vec<StateUpdate>> {
        let updates = self.updates.lock().await;
        let start = updates
            .iter()
            .rposition(|(_, body)| body.tag() == UpdateTag::Snapshot)
            .unwrap_or(0);
        Ok(updates[start..]
            .iter()
            .map(|(created, body)| StateUpdate::at(*created, body.clone()))
            .collect())
    }
}
