//! Event record storage.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use almanac_recur::model::BaseEvent;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};

/// ## Summary
/// Persistence for base events.
///
/// `update` is the only way to modify a stored record in place; it must
/// apply the closure and commit its result atomically with respect to other
/// updates of the same record.
pub trait EventStore: Send + Sync {
    /// Returns the stored event, or `None` if no record has `id`.
    fn fetch(&self, id: Uuid) -> impl Future<Output = ServiceResult<Option<BaseEvent>>> + Send;

    /// Inserts or replaces the record keyed by `event.id`.
    fn save(&self, event: BaseEvent) -> impl Future<Output = ServiceResult<()>> + Send;

    /// ## Summary
    /// Read-modify-write of a single record.
    ///
    /// `f` runs on a copy of the record; the copy is committed only if `f`
    /// returns `Ok`.
    ///
    /// ## Errors
    /// Returns `ServiceError::NotFound` if no record has `id`, or the error
    /// returned by `f`.
    fn update<T, F>(&self, id: Uuid, f: F) -> impl Future<Output = ServiceResult<T>> + Send
    where
        T: Send,
        F: FnOnce(&mut BaseEvent) -> ServiceResult<T> + Send;

    /// Deletes the record; returns whether it existed.
    fn remove(&self, id: Uuid) -> impl Future<Output = ServiceResult<bool>> + Send;
}

/// ## Summary
/// Process-local event store.
///
/// Each record sits behind its own mutex so updates to one event never
/// block another; the map lock is only held to look records up.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    events: RwLock<HashMap<Uuid, Arc<Mutex<BaseEvent>>>>,
}

impl InMemoryEventStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }

    async fn record(&self, id: Uuid) -> Option<Arc<Mutex<BaseEvent>>> {
        self.events.read().await.get(&id).cloned()
    }
}

impl EventStore for InMemoryEventStore {
    async fn fetch(&self, id: Uuid) -> ServiceResult<Option<BaseEvent>> {
        let Some(record) = self.record(id).await else {
            return Ok(None);
        };
        let event = record.lock().await.clone();
        Ok(Some(event))
    }

    async fn save(&self, event: BaseEvent) -> ServiceResult<()> {
        let existing = {
            let mut events = self.events.write().await;
            match events.entry(event.id) {
                Entry::Occupied(slot) => Arc::clone(slot.get()),
                Entry::Vacant(slot) => {
                    tracing::trace!(event_id = %event.id, "Inserting event record");
                    slot.insert(Arc::new(Mutex::new(event)));
                    return Ok(());
                }
            }
        };

        *existing.lock().await = event;
        Ok(())
    }

    async fn update<T, F>(&self, id: Uuid, f: F) -> ServiceResult<T>
    where
        T: Send,
        F: FnOnce(&mut BaseEvent) -> ServiceResult<T> + Send,
    {
        let record = self.record(id).await.ok_or(ServiceError::NotFound(id))?;
        let mut guard = record.lock().await;

        let mut draft = guard.clone();
        let output = f(&mut draft)?;
        if draft.id != id {
            return Err(ServiceError::Storage(format!(
                "update of {id} changed the record id to {}",
                draft.id
            )));
        }
        *guard = draft;

        Ok(output)
    }

    async fn remove(&self, id: Uuid) -> ServiceResult<bool> {
        Ok(self.events.write().await.remove(&id).is_some())
    }
}
