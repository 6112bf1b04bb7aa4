use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use futures::future::{self, BoxFuture};

use crate::dao::storage::{SlotStore, StorageResult};

/// Volatile slot store for tests and embedders that need no persistence.
#[derive(Debug, Clone, Default)]
pub struct MemorySlotStore {
    slots: Arc<Mutex<HashMap<String, String>>>,
}

impl MemorySlotStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn with_slots<T>(&self, f: impl FnOnce(&mut HashMap<String, String>) -> T) -> T {
        let mut slots = self
            .slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut slots)
    }
}

impl SlotStore for MemorySlotStore {
    fn read(&self, key: &str) -> BoxFuture<'static, StorageResult<Option<String>>> {
        let value = self.with_slots(|slots| slots.get(key).cloned());
        Box::pin(future::ready(Ok(value)))
    }

    fn write(&self, key: &str, value: String) -> BoxFuture<'static, StorageResult<()>> {
        self.with_slots(|slots| slots.insert(key.to_string(), value));
        Box::pin(future::ready(Ok(())))
    }

    fn remove(&self, key: &str) -> BoxFuture<'static, StorageResult<()>> {
        self.with_slots(|slots| slots.remove(key));
        Box::pin(future::ready(Ok(())))
    }
}
