use crate::{INITIAL_SEED, OptimisticDataStore};
use core::convert::Infallible;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug)]
struct Entry {
    value: String,
    version: u64,
}

/// An in-process [`OptimisticDataStore`] with genuine compare-and-swap
/// semantics.
///
/// Every successful write bumps a per-scope version counter; a write is
/// accepted only if the scope's version still matches what this handle
/// observed on its most recent read. This makes conflicts between handles
/// real, not simulated, so the full refill retry path can be exercised
/// deterministically in tests and single-process deployments.
///
/// [`handle`](MemoryDataStore::handle) creates another frontend over the same
/// backing with its own observation table, which is how independent generator
/// instances sharing one store are modelled: each instance tracks what *it*
/// last read, exactly like an etag cached per client.
pub struct MemoryDataStore {
    backing: Arc<Mutex<HashMap<String, Entry>>>,
    observed: Mutex<HashMap<String, u64>>,
}

impl MemoryDataStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            backing: Arc::new(Mutex::new(HashMap::new())),
            observed: Mutex::new(HashMap::new()),
        }
    }

    /// Returns a new frontend sharing this store's backing data.
    ///
    /// The handle starts with no observations, so its first conditional
    /// write for any scope will conflict until it performs a read.
    pub fn handle(&self) -> Self {
        Self {
            backing: Arc::clone(&self.backing),
            observed: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the currently persisted seed for `scope_name`, if any.
    ///
    /// Unlike [`read_seed`](OptimisticDataStore::read_seed) this neither
    /// initializes absent scopes nor updates this handle's observations.
    pub fn current_seed(&self, scope_name: &str) -> Option<String> {
        self.backing
            .lock()
            .get(scope_name)
            .map(|entry| entry.value.clone())
    }
}

impl Default for MemoryDataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl OptimisticDataStore for MemoryDataStore {
    type Error = Infallible;

    async fn read_seed(&self, scope_name: &str) -> Result<String, Self::Error> {
        let mut backing = self.backing.lock();
        let entry = backing
            .entry(scope_name.to_owned())
            .or_insert_with(|| Entry {
                value: INITIAL_SEED.to_owned(),
                version: 0,
            });
        let value = entry.value.clone();
        let version = entry.version;
        drop(backing);

        self.observed.lock().insert(scope_name.to_owned(), version);
        Ok(value)
    }

    async fn try_write_seed(&self, scope_name: &str, value: &str) -> Result<bool, Self::Error> {
        let observed = self.observed.lock().get(scope_name).copied();
        let mut backing = self.backing.lock();
        let Some(entry) = backing.get_mut(scope_name) else {
            return Ok(false);
        };
        if observed != Some(entry.version) {
            return Ok(false);
        }

        entry.value = value.to_owned();
        entry.version += 1;
        let version = entry.version;
        drop(backing);

        // A successful write is also an observation of the new state.
        self.observed.lock().insert(scope_name.to_owned(), version);
        Ok(true)
    }
}
