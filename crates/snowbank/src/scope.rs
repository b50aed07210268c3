use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Counter pair for one scope within one generator instance.
///
/// Both counters start at zero, which reads as "batch exhausted" and forces
/// a refill on the first issuance. Invariant once initialized:
/// `last_id <= highest_id_available_in_batch`.
#[derive(Debug, Default)]
pub(crate) struct Counters {
    /// The most recently issued id for this scope (0 before first issuance).
    pub(crate) last_id: u64,
    /// The upper bound of the currently reserved batch, inclusive.
    pub(crate) highest_id_available_in_batch: u64,
}

/// One scope's state: its counters behind the scope's exclusive lock.
///
/// The lock is async-aware because a holder may suspend mid-critical-section
/// while refilling from the store.
pub(crate) type ScopeState = tokio::sync::Mutex<Counters>;

/// Lazily populated map from scope name to scope state.
///
/// Get-or-create is atomic under the registry lock, so concurrent first
/// accesses for the same new name all land on a single state instance. The
/// lock is only held for the map operation itself, never across store I/O.
/// States are never evicted while the generator lives.
#[derive(Default)]
pub(crate) struct ScopeRegistry {
    scopes: Mutex<HashMap<String, Arc<ScopeState>>>,
}

impl ScopeRegistry {
    pub(crate) fn get_or_create(&self, scope_name: &str) -> Arc<ScopeState> {
        let mut scopes = self.scopes.lock();
        if let Some(state) = scopes.get(scope_name) {
            return Arc::clone(state);
        }
        let state = Arc::<ScopeState>::default();
        scopes.insert(scope_name.to_owned(), Arc::clone(&state));
        state
    }
}
