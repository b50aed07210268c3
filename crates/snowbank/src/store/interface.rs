use core::future::Future;

/// The seed value a store publishes for a scope that has never been used.
///
/// The first id handed out for a fresh scope is therefore always `1`.
pub const INITIAL_SEED: &str = "1";

/// A shared, eventually-consistent store supporting single-key read and
/// compare-and-swap write.
///
/// This is the only capability the generator needs from its backing store.
/// One key exists per scope, holding the seed: a decimal integer string
/// marking the first id not yet reserved by any generator instance.
///
/// Implementations are expected to track, per scope, the state they observed
/// on the most recent [`read_seed`] call (an etag, a version counter, or the
/// raw value) and to make [`try_write_seed`] succeed only if the key is still
/// in that state. How conflicts are detected is the adapter's business; the
/// generator only relies on the boolean outcome.
///
/// [`read_seed`]: OptimisticDataStore::read_seed
/// [`try_write_seed`]: OptimisticDataStore::try_write_seed
pub trait OptimisticDataStore {
    /// Transport failures (network, permissions, I/O). A detected write
    /// conflict is *not* an error; it is the `false` outcome of
    /// [`try_write_seed`](OptimisticDataStore::try_write_seed).
    type Error: core::error::Error + Send + Sync + 'static;

    /// Returns the current seed for `scope_name`.
    ///
    /// If the scope has never been written, the store must seed it to
    /// [`INITIAL_SEED`] as a side effect and return that value.
    fn read_seed(
        &self,
        scope_name: &str,
    ) -> impl Future<Output = core::result::Result<String, Self::Error>> + Send;

    /// Attempts to overwrite the seed for `scope_name` with `value`.
    ///
    /// Succeeds only if the key is unchanged since this caller's most recent
    /// [`read_seed`](OptimisticDataStore::read_seed). Returns `Ok(false)` on
    /// a detected conflict; any other failure must surface as `Err`.
    fn try_write_seed(
        &self,
        scope_name: &str,
        value: &str,
    ) -> impl Future<Output = core::result::Result<bool, Self::Error>> + Send;
}
