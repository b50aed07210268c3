
use crate::error::{ConfigError, Error, Result};
use crate::scope::{Counters, ScopeRegistry};
use crate::store::OptimisticDataStore;
use tracing::{debug, trace};

/// Ids reserved per store round trip when not configured otherwise.
pub const DEFAULT_BATCH_SIZE: u64 = 100;

/// Conditional-write attempts per refill when not configured otherwise.
pub const DEFAULT_MAX_WRITE_ATTEMPTS: u32 = 25;

/// Construction-time configuration for a [`UniqueIdGenerator`].
///
/// `batch_size` trades store load against the size of the id gap left behind
/// by a crashed instance: a bigger batch means fewer round trips but a wider
/// abandoned range. `max_write_attempts` bounds how long a refill fights
/// contention before giving up.
///
/// Both setters validate eagerly, so an invalid value fails the setter call
/// and never reaches a generator.
///
/// # Example
///
/// ```
/// use snowbank::GeneratorConfig;
///
/// let config = GeneratorConfig::default()
///     .batch_size(500)
///     .unwrap()
///     .max_write_attempts(10)
///     .unwrap();
/// assert_eq!(config.get_batch_size(), 500);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GeneratorConfig {
    batch_size: u64,
    max_write_attempts: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            max_write_attempts: DEFAULT_MAX_WRITE_ATTEMPTS,
        }
    }
}

impl GeneratorConfig {
    /// Sets the number of ids reserved per store round trip.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::BatchSize`] if `batch_size` is zero.
    pub fn batch_size(mut self, batch_size: u64) -> core::result::Result<Self, ConfigError> {
        if batch_size == 0 {
            return Err(ConfigError::BatchSize(batch_size));
        }
        self.batch_size = batch_size;
        Ok(self)
    }

    /// Sets how many conditional writes a refill may attempt.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MaxWriteAttempts`] if `max_write_attempts` is
    /// zero.
    pub fn max_write_attempts(
        mut self,
        max_write_attempts: u32,
    ) -> core::result::Result<Self, ConfigError> {
        if max_write_attempts == 0 {
            return Err(ConfigError::MaxWriteAttempts(max_write_attempts));
        }
        self.max_write_attempts = max_write_attempts;
        Ok(self)
    }

    /// Returns the configured batch size.
    pub fn get_batch_size(&self) -> u64 {
        self.batch_size
    }

    /// Returns the configured attempt bound.
    pub fn get_max_write_attempts(&self) -> u32 {
        self.max_write_attempts
    }
}

/// A batch-allocating unique id generator over an [`OptimisticDataStore`].
///
/// Each call to [`next_id`](Self::next_id) hands out the next id from the
/// scope's in-memory batch. When the batch is exhausted, a fresh range is
/// reserved from the shared store with a read/conditional-write loop, so the
/// store is touched once per `batch_size` ids rather than once per id.
///
/// The generator is safe to share across tasks: scopes lock independently,
/// and a caller blocked on one scope's refill does not delay callers of
/// other scopes. Construction performs no store I/O.
///
/// # Example
///
/// ```
/// use snowbank::{MemoryDataStore, UniqueIdGenerator};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let generator = UniqueIdGenerator::new(MemoryDataStore::new());
///
/// let a = generator.next_id("orders").await.unwrap();
/// let b = generator.next_id("orders").await.unwrap();
/// assert_eq!((a, b), (1, 2));
/// # }
/// ```
pub struct UniqueIdGenerator<S> {
    store: S,
    scopes: ScopeRegistry,
    config: GeneratorConfig,
}

impl<S> UniqueIdGenerator<S>
where
    S: OptimisticDataStore,
{
    /// Creates a generator with the default configuration
    /// ([`DEFAULT_BATCH_SIZE`], [`DEFAULT_MAX_WRITE_ATTEMPTS`]).
    pub fn new(store: S) -> Self {
        Self::with_config(store, GeneratorConfig::default())
    }

    /// Creates a generator with an explicit configuration.
    ///
    /// The configuration is immutable for the lifetime of the generator;
    /// mixing batch sizes against one scope is safe across *instances* (the
    /// seed protocol never assumes symmetric batches) but cannot happen
    /// within one instance.
    pub fn with_config(store: S, config: GeneratorConfig) -> Self {
        Self {
            store,
            scopes: ScopeRegistry::default(),
            config,
        }
    }

    /// Returns the number of ids reserved per store round trip.
    pub fn batch_size(&self) -> u64 {
        self.config.batch_size
    }

    /// Returns the conditional-write attempt bound per refill.
    pub fn max_write_attempts(&self) -> u32 {
        self.config.max_write_attempts
    }

    /// Returns a reference to the backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the next id for `scope_name`.
    ///
    /// Ids for a given scope are strictly increasing and gap-free within
    /// this generator instance, starting at `1` for a fresh scope/store
    /// pair. At most one refill-or-issue operation per scope is in flight at
    /// a time; callers for the same scope queue on the scope's lock, callers
    /// for other scopes proceed independently.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyScopeName`] if `scope_name` is empty.
    /// - [`Error::CorruptSeed`] if the persisted seed is not a positive
    ///   decimal integer. Not retried; the scope's counters are left as they
    ///   were, so a corrected seed allows later calls to succeed.
    /// - [`Error::ContentionExhausted`] if every conditional write of a
    ///   refill conflicted.
    /// - [`Error::Store`] for transport failures from the backing store.
    pub async fn next_id(&self, scope_name: &str) -> Result<u64, S::Error> {
        if scope_name.is_empty() {
            return Err(Error::EmptyScopeName);
        }

        let state = self.scopes.get_or_create(scope_name);
        let mut counters = state.lock().await;

        if counters.last_id == counters.highest_id_available_in_batch {
            self.refill(scope_name, &mut counters).await?;
        }

        counters.last_id += 1;
        Ok(counters.last_id)
    }

    /// Reserves a fresh batch from the store. Called with the scope lock
    /// held and the local batch exhausted.
    ///
    /// The counters are only committed once the conditional write lands, so
    /// a failed refill leaves the scope exactly as it was.
    async fn refill(&self, scope_name: &str, counters: &mut Counters) -> Result<(), S::Error> {
        for attempt in 1..=self.config.max_write_attempts {
            let data = self
                .store
                .read_seed(scope_name)
                .await
                .map_err(Error::Store)?;
            let seed = parse_seed(scope_name, &data)?;

            let last_id = seed - 1;
            let highest = checked_offset(last_id, self.config.batch_size, scope_name, &data)?;
            let next_seed = checked_offset(highest, 1, scope_name, &data)?;

            if self
                .store
                .try_write_seed(scope_name, &next_seed.to_string())
                .await
                .map_err(Error::Store)?
            {
                trace!(
                    scope = scope_name,
                    first = seed,
                    last = highest,
                    "reserved id batch"
                );
                counters.last_id = last_id;
                counters.highest_id_available_in_batch = highest;
                return Ok(());
            }

            debug!(
                scope = scope_name,
                attempt, "conditional seed write conflicted; retrying"
            );
        }

        Err(Error::ContentionExhausted {
            scope: scope_name.to_owned(),
            attempts: self.config.max_write_attempts,
        })
    }
}

/// Parses a persisted seed. Seeds are decimal integers >= 1; ids below 1 do
/// not exist, so a zero seed is just as corrupt as a non-numeric one.
fn parse_seed<E>(scope_name: &str, data: &str) -> Result<u64, E> {
    match data.parse::<u64>() {
        Ok(seed) if seed >= 1 => Ok(seed),
        _ => Err(corrupt(scope_name, data)),
    }
}

/// Adds `offset` to `base`, treating u64 overflow as seed corruption: a seed
/// that close to the ceiling cannot have come from well-formed history.
fn checked_offset<E>(base: u64, offset: u64, scope_name: &str, data: &str) -> Result<u64, E> {
    base.checked_add(offset)
        .ok_or_else(|| corrupt(scope_name, data))
}

fn corrupt<E>(scope_name: &str, data: &str) -> Error<E> {
    Error::CorruptSeed {
        scope: scope_name.to_owned(),
        data: data.to_owned(),
    }
}
