/// A result type for id generation, parameterized over the store's transport
/// error.
pub type Result<T, E> = core::result::Result<T, Error<E>>;

/// A construction-time configuration failure.
///
/// Raised synchronously by the [`GeneratorConfig`] setters before the invalid
/// value is ever applied, so the configuration that produced the error is
/// left untouched.
///
/// [`GeneratorConfig`]: crate::GeneratorConfig
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// `batch_size` must reserve at least one id per store round trip.
    #[error("batch size must be a positive number (got {0})")]
    BatchSize(u64),

    /// `max_write_attempts` must allow at least one conditional write.
    #[error("max write attempts must be a positive number (got {0})")]
    MaxWriteAttempts(u32),
}

/// All error variants that id generation can emit.
///
/// The generic parameter `E` is the transport error of the backing
/// [`OptimisticDataStore`]. Callers can distinguish every failure class
/// programmatically rather than by message text.
///
/// [`OptimisticDataStore`]: crate::OptimisticDataStore
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error<E> {
    /// An invalid value was supplied for a generator configuration knob.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// `next_id` was called with an empty scope name.
    #[error("scope name must not be empty")]
    EmptyScopeName,

    /// The persisted seed could not be interpreted as an id.
    ///
    /// Seeds are decimal integer strings no smaller than `1`. Anything else
    /// is corrupt data, and retrying will not help, so the refill fails
    /// immediately without mutating the scope's counters.
    #[error(
        "the id seed returned from storage for scope '{scope}' was corrupt \
         and could not be parsed as a positive integer (got {data:?})"
    )]
    CorruptSeed {
        /// The scope whose seed was unreadable.
        scope: String,
        /// The raw payload returned by the store.
        data: String,
    },

    /// Every conditional write of a refill reported a conflict.
    ///
    /// This signals excessive contention against the store for this scope.
    /// Raising the batch size reduces the write rate proportionally.
    #[error(
        "failed to update the data store for scope '{scope}' after {attempts} \
         attempts; this likely represents too much contention against the \
         store - increase the batch size to better match your generation load"
    )]
    ContentionExhausted {
        /// The scope that could not be refilled.
        scope: String,
        /// How many read/conditional-write cycles were attempted.
        attempts: u32,
    },

    /// The store failed outside the optimistic-concurrency contract
    /// (network, permissions, I/O). Never retried by the generator.
    #[error("data store error: {0}")]
    Store(#[source] E),
}

impl<E> Error<E> {
    /// Returns `true` if this error came from the backing store's transport
    /// rather than from the generator itself.
    pub fn is_store(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}
