use thiserror::Error;

/// Error returned by a failing progress callback.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

/// Error types of the clustering engine
#[derive(Error, Debug)]
pub enum KMeansError {
    /// A point or center does not have the configured dimension
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// The requested amount of worker threads is smaller than 1
    #[error("Invalid thread count: {0} (must be at least 1)")]
    InvalidThreadCount(usize),

    /// k, the dimension or the metric/dimension combination is unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Not enough data points for the requested number of centers
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// The data can not be used, e.g. distances overflow or coordinates are NaN
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// The registered progress callback reported a failure
    #[error("Progress callback failed: {0}")]
    CallbackFailure(#[source] CallbackError),

    /// The metric identifier is not known
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    /// The worker pool could not be created
    #[error(transparent)]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Weighted seeding failed (e.g. non-finite distances in the data)
    #[error("Weighted sampling failed: {0}")]
    Sampling(#[from] rand::distributions::WeightedError),
}

/// Convenient alias for results produced by this crate.
pub type Result<T> = std::result::Result<T, KMeansError>;
