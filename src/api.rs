use crate::{kernel, memory::*, CallbackError, ConvergenceCriterion, KMeansError, Metric, Result};
use tracing::debug;

pub type ProgressCallbackFn<'a> = &'a dyn Fn(usize) -> std::result::Result<(), CallbackError>;

/// Capability computing the distance between two points of equal dimension.
/// Implementations have to be pure, so they can be called from all worker threads at once.
pub trait DistanceFunction<T: Primitive>: Send + Sync {
    fn distance(&self, a: &[T], b: &[T]) -> T;
}

/// What happens to a center that did not get any point assigned during a Lloyd step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EmptyClusterPolicy {
    /// Keep the center's previous coordinates.
    #[default]
    RetainPrevious,
    /// Move the point that is farthest away from its center (taken from a cluster with more than one point)
    /// into the empty cluster. Falls back to keeping the previous coordinates, if there is no such point.
    ReseedFarthest,
}

/// This is a structure holding the configuration of a [`KMeans`] instance, such as the amount of clusters,
/// the metric, or the callback that reports the progress of a running [`KMeans::cluster_loop`].
///
/// For a more detailed information about all possible options, have a look at [`KMeansConfigBuilder`].
pub struct KMeansConfig<'a> {
    pub(crate) k: usize,
    pub(crate) metric: Metric,
    pub(crate) input_dimension: usize,
    /// Callback that is called after each iteration of [`KMeans::cluster_loop`]
    /// ## Arguments
    /// - **iteration**: Zero-based index of the iteration that just finished
    pub(crate) progress_callback: Option<ProgressCallbackFn<'a>>,
    pub(crate) empty_cluster_policy: EmptyClusterPolicy,
    pub(crate) convergence: ConvergenceCriterion,
}
impl<'a> Default for KMeansConfig<'a> {
    fn default() -> Self {
        Self {
            k: 8,
            metric: Metric::default(),
            input_dimension: 1,
            progress_callback: None,
            empty_cluster_policy: EmptyClusterPolicy::default(),
            convergence: ConvergenceCriterion::default(),
        }
    }
}
impl<'a> KMeansConfig<'a> {
    /// Use the [`KMeansConfigBuilder`] to build a [`KMeansConfig`] instance.
    pub fn build() -> KMeansConfigBuilder<'a> {
        KMeansConfigBuilder { config: KMeansConfig::default() }
    }
}
impl<'a> std::fmt::Debug for KMeansConfig<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KMeansConfig")
            .field("k", &self.k)
            .field("metric", &self.metric)
            .field("input_dimension", &self.input_dimension)
            .field("progress_callback", &self.progress_callback.is_some())
            .field("empty_cluster_policy", &self.empty_cluster_policy)
            .field("convergence", &self.convergence)
            .finish()
    }
}

pub struct KMeansConfigBuilder<'a> {
    config: KMeansConfig<'a>
}
impl<'a> KMeansConfigBuilder<'a> {
    /// Set the amount of clusters (centers).
    /// ## Default
    /// 8
    pub fn k(mut self, k: usize) -> Self {
        self.config.k = k; self
    }
    /// Set the metric used to assign points to centers and to compute costs.
    pub fn metric(mut self, metric: Metric) -> Self {
        self.config.metric = metric; self
    }
    /// Set the dimension every point and center has to have.
    pub fn input_dimension(mut self, input_dimension: usize) -> Self {
        self.config.input_dimension = input_dimension; self
    }
    /// Set the callback that should be called after each iteration of [`KMeans::cluster_loop`].
    /// Returning an error from the callback aborts the loop.
    pub fn progress_callback(mut self, progress_callback: ProgressCallbackFn<'a>) -> Self {
        self.config.progress_callback = Some(progress_callback); self
    }
    /// Set how centers without any assigned point are treated.
    /// ## Default
    /// [`EmptyClusterPolicy::RetainPrevious`]
    pub fn empty_cluster_policy(mut self, policy: EmptyClusterPolicy) -> Self {
        self.config.empty_cluster_policy = policy; self
    }
    /// Set the criterion [`KMeans::cluster_loop`] compares against its tolerance.
    /// ## Default
    /// [`ConvergenceCriterion::CenterShift`]
    pub fn convergence(mut self, convergence: ConvergenceCriterion) -> Self {
        self.config.convergence = convergence; self
    }
    /// Return the internally built configuration structure.
    pub fn build(self) -> KMeansConfig<'a> { self.config }
}


/// Outcome of [`KMeans::cluster_loop`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConvergenceStatus {
    Converged,
    MaxIterationsReached,
}

/// Result of [`KMeans::cluster_loop`].
///
/// ## Fields
/// - **centers**: Final cluster centers [row-major] = [<center0>,<center1>,<center2>,...]
/// - **iterations**: Amount of Lloyd steps that were actually performed
/// - **status**: Whether the loop converged or ran out of iterations
#[derive(Clone, Debug)]
pub struct ClusterLoopResult<T: Primitive> {
    pub centers: Vec<T>,
    pub iterations: usize,
    pub status: ConvergenceStatus,
}
impl<T: Primitive> ClusterLoopResult<T> {
    pub fn is_converged(&self) -> bool {
        self.status == ConvergenceStatus::Converged
    }
}


/// Entrypoint of this crate's API-Surface.
///
/// Create an instance of this struct from a [`KMeansConfig`]. The metric is resolved once, here, and kept
/// for all later calls. The instance itself is never mutated by a calculation (apart from [`KMeans::set_callback`]),
/// and it never keeps a reference to the data it was given.
///
/// All data is passed as raw row-major vectors: a chunk of `n` points is a slice of `n * input_dimension`
/// values, a center set is a slice of exactly `k * input_dimension` values.
///
/// ## Operations
/// - One Lloyd step [`KMeans::cluster`]
/// - Lloyd steps until convergence [`KMeans::cluster_loop`]
/// - Quality of a center set [`KMeans::cost_function`]
///
/// ## Supported initialization methods
/// - K-Mean++ [`KMeans::init_centers_kmeanplusplus`]
/// - Random-Sample [`KMeans::init_centers_random_sample`]
pub struct KMeans<'a, T: Primitive> {
    pub(crate) k: usize,
    pub(crate) sample_dims: usize,
    pub(crate) metric: Metric,
    pub(crate) distance: Box<dyn DistanceFunction<T>>,
    pub(crate) progress_callback: Option<ProgressCallbackFn<'a>>,
    pub(crate) empty_cluster_policy: EmptyClusterPolicy,
    pub(crate) convergence: ConvergenceCriterion,
}
impl<'a, T: Primitive> KMeans<'a, T> {
    /// Create a new instance of the [`KMeans`] structure.
    ///
    /// ## Errors
    /// [`KMeansError::InvalidConfiguration`] if `k < 1`, `input_dimension < 1`, or if the dimension
    /// can not be split into xyz triples for [`Metric::MinRmsd`].
    pub fn new(config: KMeansConfig<'a>) -> Result<Self> {
        if config.k < 1 {
            return Err(KMeansError::InvalidConfiguration("k must be at least 1".to_string()));
        }
        if config.input_dimension < 1 {
            return Err(KMeansError::InvalidConfiguration("input_dimension must be at least 1".to_string()));
        }
        if config.metric == Metric::MinRmsd && config.input_dimension % 3 != 0 {
            return Err(KMeansError::InvalidConfiguration(format!(
                "{} needs xyz triples, but input_dimension is {}",
                config.metric, config.input_dimension
            )));
        }
        debug!(k = config.k, metric = %config.metric, input_dimension = config.input_dimension, "created kmeans instance");

        Ok(Self {
            k: config.k,
            sample_dims: config.input_dimension,
            metric: config.metric,
            distance: config.metric.distance_function(),
            progress_callback: config.progress_callback,
            empty_cluster_policy: config.empty_cluster_policy,
            convergence: config.convergence,
        })
    }

    pub fn k(&self) -> usize { self.k }
    pub fn input_dimension(&self) -> usize { self.sample_dims }
    pub fn metric(&self) -> Metric { self.metric }

    /// Replace (or remove, with `None`) the progress callback used by later [`KMeans::cluster_loop`] calls.
    pub fn set_callback(&mut self, progress_callback: Option<ProgressCallbackFn<'a>>) {
        self.progress_callback = progress_callback;
    }

    /// Returns the amount of points in `chunk`.
    pub(crate) fn check_chunk(&self, chunk: &[T]) -> Result<usize> {
        if chunk.len() % self.sample_dims != 0 {
            return Err(KMeansError::DimensionMismatch(format!(
                "chunk of {} values can not be split into points of dimension {}",
                chunk.len(), self.sample_dims
            )));
        }
        Ok(chunk.len() / self.sample_dims)
    }

    pub(crate) fn check_centers(&self, centers: &[T]) -> Result<()> {
        if centers.len() != self.k * self.sample_dims {
            return Err(KMeansError::DimensionMismatch(format!(
                "expected {} centers of dimension {} ({} values), got {} values",
                self.k, self.sample_dims, self.k * self.sample_dims, centers.len()
            )));
        }
        Ok(())
    }

    /// Performs a single Lloyd step: every point of **chunk** is assigned to its nearest center, and each
    /// center is moved to the mean of its assigned points.
    ///
    /// ## Arguments
    /// - **chunk**: Points [row-major] = [<point0>,<point1>,<point2>,...]
    /// - **centers**: Current centers [row-major], exactly `k` of them
    /// - **n_threads**: Amount of worker threads to split the chunk across
    ///
    /// ## Returns
    /// The updated centers, in the same shape as **centers**. Empty clusters are handled as configured
    /// with [`EmptyClusterPolicy`].
    ///
    /// ## Example
    /// ```rust
    /// use kmeans_discretize::*;
    ///
    /// let chunk = vec![0.0f64, 0.0, 0.0, 1.0, 10.0, 0.0, 10.0, 1.0];
    /// let kmeans = KMeans::new(KMeansConfig::build().k(2).input_dimension(2).build()).unwrap();
    /// let centers = kmeans.cluster(&chunk, &[0.0, 0.0, 10.0, 0.0], 2).unwrap();
    /// assert_eq!(centers, vec![0.0, 0.5, 10.0, 0.5]);
    /// ```
    pub fn cluster(&self, chunk: &[T], centers: &[T], n_threads: usize) -> Result<Vec<T>> {
        self.check_chunk(chunk)?;
        self.check_centers(centers)?;
        let pool = kernel::build_pool(n_threads)?;
        Ok(crate::variants::lloyd::step(self, &pool, chunk, centers).centers)
    }

    /// Repeats Lloyd steps (see [`KMeans::cluster`]) until the configured [`ConvergenceCriterion`] is met
    /// (compared against **tolerance**), or until **max_iter** steps were done.
    ///
    /// After every step, the progress callback (if set) is called with the zero-based iteration index.
    /// If it returns an error, the loop stops and the error is returned as [`KMeansError::CallbackFailure`].
    ///
    /// ## Example
    /// ```rust
    /// use kmeans_discretize::*;
    ///
    /// let chunk = vec![0.0f64, 0.0, 0.0, 1.0, 10.0, 0.0, 10.0, 1.0];
    /// let kmeans = KMeans::new(KMeansConfig::build().k(2).input_dimension(2).build()).unwrap();
    /// let result = kmeans.cluster_loop(&chunk, &[0.0, 0.0, 10.0, 0.0], 2, 10, 1e-6).unwrap();
    /// assert!(result.is_converged());
    /// assert_eq!(result.centers, vec![0.0, 0.5, 10.0, 0.5]);
    /// ```
    pub fn cluster_loop(&self, chunk: &[T], initial_centers: &[T], n_threads: usize, max_iter: usize, tolerance: T) -> Result<ClusterLoopResult<T>> {
        if initial_centers.is_empty() {
            return Err(KMeansError::InvalidConfiguration("initial center set is empty".to_string()));
        }
        self.check_chunk(chunk)?;
        self.check_centers(initial_centers)?;
        let pool = kernel::build_pool(n_threads)?;
        crate::variants::lloyd::calculate(self, &pool, chunk, initial_centers, max_iter, tolerance)
    }

    /// Evaluates the quality of **centers**: the sum, over all points of **chunk**, of the squared distance
    /// (per the configured metric) to the nearest center.
    ///
    /// The distances are squared before summing, so this is the inertia k-means minimizes rather than
    /// a plain sum of distances. A Lloyd step ([`KMeans::cluster`]) never increases this value.
    pub fn cost_function(&self, chunk: &[T], centers: &[T], n_threads: usize) -> Result<T> {
        self.check_chunk(chunk)?;
        self.check_centers(centers)?;
        let pool = kernel::build_pool(n_threads)?;
        Ok(kernel::cost(&pool, self.distance.as_ref(), chunk, centers, self.sample_dims))
    }

    /// K-Means++ initialization method
    ///
    /// ## Description
    /// The first center is drawn uniformly from **chunk**. Every following center is drawn with a probability
    /// proportional to each point's squared distance to its nearest, already chosen center. The distance
    /// update after each pick is spread across **n_threads** workers, the draw itself is done on the calling
    /// thread, so the picked points only depend on **random_seed** and the chunk.
    ///
    /// ## Returns
    /// `k` points of **chunk** (at `k` distinct indices) [row-major].
    pub fn init_centers_kmeanplusplus(&self, chunk: &[T], random_seed: u64, n_threads: usize) -> Result<Vec<T>> {
        let sample_cnt = self.check_chunk(chunk)?;
        self.check_sample_cnt(sample_cnt)?;
        let pool = kernel::build_pool(n_threads)?;
        crate::inits::kmeanplusplus::calculate(self, &pool, chunk, random_seed)
    }

    /// Random sample initialization method (a.k.a. Forgy)
    ///
    /// ## Description
    /// This initialization method randomly selects k distinct points of **chunk** as initial centers.
    pub fn init_centers_random_sample(&self, chunk: &[T], random_seed: u64) -> Result<Vec<T>> {
        let sample_cnt = self.check_chunk(chunk)?;
        self.check_sample_cnt(sample_cnt)?;
        Ok(crate::inits::randomsample::calculate(self, chunk, random_seed))
    }

    fn check_sample_cnt(&self, sample_cnt: usize) -> Result<()> {
        if sample_cnt < self.k {
            return Err(KMeansError::InsufficientData(format!(
                "Number of points ({}) is less than k ({})",
                sample_cnt, self.k
            )));
        }
        Ok(())
    }
}
