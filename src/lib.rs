//! # kmeans-discretize - API documentation
//!
//! kmeans-discretize is a parallel k-means clustering engine. It discretizes a continuous feature space
//! (commonly frames of a molecular-dynamics trajectory, or other scientific time-series data) into a fixed
//! number of representative points ("centers"), which downstream discrete-state models can work with.
//!
//! ## Design target
//! The API-surface is rather plain: points are given as raw row-major vectors,
//! instead of any high-level arithmetics / matrix crate. Data is never owned or retained by the engine,
//! so the same [`KMeans`] instance can be fed one chunk after the other.
//!
//! ## Operations
//! - [`KMeans::cluster`]: one Lloyd step (assign every point to its nearest center, move centers to the means)
//! - [`KMeans::cluster_loop`]: Lloyd steps until convergence or until the iteration budget is used up
//! - [`KMeans::cost_function`]: sum of squared distances from all points to their nearest center
//! - [`KMeans::init_centers_kmeanplusplus`]: reproducible, distance weighted seeding
//! - [`KMeans::init_centers_random_sample`]: reproducible, uniform seeding
//!
//! Every operation takes the amount of worker threads to use. The points are split into that many
//! contiguous ranges, each worker reduces its range into private accumulators, and the results are merged
//! on the calling thread. No locks are involved.
//!
//! ## Supported metrics
//! - [`Metric::Euclidean`]
//! - [`Metric::MinRmsd`] (RMSD after optimal superposition, for atom-major xyz coordinates)
//!
//! ## Supported primitive types
//! - [`f32`]
//! - [`f64`]
//!
//! ## Example
//! ```rust
//! use kmeans_discretize::*;
//!
//! fn main() {
//!     let (sample_cnt, sample_dims, k, max_iter) = (2000, 20, 4, 100);
//!
//!     // Generate some random data
//!     let mut samples = vec![0.0f64;sample_cnt * sample_dims];
//!     samples.iter_mut().for_each(|v| *v = rand::random());
//!
//!     let kmeans = KMeans::new(KMeansConfig::build()
//!         .k(k)
//!         .metric("euclidean".parse().unwrap())
//!         .input_dimension(sample_dims)
//!         .build()).unwrap();
//!
//!     // Seed with kmeans++, then iterate until the centers stop moving
//!     let initial = kmeans.init_centers_kmeanplusplus(&samples, 42, 4).unwrap();
//!     let result = kmeans.cluster_loop(&samples, &initial, 4, max_iter, 1e-8).unwrap();
//!
//!     println!("Centers: {:?}", result.centers);
//!     println!("Iterations: {} ({:?})", result.iterations, result.status);
//!     println!("Error: {}", kmeans.cost_function(&samples, &result.centers, 4).unwrap());
//! }
//! ```
//!
//! ## Example (using the progress callback)
//! ```rust
//! use kmeans_discretize::*;
//!
//! fn main() {
//!     let samples = vec![0.0f64, 0.0, 0.0, 1.0, 10.0, 0.0, 10.0, 1.0];
//!
//!     let progress = |iteration: usize| -> std::result::Result<(), CallbackError> {
//!         println!("Iteration {} done", iteration);
//!         Ok(())
//!     };
//!     let kmeans = KMeans::new(KMeansConfig::build()
//!         .k(2)
//!         .input_dimension(2)
//!         .progress_callback(&progress)
//!         .build()).unwrap();
//!
//!     let result = kmeans.cluster_loop(&samples, &[0.0, 0.0, 10.0, 0.0], 2, 10, 1e-6).unwrap();
//!     assert!(result.is_converged());
//! }
//! ```

#[macro_use] mod helpers;
mod memory;
mod error;
mod api;
mod kernel;
mod variants;
mod inits;
mod distances;
mod convergence;

pub use api::{ClusterLoopResult, ConvergenceStatus, DistanceFunction, EmptyClusterPolicy, KMeans, KMeansConfig, KMeansConfigBuilder, ProgressCallbackFn};
pub use convergence::ConvergenceCriterion;
pub use distances::{EuclideanDistance, Metric, MinRmsdDistance};
pub use error::{CallbackError, KMeansError, Result};
pub use memory::Primitive;
