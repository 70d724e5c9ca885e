use crate::api::{ClusterLoopResult, ConvergenceStatus, EmptyClusterPolicy};
use crate::{helpers, kernel, memory::*, DistanceFunction, KMeans, KMeansError, Result};
use rayon::ThreadPool;
use std::cmp::Ordering;
use tracing::{debug, info, warn};

/// Outcome of a single Lloyd step.
pub(crate) struct LloydStep<T: Primitive> {
    pub centers: Vec<T>,
    /// Total squared euclidean displacement of all centers
    pub shift: T,
    /// Sum of squared distances of all samples to the centers they were assigned to (before moving them)
    pub cost: T,
}

/// Hands every empty cluster the sample that is farthest away from its center, taken from a cluster that
/// keeps at least one other sample. Clusters stay empty, if no such sample is left.
fn reseed_empty_clusters<T: Primitive>(pool: &ThreadPool, distance: &dyn DistanceFunction<T>, chunk: &[T], centers: &[T], sample_dims: usize, acc: &mut Accumulator<T>) {
    let mut assignments = kernel::assign(pool, distance, chunk, centers, sample_dims);
    let mut distance_sorted_samples: Vec<usize> = (0..assignments.len()).collect();
    distance_sorted_samples.sort_by(
        |&i1, &i2| assignments[i1].1.partial_cmp(&assignments[i2].1).unwrap_or(Ordering::Equal));

    for i in 0..acc.counts.len() {
        if acc.counts[i] != 0 {
            continue;
        }
        let sample_id = distance_sorted_samples.iter().rev().cloned()
            .find(|&s| acc.counts[assignments[s].0] > 1);
        let Some(sample_id) = sample_id else {
            break;
        };
        let (prev_centroid_id, dist) = assignments[sample_id];
        // Centroid is moved into the chosen sample -> its distance becomes 0
        acc.transfer(prev_centroid_id, i, &chunk[sample_id * sample_dims..(sample_id + 1) * sample_dims], dist * dist);
        assignments[sample_id] = (i, T::zero());
    }
}

pub(crate) fn step<T: Primitive>(kmean: &KMeans<'_, T>, pool: &ThreadPool, chunk: &[T], centers: &[T]) -> LloydStep<T> {
    let sample_dims = kmean.sample_dims;
    let distance = kmean.distance.as_ref();
    let mut acc = kernel::accumulate(pool, distance, chunk, centers, sample_dims);

    if acc.empty_clusters() != 0 && kmean.empty_cluster_policy == EmptyClusterPolicy::ReseedFarthest {
        reseed_empty_clusters(pool, distance, chunk, centers, sample_dims, &mut acc);
    }
    let empty_clusters = acc.empty_clusters();
    if empty_clusters != 0 {
        warn!(empty_clusters, "keeping previous coordinates of empty clusters");
    }

    // Calculate new centroids from the merged sums, empty ones keep their coordinates
    let mut new_centers = centers.to_vec();
    new_centers.chunks_exact_mut(sample_dims)
        .zip(acc.sums.chunks_exact(sample_dims))
        .zip(acc.counts.iter().cloned())
        .filter(|(_, cfreq)| *cfreq != 0)
        .for_each(|((c, sums), cfreq)| {
            let cfreq = T::from(cfreq).unwrap_or_else(T::nan);
            c.iter_mut().zip(sums.iter()).for_each(|(c, s)| *c = *s / cfreq);
        });

    LloydStep {
        shift: helpers::squared_displacement(centers, &new_centers),
        cost: acc.cost,
        centers: new_centers,
    }
}

pub(crate) fn calculate<T: Primitive>(kmean: &KMeans<'_, T>, pool: &ThreadPool, chunk: &[T], initial_centers: &[T], max_iter: usize, tolerance: T) -> Result<ClusterLoopResult<T>> {
    let mut centers = initial_centers.to_vec();
    let mut convergence = kmean.convergence.create_logic(tolerance);
    let mut status = ConvergenceStatus::MaxIterationsReached;
    let mut iterations = 0;

    for i in 0..max_iter {
        let LloydStep { centers: new_centers, shift, cost } = step(kmean, pool, chunk, &centers);
        debug!(iteration = i, shift = %shift, cost = %cost, "lloyd step done");
        centers = new_centers;
        iterations = i + 1;

        // Notify subscriber about finished iteration
        if let Some(callback) = kmean.progress_callback {
            callback(i).map_err(KMeansError::CallbackFailure)?;
        }
        if convergence.next(shift, cost) {
            status = ConvergenceStatus::Converged;
            break;
        }
    }

    match status {
        ConvergenceStatus::Converged => info!(iterations, "k-means converged"),
        ConvergenceStatus::MaxIterationsReached => info!(iterations, tolerance = %tolerance, "k-means did not converge within the iteration budget"),
    }
    Ok(ClusterLoopResult { centers, iterations, status })
}
