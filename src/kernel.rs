use crate::{helpers, memory::*, DistanceFunction};
use rayon::{prelude::*, ThreadPool};

/// Index and distance of the center closest to `sample`. Ties go to the lowest center index.
#[inline(always)]
pub(crate) fn nearest_center<T: Primitive>(distance: &dyn DistanceFunction<T>, sample: &[T], centers: &[T], sample_dims: usize) -> (usize, T) {
    let mut best = (0, T::infinity());
    for (ci, c) in centers.chunks_exact(sample_dims).enumerate() {
        let dist = distance.distance(sample, c);
        if dist < best.1 {
            best = (ci, dist);
        }
    }
    best
}

/// Assigns every sample of `chunk` to its nearest center and accumulates per-center coordinate sums,
/// counts and the squared assignment cost.
///
/// The samples are split into `pool.current_num_threads()` contiguous ranges, each range is reduced
/// into its own [`Accumulator`] by one worker, and the partial accumulators are merged in range order
/// after all workers finished.
pub(crate) fn accumulate<T: Primitive>(pool: &ThreadPool, distance: &dyn DistanceFunction<T>, chunk: &[T], centers: &[T], sample_dims: usize) -> Accumulator<T> {
    let k = centers.len() / sample_dims;
    let sample_cnt = chunk.len() / sample_dims;
    let merged = Accumulator::new(k, sample_dims);
    if sample_cnt == 0 {
        return merged;
    }
    let range_len = helpers::partition_len(sample_cnt, pool.current_num_threads());

    let partials: Vec<Accumulator<T>> = pool.install(|| {
        chunk.par_chunks(range_len * sample_dims)
            .map(|range| {
                let mut acc = Accumulator::new(k, sample_dims);
                range.chunks_exact(sample_dims).for_each(|s| {
                    let (ci, dist) = nearest_center(distance, s, centers, sample_dims);
                    acc.add(ci, s, dist * dist);
                });
                acc
            })
            .collect()
    });
    partials.iter().fold(merged, |merged, partial| merged.merge(partial))
}

/// Per-sample `(nearest center index, distance)` pairs, computed in parallel.
pub(crate) fn assign<T: Primitive>(pool: &ThreadPool, distance: &dyn DistanceFunction<T>, chunk: &[T], centers: &[T], sample_dims: usize) -> Vec<(usize, T)> {
    let sample_cnt = chunk.len() / sample_dims;
    let range_len = helpers::partition_len(sample_cnt, pool.current_num_threads());
    pool.install(|| {
        chunk.par_chunks_exact(sample_dims)
            .with_min_len(range_len)
            .map(|s| nearest_center(distance, s, centers, sample_dims))
            .collect()
    })
}

/// Sum of squared distances from every sample to its nearest center.
pub(crate) fn cost<T: Primitive>(pool: &ThreadPool, distance: &dyn DistanceFunction<T>, chunk: &[T], centers: &[T], sample_dims: usize) -> T {
    let sample_cnt = chunk.len() / sample_dims;
    if sample_cnt == 0 {
        return T::zero();
    }
    let range_len = helpers::partition_len(sample_cnt, pool.current_num_threads());

    let partials: Vec<T> = pool.install(|| {
        chunk.par_chunks(range_len * sample_dims)
            .map(|range| {
                range.chunks_exact(sample_dims)
                    .map(|s| nearest_center(distance, s, centers, sample_dims).1)
                    .map(|d| d * d)
                    .sum::<T>()
            })
            .collect()
    });
    partials.into_iter().sum()
}

/// Lowers each entry of `min_sq_dists` to the squared distance between its sample and `center`,
/// if that is closer than what was recorded before.
pub(crate) fn update_min_distances<T: Primitive>(pool: &ThreadPool, distance: &dyn DistanceFunction<T>, chunk: &[T], center: &[T], sample_dims: usize, min_sq_dists: &mut [T]) {
    if min_sq_dists.is_empty() {
        return;
    }
    let range_len = helpers::partition_len(min_sq_dists.len(), pool.current_num_threads());
    pool.install(|| {
        min_sq_dists.par_chunks_mut(range_len)
            .zip(chunk.par_chunks(range_len * sample_dims))
            .for_each(|(dists, range)| {
                dists.iter_mut()
                    .zip(range.chunks_exact(sample_dims))
                    .for_each(|(min_dist, s)| {
                        let dist = distance.distance(s, center);
                        let dist = dist * dist;
                        if dist < *min_dist {
                            *min_dist = dist;
                        }
                    });
            });
    });
}

pub(crate) fn build_pool(n_threads: usize) -> crate::Result<ThreadPool> {
    if n_threads < 1 {
        return Err(crate::KMeansError::InvalidThreadCount(n_threads));
    }
    Ok(rayon::ThreadPoolBuilder::new().num_threads(n_threads).build()?)
}
