use crate::{kernel, memory::*, KMeans, KMeansError, Result};
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rayon::ThreadPool;
use tracing::{debug, trace};

pub(crate) fn calculate<T: Primitive>(kmean: &KMeans<'_, T>, pool: &ThreadPool, chunk: &[T], random_seed: u64) -> Result<Vec<T>> {
    let sample_dims = kmean.sample_dims;
    let sample_cnt = chunk.len() / sample_dims;
    let sample = |idx: usize| &chunk[idx * sample_dims..(idx + 1) * sample_dims];

    // Generator is local to this call, concurrent runs never share random state
    let mut rnd = StdRng::seed_from_u64(random_seed);
    let mut chosen: Vec<usize> = Vec::with_capacity(kmean.k);
    // Squared distance of each sample to its nearest chosen center
    let mut min_sq_dists = vec![T::infinity(); sample_cnt];

    { // Randomly select first centroid
        let first_idx = rnd.gen_range(0..sample_cnt);
        trace!(center = 0, sample = first_idx, "picked first center");
        chosen.push(first_idx);
    }
    while chosen.len() < kmean.k { // For each following centroid...
        let newest = chosen[chosen.len() - 1];
        kernel::update_min_distances(pool, kmean.distance.as_ref(), chunk, sample(newest), sample_dims, &mut min_sq_dists);
        // Chosen samples must never be drawn again, even if the metric does not give exactly 0 for them
        min_sq_dists[newest] = T::zero();

        let distsum: T = min_sq_dists.iter().cloned().sum();
        if !distsum.is_finite() {
            return Err(KMeansError::InvalidData(format!(
                "squared distances to the chosen centers sum up to {}, coordinates are NaN or too far apart", distsum
            )));
        }
        let sampled_centroid_id = if distsum > T::zero() {
            // Use rand's WeightedIndex to randomly draw a centroid, while respecting their probabilities
            WeightedIndex::<T>::new(min_sq_dists.iter())?.sample(&mut rnd)
        } else {
            // Every remaining sample sits on a chosen center, draw one of them uniformly
            let remaining: Vec<usize> = (0..sample_cnt).filter(|idx| !chosen.contains(idx)).collect();
            debug!(remaining = remaining.len(), "all remaining samples coincide with chosen centers");
            remaining[rnd.gen_range(0..remaining.len())]
        };
        trace!(center = chosen.len(), sample = sampled_centroid_id, "picked center");
        chosen.push(sampled_centroid_id);
    }

    Ok(chosen.into_iter().flat_map(|idx| sample(idx).iter().cloned()).collect())
}

#[cfg(test)]
mod tests {
    use crate::helpers::testing::*;
    use crate::{KMeans, KMeansConfig, KMeansError, Metric};
    use std::collections::HashSet;

    /// Maps each returned center back to the index of the sample it was taken from.
    fn center_indices(samples: &[f64], centers: &[f64], sample_dims: usize) -> Vec<usize> {
        centers.chunks_exact(sample_dims)
            .map(|c| samples.chunks_exact(sample_dims).position(|s| s == c).expect("center is not a sample"))
            .collect()
    }

    #[test]
    fn reproducible_for_same_seed() {
        let (sample_cnt, sample_dims, k) = (2000, 4, 16);
        let samples = random_samples(sample_cnt, sample_dims, 7);
        let kmean = euclidean_kmeans(k, sample_dims);

        let first = kmean.init_centers_kmeanplusplus(&samples, 1337, 4).unwrap();
        let second = kmean.init_centers_kmeanplusplus(&samples, 1337, 4).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), k * sample_dims);

        let other_seed = kmean.init_centers_kmeanplusplus(&samples, 1338, 4).unwrap();
        assert_ne!(first, other_seed);
    }

    #[test]
    fn thread_count_does_not_change_picks() {
        let (sample_cnt, sample_dims, k) = (999, 3, 10);
        let samples = random_samples(sample_cnt, sample_dims, 42);
        let kmean = euclidean_kmeans(k, sample_dims);

        let should = kmean.init_centers_kmeanplusplus(&samples, 5, 1).unwrap();
        for n_threads in [2, 3, 8] {
            assert_eq!(kmean.init_centers_kmeanplusplus(&samples, 5, n_threads).unwrap(), should);
        }
    }

    #[test]
    fn distinct_indices() {
        let (sample_cnt, sample_dims) = (50, 2);
        let samples = random_samples(sample_cnt, sample_dims, 3);
        for k in [1, 2, 25, 50] {
            let kmean = euclidean_kmeans(k, sample_dims);
            let centers = kmean.init_centers_kmeanplusplus(&samples, 11, 3).unwrap();
            let indices: HashSet<usize> = center_indices(&samples, &centers, sample_dims).into_iter().collect();
            assert_eq!(indices.len(), k);
        }
    }

    #[test]
    fn duplicate_samples_still_give_distinct_indices() {
        // Only two distinct positions, but four centers requested
        let samples = vec![1.0, 1.0, 1.0, 5.0, 5.0, 5.0];
        let kmean = euclidean_kmeans(4, 1);
        let centers = kmean.init_centers_kmeanplusplus(&samples, 9, 2).unwrap();
        assert_eq!(centers.len(), 4);
        assert!(centers.contains(&1.0));
        assert!(centers.contains(&5.0));
    }

    #[test]
    fn prefers_far_away_samples() {
        // Two dense blobs far apart, k = 2 has to pick one sample of each blob
        let mut samples = vec![0.0f64; 20];
        samples.extend(vec![1000.0f64; 20]);
        samples.iter_mut().enumerate().for_each(|(i, v)| *v += (i % 20) as f64 * 1e-3);
        let kmean = euclidean_kmeans(2, 1);
        for seed in 0..20 {
            let centers = kmean.init_centers_kmeanplusplus(&samples, seed, 2).unwrap();
            assert!((centers[0] < 500.0) != (centers[1] < 500.0), "seed {} picked {:?}", seed, centers);
        }
    }

    #[test]
    fn k_equals_sample_cnt() {
        let kmean = euclidean_kmeans(4, 2);
        let centers = kmean.init_centers_kmeanplusplus(&TWO_PAIRS, 0, 2).unwrap();
        let mut indices = center_indices(&TWO_PAIRS, &centers, 2);
        indices.sort_unstable();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn min_rmsd_metric() {
        let samples = random_samples(40, 6, 21);
        let kmean: KMeans<f64> = KMeans::new(KMeansConfig::build().k(5).metric(Metric::MinRmsd).input_dimension(6).build()).unwrap();
        let centers = kmean.init_centers_kmeanplusplus(&samples, 2, 3).unwrap();
        let indices: HashSet<usize> = center_indices(&samples, &centers, 6).into_iter().collect();
        assert_eq!(indices.len(), 5);
    }

    #[test]
    fn overflowing_distances_are_rejected() {
        let kmean: KMeans<f32> = KMeans::new(KMeansConfig::build().k(2).input_dimension(1).build()).unwrap();
        for seed in 0..8 {
            let res = kmean.init_centers_kmeanplusplus(&[0.0f32, 3e19, 1.0], seed, 2);
            assert!(matches!(res, Err(KMeansError::InvalidData(_))), "seed {}", seed);
        }
        let kmean = euclidean_kmeans(2, 1);
        for seed in 0..8 {
            let res = kmean.init_centers_kmeanplusplus(&[0.0, 1e200, -1e200], seed, 2);
            assert!(matches!(res, Err(KMeansError::InvalidData(_))), "seed {}", seed);
        }
    }

    #[test]
    fn nan_coordinates_are_rejected() {
        let kmean = euclidean_kmeans(2, 1);
        for seed in 0..8 {
            let res = kmean.init_centers_kmeanplusplus(&[f64::NAN, 1.0, 2.0], seed, 2);
            assert!(matches!(res, Err(KMeansError::InvalidData(_))), "seed {}", seed);
        }
    }

    #[test]
    fn not_enough_samples() {
        let kmean = euclidean_kmeans(3, 2);
        assert!(matches!(kmean.init_centers_kmeanplusplus(&TWO_PAIRS[..4], 0, 1), Err(KMeansError::InsufficientData(_))));
        assert!(matches!(kmean.init_centers_kmeanplusplus(&[], 0, 1), Err(KMeansError::InsufficientData(_))));
    }
}
