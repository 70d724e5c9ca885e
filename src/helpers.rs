pub(crate) fn multiple_roundup(val: usize, multiple_of: usize) -> usize {
    if val % multiple_of != 0 {
        val + multiple_of - (val % multiple_of)
    } else {
        val
    }
}

/// Amount of points per worker range, when `sample_cnt` points are split into
/// `n_threads` near-equal contiguous ranges. Never 0, so it can be fed to `par_chunks`.
pub(crate) fn partition_len(sample_cnt: usize, n_threads: usize) -> usize {
    (multiple_roundup(sample_cnt, n_threads) / n_threads).max(1)
}

/// Squared euclidean displacement between two center sets of equal shape.
pub(crate) fn squared_displacement<T: crate::Primitive>(old: &[T], new: &[T]) -> T {
    old.iter().zip(new.iter())
        .map(|(o, n)| *o - *n)
        .map(|v| v * v)
        .sum()
}

#[cfg(test)]
macro_rules! assert_approx_eq {
	($left: expr, $right: expr, $tol: expr) => ({
		match ($left, $right, $tol) {
			(left_val , right_val, tol_val) => {
				let delta = (left_val - right_val).abs();
				if !(delta < tol_val) {
					panic!(
						"assertion failed: `(left ≈ right)` \
						(left: `{}`, right: `{}`) \
						with ∆={:1.1e} (allowed ∆={:e})",
						left_val , right_val, delta, tol_val
					)
				}
			}
		}
	});
	($left: expr, $right: expr) => (assert_approx_eq!(($left), ($right), 1e-15))
}

#[cfg(test)]
pub(crate) mod testing {
	use crate::{KMeans, KMeansConfig, Metric};
	use rand::prelude::*;

	/// The two well separated pairs used throughout the tests.
	pub const TWO_PAIRS: [f64; 8] = [0.0, 0.0, 0.0, 1.0, 10.0, 0.0, 10.0, 1.0];

	pub fn euclidean_kmeans<'a>(k: usize, dims: usize) -> KMeans<'a, f64> {
		KMeans::new(KMeansConfig::build().k(k).metric(Metric::Euclidean).input_dimension(dims).build()).unwrap()
	}

	pub fn random_samples(sample_cnt: usize, sample_dims: usize, seed: u64) -> Vec<f64> {
		let mut rnd = StdRng::seed_from_u64(seed);
		(0..sample_cnt * sample_dims).map(|_| rnd.gen_range(0.0..1.0)).collect()
	}

	pub fn assert_slices_approx_eq(should: &[f64], actual: &[f64], tol: f64) {
		assert_eq!(should.len(), actual.len());
		should.iter().zip(actual.iter()).for_each(|(s, a)| assert_approx_eq!(*s, *a, tol));
	}
}
