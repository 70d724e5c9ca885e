use crate::{memory::*, KMeans};
use rand::prelude::*;

pub(crate) fn calculate<T: Primitive>(kmean: &KMeans<'_, T>, chunk: &[T], random_seed: u64) -> Vec<T> {
    let mut rnd = StdRng::seed_from_u64(random_seed);
    let sample_cnt = chunk.len() / kmean.sample_dims;
    rand::seq::index::sample(&mut rnd, sample_cnt, kmean.k)
        .into_iter()
        .flat_map(|idx| chunk[idx * kmean.sample_dims..(idx + 1) * kmean.sample_dims].iter().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::helpers::testing::*;
    use std::collections::HashSet;

    #[test]
    fn picks_distinct_samples() {
        let samples = random_samples(100, 3, 1);
        let kmean = euclidean_kmeans(10, 3);
        let centers = kmean.init_centers_random_sample(&samples, 4).unwrap();
        assert_eq!(centers.len(), 30);
        let picked: HashSet<usize> = centers.chunks_exact(3)
            .map(|c| samples.chunks_exact(3).position(|s| s == c).unwrap())
            .collect();
        assert_eq!(picked.len(), 10);
        assert_eq!(centers, kmean.init_centers_random_sample(&samples, 4).unwrap());
    }
}
