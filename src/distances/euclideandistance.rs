use crate::{DistanceFunction, Primitive};

/// Plain euclidean distance `sqrt(sum((a_i - b_i)^2))`.
pub struct EuclideanDistance;

impl<T: Primitive> DistanceFunction<T> for EuclideanDistance {
    #[inline(always)]
    fn distance(&self, a: &[T], b: &[T]) -> T {
        a.iter().zip(b.iter())
            .map(|(sp, cp)| *sp - *cp)          // <sample> - <centroid>
            .map(|v| v * v)                     // <vec_components> ^2
            .sum::<T>()                         // sum(<vec_components>^2)
            .sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_f64() {
        assert_approx_eq!(EuclideanDistance.distance(&[0.0f64, 0.0], &[3.0, 4.0]), 5.0);
        assert_approx_eq!(EuclideanDistance.distance(&[1.0f64, 2.0, 3.0], &[1.0, 2.0, 3.0]), 0.0);
    }

    #[test]
    fn distance_f32() {
        assert_approx_eq!(EuclideanDistance.distance(&[1.0f32, 1.0], &[2.0, 2.0]), 2.0f32.sqrt(), 1e-6);
    }
}
