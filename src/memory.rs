use num::{Float, NumCast, Zero};
use rand::distributions::uniform::SampleUniform;
use std::{
    fmt::{Debug, Display, LowerExp},
    iter::Sum,
    ops::{Add, AddAssign, Sub, SubAssign},
};

pub trait Primitive: Add + AddAssign + Sum + Sub + SubAssign + Zero + Float + NumCast + SampleUniform
                + PartialOrd + Copy + Default + Display + Debug + Sync + Send + LowerExp + 'static
                + for<'a> AddAssign<&'a Self> + for<'a> Sub<&'a Self> {}
impl Primitive for f32 {}
impl Primitive for f64 {}

/// Per-center running sums, point counts and the summed (squared) assignment cost
/// of one contiguous range of points. Each worker owns one of these exclusively;
/// they are merged on the calling thread once all workers are done.
#[derive(Clone, Debug)]
pub(crate) struct Accumulator<T: Primitive> {
    pub sums: Vec<T>,
    pub counts: Vec<usize>,
    pub cost: T,
    dims: usize,
}
impl<T: Primitive> Accumulator<T> {
    pub fn new(k: usize, dims: usize) -> Self {
        Self { sums: vec![T::zero(); k * dims], counts: vec![0; k], cost: T::zero(), dims }
    }

    #[inline(always)]
    pub fn add(&mut self, center_idx: usize, point: &[T], sq_dist: T) {
        self.sums[center_idx * self.dims..(center_idx + 1) * self.dims]
            .iter_mut()
            .zip(point.iter())
            .for_each(|(s, p)| *s += p);
        self.counts[center_idx] += 1;
        self.cost += sq_dist;
    }

    /// Moves a single point from one center's slot into another, emptied, one.
    pub fn transfer(&mut self, from: usize, to: usize, point: &[T], sq_dist: T) {
        self.sums[from * self.dims..(from + 1) * self.dims]
            .iter_mut()
            .zip(point.iter())
            .for_each(|(s, p)| *s -= *p);
        self.sums[to * self.dims..(to + 1) * self.dims].copy_from_slice(point);
        self.counts[from] -= 1;
        self.counts[to] = 1;
        self.cost -= sq_dist;
    }

    pub fn merge(mut self, other: &Accumulator<T>) -> Self {
        self.sums.iter_mut().zip(other.sums.iter()).for_each(|(s, o)| *s += o);
        self.counts.iter_mut().zip(other.counts.iter()).for_each(|(c, o)| *c += o);
        self.cost += other.cost;
        self
    }

    pub fn empty_clusters(&self) -> usize {
        self.counts.iter().filter(|&&c| c == 0).count()
    }
}
