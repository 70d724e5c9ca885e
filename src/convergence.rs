use crate::memory::*;

/// Enum with the supported convergence criteria.
/// These criteria decide when a running [`crate::KMeans::cluster_loop`] stops before its iteration budget is used up.
/// Both compare against the `tolerance` passed to the loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ConvergenceCriterion {
	/// Converged once the sum over all centers of the squared euclidean displacement between two successive
	/// iterations is `<= tolerance`. Independent of the configured metric.
	#[default]
	CenterShift,
	/// Converged once the relative change of the assignment cost between two successive iterations,
	/// `|prev_cost - cost| / cost`, is `<= tolerance`. A cost of zero counts as converged.
	RelativeCostChange,
}
impl ConvergenceCriterion {
	pub(crate) fn create_logic<T: Primitive>(&self, tolerance: T) -> Box<dyn ConvergenceLogic<T>> {
		match *self {
			ConvergenceCriterion::CenterShift => Box::new(CenterShiftLogic { tolerance }),
			ConvergenceCriterion::RelativeCostChange => Box::new(RelativeCostChangeLogic {
				tolerance,
				prev_cost: T::infinity()
			})
		}
	}
}

pub(crate) trait ConvergenceLogic<T: Primitive> {
	/// Function that has to be called once a Lloyd step finished.
	/// ## Arguments
	/// - **shift**: Total squared displacement of all centers during the step
	/// - **cost**: Assignment cost (sum of squared distances) measured during the step
	/// ## Returns
	/// - **true** if the calculation converged
	/// - **false** if it should continue
	fn next(&mut self, shift: T, cost: T) -> bool;
}


pub(crate) struct CenterShiftLogic<T: Primitive> {
	tolerance: T
}
impl<T: Primitive> ConvergenceLogic<T> for CenterShiftLogic<T> {
	fn next(&mut self, shift: T, _cost: T) -> bool {
		shift <= self.tolerance
	}
}


pub(crate) struct RelativeCostChangeLogic<T: Primitive> {
	tolerance: T,
	prev_cost: T
}
impl<T: Primitive> ConvergenceLogic<T> for RelativeCostChangeLogic<T> {
	fn next(&mut self, _shift: T, cost: T) -> bool {
		let rel_change = if cost == T::zero() {
			T::zero()
		} else {
			(self.prev_cost - cost).abs() / cost
		};
		self.prev_cost = cost;
		rel_change <= self.tolerance
	}
}


#[cfg(test)]
mod tests {
	use super::*;

	#[test] fn test_center_shift_f32() { test_center_shift::<f32>(); }
	#[test] fn test_center_shift_f64() { test_center_shift::<f64>(); }

	fn test_center_shift<T: Primitive>() {
		let mut logic = ConvergenceCriterion::CenterShift.create_logic(T::from(1e-3).unwrap());
		assert_eq!(logic.next(T::from(0.5).unwrap(), T::from(10.0).unwrap()), false);
		assert_eq!(logic.next(T::from(1e-3).unwrap(), T::from(10.0).unwrap()), true);
		assert_eq!(logic.next(T::zero(), T::from(3000.0).unwrap()), true);
	}

	#[test] fn test_relative_cost_change_f32() { test_relative_cost_change::<f32>(); }
	#[test] fn test_relative_cost_change_f64() { test_relative_cost_change::<f64>(); }

	fn test_relative_cost_change<T: Primitive>() {
		{
			let mut logic = ConvergenceCriterion::RelativeCostChange.create_logic(T::from(0.01).unwrap());
			// first step never converges, there is nothing to compare against
			assert_eq!(logic.next(T::zero(), T::from(3000.0).unwrap()), false);
			assert_eq!(logic.next(T::zero(), T::from(2000.0).unwrap()), false);
			assert_eq!(logic.next(T::zero(), T::from(1990.0).unwrap()), true);
		}
		{
			let mut logic = ConvergenceCriterion::RelativeCostChange.create_logic(T::from(0.01).unwrap());
			assert_eq!(logic.next(T::zero(), T::from(3000.0).unwrap()), false);
			// cost going up is measured by its magnitude
			assert_eq!(logic.next(T::zero(), T::from(3100.0).unwrap()), false);
		}
		{
			let mut logic = ConvergenceCriterion::RelativeCostChange.create_logic(T::from(0.01).unwrap());
			assert_eq!(logic.next(T::from(100.0).unwrap(), T::zero()), true);
		}
	}
}
