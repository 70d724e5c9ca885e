mod euclideandistance;
mod minrmsddistance;

pub use euclideandistance::EuclideanDistance;
pub use minrmsddistance::MinRmsdDistance;

use crate::{DistanceFunction, KMeansError, Primitive};
use std::{fmt, str::FromStr};

/// Closed set of supported metrics.
///
/// A metric is picked by its identifier once, when the [`crate::KMeans`] instance is
/// constructed, and then held as a stored [`DistanceFunction`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Metric {
    /// Euclidean distance (`"euclidean"`)
    #[default]
    Euclidean,
    /// RMSD after optimal superposition of atom-major xyz coordinates (`"minRMSD"`)
    MinRmsd,
}
impl Metric {
    pub fn name(&self) -> &'static str {
        match self {
            Metric::Euclidean => "euclidean",
            Metric::MinRmsd => "minRMSD",
        }
    }

    pub(crate) fn distance_function<T: Primitive>(&self) -> Box<dyn DistanceFunction<T>> {
        match self {
            Metric::Euclidean => Box::new(EuclideanDistance),
            Metric::MinRmsd => Box::new(MinRmsdDistance),
        }
    }
}
impl FromStr for Metric {
    type Err = KMeansError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "euclidean" => Ok(Metric::Euclidean),
            "minrmsd" => Ok(Metric::MinRmsd),
            _ => Err(KMeansError::UnknownMetric(s.to_string())),
        }
    }
}
impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_metric_names() {
        assert_eq!("euclidean".parse::<Metric>().unwrap(), Metric::Euclidean);
        assert_eq!("Euclidean".parse::<Metric>().unwrap(), Metric::Euclidean);
        assert_eq!("minRMSD".parse::<Metric>().unwrap(), Metric::MinRmsd);
        assert!(matches!("manhattan".parse::<Metric>(), Err(KMeansError::UnknownMetric(name)) if name == "manhattan"));
    }

    #[test]
    fn name_roundtrips_through_display() {
        for metric in [Metric::Euclidean, Metric::MinRmsd] {
            assert_eq!(metric.to_string().parse::<Metric>().unwrap(), metric);
        }
    }
}
