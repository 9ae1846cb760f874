use num::Float;

use crate::error::{InferenceError, Result};
use crate::math::interp;

/// And operator method for combining the compositions of propositions
/// in a fuzzy rule premise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AndOp {
    #[default]
    Min,
    Prod,
    BoundedProd,
    DrasticProd,
}

impl AndOp {
    pub fn call<F: Float>(self, u: F, v: F) -> F {
        match self {
            Self::Min => F::min(u, v),
            Self::Prod => u * v,
            Self::BoundedProd => F::max(F::zero(), u + v - F::one()),
            Self::DrasticProd => {
                if v == F::one() {
                    u
                } else if u == F::one() {
                    v
                } else {
                    F::zero()
                }
            },
        }
    }
}

/// Or operator method for combining the compositions of propositions
/// in a fuzzy rule premise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OrOp {
    #[default]
    Max,
    ProbOr,
    BoundedSum,
    DrasticSum,
}

impl OrOp {
    pub fn call<F: Float>(self, u: F, v: F) -> F {
        match self {
            Self::Max => F::max(u, v),
            Self::ProbOr => u + v - u * v,
            Self::BoundedSum => F::min(F::one(), u + v),
            Self::DrasticSum => {
                if v == F::zero() {
                    u
                } else if u == F::zero() {
                    v
                } else {
                    F::one()
                }
            },
        }
    }
}

/// Implication operator: how a rule's firing strength shapes its consequent term.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ImplicationOp {
    /// Mamdani: clip the term at the firing strength
    #[default]
    Min,
    /// Larsen: scale the term by the firing strength
    Prod,
}

impl ImplicationOp {
    pub fn call<F: Float>(self, strength: F, membership: F) -> F {
        match self {
            Self::Min => F::min(strength, membership),
            Self::Prod => strength * membership,
        }
    }
}

/// Method for aggregating the consequences of the fuzzy rules
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProductionLink {
    #[default]
    Max,
    ProbOr,
    BoundedSum,
}

impl ProductionLink {
    pub fn call<F: Float>(
        self,
        u: impl IntoIterator<Item = F>,
        v: impl IntoIterator<Item = F>,
    ) -> impl Iterator<Item = F> {
        u.into_iter().zip(v).map(move |(u, v)| match self {
            Self::Max => OrOp::Max.call(u, v),
            Self::ProbOr => OrOp::ProbOr.call(u, v),
            Self::BoundedSum => OrOp::BoundedSum.call(u, v),
        })
    }
}

/// Method for defuzzifcating the resulting membership function.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DefuzzificationOp {
    /// Center of gravity over the sampled universe: `Σ y·μ(y) / Σ μ(y)`
    #[default]
    Centroid,
    /// Point splitting the area under the set in two halves
    Bisector,
    /// Mean of the values for which the membership function is maximum
    MeanOfMaximum,
    /// Largest value for which the membership function is maximum
    LargestOfMaximum,
    /// Smallest value for which the membership function is maximum
    SmallestOfMaximum,
}

impl DefuzzificationOp {
    /// Fails with [`InferenceError::NoRuleFired`] when `membership` is zero everywhere.
    pub fn call(self, universe: &[f64], membership: &[f64]) -> Result<f64> {
        debug_assert_eq!(universe.len(), membership.len());

        if membership.iter().all(|&m| m <= 0.) {
            return Err(InferenceError::NoRuleFired);
        }

        let value = match self {
            Self::Centroid => {
                let (num, den) = universe
                    .iter()
                    .zip(membership)
                    .fold((0., 0.), |(num, den), (&y, &m)| (num + y * m, den + m));

                num / den
            },
            Self::Bisector => {
                if universe.len() == 1 {
                    return Ok(universe[0]);
                }

                // Cumulative trapezoidal area at every sample
                let mut cumulative = Vec::with_capacity(universe.len());
                let mut area = 0.;

                cumulative.push((universe[0], area));

                for i in 1..universe.len() {
                    area += (membership[i - 1] + membership[i]) * (universe[i] - universe[i - 1]) / 2.;
                    cumulative.push((universe[i], area));
                }

                let target = area / 2.;
                let i = cumulative
                    .iter()
                    .position(|&(_, cum)| cum >= target)
                    .unwrap_or(cumulative.len() - 1)
                    .max(1);
                let (x1, c1) = cumulative[i - 1];
                let (x2, c2) = cumulative[i];

                interp(target, &[(c1, x1), (c2, x2)])
            },
            Self::MeanOfMaximum | Self::LargestOfMaximum | Self::SmallestOfMaximum => {
                let maximum = membership.iter().copied().fold(f64::MIN, f64::max);
                let mut at_max = universe
                    .iter()
                    .zip(membership)
                    .filter_map(|(&u, &m)| if m == maximum { Some(u) } else { None });

                match self {
                    Self::MeanOfMaximum => {
                        let (len, sum) = at_max.fold((0usize, 0.), |(len, sum), u| (len + 1, sum + u));

                        sum / len as f64
                    },
                    Self::LargestOfMaximum => at_max.fold(f64::MIN, f64::max),
                    _ => at_max.next().unwrap_or(universe[0]),
                }
            },
        };

        Ok(value)
    }
}

#[test]
fn test_and_or() {
    assert_eq!(AndOp::Min.call(0.3, 0.7), 0.3);
    assert_eq!(AndOp::Prod.call(0.5, 0.5), 0.25);
    assert_eq!(AndOp::BoundedProd.call(0.25, 0.5), 0.);
    assert_eq!(AndOp::DrasticProd.call(0.4, 1.), 0.4);
    assert_eq!(AndOp::DrasticProd.call(0.4, 0.9), 0.);
    assert_eq!(OrOp::Max.call(0.3, 0.7), 0.7);
    assert_eq!(OrOp::ProbOr.call(0.5, 0.5), 0.75);
    assert_eq!(OrOp::BoundedSum.call(0.75, 0.5), 1.);
    assert_eq!(OrOp::DrasticSum.call(0., 0.3), 0.3);
    assert_eq!(OrOp::DrasticSum.call(0.2, 0.3), 1.);
}

#[test]
fn test_implication_and_link() {
    assert_eq!(ImplicationOp::Min.call(0.4, 0.9), 0.4);
    assert_eq!(ImplicationOp::Min.call(0.4, 0.1), 0.1);
    assert_eq!(ImplicationOp::Prod.call(0.5, 0.5), 0.25);

    let agg: Vec<f64> = ProductionLink::Max.call([0., 0.5, 0.2], [0.1, 0.25, 0.3]).collect();

    assert_eq!(agg, vec![0.1, 0.5, 0.3]);
}

#[test]
fn test_defuzzification() {
    let universe = [0., 1., 2., 3., 4.];
    let symmetric = [0., 0.5, 1., 0.5, 0.];

    for op in [
        DefuzzificationOp::Centroid,
        DefuzzificationOp::Bisector,
        DefuzzificationOp::MeanOfMaximum,
        DefuzzificationOp::LargestOfMaximum,
        DefuzzificationOp::SmallestOfMaximum,
    ] {
        assert_eq!(op.call(&universe, &symmetric), Ok(2.), "{op:?}");
    }

    let plateau = [0., 1., 1., 1., 0.];

    assert_eq!(DefuzzificationOp::MeanOfMaximum.call(&universe, &plateau), Ok(2.));
    assert_eq!(DefuzzificationOp::LargestOfMaximum.call(&universe, &plateau), Ok(3.));
    assert_eq!(DefuzzificationOp::SmallestOfMaximum.call(&universe, &plateau), Ok(1.));

    let skewed = [0., 0., 0., 1., 1.];

    assert_eq!(DefuzzificationOp::Centroid.call(&universe, &skewed), Ok(3.5));
}

#[test]
fn test_empty_set_fails() {
    let universe = [0., 1., 2.];

    assert_eq!(
        DefuzzificationOp::Centroid.call(&universe, &[0., 0., 0.]),
        Err(InferenceError::NoRuleFired)
    );
    assert_eq!(
        DefuzzificationOp::Bisector.call(&universe, &[0., 0., 0.]),
        Err(InferenceError::NoRuleFired)
    );
}
