//! Posterior summary statistics.

pub mod density;
pub mod descriptive;
pub mod direction;
pub mod interval;

pub use density::{box_stats, density, BoxStats, DensityCurve};
pub use descriptive::{mad, mean, median, quantile, sd};
pub use direction::{
    overlap, probability_of_direction, rope, Direction, ProbabilityOfDirection, RopeDecision,
    RopeResult,
};
pub use interval::{equal_tailed, hdi, CredibleInterval};
