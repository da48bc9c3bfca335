//! Existence and significance indices: probability of direction, ROPE
//! and prior overlap.

use crate::error::{ReportError, Result};
use crate::stats::density::density_at;
use crate::stats::descriptive::{median, sd, sorted};
use crate::stats::interval::hdi_sorted;
use serde::{Deserialize, Serialize};
use statrs::distribution::{Continuous, Normal};

/// Sign of an effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Positive,
    Negative,
}

impl Direction {
    /// Descriptive name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Probability of direction of a posterior.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityOfDirection {
    /// Share of draws strictly above zero.
    pub positive: f64,
    /// Share of draws strictly below zero.
    pub negative: f64,
    /// Dominant direction.
    pub direction: Direction,
    /// Maximum probability of effect: share of draws in the dominant direction.
    pub mpe: f64,
}

/// Compute the probability of direction (maximum probability of effect).
///
/// Ties between the two shares resolve toward the sign of the median.
pub fn probability_of_direction(draws: &[f64]) -> Result<ProbabilityOfDirection> {
    let center = median(draws)?;
    let n = draws.len() as f64;
    let positive = draws.iter().filter(|&&x| x > 0.0).count() as f64 / n;
    let negative = draws.iter().filter(|&&x| x < 0.0).count() as f64 / n;

    let direction = if positive > negative {
        Direction::Positive
    } else if negative > positive {
        Direction::Negative
    } else if center >= 0.0 {
        Direction::Positive
    } else {
        Direction::Negative
    };
    let mpe = match direction {
        Direction::Positive => positive,
        Direction::Negative => negative,
    };

    Ok(ProbabilityOfDirection {
        positive,
        negative,
        direction,
        mpe,
    })
}

/// Decision taken from the ROPE percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RopeDecision {
    /// The whole credible interval lies inside the ROPE.
    Accept,
    /// The credible interval lies entirely outside the ROPE.
    Reject,
    /// Partial overlap.
    Undecided,
}

impl RopeDecision {
    /// Descriptive name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Reject => "reject",
            Self::Undecided => "undecided",
        }
    }
}

/// Region of practical equivalence result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RopeResult {
    /// ROPE lower bound.
    pub low: f64,
    /// ROPE upper bound.
    pub high: f64,
    /// Share of the credible-interval draws inside the ROPE.
    pub percentage: f64,
    /// Decision for the null region.
    pub decision: RopeDecision,
}

/// Share of the HDI draws falling inside `[low, high]`.
pub fn rope(draws: &[f64], bounds: (f64, f64), ci: f64) -> Result<RopeResult> {
    let (low, high) = bounds;
    if !(low < high) {
        return Err(ReportError::InvalidParameter(format!(
            "ROPE bounds must satisfy low < high, got [{}, {}]",
            low, high
        )));
    }
    // validates the draws and the mass
    crate::stats::interval::hdi(draws, ci)?;
    let s = sorted(draws);
    let interval = hdi_sorted(&s, ci);

    let in_ci: Vec<f64> = s.into_iter().filter(|&x| interval.contains(x)).collect();
    let inside = in_ci.iter().filter(|&&x| x >= low && x <= high).count();
    let percentage = inside as f64 / in_ci.len() as f64;

    let decision = if inside == in_ci.len() {
        RopeDecision::Accept
    } else if inside == 0 {
        RopeDecision::Reject
    } else {
        RopeDecision::Undecided
    };

    Ok(RopeResult {
        low,
        high,
        percentage,
        decision,
    })
}

/// Number of grid points used by [`overlap`].
const OVERLAP_GRID: usize = 512;

/// Overlap between the posterior and a `N(0, sd(draws))` reference density.
///
/// Both densities are evaluated on a common grid and the pointwise minimum
/// is integrated with the trapezoidal rule. Returned as a proportion. A
/// constant posterior has no density and an overlap of zero.
pub fn overlap(draws: &[f64]) -> Result<f64> {
    let scale = sd(draws)?;
    if scale <= 0.0 {
        return Ok(0.0);
    }
    let reference = Normal::new(0.0, scale)
        .map_err(|e| ReportError::Numerical(format!("Reference density: {}", e)))?;

    let s = sorted(draws);
    let lo = s[0].min(-4.0 * scale);
    let hi = s[s.len() - 1].max(4.0 * scale);
    let step = (hi - lo) / (OVERLAP_GRID - 1) as f64;
    let grid: Vec<f64> = (0..OVERLAP_GRID).map(|i| lo + i as f64 * step).collect();

    let posterior = density_at(&s, &grid)?;
    let mins: Vec<f64> = grid
        .iter()
        .zip(posterior.iter())
        .map(|(&x, &p)| p.min(reference.pdf(x)))
        .collect();

    let area: f64 = mins.windows(2).map(|w| (w[0] + w[1]) * 0.5 * step).sum();
    Ok(area.clamp(0.0, 1.0))
}
