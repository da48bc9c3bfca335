//! Posterior distribution of standardized effect sizes.

use crate::effect::interpret::{interpret_d, EffectMagnitude};
use crate::error::Result;
use crate::stats::{median, probability_of_direction, Direction};
use serde::{Deserialize, Serialize};

/// Posterior probability of one magnitude class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MagnitudeProbability {
    pub magnitude: EffectMagnitude,
    pub probability: f64,
}

/// Effect size summary of a standardized coefficient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectSize {
    /// Median standardized effect.
    pub median: f64,
    /// Magnitude of the median effect.
    pub magnitude: EffectMagnitude,
    /// Dominant direction.
    pub direction: Direction,
    /// Probability of the dominant direction.
    pub direction_probability: f64,
    /// Probability of each magnitude class on |d|, smallest class first.
    pub probabilities: Vec<MagnitudeProbability>,
}

impl EffectSize {
    /// Probability of a magnitude class.
    pub fn probability(&self, magnitude: EffectMagnitude) -> f64 {
        self.probabilities
            .iter()
            .find(|p| p.magnitude == magnitude)
            .map(|p| p.probability)
            .unwrap_or(0.0)
    }

    /// Probability that the effect is at least `magnitude`.
    pub fn probability_at_least(&self, magnitude: EffectMagnitude) -> f64 {
        self.probabilities
            .iter()
            .filter(|p| p.magnitude >= magnitude)
            .map(|p| p.probability)
            .sum()
    }

    /// Classes sorted by decreasing probability (stable for ties).
    pub fn ranked(&self) -> Vec<MagnitudeProbability> {
        let mut ranked = self.probabilities.clone();
        ranked.sort_by(|a, b| b.probability.total_cmp(&a.probability));
        ranked
    }
}

/// Summarize the posterior of a standardized effect.
pub fn effect_size(std_draws: &[f64]) -> Result<EffectSize> {
    let center = median(std_draws)?;
    let pd = probability_of_direction(std_draws)?;
    let n = std_draws.len() as f64;

    let probabilities = EffectMagnitude::ALL
        .iter()
        .map(|&magnitude| MagnitudeProbability {
            magnitude,
            probability: std_draws
                .iter()
                .filter(|&&d| interpret_d(d) == magnitude)
                .count() as f64
                / n,
        })
        .collect();

    Ok(EffectSize {
        median: center,
        magnitude: interpret_d(center),
        direction: pd.direction,
        direction_probability: pd.mpe,
        probabilities,
    })
}
