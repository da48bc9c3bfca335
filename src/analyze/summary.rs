//! Per-parameter posterior summaries.

use crate::config::{AnalyzeConfig, CentralIndex};
use crate::data::ParameterRole;
use crate::effect::EffectSize;
use crate::error::Result;
use crate::stats::{
    hdi, mad, mean, median, overlap, probability_of_direction, rope, sd, CredibleInterval,
    ProbabilityOfDirection, RopeResult,
};
use serde::{Deserialize, Serialize};

/// Descriptive summary of one parameter's posterior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterSummary {
    /// Parameter name as in the draws.
    pub name: String,
    /// Role in the model.
    pub role: ParameterRole,
    pub median: f64,
    /// Scaled median absolute deviation.
    pub mad: f64,
    pub mean: f64,
    pub sd: f64,
    /// Highest density interval.
    pub ci: CredibleInterval,
    /// Probability of direction.
    pub direction: ProbabilityOfDirection,
    /// Overlap with a `N(0, sd)` reference, as a proportion.
    pub overlap: f64,
    /// ROPE result, when bounds were configured.
    pub rope: Option<RopeResult>,
    /// Standardized effect size, when requested and applicable.
    pub effect: Option<EffectSize>,
}

impl ParameterSummary {
    /// Point estimate selected by `index`.
    pub fn center(&self, index: CentralIndex) -> f64 {
        match index {
            CentralIndex::Median => self.median,
            CentralIndex::Mean => self.mean,
        }
    }

    /// Spread matching `index`: MAD for the median, SD for the mean.
    pub fn spread(&self, index: CentralIndex) -> f64 {
        match index {
            CentralIndex::Median => self.mad,
            CentralIndex::Mean => self.sd,
        }
    }

    /// Label of the spread matching `index`.
    pub fn spread_name(index: CentralIndex) -> &'static str {
        match index {
            CentralIndex::Median => "MAD",
            CentralIndex::Mean => "SD",
        }
    }
}

/// Summarize a single posterior.
pub fn summarize_parameter(
    name: &str,
    role: ParameterRole,
    draws: &[f64],
    config: &AnalyzeConfig,
) -> Result<ParameterSummary> {
    let rope = match config.rope {
        Some([low, high]) => Some(rope(draws, (low, high), config.ci)?),
        None => None,
    };
    Ok(ParameterSummary {
        name: name.to_string(),
        role,
        median: median(draws)?,
        mad: mad(draws)?,
        mean: mean(draws)?,
        sd: sd(draws)?,
        ci: hdi(draws, config.ci)?,
        direction: probability_of_direction(draws)?,
        overlap: overlap(draws)?,
        rope,
        effect: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::Direction;
    use approx::assert_relative_eq;

    #[test]
    fn test_summarize_parameter() {
        let draws: Vec<f64> = (0..1000).map(|i| 2.0 + (i as f64 - 500.0) / 500.0).collect();
        let config = AnalyzeConfig {
            rope: Some([-0.1, 0.1]),
            ..AnalyzeConfig::default()
        };
        let s = summarize_parameter("x", ParameterRole::Fixed, &draws, &config).unwrap();

        assert_relative_eq!(s.median, 2.0, epsilon = 1e-2);
        assert_relative_eq!(s.mean, 2.0, epsilon = 1e-2);
        assert_eq!(s.direction.direction, Direction::Positive);
        assert_relative_eq!(s.direction.mpe, 1.0);
        assert!(s.ci.low > 1.0 && s.ci.high < 3.0);
        assert_eq!(s.rope.unwrap().percentage, 0.0);
        assert!(s.effect.is_none());
        assert_eq!(s.center(CentralIndex::Mean), s.mean);
        assert_eq!(s.spread(CentralIndex::Median), s.mad);
    }

    #[test]
    fn test_constant_posterior() {
        let s = summarize_parameter("k", ParameterRole::Auxiliary, &[3.0; 50], &AnalyzeConfig::default())
            .unwrap();
        assert_eq!(s.sd, 0.0);
        assert_eq!(s.mad, 0.0);
        assert_eq!(s.ci.low, 3.0);
        assert_eq!(s.ci.high, 3.0);
        assert_eq!(s.overlap, 0.0);
    }
}
