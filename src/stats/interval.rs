//! Credible intervals: highest density and equal-tailed.

use crate::error::{ReportError, Result};
use crate::stats::descriptive::{quantile_sorted, sorted};
use serde::{Deserialize, Serialize};

/// A credible interval at a given probability mass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CredibleInterval {
    /// Probability mass covered, in (0, 1].
    pub ci: f64,
    /// Lower bound.
    pub low: f64,
    /// Upper bound.
    pub high: f64,
}

impl CredibleInterval {
    /// Interval width.
    pub fn width(&self) -> f64 {
        self.high - self.low
    }

    /// Whether a value lies inside the interval (bounds inclusive).
    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }

    /// Whether the interval excludes zero.
    pub fn excludes_zero(&self) -> bool {
        !self.contains(0.0)
    }
}

fn validate(draws: &[f64], ci: f64) -> Result<()> {
    if !(ci > 0.0 && ci <= 1.0) {
        return Err(ReportError::InvalidParameter(format!(
            "Credible interval mass must be in (0, 1], got {}",
            ci
        )));
    }
    if draws.is_empty() {
        return Err(ReportError::EmptyData(
            "Cannot compute a credible interval of an empty posterior".to_string(),
        ));
    }
    if draws.iter().any(|x| !x.is_finite()) {
        return Err(ReportError::Numerical(
            "Non-finite draw in credible interval computation".to_string(),
        ));
    }
    Ok(())
}

/// Highest density interval.
///
/// Among all windows spanning `floor(ci * n)` consecutive sorted draws, the
/// narrowest one is returned (the first on ties).
pub fn hdi(draws: &[f64], ci: f64) -> Result<CredibleInterval> {
    validate(draws, ci)?;
    let s = sorted(draws);
    Ok(hdi_sorted(&s, ci))
}

/// HDI of already sorted, validated draws.
pub(crate) fn hdi_sorted(s: &[f64], ci: f64) -> CredibleInterval {
    let n = s.len();
    let k = ((ci * n as f64).floor() as usize).min(n - 1);
    let mut best = 0;
    let mut best_width = f64::INFINITY;
    for i in 0..(n - k) {
        let width = s[i + k] - s[i];
        if width < best_width {
            best_width = width;
            best = i;
        }
    }
    CredibleInterval {
        ci,
        low: s[best],
        high: s[best + k],
    }
}

/// Equal-tailed (quantile) interval.
pub fn equal_tailed(draws: &[f64], ci: f64) -> Result<CredibleInterval> {
    validate(draws, ci)?;
    let s = sorted(draws);
    let tail = (1.0 - ci) / 2.0;
    Ok(CredibleInterval {
        ci,
        low: quantile_sorted(&s, tail),
        high: quantile_sorted(&s, 1.0 - tail),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_hdi_uniform_grid() {
        let draws: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let interval = hdi(&draws, 0.9).unwrap();
        // window of 90 steps, all equally wide -> first one wins
        assert_relative_eq!(interval.low, 0.0);
        assert_relative_eq!(interval.high, 90.0);
        assert_relative_eq!(interval.width(), 90.0);
    }

    #[test]
    fn test_hdi_skewed_prefers_dense_region() {
        // dense cluster near zero plus a long right tail
        let mut draws: Vec<f64> = (0..90).map(|i| i as f64 * 0.01).collect();
        draws.extend((0..10).map(|i| 10.0 + i as f64 * 10.0));
        let interval = hdi(&draws, 0.8).unwrap();
        assert!(interval.low < 0.1);
        assert!(interval.high < 1.0);
    }

    #[test]
    fn test_equal_tailed() {
        let draws: Vec<f64> = (0..=100).map(|i| i as f64).collect();
        let interval = equal_tailed(&draws, 0.9).unwrap();
        assert_relative_eq!(interval.low, 5.0, epsilon = 1e-9);
        assert_relative_eq!(interval.high, 95.0, epsilon = 1e-9);
    }

    #[test]
    fn test_invalid_ci() {
        assert!(hdi(&[1.0, 2.0], 0.0).is_err());
        assert!(hdi(&[1.0, 2.0], 1.2).is_err());
        assert!(equal_tailed(&[], 0.9).is_err());
    }

    #[test]
    fn test_full_mass_covers_range() {
        let interval = hdi(&[3.0, 1.0, 2.0], 1.0).unwrap();
        assert_relative_eq!(interval.low, 1.0);
        assert_relative_eq!(interval.high, 3.0);
        assert!(interval.excludes_zero());
    }
}
