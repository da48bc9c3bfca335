//! Descriptive statistics over posterior draws and data columns.

use crate::error::{ReportError, Result};

/// Scale factor that makes the MAD a consistent estimator of the SD
/// under normality.
pub const MAD_CONSTANT: f64 = 1.4826;

fn require_draws(draws: &[f64], what: &str) -> Result<()> {
    if draws.is_empty() {
        return Err(ReportError::EmptyData(format!(
            "Cannot compute {} of no values",
            what
        )));
    }
    if draws.iter().any(|x| !x.is_finite()) {
        return Err(ReportError::Numerical(format!(
            "Non-finite value encountered while computing {}",
            what
        )));
    }
    Ok(())
}

/// Return a sorted copy of the draws.
pub fn sorted(draws: &[f64]) -> Vec<f64> {
    let mut s = draws.to_vec();
    s.sort_by(|a, b| a.total_cmp(b));
    s
}

/// Arithmetic mean.
pub fn mean(draws: &[f64]) -> Result<f64> {
    require_draws(draws, "mean")?;
    Ok(draws.iter().sum::<f64>() / draws.len() as f64)
}

/// Sample standard deviation (n - 1 denominator).
///
/// A single draw has a standard deviation of zero.
pub fn sd(draws: &[f64]) -> Result<f64> {
    let m = mean(draws)?;
    let n = draws.len();
    if n < 2 {
        return Ok(0.0);
    }
    let ss: f64 = draws.iter().map(|x| (x - m).powi(2)).sum();
    Ok((ss / (n - 1) as f64).sqrt())
}

/// Quantile of already sorted values (R type 7 interpolation).
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    if n == 1 {
        return sorted[0];
    }
    let q = q.clamp(0.0, 1.0);
    let h = (n - 1) as f64 * q;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

/// Quantile of the draws (R type 7).
pub fn quantile(draws: &[f64], q: f64) -> Result<f64> {
    require_draws(draws, "quantile")?;
    if !(0.0..=1.0).contains(&q) {
        return Err(ReportError::InvalidParameter(format!(
            "Quantile must be in [0, 1], got {}",
            q
        )));
    }
    Ok(quantile_sorted(&sorted(draws), q))
}

/// Median.
pub fn median(draws: &[f64]) -> Result<f64> {
    require_draws(draws, "median")?;
    Ok(quantile_sorted(&sorted(draws), 0.5))
}

/// Median absolute deviation, scaled by [`MAD_CONSTANT`].
pub fn mad(draws: &[f64]) -> Result<f64> {
    let center = median(draws)?;
    let deviations: Vec<f64> = draws.iter().map(|x| (x - center).abs()).collect();
    Ok(MAD_CONSTANT * quantile_sorted(&sorted(&deviations), 0.5))
}

/// Interquartile range (type 7 quartiles).
pub fn iqr(draws: &[f64]) -> Result<f64> {
    require_draws(draws, "IQR")?;
    let s = sorted(draws);
    Ok(quantile_sorted(&s, 0.75) - quantile_sorted(&s, 0.25))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_sd() {
        let x = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(mean(&x).unwrap(), 5.0);
        // sum of squares = 32, n - 1 = 7
        assert_relative_eq!(sd(&x).unwrap(), (32.0_f64 / 7.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_median_even_and_odd() {
        assert_relative_eq!(median(&[3.0, 1.0, 2.0]).unwrap(), 2.0);
        assert_relative_eq!(median(&[4.0, 1.0, 3.0, 2.0]).unwrap(), 2.5);
    }

    #[test]
    fn test_quantile_type7() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_relative_eq!(quantile(&x, 0.25).unwrap(), 2.0);
        assert_relative_eq!(quantile(&x, 0.1).unwrap(), 1.4, epsilon = 1e-12);
        assert!(quantile(&x, 1.5).is_err());
    }

    #[test]
    fn test_mad() {
        // |x - 3| = 2, 1, 0, 1, 2 -> median 1
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_relative_eq!(mad(&x).unwrap(), MAD_CONSTANT, epsilon = 1e-12);
    }

    #[test]
    fn test_constant_draws() {
        let x = [1.5; 10];
        assert_relative_eq!(sd(&x).unwrap(), 0.0);
        assert_relative_eq!(mad(&x).unwrap(), 0.0);
    }

    #[test]
    fn test_empty_and_non_finite() {
        assert!(matches!(mean(&[]), Err(ReportError::EmptyData(_))));
        assert!(matches!(median(&[1.0, f64::NAN]), Err(ReportError::Numerical(_))));
        let message = sd(&[1.0, f64::INFINITY]).unwrap_err().to_string();
        assert!(message.contains("Non-finite value encountered while computing"));
        assert!(!message.contains("draw"));
    }
}
