//! Kernel density estimation and box statistics for posterior plots.

use crate::error::{ReportError, Result};
use crate::stats::descriptive::{mean, quantile_sorted, sd, sorted};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// A density curve evaluated on a regular grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DensityCurve {
    /// Grid points.
    pub x: Vec<f64>,
    /// Density at each grid point.
    pub y: Vec<f64>,
    /// Kernel bandwidth used.
    pub bandwidth: f64,
}

impl DensityCurve {
    /// Grid value with the highest density (maximum a posteriori estimate on the grid).
    pub fn mode(&self) -> f64 {
        self.x
            .iter()
            .zip(self.y.iter())
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(&x, _)| x)
            .unwrap_or(f64::NAN)
    }
}

/// Silverman's rule of thumb, `0.9 * min(sd, IQR / 1.34) * n^(-1/5)`.
///
/// Falls back to the SD, then to the magnitude of the first draw, then to 1
/// when the spread is zero.
pub fn bandwidth_nrd0(sorted_draws: &[f64]) -> Result<f64> {
    if sorted_draws.len() < 2 {
        return Err(ReportError::EmptyData(
            "Bandwidth selection needs at least two draws".to_string(),
        ));
    }
    let s = sd(sorted_draws)?;
    let iqr = quantile_sorted(sorted_draws, 0.75) - quantile_sorted(sorted_draws, 0.25);
    let mut lo = s.min(iqr / 1.34);
    if lo <= 0.0 {
        lo = s;
    }
    if lo <= 0.0 {
        lo = sorted_draws[0].abs();
    }
    if lo <= 0.0 {
        lo = 1.0;
    }
    Ok(0.9 * lo * (sorted_draws.len() as f64).powf(-0.2))
}

fn gaussian_kernel(u: f64) -> f64 {
    (-0.5 * u * u).exp() / (2.0 * PI).sqrt()
}

/// Evaluate a Gaussian KDE of `draws` at arbitrary points.
pub fn density_at(draws: &[f64], points: &[f64]) -> Result<Vec<f64>> {
    let s = sorted(draws);
    let bw = bandwidth_nrd0(&s)?;
    Ok(kde(&s, bw, points))
}

fn kde(draws: &[f64], bw: f64, points: &[f64]) -> Vec<f64> {
    let norm = draws.len() as f64 * bw;
    points
        .iter()
        .map(|&p| draws.iter().map(|&x| gaussian_kernel((p - x) / bw)).sum::<f64>() / norm)
        .collect()
}

/// Gaussian KDE on a regular grid from `min - 3bw` to `max + 3bw`.
pub fn density(draws: &[f64], n_points: usize) -> Result<DensityCurve> {
    if n_points < 2 {
        return Err(ReportError::InvalidParameter(format!(
            "Density grid needs at least 2 points, got {}",
            n_points
        )));
    }
    // rejects empty and non-finite input
    mean(draws)?;
    let s = sorted(draws);
    let bw = bandwidth_nrd0(&s)?;
    let lo = s[0] - 3.0 * bw;
    let hi = s[s.len() - 1] + 3.0 * bw;
    let step = (hi - lo) / (n_points - 1) as f64;
    let x: Vec<f64> = (0..n_points).map(|i| lo + i as f64 * step).collect();
    let y = kde(&s, bw, &x);
    Ok(DensityCurve {
        x,
        y,
        bandwidth: bw,
    })
}

/// Box-and-whisker statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxStats {
    /// First quartile.
    pub q1: f64,
    /// Median.
    pub median: f64,
    /// Third quartile.
    pub q3: f64,
    /// Lowest draw within 1.5 IQR of the first quartile.
    pub whisker_low: f64,
    /// Highest draw within 1.5 IQR of the third quartile.
    pub whisker_high: f64,
}

/// Compute Tukey box statistics.
pub fn box_stats(draws: &[f64]) -> Result<BoxStats> {
    mean(draws)?;
    let s = sorted(draws);
    let q1 = quantile_sorted(&s, 0.25);
    let q3 = quantile_sorted(&s, 0.75);
    let fence = 1.5 * (q3 - q1);
    let whisker_low = s
        .iter()
        .copied()
        .find(|&x| x >= q1 - fence)
        .unwrap_or(q1);
    let whisker_high = s
        .iter()
        .rev()
        .copied()
        .find(|&x| x <= q3 + fence)
        .unwrap_or(q3);
    Ok(BoxStats {
        q1,
        median: quantile_sorted(&s, 0.5),
        q3,
        whisker_low,
        whisker_high,
    })
}
