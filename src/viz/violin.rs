//! Violin + boxplot artifact for posterior distributions.
//!
//! The artifact is plot-friendly JSON: flat arrays per parameter, no nested
//! objects beyond one level.

use crate::error::{ReportError, Result};
use crate::stats::{box_stats, density, hdi, BoxStats};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Schema identifier written into every artifact.
pub const VIOLIN_SCHEMA: &str = "bayes_report_violin_v0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViolinArtifact {
    pub schema_version: String,
    pub meta: ViolinMeta,
    pub parameters: Vec<ViolinEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViolinMeta {
    pub tool: String,
    pub tool_version: String,
    pub created_unix_ms: u128,
    /// Credible interval mass of `ci_low` / `ci_high`.
    pub ci: f64,
    /// Label of the quantity on the value axis.
    pub value_label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViolinEntry {
    pub name: String,
    pub density_x: Vec<f64>,
    pub density_y: Vec<f64>,
    #[serde(rename = "box")]
    pub box_stats: BoxStats,
    pub ci_low: f64,
    pub ci_high: f64,
    pub center: f64,
}

impl ViolinArtifact {
    /// Smallest and largest value on the value axis, across all entries.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let values = self.parameters.iter().flat_map(|p| {
            p.density_x
                .first()
                .into_iter()
                .chain(p.density_x.last())
                .copied()
                .chain([p.box_stats.whisker_low, p.box_stats.whisker_high])
        });
        values.fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    /// Serialize as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(ReportError::from)
    }
}

fn now_unix_ms() -> Result<u128> {
    let d = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| ReportError::Numerical(format!("system time error: {}", e)))?;
    Ok(d.as_millis())
}

/// Build one violin entry from a posterior.
///
/// `center` is the point estimate drawn as the marker (median or mean).
pub fn violin_entry(name: &str, draws: &[f64], ci: f64, center: f64, n_points: usize) -> Result<ViolinEntry> {
    let curve = density(draws, n_points)?;
    let interval = hdi(draws, ci)?;
    Ok(ViolinEntry {
        name: name.to_string(),
        density_x: curve.x,
        density_y: curve.y,
        box_stats: box_stats(draws)?,
        ci_low: interval.low,
        ci_high: interval.high,
        center,
    })
}

/// Assemble a violin artifact from prepared entries.
pub fn violin_artifact(entries: Vec<ViolinEntry>, ci: f64, value_label: &str) -> Result<ViolinArtifact> {
    Ok(ViolinArtifact {
        schema_version: VIOLIN_SCHEMA.to_string(),
        meta: ViolinMeta {
            tool: "bayes-report".to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            created_unix_ms: now_unix_ms()?,
            ci,
            value_label: value_label.to_string(),
        },
        parameters: entries,
    })
}
