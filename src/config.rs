//! Analysis configuration.

use crate::error::{ReportError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Point estimate used as the centre of each posterior in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CentralIndex {
    #[default]
    Median,
    Mean,
}

impl CentralIndex {
    /// Descriptive name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Median => "Median",
            Self::Mean => "Mean",
        }
    }
}

/// Settings for [`analyze`](crate::analyze::analyze).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzeConfig {
    /// Credible interval mass, in (0, 1].
    pub ci: f64,
    /// Point estimate quoted in the narrative.
    pub index: CentralIndex,
    /// Compute standardized effect sizes (requires the model data).
    pub effsize: bool,
    /// Region of practical equivalence, if any.
    pub rope: Option<[f64; 2]>,
    /// Decimal places for reported values.
    pub digits: usize,
    /// Grid size of the density curves in the plot.
    pub density_points: usize,
    /// Report group-level parameters as well.
    pub include_group_level: bool,
}

impl Default for AnalyzeConfig {
    fn default() -> Self {
        Self {
            ci: 0.9,
            index: CentralIndex::Median,
            effsize: false,
            rope: None,
            digits: 2,
            density_points: 512,
            include_group_level: false,
        }
    }
}

impl AnalyzeConfig {
    /// Load from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Save to a YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(ReportError::from)
    }

    /// Check that every setting is in range.
    pub fn validate(&self) -> Result<()> {
        if !(self.ci > 0.0 && self.ci <= 1.0) {
            return Err(ReportError::InvalidParameter(format!(
                "ci must be in (0, 1], got {}",
                self.ci
            )));
        }
        if let Some([low, high]) = self.rope {
            if !(low < high) {
                return Err(ReportError::InvalidParameter(format!(
                    "rope must satisfy low < high, got [{}, {}]",
                    low, high
                )));
            }
        }
        if self.density_points < 2 {
            return Err(ReportError::InvalidParameter(
                "density_points must be at least 2".to_string(),
            ));
        }
        if self.digits > 10 {
            return Err(ReportError::InvalidParameter(format!(
                "digits must be at most 10, got {}",
                self.digits
            )));
        }
        Ok(())
    }
}
