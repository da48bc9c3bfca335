//! Column-wise standardization of data frames.

use crate::data::{ColumnData, DataFrame};
use crate::error::{ReportError, Result};
use crate::stats::descriptive::{mean, sd};
use serde::{Deserialize, Serialize};

/// How numeric columns are rescaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScaleMethod {
    /// `(x - mean) / sd`.
    #[default]
    ZScore,
    /// `(x - min) / (max - min)`, mapping onto [0, 1].
    Normalize,
}

/// Options for [`standardize`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StandardizeOptions {
    pub method: ScaleMethod,
    /// Only these columns are transformed (all numeric columns when `None`).
    pub subset: Option<Vec<String>>,
    /// These columns are left untouched. Takes precedence over `subset`.
    pub except: Vec<String>,
}

impl StandardizeOptions {
    /// Z-score every numeric column.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rescale to [0, 1] instead of Z-scoring.
    pub fn normalize(mut self) -> Self {
        self.method = ScaleMethod::Normalize;
        self
    }

    /// Restrict the transformation to the named columns.
    pub fn subset(mut self, columns: &[&str]) -> Self {
        self.subset = Some(columns.iter().map(|c| c.to_string()).collect());
        self
    }

    /// Leave the named columns untouched.
    pub fn except(mut self, columns: &[&str]) -> Self {
        self.except = columns.iter().map(|c| c.to_string()).collect();
        self
    }
}

/// The centre and scale applied to one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnTransform {
    pub column: String,
    /// Mean (Z-score) or minimum (normalize).
    pub center: f64,
    /// SD (Z-score) or range (normalize). Zero for constant columns.
    pub scale: f64,
}

impl ColumnTransform {
    /// Map a raw value onto the transformed scale.
    pub fn apply(&self, x: f64) -> f64 {
        if self.scale > 0.0 {
            (x - self.center) / self.scale
        } else {
            0.0
        }
    }

    /// Map a transformed value back onto the raw scale.
    pub fn invert(&self, z: f64) -> f64 {
        z * self.scale + self.center
    }
}

/// Result of [`standardize`].
#[derive(Debug, Clone)]
pub struct Standardized {
    /// Data with transformed columns, names and order preserved.
    pub data: DataFrame,
    /// Transform applied to each modified column, in column order.
    pub transforms: Vec<ColumnTransform>,
    /// Columns left untouched (factors, exceptions, columns outside the subset).
    pub skipped: Vec<String>,
}

impl Standardized {
    /// Transform applied to a column, if it was transformed.
    pub fn transform(&self, column: &str) -> Option<&ColumnTransform> {
        self.transforms.iter().find(|t| t.column == column)
    }
}

fn column_transform(name: &str, values: &[f64], method: ScaleMethod) -> Result<ColumnTransform> {
    let (center, scale) = match method {
        ScaleMethod::ZScore => (mean(values)?, sd(values)?),
        ScaleMethod::Normalize => {
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            (min, max - min)
        }
    };
    if scale <= 0.0 {
        tracing::warn!(column = name, "constant column standardized to zeros");
    }
    Ok(ColumnTransform {
        column: name.to_string(),
        center,
        scale,
    })
}

/// Standardize the numeric columns of a data frame.
///
/// Missing values are ignored when estimating the centre and scale and stay
/// missing in the output. Factor columns are never transformed.
pub fn standardize(frame: &DataFrame, options: &StandardizeOptions) -> Result<Standardized> {
    let requested: Vec<&String> = options
        .subset
        .iter()
        .flatten()
        .chain(options.except.iter())
        .collect();
    for name in requested {
        if !frame.has_column(name) {
            return Err(ReportError::MissingColumn(name.clone()));
        }
    }
    if let Some(ref subset) = options.subset {
        for name in subset {
            if !frame.column(name)?.data.is_numeric() {
                return Err(ReportError::InvalidParameter(format!(
                    "Cannot standardize factor column '{}'",
                    name
                )));
            }
        }
    }

    let mut data = frame.clone();
    let mut transforms = Vec::new();
    let mut skipped = Vec::new();

    for column in frame.columns() {
        let name = column.name.as_str();
        let selected = options
            .subset
            .as_ref()
            .map_or(true, |s| s.iter().any(|c| c == name));
        let excepted = options.except.iter().any(|c| c == name);

        let values = match column.data.as_numeric() {
            Some(v) if selected && !excepted => v,
            _ => {
                skipped.push(name.to_string());
                continue;
            }
        };

        let present: Vec<f64> = values.iter().flatten().copied().collect();
        if present.is_empty() {
            tracing::warn!(column = name, "column has no observed values; left untouched");
            skipped.push(name.to_string());
            continue;
        }

        let transform = column_transform(name, &present, options.method)?;
        let scaled = values.iter().map(|v| v.map(|x| transform.apply(x))).collect();
        data.set_column(name, ColumnData::Numeric(scaled))?;
        transforms.push(transform);
    }

    tracing::debug!(
        transformed = transforms.len(),
        skipped = skipped.len(),
        "standardized data frame"
    );

    Ok(Standardized {
        data,
        transforms,
        skipped,
    })
}

/// Z-score a single vector.
pub fn standardize_vec(values: &[f64]) -> Result<Vec<f64>> {
    let transform = column_transform("values", values, ScaleMethod::ZScore)?;
    Ok(values.iter().map(|&x| transform.apply(x)).collect())
}
