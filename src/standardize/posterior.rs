//! Standardization of posterior coefficients.
//!
//! Coefficients are rescaled so that they read as standardized differences:
//! a one-SD change of a numeric predictor, or a level contrast for a factor,
//! expressed in SDs of the response. For logit models the latent-scale SD
//! `pi / sqrt(3)` stands in for the response SD.

use crate::data::{ColumnData, DataFrame, PosteriorDraws, StanregFit};
use crate::error::{ReportError, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// How a coefficient name was resolved against the model data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PredictorKind {
    /// A numeric predictor with its SD.
    Numeric { sd: f64 },
    /// A level of a factor predictor.
    FactorLevel { factor: String, level: String },
    /// An interaction; the product of the numeric SDs involved.
    Interaction { sd_product: f64 },
    /// No matching data column.
    Unresolved,
}

/// Multiplier that turns a raw coefficient into a standardized one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoefficientScale {
    pub coefficient: String,
    pub kind: PredictorKind,
    pub factor: f64,
}

/// SD of the response on the scale the coefficients act on.
fn response_scale(fit: &StanregFit, data: &DataFrame) -> Result<f64> {
    if fit.info.link == "logit" {
        return Ok(PI / 3f64.sqrt());
    }
    let response = fit.response();
    let column = data.column(response)?;
    if !column.data.is_numeric() {
        return Err(ReportError::InvalidParameter(format!(
            "Response '{}' is not numeric; only logit models may have a categorical outcome",
            response
        )));
    }
    let sd = data.sd(response)?;
    if sd <= 0.0 {
        return Err(ReportError::Numerical(format!(
            "Response '{}' has zero variance",
            response
        )));
    }
    Ok(sd)
}

/// Resolve one `:`-free coefficient part to a predictor.
fn resolve_part(part: &str, data: &DataFrame, variables: &[&str]) -> Result<PredictorKind> {
    if variables.contains(&part) {
        if let Ok(column) = data.column(part) {
            if column.data.is_numeric() {
                return Ok(PredictorKind::Numeric { sd: data.sd(part)? });
            }
        }
    }
    // longest matching factor name wins, e.g. `group2B` over `group`
    let factor = variables
        .iter()
        .filter(|v| part.starts_with(*v) && part.len() > v.len())
        .filter(|v| {
            data.column(v)
                .map(|c| matches!(c.data, ColumnData::Factor(_)))
                .unwrap_or(false)
        })
        .max_by_key(|v| v.len());
    Ok(match factor {
        Some(f) => PredictorKind::FactorLevel {
            factor: f.to_string(),
            level: part[f.len()..].to_string(),
        },
        None => PredictorKind::Unresolved,
    })
}

/// Work out the standardization multiplier of a coefficient.
pub fn coefficient_scale(fit: &StanregFit, data: &DataFrame, coefficient: &str) -> Result<CoefficientScale> {
    let y_scale = response_scale(fit, data)?;
    let variables = fit.formula.variables();
    let parts: Vec<&str> = coefficient.split(':').collect();

    let kind = if parts.len() == 1 {
        resolve_part(coefficient, data, &variables)?
    } else {
        let mut sd_product = 1.0;
        for part in &parts {
            if let PredictorKind::Numeric { sd } = resolve_part(part, data, &variables)? {
                sd_product *= sd;
            }
        }
        PredictorKind::Interaction { sd_product }
    };

    let x_scale = match kind {
        PredictorKind::Numeric { sd } => sd,
        PredictorKind::Interaction { sd_product } => sd_product,
        PredictorKind::FactorLevel { .. } => 1.0,
        PredictorKind::Unresolved => {
            tracing::debug!(coefficient, "no data column for coefficient; scaling by response only");
            1.0
        }
    };

    Ok(CoefficientScale {
        coefficient: coefficient.to_string(),
        kind,
        factor: x_scale / y_scale,
    })
}

/// Standardized posterior draws of every population-level coefficient.
///
/// Requires the model data to be attached to the fit.
pub fn standardize_posterior(fit: &StanregFit) -> Result<PosteriorDraws> {
    let data = fit.data.as_ref().ok_or_else(|| {
        ReportError::MissingData("standardizing coefficients requires the model data".to_string())
    })?;
    let coefficients = fit.fixed_effects();
    if coefficients.is_empty() {
        return Err(ReportError::EmptyData(
            "Model has no population-level coefficients to standardize".to_string(),
        ));
    }

    let columns = coefficients
        .iter()
        .map(|&name| {
            let scale = coefficient_scale(fit, data, name)?;
            let draws = fit
                .draws
                .parameter(name)?
                .into_iter()
                .map(|b| b * scale.factor)
                .collect();
            Ok((name.to_string(), draws))
        })
        .collect::<Result<Vec<_>>>()?;

    PosteriorDraws::from_columns(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Column, ModelInfo};
    use approx::assert_relative_eq;

    fn data() -> DataFrame {
        DataFrame::new(vec![
            Column {
                name: "y".into(),
                // sd = 2
                data: ColumnData::Numeric(vec![Some(0.0), Some(2.0), Some(4.0)]),
            },
            Column {
                name: "x".into(),
                // sd = 0.5
                data: ColumnData::Numeric(vec![Some(1.0), Some(1.5), Some(2.0)]),
            },
            Column {
                name: "group".into(),
                data: ColumnData::Factor(vec![
                    Some("A".into()),
                    Some("B".into()),
                    Some("B".into()),
                ]),
            },
        ])
        .unwrap()
    }

    fn fit(formula: &str, link: &str) -> StanregFit {
        let draws = PosteriorDraws::from_columns(vec![
            ("(Intercept)".to_string(), vec![1.0, 1.0]),
            ("x".to_string(), vec![2.0, 4.0]),
            ("groupB".to_string(), vec![1.0, 3.0]),
            ("x:groupB".to_string(), vec![1.0, 1.0]),
        ])
        .unwrap();
        let mut info = ModelInfo::new(formula);
        info.link = link.to_string();
        StanregFit::new(info, draws).unwrap().with_data(data()).unwrap()
    }

    #[test]
    fn test_numeric_and_factor_scaling() {
        let std = standardize_posterior(&fit("y ~ x * group", "identity")).unwrap();
        assert_eq!(std.names(), &["x", "groupB", "x:groupB"]);
        // b * 0.5 / 2
        assert_eq!(std.parameter("x").unwrap(), vec![0.5, 1.0]);
        // b / 2
        assert_eq!(std.parameter("groupB").unwrap(), vec![0.5, 1.5]);
        assert_eq!(std.parameter("x:groupB").unwrap(), vec![0.25, 0.25]);
    }

    #[test]
    fn test_factor_resolution() {
        let f = fit("y ~ x * group", "identity");
        let scale = coefficient_scale(&f, &data(), "groupB").unwrap();
        assert_eq!(
            scale.kind,
            PredictorKind::FactorLevel {
                factor: "group".into(),
                level: "B".into()
            }
        );
    }

    #[test]
    fn test_logit_uses_latent_scale() {
        let f = fit("y ~ x + group", "logit");
        let scale = coefficient_scale(&f, &data(), "groupB").unwrap();
        assert_relative_eq!(scale.factor, 3f64.sqrt() / PI, epsilon = 1e-12);
    }

    fn numeric_fit(y: Vec<Option<f64>>) -> StanregFit {
        let data = DataFrame::new(vec![
            Column {
                name: "y".into(),
                data: ColumnData::Numeric(y),
            },
            Column {
                name: "x".into(),
                // sd = 0.5
                data: ColumnData::Numeric(vec![Some(1.0), Some(1.5), Some(2.0)]),
            },
            Column {
                name: "z".into(),
                // sd = 3
                data: ColumnData::Numeric(vec![Some(0.0), Some(3.0), Some(6.0)]),
            },
        ])
        .unwrap();
        let draws = PosteriorDraws::from_columns(vec![
            ("x".to_string(), vec![1.0, 2.0]),
            ("z".to_string(), vec![1.0, 2.0]),
            ("x:z".to_string(), vec![4.0, 8.0]),
        ])
        .unwrap();
        StanregFit::new(ModelInfo::new("y ~ x * z"), draws)
            .unwrap()
            .with_data(data)
            .unwrap()
    }

    #[test]
    fn test_numeric_interaction_multiplies_sds() {
        let f = numeric_fit(vec![Some(0.0), Some(2.0), Some(4.0)]);
        let data = f.data.clone().unwrap();
        let scale = coefficient_scale(&f, &data, "x:z").unwrap();
        match scale.kind {
            PredictorKind::Interaction { sd_product } => {
                assert_relative_eq!(sd_product, 1.5, epsilon = 1e-12)
            }
            other => panic!("expected an interaction, got {:?}", other),
        }
        // 0.5 * 3 / 2
        assert_relative_eq!(scale.factor, 0.75, epsilon = 1e-12);

        let std = standardize_posterior(&f).unwrap();
        let xz = std.parameter("x:z").unwrap();
        assert_relative_eq!(xz[0], 3.0, epsilon = 1e-12);
        assert_relative_eq!(xz[1], 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_unknown_coefficient_scaled_by_response_only() {
        let f = numeric_fit(vec![Some(0.0), Some(2.0), Some(4.0)]);
        let data = f.data.clone().unwrap();
        let scale = coefficient_scale(&f, &data, "w").unwrap();
        assert_eq!(scale.kind, PredictorKind::Unresolved);
        assert_relative_eq!(scale.factor, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_constant_response_is_an_error() {
        let f = numeric_fit(vec![Some(3.0), Some(3.0), Some(3.0)]);
        assert!(matches!(
            standardize_posterior(&f),
            Err(ReportError::Numerical(ref m)) if m.contains("zero variance")
        ));
    }

    #[test]
    fn test_requires_data() {
        let draws = PosteriorDraws::from_columns(vec![("x".to_string(), vec![1.0])]).unwrap();
        let f = StanregFit::new(ModelInfo::new("y ~ x"), draws).unwrap();
        assert!(matches!(
            standardize_posterior(&f),
            Err(ReportError::MissingData(_))
        ));
    }
}
