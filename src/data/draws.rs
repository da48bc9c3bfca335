//! Posterior draws exported by the modeling library.

use crate::data::{DataFrame, Formula};
use crate::error::{ReportError, Result};
use nalgebra::DMatrix;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::OnceLock;

/// Columns that describe the sampler or the fit rather than a model parameter.
const DIAGNOSTIC_COLUMNS: &[&str] = &["mean_PPD", "log-posterior"];

/// Distributional parameters of the modeling library's families.
const AUXILIARY_PARAMETERS: &[&str] = &["reciprocal_dispersion", "shape", "lambda", "(phi)", "aux"];

/// Prefixes of indexed auxiliary parameters.
const AUXILIARY_PREFIXES: &[&str] = &["smooth_sd["];

/// Role of a parameter in a regression fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterRole {
    /// The `(Intercept)` coefficient.
    Intercept,
    /// A population-level coefficient.
    Fixed,
    /// Residual standard deviation.
    Sigma,
    /// Bayesian R2.
    R2,
    /// Group-level (random) effect or covariance term.
    GroupLevel,
    /// Any other distributional parameter (dispersion, shape, ...).
    Auxiliary,
}

impl ParameterRole {
    /// Descriptive name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Intercept => "intercept",
            Self::Fixed => "fixed",
            Self::Sigma => "sigma",
            Self::R2 => "r2",
            Self::GroupLevel => "group_level",
            Self::Auxiliary => "auxiliary",
        }
    }
}

fn group_level_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(b|Sigma)\[").expect("valid regex"))
}

/// Whether a column is a sampler or fit diagnostic rather than a parameter.
pub fn is_diagnostic(name: &str) -> bool {
    name.ends_with("__") || DIAGNOSTIC_COLUMNS.contains(&name)
}

/// Whether a parameter name is one of the library's auxiliary parameters.
pub fn is_auxiliary_name(name: &str) -> bool {
    AUXILIARY_PARAMETERS.contains(&name) || AUXILIARY_PREFIXES.iter().any(|p| name.starts_with(p))
}

/// Whether one `:`-separated part of a coefficient name stands for `var`.
///
/// Numeric predictors match exactly. Factor coefficients carry the level
/// as a suffix (`groupB`); with data the suffix must be a level of the
/// column, without data any non-empty suffix is accepted.
fn part_matches(part: &str, var: &str, data: Option<&DataFrame>) -> bool {
    if part == var {
        return true;
    }
    let suffix = match part.strip_prefix(var) {
        Some(s) if !s.is_empty() => s,
        _ => return false,
    };
    match data {
        Some(df) if df.has_column(var) => df
            .levels(var)
            .map_or(false, |levels| levels.iter().any(|l| l == suffix)),
        _ => true,
    }
}

/// Whether a parameter name is a population-level coefficient of
/// `formula`: every `:`-separated part must stand for a predictor.
pub fn is_formula_coefficient(name: &str, formula: &Formula, data: Option<&DataFrame>) -> bool {
    let vars = formula.variables();
    name.split(':')
        .all(|part| vars.iter().any(|v| part_matches(part, v, data)))
}

/// Classify a parameter by name.
///
/// Names that are not recognised and do not look like a coefficient of
/// `formula` are auxiliary. Without a formula every unrecognised name is
/// taken to be a coefficient.
pub fn classify(name: &str, formula: Option<&Formula>) -> ParameterRole {
    classify_with_data(name, formula, None)
}

/// Classify a parameter by name, resolving factor levels against the model
/// data when it is available.
pub fn classify_with_data(
    name: &str,
    formula: Option<&Formula>,
    data: Option<&DataFrame>,
) -> ParameterRole {
    match name {
        "(Intercept)" => ParameterRole::Intercept,
        "sigma" => ParameterRole::Sigma,
        "R2" => ParameterRole::R2,
        _ if group_level_pattern().is_match(name) => ParameterRole::GroupLevel,
        _ => match formula {
            // a predictor may share its name with an auxiliary parameter
            Some(f) if f.uses_variable(name) => ParameterRole::Fixed,
            _ if is_auxiliary_name(name) => ParameterRole::Auxiliary,
            Some(f) if !is_formula_coefficient(name, f, data) => ParameterRole::Auxiliary,
            _ => ParameterRole::Fixed,
        },
    }
}

/// Posterior draws: one row per draw, one column per parameter.
#[derive(Debug, Clone)]
pub struct PosteriorDraws {
    /// Draws × parameters.
    data: DMatrix<f64>,
    /// Parameter names (column names).
    names: Vec<String>,
}

impl PosteriorDraws {
    /// Create from a matrix of draws and parameter names.
    pub fn new(data: DMatrix<f64>, names: Vec<String>) -> Result<Self> {
        if data.ncols() != names.len() {
            return Err(ReportError::DimensionMismatch {
                expected: data.ncols(),
                actual: names.len(),
            });
        }
        if data.nrows() == 0 || data.ncols() == 0 {
            return Err(ReportError::EmptyData(
                "Posterior has no draws or no parameters".to_string(),
            ));
        }
        Ok(Self { data, names })
    }

    /// Create from named columns of draws.
    pub fn from_columns(columns: Vec<(String, Vec<f64>)>) -> Result<Self> {
        let n_draws = columns.first().map(|(_, v)| v.len()).unwrap_or(0);
        for (_, values) in &columns {
            if values.len() != n_draws {
                return Err(ReportError::DimensionMismatch {
                    expected: n_draws,
                    actual: values.len(),
                });
            }
        }
        let names: Vec<String> = columns.iter().map(|(n, _)| n.clone()).collect();
        let flat: Vec<f64> = columns.into_iter().flat_map(|(_, v)| v).collect();
        Self::new(DMatrix::from_column_slice(n_draws, names.len(), &flat), names)
    }

    /// Load draws from a CSV file.
    ///
    /// Accepts both `as.data.frame(fit)` exports and Stan CSV output: lines
    /// starting with `#` are skipped and diagnostic columns (names ending in
    /// `__`, `mean_PPD`, `log-posterior`) are dropped.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut content = String::new();
        file.read_to_string(&mut content)?;
        Self::from_csv_str(&content)
    }

    /// Parse draws from CSV text.
    pub fn from_csv_str(content: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let header: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();
        if header.is_empty() || header.iter().all(|h| h.is_empty()) {
            return Err(ReportError::EmptyData("Draws file has no header".to_string()));
        }

        // a leading unnamed column holds row labels in data-frame exports
        let skip_first = header[0].is_empty();
        let keep: Vec<usize> = header
            .iter()
            .enumerate()
            .filter(|(i, name)| !(skip_first && *i == 0) && !is_diagnostic(name))
            .map(|(i, _)| i)
            .collect();
        if keep.is_empty() {
            return Err(ReportError::EmptyData(
                "Draws file has no model parameters".to_string(),
            ));
        }

        let mut columns: Vec<Vec<f64>> = vec![Vec::new(); keep.len()];
        for (row_idx, record) in reader.records().enumerate() {
            let record = record?;
            for (slot, &col_idx) in keep.iter().enumerate() {
                let raw = record.get(col_idx).unwrap_or("");
                let value: f64 = raw.parse().map_err(|_| ReportError::InvalidValue {
                    value: raw.to_string(),
                    row: row_idx,
                    col: col_idx,
                })?;
                columns[slot].push(value);
            }
        }

        if columns[0].is_empty() {
            return Err(ReportError::EmptyData("Draws file has no draws".to_string()));
        }

        let names = keep.iter().map(|&i| header[i].clone()).collect::<Vec<_>>();
        tracing::debug!(
            n_draws = columns[0].len(),
            n_parameters = names.len(),
            "loaded posterior draws"
        );
        Self::from_columns(names.into_iter().zip(columns).collect())
    }

    /// Number of draws.
    pub fn n_draws(&self) -> usize {
        self.data.nrows()
    }

    /// Number of parameters.
    pub fn n_parameters(&self) -> usize {
        self.data.ncols()
    }

    /// Parameter names in column order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Check if a parameter is present.
    pub fn has_parameter(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Column index of a parameter.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Draws of a single parameter.
    pub fn parameter(&self, name: &str) -> Result<Vec<f64>> {
        let idx = self
            .index_of(name)
            .ok_or_else(|| ReportError::MissingParameter(name.to_string()))?;
        Ok(self.data.column(idx).iter().copied().collect())
    }

    /// Keep only the named parameters, in the given order.
    pub fn select(&self, names: &[&str]) -> Result<Self> {
        let columns = names
            .iter()
            .map(|&n| Ok((n.to_string(), self.parameter(n)?)))
            .collect::<Result<Vec<_>>>()?;
        Self::from_columns(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const STAN_CSV: &str = "\
# model = linear
lp__,accept_stat__,(Intercept),x,sigma
-10.2,0.9,1.0,0.5,2.0
# adaptation info
-10.5,0.8,1.1,0.6,2.1
-10.1,0.95,0.9,0.4,1.9
";

    #[test]
    fn test_parse_stan_csv() {
        let draws = PosteriorDraws::from_csv_str(STAN_CSV).unwrap();
        assert_eq!(draws.n_draws(), 3);
        assert_eq!(draws.names(), &["(Intercept)", "x", "sigma"]);
        assert_eq!(draws.parameter("x").unwrap(), vec![0.5, 0.6, 0.4]);
    }

    #[test]
    fn test_parse_data_frame_export() {
        let csv = "\"\",\"(Intercept)\",\"groupB\",\"mean_PPD\"\n\"1\",1.0,0.2,3.0\n\"2\",1.2,0.3,3.1\n";
        let draws = PosteriorDraws::from_csv_str(csv).unwrap();
        assert_eq!(draws.names(), &["(Intercept)", "groupB"]);
        assert_eq!(draws.parameter("groupB").unwrap(), vec![0.2, 0.3]);
    }

    #[test]
    fn test_invalid_value() {
        let csv = "a,b\n1.0,2.0\n1.5,oops\n";
        let err = PosteriorDraws::from_csv_str(csv).unwrap_err();
        assert!(matches!(err, ReportError::InvalidValue { row: 1, col: 1, .. }));
    }

    #[test]
    fn test_empty_draws() {
        assert!(PosteriorDraws::from_csv_str("a,b\n").is_err());
        assert!(PosteriorDraws::from_csv_str("lp__\n1.0\n").is_err());
    }

    #[test]
    fn test_from_file_and_select() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", STAN_CSV).unwrap();
        file.flush().unwrap();

        let draws = PosteriorDraws::from_csv(file.path()).unwrap();
        let sub = draws.select(&["sigma", "x"]).unwrap();
        assert_eq!(sub.names(), &["sigma", "x"]);
        assert_eq!(sub.parameter("sigma").unwrap(), vec![2.0, 2.1, 1.9]);
        assert!(matches!(
            draws.select(&["nope"]),
            Err(ReportError::MissingParameter(_))
        ));
    }

    #[test]
    fn test_classify() {
        let formula = Formula::parse("y ~ x * group").unwrap();
        let f = Some(&formula);
        assert_eq!(classify("(Intercept)", f), ParameterRole::Intercept);
        assert_eq!(classify("x", f), ParameterRole::Fixed);
        assert_eq!(classify("groupB", f), ParameterRole::Fixed);
        assert_eq!(classify("x:groupB", f), ParameterRole::Fixed);
        assert_eq!(classify("sigma", f), ParameterRole::Sigma);
        assert_eq!(classify("R2", f), ParameterRole::R2);
        assert_eq!(
            classify("b[(Intercept) subject:3]", f),
            ParameterRole::GroupLevel
        );
        assert_eq!(
            classify("Sigma[subject:(Intercept),(Intercept)]", f),
            ParameterRole::GroupLevel
        );
        assert_eq!(classify("reciprocal_dispersion", f), ParameterRole::Auxiliary);
        assert_eq!(classify("anything", None), ParameterRole::Fixed);
    }

    #[test]
    fn test_auxiliary_names_beat_short_predictors() {
        let formula = Formula::parse("y ~ s + r + l").unwrap();
        let f = Some(&formula);
        assert_eq!(classify("s", f), ParameterRole::Fixed);
        assert_eq!(classify("shape", f), ParameterRole::Auxiliary);
        assert_eq!(classify("reciprocal_dispersion", f), ParameterRole::Auxiliary);
        assert_eq!(classify("lambda", f), ParameterRole::Auxiliary);
        assert_eq!(classify("smooth_sd[s(x)1]", f), ParameterRole::Auxiliary);
        assert_eq!(classify("aux", Some(&Formula::parse("y ~ a").unwrap())), ParameterRole::Auxiliary);

        let named = Formula::parse("y ~ shape").unwrap();
        assert_eq!(classify("shape", Some(&named)), ParameterRole::Fixed);
    }

    #[test]
    fn test_factor_levels_resolved_against_data() {
        use crate::data::{Column, ColumnData};

        let data = DataFrame::new(vec![
            Column {
                name: "s".into(),
                data: ColumnData::Numeric(vec![Some(1.0), Some(2.0)]),
            },
            Column {
                name: "g".into(),
                data: ColumnData::Factor(vec![Some("a".into()), Some("b".into())]),
            },
        ])
        .unwrap();
        let formula = Formula::parse("y ~ s * g").unwrap();
        let role = |name| classify_with_data(name, Some(&formula), Some(&data));

        assert_eq!(role("s"), ParameterRole::Fixed);
        assert_eq!(role("gb"), ParameterRole::Fixed);
        assert_eq!(role("s:gb"), ParameterRole::Fixed);
        // prefix of a numeric predictor, or an unknown level
        assert_eq!(role("scale"), ParameterRole::Auxiliary);
        assert_eq!(role("gz"), ParameterRole::Auxiliary);
        assert_eq!(role("s:gz"), ParameterRole::Auxiliary);
        // without data the level cannot be checked
        assert_eq!(classify("gz", Some(&formula)), ParameterRole::Fixed);
    }
}
