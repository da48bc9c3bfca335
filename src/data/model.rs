//! Description of a fitted Bayesian regression model.

use crate::data::draws::{classify_with_data, is_diagnostic, ParameterRole, PosteriorDraws};
use crate::data::{DataFrame, Formula};
use crate::error::{ReportError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_family() -> String {
    "gaussian".to_string()
}

fn default_link() -> String {
    "identity".to_string()
}

fn default_algorithm() -> String {
    "sampling".to_string()
}

fn default_chains() -> usize {
    4
}

fn default_iter() -> usize {
    2000
}

fn default_thin() -> usize {
    1
}

/// Sampling settings and model specification recorded by the modeling library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model formula, e.g. `y ~ x + group`.
    pub formula: String,
    /// Response distribution family.
    #[serde(default = "default_family")]
    pub family: String,
    /// Link function.
    #[serde(default = "default_link")]
    pub link: String,
    /// Estimation algorithm (`sampling`, `meanfield`, ...).
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
    /// Number of Markov chains.
    #[serde(default = "default_chains")]
    pub chains: usize,
    /// Iterations per chain, warmup included.
    #[serde(default = "default_iter")]
    pub iter: usize,
    /// Warmup iterations per chain; half of `iter` when absent.
    #[serde(default)]
    pub warmup: Option<usize>,
    /// Thinning interval.
    #[serde(default = "default_thin")]
    pub thin: usize,
    /// Free-text prior descriptions.
    #[serde(default)]
    pub priors: Vec<String>,
}

impl ModelInfo {
    /// Minimal info for a formula with library defaults for everything else.
    pub fn new(formula: &str) -> Self {
        Self {
            formula: formula.to_string(),
            family: default_family(),
            link: default_link(),
            algorithm: default_algorithm(),
            chains: default_chains(),
            iter: default_iter(),
            warmup: None,
            thin: default_thin(),
            priors: Vec::new(),
        }
    }

    /// Load from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(ReportError::from)
    }

    /// Load from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Warmup iterations per chain.
    pub fn warmup(&self) -> usize {
        self.warmup.unwrap_or(self.iter / 2)
    }

    /// Expected number of post-warmup draws across all chains.
    pub fn post_warmup_draws(&self) -> usize {
        let thin = self.thin.max(1);
        self.chains * (self.iter.saturating_sub(self.warmup()) / thin)
    }

    /// Whether the model was fitted with MCMC.
    pub fn is_mcmc(&self) -> bool {
        self.algorithm == "sampling"
    }
}

/// A fitted model: its description, posterior draws and optionally the
/// data it was fitted on.
#[derive(Debug, Clone)]
pub struct StanregFit {
    pub info: ModelInfo,
    pub formula: Formula,
    response: String,
    pub draws: PosteriorDraws,
    pub data: Option<DataFrame>,
}

impl StanregFit {
    /// Assemble a fit, parsing the formula from `info`.
    pub fn new(info: ModelInfo, draws: PosteriorDraws) -> Result<Self> {
        let formula = Formula::parse(&info.formula)?;
        let response = formula.require_response()?.to_string();
        let expected = info.post_warmup_draws();
        if info.is_mcmc() && expected != draws.n_draws() {
            tracing::warn!(
                expected,
                actual = draws.n_draws(),
                "number of draws does not match the recorded sampling settings"
            );
        }
        Ok(Self {
            info,
            formula,
            response,
            draws,
            data: None,
        })
    }

    /// Attach the model data.
    ///
    /// The response and every predictor of the formula must be columns of
    /// the data.
    pub fn with_data(mut self, data: DataFrame) -> Result<Self> {
        data.column(&self.response)?;
        for var in self.formula.variables() {
            data.column(var)?;
        }
        self.data = Some(data);
        Ok(self)
    }

    /// Name of the outcome variable.
    pub fn response(&self) -> &str {
        &self.response
    }

    /// Role of a parameter. Factor levels are checked against the data
    /// when it is attached.
    pub fn role(&self, name: &str) -> ParameterRole {
        classify_with_data(name, Some(&self.formula), self.data.as_ref())
    }

    /// Parameter names with their roles, in draw-file order. Diagnostic
    /// columns are left out.
    pub fn parameters(&self) -> Vec<(String, ParameterRole)> {
        self.draws
            .names()
            .iter()
            .filter(|n| !is_diagnostic(n))
            .map(|n| (n.clone(), self.role(n)))
            .collect()
    }

    /// Names of the population-level coefficients, intercept excluded.
    pub fn fixed_effects(&self) -> Vec<&str> {
        self.draws
            .names()
            .iter()
            .filter(|n| self.role(n) == ParameterRole::Fixed)
            .map(String::as_str)
            .collect()
    }
}
