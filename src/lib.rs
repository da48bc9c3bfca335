//! Bayesian Regression Reporting Library
//!
//! This library turns the posterior draws of a Bayesian regression model
//! (as exported by an MCMC modeling library) into summary tables, a
//! human-readable narrative and posterior plots.
//!
//! # Overview
//!
//! The library is organized into modules:
//!
//! - **data**: Posterior draws, model description, formula and data frame
//! - **stats**: Posterior statistics (MAD, HDI, probability of direction, ROPE, density)
//! - **effect**: Effect sizes and rules of thumb for interpreting them
//! - **standardize**: Z-scoring of data frames and standardized coefficients
//! - **analyze**: Per-parameter summaries and the narrative report
//! - **viz**: Violin/box plot artifact and SVG rendering
//! - **config**: Analysis settings
//!
//! # Example
//!
//! ```no_run
//! use bayes_report::prelude::*;
//!
//! let info = ModelInfo::from_yaml_file("model.yaml").unwrap();
//! let draws = PosteriorDraws::from_csv("draws.csv").unwrap();
//! let data = DataFrame::from_tsv("data.tsv").unwrap();
//! let fit = StanregFit::new(info, draws).unwrap().with_data(data).unwrap();
//!
//! let config = AnalyzeConfig {
//!     effsize: true,
//!     ..AnalyzeConfig::default()
//! };
//! let analysis = analyze(&fit, &config).unwrap();
//! println!("{}", analysis.text());
//! ```

pub mod analyze;
pub mod config;
pub mod data;
pub mod effect;
pub mod error;
pub mod standardize;
pub mod stats;
pub mod viz;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::analyze::{analyze, summarize_parameter, Analysis, ParameterSummary};
    pub use crate::config::{AnalyzeConfig, CentralIndex};
    pub use crate::data::{
        classify, Column, ColumnData, DataFrame, Formula, ModelInfo, ParameterRole,
        PosteriorDraws, StanregFit, Term,
    };
    pub use crate::effect::{
        effect_size, interpret_bf, interpret_d, interpret_r, interpret_r2, BayesFactorEvidence,
        EffectMagnitude, EffectSize,
    };
    pub use crate::error::{ReportError, Result};
    pub use crate::standardize::{
        standardize, standardize_posterior, standardize_vec, ScaleMethod, StandardizeOptions,
        Standardized,
    };
    pub use crate::stats::{
        box_stats, density, equal_tailed, hdi, mad, mean, median, overlap,
        probability_of_direction, quantile, rope, sd, CredibleInterval, Direction,
        ProbabilityOfDirection, RopeDecision, RopeResult,
    };
    pub use crate::viz::{render_svg, save_svg, ViolinArtifact};
}
