//! Standardization of model data and posterior coefficients.

pub mod frame;
pub mod posterior;

pub use frame::{
    standardize, standardize_vec, ColumnTransform, ScaleMethod, StandardizeOptions, Standardized,
};
pub use posterior::{coefficient_scale, standardize_posterior, CoefficientScale, PredictorKind};
