//! Effect sizes and their interpretation.

pub mod cohen;
pub mod interpret;

pub use cohen::{effect_size, EffectSize, MagnitudeProbability};
pub use interpret::{
    interpret_bf, interpret_d, interpret_r, interpret_r2, BayesFactorEvidence, EffectMagnitude,
};
