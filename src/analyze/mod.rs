//! Posterior summaries and narrative report of a fitted regression model.

pub mod stanreg;
pub mod summary;
pub mod text;

pub use stanreg::{analyze, Analysis};
pub use summary::{summarize_parameter, ParameterSummary};
pub use text::{coefficient_sentence, model_sentence, narrative, priors_sentence};
