//! Data structures for posterior reporting.

pub mod draws;
mod formula;
mod frame;
mod model;

pub use draws::{classify, classify_with_data, ParameterRole, PosteriorDraws};
pub use formula::{Formula, Term};
pub use frame::{Column, ColumnData, DataFrame};
pub use model::{ModelInfo, StanregFit};
