//! Posterior visualizations.

pub mod svg;
pub mod violin;

pub use svg::{render_svg, save_svg};
pub use violin::{violin_artifact, violin_entry, ViolinArtifact, ViolinEntry, ViolinMeta, VIOLIN_SCHEMA};
