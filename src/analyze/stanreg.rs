//! Posterior report of a fitted regression model.

use crate::analyze::summary::{summarize_parameter, ParameterSummary};
use crate::analyze::text::{ci_label, format_number, format_percent, narrative};
use crate::config::AnalyzeConfig;
use crate::data::{ModelInfo, ParameterRole, StanregFit};
use crate::effect::effect_size;
use crate::error::{ReportError, Result};
use crate::standardize::standardize_posterior;
use crate::viz::{violin_artifact, violin_entry, ViolinArtifact};
use rayon::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info, warn};

/// Result of [`analyze`].
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    /// Model description the report was built from.
    pub model: ModelInfo,
    /// Outcome variable.
    pub response: String,
    /// Number of posterior draws.
    pub n_draws: usize,
    /// One summary per reported parameter, in draw-file order.
    pub parameters: Vec<ParameterSummary>,
    /// Narrative paragraphs and bullets.
    pub text: Vec<String>,
    /// Violin plot of the population-level coefficients.
    #[serde(skip)]
    pub plot: ViolinArtifact,
    /// Settings used.
    pub config: AnalyzeConfig,
}

impl Analysis {
    /// Summary of a parameter by name.
    pub fn get(&self, name: &str) -> Option<&ParameterSummary> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Summaries of the population-level coefficients.
    pub fn fixed(&self) -> Vec<&ParameterSummary> {
        self.parameters
            .iter()
            .filter(|p| p.role == ParameterRole::Fixed)
            .collect()
    }

    /// Narrative as a single string, one entry per line.
    pub fn text(&self) -> String {
        self.text.join("\n")
    }

    /// Write the summary table as TSV.
    pub fn write_tsv<W: Write>(&self, mut writer: W) -> Result<()> {
        writeln!(
            writer,
            "parameter\trole\tmedian\tmad\tmean\tsd\tci\tci_low\tci_high\tdirection\tmpe\toverlap\trope_percentage\trope_decision\teffect_median\teffect_magnitude"
        )?;

        for p in &self.parameters {
            let (rope_percentage, rope_decision) = match &p.rope {
                Some(r) => (format!("{:.4}", r.percentage), r.decision.name().to_string()),
                None => ("NA".to_string(), "NA".to_string()),
            };
            let (effect_median, effect_magnitude) = match &p.effect {
                Some(e) => (format!("{:.6}", e.median), e.magnitude.name().to_string()),
                None => ("NA".to_string(), "NA".to_string()),
            };
            writeln!(
                writer,
                "{}\t{}\t{:.6}\t{:.6}\t{:.6}\t{:.6}\t{}\t{:.6}\t{:.6}\t{}\t{:.4}\t{:.4}\t{}\t{}\t{}\t{}",
                p.name,
                p.role.name(),
                p.median,
                p.mad,
                p.mean,
                p.sd,
                p.ci.ci,
                p.ci.low,
                p.ci.high,
                p.direction.direction.name(),
                p.direction.mpe,
                p.overlap,
                rope_percentage,
                rope_decision,
                effect_median,
                effect_magnitude
            )?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Write the summary table to a TSV file.
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.write_tsv(BufWriter::new(file))
    }

    /// Serialize the report (without the plot) as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(ReportError::from)
    }

    /// Markdown rendering: narrative followed by the summary table.
    pub fn to_markdown(&self) -> String {
        let digits = self.config.digits;
        let index = self.config.index;
        let spread = ParameterSummary::spread_name(index);
        let mut md = String::from("## Bayesian regression report\n\n");
        for line in &self.text {
            md.push_str(line);
            md.push('\n');
        }
        md.push('\n');
        md.push_str(&format!(
            "| Parameter | {} | {} | {} CI | Direction | MPE | Overlap |\n",
            index.name(),
            spread,
            ci_label(self.config.ci)
        ));
        md.push_str("| --- | ---: | ---: | --- | --- | ---: | ---: |\n");
        for p in &self.parameters {
            md.push_str(&format!(
                "| {} | {} | {} | [{}, {}] | {} | {} | {} |\n",
                p.name.replace('|', "\\|"),
                format_number(p.center(index), digits),
                format_number(p.spread(index), digits),
                format_number(p.ci.low, digits),
                format_number(p.ci.high, digits),
                p.direction.direction,
                format_percent(p.direction.mpe),
                format_percent(p.overlap)
            ));
        }
        md
    }
}

impl std::fmt::Display for Analysis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let digits = self.config.digits;
        let index = self.config.index;
        for line in &self.text {
            writeln!(f, "{}", line)?;
        }
        writeln!(f)?;

        let width = self
            .parameters
            .iter()
            .map(|p| p.name.len())
            .max()
            .unwrap_or(0)
            .max("Parameter".len());
        writeln!(
            f,
            "{:<width$}  {:>10}  {:>10}  {:>24}  {:>8}  {:>8}",
            "Parameter",
            index.name(),
            ParameterSummary::spread_name(index),
            format!("{} CI", ci_label(self.config.ci)),
            "MPE",
            "Overlap",
            width = width
        )?;
        for p in &self.parameters {
            writeln!(
                f,
                "{:<width$}  {:>10}  {:>10}  {:>24}  {:>8}  {:>8}",
                p.name,
                format_number(p.center(index), digits),
                format_number(p.spread(index), digits),
                format!(
                    "[{}, {}]",
                    format_number(p.ci.low, digits),
                    format_number(p.ci.high, digits)
                ),
                format_percent(p.direction.mpe),
                format_percent(p.overlap),
                width = width
            )?;
        }
        Ok(())
    }
}

fn is_reported(role: ParameterRole, config: &AnalyzeConfig) -> bool {
    role != ParameterRole::GroupLevel || config.include_group_level
}

/// Summarize the posterior of a fitted model and describe it.
///
/// Parameters are summarized in parallel; the output keeps the column
/// order of the draws. With `config.effsize` the fit must carry its data.
pub fn analyze(fit: &StanregFit, config: &AnalyzeConfig) -> Result<Analysis> {
    config.validate()?;
    if fit.draws.n_draws() < 2 {
        return Err(ReportError::EmptyData(format!(
            "Posterior summaries need at least two draws, got {}",
            fit.draws.n_draws()
        )));
    }
    if config.effsize && fit.data.is_none() {
        return Err(ReportError::MissingData(
            "effect sizes require the model data".to_string(),
        ));
    }

    let selected: Vec<(String, ParameterRole)> = fit
        .parameters()
        .into_iter()
        .filter(|(_, role)| is_reported(*role, config))
        .collect();
    if selected.is_empty() {
        return Err(ReportError::EmptyData(
            "Model has no parameters to report".to_string(),
        ));
    }
    info!(
        n_parameters = selected.len(),
        n_draws = fit.draws.n_draws(),
        ci = config.ci,
        "summarizing posterior"
    );

    let mut parameters = selected
        .par_iter()
        .map(|(name, role)| {
            let draws = fit.draws.parameter(name)?;
            summarize_parameter(name, *role, &draws, config)
        })
        .collect::<Result<Vec<_>>>()?;

    if config.effsize {
        if fit.fixed_effects().is_empty() {
            warn!("model has no population-level coefficients; no effect sizes computed");
        } else {
            let standardized = standardize_posterior(fit)?;
            for summary in parameters
                .iter_mut()
                .filter(|p| p.role == ParameterRole::Fixed)
            {
                let std_draws = standardized.parameter(&summary.name)?;
                summary.effect = Some(effect_size(&std_draws)?);
            }
            debug!(n = standardized.n_parameters(), "standardized coefficients");
        }
    }

    let text = narrative(fit, &parameters, config);

    let entries = parameters
        .par_iter()
        .filter(|p| p.role == ParameterRole::Fixed)
        .map(|p| {
            let draws = fit.draws.parameter(&p.name)?;
            violin_entry(
                &p.name,
                &draws,
                config.ci,
                p.center(config.index),
                config.density_points,
            )
        })
        .collect::<Result<Vec<_>>>()?;
    let plot = violin_artifact(entries, config.ci, "Coefficient")?;

    Ok(Analysis {
        model: fit.info.clone(),
        response: fit.response().to_string(),
        n_draws: fit.draws.n_draws(),
        parameters,
        text,
        plot,
        config: config.clone(),
    })
}
