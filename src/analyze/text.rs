//! Narrative description of an analysis.

use crate::analyze::summary::ParameterSummary;
use crate::config::AnalyzeConfig;
use crate::data::{ParameterRole, StanregFit};
use crate::effect::{interpret_r2, EffectSize};

/// Format a number with a fixed number of decimals.
pub(crate) fn format_number(value: f64, digits: usize) -> String {
    format!("{:.*}", digits, value)
}

/// Format a proportion as a percentage with two decimals.
pub(crate) fn format_percent(proportion: f64) -> String {
    format!("{:.2}%", proportion * 100.0)
}

/// Label of a CI mass, e.g. `90%` or `89.5%`.
pub(crate) fn ci_label(ci: f64) -> String {
    let percent = (ci * 10_000.0).round() / 100.0;
    if percent.fract() == 0.0 {
        format!("{:.0}%", percent)
    } else {
        format!("{}%", percent)
    }
}

fn interval(summary: &ParameterSummary, config: &AnalyzeConfig) -> String {
    format!(
        "{} CI [{}, {}]",
        ci_label(summary.ci.ci),
        format_number(summary.ci.low, config.digits),
        format_number(summary.ci.high, config.digits)
    )
}

fn estimate(summary: &ParameterSummary, config: &AnalyzeConfig) -> String {
    format!(
        "{} ({} = {}, {})",
        format_number(summary.center(config.index), config.digits),
        ParameterSummary::spread_name(config.index),
        format_number(summary.spread(config.index), config.digits),
        interval(summary, config)
    )
}

/// Sentence describing the fitting procedure.
pub fn model_sentence(fit: &StanregFit) -> String {
    let info = &fit.info;
    if info.is_mcmc() {
        format!(
            "We fitted a Markov Chain Monte Carlo {} (link = {}) model ({} chains, each with iter = {}; warmup = {}; thin = {}; post-warmup = {}) to predict {} (formula = {}).",
            info.family,
            info.link,
            info.chains,
            info.iter,
            info.warmup(),
            info.thin,
            fit.draws.n_draws(),
            fit.response(),
            fit.formula
        )
    } else {
        format!(
            "We fitted a {} (link = {}) model using the {} algorithm ({} draws) to predict {} (formula = {}).",
            info.family,
            info.link,
            info.algorithm,
            fit.draws.n_draws(),
            fit.response(),
            fit.formula
        )
    }
}

/// Sentence listing the priors, if any were recorded.
pub fn priors_sentence(fit: &StanregFit) -> Option<String> {
    if fit.info.priors.is_empty() {
        return None;
    }
    Some(format!(
        "The priors were set as follows: {}.",
        fit.info.priors.join("; ")
    ))
}

fn r2_sentence(summary: &ParameterSummary, config: &AnalyzeConfig) -> String {
    let center = summary.center(config.index);
    format!(
        "The model has an explanatory power (R2) of about {} ({} CI [{}, {}]), considered {}.",
        format_percent(center),
        ci_label(summary.ci.ci),
        format_percent(summary.ci.low),
        format_percent(summary.ci.high),
        interpret_r2(center)
    )
}

fn intercept_sentence(summary: &ParameterSummary, config: &AnalyzeConfig) -> String {
    format!("The intercept is at {}.", estimate(summary, config))
}

fn sigma_sentence(summary: &ParameterSummary, config: &AnalyzeConfig) -> String {
    format!(
        "The residual standard deviation (sigma) is estimated at {}.",
        estimate(summary, config)
    )
}

fn auxiliary_sentence(summary: &ParameterSummary, config: &AnalyzeConfig) -> String {
    let kind = if summary.role == ParameterRole::GroupLevel {
        "group-level parameter"
    } else {
        "parameter"
    };
    format!(
        "The {} {} is estimated at {}.",
        kind,
        summary.name,
        estimate(summary, config)
    )
}

fn effect_sentence(effect: &EffectSize, config: &AnalyzeConfig) -> String {
    let ranked: Vec<String> = effect
        .ranked()
        .into_iter()
        .filter(|p| p.probability > 0.0)
        .enumerate()
        .map(|(i, p)| {
            if i == 0 {
                format!("{} chance of being {}", format_percent(p.probability), p.magnitude)
            } else {
                format!("{} of being {}", format_percent(p.probability), p.magnitude)
            }
        })
        .collect();
    format!(
        "The standardized effect is {} ({}). It has {}.",
        format_number(effect.median, config.digits),
        effect.magnitude,
        ranked.join(", ")
    )
}

/// Bullet describing one population-level coefficient.
pub fn coefficient_sentence(summary: &ParameterSummary, config: &AnalyzeConfig) -> String {
    let mut sentence = format!(
        "  - The effect of {} has a probability of {} of being {} ({} = {}, {} = {}, {}, Overlap = {}).",
        summary.name,
        format_percent(summary.direction.mpe),
        summary.direction.direction,
        config.index.name(),
        format_number(summary.center(config.index), config.digits),
        ParameterSummary::spread_name(config.index),
        format_number(summary.spread(config.index), config.digits),
        interval(summary, config),
        format_percent(summary.overlap)
    );
    if let Some(rope) = &summary.rope {
        sentence.push_str(&format!(
            " The ROPE [{}, {}] covers {} of the {} CI (decision: {}).",
            format_number(rope.low, config.digits),
            format_number(rope.high, config.digits),
            format_percent(rope.percentage),
            ci_label(summary.ci.ci),
            rope.decision.name()
        ));
    }
    if let Some(effect) = &summary.effect {
        sentence.push(' ');
        sentence.push_str(&effect_sentence(effect, config));
    }
    sentence
}

fn of_role(
    parameters: &[ParameterSummary],
    role: ParameterRole,
) -> impl Iterator<Item = &ParameterSummary> {
    parameters.iter().filter(move |p| p.role == role)
}

/// Full narrative, one paragraph or bullet per entry.
pub fn narrative(fit: &StanregFit, parameters: &[ParameterSummary], config: &AnalyzeConfig) -> Vec<String> {
    let mut text = vec![model_sentence(fit)];
    text.extend(priors_sentence(fit));

    for r2 in of_role(parameters, ParameterRole::R2) {
        text.push(r2_sentence(r2, config));
    }
    for intercept in of_role(parameters, ParameterRole::Intercept) {
        text.push(intercept_sentence(intercept, config));
    }
    for sigma in of_role(parameters, ParameterRole::Sigma) {
        text.push(sigma_sentence(sigma, config));
    }
    for other in parameters
        .iter()
        .filter(|p| matches!(p.role, ParameterRole::Auxiliary | ParameterRole::GroupLevel))
    {
        text.push(auxiliary_sentence(other, config));
    }

    let fixed: Vec<&ParameterSummary> = of_role(parameters, ParameterRole::Fixed).collect();
    if !fixed.is_empty() {
        text.push("Within this model:".to_string());
        text.extend(fixed.into_iter().map(|p| coefficient_sentence(p, config)));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::summary::summarize_parameter;
    use crate::config::CentralIndex;
    use crate::data::{ModelInfo, PosteriorDraws};
    use crate::effect::effect_size;

    fn fit(algorithm: &str) -> StanregFit {
        let mut info = ModelInfo::new("y ~ x");
        info.algorithm = algorithm.to_string();
        info.chains = 1;
        info.iter = 8;
        info.priors = vec!["normal(0, 2.5)".to_string()];
        let draws = PosteriorDraws::from_columns(vec![
            ("(Intercept)".to_string(), vec![1.0, 1.2, 0.8, 1.0]),
            ("x".to_string(), vec![0.4, 0.5, 0.6, -0.1]),
        ])
        .unwrap();
        StanregFit::new(info, draws).unwrap()
    }

    #[test]
    fn test_formatting_helpers() {
        assert_eq!(format_number(1.23456, 2), "1.23");
        assert_eq!(format_number(2.0, 0), "2");
        assert_eq!(format_percent(0.875), "87.50%");
        assert_eq!(ci_label(0.9), "90%");
        assert_eq!(ci_label(0.95), "95%");
        assert_eq!(ci_label(0.895), "89.5%");
    }

    #[test]
    fn test_model_sentence() {
        let mcmc = model_sentence(&fit("sampling"));
        assert!(mcmc.starts_with("We fitted a Markov Chain Monte Carlo gaussian (link = identity)"));
        assert!(mcmc.contains("1 chains, each with iter = 8; warmup = 4; thin = 1; post-warmup = 4"));
        assert!(mcmc.contains("to predict y (formula = y ~ x)"));

        let vb = model_sentence(&fit("meanfield"));
        assert!(vb.contains("using the meanfield algorithm (4 draws)"));
    }

    #[test]
    fn test_priors_sentence() {
        let f = fit("sampling");
        assert_eq!(
            priors_sentence(&f).unwrap(),
            "The priors were set as follows: normal(0, 2.5)."
        );
        let mut bare = f.clone();
        bare.info.priors.clear();
        assert!(priors_sentence(&bare).is_none());
    }

    #[test]
    fn test_coefficient_sentence() {
        let config = AnalyzeConfig::default();
        let draws = [0.4, 0.5, 0.6, -0.1];
        let summary = summarize_parameter("x", ParameterRole::Fixed, &draws, &config).unwrap();
        let sentence = coefficient_sentence(&summary, &config);
        assert!(sentence.starts_with("  - The effect of x has a probability of 75.00% of being positive"));
        assert!(sentence.contains("(Median = 0.45, MAD = "));
        assert!(sentence.contains("90% CI ["));
        assert!(sentence.contains("Overlap = "));
        assert!(!sentence.contains("ROPE"));

        let mean_config = AnalyzeConfig {
            index: CentralIndex::Mean,
            rope: Some([-0.1, 0.1]),
            ..AnalyzeConfig::default()
        };
        let summary = summarize_parameter("x", ParameterRole::Fixed, &draws, &mean_config).unwrap();
        let sentence = coefficient_sentence(&summary, &mean_config);
        assert!(sentence.contains("(Mean = 0.35, SD = "));
        assert!(sentence.contains("The ROPE [-0.10, 0.10] covers"));
    }

    #[test]
    fn test_effect_sentence_lists_nonzero_classes() {
        let config = AnalyzeConfig::default();
        let effect = effect_size(&[0.9, 1.0, 1.1, 0.6]).unwrap();
        let sentence = effect_sentence(&effect, &config);
        assert!(sentence.starts_with("The standardized effect is 0.95 (large)."));
        assert!(sentence.contains("75.00% chance of being large, 25.00% of being medium."));
        assert!(!sentence.contains("small"));
    }

    #[test]
    fn test_narrative_order() {
        let f = fit("sampling");
        let config = AnalyzeConfig::default();
        let parameters = vec![
            summarize_parameter("(Intercept)", ParameterRole::Intercept, &[1.0, 1.2, 0.8, 1.0], &config)
                .unwrap(),
            summarize_parameter("x", ParameterRole::Fixed, &[0.4, 0.5, 0.6, -0.1], &config).unwrap(),
        ];
        let text = narrative(&f, &parameters, &config);
        assert_eq!(text.len(), 5);
        assert!(text[0].starts_with("We fitted"));
        assert!(text[1].starts_with("The priors"));
        assert!(text[2].starts_with("The intercept is at 1.00"));
        assert_eq!(text[3], "Within this model:");
        assert!(text[4].contains("The effect of x"));
    }
}
