//! Integration tests for the posterior report of a regression fit.

use bayes_report::prelude::*;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::io::Write;
use tempfile::NamedTempFile;

const N_DRAWS: usize = 2000;

fn normal_draws(rng: &mut StdRng, mean: f64, sd: f64) -> Vec<f64> {
    let dist = Normal::new(mean, sd).unwrap();
    (0..N_DRAWS).map(|_| dist.sample(rng)).collect()
}

/// Draws CSV as exported by the modeling library, with a sampler column.
fn write_draws_csv() -> NamedTempFile {
    let mut rng = StdRng::seed_from_u64(42);
    let columns = vec![
        ("(Intercept)", normal_draws(&mut rng, 2.0, 0.2)),
        ("x", normal_draws(&mut rng, 0.5, 0.1)),
        ("groupB", normal_draws(&mut rng, -0.02, 0.1)),
        ("sigma", normal_draws(&mut rng, 1.0, 0.05)),
        ("R2", normal_draws(&mut rng, 0.3, 0.02)),
        ("lp__", normal_draws(&mut rng, -120.0, 2.0)),
    ];

    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "# exported posterior draws").unwrap();
    let header: Vec<String> = columns.iter().map(|(n, _)| format!("\"{}\"", n)).collect();
    writeln!(file, "{}", header.join(",")).unwrap();
    for i in 0..N_DRAWS {
        let row: Vec<String> = columns.iter().map(|(_, v)| format!("{}", v[i])).collect();
        writeln!(file, "{}", row.join(",")).unwrap();
    }
    file.flush().unwrap();
    file
}

fn write_model_yaml() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "formula: y ~ x + group").unwrap();
    writeln!(file, "chains: 4").unwrap();
    writeln!(file, "iter: 1000").unwrap();
    writeln!(file, "priors:").unwrap();
    writeln!(file, "  - \"coefficients ~ normal(0, 2.5)\"").unwrap();
    file.flush().unwrap();
    file
}

fn write_data_tsv() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "y\tx\tgroup").unwrap();
    for i in 0..20 {
        let x = i as f64 / 4.0;
        let group = if i % 2 == 0 { "A" } else { "B" };
        let y = 2.0 + 0.5 * x + if i % 3 == 0 { 0.7 } else { -0.4 };
        writeln!(file, "{}\t{}\t{}", y, x, group).unwrap();
    }
    file.flush().unwrap();
    file
}

fn load_fit(with_data: bool) -> StanregFit {
    let draws_file = write_draws_csv();
    let model_file = write_model_yaml();
    let info = ModelInfo::from_yaml_file(model_file.path()).unwrap();
    let draws = PosteriorDraws::from_csv(draws_file.path()).unwrap();
    let fit = StanregFit::new(info, draws).unwrap();
    if with_data {
        let data = DataFrame::from_tsv(write_data_tsv().path()).unwrap();
        fit.with_data(data).unwrap()
    } else {
        fit
    }
}

#[test]
fn test_report_from_exported_files() {
    let fit = load_fit(false);
    assert_eq!(fit.draws.n_draws(), N_DRAWS);
    assert!(!fit.draws.has_parameter("lp__"));

    let analysis = analyze(&fit, &AnalyzeConfig::default()).unwrap();
    let names: Vec<&str> = analysis.parameters.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["(Intercept)", "x", "groupB", "sigma", "R2"]);

    let x = analysis.get("x").unwrap();
    assert_eq!(x.role, ParameterRole::Fixed);
    assert_eq!(x.direction.direction, Direction::Positive);
    assert!(x.direction.mpe > 0.99);
    assert!(x.ci.contains(0.5));
    assert!(x.ci.low > 0.2 && x.ci.high < 0.8);
    assert!(x.overlap < 0.2);

    let g = analysis.get("groupB").unwrap();
    assert!(g.direction.mpe < 0.75);
    assert!(g.ci.contains(0.0));
    assert!(g.overlap > 0.5);

    let text = analysis.text();
    assert!(text.starts_with("We fitted a Markov Chain Monte Carlo gaussian"));
    assert!(text.contains("post-warmup = 2000"));
    assert!(text.contains("The priors were set as follows: coefficients ~ normal(0, 2.5)."));
    assert!(text.contains("explanatory power (R2)"));
    assert!(text.contains("considered large"));
    assert!(text.contains("The residual standard deviation (sigma)"));
    assert!(text.contains("  - The effect of x has a probability of"));
    assert!(text.contains("  - The effect of groupB"));
}

#[test]
fn test_report_with_effect_sizes_and_rope() {
    let fit = load_fit(true);
    let config = AnalyzeConfig {
        effsize: true,
        rope: Some([-0.05, 0.05]),
        ..AnalyzeConfig::default()
    };
    let analysis = analyze(&fit, &config).unwrap();

    let x = analysis.get("x").unwrap();
    let effect = x.effect.as_ref().unwrap();
    assert_eq!(effect.direction, Direction::Positive);
    let total: f64 = effect.probabilities.iter().map(|p| p.probability).sum();
    assert!((total - 1.0).abs() < 1e-9);
    assert_eq!(x.rope.unwrap().decision, RopeDecision::Reject);

    let g = analysis.get("groupB").unwrap();
    assert!(g.effect.is_some());
    assert_eq!(g.rope.unwrap().decision, RopeDecision::Undecided);

    assert!(analysis.get("sigma").unwrap().effect.is_none());
    assert!(analysis.text().contains("The standardized effect is"));
}

#[test]
fn test_report_outputs() {
    let analysis = analyze(&load_fit(false), &AnalyzeConfig::default()).unwrap();
    let dir = tempfile::tempdir().unwrap();

    let tsv_path = dir.path().join("summary.tsv");
    analysis.to_tsv(&tsv_path).unwrap();
    let tsv = std::fs::read_to_string(&tsv_path).unwrap();
    assert_eq!(tsv.lines().count(), 6);

    let svg_path = dir.path().join("posteriors.svg");
    save_svg(&render_svg(&analysis.plot).unwrap(), &svg_path).unwrap();
    let svg = std::fs::read_to_string(&svg_path).unwrap();
    assert_eq!(svg.matches("<polygon").count(), 2);

    let plot: serde_json::Value = serde_json::from_str(&analysis.plot.to_json().unwrap()).unwrap();
    assert_eq!(plot["schema_version"], "bayes_report_violin_v0");
    assert_eq!(plot["parameters"].as_array().unwrap().len(), 2);

    let md = analysis.to_markdown();
    assert!(md.contains("| groupB |"));
}

#[test]
fn test_effect_sizes_without_data_fail() {
    let config = AnalyzeConfig {
        effsize: true,
        ..AnalyzeConfig::default()
    };
    let err = analyze(&load_fit(false), &config).unwrap_err();
    assert!(matches!(err, ReportError::MissingData(_)));
}

#[test]
fn test_standardize_data_file() {
    let frame = DataFrame::from_tsv(write_data_tsv().path()).unwrap();
    let result = standardize(&frame, &StandardizeOptions::new().except(&["y"])).unwrap();
    assert_eq!(result.transforms.len(), 1);
    assert_eq!(result.skipped, vec!["y".to_string(), "group".to_string()]);

    let x = result.data.numeric_values("x").unwrap();
    assert!(mean(&x).unwrap().abs() < 1e-12);
    assert!((sd(&x).unwrap() - 1.0).abs() < 1e-12);
    assert_eq!(result.data.column_names(), frame.column_names());
}

fn column_with_spread() -> impl Strategy<Value = Vec<Option<f64>>> {
    prop::collection::vec(prop::option::weighted(0.8, -1e3..1e3f64), 3..60).prop_filter(
        "needs two distinct observed values",
        |values| {
            let present: Vec<f64> = values.iter().flatten().copied().collect();
            present.len() >= 2 && sd(&present).map_or(false, |s| s > 1.0)
        },
    )
}

proptest! {
    #[test]
    fn prop_zscore_centres_and_scales(values in column_with_spread()) {
        let frame = DataFrame::new(vec![Column {
            name: "v".to_string(),
            data: ColumnData::Numeric(values.clone()),
        }])
        .unwrap();
        let result = standardize(&frame, &StandardizeOptions::new()).unwrap();
        let column = result.data.column("v").unwrap().data.as_numeric().unwrap().to_vec();

        for (before, after) in values.iter().zip(column.iter()) {
            prop_assert_eq!(before.is_none(), after.is_none());
        }
        let present: Vec<f64> = column.iter().flatten().copied().collect();
        prop_assert!(mean(&present).unwrap().abs() < 1e-9);
        prop_assert!((sd(&present).unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn prop_normalize_stays_in_unit_interval(values in column_with_spread()) {
        let frame = DataFrame::new(vec![Column {
            name: "v".to_string(),
            data: ColumnData::Numeric(values),
        }])
        .unwrap();
        let result = standardize(&frame, &StandardizeOptions::new().normalize()).unwrap();
        let present = result.data.numeric_values("v").unwrap();
        for v in present {
            prop_assert!((-1e-12..=1.0 + 1e-12).contains(&v));
        }
    }
}
