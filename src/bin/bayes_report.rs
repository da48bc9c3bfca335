//! bayes-report - Bayesian regression reporting CLI
//!
//! Command-line interface for summarizing and describing posterior draws.

use bayes_report::analyze::{analyze, Analysis};
use bayes_report::config::AnalyzeConfig;
use bayes_report::data::{DataFrame, ModelInfo, PosteriorDraws, StanregFit};
use bayes_report::effect::{interpret_bf, interpret_d, interpret_r, interpret_r2};
use bayes_report::error::{ReportError, Result};
use bayes_report::standardize::{standardize, StandardizeOptions};
use bayes_report::viz::{render_svg, save_svg};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::path::PathBuf;

/// Output format of the analyze report
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ReportFormat {
    /// Narrative and summary table
    Text,
    /// Summary table as TSV
    Tsv,
    /// Full report as JSON
    Json,
    /// Narrative and table as Markdown
    Markdown,
}

/// Bayesian regression reporting
#[derive(Parser)]
#[command(name = "bayes-report")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize the posterior of a fitted model
    Analyze {
        /// Path to posterior draws CSV
        #[arg(short, long)]
        draws: PathBuf,

        /// Path to model description YAML
        #[arg(short, long)]
        model: PathBuf,

        /// Path to the model data TSV (required for effect sizes)
        #[arg(long)]
        data: Option<PathBuf>,

        /// Path to analysis configuration YAML
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Credible interval mass (overrides the configuration)
        #[arg(long)]
        ci: Option<f64>,

        /// Compute standardized effect sizes
        #[arg(long)]
        effsize: bool,

        /// Report format
        #[arg(short, long, value_enum, default_value = "text")]
        format: ReportFormat,

        /// Output path (stdout when absent)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write a violin plot of the coefficients as SVG
        #[arg(long)]
        plot: Option<PathBuf>,

        /// Write the violin plot data as JSON
        #[arg(long)]
        plot_json: Option<PathBuf>,
    },

    /// Standardize the numeric columns of a data TSV
    Standardize {
        /// Path to input TSV
        #[arg(short, long)]
        input: PathBuf,

        /// Output path for the standardized TSV
        #[arg(short, long)]
        output: PathBuf,

        /// Only transform these columns (comma-separated)
        #[arg(long, value_delimiter = ',')]
        subset: Option<Vec<String>>,

        /// Leave these columns untouched (comma-separated)
        #[arg(long, value_delimiter = ',')]
        except: Vec<String>,

        /// Rescale to [0, 1] instead of Z-scoring
        #[arg(long)]
        normalize: bool,
    },

    /// Interpret an effect size or Bayes factor
    Interpret {
        /// Standardized difference (Cohen's d)
        #[arg(long)]
        d: Option<f64>,

        /// Correlation coefficient
        #[arg(long)]
        r: Option<f64>,

        /// Coefficient of determination
        #[arg(long)]
        r2: Option<f64>,

        /// Bayes factor
        #[arg(long)]
        bf: Option<f64>,
    },

    /// Write an example analysis configuration
    Example {
        /// Output path for the YAML configuration
        #[arg(short, long, default_value = "analyze.yaml")]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Analyze {
            draws,
            model,
            data,
            config,
            ci,
            effsize,
            format,
            output,
            plot,
            plot_json,
        } => cmd_analyze(
            &draws,
            &model,
            data.as_ref(),
            config.as_ref(),
            ci,
            effsize,
            format,
            output.as_ref(),
            plot.as_ref(),
            plot_json.as_ref(),
        ),

        Commands::Standardize {
            input,
            output,
            subset,
            except,
            normalize,
        } => cmd_standardize(&input, &output, subset, except, normalize),

        Commands::Interpret { d, r, r2, bf } => cmd_interpret(d, r, r2, bf),

        Commands::Example { output } => cmd_example(&output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn render(analysis: &Analysis, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(analysis.to_string()),
        ReportFormat::Tsv => {
            let mut buf = Vec::new();
            analysis.write_tsv(&mut buf)?;
            String::from_utf8(buf).map_err(|e| ReportError::Numerical(e.to_string()))
        }
        ReportFormat::Json => analysis.to_json(),
        ReportFormat::Markdown => Ok(analysis.to_markdown()),
    }
}

/// Summarize the posterior of a fitted model
#[allow(clippy::too_many_arguments)]
fn cmd_analyze(
    draws_path: &PathBuf,
    model_path: &PathBuf,
    data_path: Option<&PathBuf>,
    config_path: Option<&PathBuf>,
    ci: Option<f64>,
    effsize: bool,
    format: ReportFormat,
    output_path: Option<&PathBuf>,
    plot_path: Option<&PathBuf>,
    plot_json_path: Option<&PathBuf>,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => {
            eprintln!("Loading analysis configuration from {:?}...", path);
            AnalyzeConfig::from_yaml_file(path)?
        }
        None => AnalyzeConfig::default(),
    };
    if let Some(ci) = ci {
        config.ci = ci;
    }
    if effsize {
        config.effsize = true;
    }

    eprintln!("Loading model from {:?}...", model_path);
    let info = ModelInfo::from_yaml_file(model_path)?;

    eprintln!("Loading posterior draws from {:?}...", draws_path);
    let draws = PosteriorDraws::from_csv(draws_path)?;
    eprintln!(
        "Loaded {} draws x {} parameters",
        draws.n_draws(),
        draws.n_parameters()
    );

    let mut fit = StanregFit::new(info, draws)?;
    if let Some(path) = data_path {
        eprintln!("Loading model data from {:?}...", path);
        let data = DataFrame::from_tsv(path)?;
        fit = fit.with_data(data)?;
    }

    eprintln!("Analyzing (formula: {}, {}% CI)...", fit.formula, config.ci * 100.0);
    let analysis = analyze(&fit, &config)?;

    let report = render(&analysis, format)?;
    match output_path {
        Some(path) => {
            std::fs::write(path, &report)?;
            eprintln!("Wrote report to {:?}", path);
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            write!(lock, "{}", report)?;
            if !report.ends_with('\n') {
                writeln!(lock)?;
            }
        }
    }

    if let Some(path) = plot_path {
        save_svg(&render_svg(&analysis.plot)?, path)?;
        eprintln!("Wrote violin plot to {:?}", path);
    }
    if let Some(path) = plot_json_path {
        std::fs::write(path, analysis.plot.to_json()?)?;
        eprintln!("Wrote plot data to {:?}", path);
    }

    eprintln!("Done! {} parameters summarized", analysis.parameters.len());
    Ok(())
}

/// Standardize a data TSV
fn cmd_standardize(
    input_path: &PathBuf,
    output_path: &PathBuf,
    subset: Option<Vec<String>>,
    except: Vec<String>,
    normalize: bool,
) -> Result<()> {
    eprintln!("Loading data from {:?}...", input_path);
    let frame = DataFrame::from_tsv(input_path)?;
    eprintln!(
        "Loaded {} rows x {} columns",
        frame.n_rows(),
        frame.n_columns()
    );

    let mut options = StandardizeOptions::new();
    if normalize {
        options = options.normalize();
    }
    options.subset = subset;
    options.except = except;

    let result = standardize(&frame, &options)?;

    eprintln!("Writing standardized data to {:?}...", output_path);
    result.data.to_tsv(output_path)?;

    eprintln!("Done! {} columns transformed", result.transforms.len());
    for t in &result.transforms {
        eprintln!("  {}: center={:.4}, scale={:.4}", t.column, t.center, t.scale);
    }
    if !result.skipped.is_empty() {
        eprintln!("  skipped: {}", result.skipped.join(", "));
    }
    Ok(())
}

/// Interpret effect sizes and Bayes factors
fn cmd_interpret(d: Option<f64>, r: Option<f64>, r2: Option<f64>, bf: Option<f64>) -> Result<()> {
    if d.is_none() && r.is_none() && r2.is_none() && bf.is_none() {
        return Err(ReportError::InvalidParameter(
            "give at least one of --d, --r, --r2, --bf".to_string(),
        ));
    }
    if let Some(d) = d {
        println!("d = {}: {}", d, interpret_d(d));
    }
    if let Some(r) = r {
        println!("r = {}: {}", r, interpret_r(r));
    }
    if let Some(r2) = r2 {
        println!("R2 = {}: {}", r2, interpret_r2(r2));
    }
    if let Some(bf) = bf {
        println!("BF = {}: {}", bf, interpret_bf(bf)?);
    }
    Ok(())
}

/// Generate example analysis configuration
fn cmd_example(output_path: &PathBuf) -> Result<()> {
    let config = AnalyzeConfig {
        effsize: true,
        rope: Some([-0.1, 0.1]),
        ..AnalyzeConfig::default()
    };
    let yaml = config.to_yaml()?;

    std::fs::write(output_path, &yaml)?;
    eprintln!("Wrote example configuration to {:?}", output_path);
    eprintln!();
    eprintln!("Contents:");
    println!("{}", yaml);

    Ok(())
}
