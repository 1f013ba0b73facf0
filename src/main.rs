use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, warn};

use lead_filter::config::{ConfigStore, FilterConfig, DEFAULT_CONFIG_PATH};
use lead_filter::evaluation::{
    check_baseline, evaluate, load_labeled_dir, load_labeled_file, DEFAULT_DATA_DIR,
    GOLDEN_SET_PATH, LABELED_DIR,
};
use lead_filter::export::{self, ExportMetadata, DEFAULT_MAX_EXPORT};
use lead_filter::output;
use lead_filter::pipeline;
use lead_filter::scoring::{classify, classify_with_title};
use lead_filter::stats::StatsSummary;

const EXIT_SUCCESS: i32 = 0;
const EXIT_USAGE: i32 = 1;
const EXIT_REGRESSION: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Measure precision/recall against labeled data
    Evaluate {
        /// Evaluate the golden set only and enforce its baseline
        #[arg(long, conflicts_with = "file")]
        golden: bool,

        /// Evaluate a single labeled file
        #[arg(long)]
        file: Option<PathBuf>,

        /// Root of the labeled data tree
        #[arg(long, default_value = DEFAULT_DATA_DIR)]
        data_dir: PathBuf,
    },
    /// Score one posting and print its reason trail
    Score {
        #[arg(short, long)]
        description: String,

        #[arg(long)]
        company: Option<String>,

        #[arg(short, long)]
        title: Option<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Filter a JSON array of postings
    Filter {
        #[arg(short, long)]
        input: PathBuf,

        /// Write qualified leads here
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write rejected postings here, in the labeled-data format
        #[arg(long)]
        rejected_out: Option<PathBuf>,

        /// Write run statistics here
        #[arg(long)]
        stats_out: Option<PathBuf>,

        /// Maximum number of rejected postings to export
        #[arg(long, default_value_t = DEFAULT_MAX_EXPORT)]
        max_export: usize,
    },
    /// Load and validate the config, then print a summary
    Validate,
}

/// Document written by `filter --stats-out`
#[derive(Serialize)]
struct RunStats<'a> {
    run_id: &'a str,
    config_version: &'a str,
    filter: StatsSummary,
}

#[derive(Parser, Debug)]
#[command(name = "lead-filter")]
#[command(about = "Rule-based lead qualification for job postings", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to filter config (JSON or YAML)
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { EXIT_USAGE } else { EXIT_SUCCESS };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    if let Err(e) = lead_filter::telemetry::init(cli.verbose) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let start_time = Instant::now();

    let store = ConfigStore::new(&cli.config);
    let config = match store.get() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    let outcome = match cli.command {
        Commands::Evaluate {
            golden,
            file,
            data_dir,
        } => run_evaluate(&config, golden, file, &data_dir, cli.verbose),
        Commands::Score {
            description,
            company,
            title,
            json,
        } => run_score(&config, &description, company.as_deref(), title.as_deref(), json),
        Commands::Filter {
            input,
            output: output_path,
            rejected_out,
            stats_out,
            max_export,
        } => run_filter(
            &config,
            &input,
            output_path.as_deref(),
            rejected_out.as_deref(),
            stats_out.as_deref(),
            max_export,
        ),
        Commands::Validate => {
            println!("{}", output::format_config_summary(&config));
            println!("Config OK: {}", store.path().display());
            Ok(EXIT_SUCCESS)
        }
    };

    debug!(elapsed = ?start_time.elapsed(), "done");

    match outcome {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(EXIT_USAGE);
        }
    }
}

fn run_evaluate(
    config: &FilterConfig,
    golden: bool,
    file: Option<PathBuf>,
    data_dir: &Path,
    verbose: bool,
) -> Result<i32> {
    let (dataset, source) = if golden {
        let path = data_dir.join(GOLDEN_SET_PATH);
        let dataset = load_labeled_file(&path).context("Failed to load golden set")?;
        (dataset, path)
    } else if let Some(path) = file {
        let dataset = load_labeled_file(&path).context("Failed to load labeled file")?;
        (dataset, path)
    } else {
        let dir = data_dir.join(LABELED_DIR);
        let dataset = load_labeled_dir(&dir).context("Failed to load labeled data")?;
        (dataset, dir)
    };
    let source = source.display().to_string();

    if dataset.items.is_empty() {
        eprintln!("No labeled items found in {}", source);
        return Ok(EXIT_USAGE);
    }

    let evaluation = evaluate(&dataset.items, |description, company| {
        classify(description, company, config)
    });

    if verbose {
        println!("Per-item results:");
        println!(
            "{}",
            output::format_item_outcomes(&evaluation.outcomes, output::should_use_colors())
        );
    }
    println!("{}", output::format_evaluation_report(&evaluation, &source));

    let baseline = dataset
        .baseline()
        .with_context(|| format!("Failed to read baseline from {}", source))?;
    match baseline {
        Some(expected) => {
            if let Err(errors) = check_baseline(&evaluation.matrix, &expected) {
                eprintln!("Regression against baseline in {}:", source);
                for error in errors {
                    eprintln!("  - {}", error);
                }
                return Ok(EXIT_REGRESSION);
            }
            println!("Baseline matched.");
        }
        None if golden => warn!("golden set has no metadata.baseline; regression check skipped"),
        None => {}
    }

    Ok(EXIT_SUCCESS)
}

fn run_score(
    config: &FilterConfig,
    description: &str,
    company: Option<&str>,
    title: Option<&str>,
    json: bool,
) -> Result<i32> {
    let result = classify_with_title(description, company, title, config);
    if json {
        let out = serde_json::to_string_pretty(&result).context("Failed to serialize result")?;
        println!("{}", out);
    } else {
        println!(
            "{}",
            output::format_score_result(&result, output::should_use_colors())
        );
    }
    Ok(EXIT_SUCCESS)
}

fn run_filter(
    config: &FilterConfig,
    input: &Path,
    output_path: Option<&Path>,
    rejected_out: Option<&Path>,
    stats_out: Option<&Path>,
    max_export: usize,
) -> Result<i32> {
    let run_id = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
    let postings = pipeline::load_postings(input)?;
    let run = pipeline::run_filter(postings, config)?;
    let use_colors = output::should_use_colors();

    println!("{}", output::format_qualified_list(&run.qualified, use_colors));
    println!();
    println!("{}", output::format_filter_stats(&run.stats, use_colors));

    if let Some(path) = output_path {
        export::write_json_atomic(path, &run.qualified)
            .context("Failed to write qualified leads")?;
        eprintln!("Wrote {} qualified leads to {}", run.qualified.len(), path.display());
    }

    if let Some(path) = rejected_out {
        let items = export::export_rejected(&run.rejected, max_export);
        let metadata = ExportMetadata::new(run_id.clone(), items.len(), run.rejected.len());
        export::write_labeled_export(path, &items, &metadata)
            .context("Failed to export rejected leads")?;
        eprintln!(
            "Exported {} of {} rejected postings to {}",
            items.len(),
            run.rejected.len(),
            path.display()
        );
    }

    if let Some(path) = stats_out {
        let stats = RunStats {
            run_id: &run_id,
            config_version: &config.version,
            filter: run.stats.summary(),
        };
        export::write_json_atomic(path, &stats).context("Failed to write run statistics")?;
    }

    Ok(EXIT_SUCCESS)
}
