//! Main module for the Synth Journal CLI application (synth-journal).
//!
//! Parses the command line, installs logging, resolves configuration and the API
//! credential, then runs the generation loop. Configuration problems stop the
//! program before any entry is generated.
//!
//! # Examples
//!
//! Generating a week of entries, two a day:
//!
//! ```sh
//! cargo run -- --tone anxious --num_days 7 --entries_per_day 2
//! synth-journal --tone anxious --num_days 7 --entries_per_day 2
//! ```
//!
//! Writing the default configuration:
//!
//! ```sh
//! synth-journal init
//! ```

use std::{error::Error, fs, path};

use chrono::Local;
use clap::Parser;
use once_cell::sync::OnceCell;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use synth_journal::{
    api::OpenAiGenerator,
    commands::{Cli, Commands, GenerateArgs},
    config::{self, JournalConfig},
    config_dir,
    dataset::{ExampleProvider, SeedDataset},
    error::ConfigError,
    exporter::Exporter,
    generator::JournalGenerator,
    run::{self, RunPlan, parse_start_date},
};

static TRACING: OnceCell<()> = OnceCell::new();

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    TRACING.get_or_init(|| init_tracing(cli.generate.verbose));

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run(cli))
}

/// `RUST_LOG` wins; otherwise `info`, or `debug` with `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Main asynchronous function of the Synth Journal CLI application.
///
/// # Errors
///
/// Returns an error for invalid configuration, a missing credential, or a run
/// aborted by repeated export failures.
async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Some(Commands::Init { force }) => {
            debug!("Initializing configuration");
            init(force)
        }
        None => generate(cli.generate).await,
    }
}

async fn generate(args: GenerateArgs) -> Result<(), Box<dyn Error>> {
    let mut config = config::resolve_config(args.config.as_deref())?;
    if let Some(tolerance) = args.tolerance {
        config::validate_tolerance(tolerance)?;
        config.tolerance = tolerance;
    }
    if let Some(dataset) = &args.dataset {
        config.dataset_path = dataset.clone();
    }
    debug!("Config resolved: {:?}", config);

    let tone = args.tone.ok_or(ConfigError::MissingTone)?;
    let start_date = parse_start_date(args.start_date.as_deref(), Local::now().date_naive())?;
    let api_key = config::resolve_api_key(&config.api_key_env)?;

    let mut examples = if args.num_examples_prompt > 0 {
        match SeedDataset::from_path(&config.dataset_path) {
            Ok(dataset) => ExampleProvider::new(dataset, args.seed),
            Err(e) => {
                warn!("{}; proceeding without few-shot examples", e);
                ExampleProvider::empty()
            }
        }
    } else {
        info!("Skipping seed dataset loading, --num_examples_prompt is 0");
        ExampleProvider::empty()
    };

    let llm = OpenAiGenerator::new(&config, api_key);
    info!("Using model {} at {}", llm.model(), config.api_base);
    let generator = JournalGenerator::new(llm, config.tolerance, config.context_max_tokens)?;
    info!(
        "Word count tolerance: ±{:.0}%",
        generator.tolerance() * 100.0
    );
    let mut exporter = Exporter::new(&args.output_dir);

    let plan = RunPlan {
        num_days: args.num_days,
        entries_per_day: args.entries_per_day,
        avg_word_count: args.avg_word_count,
        tone,
        num_examples: args.num_examples_prompt,
        max_tokens: args.max_tokens(),
        start_date,
        max_consecutive_export_failures: config.max_consecutive_export_failures,
    };

    let summary = run::run(&plan, &mut examples, &generator, &mut exporter).await?;

    let output_dir = path::absolute(&args.output_dir).unwrap_or(args.output_dir);
    println!("Total entries generated: {}", summary.generated.len());
    if !summary.failures.is_empty() {
        println!("Entries that failed: {}", summary.failures.len());
    }
    println!("Entries saved in: {}", output_dir.display());

    Ok(())
}

/// Writes the default configuration to `<config_dir>/config.yaml`.
///
/// # Errors
///
/// Returns an error if the file already exists (without `--force`), or if the
/// directory or file cannot be written.
fn init(force: bool) -> Result<(), Box<dyn Error>> {
    let config_dir = config_dir()?;
    info!("Creating config directory: {}", config_dir.display());
    fs::create_dir_all(&config_dir)?;

    let config_path = config_dir.join("config.yaml");
    if config_path.exists() && !force {
        return Err(format!(
            "{} already exists, pass --force to overwrite it",
            config_path.display()
        )
        .into());
    }

    info!("Creating config file: {}", config_path.display());
    let config_yaml = serde_yaml::to_string(&JournalConfig::default())?;
    fs::write(&config_path, config_yaml)?;
    println!("Wrote {}", config_path.display());

    Ok(())
}
