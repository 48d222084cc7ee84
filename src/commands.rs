//! This module defines the command-line interface for the application using `clap`.
//!
//! Generation is the default action, driven by flags. The flag names keep their
//! underscores (`--num_days`, `--avg_word_count`, ...). The `init` subcommand
//! writes a default configuration file instead.
//!
//! # Examples
//!
//! ```sh
//! synth-journal --tone happy --num_days 3 --entries_per_day 2 --avg_word_count 150
//! synth-journal --tone nostalgic --num_examples_prompt 0 --output_dir out/
//! synth-journal init
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::tone::Tone;

/// Represents the parsed command-line arguments.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    long_about = None,
    propagate_version = true,
    color = clap::ColorChoice::Auto,
    args_conflicts_with_subcommands = true,
    subcommand_negates_reqs = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub generate: GenerateArgs,
}

/// Flags for a generation run.
#[derive(Args, Debug, Clone, PartialEq)]
pub struct GenerateArgs {
    /// Number of days to generate entries for.
    #[arg(long = "num_days", default_value_t = 1)]
    pub num_days: usize,

    /// Number of entries to generate per day.
    #[arg(long = "entries_per_day", default_value_t = 1)]
    pub entries_per_day: usize,

    /// Desired average word count for entries.
    #[arg(long = "avg_word_count", default_value_t = 100)]
    pub avg_word_count: usize,

    /// Desired tone/emotion for the entries.
    #[arg(long, value_enum, required = true)]
    pub tone: Option<Tone>,

    /// Directory to save generated .txt files.
    #[arg(long = "output_dir", default_value = "generated_entries")]
    pub output_dir: PathBuf,

    /// Number of dataset examples used in the few-shot prompt. 0 disables them.
    #[arg(long = "num_examples_prompt", default_value_t = 3)]
    pub num_examples_prompt: usize,

    /// Maximum number of tokens the LLM may generate. 0 estimates from --avg_word_count.
    #[arg(long = "max_generation_tokens", default_value_t = 0)]
    pub max_generation_tokens: u32,

    /// First journal date, YYYYMMDD. Defaults to today.
    #[arg(long = "start_date")]
    pub start_date: Option<String>,

    /// Seed dataset CSV. Overrides `dataset_path` from the config file.
    #[arg(long)]
    pub dataset: Option<PathBuf>,

    /// Config file to use instead of <config_dir>/config.yaml.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Seed for example sampling, for reproducible prompts.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Accepted word count deviation as a fraction (e.g. 0.2). Overrides the config file.
    #[arg(long)]
    pub tolerance: Option<f64>,

    /// Log at debug level.
    #[arg(short, long)]
    pub verbose: bool,
}

impl GenerateArgs {
    /// `--max_generation_tokens`, with `0` meaning "let the generator decide".
    pub fn max_tokens(&self) -> Option<u32> {
        (self.max_generation_tokens > 0).then_some(self.max_generation_tokens)
    }
}

/// Represents the available subcommands and their options.
#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Write a default config.yaml to the configuration directory.
    Init {
        /// Overwrite an existing config file.
        #[arg(long)]
        force: bool,
    },
}
