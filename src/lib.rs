//! # Synth Journal (library root)
//!
//! This crate provides the plumbing behind the `synth-journal` CLI, which writes
//! synthetic, emotion-conditioned journal entries with an OpenAI compatible LLM:
//! - Seed dataset loading and few-shot example sampling (`dataset`).
//! - Prompt construction (`prompt`) and word count utilities (`text`).
//! - The LLM seam and its OpenAI binding (`api`).
//! - Single-entry generation with length enforcement (`generator`).
//! - One-file-per-entry export (`exporter`) and the multi-day run loop (`run`).
//! - CLI parsing (`commands`), configuration (`config`) and errors (`error`).
//!
//! The supported tones live in [`tone::Tone`].
//!
//! ## Configuration directory
//! An optional `config.yaml` is read from the per-platform configuration directory
//! returned by [`config_dir`], e.g.:
//!
//! - macOS: `~/Library/Application Support/com.awful-sec.synth-journal`
//! - Linux (XDG): `~/.config/synth-journal`
//! - Windows: `C:\Users\<you>\AppData\Roaming\awful-sec\synth-journal\config`
//!
//! `synth-journal init` writes the defaults there.

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::ConfigError;

pub mod api;
pub mod commands;
pub mod config;
pub mod dataset;
pub mod error;
pub mod exporter;
pub mod generator;
pub mod prompt;
pub mod run;
pub mod text;
pub mod tone;

/// Return the per-platform configuration directory used by Synth Journal.
///
/// This uses [`directories::ProjectDirs`] with the application triple
/// `("com", "awful-sec", "synth-journal")`. The directory is **not** created here.
///
/// # Errors
/// [`ConfigError::NoConfigDir`] if the platform configuration directory cannot be
/// determined (no home directory, heavily sandboxed environments).
///
/// # Examples
/// ```rust
/// if let Ok(cfg) = synth_journal::config_dir() {
///     println!("config at {}", cfg.display());
/// }
/// ```
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("com", "awful-sec", "synth-journal").ok_or(ConfigError::NoConfigDir)?;
    Ok(proj_dirs.config_dir().to_path_buf())
}
