//! # Error types
//!
//! Every stage of a run has its own error enum so the orchestration loop can decide
//! what is fatal and what only costs a single entry:
//!
//! | Error | Raised by | Effect on a run |
//! |-------|-----------|-----------------|
//! | [`ConfigError`] | config loading, credential lookup, CLI validation | aborts before any entry |
//! | [`DatasetError`] | seed CSV loading | few-shot prompting disabled |
//! | [`GenerationError`] | the LLM call, length enforcement | entry skipped |
//! | [`ExportError`] | writing the entry file | entry skipped, repeated I/O failures abort |
//!
//! [`RunError`] is what the run loop itself returns when it has to stop.

use std::io;
use std::path::PathBuf;

use async_openai::error::OpenAIError;
use thiserror::Error;

/// Problems with configuration, detected before any generation starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The API key environment variable is unset or empty.
    #[error(
        "API credential not found: set {var} in the environment or in a .env file in the working directory"
    )]
    MissingCredential {
        /// Name of the variable that was consulted
        var: String,
    },

    /// Generation was requested without `--tone`.
    #[error("A tone is required for generation (--tone)")]
    MissingTone,

    /// A tone label that is not part of the supported vocabulary.
    #[error("Unsupported tone '{0}'")]
    UnsupportedTone(String),

    /// `--start_date` could not be parsed as `YYYYMMDD`.
    #[error("Invalid start date '{value}', expected YYYYMMDD: {source}")]
    InvalidStartDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// Tolerance must be a fraction between 0 and 1.
    #[error("Invalid tolerance {0}, expected a value between 0.0 and 1.0")]
    InvalidTolerance(f64),

    /// The configuration file could not be read.
    #[error("Unable to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The configuration file is not valid YAML for [`crate::config::JournalConfig`].
    #[error("Unable to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The per-platform configuration directory could not be determined.
    #[error("Unable to determine config directory")]
    NoConfigDir,

    /// The prompt tokenizer failed to initialize.
    #[error("Unable to load tokenizer: {0}")]
    Tokenizer(String),
}

/// Problems loading the seed example dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Seed dataset not found at {0}")]
    NotFound(PathBuf),

    #[error("Unable to read seed dataset: {0}")]
    Csv(#[from] csv::Error),

    /// Neither a `text` nor an `Answer` column is present.
    #[error("Seed dataset has no text column (expected 'text' or 'Answer')")]
    MissingTextColumn,
}

/// A single entry could not be generated.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The API call failed (network, auth, rate limit, malformed request).
    #[error("LLM request failed: {0}")]
    Api(#[from] OpenAIError),

    /// The API answered but there was no usable text in it.
    #[error("LLM returned an empty response")]
    EmptyResponse,

    /// Nothing was left once the text was cut back to its target length.
    #[error("Entry is empty after truncating to {target} words")]
    EmptyAfterTruncation { target: usize },
}

/// A single entry could not be written to disk.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Refusing to export an empty entry")]
    EmptyEntry,

    #[error("Unable to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Reasons a whole run stops early.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Exports kept failing back to back; the output directory is most likely unusable.
    #[error("Giving up after {count} consecutive export failures, last error: {last}")]
    ExportsFailing {
        count: usize,
        #[source]
        last: ExportError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credential_names_the_variable() {
        let err = ConfigError::MissingCredential {
            var: "OPENAI_API_KEY".to_string(),
        };
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn export_io_error_mentions_path() {
        let err = ExportError::Io {
            path: PathBuf::from("/nope/journal_x.txt"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/nope/journal_x.txt"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn exports_failing_wraps_last_error() {
        let err = RunError::ExportsFailing {
            count: 3,
            last: ExportError::EmptyEntry,
        };
        assert!(err.to_string().contains("3 consecutive"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
