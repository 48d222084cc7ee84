//! # Seed examples
//!
//! Loads an emotion-labeled CSV of real journal entries and hands out a few of
//! them per generated entry as few-shot examples.
//!
//! ## Dataset layout
//!
//! - One text column, named `text` or `Answer`.
//! - Any number of emotion columns. Headers are mapped onto [`Tone`] with
//!   [`Tone::from_label`], so both `happy` and `Answer.f1.happy.raw` work. Other
//!   headers are ignored.
//! - Emotion cells are truthy when they read `TRUE`/`yes` (any case) or a non-zero
//!   number. Blank cells and `NaN` are false.
//!
//! ```text
//! text,happy,sad
//! "Walked the dog in the sun.",TRUE,FALSE
//! "Missed the bus again.",FALSE,TRUE
//! ```
//!
//! ## Sampling
//!
//! [`ExampleProvider`] owns the RNG. Seed it for reproducible runs; leave the seed
//! out to draw from OS entropy.

use std::io;
use std::path::Path;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index;
use tracing::{debug, info, warn};

use crate::error::DatasetError;
use crate::tone::Tone;

/// One labeled example entry.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedExample {
    pub text: String,
    pub tones: Vec<Tone>,
}

impl SeedExample {
    pub fn has_tone(&self, tone: Tone) -> bool {
        self.tones.contains(&tone)
    }
}

/// Anything the [`ExampleProvider`] can pull matching examples from.
pub trait SeedSource {
    /// All examples labeled with `tone`, in a stable order.
    fn matching(&self, tone: Tone) -> Vec<&SeedExample>;
}

/// The whole seed CSV, held in memory for the duration of a run.
#[derive(Debug, Clone, Default)]
pub struct SeedDataset {
    examples: Vec<SeedExample>,
}

impl SeedDataset {
    pub fn new(examples: Vec<SeedExample>) -> Self {
        Self { examples }
    }

    /// Load a dataset from a CSV file on disk.
    ///
    /// # Errors
    /// [`DatasetError::NotFound`] if the file is missing, otherwise any error from
    /// [`SeedDataset::from_reader`].
    pub fn from_path(path: &Path) -> Result<Self, DatasetError> {
        if !path.is_file() {
            return Err(DatasetError::NotFound(path.to_path_buf()));
        }

        info!("Loading seed dataset: {}", path.display());
        let file = std::fs::File::open(path)
            .map_err(|e| DatasetError::Csv(csv::Error::from(e)))?;
        Self::from_reader(file)
    }

    /// Parse a dataset from any CSV reader.
    pub fn from_reader<R: io::Read>(rdr: R) -> Result<Self, DatasetError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(rdr);

        let headers = reader.headers()?.clone();
        let text_idx = headers
            .iter()
            .position(|h| h == "text")
            .or_else(|| headers.iter().position(|h| h == "Answer"))
            .ok_or(DatasetError::MissingTextColumn)?;

        let tone_columns: Vec<(usize, Tone)> = headers
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != text_idx)
            .filter_map(|(idx, header)| match Tone::from_label(header) {
                Some(tone) => Some((idx, tone)),
                None => {
                    debug!("Ignoring dataset column '{}'", header);
                    None
                }
            })
            .collect();

        for tone in Tone::ALL {
            if !tone_columns.iter().any(|(_, t)| *t == tone) {
                warn!("Emotion column for '{}' not found in dataset, it will be ignored", tone);
            }
        }

        let mut examples = Vec::new();
        for record in reader.records() {
            let record = record?;
            let text = record.get(text_idx).unwrap_or_default().trim();
            if text.is_empty() {
                debug!("Skipping dataset row {:?} with empty text", record.position());
                continue;
            }

            let tones = tone_columns
                .iter()
                .filter(|(idx, _)| record.get(*idx).is_some_and(is_truthy))
                .map(|(_, tone)| *tone)
                .collect();

            examples.push(SeedExample {
                text: text.to_string(),
                tones,
            });
        }

        info!(
            "Seed dataset loaded: {} rows, {} emotion columns",
            examples.len(),
            tone_columns.len()
        );

        Ok(Self { examples })
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn examples(&self) -> &[SeedExample] {
        &self.examples
    }
}

impl SeedSource for SeedDataset {
    fn matching(&self, tone: Tone) -> Vec<&SeedExample> {
        self.examples.iter().filter(|e| e.has_tone(tone)).collect()
    }
}

/// Interpret an emotion cell.
fn is_truthy(cell: &str) -> bool {
    let cell = cell.trim();
    if cell.eq_ignore_ascii_case("true") || cell.eq_ignore_ascii_case("yes") {
        return true;
    }
    match cell.parse::<f64>() {
        Ok(n) => !n.is_nan() && n != 0.0,
        Err(_) => false,
    }
}

/// Hands out few-shot examples for a tone.
///
/// A provider without a source (few-shot disabled, or the dataset failed to load)
/// always returns no examples.
pub struct ExampleProvider<S = SeedDataset> {
    source: Option<S>,
    rng: StdRng,
}

impl<S: SeedSource> ExampleProvider<S> {
    /// Create a provider over `source`. A `seed` makes sampling reproducible.
    pub fn new(source: S, seed: Option<u64>) -> Self {
        Self {
            source: Some(source),
            rng: rng_from(seed),
        }
    }

    /// A provider that never returns examples.
    pub fn empty() -> Self {
        Self {
            source: None,
            rng: rng_from(Some(0)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.source.is_some()
    }

    /// Return up to `count` example texts labeled with `tone`.
    ///
    /// - `count == 0` returns immediately without touching the source.
    /// - Fewer matches than requested returns every match, in dataset order.
    /// - Otherwise `count` matches are sampled without replacement.
    pub fn fetch(&mut self, tone: Tone, count: usize) -> Vec<String> {
        if count == 0 {
            return Vec::new();
        }
        let Some(source) = self.source.as_ref() else {
            return Vec::new();
        };

        let matches = source.matching(tone);
        if matches.is_empty() {
            warn!("No seed examples found for tone '{}'", tone);
            return Vec::new();
        }

        if matches.len() <= count {
            if matches.len() < count {
                warn!(
                    "Found only {} seed examples for tone '{}', requested {}. Using all found.",
                    matches.len(),
                    tone,
                    count
                );
            }
            return matches.into_iter().map(|e| e.text.clone()).collect();
        }

        index::sample(&mut self.rng, matches.len(), count)
            .into_iter()
            .map(|i| matches[i].text.clone())
            .collect()
    }
}

fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}
