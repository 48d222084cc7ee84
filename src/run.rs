//! # Run loop
//!
//! Drives `num_days × entries_per_day` entries through
//! fetch examples → generate → export, strictly one after another.
//!
//! A failed entry (API error, empty response, write error) is logged with its day,
//! entry index, date and tone, recorded in the [`RunSummary`], and the loop moves
//! on. Export failures that keep happening back to back stop the run with
//! [`RunError::ExportsFailing`] once `max_consecutive_export_failures` is reached
//! (`0` disables the limit).

use chrono::{Days, NaiveDate};
use tracing::{error, info, warn};

use crate::api::TextGenerator;
use crate::dataset::{ExampleProvider, SeedSource};
use crate::error::{ConfigError, ExportError, RunError};
use crate::exporter::{Clock, ExportedEntry, Exporter};
use crate::generator::{GenerationRequest, JournalGenerator};
use crate::tone::Tone;

/// What to generate.
#[derive(Debug, Clone, PartialEq)]
pub struct RunPlan {
    pub num_days: usize,
    pub entries_per_day: usize,
    pub avg_word_count: usize,
    pub tone: Tone,
    pub num_examples: usize,
    pub max_tokens: Option<u32>,
    pub start_date: NaiveDate,
    pub max_consecutive_export_failures: usize,
}

impl RunPlan {
    pub fn total_entries(&self) -> usize {
        self.num_days.saturating_mul(self.entries_per_day)
    }

    /// Date of the zero-based `day`, counted from `start_date`.
    pub fn date_for_day(&self, day: usize) -> NaiveDate {
        self.start_date
            .checked_add_days(Days::new(day as u64))
            .unwrap_or(NaiveDate::MAX)
    }

    fn request(&self) -> GenerationRequest {
        GenerationRequest {
            tone: self.tone,
            target_word_count: self.avg_word_count,
            example_count: self.num_examples,
            max_tokens: self.max_tokens,
        }
    }
}

/// One entry that did not make it to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryFailure {
    /// One-based day index.
    pub day: usize,
    /// One-based entry index within the day.
    pub entry: usize,
    pub date: NaiveDate,
    pub tone: Tone,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub generated: Vec<ExportedEntry>,
    pub failures: Vec<EntryFailure>,
}

/// Parse `--start_date` (`YYYYMMDD`), falling back to `today`.
pub fn parse_start_date(value: Option<&str>, today: NaiveDate) -> Result<NaiveDate, ConfigError> {
    match value {
        None => Ok(today),
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y%m%d").map_err(|source| {
            ConfigError::InvalidStartDate {
                value: raw.to_string(),
                source,
            }
        }),
    }
}

/// Generate and export every entry in `plan`.
pub async fn run<G, S, C>(
    plan: &RunPlan,
    examples: &mut ExampleProvider<S>,
    generator: &JournalGenerator<G>,
    exporter: &mut Exporter<C>,
) -> Result<RunSummary, RunError>
where
    G: TextGenerator,
    S: SeedSource,
    C: Clock,
{
    let mut summary = RunSummary::default();
    let mut consecutive_export_failures = 0usize;
    let request = plan.request();

    info!(
        "Generating {} entries ({} days × {}) with tone '{}' into {}",
        plan.total_entries(),
        plan.num_days,
        plan.entries_per_day,
        plan.tone,
        exporter.output_dir().display()
    );

    for day_idx in 0..plan.num_days {
        let day = day_idx + 1;
        let date = plan.date_for_day(day_idx);
        info!("== Day {} of {} (date: {}) ==", day, plan.num_days, date.format("%Y%m%d"));

        for entry in 1..=plan.entries_per_day {
            let tone = plan.tone;
            info!(
                day,
                entry,
                %tone,
                "Generating entry {} of {} for {}",
                entry,
                plan.entries_per_day,
                date.format("%Y%m%d")
            );

            // Fresh examples for every entry keep the prompts varied
            let few_shot = examples.fetch(tone, request.example_count);
            if request.example_count > 0 && examples.is_enabled() && few_shot.is_empty() {
                warn!(day, entry, %tone, "No few-shot examples available for this entry");
            }

            let result = match generator.generate(&request, &few_shot).await {
                Ok(result) => result,
                Err(e) => {
                    error!(day, entry, %tone, "Failed to generate entry: {}", e);
                    summary.failures.push(EntryFailure {
                        day,
                        entry,
                        date,
                        tone,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            match exporter.export(&result.final_text) {
                Ok(exported) => {
                    consecutive_export_failures = 0;
                    info!(
                        day,
                        entry,
                        %tone,
                        "Entry saved ({} words): {}",
                        result.final_word_count,
                        exported.file_path.display()
                    );
                    summary.generated.push(exported);
                }
                Err(e @ ExportError::EmptyEntry) => {
                    warn!(day, entry, %tone, "Skipping empty entry: {}", e);
                    summary.failures.push(EntryFailure {
                        day,
                        entry,
                        date,
                        tone,
                        reason: e.to_string(),
                    });
                }
                Err(e) => {
                    consecutive_export_failures += 1;
                    error!(
                        day,
                        entry,
                        %tone,
                        "Failed to export entry ({} in a row): {}",
                        consecutive_export_failures,
                        e
                    );
                    summary.failures.push(EntryFailure {
                        day,
                        entry,
                        date,
                        tone,
                        reason: e.to_string(),
                    });

                    if export_limit_reached(
                        consecutive_export_failures,
                        plan.max_consecutive_export_failures,
                    ) {
                        return Err(RunError::ExportsFailing {
                            count: consecutive_export_failures,
                            last: e,
                        });
                    }
                }
            }
        }
    }

    info!(
        "Journal generation complete: {} generated, {} failed",
        summary.generated.len(),
        summary.failures.len()
    );
    Ok(summary)
}

fn export_limit_reached(failures: usize, limit: usize) -> bool {
    limit > 0 && failures >= limit
}
