//! # Entry generation
//!
//! [`JournalGenerator`] runs one entry through the whole pipeline:
//!
//! ```text
//! tone + target + examples
//!         │ build_prompt
//!         ▼
//!      prompt ──► TextGenerator::generate(prompt, budget)
//!                         │
//!                         ▼
//!                    raw text ──► clean ──► adherence check ──► truncate if too long
//! ```
//!
//! The token budget is the request's `max_tokens` when given, otherwise
//! [`estimate_token_budget`] of the target. An API failure ends the entry with a
//! [`GenerationError`]; nothing is retried.
//!
//! The generator owns its [`TextGenerator`] for the lifetime of a run.

use std::time::Instant;

use tiktoken_rs::{CoreBPE, cl100k_base};
use tracing::{debug, info, warn};

use crate::api::TextGenerator;
use crate::error::{ConfigError, GenerationError};
use crate::prompt::build_prompt;
use crate::text::{
    check_adherence, clean_generated_text, count_words, estimate_token_budget, overshoot_margin,
    smart_truncate,
};
use crate::tone::Tone;

/// Parameters for a single entry.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub tone: Tone,
    pub target_word_count: usize,
    /// How many few-shot examples to ask the seed provider for.
    pub example_count: usize,
    /// Completion token budget; `None` lets the generator estimate one.
    pub max_tokens: Option<u32>,
}

impl GenerationRequest {
    /// The budget actually sent to the API.
    pub fn token_budget(&self) -> u32 {
        match self.max_tokens {
            Some(tokens) if tokens > 0 => tokens,
            _ => estimate_token_budget(self.target_word_count),
        }
    }
}

/// Everything learned while producing one entry.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResult {
    pub raw_text: String,
    pub cleaned_text: String,
    /// The text to export: `cleaned_text`, truncated if it ran too long.
    pub final_text: String,
    /// Words in `cleaned_text`.
    pub word_count: usize,
    pub final_word_count: usize,
    pub is_adherent: bool,
    pub deviation: f64,
    pub truncated: bool,
    pub prompt_tokens: usize,
    pub token_budget: u32,
}

pub struct JournalGenerator<G> {
    llm: G,
    bpe: CoreBPE,
    tolerance: f64,
    context_max_tokens: u32,
}

impl<G: TextGenerator> JournalGenerator<G> {
    /// Build a generator around `llm`.
    ///
    /// # Errors
    /// [`ConfigError::Tokenizer`] if the prompt tokenizer cannot be loaded.
    pub fn new(llm: G, tolerance: f64, context_max_tokens: u32) -> Result<Self, ConfigError> {
        let bpe = cl100k_base().map_err(|e| ConfigError::Tokenizer(e.to_string()))?;
        Ok(Self {
            llm,
            bpe,
            tolerance,
            context_max_tokens,
        })
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn llm(&self) -> &G {
        &self.llm
    }

    /// Generate one entry for `request`, conditioned on `examples`.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        examples: &[String],
    ) -> Result<GenerationResult, GenerationError> {
        let target = request.target_word_count;
        let prompt = build_prompt(request.tone, target, examples);
        let token_budget = request.token_budget();
        let prompt_tokens = self.bpe.encode_with_special_tokens(&prompt).len();

        debug!("Prompt ({} tokens):\n{}", prompt_tokens, prompt);
        if prompt_tokens as u64 + token_budget as u64 > self.context_max_tokens as u64 {
            warn!(
                "Prompt ({} tokens) plus budget ({} tokens) exceeds the model context of {} tokens",
                prompt_tokens, token_budget, self.context_max_tokens
            );
        }

        let started = Instant::now();
        let raw_text = self.llm.generate(&prompt, token_budget).await?;
        info!(
            "LLM generation took {:.2}s (max_tokens={})",
            started.elapsed().as_secs_f64(),
            token_budget
        );

        let cleaned_text = clean_generated_text(&raw_text);
        if cleaned_text.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        let word_count = count_words(&cleaned_text);
        let adherence = check_adherence(word_count, target, self.tolerance);

        let final_text = if adherence.is_adherent {
            info!(
                "Word count {} is within {:.0}% of target {} (deviation {:+.2}%)",
                word_count,
                self.tolerance * 100.0,
                target,
                adherence.deviation * 100.0
            );
            cleaned_text.clone()
        } else if word_count > target {
            info!(
                "Word count {} is over target {} (deviation {:+.2}%), truncating",
                word_count,
                target,
                adherence.deviation * 100.0
            );
            smart_truncate(&cleaned_text, target, overshoot_margin(target))
        } else {
            info!(
                "Word count {} is under target {} (deviation {:+.2}%), using as is",
                word_count,
                target,
                adherence.deviation * 100.0
            );
            cleaned_text.clone()
        };

        if final_text.is_empty() {
            return Err(GenerationError::EmptyAfterTruncation { target });
        }

        let final_word_count = count_words(&final_text);
        let truncated = final_text != cleaned_text;

        Ok(GenerationResult {
            raw_text,
            cleaned_text,
            final_text,
            word_count,
            final_word_count,
            is_adherent: adherence.is_adherent,
            deviation: adherence.deviation,
            truncated,
            prompt_tokens,
            token_budget,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockGenerator;

    fn setup() {
        let _ = tracing_subscriber::fmt::try_init();
    }

    fn words(n: usize) -> String {
        (1..=n)
            .map(|i| format!("w{i}"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn request(target: usize, max_tokens: Option<u32>) -> GenerationRequest {
        GenerationRequest {
            tone: Tone::Nostalgic,
            target_word_count: target,
            example_count: 0,
            max_tokens,
        }
    }

    fn generator(responses: Vec<Result<String, GenerationError>>) -> JournalGenerator<MockGenerator> {
        JournalGenerator::new(MockGenerator::new(responses), 0.2, 8192).unwrap()
    }

    #[test]
    fn tolerance_is_kept() {
        assert_eq!(generator(vec![]).tolerance(), 0.2);
    }

    #[test]
    fn token_budget_prefers_explicit_value() {
        assert_eq!(request(100, Some(120)).token_budget(), 120);
        assert_eq!(request(100, None).token_budget(), 180);
        assert_eq!(request(100, Some(0)).token_budget(), 180);
    }

    #[tokio::test]
    async fn adherent_text_passes_through_cleaned() {
        setup();
        let raw = format!("\n  {}  \n", words(95));
        let generator = generator(vec![Ok(raw.clone())]);

        let result = generator.generate(&request(100, None), &[]).await.unwrap();

        assert_eq!(result.raw_text, raw);
        assert_eq!(result.final_text, words(95));
        assert_eq!(result.word_count, 95);
        assert!(result.is_adherent);
        assert!(!result.truncated);
        assert!((result.deviation - -0.05).abs() < 1e-12);
        assert_eq!(result.token_budget, 180);
        assert!(result.prompt_tokens > 0);
    }

    #[tokio::test]
    async fn long_text_is_truncated_to_target() {
        setup();
        let generator = generator(vec![Ok(words(150))]);

        let result = generator.generate(&request(100, None), &[]).await.unwrap();

        assert!(!result.is_adherent);
        assert!(result.truncated);
        assert_eq!(result.word_count, 150);
        assert_eq!(result.final_word_count, 100);
        assert_eq!(result.final_text, words(100));
    }

    #[tokio::test]
    async fn short_text_is_kept() {
        setup();
        let generator = generator(vec![Ok(words(30))]);

        let result = generator.generate(&request(100, None), &[]).await.unwrap();

        assert!(!result.is_adherent);
        assert!(!result.truncated);
        assert_eq!(result.final_text, words(30));
        assert!((result.deviation - -0.70).abs() < 1e-12);
    }

    #[tokio::test]
    async fn prompt_and_budget_reach_the_llm() {
        setup();
        let generator = generator(vec![Ok(words(60))]);
        let examples = vec!["Old photos tonight.".to_string()];

        generator
            .generate(&request(60, Some(120)), &examples)
            .await
            .unwrap();

        let calls = generator.llm.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (prompt, budget) = &calls[0];
        assert_eq!(*budget, 120);
        assert!(prompt.contains("nostalgic"));
        assert!(prompt.contains("approximately 60 words"));
        assert!(prompt.contains("Example 1: \"Old photos tonight.\""));
    }

    #[tokio::test]
    async fn api_failure_is_propagated() {
        setup();
        let generator = generator(vec![Err(GenerationError::EmptyResponse)]);
        let result = generator.generate(&request(50, None), &[]).await;
        assert!(matches!(result, Err(GenerationError::EmptyResponse)));
    }

    #[tokio::test]
    async fn zero_target_truncates_to_nothing() {
        setup();
        let generator = generator(vec![Ok(words(12))]);
        let result = generator.generate(&request(0, None), &[]).await;
        assert!(matches!(
            result,
            Err(GenerationError::EmptyAfterTruncation { target: 0 })
        ));
    }

    #[tokio::test]
    async fn whitespace_only_response_is_empty() {
        setup();
        let generator = generator(vec![Ok("   \n\t".to_string())]);
        let result = generator.generate(&request(50, None), &[]).await;
        assert!(matches!(result, Err(GenerationError::EmptyResponse)));
    }
}
