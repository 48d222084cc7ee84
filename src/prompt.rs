//! # Prompt construction
//!
//! Builds the single user prompt sent for each journal entry. The prompt is made of
//! plain sentences joined with spaces:
//!
//! 1. the tone instruction,
//! 2. the target length instruction,
//! 3. an instruction to return only the entry text,
//! 4. either a numbered few-shot block followed by a "based on these examples" closer,
//!    or a plain closer when there are no examples.
//!
//! ```rust
//! use synth_journal::prompt::build_prompt;
//! use synth_journal::tone::Tone;
//!
//! let prompt = build_prompt(Tone::Calm, 80, &["Tea by the window.".to_string()]);
//! assert!(prompt.contains("calm"));
//! assert!(prompt.contains("approximately 80 words"));
//! assert!(prompt.contains("Example 1: \"Tea by the window.\""));
//! ```

use crate::tone::Tone;

const FORMAT_INSTRUCTION: &str = "Generate only the journal entry text itself, without any introductory phrases like 'Here is a journal entry:' or similar. Do not include any titles or extra formatting beyond standard paragraph breaks if needed.";

/// Build the generation prompt for one entry.
pub fn build_prompt(tone: Tone, target_word_count: usize, examples: &[String]) -> String {
    let mut parts = vec![
        format!("Write a journal entry that very much focuses on the tone/style preset: {tone}."),
        format!("The entry must be approximately {target_word_count} words long."),
        FORMAT_INSTRUCTION.to_string(),
    ];

    if examples.is_empty() {
        parts.push("\nWrite the new journal entry now, following all rules above:".to_string());
    } else {
        parts.push("\nHere are some examples of style and tone to guide you:".to_string());
        for (i, example) in examples.iter().enumerate() {
            parts.push(format!("\nExample {}: \"{}\"", i + 1, sanitize_example(example)));
        }
        parts.push(
            "\nBased on these examples, and keeping a similar style and tone, write the new journal entry:"
                .to_string(),
        );
    }

    parts.join(" ")
}

/// Collapse triple quotes so an example cannot break out of its quoting.
fn sanitize_example(example: &str) -> String {
    example.replace("\"\"\"", "\"").replace("'''", "'")
}
