//! # Text metrics & length adjustment
//!
//! Small, pure helpers used on every generated entry:
//!
//! - [`count_words`]: whitespace word count.
//! - [`clean_generated_text`]: trims the raw model output.
//! - [`check_adherence`]: is a word count inside a tolerance band around a target?
//! - [`smart_truncate`]: cut an overlong entry back to the target length.
//! - [`estimate_token_budget`] / [`overshoot_margin`]: the numbers the generator
//!   derives from a target word count.
//!
//! Truncation is purely word based. It does not look for sentence boundaries.
//!
//! ```rust
//! use synth_journal::text::{check_adherence, smart_truncate, count_words};
//!
//! let a = check_adherence(90, 100, 0.5);
//! assert!(a.is_adherent);
//! assert!((a.deviation + 0.10).abs() < 1e-12);
//!
//! let long = "one two three four five six";
//! assert_eq!(count_words(&smart_truncate(long, 3, 1)), 3);
//! ```

/// Default tolerance band for [`check_adherence`], as a fraction of the target.
pub const DEFAULT_TOLERANCE: f64 = 0.20;

/// Result of comparing a word count against its target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adherence {
    /// Whether the count lies inside the tolerance band (bounds inclusive).
    pub is_adherent: bool,
    /// Signed relative deviation `(actual - target) / target`; `0.0` when the target is zero.
    pub deviation: f64,
}

/// Count whitespace separated words. Empty or whitespace-only text has zero words.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Trim leading and trailing whitespace from raw model output. Nothing else is touched.
pub fn clean_generated_text(text: &str) -> String {
    text.trim().to_string()
}

/// Check whether `actual` lies within `tolerance` (a fraction, e.g. `0.2`) of `target`.
///
/// A zero target is only met by a zero count, and its deviation is reported as `0.0`.
pub fn check_adherence(actual: usize, target: usize, tolerance: f64) -> Adherence {
    if target == 0 {
        return Adherence {
            is_adherent: actual == 0,
            deviation: 0.0,
        };
    }

    let target = target as f64;
    let actual = actual as f64;
    let lower_bound = target * (1.0 - tolerance);
    let upper_bound = target * (1.0 + tolerance);

    Adherence {
        is_adherent: lower_bound <= actual && actual <= upper_bound,
        deviation: (actual - target) / target,
    }
}

/// Shorten `text` to `target` words if it runs more than `max_overshoot` words over.
///
/// Text within `target + max_overshoot` words is returned unchanged (original spacing
/// kept). Longer text is cut to its first `target` words, rejoined with single spaces.
pub fn smart_truncate(text: &str, target: usize, max_overshoot: usize) -> String {
    if count_words(text) <= target.saturating_add(max_overshoot) {
        return text.to_string();
    }

    text.split_whitespace()
        .take(target)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Completion token budget used when the caller does not supply one.
///
/// Roughly 1.5 tokens per word plus 30 tokens of headroom, never below 50.
pub fn estimate_token_budget(target_word_count: usize) -> u32 {
    let estimate = (target_word_count as f64 * 1.5) as u64 + 30;
    estimate.clamp(50, u32::MAX as u64) as u32
}

/// Words an entry may run over its target before it gets truncated (10% of the target).
pub fn overshoot_margin(target_word_count: usize) -> usize {
    (target_word_count as f64 * 0.10) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn words(n: usize) -> String {
        (1..=n)
            .map(|i| format!("w{i}"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn count_words_handles_empty_and_whitespace() {
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("   \n\t  "), 0);
        assert_eq!(count_words("Hello world"), 2);
        assert_eq!(count_words("First line.\nSecond line."), 4);
    }

    #[test]
    fn clean_strips_only_outer_whitespace() {
        assert_eq!(clean_generated_text(""), "");
        assert_eq!(clean_generated_text("This is clean."), "This is clean.");
        assert_eq!(
            clean_generated_text("  leading and trailing  "),
            "leading and trailing"
        );
        assert_eq!(clean_generated_text("   \n\t  "), "");
        assert_eq!(clean_generated_text(" a  \n b "), "a  \n b");
    }

    #[test]
    fn adherence_examples() {
        let a = check_adherence(90, 100, 0.5);
        assert!(a.is_adherent);
        assert!((a.deviation - -0.10).abs() < 1e-12);

        let a = check_adherence(20, 100, 0.5);
        assert!(!a.is_adherent);
        assert!((a.deviation - -0.80).abs() < 1e-12);
    }

    #[test]
    fn adherence_band_is_inclusive() {
        let cases = [
            (100, 100, 0.20, true, 0.0),
            (80, 100, 0.20, true, -0.20),
            (120, 100, 0.20, true, 0.20),
            (79, 100, 0.20, false, -0.21),
            (121, 100, 0.20, false, 0.21),
            (44, 50, 0.10, false, -0.12),
            (56, 50, 0.10, false, 0.12),
        ];
        for (actual, target, tol, adherent, dev) in cases {
            let a = check_adherence(actual, target, tol);
            assert_eq!(a.is_adherent, adherent, "{actual} vs {target} @ {tol}");
            assert!((a.deviation - dev).abs() < 1e-9);
        }
    }

    #[test]
    fn adherence_zero_target() {
        assert_eq!(
            check_adherence(0, 0, 0.2),
            Adherence {
                is_adherent: true,
                deviation: 0.0
            }
        );
        assert_eq!(
            check_adherence(10, 0, 0.2),
            Adherence {
                is_adherent: false,
                deviation: 0.0
            }
        );
    }

    #[test]
    fn truncate_thirty_words() {
        let text = words(30);
        let cut = smart_truncate(&text, 15, 5);
        assert_eq!(count_words(&cut), 15);
        assert_eq!(cut, words(15));

        assert_eq!(smart_truncate(&text, 15, 20), text);
    }

    #[test]
    fn truncate_at_exact_boundary_is_noop() {
        let text = words(20);
        assert_eq!(smart_truncate(&text, 15, 5), text);
        assert_eq!(count_words(&smart_truncate(&text, 15, 4)), 15);
    }

    #[test]
    fn truncate_keeps_short_text_verbatim() {
        let text = "This is  short enough.\n";
        assert_eq!(smart_truncate(text, 10, 2), text);
        assert_eq!(smart_truncate("", 0, 0), "");
    }

    #[test]
    fn truncate_collapses_whitespace_when_cutting() {
        let text = "This is the first\n\nsentence. And more words follow here.";
        assert_eq!(smart_truncate(text, 5, 0), "This is the first sentence.");
    }

    #[test]
    fn token_budget_estimate() {
        assert_eq!(estimate_token_budget(0), 50);
        assert_eq!(estimate_token_budget(10), 50);
        assert_eq!(estimate_token_budget(100), 180);
        assert_eq!(estimate_token_budget(60), 120);
    }

    #[test]
    fn overshoot_is_ten_percent() {
        assert_eq!(overshoot_margin(100), 10);
        assert_eq!(overshoot_margin(55), 5);
        assert_eq!(overshoot_margin(9), 0);
    }

    proptest! {
        #[test]
        fn zero_target_adherent_iff_zero(actual in 0usize..10_000, tol in 0.0f64..=1.0) {
            let a = check_adherence(actual, 0, tol);
            prop_assert_eq!(a.is_adherent, actual == 0);
            prop_assert_eq!(a.deviation, 0.0);
        }

        #[test]
        fn adherence_matches_band(actual in 0usize..10_000, target in 1usize..5_000, tol in 0.0f64..=1.0) {
            let a = check_adherence(actual, target, tol);
            let t = target as f64;
            let x = actual as f64;
            prop_assert_eq!(a.is_adherent, t * (1.0 - tol) <= x && x <= t * (1.0 + tol));
            prop_assert_eq!(a.deviation, (x - t) / t);
        }

        #[test]
        fn truncate_noop_iff_within_margin(n in 0usize..200, target in 0usize..100, overshoot in 0usize..50) {
            let text = words(n);
            let out = smart_truncate(&text, target, overshoot);
            if n <= target + overshoot {
                prop_assert_eq!(out, text);
            } else {
                prop_assert_eq!(count_words(&out), target.min(n));
            }
        }

        #[test]
        fn clean_is_idempotent(s in "\\PC*") {
            let once = clean_generated_text(&s);
            prop_assert_eq!(clean_generated_text(&once), once.clone());
        }
    }
}
