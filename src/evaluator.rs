//! End-to-End Evaluation
//!
//! Scoring a transliteration system means running it over a held-out set of
//! names and comparing the produced strings against references. The
//! [`Evaluator`] packages that loop: it takes any `&str -> String`
//! transliteration function (typically a closure wrapping tokenizer encode,
//! beam-search decode and tokenizer decode), runs it over the evaluation
//! set, and reports the standard metrics in one [`EvaluationReport`].
//!
//! ## Example
//!
//! ```rust
//! use akshara::{Evaluator, Tokenizer};
//!
//! let tokenizer = Tokenizer::train(&["प्रीतम", "गौड़ा"], 256).unwrap();
//! let evaluator = Evaluator::new(&tokenizer);
//!
//! // An identity "model" gets a perfect score against itself.
//! let sources = ["pritam", "gouda"];
//! let references = ["प्रीतम", "गौड़ा"];
//! let report = evaluator
//!     .evaluate(|source| match source {
//!         "pritam" => "प्रीतम".to_string(),
//!         _ => "गौड़ा".to_string(),
//!     }, &sources, &references)
//!     .unwrap();
//! assert_eq!(report.accuracy, 1.0);
//! ```

use crate::error::Result;
use crate::metrics;
use crate::tokenizer::Tokenizer;

/// Aggregate scores for one evaluation run.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport {
    /// Fraction of hypotheses exactly equal to their reference.
    pub accuracy: f64,
    /// Mean character error rate over decomposed byte units.
    pub char_error_rate: f64,
    /// Mean token error rate under the target tokenizer.
    pub token_error_rate: f64,
    /// Corpus-level smoothed BLEU-4.
    pub bleu: f64,
    /// Number of (source, reference) pairs evaluated.
    pub num_examples: usize,
}

impl EvaluationReport {
    /// Print the report in a fixed, human-readable shape.
    pub fn print(&self) {
        println!("EVALUATION ({} examples):", self.num_examples);
        println!("  > accuracy:         {:.4}", self.accuracy);
        println!("  > char error rate:  {:.4}", self.char_error_rate);
        println!("  > token error rate: {:.4}", self.token_error_rate);
        println!("  > bleu:             {:.4}", self.bleu);
    }
}

/// Runs a transliteration function over an evaluation set and scores it.
///
/// Holds a reference to the target-side tokenizer so token error rate is
/// computed with the same subword vocabulary the system decodes into.
pub struct Evaluator<'a> {
    tgt_tokenizer: &'a Tokenizer,
}

impl<'a> Evaluator<'a> {
    /// Create an evaluator scoring against the given target tokenizer.
    pub fn new(tgt_tokenizer: &'a Tokenizer) -> Self {
        Self { tgt_tokenizer }
    }

    /// Transliterate every source with `transliterate` and score the outputs
    /// against `references`.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if `sources` and `references` differ in length or are
    /// empty.
    pub fn evaluate<F, S>(
        &self,
        transliterate: F,
        sources: &[S],
        references: &[S],
    ) -> Result<EvaluationReport>
    where
        F: Fn(&str) -> String,
        S: AsRef<str>,
    {
        metrics::check_lengths(sources, references)?;

        let hypotheses: Vec<String> = sources
            .iter()
            .map(|s| transliterate(s.as_ref()))
            .collect();
        let references: Vec<&str> = references.iter().map(AsRef::as_ref).collect();
        let hypotheses: Vec<&str> = hypotheses.iter().map(String::as_str).collect();

        Ok(EvaluationReport {
            accuracy: metrics::accuracy(&references, &hypotheses)?,
            char_error_rate: metrics::char_error_rate(&references, &hypotheses)?,
            token_error_rate: metrics::token_error_rate(
                &references,
                &hypotheses,
                self.tgt_tokenizer,
            )?,
            bleu: metrics::bleu(&references, &hypotheses)?,
            num_examples: references.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn tiny_tokenizer() -> Tokenizer {
        Tokenizer::train(&["प्रीतम", "गौड़ा"], 260).unwrap()
    }

    #[test]
    fn test_perfect_system_scores_perfectly() {
        let tokenizer = tiny_tokenizer();
        let evaluator = Evaluator::new(&tokenizer);

        let references = ["प्रीतम", "गौड़ा"];
        let report = evaluator
            .evaluate(
                |source| match source {
                    "pritam" => "प्रीतम".to_string(),
                    _ => "गौड़ा".to_string(),
                },
                &["pritam", "gouda"],
                &references,
            )
            .unwrap();

        assert_eq!(report.num_examples, 2);
        assert_eq!(report.accuracy, 1.0);
        assert_eq!(report.char_error_rate, 0.0);
        assert_eq!(report.token_error_rate, 0.0);
        assert!((report.bleu - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_imperfect_system_is_penalized() {
        let tokenizer = tiny_tokenizer();
        let evaluator = Evaluator::new(&tokenizer);

        // One of two outputs wrong in a single vowel mark.
        let report = evaluator
            .evaluate(
                |source| match source {
                    "pritam" => "प्रितम".to_string(),
                    _ => "गौड़ा".to_string(),
                },
                &["pritam", "gouda"],
                &["प्रीतम", "गौड़ा"],
            )
            .unwrap();

        assert_eq!(report.accuracy, 0.5);
        assert!(report.char_error_rate > 0.0 && report.char_error_rate < 1.0);
        assert!(report.bleu > 0.0 && report.bleu < 1.0);
    }

    #[test]
    fn test_mismatched_lengths_rejected() {
        let tokenizer = tiny_tokenizer();
        let evaluator = Evaluator::new(&tokenizer);

        let result = evaluator.evaluate(str::to_string, &["pritam"], &[]);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }
}
