//! Sequence Evaluation Metrics
//!
//! Metrics for judging transliteration output against reference strings:
//!
//! - **Accuracy**: exact-match rate. Coarse but unambiguous.
//! - **CER** (character error rate): edit-distance mismatch rate over
//!   character units. Lower is better.
//! - **TER** (token error rate): the same over the tokenizer's subword ids.
//! - **BLEU-4**: corpus-level n-gram overlap with brevity penalty and
//!   smoothing, per Papineni et al., 2002.
//!
//! ## Unit Decomposition
//!
//! Accents and half-letters exist as separate characters in Unicode and can
//! change the interpretation of an output, so character-level metrics compare
//! them individually: strings are NFKD-normalized (splitting combining marks
//! out of precomposed characters) and then compared as UTF-8 byte units. BLEU
//! operates over the same units, not token ids.
//!
//! ## Example
//!
//! ```rust
//! use akshara::metrics;
//!
//! let refs = ["abc", "def"];
//! let hyps = ["abc", "xyz"];
//! assert_eq!(metrics::accuracy(&refs, &hyps).unwrap(), 0.5);
//! ```

use std::collections::HashMap;
use unicode_normalization::UnicodeNormalization;

use crate::error::{Error, Result};
use crate::tokenizer::{TokenId, Tokenizer};

/// Edit operation counts from a Levenshtein alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditCounts {
    /// Insertions plus deletions.
    pub ins_del: usize,
    /// Substitutions.
    pub substitutions: usize,
    /// Exact matches (no-ops).
    pub matches: usize,
}

impl EditCounts {
    /// Total edit distance: insertions + deletions + substitutions.
    pub fn distance(&self) -> usize {
        self.ins_del + self.substitutions
    }

    /// Error rate: edits over total aligned operations. Two empty sequences
    /// produce no operations at all; that degenerate case counts as rate 0.
    pub fn error_rate(&self) -> f64 {
        let total = self.ins_del + self.substitutions + self.matches;
        if total == 0 {
            0.0
        } else {
            self.distance() as f64 / total as f64
        }
    }
}

/// Levenshtein distance with operation counts, over any comparable units.
///
/// Standard `(|a|+1) x (|b|+1)` dynamic program with unit costs. The
/// traceback recovers operation counts, preferring deletion, then insertion,
/// then the diagonal when costs tie — this tie-break affects the individual
/// op counts but never the total distance.
pub fn levenshtein<T: PartialEq>(a: &[T], b: &[T]) -> EditCounts {
    let mut costs = vec![vec![0usize; b.len() + 1]; a.len() + 1];
    for (i, row) in costs.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=b.len() {
        costs[0][j] = j;
    }
    for i in 1..=a.len() {
        for j in 1..=b.len() {
            let substitution = costs[i - 1][j - 1] + usize::from(a[i - 1] != b[j - 1]);
            costs[i][j] = substitution
                .min(costs[i - 1][j] + 1)
                .min(costs[i][j - 1] + 1);
        }
    }

    let (mut ins_del, mut substitutions, mut matches) = (0, 0, 0);
    let (mut i, mut j) = (a.len(), b.len());
    while i > 0 || j > 0 {
        if i > 0 && costs[i][j] == costs[i - 1][j] + 1 {
            ins_del += 1;
            i -= 1;
        } else if j > 0 && costs[i][j] == costs[i][j - 1] + 1 {
            ins_del += 1;
            j -= 1;
        } else if i > 0 && j > 0 {
            if a[i - 1] == b[j - 1] {
                matches += 1;
            } else {
                substitutions += 1;
            }
            i -= 1;
            j -= 1;
        } else {
            break;
        }
    }

    EditCounts {
        ins_del,
        substitutions,
        matches,
    }
}

/// Decompose a string into comparable character units: NFKD normalization
/// followed by UTF-8 bytes, so combining marks are compared individually.
pub fn decompose(s: &str) -> Vec<u8> {
    s.nfkd().collect::<String>().into_bytes()
}

/// Exact-match rate between references and hypotheses.
///
/// # Errors
///
/// `InvalidInput` when the collections differ in length or are empty.
pub fn accuracy<S: AsRef<str>>(references: &[S], hypotheses: &[S]) -> Result<f64> {
    check_lengths(references, hypotheses)?;
    let correct = references
        .iter()
        .zip(hypotheses)
        .filter(|(r, h)| r.as_ref() == h.as_ref())
        .count();
    Ok(correct as f64 / references.len() as f64)
}

/// Character error rate, averaged over all reference/hypothesis pairs.
///
/// Each pair is decomposed into NFKD byte units and aligned with
/// [`levenshtein`]; the pair's rate is `edits / (edits + matches)`.
pub fn char_error_rate<S: AsRef<str>>(references: &[S], hypotheses: &[S]) -> Result<f64> {
    check_lengths(references, hypotheses)?;
    let total: f64 = references
        .iter()
        .zip(hypotheses)
        .map(|(r, h)| levenshtein(&decompose(r.as_ref()), &decompose(h.as_ref())).error_rate())
        .sum();
    Ok(total / references.len() as f64)
}

/// Token error rate: like [`char_error_rate`], but the units are the
/// tokenizer's subword ids (no start/end markers). Depending on the learned
/// merges this can differ substantially from CER.
pub fn token_error_rate<S: AsRef<str>>(
    references: &[S],
    hypotheses: &[S],
    tokenizer: &Tokenizer,
) -> Result<f64> {
    check_lengths(references, hypotheses)?;
    let total: f64 = references
        .iter()
        .zip(hypotheses)
        .map(|(r, h)| {
            let r_tokens = tokenizer.encode(r.as_ref(), false, false);
            let h_tokens = tokenizer.encode(h.as_ref(), false, false);
            levenshtein(&r_tokens, &h_tokens).error_rate()
        })
        .sum();
    Ok(total / references.len() as f64)
}

const BLEU_MAX_ORDER: usize = 4;
/// Smoothed count substituted when an n-gram order has zero matches, so one
/// missing 4-gram cannot zero out the whole score.
const BLEU_SMOOTHING_EPSILON: f64 = 0.1;

/// Corpus-level BLEU-4 over decomposed character units.
///
/// Clipped n-gram matches are pooled across the corpus for n = 1..=4, the
/// geometric mean is taken with uniform weights, and the brevity penalty
/// `min(1, exp(1 - ref_len / hyp_len))` is applied. Orders with zero matches
/// receive an epsilon count instead of collapsing the score to zero.
pub fn bleu<S: AsRef<str>>(references: &[S], hypotheses: &[S]) -> Result<f64> {
    check_lengths(references, hypotheses)?;

    let mut clipped = [0.0f64; BLEU_MAX_ORDER];
    let mut totals = [0.0f64; BLEU_MAX_ORDER];
    let mut ref_len = 0usize;
    let mut hyp_len = 0usize;

    for (r, h) in references.iter().zip(hypotheses) {
        let r_units = decompose(r.as_ref());
        let h_units = decompose(h.as_ref());
        ref_len += r_units.len();
        hyp_len += h_units.len();

        for n in 1..=BLEU_MAX_ORDER {
            let r_counts = ngram_counts(&r_units, n);
            let h_counts = ngram_counts(&h_units, n);
            totals[n - 1] += h_units.len().saturating_sub(n - 1) as f64;
            clipped[n - 1] += h_counts
                .iter()
                .map(|(gram, &count)| count.min(r_counts.get(gram).copied().unwrap_or(0)))
                .sum::<usize>() as f64;
        }
    }

    if hyp_len == 0 {
        return Ok(0.0);
    }

    let mut log_precision_sum = 0.0;
    for n in 0..BLEU_MAX_ORDER {
        let numerator = if clipped[n] > 0.0 {
            clipped[n]
        } else {
            BLEU_SMOOTHING_EPSILON
        };
        let denominator = totals[n].max(1.0);
        log_precision_sum += (numerator / denominator).ln() / BLEU_MAX_ORDER as f64;
    }

    let brevity_penalty = if hyp_len >= ref_len {
        1.0
    } else {
        (1.0 - ref_len as f64 / hyp_len as f64).exp()
    };

    Ok(brevity_penalty * log_precision_sum.exp())
}

fn ngram_counts(units: &[u8], n: usize) -> HashMap<&[u8], usize> {
    let mut counts = HashMap::new();
    if units.len() >= n {
        for gram in units.windows(n) {
            *counts.entry(gram).or_insert(0) += 1;
        }
    }
    counts
}

pub(crate) fn check_lengths<S: AsRef<str>>(references: &[S], hypotheses: &[S]) -> Result<()> {
    if references.len() != hypotheses.len() {
        return Err(Error::InvalidInput(format!(
            "reference and hypothesis counts differ: {} vs {}",
            references.len(),
            hypotheses.len()
        )));
    }
    if references.is_empty() {
        return Err(Error::InvalidInput(
            "cannot evaluate an empty collection".to_string(),
        ));
    }
    Ok(())
}
