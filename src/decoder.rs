//! Decoding Strategies
//!
//! A trained conditional sequence model defines P(y | x) one token at a time;
//! a decoding strategy turns those per-step distributions into an output
//! sequence. This module implements the two strategies used by the pipeline:
//!
//! - **Greedy decoding**: always take the argmax token. Fast, but the locally
//!   best token can lead to a globally poor sequence.
//! - **Beam search**: keep the `k` best partial sequences at every step and
//!   expand each of them, ranking by cumulative log-probability with an
//!   optional length penalty. `k = 1` degenerates to greedy decoding.
//!
//! ## The Scorer Contract
//!
//! The model itself lives behind the [`SequenceScorer`] trait: given the
//! source sequence, the last generated token and an opaque continuation
//! state, it returns log-probabilities over the next token plus the state to
//! continue from. The decoder never inspects the state — it only clones and
//! threads it, one copy per beam, so diverging beams keep diverging
//! computations. Passing `None` means "start fresh from the source".
//!
//! ## Termination
//!
//! Decoding always terminates and always produces output: beams that emit
//! the end marker are carried forward with their score frozen, and after
//! `max_length` steps the best beam is returned as-is even if it never
//! finished.

use crate::tokenizer::{SpecialTokens, TokenId};

/// Interface the decoder drives; implemented by whatever hosts the model.
///
/// Implementations must be safe to call independently per beam with each
/// beam's own prior state — no hidden state may be shared across calls.
pub trait SequenceScorer {
    /// Opaque continuation state (e.g. a recurrent hidden state). Cloned
    /// whenever a beam branches.
    type State: Clone;

    /// Score the next token given the source, the previously generated token
    /// and the continuation state from the prior step (`None` on the first
    /// step).
    ///
    /// Returns log-probabilities indexed by token id, and the state for the
    /// following step.
    fn score(
        &self,
        source: &[TokenId],
        last_token: TokenId,
        state: Option<&Self::State>,
    ) -> (Vec<f32>, Self::State);
}

/// One partial hypothesis: the tokens so far, the raw cumulative
/// log-probability, and this beam's own scorer state.
#[derive(Clone)]
struct Beam<St> {
    tokens: Vec<TokenId>,
    score: f32,
    state: Option<St>,
}

impl<St> Beam<St> {
    fn finished(&self, end: TokenId) -> bool {
        self.tokens.last() == Some(&end)
    }

    /// Key used for ranking only; the stored score stays un-normalized.
    /// Dividing by `len^alpha` counteracts the bias of log-probability sums
    /// toward short sequences.
    fn ranking_key(&self, length_penalty: f32) -> f32 {
        if length_penalty > 0.0 {
            self.score / (self.tokens.len() as f32).powf(length_penalty)
        } else {
            self.score
        }
    }
}

/// Beam-search decoder configuration.
///
/// # Example
///
/// ```rust,no_run
/// # use akshara::{BeamSearch, SequenceScorer, SpecialTokens};
/// # fn demo(scorer: &impl SequenceScorer, source: &[usize]) {
/// let search = BeamSearch {
///     beam_width: 5,
///     max_length: 20,
///     length_penalty: 0.6,
/// };
/// let output = search.decode(scorer, source, SpecialTokens::default());
/// # }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct BeamSearch {
    /// Number of candidate partial sequences retained per step (k).
    pub beam_width: usize,
    /// Maximum number of generation steps; guarantees termination.
    pub max_length: usize,
    /// Length normalization exponent (alpha). Zero disables the penalty.
    pub length_penalty: f32,
}

impl Default for BeamSearch {
    fn default() -> Self {
        Self {
            beam_width: 5,
            max_length: 20,
            length_penalty: 0.6,
        }
    }
}

impl BeamSearch {
    /// Decode the best target sequence for `source`.
    ///
    /// Starts from a single beam holding only the start token at score 0 and
    /// expands up to `max_length` steps:
    ///
    /// 1. Every unfinished beam queries the scorer with its own state and
    ///    proposes its `k` most probable continuations, each scored as
    ///    parent score + token log-probability.
    /// 2. Finished beams are carried forward unchanged, so a completed
    ///    hypothesis is never degraded while shorter ones catch up.
    /// 3. All candidates compete and the global top `k` (by length-penalized
    ///    ranking key) survive.
    ///
    /// Returns the best-ranked finished beam, or — if nothing finished within
    /// `max_length` — the best beam as-is, truncated. Never fails.
    pub fn decode<S: SequenceScorer>(
        &self,
        scorer: &S,
        source: &[TokenId],
        specials: SpecialTokens,
    ) -> Vec<TokenId> {
        let k = self.beam_width.max(1);

        let mut beams: Vec<Beam<S::State>> = vec![Beam {
            tokens: vec![specials.start],
            score: 0.0,
            state: None,
        }];

        for _ in 0..self.max_length {
            if beams.iter().all(|beam| beam.finished(specials.end)) {
                break;
            }

            let mut candidates: Vec<Beam<S::State>> = Vec::with_capacity(beams.len() * k);
            for beam in &beams {
                if beam.finished(specials.end) {
                    candidates.push(beam.clone());
                    continue;
                }
                let Some(&last) = beam.tokens.last() else {
                    continue;
                };

                // Each beam expands from its own continuation state.
                let (log_probs, next_state) = scorer.score(source, last, beam.state.as_ref());
                for (token, log_prob) in top_k(&log_probs, k) {
                    let mut tokens = beam.tokens.clone();
                    tokens.push(token);
                    candidates.push(Beam {
                        tokens,
                        score: beam.score + log_prob,
                        state: Some(next_state.clone()),
                    });
                }
            }

            if candidates.is_empty() {
                break;
            }
            candidates.sort_by(|a, b| {
                b.ranking_key(self.length_penalty)
                    .total_cmp(&a.ranking_key(self.length_penalty))
            });
            candidates.truncate(k);
            beams = candidates;
        }

        // Best finished beam wins; otherwise best effort, possibly truncated.
        beams.sort_by(|a, b| {
            b.ranking_key(self.length_penalty)
                .total_cmp(&a.ranking_key(self.length_penalty))
        });
        let finished = beams.iter().position(|beam| beam.finished(specials.end));
        let index = finished.unwrap_or(0);
        beams.swap_remove(index).tokens
    }
}

/// Greedy decoding: extend with the argmax token until the end marker or
/// `max_length` steps. Equivalent to [`BeamSearch`] with `beam_width` 1.
pub fn greedy_decode<S: SequenceScorer>(
    scorer: &S,
    source: &[TokenId],
    specials: SpecialTokens,
    max_length: usize,
) -> Vec<TokenId> {
    let mut tokens = vec![specials.start];
    let mut state: Option<S::State> = None;

    for _ in 0..max_length {
        let Some(&last) = tokens.last() else { break };
        let (log_probs, next_state) = scorer.score(source, last, state.as_ref());
        let Some(&(token, _)) = top_k(&log_probs, 1).first() else {
            break;
        };
        tokens.push(token);
        state = Some(next_state);
        if token == specials.end {
            break;
        }
    }
    tokens
}

/// Indices and values of the `k` largest entries, best first.
///
/// Shared between greedy and beam expansion so both resolve ties over equal
/// log-probabilities identically.
fn top_k(log_probs: &[f32], k: usize) -> Vec<(TokenId, f32)> {
    let mut indexed: Vec<(TokenId, f32)> = log_probs.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    indexed.truncate(k);
    indexed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const START: TokenId = 0x01;
    const END: TokenId = 0x04;

    fn specials() -> SpecialTokens {
        SpecialTokens::default()
    }

    /// Deterministic scorer driven by a prefix -> distribution table.
    ///
    /// The continuation state is the generated prefix itself, so the test
    /// exercises real per-beam state threading: a beam that took a different
    /// token sees different follow-up distributions.
    struct TableScorer {
        vocab_size: usize,
        table: HashMap<Vec<TokenId>, Vec<(TokenId, f32)>>,
    }

    impl TableScorer {
        fn new(vocab_size: usize, entries: &[(&[TokenId], &[(TokenId, f32)])]) -> Self {
            let table = entries
                .iter()
                .map(|(prefix, probs)| (prefix.to_vec(), probs.to_vec()))
                .collect();
            Self { vocab_size, table }
        }
    }

    impl SequenceScorer for TableScorer {
        type State = Vec<TokenId>;

        fn score(
            &self,
            _source: &[TokenId],
            last_token: TokenId,
            state: Option<&Self::State>,
        ) -> (Vec<f32>, Self::State) {
            let mut prefix = state.cloned().unwrap_or_default();
            prefix.push(last_token);

            // Unknown prefixes put all mass on the end marker.
            let mut log_probs = vec![-30.0_f32; self.vocab_size];
            match self.table.get(&prefix) {
                Some(probs) => {
                    for &(token, p) in probs {
                        log_probs[token] = p.ln();
                    }
                }
                None => log_probs[END] = -0.001,
            }
            (log_probs, prefix)
        }
    }

    /// a=10, b=11, c=12 for readability.
    fn trap_scorer() -> TableScorer {
        // Greedy trap: token 10 looks best first (0.6 vs 0.4) but its
        // continuations are weak; the 11 branch is stronger overall.
        //   10 path: 0.6 * 0.3  = 0.18
        //   11 path: 0.4 * 0.95 = 0.38
        TableScorer::new(
            16,
            &[
                (&[START], &[(10, 0.6), (11, 0.4)]),
                (&[START, 10], &[(12, 0.3), (END, 0.3)]),
                (&[START, 11], &[(END, 0.95)]),
                (&[START, 10, 12], &[(END, 0.9)]),
            ],
        )
    }

    #[test]
    fn test_greedy_follows_argmax() {
        let scorer = trap_scorer();
        let output = greedy_decode(&scorer, &[5], specials(), 10);
        assert_eq!(output[..2], [START, 10]);
        assert_eq!(output.last(), Some(&END));
    }

    #[test]
    fn test_beam_width_one_equals_greedy() {
        let scorer = trap_scorer();
        let search = BeamSearch {
            beam_width: 1,
            max_length: 10,
            length_penalty: 0.0,
        };
        let beam_output = search.decode(&scorer, &[5], specials());
        let greedy_output = greedy_decode(&scorer, &[5], specials(), 10);
        assert_eq!(beam_output, greedy_output);
    }

    #[test]
    fn test_wider_beam_escapes_greedy_trap() {
        let scorer = trap_scorer();
        let search = BeamSearch {
            beam_width: 3,
            max_length: 10,
            length_penalty: 0.0,
        };
        let output = search.decode(&scorer, &[5], specials());
        assert_eq!(output, vec![START, 11, END]);
    }

    #[test]
    fn test_finished_beam_score_carries_forward() {
        // One beam finishes on step 1 with high probability; expanding other
        // beams for more steps must not dislodge or degrade it.
        let scorer = TableScorer::new(
            16,
            &[
                (&[START], &[(END, 0.9), (10, 0.1)]),
                (&[START, 10], &[(10, 0.5)]),
                (&[START, 10, 10], &[(10, 0.5)]),
            ],
        );
        let search = BeamSearch {
            beam_width: 2,
            max_length: 8,
            length_penalty: 0.0,
        };
        let output = search.decode(&scorer, &[5], specials());
        assert_eq!(output, vec![START, END]);
    }

    #[test]
    fn test_truncated_when_nothing_finishes() {
        // Scorer that never emits the end marker: decode must still return,
        // with max_length generated tokens after the start marker.
        struct LoopScorer;
        impl SequenceScorer for LoopScorer {
            type State = ();
            fn score(
                &self,
                _source: &[TokenId],
                _last: TokenId,
                _state: Option<&()>,
            ) -> (Vec<f32>, ()) {
                let mut log_probs = vec![-30.0_f32; 16];
                log_probs[10] = -0.1;
                (log_probs, ())
            }
        }

        let search = BeamSearch {
            beam_width: 2,
            max_length: 6,
            length_penalty: 0.0,
        };
        let output = search.decode(&LoopScorer, &[5], specials());
        assert_eq!(output.len(), 7);
        assert_eq!(output[0], START);
        assert!(output[1..].iter().all(|&t| t == 10));
    }

    #[test]
    fn test_beams_carry_independent_state() {
        // The two first-step branches lead to different best continuations;
        // if beams shared one mutated state, the 11 branch would see the 10
        // branch's table entries instead of its own.
        let scorer = TableScorer::new(
            16,
            &[
                (&[START], &[(10, 0.5), (11, 0.5)]),
                (&[START, 10], &[(12, 0.9)]),
                (&[START, 11], &[(13, 0.9)]),
                (&[START, 10, 12], &[(END, 0.2)]),
                (&[START, 11, 13], &[(END, 0.99)]),
            ],
        );
        let search = BeamSearch {
            beam_width: 2,
            max_length: 10,
            length_penalty: 0.0,
        };
        let output = search.decode(&scorer, &[5], specials());
        assert_eq!(output, vec![START, 11, 13, END]);
    }

    #[test]
    fn test_length_penalty_changes_ranking_key_only() {
        let beam = Beam::<()> {
            tokens: vec![START, 10, 11, END],
            score: -2.0,
            state: None,
        };
        assert_eq!(beam.ranking_key(0.0), -2.0);
        // Normalized key is less negative for the same score.
        assert!(beam.ranking_key(1.0) > beam.ranking_key(0.0));
        // The stored score itself is untouched.
        assert_eq!(beam.score, -2.0);
    }
}
