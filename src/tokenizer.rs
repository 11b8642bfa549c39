//! Byte Pair Encoding (BPE) Tokenizer
//!
//! This module implements BPE tokenization from scratch for the
//! transliteration pipeline. BPE is the standard subword method used by
//! modern language models, applied here to short name strings.
//!
//! ## How BPE Works
//!
//! 1. **Start with byte-level encoding**: 256 base tokens (one per byte value: 0-255)
//! 2. **Count adjacent pairs**: Find the most common adjacent token pair in the corpus
//! 3. **Merge the most frequent pair**: Assign the pair the next free id (256, 257, ...)
//! 4. **Repeat**: Continue until the vocabulary reaches the target size
//!
//! ## Example
//!
//! Given corpus: `["pritam", "gouda"]` and two merges:
//! - Merge 1: the winning pair becomes token 256
//! - Merge 2: the next winner (possibly containing 256) becomes token 257
//!
//! Every merged token decodes back to the exact byte sequence it covers, so
//! `decode(encode(s))` always reproduces `s` — the central invariant of this
//! module, and the one the tests lean on hardest.
//!
//! ## Special Tokens
//!
//! Sequence models need markers the raw text never carries: start-of-sequence,
//! end-of-sequence and padding. This tokenizer reserves three control bytes
//! (0x01, 0x04, 0x00) for those roles. Pairs containing a special byte are
//! excluded from merge statistics during training, so a control marker can
//! never be fused into a content token.
//!
//! ## Determinism
//!
//! Two training runs over the same corpus must learn the same merges. Pair
//! counts come out of a HashMap whose iteration order is random, so the winner
//! of each round is chosen by sorting: count descending, then the numerically
//! smallest `(left, right)` pair. Encoding applies merges lowest-id-first,
//! which reproduces the exact token streams training itself saw.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Token identifier. Ids 0-255 are raw bytes, ids >= 256 are learned merges.
pub type TokenId = usize;

/// Number of base byte tokens; also the id of the first learned merge.
pub const BYTE_VOCAB_SIZE: usize = 256;

/// The three reserved control bytes and their token ids.
///
/// Because the base vocabulary maps byte value -> id identically, each
/// marker's id equals its byte value. These bytes never participate in
/// merges, so the ids stay stable regardless of training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialTokens {
    /// Start-of-sequence marker (byte 0x01).
    pub start: TokenId,
    /// End-of-sequence marker (byte 0x04).
    pub end: TokenId,
    /// Padding marker (byte 0x00).
    pub pad: TokenId,
}

impl Default for SpecialTokens {
    fn default() -> Self {
        Self {
            start: 0x01,
            end: 0x04,
            pad: 0x00,
        }
    }
}

impl SpecialTokens {
    /// Whether the given id is one of the reserved markers.
    pub fn contains(&self, id: TokenId) -> bool {
        id == self.start || id == self.end || id == self.pad
    }
}

/// Padding strategy for [`Tokenizer::batch_encode`].
///
/// Downstream batch consumers need rectangular id matrices, so `Longest` and
/// `Fixed` guarantee every sequence in the batch comes out the same length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPadding {
    /// Leave sequences at their natural lengths.
    None,
    /// Pad every sequence to the longest one in the batch.
    Longest,
    /// Pad to the given length, or to the longest sequence if any exceeds it
    /// (the batch must still come out rectangular).
    Fixed(usize),
}

/// A trained Byte Pair Encoding tokenizer.
///
/// Built once by [`Tokenizer::train`] and immutable afterwards: the merge
/// list, vocabulary and special tokens are fixed for the lifetime of the
/// value. There is no partially-constructed state to observe.
///
/// # Example
///
/// ```rust
/// use akshara::Tokenizer;
///
/// let tokenizer = Tokenizer::train(&["pritam", "gouda"], 258).unwrap();
/// let ids = tokenizer.encode("pritam", false, false);
/// assert_eq!(tokenizer.decode(&ids, false), "pritam");
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct Tokenizer {
    /// Merge rules in creation order: rule `r` maps `merges[r]` to id
    /// `256 + r`. Never reordered once learned.
    merges: Vec<(TokenId, TokenId)>,

    /// Byte sequence for every token id. The first 256 entries are the
    /// single-byte identity mapping; entries past that are the concatenation
    /// of the two sides of the corresponding merge rule.
    vocab: Vec<Vec<u8>>,

    /// Reserved control markers.
    specials: SpecialTokens,

    /// Pair -> merged id lookup, derived from `merges`. Rebuilt after
    /// deserialization rather than stored.
    #[serde(skip)]
    ranks: HashMap<(TokenId, TokenId), TokenId>,
}

impl Tokenizer {
    /// Train a tokenizer on a corpus of strings.
    ///
    /// Each string becomes its own UTF-8 byte stream; merges never cross
    /// string boundaries, but pair counts are pooled over the whole corpus in
    /// every round, giving one global merge schedule. `vocab_size - 256`
    /// rounds are run, stopping early if no mergeable pair remains.
    ///
    /// Returns the fully trained, immutable tokenizer. Training is a pure
    /// function of `(corpus, vocab_size)`; no intermediate state escapes.
    ///
    /// # Arguments
    ///
    /// * `corpus` - Training strings (e.g. a column of names)
    /// * `vocab_size` - Final vocabulary size; must be at least 256
    ///
    /// # Errors
    ///
    /// `InvalidInput` if `vocab_size < 256`, since even the bare byte
    /// vocabulary would not fit.
    ///
    /// # Example
    ///
    /// ```rust
    /// use akshara::Tokenizer;
    ///
    /// let corpus = ["anand", "ananya", "anusha"];
    /// let tokenizer = Tokenizer::train(&corpus, 300).unwrap();
    /// assert!(tokenizer.vocab_size() >= 256);
    /// ```
    pub fn train<S: AsRef<str> + Sync>(corpus: &[S], vocab_size: usize) -> Result<Self> {
        if vocab_size < BYTE_VOCAB_SIZE {
            return Err(Error::InvalidInput(format!(
                "vocab_size must be at least {BYTE_VOCAB_SIZE}, got {vocab_size}"
            )));
        }

        let specials = SpecialTokens::default();
        let num_merges = vocab_size - BYTE_VOCAB_SIZE;

        println!("Training BPE tokenizer...");
        println!("  Corpus strings: {}", corpus.len());
        println!("  Target vocab size: {}", vocab_size);

        // One id stream per corpus string; merges apply within streams only.
        let mut streams: Vec<Vec<TokenId>> = corpus
            .iter()
            .map(|s| s.as_ref().bytes().map(|b| b as TokenId).collect())
            .collect();

        let mut merges: Vec<(TokenId, TokenId)> = Vec::with_capacity(num_merges);

        for merge_idx in 0..num_merges {
            // === PARALLEL PAIR COUNTING ===
            // Streams are independent, so counts fold per stream and reduce
            // into one global table.
            let pair_counts: HashMap<(TokenId, TokenId), usize> = streams
                .par_iter()
                .fold(HashMap::new, |mut local, stream| {
                    for window in stream.windows(2) {
                        let pair = (window[0], window[1]);
                        // Control markers never merge with content bytes.
                        if specials.contains(pair.0) || specials.contains(pair.1) {
                            continue;
                        }
                        *local.entry(pair).or_insert(0) += 1;
                    }
                    local
                })
                .reduce(HashMap::new, |mut a, b| {
                    for (pair, count) in b {
                        *a.entry(pair).or_insert(0) += count;
                    }
                    a
                });

            // Nothing left to merge: the corpus is fully compressed.
            if pair_counts.is_empty() {
                break;
            }

            // === DETERMINISTIC TIE-BREAKING ===
            // HashMap iteration is random. Sort so every run learns the same
            // rules: count descending, then smallest (left, right) pair.
            let mut pairs: Vec<((TokenId, TokenId), usize)> = pair_counts.into_iter().collect();
            pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

            let (best_pair, count) = pairs[0];
            let new_id = BYTE_VOCAB_SIZE + merge_idx;

            // Apply the merge to every stream before the next round counts.
            for stream in &mut streams {
                *stream = merge_pair(stream, best_pair, new_id);
            }
            merges.push(best_pair);

            if merge_idx % 50 == 0 {
                println!(
                    "  Merge {}/{}: {:?} (count: {}) -> id {}",
                    merge_idx + 1,
                    num_merges,
                    best_pair,
                    count,
                    new_id
                );
            }
        }

        println!("Training complete! Learned {} merges\n", merges.len());
        Ok(Self::from_merges(merges, specials))
    }

    /// Build the tokenizer value from a finished merge list.
    ///
    /// The vocabulary is derived here: ids 0-255 map to single bytes, and each
    /// merge id concatenates the byte sequences of its two sides, in rule
    /// creation order (so both sides are always already defined).
    fn from_merges(merges: Vec<(TokenId, TokenId)>, specials: SpecialTokens) -> Self {
        let mut vocab: Vec<Vec<u8>> = (0u8..=255).map(|b| vec![b]).collect();
        for &(left, right) in &merges {
            let mut bytes = vocab[left].clone();
            bytes.extend_from_slice(&vocab[right]);
            vocab.push(bytes);
        }

        let mut tokenizer = Self {
            merges,
            vocab,
            specials,
            ranks: HashMap::new(),
        };
        tokenizer.rebuild_ranks();
        tokenizer
    }

    /// Rebuild the pair -> merged-id lookup from the rule list.
    fn rebuild_ranks(&mut self) {
        self.ranks = self
            .merges
            .iter()
            .enumerate()
            .map(|(rank, &pair)| (pair, BYTE_VOCAB_SIZE + rank))
            .collect();
    }

    /// Encode a string into token ids.
    ///
    /// The string becomes its raw byte ids, then merges are applied
    /// repeatedly: in each pass the adjacent pair with the *lowest* merged id
    /// (the earliest-learned rule) wins. Applying rules in training order,
    /// not frequency order, reproduces the token streams training assumed
    /// when it learned later rules.
    ///
    /// Start and end markers are spliced in as already-resolved ids. Since
    /// special bytes are barred from merging this is observably identical to
    /// tokenizing marker characters alongside the content.
    ///
    /// An empty string encodes to an empty sequence (plus any requested
    /// markers).
    ///
    /// # Arguments
    ///
    /// * `text` - Input string
    /// * `add_start` - Prepend the start-of-sequence id
    /// * `add_end` - Append the end-of-sequence id
    pub fn encode(&self, text: &str, add_start: bool, add_end: bool) -> Vec<TokenId> {
        let mut tokens: Vec<TokenId> = text.bytes().map(|b| b as TokenId).collect();

        while tokens.len() >= 2 {
            // Earliest-learned rule present anywhere in the sequence.
            let best = tokens
                .windows(2)
                .filter_map(|w| self.ranks.get(&(w[0], w[1])).copied())
                .min();
            match best {
                Some(new_id) => {
                    let pair = self.merges[new_id - BYTE_VOCAB_SIZE];
                    tokens = merge_pair(&tokens, pair, new_id);
                }
                None => break,
            }
        }

        if add_start {
            tokens.insert(0, self.specials.start);
        }
        if add_end {
            tokens.push(self.specials.end);
        }
        tokens
    }

    /// Decode token ids back into a string.
    ///
    /// Concatenates each id's byte sequence and interprets the result as
    /// UTF-8. Malformed byte combinations are replaced with U+FFFD rather
    /// than failing; decode never errors. Ids outside the vocabulary are
    /// skipped.
    ///
    /// With `strip_special`, exactly the first and last token are dropped
    /// before decoding. The caller must remove padding first (see
    /// [`Tokenizer::unpad`]); decode does not scan for pad ids.
    pub fn decode(&self, tokens: &[TokenId], strip_special: bool) -> String {
        let tokens = if strip_special {
            tokens
                .get(1..tokens.len().saturating_sub(1))
                .unwrap_or_default()
        } else {
            tokens
        };

        let mut bytes = Vec::with_capacity(tokens.len());
        for &id in tokens {
            if let Some(seq) = self.vocab.get(id) {
                bytes.extend_from_slice(seq);
            }
        }
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Pad a token sequence to the given length.
    ///
    /// Sequences already at or beyond `length` are returned unchanged (this
    /// also covers the degenerate `length == 0` case). Otherwise pad ids are
    /// inserted *before* the final token, so a trailing end marker stays the
    /// last non-pad element:
    ///
    /// ```text
    /// pad([S, a, b, E], 6)  ->  [S, a, b, P, P, E]
    /// ```
    ///
    /// # Example
    ///
    /// ```rust
    /// # use akshara::Tokenizer;
    /// let tokenizer = Tokenizer::train(&["ab"], 256).unwrap();
    /// let padded = tokenizer.pad(&[97, 98], 4);
    /// assert_eq!(padded, vec![97, 0, 0, 98]);
    /// assert_eq!(tokenizer.unpad(&padded), vec![97, 98]);
    /// ```
    pub fn pad(&self, tokens: &[TokenId], length: usize) -> Vec<TokenId> {
        if tokens.len() >= length {
            return tokens.to_vec();
        }

        let pad = self.specials.pad;
        let mut padded = Vec::with_capacity(length);
        match tokens.split_last() {
            Some((&last, head)) => {
                padded.extend_from_slice(head);
                padded.resize(length - 1, pad);
                padded.push(last);
            }
            None => padded.resize(length, pad),
        }
        padded
    }

    /// Remove padding from a token sequence.
    ///
    /// Exact left inverse of [`Tokenizer::pad`]: the pad run sitting before
    /// the final token (or trailing the sequence, if the sequence ends in
    /// pads) is stripped. A sequence without pad ids comes back unchanged —
    /// absence of padding is not an error.
    pub fn unpad(&self, tokens: &[TokenId]) -> Vec<TokenId> {
        let pad = self.specials.pad;

        let strip_trailing = |slice: &[TokenId]| {
            let end = slice
                .iter()
                .rposition(|&id| id != pad)
                .map_or(0, |pos| pos + 1);
            slice[..end].to_vec()
        };

        match tokens.split_last() {
            Some((&last, head)) if last != pad => {
                let mut content = strip_trailing(head);
                content.push(last);
                content
            }
            _ => strip_trailing(tokens),
        }
    }

    /// Encode a batch of strings, optionally padding to a common length.
    ///
    /// Sequences are encoded in parallel. With [`BatchPadding::Longest`] or
    /// [`BatchPadding::Fixed`], every output is padded to one shared length —
    /// for `Fixed(n)`, the larger of `n` and the longest encoded sequence, so
    /// the batch is always rectangular.
    pub fn batch_encode<S: AsRef<str> + Sync>(
        &self,
        batch: &[S],
        padding: BatchPadding,
        add_start: bool,
        add_end: bool,
    ) -> Vec<Vec<TokenId>> {
        let encoded: Vec<Vec<TokenId>> = batch
            .par_iter()
            .map(|s| self.encode(s.as_ref(), add_start, add_end))
            .collect();

        let longest = encoded.iter().map(Vec::len).max().unwrap_or(0);
        let target = match padding {
            BatchPadding::None => return encoded,
            BatchPadding::Longest => longest,
            BatchPadding::Fixed(length) => length.max(longest),
        };

        encoded
            .into_iter()
            .map(|tokens| self.pad(&tokens, target))
            .collect()
    }

    /// Decode a batch of (possibly padded) token sequences.
    ///
    /// Each sequence is unpadded before decoding, so padded batches from
    /// [`Tokenizer::batch_encode`] round-trip directly.
    pub fn batch_decode(&self, batch: &[Vec<TokenId>], strip_special: bool) -> Vec<String> {
        batch
            .iter()
            .map(|tokens| self.decode(&self.unpad(tokens), strip_special))
            .collect()
    }

    /// The reserved control markers.
    pub fn special_tokens(&self) -> SpecialTokens {
        self.specials
    }

    /// Byte sequence for a token id, if the id is in the vocabulary.
    pub fn token_bytes(&self, id: TokenId) -> Option<&[u8]> {
        self.vocab.get(id).map(Vec::as_slice)
    }

    /// The full vocabulary: byte sequence for every token id, in id order.
    pub fn vocab(&self) -> &[Vec<u8>] {
        &self.vocab
    }

    /// Total vocabulary size: 256 base tokens plus learned merges.
    pub fn vocab_size(&self) -> usize {
        self.vocab.len()
    }

    /// Merge rules in creation order.
    pub fn merges(&self) -> &[(TokenId, TokenId)] {
        &self.merges
    }

    /// Summary statistics about the trained vocabulary.
    pub fn stats(&self) -> TokenizerStats {
        TokenizerStats {
            vocab_size: self.vocab.len(),
            num_merges: self.merges.len(),
            base_tokens: BYTE_VOCAB_SIZE,
        }
    }

    /// Save the tokenizer to a JSON file.
    ///
    /// The whole trained instance (merge rules in creation order, vocabulary,
    /// special token values) is serialized as one atomic object.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use akshara::Tokenizer;
    /// # let tokenizer = Tokenizer::train(&["ab"], 256).unwrap();
    /// tokenizer.save("tokenizer.json").expect("failed to save");
    /// ```
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load a previously saved tokenizer.
    ///
    /// The loaded instance behaves identically to the one that was saved.
    ///
    /// # Errors
    ///
    /// `NotFound` if nothing exists at `path`; `Json` if the file does not
    /// parse as tokenizer state.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use akshara::Tokenizer;
    ///
    /// let tokenizer = Tokenizer::load("tokenizer.json").expect("failed to load");
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::NotFound(path.to_path_buf()));
        }
        let json = fs::read_to_string(path)?;
        let mut tokenizer: Tokenizer = serde_json::from_str(&json)?;
        tokenizer.rebuild_ranks();
        Ok(tokenizer)
    }
}

/// Replace every non-overlapping left-to-right occurrence of `pair` in
/// `tokens` with `new_id`.
fn merge_pair(tokens: &[TokenId], pair: (TokenId, TokenId), new_id: TokenId) -> Vec<TokenId> {
    let mut merged = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        if i + 1 < tokens.len() && tokens[i] == pair.0 && tokens[i + 1] == pair.1 {
            merged.push(new_id);
            i += 2;
        } else {
            merged.push(tokens[i]);
            i += 1;
        }
    }
    merged
}

/// Statistics about a tokenizer's vocabulary
#[derive(Debug)]
pub struct TokenizerStats {
    /// Total vocabulary size (base tokens + learned merges)
    pub vocab_size: usize,
    /// Number of merge rules learned
    pub num_merges: usize,
    /// Number of base tokens (always 256 for byte-level BPE)
    pub base_tokens: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn specials() -> SpecialTokens {
        SpecialTokens::default()
    }

    #[test]
    fn test_untrained_roundtrip() {
        let tokenizer = Tokenizer::train(&[] as &[&str], 256).unwrap();

        let test_cases = vec![
            "hello",
            "pritam",
            "123 456 789",
            "special chars: !@#$%^&*()",
            "newline\nand\ttab",
            "UTF-8: café, naïve, प्रीतम",
        ];

        for text in test_cases {
            let encoded = tokenizer.encode(text, false, false);
            let decoded = tokenizer.decode(&encoded, false);
            assert_eq!(decoded, text, "failed roundtrip for: {}", text);
        }
    }

    #[test]
    fn test_trained_roundtrip_over_corpus() {
        let corpus = ["pritam", "gouda", "ananya", "anand", "gautam"];
        let tokenizer = Tokenizer::train(&corpus, 280).unwrap();

        for name in corpus {
            let encoded = tokenizer.encode(name, false, false);
            let decoded = tokenizer.decode(&encoded, false);
            assert_eq!(decoded, name);
        }
    }

    #[test]
    fn test_roundtrip_adversarial() {
        let tokenizer = Tokenizer::train(&["pritam", "gouda"], 260).unwrap();

        // Empty string, single char, long repeats, special-byte content.
        let long = "ab".repeat(100);
        let cases = ["", "a", long.as_str(), "\u{1}\u{4}", "\u{0}"];
        for text in &cases {
            let encoded = tokenizer.encode(text, false, false);
            assert_eq!(tokenizer.decode(&encoded, false), *text);
        }
    }

    #[test]
    fn test_pritam_gouda_learns_exactly_two_merges() {
        let tokenizer = Tokenizer::train(&["pritam", "gouda"], 258).unwrap();
        assert_eq!(tokenizer.merges().len(), 2);
        assert_eq!(tokenizer.vocab_size(), 258);

        let encoded = tokenizer.encode("pritam", false, false);
        assert!(encoded.len() < "pritam".len(), "a merge should apply");
        assert_eq!(tokenizer.decode(&encoded, false), "pritam");
    }

    #[test]
    fn test_merge_ids_sequential_from_256() {
        let corpus = ["banana bandana", "banana bandana"];
        let tokenizer = Tokenizer::train(&corpus, 270).unwrap();
        assert!(!tokenizer.merges().is_empty());

        // One id per rule, in order, no gaps: rule r owns id 256 + r, and its
        // vocabulary entry is the concatenation of its two sides.
        for (rank, &(left, right)) in tokenizer.merges().iter().enumerate() {
            let id = BYTE_VOCAB_SIZE + rank;
            let mut expected = tokenizer.token_bytes(left).unwrap().to_vec();
            expected.extend_from_slice(tokenizer.token_bytes(right).unwrap());
            assert_eq!(tokenizer.token_bytes(id).unwrap(), &expected[..]);
            assert!(left < id && right < id);
        }
    }

    #[test]
    fn test_training_is_deterministic() {
        let corpus = ["pritam", "gouda", "govinda", "pradeep"];
        let a = Tokenizer::train(&corpus, 280).unwrap();
        let b = Tokenizer::train(&corpus, 280).unwrap();
        assert_eq!(a.merges(), b.merges());
    }

    #[test]
    fn test_vocab_size_below_256_rejected() {
        let result = Tokenizer::train(&["abc"], 100);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_encode_with_markers() {
        let tokenizer = Tokenizer::train(&["pritam"], 256).unwrap();
        let s = specials();

        let encoded = tokenizer.encode("ab", true, true);
        assert_eq!(encoded.first(), Some(&s.start));
        assert_eq!(encoded.last(), Some(&s.end));

        // strip_special drops exactly the first and last token.
        assert_eq!(tokenizer.decode(&encoded, true), "ab");
    }

    #[test]
    fn test_pad_keeps_end_marker_last() {
        let tokenizer = Tokenizer::train(&["ab"], 256).unwrap();
        let s = specials();

        let tokens = tokenizer.encode("ab", true, true);
        let padded = tokenizer.pad(&tokens, 8);
        assert_eq!(padded.len(), 8);
        assert_eq!(padded.last(), Some(&s.end));
        // Pads sit before the end marker, not after it.
        assert_eq!(&padded[padded.len() - 3..padded.len() - 1], &[s.pad, s.pad]);
    }

    #[test]
    fn test_pad_unpad_inverse() {
        let tokenizer = Tokenizer::train(&["ab"], 256).unwrap();

        let sequences: Vec<Vec<TokenId>> = vec![
            vec![],
            vec![97],
            vec![1, 97, 98, 4],
            vec![97, 98, 99, 100],
        ];
        for tokens in sequences {
            for length in tokens.len()..tokens.len() + 5 {
                let padded = tokenizer.pad(&tokens, length);
                assert!(padded.len() >= tokens.len());
                assert_eq!(tokenizer.unpad(&padded), tokens, "length {}", length);
            }
        }
    }

    #[test]
    fn test_unpad_without_padding_is_identity() {
        let tokenizer = Tokenizer::train(&["ab"], 256).unwrap();
        let tokens = vec![1, 97, 98, 4];
        assert_eq!(tokenizer.unpad(&tokens), tokens);
    }

    #[test]
    fn test_pad_longer_than_target_unchanged() {
        let tokenizer = Tokenizer::train(&["ab"], 256).unwrap();
        let tokens = vec![97, 98, 99];
        assert_eq!(tokenizer.pad(&tokens, 2), tokens);
        assert_eq!(tokenizer.pad(&tokens, 0), tokens);
    }

    #[test]
    fn test_batch_encode_rectangular() {
        let tokenizer = Tokenizer::train(&["pritam", "gouda"], 258).unwrap();
        let batch = ["pritam", "gouda", "om"];

        let encoded = tokenizer.batch_encode(&batch, BatchPadding::Longest, true, true);
        let width = encoded[0].len();
        assert!(encoded.iter().all(|t| t.len() == width));

        // Fixed shorter than the longest sequence still comes out rectangular.
        let encoded = tokenizer.batch_encode(&batch, BatchPadding::Fixed(3), true, true);
        let width = encoded[0].len();
        assert!(encoded.iter().all(|t| t.len() == width));

        let decoded = tokenizer.batch_decode(&encoded, true);
        assert_eq!(decoded, vec!["pritam", "gouda", "om"]);
    }

    #[test]
    fn test_batch_encode_no_padding() {
        let tokenizer = Tokenizer::train(&["ab"], 256).unwrap();
        let encoded = tokenizer.batch_encode(&["a", "abc"], BatchPadding::None, false, false);
        assert_eq!(encoded[0].len(), 1);
        assert_eq!(encoded[1].len(), 3);
    }

    #[test]
    fn test_save_load_equivalent() {
        let corpus = ["pritam", "gouda", "ananya"];
        let tokenizer = Tokenizer::train(&corpus, 280).unwrap();

        let path = std::env::temp_dir().join("akshara_tokenizer_test.json");
        tokenizer.save(&path).unwrap();
        let loaded = Tokenizer::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.merges(), tokenizer.merges());
        for name in corpus {
            assert_eq!(
                loaded.encode(name, true, true),
                tokenizer.encode(name, true, true)
            );
        }
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let result = Tokenizer::load("/nonexistent/dir/tokenizer.json");
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_special_bytes_never_merge() {
        // A corpus saturated with control bytes must not learn a rule
        // touching them.
        let corpus = ["\u{1}\u{1}\u{1}\u{1}", "\u{4}\u{4}\u{4}\u{4}", "aaaa"];
        let tokenizer = Tokenizer::train(&corpus, 260).unwrap();
        let s = specials();
        for &(left, right) in tokenizer.merges() {
            assert!(!s.contains(left) && !s.contains(right));
        }
    }

    #[test]
    fn test_decode_lenient_on_malformed_bytes() {
        let tokenizer = Tokenizer::train(&["ab"], 256).unwrap();
        // 0xC3 alone is an incomplete UTF-8 sequence.
        let decoded = tokenizer.decode(&[0xC3], false);
        assert_eq!(decoded, "\u{FFFD}");
    }
}
