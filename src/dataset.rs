//! Parallel Corpus Loading and Batching
//!
//! The pipeline trains and evaluates on a parallel corpus of name pairs:
//! a Latin-script source name and its target-script transliteration. This
//! module loads that corpus and collates it into rectangular token-id
//! batches for whatever tensor framework hosts the model.
//!
//! ## Example
//!
//! ```rust
//! use akshara::{BatchPadding, ParallelCorpus, Tokenizer};
//!
//! let corpus = ParallelCorpus::new(vec![
//!     ("pritam".to_string(), "प्रीतम".to_string()),
//!     ("gouda".to_string(), "गौड़ा".to_string()),
//! ]);
//!
//! let src_tokenizer = Tokenizer::train(&corpus.sources(), 300).unwrap();
//! let tgt_tokenizer = Tokenizer::train(&corpus.targets(), 300).unwrap();
//!
//! for batch in corpus.batches(64) {
//!     let (x, y) = akshara::collate(
//!         batch,
//!         &src_tokenizer,
//!         &tgt_tokenizer,
//!         BatchPadding::Fixed(20),
//!         BatchPadding::Fixed(20),
//!     );
//!     assert_eq!(x.len(), y.len());
//! }
//! ```

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::tokenizer::{BatchPadding, TokenId, Tokenizer};

/// A parallel corpus of (source, target) string pairs.
#[derive(Debug, Clone)]
pub struct ParallelCorpus {
    pairs: Vec<(String, String)>,
}

impl ParallelCorpus {
    /// Wrap an existing list of pairs.
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    /// Load a two-column CSV file of `source,target` rows.
    ///
    /// The first line is treated as a header and skipped. Fields are split
    /// on the first comma and surrounding double quotes are stripped; rows
    /// without a comma or with an empty field are dropped (the corpus is
    /// known to be noisy).
    ///
    /// # Errors
    ///
    /// `NotFound` if the file does not exist.
    pub fn from_csv_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::NotFound(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)?;

        let pairs = text
            .lines()
            .skip(1)
            .filter_map(|line| {
                let (source, target) = line.split_once(',')?;
                let source = source.trim().trim_matches('"');
                let target = target.trim().trim_matches('"');
                if source.is_empty() || target.is_empty() {
                    return None;
                }
                Some((source.to_string(), target.to_string()))
            })
            .collect();

        Ok(Self { pairs })
    }

    /// Number of pairs in the corpus.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether the corpus holds no pairs.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// All pairs, in file order.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// The source column, for tokenizer training.
    pub fn sources(&self) -> Vec<&str> {
        self.pairs.iter().map(|(s, _)| s.as_str()).collect()
    }

    /// The target column, for tokenizer training.
    pub fn targets(&self) -> Vec<&str> {
        self.pairs.iter().map(|(_, t)| t.as_str()).collect()
    }

    /// Iterate over the corpus in batches of at most `batch_size` pairs.
    pub fn batches(&self, batch_size: usize) -> impl Iterator<Item = &[(String, String)]> {
        self.pairs.chunks(batch_size.max(1))
    }
}

/// Collate a batch of string pairs into token-id matrices.
///
/// Sources and targets are encoded with their own tokenizers, start/end
/// markers added, and padded per the given strategies. With `Longest` or
/// `Fixed` padding each side comes out rectangular, ready for a fixed-shape
/// batch consumer.
pub fn collate(
    batch: &[(String, String)],
    src_tokenizer: &Tokenizer,
    tgt_tokenizer: &Tokenizer,
    src_padding: BatchPadding,
    tgt_padding: BatchPadding,
) -> (Vec<Vec<TokenId>>, Vec<Vec<TokenId>>) {
    let sources: Vec<&str> = batch.iter().map(|(s, _)| s.as_str()).collect();
    let targets: Vec<&str> = batch.iter().map(|(_, t)| t.as_str()).collect();

    let x = src_tokenizer.batch_encode(&sources, src_padding, true, true);
    let y = tgt_tokenizer.batch_encode(&targets, tgt_padding, true, true);
    (x, y)
}
