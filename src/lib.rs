//! Akshara: Educational Transliteration Pipeline
//!
//! The tokenization, decoding and evaluation machinery of a Latin-to-Hindi
//! name transliterator, implemented from scratch in Rust for educational
//! purposes. Named after the Sanskrit word for "syllable".
//!
//! The neural model itself lives elsewhere; this crate covers everything
//! around it:
//!
//! # Modules
//!
//! - [`tokenizer`] - Byte Pair Encoding (BPE) tokenization with special
//!   start/end/padding markers
//! - [`decoder`] - Beam search and greedy decoding over any
//!   [`SequenceScorer`]
//! - [`metrics`] - Levenshtein edit counts, accuracy, character and token
//!   error rates, smoothed BLEU-4
//! - [`dataset`] - Parallel corpus loading and batch collation
//! - [`evaluator`] - End-to-end scoring of a transliteration function
//! - [`error`] - The crate-wide [`Error`] type
//!
//! # Example
//!
//! ```rust
//! use akshara::Tokenizer;
//!
//! // Train a byte-level tokenizer on target-script names.
//! let names = ["प्रीतम", "गौड़ा", "प्रिया"];
//! let tokenizer = Tokenizer::train(&names, 300).unwrap();
//!
//! // Encode with start/end markers, then decode back.
//! let ids = tokenizer.encode("प्रीतम", true, true);
//! assert_eq!(tokenizer.decode(&ids, true), "प्रीतम");
//! ```

pub mod dataset;
pub mod decoder;
pub mod error;
pub mod evaluator;
pub mod metrics;
pub mod tokenizer;

// Re-export main types for convenience
pub use dataset::{collate, ParallelCorpus};
pub use decoder::{greedy_decode, BeamSearch, SequenceScorer};
pub use error::{Error, Result};
pub use evaluator::{EvaluationReport, Evaluator};
pub use metrics::EditCounts;
pub use tokenizer::{BatchPadding, SpecialTokens, TokenId, Tokenizer, TokenizerStats};
