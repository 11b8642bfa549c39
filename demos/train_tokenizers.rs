//! Train source and target BPE tokenizers on a transliteration corpus
//!
//! This example demonstrates:
//! - Loading a parallel corpus of Latin/Hindi name pairs from CSV
//! - Training separate tokenizers for the source and target scripts
//! - Checking encode/decode round-trips and compression
//! - Saving both tokenizers as JSON for later decoding runs
//!
//! Output is written to: `tokenizer_runs/run_<timestamp>/`
//!
//! # Usage
//!
//! ```bash
//! cargo run --release --example train_tokenizers -- data/names.csv
//! ```
//!
//! # Prerequisites
//!
//! A two-column CSV file (header row, then `latin_name,hindi_name` rows).

use akshara::{ParallelCorpus, Tokenizer};
use std::env;
use std::fs;
use std::time::{SystemTime, UNIX_EPOCH};

const SRC_VOCAB_SIZE: usize = 300;
const TGT_VOCAB_SIZE: usize = 400;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("\n{}", "=".repeat(70));
    println!("  Transliteration Tokenizer Training");
    println!("{}", "=".repeat(70));

    let csv_path = env::args()
        .nth(1)
        .unwrap_or_else(|| "data/names.csv".to_string());

    println!("\nLoading corpus from {}...", csv_path);
    let corpus = match ParallelCorpus::from_csv_file(&csv_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("\nError: could not load corpus: {}", e);
            eprintln!("Pass the CSV path as the first argument, e.g.:");
            eprintln!("  cargo run --release --example train_tokenizers -- data/names.csv\n");
            std::process::exit(1);
        }
    };
    println!("Loaded {} name pairs\n", corpus.len());

    // Create timestamped output directory
    // Uses Unix timestamp for simple, dependency-free timestamping
    let timestamp = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
    let run_dir = format!("tokenizer_runs/run_{}", timestamp);
    fs::create_dir_all(&run_dir)?;
    println!("Output directory: {}\n", run_dir);

    let sides = [
        ("source", corpus.sources(), SRC_VOCAB_SIZE),
        ("target", corpus.targets(), TGT_VOCAB_SIZE),
    ];

    for (name, texts, vocab_size) in sides {
        println!("{}", "=".repeat(70));
        println!("Training {} tokenizer (vocab_size = {})", name, vocab_size);
        println!("{}", "=".repeat(70));

        let start = SystemTime::now();
        let tokenizer = Tokenizer::train(&texts, vocab_size)?;
        let duration = start.elapsed()?;

        // Measure compression over the whole column
        let total_bytes: usize = texts.iter().map(|t| t.len()).sum();
        let total_tokens: usize = texts
            .iter()
            .map(|t| tokenizer.encode(t, false, false).len())
            .sum();

        println!("\nResults:");
        println!("  Training time: {:.2}s", duration.as_secs_f64());
        println!("  Vocabulary size: {}", tokenizer.vocab_size());
        println!("  Corpus size: {} bytes", total_bytes);
        println!("  Encoded length: {} tokens", total_tokens);
        println!(
            "  Compression ratio: {:.2}x",
            total_bytes as f64 / total_tokens.max(1) as f64
        );

        // Test encode/decode round-trip on the first few names
        println!("\nTesting round-trip encoding...");
        for text in texts.iter().take(3) {
            let ids = tokenizer.encode(text, true, true);
            let decoded = tokenizer.decode(&ids, true);
            if decoded == *text {
                println!("  ✓ {:?} -> {} tokens -> round-trip OK", text, ids.len());
            } else {
                println!("  ✗ Round-trip FAILED for {:?} (got {:?})", text, decoded);
                return Err("round-trip test failed".into());
            }
        }

        let save_path = format!("{}/{}_tokenizer.json", run_dir, name);
        tokenizer.save(&save_path)?;
        println!("\nSaved to: {}\n", save_path);
    }

    println!("{}", "=".repeat(70));
    println!("  Training Complete!");
    println!("{}", "=".repeat(70));
    println!(
        "\nTo use a tokenizer in your code:\n  \
         let tokenizer = Tokenizer::load(\"{}/target_tokenizer.json\")?;",
        run_dir
    );
    println!();

    Ok(())
}
