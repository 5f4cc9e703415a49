//! Determinism checks for seed-driven battle output.
//!
//! Given the same seed, queue shuffles, reveal sequences and daily playlists
//! must come out identical. Outputs are compared as canonical JSON bytes.
//!
//! # Example
//!
//! ```rust,ignore
//! use nftune_tests::determinism::verify_determinism;
//!
//! let result = verify_determinism(|| replay(&seed, &queue, 64), 3);
//! result.assert_deterministic();
//! ```

use std::fmt;

use serde::Serialize;

/// Result of a determinism verification.
#[derive(Debug, Clone)]
pub struct DeterminismResult {
    /// Whether all runs produced identical output.
    pub is_deterministic: bool,
    /// Number of runs performed.
    pub runs: usize,
    /// Size of the serialized output in bytes.
    pub output_size: usize,
    /// BLAKE3 hash of the first run's output.
    pub hash: String,
    /// First difference found, if any.
    pub diff_info: Option<DiffInfo>,
}

/// The first byte difference found between runs.
#[derive(Debug, Clone)]
pub struct DiffInfo {
    /// Byte offset of the difference.
    pub offset: usize,
    /// Which run (0-indexed) differed from the first.
    pub run_index: usize,
    /// Up to 32 characters of the reference around the offset.
    pub expected: String,
    /// Up to 32 characters of the differing run around the offset.
    pub actual: String,
}

impl fmt::Display for DiffInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Difference at byte {} (run {}):\n  expected: {}\n  actual:   {}",
            self.offset, self.run_index, self.expected, self.actual
        )
    }
}

impl DeterminismResult {
    /// Panic with a detailed message if not deterministic.
    pub fn assert_deterministic(&self) {
        if let Some(diff) = &self.diff_info {
            panic!(
                "Non-deterministic output detected!\n\
                 Runs: {}\n\
                 Output size: {} bytes\n\
                 Hash: {}\n\
                 {}",
                self.runs, self.output_size, self.hash, diff
            );
        }
    }
}

/// Serialize a value as the bytes runs are compared on.
pub fn canonical_bytes<T: Serialize>(value: &T) -> Vec<u8> {
    serde_json::to_vec(value).expect("output must serialize to JSON")
}

/// BLAKE3 hash of a value's canonical bytes, hex encoded.
pub fn output_hash<T: Serialize>(value: &T) -> String {
    blake3::hash(&canonical_bytes(value)).to_hex().to_string()
}

/// Run `generate_fn` `runs` times and verify all outputs serialize identically.
pub fn verify_determinism<F, O>(generate_fn: F, runs: usize) -> DeterminismResult
where
    F: Fn() -> O,
    O: Serialize,
{
    assert!(runs >= 2, "Must run at least 2 times to verify determinism");

    let reference = canonical_bytes(&generate_fn());
    let hash = blake3::hash(&reference).to_hex().to_string();

    for run_index in 1..runs {
        let output = canonical_bytes(&generate_fn());
        if let Some(offset) = first_difference(&reference, &output) {
            return DeterminismResult {
                is_deterministic: false,
                runs,
                output_size: reference.len(),
                hash,
                diff_info: Some(DiffInfo {
                    offset,
                    run_index,
                    expected: excerpt(&reference, offset),
                    actual: excerpt(&output, offset),
                }),
            };
        }
    }

    DeterminismResult {
        is_deterministic: true,
        runs,
        output_size: reference.len(),
        hash,
        diff_info: None,
    }
}

fn first_difference(a: &[u8], b: &[u8]) -> Option<usize> {
    match a.iter().zip(b).position(|(x, y)| x != y) {
        Some(offset) => Some(offset),
        None if a.len() != b.len() => Some(a.len().min(b.len())),
        None => None,
    }
}

fn excerpt(bytes: &[u8], offset: usize) -> String {
    let start = offset.saturating_sub(16);
    let end = (offset + 16).min(bytes.len());
    String::from_utf8_lossy(&bytes[start.min(end)..end]).into_owned()
}
