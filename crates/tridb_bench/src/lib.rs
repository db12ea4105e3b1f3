//! # TriDB Bench
//!
//! Criterion benchmarks for the TriDB storage engine. The benchmarks live
//! in `benches/`; this crate only provides shared fixtures.

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Generates `count` key-value pairs with fixed-width, ordered keys.
pub fn pairs(count: usize, value_len: usize) -> Vec<(Vec<u8>, Vec<u8>)> {
    (0..count)
        .map(|i| (format!("key-{i:08}").into_bytes(), vec![0xAB; value_len]))
        .collect()
}
