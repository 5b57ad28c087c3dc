//! # Encoder
//!
//! Turns raw resource bytes into printable text and slices that text into
//! literals short enough for the target compiler.
//!
//! ## Consumer contract
//!
//! The generated header is only useful if the program that includes it
//! reverses these steps exactly:
//!
//! 1. Concatenate `<IDENT>_CHUNKS` in declaration order, with no separator.
//! 2. Decode the result as **standard** base64 (RFC 4648 alphabet
//!    `A-Z a-z 0-9 + /`, with `=` padding).
//! 3. Use `<IDENT>_PATH` as the lookup key for the recovered bytes.
//!
//! Chunk boundaries are arbitrary character offsets, not 4-character groups,
//! so chunks must never be decoded one at a time.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::invariant_ppt::{
    assert_invariant, CHUNKS_REASSEMBLE, CHUNK_WITHIN_BOUND, ONLY_LAST_CHUNK_SHORT,
};

/// Encodes `bytes` with the standard padded base64 alphabet.
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Splits `encoded` into consecutive slices of at most `max_len` characters.
///
/// Every slice except possibly the last is exactly `max_len` long. Empty input
/// yields no chunks.
pub fn split_chunks(encoded: &str, max_len: usize) -> Vec<&str> {
    let max_len = max_len.max(1);
    let mut chunks = Vec::with_capacity(encoded.len().div_ceil(max_len));
    let mut rest = encoded;

    while !rest.is_empty() {
        let cut = rest
            .char_indices()
            .nth(max_len)
            .map_or(rest.len(), |(idx, _)| idx);
        let (head, tail) = rest.split_at(cut);
        chunks.push(head);
        rest = tail;
    }

    check_chunks(encoded, &chunks, max_len);
    chunks
}

fn check_chunks(encoded: &str, chunks: &[&str], max_len: usize) {
    let lengths: Vec<usize> = chunks.iter().map(|c| c.chars().count()).collect();

    assert_invariant(
        lengths.iter().all(|&len| len > 0 && len <= max_len),
        CHUNK_WITHIN_BOUND,
        "Encoder",
    );
    assert_invariant(
        lengths.iter().rev().skip(1).all(|&len| len == max_len),
        ONLY_LAST_CHUNK_SHORT,
        "Encoder",
    );
    assert_invariant(chunks.concat() == encoded, CHUNKS_REASSEMBLE, "Encoder");
}
