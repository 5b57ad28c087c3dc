//! # Invariant Ledger
//!
//! Hot paths call [`assert_invariant`] with a fixed description. A failed
//! check is logged and, in debug and test builds, panics. A passing check is
//! recorded so tests can later prove with [`contract_test`] that the rule was
//! actually enforced rather than silently skipped.

use std::collections::HashSet;
use std::sync::Mutex;
use lazy_static::lazy_static;
use log::{error, trace};

/// Every chunk fits the configured literal limit.
pub const CHUNK_WITHIN_BOUND: &str = "Every chunk is at most the maximum chunk length";
/// Only the trailing chunk of a file may be short.
pub const ONLY_LAST_CHUNK_SHORT: &str = "Only the final chunk of a file may be shorter than the maximum";
/// Chunking is lossless.
pub const CHUNKS_REASSEMBLE: &str = "Concatenated chunks reproduce the encoded content";

lazy_static! {
    /// Descriptions of invariants that have held at least once in this process.
    static ref CHECKED_INVARIANTS: Mutex<HashSet<&'static str>> = Mutex::new(HashSet::new());
}

/// Records `description` as checked when `condition` holds; reports a violation otherwise.
///
/// `component` tags the log line (e.g. "Encoder").
pub fn assert_invariant(condition: bool, description: &'static str, component: &str) {
    if !condition {
        let msg = format!("INVARIANT VIOLATION [{}]: {}", component, description);
        error!("{}", msg);
        if cfg!(debug_assertions) || cfg!(test) {
            panic!("{}", msg);
        }
        return;
    }

    let mut set = CHECKED_INVARIANTS.lock().unwrap_or_else(|e| e.into_inner());
    if set.insert(description) {
        trace!("[{}] invariant enforced: {}", component, description);
    }
}

/// Panics unless every one of `required` has been asserted in this process.
#[cfg(test)]
pub fn contract_test(context: &str, required: &[&'static str]) {
    let missing: Vec<&'static str> = {
        let checked = CHECKED_INVARIANTS.lock().unwrap_or_else(|e| e.into_inner());
        required.iter().copied().filter(|r| !checked.contains(r)).collect()
    };

    if !missing.is_empty() {
        panic!("Contract '{}' failed; never checked:\n{:#?}", context, missing);
    }
}
