//! Vanity keypair search.
//!
//! This module provides:
//! - An explicit search state machine with injectable keypair source and clock
//! - Blocking and cooperative (tokio) drivers that yield between batches
//! - A background runner for interactive callers
//!
//! A search is single-threaded; batches run strictly one after another.

mod clock;
mod generator;
mod params;
mod runner;
mod source;

use std::time::Duration;

pub use clock::{Clock, ManualClock, SystemClock};
pub use generator::{SearchState, SearchStats, VanityMatch, VanitySearch};
pub use params::{
    SearchParams, DEFAULT_BATCH_SIZE, DEFAULT_MATCH_LENGTH, DEFAULT_MAX_ATTEMPTS, DEFAULT_PREFIX,
    DEFAULT_TIMEOUT,
};
pub use runner::SearchRunner;
pub use source::{KeypairSource, OsKeypairSource};

use crate::error::Result;

/// Searches for a keypair whose address starts with the first
/// `prefix_match_length` characters of `prefix`, ignoring case.
pub fn generate(
    prefix: &str,
    prefix_match_length: usize,
    max_attempts: u64,
    timeout: Duration,
) -> Result<VanityMatch> {
    let params = SearchParams::new(prefix)
        .with_match_length(prefix_match_length)
        .with_max_attempts(max_attempts)
        .with_timeout(timeout);

    VanitySearch::new(&params)?.run()
}
