//! Background search runner.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError};

use super::{Clock, KeypairSource, SearchParams, SearchStats, VanityMatch, VanitySearch};
use crate::error::{MintError, Result};
use crate::matcher::Pattern;

/// Runs a single search on its own thread so the caller stays responsive.
///
/// There is exactly one search thread; the caller polls for the outcome and
/// can read progress from the shared stats in between.
pub struct SearchRunner {
    /// The pattern being searched for
    pattern: Pattern,
    /// Search thread handle (Option to allow taking during join)
    handle: Option<JoinHandle<()>>,
    /// Channel receiver for the outcome
    result_rx: Receiver<Result<VanityMatch>>,
    /// Shared stop flag
    stop_flag: Arc<AtomicBool>,
    /// Shared statistics
    stats: Arc<SearchStats>,
    /// Start time
    start_time: Instant,
}

impl SearchRunner {
    /// Starts a search with the OS keypair source and system clock.
    pub fn spawn(params: &SearchParams) -> Result<Self> {
        Self::spawn_search(VanitySearch::new(params)?)
    }

    /// Starts an already configured search.
    pub fn spawn_search<S, C>(search: VanitySearch<S, C>) -> Result<Self>
    where
        S: KeypairSource + 'static,
        C: Clock + 'static,
    {
        let (result_tx, result_rx) = bounded(1);
        let pattern = search.pattern().clone();
        let stop_flag = search.stop_flag();
        let stats = search.stats();

        let handle = thread::Builder::new()
            .name("vanity-search".into())
            .spawn(move || {
                // Receiver may be gone if the runner was dropped early.
                let _ = result_tx.send(search.run());
            })?;

        Ok(Self {
            pattern,
            handle: Some(handle),
            result_rx,
            stop_flag,
            stats,
            start_time: Instant::now(),
        })
    }

    /// Waits up to `timeout` for the outcome.
    ///
    /// Returns `None` if the search is still running.
    pub fn wait_for_result(&self, timeout: Duration) -> Option<Result<VanityMatch>> {
        match self.result_rx.recv_timeout(timeout) {
            Ok(outcome) => Some(outcome),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Err(MintError::Cancelled {
                attempts: self.total_attempts(),
            })),
        }
    }

    /// Signals the search to stop at the next batch boundary.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::Relaxed);
    }

    /// Stops the search and waits for its thread.
    pub fn join(mut self) {
        self.stop();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Returns the pattern being searched for.
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Returns the attempts made so far.
    pub fn total_attempts(&self) -> u64 {
        self.stats.total_attempts()
    }

    /// Returns the elapsed time since the runner was started.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Returns the current attempt rate.
    pub fn attempts_per_second(&self) -> f64 {
        let elapsed = self.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.total_attempts() as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Returns a clone of the stop flag for external use (e.g., signal handlers).
    pub fn stop_flag_clone(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    /// Returns true if the search has been signaled to stop.
    pub fn is_stopped(&self) -> bool {
        self.stop_flag.load(Ordering::Relaxed)
    }
}

impl Drop for SearchRunner {
    fn drop(&mut self) {
        self.stop();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Keypair;
    use crate::search::ManualClock;

    #[test]
    fn test_runner_delivers_match() {
        let params = SearchParams::new("a").with_match_length(1);
        let runner = SearchRunner::spawn(&params).unwrap();

        let outcome = loop {
            if let Some(outcome) = runner.wait_for_result(Duration::from_millis(50)) {
                break outcome;
            }
        };
        let found = outcome.unwrap();
        assert!(runner.pattern().matches(found.keypair.address()).is_match());
        runner.join();
    }

    #[test]
    fn test_runner_stop_cancels() {
        let keypair = Keypair::from_seed([4u8; 32]);
        let first = keypair.address().to_base58().chars().next().unwrap();
        let prefix = if first.eq_ignore_ascii_case(&'z') { "222" } else { "zzz" };

        let params = SearchParams::new(prefix)
            .with_match_length(3)
            .with_batch_size(10);
        let search =
            VanitySearch::with_parts(&params, move || keypair.clone(), ManualClock::new()).unwrap();
        let runner = SearchRunner::spawn_search(search).unwrap();

        runner.stop();
        assert!(runner.is_stopped());
        match runner.wait_for_result(Duration::from_secs(5)) {
            Some(Err(MintError::Cancelled { .. })) => {}
            other => panic!("expected Cancelled, got {:?}", other),
        }
    }
}
