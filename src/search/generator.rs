//! The vanity search state machine.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use super::{Clock, KeypairSource, OsKeypairSource, SearchParams, SystemClock};
use crate::crypto::Keypair;
use crate::error::{MintError, Result};
use crate::matcher::Pattern;

/// Attempts between progress log lines.
const PROGRESS_LOG_INTERVAL: u64 = 10_000;

/// Where a search currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    Searching,
    Found,
    TimedOut,
    Exhausted,
    Cancelled,
}

impl SearchState {
    /// Returns true once the search can make no further progress.
    #[inline]
    pub fn is_terminal(self) -> bool {
        !matches!(self, SearchState::Searching)
    }
}

/// Counters readable while a search runs.
#[derive(Debug, Default)]
pub struct SearchStats {
    attempts: AtomicU64,
}

impl SearchStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts completed, updated once per batch.
    pub fn total_attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }
}

/// A keypair whose address matched, with what it took to find it.
#[derive(Debug, Clone)]
pub struct VanityMatch {
    pub keypair: Keypair,
    pub attempts: u64,
    pub elapsed: Duration,
}

impl VanityMatch {
    pub fn attempts_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.attempts as f64 / secs
        } else {
            0.0
        }
    }
}

/// One vanity search: owns its counters, deadline and keypair source.
///
/// Work happens in batches of `batch_size` attempts through [`step`]; the
/// drivers [`run`] and [`run_async`] yield between batches.
///
/// [`step`]: VanitySearch::step
/// [`run`]: VanitySearch::run
/// [`run_async`]: VanitySearch::run_async
pub struct VanitySearch<S = OsKeypairSource, C = SystemClock> {
    pattern: Pattern,
    max_attempts: u64,
    timeout: Duration,
    batch_size: u64,
    source: S,
    clock: C,
    started: Instant,
    attempts: u64,
    state: SearchState,
    found: Option<Keypair>,
    stop_flag: Arc<AtomicBool>,
    stats: Arc<SearchStats>,
}

impl VanitySearch {
    /// Creates a search over fresh OS-random keypairs and the system clock.
    pub fn new(params: &SearchParams) -> Result<Self> {
        Self::with_parts(params, OsKeypairSource, SystemClock)
    }
}

impl<S: KeypairSource, C: Clock> VanitySearch<S, C> {
    /// Creates a search with an explicit keypair source and clock.
    ///
    /// The deadline starts counting now.
    pub fn with_parts(params: &SearchParams, source: S, clock: C) -> Result<Self> {
        let pattern = params.pattern()?;
        let started = clock.now();

        debug!(
            prefix = %params.prefix,
            compared = %pattern.pattern(),
            max_attempts = params.max_attempts,
            timeout_secs = params.timeout.as_secs_f64(),
            "Starting vanity search"
        );

        Ok(Self {
            pattern,
            max_attempts: params.max_attempts,
            timeout: params.timeout,
            batch_size: params.batch_size,
            source,
            clock,
            started,
            attempts: 0,
            state: SearchState::Searching,
            found: None,
            stop_flag: Arc::new(AtomicBool::new(false)),
            stats: Arc::new(SearchStats::new()),
        })
    }

    /// Shares an external stop flag (e.g. a Ctrl-C handler's).
    pub fn with_stop_flag(mut self, stop_flag: Arc<AtomicBool>) -> Self {
        self.stop_flag = stop_flag;
        self
    }

    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    pub fn stats(&self) -> Arc<SearchStats> {
        self.stats.clone()
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    pub fn elapsed(&self) -> Duration {
        self.clock.now().saturating_duration_since(self.started)
    }

    /// Runs at most one batch and returns the resulting state.
    ///
    /// Each attempt checks, in order: match (success wins at a limit),
    /// deadline, attempt budget.
    pub fn step(&mut self) -> SearchState {
        if self.state.is_terminal() {
            return self.state;
        }
        if self.stop_flag.load(Ordering::Relaxed) {
            self.state = SearchState::Cancelled;
            return self.state;
        }
        if self.elapsed() >= self.timeout {
            self.state = SearchState::TimedOut;
            return self.state;
        }

        let mut batch = 0;
        while batch < self.batch_size {
            batch += 1;
            self.attempts += 1;

            let keypair = self.source.next_keypair();
            let address = keypair.address().to_base58();

            if self.attempts % PROGRESS_LOG_INTERVAL == 0 {
                let elapsed = self.elapsed().as_secs_f64();
                debug!(
                    attempts = self.attempts,
                    address = %address,
                    elapsed_secs = elapsed,
                    rate = self.attempts as f64 / elapsed.max(f64::EPSILON),
                    "Search progress"
                );
            }

            if self.pattern.matches_text(&address) {
                info!(
                    attempts = self.attempts,
                    elapsed_secs = self.elapsed().as_secs_f64(),
                    address = %address,
                    "Found matching address"
                );
                self.found = Some(keypair);
                self.state = SearchState::Found;
                break;
            }
            if self.elapsed() >= self.timeout {
                self.state = SearchState::TimedOut;
                break;
            }
            if self.attempts >= self.max_attempts {
                self.state = SearchState::Exhausted;
                break;
            }
        }

        self.stats.attempts.fetch_add(batch, Ordering::Relaxed);
        self.state
    }

    /// Drives the search to completion on the current thread.
    pub fn run(mut self) -> Result<VanityMatch> {
        while !self.step().is_terminal() {
            thread::yield_now();
        }
        self.into_outcome()
    }

    /// Drives the search cooperatively inside a tokio runtime.
    ///
    /// Yields to the scheduler between batches. A tokio timer races the
    /// batches and is dropped as soon as the search resolves.
    pub async fn run_async(mut self) -> Result<VanityMatch> {
        let timer = tokio::time::sleep(self.timeout.saturating_sub(self.elapsed()));
        tokio::pin!(timer);

        loop {
            tokio::select! {
                biased;
                _ = &mut timer => {
                    if !self.state.is_terminal() {
                        self.state = SearchState::TimedOut;
                    }
                    return self.into_outcome();
                }
                _ = tokio::task::yield_now() => {}
            }

            if self.step().is_terminal() {
                return self.into_outcome();
            }
        }
    }

    fn into_outcome(self) -> Result<VanityMatch> {
        let attempts = self.attempts;
        // The runtime timer in `run_async` can expire while the injected
        // clock lags behind; a timeout never reports less than its budget.
        let elapsed = match self.state {
            SearchState::TimedOut => self.elapsed().max(self.timeout),
            _ => self.elapsed(),
        };

        match (self.state, self.found) {
            (SearchState::Found, Some(keypair)) => Ok(VanityMatch {
                keypair,
                attempts,
                elapsed,
            }),
            (SearchState::TimedOut, _) => {
                debug!(attempts, "Vanity search timed out");
                Err(MintError::Timeout { attempts, elapsed })
            }
            (SearchState::Exhausted, _) => {
                debug!(attempts, "Vanity search exhausted its attempts");
                Err(MintError::AttemptsExhausted { attempts })
            }
            _ => Err(MintError::Cancelled { attempts }),
        }
    }
}
