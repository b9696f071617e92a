//! Search control — stop flag and time limits.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Node interval between clock checks. Power of two so the test is a mask.
const POLL_INTERVAL: u64 = 2048;

/// Controls when a search should stop.
///
/// The search polls [`should_stop`](SearchControl::should_stop) as it
/// visits nodes; the wall clock is only consulted every [`POLL_INTERVAL`]
/// nodes. Two modes:
/// - **Infinite**: no deadline, only the external stop flag applies
///   (`go infinite`, `go depth N`)
/// - **Timed**: a soft limit consulted between deepening iterations and a
///   hard deadline that aborts mid-iteration
pub struct SearchControl {
    stopped: Arc<AtomicBool>,
    start: Instant,
    soft_limit: Option<Duration>,
    hard_limit: Option<Duration>,
}

impl SearchControl {
    /// Create control for `go infinite` or depth-limited searches.
    pub fn new_infinite(stopped: Arc<AtomicBool>) -> Self {
        Self {
            stopped,
            start: Instant::now(),
            soft_limit: None,
            hard_limit: None,
        }
    }

    /// Create control with time limits; the clock starts immediately.
    pub fn new_timed(stopped: Arc<AtomicBool>, soft: Duration, hard: Duration) -> Self {
        Self {
            stopped,
            start: Instant::now(),
            soft_limit: Some(soft),
            hard_limit: Some(hard),
        }
    }

    /// Check whether the search should abort immediately.
    ///
    /// Returns `true` when the external stop flag is set, or when the hard
    /// deadline has passed (checked only every [`POLL_INTERVAL`] nodes).
    /// A fired deadline latches the stop flag so every subsequent call is
    /// a single atomic load.
    pub fn should_stop(&self, nodes: u64) -> bool {
        if self.stopped.load(Ordering::Relaxed) {
            return true;
        }

        if nodes & (POLL_INTERVAL - 1) != 0 {
            return false;
        }

        if let Some(hard) = self.hard_limit
            && self.elapsed() >= hard
        {
            self.stopped.store(true, Ordering::Release);
            return true;
        }

        false
    }

    /// Check whether iterative deepening should begin another iteration.
    ///
    /// Past the soft limit a fresh iteration would almost certainly be cut
    /// off by the hard deadline, so its work would be discarded.
    pub fn should_stop_iterating(&self) -> bool {
        if self.stopped.load(Ordering::Relaxed) {
            return true;
        }

        match self.soft_limit {
            Some(soft) => self.elapsed() >= soft,
            None => false,
        }
    }

    /// Current state of the stop flag, without consulting the clock.
    ///
    /// Used after every unmake so an aborted search unwinds immediately.
    pub fn stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }

    /// Wall time since the search started.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Reference to the shared stop flag.
    pub fn stop_flag(&self) -> &Arc<AtomicBool> {
        &self.stopped
    }
}
