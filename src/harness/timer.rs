use floating_duration::TimeAsFloat;
use std::time::Instant;

use super::types::{Bracket, Timestamp};

/// Monotonic clock shared by everything measured in one comparison.
///
/// Copies share the same origin, so timestamps taken on different threads
/// through copies of one clock are directly comparable.
#[derive(Clone, Copy, Debug)]
pub struct Clock {
    origin: Instant,
}

impl Clock {
    pub fn new() -> Self {
        Clock {
            origin: Instant::now(),
        }
    }

    pub fn now(&self) -> Timestamp {
        Timestamp::from_secs(self.origin.elapsed().as_fractional_secs())
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

/// Run `op` between two clock readings and hand back both with its result.
///
/// `op` is expected to contain its own failures (return a `Result`, or catch
/// unwinds) so the closing reading is taken on every exit path.
pub fn timed<R>(clock: &Clock, op: impl FnOnce() -> R) -> (Bracket, R) {
    let start = clock.now();
    let ret = op();
    let end = clock.now();
    (Bracket::new(start, end), ret)
}
