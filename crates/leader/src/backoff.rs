// SPDX-License-Identifier: MIT

//! Doubling backoff for candidacy re-offers, reset on successful
//! activation.

use parking_lot::Mutex;
use std::time::Duration;

const INITIAL_DELAY: Duration = Duration::from_millis(500);
const CEILING: Duration = Duration::from_secs(16);

/// Tracks the current re-offer delay. `increase()` doubles the delay
/// while it is `<= CEILING`; since the comparison is inclusive, one
/// doubling past the ceiling is possible (effectively up to 32s). This
/// matches the documented behavior of the system this core models and is
/// reproduced deliberately, not clamped.
pub struct BackoffController {
    delay: Mutex<Duration>,
}

impl BackoffController {
    pub fn new() -> Self {
        Self { delay: Mutex::new(INITIAL_DELAY) }
    }

    pub fn current(&self) -> Duration {
        *self.delay.lock()
    }

    pub fn increase(&self) {
        let mut delay = self.delay.lock();
        if *delay <= CEILING {
            *delay *= 2;
        }
    }

    pub fn reset(&self) {
        *self.delay.lock() = INITIAL_DELAY;
    }
}

impl Default for BackoffController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    #[test]
    fn starts_at_initial_delay() {
        assert_eq!(BackoffController::new().current(), Duration::from_millis(500));
    }

    #[test]
    fn reset_returns_to_initial_delay_after_increases() {
        let backoff = BackoffController::new();
        backoff.increase();
        backoff.increase();
        backoff.reset();
        assert_eq!(backoff.current(), Duration::from_millis(500));
    }

    #[parameterized(
        one = { 1, Duration::from_secs(1) },
        two = { 2, Duration::from_secs(2) },
        three = { 3, Duration::from_secs(4) },
        four = { 4, Duration::from_secs(8) },
        five = { 5, Duration::from_secs(16) },
        six = { 6, Duration::from_secs(32) },
    )]
    fn doubles_on_each_failure_with_inclusive_ceiling_quirk(failures: u32, expected: Duration) {
        let backoff = BackoffController::new();
        for _ in 0..failures {
            backoff.increase();
        }
        assert_eq!(backoff.current(), expected);
    }

    #[test]
    fn stops_doubling_once_strictly_past_ceiling() {
        let backoff = BackoffController::new();
        for _ in 0..6 {
            backoff.increase();
        }
        assert_eq!(backoff.current(), Duration::from_secs(32));
        backoff.increase();
        assert_eq!(backoff.current(), Duration::from_secs(32), "32s > 16s ceiling, no further doubling");
    }
}
