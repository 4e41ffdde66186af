//! Loop timing helpers.

use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Fixed-frequency loop limiter.
///
/// `sleep` blocks for the remainder of the current period. When an
/// iteration overruns, the schedule restarts from now instead of trying to
/// catch up, so the loop is never busier than the configured rate.
#[derive(Debug, Clone)]
pub struct Rate {
    period: Duration,
    next: Instant,
}

impl Rate {
    /// Create a limiter for `hz` iterations per second.
    ///
    /// A non-positive or non-finite rate disables sleeping.
    pub fn new(hz: f64) -> Self {
        let period = if hz.is_finite() && hz > 0.0 {
            Duration::from_secs_f64(1.0 / hz)
        } else {
            Duration::ZERO
        };
        Self {
            period,
            next: Instant::now() + period,
        }
    }

    /// Loop period.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Sleep until the end of the current period.
    pub fn sleep(&mut self) {
        let now = Instant::now();
        if self.next > now {
            thread::sleep(self.next - now);
            self.next += self.period;
        } else {
            self.next = now + self.period;
        }
    }
}

/// Lets an action through at most once per period.
#[derive(Debug, Clone)]
pub struct Throttle {
    period: Duration,
    last: Option<Instant>,
}

impl Throttle {
    /// Create a throttle with the given minimum spacing.
    pub fn new(period: Duration) -> Self {
        Self { period, last: None }
    }

    /// True when the action may run now; records the time if so.
    pub fn ready(&mut self) -> bool {
        let now = Instant::now();
        match self.last {
            Some(last) if now.duration_since(last) < self.period => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

/// Get current timestamp in microseconds.
pub fn now_us() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}
