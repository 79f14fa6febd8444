//! Frame-driven timers.
//!
//! Nothing here sleeps. The host loop reports elapsed time through
//! [`Timer::advance`] and the timer answers how many times it expired inside
//! that slice, so a long frame catches up instead of dropping ticks.

use std::convert::TryFrom;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Idle,
    Once,
    Repeating(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    mode: Mode,
    remaining: Duration,
}

impl Default for Timer {
    fn default() -> Self {
        Self::idle()
    }
}

impl Timer {
    pub fn idle() -> Self {
        Self {
            mode: Mode::Idle,
            remaining: Duration::ZERO,
        }
    }

    pub fn once(delay: Duration) -> Self {
        Self {
            mode: Mode::Once,
            remaining: delay,
        }
    }

    pub fn repeating(period: Duration) -> Self {
        Self {
            mode: Mode::Repeating(period),
            remaining: period,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.mode != Mode::Idle
    }

    /// Disarms the timer. Later calls to `advance` report nothing.
    pub fn cancel(&mut self) {
        *self = Self::idle();
    }

    /// Moves the timer forward by `dt` and returns how many times it expired.
    ///
    /// A one-shot timer expires at most once and disarms itself. A repeating
    /// timer with a zero period returns `u32::MAX`; the caller stops pulling
    /// ticks once it has nothing left to do.
    pub fn advance(&mut self, dt: Duration) -> u32 {
        match self.mode {
            Mode::Idle => 0,
            Mode::Once => {
                if dt >= self.remaining {
                    self.cancel();
                    1
                } else {
                    self.remaining -= dt;
                    0
                }
            }
            Mode::Repeating(period) => {
                if period == Duration::ZERO {
                    return u32::MAX;
                }
                if dt < self.remaining {
                    self.remaining -= dt;
                    return 0;
                }

                let overshoot = dt - self.remaining;
                let extra = overshoot.as_nanos() / period.as_nanos();
                let leftover = overshoot.as_nanos() % period.as_nanos();
                self.remaining = period - Duration::from_nanos(leftover as u64);

                u32::try_from(extra + 1).unwrap_or(u32::MAX)
            }
        }
    }
}
