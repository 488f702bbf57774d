//! Frame-counted timers.
//!
//! Every wait in the game is measured in fixed steps, never in wall time, so a
//! replayed input sequence always fires the same events on the same frame.
//! Callers decide when a countdown has fired (some fire at zero, some when the
//! count goes negative); this type only counts.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    period: i32,
    remaining: i32,
}

impl Countdown {
    pub const fn new(period: i32) -> Self {
        Self {
            period,
            remaining: period,
        }
    }

    /// Decrement by one step and return the new count.
    pub fn tick(&mut self) -> i32 {
        self.remaining -= 1;
        self.remaining
    }

    pub fn remaining(&self) -> i32 {
        self.remaining
    }

    pub fn period(&self) -> i32 {
        self.period
    }

    pub fn is_negative(&self) -> bool {
        self.remaining < 0
    }

    pub fn rearm(&mut self) {
        self.remaining = self.period;
    }
}
