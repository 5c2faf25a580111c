//! Tick clock with fixed-timestep accumulator

use std::time::Duration;

const NANOS_PER_SECOND: f64 = 1_000_000_000.0;

/// Converts elapsed time into whole simulation ticks owed at a fixed rate.
///
/// Elapsed time is added to a tick debt; each consumed tick subtracts exactly
/// one, so the fractional remainder carries into the next sample. A long
/// stall only queues more debt.
#[derive(Debug, Clone)]
pub struct TickClock {
    /// Ticks per second, constant for the session
    tick_rate: f64,
    /// Ticks owed but not yet consumed (never negative)
    debt: f64,
    /// Time of the previous sample
    last_sample: Duration,
    /// Ticks consumed since creation
    total_ticks: u64,
}

impl TickClock {
    /// Create a clock ticking `tick_rate` times per second, starting at `now`
    pub fn new(tick_rate: f64, now: Duration) -> Self {
        debug_assert!(tick_rate > 0.0, "tick rate must be positive");
        Self {
            tick_rate,
            debt: 0.0,
            last_sample: now,
            total_ticks: 0,
        }
    }

    /// Sample the clock. Returns the number of whole ticks now owed.
    pub fn advance(&mut self, now: Duration) -> u64 {
        let elapsed = now.saturating_sub(self.last_sample);
        self.debt += elapsed.as_nanos() as f64 * self.tick_rate / NANOS_PER_SECOND;
        self.last_sample = now;
        self.owed_ticks()
    }

    /// Whole ticks currently owed
    pub fn owed_ticks(&self) -> u64 {
        self.debt.floor() as u64
    }

    /// Returns true if at least one tick is owed
    pub fn tick_owed(&self) -> bool {
        self.debt >= 1.0
    }

    /// Consume one owed tick. Returns false (and changes nothing) if none is owed.
    pub fn consume_tick(&mut self) -> bool {
        if !self.tick_owed() {
            return false;
        }
        self.debt -= 1.0;
        self.total_ticks += 1;
        true
    }

    /// Fraction of the next tick already accumulated, for render interpolation
    pub fn interpolation_alpha(&self) -> f64 {
        self.debt.fract()
    }

    /// Time left until the next whole tick is owed
    pub fn time_until_next_tick(&self) -> Duration {
        if self.tick_owed() {
            return Duration::ZERO;
        }
        // rounded up so that waiting this long always makes a tick owed
        let nanos = ((1.0 - self.debt) * NANOS_PER_SECOND / self.tick_rate).ceil();
        Duration::from_nanos((nanos as u64).max(1))
    }

    pub fn tick_rate(&self) -> f64 {
        self.tick_rate
    }

    pub fn debt(&self) -> f64 {
        self.debt
    }

    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }
}
