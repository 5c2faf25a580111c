//! Sub-sampling of the tick stream for expensive polling work

/// Decimates the tick stream down to a lower-frequency cadence.
///
/// The threshold (ticks per cadence event) is fixed at construction. A
/// cadence rate outside `[1, tick_rate]` is clamped into that range.
#[derive(Debug, Clone)]
pub struct InputCadence {
    threshold: f64,
    counted: f64,
}

impl InputCadence {
    pub fn new(tick_rate: f64, cadence_hz: f64) -> Self {
        let clamped = cadence_hz.max(1.0).min(tick_rate);
        if clamped != cadence_hz {
            log::warn!(
                "Input cadence {cadence_hz} Hz outside [1, {tick_rate}], using {clamped} Hz"
            );
        }
        Self {
            threshold: (tick_rate / clamped).max(1.0),
            counted: 0.0,
        }
    }

    /// Advance by one tick. Returns true when the cadence fires.
    pub fn on_tick(&mut self) -> bool {
        if self.threshold <= 1.0 {
            return true;
        }
        self.counted += 1.0;
        if self.counted >= self.threshold {
            self.counted -= self.threshold;
            true
        } else {
            false
        }
    }

    /// Ticks per cadence event
    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}
