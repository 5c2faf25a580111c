//! Frames-per-second measurement sampled in tick space

/// Counts rendered frames and publishes the count once per second of ticks.
///
/// The window closes after `tick_rate` ticks rather than after a wall-clock
/// second, so the reading stays tied to the simulation rate.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    tick_rate: f64,
    ticks: f64,
    frames: u32,
    fps: u32,
}

impl FpsCounter {
    pub fn new(tick_rate: f64) -> Self {
        Self {
            tick_rate,
            ticks: 0.0,
            frames: 0,
            fps: 0,
        }
    }

    pub fn on_tick(&mut self) {
        self.ticks += 1.0;
        if self.ticks >= self.tick_rate {
            self.fps = self.frames;
            self.frames = 0;
            self.ticks -= self.tick_rate;
        }
    }

    pub fn on_frame(&mut self) {
        self.frames += 1;
    }

    /// Frames rendered during the last complete second of ticks
    pub fn fps(&self) -> u32 {
        self.fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publishes_after_one_second_of_ticks() {
        let mut counter = FpsCounter::new(30.0);
        for _ in 0..29 {
            counter.on_frame();
            counter.on_frame();
            counter.on_tick();
        }
        assert_eq!(counter.fps(), 0);

        counter.on_frame();
        counter.on_frame();
        counter.on_tick();
        assert_eq!(counter.fps(), 60);
    }

    #[test]
    fn test_window_resets_between_seconds() {
        let mut counter = FpsCounter::new(10.0);
        for _ in 0..10 {
            counter.on_frame();
            counter.on_tick();
        }
        assert_eq!(counter.fps(), 10);
        for _ in 0..10 {
            counter.on_tick();
        }
        assert_eq!(counter.fps(), 0);
    }
}
