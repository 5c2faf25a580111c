//! Frame-rate cap

use std::time::Duration;

/// Permits at most `max_fps` frames per second.
///
/// Deadlines are computed from the first permitted frame as
/// `origin + n * interval`, so the cap never drifts no matter how the
/// interval rounds to nanoseconds.
#[derive(Debug, Clone)]
pub struct FrameLimiter {
    /// Nanoseconds per frame; 0 means uncapped
    interval_nanos: f64,
    /// Time of the first permitted frame
    origin: Option<Duration>,
    /// Frames permitted since `origin`
    permitted: u64,
}

impl FrameLimiter {
    pub fn new(max_fps: u32) -> Self {
        let interval_nanos = if max_fps == 0 {
            0.0
        } else {
            1_000_000_000.0 / max_fps as f64
        };
        Self {
            interval_nanos,
            origin: None,
            permitted: 0,
        }
    }

    pub fn is_capped(&self) -> bool {
        self.interval_nanos > 0.0
    }

    /// Ask whether a frame may render at `now`. Advances the deadline by one
    /// interval when it does.
    pub fn permit(&mut self, now: Duration) -> bool {
        if !self.is_capped() {
            return true;
        }
        match self.next_deadline() {
            None => {
                self.origin = Some(now);
                self.permitted = 1;
                true
            }
            Some(deadline) if now >= deadline => {
                self.permitted += 1;
                true
            }
            Some(_) => false,
        }
    }

    /// When the next frame becomes permitted; `None` when uncapped or before the first frame
    pub fn next_deadline(&self) -> Option<Duration> {
        if !self.is_capped() {
            return None;
        }
        self.origin.map(|origin| {
            origin + Duration::from_nanos((self.permitted as f64 * self.interval_nanos).round() as u64)
        })
    }

    /// Time left until the next frame is permitted
    pub fn time_until_deadline(&self, now: Duration) -> Duration {
        self.next_deadline()
            .map(|deadline| deadline.saturating_sub(now))
            .unwrap_or(Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uncapped_always_permits() {
        let mut limiter = FrameLimiter::new(0);
        assert!(!limiter.is_capped());
        assert!((0..1000).all(|_| limiter.permit(Duration::ZERO)));
        assert_eq!(limiter.next_deadline(), None);
    }

    #[test]
    fn test_sixty_fps_over_one_second() {
        let mut limiter = FrameLimiter::new(60);
        let mut frames = 0;
        // 600 samples spread over one second
        for i in 0..600u64 {
            let now = Duration::from_nanos(i * 1_000_000_000 / 600);
            if limiter.permit(now) {
                frames += 1;
            }
        }
        assert!((frames as i64 - 60).abs() <= 1, "got {frames} frames");
    }

    #[test]
    fn test_deadline_accumulates_without_drift() {
        let mut limiter = FrameLimiter::new(60);
        let start = Duration::from_millis(3);
        assert!(limiter.permit(start));

        let mut now = start;
        let mut permitted = 1u64;
        while permitted < 600 {
            // sample late by varying amounts; deadlines must not absorb the lateness
            now += Duration::from_micros(700);
            if limiter.permit(now) {
                permitted += 1;
            }
        }
        let expected = start.as_secs_f64() + permitted as f64 / 60.0;
        let deadline = limiter.next_deadline().unwrap().as_secs_f64();
        assert!((deadline - expected).abs() < 1e-6);
    }

    #[test]
    fn test_denies_before_deadline() {
        let mut limiter = FrameLimiter::new(10);
        assert!(limiter.permit(Duration::ZERO));
        assert!(!limiter.permit(Duration::from_millis(50)));
        assert_eq!(
            limiter.time_until_deadline(Duration::from_millis(50)),
            Duration::from_millis(50)
        );
        assert!(limiter.permit(Duration::from_millis(100)));
    }
}
