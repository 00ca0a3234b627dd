//! Pacing clock for controlled time progression between operations

use std::time::Duration;

/// Scales the pauses a customer takes between operations.
///
/// A scale of 1.0 sleeps in real time, larger scales compress it, and zero
/// skips sleeping entirely, which is what the tests use.
#[derive(Debug, Clone)]
pub struct SimClock {
    time_scale: f64,
}

impl SimClock {
    /// Create a clock with the given speed multiplier.
    pub fn new(time_scale: f64) -> Self {
        Self { time_scale }
    }

    /// Create a clock that never sleeps.
    pub fn instant() -> Self {
        Self::new(0.0)
    }

    /// Pause for the given duration, scaled by the clock's speed.
    pub async fn pause(&self, duration: Duration) {
        if self.time_scale > 0.0 {
            let scaled = Duration::from_secs_f64(duration.as_secs_f64() / self.time_scale);
            tokio::time::sleep(scaled).await;
        }
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_instant_clock_never_sleeps() {
        let clock = SimClock::instant();
        let start = Instant::now();
        clock.pause(Duration::from_secs(60)).await;
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_scaled_clock_compresses_time() {
        let clock = SimClock::new(100.0);
        let start = Instant::now();
        clock.pause(Duration::from_secs(1)).await;
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(10));
        assert!(elapsed < Duration::from_millis(500));
    }
}
