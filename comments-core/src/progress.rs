// Logs through tracing instead of drawing a bar, so it still shows up when stdout is not a tty.
use {
    std::time::{Duration, Instant},
    tracing::info,
};

pub struct Progress {
    message: String,
    interval: Duration,
    started_at: Instant,
    reported_at: Instant,
    total_processed: u64,
}

impl Progress {
    pub fn new(message: String) -> Self {
        Self::with_interval(message, Duration::from_secs(10))
    }

    pub fn with_interval(message: String, interval: Duration) -> Self {
        Self {
            message,
            interval,
            started_at: Instant::now(),
            reported_at: Instant::now(),
            total_processed: 0,
        }
    }

    /// Counts one processed item. Returns true when a report line was emitted.
    pub fn update(&mut self) -> bool {
        self.total_processed += 1;

        let now = Instant::now();
        if now - self.reported_at >= self.interval {
            self.reported_at = now;
            info!("{}: {} total ({:.2}/second)", self.message, self.total_processed, self.rate(now));
            true
        } else {
            false
        }
    }

    pub fn finish(&self) {
        info!("{}: done, {} total ({:.2}/second)", self.message, self.total_processed, self.rate(Instant::now()));
    }

    fn rate(&self, now: Instant) -> f32 {
        let elapsed = (now - self.started_at).as_secs_f32();
        if elapsed > 0.0 {
            (self.total_processed as f32) / elapsed
        } else {
            0.0
        }
    }
}
