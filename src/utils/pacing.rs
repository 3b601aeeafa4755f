use std::time::Duration;

/// Fixed-interval courtesy pacing between outbound calls. Tests construct a
/// zero-interval pacer so timing behavior is observable without wall-clock
/// waits.
#[derive(Debug, Clone)]
pub struct Pacer {
    interval: Duration,
}

impl Pacer {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn none() -> Self {
        Self { interval: Duration::ZERO }
    }

    pub async fn pause(&self) {
        if !self.interval.is_zero() {
            tokio::time::sleep(self.interval).await;
        }
    }
}
