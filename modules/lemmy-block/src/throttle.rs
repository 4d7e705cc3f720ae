use std::time::Duration;

/// Fixed client-side pause between remote calls. Lemmy does not document
/// its rate limits, so every session sleeps the same amount after each call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Throttle {
    pause: Duration,
}

impl Throttle {
    pub const DEFAULT_PAUSE: Duration = Duration::from_millis(250);

    pub fn new(pause: Duration) -> Self {
        Self { pause }
    }

    /// No pausing at all. Used by tests and mock-backed runs.
    pub fn none() -> Self {
        Self {
            pause: Duration::ZERO,
        }
    }

    pub fn duration(&self) -> Duration {
        self.pause
    }

    pub async fn pause(&self) {
        if !self.pause.is_zero() {
            tokio::time::sleep(self.pause).await;
        }
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PAUSE)
    }
}
