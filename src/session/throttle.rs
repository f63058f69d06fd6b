use std::time::{Duration, Instant};

/// Leading-edge rate limiter for pointer-move driven work.
///
/// The first sample always passes; later samples pass once `interval` has elapsed since the
/// last accepted one. Rejected samples are simply dropped.
#[derive(Clone, Debug)]
pub struct Throttle {
    interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    /// Limiter accepting at most one sample per `interval`.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Accept or drop a sample taken at `now`.
    pub fn ready(&mut self, now: Instant) -> bool {
        let accept = self
            .last
            .is_none_or(|last| now.saturating_duration_since(last) >= self.interval);
        if accept {
            self.last = Some(now);
        }
        accept
    }

    /// Forget the last accepted sample so the next one passes.
    pub fn reset(&mut self) {
        self.last = None;
    }
}
