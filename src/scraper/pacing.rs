use rand::Rng;
use std::time::Duration;

/// A randomized pause, uniform between `min` and `max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pacing {
    pub min: Duration,
    pub max: Duration,
}

impl Pacing {
    pub const fn secs(min: u64, max: u64) -> Self {
        Self {
            min: Duration::from_secs(min),
            max: Duration::from_secs(max),
        }
    }

    /// Before each page request, and between pages.
    pub const fn request() -> Self {
        Self::secs(2, 4)
    }

    /// After each locality, whatever its outcome.
    pub const fn locality() -> Self {
        Self::secs(3, 5)
    }

    pub const fn none() -> Self {
        Self::secs(0, 0)
    }

    pub fn next_delay(&self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        rand::thread_rng().gen_range(self.min..=self.max)
    }

    pub fn pause(&self) {
        let delay = self.next_delay();
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
}
