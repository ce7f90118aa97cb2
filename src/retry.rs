/// Retry Policy Module
///
/// Pure exponential back-off computation, capped and monotonic.
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub factor: f64,
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            factor: 2.0,
            max_retries: 5,
        }
    }
}

impl RetryPolicy {
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self { max_retries, ..Self::default() }
    }

    /// Compute the back-off delay for the given attempt number.
    ///
    /// `attempt <= 0` returns `initial_delay`; otherwise the delay grows as
    /// `initial_delay * factor^attempt`, capped at `max_delay`.
    pub fn backoff(&self, attempt: i64) -> Duration {
        if attempt <= 0 {
            return self.initial_delay;
        }

        let scaled = self.initial_delay.as_secs_f64() * self.factor.powi(attempt as i32);
        let capped = scaled.min(self.max_delay.as_secs_f64());
        Duration::from_secs_f64(capped)
    }
}
