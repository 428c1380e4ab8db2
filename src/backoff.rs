use std::time::Duration;

use crate::ClientOptions;

/// Exponential backoff counter scoped to a single call.
///
/// The nth delay is `min * factor^n`, capped at `max`. With jitter enabled the
/// delay is drawn uniformly from `[min, min * factor^n)`.
#[derive(Clone, Debug)]
pub(crate) struct Backoff {
    min: Duration,
    max: Duration,
    factor: f64,
    jitter: bool,
    attempt: u32,
}

impl Backoff {
    pub(crate) fn from_options(options: &ClientOptions) -> Self {
        Self {
            min: Duration::from_millis(options.min_backoff_ms),
            max: Duration::from_millis(options.max_backoff_ms),
            factor: options.backoff_factor,
            jitter: true,
            attempt: 0,
        }
    }

    #[cfg(test)]
    fn without_jitter(mut self) -> Self {
        self.jitter = false;
        self
    }

    /// Number of delays handed out so far.
    pub(crate) fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Returns the delay for the current attempt and advances the counter.
    pub(crate) fn next_delay(&mut self) -> Duration {
        let delay = self.delay_for(self.attempt, rand::random::<f64>());
        self.attempt = self.attempt.saturating_add(1);
        delay
    }

    fn delay_for(&self, attempt: u32, unit: f64) -> Duration {
        if self.min >= self.max {
            return self.max;
        }

        let factor = if self.factor.is_finite() && self.factor > 0.0 {
            self.factor
        } else {
            2.0
        };
        let min = self.min.as_nanos() as f64;
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let mut delay = min * factor.powi(exponent);

        if self.jitter && delay.is_finite() {
            delay = unit * (delay - min) + min;
        }

        if !delay.is_finite() || delay > self.max.as_nanos() as f64 {
            return self.max;
        }
        if delay < min {
            return self.min;
        }
        Duration::from_nanos(delay as u64)
    }
}
