use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: u64,
    /// Fraction of the delay added or removed at random, 0.0 disables jitter.
    pub jitter_ratio: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 1000,
            max_delay_ms: 10_000,
            backoff_multiplier: 2,
            jitter_ratio: 0.0,
        }
    }
}

impl RetryConfig {
    /// Attempts actually made; a configured zero still allows one.
    pub fn effective_attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Backoff before the attempt following `attempt` (1-based), without jitter:
    /// `min(initial * multiplier^(attempt - 1), max)`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let factor = self.backoff_multiplier.max(1).saturating_pow(exponent);
        let delay_ms = self
            .initial_delay_ms
            .saturating_mul(factor)
            .min(self.max_delay_ms);

        Duration::from_millis(delay_ms)
    }

    /// Delay to sleep after `attempt`, with jitter applied.
    ///
    /// Jitter only adds time, at most `jitter_ratio` of the gap to the next
    /// step, so consecutive delays never shrink and never pass the cap.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let base = self.delay_after(attempt);
        if self.jitter_ratio <= 0.0 {
            return base;
        }

        let headroom = self.delay_after(attempt.saturating_add(1)).saturating_sub(base);
        if headroom.is_zero() {
            return base;
        }

        let ratio = self.jitter_ratio.min(1.0);
        let extra_ms = rand::random_range(0.0..=ratio) * headroom.as_millis() as f64;
        let jittered_ms = (base.as_millis() as u64).saturating_add(extra_ms as u64);

        Duration::from_millis(jittered_ms.min(self.max_delay_ms))
    }
}
