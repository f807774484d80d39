//! Exponential backoff with jitter for chat reconnects.

use std::time::Duration;

use rand::Rng;

/// Delay before reconnect attempt `attempt`.
///
/// Attempt 0 is immediate. Later attempts double from `base_ms` up to
/// `max_ms`, plus up to 10% jitter.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    let exponential_base = 2u64.saturating_pow(attempt - 1);
    let capped_delay = base_ms.saturating_mul(exponential_base).min(max_ms);

    let jitter_range = capped_delay / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped_delay + jitter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_calculation() {
        assert_eq!(calculate_backoff(0, 500, 30_000), Duration::ZERO);

        let b1 = calculate_backoff(1, 500, 30_000);
        assert!(b1.as_millis() >= 500 && b1.as_millis() < 550);

        let b2 = calculate_backoff(2, 500, 30_000);
        assert!(b2.as_millis() >= 1_000 && b2.as_millis() < 1_100);
    }

    #[test]
    fn test_backoff_is_capped() {
        let max = calculate_backoff(40, 500, 30_000);
        assert!(max.as_millis() >= 30_000 && max.as_millis() < 33_000);
    }
}
