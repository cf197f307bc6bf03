//! Cache TTL policy.

use std::time::Duration;

/// Maximum fraction added on top of a base TTL.
pub const JITTER_FRACTION: f64 = 0.1;

/// Spreads `base` uniformly over `[base, base * 1.1)` so that keys cached
/// at the same moment do not all expire together.
pub fn jitter(base: Duration) -> Duration {
    jitter_with(base, rand::random::<f64>())
}

fn jitter_with(base: Duration, unit: f64) -> Duration {
    base.mul_f64(1.0 + unit * JITTER_FRACTION)
}

/// TTL for a live URL: the jittered base, never longer than the record's
/// remaining validity.
pub fn live_ttl(base: Duration, remaining: Duration) -> Duration {
    jitter(base).min(remaining)
}
