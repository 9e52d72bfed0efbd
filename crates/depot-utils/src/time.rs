//! Conversions between configuration units and [`Duration`].
//!
//! Configuration records store timeouts as whole seconds and retention periods as whole days.
//! Converting back truncates towards zero, so values built from these helpers round-trip exactly.

use std::time::Duration;

pub const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

pub fn from_seconds(seconds: u64) -> Duration {
    Duration::from_secs(seconds)
}

pub fn to_seconds(duration: Duration) -> u64 {
    duration.as_secs()
}

pub fn from_days(days: u32) -> Duration {
    Duration::from_secs(u64::from(days) * SECONDS_PER_DAY)
}

/// Whole days in `duration`, saturating at `u32::MAX`.
pub fn to_days(duration: Duration) -> u32 {
    u32::try_from(duration.as_secs() / SECONDS_PER_DAY).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seconds_round_trip() {
        assert_eq!(to_seconds(from_seconds(60)), 60);
        assert_eq!(to_seconds(from_seconds(0)), 0);
        assert_eq!(to_seconds(Duration::from_millis(1999)), 1);
    }

    #[test]
    fn test_days_round_trip() {
        assert_eq!(from_days(1), Duration::from_secs(86_400));
        assert_eq!(to_days(from_days(100)), 100);
        assert_eq!(to_days(from_days(u32::MAX)), u32::MAX);
        assert_eq!(to_days(Duration::from_secs(86_399)), 0);
    }
}
