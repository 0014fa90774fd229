//! Usage fee calculation.
//!
//! `fee = floor(hours × rate)`. The product is taken in integer microseconds,
//! so fractional hours truncate exactly and never round up.

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use crate::error::StayError;

/// Default hourly rate in currency units.
pub const DEFAULT_RATE_PER_HOUR: u64 = 1000;

const MICROS_PER_SECOND: u128 = 1_000_000;
const MICROS_PER_HOUR: u128 = 3600 * MICROS_PER_SECOND;

/// Elapsed time of a closed session and what it costs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeeResult {
    /// Never negative.
    pub duration: Duration,
    pub fee: u64,
}

/// Converts elapsed time into a fee at a fixed hourly rate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeeCalculator {
    rate_per_hour: u64,
}

impl Default for FeeCalculator {
    fn default() -> Self {
        Self::new(DEFAULT_RATE_PER_HOUR)
    }
}

impl FeeCalculator {
    pub fn new(rate_per_hour: u64) -> Self {
        Self { rate_per_hour }
    }

    pub fn rate_per_hour(&self) -> u64 {
        self.rate_per_hour
    }

    /// Compute the duration between `start` and `end` and its fee.
    ///
    /// Fails with [`StayError::NegativeDuration`] when `end` is earlier than `start`.
    pub fn compute(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<FeeResult, StayError> {
        let duration = end.signed_duration_since(start);
        if duration < Duration::zero() {
            return Err(StayError::NegativeDuration { start, end });
        }

        let micros = duration.num_seconds() as u128 * MICROS_PER_SECOND
            + (duration.subsec_nanos() / 1000) as u128;
        let fee = micros * self.rate_per_hour as u128 / MICROS_PER_HOUR;

        Ok(FeeResult {
            duration,
            fee: u64::try_from(fee).unwrap_or(u64::MAX),
        })
    }

    /// Like [`compute`](Self::compute), but a negative duration is logged and
    /// clamped to zero instead of failing.
    pub fn compute_clamped(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> FeeResult {
        match self.compute(start, end) {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "clock went backwards, charging nothing");
                FeeResult {
                    duration: Duration::zero(),
                    fee: 0,
                }
            }
        }
    }
}

/// Render a duration as `[D day[s], ]H:MM:SS[.ffffff]`.
///
/// Negative inputs render as zero.
pub fn format_duration(duration: Duration) -> String {
    let duration = duration.max(Duration::zero());
    let total_secs = duration.num_seconds();
    let micros = duration.subsec_nanos() / 1000;

    let days = total_secs / 86_400;
    let rem = total_secs % 86_400;
    let (hours, minutes, seconds) = (rem / 3600, rem % 3600 / 60, rem % 60);

    let mut out = String::new();
    if days > 0 {
        let unit = if days == 1 { "day" } else { "days" };
        out.push_str(&format!("{days} {unit}, "));
    }
    out.push_str(&format!("{hours}:{minutes:02}:{seconds:02}"));
    if micros > 0 {
        out.push_str(&format!(".{micros:06}"));
    }
    out
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
