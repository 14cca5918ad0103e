//! Linear, time-based parking cost.
//!
//! The unit of time is the hour: a lot priced at `10.0` charges 10 per hour
//! parked, pro rata to the second.

use chrono::{DateTime, Utc};

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Elapsed parking time in hours. Negative spans (clock skew) count as zero.
pub fn hours_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let seconds = (end - start).num_milliseconds() as f64 / 1000.0;
    (seconds / SECONDS_PER_HOUR).max(0.0)
}

/// Cost of parking from `start` to `end` at `rate_per_hour`.
pub fn parking_cost(start: DateTime<Utc>, end: DateTime<Utc>, rate_per_hour: f64) -> f64 {
    hours_between(start, end) * rate_per_hour
}
