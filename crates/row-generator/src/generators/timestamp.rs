//! Timestamp value generators.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rand::Rng;

/// Year range of birthday-like timestamps placed in the lookup table.
pub const BIRTHDAY_YEARS: (i32, i32) = (1953, 2006);

/// Generate a random timestamp with millisecond precision in `[start, end]`.
///
/// If `start >= end` the start is returned unchanged.
pub fn generate_timestamp_range<R: Rng>(
    rng: &mut R,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> DateTime<Utc> {
    let start_ms = start.timestamp_millis();
    let end_ms = end.timestamp_millis();

    if start_ms >= end_ms {
        return start;
    }

    let random_ms = rng.random_range(start_ms..=end_ms);
    DateTime::from_timestamp_millis(random_ms).unwrap_or(start)
}

/// Generate a birthday-like timestamp between January 1st of the first and
/// the last year of [`BIRTHDAY_YEARS`].
pub fn generate_birthday<R: Rng>(rng: &mut R) -> DateTime<Utc> {
    let (first, last) = BIRTHDAY_YEARS;
    let start_of = |year: i32| {
        NaiveDate::from_ymd_opt(year, 1, 1)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
            .unwrap_or_default()
    };
    generate_timestamp_range(rng, start_of(first), start_of(last))
}

/// Render a timestamp as RFC 3339 UTC with milliseconds, e.g. `1987-04-12T08:30:00.125Z`.
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}
