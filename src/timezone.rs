//! Resolves the configured timezone for date defaults in forms.

use time::{Date, OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

/// Get the UTC offset for a canonical timezone name, e.g. "Pacific/Auckland".
///
/// Returns `None` if `canonical_timezone` is not a known timezone.
pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// Get today's date in the given canonical timezone.
///
/// Returns `None` if `canonical_timezone` is not a known timezone.
pub fn local_today(canonical_timezone: &str) -> Option<Date> {
    get_local_offset(canonical_timezone)
        .map(|offset| OffsetDateTime::now_utc().to_offset(offset).date())
}
