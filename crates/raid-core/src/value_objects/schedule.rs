//! Server-local date and time handling
//!
//! Events are entered in the server's configured timezone and stored with the
//! UTC offset that was in effect for that local instant.

use chrono::{
    DateTime, Datelike, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone,
    Utc,
};
use chrono_tz::Tz;

/// Date formats that carry a year
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%b %d %Y",
    "%b %d, %Y",
    "%d %b %Y",
];

/// Date formats without a year, completed with the reference year
const YEARLESS_FORMATS: &[(&str, &str)] = &[("%m/%d/%Y", "/"), ("%b %d %Y", " "), ("%d %b %Y", " ")];

const TIME_FORMATS: &[&str] = &["%I:%M %p", "%I:%M%p", "%I:%M:%S %p", "%H:%M", "%H:%M:%S"];

/// Parse a user-entered date.
///
/// `reference_year` completes inputs such as `Jan 10` or `1/10`.
pub fn parse_date(input: &str, reference_year: i32) -> Option<NaiveDate> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
    {
        return Some(date);
    }

    let trimmed = input.trim_end_matches(',');
    YEARLESS_FORMATS.iter().find_map(|(fmt, separator)| {
        let completed = format!("{trimmed}{separator}{reference_year}");
        NaiveDate::parse_from_str(&completed, fmt).ok()
    })
}

/// Parse a user-entered time of day (`9:00 PM`, `9pm`, `21:00`, ...)
pub fn parse_time(input: &str) -> Option<NaiveTime> {
    let normalized = input.trim().to_ascii_uppercase();
    if normalized.is_empty() {
        return None;
    }

    if let Some(time) = TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(&normalized, fmt).ok())
    {
        return Some(time);
    }

    parse_bare_hour(&normalized)
}

/// `9PM` / `9 PM`: an hour with a meridiem and no minutes
fn parse_bare_hour(normalized: &str) -> Option<NaiveTime> {
    let (digits, pm) = if let Some(rest) = normalized.strip_suffix("PM") {
        (rest.trim_end(), true)
    } else if let Some(rest) = normalized.strip_suffix("AM") {
        (rest.trim_end(), false)
    } else {
        return None;
    };

    let hour: u32 = digits.parse().ok()?;
    if !(1..=12).contains(&hour) {
        return None;
    }
    let hour = match (hour, pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, true) => h + 12,
        (h, false) => h,
    };
    NaiveTime::from_hms_opt(hour, 0, 0)
}

/// Attach the server timezone's offset to a local date-time.
///
/// Ambiguous local times (clocks going back) resolve to the earlier instant;
/// local times skipped by a transition move forward past the gap.
pub fn localize(naive: NaiveDateTime, tz: Tz) -> DateTime<FixedOffset> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.fixed_offset(),
        LocalResult::None => {
            let shifted = naive + chrono::Duration::hours(1);
            tz.from_local_datetime(&shifted)
                .earliest()
                .unwrap_or_else(|| tz.from_utc_datetime(&naive))
                .fixed_offset()
        }
    }
}

/// The current calendar date on the server
pub fn server_today(now: DateTime<Utc>, tz: Tz) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}

/// The current year on the server, used to complete year-less dates
pub fn server_year(now: DateTime<Utc>, tz: Tz) -> i32 {
    server_today(now, tz).year()
}

/// Merge a partial date/time change into an existing start time.
///
/// A missing date keeps the current local date, a missing time keeps the
/// current local time of day. Returns `None` when neither is given.
pub fn merge_schedule(
    current: DateTime<FixedOffset>,
    date: Option<NaiveDate>,
    time: Option<NaiveTime>,
    tz: Tz,
) -> Option<DateTime<FixedOffset>> {
    if date.is_none() && time.is_none() {
        return None;
    }

    let local = current.with_timezone(&tz).naive_local();
    let date = date.unwrap_or_else(|| local.date());
    let time = time.unwrap_or_else(|| local.time());
    Some(localize(date.and_time(time), tz))
}
