//! Timestamp normalization for feed items.
//!
//! Feeds publish dates in whatever shape their generator prefers. [`normalize`]
//! resolves a raw string to a UTC instant and never fails:
//!
//! - an empty string means "just published" and yields the current time;
//! - otherwise [`LAYOUTS`] is tried in order and the first match wins;
//! - if nothing matches, the result is [`fallback_date`] (1990-01-01T00:00:00Z),
//!   so unparseable items sink to the bottom of every listing.
//!
//! The order of [`LAYOUTS`] is observable behavior. `02/01/2006` is read as
//! 2 January because the day-first layout precedes the month-first one, and
//! naive layouts sit after their offset-carrying siblings so an explicit offset
//! is never silently dropped. Do not reorder without re-checking which inputs
//! each entry captures.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc, Weekday};

use crate::store::clamp_to_storable;

/// Unix timestamp of 1990-01-01T00:00:00Z.
const FALLBACK_UNIX_SECS: i64 = 631_152_000;

/// The instant assigned to timestamps no layout understands.
pub fn fallback_date() -> DateTime<Utc> {
    DateTime::from_timestamp(FALLBACK_UNIX_SECS, 0).unwrap_or(DateTime::UNIX_EPOCH)
}

#[derive(Debug, Clone, Copy)]
enum Shape {
    /// RFC 3339, fractional seconds optional.
    Rfc3339,
    /// Date-time with a numeric offset (`+0200` or `+02:00`).
    Offset(&'static str),
    /// Date-time followed by a zone abbreviation such as `GMT` or `PST`.
    Abbrev(&'static str),
    /// Date-time without zone information, read as UTC.
    Naive(&'static str),
    /// Bare calendar date, read as midnight UTC.
    Date(&'static str),
}

/// One entry of the ordered layout list.
#[derive(Debug, Clone, Copy)]
pub struct Layout {
    /// Example input, for documentation and logs.
    pub example: &'static str,
    /// Input starts with a weekday name and a comma (`Mon, `). The name must be
    /// a real weekday but is not checked against the date.
    weekday: bool,
    shape: Shape,
}

const fn layout(example: &'static str, weekday: bool, shape: Shape) -> Layout {
    Layout {
        example,
        weekday,
        shape,
    }
}

/// Known timestamp layouts, in priority order.
pub const LAYOUTS: &[Layout] = &[
    // RFC 1123 / RFC 2822
    layout("Mon, 02 Jan 2006 15:04:05 -0700", true, Shape::Offset("%d %b %Y %H:%M:%S %z")),
    layout("Mon, 02 Jan 2006 15:04:05 MST", true, Shape::Abbrev("%d %b %Y %H:%M:%S")),
    // RFC 822, two-digit year
    layout("02 Jan 06 15:04 -0700", false, Shape::Offset("%d %b %y %H:%M %z")),
    layout("02 Jan 06 15:04 MST", false, Shape::Abbrev("%d %b %y %H:%M")),
    // RFC 3339 and ISO 8601 relatives
    layout("2006-01-02T15:04:05.999999999Z07:00", false, Shape::Rfc3339),
    layout("2006-01-02T15:04:05-0700", false, Shape::Offset("%Y-%m-%dT%H:%M:%S%.f%z")),
    layout("2006-01-02T15:04:05.000-07:00", false, Shape::Offset("%Y-%m-%dT%H:%M:%S%.f%:z")),
    layout("2006-01-02T15:04:05", false, Shape::Naive("%Y-%m-%dT%H:%M:%S%.f")),
    layout("2006-01-02 15:04:05 -0700", false, Shape::Offset("%Y-%m-%d %H:%M:%S %z")),
    layout("2006-01-02 15:04:05 -07:00", false, Shape::Offset("%Y-%m-%d %H:%M:%S %:z")),
    layout("2006-01-02 15:04:05", false, Shape::Naive("%Y-%m-%d %H:%M:%S")),
    // Single-digit days and loose RFC 1123 relatives
    layout("Mon, 2 Jan 2006 15:04:05 -07:00", true, Shape::Offset("%d %b %Y %H:%M:%S %:z")),
    layout("2 Jan 2006 15:04:05 -0700", false, Shape::Offset("%d %b %Y %H:%M:%S %z")),
    layout("2 Jan 2006 15:04:05 -07:00", false, Shape::Offset("%d %b %Y %H:%M:%S %:z")),
    layout("02 Jan 2006 15:04:05 GMT", false, Shape::Abbrev("%d %b %Y %H:%M:%S")),
    layout("2 Jan 2006 15:04:05", false, Shape::Naive("%d %b %Y %H:%M:%S")),
    // Spelled-out months
    layout("January 2, 2006 15:04:05", false, Shape::Naive("%B %d, %Y %H:%M:%S")),
    layout("January 2, 2006, 15:04:05", false, Shape::Naive("%B %d, %Y, %H:%M:%S")),
    // Slash separated
    layout("2006/01/02 15:04:05", false, Shape::Naive("%Y/%m/%d %H:%M:%S")),
    layout("02/01/2006 15:04:05", false, Shape::Naive("%d/%m/%Y %H:%M:%S")),
    // Dates only
    layout("2006-01-02", false, Shape::Date("%Y-%m-%d")),
    layout("02/01/2006", false, Shape::Date("%d/%m/%Y")),
    layout("01/02/2006", false, Shape::Date("%m/%d/%Y")),
];

impl Layout {
    fn parse(&self, input: &str) -> Option<DateTime<Utc>> {
        let input = if self.weekday {
            strip_weekday(input)?
        } else {
            input
        };

        match self.shape {
            Shape::Rfc3339 => DateTime::parse_from_rfc3339(input)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            Shape::Offset(fmt) => DateTime::parse_from_str(input, fmt)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            Shape::Abbrev(fmt) => {
                let (rest, zone) = input.trim_end().rsplit_once(char::is_whitespace)?;
                let offset = zone_offset(zone)?;
                let naive = NaiveDateTime::parse_from_str(rest.trim_end(), fmt).ok()?;
                offset
                    .from_local_datetime(&naive)
                    .single()
                    .map(|dt| dt.with_timezone(&Utc))
            }
            Shape::Naive(fmt) => NaiveDateTime::parse_from_str(input, fmt)
                .ok()
                .map(|naive| naive.and_utc()),
            Shape::Date(fmt) => NaiveDate::parse_from_str(input, fmt)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc()),
        }
    }
}

/// Drop a leading `Mon, ` style weekday.
fn strip_weekday(input: &str) -> Option<&str> {
    let (day, rest) = input.split_once(',')?;
    day.trim().parse::<Weekday>().ok()?;
    Some(rest.trim_start())
}

/// Offsets for the zone names RFC 822 defines. Any other purely alphabetic
/// abbreviation is taken as UTC.
fn zone_offset(zone: &str) -> Option<FixedOffset> {
    let hours = match zone.to_ascii_uppercase().as_str() {
        "UT" | "UTC" | "GMT" | "Z" => 0,
        "EST" => -5,
        "EDT" => -4,
        "CST" => -6,
        "CDT" => -5,
        "MST" => -7,
        "MDT" => -6,
        "PST" => -8,
        "PDT" => -7,
        other if (2..=5).contains(&other.len()) && other.chars().all(|c| c.is_ascii_alphabetic()) => 0,
        _ => return None,
    };
    FixedOffset::east_opt(hours * 3600)
}

/// Try every layout in order and return the first match.
pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
    let input = raw.trim();
    LAYOUTS.iter().find_map(|layout| layout.parse(input))
}

/// Resolve a raw timestamp to UTC. Never fails.
pub fn normalize(raw: &str) -> DateTime<Utc> {
    normalize_at(raw, Utc::now())
}

/// [`normalize`] with an explicit "now" for empty input.
pub fn normalize_at(raw: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    if raw.trim().is_empty() {
        tracing::debug!("Empty publish date, using current time");
        return now;
    }

    match parse(raw) {
        Some(dt) => clamp_to_storable(dt),
        None => {
            tracing::warn!("Could not parse date '{}' with any known layout, using fallback date", raw);
            fallback_date()
        }
    }
}
