//! Conversion of scraped display strings into typed meeting values.
//!
//! Everything here is pure. Times are read on a 12-hour clock and interpreted
//! in US Eastern time, which is where every CUNY campus is.

use bitflags::bitflags;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::America::New_York;
use regex::Regex;
use std::sync::LazyLock;

/// Failure to normalize a value that looked well-formed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    #[error("Unknown day abbreviation {0:?}")]
    UnknownDay(String),
    #[error("Invalid meeting time {0:?}")]
    InvalidTime(String),
    #[error("Invalid meeting date {0:?}")]
    InvalidDate(String),
    #[error("Malformed meeting date range {0:?}")]
    MalformedDateRange(String),
}

bitflags! {
    /// Set of weekdays a meeting block occurs on.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
    pub struct DaySet: u8 {
        const MONDAY = 1 << 0;
        const TUESDAY = 1 << 1;
        const WEDNESDAY = 1 << 2;
        const THURSDAY = 1 << 3;
        const FRIDAY = 1 << 4;
        const SATURDAY = 1 << 5;
        const SUNDAY = 1 << 6;
    }
}

const DAY_CODES: [(DaySet, &str); 7] = [
    (DaySet::MONDAY, "Mo"),
    (DaySet::TUESDAY, "Tu"),
    (DaySet::WEDNESDAY, "We"),
    (DaySet::THURSDAY, "Th"),
    (DaySet::FRIDAY, "Fr"),
    (DaySet::SATURDAY, "Sa"),
    (DaySet::SUNDAY, "Su"),
];

impl DaySet {
    /// Parse a single two-letter GlobalSearch day code.
    pub fn from_code(code: &str) -> Option<Self> {
        DAY_CODES
            .iter()
            .find(|(_, c)| *c == code)
            .map(|(day, _)| *day)
    }

    /// Two-letter codes of the contained days, Monday first.
    pub fn codes(self) -> Vec<&'static str> {
        DAY_CODES
            .iter()
            .filter(|(day, _)| self.contains(*day))
            .map(|(_, code)| *code)
            .collect()
    }

    /// Storage representation.
    pub fn to_db(self) -> i16 {
        i16::from(self.bits())
    }

    /// Inverse of [`DaySet::to_db`]; unknown bits are dropped.
    pub fn from_db(value: i16) -> Self {
        Self::from_bits_truncate(u8::try_from(value).unwrap_or_default())
    }
}

/// Parse a run of two-letter day codes such as `"TuTh"`.
pub fn parse_days(days: &str) -> Result<DaySet, NormalizeError> {
    let chars: Vec<char> = days.chars().collect();
    chars.chunks(2).try_fold(DaySet::empty(), |set, chunk| {
        let code: String = chunk.iter().collect();
        DaySet::from_code(&code)
            .map(|day| set | day)
            .ok_or(NormalizeError::UnknownDay(code))
    })
}

/// Days plus start/end time of a meeting block; `None` times mean TBA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MeetingTimes {
    pub days: DaySet,
    pub start: Option<NaiveTime>,
    pub end: Option<NaiveTime>,
}

impl MeetingTimes {
    pub const TBA: Self = Self {
        days: DaySet::empty(),
        start: None,
        end: None,
    };
}

/// Parse `"TuTh 5:00PM - 5:30PM"`.
///
/// Anything that is not shaped like `<days> <start> - <end>` (including
/// `"TBA"`) yields [`MeetingTimes::TBA`]. A correctly shaped value with an
/// unreadable time or day code is an error.
pub fn parse_days_and_times(days_and_times: &str) -> Result<MeetingTimes, NormalizeError> {
    let parts: Vec<&str> = days_and_times.split_whitespace().collect();
    let [days, start, "-", end] = parts.as_slice() else {
        return Ok(MeetingTimes::TBA);
    };

    Ok(MeetingTimes {
        start: Some(parse_eastern_time(start)?),
        end: Some(parse_eastern_time(end)?),
        days: parse_days(days)?,
    })
}

fn parse_eastern_time(value: &str) -> Result<NaiveTime, NormalizeError> {
    let naive = NaiveTime::parse_from_str(value, "%I:%M%p")
        .map_err(|_| NormalizeError::InvalidTime(value.to_string()))?;

    // Anchor on a fixed date so DST gaps never swallow a wall-clock time.
    NaiveDate::from_ymd_opt(1900, 1, 1)
        .and_then(|anchor| {
            New_York
                .from_local_datetime(&NaiveDateTime::new(anchor, naive))
                .single()
        })
        .map(|dt| dt.time())
        .ok_or_else(|| NormalizeError::InvalidTime(value.to_string()))
}

/// Parse `"01/25/2025 - 05/22/2025"` into a start/end date pair.
///
/// Returns `(None, None)` unless the value splits into exactly two dates; more
/// than two parts is malformed rather than absent.
pub fn parse_meeting_dates(
    meeting_dates: &str,
) -> Result<(Option<NaiveDate>, Option<NaiveDate>), NormalizeError> {
    let parts: Vec<&str> = meeting_dates.split(" - ").collect();
    match parts.as_slice() {
        [start, end] => Ok((Some(parse_date(start)?), Some(parse_date(end)?))),
        [_] | [] => Ok((None, None)),
        _ => Err(NormalizeError::MalformedDateRange(meeting_dates.to_string())),
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, NormalizeError> {
    NaiveDate::parse_from_str(value.trim(), "%m/%d/%Y")
        .map_err(|_| NormalizeError::InvalidDate(value.to_string()))
}

/// Building, room and floor decomposed from a room cell.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub building: String,
    pub room: String,
    pub floor: String,
}

/// Decompose `"Kiely Hall 258"` into `("Kiely Hall", "258", "2")`.
///
/// Values without a trailing room number (`"Online Synchronous"`, `"TBA"`)
/// are kept whole as the room with no building or floor.
pub fn parse_location(location: &str) -> Location {
    static FLOOR_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)\b[a-z]*([0-9]{1,2})[0-9]{2,}$").unwrap());

    let whole = || Location {
        room: location.to_string(),
        ..Location::default()
    };

    let Some((building, room)) = location.rsplit_once(' ') else {
        return whole();
    };

    match FLOOR_RE.captures(location) {
        Some(caps) => Location {
            building: building.to_string(),
            room: room.to_string(),
            floor: caps[1].to_string(),
        },
        None => whole(),
    }
}
