//! Raw records extracted from GlobalSearch pages, before normalization.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use tracing::debug;

use super::errors::ParseError;

/// A term option from the main page's term `<select>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GsTerm {
    /// e.g. "Fall Term"
    pub name: String,
    pub year: i32,
    pub globalsearch_key: String,
}

impl GsTerm {
    /// Split option text like `"2024 Fall Term"` into `("Fall Term", 2024)`.
    pub fn parse_name_and_year(full_term_name: &str) -> Option<(String, i32)> {
        static TERM_RE: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"^ *(\d+) *(.+)").unwrap());

        let caps = TERM_RE.captures(full_term_name)?;
        let year = caps[1].trim().parse().ok()?;
        Some((caps[2].trim().to_string(), year))
    }
}

/// An institution checkbox from the main page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GsSchool {
    pub name: String,
    pub globalsearch_key: String,
}

/// A course career option (e.g. Undergraduate / UGRD).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GsCareer {
    pub name: String,
    pub globalsearch_key: String,
}

/// A subject option (e.g. Computer Science / CMSC).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GsSubject {
    pub name: String,
    pub globalsearch_key: String,
}

/// Enrollment status shown by the status icon of a section row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionStatus {
    Open,
    Closed,
    Waitlisted,
}

impl SectionStatus {
    /// Map a status icon `title` attribute ("Open", "Closed", "Wait List", ...).
    pub fn from_icon_title(title: &str) -> Result<Self, ParseError> {
        let normalized = title.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            s if s.starts_with("wait") => Ok(Self::Waitlisted),
            _ => Err(ParseError::UnknownStatus(title.to_string())),
        }
    }

    /// Storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Waitlisted => "waitlisted",
        }
    }

    /// Inverse of [`SectionStatus::as_str`].
    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "open" => Some(Self::Open),
            "closed" => Some(Self::Closed),
            "waitlisted" => Some(Self::Waitlisted),
            _ => None,
        }
    }
}

impl fmt::Display for SectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One meeting block of a section, still as display strings.
///
/// Blank values have already been replaced: `"TBA"` for days/times, room and
/// instructor, `""` for meeting dates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GsInstructionEntry {
    pub days_and_times: String,
    pub room: String,
    pub instructor: String,
    pub meeting_dates: String,
}

/// A parsed section row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GsCourseSection {
    /// `class_number_searched` from the class link; stable across scrapes.
    pub unique_id: String,
    /// Class number, e.g. 43070.
    pub number: i32,
    /// e.g. "121-LEC Regular"
    pub section_name: String,
    pub url: String,
    pub instruction_mode: String,
    pub status: SectionStatus,
    pub topic: String,
    pub instruction_entries: Vec<GsInstructionEntry>,
}

/// A course heading together with its listed sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GsCourse {
    /// e.g. "CSCI"
    pub code: String,
    /// e.g. "331"; may be empty when the heading has no level token
    pub level: String,
    /// e.g. "Database Systems"
    pub title: String,
    pub sections: Vec<GsCourseSection>,
}

impl GsCourse {
    /// Build a course from a heading like `"CSCI 331 - Database Systems"`.
    pub fn from_title(full_title: &str, sections: Vec<GsCourseSection>) -> Result<Self, ParseError> {
        static COURSE_RE: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"(?i)^(\w+) *(\w+)? *- *(.+)").unwrap());

        let caps = COURSE_RE
            .captures(full_title)
            .ok_or_else(|| ParseError::CourseTitle(full_title.to_string()))?;

        let level = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();
        if level.is_empty() {
            debug!(title = full_title, "Course heading has no level token");
        }

        Ok(Self {
            code: caps[1].trim().to_string(),
            level: level.to_string(),
            title: caps[3].trim().to_string(),
            sections,
        })
    }

    /// `"{code} {level}"`, the key courses are matched on within a school.
    pub fn name(&self) -> String {
        format!("{} {}", self.code, self.level)
    }

    /// Writing-intensive courses carry a trailing `W` on their level.
    pub fn designation(&self) -> &'static str {
        if self.level.ends_with('W') { "W" } else { "" }
    }
}
