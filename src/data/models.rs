//! Persisted entities and the candidate records used to create them.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::globalsearch::models::SectionStatus;
use crate::globalsearch::{ClassQuery, FormChoice};
use crate::normalize::DaySet;

/// Shown in place of missing days/times, rooms and instructors.
pub const TBA: &str = "TBA";

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq)]
pub struct School {
    pub id: i32,
    pub name: String,
    pub globalsearch_key: String,
    pub is_preferred: bool,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub id: i32,
    /// e.g. "Fall Term"
    pub name: String,
    pub year: i32,
    pub globalsearch_key: String,
    pub is_available: bool,
    pub is_preferred: bool,
}

impl Term {
    /// `"{year} {name}"`, the label the term dropdown shows.
    pub fn full_term_name(&self) -> String {
        format!("{} {}", self.year, self.name)
    }
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq)]
pub struct CourseCareer {
    pub id: i32,
    pub name: String,
    pub globalsearch_key: String,
    pub is_preferred: bool,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub id: i32,
    pub name: String,
    pub globalsearch_key: String,
    pub is_preferred: bool,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub id: i32,
    pub code: String,
    pub level: String,
    pub title: String,
    /// "W" for writing-intensive, otherwise empty.
    pub designation: String,
    pub subject_id: i32,
    pub career_id: i32,
    pub school_id: i32,
}

impl Course {
    /// `"{code} {level}"`
    pub fn name(&self) -> String {
        format!("{} {}", self.code, self.level)
    }
}

/// Candidate course; unique on (code, level, school).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCourse {
    pub code: String,
    pub level: String,
    pub title: String,
    pub designation: String,
    pub subject_id: i32,
    pub career_id: i32,
    pub school_id: i32,
}

impl NewCourse {
    pub fn name(&self) -> String {
        format!("{} {}", self.code, self.level)
    }
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq)]
pub struct CourseSection {
    pub id: i32,
    /// Scrape identifier taken from the class link; stable across re-scrapes.
    pub gs_unique_id: String,
    /// Class number, unique within a term.
    pub number: i32,
    /// e.g. "121-LEC Regular"
    pub section_name: String,
    pub topic: String,
    pub url: String,
    pub instruction_mode: String,
    pub status: SectionStatus,
    pub course_id: i32,
    pub term_id: i32,
}

/// Candidate section; unique on `gs_unique_id` and on (term, number).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCourseSection {
    pub gs_unique_id: String,
    pub number: i32,
    pub section_name: String,
    pub topic: String,
    pub url: String,
    pub instruction_mode: String,
    pub status: SectionStatus,
    pub course_id: i32,
    pub term_id: i32,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq)]
pub struct Instructor {
    pub id: i32,
    pub name: String,
    pub school_id: i32,
}

/// One meeting block of a section.
#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq)]
pub struct InstructionEntry {
    pub id: i32,
    pub days: DaySet,
    /// `None` when the meeting time is TBA.
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub building: String,
    pub room: String,
    pub floor_number: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub instructor_id: i32,
    pub course_section_id: i32,
    pub term_id: i32,
}

impl InstructionEntry {
    /// e.g. `"Tu, Th 10:45 AM - 12:00 PM"`, or `"TBA"` without both times.
    pub fn days_and_times_display(&self) -> String {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => format!(
                "{} {} - {}",
                self.days.codes().join(", "),
                start.format("%I:%M %p"),
                end.format("%I:%M %p")
            ),
            _ => TBA.to_string(),
        }
    }

    /// e.g. `"01/25/2025 - 05/22/2025"`, or `"-"` without both dates.
    pub fn meeting_dates_display(&self) -> String {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => {
                format!("{} - {}", start.format("%m/%d/%Y"), end.format("%m/%d/%Y"))
            }
            _ => "-".to_string(),
        }
    }

    /// Building and room joined back into one label.
    pub fn location(&self) -> String {
        match (self.building.is_empty(), self.room.is_empty()) {
            (false, false) => format!("{} {}", self.building, self.room),
            (true, _) => self.room.clone(),
            (false, true) => self.building.clone(),
        }
    }
}

/// Candidate meeting block; unique on the full (term, section, times, dates,
/// building, room, instructor) tuple with NULLs compared as equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInstructionEntry {
    pub days: DaySet,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub building: String,
    pub room: String,
    pub floor_number: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub instructor_id: i32,
    pub term_id: i32,
}

/// A person subscribed to section openings.
#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub is_contact_by_phone: bool,
    /// First enabled phone number, if any.
    pub phone_number: Option<String>,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq)]
pub struct ContactInfo {
    pub id: i32,
    pub number: String,
    pub recipient_id: i32,
    pub is_enabled: bool,
}

/// A sent (or attempted) notification for one recipient and section.
#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq)]
pub struct ClassAlert {
    pub id: i32,
    pub recipient_id: i32,
    pub course_section_id: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Debug, Clone, Copy, PartialEq)]
pub struct GlobalSettings {
    pub hours_renotify_grace_period: f64,
}

/// One (recipient, watched section) pair with the section's course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchedSection {
    pub recipient: Recipient,
    pub section: CourseSection,
    pub course: Course,
}

impl WatchedSection {
    /// The search that lists this section.
    pub fn search_key(&self) -> SearchKey {
        SearchKey {
            school_id: self.course.school_id,
            term_id: self.section.term_id,
            subject_id: self.course.subject_id,
            career_id: self.course.career_id,
        }
    }
}

/// Identifies one results-page search by entity ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SearchKey {
    pub school_id: i32,
    pub term_id: i32,
    pub subject_id: i32,
    pub career_id: i32,
}

/// The entities behind a [`SearchKey`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchContext {
    pub school: School,
    pub term: Term,
    pub subject: Subject,
    pub career: CourseCareer,
}

impl SearchContext {
    pub fn key(&self) -> SearchKey {
        SearchKey {
            school_id: self.school.id,
            term_id: self.term.id,
            subject_id: self.subject.id,
            career_id: self.career.id,
        }
    }

    /// Form values for the results page.
    pub fn class_query(&self, open_only: bool) -> ClassQuery {
        ClassQuery {
            school: FormChoice::new(&self.school.name, &self.school.globalsearch_key),
            term: FormChoice::new(self.term.full_term_name(), &self.term.globalsearch_key),
            subject: FormChoice::new(&self.subject.name, &self.subject.globalsearch_key),
            career: FormChoice::new(&self.career.name, &self.career.globalsearch_key),
            open_only,
        }
    }
}

impl std::fmt::Display for SearchContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} - {} - {} - {}",
            self.school.name,
            self.term.full_term_name(),
            self.subject.name,
            self.career.name
        )
    }
}
