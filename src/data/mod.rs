//! Storage models, the [`Store`] interface, and its Postgres implementation.

pub mod models;
pub mod pg;
mod types;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::globalsearch::models::{GsCareer, GsSchool, GsSubject, GsTerm};
use models::{
    ClassAlert, Course, CourseCareer, CourseSection, GlobalSettings, Instructor, NewCourse,
    NewCourseSection, NewInstructionEntry, School, SearchContext, SearchKey, Subject, Term,
    WatchedSection,
};

pub use pg::PgStore;

/// Storage operations needed by the scrape pipeline and the watch job.
///
/// Bulk `upsert_*` methods insert the candidates, skip those that collide with
/// an existing row on the entity's natural key, and return every matching row,
/// whether it was inserted now or existed already.
#[async_trait]
pub trait Store: Send + Sync {
    /// Terms by `globalsearch_key`.
    async fn upsert_terms(&self, terms: &[GsTerm]) -> Result<Vec<Term>>;

    /// Schools by `globalsearch_key`.
    async fn upsert_schools(&self, schools: &[GsSchool]) -> Result<Vec<School>>;

    /// Careers by `globalsearch_key`.
    async fn upsert_careers(&self, careers: &[GsCareer]) -> Result<Vec<CourseCareer>>;

    /// Subjects by `globalsearch_key`.
    async fn upsert_subjects(&self, subjects: &[GsSubject]) -> Result<Vec<Subject>>;

    /// Instructors by (name, school).
    async fn upsert_instructors(&self, school_id: i32, names: &[String]) -> Result<Vec<Instructor>>;

    /// Courses by (code, level, school).
    async fn upsert_courses(&self, courses: &[NewCourse]) -> Result<Vec<Course>>;

    /// Insert a section unless one with the same `gs_unique_id` exists.
    ///
    /// Returns the stored section and whether it was created by this call.
    async fn get_or_create_section(&self, section: &NewCourseSection)
    -> Result<(CourseSection, bool)>;

    /// Overwrite the scraped fields of an existing section.
    async fn update_section(&self, id: i32, section: &NewCourseSection) -> Result<CourseSection>;

    /// Delete a section's meeting blocks and insert `entries` in their place.
    ///
    /// Entries equal on the block key collapse into one row. Returns the number stored.
    async fn replace_instruction_entries(
        &self,
        section_id: i32,
        entries: &[NewInstructionEntry],
    ) -> Result<usize>;

    /// Set `is_available` on exactly the given terms.
    async fn mark_available_terms(&self, term_ids: &[i32]) -> Result<()>;

    /// Link every term to every school.
    async fn link_terms_to_schools(&self, term_ids: &[i32], school_ids: &[i32]) -> Result<()>;

    async fn link_careers(&self, school_id: i32, term_id: i32, career_ids: &[i32]) -> Result<()>;

    async fn link_subjects(&self, school_id: i32, term_id: i32, subject_ids: &[i32]) -> Result<()>;

    async fn link_courses_to_term(&self, term_id: i32, course_ids: &[i32]) -> Result<()>;

    async fn link_instructors_to_term(&self, term_id: i32, instructor_ids: &[i32]) -> Result<()>;

    /// Resolve a search by entity ids.
    async fn search_context(&self, key: SearchKey) -> Result<Option<SearchContext>>;

    /// Look up by GlobalSearch key, falling back to display name.
    async fn find_school(&self, key_or_name: &str) -> Result<Option<School>>;

    async fn find_term(&self, key_or_name: &str) -> Result<Option<Term>>;

    async fn find_subject(&self, key_or_name: &str) -> Result<Option<Subject>>;

    async fn find_career(&self, key_or_name: &str) -> Result<Option<CourseCareer>>;

    /// Every (recipient, watched section) pair, with the section's course.
    async fn watched_sections(&self) -> Result<Vec<WatchedSection>>;

    /// Alerts created strictly after `since`.
    async fn recent_alerts(&self, since: DateTime<Utc>) -> Result<Vec<ClassAlert>>;

    /// Record one alert per `(recipient_id, course_section_id)` pair, all stamped now.
    async fn insert_alerts(&self, pairs: &[(i32, i32)]) -> Result<usize>;

    async fn global_settings(&self) -> Result<Option<GlobalSettings>>;

    /// Instructor names of a section's meeting blocks, in insertion order.
    async fn instructor_names(&self, section_id: i32) -> Result<Vec<String>>;
}
