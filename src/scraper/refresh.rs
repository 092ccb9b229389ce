//! Crawl GlobalSearch pages and reconcile the results into storage.
//!
//! Each pass is split into a network half that fetches and parses HTML, and a
//! persistence half that only needs parsed records. Re-running a pass against
//! the same HTML converges on the same rows.

use html_scraper::Html;
use indexmap::IndexSet;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info};

use super::ScrapeError;
use crate::data::Store;
use crate::data::models::{
    Course, CourseCareer, CourseSection, NewCourse, NewCourseSection, NewInstructionEntry, School,
    SearchContext, Subject, Term,
};
use crate::globalsearch::models::{
    GsCareer, GsCourse, GsInstructionEntry, GsSchool, GsSubject, GsTerm,
};
use crate::globalsearch::{ClassSearch, FormChoice, ParseError, parser};
use crate::normalize::{self, Location, MeetingTimes, NormalizeError};
use crate::utils::fmt_duration;

/// Outcome of [`sync_available_terms`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermSync {
    pub terms: Vec<Term>,
    pub schools: Vec<School>,
}

/// Outcome of [`refresh_semester_data`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SemesterData {
    pub careers: Vec<CourseCareer>,
    pub subjects: Vec<Subject>,
}

/// Row counts touched by one class refresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshCounts {
    pub courses: usize,
    pub sections_created: usize,
    pub sections_updated: usize,
    pub instruction_entries: usize,
    pub instructors: usize,
}

/// Parsed results page together with what persisting it changed.
#[derive(Debug, Clone)]
pub struct ClassRefresh {
    pub courses: Vec<GsCourse>,
    pub counts: RefreshCounts,
}

/// Crawl the main page: store its terms and schools, mark exactly those terms
/// available, and link every term to every school.
pub async fn sync_available_terms(
    search: &dyn ClassSearch,
    store: &dyn Store,
) -> Result<TermSync, ScrapeError> {
    let html = search.fetch_main_page().await?;
    let (gs_terms, gs_schools) = parse_main_page(&html)?;
    persist_available_terms(store, &gs_terms, &gs_schools).await
}

/// Storage half of [`sync_available_terms`].
pub async fn persist_available_terms(
    store: &dyn Store,
    gs_terms: &[GsTerm],
    gs_schools: &[GsSchool],
) -> Result<TermSync, ScrapeError> {
    if gs_terms.is_empty() {
        return Err(ScrapeError::NoTerms);
    }

    let terms = store.upsert_terms(gs_terms).await?;
    let schools = store.upsert_schools(gs_schools).await?;

    let term_ids: Vec<i32> = terms.iter().map(|t| t.id).collect();
    let school_ids: Vec<i32> = schools.iter().map(|s| s.id).collect();
    store.mark_available_terms(&term_ids).await?;
    store.link_terms_to_schools(&term_ids, &school_ids).await?;

    info!(
        terms = terms.len(),
        schools = schools.len(),
        "Synced available terms"
    );
    Ok(TermSync { terms, schools })
}

/// Crawl the subject page for one school and term and store its careers and subjects.
pub async fn refresh_semester_data(
    search: &dyn ClassSearch,
    store: &dyn Store,
    school: &School,
    term: &Term,
) -> Result<SemesterData, ScrapeError> {
    let html = search
        .fetch_subject_page(
            &FormChoice::new(&school.name, &school.globalsearch_key),
            &FormChoice::new(term.full_term_name(), &term.globalsearch_key),
        )
        .await?;
    let (careers, subjects) = parse_subject_page(&html)?;
    persist_careers_and_subjects(store, school, term, &careers, &subjects).await
}

/// Storage half of [`refresh_semester_data`].
pub async fn persist_careers_and_subjects(
    store: &dyn Store,
    school: &School,
    term: &Term,
    gs_careers: &[GsCareer],
    gs_subjects: &[GsSubject],
) -> Result<SemesterData, ScrapeError> {
    let careers = store.upsert_careers(gs_careers).await?;
    let subjects = store.upsert_subjects(gs_subjects).await?;

    let career_ids: Vec<i32> = careers.iter().map(|c| c.id).collect();
    let subject_ids: Vec<i32> = subjects.iter().map(|s| s.id).collect();
    store.link_careers(school.id, term.id, &career_ids).await?;
    store.link_subjects(school.id, term.id, &subject_ids).await?;

    info!(
        school = school.name,
        term = term.full_term_name(),
        careers = careers.len(),
        subjects = subjects.len(),
        "Refreshed semester data"
    );
    Ok(SemesterData { careers, subjects })
}

/// Run the full search for one (school, term, subject, career) and reconcile
/// the listed courses, sections and meeting blocks.
pub async fn refresh_class_data(
    search: &dyn ClassSearch,
    store: &dyn Store,
    context: &SearchContext,
    open_only: bool,
) -> Result<ClassRefresh, ScrapeError> {
    let start = Instant::now();
    let html = search
        .fetch_class_results(&context.class_query(open_only))
        .await?;
    let courses = parse_results_page(&html)?;
    let counts = persist_class_data(store, context, &courses).await?;

    info!(
        search = %context,
        courses = counts.courses,
        sections_created = counts.sections_created,
        sections_updated = counts.sections_updated,
        duration = fmt_duration(start.elapsed()),
        "Refreshed class data"
    );
    Ok(ClassRefresh { courses, counts })
}

/// Storage half of [`refresh_class_data`].
///
/// Every meeting block is normalized before anything is written, so a value
/// the normalizer rejects leaves storage untouched.
///
/// The writes are not one transaction. A storage failure partway through
/// leaves the catalog partially refreshed; every step is an upsert keyed on
/// stable ids (or a per-section replace), so rerunning the same page
/// converges on the state a clean run would have produced.
pub async fn persist_class_data(
    store: &dyn Store,
    context: &SearchContext,
    gs_courses: &[GsCourse],
) -> Result<RefreshCounts, ScrapeError> {
    let normalized = normalize_courses(gs_courses)?;
    let mut counts = RefreshCounts::default();

    // Instructors first: meeting blocks reference them by name.
    let names: IndexSet<String> = gs_courses
        .iter()
        .flat_map(|course| &course.sections)
        .flat_map(|section| &section.instruction_entries)
        .map(|entry| entry.instructor.clone())
        .collect();
    let names: Vec<String> = names.into_iter().collect();
    let instructors = store.upsert_instructors(context.school.id, &names).await?;
    let instructor_ids: HashMap<&str, i32> = instructors
        .iter()
        .map(|i| (i.name.as_str(), i.id))
        .collect();
    counts.instructors = instructors.len();

    let candidates: Vec<NewCourse> = gs_courses
        .iter()
        .map(|course| NewCourse {
            code: course.code.clone(),
            level: course.level.clone(),
            title: course.title.clone(),
            designation: course.designation().to_string(),
            subject_id: context.subject.id,
            career_id: context.career.id,
            school_id: context.school.id,
        })
        .collect();
    let courses = store.upsert_courses(&candidates).await?;
    let courses_by_name: HashMap<String, &Course> =
        courses.iter().map(|c| (c.name(), c)).collect();
    counts.courses = courses.len();

    for (gs_course, sections) in gs_courses.iter().zip(&normalized) {
        let course = courses_by_name
            .get(&gs_course.name())
            .ok_or_else(|| anyhow::anyhow!("Course {} missing after upsert", gs_course.name()))?;

        for (gs_section, entries) in gs_course.sections.iter().zip(sections) {
            let candidate = NewCourseSection {
                gs_unique_id: gs_section.unique_id.clone(),
                number: gs_section.number,
                section_name: gs_section.section_name.clone(),
                topic: gs_section.topic.clone(),
                url: gs_section.url.clone(),
                instruction_mode: gs_section.instruction_mode.clone(),
                status: gs_section.status,
                course_id: course.id,
                term_id: context.term.id,
            };

            let (section, created) = store.get_or_create_section(&candidate).await?;
            let section = if created {
                counts.sections_created += 1;
                section
            } else if section_changed(&section, &candidate) {
                counts.sections_updated += 1;
                store.update_section(section.id, &candidate).await?
            } else {
                section
            };

            let blocks = entries
                .iter()
                .map(|entry| -> anyhow::Result<NewInstructionEntry> {
                    let instructor_id = *instructor_ids.get(entry.instructor).ok_or_else(|| {
                        anyhow::anyhow!("Instructor {:?} missing after upsert", entry.instructor)
                    })?;
                    Ok(NewInstructionEntry {
                        days: entry.times.days,
                        start_time: entry.times.start,
                        end_time: entry.times.end,
                        building: entry.location.building.clone(),
                        room: entry.location.room.clone(),
                        floor_number: entry.location.floor.clone(),
                        start_date: entry.dates.0,
                        end_date: entry.dates.1,
                        instructor_id,
                        term_id: context.term.id,
                    })
                })
                .collect::<anyhow::Result<Vec<_>>>()?;

            counts.instruction_entries +=
                store.replace_instruction_entries(section.id, &blocks).await?;
        }
    }

    let course_ids: Vec<i32> = courses.iter().map(|c| c.id).collect();
    let instructor_id_list: Vec<i32> = instructors.iter().map(|i| i.id).collect();
    store.link_courses_to_term(context.term.id, &course_ids).await?;
    store
        .link_instructors_to_term(context.term.id, &instructor_id_list)
        .await?;

    debug!(?counts, "Persisted class data");
    Ok(counts)
}

fn section_changed(stored: &CourseSection, scraped: &NewCourseSection) -> bool {
    stored.number != scraped.number
        || stored.section_name != scraped.section_name
        || stored.topic != scraped.topic
        || stored.url != scraped.url
        || stored.instruction_mode != scraped.instruction_mode
        || stored.status != scraped.status
        || stored.course_id != scraped.course_id
        || stored.term_id != scraped.term_id
}

/// A meeting block with its strings converted to typed values.
#[derive(Debug)]
struct NormalizedEntry<'a> {
    times: MeetingTimes,
    dates: (Option<chrono::NaiveDate>, Option<chrono::NaiveDate>),
    location: Location,
    instructor: &'a str,
}

/// Normalized blocks, indexed `[course][section][entry]` in parse order.
fn normalize_courses(
    gs_courses: &[GsCourse],
) -> Result<Vec<Vec<Vec<NormalizedEntry<'_>>>>, ScrapeError> {
    gs_courses
        .iter()
        .map(|course| {
            course
                .sections
                .iter()
                .map(|section| {
                    section
                        .instruction_entries
                        .iter()
                        .map(normalize_entry)
                        .collect::<Result<Vec<_>, _>>()
                        .map_err(|source| ScrapeError::Normalize {
                            section: section.number,
                            source,
                        })
                })
                .collect()
        })
        .collect()
}

fn normalize_entry(entry: &GsInstructionEntry) -> Result<NormalizedEntry<'_>, NormalizeError> {
    Ok(NormalizedEntry {
        times: normalize::parse_days_and_times(&entry.days_and_times)?,
        dates: normalize::parse_meeting_dates(&entry.meeting_dates)?,
        location: normalize::parse_location(&entry.room),
        instructor: &entry.instructor,
    })
}

// `Html` is not `Send`; documents are parsed and dropped before the next await.

fn parse_main_page(html: &str) -> Result<(Vec<GsTerm>, Vec<GsSchool>), ParseError> {
    let document = Html::parse_document(html);
    Ok((
        parser::parse_available_terms(&document)?,
        parser::parse_schools(&document)?,
    ))
}

fn parse_subject_page(html: &str) -> Result<(Vec<GsCareer>, Vec<GsSubject>), ParseError> {
    parser::parse_careers_and_subjects(&Html::parse_document(html))
}

/// Parse a class results page into courses and their sections.
pub fn parse_results_page(html: &str) -> Result<Vec<GsCourse>, ParseError> {
    parser::parse_course_sections(&Html::parse_document(html))
}
