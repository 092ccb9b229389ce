//! Shared fixtures for integration tests: an in-memory [`Store`], a canned
//! [`ClassSearch`], a recording [`Notifier`] and a results-page builder.
#![allow(dead_code)]

pub mod stub_server;

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use class_tracker::data::Store;
use class_tracker::data::models::{
    ClassAlert, Course, CourseCareer, CourseSection, GlobalSettings, InstructionEntry, Instructor,
    NewCourse, NewCourseSection, NewInstructionEntry, Recipient, School, SearchContext, SearchKey,
    Subject, Term, WatchedSection,
};
use class_tracker::globalsearch::models::{GsCareer, GsSchool, GsSubject, GsTerm};
use class_tracker::globalsearch::{ClassQuery, ClassSearch, FormChoice, NavigationError};
use class_tracker::notify::{Notifier, NotifyError};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

#[derive(Default)]
struct State {
    next_id: i32,
    terms: Vec<Term>,
    schools: Vec<School>,
    careers: Vec<CourseCareer>,
    subjects: Vec<Subject>,
    instructors: Vec<Instructor>,
    courses: Vec<Course>,
    sections: Vec<CourseSection>,
    entries: Vec<InstructionEntry>,
    links: HashSet<(&'static str, i32, i32, i32)>,
    recipients: Vec<Recipient>,
    watches: Vec<(i32, i32)>,
    alerts: Vec<ClassAlert>,
    settings: Option<GlobalSettings>,
}

impl State {
    fn id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

/// Storage with the same uniqueness rules as the Postgres schema.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    pub fail_recent_alerts: AtomicBool,
    pub fail_insert_alerts: AtomicBool,
    pub fail_search_context: AtomicBool,
    pub fail_replace_entries: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn add_recipient(&self, name: &str, phone: Option<&str>) -> Recipient {
        let mut state = self.state();
        let recipient = Recipient {
            id: state.id(),
            name: name.to_string(),
            description: String::new(),
            is_contact_by_phone: phone.is_some(),
            phone_number: phone.map(str::to_string),
        };
        state.recipients.push(recipient.clone());
        recipient
    }

    pub fn watch(&self, recipient_id: i32, section_id: i32) {
        self.state().watches.push((recipient_id, section_id));
    }

    pub fn set_grace_hours(&self, hours: f64) {
        self.state().settings = Some(GlobalSettings {
            hours_renotify_grace_period: hours,
        });
    }

    pub fn seed_alert(&self, recipient_id: i32, course_section_id: i32, created_at: DateTime<Utc>) {
        let mut state = self.state();
        let id = state.id();
        state.alerts.push(ClassAlert {
            id,
            recipient_id,
            course_section_id,
            created_at,
        });
    }

    pub fn alerts(&self) -> Vec<ClassAlert> {
        self.state().alerts.clone()
    }

    pub fn section_by_number(&self, term_id: i32, number: i32) -> Option<CourseSection> {
        self.state()
            .sections
            .iter()
            .find(|s| s.term_id == term_id && s.number == number)
            .cloned()
    }

    pub fn sections(&self) -> Vec<CourseSection> {
        self.state().sections.clone()
    }

    pub fn courses(&self) -> Vec<Course> {
        self.state().courses.clone()
    }

    pub fn instructors(&self) -> Vec<Instructor> {
        self.state().instructors.clone()
    }

    pub fn terms(&self) -> Vec<Term> {
        self.state().terms.clone()
    }

    pub fn schools(&self) -> Vec<School> {
        self.state().schools.clone()
    }

    pub fn entries(&self) -> Vec<InstructionEntry> {
        self.state().entries.clone()
    }

    pub fn link_count(&self, table: &str) -> usize {
        self.state().links.iter().filter(|(t, ..)| *t == table).count()
    }

    /// Insert one school, term, subject and career and return the search over them.
    pub fn seed_context(&self, subject_key: &str) -> SearchContext {
        let mut state = self.state();
        let school = School {
            id: state.id(),
            name: "Queens College".to_string(),
            globalsearch_key: "QNS01".to_string(),
            is_preferred: true,
        };
        let term = Term {
            id: state.id(),
            name: "Spring Term".to_string(),
            year: 2025,
            globalsearch_key: "1252".to_string(),
            is_available: true,
            is_preferred: true,
        };
        let subject = Subject {
            id: state.id(),
            name: format!("Subject {subject_key}"),
            globalsearch_key: subject_key.to_string(),
            is_preferred: false,
        };
        let career = CourseCareer {
            id: state.id(),
            name: "Undergraduate".to_string(),
            globalsearch_key: "UGRD".to_string(),
            is_preferred: true,
        };

        // Reuse existing rows with the same key so several contexts share a school and term.
        let school = reuse_or_push(&mut state.schools, school, |s| s.globalsearch_key.clone());
        let term = reuse_or_push(&mut state.terms, term, |t| t.globalsearch_key.clone());
        let career = reuse_or_push(&mut state.careers, career, |c| c.globalsearch_key.clone());
        state.subjects.push(subject.clone());

        SearchContext {
            school,
            term,
            subject,
            career,
        }
    }
}

fn reuse_or_push<T: Clone>(rows: &mut Vec<T>, row: T, key_of: impl Fn(&T) -> String) -> T {
    let key = key_of(&row);
    if let Some(existing) = rows.iter().find(|r| key_of(r) == key) {
        return existing.clone();
    }
    rows.push(row.clone());
    row
}

fn upsert_keyed<T: Clone>(
    rows: &mut Vec<T>,
    next_id: &mut i32,
    candidates: impl IntoIterator<Item = (String, Box<dyn FnOnce(i32) -> T>)>,
    key_of: impl Fn(&T) -> &str,
) -> Vec<T> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    for (key, make) in candidates {
        if !seen.insert(key.clone()) {
            continue;
        }
        let existing = rows.iter().find(|row| key_of(row) == key).cloned();
        let row = match existing {
            Some(existing) => existing,
            None => {
                *next_id += 1;
                let row = make(*next_id);
                rows.push(row.clone());
                row
            }
        };
        out.push(row);
    }
    out
}

/// Equal on the meeting-block unique key.
fn same_block(a: &InstructionEntry, b: &InstructionEntry) -> bool {
    a.start_time == b.start_time
        && a.end_time == b.end_time
        && a.building == b.building
        && a.room == b.room
        && a.start_date == b.start_date
        && a.end_date == b.end_date
        && a.instructor_id == b.instructor_id
        && a.course_section_id == b.course_section_id
        && a.term_id == b.term_id
}

#[async_trait]
impl Store for MemoryStore {
    async fn upsert_terms(&self, terms: &[GsTerm]) -> Result<Vec<Term>> {
        let mut guard = self.state();
        let state = &mut *guard;
        Ok(upsert_keyed(
            &mut state.terms,
            &mut state.next_id,
            terms.iter().cloned().map(|t| {
                let key = t.globalsearch_key.clone();
                let make: Box<dyn FnOnce(i32) -> Term> = Box::new(move |id| Term {
                    id,
                    name: t.name,
                    year: t.year,
                    globalsearch_key: t.globalsearch_key,
                    is_available: false,
                    is_preferred: false,
                });
                (key, make)
            }),
            |t| &t.globalsearch_key,
        ))
    }

    async fn upsert_schools(&self, schools: &[GsSchool]) -> Result<Vec<School>> {
        let mut guard = self.state();
        let state = &mut *guard;
        Ok(upsert_keyed(
            &mut state.schools,
            &mut state.next_id,
            schools.iter().cloned().map(|s| {
                let key = s.globalsearch_key.clone();
                let make: Box<dyn FnOnce(i32) -> School> = Box::new(move |id| School {
                    id,
                    name: s.name,
                    globalsearch_key: s.globalsearch_key,
                    is_preferred: false,
                });
                (key, make)
            }),
            |s| &s.globalsearch_key,
        ))
    }

    async fn upsert_careers(&self, careers: &[GsCareer]) -> Result<Vec<CourseCareer>> {
        let mut guard = self.state();
        let state = &mut *guard;
        Ok(upsert_keyed(
            &mut state.careers,
            &mut state.next_id,
            careers.iter().cloned().map(|c| {
                let key = c.globalsearch_key.clone();
                let make: Box<dyn FnOnce(i32) -> CourseCareer> = Box::new(move |id| CourseCareer {
                    id,
                    name: c.name,
                    globalsearch_key: c.globalsearch_key,
                    is_preferred: false,
                });
                (key, make)
            }),
            |c| &c.globalsearch_key,
        ))
    }

    async fn upsert_subjects(&self, subjects: &[GsSubject]) -> Result<Vec<Subject>> {
        let mut guard = self.state();
        let state = &mut *guard;
        Ok(upsert_keyed(
            &mut state.subjects,
            &mut state.next_id,
            subjects.iter().cloned().map(|s| {
                let key = s.globalsearch_key.clone();
                let make: Box<dyn FnOnce(i32) -> Subject> = Box::new(move |id| Subject {
                    id,
                    name: s.name,
                    globalsearch_key: s.globalsearch_key,
                    is_preferred: false,
                });
                (key, make)
            }),
            |s| &s.globalsearch_key,
        ))
    }

    async fn upsert_instructors(&self, school_id: i32, names: &[String]) -> Result<Vec<Instructor>> {
        let mut state = self.state();
        let mut out: Vec<Instructor> = Vec::new();
        for name in names {
            if out.iter().any(|i| &i.name == name) {
                continue;
            }
            let existing = state
                .instructors
                .iter()
                .find(|i| &i.name == name && i.school_id == school_id)
                .cloned();
            let instructor = match existing {
                Some(existing) => existing,
                None => {
                    let instructor = Instructor {
                        id: state.id(),
                        name: name.clone(),
                        school_id,
                    };
                    state.instructors.push(instructor.clone());
                    instructor
                }
            };
            out.push(instructor);
        }
        Ok(out)
    }

    async fn upsert_courses(&self, courses: &[NewCourse]) -> Result<Vec<Course>> {
        let mut state = self.state();
        let mut out: Vec<Course> = Vec::new();
        for candidate in courses {
            let matches = |c: &Course| {
                c.code == candidate.code
                    && c.level == candidate.level
                    && c.school_id == candidate.school_id
            };
            if out.iter().any(matches) {
                continue;
            }
            let existing = state.courses.iter().find(|c| matches(c)).cloned();
            let course = match existing {
                Some(existing) => existing,
                None => {
                    let course = Course {
                        id: state.id(),
                        code: candidate.code.clone(),
                        level: candidate.level.clone(),
                        title: candidate.title.clone(),
                        designation: candidate.designation.clone(),
                        subject_id: candidate.subject_id,
                        career_id: candidate.career_id,
                        school_id: candidate.school_id,
                    };
                    state.courses.push(course.clone());
                    course
                }
            };
            out.push(course);
        }
        Ok(out)
    }

    async fn get_or_create_section(
        &self,
        section: &NewCourseSection,
    ) -> Result<(CourseSection, bool)> {
        let mut state = self.state();
        if let Some(existing) = state
            .sections
            .iter()
            .find(|s| s.gs_unique_id == section.gs_unique_id)
        {
            return Ok((existing.clone(), false));
        }
        if state
            .sections
            .iter()
            .any(|s| s.term_id == section.term_id && s.number == section.number)
        {
            bail!(
                "duplicate key value violates unique constraint (term_id, number) = ({}, {})",
                section.term_id,
                section.number
            );
        }

        let created = CourseSection {
            id: state.id(),
            gs_unique_id: section.gs_unique_id.clone(),
            number: section.number,
            section_name: section.section_name.clone(),
            topic: section.topic.clone(),
            url: section.url.clone(),
            instruction_mode: section.instruction_mode.clone(),
            status: section.status,
            course_id: section.course_id,
            term_id: section.term_id,
        };
        state.sections.push(created.clone());
        Ok((created, true))
    }

    async fn update_section(&self, id: i32, section: &NewCourseSection) -> Result<CourseSection> {
        let mut state = self.state();
        let stored = state
            .sections
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| anyhow!("section {id} not found"))?;
        stored.gs_unique_id = section.gs_unique_id.clone();
        stored.number = section.number;
        stored.section_name = section.section_name.clone();
        stored.topic = section.topic.clone();
        stored.url = section.url.clone();
        stored.instruction_mode = section.instruction_mode.clone();
        stored.status = section.status;
        stored.course_id = section.course_id;
        stored.term_id = section.term_id;
        Ok(stored.clone())
    }

    async fn replace_instruction_entries(
        &self,
        section_id: i32,
        entries: &[NewInstructionEntry],
    ) -> Result<usize> {
        if self.fail_replace_entries.load(Ordering::SeqCst) {
            bail!("connection reset by peer");
        }
        let mut state = self.state();
        state.entries.retain(|e| e.course_section_id != section_id);

        let mut stored = 0;
        for entry in entries {
            let candidate = InstructionEntry {
                id: 0,
                days: entry.days,
                start_time: entry.start_time,
                end_time: entry.end_time,
                building: entry.building.clone(),
                room: entry.room.clone(),
                floor_number: entry.floor_number.clone(),
                start_date: entry.start_date,
                end_date: entry.end_date,
                instructor_id: entry.instructor_id,
                course_section_id: section_id,
                term_id: entry.term_id,
            };
            if state.entries.iter().any(|e| same_block(e, &candidate)) {
                continue;
            }
            let id = state.id();
            state.entries.push(InstructionEntry { id, ..candidate });
            stored += 1;
        }
        Ok(stored)
    }

    async fn mark_available_terms(&self, term_ids: &[i32]) -> Result<()> {
        for term in self.state().terms.iter_mut() {
            term.is_available = term_ids.contains(&term.id);
        }
        Ok(())
    }

    async fn link_terms_to_schools(&self, term_ids: &[i32], school_ids: &[i32]) -> Result<()> {
        let mut state = self.state();
        for &term_id in term_ids {
            for &school_id in school_ids {
                state.links.insert(("term_schools", term_id, school_id, 0));
            }
        }
        Ok(())
    }

    async fn link_careers(&self, school_id: i32, term_id: i32, career_ids: &[i32]) -> Result<()> {
        let mut state = self.state();
        for &career_id in career_ids {
            state.links.insert(("career_terms", career_id, term_id, 0));
            state.links.insert(("career_schools", career_id, school_id, 0));
        }
        Ok(())
    }

    async fn link_subjects(&self, school_id: i32, term_id: i32, subject_ids: &[i32]) -> Result<()> {
        let mut state = self.state();
        for &subject_id in subject_ids {
            state.links.insert(("subject_terms", subject_id, term_id, 0));
            state.links.insert(("subject_schools", subject_id, school_id, 0));
        }
        Ok(())
    }

    async fn link_courses_to_term(&self, term_id: i32, course_ids: &[i32]) -> Result<()> {
        let mut state = self.state();
        for &course_id in course_ids {
            state.links.insert(("course_terms", course_id, term_id, 0));
        }
        Ok(())
    }

    async fn link_instructors_to_term(&self, term_id: i32, instructor_ids: &[i32]) -> Result<()> {
        let mut state = self.state();
        for &instructor_id in instructor_ids {
            state.links.insert(("instructor_terms", instructor_id, term_id, 0));
        }
        Ok(())
    }

    async fn search_context(&self, key: SearchKey) -> Result<Option<SearchContext>> {
        if self.fail_search_context.load(Ordering::SeqCst) {
            bail!("connection reset by peer");
        }
        let state = self.state();
        let school = state.schools.iter().find(|s| s.id == key.school_id).cloned();
        let term = state.terms.iter().find(|t| t.id == key.term_id).cloned();
        let subject = state.subjects.iter().find(|s| s.id == key.subject_id).cloned();
        let career = state.careers.iter().find(|c| c.id == key.career_id).cloned();
        Ok(match (school, term, subject, career) {
            (Some(school), Some(term), Some(subject), Some(career)) => Some(SearchContext {
                school,
                term,
                subject,
                career,
            }),
            _ => None,
        })
    }

    async fn find_school(&self, key_or_name: &str) -> Result<Option<School>> {
        let state = self.state();
        Ok(state
            .schools
            .iter()
            .find(|s| s.globalsearch_key == key_or_name)
            .or_else(|| state.schools.iter().find(|s| s.name == key_or_name))
            .cloned())
    }

    async fn find_term(&self, key_or_name: &str) -> Result<Option<Term>> {
        let state = self.state();
        Ok(state
            .terms
            .iter()
            .find(|t| t.globalsearch_key == key_or_name)
            .or_else(|| state.terms.iter().find(|t| t.name == key_or_name))
            .cloned())
    }

    async fn find_subject(&self, key_or_name: &str) -> Result<Option<Subject>> {
        let state = self.state();
        Ok(state
            .subjects
            .iter()
            .find(|s| s.globalsearch_key == key_or_name)
            .or_else(|| state.subjects.iter().find(|s| s.name == key_or_name))
            .cloned())
    }

    async fn find_career(&self, key_or_name: &str) -> Result<Option<CourseCareer>> {
        let state = self.state();
        Ok(state
            .careers
            .iter()
            .find(|c| c.globalsearch_key == key_or_name)
            .or_else(|| state.careers.iter().find(|c| c.name == key_or_name))
            .cloned())
    }

    async fn watched_sections(&self) -> Result<Vec<WatchedSection>> {
        let state = self.state();
        state
            .watches
            .iter()
            .map(|&(recipient_id, section_id)| {
                let recipient = state
                    .recipients
                    .iter()
                    .find(|r| r.id == recipient_id)
                    .cloned()
                    .ok_or_else(|| anyhow!("recipient {recipient_id} not found"))?;
                let section = state
                    .sections
                    .iter()
                    .find(|s| s.id == section_id)
                    .cloned()
                    .ok_or_else(|| anyhow!("section {section_id} not found"))?;
                let course = state
                    .courses
                    .iter()
                    .find(|c| c.id == section.course_id)
                    .cloned()
                    .ok_or_else(|| anyhow!("course {} not found", section.course_id))?;
                Ok(WatchedSection {
                    recipient,
                    section,
                    course,
                })
            })
            .collect()
    }

    async fn recent_alerts(&self, since: DateTime<Utc>) -> Result<Vec<ClassAlert>> {
        if self.fail_recent_alerts.load(Ordering::SeqCst) {
            bail!("statement timeout");
        }
        Ok(self
            .state()
            .alerts
            .iter()
            .filter(|a| a.created_at > since)
            .cloned()
            .collect())
    }

    async fn insert_alerts(&self, pairs: &[(i32, i32)]) -> Result<usize> {
        if self.fail_insert_alerts.load(Ordering::SeqCst) {
            bail!("disk full");
        }
        let now = Utc::now();
        for &(recipient_id, section_id) in pairs {
            self.seed_alert(recipient_id, section_id, now);
        }
        Ok(pairs.len())
    }

    async fn global_settings(&self) -> Result<Option<GlobalSettings>> {
        Ok(self.state().settings)
    }

    async fn instructor_names(&self, section_id: i32) -> Result<Vec<String>> {
        let state = self.state();
        Ok(state
            .entries
            .iter()
            .filter(|e| e.course_section_id == section_id)
            .filter_map(|e| state.instructors.iter().find(|i| i.id == e.instructor_id))
            .map(|i| i.name.clone())
            .collect())
    }
}

// ---------------------------------------------------------------------------
// FakeSearch
// ---------------------------------------------------------------------------

/// Serves canned pages; results pages are keyed by subject key.
#[derive(Default)]
pub struct FakeSearch {
    pub main_page: Mutex<String>,
    pub subject_page: Mutex<String>,
    results: Mutex<HashMap<String, String>>,
    failing: Mutex<HashSet<String>>,
    delays: Mutex<HashMap<String, Duration>>,
    pub results_requests: AtomicUsize,
    pub last_query: Mutex<Option<ClassQuery>>,
}

impl FakeSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_results(&self, subject_key: &str, html: String) {
        self.results
            .lock()
            .unwrap()
            .insert(subject_key.to_string(), html);
    }

    pub fn fail_subject(&self, subject_key: &str) {
        self.failing.lock().unwrap().insert(subject_key.to_string());
    }

    pub fn delay_subject(&self, subject_key: &str, delay: Duration) {
        self.delays
            .lock()
            .unwrap()
            .insert(subject_key.to_string(), delay);
    }
}

#[async_trait]
impl ClassSearch for FakeSearch {
    async fn fetch_main_page(&self) -> Result<String, NavigationError> {
        Ok(self.main_page.lock().unwrap().clone())
    }

    async fn fetch_subject_page(
        &self,
        _school: &FormChoice,
        _term: &FormChoice,
    ) -> Result<String, NavigationError> {
        Ok(self.subject_page.lock().unwrap().clone())
    }

    async fn fetch_class_results(&self, query: &ClassQuery) -> Result<String, NavigationError> {
        self.results_requests.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().unwrap() = Some(query.clone());
        let subject = query.subject.key.clone();

        let delay = self.delays.lock().unwrap().get(&subject).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.lock().unwrap().contains(&subject) {
            return Err(NavigationError::Status {
                step: "results",
                status: 503,
                url: "https://globalsearch.cuny.edu/CFGlobalSearchTool/CFSearchToolController"
                    .to_string(),
            });
        }
        Ok(self
            .results
            .lock()
            .unwrap()
            .get(&subject)
            .cloned()
            .unwrap_or_else(|| results_page(&[])))
    }
}

// ---------------------------------------------------------------------------
// RecordingNotifier
// ---------------------------------------------------------------------------

/// Records delivered messages; recipients named in `failing` get an error.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(Recipient, String)>>,
    failing: Mutex<HashSet<i32>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_for(&self, recipient_id: i32) {
        self.failing.lock().unwrap().insert(recipient_id);
    }

    pub fn messages_for(&self, recipient_id: i32) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(r, _)| r.id == recipient_id)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, recipient: &Recipient, message: &str) -> Result<(), NotifyError> {
        if self.failing.lock().unwrap().contains(&recipient.id) {
            return Err(NotifyError::Rejected("device not registered".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((recipient.clone(), message.to_string()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Results-page fixtures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SectionSpec {
    pub number: i32,
    /// Status icon title: "Open", "Closed" or "Wait List".
    pub status: &'static str,
    pub days_and_times: String,
    pub room: String,
    pub instructor: String,
    pub meeting_dates: String,
    pub topic: String,
}

impl SectionSpec {
    pub fn new(number: i32, status: &'static str) -> Self {
        Self {
            number,
            status,
            days_and_times: "MoWe 1:40PM - 2:55PM".to_string(),
            room: "Science Bldg C205".to_string(),
            instructor: "Ada Lovelace".to_string(),
            meeting_dates: "01/27/2025 - 05/19/2025".to_string(),
            topic: String::new(),
        }
    }

    pub fn topic(mut self, topic: &str) -> Self {
        self.topic = topic.to_string();
        self
    }

    pub fn instructor(mut self, name: &str) -> Self {
        self.instructor = name.to_string();
        self
    }
}

#[derive(Debug, Clone)]
pub struct CourseSpec {
    pub code: String,
    pub level: String,
    pub title: String,
    pub sections: Vec<SectionSpec>,
}

impl CourseSpec {
    pub fn new(code: &str, level: &str, title: &str, sections: Vec<SectionSpec>) -> Self {
        Self {
            code: code.to_string(),
            level: level.to_string(),
            title: title.to_string(),
            sections,
        }
    }
}

fn section_row(section: &SectionSpec) -> String {
    format!(
        r#"<tr>
            <td data-label="Class"><a href="CFSearchToolController?class_number_searched=U{number}">{number}</a></td>
            <td data-label="Section">01-LEC Regular</td>
            <td data-label="DaysAndTimes">{days_and_times}</td>
            <td data-label="Room">{room}</td>
            <td data-label="Instructor">{instructor}</td>
            <td data-label="Instruction Mode">In Person</td>
            <td data-label="Meeting Dates">{meeting_dates}</td>
            <td data-label="Status"><img src="status.png" alt="{status}" title="{status}"></td>
            <td data-label="Course Topic">{topic}</td>
        </tr>"#,
        number = section.number,
        days_and_times = section.days_and_times,
        room = section.room,
        instructor = section.instructor,
        meeting_dates = section.meeting_dates,
        status = section.status,
        topic = section.topic,
    )
}

/// A class search results page listing `courses`.
pub fn results_page(courses: &[CourseSpec]) -> String {
    let mut body = String::new();
    for (i, course) in courses.iter().enumerate() {
        let rows: String = course.sections.iter().map(section_row).collect();
        body.push_str(&format!(
            r#"<div id="contentHeader{i}">
                <span class="testing_msg">{code}&nbsp;{level} - {title}</span>
                <br>
                <div id="contentDivImg{i}">
                    <table class="classinfo"><tbody>{rows}</tbody></table>
                </div>
            </div>"#,
            code = course.code,
            level = course.level,
            title = course.title,
        ));
    }
    format!("<html><body><div id=\"contentMain\">{body}</div></body></html>")
}

/// 31 courses with four sections each, covering multi-block sections,
/// TBA meetings, online rooms and every status.
pub fn large_catalog() -> Vec<CourseSpec> {
    const STATUSES: [&str; 4] = ["Open", "Closed", "Wait List", "Closed"];
    const INSTRUCTORS: [&str; 5] = [
        "Ada Lovelace",
        "Alan Turing",
        "Grace Hopper",
        "Edsger Dijkstra",
        "Barbara Liskov",
    ];

    (0..31)
        .map(|c| {
            let sections = (0..4)
                .map(|s| {
                    let number = 10_000 + c * 10 + s;
                    let mut section = SectionSpec::new(number, STATUSES[(c + s) as usize % 4])
                        .instructor(INSTRUCTORS[(c + s) as usize % INSTRUCTORS.len()]);
                    match s {
                        1 => {
                            section.days_and_times =
                                "TuTh 10:45AM - 12:00PM<br>Fr 9:00AM - 9:50AM".to_string();
                            section.room = "Kiely Hall 258<br>Kiely Hall 170".to_string();
                        }
                        2 => {
                            section.days_and_times = "TBA".to_string();
                            section.room = "Online-Asynchronous".to_string();
                            section.instructor = "TBA".to_string();
                        }
                        _ => {}
                    }
                    section
                })
                .collect();
            CourseSpec::new(
                "CSCI",
                &format!("{}", 100 + c),
                &format!("Computer Science Topic {c}"),
                sections,
            )
        })
        .collect()
}
