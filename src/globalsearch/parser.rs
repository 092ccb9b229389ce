//! Extraction of terms, schools, careers, subjects and course sections from
//! GlobalSearch HTML pages.
//!
//! All functions are pure over an already-parsed document. A missing element
//! that the page is expected to contain is reported as a [`ParseError`]
//! instead of yielding an empty result.

use html_scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::{debug, info, warn};

use super::errors::ParseError;
use super::models::{GsCareer, GsCourse, GsSchool, GsSubject, GsTerm};
use super::section::parse_section_row;

const TERM_SELECT: &str = "select[name='term_value']";
const INST_INPUT: &str = "input[name='inst_selection']";
const CAREER_SELECT: &str = "#courseCareerId";
const SUBJECT_SELECT: &str = "#subject_ld";
const SECTION_CONTAINER_PREFIX: &str = "contentDivImg";

static TERM_SELECT_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(TERM_SELECT).unwrap());
static OPTION_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("option").unwrap());
static INST_INPUT_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(INST_INPUT).unwrap());
static INST_OR_LABEL_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("input[name='inst_selection'], label").unwrap());
static CAREER_SELECT_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(CAREER_SELECT).unwrap());
static SUBJECT_SELECT_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(SUBJECT_SELECT).unwrap());
static COURSE_LABEL_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[id^='content'] .testing_msg").unwrap());
static SECTION_ROW_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table.classinfo > tbody > tr").unwrap());

/// Terms offered by the main page's term dropdown.
///
/// Options with an empty value or text (the "--Select--" placeholder) are skipped.
pub fn parse_available_terms(html: &Html) -> Result<Vec<GsTerm>, ParseError> {
    let select = html
        .select(&TERM_SELECT_SEL)
        .next()
        .ok_or(ParseError::MissingElement(TERM_SELECT))?;

    let mut terms = Vec::new();
    for option in select.select(&OPTION_SEL) {
        let key = option.attr("value").unwrap_or_default().trim();
        let full_name = element_text(option);
        if key.is_empty() || full_name.is_empty() {
            continue;
        }

        let (name, year) = GsTerm::parse_name_and_year(&full_name)
            .ok_or_else(|| ParseError::TermName(full_name.clone()))?;
        terms.push(GsTerm {
            name,
            year,
            globalsearch_key: key.to_string(),
        });
    }

    debug!(count = terms.len(), "Parsed available terms");
    Ok(terms)
}

/// Institutions listed as checkboxes on the main page.
///
/// Each checkbox is named by the first `<label>` that follows it in the document.
pub fn parse_schools(html: &Html) -> Result<Vec<GsSchool>, ParseError> {
    if html.select(&INST_INPUT_SEL).next().is_none() {
        return Err(ParseError::MissingElement(INST_INPUT));
    }

    let mut schools = Vec::new();
    let mut pending: Vec<String> = Vec::new();
    for element in html.select(&INST_OR_LABEL_SEL) {
        if element.value().name() == "input" {
            let key = element.attr("value").unwrap_or_default().trim();
            if !key.is_empty() {
                pending.push(key.to_string());
            }
            continue;
        }

        if pending.is_empty() {
            continue;
        }
        let name = element_text(element);
        schools.extend(pending.drain(..).map(|key| GsSchool {
            name: name.clone(),
            globalsearch_key: key,
        }));
    }

    if !pending.is_empty() {
        warn!(keys = ?pending, "Institution checkboxes without a label were skipped");
    }

    debug!(count = schools.len(), "Parsed schools");
    Ok(schools)
}

/// Careers and subjects offered on the subject-selection page.
pub fn parse_careers_and_subjects(
    html: &Html,
) -> Result<(Vec<GsCareer>, Vec<GsSubject>), ParseError> {
    let career_select = html
        .select(&CAREER_SELECT_SEL)
        .next()
        .ok_or(ParseError::MissingElement(CAREER_SELECT))?;
    let subject_select = html
        .select(&SUBJECT_SELECT_SEL)
        .next()
        .ok_or(ParseError::MissingElement(SUBJECT_SELECT))?;

    let careers: Vec<GsCareer> = keyed_options(career_select)
        .map(|(key, name)| GsCareer {
            name,
            globalsearch_key: key,
        })
        .collect();
    let subjects: Vec<GsSubject> = keyed_options(subject_select)
        .map(|(key, name)| GsSubject {
            name,
            globalsearch_key: key,
        })
        .collect();

    debug!(
        careers = careers.len(),
        subjects = subjects.len(),
        "Parsed careers and subjects"
    );
    Ok((careers, subjects))
}

/// Courses and their sections from a class search results page.
///
/// Each course is a `.testing_msg` title inside a `content*` block, followed by a
/// `contentDivImg*` sibling holding the section table. Courses whose following
/// sibling is something else have no listing and are skipped.
pub fn parse_course_sections(html: &Html) -> Result<Vec<GsCourse>, ParseError> {
    let mut courses = Vec::new();

    for label in html.select(&COURSE_LABEL_SEL) {
        let title = element_text(label).replace('\u{a0}', " ").trim().to_string();

        let container = next_tag_sibling(label)
            .ok_or_else(|| ParseError::MissingSectionContainer(title.clone()))?;
        let has_listing = container
            .value()
            .id()
            .is_some_and(|id| id.starts_with(SECTION_CONTAINER_PREFIX));
        if !has_listing {
            info!(course = title, "Course has no class listing, skipping");
            continue;
        }

        let sections = container
            .select(&SECTION_ROW_SEL)
            .map(|row| parse_section_row(&tag_children(row)))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(course = title, sections = sections.len(), "Parsed course");
        courses.push(GsCourse::from_title(&title, sections)?);
    }

    if courses.is_empty() {
        warn!("No course listings found on results page");
    }

    Ok(courses)
}

/// `(value, text)` pairs of a select's options that have a non-empty value.
fn keyed_options<'a>(select: ElementRef<'a>) -> impl Iterator<Item = (String, String)> + 'a {
    select.select(&OPTION_SEL).filter_map(|option| {
        let key = option.attr("value")?.trim();
        (!key.is_empty()).then(|| (key.to_string(), element_text(option)))
    })
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// The next sibling element that is not a `<br>`.
fn next_tag_sibling(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sibling| sibling.value().name() != "br")
}

/// Child elements, excluding `<br>`.
fn tag_children(element: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() != "br")
        .collect()
}
