//! Error types for the GlobalSearch client and HTML parser.

/// A request in the three-page search flow failed.
#[derive(Debug, thiserror::Error)]
pub enum NavigationError {
    #[error("Failed to build HTTP client")]
    Client(#[source] reqwest::Error),
    #[error("GlobalSearch {step} request failed")]
    Request {
        step: &'static str,
        #[source]
        source: reqwest_middleware::Error,
    },
    #[error("GlobalSearch {step} page returned status {status} ({url})")]
    Status {
        step: &'static str,
        status: u16,
        url: String,
    },
    #[error("Failed to read GlobalSearch {step} page body")]
    Body {
        step: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

/// The remote page no longer has the shape the parser expects.
///
/// These are never swallowed: a schema change on the search tool has to be visible.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Element with selector `{0}` not found")]
    MissingElement(&'static str),
    #[error("Term option {0:?} does not match `<year> <name>`")]
    TermName(String),
    #[error("Course title {0:?} does not match `<code> <level> - <title>`")]
    CourseTitle(String),
    #[error("No element follows the course label for {0:?}")]
    MissingSectionContainer(String),
    #[error("Section attribute cell has no data-label: {0}")]
    MissingDataLabel(String),
    #[error("Unknown section data-label {0:?}")]
    UnknownDataLabel(String),
    #[error("Section number {0:?} is not an integer")]
    SectionNumber(String),
    #[error("Class cell has no link with an href")]
    MissingClassLink,
    #[error("Class link {0:?} has no `class_number_searched` query parameter")]
    MissingUniqueId(String),
    #[error("Class link {0:?} is not a valid URL")]
    ClassUrl(String),
    #[error("No status icon found for section {0}")]
    MissingStatusIcon(i32),
    #[error("Unknown section status {0:?}")]
    UnknownStatus(String),
    #[error("Section {section} has no {label:?} cell")]
    MissingAttribute { section: i32, label: &'static str },
    #[error(
        "Section {section} attribute lists are longer than DaysAndTimes \
         (days/times={days_and_times}, room={room}, instructor={instructor}, dates={meeting_dates})"
    )]
    AttributeOverflow {
        section: i32,
        days_and_times: usize,
        room: usize,
        instructor: usize,
        meeting_dates: usize,
    },
}
