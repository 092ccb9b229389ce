//! Parsing of a single section row from the class results table.
//!
//! A row is a flat list of `<td data-label="...">` cells. The DaysAndTimes,
//! Room, Instructor and Meeting Dates cells hold one line per meeting block;
//! those four lists are zipped back together by position.

use html_scraper::{ElementRef, Selector};
use std::str::FromStr;
use std::sync::LazyLock;
use url::Url;

use super::GLOBALSEARCH_URL;
use super::errors::ParseError;
use super::models::{GsCourseSection, GsInstructionEntry, SectionStatus};

const UNIQUE_ID_PARAM: &str = "class_number_searched";
const TBA: &str = "TBA";

static LINK_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());
static STATUS_ICON_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img[alt][title]").unwrap());

/// Known `data-label` values of a section row cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DataLabel {
    Class,
    Section,
    DaysAndTimes,
    Room,
    Instructor,
    InstructionMode,
    MeetingDates,
    Status,
    CourseTopic,
}

impl FromStr for DataLabel {
    type Err = ParseError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        Ok(match label {
            "Class" => Self::Class,
            "Section" => Self::Section,
            "DaysAndTimes" => Self::DaysAndTimes,
            "Room" => Self::Room,
            "Instructor" => Self::Instructor,
            "Instruction Mode" => Self::InstructionMode,
            "Meeting Dates" => Self::MeetingDates,
            "Status" => Self::Status,
            "Course Topic" => Self::CourseTopic,
            other => return Err(ParseError::UnknownDataLabel(other.to_string())),
        })
    }
}

/// Accumulates cell values until the whole row has been seen.
#[derive(Debug, Default)]
struct SectionRow {
    number: Option<i32>,
    unique_id: Option<String>,
    url: String,
    section_name: String,
    instruction_mode: String,
    status: Option<SectionStatus>,
    topic: String,
    days_and_times: Option<Vec<String>>,
    rooms: Option<Vec<String>>,
    instructors: Option<Vec<String>>,
    meeting_dates: Option<Vec<String>>,
}

/// Parse one section row from its attribute cells.
pub(super) fn parse_section_row(cells: &[ElementRef<'_>]) -> Result<GsCourseSection, ParseError> {
    let mut row = SectionRow::default();
    for cell in cells {
        row.assign(*cell)?;
    }
    row.finish()
}

impl SectionRow {
    fn assign(&mut self, cell: ElementRef<'_>) -> Result<(), ParseError> {
        let label = cell
            .attr("data-label")
            .ok_or_else(|| ParseError::MissingDataLabel(snippet(cell)))?;

        match label.parse::<DataLabel>()? {
            DataLabel::Class => {
                let text = cell_text(cell);
                let number = text
                    .trim()
                    .parse()
                    .map_err(|_| ParseError::SectionNumber(text.trim().to_string()))?;
                self.number = Some(number);

                let href = cell
                    .select(&LINK_SEL)
                    .next()
                    .and_then(|a| a.attr("href"))
                    .ok_or(ParseError::MissingClassLink)?;
                self.unique_id = Some(unique_id_from_href(href)?);
                self.url = href.to_string();
            }
            DataLabel::Section => self.section_name = cell_text(cell).trim().to_string(),
            DataLabel::DaysAndTimes => extend_lines(&mut self.days_and_times, cell),
            DataLabel::Room => extend_lines(&mut self.rooms, cell),
            DataLabel::Instructor => extend_lines(&mut self.instructors, cell),
            DataLabel::InstructionMode => {
                self.instruction_mode = cell_text(cell).trim().to_string()
            }
            DataLabel::MeetingDates => extend_lines(&mut self.meeting_dates, cell),
            DataLabel::Status => {
                let title = cell
                    .select(&STATUS_ICON_SEL)
                    .next()
                    .and_then(|icon| icon.attr("title"))
                    .ok_or(ParseError::MissingStatusIcon(self.number.unwrap_or_default()))?;
                self.status = Some(SectionStatus::from_icon_title(title)?);
            }
            DataLabel::CourseTopic => self.topic = cell_text(cell).trim().to_string(),
        }

        Ok(())
    }

    fn finish(self) -> Result<GsCourseSection, ParseError> {
        let (Some(number), Some(unique_id)) = (self.number, self.unique_id) else {
            return Err(ParseError::MissingAttribute {
                section: 0,
                label: "Class",
            });
        };

        let missing = |label| ParseError::MissingAttribute {
            section: number,
            label,
        };
        let days_and_times = self.days_and_times.ok_or_else(|| missing("DaysAndTimes"))?;
        let rooms = self.rooms.ok_or_else(|| missing("Room"))?;
        let instructors = self.instructors.ok_or_else(|| missing("Instructor"))?;
        let meeting_dates = self.meeting_dates.ok_or_else(|| missing("Meeting Dates"))?;

        let instruction_entries =
            zip_instruction_entries(number, days_and_times, rooms, instructors, meeting_dates)?;

        Ok(GsCourseSection {
            unique_id,
            number,
            section_name: self.section_name,
            url: self.url,
            instruction_mode: self.instruction_mode,
            status: self.status.unwrap_or(SectionStatus::Closed),
            topic: self.topic,
            instruction_entries,
        })
    }
}

/// Rebuild meeting blocks from the four per-line lists.
///
/// DaysAndTimes decides how many blocks there are. Shorter lists are
/// right-padded with empty strings, which become `TBA` (meeting dates stay
/// blank). A list longer than DaysAndTimes is an error.
fn zip_instruction_entries(
    section: i32,
    days_and_times: Vec<String>,
    mut rooms: Vec<String>,
    mut instructors: Vec<String>,
    mut meeting_dates: Vec<String>,
) -> Result<Vec<GsInstructionEntry>, ParseError> {
    let base_length = days_and_times.len();
    for list in [&mut rooms, &mut instructors, &mut meeting_dates] {
        pad_to(list, base_length);
    }

    if rooms.len() != base_length
        || instructors.len() != base_length
        || meeting_dates.len() != base_length
    {
        return Err(ParseError::AttributeOverflow {
            section,
            days_and_times: base_length,
            room: rooms.len(),
            instructor: instructors.len(),
            meeting_dates: meeting_dates.len(),
        });
    }

    let entries = days_and_times
        .into_iter()
        .zip(rooms)
        .zip(instructors)
        .zip(meeting_dates)
        .map(
            |(((days_and_times, room), instructor), meeting_dates)| GsInstructionEntry {
                days_and_times: or_tba(&days_and_times),
                room: or_tba(&room),
                instructor: or_tba(&instructor),
                meeting_dates: blank_if_no_alnum(&meeting_dates).to_string(),
            },
        )
        .collect();

    Ok(entries)
}

fn pad_to(list: &mut Vec<String>, length: usize) {
    if list.len() < length {
        list.resize(length, String::new());
    }
}

/// Cell text with text nodes joined by newlines.
fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<Vec<_>>().join("\n")
}

fn extend_lines(list: &mut Option<Vec<String>>, cell: ElementRef<'_>) {
    let text = cell_text(cell);
    list.get_or_insert_with(Vec::new)
        .extend(text.trim().split('\n').map(|line| line.trim().to_string()));
}

/// Values without a single alphanumeric character carry no information.
fn blank_if_no_alnum(value: &str) -> &str {
    if value.chars().any(char::is_alphanumeric) {
        value
    } else {
        ""
    }
}

fn or_tba(value: &str) -> String {
    match blank_if_no_alnum(value).trim() {
        "" => TBA.to_string(),
        v => v.to_string(),
    }
}

fn unique_id_from_href(href: &str) -> Result<String, ParseError> {
    let url = Url::parse(GLOBALSEARCH_URL)
        .and_then(|base| base.join(href))
        .map_err(|_| ParseError::ClassUrl(href.to_string()))?;

    url.query_pairs()
        .find(|(key, _)| key == UNIQUE_ID_PARAM)
        .map(|(_, value)| value.into_owned())
        .ok_or_else(|| ParseError::MissingUniqueId(href.to_string()))
}

fn snippet(cell: ElementRef<'_>) -> String {
    cell.html().chars().take(200).collect()
}
