//! Schedule table construction
//!
//! Turns the raw exam sheet into a [`Schedule`]: rows with a parsed exam date,
//! the ordered column list, and the canonical subject list that user input is
//! matched against.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, Weekday};
use serde::Deserialize;
use std::collections::HashSet;
use tracing::{debug, info};

use crate::table::RawTable;
use crate::{Error, Result};

/// Morning session column label
pub const MORNING_SLOT: &str = "9:00 to 12:00 PM";
/// Afternoon session column label
pub const AFTERNOON_SLOT: &str = "1:00 to 4:00 PM";
/// Evening session column label
pub const EVENING_SLOT: &str = "5:20 to 8:20 PM";
/// Date column label
pub const DATE_COLUMN: &str = "Days & Date";

/// Shape of the schedule sheet
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScheduleLayout {
    /// 0-based row of the raw sheet holding the real column names
    ///
    /// Counts every record, including the sheet's own first row.
    pub header_row: usize,
    /// Rows after the header that belong to the schedule; the rest are notes
    pub max_rows: usize,
    /// Column holding the exam date
    pub date_column: String,
    /// Time-slot columns, in the order their subjects are listed
    pub slot_columns: Vec<String>,
}

impl Default for ScheduleLayout {
    fn default() -> Self {
        Self {
            header_row: 4,
            max_rows: 161,
            date_column: DATE_COLUMN.to_string(),
            slot_columns: vec![
                MORNING_SLOT.to_string(),
                AFTERNOON_SLOT.to_string(),
                EVENING_SLOT.to_string(),
            ],
        }
    }
}

impl ScheduleLayout {
    /// Reject layouts no sheet could satisfy
    pub fn validate(&self) -> Result<()> {
        if self.max_rows == 0 {
            return Err(Error::Config("layout.max_rows must be at least 1".to_string()));
        }
        if self.slot_columns.is_empty() {
            return Err(Error::Config(
                "layout.slot_columns must name at least one column".to_string(),
            ));
        }
        if self.date_column.trim().is_empty() {
            return Err(Error::Config("layout.date_column must not be empty".to_string()));
        }
        Ok(())
    }
}

/// One cell of a schedule row
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Cell {
    Text(String),
    Date(NaiveDate),
}

impl Cell {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            Cell::Date(_) => None,
        }
    }
}

/// One schedule row: the exam date plus every cell in column order
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScheduleRow {
    pub date: NaiveDate,
    pub cells: Vec<Cell>,
}

impl ScheduleRow {
    /// English weekday name of the exam date
    pub fn day_name(&self) -> String {
        day_name(self.date)
    }
}

/// A single exam sitting read from one slot column of a row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamSession {
    pub date: NaiveDate,
    pub day_name: String,
    pub time_slot: String,
    pub subject: String,
}

/// Cleaned schedule table
#[derive(Debug, Clone)]
pub struct Schedule {
    columns: Vec<String>,
    rows: Vec<ScheduleRow>,
    slot_indices: Vec<usize>,
    subjects: Vec<String>,
}

impl Schedule {
    /// Build the schedule from the raw sheet
    ///
    /// Steps, in order: header promotion, forward fill, drop of columns that
    /// are still incomplete, truncation to `layout.max_rows`, date parsing.
    pub fn build(raw: RawTable, layout: &ScheduleLayout) -> Result<Self> {
        layout.validate()?;

        let mut table = raw.promote_header(layout.header_row)?;
        table.forward_fill();

        let dropped = table.drop_incomplete_columns();
        if !dropped.is_empty() {
            debug!("Dropped incomplete columns: {:?}", dropped);
        }

        let discarded = table.truncate(layout.max_rows);
        if discarded > 0 {
            info!(
                "Discarded {} rows beyond max_rows={}",
                discarded, layout.max_rows
            );
        }

        let date_index = table.column_index(&layout.date_column).ok_or_else(|| {
            Error::ScheduleFormat(format!(
                "Date column '{}' not found (columns: {:?})",
                layout.date_column,
                table.columns()
            ))
        })?;

        let missing: Vec<&str> = layout
            .slot_columns
            .iter()
            .filter(|slot| table.column_index(slot).is_none())
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            return Err(Error::ScheduleFormat(format!(
                "Time slot columns {:?} not found (columns: {:?})",
                missing,
                table.columns()
            )));
        }

        let slot_indices: Vec<usize> = layout
            .slot_columns
            .iter()
            .filter_map(|slot| table.column_index(slot))
            .collect();

        let (columns, raw_rows) = table.into_parts();

        let rows = raw_rows
            .into_iter()
            .enumerate()
            .map(|(n, cells)| {
                let text = &cells[date_index];
                let date = parse_exam_date(text).ok_or_else(|| {
                    Error::ScheduleFormat(format!(
                        "Unparseable date '{}' in row {}",
                        text,
                        n + layout.header_row + 1
                    ))
                })?;

                let cells = cells
                    .into_iter()
                    .enumerate()
                    .map(|(i, value)| {
                        if i == date_index {
                            Cell::Date(date)
                        } else {
                            Cell::Text(value)
                        }
                    })
                    .collect();

                Ok(ScheduleRow { date, cells })
            })
            .collect::<Result<Vec<_>>>()?;

        let subjects = canonical_subjects(&rows, &slot_indices);
        debug!(
            "Schedule built: {} rows, {} columns, {} subjects",
            rows.len(),
            columns.len(),
            subjects.len()
        );

        Ok(Self {
            columns,
            rows,
            slot_indices,
            subjects,
        })
    }

    /// Column names in table order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[ScheduleRow] {
        &self.rows
    }

    /// Canonical subject list used for matching
    ///
    /// Each slot column's distinct values in first-occurrence order, the
    /// slot columns concatenated. A subject offered in two slots appears twice.
    pub fn subjects(&self) -> &[String] {
        &self.subjects
    }

    /// Every exam sitting in the table, row by row and slot by slot
    pub fn sessions(&self) -> Vec<ExamSession> {
        self.rows
            .iter()
            .flat_map(|row| {
                self.slot_indices.iter().filter_map(move |&i| {
                    row.cells[i].as_text().map(|subject| ExamSession {
                        date: row.date,
                        day_name: row.day_name(),
                        time_slot: self.columns[i].clone(),
                        subject: subject.to_string(),
                    })
                })
            })
            .collect()
    }
}

fn canonical_subjects(rows: &[ScheduleRow], slot_indices: &[usize]) -> Vec<String> {
    let mut subjects = Vec::new();

    for &i in slot_indices {
        let mut seen = HashSet::new();
        for row in rows {
            if let Some(subject) = row.cells[i].as_text() {
                if seen.insert(subject) {
                    subjects.push(subject.to_string());
                }
            }
        }
    }

    subjects
}

/// English weekday name, e.g. "Friday"
pub fn day_name(date: NaiveDate) -> String {
    date.format("%A").to_string()
}

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d-%m-%Y",
    "%d/%m/%Y",
    "%d.%m.%Y",
    "%d-%b-%Y",
    "%d-%b-%y",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Spreadsheet day numbers count from this date
const SPREADSHEET_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Parse a date cell from the schedule sheet
///
/// Accepts ISO dates (optionally with a time), day-first numeric dates,
/// written-out month names, a leading weekday name ("Friday, 19-01-2024"),
/// and spreadsheet day serials ("45310").
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use examsched_common::schedule::parse_exam_date;
///
/// let friday = NaiveDate::from_ymd_opt(2024, 1, 19);
/// assert_eq!(parse_exam_date("2024-01-19"), friday);
/// assert_eq!(parse_exam_date("Friday, 19-01-2024"), friday);
/// assert_eq!(parse_exam_date("19/01/2024"), friday);
/// assert_eq!(parse_exam_date("not a date"), None);
/// ```
pub fn parse_exam_date(text: &str) -> Option<NaiveDate> {
    let text = strip_weekday(text.trim());

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            return Some(date);
        }
    }

    parse_serial(text)
}

fn strip_weekday(text: &str) -> &str {
    let end = text
        .find(|c: char| c == ',' || c.is_whitespace())
        .unwrap_or(text.len());

    if end < text.len() && text[..end].parse::<Weekday>().is_ok() {
        text[end..].trim_start_matches(|c: char| c == ',' || c.is_whitespace())
    } else {
        text
    }
}

fn parse_serial(text: &str) -> Option<NaiveDate> {
    let days: u64 = text.split('.').next()?.parse().ok()?;
    // Serials below 1 or past year 9999 are not dates
    if !(1..=2_958_465).contains(&days) {
        return None;
    }

    let (y, m, d) = SPREADSHEET_EPOCH;
    let epoch = NaiveDate::from_ymd_opt(y, m, d)?;
    let date = epoch.checked_add_days(Days::new(days))?;
    (date.year() > 1900).then_some(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_sheet() -> RawTable {
        RawTable::from_strings(vec![
            vec!["Final Exams", "", "", "", "", ""],
            vec!["", "", "", "", "", ""],
            vec!["Fall Term", "", "", "", "", ""],
            vec!["FSC", "", "", "", "", ""],
            vec![
                "Days & Date",
                "9:00 to 12:00 PM",
                "1:00 to 4:00 PM",
                "5:20 to 8:20 PM",
                "Remarks",
                "Venue",
            ],
            vec!["2024-01-15", "Calculus", "Physics", "Chemistry", "", "Hall A"],
            vec!["", "Biology", "Statistics", "Calculus", "", "Hall B"],
            vec!["2024-01-19", "Economics", "Physics", "Biology", "late", "Hall A"],
            vec!["Notes: bring ID cards", "x", "x", "x", "x", "x"],
        ])
    }

    fn layout(max_rows: usize) -> ScheduleLayout {
        ScheduleLayout {
            max_rows,
            ..ScheduleLayout::default()
        }
    }

    #[test]
    fn test_build_promotes_fills_and_drops() {
        let schedule = Schedule::build(sample_sheet(), &layout(3)).unwrap();

        // Remarks starts blank, so it is dropped even though later rows fill it
        assert_eq!(
            schedule.columns(),
            &[DATE_COLUMN, MORNING_SLOT, AFTERNOON_SLOT, EVENING_SLOT, "Venue"]
        );
        assert_eq!(schedule.rows().len(), 3);
        // Merged date cell repaired by forward fill
        assert_eq!(schedule.rows()[1].date, ymd(2024, 1, 15));
        assert_eq!(schedule.rows()[2].date, ymd(2024, 1, 19));
        assert_eq!(schedule.rows()[0].cells[0], Cell::Date(ymd(2024, 1, 15)));
    }

    #[test]
    fn test_default_layout_header_below_sheet_title() {
        // Sheet title row, three banner rows, then the real header
        let raw = RawTable::from_strings(vec![
            vec!["Final Exams Schedule Fall 2023", "", "", ""],
            vec!["", "", "", ""],
            vec!["Ver-Final", "", "", ""],
            vec!["FSC Final", "", "", ""],
            vec![DATE_COLUMN, MORNING_SLOT, AFTERNOON_SLOT, EVENING_SLOT],
            vec!["2024-01-15", "Calculus", "Physics", "Chemistry"],
            vec!["2024-01-19", "Economics", "Statistics", "Biology"],
        ]);

        let schedule = Schedule::build(raw, &ScheduleLayout::default()).unwrap();
        assert_eq!(
            schedule.columns(),
            &[DATE_COLUMN, MORNING_SLOT, AFTERNOON_SLOT, EVENING_SLOT]
        );
        assert_eq!(schedule.rows().len(), 2);
        assert_eq!(schedule.rows()[0].date, ymd(2024, 1, 15));
    }

    #[test]
    fn test_default_layout_rejects_header_one_row_up() {
        let raw = RawTable::from_strings(vec![
            vec!["Final Exams", "", ""],
            vec!["", "", ""],
            vec!["FSC Final", "", ""],
            vec![DATE_COLUMN, MORNING_SLOT, AFTERNOON_SLOT],
            vec!["2024-01-15", "Calculus", "Physics"],
        ]);

        let err = Schedule::build(raw, &ScheduleLayout::default()).unwrap_err();
        assert!(matches!(err, Error::ScheduleFormat(msg) if msg.contains(DATE_COLUMN)));
    }

    #[test]
    fn test_truncation_removes_trailing_notes() {
        // Without truncation the notes row reaches date parsing and fails
        let err = Schedule::build(sample_sheet(), &layout(4)).unwrap_err();
        assert!(matches!(err, Error::ScheduleFormat(msg) if msg.contains("Unparseable date")));
    }

    #[test]
    fn test_subjects_per_slot_concatenated_with_repeats() {
        let schedule = Schedule::build(sample_sheet(), &layout(3)).unwrap();
        assert_eq!(
            schedule.subjects(),
            &[
                "Calculus", "Biology", "Economics", // morning
                "Physics", "Statistics", // afternoon (Physics once)
                "Chemistry", "Calculus", "Biology", // evening
            ]
        );
    }

    #[test]
    fn test_missing_slot_column_is_format_error() {
        let raw = RawTable::from_strings(vec![
            vec!["Days & Date", "9:00 to 12:00 PM", "1:00 to 4:00 PM"],
            vec!["2024-01-15", "Calculus", "Physics"],
        ]);
        let layout = ScheduleLayout {
            header_row: 0,
            ..ScheduleLayout::default()
        };
        let err = Schedule::build(raw, &layout).unwrap_err();
        assert!(matches!(err, Error::ScheduleFormat(msg) if msg.contains("5:20 to 8:20 PM")));
    }

    #[test]
    fn test_slot_column_dropped_as_incomplete_is_format_error() {
        let raw = RawTable::from_strings(vec![
            vec!["Days & Date", "9:00 to 12:00 PM"],
            vec!["2024-01-15", ""],
            vec!["2024-01-16", "Physics"],
        ]);
        let layout = ScheduleLayout {
            header_row: 0,
            slot_columns: vec![MORNING_SLOT.to_string()],
            ..ScheduleLayout::default()
        };
        assert!(matches!(
            Schedule::build(raw, &layout),
            Err(Error::ScheduleFormat(_))
        ));
    }

    #[test]
    fn test_missing_date_column_is_format_error() {
        let raw = RawTable::from_strings(vec![
            vec!["Date", "9:00 to 12:00 PM"],
            vec!["2024-01-15", "X"],
        ]);
        let layout = ScheduleLayout {
            header_row: 0,
            slot_columns: vec![MORNING_SLOT.to_string()],
            ..ScheduleLayout::default()
        };
        let err = Schedule::build(raw, &layout).unwrap_err();
        assert!(matches!(err, Error::ScheduleFormat(msg) if msg.contains("Days & Date")));
    }

    #[test]
    fn test_zero_max_rows_rejected() {
        let err = Schedule::build(sample_sheet(), &layout(0)).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_sessions_one_per_slot() {
        let schedule = Schedule::build(sample_sheet(), &layout(3)).unwrap();
        let sessions = schedule.sessions();
        assert_eq!(sessions.len(), 9);

        let friday_afternoon = &sessions[7];
        assert_eq!(friday_afternoon.date, ymd(2024, 1, 19));
        assert_eq!(friday_afternoon.day_name, "Friday");
        assert_eq!(friday_afternoon.time_slot, AFTERNOON_SLOT);
        assert_eq!(friday_afternoon.subject, "Physics");
    }

    #[test]
    fn test_parse_exam_date_formats() {
        let expected = Some(ymd(2023, 12, 18));
        assert_eq!(parse_exam_date("2023-12-18"), expected);
        assert_eq!(parse_exam_date("2023-12-18 00:00:00"), expected);
        assert_eq!(parse_exam_date("18-12-2023"), expected);
        assert_eq!(parse_exam_date("18.12.2023"), expected);
        assert_eq!(parse_exam_date("18-Dec-2023"), expected);
        assert_eq!(parse_exam_date("December 18, 2023"), expected);
        assert_eq!(parse_exam_date("Monday, December 18, 2023"), expected);
        assert_eq!(parse_exam_date("Monday 18-12-2023"), expected);
        assert_eq!(parse_exam_date("  18/12/2023 "), expected);
    }

    #[test]
    fn test_parse_exam_date_ambiguous_numeric_is_day_first() {
        assert_eq!(parse_exam_date("01/02/2024"), Some(ymd(2024, 2, 1)));
        assert_eq!(parse_exam_date("01-02-2024"), Some(ymd(2024, 2, 1)));
        // Month-first only reads when day-first cannot
        assert_eq!(parse_exam_date("02/13/2024"), None);
    }

    #[test]
    fn test_parse_exam_date_serial() {
        // 45278 is 2023-12-18 in spreadsheet day numbering
        assert_eq!(parse_exam_date("45278"), Some(ymd(2023, 12, 18)));
        assert_eq!(parse_exam_date("0"), None);
    }

    #[test]
    fn test_parse_exam_date_rejects_garbage() {
        assert_eq!(parse_exam_date(""), None);
        assert_eq!(parse_exam_date("Friday"), None);
        assert_eq!(parse_exam_date("Notes: bring ID cards"), None);
    }

    #[test]
    fn test_day_name() {
        assert_eq!(day_name(ymd(2024, 1, 19)), "Friday");
        assert_eq!(day_name(ymd(2024, 1, 15)), "Monday");
    }
}
