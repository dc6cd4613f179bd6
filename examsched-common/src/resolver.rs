//! Resolver pipeline
//!
//! Maps free-text subject selections onto the schedule and returns the
//! matching exam sittings as display-ready records, ordered by date.
//!
//! Pipeline for one submission:
//! 1. Fuzzy-match every selection against the canonical subject list
//! 2. Keep schedule rows where any text cell equals a matched subject
//! 3. Drop duplicate rows
//! 4. Label each row with the first column (table order) holding a match
//! 5. Emit subject / time / date records, sort by date, format dates
//! 6. Drop duplicate records
//! 7. Apply the slot override (Friday afternoon starts later)

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::matcher::{best_matches, Match};
use crate::schedule::{day_name, Cell, Schedule, ScheduleRow, AFTERNOON_SLOT};
use crate::{Error, Result};

/// Output date format, e.g. "19-01-2024"
pub const RECORD_DATE_FORMAT: &str = "%d-%m-%Y";

/// One exam sitting ready for display
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResolvedRecord {
    #[serde(rename = "Subject")]
    pub subject: String,
    #[serde(rename = "Day_Name")]
    pub day_name: String,
    #[serde(rename = "Days & Date")]
    pub date: String,
    #[serde(rename = "Time")]
    pub time: String,
}

/// How one selection was mapped onto the schedule
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectMatch {
    pub query: String,
    pub subject: String,
    pub ratio: f64,
    /// False when the ratio fell below the resolver's `min_ratio`
    pub used: bool,
}

/// Result of one resolver run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Resolution {
    pub records: Vec<ResolvedRecord>,
    pub matches: Vec<SubjectMatch>,
}

/// Rewrites the time label of one slot on one weekday
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SlotOverride {
    /// English weekday name, e.g. "Friday"
    pub weekday: String,
    /// Time label to replace
    pub from: String,
    /// Replacement label
    pub to: String,
}

impl Default for SlotOverride {
    fn default() -> Self {
        Self {
            weekday: "Friday".to_string(),
            from: AFTERNOON_SLOT.to_string(),
            to: "1:30 to 4:30 PM".to_string(),
        }
    }
}

impl SlotOverride {
    pub fn validate(&self) -> Result<()> {
        self.weekday.parse::<Weekday>().map_err(|_| {
            Error::Config(format!(
                "policy.slot_override.weekday '{}' is not a weekday",
                self.weekday
            ))
        })?;
        Ok(())
    }

    /// Whether `record` falls under this override
    pub fn applies_to(&self, record: &ResolvedRecord) -> bool {
        record.time == self.from && record.day_name == self.weekday
    }
}

/// Stateless resolver; holds only policy
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    slot_override: SlotOverride,
    min_ratio: Option<f64>,
}

impl Resolver {
    pub fn new(slot_override: SlotOverride) -> Self {
        Self {
            slot_override,
            min_ratio: None,
        }
    }

    /// Ignore selections whose best match scores below `min_ratio`
    ///
    /// Off by default: every selection resolves to some subject.
    pub fn with_min_ratio(mut self, min_ratio: Option<f64>) -> Self {
        self.min_ratio = min_ratio;
        self
    }

    /// Resolve user selections against the schedule
    ///
    /// An empty selection list yields an empty resolution.
    ///
    /// # Errors
    /// [`Error::EmptyCandidateSet`] when there are selections but the
    /// schedule lists no subjects.
    pub fn resolve<S: AsRef<str>>(
        &self,
        selections: &[S],
        schedule: &Schedule,
    ) -> Result<Resolution> {
        if selections.is_empty() {
            return Ok(Resolution::default());
        }

        let matches = self.match_selections(selections, schedule.subjects())?;
        let wanted: HashSet<&str> = matches
            .iter()
            .filter(|m| m.used)
            .map(|m| m.subject.as_str())
            .collect();

        let rows = matching_rows(schedule.rows(), &wanted);
        debug!(
            "{} selections matched {} distinct subjects in {} rows",
            selections.len(),
            wanted.len(),
            rows.len()
        );

        let mut dated: Vec<(NaiveDate, String, String)> = rows
            .into_iter()
            .filter_map(|row| {
                let (index, subject) = matching_column(row, &wanted)?;
                Some((row.date, subject.to_string(), schedule.columns()[index].clone()))
            })
            .collect();

        // Stable: rows on the same date keep table order
        dated.sort_by_key(|(date, _, _)| *date);

        let records = dated
            .into_iter()
            .map(|(date, subject, time)| ResolvedRecord {
                subject,
                day_name: day_name(date),
                date: date.format(RECORD_DATE_FORMAT).to_string(),
                time,
            })
            .collect();

        let mut records = dedup(records);
        self.apply_override(&mut records);

        Ok(Resolution {
            records: dedup(records),
            matches,
        })
    }

    fn match_selections<S: AsRef<str>>(
        &self,
        selections: &[S],
        subjects: &[String],
    ) -> Result<Vec<SubjectMatch>> {
        let matches = best_matches(selections, subjects)?;

        Ok(selections
            .iter()
            .zip(matches)
            .map(|(query, m)| {
                let query = query.as_ref();
                debug!("'{}' -> '{}' (ratio {:.3})", query, m.candidate, m.ratio);
                SubjectMatch {
                    query: query.to_string(),
                    subject: m.candidate.to_string(),
                    ratio: m.ratio,
                    used: self.is_confident(query, &m),
                }
            })
            .collect())
    }

    fn is_confident(&self, query: &str, m: &Match<'_>) -> bool {
        match self.min_ratio {
            Some(min) if m.ratio < min => {
                warn!(
                    "Ignoring selection '{}': best match '{}' scored {:.3} (< {:.3})",
                    query, m.candidate, m.ratio, min
                );
                false
            }
            _ => true,
        }
    }

    fn apply_override(&self, records: &mut [ResolvedRecord]) {
        for record in records.iter_mut().filter(|r| self.slot_override.applies_to(r)) {
            record.time = self.slot_override.to.clone();
        }
    }
}

/// Rows with any text cell equal to a wanted subject, duplicates removed
///
/// Any column counts, not only slot columns.
fn matching_rows<'a>(rows: &'a [ScheduleRow], wanted: &HashSet<&str>) -> Vec<&'a ScheduleRow> {
    let mut seen = HashSet::new();
    rows.iter()
        .filter(|row| {
            row.cells
                .iter()
                .any(|c| c.as_text().is_some_and(|t| wanted.contains(t)))
        })
        .filter(|row| seen.insert(*row))
        .collect()
}

/// First column, in table order, whose cell is a wanted subject
///
/// A subject name that also appears as the literal value of an earlier
/// column resolves to that earlier column.
pub fn matching_column<'r>(
    row: &'r ScheduleRow,
    wanted: &HashSet<&str>,
) -> Option<(usize, &'r str)> {
    row.cells.iter().enumerate().find_map(|(i, cell)| match cell {
        Cell::Text(text) if wanted.contains(text.as_str()) => Some((i, text.as_str())),
        _ => None,
    })
}

/// Drop later copies of equal records, keeping order
fn dedup(records: Vec<ResolvedRecord>) -> Vec<ResolvedRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|r| seen.insert(r.clone()))
        .collect()
}
