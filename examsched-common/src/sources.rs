//! Input file loaders
//!
//! Two static inputs feed the resolver: a newline-delimited subject list for
//! the selection form, and the schedule sheet exported as CSV.

use std::io::{self, Read};
use std::path::Path;
use tracing::{debug, warn};

use crate::schedule::{Schedule, ScheduleLayout};
use crate::table::RawTable;
use crate::Result;

/// Read the subject list, one subject per line
///
/// A missing file is not an error: it is logged and yields an empty list so
/// the form still renders. Blank lines are skipped.
pub fn load_subjects(path: &Path) -> Result<Vec<String>> {
    match std::fs::read_to_string(path) {
        Ok(text) => {
            let subjects = parse_subjects(&text);
            debug!("Loaded {} subjects from {}", subjects.len(), path.display());
            Ok(subjects)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!("Subject list not found: {}", path.display());
            Ok(Vec::new())
        }
        Err(e) => Err(e.into()),
    }
}

/// Split subject-list text into lines, dropping blank ones
pub fn parse_subjects(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Read the schedule sheet as a raw grid; no header handling is done here
pub fn read_schedule_table<R: Read>(reader: R) -> Result<RawTable> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }

    Ok(RawTable::from_strings(rows))
}

/// Open the schedule export at `path` and read it as a raw grid
pub fn load_schedule_table(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path)?;
    let table = read_schedule_table(io::BufReader::new(file))?;
    debug!(
        "Read schedule sheet {}: {} rows x {} columns",
        path.display(),
        table.height(),
        table.width()
    );
    Ok(table)
}

/// Load and build the schedule in one step
pub fn load_schedule(path: &Path, layout: &ScheduleLayout) -> Result<Schedule> {
    Schedule::build(load_schedule_table(path)?, layout)
}
