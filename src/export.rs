use crate::entry::{DATE_FORMAT, TimesheetEntry};
use crate::error::ExportError;
use crate::interaction::Confirm;
use crate::persistence::EntryStore;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

pub const CSV_HEADER: [&str; 7] = [
    "Day",
    "Date",
    "Task",
    "Description",
    "Category",
    "Effort",
    "Hours",
];

/// How the suggested export filename is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportNaming {
    /// `timesheet_<first date>_to_<last date>.csv`
    DateRange,
    /// `timesheet_export_<today>.csv`
    SingleDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    pub path: PathBuf,
    pub rows: usize,
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Renders entries as CSV in input order.
///
/// Only `Task` and `Description` are quoted. The remaining columns are written
/// as-is, so a comma inside a category would shift that row's columns.
pub fn to_csv(entries: &[TimesheetEntry]) -> Result<String, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Never)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER)?;
    for entry in entries {
        let date = entry.date.format(DATE_FORMAT).to_string();
        let day = entry.weekday_name();
        let task = quote(&entry.task);
        let description = quote(&entry.description);
        writer.write_record([
            day.as_str(),
            date.as_str(),
            task.as_str(),
            description.as_str(),
            entry.category.as_str(),
            entry.effort_type.label(),
            entry.hours.as_str(),
        ])?;
    }
    writer.flush()?;
    let bytes = writer.into_inner().map_err(|err| ExportError::Io(err.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|err| ExportError::Io(io::Error::new(io::ErrorKind::InvalidData, err)))
}

pub fn export_filename(
    naming: ExportNaming,
    entries: &[TimesheetEntry],
    today: NaiveDate,
) -> String {
    let fmt = |d: NaiveDate| d.format(DATE_FORMAT).to_string();
    match naming {
        ExportNaming::DateRange => {
            let start = entries.iter().map(|e| e.date).min().unwrap_or(today);
            let end = entries.iter().map(|e| e.date).max().unwrap_or(today);
            format!("timesheet_{}_to_{}.csv", fmt(start), fmt(end))
        }
        ExportNaming::SingleDate => format!("timesheet_export_{}.csv", fmt(today)),
    }
}

/// Writes every stored entry to `dir` as CSV and then empties the store.
///
/// Returns `Ok(None)` without touching anything when the confirmation is
/// declined. If the file cannot be written the store is left intact.
pub fn export_and_reset<S: EntryStore + ?Sized>(
    store: &S,
    confirm: &mut dyn Confirm,
    dir: &Path,
    naming: ExportNaming,
    today: NaiveDate,
) -> Result<Option<ExportReport>, ExportError> {
    let entries = store.load();
    let prompt = format!(
        "Export {} entries to CSV and clear the timesheet?",
        entries.len()
    );
    if !confirm.confirm(&prompt) {
        return Ok(None);
    }

    let csv = to_csv(&entries)?;
    fs::create_dir_all(dir)?;
    let path = dir.join(export_filename(naming, &entries, today));
    fs::write(&path, csv)?;
    info!(path = %path.display(), rows = entries.len(), "timesheet exported");

    store.clear_all()?;
    info!("timesheet cleared after export");

    Ok(Some(ExportReport {
        path,
        rows: entries.len(),
    }))
}
