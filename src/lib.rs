pub mod category;
pub mod config;
pub mod editor;
pub mod entry;
pub mod error;
pub mod export;
pub mod grouping;
pub mod interaction;
pub mod persistence;
pub mod profile;
pub mod reminder;
pub mod summary;
pub mod timesheet;
pub mod triage;

pub use category::{CategoryRule, CategoryTable, EffortType};
pub use config::{ConfigError, StorageBackend, TimesheetConfig};
pub use editor::{create_or_update, delete_entry, effort_for_category};
pub use entry::{EntryInput, Hours, TimesheetEntry};
pub use error::{ExportError, TimesheetError, TimesheetResult, ValidationError};
pub use export::{ExportNaming, ExportReport, export_and_reset, export_filename, to_csv};
pub use grouping::{DayGroup, OVERTIME_THRESHOLD_HOURS, group_by_date};
pub use interaction::{AlwaysConfirm, Clipboard, Confirm, MemoryClipboard, ScriptedConfirm};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteStore;
pub use persistence::{
    EntryStore, JsonFileStore, KeyValueStore, MemoryStore, PersistenceError, ShiftStore,
    TimesheetRepository,
};
pub use profile::Profile;
pub use reminder::{Reminder, reminder_for};
pub use summary::{Summary, WeeklySummary, summarize, week_bounds, weekly_summary};
pub use timesheet::Timesheet;
pub use triage::{ShiftType, TriageShiftEntry};
