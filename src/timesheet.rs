use crate::category::{CategoryTable, EffortType};
use crate::editor;
use crate::entry::{EntryInput, TimesheetEntry};
use crate::error::{TimesheetError, TimesheetResult};
use crate::export::{self, ExportReport};
use crate::grouping::{self, DayGroup, OVERTIME_THRESHOLD_HOURS};
use crate::interaction::{Clipboard, Confirm};
use crate::persistence::{KeyValueStore, TimesheetRepository};
use crate::profile::Profile;
use crate::reminder::{self, Reminder};
use crate::summary::{self, Summary, WeeklySummary};
use crate::triage::{self, ShiftType, TriageShiftEntry};
use chrono::NaiveDate;
use std::path::Path;
use tracing::info;

/// One open timesheet: the store plus the views derived from it.
///
/// Every mutation goes through the store first. The in-memory view is
/// reloaded only after the write succeeded, so a failed operation leaves
/// `entries()` and `shifts()` as they were.
pub struct Timesheet<S> {
    repo: TimesheetRepository<S>,
    profile: Profile,
    categories: CategoryTable,
    overtime_threshold: f64,
    entries: Vec<TimesheetEntry>,
    shifts: Vec<TriageShiftEntry>,
}

impl<S: KeyValueStore> Timesheet<S> {
    pub fn open(store: S, profile: Profile) -> Self {
        let repo = TimesheetRepository::new(store);
        let entries = repo.load_entries();
        let shifts = if profile.has_triage_log() {
            repo.load_triage_shifts()
        } else {
            Vec::new()
        };
        info!(profile = %profile, entries = entries.len(), "timesheet opened");
        Self {
            repo,
            profile,
            categories: profile.category_table(),
            overtime_threshold: OVERTIME_THRESHOLD_HOURS,
            entries,
            shifts,
        }
    }

    pub fn with_overtime_threshold(mut self, hours: f64) -> Self {
        self.overtime_threshold = hours;
        self
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    pub fn categories(&self) -> &CategoryTable {
        &self.categories
    }

    pub fn overtime_threshold(&self) -> f64 {
        self.overtime_threshold
    }

    pub fn entries(&self) -> &[TimesheetEntry] {
        &self.entries
    }

    pub fn shifts(&self) -> &[TriageShiftEntry] {
        &self.shifts
    }

    pub fn repository(&self) -> &TimesheetRepository<S> {
        &self.repo
    }

    pub fn reload(&mut self) {
        self.entries = self.repo.load_entries();
        if self.profile.has_triage_log() {
            self.shifts = self.repo.load_triage_shifts();
        }
    }

    pub fn entry(&self, id: &str) -> Option<&TimesheetEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Full id for a unique id prefix.
    pub fn resolve_entry_id(&self, prefix: &str) -> TimesheetResult<String> {
        resolve_prefix(self.entries.iter().map(|e| e.id.as_str()), prefix)
    }

    pub fn resolve_shift_id(&self, prefix: &str) -> TimesheetResult<String> {
        resolve_prefix(self.shifts.iter().map(|s| s.id.as_str()), prefix)
    }

    pub fn effort_for_category(&self, category: &str) -> EffortType {
        editor::effort_for_category(&self.categories, category)
    }

    pub fn save_entry(
        &mut self,
        input: &EntryInput,
        editing_id: Option<&str>,
    ) -> TimesheetResult<TimesheetEntry> {
        let entry = editor::create_or_update(&self.repo, &self.categories, input, editing_id)?;
        self.entries = self.repo.load_entries();
        Ok(entry)
    }

    /// Changes only the effort type of a stored entry. Fails with
    /// `EffortLocked` unless the profile lets users override it.
    pub fn set_effort(&mut self, id: &str, effort: EffortType) -> TimesheetResult<TimesheetEntry> {
        if !self.categories.allow_effort_override {
            return Err(crate::error::ValidationError::EffortLocked.into());
        }
        let current = self
            .entry(id)
            .ok_or_else(|| TimesheetError::NotFound(id.to_string()))?;
        let input = EntryInput::from_entry(current).with_effort(effort);
        self.save_entry(&input, Some(id))
    }

    /// Deletes after confirmation. `Ok(false)` when declined.
    pub fn delete_entry(&mut self, id: &str, confirm: &mut dyn Confirm) -> TimesheetResult<bool> {
        let Some(entry) = self.entry(id) else {
            return Err(TimesheetError::NotFound(id.to_string()));
        };
        let prompt = format!("Delete '{}' on {}?", entry.task, entry.date);
        if !confirm.confirm(&prompt) {
            return Ok(false);
        }
        let deleted = editor::delete_entry(&self.repo, id)?;
        self.entries = self.repo.load_entries();
        Ok(deleted)
    }

    pub fn summary(&self) -> Summary {
        summary::summarize(&self.entries)
    }

    pub fn weekly_summary(&self, any_day: NaiveDate) -> WeeklySummary {
        summary::weekly_summary(&self.entries, any_day)
    }

    pub fn day_groups(&self) -> Vec<DayGroup> {
        grouping::group_by_date(&self.entries)
    }

    pub fn overtime_days(&self) -> Vec<DayGroup> {
        self.day_groups()
            .into_iter()
            .filter(|group| group.is_overtime(self.overtime_threshold))
            .collect()
    }

    pub fn copy_summary(&self, clipboard: &mut dyn Clipboard) -> TimesheetResult<String> {
        let text = self.summary().to_clipboard_text();
        clipboard
            .set_text(&text)
            .map_err(TimesheetError::Clipboard)?;
        Ok(text)
    }

    pub fn export_and_reset(
        &mut self,
        confirm: &mut dyn Confirm,
        dir: &Path,
        today: NaiveDate,
    ) -> TimesheetResult<Option<ExportReport>> {
        let report = export::export_and_reset(
            &self.repo,
            confirm,
            dir,
            self.profile.export_naming(),
            today,
        )?;
        if report.is_some() {
            self.entries = self.repo.load_entries();
        }
        Ok(report)
    }

    pub fn reminder(&self, today: NaiveDate) -> Option<Reminder> {
        if self.profile.shows_reminder() {
            reminder::reminder_for(today)
        } else {
            None
        }
    }

    fn require_triage(&self) -> TimesheetResult<()> {
        if self.profile.has_triage_log() {
            Ok(())
        } else {
            Err(TimesheetError::FeatureDisabled("triage log"))
        }
    }

    pub fn log_shift(
        &mut self,
        date: NaiveDate,
        shift_type: ShiftType,
    ) -> TimesheetResult<TriageShiftEntry> {
        self.require_triage()?;
        let shift = triage::log_shift(&self.repo, date, shift_type)?;
        self.shifts = self.repo.load_triage_shifts();
        Ok(shift)
    }

    pub fn delete_shift(&mut self, id: &str) -> TimesheetResult<bool> {
        self.require_triage()?;
        let deleted = triage::delete_shift(&self.repo, id)?;
        self.shifts = self.repo.load_triage_shifts();
        Ok(deleted)
    }

    pub fn clear_shifts(&mut self, confirm: &mut dyn Confirm) -> TimesheetResult<bool> {
        self.require_triage()?;
        let cleared = triage::clear_shifts(&self.repo, confirm)?;
        if cleared {
            self.shifts.clear();
        }
        Ok(cleared)
    }
}

fn resolve_prefix<'a>(ids: impl Iterator<Item = &'a str>, prefix: &str) -> TimesheetResult<String> {
    let prefix = prefix.trim();
    if prefix.is_empty() {
        return Err(TimesheetError::NotFound(String::new()));
    }
    let mut matches = ids.filter(|id| id.starts_with(prefix));
    match (matches.next(), matches.next()) {
        (Some(id), None) => Ok(id.to_string()),
        (Some(_), Some(_)) => Err(TimesheetError::AmbiguousId(prefix.to_string())),
        (None, _) => Err(TimesheetError::NotFound(prefix.to_string())),
    }
}
