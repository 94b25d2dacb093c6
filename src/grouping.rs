use crate::entry::TimesheetEntry;
use chrono::NaiveDate;
use std::collections::HashMap;

pub const OVERTIME_THRESHOLD_HOURS: f64 = 8.0;

#[derive(Debug, Clone, PartialEq)]
pub struct DayGroup {
    pub date: NaiveDate,
    pub total_hours: f64,
    pub items: Vec<TimesheetEntry>,
}

impl DayGroup {
    /// Strictly above the threshold; a day of exactly eight hours is not overtime.
    pub fn is_overtime(&self, threshold: f64) -> bool {
        self.total_hours > threshold
    }
}

/// Partitions entries by date. Groups appear in the order their date is
/// first seen, items keep their input order within a group.
pub fn group_by_date(entries: &[TimesheetEntry]) -> Vec<DayGroup> {
    let mut groups: Vec<DayGroup> = Vec::new();
    let mut index: HashMap<NaiveDate, usize> = HashMap::new();

    for entry in entries {
        let slot = *index.entry(entry.date).or_insert_with(|| {
            groups.push(DayGroup {
                date: entry.date,
                total_hours: 0.0,
                items: Vec::new(),
            });
            groups.len() - 1
        });
        let group = &mut groups[slot];
        group.total_hours += entry.hours_value();
        group.items.push(entry.clone());
    }

    groups
}
