use crate::category::EffortType;
use crate::entry::{TimesheetEntry, format_hours};
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total: f64,
    pub billable_total: f64,
    pub non_billable_total: f64,
    pub billable_by_category: BTreeMap<String, f64>,
    pub non_billable_by_category: BTreeMap<String, f64>,
}

impl Summary {
    pub fn by_category(&self, effort: EffortType) -> &BTreeMap<String, f64> {
        match effort {
            EffortType::Billable => &self.billable_by_category,
            EffortType::NonBillable => &self.non_billable_by_category,
        }
    }

    /// Plain-text rendering for the clipboard.
    pub fn to_clipboard_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Billable: {}h\n", format_hours(self.billable_total)));
        for (category, hours) in &self.billable_by_category {
            out.push_str(&format!("  {category}: {}h\n", format_hours(*hours)));
        }
        out.push_str(&format!(
            "Non-billable: {}h\n",
            format_hours(self.non_billable_total)
        ));
        for (category, hours) in &self.non_billable_by_category {
            out.push_str(&format!("  {category}: {}h\n", format_hours(*hours)));
        }
        out.push_str(&format!("Total: {}h\n", format_hours(self.total)));
        out
    }
}

/// Single pass over `entries`. Hours that do not parse count as zero.
pub fn summarize(entries: &[TimesheetEntry]) -> Summary {
    let mut summary = Summary::default();
    for entry in entries {
        let hours = entry.hours_value();
        summary.total += hours;
        let (bucket_total, bucket) = match entry.effort_type {
            EffortType::Billable => (
                &mut summary.billable_total,
                &mut summary.billable_by_category,
            ),
            EffortType::NonBillable => (
                &mut summary.non_billable_total,
                &mut summary.non_billable_by_category,
            ),
        };
        *bucket_total += hours;
        *bucket.entry(entry.category.clone()).or_insert(0.0) += hours;
    }
    summary
}

/// Monday and Sunday of the week containing `day`.
pub fn week_bounds(day: NaiveDate) -> (NaiveDate, NaiveDate) {
    let offset = i64::from(day.weekday().num_days_from_monday());
    let start = day - Duration::days(offset);
    (start, start + Duration::days(6))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklySummary {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub entry_count: usize,
    pub summary: Summary,
}

pub fn weekly_summary(entries: &[TimesheetEntry], any_day: NaiveDate) -> WeeklySummary {
    let (week_start, week_end) = week_bounds(any_day);
    let in_week: Vec<TimesheetEntry> = entries
        .iter()
        .filter(|entry| entry.date >= week_start && entry.date <= week_end)
        .cloned()
        .collect();
    WeeklySummary {
        week_start,
        week_end,
        entry_count: in_week.len(),
        summary: summarize(&in_week),
    }
}
