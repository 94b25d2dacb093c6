use chrono::{NaiveDate, TimeZone, Utc};
use timesheet_tool::{EffortType, Hours, TimesheetEntry, summarize, weekly_summary};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn entry(
    id: &str,
    date: NaiveDate,
    category: &str,
    effort: EffortType,
    hours: &str,
) -> TimesheetEntry {
    TimesheetEntry {
        id: id.to_string(),
        date,
        task: format!("task {id}"),
        description: String::new(),
        category: category.to_string(),
        effort_type: effort,
        hours: Hours::new(hours),
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
    }
}

fn sample() -> Vec<TimesheetEntry> {
    vec![
        entry("1", d(2024, 1, 2), "project", EffortType::Billable, "4"),
        entry("2", d(2024, 1, 2), "MS", EffortType::Billable, "2.5"),
        entry("3", d(2024, 1, 3), "project", EffortType::Billable, "1.5"),
        entry("4", d(2024, 1, 3), "Training", EffortType::NonBillable, "3"),
        entry("5", d(2024, 1, 9), "Holiday", EffortType::NonBillable, "8"),
    ]
}

#[test]
fn totals_split_by_effort_and_category() {
    let summary = summarize(&sample());
    assert_eq!(summary.total, 19.0);
    assert_eq!(summary.billable_total, 8.0);
    assert_eq!(summary.non_billable_total, 11.0);
    assert_eq!(summary.billable_by_category["project"], 5.5);
    assert_eq!(summary.billable_by_category["MS"], 2.5);
    assert_eq!(summary.non_billable_by_category["Training"], 3.0);
    assert_eq!(summary.non_billable_by_category["Holiday"], 8.0);
    assert!(!summary.billable_by_category.contains_key("Training"));
}

#[test]
fn total_equals_billable_plus_non_billable() {
    let mut entries = sample();
    entries.push(entry("6", d(2024, 1, 4), "MS", EffortType::Billable, "0.1"));
    entries.push(entry("7", d(2024, 1, 4), "certification", EffortType::NonBillable, "0.2"));
    let summary = summarize(&entries);
    assert!((summary.total - (summary.billable_total + summary.non_billable_total)).abs() < 1e-9);
}

#[test]
fn unparseable_hours_contribute_nothing() {
    let entries = vec![
        entry("1", d(2024, 1, 2), "project", EffortType::Billable, "abc"),
        entry("2", d(2024, 1, 2), "Training", EffortType::NonBillable, ""),
        entry("3", d(2024, 1, 2), "project", EffortType::Billable, "2"),
    ];
    let summary = summarize(&entries);
    assert_eq!(summary.total, 2.0);
    assert_eq!(summary.billable_total, 2.0);
    assert_eq!(summary.non_billable_total, 0.0);
    assert_eq!(summary.non_billable_by_category["Training"], 0.0);
}

#[test]
fn legacy_effort_spellings_land_in_the_same_bucket() {
    let json = r#"[
        {"id": "a", "date": "2024-01-02", "task": "x", "category": "project",
         "effortType": "billable", "hours": "2", "createdAt": "2024-01-02T00:00:00Z"},
        {"id": "b", "date": "2024-01-02", "task": "y", "category": "project",
         "effortType": "Billable", "hours": "3", "createdAt": "2024-01-02T00:00:00Z"},
        {"id": "c", "date": "2024-01-02", "task": "z", "category": "Training",
         "effortType": "Non-Billable", "hours": "1", "createdAt": "2024-01-02T00:00:00Z"}
    ]"#;
    let entries: Vec<TimesheetEntry> = serde_json::from_str(json).unwrap();
    let summary = summarize(&entries);
    assert_eq!(summary.billable_total, 5.0);
    assert_eq!(summary.billable_by_category["project"], 5.0);
    assert_eq!(summary.non_billable_total, 1.0);
}

#[test]
fn clipboard_text_lists_categories_under_each_bucket() {
    let text = summarize(&sample()).to_clipboard_text();
    let expected = "Billable: 8h\n  MS: 2.5h\n  project: 5.5h\n\
                    Non-billable: 11h\n  Holiday: 8h\n  Training: 3h\n\
                    Total: 19h\n";
    assert_eq!(text, expected);
}

#[test]
fn weekly_summary_only_counts_entries_in_that_week() {
    let weekly = weekly_summary(&sample(), d(2024, 1, 5));
    assert_eq!(weekly.week_start, d(2024, 1, 1));
    assert_eq!(weekly.week_end, d(2024, 1, 7));
    assert_eq!(weekly.entry_count, 4);
    assert_eq!(weekly.summary.total, 11.0);

    let next = weekly_summary(&sample(), d(2024, 1, 8));
    assert_eq!(next.entry_count, 1);
    assert_eq!(next.summary.non_billable_by_category["Holiday"], 8.0);
}
