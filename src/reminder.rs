use chrono::{Datelike, NaiveDate, Weekday};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reminder {
    ReviewLastWeek,
    SubmitTimesheet,
}

impl Reminder {
    pub fn message(&self) -> &'static str {
        match self {
            Reminder::ReviewLastWeek => {
                "It's Monday: check last week's entries are complete before they are exported."
            }
            Reminder::SubmitTimesheet => {
                "It's Sunday: export and submit this week's timesheet."
            }
        }
    }
}

pub fn reminder_for(date: NaiveDate) -> Option<Reminder> {
    match date.weekday() {
        Weekday::Mon => Some(Reminder::ReviewLastWeek),
        Weekday::Sun => Some(Reminder::SubmitTimesheet),
        _ => None,
    }
}
