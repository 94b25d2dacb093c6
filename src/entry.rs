use crate::category::EffortType;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Hours as they were entered.
///
/// The raw text is kept so that a stored value which does not parse survives a
/// load/save cycle untouched. [`Hours::value`] yields `0.0` for such text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Hours(String);

impl Hours {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into().trim().to_string())
    }

    pub fn from_f64(value: f64) -> Self {
        Self(format_hours(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn parse(&self) -> Option<f64> {
        self.0.parse::<f64>().ok().filter(|v| v.is_finite())
    }

    pub fn value(&self) -> f64 {
        self.parse().unwrap_or(0.0)
    }
}

impl fmt::Display for Hours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl Serialize for Hours {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Hours {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawHours {
            Text(String),
            Number(f64),
        }

        Ok(match RawHours::deserialize(deserializer)? {
            RawHours::Text(text) => Hours::new(text),
            RawHours::Number(value) => Hours::from_f64(value),
        })
    }
}

/// Formats an hour total with at most two decimals and no trailing zeros.
pub fn format_hours(value: f64) -> String {
    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Accepts ids stored as JSON numbers (millisecond timestamps in older data)
/// and keeps them as text.
pub(crate) fn deserialize_id<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Integer(i64),
        Unsigned(u64),
        Float(f64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Integer(value) => value.to_string(),
        RawId::Unsigned(value) => value.to_string(),
        RawId::Float(value) => value.to_string(),
    })
}

/// Missing and `null` both read as the empty string.
fn deserialize_text_or_null<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetEntry {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub date: NaiveDate,
    pub task: String,
    #[serde(default, deserialize_with = "deserialize_text_or_null")]
    pub description: String,
    #[serde(default, deserialize_with = "deserialize_text_or_null")]
    pub category: String,
    #[serde(alias = "effort_type", alias = "effort")]
    pub effort_type: EffortType,
    pub hours: Hours,
    #[serde(alias = "created_at")]
    pub created_at: DateTime<Utc>,
}

impl TimesheetEntry {
    pub fn hours_value(&self) -> f64 {
        self.hours.value()
    }

    pub fn weekday_name(&self) -> String {
        self.date.format("%A").to_string()
    }

    pub fn short_id(&self) -> &str {
        short_id(&self.id)
    }

    /// Persisted entries must carry an id and a task; everything else is
    /// enforced by the type.
    pub fn is_well_formed(&self) -> bool {
        !self.id.trim().is_empty() && !self.task.trim().is_empty()
    }
}

pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Raw form input for the entry editor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryInput {
    pub date: String,
    pub task: String,
    pub description: String,
    pub category: String,
    pub effort_type: Option<EffortType>,
    pub hours: String,
}

impl EntryInput {
    pub fn new(date: impl Into<String>, task: impl Into<String>, hours: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            task: task.into(),
            hours: hours.into(),
            ..Self::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_effort(mut self, effort: EffortType) -> Self {
        self.effort_type = Some(effort);
        self
    }

    /// Pre-fills the form from an existing entry, as the edit button does.
    pub fn from_entry(entry: &TimesheetEntry) -> Self {
        Self {
            date: entry.date.format(DATE_FORMAT).to_string(),
            task: entry.task.clone(),
            description: entry.description.clone(),
            category: entry.category.clone(),
            effort_type: Some(entry.effort_type),
            hours: entry.hours.as_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hours_value_defaults_to_zero_for_text() {
        assert_eq!(Hours::new("7.5").value(), 7.5);
        assert_eq!(Hours::new(" 2 ").value(), 2.0);
        assert_eq!(Hours::new("abc").value(), 0.0);
        assert_eq!(Hours::new("").value(), 0.0);
        assert_eq!(Hours::new("NaN").value(), 0.0);
    }

    #[test]
    fn format_hours_trims_trailing_zeros() {
        assert_eq!(format_hours(8.0), "8");
        assert_eq!(format_hours(7.5), "7.5");
        assert_eq!(format_hours(0.1 + 0.2), "0.3");
        assert_eq!(format_hours(0.0), "0");
    }

    #[test]
    fn entry_deserializes_camel_case_and_numeric_hours() {
        let json = r#"{
            "id": "abc",
            "date": "2024-01-02",
            "task": "Standup",
            "category": "MS",
            "effortType": "Billable",
            "hours": 1.5,
            "createdAt": "2024-01-02T09:00:00Z"
        }"#;
        let entry: TimesheetEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.effort_type, EffortType::Billable);
        assert_eq!(entry.hours.as_str(), "1.5");
        assert_eq!(entry.description, "");
        assert_eq!(entry.weekday_name(), "Tuesday");
    }

    #[test]
    fn numeric_id_and_null_description_are_accepted() {
        let json = r#"{
            "id": 1704186000000,
            "date": "2024-01-02",
            "task": "Standup",
            "description": null,
            "category": "MS",
            "effortType": "billable",
            "hours": "1",
            "createdAt": "2024-01-02T09:00:00Z"
        }"#;
        let entry: TimesheetEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.id, "1704186000000");
        assert_eq!(entry.description, "");
        assert!(entry.is_well_formed());
    }
}
