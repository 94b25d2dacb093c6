use crate::entry::new_id;
use crate::interaction::Confirm;
use crate::persistence::{PersistenceResult, ShiftStore};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShiftType {
    S1,
    S2,
    S3,
}

impl ShiftType {
    pub const ALL: [ShiftType; 3] = [ShiftType::S1, ShiftType::S2, ShiftType::S3];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShiftType::S1 => "s1",
            ShiftType::S2 => "s2",
            ShiftType::S3 => "s3",
        }
    }
}

impl fmt::Display for ShiftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ShiftType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s1" => Ok(ShiftType::S1),
            "s2" => Ok(ShiftType::S2),
            "s3" => Ok(ShiftType::S3),
            other => Err(format!("unknown shift type '{other}' (expected s1, s2 or s3)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageShiftEntry {
    #[serde(deserialize_with = "crate::entry::deserialize_id")]
    pub id: String,
    pub date: NaiveDate,
    #[serde(alias = "shift_type", alias = "shift")]
    pub shift_type: ShiftType,
    #[serde(alias = "created_at")]
    pub created_at: DateTime<Utc>,
}

impl TriageShiftEntry {
    pub fn new(date: NaiveDate, shift_type: ShiftType) -> Self {
        Self {
            id: new_id(),
            date,
            shift_type,
            created_at: Utc::now(),
        }
    }
}

pub fn log_shift<S: ShiftStore + ?Sized>(
    store: &S,
    date: NaiveDate,
    shift_type: ShiftType,
) -> PersistenceResult<TriageShiftEntry> {
    let mut shifts = store.load_shifts();
    let shift = TriageShiftEntry::new(date, shift_type);
    shifts.push(shift.clone());
    store.replace_all_shifts(&shifts)?;
    Ok(shift)
}

pub fn delete_shift<S: ShiftStore + ?Sized>(store: &S, id: &str) -> PersistenceResult<bool> {
    let shifts = store.load_shifts();
    let before = shifts.len();
    let remaining: Vec<_> = shifts.into_iter().filter(|s| s.id != id).collect();
    if remaining.len() == before {
        return Ok(false);
    }
    store.replace_all_shifts(&remaining)?;
    Ok(true)
}

/// Removes every logged shift once the user confirms. Returns whether anything
/// was cleared.
pub fn clear_shifts<S: ShiftStore + ?Sized>(
    store: &S,
    confirm: &mut dyn Confirm,
) -> PersistenceResult<bool> {
    if !confirm.confirm("Clear all triage shifts?") {
        return Ok(false);
    }
    store.clear_all_shifts()?;
    info!("cleared triage shift log");
    Ok(true)
}

pub fn shift_counts(shifts: &[TriageShiftEntry]) -> BTreeMap<ShiftType, usize> {
    let mut counts: BTreeMap<ShiftType, usize> = ShiftType::ALL.iter().map(|s| (*s, 0)).collect();
    for shift in shifts {
        *counts.entry(shift.shift_type).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_type_parses_case_insensitively() {
        assert_eq!("S2".parse::<ShiftType>().unwrap(), ShiftType::S2);
        assert!("s4".parse::<ShiftType>().is_err());
    }

    #[test]
    fn counts_include_unused_shift_types() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let shifts = vec![
            TriageShiftEntry::new(date, ShiftType::S1),
            TriageShiftEntry::new(date, ShiftType::S1),
            TriageShiftEntry::new(date, ShiftType::S3),
        ];
        let counts = shift_counts(&shifts);
        assert_eq!(counts[&ShiftType::S1], 2);
        assert_eq!(counts[&ShiftType::S2], 0);
        assert_eq!(counts[&ShiftType::S3], 1);
    }
}
