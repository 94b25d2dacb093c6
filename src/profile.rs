use crate::category::CategoryTable;
use crate::export::ExportNaming;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The three flavours of the tool. They share all logic and differ in
/// vocabulary and a handful of extras.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Free effort selection, flat list, single-date export name.
    Classic,
    /// Day grouping with overtime warning.
    #[default]
    Daily,
    /// Triage shift log and weekly reminder banner.
    Triage,
}

impl Profile {
    pub const ALL: [Profile; 3] = [Profile::Classic, Profile::Daily, Profile::Triage];

    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Classic => "classic",
            Profile::Daily => "daily",
            Profile::Triage => "triage",
        }
    }

    pub fn category_table(&self) -> CategoryTable {
        match self {
            Profile::Classic => CategoryTable::standard().with_effort_override(true),
            Profile::Daily | Profile::Triage => CategoryTable::standard(),
        }
    }

    pub fn groups_by_day(&self) -> bool {
        matches!(self, Profile::Daily)
    }

    pub fn has_triage_log(&self) -> bool {
        matches!(self, Profile::Triage)
    }

    pub fn shows_reminder(&self) -> bool {
        matches!(self, Profile::Triage)
    }

    pub fn export_naming(&self) -> ExportNaming {
        match self {
            Profile::Classic => ExportNaming::SingleDate,
            Profile::Daily | Profile::Triage => ExportNaming::DateRange,
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "classic" => Ok(Profile::Classic),
            "daily" => Ok(Profile::Daily),
            "triage" => Ok(Profile::Triage),
            other => Err(format!(
                "unknown profile '{other}' (expected classic, daily or triage)"
            )),
        }
    }
}
