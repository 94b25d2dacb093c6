use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Billing classification of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EffortType {
    Billable,
    NonBillable,
}

impl EffortType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EffortType::Billable => "billable",
            EffortType::NonBillable => "non-billable",
        }
    }

    /// Display label used in CSV exports and summaries.
    pub fn label(&self) -> &'static str {
        match self {
            EffortType::Billable => "Billable",
            EffortType::NonBillable => "Non-Billable",
        }
    }

    /// Accepts the current spelling and the older capitalised/compact ones
    /// (`Billable`, `Non-Billable`, `nonbillable`, `non_billable`).
    pub fn parse_lenient(input: &str) -> Option<Self> {
        let normalized: String = input
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "billable" => Some(EffortType::Billable),
            "nonbillable" => Some(EffortType::NonBillable),
            _ => None,
        }
    }
}

impl fmt::Display for EffortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for EffortType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_lenient(s).ok_or_else(|| format!("unknown effort type '{s}'"))
    }
}

impl Serialize for EffortType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EffortType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        // Anything unrecognised falls in the non-billable bucket, same as the summary branch.
        Ok(Self::parse_lenient(&raw).unwrap_or(EffortType::NonBillable))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub name: String,
    pub effort: EffortType,
}

impl CategoryRule {
    pub fn new(name: impl Into<String>, effort: EffortType) -> Self {
        Self {
            name: name.into(),
            effort,
        }
    }
}

/// Versioned lookup from category to effort type.
///
/// Lookups ignore ASCII case. A category that is not in the table is
/// classified as non-billable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTable {
    pub version: u32,
    pub rules: Vec<CategoryRule>,
    pub allow_effort_override: bool,
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl CategoryTable {
    pub const CURRENT_VERSION: u32 = 1;

    pub fn standard() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            rules: vec![
                CategoryRule::new("project", EffortType::Billable),
                CategoryRule::new("MS", EffortType::Billable),
                CategoryRule::new("Training", EffortType::NonBillable),
                CategoryRule::new("certification", EffortType::NonBillable),
                CategoryRule::new("Holiday", EffortType::NonBillable),
            ],
            allow_effort_override: false,
        }
    }

    pub fn with_effort_override(mut self, allow: bool) -> Self {
        self.allow_effort_override = allow;
        self
    }

    pub fn effort_for(&self, category: &str) -> EffortType {
        self.find(category)
            .map(|rule| rule.effort)
            .unwrap_or(EffortType::NonBillable)
    }

    pub fn find(&self, category: &str) -> Option<&CategoryRule> {
        let category = category.trim();
        self.rules
            .iter()
            .find(|rule| rule.name.eq_ignore_ascii_case(category))
    }

    /// Canonical spelling for a known category, the trimmed input otherwise.
    pub fn canonical_name(&self, category: &str) -> String {
        self.find(category)
            .map(|rule| rule.name.clone())
            .unwrap_or_else(|| category.trim().to_string())
    }

    pub fn default_category(&self) -> &str {
        self.rules
            .first()
            .map(|rule| rule.name.as_str())
            .unwrap_or("project")
    }
}
