use crate::error::{ChecklistError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Wildcard accepted in a control's industry or location set.
pub const WILDCARD: &str = "All";

/// Maximum session token length (matches the `user_id` column width).
pub const MAX_USER_ID_LENGTH: usize = 255;

/// A single regulatory requirement belonging to a standard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Control {
    pub id: String,
    pub description: String,
    pub applicable_industries: BTreeSet<String>,
    pub applicable_locations: BTreeSet<String>,
    pub standard: String,
}

impl Control {
    pub fn applies_to_industry(&self, industry: &str) -> bool {
        self.applicable_industries.contains(industry)
            || self.applicable_industries.contains(WILDCARD)
    }

    pub fn applies_to_location(&self, location: &str) -> bool {
        self.applicable_locations.contains(location)
            || self.applicable_locations.contains(WILDCARD)
    }

    pub fn applies_to(&self, industry: &str, location: &str) -> bool {
        self.applies_to_industry(industry) && self.applies_to_location(location)
    }
}

/// Checklist item status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum ItemStatus {
    #[default]
    Pending,
    #[serde(rename = "In Progress", alias = "InProgress")]
    InProgress,
    Completed,
}

impl ItemStatus {
    pub const ALL: [ItemStatus; 3] = [
        ItemStatus::Pending,
        ItemStatus::InProgress,
        ItemStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Pending => "Pending",
            ItemStatus::InProgress => "In Progress",
            ItemStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = ChecklistError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(ItemStatus::Pending),
            "in progress" | "inprogress" | "in_progress" => Ok(ItemStatus::InProgress),
            "completed" => Ok(ItemStatus::Completed),
            _ => Err(ChecklistError::UnknownStatus(s.to_string())),
        }
    }
}

/// Explicit session token identifying whose checklist is being read or written.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ChecklistError::InvalidInput(
                "session token is required".to_string(),
            ));
        }
        if trimmed.len() > MAX_USER_ID_LENGTH {
            return Err(ChecklistError::TooLong {
                max: MAX_USER_ID_LENGTH,
                actual: trimmed.len(),
            });
        }
        if let Some(ch) = trimmed.chars().find(|c| c.is_control()) {
            return Err(ChecklistError::ForbiddenCharacter(ch));
        }
        Ok(UserId(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for UserId {
    type Error = ChecklistError;

    fn try_from(value: String) -> Result<Self> {
        UserId::parse(&value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

/// An (industry, location) pair that has passed validation. Generation only
/// accepts this type, so empty filters never reach the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    industry: String,
    location: String,
}

impl Selection {
    pub fn new(industry: impl Into<String>, location: impl Into<String>) -> Result<Self> {
        let industry = industry.into();
        let location = location.into();
        if industry.trim().is_empty() || location.trim().is_empty() {
            return Err(ChecklistError::MissingSelection);
        }
        Ok(Selection { industry, location })
    }

    pub fn industry(&self) -> &str {
        &self.industry
    }

    pub fn location(&self) -> &str {
        &self.location
    }
}

/// One row of a user's saved checklist.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChecklistItem {
    pub standard: String,
    pub control_id: String,
    pub description: String,
    pub status: ItemStatus,
    pub notes: String,
    pub user_id: UserId,
}

impl ChecklistItem {
    pub fn pending(control: &Control, user_id: &UserId) -> Self {
        ChecklistItem {
            standard: control.standard.clone(),
            control_id: control.id.clone(),
            description: control.description.clone(),
            status: ItemStatus::Pending,
            notes: String::new(),
            user_id: user_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn control(industries: &[&str], locations: &[&str]) -> Control {
        Control {
            id: "T-1".to_string(),
            description: "Test control".to_string(),
            applicable_industries: industries.iter().map(|s| s.to_string()).collect(),
            applicable_locations: locations.iter().map(|s| s.to_string()).collect(),
            standard: "TEST".to_string(),
        }
    }

    #[test]
    fn test_wildcard_matches_any_industry() {
        let c = control(&["All"], &["EU"]);
        assert!(c.applies_to("Retail", "EU"));
        assert!(c.applies_to("Anything", "EU"));
        assert!(!c.applies_to("Retail", "US"));
    }

    #[test]
    fn test_input_all_is_not_a_wildcard() {
        // "All" only widens a control's own sets; a user asking for "All"
        // locations does not match an EU-only control.
        let c = control(&["Finance"], &["EU"]);
        assert!(!c.applies_to("Finance", "All"));
    }

    #[test]
    fn test_status_parse_and_display() {
        assert_eq!("Pending".parse::<ItemStatus>().unwrap(), ItemStatus::Pending);
        assert_eq!("In Progress".parse::<ItemStatus>().unwrap(), ItemStatus::InProgress);
        assert_eq!("in_progress".parse::<ItemStatus>().unwrap(), ItemStatus::InProgress);
        assert_eq!(" completed ".parse::<ItemStatus>().unwrap(), ItemStatus::Completed);
        assert!("Done".parse::<ItemStatus>().is_err());

        for status in ItemStatus::ALL {
            assert_eq!(status.to_string().parse::<ItemStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_status_serde_uses_display_names() {
        let json = serde_json::to_string(&ItemStatus::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");
        let parsed: ItemStatus = serde_json::from_str("\"InProgress\"").unwrap();
        assert_eq!(parsed, ItemStatus::InProgress);
    }

    #[test]
    fn test_user_id_validation() {
        assert_eq!(UserId::parse("  abc  ").unwrap().as_str(), "abc");
        assert!(UserId::parse("   ").is_err());
        assert!(UserId::parse(&"x".repeat(256)).is_err());
        assert!(UserId::parse("ab\u{0}c").is_err());
    }

    #[test]
    fn test_selection_rejects_empty_fields() {
        assert!(matches!(
            Selection::new("", "EU"),
            Err(ChecklistError::MissingSelection)
        ));
        assert!(matches!(
            Selection::new("Tech", "  "),
            Err(ChecklistError::MissingSelection)
        ));
        let selection = Selection::new("Tech", "EU").unwrap();
        assert_eq!(selection.industry(), "Tech");
        assert_eq!(selection.location(), "EU");
    }
}
