use checklist_core::{Catalog, ChecklistItem, Choice, Control};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ===== Requests =====

/// Generate form. Fields are optional so a missing value yields the
/// checklist validation message instead of a form decoding error.
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct GenerateChecklistRequest {
    pub industry: Option<String>,
    pub location: Option<String>,
}

/// Status/notes update form
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct UpdateItemRequest {
    pub control_id: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ChecklistQuery {
    pub export: Option<String>,
}

// ===== Responses =====

#[derive(Debug, Serialize, Deserialize)]
pub struct ChecklistResponse {
    pub user_id: String,
    pub total_items: usize,
    pub items: Vec<ChecklistItem>,
}

impl ChecklistResponse {
    pub fn new(user_id: String, items: Vec<ChecklistItem>) -> Self {
        ChecklistResponse {
            user_id,
            total_items: items.len(),
            items,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateChecklistResponse {
    pub industry: String,
    pub location: String,
    pub matched_controls: usize,
    pub inserted_items: u64,
    pub checklist: ChecklistResponse,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub header: String,
    pub issued_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct StandardInfo {
    pub name: String,
    pub controls: Vec<Control>,
}

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub standards: Vec<StandardInfo>,
    pub industries: Vec<Choice>,
    pub locations: Vec<Choice>,
    pub statuses: Vec<String>,
    pub notes_max_length: usize,
}

impl CatalogResponse {
    pub fn from_catalog(catalog: &Catalog, notes_max_length: usize) -> Self {
        let standards = catalog
            .standards()
            .into_iter()
            .map(|name| StandardInfo {
                name: name.to_string(),
                controls: catalog
                    .controls()
                    .iter()
                    .filter(|c| c.standard == name)
                    .cloned()
                    .collect(),
            })
            .collect();

        CatalogResponse {
            standards,
            industries: catalog.industries().to_vec(),
            locations: catalog.locations().to_vec(),
            statuses: checklist_core::ItemStatus::ALL
                .iter()
                .map(|s| s.to_string())
                .collect(),
            notes_max_length,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub storage: String,
    pub timestamp: DateTime<Utc>,
}
