use crate::catalog::Catalog;
use crate::types::{ChecklistItem, Control, Selection, UserId};
use std::sync::Arc;
use tracing::debug;

/// Controls applicable to an (industry, location) pair, in catalog order.
///
/// Pure: the same inputs always produce the same ordered result. Callers are
/// responsible for rejecting empty filters before calling this.
pub fn filter_controls(catalog: &[Control], industry: &str, location: &str) -> Vec<Control> {
    catalog
        .iter()
        .filter(|control| control.applies_to(industry, location))
        .cloned()
        .collect()
}

/// One pending item with empty notes per control, preserving order.
pub fn build_checklist(controls: &[Control], user_id: &UserId) -> Vec<ChecklistItem> {
    controls
        .iter()
        .map(|control| ChecklistItem::pending(control, user_id))
        .collect()
}

/// Generates checklists against a fixed catalog.
#[derive(Debug, Clone)]
pub struct ChecklistEngine {
    catalog: Arc<Catalog>,
}

impl ChecklistEngine {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn matching_controls(&self, selection: &Selection) -> Vec<Control> {
        filter_controls(
            self.catalog.controls(),
            selection.industry(),
            selection.location(),
        )
    }

    pub fn generate(&self, selection: &Selection, user_id: &UserId) -> Vec<ChecklistItem> {
        let controls = self.matching_controls(selection);
        debug!(
            industry = selection.industry(),
            location = selection.location(),
            matched = controls.len(),
            "Filtered catalog controls"
        );
        build_checklist(&controls, user_id)
    }
}

impl Default for ChecklistEngine {
    fn default() -> Self {
        Self::new(Catalog::builtin())
    }
}
