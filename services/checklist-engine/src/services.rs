use crate::errors::{ChecklistEngineError, Result};
use crate::metrics::{
    CHECKLISTS_GENERATED, CHECKLIST_EXPORTS, CHECKLIST_ITEMS_INSERTED, CHECKLIST_ITEMS_UPDATED,
    STORAGE_ERRORS,
};
use crate::models::{
    ChecklistResponse, GenerateChecklistRequest, GenerateChecklistResponse, UpdateItemRequest,
};
use crate::storage::ChecklistStore;
use checklist_core::export;
use checklist_core::{ChecklistEngine, ChecklistItem, InputSanitizer, UserId};
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct ChecklistService {
    pub store: Arc<dyn ChecklistStore>,
    pub engine: ChecklistEngine,
    sanitizer: InputSanitizer,
}

impl ChecklistService {
    pub fn new(store: Arc<dyn ChecklistStore>, engine: ChecklistEngine, sanitizer: InputSanitizer) -> Self {
        ChecklistService {
            store,
            engine,
            sanitizer,
        }
    }

    /// Validate the selection, generate matching items and save them.
    /// Nothing is written when validation fails.
    pub async fn generate(
        &self,
        user_id: &UserId,
        request: GenerateChecklistRequest,
    ) -> Result<GenerateChecklistResponse> {
        let selection = self
            .sanitizer
            .sanitize_selection(request.industry.as_deref(), request.location.as_deref())?;

        let items = self.engine.generate(&selection, user_id);

        let inserted = self
            .store
            .insert_checklist(&items)
            .await
            .map_err(|e| storage_failure("insert", e))?;

        CHECKLISTS_GENERATED.inc();
        CHECKLIST_ITEMS_INSERTED.inc_by(inserted);

        info!(
            user_id = %user_id,
            industry = selection.industry(),
            location = selection.location(),
            matched = items.len(),
            inserted,
            "Generated checklist"
        );

        let checklist = self.checklist(user_id).await?;

        Ok(GenerateChecklistResponse {
            industry: selection.industry().to_string(),
            location: selection.location().to_string(),
            matched_controls: items.len(),
            inserted_items: inserted,
            checklist: ChecklistResponse::new(user_id.to_string(), checklist),
        })
    }

    pub async fn checklist(&self, user_id: &UserId) -> Result<Vec<ChecklistItem>> {
        self.store
            .select_checklist(user_id)
            .await
            .map_err(|e| storage_failure("select", e))
    }

    /// Overwrite status and notes of one of the user's items.
    pub async fn update_item(
        &self,
        user_id: &UserId,
        request: UpdateItemRequest,
    ) -> Result<ChecklistItem> {
        let update = self.sanitizer.sanitize_update(
            request.control_id.as_deref(),
            request.status.as_deref(),
            request.notes.as_deref(),
        )?;

        let updated = self
            .store
            .update_item(user_id, &update.control_id, update.status, &update.notes)
            .await
            .map_err(|e| storage_failure("update", e))?;

        match updated {
            Some(item) => {
                CHECKLIST_ITEMS_UPDATED.inc();
                info!(
                    user_id = %user_id,
                    control_id = %item.control_id,
                    status = %item.status,
                    "Updated checklist item"
                );
                Ok(item)
            }
            None => {
                warn!(
                    user_id = %user_id,
                    control_id = %update.control_id,
                    "Update for unknown checklist item"
                );
                Err(ChecklistEngineError::ItemNotFound(update.control_id))
            }
        }
    }

    /// Saved checklist rendered in the requested export format.
    pub async fn export(&self, user_id: &UserId, format: &str) -> Result<Vec<u8>> {
        if !format.eq_ignore_ascii_case("csv") {
            return Err(ChecklistEngineError::UnsupportedExport(format.to_string()));
        }

        let items = self.checklist(user_id).await?;
        let bytes = export::to_csv_bytes(&items)?;

        CHECKLIST_EXPORTS.with_label_values(&["csv"]).inc();
        info!(user_id = %user_id, rows = items.len(), "Exported checklist as CSV");

        Ok(bytes)
    }

    pub fn notes_max_length(&self) -> usize {
        self.sanitizer.notes_max_length()
    }
}

fn storage_failure(operation: &str, err: ChecklistEngineError) -> ChecklistEngineError {
    if err.is_storage() {
        STORAGE_ERRORS.with_label_values(&[operation]).inc();
        error!(operation, "Checklist storage failure: {}", err);
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStore;
    use async_trait::async_trait;
    use checklist_core::ItemStatus;

    fn service() -> (ChecklistService, InMemoryStore) {
        let store = InMemoryStore::new();
        let service = ChecklistService::new(
            Arc::new(store.clone()),
            ChecklistEngine::default(),
            InputSanitizer::new(),
        );
        (service, store)
    }

    fn user(id: &str) -> UserId {
        UserId::parse(id).unwrap()
    }

    fn generate_request(industry: &str, location: &str) -> GenerateChecklistRequest {
        GenerateChecklistRequest {
            industry: Some(industry.to_string()),
            location: Some(location.to_string()),
        }
    }

    #[tokio::test]
    async fn test_generate_healthcare_us() {
        let (service, _) = service();
        let response = service
            .generate(&user("s-1"), generate_request("Healthcare", "US"))
            .await
            .unwrap();

        assert_eq!(response.matched_controls, 3);
        assert_eq!(response.inserted_items, 3);
        let ids: Vec<&str> = response
            .checklist
            .items
            .iter()
            .map(|i| i.control_id.as_str())
            .collect();
        assert_eq!(ids, vec!["HIPAA-1", "HIPAA-2", "HIPAA-3"]);
    }

    #[tokio::test]
    async fn test_missing_selection_writes_nothing() {
        let (service, store) = service();
        let err = service
            .generate(
                &user("s-2"),
                GenerateChecklistRequest {
                    industry: Some("Finance".to_string()),
                    location: None,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ChecklistEngineError::Validation(_)));
        assert_eq!(err.to_string(), "Please select both industry and location.");
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_update_is_idempotent() {
        let (service, _) = service();
        let user = user("s-3");
        service
            .generate(&user, generate_request("Finance", "All"))
            .await
            .unwrap();

        let request = || UpdateItemRequest {
            control_id: Some("PCI-1".to_string()),
            status: Some("In Progress".to_string()),
            notes: Some("Firewall rules under review".to_string()),
        };

        let first = service.update_item(&user, request()).await.unwrap();
        let saved_first = service.checklist(&user).await.unwrap();
        let second = service.update_item(&user, request()).await.unwrap();
        let saved_second = service.checklist(&user).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(saved_first, saved_second);
        assert_eq!(first.status, ItemStatus::InProgress);
    }

    #[tokio::test]
    async fn test_update_unknown_item_is_not_found() {
        let (service, _) = service();
        let err = service
            .update_item(
                &user("s-4"),
                UpdateItemRequest {
                    control_id: Some("HIPAA-1".to_string()),
                    status: Some("Completed".to_string()),
                    notes: None,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ChecklistEngineError::ItemNotFound(id) if id == "HIPAA-1"));
    }

    #[tokio::test]
    async fn test_export_csv() {
        let (service, _) = service();
        let user = user("s-5");
        service
            .generate(&user, generate_request("Healthcare", "US"))
            .await
            .unwrap();

        let csv = String::from_utf8(service.export(&user, "csv").await.unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Standard,Control ID,Description,Status,Notes");
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("HIPAA,HIPAA-1,"));

        assert!(matches!(
            service.export(&user, "xlsx").await,
            Err(ChecklistEngineError::UnsupportedExport(_))
        ));
    }

    struct FailingStore;

    #[async_trait]
    impl ChecklistStore for FailingStore {
        async fn insert_checklist(&self, _items: &[ChecklistItem]) -> Result<u64> {
            Err(ChecklistEngineError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn select_checklist(&self, _user_id: &UserId) -> Result<Vec<ChecklistItem>> {
            Err(ChecklistEngineError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn update_item(
            &self,
            _user_id: &UserId,
            _control_id: &str,
            _status: ItemStatus,
            _notes: &str,
        ) -> Result<Option<ChecklistItem>> {
            Err(ChecklistEngineError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn health_check(&self) -> Result<()> {
            Err(ChecklistEngineError::Database(sqlx::Error::PoolTimedOut))
        }

        fn backend_name(&self) -> &'static str {
            "failing"
        }
    }

    #[tokio::test]
    async fn test_storage_failure_is_surfaced_without_retry() {
        let service = ChecklistService::new(
            Arc::new(FailingStore),
            ChecklistEngine::default(),
            InputSanitizer::new(),
        );

        let err = service
            .generate(&user("s-6"), generate_request("Tech", "EU"))
            .await
            .unwrap_err();
        assert!(err.is_storage());
    }
}
