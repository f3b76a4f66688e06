use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use checklist_core::ChecklistError;
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChecklistEngineError>;

/// Message shown for any storage failure. Details only go to the log.
pub const STORAGE_ERROR_MESSAGE: &str =
    "The checklist could not be saved or loaded. Please try again later.";

#[derive(Error, Debug)]
pub enum ChecklistEngineError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("{0}")]
    Validation(String),

    #[error("Session token missing or invalid: {0}")]
    Unauthorized(String),

    #[error("Checklist item not found: {0}")]
    ItemNotFound(String),

    #[error("Unsupported export format: {0}")]
    UnsupportedExport(String),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<ChecklistError> for ChecklistEngineError {
    fn from(err: ChecklistError) -> Self {
        match err {
            ChecklistError::MissingSelection
            | ChecklistError::InvalidInput(_)
            | ChecklistError::TooLong { .. }
            | ChecklistError::ForbiddenCharacter(_)
            | ChecklistError::UnknownStatus(_) => ChecklistEngineError::Validation(err.to_string()),
            ChecklistError::Csv(_) => ChecklistEngineError::Export(err.to_string()),
            ChecklistError::InvalidCatalog(_)
            | ChecklistError::CatalogParse(_)
            | ChecklistError::Io(_) => ChecklistEngineError::Internal(err.to_string()),
        }
    }
}

impl ResponseError for ChecklistEngineError {
    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();

        HttpResponse::build(status_code).json(json!({
            "error": {
                "code": status_code.as_u16(),
                "message": self.public_message(),
                "type": self.error_type()
            }
        }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ChecklistEngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ChecklistEngineError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ChecklistEngineError::Validation(_) => StatusCode::BAD_REQUEST,
            ChecklistEngineError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ChecklistEngineError::ItemNotFound(_) => StatusCode::NOT_FOUND,
            ChecklistEngineError::UnsupportedExport(_) => StatusCode::BAD_REQUEST,
            ChecklistEngineError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ChecklistEngineError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ChecklistEngineError {
    fn error_type(&self) -> &str {
        match self {
            ChecklistEngineError::Database(_) => "storage_error",
            ChecklistEngineError::Storage(_) => "storage_error",
            ChecklistEngineError::Validation(_) => "validation_error",
            ChecklistEngineError::Unauthorized(_) => "unauthorized",
            ChecklistEngineError::ItemNotFound(_) => "not_found",
            ChecklistEngineError::UnsupportedExport(_) => "unsupported_export",
            ChecklistEngineError::Export(_) => "export_error",
            ChecklistEngineError::Internal(_) => "internal_error",
        }
    }

    /// Text safe to show the user.
    pub fn public_message(&self) -> String {
        match self {
            ChecklistEngineError::Database(_) | ChecklistEngineError::Storage(_) => {
                STORAGE_ERROR_MESSAGE.to_string()
            }
            ChecklistEngineError::Internal(_) | ChecklistEngineError::Export(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            ChecklistEngineError::Database(_) | ChecklistEngineError::Storage(_)
        )
    }
}
