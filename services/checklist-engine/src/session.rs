use crate::errors::ChecklistEngineError;
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use checklist_core::UserId;
use std::future::{ready, Ready};
use uuid::Uuid;

pub const SESSION_HEADER: &str = "X-Session-Id";

/// Session token taken from the `X-Session-Id` header.
#[derive(Debug, Clone)]
pub struct Session(pub UserId);

impl Session {
    /// Fresh random token for a new session.
    pub fn issue() -> Result<UserId, ChecklistEngineError> {
        Ok(UserId::parse(&Uuid::new_v4().to_string())?)
    }

    pub fn user_id(&self) -> &UserId {
        &self.0
    }

    fn from_headers(req: &HttpRequest) -> Result<Self, ChecklistEngineError> {
        let header = req.headers().get(SESSION_HEADER).ok_or_else(|| {
            ChecklistEngineError::Unauthorized(format!("{} header is required", SESSION_HEADER))
        })?;

        let raw = header.to_str().map_err(|_| {
            ChecklistEngineError::Unauthorized(format!("{} must be visible ASCII", SESSION_HEADER))
        })?;

        UserId::parse(raw)
            .map(Session)
            .map_err(|e| ChecklistEngineError::Unauthorized(e.to_string()))
    }
}

impl FromRequest for Session {
    type Error = ChecklistEngineError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Session::from_headers(req))
    }
}
