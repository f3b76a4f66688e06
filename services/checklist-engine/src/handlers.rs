use crate::errors::ChecklistEngineError;
use crate::metrics::{gather_metrics, REGISTRY};
use crate::models::{
    CatalogResponse, ChecklistQuery, ChecklistResponse, GenerateChecklistRequest, HealthResponse,
    SessionResponse, UpdateItemRequest,
};
use crate::services::ChecklistService;
use crate::session::{Session, SESSION_HEADER};
use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use checklist_core::export::{content_disposition, CSV_MIME_TYPE};
use chrono::Utc;
use std::sync::Arc;

/// Health check endpoint
pub async fn health_check(service: web::Data<Arc<ChecklistService>>) -> HttpResponse {
    let storage_ok = service.store.health_check().await.is_ok();

    let health = HealthResponse {
        status: if storage_ok { "healthy" } else { "degraded" }.to_string(),
        service: "checklist-engine".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: service.store.backend_name().to_string(),
        timestamp: Utc::now(),
    };

    if storage_ok {
        HttpResponse::Ok().json(health)
    } else {
        HttpResponse::ServiceUnavailable().json(health)
    }
}

/// Prometheus metrics
pub async fn metrics() -> Result<HttpResponse, ChecklistEngineError> {
    let body = gather_metrics(&REGISTRY)
        .map_err(|e| ChecklistEngineError::Internal(e.to_string()))?;
    Ok(HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(body))
}

/// Issue a new session token
pub async fn create_session() -> Result<HttpResponse, ChecklistEngineError> {
    let session_id = Session::issue()?;

    Ok(HttpResponse::Created().json(SessionResponse {
        session_id: session_id.to_string(),
        header: SESSION_HEADER.to_string(),
        issued_at: Utc::now(),
    }))
}

/// Standards, controls and selectable options
pub async fn get_catalog(service: web::Data<Arc<ChecklistService>>) -> HttpResponse {
    HttpResponse::Ok().json(CatalogResponse::from_catalog(
        service.engine.catalog(),
        service.notes_max_length(),
    ))
}

/// Generate and save a checklist for an industry and location
pub async fn generate_checklist(
    service: web::Data<Arc<ChecklistService>>,
    session: Session,
    form: web::Form<GenerateChecklistRequest>,
) -> Result<HttpResponse, ChecklistEngineError> {
    let response = service.generate(session.user_id(), form.into_inner()).await?;
    Ok(HttpResponse::Created().json(response))
}

/// Update status and notes of one item
pub async fn update_item(
    service: web::Data<Arc<ChecklistService>>,
    session: Session,
    form: web::Form<UpdateItemRequest>,
) -> Result<HttpResponse, ChecklistEngineError> {
    let item = service.update_item(session.user_id(), form.into_inner()).await?;
    Ok(HttpResponse::Ok().json(item))
}

/// Saved checklist as JSON, or as a download with `?export=csv`
pub async fn get_checklist(
    service: web::Data<Arc<ChecklistService>>,
    session: Session,
    query: web::Query<ChecklistQuery>,
) -> Result<HttpResponse, ChecklistEngineError> {
    let user_id = session.user_id();

    if let Some(format) = query.export.as_deref() {
        let body = service.export(user_id, format).await?;
        return Ok(HttpResponse::Ok()
            .content_type(CSV_MIME_TYPE)
            .insert_header((header::CONTENT_DISPOSITION, content_disposition()))
            .body(body));
    }

    let items = service.checklist(user_id).await?;
    Ok(HttpResponse::Ok().json(ChecklistResponse::new(user_id.to_string(), items)))
}

/// Form bodies that cannot be decoded get the JSON error envelope
fn form_config() -> web::FormConfig {
    web::FormConfig::default().error_handler(|err, _req: &HttpRequest| {
        ChecklistEngineError::Validation(format!("Invalid form: {}", err)).into()
    })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req: &HttpRequest| {
        ChecklistEngineError::Validation(format!("Invalid query: {}", err)).into()
    })
}

/// Configure routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/metrics", web::get().to(metrics))
        .service(
            web::scope("/api/v1")
                .app_data(form_config())
                .app_data(query_config())
                .route("/sessions", web::post().to(create_session))
                .route("/catalog", web::get().to(get_catalog))
                .route("/checklist", web::post().to(generate_checklist))
                .route("/checklist", web::get().to(get_checklist))
                .route("/checklist/items", web::post().to(update_item)),
        );
}
