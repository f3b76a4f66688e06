use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use checklist_core::{Catalog, ChecklistEngine, InputSanitizer};
use checklist_engine::{
    config::{Config, StorageBackend},
    handlers,
    metrics::{register_metrics, REGISTRY},
    services::ChecklistService,
    storage::{ChecklistStore, Database, InMemoryStore},
};
use dotenv::dotenv;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("checklist_engine=info,checklist_core=info,actix_web=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(true)
        .with_line_number(true)
        .with_target(false)
        .json()
        .init();

    info!("Starting Checklist Engine...");

    let config = Config::from_env().context("Failed to load configuration")?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    info!("Configuration loaded successfully");

    register_metrics(&REGISTRY).context("Failed to register metrics")?;

    // Catalog is fixed for the lifetime of the process
    let catalog = match &config.checklist.catalog_path {
        Some(path) => Arc::new(
            Catalog::from_path(path).with_context(|| format!("Failed to load catalog {}", path))?,
        ),
        None => Catalog::builtin(),
    };
    info!(
        "Catalog ready: {} controls across {} standards",
        catalog.len(),
        catalog.standards().len()
    );

    let store: Arc<dyn ChecklistStore> = match config.storage.backend {
        StorageBackend::Postgres => {
            let db = Database::new(
                &config.database.url,
                config.database.max_connections,
                config.database.acquire_timeout_secs,
            )
            .await
            .context("Failed to connect to database")?;

            db.health_check()
                .await
                .context("Database health check failed")?;

            if config.database.init_schema {
                db.init_schema()
                    .await
                    .context("Failed to initialise checklist schema")?;
            }

            info!("Database connected successfully");
            Arc::new(db)
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage, checklists are lost on restart");
            Arc::new(InMemoryStore::new())
        }
    };

    let service = Arc::new(ChecklistService::new(
        store,
        ChecklistEngine::new(catalog),
        InputSanitizer::with_notes_limit(config.checklist.notes_max_length),
    ));

    info!("Checklist service initialized successfully");

    let server_config = config.server.clone();
    let service_data = web::Data::new(service);

    info!(
        "Starting HTTP server on {}:{}",
        server_config.host, server_config.port
    );

    HttpServer::new(move || {
        App::new()
            .app_data(service_data.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(middleware::Logger::default())
            .wrap(middleware::NormalizePath::trim())
            .configure(handlers::configure_routes)
    })
    .workers(server_config.workers)
    .bind((server_config.host, server_config.port))?
    .run()
    .await?;

    Ok(())
}
