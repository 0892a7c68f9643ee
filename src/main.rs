use anyhow::Result;
use axum::Router;
use axum::http::{Method, header};
use sqlx::sqlite::SqlitePoolOptions;
use std::{fs, io::ErrorKind, path::Path, sync::Arc};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

use crate::services::link_service::LinkService;
use crate::services::object_store::{ObjectStore, S3ObjectStore};

mod config;
mod errors;
mod handlers;
mod models;
mod routes;
mod services;
#[cfg(test)]
mod test_helpers;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config + migrate flag ---
    let (cfg, migrate) = config::AppConfig::from_env_and_args()?;

    tracing::info!("Starting link-service with config: {:?}", cfg);

    // --- Initialize SQLite connection ---
    // A failed connection leaves the handle empty so the grant endpoints
    // answer with a configuration error instead of the process dying.
    let db = match connect_grant_db(&cfg.database_url).await {
        Ok(pool) => Some(Arc::new(pool)),
        Err(err) => {
            tracing::warn!("Grant database unavailable: {}", err);
            None
        }
    };

    // --- Handle migration mode ---
    if migrate {
        let Some(db) = db.as_ref() else {
            anyhow::bail!("cannot run migrations: grant database connection failed");
        };
        run_migrations(db).await?;
        tracing::info!("Database migration complete.");
        return Ok(()); // exit after migration
    }

    // --- Initialize object store client ---
    let object_store: Option<Arc<dyn ObjectStore>> = match S3ObjectStore::from_env().await {
        Ok(client) => Some(Arc::new(client)),
        Err(err) => {
            tracing::warn!("Object store client unavailable: {}", err);
            None
        }
    };

    if cfg.bucket.is_none() {
        tracing::warn!(
            "LINK_SERVICE_BUCKET is not set; /files and /generate-signed-url will report a configuration error"
        );
    }

    // --- Initialize core service ---
    let service = LinkService::new(object_store, db, cfg.bucket.clone());

    // --- Build router ---
    // Cross-origin requests are allowed from any origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    let app: Router = routes::routes::routes().with_state(service).layer(cors);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Open the SQLite pool for the grant table, creating the backing file and
/// its parent directory when missing.
async fn connect_grant_db(db_url: &str) -> Result<sqlx::SqlitePool> {
    // Extract the local file path SQLx will use
    let db_path = db_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("file:");
    tracing::debug!("Interpreted SQLite path => {}", db_path);

    // Create parent directory if needed
    let db_path_obj = Path::new(db_path);
    if let Some(parent) = db_path_obj.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)?;
            tracing::info!("Created missing directory {:?}", parent);
        }
    }

    // SQLx will not create the file itself; touch it first
    match fs::OpenOptions::new().create(true).write(true).open(db_path) {
        Ok(_) => tracing::debug!("File can be created/opened successfully."),
        Err(e) => tracing::warn!("Failed to open file manually: {}", e),
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await?;
    Ok(pool)
}

/// Run SQLite migrations manually from the embedded SQL file.
async fn run_migrations(db: &Arc<sqlx::SqlitePool>) -> Result<()> {
    let path = "migrations/0001_init.sql";

    if !Path::new(path).exists() {
        anyhow::bail!("Migration file not found: {}", path);
    }

    let sql = fs::read_to_string(path)?;
    let statements = sql
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>();

    tracing::info!("Running {} migration statements...", statements.len());

    for stmt in statements {
        tracing::debug!("Executing migration SQL: {}", stmt);
        sqlx::query(stmt).execute(&**db).await?;
    }

    Ok(())
}
