use axum::{Json, Router, routing::get};
use migration::MigratorTrait;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::task::SeaOrmTaskRepository;
use crate::task::api::{TaskState, create_task_router};
use api::{ApiDoc, HelloResponse};

pub mod api;

/// Connects to the database, verifies it is reachable and makes sure the
/// `tasks` table exists. Any failure here is fatal for the process.
#[tracing::instrument(skip(config))]
pub async fn connect_database(config: &Config) -> anyhow::Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(config.database_url());
    options
        .max_connections(config.db_max_connections)
        .sqlx_logging(false);

    let db = Database::connect(options).await?;
    db.ping().await?;
    tracing::info!(
        "Connected to database {} at {}:{}",
        config.db_database,
        config.db_host,
        config.db_port
    );

    migration::Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied successfully");
    Ok(db)
}

/// Builds the complete application router.
pub fn create_app(task_state: TaskState) -> Router {
    Router::new()
        .route("/hello", get(hello_handler))
        .merge(create_task_router(task_state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

#[tracing::instrument(skip(config))]
pub async fn start_web_server(config: Config) -> anyhow::Result<()> {
    let db = Arc::new(connect_database(&config).await?);

    let repository = SeaOrmTaskRepository::new(db.clone());
    let app = create_app(TaskState::new(Arc::new(repository)));

    let server_address = format!("0.0.0.0:{}", &config.port);
    let listener = tokio::net::TcpListener::bind(&server_address).await?;
    tracing::info!("Web server running on http://{}", server_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Web server stopped");

    match Arc::try_unwrap(db) {
        Ok(db) => {
            db.close().await?;
            tracing::info!("Database connection closed");
        }
        Err(_) => tracing::warn!("Database connection still in use, leaving it to drop"),
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to listen for SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}

/// Handler for GET /hello.
#[tracing::instrument]
#[utoipa::path(
    get,
    path = "/hello",
    responses((status = 200, description = "Service is up", body = HelloResponse)),
    tag = "Health"
)]
pub async fn hello_handler() -> Json<HelloResponse> {
    Json(HelloResponse {
        hello: "world".to_string(),
    })
}
