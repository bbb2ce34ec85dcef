use std::future::Future;
use std::sync::Arc;

use configs::AppConfig;
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use tower_http::cors::CorsLayer;
use tracing::info;

use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::auth::service::{AuthConfig, AuthService};
use service::Services;

use crate::errors::StartupError;
use crate::routes::{self, auth::ServerState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Wire services and auth over an existing connection.
pub fn build_state(db: DatabaseConnection, cfg: &AppConfig) -> ServerState {
    let repo = Arc::new(SeaOrmAuthRepository { db: db.clone() });
    let auth = AuthService::new(repo, AuthConfig::new(cfg.auth.jwt_secret.clone(), cfg.auth.token_ttl_hours));
    ServerState { services: Services::new(db.clone()), db, auth: Arc::new(auth), cookie_secure: cfg.auth.cookie_secure }
}

/// The application router for `state`.
pub fn build_app(state: ServerState, cfg: &AppConfig) -> axum::Router {
    routes::build_router(state, build_cors(), &cfg.server.frontend_dir)
}

/// Connect, migrate and serve until `shutdown` resolves.
pub async fn run(cfg: AppConfig, shutdown: impl Future<Output = ()> + Send + 'static) -> anyhow::Result<()> {
    common::env::ensure_env(&cfg.server.frontend_dir).await?;

    let db = models::db::connect_with_config(&cfg.database)
        .await
        .map_err(|e| StartupError::Database(e.to_string()))?;
    migration::Migrator::up(&db, None)
        .await
        .map_err(|e| StartupError::Database(format!("migrations failed: {e}")))?;
    info!("migrations applied");

    let app = build_app(build_state(db, &cfg), &cfg);
    let addr = cfg.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| StartupError::InvalidConfig(format!("cannot bind {addr}: {e}")))?;
    info!(%addr, "listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    info!("server drained");
    Ok(())
}
