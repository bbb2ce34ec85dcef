//! Shared database fixture for service and server tests.

use migration::MigratorTrait;
use models::db::{connect_with_config, DatabaseConfig};
use sea_orm::DatabaseConnection;
use tokio::sync::OnceCell;

// Migrations run once per test process.
static MIGRATED: OnceCell<bool> = OnceCell::const_new();

fn config() -> Option<DatabaseConfig> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return None;
    }
    let url = std::env::var("DATABASE_URL").ok().filter(|u| !u.is_empty())?;
    Some(DatabaseConfig { url, max_connections: 5, min_connections: 1, acquire_timeout_secs: 10, ..DatabaseConfig::default() })
}

/// A migrated connection, or `None` when database tests should be skipped
/// (`SKIP_DB_TESTS` set, `DATABASE_URL` missing or unreachable).
pub async fn get_db() -> Option<DatabaseConnection> {
    let Some(cfg) = config() else {
        eprintln!("skip: SKIP_DB_TESTS set or DATABASE_URL missing");
        return None;
    };
    let migrated = MIGRATED
        .get_or_init(|| async {
            let db = match connect_with_config(&cfg).await {
                Ok(db) => db,
                Err(e) => {
                    eprintln!("skip: cannot connect to db: {e}");
                    return false;
                }
            };
            match migration::Migrator::up(&db, None).await {
                Ok(()) => true,
                Err(e) => {
                    eprintln!("skip: migrate up failed: {e}");
                    false
                }
            }
        })
        .await;
    if !*migrated {
        return None;
    }
    // Fresh pool per test: each #[tokio::test] has its own runtime.
    connect_with_config(&cfg).await.ok()
}
