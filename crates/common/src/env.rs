//! Environment/runtime helpers
//!
//! Sanity checks run once at startup.

use tracing::{info, warn};

/// Warn when the dashboard asset directory is missing; the API still works without it.
pub async fn ensure_env(frontend_dir: &str) -> anyhow::Result<()> {
    match tokio::fs::metadata(frontend_dir).await {
        Ok(meta) if meta.is_dir() => {
            info!(%frontend_dir, "serving dashboard assets");
        }
        Ok(_) => {
            anyhow::bail!("{frontend_dir} exists but is not a directory");
        }
        Err(_) => {
            warn!(%frontend_dir, "dashboard assets directory not found; static assets will 404");
        }
    }
    Ok(())
}
