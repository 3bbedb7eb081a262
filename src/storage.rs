use crate::errors::AppError;
use crate::tracker::Tracker;
use chrono::NaiveDate;
use std::{env, path::Path, path::PathBuf};
use tokio::fs;
use tracing::{error, info};

pub const DEFAULT_PORT: u16 = 8080;

pub fn resolve_port() -> u16 {
    env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT)
}

/// Snapshot to import over the seed data at startup, if any.
pub fn resolve_import_path() -> Option<PathBuf> {
    env::var("RECOVERY_IMPORT_PATH")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
}

pub async fn read_snapshot_file(path: &Path) -> Result<String, AppError> {
    let bytes = fs::read(path).await?;
    String::from_utf8(bytes).map_err(AppError::internal)
}

/// Reads and applies a snapshot file. Failures are logged and leave the
/// tracker untouched.
pub async fn import_snapshot_file(path: &Path, tracker: &mut Tracker) -> bool {
    let text = match read_snapshot_file(path).await {
        Ok(text) => text,
        Err(err) => {
            error!("failed to read snapshot {}: {}", path.display(), err.message);
            return false;
        }
    };

    match tracker.import(&text) {
        Ok(summary) => {
            info!(
                "imported snapshot {} (replaced: {})",
                path.display(),
                summary.replaced.join(", ")
            );
            true
        }
        Err(err) => {
            error!("failed to parse snapshot {}: {err}", path.display());
            false
        }
    }
}

pub fn export_file_name(today: NaiveDate) -> String {
    format!("recovery_data_{}.json", today.format("%Y-%m-%d"))
}
