//! # Configuration
//!
//! Loaded once at startup from environment variables with fallback to
//! defaults. Read-only afterwards.
//!
//! ## Environment Variables
//! | Variable                     | Default                              |
//! |------------------------------|--------------------------------------|
//! | `VOUCHER_DB_PATH`            | `<platform data dir>/vouchers.db`    |
//! | `VOUCHER_EXPORT_DIR`         | `.` (current directory)              |
//! | `VOUCHER_DB_MAX_CONNECTIONS` | `5`                                  |

use directories::ProjectDirs;
use serde::Serialize;
use std::env;
use std::path::{Path, PathBuf};

const DB_FILE_NAME: &str = "vouchers.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Application configuration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// SQLite database file
    pub db_path: PathBuf,

    /// Directory receiving invoice, export and aging CSV files
    pub export_dir: PathBuf,

    /// Pool size
    pub max_connections: u32,
}

impl AppConfig {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let db_path = match env::var("VOUCHER_DB_PATH") {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => default_db_path()?,
        };

        let export_dir = env::var("VOUCHER_EXPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));

        let max_connections = match env::var("VOUCHER_DB_MAX_CONNECTIONS") {
            Ok(value) => value
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ConfigError::InvalidValue("VOUCHER_DB_MAX_CONNECTIONS".to_string()))?,
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(AppConfig {
            db_path,
            export_dir,
            max_connections,
        })
    }

    /// Configuration writing into `export_dir` with an explicit database path.
    pub fn with_paths(db_path: impl Into<PathBuf>, export_dir: impl Into<PathBuf>) -> Self {
        AppConfig {
            db_path: db_path.into(),
            export_dir: export_dir.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }

    /// Full path of an exported file.
    pub fn export_path(&self, file_name: &str) -> PathBuf {
        self.export_dir.join(file_name)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

/// Platform data directory, created if missing.
///
/// - **macOS**: `~/Library/Application Support/com.voucherdesk.voucher-desk/vouchers.db`
/// - **Windows**: `%APPDATA%\voucherdesk\voucher-desk\data\vouchers.db`
/// - **Linux**: `~/.local/share/voucher-desk/vouchers.db`
fn default_db_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs = ProjectDirs::from("com", "voucherdesk", "voucher-desk")
        .ok_or(ConfigError::NoDataDir)?;

    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .map_err(|e| ConfigError::DataDir(data_dir.display().to_string(), e.to_string()))?;

    Ok(data_dir.join(DB_FILE_NAME))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Could not determine app data directory; set VOUCHER_DB_PATH")]
    NoDataDir,

    #[error("Could not create data directory {0}: {1}")]
    DataDir(String, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_path_joins_file_name() {
        let config = AppConfig::with_paths("/tmp/v.db", "/srv/exports");
        assert_eq!(
            config.export_path("AllVouchers.csv"),
            PathBuf::from("/srv/exports/AllVouchers.csv")
        );
        assert_eq!(config.max_connections, 5);
    }
}
