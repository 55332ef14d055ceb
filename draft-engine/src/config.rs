//! Engine configuration
//!
//! # Environment variables
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | WORK_DIR | /var/lib/draft-engine | Working directory for durable storage |
//! | BRANCH_ID | main | Branch whose drafts this instance manages |
//! | LOG_LEVEL | info | Log level when RUST_LOG is unset |

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory holding the draft database
    pub work_dir: String,
    /// Branch scope for storage keys and catalog feeds
    pub branch_id: String,
    /// Fallback log level
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/draft-engine".into()),
            branch_id: std::env::var("BRANCH_ID").unwrap_or_else(|_| "main".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
        }
    }

    /// Override the fields tests care about.
    pub fn with_overrides(work_dir: impl Into<String>, branch_id: impl Into<String>) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.branch_id = branch_id.into();
        config
    }

    /// Path of the redb database holding draft snapshots and settings.
    pub fn drafts_db_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("drafts.redb")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
