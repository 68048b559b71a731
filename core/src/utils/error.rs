use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;
use crate::github::ListError;

pub type SyncResult<T, E = SyncError> = Result<T, E>;

/// Errors that abort a whole run before or instead of per-repository work.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to fetch repositories: {0}")]
    List(#[from] ListError),

    #[error("Invalid concurrency {0}, at least 1 is required")]
    InvalidConcurrency(usize),

    #[error("Invalid ignore pattern: {0}")]
    InvalidPattern(#[from] globset::Error),

    #[error("Create directory {} failed: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Create thread pool failed: {0}")]
    CreateThreadPool(#[from] rayon::ThreadPoolBuildError),
}
