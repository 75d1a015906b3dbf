//! Error types for lumen.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LinkError>;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("dictionary {path}: {reason}")]
    Dictionary { path: PathBuf, reason: String },

    #[error("config error: {0}")]
    Config(String),
}

impl LinkError {
    pub fn dictionary(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Dictionary {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
