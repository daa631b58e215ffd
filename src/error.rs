use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrendError {
    #[error("fetch failed ({source_name}): {message}")]
    FetchFailure {
        source_name: String,
        message: String,
    },
    #[error("failed to write {path}: {source}")]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config file invalid or unreadable: {0}")]
    InvalidConfig(String),
    #[error("another trendlog run holds the lock at {0}")]
    Locked(String),
    #[error("{0}")]
    InvalidInput(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendErrorCode {
    E001FetchFailed,
    E002WriteFailed,
    E003ConfigInvalid,
    E004Locked,
    E005InvalidInput,
}

impl TrendErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::E001FetchFailed => "E001_FETCH_FAILED",
            Self::E002WriteFailed => "E002_WRITE_FAILED",
            Self::E003ConfigInvalid => "E003_CONFIG_INVALID",
            Self::E004Locked => "E004_LOCKED",
            Self::E005InvalidInput => "E005_INVALID_INPUT",
        }
    }
}

impl TrendError {
    pub fn fetch(source_name: &str, message: impl Into<String>) -> Self {
        Self::FetchFailure {
            source_name: source_name.to_string(),
            message: message.into(),
        }
    }

    pub fn code(&self) -> TrendErrorCode {
        match self {
            Self::FetchFailure { .. } => TrendErrorCode::E001FetchFailed,
            Self::WriteFailure { .. } => TrendErrorCode::E002WriteFailed,
            Self::InvalidConfig(_) => TrendErrorCode::E003ConfigInvalid,
            Self::Locked(_) => TrendErrorCode::E004Locked,
            Self::InvalidInput(_) => TrendErrorCode::E005InvalidInput,
        }
    }
}

/// Finds the first [`TrendError`] in an `anyhow` chain.
pub fn error_code(err: &anyhow::Error) -> Option<TrendErrorCode> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<TrendError>())
        .map(TrendError::code)
}
