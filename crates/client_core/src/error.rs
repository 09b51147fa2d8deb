use shared::error::{ApiError, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("not signed in")]
    NotAuthenticated,
    #[error("media library access was denied")]
    PermissionDenied,
    #[error("gallery slot {0} is out of range")]
    SlotOutOfRange(usize),
    #[error("gallery slot {0} already holds a photo")]
    SlotOccupied(usize),
    #[error("an upload into gallery slot {0} is already in progress")]
    SlotBusy(usize),
    #[error("{0}")]
    Validation(String),
    #[error("server rejected request ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Api { status, .. } => Some(ErrorCode::from_status(*status)),
            Self::NotAuthenticated => Some(ErrorCode::Unauthorized),
            Self::Validation(_) | Self::SlotOutOfRange(_) | Self::SlotOccupied(_) => {
                Some(ErrorCode::Validation)
            }
            _ => None,
        }
    }
}

impl From<(u16, ApiError)> for ClientError {
    fn from((status, err): (u16, ApiError)) -> Self {
        Self::Api {
            status,
            message: err.message,
        }
    }
}
