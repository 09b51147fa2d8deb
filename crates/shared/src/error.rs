use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthorized,
    Forbidden,
    NotFound,
    Validation,
    RateLimited,
    Internal,
}

impl ErrorCode {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            400 | 409 | 422 => Self::Validation,
            429 => Self::RateLimited,
            _ => Self::Internal,
        }
    }
}

/// Error body returned by the API. Only `message` is sent by the server;
/// `code` is derived locally from the HTTP status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default = "internal_code", skip_serializing)]
    pub code: ErrorCode,
    #[serde(default)]
    pub message: String,
}

fn internal_code() -> ErrorCode {
    ErrorCode::Internal
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Builds an error from a raw response body, falling back to `fallback`
    /// when the body carries no usable `message`.
    pub fn from_body(status: u16, body: &str, fallback: &str) -> Self {
        let message = serde_json::from_str::<ApiError>(body)
            .ok()
            .map(|parsed| parsed.message)
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string());
        Self::new(ErrorCode::from_status(status), message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_message_wins_over_fallback() {
        let err = ApiError::from_body(401, r#"{"message":"Invalid email or password"}"#, "x");
        assert_eq!(err.code, ErrorCode::Unauthorized);
        assert_eq!(err.message, "Invalid email or password");
    }

    #[test]
    fn missing_or_blank_message_uses_fallback() {
        let err = ApiError::from_body(500, "<html>", "Registration failed");
        assert_eq!(err.code, ErrorCode::Internal);
        assert_eq!(err.message, "Registration failed");

        let err = ApiError::from_body(422, r#"{"message":"  "}"#, "Registration failed");
        assert_eq!(err.code, ErrorCode::Validation);
        assert_eq!(err.message, "Registration failed");
    }
}
