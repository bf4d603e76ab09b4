/// Errors from the REST API layer.
///
/// Cloneable so that one failed fetch can be handed to every caller that
/// was waiting on it and kept in the cache's error slot.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// The backend answered with a non-2xx status code.
    #[error("Request failed with status {status}{}", detail_suffix(.message))]
    RequestFailed {
        /// HTTP status code.
        status: u16,
        /// `message` or `detail` from the response body, when present.
        message: Option<String>,
    },

    /// No response was received (connection refused, DNS, TLS, reset).
    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),

    /// A 2xx response whose body did not decode into the expected type.
    #[error("Invalid response body: {0}")]
    InvalidResponse(String),

    /// The fetch could not be completed by the caching layer.
    #[error("Internal error: {0}")]
    Internal(String),
}

fn detail_suffix(message: &Option<String>) -> String {
    message
        .as_ref()
        .map(|m| format!(": {m}"))
        .unwrap_or_default()
}

/// Convenience alias for API call results.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// The server-supplied message, if this is a request failure carrying one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::RequestFailed { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// HTTP status of a request failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Pull a human-readable message out of an error response body.
///
/// Recognises `{"message": "..."}`, `{"detail": "..."}` and the
/// `{"detail": [{"msg": "..."}]}` shape used for request validation errors.
pub fn server_message(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    if let Some(message) = json.get("message").and_then(|m| m.as_str()) {
        return Some(message.to_string());
    }
    match json.get("detail")? {
        serde_json::Value::String(detail) => Some(detail.clone()),
        serde_json::Value::Array(items) => items
            .first()
            .and_then(|item| item.get("msg"))
            .and_then(|m| m.as_str())
            .map(str::to_string),
        _ => None,
    }
}
