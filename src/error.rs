use thiserror::Error;

/// Errors returned by every backend call
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid backend url: {0}")]
    Url(#[from] url::ParseError),

    #[error("backend url cannot be used as a base: {0}")]
    BaseUrl(String),
}

pub type ApiResult<T> = Result<T, ClientError>;

/// Errors from reading or writing the local session file
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_message() {
        let err = ClientError::Status {
            status: 422,
            body: "scheduled_start is required".to_string(),
        };
        assert_eq!(err.to_string(), "backend returned 422: scheduled_start is required");
    }

    #[test]
    fn test_decode_error_from_serde() {
        let err: ClientError = serde_json::from_str::<u32>("\"nope\"").unwrap_err().into();
        assert!(err.to_string().starts_with("invalid response body"));
    }
}
