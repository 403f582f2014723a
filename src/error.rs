use std::error::Error as StdError;

use thiserror::Error;

use crate::task::TaskId;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Raised when the task store answers with a body that cannot be decoded.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct InvalidRawResponse {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl InvalidRawResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(source: impl Into<BoxError>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("task store unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("task store returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid task store response: {0}")]
    InvalidRawResponse(#[from] InvalidRawResponse),
    #[error("task not found: {0}")]
    NotFound(TaskId),
    #[error("invalid task store url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_only_has_no_source() {
        let err = InvalidRawResponse::new("empty body");
        assert_eq!(err.to_string(), "empty body");
        assert!(err.source().is_none());
    }

    #[test]
    fn wraps_inner_cause() {
        let cause = serde_json::from_str::<Vec<u32>>("[1, 2").unwrap_err();
        let err = InvalidRawResponse::with_source(cause, "task list is not JSON");

        assert_eq!(err.to_string(), "task list is not JSON");
        let source = err.source().expect("inner cause");
        assert!(source.to_string().contains("EOF"));
    }

    #[test]
    fn store_error_keeps_chain() {
        let err: StoreError = InvalidRawResponse::new("bad").into();
        assert_eq!(err.to_string(), "invalid task store response: bad");
        assert!(err.source().is_some());
    }
}
