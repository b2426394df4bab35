//! Error types for transport, adaptation and controller failures.

use serde_json::Value;
use thiserror::Error;

use crate::entity::EntityId;

/// Transport-level failure reported by a [`crate::backend::CollectionBackend`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Http {
        /// Response status code.
        status: u16,
        /// Message extracted from the response body, possibly empty.
        message: String,
    },
    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),
    /// The client-side deadline elapsed before a response arrived.
    #[error("request timed out after {after_ms} ms")]
    Timeout {
        /// Deadline that was exceeded.
        after_ms: u64,
    },
    /// The response arrived but its body could not be understood.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Build an [`ApiError::Http`] from a status and raw response body.
    ///
    /// Servers report failures as `{"message": ...}`, `{"error": ...}` or
    /// plain text depending on the route, so all three are accepted.
    pub fn from_response(status: u16, body: &str) -> Self {
        Self::Http {
            status,
            message: extract_server_message(body).unwrap_or_default(),
        }
    }

    /// HTTP status, when the failure came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http {
                status, ..
            } => Some(*status),
            _ => None,
        }
    }

    /// Server supplied message, when one was present and non-empty.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Http {
                message, ..
            } => Some(message.as_str()).filter(|value| !value.trim().is_empty()),
            _ => None,
        }
    }

    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout {
                ..
            } => true,
            Self::Http {
                status, ..
            } => *status >= 500 || *status == 408 || *status == 429,
            Self::Decode(_) => false,
        }
    }
}

fn extract_server_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => ["message", "Message", "error", "Error", "detail"]
            .iter()
            .filter_map(|key| map.get(*key))
            .find_map(|value| match value {
                Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
                Value::Object(inner) => inner
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                _ => None,
            }),
        Ok(Value::String(text)) => Some(text),
        Ok(_) => None,
        Err(_) => Some(body.chars().take(200).collect()),
    }
}

/// A raw record could not be turned into a canonical entity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdaptError {
    /// The record was some other JSON shape.
    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),
    /// None of the identifier aliases were present.
    #[error("record has no identifier")]
    MissingId,
}

/// Failure surfaced by a [`crate::controller::ResourceController`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    /// A read failed; the view falls back to its empty state.
    #[error("failed to load {resource}: {source}")]
    Fetch {
        /// Resource path segment.
        resource: &'static str,
        /// Underlying transport error.
        #[source]
        source: ApiError,
    },
    /// A write failed; the cache was left untouched.
    #[error("failed to {verb} {resource}: {source}")]
    Mutation {
        /// Resource path segment.
        resource: &'static str,
        /// Operation that failed, e.g. `create`.
        verb: &'static str,
        /// Underlying transport error.
        #[source]
        source: ApiError,
    },
    /// The operation targets an id the controller has not loaded.
    #[error("{0} is not loaded")]
    NotInCache(EntityId),
    /// The server answered with a record that could not be adapted.
    #[error(transparent)]
    Adapt(#[from] AdaptError),
}

impl ControllerError {
    /// The transport error behind this failure, if any.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Fetch {
                source, ..
            }
            | Self::Mutation {
                source, ..
            } => Some(source),
            _ => None,
        }
    }

    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        self.api_error().is_some_and(ApiError::is_retryable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_message_is_read_from_common_body_shapes() {
        let err = ApiError::from_response(409, r#"{"message":"Course has enrolled users"}"#);
        assert_eq!(err.server_message(), Some("Course has enrolled users"));
        assert_eq!(err.status(), Some(409));

        let err = ApiError::from_response(400, r#"{"error":{"message":"bad title"}}"#);
        assert_eq!(err.server_message(), Some("bad title"));

        let err = ApiError::from_response(502, "upstream down");
        assert_eq!(err.server_message(), Some("upstream down"));

        let err = ApiError::from_response(500, "");
        assert_eq!(err.server_message(), None);
    }

    #[test]
    fn retryable_errors_are_transient_ones() {
        assert!(ApiError::Timeout {
            after_ms: 20_000
        }
        .is_retryable());
        assert!(ApiError::Network("reset".into()).is_retryable());
        assert!(ApiError::from_response(503, "").is_retryable());
        assert!(!ApiError::from_response(404, "").is_retryable());
        assert!(!ApiError::Decode("eof".into()).is_retryable());
    }
}
