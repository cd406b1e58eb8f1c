//! Shared JSON error envelope (§6.2 "Error status").
//!
//! Grounded on `server::http::response`: a thin `json_error` builder plus
//! status-specific helpers, used instead of hand-rolling `(StatusCode,
//! Json(...))` tuples at every call site.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub message: String,
}

fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorEnvelope { message: message.into() })).into_response()
}

/// 400: the request body or path could not be framed/decoded.
pub fn bad_request(message: impl Into<String>) -> Response {
    json_error(StatusCode::BAD_REQUEST, message)
}

/// 403: the request decoded fine but the application rejected it
/// (unknown namespace, no subscribers, a discovery failure, …).
pub fn application_error(message: impl Into<String>) -> Response {
    json_error(StatusCode::FORBIDDEN, message)
}

/// Route a [`dmp_errors::DmpError`] to a status code: framing and
/// decoding failures are client mistakes (400), everything else is an
/// application-level rejection (403).
pub fn error_response(err: &dmp_errors::DmpError) -> Response {
    use dmp_errors::DmpError;
    match err {
        DmpError::InvalidArgument { .. } | DmpError::FramingError { .. } | DmpError::MessageTooLong { .. } | DmpError::InvalidProtocol { .. } => {
            bad_request(err.to_string())
        }
        DmpError::NamespaceNotFound { .. }
        | DmpError::TopicHasNoSubscribers { .. }
        | DmpError::IncompleteMulticast { .. }
        | DmpError::Discovery(_)
        | DmpError::Io(_) => application_error(err.to_string()),
    }
}
