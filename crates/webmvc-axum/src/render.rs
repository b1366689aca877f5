use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use webmvc::utils::format_error_disp;
use webmvc::{DispatchError, HandlerError, Value};


#[derive(Debug, thiserror::Error)]
pub enum MvcError {
    #[error("Request body could not be read")]
    Body(#[source] BytesRejection),
    #[error("Request body is not valid UTF-8")]
    InvalidUtf8(#[source] std::string::FromUtf8Error),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error(transparent)]
    Handler(#[from] HandlerError),
    #[error("Dispatch worker failed")]
    Worker(#[from] tokio::task::JoinError),
}

impl MvcError {
    /// The handler's own error, however it was raised.
    fn handler_error(&self) -> Option<&HandlerError> {
        match self {
            MvcError::Handler(e) => Some(e),
            MvcError::Dispatch(DispatchError::Handler { source, .. }) => Some(source),
            _ => None,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            MvcError::Body(rejection) => rejection.status(),
            MvcError::InvalidUtf8(_) => StatusCode::BAD_REQUEST,
            _ => self.handler_error()
                .map(HandlerError::status)
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }

    pub fn message(&self) -> String {
        match self.handler_error() {
            Some(e) => e.to_string(),
            None => self.to_string(),
        }
    }
}

#[derive(Debug, serde::Serialize)]
struct ErrorBody<'a> {
    status: u16,
    error: &'a str,
    message: String,
    path: &'a str,
}

/// Render an error the same way whether the handler failed before or after suspending.
pub fn error_response(error: &MvcError, path: &str) -> Response {
    let status = error.status();
    if status.is_server_error() {
        warn!(%status, path, "request failed: {}", format_error_disp(error));
    } else {
        debug!(%status, path, "request rejected: {}", error);
    }
    let body = ErrorBody {
        status: status.as_u16(),
        error: status.canonical_reason().unwrap_or("Unknown"),
        message: error.message(),
        path,
    };
    (status, axum::Json(body)).into_response()
}

/// Strings are sent as plain text, `null` or no value as an empty body, anything else as JSON.
pub fn value_response(value: Option<Value>) -> Response {
    match value {
        None | Some(Value::Null) => StatusCode::OK.into_response(),
        Some(Value::String(text)) => text.into_response(),
        Some(value) => axum::Json(value).into_response(),
    }
}
