use http::StatusCode;

/// Failure raised by a handler, either synchronously from its invocation or
/// later through a resumed continuation. Both paths render the same way.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("{0}")]
    IllegalState(String),
    #[error("{0}")]
    IllegalArgument(String),
    #[error("Asynchronous request timed out")]
    AsyncTimeout,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl HandlerError {
    pub fn illegal_state(msg: impl Into<String>) -> Self {
        HandlerError::IllegalState(msg.into())
    }
    pub fn illegal_argument(msg: impl Into<String>) -> Self {
        HandlerError::IllegalArgument(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            HandlerError::IllegalState(_) => StatusCode::INTERNAL_SERVER_ERROR,
            HandlerError::IllegalArgument(_) => StatusCode::BAD_REQUEST,
            HandlerError::AsyncTimeout => StatusCode::SERVICE_UNAVAILABLE,
            HandlerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Failure of the dispatch pipeline itself.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("No argument resolver for parameter {index} ({type_name}) of handler {handler}")]
    NoResolver { handler: String, index: usize, type_name: &'static str },
    #[error("No return value handler for handler {handler}")]
    NoReturnValueHandler { handler: String },
    #[error("Handler {handler} suspended but no asynchronous return value handler accepted it")]
    UnexpectedSuspension { handler: String },
    #[error("Handler {handler} suspended without a continuation stored for the exchange")]
    MissingContinuation { handler: String },
    #[error("Return value of handler {handler} was neither handled nor deferred")]
    Unhandled { handler: String },
    #[error("Asynchronous processing was already started for this request")]
    AsyncAlreadyStarted,
    #[error("Handler {handler} failed")]
    Handler {
        handler: String,
        #[source]
        source: HandlerError,
    },
}
