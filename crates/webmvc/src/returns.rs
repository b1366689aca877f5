use crate::error::DispatchError;
use crate::method::{HandlerMethod, Outcome};
use crate::request::{Exchange, WebRequest};

/// Handles what a handler invocation produced.
pub trait ReturnValueHandler: Send + Sync {
    fn supports_return_type(&self, method: &HandlerMethod) -> bool;

    fn handle_return_value(
        &self,
        outcome: Outcome,
        method: &HandlerMethod,
        exchange: &mut Exchange,
        request: &mut WebRequest,
    ) -> Result<(), DispatchError>;

    /// Handlers that can recognise asynchronous outcomes expose that capability here.
    fn as_async(&self) -> Option<&dyn AsyncReturnValueHandler> {
        None
    }
}

/// Fast-path check consulted before a handler is selected: when any handler
/// reports an outcome as asynchronous, only asynchronous handlers are eligible.
pub trait AsyncReturnValueHandler {
    fn is_async_return_value(&self, outcome: &Outcome, method: &HandlerMethod) -> bool;
}

pub(crate) fn select_handler<'a>(
    handlers: &'a [Box<dyn ReturnValueHandler>],
    outcome: &Outcome,
    method: &HandlerMethod,
) -> Option<&'a dyn ReturnValueHandler> {
    let is_async = handlers.iter()
        .filter_map(|h| h.as_async())
        .any(|h| h.is_async_return_value(outcome, method));

    handlers.iter()
        .filter(|h| !is_async || h.as_async().is_some())
        .find(|h| h.supports_return_type(method))
        .map(|h| &**h)
}

/// Catch-all: a completed value becomes the response.
pub struct CompletedValueHandler;

impl ReturnValueHandler for CompletedValueHandler {
    fn supports_return_type(&self, _method: &HandlerMethod) -> bool {
        true
    }

    fn handle_return_value(
        &self, outcome: Outcome, method: &HandlerMethod,
        exchange: &mut Exchange, _request: &mut WebRequest,
    ) -> Result<(), DispatchError> {
        match outcome {
            Outcome::Completed(value) => {
                exchange.set_value(value);
                exchange.set_request_handled(true);
                Ok(())
            }
            Outcome::Suspended => Err(DispatchError::UnexpectedSuspension {
                handler: method.name().into(),
            }),
        }
    }
}

/// The built-in return value handlers a dispatcher starts from.
pub fn default_handlers() -> Vec<Box<dyn ReturnValueHandler>> {
    vec![Box::new(CompletedValueHandler)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::Value;

    struct AsyncOnly;
    impl ReturnValueHandler for AsyncOnly {
        fn supports_return_type(&self, _method: &HandlerMethod) -> bool { true }
        fn handle_return_value(
            &self, _outcome: Outcome, _method: &HandlerMethod,
            _exchange: &mut Exchange, _request: &mut WebRequest,
        ) -> Result<(), DispatchError> { Ok(()) }
        fn as_async(&self) -> Option<&dyn AsyncReturnValueHandler> { Some(self) }
    }
    impl AsyncReturnValueHandler for AsyncOnly {
        fn is_async_return_value(&self, outcome: &Outcome, _method: &HandlerMethod) -> bool {
            outcome.is_suspended()
        }
    }

    fn name_of(handler: Option<&dyn ReturnValueHandler>) -> &'static str {
        match handler {
            Some(h) if h.as_async().is_some() => "async",
            Some(_) => "completed",
            None => "none",
        }
    }

    #[test]
    fn async_outcome_skips_plain_handlers() {
        let handlers: Vec<Box<dyn ReturnValueHandler>> = vec![Box::new(CompletedValueHandler), Box::new(AsyncOnly)];
        let method = HandlerMethod::suspendable("m", |_| Ok(Outcome::Suspended));

        assert_eq!(name_of(select_handler(&handlers, &Outcome::Suspended, &method)), "async");
        assert_eq!(name_of(select_handler(&handlers, &Outcome::Completed(Value::Null), &method)), "completed");
    }

    #[test]
    fn suspension_without_async_handler_is_an_error() {
        let method = HandlerMethod::suspendable("lonely", |_| Ok(Outcome::Suspended));
        let mut exchange = Exchange::default();
        let mut request = WebRequest::new(http::Method::GET, http::Uri::from_static("/"));
        let err = CompletedValueHandler
            .handle_return_value(Outcome::Suspended, &method, &mut exchange, &mut request)
            .unwrap_err();
        assert!(matches!(err, DispatchError::UnexpectedSuspension { .. }));
        assert!(!exchange.is_request_handled());
    }
}
