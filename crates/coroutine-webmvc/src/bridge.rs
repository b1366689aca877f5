use webmvc::{AsyncReturnValueHandler, DispatchError, Exchange, HandlerMethod, Outcome, ReturnValueHandler, WebRequest};

use crate::resolver::SuspendedCall;

/// Turns a suspended handler into deferred result processing.
///
/// A suspended outcome registers the continuation's result with the request's
/// async manager. A completed one becomes the response right away.
pub struct SuspendedReturnValueHandler;

impl ReturnValueHandler for SuspendedReturnValueHandler {
    fn supports_return_type(&self, method: &HandlerMethod) -> bool {
        method.is_suspend()
    }

    fn handle_return_value(
        &self,
        outcome: Outcome,
        method: &HandlerMethod,
        exchange: &mut Exchange,
        request: &mut WebRequest,
    ) -> Result<(), DispatchError> {
        match outcome {
            Outcome::Suspended => {
                let result = exchange.attributes().get::<SuspendedCall>()
                    .map(|call| call.result().clone())
                    .ok_or_else(|| DispatchError::MissingContinuation { handler: method.name().into() })?;
                debug!(handler = method.name(), "handler suspended");
                request.async_manager_mut().start_deferred_result_processing(result)
            }
            Outcome::Completed(value) => {
                exchange.set_value(value);
                exchange.set_request_handled(true);
                Ok(())
            }
        }
    }

    fn as_async(&self) -> Option<&dyn AsyncReturnValueHandler> {
        Some(self)
    }
}

impl AsyncReturnValueHandler for SuspendedReturnValueHandler {
    fn is_async_return_value(&self, outcome: &Outcome, _method: &HandlerMethod) -> bool {
        outcome.is_suspended()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use webmvc::{ArgumentResolver, Args, DeferredResult, Value};

    use crate::continuation::Continuation;
    use crate::resolver::ContinuationArgumentResolver;

    fn request() -> WebRequest {
        WebRequest::new(http::Method::GET, http::Uri::from_static("/"))
    }

    fn suspendable() -> HandlerMethod {
        HandlerMethod::suspendable("suspendable", |_| Ok(Outcome::Suspended)).param::<Continuation>()
    }

    /// Resolve the continuation parameter the way the dispatcher would.
    fn resolve(method: &HandlerMethod, exchange: &mut Exchange, request: &WebRequest) -> Continuation {
        let value = ContinuationArgumentResolver
            .resolve_argument(method, &method.parameters()[0], exchange, request)
            .unwrap();
        Args::new(vec![value]).take::<Continuation>(0).unwrap()
    }

    #[test]
    fn ignores_plain_handlers() {
        let method = HandlerMethod::new("plain", |_| Ok(Value::Null));
        assert!(!SuspendedReturnValueHandler.supports_return_type(&method));
        assert!(SuspendedReturnValueHandler.supports_return_type(&suspendable()));
    }

    #[test]
    fn only_suspension_is_asynchronous() {
        let method = suspendable();
        assert!(SuspendedReturnValueHandler.is_async_return_value(&Outcome::Suspended, &method));
        assert!(!SuspendedReturnValueHandler.is_async_return_value(&Outcome::Completed(Value::Null), &method));
    }

    #[test]
    fn suspension_registers_the_resolved_continuation() {
        let method = suspendable();
        let mut exchange = Exchange::default();
        let mut request = request();
        let continuation = resolve(&method, &mut exchange, &request);

        SuspendedReturnValueHandler
            .handle_return_value(Outcome::Suspended, &method, &mut exchange, &mut request)
            .unwrap();

        assert!(!exchange.is_request_handled());
        let registered = request.async_manager().concurrent_result().unwrap();
        assert!(DeferredResult::ptr_eq(registered, continuation.deferred_result()));

        continuation.resume("ok");
        let pending = request.into_async_manager().into_pending().unwrap();
        assert_eq!(pending.wait_blocking().unwrap(), Value::from("ok"));
    }

    #[test]
    fn completion_marks_exchange_handled() {
        let method = suspendable();
        let mut exchange = Exchange::default();
        let mut request = request();
        let _continuation = resolve(&method, &mut exchange, &request);

        SuspendedReturnValueHandler
            .handle_return_value(Outcome::Completed(Value::from("sync")), &method, &mut exchange, &mut request)
            .unwrap();

        assert!(exchange.is_request_handled());
        assert_eq!(exchange.value(), Some(&Value::from("sync")));
        assert!(!request.async_manager().is_concurrent_handling_started());
    }

    #[test]
    fn suspension_without_continuation_is_an_error() {
        let method = suspendable();
        let mut exchange = Exchange::default();
        let mut request = request();
        let err = SuspendedReturnValueHandler
            .handle_return_value(Outcome::Suspended, &method, &mut exchange, &mut request)
            .unwrap_err();
        assert!(matches!(err, DispatchError::MissingContinuation { .. }));
        assert!(!request.async_manager().is_concurrent_handling_started());
    }
}
