use std::any::Any;

use webmvc::{ArgumentResolver, DeferredResult, DispatchError, Exchange, HandlerMethod, MethodParameter, ParamType, WebRequest};

use crate::continuation::{Continuation, Resume};

/// Exchange attribute linking a suspended invocation to its continuation's result.
#[derive(Debug, Clone)]
pub struct SuspendedCall {
    result: DeferredResult,
}

impl SuspendedCall {
    pub fn result(&self) -> &DeferredResult {
        &self.result
    }
}

/// True for parameter types a [`Continuation`] can be passed as.
pub fn is_continuation_type(parameter_type: &ParamType) -> bool {
    parameter_type.is::<Continuation>() || parameter_type.is::<Box<dyn Resume>>()
}

/// Supplies a fresh continuation to suspendable handlers.
pub struct ContinuationArgumentResolver;

impl ArgumentResolver for ContinuationArgumentResolver {
    fn supports_parameter(&self, method: &HandlerMethod, parameter: &MethodParameter) -> bool {
        method.is_suspend() && is_continuation_type(parameter.parameter_type())
    }

    fn resolve_argument(
        &self,
        method: &HandlerMethod,
        parameter: &MethodParameter,
        exchange: &mut Exchange,
        _request: &WebRequest,
    ) -> Result<Box<dyn Any + Send>, DispatchError> {
        let continuation = Continuation::new();
        exchange.attributes_mut().insert(SuspendedCall {
            result: continuation.deferred_result().clone(),
        });
        trace!(handler = method.name(), index = parameter.index(), "continuation created");

        if parameter.parameter_type().is::<Box<dyn Resume>>() {
            let boxed: Box<dyn Resume> = Box::new(continuation);
            Ok(Box::new(boxed))
        } else {
            Ok(Box::new(continuation))
        }
    }
}
