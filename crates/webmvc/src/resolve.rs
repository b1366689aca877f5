use std::any::Any;

use crate::error::DispatchError;
use crate::method::{HandlerMethod, MethodParameter};
use crate::request::{Exchange, WebRequest};

/// Supplies the value of one handler parameter.
///
/// Resolvers are consulted in order and the first one whose
/// [`supports_parameter`](Self::supports_parameter) returns true resolves it.
pub trait ArgumentResolver: Send + Sync {
    fn supports_parameter(&self, method: &HandlerMethod, parameter: &MethodParameter) -> bool;

    fn resolve_argument(
        &self,
        method: &HandlerMethod,
        parameter: &MethodParameter,
        exchange: &mut Exchange,
        request: &WebRequest,
    ) -> Result<Box<dyn Any + Send>, DispatchError>;
}

/// `String` parameters receive the request body.
pub struct RequestBodyResolver;

impl ArgumentResolver for RequestBodyResolver {
    fn supports_parameter(&self, _method: &HandlerMethod, parameter: &MethodParameter) -> bool {
        parameter.parameter_type().is::<String>()
    }

    fn resolve_argument(
        &self, _method: &HandlerMethod, _parameter: &MethodParameter,
        _exchange: &mut Exchange, request: &WebRequest,
    ) -> Result<Box<dyn Any + Send>, DispatchError> {
        Ok(Box::new(request.body().to_owned()))
    }
}

/// `http::Uri` parameters receive the request uri.
pub struct UriResolver;

impl ArgumentResolver for UriResolver {
    fn supports_parameter(&self, _method: &HandlerMethod, parameter: &MethodParameter) -> bool {
        parameter.parameter_type().is::<http::Uri>()
    }

    fn resolve_argument(
        &self, _method: &HandlerMethod, _parameter: &MethodParameter,
        _exchange: &mut Exchange, request: &WebRequest,
    ) -> Result<Box<dyn Any + Send>, DispatchError> {
        Ok(Box::new(request.uri().clone()))
    }
}

/// The built-in resolvers a dispatcher starts from.
pub fn default_resolvers() -> Vec<Box<dyn ArgumentResolver>> {
    vec![Box::new(RequestBodyResolver), Box::new(UriResolver)]
}
