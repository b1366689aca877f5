use std::time::Duration;

use crate::async_manager::PendingResponse;
use crate::error::DispatchError;
use crate::method::{Args, HandlerMethod, Value};
use crate::request::{Exchange, WebRequest};
use crate::resolve::{self, ArgumentResolver};
use crate::returns::{self, ReturnValueHandler};

/// Hook for adding components to the dispatcher's chains.
///
/// The chains passed in already contain the built-in components, so inserting
/// at index 0 places a component ahead of all of them.
pub trait WebMvcConfigurer {
    fn add_argument_resolvers(&self, _resolvers: &mut Vec<Box<dyn ArgumentResolver>>) {}
    fn add_return_value_handlers(&self, _handlers: &mut Vec<Box<dyn ReturnValueHandler>>) {}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DispatchConfig {
    /// Applied to deferred results that don't carry their own timeout.
    /// `None` waits indefinitely.
    pub async_timeout_ms: Option<u64>,
}

impl DispatchConfig {
    pub fn async_timeout(&self) -> Option<Duration> {
        self.async_timeout_ms.map(Duration::from_millis)
    }
}

/// How a dispatched request continues.
#[derive(Debug)]
pub enum Dispatch {
    /// Finished on the dispatching thread; `None` means an empty response.
    Completed(Option<Value>),
    /// Finishes when the pending result is settled.
    Async(PendingResponse),
}

pub struct DispatcherBuilder {
    resolvers: Vec<Box<dyn ArgumentResolver>>,
    return_handlers: Vec<Box<dyn ReturnValueHandler>>,
    config: DispatchConfig,
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        DispatcherBuilder {
            resolvers: resolve::default_resolvers(),
            return_handlers: returns::default_handlers(),
            config: DispatchConfig::default(),
        }
    }
}

impl DispatcherBuilder {
    pub fn config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn configure(mut self, configurer: &dyn WebMvcConfigurer) -> Self {
        configurer.add_argument_resolvers(&mut self.resolvers);
        configurer.add_return_value_handlers(&mut self.return_handlers);
        self
    }

    pub fn build(self) -> Dispatcher {
        debug!(
            resolvers = self.resolvers.len(),
            return_handlers = self.return_handlers.len(),
            "dispatcher built"
        );
        Dispatcher {
            resolvers: self.resolvers,
            return_handlers: self.return_handlers,
            config: self.config,
        }
    }
}

/// Runs one handler invocation: resolve arguments, invoke, handle the return value.
pub struct Dispatcher {
    resolvers: Vec<Box<dyn ArgumentResolver>>,
    return_handlers: Vec<Box<dyn ReturnValueHandler>>,
    config: DispatchConfig,
}

impl Dispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::default()
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    #[tracing::instrument(level = "debug", skip_all, fields(handler = %handler.name()))]
    pub fn dispatch(&self, handler: &HandlerMethod, mut request: WebRequest) -> Result<Dispatch, DispatchError> {
        let mut exchange = Exchange::default();
        request.async_manager_mut().set_default_timeout(self.config.async_timeout());

        let args = self.resolve_arguments(handler, &mut exchange, &request)?;

        let outcome = handler.invoke(args).map_err(|source| DispatchError::Handler {
            handler: handler.name().into(),
            source,
        })?;
        trace!(suspended = outcome.is_suspended(), "handler returned");

        let return_handler = returns::select_handler(&self.return_handlers, &outcome, handler)
            .ok_or_else(|| DispatchError::NoReturnValueHandler { handler: handler.name().into() })?;
        return_handler.handle_return_value(outcome, handler, &mut exchange, &mut request)?;

        match request.into_async_manager().into_pending() {
            Some(pending) => Ok(Dispatch::Async(pending)),
            None if exchange.is_request_handled() => Ok(Dispatch::Completed(exchange.take_value())),
            None => Err(DispatchError::Unhandled { handler: handler.name().into() }),
        }
    }

    fn resolve_arguments(
        &self,
        handler: &HandlerMethod,
        exchange: &mut Exchange,
        request: &WebRequest,
    ) -> Result<Args, DispatchError> {
        let mut values = Vec::with_capacity(handler.parameters().len());
        for parameter in handler.parameters() {
            let resolver = self.resolvers.iter()
                .find(|r| r.supports_parameter(handler, parameter))
                .ok_or_else(|| DispatchError::NoResolver {
                    handler: handler.name().into(),
                    index: parameter.index(),
                    type_name: parameter.parameter_type().name(),
                })?;
            values.push(resolver.resolve_argument(handler, parameter, exchange, request)?);
        }
        Ok(Args::new(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HandlerError;
    use crate::method::Outcome;

    fn get(path: &'static str) -> WebRequest {
        WebRequest::new(http::Method::GET, http::Uri::from_static(path))
    }

    #[test]
    fn plain_handler_completes_with_resolved_arguments() {
        let dispatcher = Dispatcher::builder().build();
        let handler = HandlerMethod::new("echo", |mut args| {
            let body = args.take::<String>(0)?;
            let uri = args.take::<http::Uri>(1)?;
            Ok(Value::from(format!("{} {}", uri.path(), body)))
        })
            .param::<String>()
            .param::<http::Uri>();

        match dispatcher.dispatch(&handler, get("/echo").with_body("hello")).unwrap() {
            Dispatch::Completed(value) => assert_eq!(value, Some(Value::from("/echo hello"))),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn unresolvable_parameter_is_reported() {
        let dispatcher = Dispatcher::builder().build();
        let handler = HandlerMethod::new("needs", |_| Ok(Value::Null)).param::<u64>();
        let err = dispatcher.dispatch(&handler, get("/")).unwrap_err();
        assert!(matches!(err, DispatchError::NoResolver { index: 0, type_name: "u64", .. }));
    }

    #[test]
    fn handler_error_is_wrapped_with_source() {
        let dispatcher = Dispatcher::builder().build();
        let handler = HandlerMethod::new("boom", |_| Err(HandlerError::illegal_state("boom")));
        match dispatcher.dispatch(&handler, get("/boom")) {
            Err(DispatchError::Handler { handler, source: HandlerError::IllegalState(msg) }) => {
                assert_eq!(handler, "boom");
                assert_eq!(msg, "boom");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn suspension_without_bridge_fails() {
        let dispatcher = Dispatcher::builder().build();
        let handler = HandlerMethod::suspendable("nowhere", |_| Ok(Outcome::Suspended));
        let err = dispatcher.dispatch(&handler, get("/")).unwrap_err();
        assert!(matches!(err, DispatchError::UnexpectedSuspension { .. }));
    }

    struct Answer;
    impl ArgumentResolver for Answer {
        fn supports_parameter(&self, _method: &HandlerMethod, parameter: &crate::MethodParameter) -> bool {
            parameter.parameter_type().is::<String>()
        }
        fn resolve_argument(
            &self, _method: &HandlerMethod, _parameter: &crate::MethodParameter,
            _exchange: &mut Exchange, _request: &WebRequest,
        ) -> Result<Box<dyn std::any::Any + Send>, DispatchError> {
            Ok(Box::new(String::from("42")))
        }
    }
    struct First;
    impl WebMvcConfigurer for First {
        fn add_argument_resolvers(&self, resolvers: &mut Vec<Box<dyn ArgumentResolver>>) {
            resolvers.insert(0, Box::new(Answer));
        }
    }

    #[test]
    fn configurer_can_precede_builtins() {
        let dispatcher = Dispatcher::builder().configure(&First).build();
        let handler = HandlerMethod::new("body", |mut args| Ok(Value::from(args.take::<String>(0)?)))
            .param::<String>();
        match dispatcher.dispatch(&handler, get("/").with_body("ignored")).unwrap() {
            Dispatch::Completed(value) => assert_eq!(value, Some(Value::from("42"))),
            other => panic!("unexpected {:?}", other),
        }
    }

    struct Ignore;
    impl ReturnValueHandler for Ignore {
        fn supports_return_type(&self, _method: &HandlerMethod) -> bool {
            true
        }
        fn handle_return_value(
            &self, _outcome: Outcome, _method: &HandlerMethod,
            _exchange: &mut Exchange, _request: &mut WebRequest,
        ) -> Result<(), DispatchError> {
            Ok(())
        }
    }
    struct IgnoreFirst;
    impl WebMvcConfigurer for IgnoreFirst {
        fn add_return_value_handlers(&self, handlers: &mut Vec<Box<dyn ReturnValueHandler>>) {
            handlers.insert(0, Box::new(Ignore));
        }
    }

    #[test]
    fn unhandled_return_value_is_an_error() {
        let dispatcher = Dispatcher::builder().configure(&IgnoreFirst).build();
        let handler = HandlerMethod::new("dropped", |_| Ok(Value::from("lost")));
        match dispatcher.dispatch(&handler, get("/")) {
            Err(DispatchError::Unhandled { handler }) => assert_eq!(handler, "dropped"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: DispatchConfig = serde_json::from_str(r#"{"async-timeout-ms": 250}"#).unwrap();
        assert_eq!(config.async_timeout(), Some(Duration::from_millis(250)));
        let config: DispatchConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, DispatchConfig::default());
    }
}
