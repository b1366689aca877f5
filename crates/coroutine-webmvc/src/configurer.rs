use webmvc::{ArgumentResolver, Dispatcher, DispatcherBuilder, ReturnValueHandler, WebMvcConfigurer};

use crate::bridge::SuspendedReturnValueHandler;
use crate::resolver::ContinuationArgumentResolver;

/// Puts the continuation resolver and the suspension bridge ahead of every
/// other component in the dispatcher's chains.
pub struct CoroutinesWebMvcConfigurer;

impl WebMvcConfigurer for CoroutinesWebMvcConfigurer {
    fn add_argument_resolvers(&self, resolvers: &mut Vec<Box<dyn ArgumentResolver>>) {
        resolvers.insert(0, Box::new(ContinuationArgumentResolver));
    }

    fn add_return_value_handlers(&self, handlers: &mut Vec<Box<dyn ReturnValueHandler>>) {
        handlers.insert(0, Box::new(SuspendedReturnValueHandler));
    }
}

/// A dispatcher builder with coroutine support registered.
pub fn dispatcher_builder() -> DispatcherBuilder {
    Dispatcher::builder().configure(&CoroutinesWebMvcConfigurer)
}
