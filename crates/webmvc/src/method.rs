use std::any::{Any, TypeId};
use std::sync::Arc;

use crate::error::HandlerError;

pub type Value = serde_json::Value;

/// What a handler invocation produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The handler finished on the calling thread with a value.
    Completed(Value),
    /// The handler handed its continuation to someone else and will finish later.
    Suspended,
}

impl Outcome {
    pub fn is_suspended(&self) -> bool {
        matches!(self, Outcome::Suspended)
    }
}

/// Declared type of a handler parameter.
#[derive(Debug, Clone, Copy)]
pub struct ParamType {
    id: TypeId,
    name: &'static str,
}

impl ParamType {
    pub fn of<T: ?Sized + 'static>() -> Self {
        ParamType {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ParamType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for ParamType {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodParameter {
    index: usize,
    parameter_type: ParamType,
}

impl MethodParameter {
    pub fn new(index: usize, parameter_type: ParamType) -> Self {
        MethodParameter { index, parameter_type }
    }
    pub fn index(&self) -> usize {
        self.index
    }
    pub fn parameter_type(&self) -> &ParamType {
        &self.parameter_type
    }
}

/// Resolved arguments, in parameter order.
#[derive(Default)]
pub struct Args {
    values: Vec<Option<Box<dyn Any + Send>>>,
}

impl Args {
    pub fn new(values: Vec<Box<dyn Any + Send>>) -> Self {
        Args {
            values: values.into_iter().map(Some).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Move the argument at `index` out, downcasting it to `T`.
    pub fn take<T: Any>(&mut self, index: usize) -> Result<T, HandlerError> {
        let value = self.values.get_mut(index)
            .and_then(Option::take)
            .ok_or_else(|| HandlerError::illegal_argument(format!("Argument {} is missing or was already taken", index)))?;
        value.downcast::<T>()
            .map(|value| *value)
            .map_err(|_| HandlerError::illegal_argument(format!(
                "Argument {} is not a {}", index, std::any::type_name::<T>()
            )))
    }
}

impl std::fmt::Debug for Args {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Args").field("len", &self.values.len()).finish()
    }
}

type Invoker = dyn Fn(Args) -> Result<Outcome, HandlerError> + Send + Sync;

/// A handler together with what the dispatcher needs to know to call it.
#[derive(Clone)]
pub struct HandlerMethod {
    name: Arc<str>,
    suspendable: bool,
    parameters: Vec<MethodParameter>,
    invoker: Arc<Invoker>,
}

impl HandlerMethod {
    /// A handler that always completes on the calling thread.
    pub fn new<F>(name: &str, f: F) -> Self
        where F: Fn(Args) -> Result<Value, HandlerError> + Send + Sync + 'static
    {
        Self::build(name, false, Arc::new(move |args: Args| f(args).map(Outcome::Completed)))
    }

    /// A handler that may return [`Outcome::Suspended`] and finish later through a continuation.
    pub fn suspendable<F>(name: &str, f: F) -> Self
        where F: Fn(Args) -> Result<Outcome, HandlerError> + Send + Sync + 'static
    {
        Self::build(name, true, Arc::new(f))
    }

    fn build(name: &str, suspendable: bool, invoker: Arc<Invoker>) -> Self {
        HandlerMethod {
            name: name.into(),
            suspendable,
            parameters: Vec::new(),
            invoker,
        }
    }

    /// Declare the next parameter.
    pub fn param<T: ?Sized + 'static>(self) -> Self {
        self.param_type(ParamType::of::<T>())
    }

    pub fn param_type(mut self, parameter_type: ParamType) -> Self {
        let index = self.parameters.len();
        self.parameters.push(MethodParameter::new(index, parameter_type));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn is_suspend(&self) -> bool {
        self.suspendable
    }
    pub fn parameters(&self) -> &[MethodParameter] {
        &self.parameters
    }

    pub fn invoke(&self, args: Args) -> Result<Outcome, HandlerError> {
        (self.invoker)(args)
    }
}

impl std::fmt::Debug for HandlerMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerMethod")
            .field("name", &self.name)
            .field("suspendable", &self.suspendable)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_types_compare_by_type() {
        let ty = ParamType::of::<String>();
        assert!(ty.is::<String>());
        assert!(!ty.is::<&'static str>());
        assert_eq!(ty, ParamType::of::<String>());
        assert_eq!(ty.name(), "alloc::string::String");
    }

    #[test]
    fn parameters_are_indexed_in_declaration_order() {
        let method = HandlerMethod::new("pair", |_| Ok(Value::Null))
            .param::<String>()
            .param::<u32>();
        let indices: Vec<_> = method.parameters().iter().map(|p| p.index()).collect();
        assert_eq!(indices, [0, 1]);
        assert!(method.parameters()[1].parameter_type().is::<u32>());
        assert!(!method.is_suspend());
    }

    #[test]
    fn args_take_moves_value_out_once() {
        let values: Vec<Box<dyn Any + Send>> = vec![Box::new(String::from("body")), Box::new(7u32)];
        let mut args = Args::new(values);
        assert_eq!(args.take::<String>(0).unwrap(), "body");
        assert!(matches!(args.take::<String>(0), Err(HandlerError::IllegalArgument(_))));
        assert!(matches!(args.take::<String>(1), Err(HandlerError::IllegalArgument(_))));
        assert!(matches!(args.take::<u32>(5), Err(HandlerError::IllegalArgument(_))));
    }

    #[test]
    fn plain_handler_always_completes() {
        let method = HandlerMethod::new("echo", |mut args| Ok(Value::String(args.take::<String>(0)?)))
            .param::<String>();
        let values: Vec<Box<dyn Any + Send>> = vec![Box::new(String::from("hi"))];
        let outcome = method.invoke(Args::new(values)).unwrap();
        assert_eq!(outcome, Outcome::Completed(Value::from("hi")));
    }
}
