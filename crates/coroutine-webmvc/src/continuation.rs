use webmvc::deferred::Completion;
use webmvc::{DeferredResult, HandlerError, Value};

/// Where a continuation runs the work that follows its resumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionContext {
    /// Synchronously on whichever thread resumes it, no hand-off to an executor.
    Unconfined,
}

/// The remainder of a suspended handler.
///
/// Resuming consumes the continuation, so it completes at most once.
pub trait Resume: Send {
    fn context(&self) -> ExecutionContext;
    fn resume(self: Box<Self>, value: Value);
    fn resume_with_error(self: Box<Self>, error: HandlerError);
}

/// Continuation handed to suspendable handlers. Resuming it settles the
/// deferred result that keeps the request's exchange open.
///
/// A continuation dropped without being resumed fails its result, so an
/// abandoned exchange ends in an error response instead of waiting forever.
#[derive(Debug)]
pub struct Continuation {
    result: DeferredResult,
    resumed: bool,
}

impl Continuation {
    pub fn new() -> Self {
        Self::with_result(DeferredResult::new())
    }

    /// Bind to an existing result, e.g. one carrying its own timeout.
    pub fn with_result(result: DeferredResult) -> Self {
        Continuation { result, resumed: false }
    }

    pub fn deferred_result(&self) -> &DeferredResult {
        &self.result
    }

    pub fn context(&self) -> ExecutionContext {
        ExecutionContext::Unconfined
    }

    pub fn resume(self, value: impl Into<Value>) {
        self.resume_with(Ok(value.into()))
    }

    pub fn resume_with_error(self, error: impl Into<HandlerError>) {
        self.resume_with(Err(error.into()))
    }

    pub fn resume_with(mut self, completion: Completion) {
        self.resumed = true;
        let ok = completion.is_ok();
        let settled = match completion {
            Ok(value) => self.result.set_result(value),
            Err(error) => self.result.set_error_result(error),
        };
        if settled {
            trace!(ok, "continuation resumed");
        } else {
            debug!(ok, "continuation resumed after its result expired");
        }
    }

    /// Give the continuation up without settling its result, for handlers
    /// that finished before they suspended.
    pub(crate) fn discard(mut self) {
        self.resumed = true;
    }
}

impl Default for Continuation {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Continuation {
    fn drop(&mut self) {
        if !self.resumed && self.result.set_error_result(HandlerError::illegal_state("Continuation dropped without being resumed")) {
            trace!("continuation dropped without being resumed");
        }
    }
}

impl Resume for Continuation {
    fn context(&self) -> ExecutionContext {
        Continuation::context(self)
    }
    fn resume(self: Box<Self>, value: Value) {
        Continuation::resume(*self, value)
    }
    fn resume_with_error(self: Box<Self>, error: HandlerError) {
        Continuation::resume_with_error(*self, error)
    }
}
