use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::error::HandlerError;
use crate::method::Value;

pub type Completion = Result<Value, HandlerError>;

struct Inner {
    settled: AtomicBool,
    tx: flume::Sender<Completion>,
    rx: flume::Receiver<Completion>,
    timeout: Option<Duration>,
}

/// A response value that arrives later, from whichever thread settles it.
///
/// Clones share the same result. The first of `set_result`, `set_error_result`
/// or an expiry wins; anything after that is discarded and reported as `false`.
#[derive(Clone)]
pub struct DeferredResult {
    inner: Arc<Inner>,
}

impl DeferredResult {
    pub fn new() -> Self {
        Self::build(None)
    }

    /// A result that expires if nothing settles it within `timeout`,
    /// overriding the dispatcher's default.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::build(Some(timeout))
    }

    fn build(timeout: Option<Duration>) -> Self {
        let (tx, rx) = flume::bounded(1);
        DeferredResult {
            inner: Arc::new(Inner {
                settled: AtomicBool::new(false),
                tx,
                rx,
                timeout,
            }),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.inner.timeout
    }

    pub fn set_result(&self, value: Value) -> bool {
        self.settle(Ok(value))
    }

    pub fn set_error_result(&self, error: HandlerError) -> bool {
        self.settle(Err(error))
    }

    pub fn is_set_or_expired(&self) -> bool {
        self.inner.settled.load(Ordering::Acquire)
    }

    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    fn settle(&self, completion: Completion) -> bool {
        if self.inner.settled.swap(true, Ordering::AcqRel) {
            debug!(ok = completion.is_ok(), "deferred result already set or expired, discarding");
            return false;
        }
        // Capacity 1 and a single winner, so this never blocks. The receiver
        // lives in `inner` so the channel cannot be disconnected either.
        self.inner.tx.send(completion).ok();
        true
    }

    /// Mark the result expired. Returns false if it was already settled.
    pub(crate) fn expire(&self) -> bool {
        !self.inner.settled.swap(true, Ordering::AcqRel)
    }

    pub(crate) async fn recv(&self) -> Completion {
        self.inner.rx.recv_async().await
            .unwrap_or_else(|_| Err(HandlerError::illegal_state("Deferred result channel closed")))
    }

    pub(crate) fn recv_blocking(&self, timeout: Option<Duration>) -> Option<Completion> {
        match timeout {
            Some(timeout) => self.inner.rx.recv_timeout(timeout).ok(),
            None => self.inner.rx.recv().ok(),
        }
    }

    /// The settled outcome, if it has already arrived.
    pub fn try_result(&self) -> Option<Completion> {
        self.inner.rx.try_recv().ok()
    }
}

impl Default for DeferredResult {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DeferredResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeferredResult")
            .field("settled", &self.is_set_or_expired())
            .field("timeout", &self.inner.timeout)
            .finish()
    }
}
