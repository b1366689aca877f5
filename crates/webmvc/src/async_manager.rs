use std::time::Duration;

use crate::deferred::{Completion, DeferredResult};
use crate::error::{DispatchError, HandlerError};

/// Tracks whether the current request went asynchronous, and on what.
#[derive(Debug, Default)]
pub struct WebAsyncManager {
    concurrent: Option<DeferredResult>,
    default_timeout: Option<Duration>,
}

impl WebAsyncManager {
    /// Keep the exchange open until `result` is settled.
    pub fn start_deferred_result_processing(&mut self, result: DeferredResult) -> Result<(), DispatchError> {
        if self.concurrent.is_some() {
            return Err(DispatchError::AsyncAlreadyStarted);
        }
        debug!(timeout = ?result.timeout().or(self.default_timeout), "starting deferred result processing");
        self.concurrent = Some(result);
        Ok(())
    }

    pub fn is_concurrent_handling_started(&self) -> bool {
        self.concurrent.is_some()
    }

    pub fn concurrent_result(&self) -> Option<&DeferredResult> {
        self.concurrent.as_ref()
    }

    pub fn set_default_timeout(&mut self, timeout: Option<Duration>) {
        self.default_timeout = timeout;
    }

    pub fn into_pending(self) -> Option<PendingResponse> {
        let default_timeout = self.default_timeout;
        self.concurrent.map(|result| PendingResponse {
            timeout: result.timeout().or(default_timeout),
            result,
        })
    }
}

/// A registered deferred result together with how long to wait for it.
#[derive(Debug)]
pub struct PendingResponse {
    result: DeferredResult,
    timeout: Option<Duration>,
}

impl PendingResponse {
    pub fn result(&self) -> &DeferredResult {
        &self.result
    }
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub async fn wait(self) -> Completion {
        let Some(timeout) = self.timeout else {
            return self.result.recv().await;
        };
        match tokio::time::timeout(timeout, self.result.recv()).await {
            Ok(completion) => completion,
            Err(_) if self.result.expire() => {
                warn!(timeout_ms = timeout.as_millis() as u64, "deferred result expired");
                Err(HandlerError::AsyncTimeout)
            }
            // Settled between the timer firing and the expiry; the value is on its way.
            Err(_) => self.result.recv().await,
        }
    }

    pub fn wait_blocking(self) -> Completion {
        if let Some(completion) = self.result.recv_blocking(self.timeout) {
            return completion;
        }
        if self.result.expire() {
            warn!(timeout = ?self.timeout, "deferred result expired");
            return Err(HandlerError::AsyncTimeout);
        }
        self.result.recv_blocking(None)
            .unwrap_or_else(|| Err(HandlerError::illegal_state("Deferred result channel closed")))
    }
}
