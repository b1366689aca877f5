use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll, Wake, Waker};

use tokio::runtime::Handle;

use webmvc::deferred::Completion;
use webmvc::{Args, HandlerError, HandlerMethod, Outcome, ParamType};

use crate::continuation::Continuation;

type BoxFuture = Pin<Box<dyn Future<Output = Completion> + Send>>;

const IDLE: u8 = 0;
const POLLING: u8 = 1;
const NOTIFIED: u8 = 2;
const DONE: u8 = 3;

/// A future driven by its own wakeups. A wake never polls inline, since the
/// waker's caller may still hold a lock the future needs; it schedules the
/// next poll instead. Once the future is ready the continuation is resumed
/// with its output.
struct UnconfinedTask {
    state: AtomicU8,
    future: Mutex<Option<BoxFuture>>,
    continuation: Mutex<Option<Continuation>>,
    runtime: Option<Handle>,
}

impl UnconfinedTask {
    /// Poll until the future is ready or goes idle without a pending wake.
    /// The caller must have moved the state to `POLLING`.
    fn run(self: &Arc<Self>) -> Option<Completion> {
        let waker = Waker::from(Arc::clone(self));
        let mut cx = Context::from_waker(&waker);
        loop {
            let mut slot = self.future.lock().unwrap_or_else(PoisonError::into_inner);
            let future = slot.as_mut()?;
            let completion = match catch_unwind(AssertUnwindSafe(|| future.as_mut().poll(&mut cx))) {
                Ok(Poll::Pending) => None,
                Ok(Poll::Ready(completion)) => Some(completion),
                Err(_) => {
                    error!("suspended handler panicked while being resumed");
                    Some(Err(HandlerError::illegal_state("Suspended handler panicked")))
                }
            };
            if let Some(completion) = completion {
                *slot = None;
                self.state.store(DONE, Ordering::Release);
                return Some(completion);
            }
            drop(slot);

            // A wake that arrived mid-poll leaves NOTIFIED behind; poll again.
            if self.state.compare_exchange(POLLING, IDLE, Ordering::AcqRel, Ordering::Acquire).is_ok() {
                return None;
            }
            self.state.store(POLLING, Ordering::Release);
        }
    }

    /// Poll after a wake and resume the continuation if the future finished.
    fn drive(self: &Arc<Self>) {
        if let Some(completion) = self.run() {
            if let Some(continuation) = self.take_continuation() {
                continuation.resume_with(completion);
            }
        }
    }

    /// Run `drive` outside of the waker's caller: on the runtime the handler
    /// was launched from, or on a short-lived thread when there was none.
    fn schedule(self: Arc<Self>) {
        match self.runtime.clone() {
            Some(runtime) => {
                runtime.spawn(async move { self.drive() });
            }
            None => {
                let spawned = std::thread::Builder::new()
                    .name("unconfined-resume".into())
                    .spawn(move || self.drive());
                if let Err(e) = spawned {
                    error!("could not start a thread to resume a suspended handler: {}", e);
                }
            }
        }
    }

    fn take_continuation(&self) -> Option<Continuation> {
        self.continuation.lock().unwrap_or_else(PoisonError::into_inner).take()
    }
}

impl Wake for UnconfinedTask {
    fn wake(self: Arc<Self>) {
        let mut state = self.state.load(Ordering::Acquire);
        loop {
            let next = match state {
                IDLE => POLLING,
                POLLING => NOTIFIED,
                _ => return,
            };
            match self.state.compare_exchange_weak(state, next, Ordering::AcqRel, Ordering::Acquire) {
                Ok(_) => break,
                Err(actual) => state = actual,
            }
        }
        if state == IDLE {
            self.schedule();
        }
    }

    fn wake_by_ref(self: &Arc<Self>) {
        Arc::clone(self).wake()
    }
}

/// Start `future` on the calling thread with `continuation` as its completion.
///
/// If the first poll finishes, the outcome is returned directly and the
/// continuation is never used; an error is then a synchronous handler failure.
/// Otherwise the handler has suspended. Each later wake schedules a poll on
/// the tokio runtime current at launch, or on a fresh thread outside of one,
/// and the poll that finishes the future resumes the continuation.
pub fn launch_unconfined<F>(future: F, continuation: Continuation) -> Result<Outcome, HandlerError>
    where F: Future<Output = Completion> + Send + 'static
{
    let task = Arc::new(UnconfinedTask {
        state: AtomicU8::new(POLLING),
        future: Mutex::new(Some(Box::pin(future))),
        continuation: Mutex::new(Some(continuation)),
        runtime: Handle::try_current().ok(),
    });

    match task.run() {
        Some(completion) => {
            if let Some(continuation) = task.take_continuation() {
                continuation.discard();
            }
            completion.map(Outcome::Completed)
        }
        None => Ok(Outcome::Suspended),
    }
}

/// Build a suspendable handler from an async function.
///
/// `params` are the handler's own parameters; the continuation is appended
/// as the last one and is not passed to `f`.
pub fn suspend_fn<F, Fut>(name: &str, params: &[ParamType], f: F) -> HandlerMethod
    where
        F: Fn(Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Completion> + Send + 'static,
{
    let continuation_index = params.len();
    let method = HandlerMethod::suspendable(name, move |mut args| {
        let continuation = args.take::<Continuation>(continuation_index)?;
        launch_unconfined(f(args), continuation)
    });
    params.iter()
        .fold(method, |method, ty| method.param_type(*ty))
        .param::<Continuation>()
}
