#[allow(unused)]
#[macro_use]
extern crate tracing;

pub mod args;
pub mod utils;
pub mod log;
pub mod shutdown;

pub mod error;
pub mod method;
pub mod request;
pub mod resolve;
pub mod returns;
pub mod deferred;
pub mod async_manager;
pub mod dispatch;

pub use error::{DispatchError, HandlerError};
pub use method::{Args, HandlerMethod, MethodParameter, Outcome, ParamType, Value};
pub use request::{Exchange, WebRequest};
pub use resolve::ArgumentResolver;
pub use returns::{AsyncReturnValueHandler, ReturnValueHandler};
pub use deferred::DeferredResult;
pub use async_manager::{PendingResponse, WebAsyncManager};
pub use dispatch::{Dispatch, DispatchConfig, Dispatcher, DispatcherBuilder, WebMvcConfigurer};
