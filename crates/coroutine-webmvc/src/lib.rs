//! Lets suspendable handlers run on the synchronous `webmvc` dispatcher.
//!
//! A suspendable handler declares a [`Continuation`] parameter. The
//! [`ContinuationArgumentResolver`] creates one per invocation, and when the
//! handler returns [`Outcome::Suspended`](webmvc::Outcome::Suspended) the
//! [`SuspendedReturnValueHandler`] keeps the exchange open until that
//! continuation is resumed.

#[allow(unused)]
#[macro_use]
extern crate tracing;

pub mod continuation;
pub mod resolver;
pub mod bridge;
pub mod launch;
#[cfg(feature = "autoconfigure")]
pub mod configurer;

pub use continuation::{Continuation, ExecutionContext, Resume};
pub use resolver::{ContinuationArgumentResolver, SuspendedCall};
pub use bridge::SuspendedReturnValueHandler;
pub use launch::{launch_unconfined, suspend_fn};
#[cfg(feature = "autoconfigure")]
pub use configurer::{dispatcher_builder, CoroutinesWebMvcConfigurer};
