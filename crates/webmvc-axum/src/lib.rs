#[allow(unused)]
#[macro_use]
extern crate tracing;

pub mod layers;
pub mod render;
pub mod routing;
pub mod server;

pub use render::MvcError;
