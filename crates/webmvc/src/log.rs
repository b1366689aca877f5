use tracing_subscriber::filter::Targets;
use tracing_subscriber::registry::Registry;
use tracing_subscriber::layer::{Layer, SubscriberExt};


#[inline]
pub async fn instrument<F, O>(span: tracing::Span, f: F) -> O where F: std::future::Future<Output = O> {
    use tracing::Instrument;
    f.instrument(span).await
}

/// `instrument!("name", field = value; future)` runs the future inside an info span.
#[macro_export]
macro_rules! instrument {
    ($name:expr; $future:expr) => {
        $crate::instrument!(@ [$name] [] ; $future)
    };
    ($name:expr, $($tt:tt)*) => {
        $crate::instrument!(@ [$name] [] $($tt)*)
    };
    (@ [$name:expr] [$($captured:tt)*]) => {
        compile_error!("missing semicolon, needs future to instrument")
    };
    (@ [$name:expr] [$($captured:tt)*] ; $($rest:tt)*) => {
        $crate::log::instrument(::tracing::info_span!($name, $($captured)*).or_current(), $($rest)*)
    };
    (@ [$name:expr] [$($captured:tt)*] $next:tt $($rest:tt)*) => {
        $crate::instrument!(@ [$name] [$($captured)* $next] $($rest)*)
    };
}


#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    #[error("Error parsing RUST_LOG env var into targets specifier")]
    InvalidLogEnv(#[source] tracing_subscriber::filter::ParseError),
    #[error("Setting tracing listener failed (setup_logger called twice?)")]
    SetFailed(#[source] tracing::subscriber::SetGlobalDefaultError),
}

pub fn default_targets(crate_name: &str) -> String {
    format!("{}=trace,webmvc=debug,webmvc_axum=debug,coroutine_webmvc=debug,tower_http=debug,warn", crate_name)
}

pub fn setup_logger(crate_name: &'static str) -> Result<(), LoggerError> {
    let env_targets = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| default_targets(crate_name));
    let env_filter = env_targets.parse::<Targets>().map_err(LoggerError::InvalidLogEnv)?;

    let subscriber = Registry::default()
        .with(tracing_tree::HierarchicalLayer::new(2)
            .with_targets(true)
            .with_bracketed_fields(true)
            .with_filter(env_filter)
        );

    tracing::subscriber::set_global_default(subscriber)
        .map_err(LoggerError::SetFailed)?;

    Ok(())
}
