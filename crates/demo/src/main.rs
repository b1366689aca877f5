#[allow(unused)]
#[macro_use]
extern crate tracing;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio_util::sync::CancellationToken;

use coroutine_webmvc::{dispatcher_builder, suspend_fn, Continuation};
use webmvc::args::{parse_args, parse_number, parse_param, ArgError};
use webmvc::{instrument, DispatchConfig, Dispatcher, HandlerError, HandlerMethod, Outcome, ParamType, Value};
use webmvc_axum::{layers, routing, server};

struct Options {
    bind: SocketAddr,
    config: DispatchConfig,
}

fn parse_options() -> Result<Option<Options>, anyhow::Error> {
    let mut bind = SocketAddr::from(([127, 0, 0, 1], 8080));
    let mut config = DispatchConfig::default();

    let res = parse_args(
        std::env::args(),
        |flag, inline, args, arg0| -> Result<_, anyhow::Error> {
            match flag {
                "bind" => bind = parse_param(flag, args, inline)?.parse()?,
                "async-timeout" => config.async_timeout_ms = Some(parse_number(flag, args, inline)?),
                "config" => {
                    let path = parse_param(flag, args, inline)?;
                    config = serde_json::from_str(&fs_err::read_to_string(path)?)?;
                }
                "h" | "help" => {
                    println!("usage: {} [-bind=ADDR] [-async-timeout=MS] [-config=FILE.json]", arg0);
                    return Ok(None);
                }
                _ => return Err(ArgError::UnknownFlag(flag.into()).into()),
            }
            Ok(Some(()))
        },
        |_, arg| Err(ArgError::UnexpectedPositional(arg).into()),
    )?;

    Ok(res.map(|()| Options { bind, config }))
}

fn parse_delay(body: &str) -> Result<Duration, HandlerError> {
    let body = body.trim();
    if body.is_empty() {
        return Ok(Duration::from_millis(5));
    }
    body.parse().map(Duration::from_millis)
        .map_err(|_| HandlerError::illegal_argument(format!("Expected a delay in milliseconds, got {:?}", body)))
}

fn routes(dispatcher: Arc<Dispatcher>) -> Router {
    let hello = HandlerMethod::new("hello", |_| Ok(Value::from("hello")));

    // Hands its continuation to a plain thread.
    let delayed = HandlerMethod::suspendable("delayed", |mut args| {
        let delay = parse_delay(&args.take::<String>(0)?)?;
        let continuation = args.take::<Continuation>(1)?;
        std::thread::spawn(move || {
            std::thread::sleep(delay);
            continuation.resume("ok");
        });
        Ok(Outcome::Suspended)
    })
        .param::<String>()
        .param::<Continuation>();

    let sleep = suspend_fn("sleep", &[ParamType::of::<String>()], |mut args| async move {
        let delay = parse_delay(&args.take::<String>(0)?)?;
        tokio::time::sleep(delay).await;
        Ok(serde_json::json!({ "slept_ms": delay.as_millis() as u64 }))
    });

    let boom = suspend_fn("boom", &[], |_| async {
        tokio::time::sleep(Duration::from_millis(5)).await;
        Err(HandlerError::illegal_state("boom"))
    });

    Router::new()
        .route("/hello", routing::get(dispatcher.clone(), hello))
        .route("/delayed", routing::post(dispatcher.clone(), delayed))
        .route("/sleep", routing::post(dispatcher.clone(), sleep))
        .route("/boom", routing::get(dispatcher, boom))
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let Some(options) = parse_options()? else {
        return Ok(());
    };
    webmvc::log::setup_logger("demo")?;

    let dispatcher = Arc::new(dispatcher_builder().config(options.config).build());
    let app = layers::with_layers(routes(dispatcher));

    let cancel = CancellationToken::new();
    let signals = cancel.clone();
    tokio::spawn(instrument!("signal task"; async move {
        if let Err(e) = webmvc::shutdown::cancel_on_signal(signals).await {
            error!("Could not listen for shutdown signals: {}", e);
        }
    }));

    server::run_server(cancel, options.bind, app).await?;
    info!("Exiting");
    Ok(())
}
