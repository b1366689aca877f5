use axum::Router;

use webmvc::instrument;

use std::net::SocketAddr;
use std::time::Duration;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(8);

/// Serve `app` on `bind` until `cancel` fires, then drain in-flight
/// requests, including ones waiting on a deferred result, for a grace period.
pub async fn run_server(
    cancel: tokio_util::sync::CancellationToken,
    bind: SocketAddr,
    app: Router,
) -> Result<(), std::io::Error> {
    let handle = axum_server::Handle::new();

    let shutdown = handle.clone();
    tokio::task::spawn(instrument!("shutdown task"; async move {
        cancel.cancelled().await;

        info!("Attempting graceful webserver shutdown with {}s timeout", SHUTDOWN_GRACE.as_secs_f32());
        shutdown.graceful_shutdown(Some(SHUTDOWN_GRACE));
    }));

    info!("web server listening on {}", bind);
    axum_server::bind(bind)
        .handle(handle)
        .serve(app.into_make_service_with_connect_info::<SocketAddr>())
        .await?;
    Ok(())
}
