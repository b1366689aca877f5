use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;

/// Cancel `cancel` on the first SIGINT or SIGTERM, or when it is cancelled elsewhere.
pub async fn cancel_on_signal(cancel: CancellationToken) -> Result<(), std::io::Error> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    let msg = tokio::select! {
        _ = sigint.recv()  => "Received SIGINT",
        _ = sigterm.recv() => "Received SIGTERM",
        _ = cancel.cancelled() => return Ok(()),
    };
    warn!("{msg}, starting shutdown");
    cancel.cancel();
    Ok(())
}
