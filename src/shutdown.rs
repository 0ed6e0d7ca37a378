use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;

/// Cancel the returned token on SIGTERM or SIGINT.
///
/// The solver server drains on this token: the listener closes and in-flight
/// runs are allowed to finish their current search.
pub fn install_shutdown_handler() -> std::io::Result<CancellationToken> {
    let token = CancellationToken::new();
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = sigterm.recv() => {
                tracing::info!("Received SIGTERM, shutting down solver server");
            }
            _ = sigint.recv() => {
                tracing::info!("Received SIGINT, shutting down solver server");
            }
        }
        trigger.cancel();
    });

    Ok(token)
}
