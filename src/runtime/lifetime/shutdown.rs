use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// 等待 Ctrl+C，收到后取消正在运行的批处理
pub async fn listen_for_shutdown(token: CancellationToken) {
    if let Err(e) = signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        return;
    }
    warn!("Shutdown signal received, cancelling running batch...");
    token.cancel();
}
