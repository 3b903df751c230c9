/// Session-manager failure.
#[derive(Debug, thiserror::Error)]
pub enum WsError {
    #[error("websocket connect timed out")]
    ConnectTimeout,
    #[error("server did not upgrade the connection (HTTP {0})")]
    UpgradeFailed(u16),
    #[error(transparent)]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),
}
