//! WebSocket listener built on `tokio-tungstenite`.

use std::sync::atomic::{AtomicU64, Ordering};

use livequiz_protocol::ConnectionId;
use tokio::net::{TcpListener, TcpStream};

/// Counter for generating unique connection identities.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

pub(crate) type WsStream = tokio_tungstenite::WebSocketStream<TcpStream>;

/// Errors at the socket layer.
#[derive(Debug, thiserror::Error)]
pub enum NetError {
    #[error("failed to bind listener: {0}")]
    Bind(std::io::Error),

    #[error("failed to accept connection: {0}")]
    Accept(std::io::Error),

    #[error("websocket handshake failed: {0}")]
    Handshake(tokio_tungstenite::tungstenite::Error),
}

/// Listens for WebSocket connections and upgrades them.
pub(crate) struct WsListener {
    listener: TcpListener,
}

impl WsListener {
    pub(crate) async fn bind(addr: &str) -> Result<Self, NetError> {
        let listener = TcpListener::bind(addr).await.map_err(NetError::Bind)?;
        tracing::info!(addr, "websocket listener bound");
        Ok(Self { listener })
    }

    pub(crate) fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts one TCP connection and completes the WebSocket upgrade.
    pub(crate) async fn accept(&self) -> Result<(ConnectionId, WsStream), NetError> {
        let (stream, addr) = self.listener.accept().await.map_err(NetError::Accept)?;

        let ws = tokio_tungstenite::accept_async(stream)
            .await
            .map_err(NetError::Handshake)?;

        let id = ConnectionId(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(conn = %id, %addr, "accepted websocket connection");

        Ok((id, ws))
    }
}
