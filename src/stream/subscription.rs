//! Managed stream subscription
//!
//! [`Subscription`] is the seam between the listener and the transport.
//! [`WsSubscription`] is the WebSocket implementation.

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

use super::error::{StreamError, StreamResult};

/// What a subscription yields on each receive
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// One text frame
    Text(String),
    /// The connection dropped or failed
    Interrupted(StreamError),
    /// A previously interrupted connection was reopened
    Reopened,
    /// The subscription is finished and yields nothing more
    Closed,
}

/// A push channel that can be opened, read and closed
#[async_trait]
pub trait Subscription: Send {
    /// Establish the connection
    async fn open(&mut self) -> StreamResult<()>;

    /// Wait for the next event; must be safe to cancel
    async fn recv(&mut self) -> StreamEvent;

    /// Release the connection; idempotent
    async fn close(&mut self);
}

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket subscription backed by tokio-tungstenite
pub struct WsSubscription {
    url: String,
    socket: Option<WsStream>,
}

impl WsSubscription {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            socket: None,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_open(&self) -> bool {
        self.socket.is_some()
    }

    fn validate_url(&self) -> StreamResult<()> {
        let invalid = |reason: String| StreamError::InvalidUrl {
            url: self.url.clone(),
            reason,
        };

        let parsed = reqwest::Url::parse(&self.url).map_err(|e| invalid(e.to_string()))?;
        match parsed.scheme() {
            "ws" | "wss" => Ok(()),
            other => Err(invalid(format!("unsupported scheme '{}'", other))),
        }
    }
}

#[async_trait]
impl Subscription for WsSubscription {
    async fn open(&mut self) -> StreamResult<()> {
        self.validate_url()?;
        self.close().await;

        tracing::debug!(url = %self.url, "Connecting to sentiment stream");
        let (socket, _) = connect_async(self.url.as_str())
            .await
            .map_err(|e| StreamError::Connect {
                url: self.url.clone(),
                message: e.to_string(),
            })?;

        tracing::info!(url = %self.url, "Sentiment stream connected");
        self.socket = Some(socket);
        Ok(())
    }

    async fn recv(&mut self) -> StreamEvent {
        loop {
            let Some(socket) = self.socket.as_mut() else {
                return StreamEvent::Closed;
            };

            match socket.next().await {
                Some(Ok(Message::Text(text))) => {
                    return StreamEvent::Text(text.as_str().to_owned());
                }
                Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes.to_vec()) {
                    Ok(text) => return StreamEvent::Text(text),
                    Err(_) => {
                        tracing::warn!(len = bytes.len(), "Ignoring non-UTF-8 binary frame");
                    }
                },
                Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => {}
                Some(Ok(Message::Frame(_))) => {}
                Some(Ok(Message::Close(frame))) => {
                    let reason = frame
                        .map(|f| format!("closed by server ({})", u16::from(f.code)))
                        .unwrap_or_else(|| "closed by server".to_string());
                    self.socket = None;
                    return StreamEvent::Interrupted(StreamError::Transport(reason));
                }
                Some(Err(e)) => {
                    self.socket = None;
                    return StreamEvent::Interrupted(StreamError::Transport(e.to_string()));
                }
                None => {
                    self.socket = None;
                    return StreamEvent::Interrupted(StreamError::Transport(
                        "connection ended".to_string(),
                    ));
                }
            }
        }
    }

    async fn close(&mut self) {
        if let Some(mut socket) = self.socket.take() {
            if let Err(e) = socket.close(None).await {
                tracing::debug!(error = %e, "Error while closing sentiment stream");
            }
            tracing::info!(url = %self.url, "Sentiment stream closed");
        }
    }
}
