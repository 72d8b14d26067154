//! WebSocket client transport.
//!
//! Each connection spawns a tokio task that handles:
//!
//! - The opening handshake (`connect_async`)
//! - Incoming text frames, forwarded to the [`EventSink`]
//! - Outgoing frames and the close request from the [`TransportHandle`]
//!
//! The task is the only emitter for its sink, so events are serial.

// ============================================================================
// Imports
// ============================================================================

use futures_util::{SinkExt, StreamExt};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, trace, warn};
use url::Url;

use crate::error::{Error, Result};

use super::{EventSink, Transport, TransportHandle};

// ============================================================================
// TransportCommand
// ============================================================================

/// Internal commands for the connection task.
enum TransportCommand {
    /// Write a text frame.
    Send(String),
    /// Close the connection.
    Close,
}

// ============================================================================
// WebSocketTransport
// ============================================================================

/// Default [`Transport`] backed by `tokio-tungstenite`.
///
/// Must be used from within a tokio runtime.
#[derive(Debug, Default, Clone, Copy)]
pub struct WebSocketTransport;

impl WebSocketTransport {
    /// Creates a WebSocket transport.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Transport for WebSocketTransport {
    fn connect(&self, url: &Url, sink: EventSink) -> Result<Box<dyn TransportHandle>> {
        let runtime = Handle::try_current()
            .map_err(|e| Error::connection(format!("no tokio runtime available: {e}")))?;

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        runtime.spawn(run_connection(url.to_string(), command_rx, sink));

        Ok(Box::new(WebSocketHandle { command_tx }))
    }
}

// ============================================================================
// WebSocketHandle
// ============================================================================

/// Handle to a connection task.
struct WebSocketHandle {
    command_tx: mpsc::UnboundedSender<TransportCommand>,
}

impl TransportHandle for WebSocketHandle {
    fn send(&self, text: String) -> Result<()> {
        self.command_tx
            .send(TransportCommand::Send(text))
            .map_err(|_| Error::ConnectionClosed)
    }

    fn close(&self) {
        let _ = self.command_tx.send(TransportCommand::Close);
    }
}

// ============================================================================
// Connection Task
// ============================================================================

/// Connects, then pumps frames until either side closes.
async fn run_connection(
    url: String,
    mut command_rx: mpsc::UnboundedReceiver<TransportCommand>,
    sink: EventSink,
) {
    debug!(%url, "Connecting");

    let connect = connect_async(url.clone());
    tokio::pin!(connect);

    // Frames handed over before the handshake finished.
    let mut early = Vec::new();

    let ws_stream = loop {
        tokio::select! {
            result = &mut connect => {
                match result {
                    Ok((stream, _response)) => break stream,
                    Err(e) => {
                        warn!(%url, error = %e, "WebSocket connect failed");
                        sink.error(Error::from(e).to_string());
                        return;
                    }
                }
            }

            command = command_rx.recv() => {
                match command {
                    Some(TransportCommand::Send(text)) => early.push(text),
                    Some(TransportCommand::Close) | None => {
                        debug!(%url, "Connect aborted");
                        return;
                    }
                }
            }
        }
    };

    info!(%url, "WebSocket connection established");

    let (mut ws_write, mut ws_read) = ws_stream.split();

    for text in early {
        if let Err(e) = ws_write.send(Message::Text(text.into())).await {
            warn!(error = %e, "Failed to send frame");
            sink.error(Error::from(e).to_string());
            return;
        }
    }

    sink.open();

    loop {
        tokio::select! {
            // Incoming frames from the peer
            message = ws_read.next() => {
                match message {
                    Some(Ok(Message::Text(text))) => {
                        trace!(len = text.len(), "Frame received");
                        sink.message(text.as_str());
                    }

                    Some(Ok(Message::Close(_))) => {
                        debug!("WebSocket closed by remote");
                        sink.close();
                        break;
                    }

                    Some(Err(e)) => {
                        warn!(error = %e, "WebSocket error");
                        sink.error(Error::from(e).to_string());
                        break;
                    }

                    None => {
                        debug!("WebSocket stream ended");
                        sink.close();
                        break;
                    }

                    // Ignore Binary, Ping, Pong
                    _ => {}
                }
            }

            // Commands from the client
            command = command_rx.recv() => {
                match command {
                    Some(TransportCommand::Send(text)) => {
                        if let Err(e) = ws_write.send(Message::Text(text.into())).await {
                            warn!(error = %e, "Failed to send frame");
                            sink.error(Error::from(e).to_string());
                            break;
                        }
                        trace!("Frame sent");
                    }

                    Some(TransportCommand::Close) | None => {
                        debug!("Close requested");
                        let _ = ws_write.close().await;
                        break;
                    }
                }
            }
        }
    }

    info!(%url, "WebSocket connection terminated");
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use tokio::net::TcpListener;
    use tokio::time::timeout;

    use crate::transport::TransportEvent;

    fn channel_sink() -> (EventSink, mpsc::UnboundedReceiver<TransportEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = EventSink::new(move |event| {
            let _ = tx.send(event);
        });
        (sink, rx)
    }

    async fn next_event(rx: &mut mpsc::UnboundedReceiver<TransportEvent>) -> TransportEvent {
        timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("event within timeout")
            .expect("sink alive")
    }

    #[test]
    fn test_connect_outside_runtime_fails() {
        let url = Url::parse("ws://127.0.0.1:9").expect("url");
        let (sink, _rx) = channel_sink();

        let result = WebSocketTransport::new().connect(&url, sink);
        assert!(matches!(result, Err(Error::Connection { .. })));
    }

    #[tokio::test]
    async fn test_connect_refused_emits_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("addr").port();
        drop(listener);

        let url = Url::parse(&format!("ws://127.0.0.1:{port}")).expect("url");
        let (sink, mut rx) = channel_sink();
        let _handle = WebSocketTransport::new().connect(&url, sink).expect("connect");

        match next_event(&mut rx).await {
            TransportEvent::Error(message) => {
                assert!(message.starts_with("WebSocket error:"), "{message}");
            }
            other => panic!("expected error event, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_open_send_receive_close() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("addr").port();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.expect("accept");
            let mut ws = tokio_tungstenite::accept_async(stream).await.expect("upgrade");

            // Echo one frame, then close.
            if let Some(Ok(Message::Text(text))) = ws.next().await {
                ws.send(Message::Text(text)).await.expect("echo");
            }
            ws.close(None).await.expect("close");
        });

        let url = Url::parse(&format!("ws://127.0.0.1:{port}")).expect("url");
        let (sink, mut rx) = channel_sink();
        let handle = WebSocketTransport::new().connect(&url, sink).expect("connect");

        assert_eq!(next_event(&mut rx).await, TransportEvent::Open);

        tokio_test::assert_ok!(handle.send("hello".to_string()));
        assert_eq!(
            next_event(&mut rx).await,
            TransportEvent::Message("hello".to_string())
        );
        assert_eq!(next_event(&mut rx).await, TransportEvent::Close);

        server.await.expect("server task");
    }

    #[tokio::test]
    async fn test_send_after_task_exit_fails() {
        let url = Url::parse("ws://127.0.0.1:9").expect("url");
        let (sink, _rx) = channel_sink();
        let handle = WebSocketTransport::new().connect(&url, sink).expect("connect");

        handle.close();
        // Give the task a chance to observe the close and drop its receiver.
        tokio::time::sleep(Duration::from_millis(50)).await;

        let err = tokio_test::assert_err!(handle.send("late".to_string()));
        assert!(matches!(err, Error::ConnectionClosed));
    }
}
