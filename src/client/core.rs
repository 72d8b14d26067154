//! Channel client.
//!
//! A [`Client`] owns one transport connection to one peer and multiplexes
//! named channels over it.
//!
//! # Lifecycle
//!
//! 1. [`Client::open`] / [`ClientBuilder::build`] - validate and create
//! 2. [`Client::start`] - begin connecting (automatic unless `auto_start` is off)
//! 3. Transport opens - status becomes `Connected`, buffered sends flush
//! 4. [`Client::close`] or peer loss - status returns to `Disconnected`
//!
//! A disconnected client can be started again; handlers stay registered.
//!
//! # Callbacks
//!
//! Channel handlers and lifecycle observers run on the thread that delivered
//! the transport event (the connection task for the WebSocket transport),
//! after the client's lock has been released. They may call any client
//! method, including [`on`](Client::on), [`release`](Client::release),
//! [`send`](Client::send) and [`close`](Client::close).
//!
//! A handler that refers back to its client should capture a [`WeakClient`]
//! from [`Client::downgrade`]. A captured [`Client`] lives in the client's
//! own handler registry, so the last external handle going away would no
//! longer close the transport.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, trace, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::identifiers::{ChannelName, ConnectionId};
use crate::protocol::{Envelope, TextCodec};
use crate::transport::{EventSink, Transport, TransportEvent, TransportHandle};

use super::buffer::OutboundBuffer;
use super::builder::ClientBuilder;
use super::dispatch::{Dispatcher, Route};
use super::options::ClientOptions;
use super::registry::{Handler, HandlerRegistry};
use super::status::{Status, StatusTracker};

// ============================================================================
// Types
// ============================================================================

/// Observer for open, disconnect and close lifecycle events.
pub type LifecycleHandler = Arc<dyn Fn() + Send + Sync>;

/// Observer for transport errors. Receives the transport's description.
pub type ErrorHandler = Arc<dyn Fn(&str) + Send + Sync>;

/// Registered lifecycle observers.
#[derive(Default)]
struct Observers {
    /// Transport opened.
    open: Option<LifecycleHandler>,
    /// Transport reported an error.
    error: Option<ErrorHandler>,
    /// Peer closed an open connection.
    disconnect: Option<LifecycleHandler>,
    /// `close()` completed.
    close: Option<LifecycleHandler>,
}

/// Internal shared state for a client.
struct ClientInner {
    /// Peer URL.
    url: Url,
    /// Connection factory.
    transport: Arc<dyn Transport>,
    /// Framing for outbound text.
    outbound_codec: TextCodec,
    /// Inbound decoding and routing.
    dispatcher: Dispatcher,
    /// Keep the buffer on `close()`.
    persist_buffer: bool,
    status: StatusTracker,
    buffer: OutboundBuffer,
    registry: HandlerRegistry,
    observers: Observers,
    /// Handle of the live connection, if any.
    handle: Option<Box<dyn TransportHandle>>,
    /// Connection whose events are currently accepted.
    active: Option<ConnectionId>,
    /// Last id handed out by `start()`.
    last_connection: ConnectionId,
}

// ============================================================================
// ClientInner
// ============================================================================

impl ClientInner {
    fn new(url: Url, options: ClientOptions) -> Self {
        Self {
            url,
            transport: options.transport,
            outbound_codec: options.outbound_codec,
            dispatcher: Dispatcher::new(options.inbound_codec, options.debug_logging),
            persist_buffer: options.persist_buffer_across_reconnect,
            status: StatusTracker::default(),
            buffer: OutboundBuffer::default(),
            registry: HandlerRegistry::default(),
            observers: Observers::default(),
            handle: None,
            active: None,
            last_connection: ConnectionId::default(),
        }
    }

    /// Returns `true` if `id` is the live connection.
    #[inline]
    fn is_current(&self, id: ConnectionId) -> bool {
        self.active == Some(id)
    }

    /// Sends now if connected, otherwise buffers.
    fn send_envelope(&mut self, envelope: Envelope) -> Result<()> {
        if self.status.get() != Status::Connected {
            let pending = self.buffer.len() + 1;
            trace!(channel = %envelope.channel, pending, "Message buffered");
            self.buffer.push(envelope);
            return Ok(());
        }

        self.transmit(&envelope)
    }

    /// Hands an envelope to the transport.
    fn transmit(&self, envelope: &Envelope) -> Result<()> {
        let text = envelope.encode()?;
        let handle = self.handle.as_ref().ok_or(Error::ConnectionClosed)?;

        handle.send(self.outbound_codec.frame(&text).into_owned())?;

        trace!(channel = %envelope.channel, "Message sent");
        Ok(())
    }

    /// Sends every buffered envelope in order, then leaves the buffer empty.
    ///
    /// A failed send is logged and skipped; the rest still go out.
    fn flush(&mut self) {
        let pending = self.buffer.drain();
        if pending.is_empty() {
            return;
        }

        let count = pending.len();
        for envelope in pending {
            if let Err(e) = self.transmit(&envelope) {
                warn!(channel = %envelope.channel, error = %e, "Failed to flush buffered message");
            }
        }

        debug!(count, "Outbound buffer flushed");
    }
}

impl Drop for ClientInner {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            debug!(url = %self.url, "Client dropped, closing transport");
            handle.close();
        }
    }
}

// ============================================================================
// Client
// ============================================================================

/// Channel-multiplexing client for one peer.
///
/// Cloning is cheap and every clone refers to the same connection,
/// handlers and buffer.
///
/// # Example
///
/// ```no_run
/// use socket_channels::{Client, ClientOptions};
/// use serde_json::json;
///
/// # async fn example() -> socket_channels::Result<()> {
/// let client = Client::open("localhost", 9000, ClientOptions::default())?;
///
/// client.on("chat", |data| println!("chat: {data}"))?;
/// client.send("chat", &json!({ "msg": "hi" }))?;
///
/// // Reply from inside a handler without keeping the client alive.
/// let weak = client.downgrade();
/// client.on("ping", move |data| {
///     if let Some(client) = weak.upgrade() {
///         let _ = client.send("pong", &data);
///     }
/// })?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<Mutex<ClientInner>>,
}

/// Non-owning reference to a [`Client`].
///
/// Created by [`Client::downgrade`]. Does not keep the connection open;
/// [`upgrade`](WeakClient::upgrade) returns `None` once every [`Client`]
/// handle has been dropped.
#[derive(Clone)]
pub struct WeakClient {
    inner: Weak<Mutex<ClientInner>>,
}

impl WeakClient {
    /// Returns the client if it is still alive.
    #[inline]
    #[must_use]
    pub fn upgrade(&self) -> Option<Client> {
        self.inner.upgrade().map(|inner| Client { inner })
    }
}

impl fmt::Debug for WeakClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakClient")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

// ============================================================================
// Client - Constructors
// ============================================================================

impl Client {
    /// Creates a builder for configuring a client.
    #[inline]
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Opens a client to `host:port`.
    ///
    /// Connects immediately unless `options.auto_start` is off.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if host is empty or port is `0`
    /// - Any error from the transport if the connection attempt cannot be
    ///   started
    pub fn open(host: impl Into<String>, port: u16, options: ClientOptions) -> Result<Self> {
        ClientBuilder::new()
            .host(host)
            .port(port)
            .options(options)
            .build()
    }

    /// Creates a client for an already validated URL.
    pub(crate) fn new(url: Url, options: ClientOptions) -> Result<Self> {
        let auto_start = options.auto_start;
        debug!(%url, auto_start, "Client created");

        let client = Self {
            inner: Arc::new(Mutex::new(ClientInner::new(url, options))),
        };

        if auto_start {
            client.start()?;
        }

        Ok(client)
    }
}

// ============================================================================
// Client - Lifecycle
// ============================================================================

impl Client {
    /// Begins connecting to the peer.
    ///
    /// Returns as soon as the attempt has been handed to the transport.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyOpen`] if the client is not `Disconnected`
    /// - Any error from the transport; the client stays `Disconnected`
    pub fn start(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.status.begin_connect()?;

        let id = inner.last_connection.next();
        inner.last_connection = id;
        inner.active = Some(id);

        let sink = self.event_sink(id);
        let connected = inner.transport.connect(&inner.url, sink);
        match connected {
            Ok(handle) => {
                inner.handle = Some(handle);
                debug!(url = %inner.url, connection = %id, "Connecting");
                Ok(())
            }
            Err(e) => {
                inner.active = None;
                inner.status.mark_disconnected();
                warn!(url = %inner.url, error = %e, "Failed to start connection");
                Err(e)
            }
        }
    }

    /// Closes the connection.
    ///
    /// Closes the transport handle, moves to `Disconnected`, then runs the
    /// close observer. Buffered messages are discarded unless
    /// `persist_buffer_across_reconnect` is on. Events the old connection
    /// emits afterwards are ignored, so the disconnect and error observers
    /// do not fire for it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] if the client is already
    /// `Disconnected`.
    pub fn close(&self) -> Result<()> {
        let observer = {
            let mut inner = self.inner.lock();
            if inner.status.get() == Status::Disconnected {
                return Err(Error::NotConnected);
            }

            if let Some(handle) = inner.handle.take() {
                handle.close();
            }
            inner.active = None;
            inner.status.mark_disconnected();

            if !inner.persist_buffer && !inner.buffer.is_empty() {
                debug!(dropped = inner.buffer.len(), "Discarding buffered messages");
                inner.buffer.clear();
            }

            info!(url = %inner.url, "Client closed");
            inner.observers.close.clone()
        };

        if let Some(observer) = observer {
            observer();
        }

        Ok(())
    }

    /// Returns a [`WeakClient`] for use inside handlers and observers.
    #[inline]
    #[must_use]
    pub fn downgrade(&self) -> WeakClient {
        WeakClient {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Returns the current connection status.
    #[inline]
    #[must_use]
    pub fn status(&self) -> Status {
        self.inner.lock().status.get()
    }

    /// Returns the peer URL.
    #[must_use]
    pub fn url(&self) -> Url {
        self.inner.lock().url.clone()
    }

    /// Returns the number of messages waiting for the connection to open.
    #[inline]
    #[must_use]
    pub fn buffered_len(&self) -> usize {
        self.inner.lock().buffer.len()
    }
}

// ============================================================================
// Client - Messaging
// ============================================================================

impl Client {
    /// Sends `payload` on `channel`.
    ///
    /// When connected the envelope goes straight to the transport. Otherwise
    /// it is buffered and sent, in order, once the connection opens.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `channel` is empty
    /// - [`Error::Encode`] if `payload` cannot be serialized; nothing is
    ///   buffered or sent
    /// - Any error from the transport when sending immediately
    pub fn send<T>(&self, channel: impl AsRef<str>, payload: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let channel = ChannelName::new(channel.as_ref())?;
        let envelope = Envelope::from_payload(channel, payload)?;

        self.inner.lock().send_envelope(envelope)
    }

    /// Registers `handler` for `channel`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `channel` is empty.
    pub fn on<F>(&self, channel: impl AsRef<str>, handler: F) -> Result<()>
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        let channel = ChannelName::new(channel.as_ref())?;
        self.register(channel, Arc::new(handler));
        Ok(())
    }

    /// Registers a handler that receives the payload deserialized as `T`.
    ///
    /// Payloads that do not deserialize are dropped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `channel` is empty.
    pub fn on_typed<T, F>(&self, channel: impl AsRef<str>, handler: F) -> Result<()>
    where
        T: DeserializeOwned + 'static,
        F: Fn(T) + Send + Sync + 'static,
    {
        let channel = ChannelName::new(channel.as_ref())?;
        let name = channel.clone();

        self.register(
            channel,
            Arc::new(move |data| match serde_json::from_value::<T>(data) {
                Ok(value) => handler(value),
                Err(e) => warn!(channel = %name, error = %e, "Payload did not match handler type"),
            }),
        );
        Ok(())
    }

    /// Removes the handler for `channel`.
    ///
    /// Returns `true` if a handler was registered.
    pub fn release(&self, channel: impl AsRef<str>) -> bool {
        let removed = self.inner.lock().registry.remove(channel.as_ref());
        if removed {
            debug!(channel = channel.as_ref(), "Handler released");
        }
        removed
    }

    /// Returns `true` if a handler is registered for `channel`.
    #[must_use]
    pub fn is_registered(&self, channel: impl AsRef<str>) -> bool {
        self.inner.lock().registry.contains(channel.as_ref())
    }

    fn register(&self, channel: ChannelName, handler: Handler) {
        let mut inner = self.inner.lock();
        let replaced = inner.registry.insert(channel.clone(), handler);
        debug!(%channel, replaced, "Handler registered");
    }
}

// ============================================================================
// Client - Observers
// ============================================================================

impl Client {
    /// Sets the observer called when the connection opens.
    pub fn set_open_event<F>(&self, handler: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner.lock().observers.open = Some(Arc::new(handler));
    }

    /// Sets the observer called when the transport reports an error.
    ///
    /// Fires once per error while connecting or connected.
    pub fn set_error_event<F>(&self, handler: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.inner.lock().observers.error = Some(Arc::new(handler));
    }

    /// Sets the observer called when the peer closes an open connection.
    ///
    /// Does not fire for a close during `Connecting`, after an error, or
    /// after [`close`](Client::close).
    pub fn set_disconnect_event<F>(&self, handler: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner.lock().observers.disconnect = Some(Arc::new(handler));
    }

    /// Sets the observer called at the end of [`close`](Client::close).
    pub fn set_close_event<F>(&self, handler: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner.lock().observers.close = Some(Arc::new(handler));
    }
}

// ============================================================================
// Client - Transport Events
// ============================================================================

impl Client {
    /// Creates the sink for connection `id`.
    ///
    /// Holds the client weakly so a live connection task does not keep a
    /// dropped client alive.
    fn event_sink(&self, id: ConnectionId) -> EventSink {
        let weak = Arc::downgrade(&self.inner);
        EventSink::new(move |event| {
            if let Some(inner) = weak.upgrade() {
                Self::handle_event(&inner, id, event);
            }
        })
    }

    /// Applies one transport event.
    fn handle_event(inner: &Mutex<ClientInner>, id: ConnectionId, event: TransportEvent) {
        match event {
            TransportEvent::Open => Self::handle_open(inner, id),
            TransportEvent::Message(text) => Self::handle_message(inner, id, &text),
            TransportEvent::Close => Self::handle_loss(inner, id, None),
            TransportEvent::Error(message) => Self::handle_loss(inner, id, Some(message)),
        }
    }

    fn handle_open(inner: &Mutex<ClientInner>, id: ConnectionId) {
        let observer = {
            let mut guard = inner.lock();
            if !guard.is_current(id) {
                trace!(connection = %id, "Ignoring open from stale connection");
                return;
            }
            if !guard.status.mark_connected() {
                return;
            }

            info!(url = %guard.url, connection = %id, "Connected");
            guard.flush();
            guard.observers.open.clone()
        };

        if let Some(observer) = observer {
            observer();
        }
    }

    fn handle_message(inner: &Mutex<ClientInner>, id: ConnectionId, text: &str) {
        let route = {
            let guard = inner.lock();
            if !guard.is_current(id) || guard.status.get() == Status::Disconnected {
                trace!(connection = %id, "Dropping message from closed connection");
                return;
            }
            guard.dispatcher.route(&guard.registry, text)
        };

        if let Route::Deliver { handler, data } = route {
            handler(data);
        }
    }

    /// Handles a close (`error == None`) or an error from the transport.
    fn handle_loss(inner: &Mutex<ClientInner>, id: ConnectionId, error: Option<String>) {
        let (error_observer, disconnect_observer) = {
            let mut guard = inner.lock();
            if !guard.is_current(id) {
                trace!(connection = %id, "Ignoring loss of stale connection");
                return;
            }
            let Some(previous) = guard.status.mark_disconnected() else {
                return;
            };

            // The transport is already gone; nothing left to close.
            guard.handle = None;
            guard.active = None;

            match &error {
                Some(message) => {
                    warn!(url = %guard.url, error = %message, was = %previous, "Connection failed")
                }
                None => info!(url = %guard.url, was = %previous, "Connection closed by peer"),
            }

            let error_observer = error.as_ref().and(guard.observers.error.clone());
            let disconnect_observer = if error.is_none() && previous == Status::Connected {
                guard.observers.disconnect.clone()
            } else {
                None
            };
            (error_observer, disconnect_observer)
        };

        if let (Some(observer), Some(message)) = (error_observer, &error) {
            observer(message);
        }
        if let Some(observer) = disconnect_observer {
            observer();
        }
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("Client")
            .field("url", &inner.url.as_str())
            .field("status", &inner.status.get())
            .field("buffered", &inner.buffer.len())
            .field("handlers", &inner.registry.len())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
