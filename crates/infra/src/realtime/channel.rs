//! Multiplexed subscription socket
//!
//! One WebSocket carries every channel. Listeners register per channel name;
//! the first listener on a channel sends `{type:"subscribe"}` and the last one
//! leaving sends `{type:"unsubscribe"}`. Inbound `{type:"data", channel, data}`
//! frames fan out to the channel's listeners.
//!
//! A supervisor task owns the socket. On an unexpected close it reconnects
//! with exponential backoff (`base * 2^(n-1)`) up to the configured attempt
//! cap, re-subscribing every channel on each new socket. Hitting the cap
//! leaves the channel `Disconnected` and reports the failure through the
//! notifier. Frames sent while not `Connected` are dropped.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use financeflow_common::{BackoffStrategy, TokenStore};
use financeflow_core::Notifier;
use financeflow_domain::constants::WS_TOKEN_QUERY_PARAM;
use financeflow_domain::{ApiError, ClientFrame, ConnectionState, RealtimeConfig, ServerFrame};
use futures_util::{SinkExt, StreamExt};
use parking_lot::{Mutex, RwLock};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use url::Url;

use super::listener::Listener;
use crate::errors::IntoApiError;

pub const CONNECTION_LOST_TITLE: &str = "Connection Lost";
pub const CONNECTION_LOST_MESSAGE: &str = "Real-time updates are unavailable. Please reconnect.";

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Subscription channel handle. Clones share one connection.
#[derive(Clone)]
pub struct SubscriptionChannel {
    inner: Arc<Inner>,
}

struct Inner {
    config: RealtimeConfig,
    backoff: BackoffStrategy,
    store: Arc<TokenStore>,
    notifier: Arc<dyn Notifier>,
    listeners: RwLock<HashMap<String, Vec<Listener>>>,
    /// Sender into the live socket, tagged with its session id.
    outbound: Mutex<Option<(u64, mpsc::UnboundedSender<String>)>>,
    session: Mutex<Option<Session>>,
    next_session: AtomicU64,
    state: watch::Sender<ConnectionState>,
    attempts: AtomicU32,
}

#[derive(Clone)]
struct Session {
    id: u64,
    token: CancellationToken,
}

#[derive(Debug, PartialEq, Eq)]
enum SessionEnd {
    Cancelled,
    Lost,
}

impl SubscriptionChannel {
    /// Channel over `config.url`, reading the access token from `store` and
    /// reporting abandoned reconnection through `notifier`.
    pub fn new(config: RealtimeConfig, store: Arc<TokenStore>, notifier: Arc<dyn Notifier>) -> Self {
        let backoff = BackoffStrategy::Exponential {
            base: config.reconnect_base_delay(),
            max_delay: Duration::MAX,
        };
        let (state, _) = watch::channel(ConnectionState::Disconnected);

        Self {
            inner: Arc::new(Inner {
                config,
                backoff,
                store,
                notifier,
                listeners: RwLock::new(HashMap::new()),
                outbound: Mutex::new(None),
                session: Mutex::new(None),
                next_session: AtomicU64::new(1),
                state,
                attempts: AtomicU32::new(0),
            }),
        }
    }

    /// Current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.inner.state.borrow()
    }

    /// Receiver observing every state transition.
    #[must_use]
    pub fn state_changes(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state.subscribe()
    }

    /// Consecutive failed reconnect attempts since the last open socket.
    #[must_use]
    pub fn reconnect_attempts(&self) -> u32 {
        self.inner.attempts.load(Ordering::SeqCst)
    }

    /// Channels that currently have at least one listener.
    #[must_use]
    pub fn channels(&self) -> Vec<String> {
        let mut channels: Vec<String> = self.inner.listeners.read().keys().cloned().collect();
        channels.sort();
        channels
    }

    /// Listeners registered on `channel`.
    #[must_use]
    pub fn listener_count(&self, channel: &str) -> usize {
        self.inner.listeners.read().get(channel).map_or(0, Vec::len)
    }

    /// Open the socket, appending the current access token as `?token=`.
    ///
    /// Resolves once the socket is open. When a connection is already open
    /// or being established, waits for it to settle instead of opening a
    /// second one.
    ///
    /// # Errors
    /// `ApiError::Socket` when the socket fails before opening, times out, or
    /// `disconnect` is called meanwhile.
    pub async fn connect(&self) -> Result<(), ApiError> {
        let claimed = self.inner.state.send_if_modified(|state| {
            if *state == ConnectionState::Disconnected {
                *state = ConnectionState::Connecting;
                true
            } else {
                false
            }
        });
        if !claimed {
            return self.wait_until_settled().await;
        }

        let session = Session {
            id: self.inner.next_session.fetch_add(1, Ordering::SeqCst),
            token: CancellationToken::new(),
        };
        if let Some(previous) = self.inner.session.lock().replace(session.clone()) {
            previous.token.cancel();
        }
        self.inner.attempts.store(0, Ordering::SeqCst);

        match self.inner.open(&session.token).await {
            Ok(ws) => match self.inner.on_open(&session) {
                Some(rx) => {
                    tokio::spawn(supervise(Arc::clone(&self.inner), ws, rx, session));
                    Ok(())
                }
                None => Err(ApiError::socket("disconnected while connecting")),
            },
            Err(err) => {
                if !session.token.is_cancelled() {
                    self.inner.end_session(session.id);
                    self.inner.set_state(ConnectionState::Disconnected);
                }
                warn!(error = %err, "Socket connection failed");
                Err(err)
            }
        }
    }

    /// Close the socket and stop any reconnection. Safe to call in any state
    /// and more than once.
    pub fn disconnect(&self) {
        if let Some(session) = self.inner.session.lock().take() {
            session.token.cancel();
        }
        self.inner.outbound.lock().take();
        self.inner.attempts.store(0, Ordering::SeqCst);
        if self.inner.set_state(ConnectionState::Disconnected) {
            info!("Socket disconnected");
        }
    }

    /// Register `listener` on `channel`.
    ///
    /// Sends a subscribe frame when this is the channel's first listener. A
    /// handle already registered on the channel is ignored.
    pub fn subscribe(&self, channel: &str, listener: Listener) {
        let mut listeners = self.inner.listeners.write();
        let entry = listeners.entry(channel.to_string()).or_default();
        if entry.iter().any(|existing| existing.same_as(&listener)) {
            return;
        }
        entry.push(listener);

        if entry.len() == 1 {
            self.inner.send_frame(&ClientFrame::Subscribe { channel: channel.to_string() });
        }
    }

    /// Remove `listener` from `channel`, or every listener when `None`.
    ///
    /// Sends an unsubscribe frame when the channel is left without listeners.
    pub fn unsubscribe(&self, channel: &str, listener: Option<&Listener>) {
        let mut listeners = self.inner.listeners.write();
        let Some(entry) = listeners.get_mut(channel) else {
            return;
        };

        match listener {
            Some(listener) => entry.retain(|existing| !existing.same_as(listener)),
            None => entry.clear(),
        }

        if entry.is_empty() {
            listeners.remove(channel);
            self.inner.send_frame(&ClientFrame::Unsubscribe { channel: channel.to_string() });
        }
    }

    async fn wait_until_settled(&self) -> Result<(), ApiError> {
        let mut changes = self.inner.state.subscribe();
        let connected = changes
            .wait_for(|state| {
                matches!(state, ConnectionState::Connected | ConnectionState::Disconnected)
            })
            .await
            .map(|state| *state == ConnectionState::Connected)
            .unwrap_or(false);

        if connected {
            Ok(())
        } else {
            Err(ApiError::socket("connection failed"))
        }
    }
}

impl std::fmt::Debug for SubscriptionChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionChannel")
            .field("url", &self.inner.config.url)
            .field("state", &self.state())
            .field("channels", &self.channels())
            .finish_non_exhaustive()
    }
}

impl Inner {
    /// Returns whether the state changed.
    fn set_state(&self, next: ConnectionState) -> bool {
        let previous = self.state.send_replace(next);
        if previous != next {
            debug!(from = %previous, to = %next, "Socket state changed");
        }
        previous != next
    }

    fn end_session(&self, id: u64) {
        let mut session = self.session.lock();
        if session.as_ref().is_some_and(|s| s.id == id) {
            session.take();
        }
        drop(session);

        let mut outbound = self.outbound.lock();
        if outbound.as_ref().is_some_and(|(owner, _)| *owner == id) {
            outbound.take();
        }
    }

    fn socket_url(&self) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.config.url)
            .map_err(|err| ApiError::socket(format!("invalid socket url: {err}")))?;
        if let Some(token) = self.store.access_token() {
            url.query_pairs_mut().append_pair(WS_TOKEN_QUERY_PARAM, &token);
        }
        Ok(url)
    }

    async fn open(&self, token: &CancellationToken) -> Result<WsStream, ApiError> {
        let url = self.socket_url()?;
        let timeout = self.config.connect_timeout();
        debug!(host = url.host_str().unwrap_or_default(), path = url.path(), "Opening socket");

        let connect = tokio::time::timeout(timeout, connect_async(url.as_str()));
        tokio::select! {
            () = token.cancelled() => Err(ApiError::socket("connection cancelled")),
            result = connect => match result {
                Ok(Ok((ws, _response))) => Ok(ws),
                Ok(Err(err)) => Err(err.into_api_error(timeout)),
                Err(_) => Err(ApiError::socket(format!(
                    "connection timed out after {}ms",
                    timeout.as_millis()
                ))),
            },
        }
    }

    /// Install the outbound queue for a freshly opened socket and queue a
    /// subscribe frame for every known channel.
    ///
    /// `None` when `session` was replaced or cancelled while the socket was
    /// opening. The session lock is held throughout so a concurrent
    /// `disconnect` either sees the installed queue or prevents it.
    fn on_open(&self, session: &Session) -> Option<mpsc::UnboundedReceiver<String>> {
        let current = self.session.lock();
        let still_current = current.as_ref().is_some_and(|live| live.id == session.id);
        if !still_current || session.token.is_cancelled() {
            debug!(session = session.id, "Socket opened for a stale session, discarding");
            return None;
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let listeners = self.listeners.read();
        for channel in listeners.keys() {
            let _ = tx.send(ClientFrame::Subscribe { channel: channel.clone() }.to_text());
        }
        *self.outbound.lock() = Some((session.id, tx));
        self.attempts.store(0, Ordering::SeqCst);
        self.set_state(ConnectionState::Connected);
        info!(channels = listeners.len(), "Socket connected");
        drop(listeners);
        drop(current);

        Some(rx)
    }

    /// Queue `frame` on the live socket; dropped unless `Connected`.
    fn send_frame(&self, frame: &ClientFrame) -> bool {
        if *self.state.borrow() != ConnectionState::Connected {
            debug!(channel = frame.channel(), "Socket not connected, dropping frame");
            return false;
        }
        match self.outbound.lock().as_ref() {
            Some((_, tx)) => tx.send(frame.to_text()).is_ok(),
            None => false,
        }
    }

    fn dispatch(&self, text: &str) {
        let Some(frame) = ServerFrame::parse(text) else {
            warn!(len = text.len(), "Dropping malformed socket frame");
            return;
        };
        let Some((channel, data)) = frame.as_data() else {
            debug!(kind = %frame.kind, "Ignoring non-data frame");
            return;
        };

        let listeners = self.listeners.read().get(channel).cloned().unwrap_or_default();
        if listeners.is_empty() {
            debug!(channel, "No listeners for channel");
        }
        for listener in &listeners {
            listener.call(data);
        }
    }

    /// Pump one socket until it closes or the session is cancelled.
    async fn pump(
        &self,
        ws: WsStream,
        rx: &mut mpsc::UnboundedReceiver<String>,
        token: &CancellationToken,
    ) -> SessionEnd {
        let (mut sink, mut stream) = ws.split();

        loop {
            tokio::select! {
                () = token.cancelled() => {
                    let _ = sink.send(Message::Close(None)).await;
                    return SessionEnd::Cancelled;
                }
                Some(text) = rx.recv() => {
                    if let Err(err) = sink.send(Message::Text(text)).await {
                        warn!(error = %err, "Socket send failed");
                        return SessionEnd::Lost;
                    }
                }
                message = stream.next() => match message {
                    Some(Ok(Message::Text(text))) => self.dispatch(&text),
                    Some(Ok(Message::Binary(bytes))) => match std::str::from_utf8(&bytes) {
                        Ok(text) => self.dispatch(text),
                        Err(_) => warn!("Dropping non-UTF-8 binary frame"),
                    },
                    Some(Ok(Message::Close(frame))) => {
                        info!(?frame, "Server closed socket");
                        return SessionEnd::Lost;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        warn!(error = %err, "Socket read failed");
                        return SessionEnd::Lost;
                    }
                    None => return SessionEnd::Lost,
                },
            }
        }
    }

    /// Reconnect with exponential backoff. `None` once the cap is reached or
    /// the session is cancelled.
    async fn reconnect(&self, session: &Session) -> Option<WsStream> {
        let max_attempts = self.config.max_reconnect_attempts;

        loop {
            if session.token.is_cancelled() {
                return None;
            }

            let made = self.attempts.load(Ordering::SeqCst);
            if made >= max_attempts {
                error!(attempts = made, "Socket reconnection abandoned");
                self.end_session(session.id);
                self.set_state(ConnectionState::Disconnected);
                self.notifier.show_error(CONNECTION_LOST_TITLE, CONNECTION_LOST_MESSAGE);
                return None;
            }

            let attempt = made + 1;
            self.attempts.store(attempt, Ordering::SeqCst);
            let delay = self.backoff.calculate_delay(attempt);
            self.set_state(ConnectionState::Reconnecting);
            let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
            info!(attempt, max_attempts, delay_ms, "Reconnecting socket");

            tokio::select! {
                () = session.token.cancelled() => return None,
                () = tokio::time::sleep(delay) => {}
            }

            self.set_state(ConnectionState::Connecting);
            match self.open(&session.token).await {
                Ok(ws) if !session.token.is_cancelled() => return Some(ws),
                Ok(_) => return None,
                Err(err) => warn!(attempt, error = %err, "Reconnect attempt failed"),
            }
        }
    }
}

async fn supervise(
    inner: Arc<Inner>,
    mut ws: WsStream,
    mut rx: mpsc::UnboundedReceiver<String>,
    session: Session,
) {
    loop {
        let end = inner.pump(ws, &mut rx, &session.token).await;
        if end == SessionEnd::Cancelled || session.token.is_cancelled() {
            debug!(session = session.id, "Socket session ended");
            return;
        }

        warn!("Socket closed unexpectedly");
        {
            let mut outbound = inner.outbound.lock();
            if outbound.as_ref().is_some_and(|(owner, _)| *owner == session.id) {
                outbound.take();
            }
        }

        match inner.reconnect(&session).await {
            Some(next) => match inner.on_open(&session) {
                Some(next_rx) => {
                    ws = next;
                    rx = next_rx;
                }
                None => return,
            },
            None => return,
        }
    }
}
