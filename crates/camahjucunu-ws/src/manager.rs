use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use once_cell::sync::Lazy;
use tokio::net::TcpStream;
use tokio::time;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::{CloseFrame, WebSocketConfig};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async_with_config, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

use crate::error::WsError;
use crate::frame::{
    close_payload, frame_id_for_method, FrameKind, IncomingFrame, OutgoingFrame,
    WS_NORMAL_TERMINATION,
};
use crate::session::{Session, SessionId};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

/// Upper bound on any single notifier wait, so retirement is always observed.
const MAX_WAIT: Duration = Duration::from_secs(1);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const RX_MAX_MESSAGE: usize = 16 << 20;

/// Registry of WebSocket sessions.
///
/// Sessions are created with [`WsManager::init`] and torn down with
/// [`WsManager::finalize`]. A finalized id keeps its registry slot (marked
/// retired) so late references are detected rather than recycled.
///
/// Passing an id this manager never issued is a caller bug and panics after
/// logging; every other failure is an error value.
pub struct WsManager {
    sessions: Mutex<HashMap<SessionId, Option<Arc<Session>>>>,
    counter: AtomicU64,
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new()
    }
}

impl WsManager {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            counter: AtomicU64::new(0),
        }
    }

    /// Process-wide convenience instance.
    pub fn global() -> &'static WsManager {
        static GLOBAL: Lazy<WsManager> = Lazy::new(WsManager::new);
        &GLOBAL
    }

    fn session(&self, session_id: SessionId) -> Arc<Session> {
        let sessions = self.sessions.lock().expect("session registry poisoned");
        match sessions.get(&session_id) {
            Some(Some(session)) => session.clone(),
            _ => {
                error!(session = session_id, "unknown websocket session");
                panic!("unknown websocket session id {session_id}");
            }
        }
    }

    fn retire_slot(&self, session_id: SessionId) {
        self.sessions
            .lock()
            .expect("session registry poisoned")
            .insert(session_id, None);
    }

    /// Open a session to `url` (`ws://` or `wss://`; TLS is verified by the
    /// transport). Returns once the HTTP 101 upgrade has been observed, so
    /// later writes cannot race the handshake.
    pub async fn init(&self, url: &str) -> Result<SessionId, WsError> {
        let session_id = self.counter.fetch_add(1, Ordering::Relaxed);
        let session = Arc::new(Session::new(session_id));
        self.sessions
            .lock()
            .expect("session registry poisoned")
            .insert(session_id, Some(session.clone()));

        let mut config = WebSocketConfig::default();
        config.max_message_size = Some(RX_MAX_MESSAGE);

        let connect = connect_async_with_config(url, Some(config), false);
        let (stream, response) = match time::timeout(CONNECT_TIMEOUT, connect).await {
            Ok(Ok(established)) => established,
            Ok(Err(source)) => {
                self.retire_slot(session_id);
                return Err(WsError::Transport(source));
            }
            Err(_) => {
                self.retire_slot(session_id);
                return Err(WsError::ConnectTimeout);
            }
        };

        // The connect future resolves after the handshake; the 101 switch is
        // still the session-layer contract, so check it explicitly.
        if response.status().as_u16() != 101 {
            self.retire_slot(session_id);
            return Err(WsError::UpgradeFailed(response.status().as_u16()));
        }

        let (sink, source) = stream.split();
        tokio::spawn(tx_worker(session.clone(), sink));
        tokio::spawn(transport_loop(session, source));

        info!(session = session_id, url, "websocket session established");
        Ok(session_id)
    }

    fn enqueue(
        &self,
        session_id: SessionId,
        kind: FrameKind,
        payload: Vec<u8>,
        frame_id: Option<String>,
        method: &str,
    ) -> String {
        let session = self.session(session_id);
        let frame_id = frame_id.unwrap_or_else(|| frame_id_for_method(method));
        let frame = OutgoingFrame {
            frame_id: frame_id.clone(),
            payload,
            kind,
            local_timestamp: SystemTime::now(),
        };
        session.with_state(|state| state.tx.push_back(frame));
        session.notify.notify_waiters();
        frame_id
    }

    /// Queue a text frame; returns its frame id (generated when not given).
    pub fn ws_write_text(
        &self,
        session_id: SessionId,
        data: String,
        frame_id: Option<String>,
    ) -> String {
        self.enqueue(session_id, FrameKind::Text, data.into_bytes(), frame_id, "text")
    }

    pub fn ws_write_binary(
        &self,
        session_id: SessionId,
        data: Vec<u8>,
        frame_id: Option<String>,
    ) -> String {
        self.enqueue(session_id, FrameKind::Binary, data, frame_id, "binary")
    }

    pub fn ws_write_ping(&self, session_id: SessionId, frame_id: Option<String>) -> String {
        self.enqueue(session_id, FrameKind::Ping, Vec::new(), frame_id, "ping")
    }

    pub fn ws_write_pong(&self, session_id: SessionId, frame_id: Option<String>) -> String {
        self.enqueue(session_id, FrameKind::Pong, Vec::new(), frame_id, "pong")
    }

    /// Queue a close frame carrying `code` in network byte order.
    pub fn ws_write_close(
        &self,
        session_id: SessionId,
        code: u16,
        frame_id: Option<String>,
    ) -> String {
        self.enqueue(
            session_id,
            FrameKind::Close(code),
            close_payload(code),
            frame_id,
            "close",
        )
    }

    /// Wait up to `timeout` for a frame whose id equals `target_frame_id`,
    /// scanning newest to oldest, and remove it from the RX queue.
    pub async fn await_and_retrieve(
        &self,
        session_id: SessionId,
        target_frame_id: &str,
        timeout: Duration,
    ) -> Option<IncomingFrame> {
        let session = self.session(session_id);
        let matched = session
            .wait_until(timeout, |state| {
                state
                    .rx
                    .iter()
                    .rev()
                    .any(|frame| frame.frame_id == target_frame_id)
            })
            .await;
        if !matched {
            warn!(
                session = session_id,
                frame_id = target_frame_id,
                "timed out awaiting server response"
            );
            return None;
        }
        session.with_state(|state| {
            let index = state
                .rx
                .iter()
                .rposition(|frame| frame.frame_id == target_frame_id)?;
            state.rx.remove(index)
        })
    }

    /// Block until the TX queue has been fully handed to the transport.
    pub async fn wait_to_flush(&self, session_id: SessionId) {
        let session = self.session(session_id);
        while !session
            .wait_until(MAX_WAIT, |state| state.tx.is_empty())
            .await
        {}
    }

    /// Block until the transport loop has exited.
    pub async fn wait_loop_to_finish(&self, session_id: SessionId) {
        let session = self.session(session_id);
        while !session.wait_until(MAX_WAIT, |state| state.loop_finished).await {}
    }

    /// Graceful shutdown: close(1000), flush TX, retire the session, join
    /// the transport loop, release the slot (the id stays registered).
    pub async fn finalize(&self, session_id: SessionId) -> Result<(), WsError> {
        let session = {
            let sessions = self.sessions.lock().expect("session registry poisoned");
            match sessions.get(&session_id) {
                Some(Some(session)) => session.clone(),
                _ => {
                    warn!(session = session_id, "finalize on retired session");
                    return Ok(());
                }
            }
        };

        let close_frame_id = self.ws_write_close(session_id, WS_NORMAL_TERMINATION, None);

        while !session
            .wait_until(MAX_WAIT, |state| state.tx.is_empty())
            .await
        {}

        session.with_state(|state| state.running = false);
        session.notify.notify_waiters();

        while !session.wait_until(MAX_WAIT, |state| state.loop_finished).await {}

        self.retire_slot(session_id);
        info!(
            session = session_id,
            frame_id = %close_frame_id,
            "finalized websocket session"
        );
        Ok(())
    }
}

fn frame_into_message(frame: OutgoingFrame) -> Message {
    match frame.kind {
        FrameKind::Text => Message::Text(String::from_utf8_lossy(&frame.payload).into_owned()),
        FrameKind::Binary => Message::Binary(frame.payload),
        FrameKind::Ping => Message::Ping(frame.payload),
        FrameKind::Pong => Message::Pong(frame.payload),
        FrameKind::Close(code) => Message::Close(Some(CloseFrame {
            code: CloseCode::from(code),
            reason: "".into(),
        })),
    }
}

/// Drains the TX queue FIFO into the sink. Send failures are logged per
/// frame; only retirement stops the worker.
async fn tx_worker(session: Arc<Session>, mut sink: WsSink) {
    loop {
        session
            .wait_until(MAX_WAIT, |state| !state.running || !state.tx.is_empty())
            .await;

        loop {
            let Some(frame) = session.with_state(|state| state.tx.pop_front()) else {
                break;
            };
            let frame_id = frame.frame_id.clone();
            match sink.send(frame_into_message(frame)).await {
                Ok(()) => debug!(session = session.id, frame_id = %frame_id, "sent frame"),
                Err(source) => warn!(
                    session = session.id,
                    frame_id = %frame_id,
                    error = %source,
                    "failed to send frame"
                ),
            }
        }

        // let wait_to_flush observers re-check
        session.notify.notify_waiters();

        if !session.is_running() {
            break;
        }
    }
    let _ = sink.close().await;
    debug!(session = session.id, "tx worker finished");
}

/// Reads the transport until the session is retired or the stream ends.
/// Text and binary payloads feed the chunk reassembler; transport errors are
/// logged and do not end the session.
async fn transport_loop(session: Arc<Session>, mut source: WsSource) {
    debug!(session = session.id, "transport loop started");
    loop {
        if !session.is_running() {
            break;
        }
        // bounded poll so retirement is observed promptly
        match time::timeout(MAX_WAIT, source.next()).await {
            Err(_) => continue,
            Ok(None) => {
                info!(session = session.id, "transport stream ended");
                break;
            }
            Ok(Some(Ok(message))) => match message {
                Message::Text(text) => session.rx_chunk(&text),
                Message::Binary(data) => session.rx_chunk(&String::from_utf8_lossy(&data)),
                Message::Ping(_) => debug!(session = session.id, "ping"),
                Message::Pong(_) => debug!(session = session.id, "pong"),
                Message::Close(close) => {
                    info!(session = session.id, ?close, "server sent close")
                }
                Message::Frame(_) => {}
            },
            Ok(Some(Err(source_err))) => {
                warn!(session = session.id, error = %source_err, "transport error");
            }
        }
    }
    session.with_state(|state| state.loop_finished = true);
    session.notify.notify_waiters();
    info!(session = session.id, "transport loop finished");
}
