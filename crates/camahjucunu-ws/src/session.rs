use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

use tokio::sync::Notify;
use tokio::time::{self, Instant};
use tracing::debug;

use crate::frame::{IncomingFrame, OutgoingFrame};
use crate::json::{extract_frame_id, json_document_complete};

pub type SessionId = u64;

pub(crate) struct SessionState {
    pub rx: VecDeque<IncomingFrame>,
    pub tx: VecDeque<OutgoingFrame>,
    pub rx_buffer: String,
    /// Cleared when the session is retired; every worker loop observes it.
    pub running: bool,
    /// Set by the transport loop on exit; `finalize` joins on it.
    pub loop_finished: bool,
}

/// Per-session shared record: one mutex over the queues, one notifier for
/// TX-ready / RX-arrival / shutdown.
pub(crate) struct Session {
    pub id: SessionId,
    pub state: Mutex<SessionState>,
    pub notify: Notify,
}

impl Session {
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            state: Mutex::new(SessionState {
                rx: VecDeque::new(),
                tx: VecDeque::new(),
                rx_buffer: String::new(),
                running: true,
                loop_finished: false,
            }),
            notify: Notify::new(),
        }
    }

    pub fn with_state<T>(&self, f: impl FnOnce(&mut SessionState) -> T) -> T {
        let mut state = self.state.lock().expect("session state poisoned");
        f(&mut state)
    }

    pub fn is_running(&self) -> bool {
        self.with_state(|state| state.running)
    }

    /// Condition-variable style wait with a deadline. Interest in the
    /// notifier is registered before the predicate check, so a wakeup
    /// between check and sleep is never lost.
    pub async fn wait_until(
        &self,
        timeout: Duration,
        mut predicate: impl FnMut(&SessionState) -> bool,
    ) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            let notified = self.notify.notified();
            if self.with_state(|state| predicate(state)) {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let _ = time::timeout(deadline - now, notified).await;
        }
    }

    /// Feed one received chunk into the reassembly buffer. A complete JSON
    /// document becomes an [`IncomingFrame`] tagged with its `"id"` field;
    /// an incomplete one leaves the buffer intact.
    pub fn rx_chunk(&self, chunk: &str) {
        let local_timestamp = SystemTime::now();
        self.with_state(|state| {
            state.rx_buffer.push_str(chunk);
            if json_document_complete(&state.rx_buffer) {
                let data = std::mem::take(&mut state.rx_buffer);
                let frame_id = extract_frame_id(&data);
                debug!(session = self.id, frame_id = %frame_id, "assembled incoming frame");
                state.rx.push_back(IncomingFrame {
                    frame_id,
                    data,
                    local_timestamp,
                });
            } else {
                debug!(
                    session = self.id,
                    chunk = chunk.len(),
                    "buffered partial chunk"
                );
            }
        });
        self.notify.notify_waiters();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunks_reassemble_into_one_frame() {
        let session = Session::new(0);
        session.rx_chunk(r#"{"id":"req-7","#);
        assert_eq!(session.with_state(|s| s.rx.len()), 0);
        session.rx_chunk(r#""result":{"ok":true}}"#);
        assert_eq!(session.with_state(|s| s.rx.len()), 1);
        let frame = session.with_state(|s| s.rx.front().cloned()).unwrap();
        assert_eq!(frame.frame_id, "req-7");
        assert!(frame.data.contains("result"));
        // buffer was consumed
        assert_eq!(session.with_state(|s| s.rx_buffer.clone()), "");
    }

    #[test]
    fn frames_without_id_are_tagged_null() {
        let session = Session::new(0);
        session.rx_chunk(r#"{"event":"tick"}"#);
        let frame = session.with_state(|s| s.rx.front().cloned()).unwrap();
        assert_eq!(frame.frame_id, "NULL");
    }

    #[test]
    fn frames_arrive_in_transport_order() {
        let session = Session::new(0);
        session.rx_chunk(r#"{"id":"a"}"#);
        session.rx_chunk(r#"{"id":"b"}"#);
        let ids: Vec<String> =
            session.with_state(|s| s.rx.iter().map(|f| f.frame_id.clone()).collect());
        assert_eq!(ids, vec!["a", "b"]);
    }
}
