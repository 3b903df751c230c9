use std::time::SystemTime;

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Normal-termination close code.
pub const WS_NORMAL_TERMINATION: u16 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Text,
    Binary,
    Ping,
    Pong,
    Close(u16),
}

/// Frame queued for transmission. Close frames carry their 16-bit code in
/// network byte order as the payload.
#[derive(Debug, Clone)]
pub struct OutgoingFrame {
    pub frame_id: String,
    pub payload: Vec<u8>,
    pub kind: FrameKind,
    pub local_timestamp: SystemTime,
}

/// Fully reassembled incoming document.
///
/// `local_timestamp` is the arrival time of the completing chunk; server-side
/// timestamps inside the body may differ.
#[derive(Debug, Clone)]
pub struct IncomingFrame {
    pub frame_id: String,
    pub data: String,
    pub local_timestamp: SystemTime,
}

pub fn close_payload(code: u16) -> Vec<u8> {
    code.to_be_bytes().to_vec()
}

/// Replace every `x` in `template` with a random alphanumeric character.
pub fn frame_id_from_template(template: &str) -> String {
    let mut rng = rand::thread_rng();
    template
        .chars()
        .map(|c| {
            if c == 'x' {
                char::from(rng.sample(Alphanumeric))
            } else {
                c
            }
        })
        .collect()
}

/// `<method>-xxxx-xxxx` frame id. Frame ids must match `[A-Za-z0-9_-]+`, so
/// `.` in method names is replaced with `_` first.
pub fn frame_id_for_method(method: &str) -> String {
    frame_id_from_template(&format!("{}-xxxx-xxxx", method.replace('.', "_")))
}
