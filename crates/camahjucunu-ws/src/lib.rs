#![doc = include_str!("../README.md")]

mod error;
mod manager;
mod session;

pub mod frame;
pub mod json;

pub use crate::error::WsError;
pub use crate::frame::{
    close_payload, frame_id_for_method, frame_id_from_template, FrameKind, IncomingFrame,
    OutgoingFrame, WS_NORMAL_TERMINATION,
};
pub use crate::json::{extract_frame_id, json_document_complete, NULL_FRAME_ID};
pub use crate::manager::WsManager;
pub use crate::session::SessionId;
