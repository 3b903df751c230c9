#![doc = include_str!("../README.md")]

mod error;

pub mod board;
pub mod grammars;
pub mod options;
pub mod renderings;
pub mod tables;

pub use crate::board::{
    BoardInstruction, BoardPipeline, CircuitDecl, EndpointRef, HopDecl, InstanceDecl,
};
pub use crate::error::DecodeError;
pub use crate::renderings::{
    Event, EventBinding, Figure, Panel, Point, RenderingsInstruction, RenderingsPipeline, Screen,
};
pub use crate::tables::{Row, RowAccess, Table, TrainingInstruction, TrainingPipeline, ROW_ID_COLUMN};
