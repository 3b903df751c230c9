#![doc = include_str!("../README.md")]

mod error;
mod limit;

pub mod ast;
pub mod grammar;
pub mod instruction;
pub mod lexer;
pub mod visitor;

pub use crate::ast::AstNode;
pub use crate::error::{GrammarError, LexError, ParseReport, SUCCESS_STACK_LIMIT};
pub use crate::grammar::{AlternativeKind, Grammar, ProductionAlternative, ProductionRule};
pub use crate::instruction::{InstructionLexer, InstructionParser};
pub use crate::lexer::{GrammarLexer, ProductionUnit, UnitKind};
pub use crate::limit::LimitTracker;
pub use crate::visitor::{walk, AstVisitor, VisitorContext};

/// Left-hand side of the rule every grammar must begin with.
pub const START_SYMBOL: &str = "<instruction>";
