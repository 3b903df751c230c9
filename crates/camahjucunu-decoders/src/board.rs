//! tsiemene board decoder: circuits, instances, hops, invokes.

use serde::{Deserialize, Serialize};

use camahjucunu_bnf::{walk, AstNode, AstVisitor, Grammar, InstructionParser, VisitorContext};

use crate::error::DecodeError;
use crate::grammars::TSIEMENE_BOARD_GRAMMAR;

/// One side of a hop: `instance@directive:kind`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointRef {
    pub instance: String,
    pub directive: String,
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceDecl {
    pub alias: String,
    pub tsi_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HopDecl {
    pub from: EndpointRef,
    pub to: EndpointRef,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitDecl {
    pub name: String,
    pub instances: Vec<InstanceDecl>,
    pub hops: Vec<HopDecl>,
    pub invoke_name: String,
    pub invoke_payload: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardInstruction {
    pub circuits: Vec<CircuitDecl>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capture {
    None,
    CircuitName,
    InstanceAlias,
    TsiType,
    EndpointFrom,
    EndpointTo,
    InvokeName,
    InvokePayload,
}

struct BoardVisitor {
    circuits: Vec<CircuitDecl>,
    capture: Capture,
    buffer: String,
}

impl BoardVisitor {
    fn circuit(&mut self) -> Option<&mut CircuitDecl> {
        self.circuits.last_mut()
    }

    fn begin(&mut self, capture: Capture) {
        self.capture = capture;
        self.buffer.clear();
    }

    fn commit(&mut self, capture: Capture) {
        if self.capture != capture {
            return;
        }
        let text = std::mem::take(&mut self.buffer);
        let text = text.trim().to_string();
        self.capture = Capture::None;
        let Some(circuit) = self.circuit() else {
            return;
        };
        match capture {
            Capture::CircuitName => circuit.name = text,
            Capture::InstanceAlias => {
                if let Some(instance) = circuit.instances.last_mut() {
                    instance.alias = text;
                }
            }
            Capture::TsiType => {
                if let Some(instance) = circuit.instances.last_mut() {
                    instance.tsi_type = text;
                }
            }
            Capture::EndpointFrom => {
                if let Some(hop) = circuit.hops.last_mut() {
                    hop.from = split_endpoint(&text);
                }
            }
            Capture::EndpointTo => {
                if let Some(hop) = circuit.hops.last_mut() {
                    hop.to = split_endpoint(&text);
                }
            }
            Capture::InvokeName => circuit.invoke_name = text,
            Capture::InvokePayload => circuit.invoke_payload = text,
            Capture::None => {}
        }
    }
}

/// `instance@directive:kind`; missing pieces stay empty.
fn split_endpoint(text: &str) -> EndpointRef {
    let (instance, rest) = match text.split_once('@') {
        Some((instance, rest)) => (instance, rest),
        None => (text, ""),
    };
    let (directive, kind) = match rest.split_once(':') {
        Some((directive, kind)) => (directive, kind),
        None => (rest, ""),
    };
    EndpointRef {
        instance: instance.to_string(),
        directive: directive.to_string(),
        kind: kind.to_string(),
    }
}

impl AstVisitor for BoardVisitor {
    fn enter(&mut self, node: &AstNode, _ctx: &VisitorContext<'_>) {
        match node {
            AstNode::Terminal { .. } => {
                if self.capture != Capture::None {
                    self.buffer.push_str(&node.matched_text());
                }
            }
            AstNode::Intermediary { .. } => match node.symbol() {
                "<circuit>" => self.circuits.push(CircuitDecl::default()),
                "<circuit_name>" => self.begin(Capture::CircuitName),
                "<instance_decl>" => {
                    if let Some(circuit) = self.circuit() {
                        circuit.instances.push(InstanceDecl::default());
                    }
                }
                "<instance_alias>" => self.begin(Capture::InstanceAlias),
                "<tsi_type>" => self.begin(Capture::TsiType),
                "<hop_decl>" => {
                    if let Some(circuit) = self.circuit() {
                        circuit.hops.push(HopDecl::default());
                    }
                }
                "<endpoint_from>" => self.begin(Capture::EndpointFrom),
                "<endpoint_to>" => self.begin(Capture::EndpointTo),
                "<invoke_name>" => self.begin(Capture::InvokeName),
                "<invoke_payload>" => self.begin(Capture::InvokePayload),
                _ => {}
            },
            AstNode::Root { .. } => {}
        }
    }

    fn exit(&mut self, node: &AstNode, _ctx: &VisitorContext<'_>) {
        if matches!(node, AstNode::Terminal { .. }) {
            return;
        }
        match node.symbol() {
            "<circuit_name>" => self.commit(Capture::CircuitName),
            "<instance_alias>" => self.commit(Capture::InstanceAlias),
            "<tsi_type>" => self.commit(Capture::TsiType),
            "<endpoint_from>" => self.commit(Capture::EndpointFrom),
            "<endpoint_to>" => self.commit(Capture::EndpointTo),
            "<invoke_name>" => self.commit(Capture::InvokeName),
            "<invoke_payload>" => self.commit(Capture::InvokePayload),
            _ => {}
        }
    }
}

/// Grammar-driven decoder for board instructions.
pub struct BoardPipeline {
    grammar: Grammar,
}

impl BoardPipeline {
    pub fn new() -> Result<Self, DecodeError> {
        Self::with_grammar(TSIEMENE_BOARD_GRAMMAR)
    }

    pub fn with_grammar(grammar_text: &str) -> Result<Self, DecodeError> {
        let grammar = Grammar::parse(grammar_text)?;
        grammar.verify()?;
        Ok(Self { grammar })
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn decode(&self, instruction: &str) -> Result<BoardInstruction, DecodeError> {
        let root = InstructionParser::new(&self.grammar).parse_instruction(instruction)?;
        let mut visitor = BoardVisitor {
            circuits: Vec::new(),
            capture: Capture::None,
            buffer: String::new(),
        };
        walk(&root, &mut visitor);
        Ok(BoardInstruction {
            circuits: visitor.circuits,
        })
    }
}
