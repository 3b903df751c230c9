//! Training-components table decoder.
//!
//! Instructions are pipe-framed tables; the visitor projects the tree into a
//! FIFO of `(label, value)` events which `decode_raw` folds into ordered
//! tables keyed by title, with rows keyed by column name.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use camahjucunu_bnf::{walk, AstNode, AstVisitor, Grammar, InstructionParser, VisitorContext};

use crate::error::DecodeError;
use crate::grammars::TRAINING_COMPONENTS_GRAMMAR;
use crate::options;

/// Every table's first column.
pub const ROW_ID_COLUMN: &str = "row_id";

pub type Row = IndexMap<String, String>;
pub type Table = Vec<Row>;

/// Raw visitor event, in instruction order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RawLabel {
    TableTitle,
    HeaderLine,
    ItemLine,
}

#[derive(Debug, Clone)]
struct RawElement {
    label: RawLabel,
    value: String,
}

/// Decoded training instruction: ordered tables of ordered rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingInstruction {
    /// The instruction text this was decoded from, kept for diagnostics.
    pub source: String,
    pub tables: IndexMap<String, Table>,
}

impl TrainingInstruction {
    pub fn get_table(&self, table_name: &str) -> Result<&Table, DecodeError> {
        self.tables.get(table_name).ok_or_else(|| {
            DecodeError::structure(format!(
                "table '{table_name}' not found; review instruction: {}",
                self.context()
            ))
        })
    }

    pub fn get_row_by_index(&self, table_name: &str, index: usize) -> Result<&Row, DecodeError> {
        let table = self.get_table(table_name)?;
        table.get(index).ok_or_else(|| {
            DecodeError::structure(format!(
                "row index {index} out of bounds in table '{table_name}'; review instruction: {}",
                self.context()
            ))
        })
    }

    pub fn get_row(&self, table_name: &str, row_id: &str) -> Result<&Row, DecodeError> {
        let table = self.get_table(table_name)?;
        table
            .iter()
            .find(|row| row.get(ROW_ID_COLUMN).map(String::as_str) == Some(row_id))
            .ok_or_else(|| {
                DecodeError::structure(format!(
                    "row '{row_id}' not found in table '{table_name}'; review instruction: {}",
                    self.context()
                ))
            })
    }

    pub fn get_field(
        &self,
        table_name: &str,
        row_id: &str,
        column: &str,
    ) -> Result<&str, DecodeError> {
        let row = self.get_row(table_name, row_id)?;
        row.get(column).map(String::as_str).ok_or_else(|| {
            DecodeError::structure(format!(
                "column '{column}' not found in row '{row_id}' of table '{table_name}'; \
                 review instruction: {}",
                self.context()
            ))
        })
    }

    /// Bind a `(table, row_id)` pair for repeated typed lookups.
    pub fn row_access<'a>(&'a self, table_name: &str, row_id: &str) -> RowAccess<'a> {
        RowAccess {
            instruction: self,
            table_name: table_name.to_string(),
            row_id: row_id.to_string(),
        }
    }

    fn context(&self) -> &str {
        let head = self.source.lines().next().unwrap_or("");
        if head.is_empty() {
            "<empty instruction>"
        } else {
            head
        }
    }
}

impl fmt::Display for TrainingInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (table_name, table) in &self.tables {
            writeln!(f, "[ {table_name} ]")?;
            if table.is_empty() {
                writeln!(f, "  (empty table)")?;
                continue;
            }
            let headers: Vec<&String> = table[0].keys().collect();
            for header in &headers {
                write!(f, "{header:>21}")?;
            }
            writeln!(f)?;
            for row in table {
                for header in &headers {
                    match row.get(header.as_str()) {
                        Some(value) => write!(f, "{value:>21}")?,
                        None => write!(f, "{:>21}", "(null)")?,
                    }
                }
                writeln!(f)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Accessor bound to one row of one table, with typed casts over its
/// columns and option entries.
pub struct RowAccess<'a> {
    instruction: &'a TrainingInstruction,
    table_name: String,
    row_id: String,
}

impl RowAccess<'_> {
    pub fn field(&self, column: &str) -> Result<&str, DecodeError> {
        self.instruction
            .get_field(&self.table_name, &self.row_id, column)
    }

    pub fn f64_field(&self, column: &str) -> Result<f64, DecodeError> {
        options::to_f64(self.field(column)?)
    }

    pub fn i64_field(&self, column: &str) -> Result<i64, DecodeError> {
        options::to_i64(self.field(column)?)
    }

    pub fn bool_field(&self, column: &str) -> Result<bool, DecodeError> {
        options::to_bool(self.field(column)?)
    }

    /// A required entry of the row's `options` column.
    pub fn option(&self, key: &str) -> Result<String, DecodeError> {
        let row = self.instruction.get_row(&self.table_name, &self.row_id)?;
        options::require_option(row, key)
    }
}

/// Visitor accumulating the raw `(label, value)` FIFO.
#[derive(Default)]
struct TablesVisitor {
    raw: Vec<RawElement>,
    /// Whether terminal text currently feeds the last raw element.
    active: bool,
}

impl TablesVisitor {
    fn open(&mut self, label: RawLabel) {
        self.raw.push(RawElement {
            label,
            value: String::new(),
        });
        self.active = true;
    }
}

impl AstVisitor for TablesVisitor {
    fn enter(&mut self, node: &AstNode, ctx: &VisitorContext<'_>) {
        match node {
            AstNode::Root { .. } => self.active = false,
            AstNode::Intermediary { .. } => match node.symbol() {
                "<comment>" | "<break_block>" | "<whitespace>" | "<div>" => {
                    self.active = false;
                }
                "<table_title>"
                    if ctx.has_ancestor("<instruction>")
                        && ctx.has_ancestor("<table>")
                        && ctx.has_ancestor("<table_header>") =>
                {
                    self.open(RawLabel::TableTitle);
                }
                "<field>"
                    if ctx.has_ancestor("<instruction>")
                        && ctx.has_ancestor("<table>")
                        && ctx.has_ancestor("<header_line>")
                        && ctx.has_ancestor("<cell>") =>
                {
                    self.open(RawLabel::HeaderLine);
                }
                "<field>"
                    if ctx.has_ancestor("<instruction>")
                        && ctx.has_ancestor("<table>")
                        && ctx.has_ancestor("<item_line>")
                        && ctx.has_ancestor("<cell>") =>
                {
                    self.open(RawLabel::ItemLine);
                }
                _ => {}
            },
            AstNode::Terminal { .. } => {
                if self.active {
                    if let Some(element) = self.raw.last_mut() {
                        // strip double quotes from the accumulated text
                        element
                            .value
                            .extend(node.matched_text().chars().filter(|&c| c != '"'));
                    }
                }
            }
        }
    }
}

fn decode_raw(raw: Vec<RawElement>, source: &str) -> Result<TrainingInstruction, DecodeError> {
    let mut out = TrainingInstruction {
        source: source.to_string(),
        tables: IndexMap::new(),
    };
    let mut current: Option<String> = None;
    let mut headers: Vec<String> = Vec::new();
    let mut header_index = 0usize;

    for element in raw {
        match element.label {
            RawLabel::TableTitle => {
                if header_index != 0 && header_index != headers.len() {
                    return Err(DecodeError::structure(format!(
                        "table left unfinished before '{}'",
                        element.value
                    )));
                }
                headers.clear();
                header_index = 0;
                out.tables.insert(element.value.clone(), Table::new());
                current = Some(element.value);
            }
            RawLabel::HeaderLine => {
                if current.is_none() {
                    return Err(DecodeError::structure(format!(
                        "header cell '{}' appears before any table title",
                        element.value
                    )));
                }
                headers.push(element.value);
                header_index = 0;
            }
            RawLabel::ItemLine => {
                let Some(table_name) = current.as_deref() else {
                    return Err(DecodeError::structure(format!(
                        "item cell '{}' appears before any table title",
                        element.value
                    )));
                };
                if headers.is_empty() {
                    return Err(DecodeError::structure(format!(
                        "item cell '{}' appears before the header line of '{table_name}'",
                        element.value
                    )));
                }
                let table = out
                    .tables
                    .get_mut(table_name)
                    .expect("current table was inserted with its title");
                if header_index == 0 || header_index >= headers.len() {
                    header_index = 0;
                    if headers[0] != ROW_ID_COLUMN {
                        return Err(DecodeError::structure(format!(
                            "first column of table '{table_name}' must be '{ROW_ID_COLUMN}', \
                             found '{}'",
                            headers[0]
                        )));
                    }
                    table.push(Row::new());
                }
                let row = table.last_mut().expect("a row was just opened");
                row.insert(headers[header_index].clone(), element.value);
                header_index += 1;
            }
        }
    }
    Ok(out)
}

/// Grammar-driven decoder for training-component instructions.
///
/// Holds the verified grammar; each `decode` call runs its own parser, so a
/// shared pipeline may decode from multiple threads.
pub struct TrainingPipeline {
    grammar: Grammar,
}

impl TrainingPipeline {
    pub fn new() -> Result<Self, DecodeError> {
        Self::with_grammar(TRAINING_COMPONENTS_GRAMMAR)
    }

    pub fn with_grammar(grammar_text: &str) -> Result<Self, DecodeError> {
        let grammar = Grammar::parse(grammar_text)?;
        grammar.verify()?;
        Ok(Self { grammar })
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn decode(&self, instruction: &str) -> Result<TrainingInstruction, DecodeError> {
        let root = InstructionParser::new(&self.grammar).parse_instruction(instruction)?;
        let mut visitor = TablesVisitor::default();
        walk(&root, &mut visitor);
        debug!(raw = visitor.raw.len(), "decoded raw table events");
        decode_raw(visitor.raw, instruction)
    }
}
