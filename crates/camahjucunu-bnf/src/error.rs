use std::fmt;

use ariadne::{Color, Label, Report, ReportKind, Source};

/// Grammar tokenization failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    #[error("unterminated literal at line {line}, column {column}")]
    UnterminatedLiteral { line: usize, column: usize },
    #[error("malformed token at line {line}, column {column}: expected {expected}")]
    MalformedGroup {
        expected: &'static str,
        line: usize,
        column: usize,
    },
    #[error("unknown character `{ch}` at line {line}, column {column}")]
    UnknownCharacter {
        ch: char,
        line: usize,
        column: usize,
    },
}

/// Structural failure while building or verifying a [`Grammar`].
///
/// [`Grammar`]: crate::Grammar
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrammarError {
    #[error("grammar must begin with the `<instruction>` rule, found `{0}`")]
    MissingStartSymbol(String),
    #[error("left-hand side `{0}` is not a non-terminal")]
    NotNonTerminal(String),
    #[error("expected `::=` after `{rule}`, found `{found}`")]
    ExpectedAssign { rule: String, found: String },
    #[error("unexpected `::=` in the right-hand side of `{0}`")]
    UnexpectedAssign(String),
    #[error("missing `;` at the end of `{0}`")]
    MissingSemicolon(String),
    #[error("empty alternative in `{0}`")]
    EmptyAlternative(String),
    #[error("rule `{0}` consists only of a reference to itself")]
    TrivialRecursion(String),
    #[error("duplicate rule `{0}`")]
    DuplicateRule(String),
    #[error("rule `{rule}` references undefined non-terminal `{reference}`")]
    UnresolvedReference { rule: String, reference: String },
    #[error("grammar defines no rules")]
    Empty,
    #[error(transparent)]
    Lex(#[from] LexError),
}

/// Number of success-diagnostic lines kept in a rendered [`ParseReport`].
pub const SUCCESS_STACK_LIMIT: usize = 50;

/// Failure report from [`InstructionParser::parse_instruction`].
///
/// Rendering (`Display`) shows the input with a caret at `failure_position`,
/// then the latest success diagnostics (newest first, truncated to
/// [`SUCCESS_STACK_LIMIT`]) and the surviving error diagnostics.
///
/// [`InstructionParser::parse_instruction`]: crate::InstructionParser::parse_instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseReport {
    pub input: String,
    /// Char offset of the failed terminal match; always `<=` input length.
    pub failure_position: usize,
    pub success_stack: Vec<String>,
    pub error_stack: Vec<String>,
}

impl ParseReport {
    fn caret(&self) -> String {
        // ariadne spans are char offsets, which is what the instruction
        // lexer tracks.
        let len = self.input.chars().count();
        let start = self.failure_position.min(len);
        let end = (start + 1).min(len).max(start);
        let mut rendered = Vec::new();
        let write = Report::build(ReportKind::Error, (), start)
            .with_message("could not parse instruction")
            .with_label(
                Label::new(start..end)
                    .with_message("no production matched from here")
                    .with_color(Color::Red),
            )
            .finish()
            .write(Source::from(self.input.as_str()), &mut rendered);
        match write {
            Ok(()) => String::from_utf8_lossy(&rendered).into_owned(),
            Err(_) => format!(
                "could not parse instruction (failure at char {start}): {}",
                self.input
            ),
        }
    }
}

impl fmt::Display for ParseReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.caret())?;
        writeln!(f, "production failures:")?;
        for line in self.error_stack.iter().rev() {
            writeln!(f, "    {line}")?;
        }
        writeln!(f, "production successes:")?;
        if self.success_stack.len() > SUCCESS_STACK_LIMIT {
            writeln!(f, "    ...truncated to {SUCCESS_STACK_LIMIT} entries...")?;
        }
        for line in self.success_stack.iter().rev().take(SUCCESS_STACK_LIMIT) {
            writeln!(f, "    {line}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseReport {}
