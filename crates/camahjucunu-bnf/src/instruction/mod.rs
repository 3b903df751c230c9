mod lexer;

pub use lexer::InstructionLexer;

use crate::ast::AstNode;
use crate::error::ParseReport;
use crate::grammar::{AlternativeKind, Grammar, ProductionAlternative, ProductionRule};
use crate::lexer::{ProductionUnit, UnitKind};
use crate::limit::LimitTracker;
use crate::START_SYMBOL;

use tracing::debug;

/// Chosen well below the depth at which deeply recursive grammars would
/// overflow the stack; left-recursive rules hit this limit and fail the
/// parse instead.
const DEFAULT_RECURSION_LIMIT: usize = 500;

/// Recursive-descent parser over a [`Grammar`].
///
/// For every rule all alternatives are attempted from the same start
/// position; the one that consumes the most input wins, and among equal
/// maxima the first found is kept. Optional groups never fail (an absent
/// optional yields a zero-width terminal); repetition groups fail when they
/// match zero times. Callers rely on that floor, so it is the contract even
/// though it diverges from classic BNF `{ x }`.
///
/// The parser holds mutable state (lexer position, diagnostic stacks,
/// failure position); create one per concurrent parse.
#[derive(Debug)]
pub struct InstructionParser<'g> {
    grammar: &'g Grammar,
    lexer: InstructionLexer,
    success_stack: Vec<String>,
    error_stack: Vec<String>,
    failure_position: usize,
    recursion: LimitTracker,
    limit_exceeded: bool,
}

impl<'g> InstructionParser<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Self {
            grammar,
            lexer: InstructionLexer::default(),
            success_stack: Vec::new(),
            error_stack: Vec::new(),
            failure_position: 0,
            recursion: LimitTracker::new(DEFAULT_RECURSION_LIMIT),
            limit_exceeded: false,
        }
    }

    /// Configure the recursion limit to use while parsing.
    pub fn recursion_limit(mut self, limit: usize) -> Self {
        self.recursion = LimitTracker::new(limit);
        self
    }

    /// Parse `input` against the `<instruction>` rule.
    ///
    /// Succeeds only when the whole input is consumed; the returned tree is
    /// the matched node wrapped in a `Root`.
    pub fn parse_instruction(&mut self, input: &str) -> Result<AstNode, ParseReport> {
        self.lexer.set_input(input);
        self.success_stack.clear();
        self.error_stack.clear();
        self.failure_position = 0;
        self.recursion.reset();
        self.limit_exceeded = false;

        let node = match self.grammar.rule(START_SYMBOL) {
            Some(rule) => self.parse_rule(rule),
            None => {
                self.error_stack
                    .push(format!("grammar defines no {START_SYMBOL} rule"));
                None
            }
        };

        match node {
            Some(node) if self.lexer.is_at_end() && !self.limit_exceeded => Ok(AstNode::Root {
                lhs: START_SYMBOL.to_string(),
                children: vec![node],
            }),
            other => {
                if other.is_some() && !self.lexer.is_at_end() {
                    self.error_stack.push(format!(
                        "trailing input after {START_SYMBOL} at position {}",
                        self.lexer.position()
                    ));
                }
                if self.limit_exceeded {
                    self.error_stack.push(format!(
                        "recursion limit of {} exceeded",
                        self.recursion.limit
                    ));
                }
                debug!(
                    failure_position = self.failure_position,
                    "instruction parse failed"
                );
                Err(ParseReport {
                    input: input.to_string(),
                    failure_position: self.failure_position.min(self.lexer.len()),
                    success_stack: self.success_stack.clone(),
                    error_stack: self.error_stack.clone(),
                })
            }
        }
    }

    fn parse_rule(&mut self, rule: &'g ProductionRule) -> Option<AstNode> {
        self.recursion.consume();
        if self.recursion.limited() {
            self.limit_exceeded = true;
            self.recursion.pop();
            return None;
        }
        let node = self.rule_alternatives(rule);
        self.recursion.pop();
        node
    }

    fn rule_alternatives(&mut self, rule: &'g ProductionRule) -> Option<AstNode> {
        let initial = self.lexer.position();
        let mut matches: Vec<(AstNode, usize)> = Vec::new();

        for alternative in &rule.alternatives {
            self.lexer.set_position(initial);
            if let Some(node) = self.parse_alternative(alternative) {
                matches.push((node, self.lexer.position()));
            }
        }

        if matches.is_empty() {
            self.error_stack
                .push(format!("unable to parse rule {}", rule.lhs));
            self.lexer.set_position(initial);
            return None;
        }
        if matches.len() > 1 {
            self.error_stack.push(format!(
                "multiple alternatives [{}] matched for rule {}",
                matches.len(),
                rule.lhs
            ));
        }

        // Longest match; strict `>` keeps the first found among equal maxima.
        let mut best = 0;
        for (i, candidate) in matches.iter().enumerate().skip(1) {
            if candidate.1 > matches[best].1 {
                best = i;
            }
        }
        let (node, end) = matches.swap_remove(best);
        self.lexer.set_position(end);
        self.success_stack
            .push(format!("parsed rule {} [end {end}]", rule.lhs));
        Some(node)
    }

    fn parse_alternative(&mut self, alternative: &'g ProductionAlternative) -> Option<AstNode> {
        let units = alternative.units();
        if units.is_empty() {
            return None;
        }
        let start = self.lexer.position();
        let mut children = Vec::new();

        for unit in units {
            match self.parse_unit(alternative, unit) {
                Some(child) => {
                    if unit.kind == UnitKind::Repetition {
                        // Spread the collected children directly into the
                        // sequence instead of nesting one more level.
                        if let AstNode::Intermediary {
                            children: repeated, ..
                        } = child
                        {
                            children.extend(repeated);
                        } else {
                            children.push(child);
                        }
                    } else {
                        children.push(child);
                    }
                }
                None => {
                    self.lexer.set_position(start);
                    return None;
                }
            }
        }

        if let AlternativeKind::Single(unit) = &alternative.kind {
            if unit.kind == UnitKind::Terminal {
                return children.into_iter().next();
            }
        }
        Some(AstNode::Intermediary {
            alt: alternative.clone(),
            children,
        })
    }

    fn parse_unit(
        &mut self,
        alternative: &'g ProductionAlternative,
        unit: &'g ProductionUnit,
    ) -> Option<AstNode> {
        match unit.kind {
            UnitKind::Terminal => self.parse_terminal(&alternative.lhs, unit),
            UnitKind::NonTerminal => {
                let rule = self.lookup(&alternative.lhs, &unit.lexeme)?;
                self.parse_rule(rule)
            }
            UnitKind::Optional => {
                let rule = self.lookup(&alternative.lhs, unit.inner_name())?;
                match self.parse_rule(rule) {
                    Some(child) => Some(child),
                    // An absent optional still succeeds, as a zero-width
                    // terminal.
                    None => Some(AstNode::Terminal {
                        lhs: alternative.lhs.clone(),
                        unit: ProductionUnit::empty_terminal(),
                    }),
                }
            }
            UnitKind::Repetition => {
                let rule = self.lookup(&alternative.lhs, unit.inner_name())?;
                let mut children = Vec::new();
                loop {
                    let before = self.lexer.position();
                    let Some(child) = self.parse_rule(rule) else {
                        break;
                    };
                    children.push(child);
                    if self.lexer.position() == before {
                        // zero-width match; collecting it again would never
                        // terminate
                        break;
                    }
                }
                if children.is_empty() {
                    return None;
                }
                Some(AstNode::Intermediary {
                    alt: alternative.clone(),
                    children,
                })
            }
            UnitKind::Punctuation | UnitKind::EndOfFile | UnitKind::Undetermined => {
                unreachable!("grammar construction rejects {:?} inside alternatives", unit.kind)
            }
        }
    }

    fn parse_terminal(&mut self, lhs: &str, unit: &'g ProductionUnit) -> Option<AstNode> {
        let start = self.lexer.position();
        let expected = unit.dequoted_text();

        for ch in expected.chars() {
            if self.lexer.peek() != Some(ch) {
                self.error_stack.push(format!(
                    "terminal {} mismatch: expected {:?}, lexer at {:?}",
                    unit.lexeme,
                    ch,
                    self.lexer.peek()
                ));
                self.failure_position = self.lexer.position();
                self.lexer.set_position(start);
                return None;
            }
            self.lexer.advance();
        }

        // Keep only the latest failure: a successful terminal match clears
        // the error stack.
        self.error_stack.clear();
        Some(AstNode::Terminal {
            lhs: lhs.to_string(),
            unit: unit.clone(),
        })
    }

    fn lookup(&mut self, lhs: &str, name: &str) -> Option<&'g ProductionRule> {
        let rule = self.grammar.rule(name);
        if rule.is_none() {
            self.error_stack.push(format!(
                "rule {lhs} references undefined non-terminal {name}"
            ));
        }
        rule
    }
}
