use std::collections::HashMap;

use crate::error::GrammarError;
use crate::lexer::{GrammarLexer, ProductionUnit, UnitKind};
use crate::START_SYMBOL;

/// One `|`-separated right-hand side of a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlternativeKind {
    Single(ProductionUnit),
    Sequence(Vec<ProductionUnit>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductionAlternative {
    /// The rule this alternative belongs to.
    pub lhs: String,
    pub kind: AlternativeKind,
    /// Reserved for future per-alternative options.
    pub flags: u32,
}

impl ProductionAlternative {
    pub fn units(&self) -> &[ProductionUnit] {
        match &self.kind {
            AlternativeKind::Single(unit) => std::slice::from_ref(unit),
            AlternativeKind::Sequence(units) => units,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductionRule {
    pub lhs: String,
    pub alternatives: Vec<ProductionAlternative>,
}

/// An ordered set of production rules, indexed by left-hand side.
///
/// [`Grammar::parse`] performs the structural checks (start symbol first,
/// no duplicate rules, no empty alternatives, no bare self-references);
/// [`Grammar::verify`] additionally resolves every reference, including the
/// ones inside optional and repetition groups.
#[derive(Debug, Clone)]
pub struct Grammar {
    rules: Vec<ProductionRule>,
    index: HashMap<String, usize>,
}

impl Grammar {
    pub fn parse(text: &str) -> Result<Grammar, GrammarError> {
        let units = GrammarLexer::new(text).lex()?;
        GrammarParser { units, pos: 0 }.parse()
    }

    pub fn rule(&self, lhs: &str) -> Option<&ProductionRule> {
        self.index.get(lhs).map(|&i| &self.rules[i])
    }

    pub fn rules(&self) -> &[ProductionRule] {
        &self.rules
    }

    pub fn verify(&self) -> Result<(), GrammarError> {
        for rule in &self.rules {
            for alternative in &rule.alternatives {
                for unit in alternative.units() {
                    let reference = match unit.kind {
                        UnitKind::NonTerminal => unit.lexeme.as_str(),
                        UnitKind::Optional | UnitKind::Repetition => unit.inner_name(),
                        _ => continue,
                    };
                    if !self.index.contains_key(reference) {
                        return Err(GrammarError::UnresolvedReference {
                            rule: rule.lhs.clone(),
                            reference: reference.to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

struct GrammarParser {
    units: Vec<ProductionUnit>,
    pos: usize,
}

impl GrammarParser {
    fn parse(mut self) -> Result<Grammar, GrammarError> {
        let mut rules: Vec<ProductionRule> = Vec::new();
        let mut index = HashMap::new();

        while self.peek().kind != UnitKind::EndOfFile {
            let rule = self.rule()?;
            if rules.is_empty() && rule.lhs != START_SYMBOL {
                return Err(GrammarError::MissingStartSymbol(rule.lhs));
            }
            if index.contains_key(&rule.lhs) {
                return Err(GrammarError::DuplicateRule(rule.lhs));
            }
            index.insert(rule.lhs.clone(), rules.len());
            rules.push(rule);
        }
        if rules.is_empty() {
            return Err(GrammarError::Empty);
        }
        Ok(Grammar { rules, index })
    }

    fn peek(&self) -> &ProductionUnit {
        &self.units[self.pos.min(self.units.len() - 1)]
    }

    fn bump(&mut self) -> ProductionUnit {
        let unit = self.peek().clone();
        if self.pos + 1 < self.units.len() {
            self.pos += 1;
        }
        unit
    }

    fn rule(&mut self) -> Result<ProductionRule, GrammarError> {
        let lhs_unit = self.bump();
        if lhs_unit.kind != UnitKind::NonTerminal {
            return Err(GrammarError::NotNonTerminal(lhs_unit.lexeme));
        }
        let lhs = lhs_unit.lexeme;

        let assign = self.bump();
        if assign.kind != UnitKind::Punctuation || assign.lexeme != "::=" {
            return Err(GrammarError::ExpectedAssign {
                rule: lhs,
                found: assign.lexeme,
            });
        }

        let mut alternatives = Vec::new();
        let mut current: Vec<ProductionUnit> = Vec::new();
        loop {
            let unit = self.bump();
            match (unit.kind, unit.lexeme.as_str()) {
                (UnitKind::Punctuation, "|") => {
                    alternatives.push(alternative(&lhs, std::mem::take(&mut current))?);
                }
                (UnitKind::Punctuation, ";") => {
                    alternatives.push(alternative(&lhs, std::mem::take(&mut current))?);
                    break;
                }
                (UnitKind::Punctuation, _) => {
                    return Err(GrammarError::UnexpectedAssign(lhs));
                }
                (UnitKind::EndOfFile, _) => {
                    return Err(GrammarError::MissingSemicolon(lhs));
                }
                (
                    UnitKind::Terminal
                    | UnitKind::NonTerminal
                    | UnitKind::Optional
                    | UnitKind::Repetition,
                    _,
                ) => current.push(unit),
                (UnitKind::Undetermined, _) => {
                    return Err(GrammarError::NotNonTerminal(unit.lexeme));
                }
            }
        }

        Ok(ProductionRule { lhs, alternatives })
    }
}

fn alternative(
    lhs: &str,
    mut units: Vec<ProductionUnit>,
) -> Result<ProductionAlternative, GrammarError> {
    if units.is_empty() {
        return Err(GrammarError::EmptyAlternative(lhs.to_string()));
    }
    if units.len() == 1 && units[0].kind == UnitKind::NonTerminal && units[0].lexeme == lhs {
        return Err(GrammarError::TrivialRecursion(lhs.to_string()));
    }
    let kind = if units.len() == 1 {
        AlternativeKind::Single(units.pop().expect("length checked"))
    } else {
        AlternativeKind::Sequence(units)
    };
    Ok(ProductionAlternative {
        lhs: lhs.to_string(),
        kind,
        flags: 0,
    })
}
