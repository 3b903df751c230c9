mod cursor;
mod unit;

use crate::error::LexError;
use cursor::Cursor;

pub use unit::{ProductionUnit, UnitKind};

/// Tokenizes BNF grammar text into [`ProductionUnit`]s.
///
/// Recognized units: `<name>` references, `"…"`/`'…'` literals with standard
/// escapes, `[ <name> ]` optional groups, `{ <name> }` repetition groups and
/// the `::=` `|` `;` punctuation. Whitespace and `#`-to-end-of-line comments
/// are skipped.
pub struct GrammarLexer<'a> {
    cursor: Cursor<'a>,
}

impl<'a> GrammarLexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            cursor: Cursor::new(input),
        }
    }

    /// Lex the whole input. The returned stream always ends with an
    /// `EndOfFile` unit.
    pub fn lex(mut self) -> Result<Vec<ProductionUnit>, LexError> {
        let mut units = Vec::new();
        loop {
            self.skip_trivia();
            let line = self.cursor.line();
            let column = self.cursor.column();

            let Some(first) = self.cursor.first() else {
                units.push(ProductionUnit::new(UnitKind::EndOfFile, "", line, column));
                return Ok(units);
            };

            let unit = match first {
                '<' => self.non_terminal(line, column)?,
                '"' | '\'' => self.terminal(line, column)?,
                '[' => self.group('[', ']', UnitKind::Optional, line, column)?,
                '{' => self.group('{', '}', UnitKind::Repetition, line, column)?,
                ':' => self.assign(line, column)?,
                '|' => {
                    self.cursor.bump();
                    ProductionUnit::new(UnitKind::Punctuation, "|", line, column)
                }
                ';' => {
                    self.cursor.bump();
                    ProductionUnit::new(UnitKind::Punctuation, ";", line, column)
                }
                other => {
                    return Err(LexError::UnknownCharacter {
                        ch: other,
                        line,
                        column,
                    })
                }
            };
            units.push(unit);
        }
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.cursor.first() {
                Some(c) if c.is_whitespace() => {
                    self.cursor.bump();
                }
                Some('#') => {
                    while let Some(c) = self.cursor.bump() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                _ => return,
            }
        }
    }

    fn non_terminal(&mut self, line: usize, column: usize) -> Result<ProductionUnit, LexError> {
        self.cursor.bump(); // `<`
        let mut name = String::new();
        while let Some(c) = self.cursor.first() {
            if is_ident_char(c) || (name.is_empty() && is_ident_start(c)) {
                name.push(c);
                self.cursor.bump();
            } else {
                break;
            }
        }
        if name.is_empty() || !is_ident_start(name.chars().next().unwrap_or('0')) {
            return Err(LexError::MalformedGroup {
                expected: "identifier after `<`",
                line,
                column,
            });
        }
        if !self.cursor.eat('>') {
            return Err(LexError::MalformedGroup {
                expected: "`>` closing a non-terminal reference",
                line,
                column,
            });
        }
        Ok(ProductionUnit::new(
            UnitKind::NonTerminal,
            format!("<{name}>"),
            line,
            column,
        ))
    }

    fn terminal(&mut self, line: usize, column: usize) -> Result<ProductionUnit, LexError> {
        let quote = self.cursor.bump().expect("caller checked the quote");
        let mut lexeme = String::new();
        lexeme.push(quote);
        loop {
            match self.cursor.bump() {
                None | Some('\n') => {
                    return Err(LexError::UnterminatedLiteral { line, column });
                }
                Some('\\') => {
                    lexeme.push('\\');
                    match self.cursor.bump() {
                        Some(escaped) => lexeme.push(escaped),
                        None => return Err(LexError::UnterminatedLiteral { line, column }),
                    }
                }
                Some(c) if c == quote => {
                    lexeme.push(c);
                    return Ok(ProductionUnit::new(UnitKind::Terminal, lexeme, line, column));
                }
                Some(c) => lexeme.push(c),
            }
        }
    }

    fn group(
        &mut self,
        open: char,
        close: char,
        kind: UnitKind,
        line: usize,
        column: usize,
    ) -> Result<ProductionUnit, LexError> {
        self.cursor.bump(); // the opening bracket
        self.skip_trivia();
        if self.cursor.first() != Some('<') {
            return Err(LexError::MalformedGroup {
                expected: "a `<name>` reference inside the group",
                line,
                column,
            });
        }
        let inner = self.non_terminal(line, column)?;
        self.skip_trivia();
        if !self.cursor.eat(close) {
            return Err(LexError::MalformedGroup {
                expected: "the closing group bracket",
                line,
                column,
            });
        }
        Ok(ProductionUnit::new(
            kind,
            format!("{open}{}{close}", inner.lexeme),
            line,
            column,
        ))
    }

    fn assign(&mut self, line: usize, column: usize) -> Result<ProductionUnit, LexError> {
        self.cursor.bump(); // first `:`
        if self.cursor.eat(':') && self.cursor.eat('=') {
            return Ok(ProductionUnit::new(
                UnitKind::Punctuation,
                "::=",
                line,
                column,
            ));
        }
        Err(LexError::MalformedGroup {
            expected: "`::=`",
            line,
            column,
        })
    }
}

fn is_ident_start(c: char) -> bool {
    matches!(c, 'a'..='z' | 'A'..='Z' | '_')
}

fn is_ident_char(c: char) -> bool {
    matches!(c, 'a'..='z' | 'A'..='Z' | '0'..='9' | '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(input: &str) -> Vec<ProductionUnit> {
        GrammarLexer::new(input).lex().expect("lexes")
    }

    #[test]
    fn lexes_a_rule() {
        let units = lex("<instruction> ::= \"run\" | <cell> ;");
        let kinds: Vec<UnitKind> = units.iter().map(|u| u.kind).collect();
        assert_eq!(
            kinds,
            vec![
                UnitKind::NonTerminal,
                UnitKind::Punctuation,
                UnitKind::Terminal,
                UnitKind::Punctuation,
                UnitKind::NonTerminal,
                UnitKind::Punctuation,
                UnitKind::EndOfFile,
            ]
        );
        assert_eq!(units[0].lexeme, "<instruction>");
        assert_eq!(units[2].lexeme, "\"run\"");
    }

    #[test]
    fn lexes_groups() {
        let units = lex("[ <cell> ] { <row> }");
        assert_eq!(units[0].kind, UnitKind::Optional);
        assert_eq!(units[0].lexeme, "[<cell>]");
        assert_eq!(units[0].inner_name(), "<cell>");
        assert_eq!(units[1].kind, UnitKind::Repetition);
        assert_eq!(units[1].lexeme, "{<row>}");
    }

    #[test]
    fn skips_comments_and_tracks_lines() {
        let units = lex("# heading\n<a> ::= \"x\" ;");
        assert_eq!(units[0].lexeme, "<a>");
        assert_eq!(units[0].line, 2);
        assert_eq!(units[0].column, 1);
    }

    #[test]
    fn rejects_unterminated_literal() {
        let err = GrammarLexer::new("<a> ::= \"run ;").lex().unwrap_err();
        assert!(matches!(err, LexError::UnterminatedLiteral { .. }));
    }

    #[test]
    fn rejects_unknown_character() {
        let err = GrammarLexer::new("<a> ::= %invalid% ;").lex().unwrap_err();
        assert!(matches!(err, LexError::UnknownCharacter { ch: '%', .. }));
    }

    #[test]
    fn escaped_quote_stays_inside_literal() {
        let units = lex(r#"<a> ::= "say \"hi\"" ;"#);
        assert_eq!(units[2].dequoted_text(), "say \"hi\"");
    }
}
