use camahjucunu_bnf::{AlternativeKind, Grammar, GrammarError, LexError, UnitKind};
use pretty_assertions::assert_eq;

const BASIC_INSTRUCTION: &str = "\
<instruction>          ::= <symbol_spec> <parameter_list> <file_id_list> ;
<symbol_spec>          ::= \"<\" <identifier> \">\" ;
<parameter_list>       ::= \"(\" <parameters> \")\" ;
<parameters>           ::= <parameter> \",\" <parameters> | <parameter> ;
<parameter>            ::= <identifier> \"=\" <identifier> ;
<file_id_list>         ::= \"[\" <file_ids> \"]\" ;
<file_ids>             ::= <identifier> \",\" <file_ids> | <identifier> ;
<identifier>           ::= <alphanumeric_string> ;
<alphanumeric_string>  ::= <letter_or_digit> | <letter_or_digit> <alphanumeric_string> ;
<letter_or_digit>      ::= <letter> | <digit> ;
<letter>               ::= \"A\" | \"B\" | \"C\" ;
<digit>                ::= \"0\" | \"1\" | \"2\" ;
";

fn alternative_lexemes(grammar: &Grammar, lhs: &str) -> Vec<Vec<String>> {
    grammar
        .rule(lhs)
        .unwrap_or_else(|| panic!("rule {lhs} missing"))
        .alternatives
        .iter()
        .map(|alt| alt.units().iter().map(|u| u.lexeme.clone()).collect())
        .collect()
}

#[test]
fn parses_basic_instruction_grammar() {
    let grammar = Grammar::parse(BASIC_INSTRUCTION).expect("grammar parses");
    assert_eq!(grammar.rules().len(), 12);

    assert_eq!(
        alternative_lexemes(&grammar, "<instruction>"),
        vec![vec![
            "<symbol_spec>".to_string(),
            "<parameter_list>".to_string(),
            "<file_id_list>".to_string(),
        ]]
    );
    assert_eq!(
        alternative_lexemes(&grammar, "<parameters>"),
        vec![
            vec![
                "<parameter>".to_string(),
                "\",\"".to_string(),
                "<parameters>".to_string(),
            ],
            vec!["<parameter>".to_string()],
        ]
    );
    assert_eq!(
        alternative_lexemes(&grammar, "<letter>"),
        vec![
            vec!["\"A\"".to_string()],
            vec!["\"B\"".to_string()],
            vec!["\"C\"".to_string()],
        ]
    );

    grammar.verify().expect("all references resolve");
}

#[test]
fn single_and_sequence_classification() {
    let grammar = Grammar::parse(
        "<instruction> ::= <a> | <a> <b> ;\n\
         <a> ::= \"a\" ;\n\
         <b> ::= \"b\" ;\n",
    )
    .unwrap();
    let rule = grammar.rule("<instruction>").unwrap();
    assert!(matches!(rule.alternatives[0].kind, AlternativeKind::Single(_)));
    assert!(matches!(
        rule.alternatives[1].kind,
        AlternativeKind::Sequence(_)
    ));
    if let AlternativeKind::Single(unit) = &rule.alternatives[0].kind {
        assert_eq!(unit.kind, UnitKind::NonTerminal);
    }
}

#[test]
fn parses_groups_in_alternatives() {
    let grammar = Grammar::parse(
        "<instruction> ::= [ <flag> ] { <word> } ;\n\
         <flag> ::= \"-\" ;\n\
         <word> ::= \"w\" ;\n",
    )
    .unwrap();
    let units = grammar.rule("<instruction>").unwrap().alternatives[0].units();
    assert_eq!(units[0].kind, UnitKind::Optional);
    assert_eq!(units[0].inner_name(), "<flag>");
    assert_eq!(units[1].kind, UnitKind::Repetition);
    assert_eq!(units[1].inner_name(), "<word>");
    grammar.verify().unwrap();
}

#[test]
fn rejects_missing_semicolon() {
    let err = Grammar::parse("<instruction> ::= <symbol_spec> <parameter_list>\n").unwrap_err();
    assert_eq!(
        err,
        GrammarError::MissingSemicolon("<instruction>".to_string())
    );
}

#[test]
fn rejects_start_symbol_other_than_instruction() {
    let err = Grammar::parse("<command> ::= \"run\" ;\n").unwrap_err();
    assert_eq!(err, GrammarError::MissingStartSymbol("<command>".to_string()));
}

#[test]
fn rejects_terminal_left_hand_side() {
    let err = Grammar::parse("\"run\" ::= <parameters> ;\n").unwrap_err();
    assert_eq!(err, GrammarError::NotNonTerminal("\"run\"".to_string()));
}

#[test]
fn rejects_missing_assign() {
    let err = Grammar::parse("<instruction> <symbol_spec> <parameter_list> ;\n").unwrap_err();
    assert!(matches!(err, GrammarError::ExpectedAssign { .. }));
}

#[test]
fn rejects_assign_in_right_hand_side() {
    let err =
        Grammar::parse("<instruction> ::= <symbol_spec> ::= <parameter_list> ;\n").unwrap_err();
    assert_eq!(
        err,
        GrammarError::UnexpectedAssign("<instruction>".to_string())
    );
}

#[test]
fn rejects_empty_alternative() {
    let err = Grammar::parse("<instruction> ::= ;\n").unwrap_err();
    assert_eq!(
        err,
        GrammarError::EmptyAlternative("<instruction>".to_string())
    );
}

#[test]
fn rejects_bare_self_reference() {
    let err = Grammar::parse("<instruction> ::= <instruction> ;\n").unwrap_err();
    assert_eq!(
        err,
        GrammarError::TrivialRecursion("<instruction>".to_string())
    );
}

#[test]
fn rejects_duplicate_rules() {
    let err = Grammar::parse(
        "<instruction> ::= <symbol_spec> ;\n\
         <instruction> ::= <parameter_list> ;\n\
         <symbol_spec> ::= \"s\" ;\n\
         <parameter_list> ::= \"p\" ;\n",
    )
    .unwrap_err();
    assert_eq!(err, GrammarError::DuplicateRule("<instruction>".to_string()));
}

#[test]
fn rejects_invalid_unit() {
    let err = Grammar::parse("<instruction> ::= %invalid% ;\n").unwrap_err();
    assert!(matches!(
        err,
        GrammarError::Lex(LexError::UnknownCharacter { ch: '%', .. })
    ));
}

#[test]
fn undefined_reference_parses_until_verify() {
    let grammar = Grammar::parse("<instruction> ::= <undefined_non_terminal> ;\n")
        .expect("structure is valid");
    let err = grammar.verify().unwrap_err();
    assert_eq!(
        err,
        GrammarError::UnresolvedReference {
            rule: "<instruction>".to_string(),
            reference: "<undefined_non_terminal>".to_string(),
        }
    );
}

#[test]
fn verify_checks_group_inners() {
    let grammar = Grammar::parse("<instruction> ::= \"x\" [ <missing> ] ;\n").unwrap();
    let err = grammar.verify().unwrap_err();
    assert!(matches!(err, GrammarError::UnresolvedReference { .. }));
}

#[test]
fn rejects_empty_grammar() {
    assert_eq!(Grammar::parse("# only a comment\n").unwrap_err(), GrammarError::Empty);
}
