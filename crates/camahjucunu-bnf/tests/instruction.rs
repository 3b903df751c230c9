use camahjucunu_bnf::{AstNode, Grammar, InstructionParser};
use pretty_assertions::assert_eq;

fn parse(grammar_text: &str, input: &str) -> Result<AstNode, camahjucunu_bnf::ParseReport> {
    let grammar = Grammar::parse(grammar_text).expect("grammar parses");
    grammar.verify().expect("grammar verifies");
    InstructionParser::new(&grammar).parse_instruction(input)
}

#[test]
fn alternative_ranking_prefers_longest_match() {
    // One alternative is a strict prefix of the other; the parser must take
    // the branch that consumes more input.
    let root = parse("<instruction> ::= \"A\" | \"AB\" ;\n", "AB").expect("parses");

    let AstNode::Root { lhs, children } = &root else {
        panic!("expected a root node");
    };
    assert_eq!(lhs, "<instruction>");
    assert_eq!(children.len(), 1);
    let AstNode::Terminal { unit, .. } = &children[0] else {
        panic!("expected the winning terminal directly under the root");
    };
    assert_eq!(unit.dequoted_text(), "AB");
    assert_eq!(root.flatten(), "AB");
}

#[test]
fn equal_maxima_keep_the_first_alternative() {
    let grammar = Grammar::parse("<instruction> ::= \"AB\" | \"A\" \"B\" ;\n").unwrap();
    let root = InstructionParser::new(&grammar)
        .parse_instruction("AB")
        .unwrap();
    // Both alternatives end at 2; the first found must win, and the first is
    // a single terminal (no intermediary wrapper).
    let AstNode::Root { children, .. } = &root else {
        panic!("expected root");
    };
    assert!(matches!(children[0], AstNode::Terminal { .. }));
}

#[test]
fn optional_succeeds_on_empty_input() {
    let root = parse(
        "<instruction> ::= [ <y> ] ;\n<y> ::= \"y\" ;\n",
        "",
    )
    .expect("an absent optional is not a failure");
    // The absent optional materializes as a zero-width terminal.
    let AstNode::Root { children, .. } = &root else {
        panic!("expected root");
    };
    let inner = &children[0];
    assert_eq!(inner.children().len(), 1);
    assert_eq!(inner.children()[0].matched_text(), "");
    assert_eq!(root.flatten(), "");
}

#[test]
fn optional_consumes_when_present() {
    let root = parse("<instruction> ::= [ <y> ] ;\n<y> ::= \"y\" ;\n", "y").unwrap();
    assert_eq!(root.flatten(), "y");
}

#[test]
fn repetition_fails_on_zero_matches() {
    let grammar_text = "<instruction> ::= { <y> } ;\n<y> ::= \"y\" ;\n";
    assert!(parse(grammar_text, "x").is_err());
    assert!(parse(grammar_text, "").is_err());
    assert_eq!(parse(grammar_text, "yyy").unwrap().flatten(), "yyy");
}

#[test]
fn repetition_children_spread_into_parent_sequence() {
    let root = parse(
        "<instruction> ::= { <item> } \"end\" ;\n<item> ::= \"x\" ;\n",
        "xxend",
    )
    .unwrap();
    let AstNode::Root { children, .. } = &root else {
        panic!("expected root");
    };
    // two spread <item> terminals plus the "end" terminal, no extra nesting
    assert_eq!(children[0].children().len(), 3);
    assert_eq!(root.flatten(), "xxend");
}

#[test]
fn sequence_failure_resets_to_sequence_start() {
    let root = parse("<instruction> ::= \"ab\" \"cd\" | \"abc\" ;\n", "abc").unwrap();
    assert_eq!(root.flatten(), "abc");
}

#[test]
fn flatten_reproduces_consumed_input() {
    let grammar_text = "\
<instruction>          ::= <parameter_list> ;
<parameter_list>       ::= \"(\" <alphanumeric_string> \")\" ;
<alphanumeric_string>  ::= <letter_or_digit> | <letter_or_digit> <alphanumeric_string> ;
<letter_or_digit>      ::= <letter> | <digit> ;
<letter>               ::= \"A\" | \"B\" | \"C\" ;
<digit>                ::= \"0\" | \"1\" | \"2\" ;
";
    let root = parse(grammar_text, "(A1B2)").expect("parses");
    assert_eq!(root.flatten(), "(A1B2)");
}

#[test]
fn trailing_input_is_a_parse_error() {
    let err = parse("<instruction> ::= \"A\" ;\n", "AB").unwrap_err();
    assert!(err.failure_position <= 2);
    let rendered = err.to_string();
    assert!(rendered.contains("could not parse instruction"));
    assert!(rendered.contains("production failures"));
}

#[test]
fn failure_position_is_bounded_by_input_length() {
    let err = parse(
        "<instruction> ::= \"hello\" ;\n",
        "help",
    )
    .unwrap_err();
    assert!(err.failure_position <= 4);
    assert!(!err.error_stack.is_empty());
}

#[test]
fn left_recursive_rule_fails_instead_of_hanging() {
    let grammar = Grammar::parse(
        "<instruction> ::= <instruction> \"a\" | \"a\" ;\n",
    )
    .unwrap();
    let err = InstructionParser::new(&grammar)
        .parse_instruction("aa")
        .unwrap_err();
    assert!(err
        .error_stack
        .iter()
        .any(|line| line.contains("recursion limit")));
}

#[test]
fn escaped_terminals_match_real_characters() {
    let root = parse(
        "<instruction> ::= \"a\" \"\\n\" \"b\" ;\n",
        "a\nb",
    )
    .unwrap();
    assert_eq!(root.flatten(), "a\nb");
}

#[test]
fn parsed_tree_equals_hand_built_tree() {
    let grammar = Grammar::parse(
        "<instruction> ::= <pair> ;\n\
         <pair> ::= \"a\" \"b\" ;\n",
    )
    .unwrap();
    let root = InstructionParser::new(&grammar)
        .parse_instruction("ab")
        .unwrap();

    let instruction_alt = grammar.rule("<instruction>").unwrap().alternatives[0].clone();
    let pair_alt = grammar.rule("<pair>").unwrap().alternatives[0].clone();
    let units = pair_alt.units().to_vec();
    let expected = AstNode::Root {
        lhs: "<instruction>".to_string(),
        children: vec![AstNode::Intermediary {
            alt: instruction_alt,
            children: vec![AstNode::Intermediary {
                alt: pair_alt,
                children: vec![
                    AstNode::Terminal {
                        lhs: "<pair>".to_string(),
                        unit: units[0].clone(),
                    },
                    AstNode::Terminal {
                        lhs: "<pair>".to_string(),
                        unit: units[1].clone(),
                    },
                ],
            }],
        }],
    };
    assert_eq!(root, expected);
}

#[test]
fn tree_rendering_shows_node_shapes() {
    let root = parse("<instruction> ::= \"A\" | \"AB\" ;\n", "AB").unwrap();
    let tree = root.tree();
    assert!(tree.contains("Root: <instruction>"));
    assert!(tree.contains("Terminal: \"AB\""));
    assert!(tree.contains("└──"));
}

#[test]
fn recursive_list_grammar_parses() {
    let grammar_text = "\
<instruction>  ::= <file_ids> ;
<file_ids>     ::= <identifier> \",\" <file_ids> | <identifier> ;
<identifier>   ::= <letter> | <letter> <identifier> ;
<letter>       ::= \"a\" | \"b\" | \"c\" ;
";
    let root = parse(grammar_text, "ab,c,ba").unwrap();
    assert_eq!(root.flatten(), "ab,c,ba");
}
