use munch_lex::{
    compile_rules, parse_rule_defs, DfaScanner, DfaTable, LexError, RuleSet, ScanOptions, Token,
    TokenType, TrailingInput,
};
use proptest::prelude::*;

const RULES: &str = "\
# keywords first so they beat identifiers of the same length
if;IF
while;WHILE
lines without a separator are ignored
[a-zA-Z_][a-zA-Z_0-9]* ; IDENTIFIER
[0-9]+ ; INTEGER
[0-9]+.[0-9]+ ; FLOAT
(<|>|=|!)=? ; COMPARISON
(+|-)?;SIGN
";

fn token(kind: &str, value: &str) -> Token {
    Token::new(TokenType::new(kind), value)
}

#[test]
fn test_rule_file() {
    let rules = parse_rule_defs(RULES.replace("(+|-)?;SIGN\n", "").as_str()).expect("rules should parse");
    let lexer = compile_rules(rules).expect("rules should compile");

    let tokens = lexer.tokenize("while x1 >= 10 if iffy 3.25").unwrap();
    assert_eq!(
        tokens,
        vec![
            token("WHILE", "while"),
            token("IDENTIFIER", "x1"),
            token("COMPARISON", ">="),
            token("INTEGER", "10"),
            token("IF", "if"),
            token("IDENTIFIER", "iffy"),
            token("FLOAT", "3.25"),
        ]
    );

    let names: Vec<&str> = lexer.rules().iter().map(|r| r.token_type().name()).collect();
    assert_eq!(names, vec!["IF", "WHILE", "IDENTIFIER", "INTEGER", "FLOAT", "COMPARISON"]);
    // the separator-less line does not take a priority slot
    assert_eq!(lexer.rules()[2].priority(), 2);
}

#[test]
fn test_operator_in_rule_file_is_malformed() {
    // `+` cannot be a literal, so this rule has a dangling operator
    let rules = parse_rule_defs(RULES).expect("rules should parse");
    let error = compile_rules(rules).unwrap_err();
    assert!(matches!(error, LexError::Compile(_)), "{:?}", error);
}

#[test]
fn test_priority_resolution() {
    let rules: RuleSet = [("a+", "NUM"), ("a", "LETTER")].into_iter().collect();
    let lexer = compile_rules(rules).unwrap();
    assert_eq!(lexer.tokenize("aaa").unwrap(), vec![token("NUM", "aaa")]);

    let rules: RuleSet = [("a", "LETTER"), ("a+", "NUM")].into_iter().collect();
    let lexer = compile_rules(rules).unwrap();
    assert_eq!(lexer.tokenize("a aa").unwrap(), vec![token("LETTER", "a"), token("NUM", "aa")]);
}

#[test]
fn test_unrecognized_input() {
    let rules: RuleSet = [("[a-z]+", "WORD"), ("[0-9]+", "NUM")].into_iter().collect();
    let lexer = compile_rules(rules).unwrap();
    assert_eq!(lexer.tokenize("@@@"), Err(LexError::UnrecognizedLexeme("@@@".to_string())));
    // stops at the first failure
    assert_eq!(lexer.tokenize("abc @@@ 12"), Err(LexError::UnrecognizedLexeme("@@@".to_string())));
    assert!(lexer.tokenize("   \n\t").unwrap().is_empty());
}

#[test]
fn test_class_matches_union() {
    let class: RuleSet = [("[0-2]", "D")].into_iter().collect();
    let union: RuleSet = [("(0|1|2)", "D")].into_iter().collect();
    let class = compile_rules(class).unwrap();
    let union = compile_rules(union).unwrap();

    assert_eq!(class.dfa().len(), union.dfa().len());
    assert_eq!(class.dfa().canonical_form(), union.dfa().canonical_form());
    for input in ["0", "1", "2", "3", "00"] {
        assert_eq!(class.dfa().accepts(input), union.dfa().accepts(input), "input {}", input);
    }
}

#[test]
fn test_distinct_tokens_survive_minimization() {
    let rules: RuleSet = [("ab", "TYPE_X"), ("ac", "TYPE_Y")].into_iter().collect();
    let lexer = compile_rules(rules).unwrap();
    assert_eq!(lexer.dfa().len(), 4);
    assert_eq!(lexer.tokenize("ab ac").unwrap(), vec![token("TYPE_X", "ab"), token("TYPE_Y", "ac")]);
}

#[test]
fn test_saved_table_scans_like_the_compiled_lexer() {
    let rules = parse_rule_defs("[a-z]+;WORD\n[0-9]+;NUM\n").unwrap();
    let lexer = compile_rules(rules).unwrap();

    let serialized = serde_json::to_string(lexer.table()).unwrap();
    let table: DfaTable = serde_json::from_str(&serialized).unwrap();
    assert_eq!(&table, lexer.table());

    let scanner = DfaScanner::new(table).with_options(ScanOptions { trailing: TrailingInput::Rescan });
    assert_eq!(
        scanner.tokenize("abc123 x").unwrap(),
        vec![token("WORD", "abc"), token("NUM", "123"), token("WORD", "x")]
    );
}

#[test]
fn test_malformed_saved_table_is_rejected() {
    let rules = parse_rule_defs("[a-z]+;WORD\n").unwrap();
    let lexer = compile_rules(rules).unwrap();
    let saved = serde_json::to_value(lexer.table()).unwrap();

    let mut no_states = saved.clone();
    no_states["states"] = serde_json::json!(0);
    assert!(serde_json::from_value::<DfaTable>(no_states).is_err());

    let mut short_data = saved.clone();
    short_data["data"].as_array_mut().unwrap().pop();
    assert!(serde_json::from_value::<DfaTable>(short_data).is_err());

    let mut short_accept = saved.clone();
    short_accept["accept"].as_array_mut().unwrap().pop();
    assert!(serde_json::from_value::<DfaTable>(short_accept).is_err());

    assert_eq!(&serde_json::from_value::<DfaTable>(saved).unwrap(), lexer.table());
}

#[test]
fn test_tokens_serialize() {
    let json = serde_json::to_string(&token("NUM", "42")).unwrap();
    assert_eq!(json, r#"{"token_type":"NUM","value":"42"}"#);
}

proptest! {
    #[test]
    fn literal_rules_round_trip(word in "[a-z]{1,12}") {
        let rules: RuleSet = [(word.clone(), "WORD")].into_iter().collect();
        let lexer = compile_rules(rules).unwrap();
        let tokens = lexer.tokenize(&word).unwrap();
        prop_assert_eq!(tokens, vec![token("WORD", &word)]);
    }

    #[test]
    fn rescan_consumes_whole_fragments(fragment in "[a-z0-9]{1,16}") {
        let rules: RuleSet = [("[a-z]+", "WORD"), ("[0-9]+", "NUM")].into_iter().collect();
        let lexer = compile_rules(rules)
            .unwrap()
            .with_options(ScanOptions { trailing: TrailingInput::Rescan });
        let tokens = lexer.tokenize(&fragment).unwrap();
        let rebuilt: String = tokens.iter().map(|t| t.value()).collect();
        prop_assert_eq!(rebuilt, fragment);
    }
}
