//! Token scanning over a compiled table.

use refa::fa::{ParseContext, Token, lex};
use refa::re::RegexExpr;

const IDENT: u32 = 0;
const INT: u32 = 1;
const WHITE: u32 = 2;
const EQ: u32 = 3;
const ERROR: u32 = 99;

fn build_table() -> Vec<refa::fa::DfaTableEntry> {
    let fa = RegexExpr::parse(r"[A-Za-z_]\w*")
        .unwrap()
        .to_fa(IDENT)
        .union(RegexExpr::parse(r"\d+").unwrap().to_fa(INT))
        .union(RegexExpr::parse(r"[ \t\r\n]+").unwrap().to_fa(WHITE))
        .union(RegexExpr::parse("=").unwrap().to_fa(EQ));
    fa.to_dfa().to_dfa_table(&[IDENT, INT, WHITE, EQ])
}

fn kinds_and_values(tokens: &[Token]) -> Vec<(u32, &str)> {
    tokens
        .iter()
        .map(|t| (t.symbol_id, t.value.as_str()))
        .collect()
}

#[test]
fn scans_a_simple_assignment() {
    let table = build_table();
    let mut ctx = ParseContext::from_text("width = 1920");
    let tokens = lex(&table, &mut ctx, ERROR);
    assert_eq!(
        kinds_and_values(&tokens),
        vec![
            (IDENT, "width"),
            (WHITE, " "),
            (EQ, "="),
            (WHITE, " "),
            (INT, "1920"),
        ]
    );
}

#[test]
fn tokens_carry_line_and_position() {
    let table = build_table();
    let mut ctx = ParseContext::from_text("a\nbb");
    let tokens = lex(&table, &mut ctx, ERROR);
    assert_eq!(tokens.len(), 3);
    assert_eq!((tokens[0].line, tokens[0].column, tokens[0].position), (1, 1, 0));
    assert_eq!(tokens[1].symbol_id, WHITE);
    assert_eq!((tokens[2].line, tokens[2].column, tokens[2].position), (2, 1, 2));
    assert_eq!(tokens[2].value, "bb");
}

#[test]
fn unknown_characters_become_error_tokens() {
    let table = build_table();
    let mut ctx = ParseContext::from_text("x=#7");
    let tokens = lex(&table, &mut ctx, ERROR);
    assert_eq!(
        kinds_and_values(&tokens),
        vec![(IDENT, "x"), (EQ, "="), (ERROR, "#"), (INT, "7")]
    );
}

#[test]
fn identifiers_swallow_digits_greedily() {
    let table = build_table();
    let mut ctx = ParseContext::from_text("x3 3x");
    let tokens = lex(&table, &mut ctx, ERROR);
    assert_eq!(
        kinds_and_values(&tokens),
        vec![(IDENT, "x3"), (WHITE, " "), (INT, "3"), (IDENT, "x")]
    );
}

#[test]
fn empty_input_yields_no_tokens() {
    let table = build_table();
    let mut ctx = ParseContext::from_text("");
    assert!(lex(&table, &mut ctx, ERROR).is_empty());
}
