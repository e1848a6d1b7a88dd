// src/fa/lexer.rs
// Longest-munch token scanning over a compiled table.

use super::context::ParseContext;
use super::table::{DfaTableEntry, NO_ACCEPT, table_move};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub symbol_id: u32,
    pub value: String,
    pub line: u32,
    pub column: u32,
    pub position: usize,
}

/// Scans the whole stream into tokens. Each token is the greedy walk from
/// row 0: characters are consumed while a transition exists, and the text
/// is emitted under the final row's accept symbol. A stuck non-accepting
/// walk emits its pending text (at minimum one character, so scanning
/// always advances) under `error_symbol`. The stream is never rewound, so
/// a walk that overshoots its last accepting row surfaces as an error
/// token rather than backtracking.
pub fn lex<I: Iterator<Item = char>>(
    table: &[DfaTableEntry],
    ctx: &mut ParseContext<I>,
    error_symbol: u32,
) -> Vec<Token> {
    let mut out = Vec::new();
    ctx.ensure_started();
    while ctx.current().is_some() {
        let line = ctx.line();
        let column = ctx.column();
        let position = ctx.position();
        let mark = ctx.capture_len();
        let mut state = 0usize;
        loop {
            let Some(ch) = ctx.current() else { break };
            let Some(next) = table_move(table, state, ch) else {
                break;
            };
            ctx.capture_current();
            ctx.advance();
            state = next;
        }
        let consumed = ctx.capture_len() > mark;
        let accept = table[state].accept;
        let symbol_id = if accept != NO_ACCEPT && consumed {
            accept
        } else {
            if !consumed {
                ctx.capture_current();
                ctx.advance();
            }
            error_symbol
        };
        out.push(Token {
            symbol_id,
            value: ctx.get_capture(mark).to_string(),
            line,
            column,
            position,
        });
    }
    out
}
