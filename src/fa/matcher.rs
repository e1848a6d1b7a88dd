// src/fa/matcher.rs
//! The three matching engines over one search contract.
//!
//! Every engine searches rather than matching at position zero: it attempts
//! a match at the current stream position and, on failure, advances one
//! character and retries until the input is exhausted. Success yields a
//! `FaMatch` anchored to where the match started; failure is `None`, never
//! an error.

use hashbrown::HashMap;

use super::capture::CaptureGroupContext;
use super::context::ParseContext;
use super::graph::{CharFa, StateId};
use super::table::{DfaTableEntry, NO_ACCEPT, table_move};

/// A successful match: position counters snapshotted where the match
/// started, the matched text, and the completed captures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FaMatch {
    pub line: u32,
    pub column: u32,
    pub position: usize,
    pub value: String,
    pub capture_groups: HashMap<u32, String>,
    pub capture_names: HashMap<u32, String>,
}

impl FaMatch {
    pub fn capture(&self, group_number: u32) -> Option<&str> {
        self.capture_groups.get(&group_number).map(String::as_str)
    }

    pub fn named_capture(&self, name: &str) -> Option<&str> {
        let (&group, _) = self
            .capture_names
            .iter()
            .find(|(_, n)| n.as_str() == name)?;
        self.capture(group)
    }
}

/// One contract, three interchangeable engines.
pub trait Matcher {
    fn search<I: Iterator<Item = char>>(
        &self,
        ctx: &mut ParseContext<I>,
        captures: &mut CaptureGroupContext,
    ) -> Option<FaMatch>;
}

/// Parallel-state walk over the object graph; the only engine that tracks
/// captures.
pub struct GraphNfa<'a, A> {
    pub fa: &'a CharFa<A>,
    /// When set, a partial walk that exhausts the input counts as a match
    /// even if no accepting state was reached (prefix acceptance).
    pub success_on_any_state: bool,
}

impl<'a, A> GraphNfa<'a, A> {
    pub fn new(fa: &'a CharFa<A>) -> Self {
        Self {
            fa,
            success_on_any_state: false,
        }
    }
}

impl<A> Matcher for GraphNfa<'_, A> {
    fn search<I: Iterator<Item = char>>(
        &self,
        ctx: &mut ParseContext<I>,
        captures: &mut CaptureGroupContext,
    ) -> Option<FaMatch> {
        self.fa.search_nfa(ctx, captures, self.success_on_any_state)
    }
}

/// Single-state walk over the object graph. Precondition: the graph is
/// deterministic; this is not verified, and on an NFA the walk silently
/// follows one of several valid transitions.
pub struct GraphDfa<'a, A>(pub &'a CharFa<A>);

impl<A> Matcher for GraphDfa<'_, A> {
    fn search<I: Iterator<Item = char>>(
        &self,
        ctx: &mut ParseContext<I>,
        captures: &mut CaptureGroupContext,
    ) -> Option<FaMatch> {
        self.0.search_dfa(ctx, captures)
    }
}

/// Row-indexed walk over a flattened table; no object graph at match time.
pub struct TableDfa<'a>(pub &'a [DfaTableEntry]);

impl Matcher for TableDfa<'_> {
    fn search<I: Iterator<Item = char>>(
        &self,
        ctx: &mut ParseContext<I>,
        captures: &mut CaptureGroupContext,
    ) -> Option<FaMatch> {
        search_table(self.0, ctx, captures)
    }
}

/// Outer search loop shared by the engines: snapshot, attempt, on failure
/// clear captures, re-snapshot and retry while input remains. The first
/// attempt runs even at end of input so nullable patterns can match empty.
fn run_search<I, F>(
    ctx: &mut ParseContext<I>,
    captures: &mut CaptureGroupContext,
    mut attempt: F,
) -> Option<FaMatch>
where
    I: Iterator<Item = char>,
    F: FnMut(&mut ParseContext<I>, &mut CaptureGroupContext) -> bool,
{
    ctx.ensure_started();
    let mut line = ctx.line();
    let mut column = ctx.column();
    let mut position = ctx.position();
    let mut mark = ctx.capture_len();
    let mut success = attempt(ctx, captures);
    while !success && ctx.current().is_some() {
        captures.clear();
        line = ctx.line();
        column = ctx.column();
        position = ctx.position();
        mark = ctx.capture_len();
        success = attempt(ctx, captures);
    }
    if !success {
        return None;
    }
    Some(FaMatch {
        line,
        column,
        position,
        value: ctx.get_capture(mark).to_string(),
        capture_groups: captures.captures().clone(),
        capture_names: captures.names().clone(),
    })
}

impl<A> CharFa<A> {
    /// NFA search from the current stream position.
    pub fn search_nfa<I: Iterator<Item = char>>(
        &self,
        ctx: &mut ParseContext<I>,
        captures: &mut CaptureGroupContext,
        success_on_any_state: bool,
    ) -> Option<FaMatch> {
        run_search(ctx, captures, |ctx, captures| {
            self.nfa_attempt(ctx, captures, success_on_any_state)
        })
    }

    /// DFA search from the current stream position. Same unchecked
    /// determinism precondition as `GraphDfa`; captures are not tracked.
    pub fn search_dfa<I: Iterator<Item = char>>(
        &self,
        ctx: &mut ParseContext<I>,
        captures: &mut CaptureGroupContext,
    ) -> Option<FaMatch> {
        run_search(ctx, captures, |ctx, _| self.dfa_attempt(ctx))
    }

    fn nfa_attempt<I: Iterator<Item = char>>(
        &self,
        ctx: &mut ParseContext<I>,
        captures: &mut CaptureGroupContext,
        success_on_any_state: bool,
    ) -> bool {
        let mut states = self.fill_epsilon_closure(&[self.start()]);
        self.handle_capture_states(&states, ctx, captures);
        loop {
            let Some(ch) = ctx.current() else {
                return success_on_any_state || self.is_any_accepting(&states);
            };
            let new_states = self.fill_move(&states, ch);
            if new_states.is_empty() {
                captures.clear();
                if self.is_any_accepting(&states) {
                    return true;
                }
                ctx.advance();
                return false;
            }
            ctx.capture_current();
            ctx.advance();
            self.handle_capture_states(&new_states, ctx, captures);
            states = new_states;
        }
    }

    /// Runs the capture handler once per state in the (deduplicated) live
    /// set that carries a marker. Called after the consumed character has
    /// been appended to the buffer, so start offsets exclude the character
    /// that led into the group and completions include the one that closed
    /// it.
    fn handle_capture_states<I: Iterator<Item = char>>(
        &self,
        states: &[StateId],
        ctx: &ParseContext<I>,
        captures: &mut CaptureGroupContext,
    ) {
        for &id in states {
            let state = &self[id];
            if let Some(info) = &state.capture {
                if state.end_capture {
                    captures.complete_capture(info, ctx.capture_buffer());
                } else {
                    captures.start_capture(info, ctx.capture_len());
                }
            }
        }
    }

    fn dfa_attempt<I: Iterator<Item = char>>(&self, ctx: &mut ParseContext<I>) -> bool {
        let mut state = self.start();
        loop {
            let Some(ch) = ctx.current() else {
                return self.is_accepting(state);
            };
            match self.move_dfa(state, ch) {
                None => {
                    if self.is_accepting(state) {
                        return true;
                    }
                    ctx.advance();
                    return false;
                }
                Some(next) => {
                    ctx.capture_current();
                    ctx.advance();
                    state = next;
                }
            }
        }
    }
}

/// Table search from the current stream position. Row 0 is the start state.
pub fn search_table<I: Iterator<Item = char>>(
    table: &[DfaTableEntry],
    ctx: &mut ParseContext<I>,
    captures: &mut CaptureGroupContext,
) -> Option<FaMatch> {
    run_search(ctx, captures, |ctx, _| table_attempt(table, ctx))
}

fn table_attempt<I: Iterator<Item = char>>(table: &[DfaTableEntry], ctx: &mut ParseContext<I>) -> bool {
    let mut state = 0usize;
    loop {
        let Some(ch) = ctx.current() else {
            return table[state].accept != NO_ACCEPT;
        };
        match table_move(table, state, ch) {
            None => {
                if table[state].accept != NO_ACCEPT {
                    return true;
                }
                ctx.advance();
                return false;
            }
            Some(next) => {
                ctx.capture_current();
                ctx.advance();
                state = next;
            }
        }
    }
}
