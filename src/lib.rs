// src/lib.rs
//! Char-level finite automata for regex matching and token scanning.
//!
//! Patterns (or hand-built combinator graphs) compile into an NFA object
//! graph, optionally determinize into a DFA graph, and flatten into a
//! serializable table; three interchangeable engines walk whichever form
//! against a positioned character stream. A built automaton is never
//! mutated by matching, so it can be shared across calls as long as each
//! call owns its own `ParseContext` and `CaptureGroupContext`.

pub mod fa;
pub mod re;

pub use fa::{
    CaptureGroupContext, CaptureGroupInfo, CharFa, CharRange, DfaTableEntry, FaMatch, GraphDfa,
    GraphNfa, Matcher, ParseContext, TableDfa,
};
pub use re::{RegexExpr, RegexParseError};
