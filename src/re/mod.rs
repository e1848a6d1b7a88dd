// src/re/mod.rs
//! Regex expression tree and its lowering to automata.
//!
//! The tree keeps structural equality, cloning and printing so compiled
//! automata can be cached under structurally equal patterns. Lowering goes
//! through the graph combinators; the tree itself never executes.

pub mod parser;

use std::fmt::{self, Write};

use crate::fa::{CaptureGroupInfo, CharFa, CharRange};

pub use parser::RegexParseError;

/// Every Unicode scalar value, split around the surrogate gap.
const ANY_RANGES: [CharRange; 2] = [
    CharRange {
        first: '\0',
        last: '\u{D7FF}',
    },
    CharRange {
        first: '\u{E000}',
        last: '\u{10FFFF}',
    },
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegexExpr {
    Literal(char),
    /// `.`: any scalar value, including `\n`.
    Any,
    Set(Vec<CharRange>),
    NegatedSet(Vec<CharRange>),
    Concat(Vec<RegexExpr>),
    Union(Box<RegexExpr>, Box<RegexExpr>),
    Repeat {
        expr: Box<RegexExpr>,
        min: u32,
        max: Option<u32>,
    },
    Capture {
        expr: Box<RegexExpr>,
        info: CaptureGroupInfo,
    },
}

impl RegexExpr {
    pub fn parse(pattern: &str) -> Result<RegexExpr, RegexParseError> {
        parser::parse(pattern)
    }

    /// Lowers the tree into an automaton, tagging the accept region with
    /// `accept`. Total over any tree the parser produces.
    pub fn to_fa<A: Clone>(&self, accept: A) -> CharFa<A> {
        match self {
            RegexExpr::Literal(ch) => CharFa::set(&[CharRange::single(*ch)], accept),
            RegexExpr::Any => CharFa::set(&ANY_RANGES, accept),
            RegexExpr::Set(ranges) => CharFa::set(ranges, accept),
            RegexExpr::NegatedSet(ranges) => CharFa::set(&complement(ranges), accept),
            RegexExpr::Concat(items) => {
                let mut iter = items.iter();
                match iter.next() {
                    None => CharFa::literal("", accept),
                    Some(first) => {
                        let mut fa = first.to_fa(accept.clone());
                        for item in iter {
                            fa = fa.concat(item.to_fa(accept.clone()));
                        }
                        fa
                    }
                }
            }
            RegexExpr::Union(a, b) => a.to_fa(accept.clone()).union(b.to_fa(accept)),
            RegexExpr::Repeat { expr, min, max } => expr.to_fa(accept).repeat(*min, *max),
            RegexExpr::Capture { expr, info } => {
                // group 0 is a printing-only boundary
                if info.group_number == 0 {
                    expr.to_fa(accept)
                } else {
                    expr.to_fa(accept).capture(info.clone())
                }
            }
        }
    }
}

/// Complements a set of ranges over the scalar-value space.
fn complement(ranges: &[CharRange]) -> Vec<CharRange> {
    const SCALAR_MAX: u32 = 0x10FFFF;
    let mut covered: Vec<(u32, u32)> = ranges
        .iter()
        .map(|r| (r.first as u32, r.last as u32))
        .collect();
    covered.sort_unstable();
    let mut merged: Vec<(u32, u32)> = Vec::new();
    for (lo, hi) in covered {
        match merged.last_mut() {
            Some((_, prev_hi)) if lo <= prev_hi.saturating_add(1) => {
                if hi > *prev_hi {
                    *prev_hi = hi;
                }
            }
            _ => merged.push((lo, hi)),
        }
    }
    let mut out = Vec::new();
    let mut next = 0u32;
    for (lo, hi) in merged {
        if lo > next {
            push_scalar_range(&mut out, next, lo - 1);
        }
        next = hi.saturating_add(1);
    }
    if next <= SCALAR_MAX {
        push_scalar_range(&mut out, next, SCALAR_MAX);
    }
    out
}

/// Pushes `[lo, hi]` as char ranges, split around the surrogate gap.
fn push_scalar_range(out: &mut Vec<CharRange>, lo: u32, hi: u32) {
    let below = (lo, hi.min(0xD7FF));
    if below.0 <= below.1 {
        if let (Some(first), Some(last)) = (char::from_u32(below.0), char::from_u32(below.1)) {
            out.push(CharRange::new(first, last));
        }
    }
    let above = (lo.max(0xE000), hi);
    if above.0 <= above.1 {
        if let (Some(first), Some(last)) = (char::from_u32(above.0), char::from_u32(above.1)) {
            out.push(CharRange::new(first, last));
        }
    }
}

// ---------------- printing ----------------

fn write_escaped(f: &mut fmt::Formatter<'_>, ch: char) -> fmt::Result {
    match ch {
        '\\' | '(' | ')' | '[' | ']' | '{' | '}' | '*' | '+' | '?' | '|' | '.' => {
            write!(f, "\\{ch}")
        }
        '\n' => f.write_str("\\n"),
        '\r' => f.write_str("\\r"),
        '\t' => f.write_str("\\t"),
        _ => f.write_char(ch),
    }
}

fn write_class_char(f: &mut fmt::Formatter<'_>, ch: char) -> fmt::Result {
    match ch {
        '\\' | ']' | '^' | '-' => write!(f, "\\{ch}"),
        '\n' => f.write_str("\\n"),
        '\r' => f.write_str("\\r"),
        '\t' => f.write_str("\\t"),
        _ => f.write_char(ch),
    }
}

fn write_class(f: &mut fmt::Formatter<'_>, negated: bool, ranges: &[CharRange]) -> fmt::Result {
    f.write_char('[')?;
    if negated {
        f.write_char('^')?;
    }
    for range in ranges {
        write_class_char(f, range.first)?;
        if range.first != range.last {
            f.write_char('-')?;
            write_class_char(f, range.last)?;
        }
    }
    f.write_char(']')
}

/// True when the node binds tighter than a postfix quantifier.
fn is_atomic(expr: &RegexExpr) -> bool {
    matches!(
        expr,
        RegexExpr::Literal(_)
            | RegexExpr::Any
            | RegexExpr::Set(_)
            | RegexExpr::NegatedSet(_)
            | RegexExpr::Capture { .. }
    )
}

impl fmt::Display for RegexExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegexExpr::Literal(ch) => write_escaped(f, *ch),
            RegexExpr::Any => f.write_char('.'),
            RegexExpr::Set(ranges) => write_class(f, false, ranges),
            RegexExpr::NegatedSet(ranges) => write_class(f, true, ranges),
            RegexExpr::Concat(items) => {
                for item in items {
                    if matches!(item, RegexExpr::Union(..)) {
                        write!(f, "(?:{item})")?;
                    } else {
                        write!(f, "{item}")?;
                    }
                }
                Ok(())
            }
            RegexExpr::Union(a, b) => write!(f, "{a}|{b}"),
            RegexExpr::Repeat { expr, min, max } => {
                if is_atomic(expr) {
                    write!(f, "{expr}")?;
                } else {
                    write!(f, "(?:{expr})")?;
                }
                match (min, max) {
                    (0, None) => f.write_char('*'),
                    (1, None) => f.write_char('+'),
                    (0, Some(1)) => f.write_char('?'),
                    (min, None) => write!(f, "{{{min},}}"),
                    (min, Some(max)) if min == max => write!(f, "{{{min}}}"),
                    (min, Some(max)) => write!(f, "{{{min},{max}}}"),
                }
            }
            RegexExpr::Capture { expr, info } => {
                f.write_char('(')?;
                if info.group_number == 0 {
                    f.write_str("?:")?;
                } else if let Some(name) = &info.capture_name {
                    write!(f, "?<{name}>")?;
                }
                write!(f, "{expr})")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complement_splits_around_gaps() {
        let out = complement(&[CharRange::new('b', 'y')]);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0], CharRange::new('\0', 'a'));
        assert_eq!(out[1], CharRange::new('z', '\u{D7FF}'));
        assert_eq!(out[2], CharRange::new('\u{E000}', '\u{10FFFF}'));
    }

    #[test]
    fn complement_merges_overlaps_first() {
        let out = complement(&[CharRange::new('a', 'm'), CharRange::new('k', 'z')]);
        assert!(out.iter().all(|r| !r.contains('q')));
        assert!(out.iter().any(|r| r.contains('A')));
    }

    #[test]
    fn display_prints_pattern_syntax() {
        let expr = RegexExpr::parse("(?<word>[a-z]+)\\.(?:x|y)*").unwrap();
        assert_eq!(expr.to_string(), "(?<word>[a-z]+)\\.(?:x|y)*");
    }
}
