// src/fa/table.rs
//! Flattened, serializable form of a determinized automaton.
//!
//! Row index 0 is the start state. Each row carries an accept-symbol id
//! (`NO_ACCEPT` when non-accepting) and its transitions as packed
//! `[first, last, first, last, ...]` range pairs per destination row. The
//! table is pure data: matching over it needs no object graph, which is
//! the cheap path for automata compiled once and reused across many
//! inputs.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use super::graph::{CharFa, CharRange, StateId};

/// Accept-symbol sentinel for non-accepting rows.
pub const NO_ACCEPT: u32 = u32::MAX;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DfaTableTransition {
    /// Flattened inclusive range pairs; always an even number of chars.
    pub packed_ranges: Vec<char>,
    pub dest: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DfaTableEntry {
    pub accept: u32,
    pub transitions: Vec<DfaTableTransition>,
}

/// Resolves one table step: next row for `ch` out of `state`, if any.
#[inline]
pub fn table_move(table: &[DfaTableEntry], state: usize, ch: char) -> Option<usize> {
    for transition in &table[state].transitions {
        for pair in transition.packed_ranges.chunks_exact(2) {
            if pair[0] <= ch && ch <= pair[1] {
                return Some(transition.dest as usize);
            }
        }
    }
    None
}

impl<A> CharFa<A> {
    /// Distinct accept payloads in state order, usable as the symbol table
    /// for `to_dfa_table`.
    pub fn collect_symbols(&self) -> Vec<A>
    where
        A: Clone + PartialEq,
    {
        let mut symbols = Vec::new();
        for id in self.state_ids() {
            if let Some(accept) = self.accept_of(id) {
                if !symbols.contains(accept) {
                    symbols.push(accept.clone());
                }
            }
        }
        symbols
    }

    /// Flattens the graph into table rows, breadth-first from the start
    /// state (row 0). Accept payloads map to their index in `symbols`;
    /// payloads not listed become `NO_ACCEPT`. Precondition: the graph is
    /// deterministic (unchecked, same as the DFA engines).
    pub fn to_dfa_table(&self, symbols: &[A]) -> Vec<DfaTableEntry>
    where
        A: PartialEq,
    {
        let mut row_of: HashMap<StateId, u32> = HashMap::new();
        let mut order: Vec<StateId> = Vec::new();
        row_of.insert(self.start(), 0);
        order.push(self.start());
        let mut i = 0;
        while i < order.len() {
            let id = order[i];
            i += 1;
            // hashed iteration order is not stable; sort for a
            // deterministic row numbering
            let mut dests: Vec<StateId> = self[id].transitions().destinations().collect();
            dests.sort_unstable();
            for dest in dests {
                if !row_of.contains_key(&dest) {
                    row_of.insert(dest, order.len() as u32);
                    order.push(dest);
                }
            }
        }

        let mut entries = Vec::with_capacity(order.len());
        for &id in &order {
            let state = &self[id];
            let accept = state
                .accept()
                .and_then(|a| symbols.iter().position(|s| s == a))
                .map_or(NO_ACCEPT, |p| p as u32);
            let mut grouped: Vec<(StateId, &(Vec<char>, Vec<CharRange>))> =
                state.transitions().inputs_by_destination().collect();
            grouped.sort_by_key(|&(dest, _)| row_of[&dest]);
            let mut transitions = Vec::with_capacity(grouped.len());
            for (dest, (chars, ranges)) in grouped {
                let mut singles = chars.clone();
                singles.sort_unstable();
                let mut spans = ranges.clone();
                spans.sort_by_key(|r| r.first);
                let mut packed = Vec::with_capacity(2 * (singles.len() + spans.len()));
                for ch in singles {
                    packed.push(ch);
                    packed.push(ch);
                }
                for span in spans {
                    packed.push(span.first);
                    packed.push(span.last);
                }
                transitions.push(DfaTableTransition {
                    packed_ranges: packed,
                    dest: row_of[&dest],
                });
            }
            entries.push(DfaTableEntry { accept, transitions });
        }
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_move_resolves_packed_ranges() {
        let table = vec![
            DfaTableEntry {
                accept: NO_ACCEPT,
                transitions: vec![DfaTableTransition {
                    packed_ranges: vec!['a', 'a', '0', '9'],
                    dest: 1,
                }],
            },
            DfaTableEntry {
                accept: 0,
                transitions: Vec::new(),
            },
        ];
        assert_eq!(table_move(&table, 0, 'a'), Some(1));
        assert_eq!(table_move(&table, 0, '5'), Some(1));
        assert_eq!(table_move(&table, 0, 'b'), None);
        assert_eq!(table_move(&table, 1, 'a'), None);
    }

    #[test]
    fn flattening_starts_at_row_zero() {
        let fa = CharFa::literal("ab", 42u32);
        let symbols = fa.collect_symbols();
        assert_eq!(symbols, vec![42]);
        let table = fa.to_dfa_table(&symbols);
        assert_eq!(table.len(), 3);
        assert_eq!(table[0].accept, NO_ACCEPT);
        let row = table_move(&table, 0, 'a').unwrap();
        let row = table_move(&table, row, 'b').unwrap();
        assert_eq!(table[row].accept, 0);
    }
}
