// src/fa/dfa.rs
//! Subset-construction determinization.
//!
//! Each DFA state is interned under the sorted list of NFA member handles.
//! Transitions are computed by splitting the member edges into elementary
//! character intervals at their boundary points; an interval with no edge
//! boundary inside it behaves uniformly, so probing its lowest character
//! suffices. Adjacent intervals reaching the same subset merge back into
//! ranges. Capture markers are not carried over; a determinized graph
//! reports no captures.

use hashbrown::HashMap;

use super::graph::{CharFa, CharRange, StateId};

const SURROGATE_LO: u32 = 0xD800;
const SURROGATE_HI: u32 = 0xDFFF;

/// Clamps an interval of code points to valid scalar values. An interval
/// with no edge boundary inside it can only touch the surrogate gap at its
/// ends, so clamping preserves uniform behavior.
fn clamp_scalar_span(lo: u32, hi: u32) -> Option<(char, char)> {
    let lo = if (SURROGATE_LO..=SURROGATE_HI).contains(&lo) {
        SURROGATE_HI + 1
    } else {
        lo
    };
    let hi = if (SURROGATE_LO..=SURROGATE_HI).contains(&hi) {
        SURROGATE_LO - 1
    } else {
        hi
    };
    if lo > hi {
        return None;
    }
    Some((char::from_u32(lo)?, char::from_u32(hi)?))
}

fn scalar_adjacent(a: char, b: char) -> bool {
    b as u32 == a as u32 + 1 || (a as u32 == SURROGATE_LO - 1 && b as u32 == SURROGATE_HI + 1)
}

impl<A> CharFa<A> {
    /// Determinizes the graph. The accept payload of a subset is taken from
    /// its lowest-handle accepting member, which keeps the result stable
    /// across runs and aligned with the first-constructed branch.
    pub fn to_dfa(&self) -> CharFa<A>
    where
        A: Clone,
    {
        let mut dfa = CharFa::empty_graph();
        let start_row = dfa.alloc();
        dfa.start = start_row;

        let mut start_set = self.fill_epsilon_closure(&[self.start()]);
        start_set.sort_unstable();
        let mut interned: HashMap<Vec<StateId>, StateId> = HashMap::new();
        interned.insert(start_set.clone(), start_row);
        let mut worklist = vec![(start_row, start_set)];

        while let Some((row, subset)) = worklist.pop() {
            for &member in &subset {
                if let Some(accept) = self.accept_of(member) {
                    dfa[row].accept = Some(accept.clone());
                    break;
                }
            }

            // boundary points of every member edge, as half-open bounds
            let mut points: Vec<u32> = Vec::new();
            for &member in &subset {
                for (ch, _) in self[member].transitions().iter_chars() {
                    points.push(ch as u32);
                    points.push(ch as u32 + 1);
                }
                for (range, _) in self[member].transitions().iter_ranges() {
                    points.push(range.first as u32);
                    points.push(range.last as u32 + 1);
                }
            }
            points.sort_unstable();
            points.dedup();

            let mut spans: Vec<(char, char, StateId)> = Vec::new();
            for window in points.windows(2) {
                let Some((lo, hi)) = clamp_scalar_span(window[0], window[1] - 1) else {
                    continue;
                };
                let mut seeds = Vec::new();
                for &member in &subset {
                    if let Some(dest) = self[member].transitions().try_get(lo) {
                        if !seeds.contains(&dest) {
                            seeds.push(dest);
                        }
                    }
                }
                if seeds.is_empty() {
                    continue;
                }
                let mut target = self.fill_epsilon_closure(&seeds);
                target.sort_unstable();
                let target_row = match interned.get(&target) {
                    Some(&row) => row,
                    None => {
                        let row = dfa.alloc();
                        interned.insert(target.clone(), row);
                        worklist.push((row, target));
                        row
                    }
                };
                spans.push((lo, hi, target_row));
            }

            // spans come out sorted by lo; merge runs with the same target
            let mut merged: Vec<(char, char, StateId)> = Vec::new();
            for (lo, hi, target) in spans {
                match merged.last_mut() {
                    Some((_, prev_hi, prev_target))
                        if *prev_target == target && scalar_adjacent(*prev_hi, lo) =>
                    {
                        *prev_hi = hi;
                    }
                    _ => merged.push((lo, hi, target)),
                }
            }
            for (lo, hi, target) in merged {
                if lo == hi {
                    dfa[row].transitions.add_char(lo, target);
                } else {
                    dfa[row].transitions.add_range(CharRange::new(lo, hi), target);
                }
            }
        }

        log::debug!(
            "determinized {} nfa states into {} dfa states",
            self.len(),
            dfa.len()
        );
        dfa
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_collapses_to_one_start_path() {
        // a|ab shares the leading 'a' after determinization
        let nfa = CharFa::literal("a", 1u32).union(CharFa::literal("ab", 2u32));
        let dfa = nfa.to_dfa();
        let s1 = dfa.move_dfa(dfa.start(), 'a').expect("edge on 'a'");
        assert!(dfa.is_accepting(s1));
        let s2 = dfa.move_dfa(s1, 'b').expect("edge on 'b'");
        assert!(dfa.is_accepting(s2));
        assert_eq!(dfa.move_dfa(dfa.start(), 'b'), None);
    }

    #[test]
    fn star_loop_determinizes() {
        let dfa = CharFa::literal("a", ()).star().to_dfa();
        assert!(dfa.is_accepting(dfa.start()));
        let s = dfa.move_dfa(dfa.start(), 'a').expect("loop edge");
        assert!(dfa.is_accepting(s));
        assert_eq!(dfa.move_dfa(s, 'a'), Some(s));
    }

    #[test]
    fn overlapping_ranges_split_into_intervals() {
        let nfa = CharFa::set(&[CharRange::new('a', 'm')], 1u32)
            .union(CharFa::set(&[CharRange::new('k', 'z')], 2u32));
        let dfa = nfa.to_dfa();
        for ch in ['a', 'k', 'm', 'n', 'z'] {
            let dest = dfa.move_dfa(dfa.start(), ch);
            assert!(dest.is_some(), "no edge for {ch:?}");
            assert!(dfa.is_accepting(dest.unwrap()));
        }
        assert_eq!(dfa.move_dfa(dfa.start(), '0'), None);
    }

    #[test]
    fn lowest_member_accept_wins() {
        // both branches accept "x"; the first-constructed payload survives
        let nfa = CharFa::literal("x", 1u32).union(CharFa::literal("x", 2u32));
        let dfa = nfa.to_dfa();
        let s = dfa.move_dfa(dfa.start(), 'x').expect("edge on 'x'");
        assert_eq!(dfa.accept_of(s), Some(&1));
    }
}
