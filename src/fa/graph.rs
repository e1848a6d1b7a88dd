// src/fa/graph.rs
//! Arena-based character automaton graph.
//!
//! States live in a flat arena and reference each other through `StateId`
//! handles, which makes the cyclic wiring needed for `*`/`+` loops safe to
//! build and cheap to traverse. A `CharFa<A>` owns every state reachable
//! from its start handle; combinators consume their operand graphs and
//! splice the arenas together, so two live graphs never share a state.

use hashbrown::{HashMap, HashSet};

use super::capture::CaptureGroupInfo;

/// A state handle: an index into the owning graph's arena.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct StateId(pub(crate) u32);

impl StateId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// An inclusive `[first, last]` character interval used as a transition key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct CharRange {
    pub first: char,
    pub last: char,
}

impl CharRange {
    pub fn new(first: char, last: char) -> Self {
        debug_assert!(first <= last);
        Self { first, last }
    }

    pub fn single(ch: char) -> Self {
        Self { first: ch, last: ch }
    }

    #[inline]
    pub fn contains(&self, ch: char) -> bool {
        self.first <= ch && ch <= self.last
    }
}

/// Outgoing transitions of one state: an exact-character index, an ordered
/// range index, and a reverse index from destination to the inputs reaching
/// it. Every forward entry appears in exactly one forward index and is
/// mirrored in the reverse index, so removing a destination is proportional
/// to the entries pointing at it rather than the whole table.
#[derive(Clone, Debug, Default)]
pub struct InputTransitions {
    chars: HashMap<char, StateId>,
    ranges: Vec<(CharRange, StateId)>,
    by_state: HashMap<StateId, (Vec<char>, Vec<CharRange>)>,
}

impl InputTransitions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.chars.len() + self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty() && self.ranges.is_empty()
    }

    /// First transition matching `ch`: the exact-character index wins,
    /// then ranges in insertion order.
    pub fn try_get(&self, ch: char) -> Option<StateId> {
        if let Some(&dest) = self.chars.get(&ch) {
            return Some(dest);
        }
        self.ranges
            .iter()
            .find(|(range, _)| range.contains(ch))
            .map(|&(_, dest)| dest)
    }

    pub fn add_char(&mut self, ch: char, dest: StateId) {
        self.chars.insert(ch, dest);
        self.by_state.entry(dest).or_default().0.push(ch);
    }

    pub fn add_range(&mut self, range: CharRange, dest: StateId) {
        self.ranges.push((range, dest));
        self.by_state.entry(dest).or_default().1.push(range);
    }

    /// Re-adds a previously removed input bundle under a new destination.
    pub fn add_inputs(&mut self, dest: StateId, inputs: (Vec<char>, Vec<CharRange>)) {
        let (chars, ranges) = inputs;
        for ch in chars {
            self.add_char(ch, dest);
        }
        for range in ranges {
            self.add_range(range, dest);
        }
    }

    /// Purges every forward entry pointing at `dest` via the reverse index,
    /// returning the removed inputs.
    pub fn remove(&mut self, dest: StateId) -> Option<(Vec<char>, Vec<CharRange>)> {
        let (chars, ranges) = self.by_state.remove(&dest)?;
        for ch in &chars {
            self.chars.remove(ch);
        }
        if !ranges.is_empty() {
            self.ranges.retain(|&(_, d)| d != dest);
        }
        Some((chars, ranges))
    }

    pub fn iter_chars(&self) -> impl Iterator<Item = (char, StateId)> + '_ {
        self.chars.iter().map(|(&ch, &dest)| (ch, dest))
    }

    pub fn iter_ranges(&self) -> impl Iterator<Item = (CharRange, StateId)> + '_ {
        self.ranges.iter().copied()
    }

    pub fn inputs_to(&self, dest: StateId) -> Option<&(Vec<char>, Vec<CharRange>)> {
        self.by_state.get(&dest)
    }

    pub fn inputs_by_destination(
        &self,
    ) -> impl Iterator<Item = (StateId, &(Vec<char>, Vec<CharRange>))> + '_ {
        self.by_state.iter().map(|(&dest, inputs)| (dest, inputs))
    }

    pub fn destinations(&self) -> impl Iterator<Item = StateId> + '_ {
        self.by_state.keys().copied()
    }

    fn offset(&mut self, by: u32) {
        self.chars = self
            .chars
            .drain()
            .map(|(ch, dest)| (ch, StateId(dest.0 + by)))
            .collect();
        for (_, dest) in &mut self.ranges {
            dest.0 += by;
        }
        self.by_state = self
            .by_state
            .drain()
            .map(|(dest, inputs)| (StateId(dest.0 + by), inputs))
            .collect();
    }
}

/// One automaton state.
#[derive(Clone, Debug, Default)]
pub struct State<A> {
    pub(crate) accept: Option<A>,
    pub(crate) capture: Option<CaptureGroupInfo>,
    pub(crate) end_capture: bool,
    pub(crate) transitions: InputTransitions,
    pub(crate) epsilons: Vec<StateId>,
}

impl<A> State<A> {
    fn new() -> Self {
        Self {
            accept: None,
            capture: None,
            end_capture: false,
            transitions: InputTransitions::new(),
            epsilons: Vec::new(),
        }
    }

    pub fn accept(&self) -> Option<&A> {
        self.accept.as_ref()
    }

    pub fn is_accepting(&self) -> bool {
        self.accept.is_some()
    }

    pub fn transitions(&self) -> &InputTransitions {
        &self.transitions
    }

    pub fn epsilons(&self) -> &[StateId] {
        &self.epsilons
    }

    fn offset(&mut self, by: u32) {
        for eps in &mut self.epsilons {
            eps.0 += by;
        }
        self.transitions.offset(by);
    }
}

/// A character-level finite automaton: an arena of states plus the start
/// handle. `A` is the caller-supplied accept payload (e.g. a token kind),
/// fixed once per constructed automaton.
#[derive(Clone, Debug)]
pub struct CharFa<A> {
    pub(crate) states: Vec<State<A>>,
    pub(crate) start: StateId,
}

impl<A> std::ops::Index<StateId> for CharFa<A> {
    type Output = State<A>;

    #[inline]
    fn index(&self, id: StateId) -> &State<A> {
        &self.states[id.index()]
    }
}

impl<A> std::ops::IndexMut<StateId> for CharFa<A> {
    #[inline]
    fn index_mut(&mut self, id: StateId) -> &mut State<A> {
        &mut self.states[id.index()]
    }
}

impl<A> CharFa<A> {
    pub(crate) fn empty_graph() -> Self {
        Self {
            states: Vec::new(),
            start: StateId(0),
        }
    }

    pub(crate) fn alloc(&mut self) -> StateId {
        let id = StateId(self.states.len() as u32);
        self.states.push(State::new());
        id
    }

    pub fn start(&self) -> StateId {
        self.start
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn state_ids(&self) -> impl Iterator<Item = StateId> + '_ {
        (0..self.states.len() as u32).map(StateId)
    }

    pub fn is_accepting(&self, id: StateId) -> bool {
        self[id].accept.is_some()
    }

    pub fn accept_of(&self, id: StateId) -> Option<&A> {
        self[id].accept.as_ref()
    }

    pub fn accepting_states(&self) -> Vec<StateId> {
        self.state_ids()
            .filter(|&id| self[id].accept.is_some())
            .collect()
    }

    // ---------------- construction combinators ----------------

    /// A chain of exact-character edges ending in an accepting state.
    /// An empty string yields a single accepting entry state.
    pub fn literal(text: &str, accept: A) -> Self {
        let mut fa = Self::empty_graph();
        let mut cur = fa.alloc();
        fa.start = cur;
        for ch in text.chars() {
            let next = fa.alloc();
            fa[cur].transitions.add_char(ch, next);
            cur = next;
        }
        fa[cur].accept = Some(accept);
        fa
    }

    /// A character class: one entry with an edge per range to a fresh
    /// accepting state. Single-character ranges use the exact index.
    pub fn set(ranges: &[CharRange], accept: A) -> Self {
        let mut fa = Self::empty_graph();
        let entry = fa.alloc();
        fa.start = entry;
        let acc = fa.alloc();
        for &range in ranges {
            if range.first == range.last {
                fa[entry].transitions.add_char(range.first, acc);
            } else {
                fa[entry].transitions.add_range(range, acc);
            }
        }
        fa[acc].accept = Some(accept);
        fa
    }

    /// Sequences `self` then `second`: the accepting states of `self` lose
    /// their accept tag and flow into `second`'s entry.
    pub fn concat(mut self, second: Self) -> Self {
        let first_accepting = self.accepting_states();
        let second_start = self.import(second);
        for id in first_accepting {
            self[id].accept = None;
            self.add_epsilon(id, second_start);
        }
        self
    }

    /// Alternation: a fresh entry with epsilon edges to both operands'
    /// entries. Both accept regions survive.
    pub fn union(mut self, second: Self) -> Self {
        let second_start = self.import(second);
        let first_start = self.start;
        let entry = self.alloc();
        self.add_epsilon(entry, first_start);
        self.add_epsilon(entry, second_start);
        self.start = entry;
        self
    }

    /// Zero-or-one: epsilon bypass from the entry to each accepting state.
    pub fn optional(mut self) -> Self {
        let start = self.start;
        for id in self.accepting_states() {
            self.add_epsilon(start, id);
        }
        self
    }

    /// One-or-more: epsilon loop from each accepting state back to the entry.
    pub fn plus(mut self) -> Self {
        let start = self.start;
        for id in self.accepting_states() {
            self.add_epsilon(id, start);
        }
        self
    }

    /// Zero-or-more.
    pub fn star(self) -> Self {
        self.plus().optional()
    }

    /// General repetition. `max == None` is unbounded; bounded counts are
    /// realized by concatenating clones, the optional tail copies each
    /// carrying a bypass.
    pub fn repeat(self, min: u32, max: Option<u32>) -> Self
    where
        A: Clone,
    {
        match (min, max) {
            (0, None) => self.star(),
            (min, None) => {
                let mut head: Option<Self> = None;
                for _ in 1..min {
                    head = Some(match head {
                        None => self.clone(),
                        Some(fa) => fa.concat(self.clone()),
                    });
                }
                let tail = self.plus();
                match head {
                    None => tail,
                    Some(fa) => fa.concat(tail),
                }
            }
            (min, Some(max)) => {
                debug_assert!(min <= max);
                if max == 0 {
                    // {0,0}: the empty match, keeping the accept payload
                    return match self.states.iter().find_map(|s| s.accept.clone()) {
                        Some(accept) => Self::literal("", accept),
                        None => self,
                    };
                }
                let mut out: Option<Self> = None;
                for i in 0..max {
                    let copy = if i < min {
                        self.clone()
                    } else {
                        self.clone().optional()
                    };
                    out = Some(match out {
                        None => copy,
                        Some(fa) => fa.concat(copy),
                    });
                }
                out.unwrap_or(self)
            }
        }
    }

    /// Wraps the graph in capture sentinels: an entry marker flowing into
    /// the old entry, and an exit marker that the old accepting states flow
    /// into and which inherits the accept payload.
    pub fn capture(mut self, info: CaptureGroupInfo) -> Self {
        let inner_start = self.start;
        let entry = self.alloc();
        self[entry].capture = Some(info.clone());
        let exit = self.alloc();
        self[exit].capture = Some(info);
        self[exit].end_capture = true;
        self.add_epsilon(entry, inner_start);
        let mut moved_accept = None;
        for id in self.accepting_states() {
            let accept = self[id].accept.take();
            if moved_accept.is_none() {
                moved_accept = accept;
            }
            self.add_epsilon(id, exit);
        }
        self[exit].accept = moved_accept;
        self.start = entry;
        self
    }

    /// Splices `other`'s arena onto the end of this one, returning `other`'s
    /// remapped start handle. `other` is consumed; the merged graph owns
    /// every state.
    fn import(&mut self, other: Self) -> StateId {
        let offset = self.states.len() as u32;
        let start = StateId(other.start.0 + offset);
        for mut state in other.states {
            state.offset(offset);
            self.states.push(state);
        }
        start
    }

    fn add_epsilon(&mut self, from: StateId, to: StateId) {
        if from != to && !self[from].epsilons.contains(&to) {
            self[from].epsilons.push(to);
        }
    }

    // ---------------- closure and stepping ----------------

    /// The set of states reachable from `seeds` via zero or more epsilon
    /// edges, in discovery order, including the seeds. Cycle-safe.
    ///
    /// Discovery order follows the epsilon wiring, so a loop's exit marker
    /// is reached before the re-entered entry marker within one step.
    pub fn fill_epsilon_closure(&self, seeds: &[StateId]) -> Vec<StateId> {
        let mut closure = Vec::new();
        let mut seen = HashSet::new();
        for &seed in seeds {
            if seen.insert(seed) {
                closure.push(seed);
            }
        }
        let mut i = 0;
        while i < closure.len() {
            let id = closure[i];
            i += 1;
            for &eps in &self[id].epsilons {
                if seen.insert(eps) {
                    closure.push(eps);
                }
            }
        }
        closure
    }

    /// The epsilon closure of every state reachable from the live set by
    /// consuming `ch`. A live state with no transition on `ch` drops out.
    pub fn fill_move(&self, states: &[StateId], ch: char) -> Vec<StateId> {
        let mut seeds = Vec::new();
        let mut seen = HashSet::new();
        for &id in states {
            if let Some(dest) = self[id].transitions.try_get(ch) {
                if seen.insert(dest) {
                    seeds.push(dest);
                }
            }
        }
        if seeds.is_empty() {
            return seeds;
        }
        self.fill_epsilon_closure(&seeds)
    }

    /// Single-state step for determinized graphs. Precondition: the graph
    /// is deterministic; on an NFA this silently picks the first matching
    /// edge.
    pub fn move_dfa(&self, state: StateId, ch: char) -> Option<StateId> {
        self[state].transitions.try_get(ch)
    }

    pub fn is_any_accepting(&self, states: &[StateId]) -> bool {
        states.iter().any(|&id| self[id].accept.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions_forward_and_reverse_stay_mirrored() {
        let mut t = InputTransitions::new();
        let a = StateId(1);
        let b = StateId(2);
        t.add_char('x', a);
        t.add_char('y', b);
        t.add_range(CharRange::new('0', '9'), a);

        assert_eq!(t.len(), 3);
        assert_eq!(t.try_get('x'), Some(a));
        assert_eq!(t.try_get('5'), Some(a));
        assert_eq!(t.try_get('y'), Some(b));
        assert_eq!(t.try_get('z'), None);

        let inputs = t.inputs_to(a).unwrap();
        assert_eq!(inputs.0, vec!['x']);
        assert_eq!(inputs.1, vec![CharRange::new('0', '9')]);

        let removed = t.remove(a).unwrap();
        assert_eq!(removed.0, vec!['x']);
        assert_eq!(t.try_get('x'), None);
        assert_eq!(t.try_get('5'), None);
        assert_eq!(t.try_get('y'), Some(b));
        assert_eq!(t.len(), 1);

        // removed inputs can be rewired to a new destination
        t.add_inputs(b, removed);
        assert_eq!(t.try_get('x'), Some(b));
        assert_eq!(t.try_get('5'), Some(b));
    }

    #[test]
    fn exact_char_wins_over_ranges() {
        let mut t = InputTransitions::new();
        t.add_range(CharRange::new('a', 'z'), StateId(7));
        t.add_char('q', StateId(9));
        assert_eq!(t.try_get('q'), Some(StateId(9)));
        assert_eq!(t.try_get('r'), Some(StateId(7)));
    }

    #[test]
    fn epsilon_closure_handles_cycles() {
        let mut fa: CharFa<u32> = CharFa::empty_graph();
        let a = fa.alloc();
        let b = fa.alloc();
        let c = fa.alloc();
        fa.add_epsilon(a, b);
        fa.add_epsilon(b, a);
        fa.add_epsilon(b, c);

        let closure = fa.fill_epsilon_closure(&[a]);
        assert_eq!(closure, vec![a, b, c]);
    }

    #[test]
    fn fill_move_merges_parallel_paths() {
        // both union branches stay live after the shared leading 'a'
        let fa = CharFa::literal("a", 1u32).union(CharFa::literal("ab", 2u32));
        let start = fa.fill_epsilon_closure(&[fa.start()]);
        let moved = fa.fill_move(&start, 'a');
        assert!(fa.is_any_accepting(&moved), "branch `a` accepts after one step");
        let moved = fa.fill_move(&moved, 'b');
        assert!(fa.is_any_accepting(&moved), "branch `ab` accepts after two");
        assert!(fa.fill_move(&moved, 'b').is_empty());
    }

    #[test]
    fn star_builds_a_true_cycle() {
        let fa = CharFa::literal("a", ()).star();
        let mut states = fa.fill_epsilon_closure(&[fa.start()]);
        assert!(fa.is_any_accepting(&states), "star accepts the empty string");
        for _ in 0..100 {
            states = fa.fill_move(&states, 'a');
            assert!(fa.is_any_accepting(&states));
        }
        // state count stays fixed no matter how long the input is
        assert_eq!(fa.len(), 2);
    }

    #[test]
    fn concat_clears_left_accepts() {
        let fa = CharFa::literal("a", 1u32).concat(CharFa::literal("b", 2u32));
        let start = fa.fill_epsilon_closure(&[fa.start()]);
        let after_a = fa.fill_move(&start, 'a');
        assert!(!fa.is_any_accepting(&after_a));
        let after_b = fa.fill_move(&after_a, 'b');
        assert!(fa.is_any_accepting(&after_b));
    }
}
