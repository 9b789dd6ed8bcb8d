//! Epsilon closure and symbol edges over sets of NFA states.
//! Subset construction composes both as `closure(edge(T, c))`.

use std::collections::{BTreeSet, VecDeque};

use crate::{Nfa, StateID, Symbol};

impl Nfa {
    /// The epsilon closure of the given states.
    ///
    /// Returns every state reachable from the input states by epsilon edges alone, the input
    /// states included. Each state is pushed onto the work stack at most once.
    pub fn closure<I>(&self, states: I) -> BTreeSet<StateID>
    where
        I: IntoIterator<Item = StateID>,
    {
        let mut closure: BTreeSet<StateID> = BTreeSet::new();
        let mut stack: Vec<StateID> = Vec::new();
        for state in states {
            if closure.insert(state) {
                stack.push(state);
            }
        }
        while let Some(state) = stack.pop() {
            for target in self.state(state).targets(Symbol::Epsilon) {
                if closure.insert(target) {
                    stack.push(target);
                }
            }
        }
        closure
    }

    /// The union of the direct targets of all `c`-labeled edges leaving the given states.
    /// No epsilon closure is applied.
    pub fn edge(&self, states: &BTreeSet<StateID>, c: char) -> BTreeSet<StateID> {
        states
            .iter()
            .flat_map(|state| self.state(*state).targets(Symbol::Char(c)))
            .collect()
    }

    /// The distinct characters of all edges reachable from the start state.
    ///
    /// The characters are ordered by their discovery in a breadth-first traversal that visits
    /// the edges of each state in symbol order. Epsilon is never part of the alphabet.
    pub fn alphabet(&self) -> Vec<char> {
        let mut alphabet = Vec::new();
        if self.is_empty() {
            return alphabet;
        }
        let mut visited = BTreeSet::from([self.start_state()]);
        let mut queue = VecDeque::from([self.start_state()]);
        while let Some(state) = queue.pop_front() {
            for (symbol, targets) in self.state(state).edges() {
                if let Some(c) = symbol.as_char() {
                    if !alphabet.contains(&c) {
                        alphabet.push(c);
                    }
                }
                for target in targets {
                    if visited.insert(*target) {
                        queue.push_back(*target);
                    }
                }
            }
        }
        alphabet
    }
}
