//! Adjacency list projections of the automata for external renderers.
//!
//! A projection maps `"<state>@<is_end>"` to one `"<target>@<symbol>@<target_is_end>"` entry per
//! transition of the state. NFA states are named by their id, DFA states by their canonical id.
//! Epsilon edges only occur in NFA projections and are labeled `epsilon`.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::{Dfa, Nfa};

/// An automaton flattened into an adjacency list of strings.
pub type Projection = BTreeMap<String, Vec<String>>;

fn key(state: impl std::fmt::Display, is_end: bool) -> String {
    format!("{}@{}", state, is_end)
}

fn entry(target: impl std::fmt::Display, symbol: impl std::fmt::Display, is_end: bool) -> String {
    format!("{}@{}@{}", target, symbol, is_end)
}

impl Nfa {
    /// The projection of all states reachable from the start state.
    pub fn projection(&self) -> Projection {
        let mut projection = Projection::new();
        if self.is_empty() {
            return projection;
        }
        let mut visited = BTreeSet::from([self.start_state()]);
        let mut queue = VecDeque::from([self.start_state()]);
        while let Some(id) = queue.pop_front() {
            let state = self.state(id);
            let mut entries = Vec::new();
            for (symbol, targets) in state.edges() {
                for target in targets {
                    entries.push(entry(target, symbol, self.state(*target).is_end()));
                    if visited.insert(*target) {
                        queue.push_back(*target);
                    }
                }
            }
            projection.insert(key(id, state.is_end()), entries);
        }
        projection
    }
}

impl Dfa {
    /// The projection of all states and their transitions.
    pub fn projection(&self) -> Projection {
        self.states()
            .iter()
            .map(|state| {
                let entries = self
                    .transitions()
                    .get(&state.id())
                    .into_iter()
                    .flatten()
                    .map(|(c, target)| {
                        let target = self.state(*target);
                        entry(target.canonical_id(), c, target.is_end())
                    })
                    .collect();
                (key(state.canonical_id(), state.is_end()), entries)
            })
            .collect()
    }
}
