//! This module contains the NFA (Non-deterministic Finite Automaton) implementation.
//! The NFA is built from the pattern by the Thompson constructor in the parser module and is
//! later converted to a DFA (Deterministic Finite Automaton) by subset construction.
//!
//! All states of one NFA live in an arena owned by the [Nfa]. Edges refer to their targets by
//! [StateID], so the back edges created by the repetition operators need no shared ownership.

use itertools::Itertools;
use std::collections::{BTreeMap, BTreeSet};

use crate::{CharacterClass, StateID, StateIdGenerator, Symbol};

/// A two-terminal piece of an NFA under construction.
///
/// Every fragment has exactly one entry state and one exit state. The composition operations
/// of [Nfa] consume fragments and return the composed fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment {
    /// The entry state of the fragment.
    pub start: StateID,
    /// The exit state of the fragment.
    pub end: StateID,
}

/// A state of the NFA.
#[derive(Debug, Clone)]
pub struct NfaState {
    id: StateID,
    is_start: bool,
    is_end: bool,
    // Several targets per symbol are what makes the automaton non-deterministic.
    edges: BTreeMap<Symbol, BTreeSet<StateID>>,
}

impl NfaState {
    pub(crate) fn new(id: StateID) -> Self {
        Self {
            id,
            is_start: false,
            is_end: false,
            edges: BTreeMap::new(),
        }
    }

    /// The id of the state.
    pub fn id(&self) -> StateID {
        self.id
    }

    /// Returns true if this is the global start state of the automaton.
    pub fn is_start(&self) -> bool {
        self.is_start
    }

    /// Returns true if this is the global end (accepting) state of the automaton.
    pub fn is_end(&self) -> bool {
        self.is_end
    }

    /// The outgoing edges of the state grouped by their label.
    pub fn edges(&self) -> &BTreeMap<Symbol, BTreeSet<StateID>> {
        &self.edges
    }

    /// The targets of the edges labeled with `symbol`.
    pub fn targets(&self, symbol: Symbol) -> impl Iterator<Item = StateID> + '_ {
        self.edges
            .get(&symbol)
            .into_iter()
            .flat_map(|targets| targets.iter().copied())
    }

    /// Returns true if the state has no outgoing edges.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    fn add_edge(&mut self, symbol: Symbol, target_state: StateID) {
        self.edges.entry(symbol).or_default().insert(target_state);
    }
}

/// The NFA implementation.
#[derive(Debug, Clone, Default)]
pub struct Nfa {
    states: Vec<NfaState>,
    // The id of states[0]. Ids are dense from here on.
    first_id: StateID,
    start_state: StateID,
    end_state: StateID,
}

impl Nfa {
    /// Create an NFA without any states.
    pub fn new() -> Self {
        Nfa::default()
    }

    /// The start state of the outermost fragment.
    pub fn start_state(&self) -> StateID {
        self.start_state
    }

    /// The end state of the outermost fragment.
    pub fn end_state(&self) -> StateID {
        self.end_state
    }

    /// All states in the order of their creation.
    pub fn states(&self) -> &[NfaState] {
        &self.states
    }

    /// Returns true if no state has been created yet.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Get a state by its id.
    ///
    /// # Panics
    /// Panics if the id was not handed out for this NFA, i.e. if it lies below the id of the
    /// first state or beyond the last one.
    pub fn state(&self, id: StateID) -> &NfaState {
        let position = self.position(id);
        &self.states[position]
    }

    /// Returns true if the id belongs to a state of this NFA.
    pub fn contains(&self, id: StateID) -> bool {
        self.offset(id)
            .is_some_and(|offset| offset < self.states.len())
    }

    // The distance of the id from the id of the first state, `None` below it.
    #[inline]
    fn offset(&self, id: StateID) -> Option<usize> {
        id.as_usize().checked_sub(self.first_id.as_usize())
    }

    fn position(&self, id: StateID) -> usize {
        match self.offset(id) {
            Some(offset) if offset < self.states.len() => offset,
            _ => panic!(
                "state {} is not part of the NFA with states {}..{}",
                id,
                self.first_id,
                self.first_id + self.states.len()
            ),
        }
    }

    fn state_mut(&mut self, id: StateID) -> &mut NfaState {
        let position = self.position(id);
        &mut self.states[position]
    }

    /// Set the terminals of the outermost fragment.
    pub(crate) fn set_fragment(&mut self, fragment: Fragment) {
        self.start_state = fragment.start;
        self.end_state = fragment.end;
    }

    /// Flag the start and end state of the outermost fragment as the global start and end of
    /// the automaton. Flags set by an earlier call are cleared first.
    pub fn mark_terminals(&mut self) {
        for state in self.states.iter_mut() {
            state.is_start = false;
            state.is_end = false;
        }
        if self.is_empty() {
            return;
        }
        let (start, end) = (self.start_state, self.end_state);
        self.state_mut(start).is_start = true;
        self.state_mut(end).is_end = true;
    }

    /// Create a new state with the next id of the generator.
    pub fn new_state(&mut self, ids: &mut StateIdGenerator) -> StateID {
        let id = ids.next_id();
        if self.states.is_empty() {
            self.first_id = id;
        }
        debug_assert_eq!(
            self.offset(id),
            Some(self.states.len()),
            "state ids of one NFA must be dense"
        );
        self.states.push(NfaState::new(id));
        id
    }

    /// Add an edge from `from` to `target_state`.
    ///
    /// # Panics
    /// Panics if `from` is not a state of this NFA.
    pub fn add_transition(&mut self, from: StateID, symbol: Symbol, target_state: StateID) {
        self.state_mut(from).add_edge(symbol, target_state);
    }

    /// Add an epsilon edge from `from` to `target_state`.
    pub fn add_epsilon_transition(&mut self, from: StateID, target_state: StateID) {
        self.add_transition(from, Symbol::Epsilon, target_state);
    }

    /// A fragment that matches exactly one character.
    pub fn literal(&mut self, ids: &mut StateIdGenerator, c: char) -> Fragment {
        let start = self.new_state(ids);
        let end = self.new_state(ids);
        self.add_transition(start, Symbol::Char(c), end);
        Fragment { start, end }
    }

    /// A fragment that matches exactly one character of the class.
    /// All characters share the same start and end state.
    pub fn char_class(&mut self, ids: &mut StateIdGenerator, class: &CharacterClass) -> Fragment {
        let start = self.new_state(ids);
        let end = self.new_state(ids);
        for c in class.chars() {
            self.add_transition(start, Symbol::Char(c), end);
        }
        Fragment { start, end }
    }

    /// Concatenation `AB`: the end of `a` is joined to the start of `b`.
    pub fn concat(&mut self, a: Fragment, b: Fragment) -> Fragment {
        self.add_epsilon_transition(a.end, b.start);
        Fragment {
            start: a.start,
            end: b.end,
        }
    }

    /// Alternation `A|B`.
    pub fn alternation(&mut self, ids: &mut StateIdGenerator, a: Fragment, b: Fragment) -> Fragment {
        let start = self.new_state(ids);
        self.add_epsilon_transition(start, a.start);
        self.add_epsilon_transition(start, b.start);

        let end = self.new_state(ids);
        self.add_epsilon_transition(a.end, end);
        self.add_epsilon_transition(b.end, end);

        Fragment { start, end }
    }

    /// Repetition `A*`.
    pub fn zero_or_more(&mut self, ids: &mut StateIdGenerator, a: Fragment) -> Fragment {
        let start = self.new_state(ids);
        let end = self.new_state(ids);
        self.add_epsilon_transition(start, a.start);
        // Bypass for zero repetitions
        self.add_epsilon_transition(start, end);
        // Loop
        self.add_epsilon_transition(a.end, a.start);
        self.add_epsilon_transition(a.end, end);
        Fragment { start, end }
    }

    /// Repetition `A+`. Same as `A*` without the bypass.
    pub fn one_or_more(&mut self, ids: &mut StateIdGenerator, a: Fragment) -> Fragment {
        let start = self.new_state(ids);
        let end = self.new_state(ids);
        self.add_epsilon_transition(start, a.start);
        self.add_epsilon_transition(a.end, a.start);
        self.add_epsilon_transition(a.end, end);
        Fragment { start, end }
    }

    /// Option `A?`.
    pub fn zero_or_one(&mut self, ids: &mut StateIdGenerator, a: Fragment) -> Fragment {
        let start = self.new_state(ids);
        let end = self.new_state(ids);
        self.add_epsilon_transition(start, a.start);
        self.add_epsilon_transition(start, end);
        self.add_epsilon_transition(a.end, end);
        Fragment { start, end }
    }

    /// Simulate the NFA on the input.
    ///
    /// The input is accepted if the set of states reached after the last character contains a
    /// state flagged as end state, see [mark_terminals](Nfa::mark_terminals).
    pub fn accepts(&self, input: &str) -> bool {
        if self.is_empty() {
            return false;
        }
        let mut current = self.closure([self.start_state]);
        for c in input.chars() {
            current = self.closure(self.edge(&current, c));
            if current.is_empty() {
                return false;
            }
        }
        current.iter().any(|id| self.state(*id).is_end())
    }
}

impl std::fmt::Display for Nfa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "NFA")?;
        writeln!(f, "States:")?;
        for state in &self.states {
            writeln!(
                f,
                "{}:{}{}",
                state.id,
                if state.is_start { " start" } else { "" },
                if state.is_end { " accepting" } else { "" }
            )?;
        }
        writeln!(f, "Transitions:")?;
        for state in self.states.iter().filter(|state| !state.is_empty()) {
            write!(f, "{} ->", state.id)?;
            for (symbol, targets) in &state.edges {
                write!(f, " {}:{}", symbol, targets.iter().join(","))?;
            }
            writeln!(f)?
        }
        Ok(())
    }
}
