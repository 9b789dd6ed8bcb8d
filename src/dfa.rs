//! This module contains the DFA implementation.
//! The DFA is generated from the NFA using the subset construction algorithm.
//!
//! A DFA state stands for a set of NFA states. Two DFA states composed of the same NFA states
//! are the same state: identity is the [CanonicalId], the sorted list of the composing NFA
//! state ids.

use itertools::Itertools;
use log::{debug, warn};
use std::collections::{BTreeMap, BTreeSet};

use crate::{DfaStateID, Nfa, StateID};

/// The identity of a DFA state: the ascending, duplicate free ids of its NFA states.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanonicalId(Vec<StateID>);

impl CanonicalId {
    /// The NFA states that constitute the DFA state.
    pub fn nfa_states(&self) -> &[StateID] {
        &self.0
    }

    /// Returns true if no NFA state is part of the id.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if the NFA state is part of the id.
    pub fn contains(&self, state: StateID) -> bool {
        self.0.binary_search(&state).is_ok()
    }
}

impl FromIterator<StateID> for CanonicalId {
    fn from_iter<I: IntoIterator<Item = StateID>>(iter: I) -> Self {
        let mut ids: Vec<StateID> = iter.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();
        CanonicalId(ids)
    }
}

impl From<&BTreeSet<StateID>> for CanonicalId {
    fn from(states: &BTreeSet<StateID>) -> Self {
        // A BTreeSet is already sorted and free of duplicates.
        CanonicalId(states.iter().copied().collect())
    }
}

impl std::fmt::Display for CanonicalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.iter().join(","))
    }
}

/// A state of the DFA.
///
/// Equality and hashing only look at the canonical id.
#[derive(Debug, Clone)]
pub struct DfaState {
    id: DfaStateID,
    canonical_id: CanonicalId,
    is_start: bool,
    is_end: bool,
    // Marks a state as processed during subset construction.
    marked: bool,
}

impl DfaState {
    /// Create a new DFA state.
    pub fn new(id: DfaStateID, canonical_id: CanonicalId, is_start: bool, is_end: bool) -> Self {
        DfaState {
            id,
            canonical_id,
            is_start,
            is_end,
            marked: false,
        }
    }

    /// The index of the state in its DFA.
    pub fn id(&self) -> DfaStateID {
        self.id
    }

    /// The identity of the state.
    pub fn canonical_id(&self) -> &CanonicalId {
        &self.canonical_id
    }

    /// The NFA states that constitute the DFA state.
    pub fn nfa_states(&self) -> &[StateID] {
        self.canonical_id.nfa_states()
    }

    /// True if any composing NFA state is the start state.
    pub fn is_start(&self) -> bool {
        self.is_start
    }

    /// True if any composing NFA state is an end state.
    pub fn is_end(&self) -> bool {
        self.is_end
    }

    /// The marker of subset construction. It carries no meaning afterwards.
    pub fn marked(&self) -> bool {
        self.marked
    }
}

impl PartialEq for DfaState {
    fn eq(&self, other: &Self) -> bool {
        self.canonical_id == other.canonical_id
    }
}

impl Eq for DfaState {}

impl std::hash::Hash for DfaState {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.canonical_id.hash(state);
    }
}

/// One DFA edge in the flat form used to rebuild a DFA from scratch.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransformRecord {
    /// The source state.
    pub start: CanonicalId,
    /// The character that drives the transition.
    pub symbol: char,
    /// The target state.
    pub end: CanonicalId,
}

impl TransformRecord {
    /// Create a new transform record.
    pub fn new(start: CanonicalId, symbol: char, end: CanonicalId) -> Self {
        TransformRecord { start, symbol, end }
    }
}

/// The DFA implementation.
///
/// The transition function is partial. A missing entry for a state and a character means that
/// the automaton rejects the input there.
#[derive(Debug, Clone, Default)]
pub struct Dfa {
    // The states of the DFA in the order of their creation.
    states: Vec<DfaState>,
    // Finds the state of a canonical id.
    state_ids: BTreeMap<CanonicalId, DfaStateID>,
    start_state: DfaStateID,
    // The forward transition table.
    transitions: BTreeMap<DfaStateID, BTreeMap<char, DfaStateID>>,
    // The same table keyed by canonical ids. Minimization splits groups along this one.
    structural_transitions: BTreeMap<CanonicalId, BTreeMap<char, CanonicalId>>,
    accepting_states: Vec<DfaStateID>,
    non_accepting_states: Vec<DfaStateID>,
    // The characters of the DFA. Never contains epsilon.
    alphabet: Vec<char>,
}

impl Dfa {
    /// Get the states of the DFA.
    pub fn states(&self) -> &[DfaState] {
        &self.states
    }

    /// Get a state by its id.
    pub fn state(&self, id: DfaStateID) -> &DfaState {
        &self.states[id]
    }

    /// The start state.
    pub fn start_state(&self) -> DfaStateID {
        self.start_state
    }

    /// Find the state with the given canonical id.
    pub fn state_by_canonical_id(&self, canonical_id: &CanonicalId) -> Option<DfaStateID> {
        self.state_ids.get(canonical_id).copied()
    }

    /// Get the forward transition table.
    pub fn transitions(&self) -> &BTreeMap<DfaStateID, BTreeMap<char, DfaStateID>> {
        &self.transitions
    }

    /// Get the transition table keyed by canonical ids.
    pub fn structural_transitions(&self) -> &BTreeMap<CanonicalId, BTreeMap<char, CanonicalId>> {
        &self.structural_transitions
    }

    /// The accepting states.
    pub fn accepting_states(&self) -> &[DfaStateID] {
        &self.accepting_states
    }

    /// The non-accepting states.
    pub fn non_accepting_states(&self) -> &[DfaStateID] {
        &self.non_accepting_states
    }

    /// The ordered alphabet of the DFA.
    pub fn alphabet(&self) -> &[char] {
        &self.alphabet
    }

    /// The target of the transition from `state` on `c`, if there is one.
    #[inline]
    pub fn find_transition(&self, state: DfaStateID, c: char) -> Option<DfaStateID> {
        self.transitions
            .get(&state)
            .and_then(|targets| targets.get(&c))
            .copied()
    }

    /// Run the DFA on the input and report whether it ends in an accepting state.
    pub fn accepts(&self, input: &str) -> bool {
        if self.states.is_empty() {
            return false;
        }
        let mut current = self.start_state;
        for c in input.chars() {
            match self.find_transition(current, c) {
                Some(next) => current = next,
                None => return false,
            }
        }
        self.states[current].is_end
    }

    /// All edges of the DFA as transform records, ordered by source state and character.
    pub fn transform_records(&self) -> Vec<TransformRecord> {
        self.transitions
            .iter()
            .flat_map(|(source, targets)| {
                targets.iter().map(move |(c, target)| {
                    TransformRecord::new(
                        self.states[*source].canonical_id.clone(),
                        *c,
                        self.states[*target].canonical_id.clone(),
                    )
                })
            })
            .collect()
    }

    /// Build a DFA from scratch out of states and transform records.
    ///
    /// The start state is the first state flagged as start, or the first state if none is.
    /// States with the same canonical id are merged. The alphabet consists of the characters
    /// of the records in the order of their first appearance. Records that refer to unknown
    /// states are skipped with a warning.
    pub fn from_transform_records<I>(states: I, records: &[TransformRecord]) -> Dfa
    where
        I: IntoIterator<Item = DfaState>,
    {
        let mut dfa = Dfa::default();
        for state in states {
            dfa.add_state_if_new(state.canonical_id, state.is_start, state.is_end);
        }
        dfa.start_state = dfa
            .states
            .iter()
            .find(|state| state.is_start)
            .map(|state| state.id)
            .unwrap_or_default();

        for record in records {
            let (Some(start), Some(end)) = (
                dfa.state_by_canonical_id(&record.start),
                dfa.state_by_canonical_id(&record.end),
            ) else {
                warn!(
                    "Skipping transform record {{{}}} -'{}'-> {{{}}}: unknown state.",
                    record.start,
                    record.symbol.escape_default(),
                    record.end
                );
                continue;
            };
            if !dfa.alphabet.contains(&record.symbol) {
                dfa.alphabet.push(record.symbol);
            }
            dfa.add_transition(start, record.symbol, end);
        }

        for index in 0..dfa.states.len() {
            dfa.record_partition(DfaStateID::new(index));
        }
        dfa
    }

    /// Add a state for the canonical id unless one exists already.
    /// The id of the new or the existing state is returned. The flags of an existing state are
    /// combined with the given ones.
    pub(crate) fn add_state_if_new(
        &mut self,
        canonical_id: CanonicalId,
        is_start: bool,
        is_end: bool,
    ) -> DfaStateID {
        if let Some(state_id) = self.state_ids.get(&canonical_id) {
            let state = &mut self.states[*state_id];
            state.is_start |= is_start;
            state.is_end |= is_end;
            return *state_id;
        }
        let state_id = DfaStateID::new(self.states.len());
        self.state_ids.insert(canonical_id.clone(), state_id);
        self.states
            .push(DfaState::new(state_id, canonical_id, is_start, is_end));
        state_id
    }

    /// Register the transition in the forward and in the structural table.
    pub(crate) fn add_transition(&mut self, from: DfaStateID, c: char, to: DfaStateID) {
        self.transitions.entry(from).or_default().insert(c, to);
        let from_id = self.states[from].canonical_id.clone();
        let to_id = self.states[to].canonical_id.clone();
        self.structural_transitions
            .entry(from_id)
            .or_default()
            .insert(c, to_id);
    }

    /// Put the state into the accepting or the non-accepting partition.
    fn record_partition(&mut self, state_id: DfaStateID) {
        if self.states[state_id].is_end {
            if !self.accepting_states.contains(&state_id) {
                self.accepting_states.push(state_id);
            }
        } else if !self.non_accepting_states.contains(&state_id) {
            self.non_accepting_states.push(state_id);
        }
    }

    /// Create a DFA from an NFA using the subset construction algorithm.
    ///
    /// The DFA states are flagged from the `is_start` and `is_end` flags of the NFA states, so
    /// the NFA should have its terminals marked. Subsets that become empty on a character are
    /// not turned into states: the transition is simply missing.
    pub fn from_nfa(nfa: &Nfa) -> Self {
        let mut dfa = Dfa {
            alphabet: nfa.alphabet(),
            ..Dfa::default()
        };
        if nfa.is_empty() {
            return dfa;
        }

        // The start state of the DFA is the epsilon closure of the start state of the NFA.
        let start_state = dfa.add_nfa_subset(nfa, &nfa.closure([nfa.start_state()]));
        dfa.start_state = start_state;
        // The work list holds the states that are not marked yet.
        let mut work_list = vec![start_state];

        while let Some(state_id) = work_list.pop() {
            if dfa.states[state_id].marked {
                continue;
            }
            dfa.states[state_id].marked = true;
            dfa.record_partition(state_id);

            let nfa_states: BTreeSet<StateID> =
                dfa.states[state_id].nfa_states().iter().copied().collect();
            for c in dfa.alphabet.clone() {
                let target_states = nfa.closure(nfa.edge(&nfa_states, c));
                if target_states.is_empty() {
                    continue;
                }
                let target_state = dfa.add_nfa_subset(nfa, &target_states);
                dfa.add_transition(state_id, c, target_state);
                if !dfa.states[target_state].marked {
                    work_list.push(target_state);
                }
            }
        }

        debug!(
            "Subset construction: {} NFA states, {} DFA states, {} accepting.",
            nfa.states().len(),
            dfa.states.len(),
            dfa.accepting_states.len()
        );
        dfa
    }

    fn add_nfa_subset(&mut self, nfa: &Nfa, nfa_states: &BTreeSet<StateID>) -> DfaStateID {
        let is_start = nfa_states.iter().any(|id| nfa.state(*id).is_start());
        let is_end = nfa_states.iter().any(|id| nfa.state(*id).is_end());
        self.add_state_if_new(CanonicalId::from(nfa_states), is_start, is_end)
    }
}

impl From<&Nfa> for Dfa {
    fn from(nfa: &Nfa) -> Self {
        Dfa::from_nfa(nfa)
    }
}

impl std::fmt::Display for Dfa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "DFA")?;
        writeln!(f, "States:")?;
        for state in &self.states {
            writeln!(
                f,
                "{}: {{{}}}{}{}",
                state.id,
                state.canonical_id,
                if state.is_start { " start" } else { "" },
                if state.is_end { " accepting" } else { "" }
            )?;
        }
        writeln!(f, "Alphabet: {}", self.alphabet.iter().join(" "))?;
        writeln!(f, "Accepting states: {}", self.accepting_states.iter().join(" "))?;
        writeln!(
            f,
            "Non-accepting states: {}",
            self.non_accepting_states.iter().join(" ")
        )?;
        writeln!(f, "Transitions:")?;
        for (source_id, targets) in &self.transitions {
            write!(f, "{} ->", source_id)?;
            for (c, target_id) in targets {
                write!(f, " {}:{}", c.escape_default(), target_id)?;
            }
            writeln!(f)?
        }
        Ok(())
    }
}
