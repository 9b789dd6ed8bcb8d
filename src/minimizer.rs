//! Minimization of a DFA by partition refinement.

use itertools::Itertools;
use log::{debug, trace};
use std::collections::{BTreeMap, BTreeSet};

use crate::{CanonicalId, Dfa, DfaState, DfaStateID, TransformRecord};

// The type definitions for the partition refinement.
type StateGroup = BTreeSet<DfaStateID>;
type Partition = Vec<StateGroup>;

impl Dfa {
    /// Minimize the DFA.
    ///
    /// The states are first divided into the accepting and the non-accepting ones. A group is
    /// split as long as its states lead into different groups on some character, where a
    /// missing transition counts as a group of its own. When no group can be split anymore,
    /// each group becomes one state of a new DFA. The new state is composed of the union of the
    /// NFA states of the group members.
    ///
    /// The group that contains the start state becomes the first state of the new DFA.
    pub fn minimize(&self) -> Dfa {
        let mut partition = self.calculate_initial_partition();
        Self::trace_partition("initial", &partition);

        while let Some((index, groups)) = self.find_split(&partition) {
            // The partition changed, the scan starts over.
            partition.remove(index);
            partition.extend(groups);
            Self::trace_partition("refined", &partition);
        }

        let dfa = self.create_from_partition(partition);
        debug!(
            "Minimization: {} DFA states reduced to {}, {} accepting.",
            self.states().len(),
            dfa.states().len(),
            dfa.accepting_states().len()
        );
        dfa
    }

    /// Trace out a partition of the DFA.
    fn trace_partition(context: &str, partition: &[StateGroup]) {
        trace!("Partition {}:", context);
        for (i, group) in partition.iter().enumerate() {
            trace!("Group {}: {{{}}}", i, group.iter().join(", "));
        }
    }

    /// The accepting states form one group, the non-accepting states the other.
    /// Unreachable states are not treated specially. Empty groups are left out.
    fn calculate_initial_partition(&self) -> Partition {
        let (accepting, non_accepting): (StateGroup, StateGroup) = self
            .states()
            .iter()
            .map(|state| state.id())
            .partition(|id| self.state(*id).is_end());
        [accepting, non_accepting]
            .into_iter()
            .filter(|group| !group.is_empty())
            .collect()
    }

    /// Find the first group that the states of the group split on a character.
    /// Returns the index of the group and the groups it splits into.
    fn find_split(&self, partition: &[StateGroup]) -> Option<(usize, Partition)> {
        for (index, group) in partition.iter().enumerate() {
            // A group with a single state can't be split further.
            if group.len() < 2 {
                continue;
            }
            for c in self.alphabet() {
                let split = group.iter().fold(
                    BTreeMap::<Option<usize>, StateGroup>::new(),
                    |mut split, state_id| {
                        split
                            .entry(self.target_group(*state_id, *c, partition))
                            .or_default()
                            .insert(*state_id);
                        split
                    },
                );
                if split.len() > 1 {
                    trace!("Split group {} on '{}'", index, c.escape_default());
                    return Some((index, split.into_values().collect()));
                }
            }
        }
        None
    }

    /// The index of the group the transition on `c` leads into.
    /// The target is looked up by canonical id, `None` stands for a missing transition.
    fn target_group(&self, state_id: DfaStateID, c: char, partition: &[StateGroup]) -> Option<usize> {
        self.structural_transitions()
            .get(self.state(state_id).canonical_id())
            .and_then(|targets| targets.get(&c))
            .and_then(|target| self.state_by_canonical_id(target))
            .and_then(|target| partition.iter().position(|group| group.contains(&target)))
    }

    /// Create a new DFA with one state per group.
    /// The edges of a new state are taken from the first member of its group.
    fn create_from_partition(&self, partition: Partition) -> Dfa {
        let groups = partition
            .into_iter()
            .sorted_by_key(|group| !group.contains(&self.start_state()))
            .collect_vec();

        // Maps the canonical ids of the old states to the ones of the new states.
        let mut id_map: BTreeMap<&CanonicalId, CanonicalId> = BTreeMap::new();
        let mut states = Vec::with_capacity(groups.len());
        for (index, group) in groups.iter().enumerate() {
            let canonical_id: CanonicalId = group
                .iter()
                .flat_map(|id| self.state(*id).nfa_states().iter().copied())
                .collect();
            let is_start = group.iter().any(|id| self.state(*id).is_start());
            let is_end = group.iter().any(|id| self.state(*id).is_end());
            for id in group {
                id_map.insert(self.state(*id).canonical_id(), canonical_id.clone());
            }
            states.push(DfaState::new(
                DfaStateID::new(index),
                canonical_id,
                is_start,
                is_end,
            ));
        }

        let mut records = Vec::new();
        for (group, state) in groups.iter().zip(states.iter()) {
            let Some(representative) = group.first() else {
                continue;
            };
            for c in self.alphabet() {
                if let Some(target) = self.find_transition(*representative, *c) {
                    let end = id_map[self.state(target).canonical_id()].clone();
                    records.push(TransformRecord::new(state.canonical_id().clone(), *c, end));
                }
            }
        }

        Dfa::from_transform_records(states, &records)
    }
}

#[cfg(test)]
mod tests {
    use crate::{compile_dfa, CanonicalId, Dfa, DfaState, DfaStateID, StateID, TransformRecord};

    fn minimal_dfa_of(pattern: &str) -> (Dfa, Dfa) {
        let _ = env_logger::builder().is_test(true).try_init();
        let dfa = compile_dfa(pattern).unwrap();
        let minimal = dfa.minimize();
        (dfa, minimal)
    }

    fn canonical_id(ids: &[usize]) -> CanonicalId {
        ids.iter().map(|id| StateID::new(*id)).collect()
    }

    #[test]
    fn test_minimize_dragon() {
        let (dfa, minimal) = minimal_dfa_of("(a|b)*abb");
        assert_eq!(dfa.states().len(), 5);
        assert_eq!(minimal.states().len(), 4);
        assert_eq!(minimal.accepting_states().len(), 1);
        assert_eq!(minimal.non_accepting_states().len(), 3);
        assert_eq!(minimal.start_state(), DfaStateID::new(0));
        assert!(minimal.state(minimal.start_state()).is_start());
        for input in ["abb", "aabb", "babb", "ababb", "bbabb"] {
            assert!(minimal.accepts(input), "{}", input);
        }
        for input in ["", "ab", "abba", "abab", "b"] {
            assert!(!minimal.accepts(input), "{}", input);
        }
    }

    #[test]
    fn test_merged_state_unites_nfa_states() {
        let (dfa, minimal) = minimal_dfa_of("(a|b)*abb");
        // The start state of the subset construction and the state reached by 'b' from it are
        // equivalent.
        let start = dfa.state(dfa.start_state());
        let after_b = dfa.state(dfa.find_transition(dfa.start_state(), 'b').unwrap());
        let merged = minimal.state(minimal.start_state());
        for id in start.nfa_states().iter().chain(after_b.nfa_states()) {
            assert!(merged.canonical_id().contains(*id));
        }
    }

    #[test]
    fn test_minimize_is_idempotent() {
        for pattern in ["(a|b)*abb", "a(b|c)*d", "a[b-d]", "x?y+z*", "(ab|a)*b"] {
            let (_, minimal) = minimal_dfa_of(pattern);
            let again = minimal.minimize();
            assert_eq!(again.states().len(), minimal.states().len(), "{}", pattern);
            assert_eq!(
                again.accepting_states().len(),
                minimal.accepting_states().len(),
                "{}",
                pattern
            );
            assert_eq!(
                again.non_accepting_states().len(),
                minimal.non_accepting_states().len(),
                "{}",
                pattern
            );
        }
    }

    #[test]
    fn test_minimize_merges_accepting_states() {
        let (dfa, minimal) = minimal_dfa_of("a|b");
        assert_eq!(dfa.states().len(), 3);
        assert_eq!(minimal.states().len(), 2);
        assert_eq!(minimal.accepting_states().len(), 1);
        assert!(minimal.accepts("a"));
        assert!(minimal.accepts("b"));
        assert!(!minimal.accepts("ab"));
    }

    #[test]
    fn test_minimize_character_class() {
        let (_, minimal) = minimal_dfa_of("a[b-d]");
        assert_eq!(minimal.states().len(), 3);
        assert_eq!(minimal.alphabet(), &['a', 'b', 'c', 'd']);
    }

    #[test]
    fn test_missing_transition_distinguishes_states() {
        // 0 -a-> 1 -c-> 3 and 0 -b-> 2, where 2 is a dead end.
        let states = vec![
            DfaState::new(DfaStateID::new(0), canonical_id(&[0]), true, false),
            DfaState::new(DfaStateID::new(1), canonical_id(&[1]), false, false),
            DfaState::new(DfaStateID::new(2), canonical_id(&[2]), false, false),
            DfaState::new(DfaStateID::new(3), canonical_id(&[3]), false, true),
        ];
        let records = vec![
            TransformRecord::new(canonical_id(&[0]), 'a', canonical_id(&[1])),
            TransformRecord::new(canonical_id(&[0]), 'b', canonical_id(&[2])),
            TransformRecord::new(canonical_id(&[1]), 'c', canonical_id(&[3])),
        ];
        let dfa = Dfa::from_transform_records(states, &records);
        let minimal = dfa.minimize();
        assert_eq!(minimal.states().len(), 4);
        assert!(minimal.accepts("ac"));
        assert!(!minimal.accepts("bc"));
    }

    #[test]
    fn test_minimize_empty_dfa() {
        let minimal = Dfa::default().minimize();
        assert!(minimal.states().is_empty());
        assert!(!minimal.accepts(""));
    }
}
