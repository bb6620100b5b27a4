//! Reachability from initial states and to final states.
use std::collections::{BTreeSet, VecDeque};

use bit_set::BitSet;
use tracing::trace;

use crate::{
    automaton::{Automaton, StateId},
    labelset::LabelSet,
    weightset::WeightSet,
};

fn search<L, W, I, F, N>(aut: &Automaton<L, W>, start: I, next: F) -> BTreeSet<StateId>
where
    L: LabelSet,
    W: WeightSet,
    I: IntoIterator<Item = StateId>,
    F: Fn(StateId) -> N,
    N: Iterator<Item = StateId>,
{
    let mut seen = BitSet::with_capacity(aut.state_bound());
    let mut queue = VecDeque::new();
    for s in start {
        if seen.insert(s.index()) {
            queue.push_back(s);
        }
    }
    while let Some(s) = queue.pop_front() {
        for t in next(s) {
            if seen.insert(t.index()) {
                queue.push_back(t);
            }
        }
    }
    seen.iter().map(StateId).collect()
}

/// The states reachable from an initial state.
pub fn accessible_states<L: LabelSet, W: WeightSet>(aut: &Automaton<L, W>) -> BTreeSet<StateId> {
    search(aut, aut.initial_states(), |s| aut.successors(s))
}

/// The states from which a final state is reachable.
pub fn coaccessible_states<L: LabelSet, W: WeightSet>(aut: &Automaton<L, W>) -> BTreeSet<StateId> {
    search(aut, aut.final_states(), |s| aut.predecessors(s))
}

/// The states that are both accessible and coaccessible.
pub fn useful_states<L: LabelSet, W: WeightSet>(aut: &Automaton<L, W>) -> BTreeSet<StateId> {
    let acc = accessible_states(aut);
    coaccessible_states(aut)
        .into_iter()
        .filter(|s| acc.contains(s))
        .collect()
}

/// Number of accessible states.
pub fn num_accessible_states<L: LabelSet, W: WeightSet>(aut: &Automaton<L, W>) -> usize {
    accessible_states(aut).len()
}

/// Number of coaccessible states.
pub fn num_coaccessible_states<L: LabelSet, W: WeightSet>(aut: &Automaton<L, W>) -> usize {
    coaccessible_states(aut).len()
}

/// Number of useful states.
pub fn num_useful_states<L: LabelSet, W: WeightSet>(aut: &Automaton<L, W>) -> usize {
    useful_states(aut).len()
}

fn keep_only<L: LabelSet, W: WeightSet>(aut: &mut Automaton<L, W>, keep: &BTreeSet<StateId>) {
    let doomed: Vec<StateId> = aut.states().filter(|s| !keep.contains(s)).collect();
    trace!("deleting {} states", doomed.len());
    for s in doomed {
        aut.del_state(s);
    }
}

/// Deletes the states that are not accessible.
pub fn accessible_here<L: LabelSet, W: WeightSet>(aut: &mut Automaton<L, W>) {
    let keep = accessible_states(aut);
    keep_only(aut, &keep);
}

/// Deletes the states that are not coaccessible.
pub fn coaccessible_here<L: LabelSet, W: WeightSet>(aut: &mut Automaton<L, W>) {
    let keep = coaccessible_states(aut);
    keep_only(aut, &keep);
}

/// Deletes the states that are not useful.
pub fn trim_here<L: LabelSet, W: WeightSet>(aut: &mut Automaton<L, W>) {
    let keep = useful_states(aut);
    keep_only(aut, &keep);
}

/// The accessible part of `aut`. State identifiers are preserved.
pub fn accessible<L: LabelSet, W: WeightSet>(aut: &Automaton<L, W>) -> Automaton<L, W> {
    let mut res = aut.clone();
    accessible_here(&mut res);
    res
}

/// The coaccessible part of `aut`. State identifiers are preserved.
pub fn coaccessible<L: LabelSet, W: WeightSet>(aut: &Automaton<L, W>) -> Automaton<L, W> {
    let mut res = aut.clone();
    coaccessible_here(&mut res);
    res
}

/// The useful part of `aut`. State identifiers are preserved.
pub fn trim<L: LabelSet, W: WeightSet>(aut: &Automaton<L, W>) -> Automaton<L, W> {
    let mut res = aut.clone();
    trim_here(&mut res);
    res
}

/// Whether every state is accessible.
pub fn is_accessible<L: LabelSet, W: WeightSet>(aut: &Automaton<L, W>) -> bool {
    num_accessible_states(aut) == aut.num_states()
}

/// Whether every state is coaccessible.
pub fn is_coaccessible<L: LabelSet, W: WeightSet>(aut: &Automaton<L, W>) -> bool {
    num_coaccessible_states(aut) == aut.num_states()
}

/// Whether every state is useful.
pub fn is_trim<L: LabelSet, W: WeightSet>(aut: &Automaton<L, W>) -> bool {
    num_useful_states(aut) == aut.num_states()
}

/// Whether no state is useful, i.e. no path leads from an initial to a final state.
pub fn is_useless<L: LabelSet, W: WeightSet>(aut: &Automaton<L, W>) -> bool {
    num_useful_states(aut) == 0
}

/// Whether the automaton has no state at all.
pub fn is_empty<L: LabelSet, W: WeightSet>(aut: &Automaton<L, W>) -> bool {
    aut.num_states() == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::two_initials_with_back_edge;

    #[test_log::test]
    fn reachability_counts() {
        let aut = two_initials_with_back_edge();
        assert_eq!(num_accessible_states(&aut), 4);
        assert_eq!(num_coaccessible_states(&aut), 4);
        assert_eq!(num_useful_states(&aut), 3);
        assert!(!is_trim(&aut));
        assert!(!is_accessible(&aut));
        assert!(!is_coaccessible(&aut));
        assert!(!is_useless(&aut));
    }

    #[test_log::test]
    fn trimming_keeps_identifiers() {
        let aut = two_initials_with_back_edge();
        let trimmed = trim(&aut);
        assert_eq!(trimmed.num_states(), 3);
        assert!(is_trim(&trimmed));
        assert_eq!(
            trimmed.states().collect::<BTreeSet<_>>(),
            useful_states(&aut)
        );
        assert_eq!(accessible(&aut).num_states(), 4);
        let mut co = aut.clone();
        coaccessible_here(&mut co);
        assert!(is_coaccessible(&co));
        assert_eq!(co.num_states(), 4);
    }
}
