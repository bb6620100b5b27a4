//! Isomorphism of automata.
//!
//! Two automata are isomorphic if a bijection between their states maps initial and final
//! weights onto each other and maps every transition onto a transition with the same label
//! and weight. States are first grouped by what they look like locally, then the bijection
//! is searched for by backtracking, visiting the states of the left automaton in breadth
//! first order from the initial states so that most choices are forced by a neighbour that
//! is already matched.
use std::collections::{BTreeSet, VecDeque};

use itertools::Itertools;
use tracing::{debug, trace};

use crate::{
    automaton::{Automaton, StateId},
    labelset::LabelSet,
    math::{Bijection, Map},
    weightset::WeightSet,
};

type Profile<L, W> = (
    <W as WeightSet>::Value,
    <W as WeightSet>::Value,
    Vec<(<L as LabelSet>::Label, <W as WeightSet>::Value)>,
    Vec<(<L as LabelSet>::Label, <W as WeightSet>::Value)>,
);

fn profile<L: LabelSet, W: WeightSet>(aut: &Automaton<L, W>, s: StateId) -> Profile<L, W> {
    let local = |ts: Vec<_>| {
        ts.into_iter()
            .map(|t| (aut.label_of(t).clone(), aut.weight_of(t).clone()))
            .sorted()
            .collect()
    };
    (
        aut.initial_weight(s),
        aut.final_weight(s),
        local(aut.out(s).collect()),
        local(aut.incoming(s).collect()),
    )
}

/// The states of `aut` in breadth first order from the initial states, followed by the
/// states that cannot be reached.
fn visiting_order<L: LabelSet, W: WeightSet>(aut: &Automaton<L, W>) -> Vec<StateId> {
    let mut seen = BTreeSet::new();
    let mut order = Vec::with_capacity(aut.num_states());
    let mut queue: VecDeque<StateId> = aut.initial_states().collect();
    seen.extend(queue.iter().copied());
    while let Some(s) = queue.pop_front() {
        order.push(s);
        for t in aut.successors(s) {
            if seen.insert(t) {
                queue.push_back(t);
            }
        }
    }
    order.extend(aut.states().filter(|s| !seen.contains(s)));
    order
}

struct Matcher<'a, L: LabelSet, W: WeightSet> {
    lhs: &'a Automaton<L, W>,
    rhs: &'a Automaton<L, W>,
    order: Vec<StateId>,
    candidates: Vec<Vec<StateId>>,
    matched: Bijection<StateId, StateId>,
}

impl<L: LabelSet, W: WeightSet> Matcher<'_, L, W> {
    /// Whether the transitions between `l`, `r` and the states matched so far agree.
    fn agrees(&self, l: StateId, r: StateId) -> bool {
        let lhs_out = self
            .lhs
            .out(l)
            .filter_map(|t| {
                let dst = self.matched.get_by_left(&self.lhs.dst_of(t))?;
                Some((self.lhs.label_of(t), self.lhs.weight_of(t), *dst))
            })
            .sorted()
            .collect_vec();
        let rhs_out = self
            .rhs
            .out(r)
            .filter(|t| self.matched.contains_right(&self.rhs.dst_of(*t)))
            .map(|t| (self.rhs.label_of(t), self.rhs.weight_of(t), self.rhs.dst_of(t)))
            .sorted()
            .collect_vec();
        if lhs_out != rhs_out {
            return false;
        }
        let lhs_in = self
            .lhs
            .incoming(l)
            .filter_map(|t| {
                let src = self.matched.get_by_left(&self.lhs.src_of(t))?;
                Some((self.lhs.label_of(t), self.lhs.weight_of(t), *src))
            })
            .sorted()
            .collect_vec();
        let rhs_in = self
            .rhs
            .incoming(r)
            .filter(|t| self.matched.contains_right(&self.rhs.src_of(*t)))
            .map(|t| (self.rhs.label_of(t), self.rhs.weight_of(t), self.rhs.src_of(t)))
            .sorted()
            .collect_vec();
        lhs_in == rhs_in
    }

    fn extend(&mut self, depth: usize) -> bool {
        let Some(&l) = self.order.get(depth) else {
            return true;
        };
        for r in self.candidates[depth].clone() {
            if self.matched.contains_right(&r) {
                continue;
            }
            self.matched.insert(l, r);
            if self.agrees(l, r) && self.extend(depth + 1) {
                return true;
            }
            trace!("backtracking on {l} -> {r}");
            self.matched.remove_by_left(&l);
        }
        false
    }
}

/// A bijection from the states of `lhs` onto the states of `rhs` that is an isomorphism,
/// if there is one.
pub fn isomorphism<L: LabelSet, W: WeightSet>(
    lhs: &Automaton<L, W>,
    rhs: &Automaton<L, W>,
) -> Option<Bijection<StateId, StateId>> {
    if lhs.num_states() != rhs.num_states() || lhs.num_transitions() != rhs.num_transitions() {
        return None;
    }
    let mut classes: Map<Profile<L, W>, Vec<StateId>> = Map::default();
    for s in rhs.states() {
        classes.entry(profile(rhs, s)).or_default().push(s);
    }
    let order = visiting_order(lhs);
    let mut candidates = Vec::with_capacity(order.len());
    for s in &order {
        candidates.push(classes.get(&profile(lhs, *s))?.clone());
    }
    let mut matcher = Matcher {
        lhs,
        rhs,
        order,
        candidates,
        matched: Bijection::new(),
    };
    let found = matcher.extend(0);
    debug!("isomorphism search on {} states: {found}", lhs.num_states());
    found.then_some(matcher.matched)
}

/// Whether `lhs` and `rhs` are the same automaton up to the names of their states.
pub fn are_isomorphic<L: LabelSet, W: WeightSet>(lhs: &Automaton<L, W>, rhs: &Automaton<L, W>) -> bool {
    isomorphism(lhs, rhs).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        algos::{determinize, factories::ladybird},
        context::Context,
        labelset::Letters,
        tests::{b1, binary},
        weightset::B,
    };

    #[test_log::test]
    fn renumbered_copies() {
        let aut = binary();
        let mut shuffled = aut.new_like();
        let [q, p] = [0, 1].map(|_| shuffled.add_state());
        for digit in ['0', '1'] {
            shuffled.set_transition(q, q, digit, 2);
            shuffled.new_transition(p, p, digit);
        }
        shuffled.new_transition(p, q, '1');
        shuffled.set_initial(p);
        shuffled.set_final(q);
        let bijection = isomorphism(&aut, &shuffled).unwrap();
        assert_eq!(bijection.get_by_left(&StateId(0)), Some(&StateId(1)));
        assert_eq!(bijection.get_by_left(&StateId(1)), Some(&StateId(0)));

        shuffled.set_final_weight(q, 3);
        assert!(!are_isomorphic(&aut, &shuffled));
        assert!(!are_isomorphic(&aut, &b1()));
    }

    #[test_log::test]
    fn deleted_states_do_not_matter() {
        let ctx = Context::new(Letters::new("abc"), B);
        let det = determinize(&ladybird(ctx, 4).unwrap(), false).unwrap();
        let mut copy = det.copy(false);
        assert!(are_isomorphic(&det, &copy));
        let extra = copy.add_state();
        assert!(!are_isomorphic(&det, &copy));
        copy.del_state(extra);
        assert!(are_isomorphic(&det, &copy));
    }

    #[test_log::test]
    fn matching_needs_backtracking() {
        // Two disjoint cycles a-b and a-a-b-b, built in opposite orders.
        let ctx = Context::shared(Letters::new("ab"), B);
        let build = |cycles: &[&str]| {
            let mut aut = Automaton::new(ctx.clone());
            for cycle in cycles {
                let states = aut.add_states(cycle.len());
                for (i, letter) in cycle.chars().enumerate() {
                    aut.new_transition(states[i], states[(i + 1) % states.len()], letter);
                }
            }
            aut
        };
        let lhs = build(&["ab", "aabb"]);
        let rhs = build(&["aabb", "ab"]);
        assert!(are_isomorphic(&lhs, &rhs));
        assert!(!are_isomorphic(&lhs, &build(&["ab", "abab"])));
    }
}
