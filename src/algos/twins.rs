//! The twins property.
//!
//! Two states `p` and `q` reached by a common word are twins if every word labeling a cycle
//! on `p` and a cycle on `q` has the same weight on both cycles. For the tropical semirings
//! a trim automaton whose states are all pairwise twins has a finite weighted
//! determinization.
//!
//! The cycles are read on the accessible part of the square of the automaton: a cycle there
//! pairs two cycles reading the same word. Inside each strongly connected component of the
//! square the states get potentials, and the property holds if the potentials agree along
//! every transition of the component.
use std::collections::VecDeque;

use tracing::{debug, trace};

use super::{accessible::trim, determinize::require_letters, scc::scc};
use crate::{
    automaton::{Automaton, StateId, TransitionId},
    labelset::LabelSet,
    math::{Bijection, Map},
    weightset::WeightSet,
    Result,
};

/// The square of `aut`, with the pair of weights behind every transition.
struct Square<L: LabelSet, W: WeightSet> {
    pairs: Automaton<L, W>,
    weights: Map<TransitionId, (W::Value, W::Value)>,
}

fn square<L: LabelSet, W: WeightSet>(aut: &Automaton<L, W>) -> Square<L, W> {
    let mut pairs = aut.new_like();
    let mut weights = Map::default();
    let mut names: Bijection<StateId, (StateId, StateId)> = Bijection::new();
    let mut queue = VecDeque::new();
    let mut state_of = |pairs: &mut Automaton<L, W>, queue: &mut VecDeque<_>, pair: (StateId, StateId)| {
        if let Some(s) = names.get_by_right(&pair) {
            return *s;
        }
        let s = pairs.add_state();
        names.insert(s, pair);
        queue.push_back((s, pair));
        s
    };
    for p in aut.initial_states() {
        for q in aut.initial_states() {
            let s = state_of(&mut pairs, &mut queue, (p, q));
            pairs.set_initial(s);
        }
    }
    while let Some((s, (p, q))) = queue.pop_front() {
        for t in aut.out(p) {
            let label = aut.label_of(t);
            for u in aut.out_on(q, label) {
                let dst = state_of(&mut pairs, &mut queue, (aut.dst_of(t), aut.dst_of(u)));
                if let Some(pt) = pairs.new_transition(s, dst, label.clone()) {
                    weights.insert(pt, (aut.weight_of(t).clone(), aut.weight_of(u).clone()));
                }
            }
        }
    }
    Square { pairs, weights }
}

/// Whether all pairs of states of the trim part of `aut` reached by a common word are
/// twins. The weightset must be commutative, and products of non zero weights must be non
/// zero and cancellable, as in the tropical semirings, the integers and the rationals.
///
/// Fails if a transition is not labeled with a letter.
pub fn has_twins_property<L: LabelSet, W: WeightSet>(aut: &Automaton<L, W>) -> Result<bool> {
    let aut = trim(aut);
    require_letters(&aut, "has_twins_property")?;
    let ws = aut.weightset();
    let Square { pairs, weights } = square(&aut);
    debug!("square of {} states has {} states", aut.num_states(), pairs.num_states());

    for component in scc(&pairs) {
        let Some(&root) = component.iter().next() else {
            continue;
        };
        let mut potential: Map<StateId, (W::Value, W::Value)> = Map::default();
        potential.insert(root, (ws.one(), ws.one()));
        let mut stack = vec![root];
        while let Some(s) = stack.pop() {
            let (x, y) = potential[&s].clone();
            for t in pairs.out(s) {
                let dst = pairs.dst_of(t);
                if !component.contains(&dst) {
                    continue;
                }
                let (l, r) = &weights[&t];
                let reached = (ws.mul(&x, l), ws.mul(&y, r));
                match potential.get(&dst) {
                    Some((px, py)) => {
                        if ws.mul(&reached.0, py) != ws.mul(px, &reached.1) {
                            trace!("cycle through {dst} has different weights");
                            return Ok(false);
                        }
                    }
                    None => {
                        potential.insert(dst, reached);
                        stack.push(dst);
                    }
                }
            }
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        algos::weighted_determinize,
        context::Context,
        labelset::{Letters, Words},
        tests::binary,
        weightset::{Tropical, ZMin, Z},
        Error,
    };

    fn two_loops(p_weight: i64, q_weight: i64) -> Automaton<Letters, ZMin> {
        let mut aut = Automaton::new(Context::new(Letters::new("ab"), ZMin));
        let [p, q] = [0, 1].map(|_| aut.add_state());
        for s in [p, q] {
            aut.set_initial(s);
            aut.set_final(s);
        }
        aut.set_transition(p, p, 'a', Tropical::Finite(p_weight));
        aut.set_transition(q, q, 'a', Tropical::Finite(q_weight));
        aut.set_transition(p, q, 'b', Tropical::Finite(3));
        aut
    }

    #[test_log::test]
    fn loops_with_different_weights() {
        assert!(!has_twins_property(&two_loops(1, 2)).unwrap());
    }

    #[test_log::test]
    fn twins_determinize_finitely() {
        let aut = two_loops(2, 2);
        assert!(has_twins_property(&aut).unwrap());
        let det = weighted_determinize(&aut, false).unwrap();
        assert_eq!(det.num_states(), 2);
    }

    #[test_log::test]
    fn useless_states_are_ignored() {
        let mut aut = two_loops(2, 2);
        let dead = aut.add_state();
        aut.set_transition(dead, dead, 'a', Tropical::Finite(5));
        let p = StateId(0);
        aut.set_transition(p, dead, 'a', Tropical::Finite(0));
        assert!(has_twins_property(&aut).unwrap());
    }

    #[test_log::test]
    fn binary_numbers_are_not_twins() {
        assert!(!has_twins_property(&binary()).unwrap());
    }

    #[test_log::test]
    fn words_are_rejected() {
        let mut aut = Automaton::new(Context::new(Words::new("ab"), Z));
        let p = aut.add_state();
        aut.set_initial(p);
        aut.set_final(p);
        aut.new_transition(p, p, "ab".chars().collect());
        assert!(matches!(has_twins_property(&aut), Err(Error::NotFree { .. })));
    }
}
