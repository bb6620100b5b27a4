//! Products of automata: the synchronized product, its powers, the shuffle and the
//! infiltration product.
//!
//! All of them are built by the same accessible construction on tuples of states. What
//! differs is which components move together: all of them on the same letter
//! (synchronized), exactly one of them (shuffle) or any non empty subset on the same letter
//! (infiltration).
use std::collections::{BTreeSet, VecDeque};

use itertools::Itertools;
use tracing::{debug, trace};

use super::{accessible::useful_states, determinize::require_letters};
use crate::{
    automaton::{Automaton, History, Origin, StateId},
    labelset::LabelSet,
    math::Bijection,
    weightset::WeightSet,
    Error, Result,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Moves {
    Synchronized,
    Interleaved,
    Infiltrated,
}

impl Moves {
    fn movers(self, arity: usize) -> Vec<Vec<usize>> {
        match self {
            Moves::Synchronized => vec![(0..arity).collect()],
            Moves::Interleaved => (0..arity).map(|i| vec![i]).collect(),
            Moves::Infiltrated => (1..=arity)
                .flat_map(|k| (0..arity).combinations(k))
                .collect(),
        }
    }
}

struct TupleProduct<L: LabelSet, W: WeightSet> {
    res: Automaton<L, W>,
    tuples: Bijection<StateId, Vec<StateId>>,
}

fn tuple_product<L: LabelSet, W: WeightSet>(
    auts: &[&Automaton<L, W>],
    moves: Moves,
    operation: &'static str,
) -> Result<TupleProduct<L, W>> {
    let Some(first) = auts.first() else {
        return Err(Error::invalid(format!("{operation}: no automaton given")));
    };
    for aut in auts {
        require_letters(aut, operation)?;
        if aut.labelset() != first.labelset() {
            return Err(Error::IncompatibleContexts {
                left: first.context().to_string(),
                right: aut.context().to_string(),
            });
        }
    }
    let ws = first.weightset().clone();
    let movers = moves.movers(auts.len());
    let mut res = first.new_like();
    let mut tuples: Bijection<StateId, Vec<StateId>> = Bijection::new();
    let mut queue = VecDeque::new();

    let state_of = |res: &mut Automaton<L, W>,
                    tuples: &mut Bijection<StateId, Vec<StateId>>,
                    queue: &mut VecDeque<StateId>,
                    tuple: Vec<StateId>| {
        if let Some(q) = tuples.get_by_right(&tuple) {
            return *q;
        }
        let q = res.add_state();
        trace!("new tuple {q:?} = {tuple:?}");
        tuples.insert(q, tuple);
        queue.push_back(q);
        q
    };

    let initials = auts
        .iter()
        .map(|a| a.initials().collect::<Vec<_>>())
        .multi_cartesian_product();
    for combination in initials {
        let weight = combination
            .iter()
            .fold(ws.one(), |acc, (_, w)| ws.mul(&acc, w));
        let tuple = combination.iter().map(|(s, _)| *s).collect();
        let q = state_of(&mut res, &mut tuples, &mut queue, tuple);
        res.set_initial_weight(q, weight);
    }

    while let Some(q) = queue.pop_front() {
        let Some(tuple) = tuples.get_by_left(&q).cloned() else {
            continue;
        };
        let fin = auts
            .iter()
            .zip(&tuple)
            .fold(ws.one(), |acc, (a, s)| ws.mul(&acc, &a.final_weight(*s)));
        res.set_final_weight(q, fin);

        for group in &movers {
            let leader = group[0];
            let labels: BTreeSet<L::Label> = auts[leader]
                .out(tuple[leader])
                .map(|t| auts[leader].label_of(t).clone())
                .collect();
            for label in labels {
                let options = auts.iter().zip(&tuple).enumerate().map(|(i, (a, s))| {
                    if group.contains(&i) {
                        a.out_on(*s, &label)
                            .map(|t| (a.dst_of(t), a.weight_of(t).clone()))
                            .collect::<Vec<_>>()
                    } else {
                        vec![(*s, ws.one())]
                    }
                });
                for combination in options.multi_cartesian_product() {
                    let weight = combination
                        .iter()
                        .fold(ws.one(), |acc, (_, w)| ws.mul(&acc, w));
                    let target = combination.into_iter().map(|(s, _)| s).collect();
                    let dst = state_of(&mut res, &mut tuples, &mut queue, target);
                    res.set_transition(q, dst, label.clone(), weight);
                }
            }
        }
    }
    debug!(
        "{operation} of {} automata has {} states",
        auts.len(),
        res.num_states()
    );
    Ok(TupleProduct { res, tuples })
}

fn finish<L: LabelSet, W: WeightSet>(product: TupleProduct<L, W>, keep_history: bool) -> Automaton<L, W> {
    let TupleProduct { mut res, tuples } = product;
    if keep_history {
        res.set_history(Some(
            tuples
                .into_iter()
                .map(|(q, tuple)| (q, Origin::Tuple(tuple)))
                .collect::<History>(),
        ));
    }
    res
}

/// The synchronized product: a path reading a word in the result pairs two paths reading
/// the same word, its weight is the product of their weights. Only the pairs of states
/// reachable from pairs of initial states are built. Both automata must be labeled with
/// letters of the same labelset.
pub fn product<L: LabelSet, W: WeightSet>(
    lhs: &Automaton<L, W>,
    rhs: &Automaton<L, W>,
    keep_history: bool,
) -> Result<Automaton<L, W>> {
    tuple_product(&[lhs, rhs], Moves::Synchronized, "product").map(|p| finish(p, keep_history))
}

/// The `n`-fold synchronized product of `aut` with itself. The `0`-th power is the neutral
/// element of the product: one state, initial and final, with a loop on every letter.
pub fn power<L: LabelSet, W: WeightSet>(
    aut: &Automaton<L, W>,
    n: usize,
    keep_history: bool,
) -> Result<Automaton<L, W>> {
    if n == 0 {
        let mut res = aut.new_like();
        let q = res.add_state();
        res.set_initial(q);
        res.set_final(q);
        for label in aut.labelset().letter_labels() {
            res.new_transition(q, q, label);
        }
        return Ok(res);
    }
    let copies = vec![aut; n];
    tuple_product(&copies, Moves::Synchronized, "power").map(|p| finish(p, keep_history))
}

/// The shuffle product: the components move one at a time, so the result reads the
/// interleavings of the words of both automata.
pub fn shuffle<L: LabelSet, W: WeightSet>(
    lhs: &Automaton<L, W>,
    rhs: &Automaton<L, W>,
    keep_history: bool,
) -> Result<Automaton<L, W>> {
    tuple_product(&[lhs, rhs], Moves::Interleaved, "shuffle").map(|p| finish(p, keep_history))
}

/// The infiltration product: like the shuffle, but the components may also read a common
/// letter together.
pub fn infiltration<L: LabelSet, W: WeightSet>(
    lhs: &Automaton<L, W>,
    rhs: &Automaton<L, W>,
    keep_history: bool,
) -> Result<Automaton<L, W>> {
    tuple_product(&[lhs, rhs], Moves::Infiltrated, "infiltration").map(|p| finish(p, keep_history))
}

/// Whether some word labels two different successful paths. That is the case exactly when
/// a useful state of the product of `aut` with itself pairs two different states.
pub fn is_ambiguous<L: LabelSet, W: WeightSet>(aut: &Automaton<L, W>) -> Result<bool> {
    let TupleProduct { res, tuples } = tuple_product(&[aut, aut], Moves::Synchronized, "is_ambiguous")?;
    Ok(useful_states(&res).into_iter().any(|q| {
        tuples
            .get_by_left(&q)
            .is_some_and(|pair| pair[0] != pair[1])
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        algos::eval,
        context::Context,
        labelset::Letters,
        tests::{b1, binary},
        weightset::{B, Z},
    };

    #[test_log::test]
    fn product_multiplies_weights() {
        let sq = product(&b1(), &b1(), true).unwrap();
        assert_eq!(sq.num_states(), 4);
        assert_eq!(eval(&sq, &['a', 'b', 'b']).unwrap(), 4);
        assert_eq!(
            sq.origin_of(StateId(0)),
            Some(&Origin::Tuple(vec![StateId(0), StateId(0)]))
        );
        let cube = power(&b1(), 3, false).unwrap();
        assert_eq!(cube.num_states(), 8);
        assert_eq!(eval(&cube, &['b', 'b']).unwrap(), 8);
        let neutral = power(&b1(), 0, false).unwrap();
        assert_eq!(eval(&neutral, &['a', 'b']).unwrap(), 1);
        assert_eq!(power(&b1(), 1, false).unwrap().num_states(), 2);
    }

    #[test_log::test]
    fn shuffle_interleaves() {
        let ctx = Context::shared(Letters::new("ab"), Z);
        let mut a = Automaton::new(ctx.clone());
        let [p, q] = [0, 1].map(|_| a.add_state());
        a.new_transition(p, q, 'a');
        a.set_initial(p);
        a.set_final(q);
        let mut b = Automaton::new(ctx);
        let [r, s] = [0, 1].map(|_| b.add_state());
        b.new_transition(r, s, 'a');
        b.set_initial(r);
        b.set_final(s);

        let sh = shuffle(&a, &b, false).unwrap();
        assert_eq!(sh.num_states(), 4);
        assert_eq!(eval(&sh, &['a', 'a']).unwrap(), 2);
        let inf = infiltration(&a, &b, false).unwrap();
        assert_eq!(eval(&inf, &['a']).unwrap(), 1);
        assert_eq!(eval(&inf, &['a', 'a']).unwrap(), 2);
    }

    #[test_log::test]
    fn ambiguity() {
        assert!(is_ambiguous(&b1()).unwrap());
        assert!(is_ambiguous(&binary()).unwrap());
        let mut det = Automaton::new(Context::new(Letters::new("ab"), B));
        let [p, q] = [0, 1].map(|_| det.add_state());
        det.new_transition(p, q, 'a');
        det.new_transition(q, p, 'b');
        det.set_initial(p);
        det.set_final(q);
        assert!(!is_ambiguous(&det).unwrap());
        let other = Automaton::new(Context::new(Letters::new("abc"), B));
        assert!(matches!(
            product(&det, &other, false),
            Err(Error::IncompatibleContexts { .. })
        ));
    }
}
