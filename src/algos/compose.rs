//! Composition of two-tape transducers.
use std::collections::VecDeque;

use tracing::{debug, trace};

use super::proper::proper_here;
use crate::{
    automaton::{Automaton, History, Origin, StateId},
    context::Context,
    labelset::{LabelSet, Nullable, Tuple2},
    math::Bijection,
    options::Direction,
    weightset::{Starable, WeightSet},
    Result,
};

/// One of the two tapes of a transducer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tape {
    /// The input tape.
    First,
    /// The output tape.
    Second,
}

fn is_one_on<L1: LabelSet, L2: LabelSet>(
    ls: &Tuple2<L1, L2>,
    tape: Tape,
    (l1, l2): &(L1::Label, L2::Label),
) -> bool {
    match tape {
        Tape::First => ls.0.is_one(l1),
        Tape::Second => ls.1.is_one(l2),
    }
}

/// Splits every state that has outgoing transitions with the empty word on `tape` as well as
/// other outgoing transitions (a final weight counts as the latter). The other transitions
/// and the final weight move to a new state, which receives a copy of every incoming
/// transition and of the initial weight. Afterwards, each state either only has spontaneous
/// moves on `tape` or none at all.
///
/// Returns the created states with the state they were split from.
pub fn outsplit_here<L1: LabelSet, L2: LabelSet, W: WeightSet>(
    aut: &mut Automaton<Tuple2<L1, L2>, W>,
    tape: Tape,
) -> Vec<(StateId, StateId)> {
    let ls = aut.labelset().clone();
    let states: Vec<StateId> = aut.states().collect();
    let mut created = vec![];
    for st in states {
        let (spontaneous, others): (Vec<_>, Vec<_>) = aut
            .out(st)
            .partition(|t| is_one_on(&ls, tape, aut.label_of(*t)));
        if spontaneous.is_empty() || (others.is_empty() && !aut.is_final(st)) {
            continue;
        }
        let ns = aut.add_state();
        for t in others {
            let (dst, label, weight) = (aut.dst_of(t), aut.label_of(t).clone(), aut.weight_of(t).clone());
            aut.set_transition(ns, dst, label, weight);
            aut.del_transition(t);
        }
        if aut.is_final(st) {
            let w = aut.final_weight(st);
            aut.set_final_weight(ns, w);
            aut.unset_final(st);
        }
        let incoming: Vec<_> = aut.incoming(st).collect();
        for t in incoming {
            let (src, label, weight) = (aut.src_of(t), aut.label_of(t).clone(), aut.weight_of(t).clone());
            aut.set_transition(src, ns, label, weight);
        }
        if aut.is_initial(st) {
            let w = aut.initial_weight(st);
            aut.set_initial_weight(ns, w);
        }
        trace!("split {st:?} into {st:?} and {ns:?}");
        created.push((ns, st));
    }
    created
}

/// A copy of `aut` on which [`outsplit_here`] was applied. With `keep_history`, states of
/// the result point to the state of `aut` they come from.
pub fn outsplit<L1: LabelSet, L2: LabelSet, W: WeightSet>(
    aut: &Automaton<Tuple2<L1, L2>, W>,
    tape: Tape,
    keep_history: bool,
) -> Automaton<Tuple2<L1, L2>, W> {
    let (mut res, map) = aut.copy_with_map(false);
    let created = outsplit_here(&mut res, tape);
    if keep_history {
        let original: Bijection<StateId, StateId> = map.into_iter().map(|(old, new)| (new, old)).collect();
        let mut history: History = original
            .iter()
            .map(|(new, old)| (*new, Origin::State(*old)))
            .collect();
        for (ns, st) in created {
            if let Some(old) = original.get_by_left(&st) {
                history.add(ns, Origin::State(*old));
            }
        }
        res.set_history(Some(history));
    }
    res
}

/// Composes two transducers: the second tape of `lhs` is matched against the first tape of
/// `rhs`, the result maps the first tape of `lhs` to the second tape of `rhs`.
///
/// The empty word on the matched tapes is handled asymmetrically, so that each pair of
/// matching computations is represented by exactly one path: `lhs` is first outsplit on its
/// second tape, and from a state of `lhs` with spontaneous moves only `lhs` may move. The
/// spontaneous transitions the construction creates are removed at the end, which requires
/// the weights of their cycles to have a star.
pub fn compose<L1, L2, L3, W>(
    lhs: &Automaton<Tuple2<L1, L2>, W>,
    rhs: &Automaton<Tuple2<L2, L3>, W>,
    keep_history: bool,
) -> Result<Automaton<Tuple2<L1, L3>, W>>
where
    L1: Nullable,
    L2: LabelSet,
    L3: Nullable,
    W: Starable,
{
    let left = outsplit(lhs, Tape::Second, false);
    let ws = lhs.weightset().clone();
    let (l1, l2, l3) = (&lhs.labelset().0, &lhs.labelset().1, &rhs.labelset().1);
    let mut res = Automaton::new(Context::new(Tuple2(l1.clone(), l3.clone()), ws.clone()));
    let mut pairs: Bijection<StateId, (StateId, StateId)> = Bijection::new();
    let mut queue = VecDeque::new();

    let state_of = |res: &mut Automaton<Tuple2<L1, L3>, W>,
                    pairs: &mut Bijection<StateId, (StateId, StateId)>,
                    queue: &mut VecDeque<StateId>,
                    pair: (StateId, StateId)| {
        if let Some(q) = pairs.get_by_right(&pair) {
            return *q;
        }
        let q = res.add_state();
        pairs.insert(q, pair);
        queue.push_back(q);
        q
    };

    for (p, wp) in left.initials() {
        for (q, wq) in rhs.initials() {
            let s = state_of(&mut res, &mut pairs, &mut queue, (p, q));
            res.set_initial_weight(s, ws.mul(wp, wq));
        }
    }

    while let Some(src) = queue.pop_front() {
        let Some(&(p, q)) = pairs.get_by_left(&src) else {
            continue;
        };
        let outs: Vec<_> = left.out(p).collect();
        if outs.is_empty() && !left.is_final(p) {
            continue;
        }
        let only_lhs = outs.first().is_some_and(|t| l2.is_one(&left.label_of(*t).1));
        if only_lhs {
            for t in outs {
                let dst = state_of(&mut res, &mut pairs, &mut queue, (left.dst_of(t), q));
                let label = (left.label_of(t).0.clone(), l3.one());
                res.set_transition(src, dst, label, left.weight_of(t).clone());
            }
            continue;
        }
        for t2 in rhs.out(q) {
            let (middle, output) = rhs.label_of(t2);
            if l2.is_one(middle) {
                let dst = state_of(&mut res, &mut pairs, &mut queue, (p, rhs.dst_of(t2)));
                res.set_transition(src, dst, (l1.one(), output.clone()), rhs.weight_of(t2).clone());
                continue;
            }
            for t1 in outs.iter().filter(|t1| &left.label_of(**t1).1 == middle) {
                let dst = state_of(
                    &mut res,
                    &mut pairs,
                    &mut queue,
                    (left.dst_of(*t1), rhs.dst_of(t2)),
                );
                let label = (left.label_of(*t1).0.clone(), output.clone());
                res.set_transition(src, dst, label, ws.mul(left.weight_of(*t1), rhs.weight_of(t2)));
            }
        }
        res.set_final_weight(src, ws.mul(&left.final_weight(p), &rhs.final_weight(q)));
    }
    debug!("composition has {} states before epsilon removal", res.num_states());
    if keep_history {
        res.set_history(Some(
            pairs
                .iter()
                .map(|(s, (p, q))| (*s, Origin::Tuple(vec![*p, *q])))
                .collect(),
        ));
    }
    proper_here(&mut res, Direction::Backward, true)?;
    Ok(res)
}
