//! Subset constructions and the determinism related predicates.
use std::collections::{BTreeMap, BTreeSet, VecDeque};

use bit_set::BitSet;
use tracing::{debug, trace};

use crate::{
    automaton::{Automaton, History, Origin, StateId},
    labelset::LabelSet,
    math::{Bijection, Set},
    weightset::{Divisible, WeightSet, B},
    Error, Result,
};

pub(crate) fn require_letters<L: LabelSet, W: WeightSet>(
    aut: &Automaton<L, W>,
    operation: &'static str,
) -> Result<()> {
    for t in aut.transitions() {
        let label = aut.label_of(t);
        if !aut.labelset().is_letter(label) {
            return Err(Error::NotFree {
                operation,
                label: aut.labelset().print(label),
            });
        }
    }
    Ok(())
}

/// The classical subset construction on a Boolean automaton. Every state of the result is
/// the set of states reachable by some word, only subsets reachable from the set of
/// initial states are built. Fails if some label is not a letter.
pub fn determinize<L: LabelSet>(aut: &Automaton<L, B>, keep_history: bool) -> Result<Automaton<L, B>> {
    require_letters(aut, "determinize")?;
    let mut res = aut.new_like();
    let mut subsets: Bijection<StateId, BitSet> = Bijection::new();
    let mut queue = VecDeque::new();

    let initial: BitSet = aut.initial_states().map(|s| s.index()).collect();
    if initial.is_empty() {
        return Ok(res);
    }
    let q0 = res.add_state();
    res.set_initial(q0);
    subsets.insert(q0, initial);
    queue.push_back(q0);

    while let Some(q) = queue.pop_front() {
        let Some(subset) = subsets.get_by_left(&q).cloned() else {
            continue;
        };
        if subset.iter().any(|s| aut.is_final(StateId(s))) {
            res.set_final(q);
        }
        let mut successors: BTreeMap<L::Label, BitSet> = BTreeMap::new();
        for s in subset.iter() {
            for t in aut.out(StateId(s)) {
                successors
                    .entry(aut.label_of(t).clone())
                    .or_default()
                    .insert(aut.dst_of(t).index());
            }
        }
        for (label, target) in successors {
            let dst = match subsets.get_by_right(&target) {
                Some(dst) => *dst,
                None => {
                    let dst = res.add_state();
                    trace!("new subset {dst:?} = {target:?}");
                    subsets.insert(dst, target);
                    queue.push_back(dst);
                    dst
                }
            };
            res.new_transition(q, dst, label);
        }
    }
    debug!(
        "determinized {} states into {}",
        aut.num_states(),
        res.num_states()
    );
    if keep_history {
        res.set_history(Some(
            subsets
                .iter()
                .map(|(q, set)| (*q, Origin::Set(set.iter().map(StateId).collect())))
                .collect(),
        ));
    }
    Ok(res)
}

/// A weighted subset: states with their non zero weights.
type WeightedSubset<V> = BTreeMap<StateId, V>;

fn normalize<W: Divisible>(ws: &W, subset: WeightedSubset<W::Value>) -> (W::Value, WeightedSubset<W::Value>) {
    let divisor = subset
        .values()
        .fold(ws.zero(), |acc, v| ws.lgcd(&acc, v));
    let normalized = subset
        .into_iter()
        .map(|(s, v)| (s, ws.ldiv(&divisor, &v)))
        .filter(|(_, v)| !ws.is_zero(v))
        .collect();
    (divisor, normalized)
}

/// Weighted subset construction. A state of the result is a weighted subset of states
/// normalized by its left divisor, the divisor becomes the weight of the transition (or the
/// initial weight) leading to it. Proportional subsets are thus represented by a single state.
///
/// The construction terminates only if finitely many normalized subsets are reachable, which
/// is a property of the input the caller has to guarantee.
pub fn weighted_determinize<L: LabelSet, W: Divisible>(
    aut: &Automaton<L, W>,
    keep_history: bool,
) -> Result<Automaton<L, W>> {
    require_letters(aut, "weighted determinization")?;
    let ws = aut.weightset();
    let mut res = aut.new_like();
    let mut subsets: Bijection<StateId, WeightedSubset<W::Value>> = Bijection::new();
    let mut queue = VecDeque::new();

    let initial: WeightedSubset<W::Value> = aut.initials().map(|(s, w)| (s, w.clone())).collect();
    if initial.is_empty() {
        return Ok(res);
    }
    let (divisor, initial) = normalize(ws, initial);
    let q0 = res.add_state();
    res.set_initial_weight(q0, divisor);
    subsets.insert(q0, initial);
    queue.push_back(q0);

    while let Some(q) = queue.pop_front() {
        let Some(subset) = subsets.get_by_left(&q).cloned() else {
            continue;
        };
        let fin = subset
            .iter()
            .fold(ws.zero(), |acc, (s, v)| ws.add(&acc, &ws.mul(v, &aut.final_weight(*s))));
        res.set_final_weight(q, fin);

        let mut successors: BTreeMap<L::Label, WeightedSubset<W::Value>> = BTreeMap::new();
        for (s, v) in &subset {
            for t in aut.out(*s) {
                let entry = successors
                    .entry(aut.label_of(t).clone())
                    .or_default()
                    .entry(aut.dst_of(t))
                    .or_insert_with(|| ws.zero());
                *entry = ws.add(entry, &ws.mul(v, aut.weight_of(t)));
            }
        }
        for (label, target) in successors {
            let target: WeightedSubset<W::Value> =
                target.into_iter().filter(|(_, v)| !ws.is_zero(v)).collect();
            if target.is_empty() {
                continue;
            }
            let (divisor, target) = normalize(ws, target);
            let dst = match subsets.get_by_right(&target) {
                Some(dst) => *dst,
                None => {
                    let dst = res.add_state();
                    trace!("new weighted subset {dst:?}");
                    subsets.insert(dst, target);
                    queue.push_back(dst);
                    dst
                }
            };
            res.set_transition(q, dst, label, divisor);
        }
    }
    debug!(
        "weighted determinization built {} states from {}",
        res.num_states(),
        aut.num_states()
    );
    if keep_history {
        let history: History = subsets
            .iter()
            .map(|(q, subset)| {
                let origin = subset
                    .iter()
                    .map(|(s, v)| (*s, ws.print(v)))
                    .collect();
                (*q, Origin::Weighted(origin))
            })
            .collect();
        res.set_history(Some(history));
    }
    Ok(res)
}

fn has_distinct_labels<L: LabelSet, W: WeightSet>(aut: &Automaton<L, W>, s: StateId) -> bool {
    let mut seen = Set::default();
    aut.out(s).all(|t| seen.insert(aut.label_of(t)))
}

/// Whether at most one state is initial and no state has two outgoing transitions with the
/// same label. Weights are not constrained.
pub fn is_sequential<L: LabelSet, W: WeightSet>(aut: &Automaton<L, W>) -> bool {
    aut.initial_states().count() <= 1 && aut.states().all(|s| has_distinct_labels(aut, s))
}

/// Whether the automaton is sequential and all its transition and initial weights are one.
pub fn is_deterministic<L: LabelSet, W: WeightSet>(aut: &Automaton<L, W>) -> bool {
    let ws = aut.weightset();
    is_sequential(aut)
        && aut.initials().all(|(_, w)| ws.is_one(w))
        && aut.transitions().all(|t| ws.is_one(aut.weight_of(t)))
}

/// Whether there is an initial state and every state has an outgoing transition for every
/// letter.
pub fn is_complete<L: LabelSet, W: WeightSet>(aut: &Automaton<L, W>) -> bool {
    if aut.initial_states().next().is_none() {
        return false;
    }
    let letters: BTreeSet<L::Label> = aut.labelset().letter_labels().into_iter().collect();
    aut.states().all(|s| {
        let present: BTreeSet<&L::Label> = aut.out(s).map(|t| aut.label_of(t)).collect();
        letters.iter().all(|l| present.contains(&l))
    })
}

/// Adds a sink state that receives every missing transition, see [`is_complete`]. Does
/// nothing if the automaton is already complete.
pub fn complete_here<L: LabelSet, W: WeightSet>(aut: &mut Automaton<L, W>) {
    if is_complete(aut) {
        return;
    }
    let letters = aut.labelset().letter_labels();
    let states: Vec<StateId> = aut.states().collect();
    let sink = aut.add_state();
    for s in states.into_iter().chain(std::iter::once(sink)) {
        let present: BTreeSet<L::Label> = aut.out(s).map(|t| aut.label_of(t).clone()).collect();
        for l in &letters {
            if !present.contains(l) {
                aut.new_transition(s, sink, l.clone());
            }
        }
    }
    if aut.initial_states().next().is_none() {
        aut.set_initial(sink);
    }
    trace!("completed with sink {sink:?}");
}

/// A completed copy of `aut`.
pub fn complete<L: LabelSet, W: WeightSet>(aut: &Automaton<L, W>) -> Automaton<L, W> {
    let mut res = aut.clone();
    complete_here(&mut res);
    res
}

/// The complement of a deterministic Boolean automaton: completes it and exchanges final
/// and non final states.
pub fn complement<L: LabelSet>(aut: &Automaton<L, B>) -> Result<Automaton<L, B>> {
    if !is_deterministic(aut) {
        return Err(Error::NotDeterministic {
            operation: "complement",
        });
    }
    require_letters(aut, "complement")?;
    let mut res = complete(aut);
    let states: Vec<StateId> = res.states().collect();
    for s in states {
        if res.is_final(s) {
            res.unset_final(s);
        } else {
            res.set_final(s);
        }
    }
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        algos::factories::ladybird,
        context::Context,
        labelset::{Letters, NullableLetters},
        weightset::{Tropical, Z, ZMin},
    };

    #[test_log::test]
    fn ladybird_blows_up() {
        for n in 1..=6 {
            let aut = ladybird(Context::new(Letters::new("abc"), B), n).unwrap();
            let det = determinize(&aut, true).unwrap();
            assert_eq!(det.num_states(), (1 << n) - 1);
            assert!(is_deterministic(&det));
        }
    }

    #[test_log::test]
    fn history_records_subsets() {
        let aut = ladybird(Context::new(Letters::new("abc"), B), 2).unwrap();
        let det = determinize(&aut, true).unwrap();
        assert_eq!(
            det.origin_of(StateId(0)),
            Some(&Origin::Set(BTreeSet::from([StateId(0)])))
        );
    }

    #[test_log::test]
    fn spontaneous_transitions_are_rejected() {
        let mut aut = Automaton::new(Context::new(NullableLetters::new("a"), B));
        let [p, q] = [aut.add_state(), aut.add_state()];
        aut.new_transition(p, q, None);
        aut.set_initial(p);
        assert!(matches!(
            determinize(&aut, false),
            Err(Error::NotFree { .. })
        ));
    }

    #[test_log::test]
    fn no_initial_state_gives_empty_result() {
        let mut aut = Automaton::new(Context::new(Letters::new("a"), B));
        aut.add_state();
        assert_eq!(determinize(&aut, false).unwrap().num_states(), 0);
    }

    #[test_log::test]
    fn proportional_subsets_collapse() {
        // {p:3, q:6} and {p:6, q:12} both normalize to {p:1, q:2}
        let mut aut = Automaton::new(Context::new(Letters::new("a"), Z));
        let [p, q] = [aut.add_state(), aut.add_state()];
        aut.set_transition(p, p, 'a', 2);
        aut.set_transition(q, q, 'a', 2);
        aut.set_initial_weight(p, 3);
        aut.set_initial_weight(q, 6);
        aut.set_final(p);
        aut.set_final(q);
        let det = weighted_determinize(&aut, true).unwrap();
        assert_eq!(det.num_states(), 1);
        assert_eq!(det.initial_weight(StateId(0)), 3);
        assert_eq!(det.final_weight(StateId(0)), 3);
        assert!(is_sequential(&det));
        assert!(!is_deterministic(&det));
    }

    #[test_log::test]
    fn tropical_determinization() {
        let mut aut = Automaton::new(Context::new(Letters::new("ab"), ZMin));
        let s = aut.add_states(3);
        aut.set_transition(s[0], s[1], 'a', Tropical::Finite(1));
        aut.set_transition(s[0], s[2], 'a', Tropical::Finite(3));
        aut.set_transition(s[1], s[1], 'b', Tropical::Finite(2));
        aut.set_transition(s[2], s[2], 'b', Tropical::Finite(2));
        aut.set_initial(s[0]);
        aut.set_final(s[1]);
        aut.set_final(s[2]);
        let det = weighted_determinize(&aut, false).unwrap();
        assert!(is_sequential(&det));
        assert_eq!(det.num_states(), 2);
    }

    #[test_log::test]
    fn completion_and_complement() {
        let mut aut = Automaton::new(Context::new(Letters::new("ab"), B));
        let p = aut.add_state();
        aut.new_transition(p, p, 'a');
        aut.set_initial(p);
        aut.set_final(p);
        assert!(!is_complete(&aut));
        let full = complete(&aut);
        assert!(is_complete(&full));
        assert_eq!(full.num_states(), 2);
        let co = complement(&aut).unwrap();
        assert!(!co.is_final(p));
        assert!(co.is_final(StateId(1)));
        aut.new_transition(p, p, 'b');
        assert_eq!(complete(&aut).num_states(), 1);
    }
}
