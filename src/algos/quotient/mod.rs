//! Quotients of automata by congruences, and the computation of the coarsest congruence.
//!
//! A partition of the states is a congruence if all members of a block have the same final
//! weight and, for every label and every block, the same total weight of transitions into
//! that block. Merging the blocks of a congruence preserves the weighted language.
use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::{
    automaton::{Automaton, History, Origin, StateId},
    labelset::LabelSet,
    math::{Map, Partition},
    options::{Options, QuotientAlgo},
    weightset::WeightSet,
    Error, Result,
};

use super::{accessible::accessible, determinize::is_deterministic};

mod hopcroft;
pub use hopcroft::hopcroft_partition;

mod moore;
pub use moore::moore_partition;

/// What a state looks like from the outside, relative to a numbering of the blocks: its
/// final weight and the summed weights of its transitions into each block, per label.
pub(crate) type Signature<L, W> = (
    <W as WeightSet>::Value,
    BTreeMap<(<L as LabelSet>::Label, usize), <W as WeightSet>::Value>,
);

pub(crate) fn signature<L: LabelSet, W: WeightSet>(
    aut: &Automaton<L, W>,
    s: StateId,
    block_of: &Map<StateId, usize>,
) -> Signature<L, W> {
    let ws = aut.weightset();
    let mut sums: BTreeMap<(L::Label, usize), W::Value> = BTreeMap::new();
    for t in aut.out(s) {
        let key = (aut.label_of(t).clone(), block_of[&aut.dst_of(t)]);
        let w = aut.weight_of(t);
        sums.entry(key)
            .and_modify(|acc| *acc = ws.add(acc, w))
            .or_insert_with(|| w.clone());
    }
    sums.retain(|_, w| !ws.is_zero(w));
    (aut.final_weight(s), sums)
}

/// Checks that `partition` only mentions states of `aut` and that its blocks are disjoint,
/// then adds a singleton block for every state it does not mention. Blocks are sorted by
/// their smallest state.
fn complete_partition<L: LabelSet, W: WeightSet>(
    aut: &Automaton<L, W>,
    partition: &Partition<StateId>,
) -> Result<Vec<BTreeSet<StateId>>> {
    if !partition.is_disjoint() {
        return Err(Error::InvalidArgument(
            "the blocks of the partition overlap".to_string(),
        ));
    }
    if let Some(s) = partition.iter().flatten().find(|s| !aut.has_state(**s)) {
        return Err(Error::InvalidArgument(format!("{s} is not a state")));
    }
    let mentioned: BTreeSet<StateId> = partition.iter().flatten().copied().collect();
    let mut blocks: Vec<BTreeSet<StateId>> = partition
        .iter()
        .filter(|b| !b.is_empty())
        .cloned()
        .collect();
    blocks.extend(
        aut.states()
            .filter(|s| !mentioned.contains(s))
            .map(|s| BTreeSet::from([s])),
    );
    Ok(Partition::from(blocks).normalized().to_vec())
}

fn index_blocks(blocks: &[BTreeSet<StateId>]) -> Map<StateId, usize> {
    blocks
        .iter()
        .enumerate()
        .flat_map(|(i, block)| block.iter().map(move |s| (*s, i)))
        .collect()
}

/// Merges every block of `partition` into one state. States not mentioned by the partition
/// stay on their own.
///
/// The smallest state of a block represents it: its outgoing transitions (mapped to blocks,
/// weights of coinciding transitions summed up) and its final weight become those of the
/// block, while initial weights are summed over the whole block. For a congruence this does
/// not depend on the choice of the representative. Otherwise the final weights and the
/// transitions of the other members are dropped and the result may realize a different
/// series than `aut`; use [`quotient`] with `safe` to rule that out. With `keep_history`,
/// every state of the result remembers the block it stands for.
pub fn merge<L: LabelSet, W: WeightSet>(
    aut: &Automaton<L, W>,
    partition: &Partition<StateId>,
    keep_history: bool,
) -> Result<Automaton<L, W>> {
    let blocks = complete_partition(aut, partition)?;
    let mut res = aut.new_like();
    let ids = res.add_states(blocks.len());
    let block_of = index_blocks(&blocks);
    for (q, block) in ids.iter().zip(&blocks) {
        let Some(&rep) = block.first() else {
            continue;
        };
        for t in aut.out(rep) {
            let dst = ids[block_of[&aut.dst_of(t)]];
            res.set_transition(*q, dst, aut.label_of(t).clone(), aut.weight_of(t).clone());
        }
        if aut.is_final(rep) {
            res.set_final_weight(*q, aut.final_weight(rep));
        }
        for s in block.iter().filter(|s| aut.is_initial(**s)) {
            res.add_initial_weight(*q, &aut.initial_weight(*s));
        }
    }
    debug!(
        "merged {} states into {} blocks",
        aut.num_states(),
        res.num_states()
    );
    if keep_history {
        res.set_history(Some(History::from_iter(
            ids.into_iter()
                .zip(blocks)
                .map(|(q, block)| (q, Origin::Set(block))),
        )));
    }
    Ok(res)
}

/// Two states of the same block that `partition` fails to treat alike, if any.
pub fn congruence_witness<L: LabelSet, W: WeightSet>(
    aut: &Automaton<L, W>,
    partition: &Partition<StateId>,
) -> Result<Option<(StateId, StateId)>> {
    let blocks = complete_partition(aut, partition)?;
    let block_of = index_blocks(&blocks);
    for block in &blocks {
        let mut members = block.iter();
        let Some(&first) = members.next() else {
            continue;
        };
        let expected = signature(aut, first, &block_of);
        if let Some(&other) = members.find(|s| signature(aut, **s, &block_of) != expected) {
            return Ok(Some((first, other)));
        }
    }
    Ok(None)
}

/// Whether `partition` is a congruence of `aut`.
pub fn is_congruence<L: LabelSet, W: WeightSet>(
    aut: &Automaton<L, W>,
    partition: &Partition<StateId>,
) -> Result<bool> {
    congruence_witness(aut, partition).map(|w| w.is_none())
}

/// Like [`merge`], but with `safe` the partition is first checked to be a congruence and
/// [`Error::NotCongruence`] names two states that should not share a block.
pub fn quotient<L: LabelSet, W: WeightSet>(
    aut: &Automaton<L, W>,
    partition: &Partition<StateId>,
    safe: bool,
    keep_history: bool,
) -> Result<Automaton<L, W>> {
    if safe {
        if let Some((left, right)) = congruence_witness(aut, partition)? {
            return Err(Error::NotCongruence {
                left: left.index(),
                right: right.index(),
            });
        }
    }
    merge(aut, partition, keep_history)
}

/// [`quotient`] configured by `options` (`safe`, `keep_history`, `in_place`). Returns `None`
/// when `aut` was replaced by its quotient.
pub fn quotient_with<L: LabelSet, W: WeightSet>(
    aut: &mut Automaton<L, W>,
    partition: &Partition<StateId>,
    options: &Options,
) -> Result<Option<Automaton<L, W>>> {
    let res = quotient(aut, partition, options.safe, options.keep_history)?;
    if options.in_place {
        *aut = res;
        Ok(None)
    } else {
        Ok(Some(res))
    }
}

/// The coarsest congruence of `aut`, computed by the selected algorithm.
pub fn coarsest_congruence<L: LabelSet, W: WeightSet>(
    aut: &Automaton<L, W>,
    algo: QuotientAlgo,
) -> Partition<StateId> {
    match algo {
        QuotientAlgo::Moore => moore_partition(aut),
        QuotientAlgo::Hopcroft => hopcroft_partition(aut, is_deterministic(aut)),
        QuotientAlgo::Auto if is_deterministic(aut) => hopcroft_partition(aut, true),
        QuotientAlgo::Auto => moore_partition(aut),
    }
}

/// Merges the states of `aut` that have the same future, which works for any automaton,
/// deterministic or not.
pub fn min_quotient<L: LabelSet, W: WeightSet>(
    aut: &Automaton<L, W>,
    algo: QuotientAlgo,
    keep_history: bool,
) -> Result<Automaton<L, W>> {
    merge(aut, &coarsest_congruence(aut, algo), keep_history)
}

/// Merges the states of `aut` that have the same past.
pub fn min_coquotient<L: LabelSet, W: WeightSet>(
    aut: &Automaton<L, W>,
    algo: QuotientAlgo,
    keep_history: bool,
) -> Result<Automaton<L, W>> {
    let mut res = min_quotient(&aut.transpose(), algo, keep_history)?;
    res.transpose_here();
    Ok(res)
}

/// The minimal automaton of a deterministic automaton: its accessible part quotiented by the
/// coarsest congruence. Fails with [`Error::NotDeterministic`] on other automata.
pub fn minimize<L: LabelSet, W: WeightSet>(
    aut: &Automaton<L, W>,
    algo: QuotientAlgo,
    keep_history: bool,
) -> Result<Automaton<L, W>> {
    if !is_deterministic(aut) {
        return Err(Error::NotDeterministic {
            operation: "minimize",
        });
    }
    let reachable = accessible(aut);
    let partition = match algo {
        QuotientAlgo::Moore => moore_partition(&reachable),
        QuotientAlgo::Hopcroft | QuotientAlgo::Auto => hopcroft_partition(&reachable, true),
    };
    merge(&reachable, &partition, keep_history)
}

/// [`minimize`] with Hopcroft's algorithm.
pub fn min_quotient_det<L: LabelSet, W: WeightSet>(
    aut: &Automaton<L, W>,
    keep_history: bool,
) -> Result<Automaton<L, W>> {
    minimize(aut, QuotientAlgo::Hopcroft, keep_history)
}

/// [`min_quotient`] configured by `options` (`algo`, `keep_history`, `in_place`). Returns
/// `None` when `aut` was replaced by its quotient.
pub fn min_quotient_with<L: LabelSet, W: WeightSet>(
    aut: &mut Automaton<L, W>,
    options: &Options,
) -> Result<Option<Automaton<L, W>>> {
    let res = min_quotient(aut, options.algo, options.keep_history)?;
    if options.in_place {
        *aut = res;
        Ok(None)
    } else {
        Ok(Some(res))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        algos::{
            are_equivalent, are_isomorphic, determinize, eval_str,
            factories::{divkbaseb, ladybird},
            power,
        },
        context::Context,
        labelset::Letters,
        tests::b1,
        weightset::B,
    };

    fn div6() -> Automaton<Letters, B> {
        divkbaseb(Context::new(Letters::new("01"), B), 6, 2).unwrap()
    }

    fn partition(blocks: &[&[usize]]) -> Partition<StateId> {
        Partition::new(
            blocks
                .iter()
                .map(|b| b.iter().map(|s| StateId(*s)).collect::<Vec<_>>()),
        )
    }

    #[test_log::test]
    fn merging_a_congruence() {
        let aut = div6();
        let classes = partition(&[&[0], &[3], &[1, 4], &[2, 5]]);
        assert!(is_congruence(&aut, &classes).unwrap());
        let merged = quotient(&aut, &classes, true, true).unwrap();
        assert_eq!(merged.num_states(), 4);
        assert_eq!(merged.num_transitions(), 8);
        assert_eq!(
            merged.origin_of(StateId(1)),
            Some(&Origin::Set(BTreeSet::from([StateId(1), StateId(4)])))
        );
        assert_eq!(moore_partition(&aut), classes);
        assert_eq!(hopcroft_partition(&aut, true), classes);
    }

    #[test_log::test]
    fn safe_quotient_rejects_other_partitions() {
        let aut = div6();
        let bad = partition(&[&[0, 1]]);
        assert_eq!(
            congruence_witness(&aut, &bad).unwrap(),
            Some((StateId(0), StateId(1)))
        );
        let err = quotient(&aut, &bad, true, false).unwrap_err();
        assert!(matches!(err, Error::NotCongruence { left: 0, right: 1 }));
        let unchecked = quotient(&aut, &bad, false, false).unwrap();
        assert_eq!(unchecked.num_states(), 5);
        assert!(!are_equivalent(&unchecked, &aut).unwrap());
        assert!(eval_str(&unchecked, "1").unwrap() && !eval_str(&aut, "1").unwrap());
        assert!(merge(&aut, &partition(&[&[0, 1], &[1, 2]]), false).is_err());
        assert!(merge(&aut, &partition(&[&[7]]), false).is_err());
    }

    #[test_log::test]
    fn quotient_options() {
        let mut aut = div6();
        let bad = partition(&[&[0, 1]]);
        let err = quotient_with(&mut aut, &bad, &Options::default()).unwrap_err();
        assert!(matches!(err, Error::NotCongruence { left: 0, right: 1 }));

        let unchecked = Options::parse("safe=false, keep_history=false").unwrap();
        let merged = quotient_with(&mut aut, &bad, &unchecked).unwrap().unwrap();
        assert_eq!(merged.num_states(), 5);
        assert!(merged.history().is_none());
        assert_eq!(aut.num_states(), 6);

        let good = partition(&[&[1, 4], &[2, 5]]);
        let options = Options::default().in_place(true);
        assert!(quotient_with(&mut aut, &good, &options).unwrap().is_none());
        assert_eq!(aut.num_states(), 4);
        assert!(aut.origin_of(StateId(1)).is_some());
    }

    #[test_log::test]
    fn discrete_partition_changes_nothing() {
        let aut = div6();
        let same = merge(&aut, &Partition::discrete(aut.states()), false).unwrap();
        assert_eq!(same.num_states(), aut.num_states());
        assert_eq!(same.num_transitions(), aut.num_transitions());
        assert!(same.is_initial(StateId(0)) && same.is_final(StateId(0)));
        assert!(are_isomorphic(&same, &aut));
        let coarser = merge(&aut, &Partition::new([vec![StateId(0), StateId(1)]]), false).unwrap();
        assert!(!are_isomorphic(&coarser, &aut));
    }

    #[test_log::test]
    fn determinized_ladybirds_are_minimal() {
        for n in 1..=5 {
            let ctx = Context::new(Letters::new("abc"), B);
            let det = determinize(&ladybird(ctx, n).unwrap(), false).unwrap();
            let expected = (1 << n) - 1;
            for algo in [QuotientAlgo::Moore, QuotientAlgo::Hopcroft] {
                assert_eq!(minimize(&det, algo, false).unwrap().num_states(), expected);
            }
            assert_eq!(
                min_quotient(&det.transpose(), QuotientAlgo::Moore, false)
                    .unwrap()
                    .num_states(),
                expected
            );
            assert_eq!(moore_partition(&det), hopcroft_partition(&det, true));
        }
    }

    #[test_log::test]
    fn power_of_b1_collapses_to_seven_states() {
        let sixfold = power(&b1(), 6, false).unwrap();
        assert_eq!(sixfold.num_states(), 64);
        for algo in [QuotientAlgo::Moore, QuotientAlgo::Hopcroft, QuotientAlgo::Auto] {
            assert_eq!(min_quotient(&sixfold, algo, false).unwrap().num_states(), 7);
        }
    }

    #[test_log::test]
    fn minimization_needs_determinism() {
        let err = minimize(&b1(), QuotientAlgo::Moore, false).unwrap_err();
        assert!(matches!(err, Error::NotDeterministic { .. }));
        let once = min_quotient_det(&div6(), false).unwrap();
        let twice = min_quotient_det(&once, false).unwrap();
        assert_eq!(once.num_states(), 4);
        assert_eq!(twice.num_states(), 4);
    }

    #[test_log::test]
    fn quotient_and_coquotient_differ() {
        // i -a-> p -c-> f and i -b-> q -c-> g
        let mut aut = Automaton::new(Context::new(Letters::new("abc"), B));
        let [i, p, q, f, g] = [0, 1, 2, 3, 4].map(|_| aut.add_state());
        aut.new_transition(i, p, 'a');
        aut.new_transition(i, q, 'b');
        aut.new_transition(p, f, 'c');
        aut.new_transition(q, g, 'c');
        aut.set_initial(i);
        aut.set_final(f);
        aut.set_final(g);
        assert_eq!(min_quotient(&aut, QuotientAlgo::Moore, false).unwrap().num_states(), 3);
        assert_eq!(min_quotient(&aut, QuotientAlgo::Hopcroft, false).unwrap().num_states(), 3);
        let co = min_coquotient(&aut, QuotientAlgo::Auto, false).unwrap();
        assert_eq!(co.num_states(), 5);
        assert!(co.is_initial(StateId(0)));

        let options = Options::default().in_place(true);
        assert!(min_quotient_with(&mut aut, &options).unwrap().is_none());
        assert_eq!(aut.num_states(), 3);
    }
}
