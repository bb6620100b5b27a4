use std::collections::{BTreeMap, BTreeSet, VecDeque};

use itertools::Itertools;
use tracing::trace;

use crate::{
    automaton::{Automaton, StateId},
    labelset::LabelSet,
    math::Partition,
    weightset::WeightSet,
};

/// Hopcroft's algorithm: blocks are split with respect to splitters taken from a work list.
/// The initial partition groups states by final weight and all its blocks are splitters. A
/// splitter `C` splits, for each label `a`, every block whose members send different total
/// weights into `C` on `a`.
///
/// For a `deterministic` automaton, the largest part of a split block need not become a
/// splitter: being stable with respect to a block and to all but one of its parts implies
/// stability with respect to the last part. Otherwise every part is scheduled.
pub fn hopcroft_partition<L: LabelSet, W: WeightSet>(
    aut: &Automaton<L, W>,
    deterministic: bool,
) -> Partition<StateId> {
    let ws = aut.weightset();
    let mut by_final: BTreeMap<W::Value, BTreeSet<StateId>> = BTreeMap::new();
    for s in aut.states() {
        by_final.entry(aut.final_weight(s)).or_default().insert(s);
    }
    let mut blocks: Vec<BTreeSet<StateId>> = by_final.into_values().collect();
    let mut block_of = vec![usize::MAX; aut.state_bound()];
    for (i, block) in blocks.iter().enumerate() {
        for s in block {
            block_of[s.index()] = i;
        }
    }
    let labels: BTreeSet<L::Label> = aut.transitions().map(|t| aut.label_of(t).clone()).collect();
    let mut todo: VecDeque<BTreeSet<StateId>> = blocks.iter().cloned().collect();

    while let Some(splitter) = todo.pop_front() {
        for label in &labels {
            let mut weight_into: BTreeMap<StateId, W::Value> = BTreeMap::new();
            for q in &splitter {
                for t in aut.incoming(*q).filter(|t| aut.label_of(*t) == label) {
                    let w = aut.weight_of(t);
                    weight_into
                        .entry(aut.src_of(t))
                        .and_modify(|acc| *acc = ws.add(acc, w))
                        .or_insert_with(|| w.clone());
                }
            }
            let touched: BTreeSet<usize> = weight_into.keys().map(|p| block_of[p.index()]).collect();
            for b in touched {
                let mut parts: BTreeMap<W::Value, BTreeSet<StateId>> = BTreeMap::new();
                for s in &blocks[b] {
                    let w = weight_into.get(s).cloned().unwrap_or_else(|| ws.zero());
                    parts.entry(w).or_default().insert(*s);
                }
                if parts.len() < 2 {
                    continue;
                }
                let parts: Vec<BTreeSet<StateId>> = parts.into_values().collect();
                let largest = parts.iter().position_max_by_key(|p| p.len()).unwrap_or(0);
                trace!("splitting block {b} into {} parts", parts.len());
                for (i, part) in parts.into_iter().enumerate() {
                    if !deterministic || i != largest {
                        todo.push_back(part.clone());
                    }
                    if i == largest {
                        blocks[b] = part;
                    } else {
                        for s in &part {
                            block_of[s.index()] = blocks.len();
                        }
                        blocks.push(part);
                    }
                }
            }
        }
    }
    Partition::from(blocks).normalized()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        algos::quotient::moore_partition, context::Context, labelset::Letters, tests::binary,
        weightset::B,
    };

    #[test_log::test]
    fn agrees_with_moore() {
        let aut = binary();
        assert_eq!(hopcroft_partition(&aut, false), moore_partition(&aut));
        assert_eq!(hopcroft_partition(&aut, false).size(), 2);

        let mut chain = Automaton::new(Context::new(Letters::new("ab"), B));
        let s = chain.add_states(4);
        for w in s.windows(2) {
            chain.new_transition(w[0], w[1], 'a');
            chain.new_transition(w[0], w[0], 'b');
        }
        chain.set_initial(s[0]);
        chain.set_final(s[3]);
        chain.set_final(s[2]);
        let expected = Partition::new([vec![s[0]], vec![s[1]], vec![s[2]], vec![s[3]]]);
        assert_eq!(hopcroft_partition(&chain, true), expected);
        assert_eq!(moore_partition(&chain), expected);
    }
}
