use std::collections::{BTreeMap, BTreeSet};

use tracing::trace;

use super::{signature, Signature};
use crate::{
    automaton::{Automaton, StateId},
    labelset::LabelSet,
    math::{Map, Partition},
    weightset::WeightSet,
};

/// Moore's algorithm: starting from a single block, every round splits the blocks whose
/// members have different signatures with respect to the current blocks. The final weight is
/// part of the signature, so the first round separates states by final weight and by the
/// labels they can read. The refinement stops as soon as a round does not split any block.
pub fn moore_partition<L: LabelSet, W: WeightSet>(aut: &Automaton<L, W>) -> Partition<StateId> {
    let states: Vec<StateId> = aut.states().collect();
    let mut block_of: Map<StateId, usize> = states.iter().map(|s| (*s, 0)).collect();
    let mut count = usize::from(!states.is_empty());
    let mut round = 0;
    loop {
        round += 1;
        let mut ids: BTreeMap<(usize, Signature<L, W>), usize> = BTreeMap::new();
        let mut next: Map<StateId, usize> = Map::default();
        for s in &states {
            let key = (block_of[s], signature(aut, *s, &block_of));
            let fresh = ids.len();
            next.insert(*s, *ids.entry(key).or_insert(fresh));
        }
        trace!("round {round}: {count} blocks became {}", ids.len());
        block_of = next;
        if ids.len() == count {
            break;
        }
        count = ids.len();
    }

    let mut blocks: BTreeMap<usize, BTreeSet<StateId>> = BTreeMap::new();
    for (s, b) in block_of {
        blocks.entry(b).or_default().insert(s);
    }
    Partition::from(blocks.into_values().collect::<Vec<_>>()).normalized()
}
