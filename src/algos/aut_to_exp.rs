//! Conversion of automata into rational expressions by state elimination.
use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, trace};

use crate::{
    automaton::Automaton,
    labelset::LabelSet,
    ratexp::{ExpOf, RatExpSet},
    weightset::WeightSet,
};

/// Edges of the generalized automaton, labeled by expressions.
type Edges<L, W> = BTreeMap<(usize, usize), ExpOf<L, W>>;

fn connect<L: LabelSet, W: WeightSet>(
    rs: &RatExpSet<L, W>,
    edges: &mut Edges<L, W>,
    src: usize,
    dst: usize,
    e: ExpOf<L, W>,
) {
    let sum = match edges.remove(&(src, dst)) {
        Some(old) => rs.add(old, e),
        None => e,
    };
    if !sum.is_zero() {
        edges.insert((src, dst), sum);
    }
}

/// Picks the state to eliminate next: states without a loop first, then the smallest
/// product of the numbers of predecessors and successors, then the smallest id.
fn next_state<L: LabelSet, W: WeightSet>(edges: &Edges<L, W>, remaining: &BTreeSet<usize>) -> Option<usize> {
    remaining.iter().copied().min_by_key(|&q| {
        let looping = edges.contains_key(&(q, q));
        let ins = edges.keys().filter(|(p, r)| *r == q && *p != q).count();
        let outs = edges.keys().filter(|(p, r)| *p == q && *r != q).count();
        (looping, ins * outs, q)
    })
}

/// An expression denoting the same series as `aut`.
///
/// A fresh source and sink are connected to the initial and final states by their weights,
/// then the states are eliminated one at a time: every path `p -> q -> r` is replaced by
/// the edge `p -> r` labeled `e(p,q) e(q,q)* e(q,r)`. The result is the expression left on
/// the edge from the source to the sink.
pub fn aut_to_exp<L: LabelSet, W: WeightSet>(aut: &Automaton<L, W>) -> ExpOf<L, W> {
    let rs = RatExpSet::new(aut.context().clone());
    let source = aut.state_bound();
    let sink = source + 1;
    let mut edges: Edges<L, W> = BTreeMap::new();
    for (s, w) in aut.initials() {
        let e = rs.lmul(w, rs.one());
        connect(&rs, &mut edges, source, s.index(), e);
    }
    for (s, w) in aut.finals() {
        let e = rs.lmul(w, rs.one());
        connect(&rs, &mut edges, s.index(), sink, e);
    }
    for t in aut.transitions() {
        let e = rs.lmul(aut.weight_of(t), rs.atom(aut.label_of(t).clone()));
        connect(&rs, &mut edges, aut.src_of(t).index(), aut.dst_of(t).index(), e);
    }

    let mut remaining: BTreeSet<usize> = aut.states().map(|s| s.index()).collect();
    while let Some(q) = next_state::<L, W>(&edges, &remaining) {
        remaining.remove(&q);
        let looping = edges.remove(&(q, q)).map(|e| rs.star(e));
        let ins: Vec<(usize, ExpOf<L, W>)> = edges
            .iter()
            .filter(|((_, r), _)| *r == q)
            .map(|((p, _), e)| (*p, e.clone()))
            .collect();
        let outs: Vec<(usize, ExpOf<L, W>)> = edges
            .iter()
            .filter(|((p, _), _)| *p == q)
            .map(|((_, r), e)| (*r, e.clone()))
            .collect();
        edges.retain(|(p, r), _| *p != q && *r != q);
        trace!("eliminating state {q}: {} predecessors, {} successors", ins.len(), outs.len());
        for (p, into) in &ins {
            let through = match &looping {
                Some(l) => rs.mul(into.clone(), l.clone()),
                None => into.clone(),
            };
            for (r, out) in &outs {
                connect(&rs, &mut edges, *p, *r, rs.mul(through.clone(), out.clone()));
            }
        }
    }

    let res = edges.remove(&(source, sink)).unwrap_or_else(|| rs.zero());
    debug!("state elimination produced an expression of size {}", res.size());
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        algos::{are_equivalent, eval_str},
        context::Context,
        labelset::Letters,
        ratexp::{derived_term, standard},
        tests::{b1, binary},
        weightset::{B, Z},
    };

    const WORDS: [&str; 10] = ["", "a", "b", "ab", "ba", "aba", "abb", "bab", "abab", "bbb"];

    #[test_log::test]
    fn single_loop() {
        let ctx = Context::shared(Letters::new("ab"), B);
        let mut aut = Automaton::new(ctx.clone());
        let p = aut.add_state();
        aut.new_transition(p, p, 'a');
        aut.set_initial(p);
        aut.set_final(p);
        let rs = RatExpSet::new(ctx.clone());
        assert_eq!(rs.print(&aut_to_exp(&aut)), "a*");
        assert!(aut_to_exp(&Automaton::new(ctx)).is_zero());
    }

    #[test_log::test]
    fn series_are_preserved() {
        let aut = b1();
        let e = aut_to_exp(&aut);
        let rs = RatExpSet::new(aut.context().clone());
        let back = derived_term(&rs, &e, true, false).unwrap();
        assert!(are_equivalent(&back, &aut).unwrap());
        for word in WORDS {
            assert_eq!(eval_str(&back, word).unwrap(), eval_str(&aut, word).unwrap(), "{word:?}");
        }

        let rs = RatExpSet::new(Context::new(Letters::new("ab"), Z));
        let e = rs.parse("(<2>a+b)*<3>+a(<-1>b)*a").unwrap();
        let aut = standard(&rs, &e).unwrap();
        let back = standard(&rs, &aut_to_exp(&aut)).unwrap();
        assert!(are_equivalent(&back, &aut).unwrap());
        for word in WORDS {
            assert_eq!(eval_str(&back, word).unwrap(), eval_str(&aut, word).unwrap(), "{word:?}");
        }
    }

    #[test_log::test]
    fn binary_numbers() {
        let aut = binary();
        let e = aut_to_exp(&aut);
        let rs = RatExpSet::new(aut.context().clone());
        let back = standard(&rs, &e).unwrap();
        for word in ["1", "10", "101", "0110"] {
            assert_eq!(eval_str(&back, word).unwrap(), eval_str(&aut, word).unwrap(), "{word:?}");
        }
        assert_eq!(eval_str(&back, "101").unwrap(), 5);
        assert!(are_equivalent(&back, &aut).unwrap());
    }
}
