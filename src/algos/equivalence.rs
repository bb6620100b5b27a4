//! Equivalence of automata: whether two automata map every word to the same weight.
//!
//! Over the Booleans the languages are compared through the difference automata, which are
//! built by determinization and complement. Over weightsets embedded in the rationals the
//! automata are compared by linear algebra: the series realized by `lhs` minus the one
//! realized by `rhs` is zero if and only if every vector of the space spanned by the
//! initial vector and its images under the transition matrices is orthogonal to the final
//! vector. A basis of that space has at most as many vectors as both automata have states.
use std::collections::{BTreeMap, VecDeque};

use tracing::{debug, trace};

use super::{
    accessible::is_useless,
    determinize::{complement, determinize, require_letters},
    product::product,
};
use crate::{
    automaton::Automaton,
    labelset::LabelSet,
    weightset::{Divisible, Fraction, Promote, WeightSet, B, N, Q, Z},
    Result,
};

/// Weightsets on which the equivalence of automata labeled with letters is decidable.
pub trait DecidableEquivalence: WeightSet {
    /// Whether `lhs` and `rhs` map every word to the same weight. Fails if a transition is
    /// not labeled with a letter.
    fn equivalent<L: LabelSet>(lhs: &Automaton<L, Self>, rhs: &Automaton<L, Self>) -> Result<bool>;
}

/// Whether `lhs` and `rhs` realize the same series, see [`DecidableEquivalence`].
pub fn are_equivalent<L: LabelSet, W: DecidableEquivalence>(
    lhs: &Automaton<L, W>,
    rhs: &Automaton<L, W>,
) -> Result<bool> {
    W::equivalent(lhs, rhs)
}

/// The words accepted by `lhs` and not by `rhs`.
pub fn difference<L: LabelSet>(lhs: &Automaton<L, B>, rhs: &Automaton<L, B>) -> Result<Automaton<L, B>> {
    let complemented = complement(&determinize(rhs, false)?)?;
    product(lhs, &complemented, false)
}

impl DecidableEquivalence for B {
    fn equivalent<L: LabelSet>(lhs: &Automaton<L, B>, rhs: &Automaton<L, B>) -> Result<bool> {
        Ok(is_useless(&difference(lhs, rhs)?) && is_useless(&difference(rhs, lhs)?))
    }
}

macro_rules! by_linear_algebra {
    ($($ws:ident),*) => {
        $(
            impl DecidableEquivalence for $ws {
                fn equivalent<L: LabelSet>(
                    lhs: &Automaton<L, $ws>,
                    rhs: &Automaton<L, $ws>,
                ) -> Result<bool> {
                    difference_is_zero(lhs, rhs)
                }
            }
        )*
    };
}

by_linear_algebra!(N, Z, Q);

/// The transitions of one label as a sparse matrix.
type Matrix = Vec<(usize, usize, Fraction)>;

fn dot(l: &[Fraction], r: &[Fraction]) -> Fraction {
    l.iter()
        .zip(r)
        .fold(Q.zero(), |acc, (x, y)| Q.add(&acc, &Q.mul(x, y)))
}

fn difference_is_zero<L: LabelSet, W: WeightSet>(lhs: &Automaton<L, W>, rhs: &Automaton<L, W>) -> Result<bool>
where
    Q: Promote<W>,
{
    require_letters(lhs, "are_equivalent")?;
    require_letters(rhs, "are_equivalent")?;
    let minus_one = Fraction::from(-1);
    let shift = lhs.state_bound();
    let dimension = shift + rhs.state_bound();
    let mut initial = vec![Q.zero(); dimension];
    let mut fin = vec![Q.zero(); dimension];
    let mut matrices: BTreeMap<L::Label, Matrix> = BTreeMap::new();
    for (aut, offset, sign) in [(lhs, 0, Q.one()), (rhs, shift, minus_one)] {
        let ws = aut.weightset();
        for (s, w) in aut.initials() {
            initial[offset + s.index()] = Q.mul(&sign, &Q.promote(ws, w));
        }
        for (s, w) in aut.finals() {
            fin[offset + s.index()] = Q.promote(ws, w);
        }
        for t in aut.transitions() {
            matrices.entry(aut.label_of(t).clone()).or_default().push((
                offset + aut.src_of(t).index(),
                offset + aut.dst_of(t).index(),
                Q.promote(ws, aut.weight_of(t)),
            ));
        }
    }

    // Rows of the basis are kept reduced: each has a one at its pivot and zeros at the
    // pivots of the rows before it.
    let mut basis: Vec<(usize, Vec<Fraction>)> = Vec::new();
    let mut todo = VecDeque::from([initial]);
    while let Some(mut v) = todo.pop_front() {
        for (pivot, row) in &basis {
            let c = v[*pivot];
            if Q.is_zero(&c) {
                continue;
            }
            let factor = Q.mul(&minus_one, &c);
            for (x, r) in v.iter_mut().zip(row) {
                *x = Q.add(x, &Q.mul(&factor, r));
            }
        }
        let Some(pivot) = v.iter().position(|x| !Q.is_zero(x)) else {
            continue;
        };
        let scale = v[pivot];
        let row: Vec<Fraction> = v.iter().map(|x| Q.ldiv(&scale, x)).collect();
        if !Q.is_zero(&dot(&row, &fin)) {
            debug!("a word separates the automata after {} basis vectors", basis.len());
            return Ok(false);
        }
        for matrix in matrices.values() {
            let mut next = vec![Q.zero(); dimension];
            for (src, dst, w) in matrix {
                if !Q.is_zero(&row[*src]) {
                    next[*dst] = Q.add(&next[*dst], &Q.mul(&row[*src], w));
                }
            }
            todo.push_back(next);
        }
        trace!("basis vector {} with pivot {pivot}", basis.len());
        basis.push((pivot, row));
    }
    debug!("equivalent, the reachable space has dimension {}", basis.len());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        algos::{determinize, minimize},
        context::Context,
        labelset::Letters,
        options::QuotientAlgo,
        ratexp::{derived_term, standard, RatExpSet},
        tests::{b1, binary},
        Error,
    };

    #[test_log::test]
    fn boolean_languages() {
        let rs = RatExpSet::new(Context::new(Letters::new("ab"), B));
        let e = rs.parse("(a+b)*a").unwrap();
        let std = standard(&rs, &e).unwrap();
        let dt = derived_term(&rs, &e, false, false).unwrap();
        let min = minimize(&determinize(&std, false).unwrap(), QuotientAlgo::Moore, false).unwrap();
        assert!(are_equivalent(&std, &dt).unwrap());
        assert!(are_equivalent(&std, &min).unwrap());
        let other = standard(&rs, &rs.parse("(a+b)*b").unwrap()).unwrap();
        assert!(!are_equivalent(&std, &other).unwrap());
        assert!(difference(&std, &other).unwrap().num_states() > 0);

        let empty = Automaton::new(Context::new(Letters::new("ab"), B));
        let nothing = standard(&rs, &rs.parse("\\z").unwrap()).unwrap();
        assert!(are_equivalent(&empty, &nothing).unwrap());
        assert!(!are_equivalent(&empty, &std).unwrap());
    }

    #[test_log::test]
    fn counting_letters() {
        let rs = RatExpSet::new(Context::new(Letters::new("ab"), Z));
        let count_b = standard(&rs, &rs.parse("(a+b)*b(a+b)*").unwrap()).unwrap();
        assert!(are_equivalent(&b1(), &count_b).unwrap());
        let twice = standard(&rs, &rs.parse("(a+b)*<2>b(a+b)*").unwrap()).unwrap();
        assert!(!are_equivalent(&b1(), &twice).unwrap());
        // Weights that cancel each other only in the sum.
        let cancelling = standard(&rs, &rs.parse("<2>a+<-1>a+b").unwrap()).unwrap();
        let plain = standard(&rs, &rs.parse("a+b").unwrap()).unwrap();
        assert!(are_equivalent(&cancelling, &plain).unwrap());
    }

    #[test_log::test]
    fn binary_numbers_differ_from_their_mirror() {
        let aut = binary();
        assert!(are_equivalent(&aut, &aut.copy(false)).unwrap());
        assert!(!are_equivalent(&aut, &aut.transpose()).unwrap());
    }

    #[test_log::test]
    fn rationals() {
        let rs = RatExpSet::new(Context::new(Letters::new("a"), Q));
        let lhs = standard(&rs, &rs.parse("(<1/2>a)*").unwrap()).unwrap();
        let rhs = standard(&rs, &rs.parse("\\e+<1/2>a(<1/2>a)*").unwrap()).unwrap();
        assert!(are_equivalent(&lhs, &rhs).unwrap());
        let off = standard(&rs, &rs.parse("\\e+<1/3>a(<1/2>a)*").unwrap()).unwrap();
        assert!(!are_equivalent(&lhs, &off).unwrap());
    }

    #[test_log::test]
    fn words_are_rejected() {
        use crate::labelset::Words;
        let mut aut = Automaton::new(Context::new(Words::new("ab"), Z));
        let p = aut.add_state();
        aut.new_transition(p, p, "ab".chars().collect());
        assert!(matches!(
            are_equivalent(&aut, &aut.copy(false)),
            Err(Error::NotFree { .. })
        ));
    }
}
