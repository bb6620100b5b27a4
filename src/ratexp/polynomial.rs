use std::{
    collections::{btree_map::Entry, BTreeMap},
    fmt::{self, Display, Formatter},
};

use super::{RatExp, RatExpSet};
use crate::{labelset::LabelSet, weightset::WeightSet};

/// A finite linear combination of expressions with non zero weights, the result of
/// derivations and splits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polynomial<A: Ord, V: Ord> {
    terms: BTreeMap<RatExp<A, V>, V>,
}

impl<A: Ord, V: Ord> Default for Polynomial<A, V> {
    fn default() -> Self {
        Self {
            terms: BTreeMap::new(),
        }
    }
}

impl<A: Ord + Clone, V: Ord + Clone> Polynomial<A, V> {
    /// The zero polynomial.
    pub fn new() -> Self {
        Self::default()
    }

    /// The polynomial `<w>e`.
    pub fn monomial<W: WeightSet<Value = V>>(ws: &W, e: RatExp<A, V>, w: V) -> Self {
        let mut res = Self::new();
        res.add_monomial(ws, e, w);
        res
    }

    /// Adds `<w>e`, dropping the term if its weight becomes zero.
    pub fn add_monomial<W: WeightSet<Value = V>>(&mut self, ws: &W, e: RatExp<A, V>, w: V) {
        if e.is_zero() || ws.is_zero(&w) {
            return;
        }
        match self.terms.entry(e) {
            Entry::Vacant(slot) => {
                slot.insert(w);
            }
            Entry::Occupied(mut slot) => {
                let sum = ws.add(slot.get(), &w);
                if ws.is_zero(&sum) {
                    slot.remove();
                } else {
                    *slot.get_mut() = sum;
                }
            }
        }
    }

    /// Adds every term of `other`.
    pub fn add_here<W: WeightSet<Value = V>>(&mut self, ws: &W, other: Self) {
        for (e, w) in other.terms {
            self.add_monomial(ws, e, w);
        }
    }

    /// Multiplies every weight by `w` on the left.
    pub fn lmul<W: WeightSet<Value = V>>(self, ws: &W, w: &V) -> Self {
        let mut res = Self::new();
        for (e, v) in self.terms {
            res.add_monomial(ws, e, ws.mul(w, &v));
        }
        res
    }

    /// Removes the term of `e` and returns its weight.
    pub fn remove(&mut self, e: &RatExp<A, V>) -> Option<V> {
        self.terms.remove(e)
    }

    /// The weight of `e`.
    pub fn get(&self, e: &RatExp<A, V>) -> Option<&V> {
        self.terms.get(e)
    }

    /// Number of terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether there are no terms.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// The terms in the order of their expressions.
    pub fn iter(&self) -> impl Iterator<Item = (&RatExp<A, V>, &V)> + '_ {
        self.terms.iter()
    }

    /// Formats the polynomial with the labels and weights of `rs`.
    pub fn display<'a, L, W>(&'a self, rs: &'a RatExpSet<L, W>) -> PrintedPolynomial<'a, L, W>
    where
        L: LabelSet<Label = A>,
        W: WeightSet<Value = V>,
    {
        PrintedPolynomial { rs, poly: self }
    }
}

impl<A: Ord, V: Ord> IntoIterator for Polynomial<A, V> {
    type Item = (RatExp<A, V>, V);
    type IntoIter = std::collections::btree_map::IntoIter<RatExp<A, V>, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.terms.into_iter()
    }
}

/// A polynomial that formats itself as `<w1>e1 ⊕ <w2>e2`, weights one are omitted.
pub struct PrintedPolynomial<'a, L: LabelSet, W: WeightSet> {
    rs: &'a RatExpSet<L, W>,
    poly: &'a Polynomial<L::Label, W::Value>,
}

impl<'a, L: LabelSet, W: WeightSet> Display for PrintedPolynomial<'a, L, W> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.poly.is_empty() {
            return f.write_str("\\z");
        }
        let ws = self.rs.weightset();
        for (i, (e, w)) in self.poly.iter().enumerate() {
            if i > 0 {
                f.write_str(" ⊕ ")?;
            }
            if !ws.is_one(w) {
                write!(f, "<{}>", ws.print(w))?;
            }
            let inner = self.rs.display(e);
            if matches!(e, RatExp::Sum(_)) {
                write!(f, "({inner})")?;
            } else {
                write!(f, "{inner}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{context::Context, labelset::Letters, weightset::Z};

    #[test_log::test]
    fn terms_cancel() {
        let rs = RatExpSet::new(Context::new(Letters::new("ab"), Z));
        let ws = rs.weightset();
        let mut p = Polynomial::monomial(ws, RatExp::Atom('a'), 2);
        p.add_monomial(ws, RatExp::Atom('b'), 1);
        p.add_monomial(ws, RatExp::Zero, 4);
        assert_eq!(p.len(), 2);
        assert_eq!(p.display(&rs).to_string(), "<2>a ⊕ b");
        p.add_monomial(ws, RatExp::Atom('a'), -2);
        assert_eq!(p.len(), 1);
        let p = p.lmul(ws, &3);
        assert_eq!(p.get(&RatExp::Atom('b')), Some(&3));
        assert_eq!(Polynomial::<char, i64>::new().display(&rs).to_string(), "\\z");
    }
}
