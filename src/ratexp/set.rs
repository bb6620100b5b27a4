use std::sync::Arc;

use super::{parse::Parser, print::Printed, ExpOf, RatExp};
use crate::{context::Context, labelset::LabelSet, weightset::WeightSet, Result};

/// The expressions over a context. Every constructor applies the trivial identities:
///
/// - `\z` is neutral for `+` and absorbing for `·`, `&`, `:` and weights,
/// - `\e` is neutral for `·` and `:`, `<k>\e·e` becomes `<k>e` and `e·<k>\e` becomes `e<k>`,
/// - `<1>e` and `e<1>` become `e`, nested weights are folded,
/// - sums, products, conjunctions and shuffles are flattened,
/// - `\z*` and `\z?` are `\e`, `\z{+}` is `\z`, `\e{T}` and `\z{T}` are themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct RatExpSet<L: LabelSet, W: WeightSet> {
    context: Arc<Context<L, W>>,
}

fn flatten<A, V>(e: RatExp<A, V>, same: fn(&RatExp<A, V>) -> bool, into: &mut Vec<RatExp<A, V>>) {
    if same(&e) {
        match e {
            RatExp::Sum(subs) | RatExp::Prod(subs) | RatExp::Conjunction(subs) | RatExp::Shuffle(subs) => {
                into.extend(subs)
            }
            e => into.push(e),
        }
    } else {
        into.push(e);
    }
}

fn gather<A, V>(l: RatExp<A, V>, r: RatExp<A, V>, same: fn(&RatExp<A, V>) -> bool) -> Vec<RatExp<A, V>> {
    let mut subs = vec![];
    flatten(l, same, &mut subs);
    flatten(r, same, &mut subs);
    subs
}

impl<L: LabelSet, W: WeightSet> RatExpSet<L, W> {
    /// The expressions over `context`.
    pub fn new<C: Into<Arc<Context<L, W>>>>(context: C) -> Self {
        Self {
            context: context.into(),
        }
    }

    /// The context.
    pub fn context(&self) -> &Arc<Context<L, W>> {
        &self.context
    }

    /// The labelset of the context.
    pub fn labelset(&self) -> &L {
        self.context.labelset()
    }

    /// The weightset of the context.
    pub fn weightset(&self) -> &W {
        self.context.weightset()
    }

    /// `\z`.
    pub fn zero(&self) -> ExpOf<L, W> {
        RatExp::Zero
    }

    /// `\e`.
    pub fn one(&self) -> ExpOf<L, W> {
        RatExp::One
    }

    /// A label, the empty word becomes `\e`.
    pub fn atom(&self, label: L::Label) -> ExpOf<L, W> {
        if self.labelset().is_one(&label) {
            RatExp::One
        } else {
            RatExp::Atom(label)
        }
    }

    /// `l + r`.
    pub fn add(&self, l: ExpOf<L, W>, r: ExpOf<L, W>) -> ExpOf<L, W> {
        match (l, r) {
            (RatExp::Zero, e) | (e, RatExp::Zero) => e,
            (l, r) => RatExp::Sum(gather(l, r, |e| matches!(e, RatExp::Sum(_)))),
        }
    }

    /// `l·r`.
    pub fn mul(&self, l: ExpOf<L, W>, r: ExpOf<L, W>) -> ExpOf<L, W> {
        match (l, r) {
            (RatExp::Zero, _) | (_, RatExp::Zero) => RatExp::Zero,
            (e, RatExp::One) | (RatExp::One, e) => e,
            (e, RatExp::LWeight(w, sub)) if sub.is_one() => self.rmul(e, &w),
            (RatExp::LWeight(w, sub), e) if sub.is_one() => self.lmul(&w, e),
            (l, r) => RatExp::Prod(gather(l, r, |e| matches!(e, RatExp::Prod(_)))),
        }
    }

    /// `l&r`.
    pub fn conjunction(&self, l: ExpOf<L, W>, r: ExpOf<L, W>) -> ExpOf<L, W> {
        match (l, r) {
            (RatExp::Zero, _) | (_, RatExp::Zero) => RatExp::Zero,
            (RatExp::One, RatExp::One) => RatExp::One,
            (RatExp::Atom(a), RatExp::Atom(b)) if a != b => RatExp::Zero,
            (RatExp::Atom(a), RatExp::Atom(_)) => RatExp::Atom(a),
            (l, r) => RatExp::Conjunction(gather(l, r, |e| matches!(e, RatExp::Conjunction(_)))),
        }
    }

    /// `l:r`.
    pub fn shuffle(&self, l: ExpOf<L, W>, r: ExpOf<L, W>) -> ExpOf<L, W> {
        match (l, r) {
            (RatExp::Zero, _) | (_, RatExp::Zero) => RatExp::Zero,
            (e, RatExp::One) | (RatExp::One, e) => e,
            (l, r) => RatExp::Shuffle(gather(l, r, |e| matches!(e, RatExp::Shuffle(_)))),
        }
    }

    /// `l{\}r`.
    pub fn ldiv(&self, l: ExpOf<L, W>, r: ExpOf<L, W>) -> ExpOf<L, W> {
        match (l, r) {
            (RatExp::Zero, _) => self.complement(RatExp::Zero),
            (RatExp::One, e) => e,
            (_, RatExp::Zero) => RatExp::Zero,
            (l, r) => RatExp::LDiv(Box::new(l), Box::new(r)),
        }
    }

    /// `e*`.
    pub fn star(&self, e: ExpOf<L, W>) -> ExpOf<L, W> {
        match e {
            RatExp::Zero => RatExp::One,
            e => RatExp::Star(Box::new(e)),
        }
    }

    /// `e{+}`.
    pub fn plus(&self, e: ExpOf<L, W>) -> ExpOf<L, W> {
        match e {
            RatExp::Zero => RatExp::Zero,
            e => RatExp::Plus(Box::new(e)),
        }
    }

    /// `e?`.
    pub fn maybe(&self, e: ExpOf<L, W>) -> ExpOf<L, W> {
        match e {
            RatExp::Zero => RatExp::One,
            e => RatExp::Maybe(Box::new(e)),
        }
    }

    /// `e{c}`. Weights around `e` are dropped, the complement only depends on the support.
    pub fn complement(&self, e: ExpOf<L, W>) -> ExpOf<L, W> {
        match e {
            RatExp::LWeight(_, sub) | RatExp::RWeight(sub, _) => self.complement(*sub),
            e => RatExp::Complement(Box::new(e)),
        }
    }

    /// `e{T}`.
    pub fn transposition(&self, e: ExpOf<L, W>) -> ExpOf<L, W> {
        match e {
            RatExp::Zero => RatExp::Zero,
            RatExp::One => RatExp::One,
            RatExp::Atom(a) => self.atom(self.labelset().transpose(&a)),
            e => RatExp::Transposition(Box::new(e)),
        }
    }

    /// `<w>e`.
    pub fn lmul(&self, w: &W::Value, e: ExpOf<L, W>) -> ExpOf<L, W> {
        let ws = self.weightset();
        if ws.is_zero(w) {
            return RatExp::Zero;
        }
        match e {
            RatExp::Zero => RatExp::Zero,
            e if ws.is_one(w) => e,
            RatExp::LWeight(v, sub) => self.lmul(&ws.mul(w, &v), *sub),
            e => RatExp::LWeight(w.clone(), Box::new(e)),
        }
    }

    /// `e<w>`. Leaves only carry left weights.
    pub fn rmul(&self, e: ExpOf<L, W>, w: &W::Value) -> ExpOf<L, W> {
        let ws = self.weightset();
        if e.is_leaf() {
            return self.lmul(w, e);
        }
        if ws.is_zero(w) {
            return RatExp::Zero;
        }
        match e {
            e if ws.is_one(w) => e,
            RatExp::LWeight(v, sub) => {
                let inner = self.rmul(*sub, w);
                self.lmul(&v, inner)
            }
            RatExp::RWeight(sub, v) => self.rmul(*sub, &ws.mul(&v, w)),
            e => RatExp::RWeight(Box::new(e), w.clone()),
        }
    }

    /// Reads an expression.
    pub fn parse(&self, s: &str) -> Result<ExpOf<L, W>> {
        Parser::new(self, s).parse()
    }

    /// Writes an expression in the syntax [`RatExpSet::parse`] reads.
    pub fn print(&self, e: &ExpOf<L, W>) -> String {
        self.display(e).to_string()
    }

    /// An expression together with this set, for formatting.
    pub fn display<'a>(&'a self, e: &'a ExpOf<L, W>) -> Printed<'a, L, W> {
        Printed::new(self, e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{labelset::Letters, weightset::Z};

    fn rs() -> RatExpSet<Letters, Z> {
        RatExpSet::new(Context::new(Letters::new("abc"), Z))
    }

    #[test_log::test]
    fn trivial_identities() {
        let rs = rs();
        let (a, b, c) = (rs.atom('a'), rs.atom('b'), rs.atom('c'));
        assert_eq!(rs.add(rs.zero(), a.clone()), a);
        assert_eq!(rs.mul(a.clone(), rs.zero()), RatExp::Zero);
        assert_eq!(rs.mul(rs.one(), a.clone()), a);

        let abc = rs.mul(rs.mul(a.clone(), b.clone()), c.clone());
        assert_eq!(abc, RatExp::Prod(vec![a.clone(), b.clone(), c.clone()]));
        let sum = rs.add(a.clone(), rs.add(b.clone(), c.clone()));
        assert_eq!(sum, RatExp::Sum(vec![a.clone(), b.clone(), c.clone()]));

        assert_eq!(rs.lmul(&2, rs.lmul(&3, a.clone())), RatExp::LWeight(6, Box::new(a.clone())));
        assert_eq!(rs.lmul(&1, a.clone()), a);
        assert_eq!(rs.lmul(&0, a.clone()), RatExp::Zero);
        assert_eq!(rs.rmul(a.clone(), &2), RatExp::LWeight(2, Box::new(a.clone())));
        let weighted_one = rs.lmul(&5, rs.one());
        assert_eq!(rs.mul(a.clone(), weighted_one), RatExp::LWeight(5, Box::new(a.clone())));
        assert_eq!(rs.star(rs.zero()), RatExp::One);
    }

    #[test_log::test]
    fn weights_fold() {
        let rs = rs();
        let ab = rs.mul(rs.atom('a'), rs.atom('b'));
        let e = rs.rmul(rs.rmul(ab.clone(), &2), &3);
        assert_eq!(e, RatExp::RWeight(Box::new(ab.clone()), 6));
        let e = rs.rmul(rs.lmul(&2, ab.clone()), &3);
        assert_eq!(e, RatExp::LWeight(2, Box::new(RatExp::RWeight(Box::new(ab), 3))));
        assert_eq!(
            rs.complement(rs.lmul(&2, rs.atom('a'))),
            RatExp::Complement(Box::new(rs.atom('a')))
        );
    }
}
