//! Constant terms, derivatives and the derived-term automaton.
//!
//! The derivative of `e` with respect to a letter `a` is a polynomial of expressions `P`
//! such that the series of `e` restricted to words starting with `a` is `a·P`. Together
//! with the constant term (the weight of the empty word) this is enough to build an
//! automaton whose states are expressions.
use std::collections::{BTreeMap, VecDeque};

use tracing::{debug, trace};

use super::{ExpOf, Polynomial, RatExp, RatExpSet, Visitor};
use crate::{
    automaton::{Automaton, History, Origin, StateId},
    labelset::LabelSet,
    options::Options,
    weightset::{Starable, WeightSet},
    Error, Result,
};

type PolyOf<L, W> = Polynomial<<L as LabelSet>::Label, <W as WeightSet>::Value>;

struct ConstantTerm<'a, L: LabelSet, W: WeightSet> {
    rs: &'a RatExpSet<L, W>,
}

impl<'a, L: LabelSet, W: Starable> ConstantTerm<'a, L, W> {
    fn fold(
        &mut self,
        subs: &[ExpOf<L, W>],
        start: W::Value,
        op: fn(&W, &W::Value, &W::Value) -> W::Value,
    ) -> Result<W::Value> {
        let rs = self.rs;
        subs.iter()
            .try_fold(start, |acc, sub| Ok(op(rs.weightset(), &acc, &sub.accept(self)?)))
    }
}

impl<'a, L: LabelSet, W: Starable> Visitor<L::Label, W::Value> for ConstantTerm<'a, L, W> {
    type Output = Result<W::Value>;

    fn unsupported(&mut self, construct: &'static str) -> Self::Output {
        Err(Error::Unsupported {
            operation: "constant_term",
            construct,
        })
    }

    fn zero(&mut self) -> Self::Output {
        Ok(self.rs.weightset().zero())
    }

    fn one(&mut self) -> Self::Output {
        Ok(self.rs.weightset().one())
    }

    fn atom(&mut self, _label: &L::Label) -> Self::Output {
        Ok(self.rs.weightset().zero())
    }

    fn sum(&mut self, subs: &[ExpOf<L, W>]) -> Self::Output {
        let zero = self.rs.weightset().zero();
        self.fold(subs, zero, W::add)
    }

    fn prod(&mut self, subs: &[ExpOf<L, W>]) -> Self::Output {
        let one = self.rs.weightset().one();
        self.fold(subs, one, W::mul)
    }

    fn conjunction(&mut self, subs: &[ExpOf<L, W>]) -> Self::Output {
        self.prod(subs)
    }

    fn shuffle(&mut self, subs: &[ExpOf<L, W>]) -> Self::Output {
        self.prod(subs)
    }

    fn star(&mut self, sub: &ExpOf<L, W>) -> Self::Output {
        let c = sub.accept(self)?;
        self.rs.weightset().star(&c)
    }

    fn lweight(&mut self, weight: &W::Value, sub: &ExpOf<L, W>) -> Self::Output {
        let c = sub.accept(self)?;
        Ok(self.rs.weightset().mul(weight, &c))
    }

    fn rweight(&mut self, sub: &ExpOf<L, W>, weight: &W::Value) -> Self::Output {
        let c = sub.accept(self)?;
        Ok(self.rs.weightset().mul(&c, weight))
    }

    fn complement(&mut self, sub: &ExpOf<L, W>) -> Self::Output {
        let rs = self.rs;
        let ws = rs.weightset();
        if ws.is_zero(&sub.accept(self)?) {
            Ok(ws.one())
        } else {
            Ok(ws.zero())
        }
    }

    fn transposition(&mut self, sub: &ExpOf<L, W>) -> Self::Output {
        sub.accept(self)
    }
}

/// The weight of the empty word in `e`.
pub fn constant_term<L: LabelSet, W: Starable>(rs: &RatExpSet<L, W>, e: &ExpOf<L, W>) -> Result<W::Value> {
    e.accept(&mut ConstantTerm { rs })
}

/// Right multiplication of every expression of a polynomial.
fn rmul_terms<L: LabelSet, W: WeightSet>(
    rs: &RatExpSet<L, W>,
    poly: PolyOf<L, W>,
    factors: &[ExpOf<L, W>],
) -> PolyOf<L, W> {
    let ws = rs.weightset();
    let mut res = Polynomial::new();
    for (e, w) in poly {
        let e = factors.iter().fold(e, |acc, f| rs.mul(acc, f.clone()));
        res.add_monomial(ws, e, w);
    }
    res
}

struct Derivation<'a, L: LabelSet, W: WeightSet> {
    rs: &'a RatExpSet<L, W>,
    letter: &'a L::Label,
}

impl<'a, L: LabelSet, W: Starable> Visitor<L::Label, W::Value> for Derivation<'a, L, W> {
    type Output = Result<PolyOf<L, W>>;

    fn unsupported(&mut self, construct: &'static str) -> Self::Output {
        Err(Error::Unsupported {
            operation: "derivation",
            construct,
        })
    }

    fn zero(&mut self) -> Self::Output {
        Ok(Polynomial::new())
    }

    fn one(&mut self) -> Self::Output {
        Ok(Polynomial::new())
    }

    fn atom(&mut self, label: &L::Label) -> Self::Output {
        let ws = self.rs.weightset();
        if label == self.letter {
            Ok(Polynomial::monomial(ws, RatExp::One, ws.one()))
        } else {
            Ok(Polynomial::new())
        }
    }

    fn sum(&mut self, subs: &[ExpOf<L, W>]) -> Self::Output {
        let rs = self.rs;
        let mut res = Polynomial::new();
        for sub in subs {
            res.add_here(rs.weightset(), sub.accept(self)?);
        }
        Ok(res)
    }

    /// `d(e0·e1·...·en) = Σ c(e0)...c(e(i-1)) · d(ei) · e(i+1)...en`
    fn prod(&mut self, subs: &[ExpOf<L, W>]) -> Self::Output {
        let rs = self.rs;
        let ws = rs.weightset();
        let mut res = Polynomial::new();
        let mut constant = ws.one();
        for (i, sub) in subs.iter().enumerate() {
            let d = sub.accept(self)?;
            res.add_here(ws, rmul_terms(rs, d, &subs[i + 1..]).lmul(ws, &constant));
            constant = ws.mul(&constant, &constant_term(rs, sub)?);
            if ws.is_zero(&constant) {
                break;
            }
        }
        Ok(res)
    }

    fn conjunction(&mut self, subs: &[ExpOf<L, W>]) -> Self::Output {
        let rs = self.rs;
        let ws = rs.weightset();
        let mut res: Option<PolyOf<L, W>> = None;
        for sub in subs {
            let d = sub.accept(self)?;
            res = Some(match res {
                None => d,
                Some(acc) => {
                    let mut next = Polynomial::new();
                    for (l, v) in acc.iter() {
                        for (r, w) in d.iter() {
                            let e = rs.conjunction(l.clone(), r.clone());
                            next.add_monomial(ws, e, ws.mul(v, w));
                        }
                    }
                    next
                }
            });
        }
        Ok(res.unwrap_or_default())
    }

    fn shuffle(&mut self, subs: &[ExpOf<L, W>]) -> Self::Output {
        let rs = self.rs;
        let ws = rs.weightset();
        let mut res = Polynomial::new();
        for (i, sub) in subs.iter().enumerate() {
            for (d, w) in sub.accept(self)? {
                let e = subs.iter().enumerate().fold(rs.one(), |acc, (j, other)| {
                    let factor = if i == j { d.clone() } else { other.clone() };
                    rs.shuffle(acc, factor)
                });
                res.add_monomial(ws, e, w);
            }
        }
        Ok(res)
    }

    /// `d(e*) = c(e)* · d(e) · e*`
    fn star(&mut self, sub: &ExpOf<L, W>) -> Self::Output {
        let rs = self.rs;
        let ws = rs.weightset();
        let constant = ws.star(&constant_term(rs, sub)?)?;
        let d = sub.accept(self)?;
        let starred = RatExp::Star(Box::new(sub.clone()));
        Ok(rmul_terms(rs, d, &[starred]).lmul(ws, &constant))
    }

    fn lweight(&mut self, weight: &W::Value, sub: &ExpOf<L, W>) -> Self::Output {
        let rs = self.rs;
        Ok(sub.accept(self)?.lmul(rs.weightset(), weight))
    }

    fn rweight(&mut self, sub: &ExpOf<L, W>, weight: &W::Value) -> Self::Output {
        let rs = self.rs;
        let ws = rs.weightset();
        let mut res = Polynomial::new();
        for (e, w) in sub.accept(self)? {
            res.add_monomial(ws, e, ws.mul(&w, weight));
        }
        Ok(res)
    }
}

struct Split<'a, L: LabelSet, W: WeightSet> {
    rs: &'a RatExpSet<L, W>,
}

impl<'a, L: LabelSet, W: Starable> Split<'a, L, W> {
    fn opaque(&self, e: ExpOf<L, W>) -> Result<PolyOf<L, W>> {
        let ws = self.rs.weightset();
        Ok(Polynomial::monomial(ws, e, ws.one()))
    }

    /// `split(l·r)`: the terms of `split(l)` other than `\e` followed by `r`, plus the
    /// weight of `\e` in `split(l)` times `split(r)`.
    fn product(&mut self, l: &ExpOf<L, W>, r: &ExpOf<L, W>) -> Result<PolyOf<L, W>> {
        let rs = self.rs;
        let ws = rs.weightset();
        let mut left = l.accept(self)?;
        let constant = left.remove(&RatExp::One);
        let mut res = rmul_terms(rs, left, std::slice::from_ref(r));
        if let Some(c) = constant {
            res.add_here(ws, r.accept(self)?.lmul(ws, &c));
        }
        Ok(res)
    }

    fn product_poly(&mut self, l: PolyOf<L, W>, r: &ExpOf<L, W>) -> Result<PolyOf<L, W>> {
        let rs = self.rs;
        let ws = rs.weightset();
        let mut res = Polynomial::new();
        for (e, w) in l {
            let p = self.product(&e, r)?;
            res.add_here(ws, p.lmul(ws, &w));
        }
        Ok(res)
    }
}

impl<'a, L: LabelSet, W: Starable> Visitor<L::Label, W::Value> for Split<'a, L, W> {
    type Output = Result<PolyOf<L, W>>;

    fn unsupported(&mut self, construct: &'static str) -> Self::Output {
        Err(Error::Unsupported {
            operation: "split",
            construct,
        })
    }

    fn zero(&mut self) -> Self::Output {
        Ok(Polynomial::new())
    }

    fn one(&mut self) -> Self::Output {
        self.opaque(RatExp::One)
    }

    fn atom(&mut self, label: &L::Label) -> Self::Output {
        self.opaque(RatExp::Atom(label.clone()))
    }

    fn sum(&mut self, subs: &[ExpOf<L, W>]) -> Self::Output {
        let rs = self.rs;
        let mut res = Polynomial::new();
        for sub in subs {
            res.add_here(rs.weightset(), sub.accept(self)?);
        }
        Ok(res)
    }

    fn prod(&mut self, subs: &[ExpOf<L, W>]) -> Self::Output {
        match subs {
            [] => self.one(),
            [e] => e.accept(self),
            [first, second, rest @ ..] => {
                let mut res = self.product(first, second)?;
                for r in rest {
                    res = self.product_poly(res, r)?;
                }
                Ok(res)
            }
        }
    }

    fn star(&mut self, sub: &ExpOf<L, W>) -> Self::Output {
        self.opaque(RatExp::Star(Box::new(sub.clone())))
    }

    fn plus(&mut self, sub: &ExpOf<L, W>) -> Self::Output {
        self.opaque(RatExp::Plus(Box::new(sub.clone())))
    }

    fn lweight(&mut self, weight: &W::Value, sub: &ExpOf<L, W>) -> Self::Output {
        let rs = self.rs;
        Ok(sub.accept(self)?.lmul(rs.weightset(), weight))
    }

    fn rweight(&mut self, sub: &ExpOf<L, W>, weight: &W::Value) -> Self::Output {
        let rs = self.rs;
        let ws = rs.weightset();
        let mut res = Polynomial::new();
        for (e, w) in sub.accept(self)? {
            res.add_monomial(ws, e, ws.mul(&w, weight));
        }
        Ok(res)
    }

    fn conjunction(&mut self, subs: &[ExpOf<L, W>]) -> Self::Output {
        self.opaque(RatExp::Conjunction(subs.to_vec()))
    }

    fn shuffle(&mut self, subs: &[ExpOf<L, W>]) -> Self::Output {
        self.opaque(RatExp::Shuffle(subs.to_vec()))
    }

    fn complement(&mut self, sub: &ExpOf<L, W>) -> Self::Output {
        self.opaque(RatExp::Complement(Box::new(sub.clone())))
    }

    fn transposition(&mut self, sub: &ExpOf<L, W>) -> Self::Output {
        self.opaque(RatExp::Transposition(Box::new(sub.clone())))
    }

    fn ldiv(&mut self, lhs: &ExpOf<L, W>, rhs: &ExpOf<L, W>) -> Self::Output {
        self.opaque(RatExp::LDiv(Box::new(lhs.clone()), Box::new(rhs.clone())))
    }
}

/// Breaks `e` into a polynomial whose expressions are not sums and do not start with a sum:
/// top level sums are distributed and the products are split along their first factors.
pub fn split<L: LabelSet, W: Starable>(rs: &RatExpSet<L, W>, e: &ExpOf<L, W>) -> Result<PolyOf<L, W>> {
    e.accept(&mut Split { rs })
}

/// Splits every term of `poly`.
pub fn split_polynomial<L: LabelSet, W: Starable>(
    rs: &RatExpSet<L, W>,
    poly: PolyOf<L, W>,
) -> Result<PolyOf<L, W>> {
    let ws = rs.weightset();
    let mut res = Polynomial::new();
    for (e, w) in poly {
        res.add_here(ws, split(rs, &e)?.lmul(ws, &w));
    }
    Ok(res)
}

/// The derivative of `e` with respect to `label`, which must be a letter. With `breaking`
/// the result is split.
pub fn derivation<L: LabelSet, W: Starable>(
    rs: &RatExpSet<L, W>,
    e: &ExpOf<L, W>,
    label: &L::Label,
    breaking: bool,
) -> Result<PolyOf<L, W>> {
    if !rs.labelset().is_letter(label) {
        return Err(Error::NotFree {
            operation: "derivation",
            label: rs.labelset().print(label),
        });
    }
    let res = e.accept(&mut Derivation { rs, letter: label })?;
    if breaking {
        split_polynomial(rs, res)
    } else {
        Ok(res)
    }
}

/// The derivative of `e` with respect to a word, letter after letter.
pub fn derivation_word<L: LabelSet, W: Starable>(
    rs: &RatExpSet<L, W>,
    e: &ExpOf<L, W>,
    word: &[L::Label],
    breaking: bool,
) -> Result<PolyOf<L, W>> {
    let ws = rs.weightset();
    let mut res = Polynomial::monomial(ws, e.clone(), ws.one());
    for label in word {
        let mut next = Polynomial::new();
        for (f, w) in res {
            next.add_here(ws, derivation(rs, &f, label, breaking)?.lmul(ws, &w));
        }
        res = next;
    }
    Ok(res)
}

/// The derived-term automaton of `e`: its states are the expressions reached by repeated
/// derivation with respect to the letters of the labelset, the final weight of a state is
/// its constant term. With `breaking` the initial expression and every derivative are
/// split, which usually gives fewer states. With `keep_history` every state is named by
/// its expression.
pub fn derived_term<L: LabelSet, W: Starable>(
    rs: &RatExpSet<L, W>,
    e: &ExpOf<L, W>,
    breaking: bool,
    keep_history: bool,
) -> Result<Automaton<L, W>> {
    let ws = rs.weightset();
    let letters = rs.labelset().letter_labels();
    let mut res = Automaton::new(rs.context().clone());
    let mut states: BTreeMap<ExpOf<L, W>, StateId> = BTreeMap::new();
    let mut todo = VecDeque::new();
    let state_of = |res: &mut Automaton<L, W>,
                    states: &mut BTreeMap<ExpOf<L, W>, StateId>,
                    todo: &mut VecDeque<(StateId, ExpOf<L, W>)>,
                    f: ExpOf<L, W>| {
        if let Some(s) = states.get(&f) {
            return *s;
        }
        let s = res.add_state();
        trace!("new derived term {s:?}");
        states.insert(f.clone(), s);
        todo.push_back((s, f));
        s
    };

    let initial = if breaking {
        split(rs, e)?
    } else {
        Polynomial::monomial(ws, e.clone(), ws.one())
    };
    for (f, w) in initial {
        let s = state_of(&mut res, &mut states, &mut todo, f);
        res.add_initial_weight(s, &w);
    }

    let mut history = History::new();
    while let Some((src, f)) = todo.pop_front() {
        res.set_final_weight(src, constant_term(rs, &f)?);
        for label in &letters {
            for (g, w) in derivation(rs, &f, label, breaking)? {
                let dst = state_of(&mut res, &mut states, &mut todo, g);
                res.set_transition(src, dst, label.clone(), w);
            }
        }
        if keep_history {
            history.add(src, Origin::Name(rs.print(&f)));
        }
    }
    debug!("derived-term automaton has {} states", res.num_states());
    if keep_history {
        res.set_history(Some(history));
    }
    Ok(res)
}

/// [`derived_term`] with `breaking` and `keep_history` read from `options`.
pub fn derived_term_with<L: LabelSet, W: Starable>(
    rs: &RatExpSet<L, W>,
    e: &ExpOf<L, W>,
    options: &Options,
) -> Result<Automaton<L, W>> {
    derived_term(rs, e, options.breaking, options.keep_history)
}
