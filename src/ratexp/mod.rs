//! Weighted rational expressions and their translation into automata.
//!
//! An expression is a tree of [`RatExp`] nodes, each node owning its children. Expressions
//! are built through a [`RatExpSet`], which knows the context and applies the trivial
//! identities (units, absorbing zero, folding of nested weights, flattening of sums and
//! products) so that syntactically equal expressions stay equal after construction.
//! Algorithms walk expressions through the [`Visitor`] protocol.

use crate::{labelset::LabelSet, weightset::WeightSet};

mod set;
pub use set::RatExpSet;

mod parse;

mod print;
pub use print::Printed;

mod polynomial;
pub use polynomial::{Polynomial, PrintedPolynomial};

mod derivation;
pub use derivation::{
    constant_term, derivation, derivation_word, derived_term, derived_term_with, split,
    split_polynomial,
};

mod standard;
pub use standard::{is_standard, standard, standard_here};
pub(crate) use standard::standard_initial;

mod thompson;
pub use thompson::{thompson, weighted_thompson};

/// A rational expression with labels of type `A` and weights of type `V`.
///
/// The derived order compares node kinds first and children afterwards, it is only used to
/// store expressions in ordered maps.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RatExp<A, V> {
    /// The empty language, `\z`.
    Zero,
    /// The empty word, `\e`.
    One,
    /// A single label.
    Atom(A),
    /// Sum of at least two terms.
    Sum(Vec<RatExp<A, V>>),
    /// Concatenation of at least two factors.
    Prod(Vec<RatExp<A, V>>),
    /// Intersection of at least two terms, `&`.
    Conjunction(Vec<RatExp<A, V>>),
    /// Shuffle of at least two terms, `:`.
    Shuffle(Vec<RatExp<A, V>>),
    /// Kleene star, `*`.
    Star(Box<RatExp<A, V>>),
    /// Kleene plus, `{+}`.
    Plus(Box<RatExp<A, V>>),
    /// Optional, `?`.
    Maybe(Box<RatExp<A, V>>),
    /// Weight on the left, `<w>e`.
    LWeight(V, Box<RatExp<A, V>>),
    /// Weight on the right, `e<w>`.
    RWeight(Box<RatExp<A, V>>, V),
    /// Complement, `{c}`.
    Complement(Box<RatExp<A, V>>),
    /// Mirror image, `{T}`.
    Transposition(Box<RatExp<A, V>>),
    /// Left quotient, `{\}`.
    LDiv(Box<RatExp<A, V>>, Box<RatExp<A, V>>),
}

/// The expressions over the context of `L` and `W`.
pub type ExpOf<L, W> = RatExp<<L as LabelSet>::Label, <W as WeightSet>::Value>;

impl<A, V> RatExp<A, V> {
    /// Whether this is `\z`.
    pub fn is_zero(&self) -> bool {
        matches!(self, RatExp::Zero)
    }

    /// Whether this is `\e`.
    pub fn is_one(&self) -> bool {
        matches!(self, RatExp::One)
    }

    /// Whether this is `\z`, `\e` or an atom.
    pub fn is_leaf(&self) -> bool {
        matches!(self, RatExp::Zero | RatExp::One | RatExp::Atom(_))
    }

    /// The name of the operator at the root.
    pub fn construct(&self) -> &'static str {
        match self {
            RatExp::Zero => "zero",
            RatExp::One => "one",
            RatExp::Atom(_) => "atom",
            RatExp::Sum(_) => "sum",
            RatExp::Prod(_) => "prod",
            RatExp::Conjunction(_) => "conjunction",
            RatExp::Shuffle(_) => "shuffle",
            RatExp::Star(_) => "star",
            RatExp::Plus(_) => "plus",
            RatExp::Maybe(_) => "maybe",
            RatExp::LWeight(..) => "lweight",
            RatExp::RWeight(..) => "rweight",
            RatExp::Complement(_) => "complement",
            RatExp::Transposition(_) => "transposition",
            RatExp::LDiv(..) => "ldiv",
        }
    }

    /// Number of nodes.
    pub fn size(&self) -> usize {
        1 + match self {
            RatExp::Zero | RatExp::One | RatExp::Atom(_) => 0,
            RatExp::Sum(subs) | RatExp::Prod(subs) | RatExp::Conjunction(subs) | RatExp::Shuffle(subs) => {
                subs.iter().map(RatExp::size).sum()
            }
            RatExp::Star(sub)
            | RatExp::Plus(sub)
            | RatExp::Maybe(sub)
            | RatExp::LWeight(_, sub)
            | RatExp::RWeight(sub, _)
            | RatExp::Complement(sub)
            | RatExp::Transposition(sub) => sub.size(),
            RatExp::LDiv(l, r) => l.size() + r.size(),
        }
    }

    /// Number of atoms.
    pub fn width(&self) -> usize {
        match self {
            RatExp::Zero | RatExp::One => 0,
            RatExp::Atom(_) => 1,
            RatExp::Sum(subs) | RatExp::Prod(subs) | RatExp::Conjunction(subs) | RatExp::Shuffle(subs) => {
                subs.iter().map(RatExp::width).sum()
            }
            RatExp::Star(sub)
            | RatExp::Plus(sub)
            | RatExp::Maybe(sub)
            | RatExp::LWeight(_, sub)
            | RatExp::RWeight(sub, _)
            | RatExp::Complement(sub)
            | RatExp::Transposition(sub) => sub.width(),
            RatExp::LDiv(l, r) => l.width() + r.width(),
        }
    }

    /// Dispatches on the root node.
    pub fn accept<Vis: Visitor<A, V>>(&self, visitor: &mut Vis) -> Vis::Output
    where
        A: Clone,
        V: Clone,
    {
        match self {
            RatExp::Zero => visitor.zero(),
            RatExp::One => visitor.one(),
            RatExp::Atom(label) => visitor.atom(label),
            RatExp::Sum(subs) => visitor.sum(subs),
            RatExp::Prod(subs) => visitor.prod(subs),
            RatExp::Conjunction(subs) => visitor.conjunction(subs),
            RatExp::Shuffle(subs) => visitor.shuffle(subs),
            RatExp::Star(sub) => visitor.star(sub),
            RatExp::Plus(sub) => visitor.plus(sub),
            RatExp::Maybe(sub) => visitor.maybe(sub),
            RatExp::LWeight(w, sub) => visitor.lweight(w, sub),
            RatExp::RWeight(sub, w) => visitor.rweight(sub, w),
            RatExp::Complement(sub) => visitor.complement(sub),
            RatExp::Transposition(sub) => visitor.transposition(sub),
            RatExp::LDiv(l, r) => visitor.ldiv(l, r),
        }
    }
}

/// A computation over expressions, one method per kind of node. The visitor recurses by
/// calling [`RatExp::accept`] on the children it needs.
///
/// `plus` and `maybe` default to their expansions `e·e*` and `\e+e`. The operators that few
/// algorithms support default to [`Visitor::unsupported`].
pub trait Visitor<A: Clone, V: Clone> {
    /// The result of visiting a node.
    type Output;

    /// The result for an operator this visitor cannot handle.
    fn unsupported(&mut self, construct: &'static str) -> Self::Output;

    /// `\z`.
    fn zero(&mut self) -> Self::Output;
    /// `\e`.
    fn one(&mut self) -> Self::Output;
    /// An atom.
    fn atom(&mut self, label: &A) -> Self::Output;
    /// A sum.
    fn sum(&mut self, subs: &[RatExp<A, V>]) -> Self::Output;
    /// A concatenation.
    fn prod(&mut self, subs: &[RatExp<A, V>]) -> Self::Output;
    /// A star.
    fn star(&mut self, sub: &RatExp<A, V>) -> Self::Output;
    /// A left weight.
    fn lweight(&mut self, weight: &V, sub: &RatExp<A, V>) -> Self::Output;
    /// A right weight.
    fn rweight(&mut self, sub: &RatExp<A, V>, weight: &V) -> Self::Output;

    /// `e{+}`, visited as `e·e*`.
    fn plus(&mut self, sub: &RatExp<A, V>) -> Self::Output {
        self.prod(&[sub.clone(), RatExp::Star(Box::new(sub.clone()))])
    }

    /// `e?`, visited as `\e+e`.
    fn maybe(&mut self, sub: &RatExp<A, V>) -> Self::Output {
        self.sum(&[RatExp::One, sub.clone()])
    }

    /// An intersection.
    fn conjunction(&mut self, _subs: &[RatExp<A, V>]) -> Self::Output {
        self.unsupported("conjunction")
    }

    /// A shuffle.
    fn shuffle(&mut self, _subs: &[RatExp<A, V>]) -> Self::Output {
        self.unsupported("shuffle")
    }

    /// A complement.
    fn complement(&mut self, _sub: &RatExp<A, V>) -> Self::Output {
        self.unsupported("complement")
    }

    /// A mirror image.
    fn transposition(&mut self, _sub: &RatExp<A, V>) -> Self::Output {
        self.unsupported("transposition")
    }

    /// A left quotient.
    fn ldiv(&mut self, _lhs: &RatExp<A, V>, _rhs: &RatExp<A, V>) -> Self::Output {
        self.unsupported("ldiv")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{context::Context, labelset::Letters, weightset::Z};

    #[test_log::test]
    fn sizes() {
        let rs = RatExpSet::new(Context::new(Letters::new("ab"), Z));
        let e = rs.parse("(a+<2>b)*a").unwrap();
        assert_eq!(e.construct(), "prod");
        assert_eq!(e.size(), 7);
        assert_eq!(e.width(), 3);
        assert!(rs.parse("\\e").unwrap().is_one());
        assert!(rs.parse("a").unwrap().is_leaf());
    }
}
