//! Weightsets are the semirings automata and expressions are weighted over.
//!
//! A weightset is a (usually zero sized) value implementing [`WeightSet`], its elements are of
//! the associated type [`WeightSet::Value`]. Capabilities that not every algebra offers in the
//! same way are split off into flat traits: [`Starable`] for the Kleene star of a weight and
//! [`Divisible`] for the left division used to normalize weighted subsets.
use std::{fmt::Debug, hash::Hash};

use crate::Result;

mod boolean;
pub use boolean::B;

mod numeric;
pub use numeric::{F2, N, Z};

mod rational;
pub use rational::{Fraction, Real, Q, R};

mod tropical;
pub use tropical::{Tropical, ZMax, ZMin};

mod join;
pub use join::Promote;

/// Describes for which weights the star is defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StarStatus {
    /// Every weight has a star.
    Starable,
    /// Only `zero` has a star.
    NonStarable,
    /// The star is defined for weights on one side of `one` (tropical semirings).
    Tops,
    /// The star is defined for weights of absolute value below one.
    AbsVal,
}

/// Identifies a weightset independently of its Rust type. Used by descriptors and joins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WeightSetKind {
    /// Booleans.
    B,
    /// Natural numbers.
    N,
    /// Integers.
    Z,
    /// Rational numbers.
    Q,
    /// Floating point numbers.
    R,
    /// Min-plus integers.
    ZMin,
    /// Max-plus integers.
    ZMax,
    /// The field with two elements.
    F2,
}

impl WeightSetKind {
    /// All kinds, in promotion order where one exists.
    pub const ALL: [WeightSetKind; 8] = [
        WeightSetKind::B,
        WeightSetKind::N,
        WeightSetKind::Z,
        WeightSetKind::Q,
        WeightSetKind::R,
        WeightSetKind::ZMin,
        WeightSetKind::ZMax,
        WeightSetKind::F2,
    ];

    /// Short name, e.g. `Z`.
    pub fn name(&self) -> &'static str {
        match self {
            WeightSetKind::B => "B",
            WeightSetKind::N => "N",
            WeightSetKind::Z => "Z",
            WeightSetKind::Q => "Q",
            WeightSetKind::R => "R",
            WeightSetKind::ZMin => "Z-min-plus",
            WeightSetKind::ZMax => "Z-max-plus",
            WeightSetKind::F2 => "F2",
        }
    }

    /// Human readable description, e.g. `integers`.
    pub fn description(&self) -> &'static str {
        match self {
            WeightSetKind::B => "booleans",
            WeightSetKind::N => "naturals",
            WeightSetKind::Z => "integers",
            WeightSetKind::Q => "rationals",
            WeightSetKind::R => "reals",
            WeightSetKind::ZMin => "min-plus integers",
            WeightSetKind::ZMax => "max-plus integers",
            WeightSetKind::F2 => "F2",
        }
    }

    /// Position in the chain `B < N < Z < Q < R`, if the kind belongs to it.
    pub fn rank(&self) -> Option<u8> {
        match self {
            WeightSetKind::B => Some(0),
            WeightSetKind::N => Some(1),
            WeightSetKind::Z => Some(2),
            WeightSetKind::Q => Some(3),
            WeightSetKind::R => Some(4),
            _ => None,
        }
    }

    /// The smallest kind both `self` and `other` embed into.
    pub fn join(&self, other: &WeightSetKind) -> Option<WeightSetKind> {
        if self == other {
            return Some(*self);
        }
        match (self.rank(), other.rank()) {
            (Some(l), Some(r)) => Some(if l < r { *other } else { *self }),
            _ => None,
        }
    }

    /// Parses either the short name or the description.
    pub fn from_name(name: &str) -> Option<WeightSetKind> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|k| k.name() == name || k.description() == name)
    }
}

impl std::fmt::Display for WeightSetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// A semiring of weights. `add` is commutative with identity `zero`, `mul` has identity `one`
/// and distributes over `add`, and `zero` is absorbing for `mul`.
pub trait WeightSet: Clone + Debug + PartialEq {
    /// The type of weights.
    type Value: Clone + Eq + Ord + Hash + Debug;

    /// The neutral element of `add`.
    fn zero(&self) -> Self::Value;
    /// The neutral element of `mul`.
    fn one(&self) -> Self::Value;
    /// Sum of two weights.
    fn add(&self, l: &Self::Value, r: &Self::Value) -> Self::Value;
    /// Product of two weights.
    fn mul(&self, l: &Self::Value, r: &Self::Value) -> Self::Value;

    /// Checks whether `v` is `zero`.
    fn is_zero(&self, v: &Self::Value) -> bool {
        *v == self.zero()
    }

    /// Checks whether `v` is `one`.
    fn is_one(&self, v: &Self::Value) -> bool {
        *v == self.one()
    }

    /// Absolute value, the identity where the notion makes no sense.
    fn abs(&self, v: &Self::Value) -> Self::Value {
        v.clone()
    }

    /// Which weightset this is.
    fn kind(&self) -> WeightSetKind;

    /// Reads a weight from text.
    fn parse(&self, s: &str) -> Result<Self::Value>;

    /// Writes a weight as text that [`WeightSet::parse`] reads back.
    fn print(&self, v: &Self::Value) -> String;

    /// Sums up all weights of an iterator.
    fn sum<'a, I>(&self, values: I) -> Self::Value
    where
        I: IntoIterator<Item = &'a Self::Value>,
        Self::Value: 'a,
    {
        values
            .into_iter()
            .fold(self.zero(), |acc, v| self.add(&acc, v))
    }
}

/// Weightsets with a (partial) Kleene star.
pub trait Starable: WeightSet {
    /// For which weights the star is defined.
    fn star_status(&self) -> StarStatus;

    /// The star `v* = one + v + v·v + ...`, fails where it does not exist.
    fn star(&self, v: &Self::Value) -> Result<Self::Value>;

    /// `v·v*`.
    fn plus(&self, v: &Self::Value) -> Result<Self::Value> {
        Ok(self.mul(v, &self.star(v)?))
    }
}

/// Weightsets with a left division, used to normalize weighted subsets.
pub trait Divisible: WeightSet {
    /// A canonical common left factor of `l` and `r`. Folding this over a family of weights
    /// starting from `zero` yields the divisor of the family.
    fn lgcd(&self, l: &Self::Value, r: &Self::Value) -> Self::Value;

    /// The weight `x` with `l·x = r`. `l` divides `r` whenever `l` was obtained by
    /// [`Divisible::lgcd`] from a family containing `r`.
    fn ldiv(&self, l: &Self::Value, r: &Self::Value) -> Self::Value;
}

/// Weights are never truncated: leaving the range of the representation is fatal.
pub(crate) fn overflow(weightset: &str, what: std::fmt::Arguments<'_>) -> ! {
    panic!("{weightset} weight overflow: {what}")
}

pub(crate) fn not_starable<W: WeightSet>(ws: &W, v: &W::Value) -> crate::Error {
    crate::Error::NotStarable {
        weight: ws.print(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_laws<W: WeightSet>(ws: W, samples: &[W::Value]) {
        for a in samples {
            assert_eq!(ws.add(a, &ws.zero()), *a);
            assert_eq!(ws.mul(a, &ws.one()), *a);
            assert!(ws.is_zero(&ws.mul(a, &ws.zero())));
            for b in samples {
                assert_eq!(ws.add(a, b), ws.add(b, a));
                for c in samples {
                    assert_eq!(
                        ws.mul(a, &ws.add(b, c)),
                        ws.add(&ws.mul(a, b), &ws.mul(a, c))
                    );
                }
            }
        }
    }

    #[test_log::test]
    fn semiring_laws() {
        check_laws(B, &[false, true]);
        check_laws(N, &[0, 1, 2, 7]);
        check_laws(Z, &[-3, 0, 1, 5]);
        check_laws(F2, &[false, true]);
        check_laws(
            Q,
            &[Fraction::new(1, 2), Fraction::new(-2, 3), Fraction::from(4)],
        );
        check_laws(ZMin, &[Tropical::Infinite, Tropical::Finite(0), Tropical::Finite(3)]);
        check_laws(ZMax, &[Tropical::Infinite, Tropical::Finite(-2), Tropical::Finite(4)]);
    }

    #[test_log::test]
    fn kinds_join_along_the_chain() {
        use WeightSetKind::*;
        assert_eq!(B.join(&Z), Some(Z));
        assert_eq!(Q.join(&N), Some(Q));
        assert_eq!(ZMin.join(&ZMin), Some(ZMin));
        assert_eq!(ZMin.join(&Z), None);
        assert_eq!(F2.join(&B), None);
        assert_eq!(WeightSetKind::from_name("integers"), Some(Z));
        assert_eq!(WeightSetKind::from_name("Q"), Some(Q));
        assert_eq!(WeightSetKind::from_name("complex"), None);
    }
}
