use std::{cmp::Ordering, hash::Hash};

use super::{not_starable, overflow, Divisible, StarStatus, Starable, WeightSet, WeightSetKind};
use crate::{math::gcd, Error, Result};

/// An exact fraction, always kept in lowest terms with a positive denominator, so that
/// structural equality coincides with numerical equality.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fraction {
    num: i64,
    den: u64,
}

impl Fraction {
    /// Builds `num / den` in lowest terms. Panics if `den` is zero.
    pub fn new(num: i64, den: i64) -> Self {
        assert!(den != 0, "denominator of a fraction must not be zero");
        Self::reduce(Some(num as i128), Some(den as i128))
    }

    /// Reduces `num / den`, where `None` stands for an intermediate result that did not fit
    /// in 128 bits. Panics unless the reduced fraction fits in 64 bits.
    fn reduce(num: Option<i128>, den: Option<i128>) -> Self {
        let (Some(num), Some(den)) = (num, den) else {
            overflow("Q", format_args!("intermediate result exceeds 128 bits"))
        };
        let (num, den) = if den < 0 { (-num, -den) } else { (num, den) };
        let g = gcd(num.unsigned_abs(), den.unsigned_abs()).max(1) as i128;
        match (i64::try_from(num / g), u64::try_from(den / g)) {
            (Ok(num), Ok(den)) => Fraction { num, den },
            _ => overflow("Q", format_args!("{}/{}", num / g, den / g)),
        }
    }

    /// The numerator.
    pub fn num(&self) -> i64 {
        self.num
    }

    /// The (positive) denominator.
    pub fn den(&self) -> u64 {
        self.den
    }

    fn add(&self, other: &Fraction) -> Fraction {
        let l = (self.num as i128).checked_mul(other.den as i128);
        let r = (other.num as i128).checked_mul(self.den as i128);
        Self::reduce(
            l.zip(r).and_then(|(l, r)| l.checked_add(r)),
            (self.den as i128).checked_mul(other.den as i128),
        )
    }

    fn mul(&self, other: &Fraction) -> Fraction {
        Self::reduce(
            (self.num as i128).checked_mul(other.num as i128),
            (self.den as i128).checked_mul(other.den as i128),
        )
    }

    fn inverse(&self) -> Fraction {
        Self::reduce(Some(self.den as i128), Some(self.num as i128))
    }
}

impl From<i64> for Fraction {
    fn from(n: i64) -> Self {
        Fraction { num: n, den: 1 }
    }
}

impl Ord for Fraction {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.num as i128 * other.den as i128).cmp(&(other.num as i128 * self.den as i128))
    }
}

impl PartialOrd for Fraction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for Fraction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

impl std::fmt::Debug for Fraction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}

/// The field of rational numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Q;

impl WeightSet for Q {
    type Value = Fraction;

    fn zero(&self) -> Fraction {
        Fraction::from(0)
    }

    fn one(&self) -> Fraction {
        Fraction::from(1)
    }

    fn add(&self, l: &Fraction, r: &Fraction) -> Fraction {
        l.add(r)
    }

    fn mul(&self, l: &Fraction, r: &Fraction) -> Fraction {
        l.mul(r)
    }

    fn abs(&self, v: &Fraction) -> Fraction {
        Fraction {
            num: v.num.checked_abs().unwrap_or_else(|| overflow("Q", format_args!("|{v}|"))),
            den: v.den,
        }
    }

    fn kind(&self) -> WeightSetKind {
        WeightSetKind::Q
    }

    fn parse(&self, s: &str) -> Result<Fraction> {
        let s = s.trim();
        let int = |part: &str, offset: usize| {
            part.trim()
                .parse::<i64>()
                .map_err(|e| Error::parse(offset, format!("invalid Q weight `{s}`: {e}")))
        };
        match s.split_once('/') {
            None => Ok(Fraction::from(int(s, 0)?)),
            Some((num, den)) => {
                let den = int(den, num.len() + 1)?;
                if den == 0 {
                    return Err(Error::parse(num.len() + 1, "zero denominator"));
                }
                Ok(Fraction::new(int(num, 0)?, den))
            }
        }
    }

    fn print(&self, v: &Fraction) -> String {
        v.to_string()
    }
}

impl Starable for Q {
    fn star_status(&self) -> StarStatus {
        StarStatus::AbsVal
    }

    /// `1 / (1 - v)`, defined for `|v| < 1`.
    fn star(&self, v: &Fraction) -> Result<Fraction> {
        if self.abs(v) < self.one() {
            Ok(self
                .add(&self.one(), &Fraction { num: -v.num, den: v.den })
                .inverse())
        } else {
            Err(not_starable(self, v))
        }
    }
}

impl Divisible for Q {
    fn lgcd(&self, l: &Fraction, r: &Fraction) -> Fraction {
        if self.is_zero(l) {
            *r
        } else {
            *l
        }
    }

    fn ldiv(&self, l: &Fraction, r: &Fraction) -> Fraction {
        l.inverse().mul(r)
    }
}

/// A floating point weight. Negative zero is folded into zero so that equality, ordering and
/// hashing all agree on the bit pattern.
#[derive(Clone, Copy)]
pub struct Real(f64);

impl Real {
    /// Wraps a float.
    pub fn new(v: f64) -> Self {
        Real(if v == 0.0 { 0.0 } else { v })
    }

    /// The wrapped float.
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl From<f64> for Real {
    fn from(v: f64) -> Self {
        Real::new(v)
    }
}

impl PartialEq for Real {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for Real {}

impl Hash for Real {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state)
    }
}

impl Ord for Real {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl PartialOrd for Real {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Debug for Real {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The field of (floating point) real numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct R;

impl WeightSet for R {
    type Value = Real;

    fn zero(&self) -> Real {
        Real(0.0)
    }

    fn one(&self) -> Real {
        Real(1.0)
    }

    fn add(&self, l: &Real, r: &Real) -> Real {
        Real::new(l.0 + r.0)
    }

    fn mul(&self, l: &Real, r: &Real) -> Real {
        Real::new(l.0 * r.0)
    }

    fn abs(&self, v: &Real) -> Real {
        Real::new(v.0.abs())
    }

    fn kind(&self) -> WeightSetKind {
        WeightSetKind::R
    }

    fn parse(&self, s: &str) -> Result<Real> {
        s.trim()
            .parse::<f64>()
            .map(Real::new)
            .map_err(|e| Error::parse(0, format!("invalid R weight `{}`: {e}", s.trim())))
    }

    fn print(&self, v: &Real) -> String {
        v.0.to_string()
    }
}

impl Starable for R {
    fn star_status(&self) -> StarStatus {
        StarStatus::AbsVal
    }

    fn star(&self, v: &Real) -> Result<Real> {
        if v.0.abs() < 1.0 {
            Ok(Real::new(1.0 / (1.0 - v.0)))
        } else {
            Err(not_starable(self, v))
        }
    }
}

impl Divisible for R {
    fn lgcd(&self, l: &Real, r: &Real) -> Real {
        if self.is_zero(l) {
            *r
        } else {
            *l
        }
    }

    fn ldiv(&self, l: &Real, r: &Real) -> Real {
        Real::new(r.0 / l.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weightset::Z;

    #[test_log::test]
    fn fractions_are_normalized() {
        assert_eq!(Fraction::new(2, -4), Fraction::new(-1, 2));
        assert_eq!(Q.parse("6/8"), Ok(Fraction::new(3, 4)));
        assert_eq!(Q.parse("-3"), Ok(Fraction::from(-3)));
        assert!(matches!(Q.parse("1/0"), Err(Error::Parse { position: 2, .. })));
        assert_eq!(Q.print(&Fraction::new(4, 2)), "2");
        assert!(Fraction::new(1, 3) < Fraction::new(1, 2));
    }

    #[test_log::test]
    fn large_fractions_stay_exact() {
        let big = Fraction::new(i64::MAX, 2);
        assert_eq!(Q.add(&big, &big), Fraction::from(i64::MAX));
        let third = Fraction::new(1, 3);
        assert_eq!(Q.mul(&Fraction::from(i64::MAX - 1), &third), Fraction::new(i64::MAX - 1, 3));
    }

    #[test_log::test]
    #[should_panic(expected = "Q weight overflow")]
    fn sums_beyond_64_bits_are_fatal() {
        Q.add(&Fraction::new(i64::MAX, 1), &Fraction::from(1));
    }

    #[test_log::test]
    #[should_panic(expected = "Z weight overflow")]
    fn integer_products_beyond_64_bits_are_fatal() {
        Z.mul(&i64::MAX, &2);
    }

    #[test_log::test]
    fn star_of_small_fractions() {
        assert_eq!(Q.star(&Fraction::new(1, 2)), Ok(Fraction::from(2)));
        assert_eq!(Q.star(&Fraction::new(-1, 3)), Ok(Fraction::new(3, 4)));
        assert!(Q.star(&Fraction::from(1)).is_err());
        assert_eq!(R.star(&Real::new(0.5)), Ok(Real::new(2.0)));
    }

    #[test_log::test]
    fn reals_ignore_the_sign_of_zero() {
        assert_eq!(Real::new(-0.0), R.zero());
        assert!(R.is_zero(&R.mul(&Real::new(-1.0), &Real::new(0.0))));
        assert_eq!(R.parse("2.5"), Ok(Real::new(2.5)));
        assert_eq!(R.print(&Real::new(3.0)), "3");
    }
}
