use super::{not_starable, overflow, Divisible, StarStatus, Starable, WeightSet, WeightSetKind};
use crate::{math::gcd, Error, Result};

macro_rules! integer_weightset {
    ($ws:ident, $t:ty, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
        pub struct $ws;

        impl WeightSet for $ws {
            type Value = $t;

            fn zero(&self) -> $t {
                0
            }

            fn one(&self) -> $t {
                1
            }

            fn add(&self, l: &$t, r: &$t) -> $t {
                l.checked_add(*r)
                    .unwrap_or_else(|| overflow(self.kind().name(), format_args!("{l} + {r}")))
            }

            fn mul(&self, l: &$t, r: &$t) -> $t {
                l.checked_mul(*r)
                    .unwrap_or_else(|| overflow(self.kind().name(), format_args!("{l} * {r}")))
            }

            fn kind(&self) -> WeightSetKind {
                WeightSetKind::$ws
            }

            fn parse(&self, s: &str) -> Result<$t> {
                s.trim().parse::<$t>().map_err(|e| {
                    Error::parse(
                        0,
                        format!("invalid {} weight `{}`: {e}", self.kind().name(), s.trim()),
                    )
                })
            }

            fn print(&self, v: &$t) -> String {
                v.to_string()
            }
        }

        impl Starable for $ws {
            fn star_status(&self) -> StarStatus {
                StarStatus::NonStarable
            }

            fn star(&self, v: &$t) -> Result<$t> {
                if *v == 0 {
                    Ok(1)
                } else {
                    Err(not_starable(self, v))
                }
            }
        }
    };
}

integer_weightset!(N, u64, "The semiring of natural numbers.");
integer_weightset!(Z, i64, "The ring of integers.");

impl Divisible for N {
    fn lgcd(&self, l: &u64, r: &u64) -> u64 {
        gcd(*l, *r)
    }

    fn ldiv(&self, l: &u64, r: &u64) -> u64 {
        r / l
    }
}

impl Divisible for Z {
    /// The gcd carries the sign of the left operand, so that the first weight of a family
    /// decides the sign of its divisor.
    fn lgcd(&self, l: &i64, r: &i64) -> i64 {
        if *l == 0 {
            return *r;
        }
        let g = i64::try_from(gcd(l.unsigned_abs(), r.unsigned_abs()))
            .unwrap_or_else(|_| overflow("Z", format_args!("gcd({l}, {r})")));
        if *l < 0 {
            -g
        } else {
            g
        }
    }

    fn ldiv(&self, l: &i64, r: &i64) -> i64 {
        r / l
    }
}

/// The field with two elements, addition is exclusive or.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct F2;

impl WeightSet for F2 {
    type Value = bool;

    fn zero(&self) -> bool {
        false
    }

    fn one(&self) -> bool {
        true
    }

    fn add(&self, l: &bool, r: &bool) -> bool {
        l ^ r
    }

    fn mul(&self, l: &bool, r: &bool) -> bool {
        *l && *r
    }

    fn kind(&self) -> WeightSetKind {
        WeightSetKind::F2
    }

    fn parse(&self, s: &str) -> Result<bool> {
        match s.trim() {
            "0" => Ok(false),
            "1" => Ok(true),
            other => Err(Error::parse(0, format!("invalid F2 weight `{other}`"))),
        }
    }

    fn print(&self, v: &bool) -> String {
        String::from(if *v { "1" } else { "0" })
    }
}

impl Starable for F2 {
    fn star_status(&self) -> StarStatus {
        StarStatus::NonStarable
    }

    fn star(&self, v: &bool) -> Result<bool> {
        if *v {
            Err(not_starable(self, v))
        } else {
            Ok(true)
        }
    }
}

impl Divisible for F2 {
    fn lgcd(&self, l: &bool, r: &bool) -> bool {
        *l || *r
    }

    fn ldiv(&self, _l: &bool, r: &bool) -> bool {
        *r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn integer_star_only_for_zero() {
        assert_eq!(Z.star(&0), Ok(1));
        assert!(matches!(Z.star(&2), Err(Error::NotStarable { .. })));
        assert_eq!(N.star_status(), StarStatus::NonStarable);
    }

    #[test_log::test]
    fn signed_gcd_follows_the_leading_weight() {
        let fold = |ws: &[i64]| ws.iter().fold(0, |d, w| Z.lgcd(&d, w));
        assert_eq!(fold(&[-4, 6]), -2);
        assert_eq!(fold(&[4, -6]), 2);
        assert_eq!(Z.ldiv(&-2, &6), -3);
        assert_eq!(N.lgcd(&0, &9), 9);
    }

    #[test_log::test]
    fn parse_errors_mention_the_weightset() {
        let err = N.parse("-1").unwrap_err();
        assert!(err.to_string().contains("invalid N weight"));
        assert_eq!(Z.parse(" -12 "), Ok(-12));
        assert!(!F2.add(&true, &true));
    }
}
