use super::{not_starable, overflow, Divisible, StarStatus, Starable, WeightSet, WeightSetKind};
use crate::{Error, Result};

/// A tropical weight: either a finite integer or the infinity that is the `zero` of the
/// semiring (`+oo` for min-plus, `-oo` for max-plus).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tropical {
    /// A finite weight.
    Finite(i64),
    /// The absorbing infinity.
    Infinite,
}

macro_rules! tropical_weightset {
    ($kind:ident, $pick:ident, $infinity:literal, $starable:expr, $doc:literal) => {
        paste::paste! {
            #[doc = $doc]
            #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
            pub struct [<Z $kind>];

            impl WeightSet for [<Z $kind>] {
                type Value = Tropical;

                fn zero(&self) -> Tropical {
                    Tropical::Infinite
                }

                fn one(&self) -> Tropical {
                    Tropical::Finite(0)
                }

                fn add(&self, l: &Tropical, r: &Tropical) -> Tropical {
                    match (l, r) {
                        (Tropical::Infinite, x) | (x, Tropical::Infinite) => *x,
                        (Tropical::Finite(a), Tropical::Finite(b)) => {
                            Tropical::Finite(std::cmp::$pick(*a, *b))
                        }
                    }
                }

                fn mul(&self, l: &Tropical, r: &Tropical) -> Tropical {
                    match (l, r) {
                        (Tropical::Finite(a), Tropical::Finite(b)) => {
                            Tropical::Finite(a.checked_add(*b).unwrap_or_else(|| {
                                overflow(self.kind().name(), format_args!("{a} + {b}"))
                            }))
                        }
                        _ => Tropical::Infinite,
                    }
                }

                fn kind(&self) -> WeightSetKind {
                    WeightSetKind::[<Z $kind>]
                }

                fn parse(&self, s: &str) -> Result<Tropical> {
                    let s = s.trim();
                    if s == $infinity {
                        return Ok(Tropical::Infinite);
                    }
                    s.parse::<i64>().map(Tropical::Finite).map_err(|e| {
                        Error::parse(0, format!("invalid {} weight `{s}`: {e}", self.kind().name()))
                    })
                }

                fn print(&self, v: &Tropical) -> String {
                    match v {
                        Tropical::Finite(n) => n.to_string(),
                        Tropical::Infinite => $infinity.to_string(),
                    }
                }
            }

            impl Starable for [<Z $kind>] {
                fn star_status(&self) -> StarStatus {
                    StarStatus::Tops
                }

                fn star(&self, v: &Tropical) -> Result<Tropical> {
                    match v {
                        Tropical::Infinite => Ok(self.one()),
                        Tropical::Finite(n) if ($starable)(*n) => Ok(self.one()),
                        _ => Err(not_starable(self, v)),
                    }
                }
            }

            impl Divisible for [<Z $kind>] {
                fn lgcd(&self, l: &Tropical, r: &Tropical) -> Tropical {
                    self.add(l, r)
                }

                fn ldiv(&self, l: &Tropical, r: &Tropical) -> Tropical {
                    match (l, r) {
                        (Tropical::Finite(a), Tropical::Finite(b)) => {
                            Tropical::Finite(b.checked_sub(*a).unwrap_or_else(|| {
                                overflow(self.kind().name(), format_args!("{b} - {a}"))
                            }))
                        }
                        _ => Tropical::Infinite,
                    }
                }
            }
        }
    };
}

tropical_weightset!(
    Min,
    min,
    "oo",
    |n: i64| n >= 0,
    "The min-plus semiring over the integers, `zero` is `+oo` and `one` is `0`."
);
tropical_weightset!(
    Max,
    max,
    "-oo",
    |n: i64| n <= 0,
    "The max-plus semiring over the integers, `zero` is `-oo` and `one` is `0`."
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn min_plus_arithmetic() {
        let (a, b) = (Tropical::Finite(3), Tropical::Finite(5));
        assert_eq!(ZMin.add(&a, &b), a);
        assert_eq!(ZMin.mul(&a, &b), Tropical::Finite(8));
        assert_eq!(ZMin.mul(&a, &ZMin.zero()), Tropical::Infinite);
        assert_eq!(ZMin.parse("oo"), Ok(Tropical::Infinite));
        assert_eq!(ZMin.star(&a), Ok(Tropical::Finite(0)));
        assert!(ZMin.star(&Tropical::Finite(-1)).is_err());
    }

    #[test_log::test]
    fn max_plus_arithmetic() {
        let (a, b) = (Tropical::Finite(3), Tropical::Finite(5));
        assert_eq!(ZMax.add(&a, &b), b);
        assert_eq!(ZMax.print(&ZMax.zero()), "-oo");
        assert!(ZMax.star(&a).is_err());
        assert_eq!(ZMax.ldiv(&a, &b), Tropical::Finite(2));
    }
}
