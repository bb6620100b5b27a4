use super::{Fraction, Real, WeightSet, B, F2, N, Q, R, Z, ZMax, ZMin};
use crate::context::Join;

/// Weightsets that `From` embeds into, along with the embedding of weights.
pub trait Promote<From: WeightSet>: WeightSet {
    /// Maps a weight of `from` into `self`.
    fn promote(&self, from: &From, v: &From::Value) -> Self::Value;
}

impl<W: WeightSet> Promote<W> for W {
    fn promote(&self, _from: &W, v: &W::Value) -> W::Value {
        v.clone()
    }
}

macro_rules! self_join {
    ($($ws:ident),*) => {
        $(
            impl Join<$ws> for $ws {
                type Output = $ws;
                fn join(&self, _rhs: &$ws) -> $ws {
                    $ws
                }
            }
        )*
    };
}

self_join!(B, N, Z, Q, R, ZMin, ZMax, F2);

macro_rules! promote {
    ($($from:ident => $to:ident : |$v:ident| $conv:expr;)*) => {
        $(
            impl Promote<$from> for $to {
                fn promote(&self, _from: &$from, $v: &<$from as WeightSet>::Value) -> Self::Value {
                    $conv
                }
            }

            impl Join<$to> for $from {
                type Output = $to;
                fn join(&self, _rhs: &$to) -> $to {
                    $to
                }
            }

            impl Join<$from> for $to {
                type Output = $to;
                fn join(&self, _rhs: &$from) -> $to {
                    $to
                }
            }
        )*
    };
}

promote! {
    B => N: |v| *v as u64;
    B => Z: |v| *v as i64;
    B => Q: |v| Fraction::from(*v as i64);
    B => R: |v| Real::new(if *v { 1.0 } else { 0.0 });
    N => Z: |v| *v as i64;
    N => Q: |v| Fraction::from(*v as i64);
    N => R: |v| Real::new(*v as f64);
    Z => Q: |v| Fraction::from(*v);
    Z => R: |v| Real::new(*v as f64);
    Q => R: |v| Real::new(v.num() as f64 / v.den() as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn promotion_preserves_values() {
        assert_eq!(Z.promote(&B, &true), 1);
        assert_eq!(Q.promote(&Z, &-3), Fraction::from(-3));
        assert_eq!(R.promote(&Q, &Fraction::new(1, 4)), Real::new(0.25));
        assert_eq!(N.promote(&N, &7), 7);
        assert_eq!(B.join(&Q), Q);
        assert_eq!(Q.join(&N), Q);
    }
}
