use super::{LabelSet, Letters, NullableLetters, Tuple2, Words};
use crate::context::Join;

/// Labelsets that `From` embeds into, along with the embedding of labels.
pub trait PromoteLabel<From: LabelSet>: LabelSet {
    /// Maps a label of `from` into `self`.
    fn promote_label(&self, from: &From, label: &From::Label) -> Self::Label;
}

macro_rules! promote_label {
    ($($from:ident => $to:ident : |$l:ident| $conv:expr;)*) => {
        $(
            impl PromoteLabel<$from> for $to {
                fn promote_label(&self, _from: &$from, $l: &<$from as LabelSet>::Label) -> Self::Label {
                    $conv
                }
            }
        )*
    };
}

promote_label! {
    Letters => Letters: |l| *l;
    Letters => NullableLetters: |l| Some(*l);
    Letters => Words: |l| l.to_string();
    NullableLetters => NullableLetters: |l| *l;
    NullableLetters => Words: |l| l.map(String::from).unwrap_or_default();
    Words => Words: |l| l.clone();
}

impl<A1, B1, A2, B2> PromoteLabel<Tuple2<A1, B1>> for Tuple2<A2, B2>
where
    A1: LabelSet,
    B1: LabelSet,
    A2: PromoteLabel<A1>,
    B2: PromoteLabel<B1>,
{
    fn promote_label(&self, from: &Tuple2<A1, B1>, (l, r): &(A1::Label, B1::Label)) -> Self::Label {
        (
            self.0.promote_label(&from.0, l),
            self.1.promote_label(&from.1, r),
        )
    }
}

macro_rules! join_labelsets {
    ($($lhs:ident + $rhs:ident => $out:ident;)*) => {
        $(
            impl Join<$rhs> for $lhs {
                type Output = $out;
                fn join(&self, rhs: &$rhs) -> $out {
                    $out::new(self.alphabet().union(rhs.alphabet()))
                }
            }
        )*
    };
}

join_labelsets! {
    Letters + Letters => Letters;
    Letters + NullableLetters => NullableLetters;
    NullableLetters + Letters => NullableLetters;
    NullableLetters + NullableLetters => NullableLetters;
    Letters + Words => Words;
    Words + Letters => Words;
    NullableLetters + Words => Words;
    Words + NullableLetters => Words;
    Words + Words => Words;
}

impl<A1, B1, A2, B2> Join<Tuple2<A2, B2>> for Tuple2<A1, B1>
where
    A1: Join<A2>,
    B1: Join<B2>,
{
    type Output = Tuple2<A1::Output, B1::Output>;

    fn join(&self, rhs: &Tuple2<A2, B2>) -> Self::Output {
        Tuple2(self.0.join(&rhs.0), self.1.join(&rhs.1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn joins_widen_alphabet_and_kind() {
        let joined = Letters::new("ab").join(&NullableLetters::new("c"));
        assert_eq!(joined, NullableLetters::new("abc"));
        let from = Letters::new("ab");
        assert_eq!(joined.promote_label(&from, &'a'), Some('a'));
        let words = Words::new("a");
        assert_eq!(words.promote_label(&NullableLetters::new("a"), &None), "");
        let tdc = Tuple2(Letters::new("a"), Letters::new("b"))
            .join(&Tuple2(Letters::new("c"), NullableLetters::new("b")));
        assert_eq!(tdc, Tuple2(Letters::new("ac"), NullableLetters::new("b")));
    }
}
