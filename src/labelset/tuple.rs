use itertools::Itertools;

use super::{split_top_level, LabelSet, LabelSetDescriptor, Nullable};
use crate::{Error, Result};

/// Two-tape labels, the labelset of transducers. A label is a pair `x|y`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tuple2<L1, L2>(pub L1, pub L2);

impl<L1: LabelSet, L2: LabelSet> LabelSet for Tuple2<L1, L2> {
    type Letter = (L1::Letter, L2::Letter);
    type Label = (L1::Label, L2::Label);

    fn genset(&self) -> Vec<Self::Letter> {
        self.0
            .genset()
            .into_iter()
            .cartesian_product(self.1.genset())
            .collect()
    }

    fn letter_label(&self, letter: &Self::Letter) -> Self::Label {
        (self.0.letter_label(&letter.0), self.1.letter_label(&letter.1))
    }

    /// A pair is atomic when no tape carries more than a letter and not both are empty.
    fn is_letter(&self, (l, r): &Self::Label) -> bool {
        let atomic_l = self.0.is_letter(l) || self.0.is_one(l);
        let atomic_r = self.1.is_letter(r) || self.1.is_one(r);
        atomic_l && atomic_r && !self.is_one(&(l.clone(), r.clone()))
    }

    fn is_one(&self, (l, r): &Self::Label) -> bool {
        self.0.is_one(l) && self.1.is_one(r)
    }

    fn is_valid(&self, (l, r): &Self::Label) -> bool {
        self.0.is_valid(l) && self.1.is_valid(r)
    }

    fn parse(&self, s: &str) -> Result<Self::Label> {
        let parts = split_top_level(s, '|');
        let [l, r] = parts.as_slice() else {
            return Err(Error::parse(0, format!("expected a pair `x|y`, found `{s}`")));
        };
        let left = self.0.parse(l)?;
        let right = self
            .1
            .parse(r)
            .map_err(|e| super::shift(e, l.len() + 1))?;
        Ok((left, right))
    }

    fn print(&self, (l, r): &Self::Label) -> String {
        format!("{}|{}", self.0.print(l), self.1.print(r))
    }

    fn transpose(&self, (l, r): &Self::Label) -> Self::Label {
        (self.0.transpose(l), self.1.transpose(r))
    }

    fn descriptor(&self) -> LabelSetDescriptor {
        LabelSetDescriptor::Tuple(vec![self.0.descriptor(), self.1.descriptor()])
    }
}

impl<L1: Nullable, L2: Nullable> Nullable for Tuple2<L1, L2> {
    fn one(&self) -> Self::Label {
        (self.0.one(), self.1.one())
    }
}
