use std::{collections::BTreeSet, hash::Hash};

use itertools::Itertools;

/// Type alias for sets, we use this to hide which type of `HashSet` we are actually using.
pub type Set<S> = fxhash::FxHashSet<S>;
/// Type alias for maps, we use this to hide which type of `HashMap` we are actually using.
pub type Map<K, V> = fxhash::FxHashMap<K, V>;

/// Represents a bijective mapping between `L` and `R`, that is a mapping which associates
/// each `L` with precisely one `R` and vice versa.
pub type Bijection<L, R> = bimap::BiBTreeMap<L, R>;

/// A partition groups elements of type `I` into pairwise disjoint blocks. It is the
/// currency of all quotient algorithms: a block of states becomes a single state.
#[derive(Debug, Clone)]
pub struct Partition<I: Hash + Eq>(Vec<BTreeSet<I>>);

impl<I: Hash + Eq> std::ops::Deref for Partition<I> {
    type Target = Vec<BTreeSet<I>>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'a, I: Hash + Eq> IntoIterator for &'a Partition<I> {
    type Item = &'a BTreeSet<I>;
    type IntoIter = std::slice::Iter<'a, BTreeSet<I>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<I: Hash + Eq> PartialEq for Partition<I> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|o| other.contains(o))
    }
}
impl<I: Hash + Eq> Eq for Partition<I> {}

impl<I: Hash + Eq + Ord + Copy> Partition<I> {
    /// Returns the size of the partition, i.e. the number of blocks.
    pub fn size(&self) -> usize {
        self.0.len()
    }

    /// Builds a partition from an iterator that yields iterators of elements. Empty
    /// blocks are dropped.
    pub fn new<X: IntoIterator<Item = I>, Y: IntoIterator<Item = X>>(iter: Y) -> Self {
        Self(
            iter.into_iter()
                .map(|it| it.into_iter().collect::<BTreeSet<_>>())
                .filter(|block| !block.is_empty())
                .collect(),
        )
    }

    /// The partition in which every element forms its own block.
    pub fn discrete<X: IntoIterator<Item = I>>(elements: X) -> Self {
        Self(elements.into_iter().map(|e| BTreeSet::from([e])).collect())
    }

    /// Sorts the blocks by their minimal element, which gives a canonical order.
    pub fn normalized(mut self) -> Self {
        self.0.sort_by_key(|block| block.first().copied());
        self
    }

    /// Checks whether every element occurs in at most one block.
    pub fn is_disjoint(&self) -> bool {
        let total: usize = self.0.iter().map(|b| b.len()).sum();
        self.0.iter().flatten().unique().count() == total
    }
}

impl<I: Hash + Eq + Ord> From<Vec<BTreeSet<I>>> for Partition<I> {
    fn from(value: Vec<BTreeSet<I>>) -> Self {
        Self(value)
    }
}

/// Greatest common divisor of two unsigned integers, `T::default()` being zero.
pub fn gcd<T>(mut a: T, mut b: T) -> T
where
    T: Copy + Default + PartialEq + std::ops::Rem<Output = T>,
{
    while b != T::default() {
        (a, b) = (b, a % b);
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn partition_equality_ignores_order() {
        let p = Partition::new([vec![0, 3], vec![1], vec![2, 4]]);
        let q = Partition::new([vec![2, 4], vec![3, 0], vec![1]]);
        assert_eq!(p, q);
        assert_eq!(p.size(), 3);
        assert!(p.is_disjoint());
        assert!(!Partition::new([vec![0, 1], vec![1]]).is_disjoint());
    }

    #[test_log::test]
    fn gcd_of_integers() {
        assert_eq!(gcd(12, 18), 6);
        assert_eq!(gcd(0, 5), 5);
        assert_eq!(gcd(7, 0), 7);
        assert_eq!(gcd(1u128 << 70, 6u128), 2);
    }
}
