use std::fmt::Debug;

macro_rules! index_type {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Eq, PartialEq, PartialOrd, Ord, Hash)]
        pub struct $name(pub usize);

        impl $name {
            /// The position of this identifier in the underlying storage.
            pub fn index(self) -> usize {
                self.0
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{:?}", self)
            }
        }

        impl From<usize> for $name {
            fn from(n: usize) -> Self {
                Self(n)
            }
        }

        impl From<$name> for usize {
            fn from(id: $name) -> usize {
                id.0
            }
        }
    };
}

index_type!(
    /// Identifies a state within one automaton. Identifiers of deleted states are never
    /// handed out again.
    StateId,
    "q"
);

index_type!(
    /// Identifies a transition within one automaton.
    TransitionId,
    "t"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn identifiers_print_with_prefix() {
        assert_eq!(format!("{:?}", StateId(3)), "q3");
        assert_eq!(TransitionId::from(7).to_string(), "t7");
        assert_eq!(usize::from(StateId(2)), 2);
    }
}
