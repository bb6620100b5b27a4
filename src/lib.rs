//! Library for weighted finite automata and weighted rational expressions.
//!
//! Everything is parametrized by a [`Context`](context::Context), which pairs a labelset
//! (what transitions are labeled with: letters, letters or the empty word, words, pairs of
//! labels) with a weightset (the semiring the weights live in: Booleans, integers,
//! rationals, reals, tropical semirings). Both are traits with an associated value type, so
//! every algorithm is written once and specialized by the compiler for each context.
//!
//! The central type is [`Automaton`], a mutable multigraph of states with weighted,
//! labeled transitions and initial and final weights. States and transitions are referred
//! to by stable identifiers which are never reused, deleting a state only marks it dead.
//! Derived automata can record where each of their states comes from in a
//! [`History`](automaton::History).
//!
//! The algorithms live in [`algos`]: reachability and trimming, strongly connected
//! components, determinization and completion, removal of spontaneous transitions,
//! quotients by congruences and minimization, products, composition of transducers,
//! evaluation of words and conversion back into expressions. The [`ratexp`] module holds
//! rational expressions, their parser and printer, derivatives and the standard, Thompson
//! and derived-term constructions.
//!
//! Algorithms are configured either through plain arguments or through
//! [`Options`](options::Options), a named option mechanism that can be filled from text.
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// The prelude is supposed to make using this package easier. Including everything, i.e.
/// `use wautomata::prelude::*;` should be enough to use the package.
pub mod prelude {
    pub use super::{
        algos,
        automaton::{Automaton, History, Origin, StateId, TransitionId},
        context::{Context, ContextDescriptor, Join},
        labelset::{Free, LabelSet, Letters, Nullable, NullableLetters, Tuple2, Words},
        math,
        options::{Direction, Options, QuotientAlgo},
        ratexp::{ExpOf, Polynomial, RatExp, RatExpSet, Visitor},
        weightset::{Divisible, Fraction, Starable, WeightSet, B, F2, N, Q, R, Z, ZMax, ZMin},
        Error, Result, Show,
    };
}

/// This module contains some definitions of mathematical objects which are used throughout the crate and
/// do not really fit to the top level.
pub mod math;

mod error;
pub use error::{Error, Result};

/// Weightsets: the semirings transition weights are taken from.
pub mod weightset;

/// Labelsets: the kinds of labels transitions carry.
pub mod labelset;

/// Contexts pair a labelset with a weightset, and their textual descriptors.
pub mod context;

/// Named options of the algorithms.
pub mod options;

/// Defines weighted automata together with their history.
pub mod automaton;
pub use automaton::Automaton;

pub mod algos;

pub mod ratexp;

/// Implements the generation of random automata and words.
#[cfg(feature = "random")]
pub mod random;

use itertools::Itertools;

/// Helper trait which can be used to display states, automata and such.
pub trait Show {
    /// Returns a human readable representation of `self`, for a state that should be for
    /// example `q0`, for an automaton a table of its transitions.
    fn show(&self) -> String;

    /// Show a collection of the thing, for a collection of states this is `{q0, q1, q2}`.
    fn show_collection<'a, I>(iter: I) -> String
    where
        Self: 'a,
        I: IntoIterator<Item = &'a Self>,
    {
        format!("{{{}}}", iter.into_iter().map(Show::show).join(", "))
    }
}

impl Show for bool {
    fn show(&self) -> String {
        match self {
            true => "+",
            false => "-",
        }
        .to_string()
    }
}

impl<S: Show> Show for [S] {
    fn show(&self) -> String {
        S::show_collection(self.iter())
    }
}

impl<S: Show> Show for Vec<S> {
    fn show(&self) -> String {
        S::show_collection(self.iter())
    }
}

impl<S: Show, T: Show> Show for (S, T) {
    fn show(&self) -> String {
        format!("({}, {})", self.0.show(), self.1.show())
    }
}

impl<S: Show + ?Sized> Show for &S {
    fn show(&self) -> String {
        S::show(*self)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use crate::{
        automaton::{Automaton, StateId},
        context::Context,
        labelset::Letters,
        weightset::{B, Z},
        Show,
    };

    /// Five states in a chain over `a` with a transition back from 3 to 1, initial states 1
    /// and 4, final states 0 and 3. State 0 is not accessible and state 4 not coaccessible.
    pub fn two_initials_with_back_edge() -> Automaton<Letters, B> {
        let mut aut = Automaton::new(Context::new(Letters::new("a"), B));
        let s = aut.add_states(5);
        for w in s.windows(2) {
            aut.new_transition(w[0], w[1], 'a');
        }
        aut.new_transition(s[3], s[1], 'a');
        aut.set_initial(s[1]);
        aut.set_initial(s[4]);
        aut.set_final(s[0]);
        aut.set_final(s[3]);
        aut
    }

    /// Evaluates a binary word to the number it denotes.
    pub fn binary() -> Automaton<Letters, Z> {
        let mut aut = Automaton::new(Context::new(Letters::new("01"), Z));
        let [p, q] = [0, 1].map(|_| aut.add_state());
        for digit in ['0', '1'] {
            aut.new_transition(p, p, digit);
            aut.set_transition(q, q, digit, 2);
        }
        aut.new_transition(p, q, '1');
        aut.set_initial(p);
        aut.set_final(q);
        aut
    }

    /// Counts the occurrences of `b`.
    pub fn b1() -> Automaton<Letters, Z> {
        let mut aut = Automaton::new(Context::new(Letters::new("ab"), Z));
        let [p, q] = [0, 1].map(|_| aut.add_state());
        for letter in ['a', 'b'] {
            aut.new_transition(p, p, letter);
            aut.new_transition(q, q, letter);
        }
        aut.new_transition(p, q, 'b');
        aut.set_initial(p);
        aut.set_final(q);
        aut
    }

    #[test_log::test]
    fn show_collections() {
        assert_eq!(vec![StateId(0), StateId(2)].show(), "{q0, q2}");
        assert_eq!((true, false).show(), "(+, -)");
        assert!(b1().show().contains("q1"));
    }
}
