//! Algorithms on automata. Functions ending in `_here` modify their argument, all others
//! leave it untouched and return a fresh automaton.

/// Reachability from initial states and to final states.
pub mod accessible;
pub use accessible::{
    accessible, accessible_here, accessible_states, coaccessible, coaccessible_here,
    coaccessible_states, is_accessible, is_coaccessible, is_empty, is_trim, is_useless, trim,
    trim_here, useful_states,
};

pub mod scc;
pub use scc::{condensation, num_sccs, scc, scc_of, scc_recursive};

/// Subset constructions and completion.
pub mod determinize;
pub use determinize::{
    complement, complete, complete_here, determinize, is_complete, is_deterministic,
    is_sequential, weighted_determinize,
};

/// Removal of spontaneous transitions.
pub mod proper;
pub use proper::{is_eps_acyclic, is_proper, is_valid, proper, proper_here, proper_with};

/// Merging states along a partition, and minimization.
pub mod quotient;
pub use quotient::{
    coarsest_congruence, hopcroft_partition, is_congruence, merge, min_coquotient, min_quotient,
    min_quotient_det, min_quotient_with, minimize, moore_partition, quotient, quotient_with,
};

pub mod product;
pub use product::{infiltration, is_ambiguous, power, product, shuffle};

pub mod compose;
pub use compose::{compose, outsplit, outsplit_here, Tape};

pub mod eval;
pub use eval::{enumerate, eval, eval_str, shortest, WordSeries};

pub mod aut_to_exp;
pub use aut_to_exp::aut_to_exp;

/// Sum, concatenation, star and multiplication by weights.
pub mod operations;
pub use operations::{
    chain, concatenate, concatenate_here, left_mult, left_mult_here, right_mult, right_mult_here,
    star, star_here, sum, sum_here,
};

pub mod isomorphism;
pub use isomorphism::{are_isomorphic, isomorphism};

pub mod equivalence;
pub use equivalence::{are_equivalent, difference, DecidableEquivalence};

pub mod twins;
pub use twins::has_twins_property;

pub mod factories;
