use std::collections::BTreeSet;

use itertools::Itertools;

use super::StateId;
use crate::math::Map;

/// Where a state of a derived automaton comes from. Origins refer to states of the source
/// automaton by identifier only, they are a lookup and never keep the source alive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Origin {
    /// The state is a copy of a single source state.
    State(StateId),
    /// The state stands for a set of source states (subset construction, quotients).
    Set(BTreeSet<StateId>),
    /// The state stands for a weighted set of source states, weights are printed.
    Weighted(Vec<(StateId, String)>),
    /// The state stands for a tuple of states, one per operand (products, composition).
    Tuple(Vec<StateId>),
    /// The state is named, e.g. by the expression it was derived from.
    Name(String),
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Origin::State(q) => write!(f, "{q}"),
            Origin::Set(qs) => write!(f, "{{{}}}", qs.iter().join(", ")),
            Origin::Weighted(qs) => write!(
                f,
                "{{{}}}",
                qs.iter().map(|(q, w)| format!("<{w}>{q}")).join(", ")
            ),
            Origin::Tuple(qs) => write!(f, "({})", qs.iter().join(", ")),
            Origin::Name(name) => write!(f, "{name}"),
        }
    }
}

/// Provenance map from the states of an automaton to their origin. It is filled while the
/// automaton is built and shared read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    origins: Map<StateId, Origin>,
}

impl History {
    /// An empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the origin of `state`.
    pub fn add(&mut self, state: StateId, origin: Origin) {
        self.origins.insert(state, origin);
    }

    /// The origin of `state`, if it was recorded.
    pub fn origin_of(&self, state: StateId) -> Option<&Origin> {
        self.origins.get(&state)
    }

    /// Number of recorded states.
    pub fn len(&self) -> usize {
        self.origins.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }

    /// Iterates over all records in the order of the state identifiers.
    pub fn iter(&self) -> impl Iterator<Item = (StateId, &Origin)> {
        self.origins
            .iter()
            .map(|(q, o)| (*q, o))
            .sorted_by_key(|(q, _)| *q)
    }
}

impl FromIterator<(StateId, Origin)> for History {
    fn from_iter<T: IntoIterator<Item = (StateId, Origin)>>(iter: T) -> Self {
        Self {
            origins: iter.into_iter().collect(),
        }
    }
}
