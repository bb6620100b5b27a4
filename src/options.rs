//! Named options that select algorithm variants.
//!
//! Every option has a name, a type and a default. Options can be set either with typed
//! values through [`Options::set_value`] or from text through [`Options::set`]; unknown names
//! and values of the wrong type are rejected with an error listing what would be accepted.
use std::str::FromStr;

use crate::{Error, Result};

/// Which partition refinement computes the coarsest congruence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QuotientAlgo {
    /// Iterated signature refinement.
    #[default]
    Moore,
    /// Worklist refinement with splitters.
    Hopcroft,
    /// Hopcroft on deterministic automata, Moore otherwise.
    Auto,
}

/// Direction of epsilon removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// Spontaneous transitions are folded into the transitions that follow them.
    #[default]
    Backward,
    /// Spontaneous transitions are folded into the transitions that precede them.
    Forward,
}

/// The names of all options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionName {
    /// `algo`: a [`QuotientAlgo`].
    Algo,
    /// `direction`: a [`Direction`].
    Direction,
    /// `in_place`: whether to modify the argument instead of returning a fresh automaton.
    InPlace,
    /// `keep_history`: whether results record where their states come from.
    KeepHistory,
    /// `prune`: whether epsilon removal deletes states it made inaccessible.
    Prune,
    /// `breaking`: whether derivatives are split into their summands.
    Breaking,
    /// `safe`: whether merging checks that the partition is a congruence.
    Safe,
}

impl OptionName {
    /// All options.
    pub const ALL: [OptionName; 7] = [
        OptionName::Algo,
        OptionName::Direction,
        OptionName::InPlace,
        OptionName::KeepHistory,
        OptionName::Prune,
        OptionName::Breaking,
        OptionName::Safe,
    ];

    /// The textual name.
    pub fn name(&self) -> &'static str {
        match self {
            OptionName::Algo => "algo",
            OptionName::Direction => "direction",
            OptionName::InPlace => "in_place",
            OptionName::KeepHistory => "keep_history",
            OptionName::Prune => "prune",
            OptionName::Breaking => "breaking",
            OptionName::Safe => "safe",
        }
    }

    fn accepted(&self) -> Vec<&'static str> {
        match self {
            OptionName::Algo => vec!["moore", "hopcroft", "auto"],
            OptionName::Direction => vec!["backward", "forward"],
            _ => vec!["true", "false"],
        }
    }

    fn invalid(&self, value: impl ToString) -> Error {
        Error::InvalidOptionValue {
            option: self.name(),
            value: value.to_string(),
            valid: self.accepted(),
        }
    }
}

impl FromStr for OptionName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|o| o.name() == s)
            .ok_or_else(|| Error::UnknownOption {
                name: s.to_string(),
                valid: Self::ALL.iter().map(|o| o.name()).collect(),
            })
    }
}

/// A typed option value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionValue {
    /// Value of `algo`.
    Algo(QuotientAlgo),
    /// Value of `direction`.
    Direction(Direction),
    /// Value of the Boolean options.
    Flag(bool),
}

impl std::fmt::Display for OptionValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptionValue::Algo(QuotientAlgo::Moore) => write!(f, "moore"),
            OptionValue::Algo(QuotientAlgo::Hopcroft) => write!(f, "hopcroft"),
            OptionValue::Algo(QuotientAlgo::Auto) => write!(f, "auto"),
            OptionValue::Direction(Direction::Backward) => write!(f, "backward"),
            OptionValue::Direction(Direction::Forward) => write!(f, "forward"),
            OptionValue::Flag(b) => write!(f, "{b}"),
        }
    }
}

/// The option values an algorithm runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Minimization algorithm.
    pub algo: QuotientAlgo,
    /// Direction of epsilon removal.
    pub direction: Direction,
    /// Modify the argument instead of building a new automaton.
    pub in_place: bool,
    /// Record the origin of result states.
    pub keep_history: bool,
    /// Delete states made inaccessible by epsilon removal.
    pub prune: bool,
    /// Split derivatives into their summands.
    pub breaking: bool,
    /// Check partitions before merging.
    pub safe: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            algo: QuotientAlgo::default(),
            direction: Direction::default(),
            in_place: false,
            keep_history: true,
            prune: true,
            breaking: false,
            safe: true,
        }
    }
}

impl Options {
    /// Sets an option to a typed value. Fails if the value has the wrong type.
    pub fn set_value(&mut self, name: OptionName, value: OptionValue) -> Result<&mut Self> {
        match (name, value) {
            (OptionName::Algo, OptionValue::Algo(a)) => self.algo = a,
            (OptionName::Direction, OptionValue::Direction(d)) => self.direction = d,
            (OptionName::InPlace, OptionValue::Flag(b)) => self.in_place = b,
            (OptionName::KeepHistory, OptionValue::Flag(b)) => self.keep_history = b,
            (OptionName::Prune, OptionValue::Flag(b)) => self.prune = b,
            (OptionName::Breaking, OptionValue::Flag(b)) => self.breaking = b,
            (OptionName::Safe, OptionValue::Flag(b)) => self.safe = b,
            (name, value) => return Err(name.invalid(value)),
        }
        Ok(self)
    }

    /// Sets an option from text, e.g. `set("algo", "hopcroft")`.
    pub fn set(&mut self, name: &str, value: &str) -> Result<&mut Self> {
        let option: OptionName = name.trim().parse()?;
        let value = value.trim();
        let typed = match option {
            OptionName::Algo => match value {
                "moore" => OptionValue::Algo(QuotientAlgo::Moore),
                "hopcroft" => OptionValue::Algo(QuotientAlgo::Hopcroft),
                "auto" => OptionValue::Algo(QuotientAlgo::Auto),
                _ => return Err(option.invalid(value)),
            },
            OptionName::Direction => match value {
                "backward" => OptionValue::Direction(Direction::Backward),
                "forward" => OptionValue::Direction(Direction::Forward),
                _ => return Err(option.invalid(value)),
            },
            _ => match value {
                "true" => OptionValue::Flag(true),
                "false" => OptionValue::Flag(false),
                _ => return Err(option.invalid(value)),
            },
        };
        self.set_value(option, typed)
    }

    /// Reads the current value of an option.
    pub fn get(&self, name: OptionName) -> OptionValue {
        match name {
            OptionName::Algo => OptionValue::Algo(self.algo),
            OptionName::Direction => OptionValue::Direction(self.direction),
            OptionName::InPlace => OptionValue::Flag(self.in_place),
            OptionName::KeepHistory => OptionValue::Flag(self.keep_history),
            OptionName::Prune => OptionValue::Flag(self.prune),
            OptionName::Breaking => OptionValue::Flag(self.breaking),
            OptionName::Safe => OptionValue::Flag(self.safe),
        }
    }

    /// Parses a comma separated list of `name=value` pairs on top of the defaults.
    pub fn parse(s: &str) -> Result<Self> {
        let mut options = Options::default();
        for assignment in s.split(',').map(str::trim).filter(|a| !a.is_empty()) {
            let Some((name, value)) = assignment.split_once('=') else {
                return Err(Error::parse(
                    s.find(assignment).unwrap_or_default(),
                    format!("expected `name=value`, found `{assignment}`"),
                ));
            };
            options.set(name, value)?;
        }
        Ok(options)
    }

    /// Builder style setter for the minimization algorithm.
    pub fn with_algo(mut self, algo: QuotientAlgo) -> Self {
        self.algo = algo;
        self
    }

    /// Builder style setter for the direction of epsilon removal.
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Builder style setter for in place operation.
    pub fn in_place(mut self, in_place: bool) -> Self {
        self.in_place = in_place;
        self
    }

    /// Builder style setter for history tracking.
    pub fn keep_history(mut self, keep: bool) -> Self {
        self.keep_history = keep;
        self
    }

    /// Builder style setter for pruning.
    pub fn prune(mut self, prune: bool) -> Self {
        self.prune = prune;
        self
    }

    /// Builder style setter for breaking derivations.
    pub fn breaking(mut self, breaking: bool) -> Self {
        self.breaking = breaking;
        self
    }

    /// Builder style setter for checked merging.
    pub fn safe(mut self, safe: bool) -> Self {
        self.safe = safe;
        self
    }
}
