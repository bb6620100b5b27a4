use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong when building or transforming automata and expressions.
///
/// Referencing a deleted state or transition is not represented here, it is a programming
/// error and panics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Malformed textual representation of a weight, label, expression or descriptor.
    #[error("parse error at offset {position}: {message}")]
    Parse {
        /// Byte offset into the parsed text.
        position: usize,
        /// What went wrong.
        message: String,
    },
    /// The algorithm needs every transition to carry a single letter.
    #[error("{operation} requires letter labels, found `{label}`")]
    NotFree {
        /// Name of the operation.
        operation: &'static str,
        /// The offending label.
        label: String,
    },
    /// The star of a weight is undefined in its weightset.
    #[error("the star of weight `{weight}` is not defined")]
    NotStarable {
        /// The offending weight.
        weight: String,
    },
    /// The automaton has epsilon cycles whose weights cannot be starred.
    #[error("the automaton is not valid: {reason}")]
    InvalidAutomaton {
        /// Why the automaton was rejected.
        reason: String,
    },
    /// A partition handed to a checked merge is not a congruence.
    #[error("the partition is not a congruence: states {left} and {right} disagree")]
    NotCongruence {
        /// A state of the offending block.
        left: usize,
        /// Another state of the same block.
        right: usize,
    },
    /// The operation only works on deterministic automata.
    #[error("{operation} requires a deterministic automaton")]
    NotDeterministic {
        /// Name of the operation.
        operation: &'static str,
    },
    /// Two contexts have no common extension.
    #[error("cannot join contexts `{left}` and `{right}`")]
    IncompatibleContexts {
        /// Descriptor of the left context.
        left: String,
        /// Descriptor of the right context.
        right: String,
    },
    /// An option name that is not known.
    #[error("unknown option `{name}`, valid options are: {}", valid.join(", "))]
    UnknownOption {
        /// The name that was given.
        name: String,
        /// All valid option names.
        valid: Vec<&'static str>,
    },
    /// A known option was given a value of the wrong type.
    #[error("invalid value `{value}` for option `{option}`, expected one of: {}", valid.join(", "))]
    InvalidOptionValue {
        /// The option name.
        option: &'static str,
        /// The value that was given.
        value: String,
        /// The accepted values.
        valid: Vec<&'static str>,
    },
    /// An expression operator the algorithm cannot handle.
    #[error("{operation}: unsupported operator `{construct}`")]
    Unsupported {
        /// Name of the operation.
        operation: &'static str,
        /// The offending operator.
        construct: &'static str,
    },
    /// Invalid argument to a factory or algorithm.
    #[error("{0}")]
    InvalidArgument(String),
}

impl Error {
    pub(crate) fn parse<S: Into<String>>(position: usize, message: S) -> Self {
        Error::Parse {
            position,
            message: message.into(),
        }
    }

    pub(crate) fn invalid<S: Into<String>>(message: S) -> Self {
        Error::InvalidArgument(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn messages_list_alternatives() {
        let err = Error::UnknownOption {
            name: "algorithm".into(),
            valid: vec!["algo", "direction"],
        };
        assert_eq!(
            err.to_string(),
            "unknown option `algorithm`, valid options are: algo, direction"
        );
        let err = Error::parse(3, "unexpected `)`");
        assert_eq!(err.to_string(), "parse error at offset 3: unexpected `)`");
    }
}
