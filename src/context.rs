use std::sync::Arc;

use crate::{
    labelset::{split_top_level, LabelSet, LabelSetDescriptor},
    weightset::{WeightSet, WeightSetKind},
    Error, Result,
};

/// Computes the smallest common extension of two algebraic structures.
pub trait Join<Rhs = Self> {
    /// The joined structure.
    type Output;
    /// Joins `self` with `rhs`.
    fn join(&self, rhs: &Rhs) -> Self::Output;
}

/// A context pairs a labelset with a weightset. It is immutable and shared between all the
/// automata and expressions that live in it.
#[derive(Debug, Clone, PartialEq)]
pub struct Context<L, W> {
    labelset: L,
    weightset: W,
}

impl<L: LabelSet, W: WeightSet> Context<L, W> {
    /// Pairs a labelset with a weightset.
    pub fn new(labelset: L, weightset: W) -> Self {
        Self {
            labelset,
            weightset,
        }
    }

    /// Convenience for building a context that is immediately shared.
    pub fn shared(labelset: L, weightset: W) -> Arc<Self> {
        Arc::new(Self::new(labelset, weightset))
    }

    /// The labelset.
    pub fn labelset(&self) -> &L {
        &self.labelset
    }

    /// The weightset.
    pub fn weightset(&self) -> &W {
        &self.weightset
    }

    /// Describes this context independently of its Rust types.
    pub fn descriptor(&self) -> ContextDescriptor {
        ContextDescriptor {
            labelset: self.labelset.descriptor(),
            weightset: self.weightset.kind(),
        }
    }
}

impl<L1, W1, L2, W2> Join<Context<L2, W2>> for Context<L1, W1>
where
    L1: Join<L2>,
    W1: Join<W2>,
{
    type Output = Context<L1::Output, W1::Output>;

    fn join(&self, rhs: &Context<L2, W2>) -> Self::Output {
        Context {
            labelset: self.labelset.join(&rhs.labelset),
            weightset: self.weightset.join(&rhs.weightset),
        }
    }
}

impl<L: LabelSet, W: WeightSet> std::fmt::Display for Context<L, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.descriptor())
    }
}

/// The textual description of a context, e.g. `letters over {a,b}, integers`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContextDescriptor {
    /// The labelset part.
    pub labelset: LabelSetDescriptor,
    /// The weightset part.
    pub weightset: WeightSetKind,
}

impl ContextDescriptor {
    /// Builds a descriptor from a labelset descriptor and a weightset descriptor, given as text.
    pub fn from_parts(labelset: &str, weightset: &str) -> Result<Self> {
        Ok(Self {
            labelset: LabelSetDescriptor::parse(labelset)?,
            weightset: parse_weightset(weightset)?,
        })
    }

    /// Parses `<labelset>, <weightset>`.
    pub fn parse(s: &str) -> Result<Self> {
        let parts = split_top_level(s, ',');
        let Some((weightset, labelset)) = parts.split_last() else {
            return Err(Error::parse(0, "empty context descriptor"));
        };
        if labelset.is_empty() {
            return Err(Error::parse(
                0,
                format!("expected `<labelset>, <weightset>`, found `{s}`"),
            ));
        }
        let labelset_text = labelset.join(",");
        let weightset = parse_weightset(weightset)
            .map_err(|e| crate::labelset::shift(e, labelset_text.len() + 1))?;
        Ok(Self {
            labelset: LabelSetDescriptor::parse(&labelset_text)?,
            weightset,
        })
    }

    /// The smallest context both contexts embed into.
    pub fn join(&self, other: &ContextDescriptor) -> Result<ContextDescriptor> {
        let incompatible = || Error::IncompatibleContexts {
            left: self.to_string(),
            right: other.to_string(),
        };
        Ok(ContextDescriptor {
            labelset: self
                .labelset
                .join(&other.labelset)
                .ok_or_else(incompatible)?,
            weightset: self
                .weightset
                .join(&other.weightset)
                .ok_or_else(incompatible)?,
        })
    }
}

fn parse_weightset(s: &str) -> Result<WeightSetKind> {
    WeightSetKind::from_name(s)
        .ok_or_else(|| Error::parse(0, format!("unknown weightset `{}`", s.trim())))
}

impl std::fmt::Display for ContextDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.labelset, self.weightset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        labelset::{Letters, NullableLetters},
        weightset::{B, Q, Z},
    };

    #[test_log::test]
    fn descriptors_of_typed_contexts() {
        let ctx = Context::new(Letters::new("ab"), Z);
        assert_eq!(ctx.to_string(), "letters over {a,b}, integers");
        assert_eq!(ContextDescriptor::parse(&ctx.to_string()), Ok(ctx.descriptor()));
        assert_eq!(
            ContextDescriptor::from_parts("letters over {a,b}", "integers"),
            Ok(ctx.descriptor())
        );
    }

    #[test_log::test]
    fn typed_join_promotes_both_parts() {
        let left = Context::new(Letters::new("ab"), B);
        let right = Context::new(NullableLetters::new("bc"), Q);
        let joined = left.join(&right);
        assert_eq!(joined, Context::new(NullableLetters::new("abc"), Q));
    }

    #[test_log::test]
    fn descriptor_join_reports_incompatibility() {
        let left = ContextDescriptor::parse("letters over {a}, integers").unwrap();
        let right = ContextDescriptor::parse("words over {b}, rationals").unwrap();
        assert_eq!(
            left.join(&right).unwrap().to_string(),
            "words over {a,b}, rationals"
        );
        let tropical = ContextDescriptor::parse("letters over {a}, Z-min-plus").unwrap();
        let err = left.join(&tropical).unwrap_err();
        assert_eq!(
            err,
            Error::IncompatibleContexts {
                left: "letters over {a}, integers".into(),
                right: "letters over {a}, min-plus integers".into(),
            }
        );
        assert!(ContextDescriptor::parse("letters over {a}, complex").is_err());
    }
}
