//! Labelsets describe what may be written on a transition: single letters, letters or the
//! empty word, whole words, or tuples of those for multi-tape transducers.
use std::{fmt::Debug, hash::Hash};

use itertools::Itertools;

use crate::{Error, Result};

mod alphabet;
pub use alphabet::CharAlphabet;

mod letters;
pub use letters::{Letters, NullableLetters};

mod words;
pub use words::Words;

mod tuple;
pub use tuple::Tuple2;

mod join;
pub use join::PromoteLabel;

/// The textual notation of the empty word.
pub const EMPTY_WORD: &str = "\\e";

/// The domain of transition labels.
pub trait LabelSet: Clone + Debug + PartialEq {
    /// The generators of the labelset.
    type Letter: Clone + Eq + Ord + Hash + Debug;
    /// The labels themselves.
    type Label: Clone + Eq + Ord + Hash + Debug;

    /// All generators, in order.
    fn genset(&self) -> Vec<Self::Letter>;

    /// Embeds a generator as a label.
    fn letter_label(&self, letter: &Self::Letter) -> Self::Label;

    /// Checks whether `label` is atomic, i.e. a single generator. Algorithms that need a
    /// free labelset accept an automaton exactly if all its labels are atomic.
    fn is_letter(&self, label: &Self::Label) -> bool;

    /// Checks whether `label` is the empty word.
    fn is_one(&self, _label: &Self::Label) -> bool {
        false
    }

    /// Checks whether `label` belongs to this labelset.
    fn is_valid(&self, label: &Self::Label) -> bool;

    /// Reads a label from text.
    fn parse(&self, s: &str) -> Result<Self::Label>;

    /// Writes a label as text that [`LabelSet::parse`] reads back.
    fn print(&self, label: &Self::Label) -> String;

    /// The mirror image of a label.
    fn transpose(&self, label: &Self::Label) -> Self::Label {
        label.clone()
    }

    /// Describes this labelset independently of its Rust type.
    fn descriptor(&self) -> LabelSetDescriptor;

    /// All generators, embedded as labels.
    fn letter_labels(&self) -> Vec<Self::Label> {
        self.genset()
            .iter()
            .map(|l| self.letter_label(l))
            .collect()
    }
}

/// Labelsets that contain the empty word.
pub trait Nullable: LabelSet {
    /// The empty word.
    fn one(&self) -> Self::Label;
}

/// Labelsets whose labels are exactly the generators, so words are sequences of labels.
pub trait Free: LabelSet {
    /// Splits a word into its letters, `\e` denotes the empty word.
    fn parse_word(&self, s: &str) -> Result<Vec<Self::Label>>;

    /// Writes a word, the empty word is written `\e`.
    fn print_word(&self, word: &[Self::Label]) -> String {
        if word.is_empty() {
            EMPTY_WORD.to_string()
        } else {
            word.iter().map(|l| self.print(l)).join("")
        }
    }
}

/// Describes a labelset: its kind and its alphabet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LabelSetDescriptor {
    /// Single letters.
    Letters(CharAlphabet),
    /// Single letters or the empty word.
    NullableLetters(CharAlphabet),
    /// Words.
    Words(CharAlphabet),
    /// One labelset per tape.
    Tuple(Vec<LabelSetDescriptor>),
}

impl LabelSetDescriptor {
    fn level(&self) -> Option<(u8, &CharAlphabet)> {
        match self {
            LabelSetDescriptor::Letters(a) => Some((0, a)),
            LabelSetDescriptor::NullableLetters(a) => Some((1, a)),
            LabelSetDescriptor::Words(a) => Some((2, a)),
            LabelSetDescriptor::Tuple(_) => None,
        }
    }

    /// The smallest labelset containing both, if any. Alphabets are merged, letters embed
    /// into nullable letters which embed into words, and tuples join tape by tape.
    pub fn join(&self, other: &LabelSetDescriptor) -> Option<LabelSetDescriptor> {
        match (self, other) {
            (LabelSetDescriptor::Tuple(l), LabelSetDescriptor::Tuple(r)) => {
                if l.len() != r.len() {
                    return None;
                }
                l.iter()
                    .zip(r)
                    .map(|(l, r)| l.join(r))
                    .collect::<Option<Vec<_>>>()
                    .map(LabelSetDescriptor::Tuple)
            }
            _ => {
                let (l, left) = self.level()?;
                let (r, right) = other.level()?;
                let alphabet = left.union(right);
                Some(match l.max(r) {
                    0 => LabelSetDescriptor::Letters(alphabet),
                    1 => LabelSetDescriptor::NullableLetters(alphabet),
                    _ => LabelSetDescriptor::Words(alphabet),
                })
            }
        }
    }

    /// Parses descriptors like `letters over {a,b}` or `[letters over {a} | words over {b}]`.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(inner) = s.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
            let tapes = split_top_level(inner, '|')
                .into_iter()
                .map(LabelSetDescriptor::parse)
                .collect::<Result<Vec<_>>>()?;
            return Ok(LabelSetDescriptor::Tuple(tapes));
        }
        for (prefix, build) in [
            (
                "nullable letters over ",
                LabelSetDescriptor::NullableLetters as fn(CharAlphabet) -> Self,
            ),
            ("letters over ", LabelSetDescriptor::Letters),
            ("words over ", LabelSetDescriptor::Words),
        ] {
            if let Some(rest) = s.strip_prefix(prefix) {
                return CharAlphabet::parse(rest)
                    .map(build)
                    .map_err(|e| shift(e, prefix.len()));
            }
        }
        Err(Error::parse(0, format!("unknown labelset `{s}`")))
    }
}

impl std::fmt::Display for LabelSetDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LabelSetDescriptor::Letters(a) => write!(f, "letters over {a}"),
            LabelSetDescriptor::NullableLetters(a) => write!(f, "nullable letters over {a}"),
            LabelSetDescriptor::Words(a) => write!(f, "words over {a}"),
            LabelSetDescriptor::Tuple(tapes) => write!(f, "[{}]", tapes.iter().join(" | ")),
        }
    }
}

/// Splits `s` at every occurrence of `sep` that is not nested in brackets or braces.
pub(crate) fn split_top_level(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '[' | '{' | '(' => depth += 1,
            ']' | '}' | ')' => depth -= 1,
            c if c == sep && depth == 0 => {
                parts.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

pub(crate) fn shift(err: Error, by: usize) -> Error {
    match err {
        Error::Parse { position, message } => Error::Parse {
            position: position + by,
            message,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn descriptors_read_back() {
        for text in [
            "letters over {a,b}",
            "nullable letters over {x}",
            "words over {0,1}",
            "[letters over {a} | nullable letters over {b,c}]",
        ] {
            let descriptor = LabelSetDescriptor::parse(text).unwrap();
            assert_eq!(descriptor.to_string(), text);
        }
        assert!(matches!(
            LabelSetDescriptor::parse("letters over ab"),
            Err(Error::Parse { position: 13, .. })
        ));
    }

    #[test_log::test]
    fn descriptors_join() {
        let letters = LabelSetDescriptor::parse("letters over {a,b}").unwrap();
        let nullable = LabelSetDescriptor::parse("nullable letters over {c}").unwrap();
        assert_eq!(
            letters.join(&nullable).unwrap().to_string(),
            "nullable letters over {a,b,c}"
        );
        let tuple = LabelSetDescriptor::parse("[letters over {a} | letters over {b}]").unwrap();
        assert_eq!(letters.join(&tuple), None);
        assert_eq!(
            tuple.join(&tuple.clone()).unwrap().to_string(),
            "[letters over {a} | letters over {b}]"
        );
    }
}
