use super::{CharAlphabet, Free, LabelSet, LabelSetDescriptor, Nullable, EMPTY_WORD};
use crate::{Error, Result};

fn single_char(s: &str) -> Result<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(Error::parse(0, format!("expected a single letter, found `{s}`"))),
    }
}

/// The free labelset: every label is a letter of a finite alphabet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Letters {
    alphabet: CharAlphabet,
}

impl Letters {
    /// Letters over the given alphabet.
    pub fn new<A: Into<CharAlphabet>>(alphabet: A) -> Self {
        Self {
            alphabet: alphabet.into(),
        }
    }

    /// The underlying alphabet.
    pub fn alphabet(&self) -> &CharAlphabet {
        &self.alphabet
    }
}

impl LabelSet for Letters {
    type Letter = char;
    type Label = char;

    fn genset(&self) -> Vec<char> {
        self.alphabet.letters().to_vec()
    }

    fn letter_label(&self, letter: &char) -> char {
        *letter
    }

    fn is_letter(&self, _label: &char) -> bool {
        true
    }

    fn is_valid(&self, label: &char) -> bool {
        self.alphabet.contains(*label)
    }

    fn parse(&self, s: &str) -> Result<char> {
        let c = single_char(s)?;
        if self.alphabet.contains(c) {
            Ok(c)
        } else {
            Err(Error::parse(0, self.alphabet.missing(c).to_string()))
        }
    }

    fn print(&self, label: &char) -> String {
        label.to_string()
    }

    fn descriptor(&self) -> LabelSetDescriptor {
        LabelSetDescriptor::Letters(self.alphabet.clone())
    }
}

impl Free for Letters {
    fn parse_word(&self, s: &str) -> Result<Vec<char>> {
        if s == EMPTY_WORD {
            return Ok(vec![]);
        }
        s.char_indices()
            .map(|(i, c)| {
                if self.alphabet.contains(c) {
                    Ok(c)
                } else {
                    Err(Error::parse(i, self.alphabet.missing(c).to_string()))
                }
            })
            .collect()
    }
}

/// Letters of a finite alphabet together with the empty word `\e`, the labelset of
/// automata with spontaneous transitions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NullableLetters {
    alphabet: CharAlphabet,
}

impl NullableLetters {
    /// Letters or the empty word over the given alphabet.
    pub fn new<A: Into<CharAlphabet>>(alphabet: A) -> Self {
        Self {
            alphabet: alphabet.into(),
        }
    }

    /// The underlying alphabet.
    pub fn alphabet(&self) -> &CharAlphabet {
        &self.alphabet
    }
}

impl LabelSet for NullableLetters {
    type Letter = char;
    type Label = Option<char>;

    fn genset(&self) -> Vec<char> {
        self.alphabet.letters().to_vec()
    }

    fn letter_label(&self, letter: &char) -> Option<char> {
        Some(*letter)
    }

    fn is_letter(&self, label: &Option<char>) -> bool {
        label.is_some()
    }

    fn is_one(&self, label: &Option<char>) -> bool {
        label.is_none()
    }

    fn is_valid(&self, label: &Option<char>) -> bool {
        label.map_or(true, |c| self.alphabet.contains(c))
    }

    fn parse(&self, s: &str) -> Result<Option<char>> {
        if s == EMPTY_WORD {
            return Ok(None);
        }
        let c = single_char(s)?;
        if self.alphabet.contains(c) {
            Ok(Some(c))
        } else {
            Err(Error::parse(0, self.alphabet.missing(c).to_string()))
        }
    }

    fn print(&self, label: &Option<char>) -> String {
        match label {
            Some(c) => c.to_string(),
            None => EMPTY_WORD.to_string(),
        }
    }

    fn descriptor(&self) -> LabelSetDescriptor {
        LabelSetDescriptor::NullableLetters(self.alphabet.clone())
    }
}

impl Nullable for NullableLetters {
    fn one(&self) -> Option<char> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn letters_reject_foreign_symbols() {
        let ls = Letters::new("ab");
        assert_eq!(ls.parse("a"), Ok('a'));
        assert!(matches!(ls.parse("c"), Err(Error::Parse { .. })));
        assert!(ls.parse("ab").is_err());
        assert_eq!(ls.parse_word("abba"), Ok(vec!['a', 'b', 'b', 'a']));
        assert!(matches!(
            ls.parse_word("abc"),
            Err(Error::Parse { position: 2, .. })
        ));
        assert_eq!(ls.print_word(&[]), "\\e");
    }

    #[test_log::test]
    fn nullable_letters_know_the_empty_word() {
        let ls = NullableLetters::new("ab");
        assert_eq!(ls.parse("\\e"), Ok(None));
        assert_eq!(ls.print(&ls.one()), "\\e");
        assert!(ls.is_one(&None));
        assert!(!ls.is_letter(&None));
        assert_eq!(ls.letter_labels(), vec![Some('a'), Some('b')]);
    }
}
