use super::{CharAlphabet, LabelSet, LabelSetDescriptor, Nullable, EMPTY_WORD};
use crate::{Error, Result};

/// Labels are whole words over a finite alphabet, the empty word included.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Words {
    alphabet: CharAlphabet,
}

impl Words {
    /// Words over the given alphabet.
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

impl LabelSet for Words {
    type Letter = char;
    type Label = String;

    fn genset(&self) -> Vec<char> {
        self.alphabet.letters().to_vec()
    }

    fn letter_label(&self, letter: &char) -> String {
        letter.to_string()
    }

    fn is_letter(&self, label: &String) -> bool {
        label.chars().count() == 1
    }

    fn is_one(&self, label: &String) -> bool {
        label.is_empty()
    }

    fn is_valid(&self, label: &String) -> bool {
        label.chars().all(|c| self.alphabet.contains(c))
    }

    fn parse(&self, s: &str) -> Result<String> {
        if s == EMPTY_WORD {
            return Ok(String::new());
        }
        match s.char_indices().find(|(_, c)| !self.alphabet.contains(*c)) {
            Some((i, c)) => Err(Error::parse(i, self.alphabet.missing(c).to_string())),
            None => Ok(s.to_string()),
        }
    }

    fn print(&self, label: &String) -> String {
        if label.is_empty() {
            EMPTY_WORD.to_string()
        } else {
            label.clone()
        }
    }

    fn transpose(&self, label: &String) -> String {
        label.chars().rev().collect()
    }

    fn descriptor(&self) -> LabelSetDescriptor {
        LabelSetDescriptor::Words(self.alphabet.clone())
    }
}

impl Nullable for Words {
    fn one(&self) -> String {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn words_are_mirrored_by_transposition() {
        let ls = Words::new("abc");
        let w = ls.parse("abc").unwrap();
        assert_eq!(ls.transpose(&w), "cba");
        assert!(!ls.is_letter(&w));
        assert!(ls.is_one(&ls.parse("\\e").unwrap()));
        assert!(matches!(ls.parse("abd"), Err(Error::Parse { position: 2, .. })));
    }
}
