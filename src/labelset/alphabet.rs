use itertools::Itertools;

use crate::{Error, Result};

/// A finite alphabet of `char` letters, kept sorted and free of duplicates.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct CharAlphabet(Vec<char>);

impl CharAlphabet {
    /// Builds an alphabet from arbitrary letters.
    pub fn new<I: IntoIterator<Item = char>>(letters: I) -> Self {
        Self(letters.into_iter().sorted().dedup().collect())
    }

    /// The alphabet of the first `n` lowercase letters.
    pub fn of_size(n: usize) -> Self {
        assert!(n <= 26, "alphabets of size {n} are not supported");
        Self::new((0..n).map(|i| (b'a' + i as u8) as char))
    }

    /// The letters, in order.
    pub fn letters(&self) -> &[char] {
        &self.0
    }

    /// Number of letters.
    pub fn size(&self) -> usize {
        self.0.len()
    }

    /// Checks membership of a letter.
    pub fn contains(&self, letter: char) -> bool {
        self.0.binary_search(&letter).is_ok()
    }

    /// The alphabet containing the letters of both.
    pub fn union(&self, other: &CharAlphabet) -> CharAlphabet {
        Self::new(self.0.iter().chain(other.0.iter()).copied())
    }

    /// Parses the `{a,b,c}` notation used by descriptors.
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let inner = trimmed
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .ok_or_else(|| Error::parse(0, format!("expected `{{...}}`, found `{trimmed}`")))?;
        if inner.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut letters = Vec::new();
        let mut offset = 1;
        for part in inner.split(',') {
            let mut chars = part.trim().chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => letters.push(c),
                _ => return Err(Error::parse(offset, format!("invalid letter `{}`", part.trim()))),
            }
            offset += part.len() + 1;
        }
        Ok(Self::new(letters))
    }

    pub(crate) fn missing(&self, letter: char) -> Error {
        Error::invalid(format!("letter `{letter}` is not in the alphabet {self}"))
    }
}

impl From<&str> for CharAlphabet {
    fn from(letters: &str) -> Self {
        Self::new(letters.chars())
    }
}

impl std::fmt::Display for CharAlphabet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}}}", self.0.iter().join(","))
    }
}

impl std::fmt::Debug for CharAlphabet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn alphabets_are_sorted_sets() {
        let alphabet = CharAlphabet::from("cabca");
        assert_eq!(alphabet.letters(), &['a', 'b', 'c']);
        assert_eq!(alphabet.to_string(), "{a,b,c}");
        assert_eq!(CharAlphabet::parse(" {b, a} "), Ok(CharAlphabet::from("ab")));
        assert!(CharAlphabet::parse("{ab}").is_err());
        assert_eq!(CharAlphabet::of_size(3).union(&"xa".into()).size(), 4);
    }
}
