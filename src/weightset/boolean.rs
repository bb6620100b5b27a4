use super::{Divisible, StarStatus, Starable, WeightSet, WeightSetKind};
use crate::{Error, Result};

/// The Boolean semiring `({0, 1}, or, and)`, the weightset of classical automata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct B;

impl WeightSet for B {
    type Value = bool;

    fn zero(&self) -> bool {
        false
    }

    fn one(&self) -> bool {
        true
    }

    fn add(&self, l: &bool, r: &bool) -> bool {
        *l || *r
    }

    fn mul(&self, l: &bool, r: &bool) -> bool {
        *l && *r
    }

    fn kind(&self) -> WeightSetKind {
        WeightSetKind::B
    }

    fn parse(&self, s: &str) -> Result<bool> {
        match s.trim() {
            "0" | "false" => Ok(false),
            "1" | "true" => Ok(true),
            other => Err(Error::parse(0, format!("invalid Boolean weight `{other}`"))),
        }
    }

    fn print(&self, v: &bool) -> String {
        String::from(if *v { "1" } else { "0" })
    }
}

impl Starable for B {
    fn star_status(&self) -> StarStatus {
        StarStatus::Starable
    }

    fn star(&self, _v: &bool) -> Result<bool> {
        Ok(true)
    }
}

impl Divisible for B {
    fn lgcd(&self, l: &bool, r: &bool) -> bool {
        *l || *r
    }

    fn ldiv(&self, _l: &bool, r: &bool) -> bool {
        *r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn parse_and_print() {
        assert_eq!(B.parse("1"), Ok(true));
        assert_eq!(B.parse(" false "), Ok(false));
        assert!(matches!(B.parse("2"), Err(Error::Parse { .. })));
        assert_eq!(B.print(&true), "1");
        assert_eq!(B.star(&false), Ok(true));
    }
}
