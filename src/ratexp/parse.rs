//! Recursive descent parser for expressions. From loosest to tightest:
//!
//! ```text
//! sum      := conj ('+' conj)*
//! conj     := shuffle ('&' shuffle)*
//! shuffle  := ldiv (':' ldiv)*
//! ldiv     := prod ('{\}' prod)*
//! prod     := weighted ('.'? weighted)*
//! weighted := '<' weight '>' weighted | postfix
//! postfix  := primary ('*' | '?' | '{+}' | '{c}' | '{T}' | '<' weight '>')*
//! primary  := '(' sum ')' | '\e' | '\z' | letter
//! ```
use tracing::trace;

use super::{ExpOf, RatExpSet};
use crate::{
    labelset::{shift, LabelSet},
    weightset::WeightSet,
    Error, Result,
};

const SPECIAL: &str = "+&:.*?()<>{}\\";

pub(super) struct Parser<'a, L: LabelSet, W: WeightSet> {
    rs: &'a RatExpSet<L, W>,
    input: &'a str,
    pos: usize,
}

impl<'a, L: LabelSet, W: WeightSet> Parser<'a, L, W> {
    pub(super) fn new(rs: &'a RatExpSet<L, W>, input: &'a str) -> Self {
        Self { rs, input, pos: 0 }
    }

    pub(super) fn parse(mut self) -> Result<ExpOf<L, W>> {
        let e = self.sum()?;
        self.skip_whitespace();
        match self.peek() {
            None => {
                trace!("parsed expression of size {}", e.size());
                Ok(e)
            }
            Some(c) => Err(self.unexpected(c)),
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_whitespace();
        self.rest().chars().next()
    }

    fn eat(&mut self, token: &str) -> bool {
        self.skip_whitespace();
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &str) -> Result<()> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(match self.peek() {
                Some(c) => Error::parse(self.pos, format!("expected `{token}`, found `{c}`")),
                None => Error::parse(self.pos, format!("expected `{token}`, found end of input")),
            })
        }
    }

    fn unexpected(&self, c: char) -> Error {
        Error::parse(self.pos, format!("unexpected `{c}`"))
    }

    fn starts_term(&mut self) -> bool {
        match self.peek() {
            Some('(' | '<' | '\\') => true,
            Some(c) => !SPECIAL.contains(c),
            None => false,
        }
    }

    fn sum(&mut self) -> Result<ExpOf<L, W>> {
        let mut res = self.conjunction()?;
        while self.eat("+") {
            let rhs = self.conjunction()?;
            res = self.rs.add(res, rhs);
        }
        Ok(res)
    }

    fn conjunction(&mut self) -> Result<ExpOf<L, W>> {
        let mut res = self.shuffle()?;
        while self.eat("&") {
            let rhs = self.shuffle()?;
            res = self.rs.conjunction(res, rhs);
        }
        Ok(res)
    }

    fn shuffle(&mut self) -> Result<ExpOf<L, W>> {
        let mut res = self.ldiv()?;
        while self.eat(":") {
            let rhs = self.ldiv()?;
            res = self.rs.shuffle(res, rhs);
        }
        Ok(res)
    }

    fn ldiv(&mut self) -> Result<ExpOf<L, W>> {
        let mut res = self.prod()?;
        while self.eat("{\\}") {
            let rhs = self.prod()?;
            res = self.rs.ldiv(res, rhs);
        }
        Ok(res)
    }

    fn prod(&mut self) -> Result<ExpOf<L, W>> {
        let mut res = self.weighted()?;
        loop {
            if self.eat(".") {
                let rhs = self.weighted()?;
                res = self.rs.mul(res, rhs);
            } else if self.starts_term() {
                let rhs = self.weighted()?;
                res = self.rs.mul(res, rhs);
            } else {
                return Ok(res);
            }
        }
    }

    fn weight(&mut self) -> Result<W::Value> {
        self.expect("<")?;
        let start = self.pos;
        let Some(len) = self.rest().find('>') else {
            return Err(Error::parse(start, "unterminated weight"));
        };
        let text = &self.input[start..start + len];
        self.pos = start + len + 1;
        self.rs
            .weightset()
            .parse(text.trim())
            .map_err(|err| shift(err, start))
    }

    fn weighted(&mut self) -> Result<ExpOf<L, W>> {
        if self.peek() == Some('<') {
            let w = self.weight()?;
            let sub = self.weighted()?;
            return Ok(self.rs.lmul(&w, sub));
        }
        self.postfix()
    }

    fn postfix(&mut self) -> Result<ExpOf<L, W>> {
        let mut res = self.primary()?;
        loop {
            if self.eat("*") {
                res = self.rs.star(res);
            } else if self.eat("?") {
                res = self.rs.maybe(res);
            } else if self.eat("{+}") {
                res = self.rs.plus(res);
            } else if self.eat("{c}") {
                res = self.rs.complement(res);
            } else if self.eat("{T}") {
                res = self.rs.transposition(res);
            } else if self.peek() == Some('<') {
                let w = self.weight()?;
                res = self.rs.rmul(res, &w);
            } else if self.peek() == Some('{') && !self.rest().starts_with("{\\}") {
                let end = self.rest().find('}').unwrap_or(self.rest().len());
                return Err(Error::parse(
                    self.pos,
                    format!("unknown operator `{}`", &self.rest()[..end]),
                ));
            } else {
                return Ok(res);
            }
        }
    }

    fn primary(&mut self) -> Result<ExpOf<L, W>> {
        match self.peek() {
            Some('(') => {
                self.pos += 1;
                let e = self.sum()?;
                self.expect(")")?;
                Ok(e)
            }
            Some('\\') => {
                if self.eat("\\e") {
                    Ok(self.rs.one())
                } else if self.eat("\\z") {
                    Ok(self.rs.zero())
                } else {
                    Err(Error::parse(self.pos, "expected `\\e` or `\\z`"))
                }
            }
            Some(c) if !SPECIAL.contains(c) => {
                let start = self.pos;
                self.pos += c.len_utf8();
                let label = self
                    .rs
                    .labelset()
                    .parse(&self.input[start..self.pos])
                    .map_err(|err| shift(err, start))?;
                Ok(self.rs.atom(label))
            }
            Some(c) => Err(self.unexpected(c)),
            None => Err(Error::parse(self.pos, "unexpected end of input")),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        context::Context,
        labelset::Letters,
        ratexp::{RatExp, RatExpSet},
        weightset::Z,
        Error,
    };

    #[test_log::test]
    fn precedence() {
        let rs = RatExpSet::new(Context::new(Letters::new("abc"), Z));
        let (a, b, c) = (RatExp::Atom('a'), RatExp::Atom('b'), RatExp::Atom('c'));
        assert_eq!(
            rs.parse("a+bc*").unwrap(),
            RatExp::Sum(vec![
                a.clone(),
                RatExp::Prod(vec![b.clone(), RatExp::Star(Box::new(c.clone()))])
            ])
        );
        assert_eq!(rs.parse("a.b").unwrap(), rs.parse("ab").unwrap());
        assert_eq!(rs.parse(" ( a ) ").unwrap(), a);
        assert_eq!(
            rs.parse("<2>a<3>").unwrap(),
            RatExp::LWeight(6, Box::new(a.clone()))
        );
        assert_eq!(
            rs.parse("a&b:c").unwrap(),
            RatExp::Conjunction(vec![a.clone(), RatExp::Shuffle(vec![b.clone(), c.clone()])])
        );
        assert_eq!(
            rs.parse("ab{\\}c").unwrap(),
            RatExp::LDiv(Box::new(RatExp::Prod(vec![a.clone(), b.clone()])), Box::new(c))
        );
        assert_eq!(rs.parse("a{+}?").unwrap(), RatExp::Maybe(Box::new(RatExp::Plus(Box::new(a)))));
        assert_eq!(rs.parse("\\e+\\z").unwrap(), RatExp::One);
    }

    #[test_log::test]
    fn errors_carry_positions() {
        let rs = RatExpSet::new(Context::new(Letters::new("ab"), Z));
        assert!(matches!(rs.parse("a+"), Err(Error::Parse { position: 2, .. })));
        assert!(matches!(rs.parse("(ab"), Err(Error::Parse { position: 3, .. })));
        assert!(matches!(rs.parse("a)"), Err(Error::Parse { position: 1, .. })));
        assert!(matches!(rs.parse("a{x}"), Err(Error::Parse { position: 1, .. })));
        assert!(rs.parse("c").is_err());
        assert!(rs.parse("<x>a").is_err());
    }
}
