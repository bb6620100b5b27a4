use std::fmt::{self, Display, Formatter};

use super::{ExpOf, RatExp, RatExpSet};
use crate::{labelset::LabelSet, weightset::WeightSet};

/// An expression that formats itself with the labels and weights of its set.
pub struct Printed<'a, L: LabelSet, W: WeightSet> {
    rs: &'a RatExpSet<L, W>,
    e: &'a ExpOf<L, W>,
}

impl<'a, L: LabelSet, W: WeightSet> Printed<'a, L, W> {
    pub(super) fn new(rs: &'a RatExpSet<L, W>, e: &'a ExpOf<L, W>) -> Self {
        Self { rs, e }
    }
}

// Binding strength, parentheses are needed around a child weaker than its context requires.
const SUM: u8 = 0;
const CONJUNCTION: u8 = 1;
const SHUFFLE: u8 = 2;
const LDIV: u8 = 3;
const PROD: u8 = 4;
const LWEIGHT: u8 = 5;
const POSTFIX: u8 = 6;
const LEAF: u8 = 7;

fn level<A, V>(e: &RatExp<A, V>) -> u8 {
    match e {
        RatExp::Zero | RatExp::One | RatExp::Atom(_) => LEAF,
        RatExp::Sum(_) => SUM,
        RatExp::Conjunction(_) => CONJUNCTION,
        RatExp::Shuffle(_) => SHUFFLE,
        RatExp::LDiv(..) => LDIV,
        RatExp::Prod(_) => PROD,
        RatExp::LWeight(..) => LWEIGHT,
        RatExp::Star(_)
        | RatExp::Plus(_)
        | RatExp::Maybe(_)
        | RatExp::RWeight(..)
        | RatExp::Complement(_)
        | RatExp::Transposition(_) => POSTFIX,
    }
}

impl<'a, L: LabelSet, W: WeightSet> Printed<'a, L, W> {
    fn child(&self, f: &mut Formatter<'_>, e: &ExpOf<L, W>, at_least: u8) -> fmt::Result {
        let inner = Printed::new(self.rs, e);
        if level(e) < at_least {
            write!(f, "({inner})")
        } else {
            write!(f, "{inner}")
        }
    }

    fn infix(&self, f: &mut Formatter<'_>, subs: &[ExpOf<L, W>], op: &str, at: u8) -> fmt::Result {
        for (i, sub) in subs.iter().enumerate() {
            if i > 0 {
                f.write_str(op)?;
            }
            self.child(f, sub, at + 1)?;
        }
        Ok(())
    }

    fn postfix(&self, f: &mut Formatter<'_>, sub: &ExpOf<L, W>, op: &str) -> fmt::Result {
        self.child(f, sub, POSTFIX)?;
        f.write_str(op)
    }
}

impl<'a, L: LabelSet, W: WeightSet> Display for Printed<'a, L, W> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let ws = self.rs.weightset();
        match self.e {
            RatExp::Zero => f.write_str("\\z"),
            RatExp::One => f.write_str("\\e"),
            RatExp::Atom(a) => f.write_str(&self.rs.labelset().print(a)),
            RatExp::Sum(subs) => self.infix(f, subs, "+", SUM),
            RatExp::Conjunction(subs) => self.infix(f, subs, "&", CONJUNCTION),
            RatExp::Shuffle(subs) => self.infix(f, subs, ":", SHUFFLE),
            RatExp::LDiv(l, r) => {
                self.child(f, l, LDIV)?;
                f.write_str("{\\}")?;
                self.child(f, r, PROD)
            }
            RatExp::Prod(subs) => {
                for (i, sub) in subs.iter().enumerate() {
                    // a left weight after a factor would read as a right weight
                    let at_least = if i > 0 && level(sub) == LWEIGHT { POSTFIX } else { LWEIGHT };
                    self.child(f, sub, at_least)?;
                }
                Ok(())
            }
            RatExp::LWeight(w, sub) => {
                write!(f, "<{}>", ws.print(w))?;
                self.child(f, sub, LWEIGHT)
            }
            RatExp::RWeight(sub, w) => {
                self.child(f, sub, POSTFIX)?;
                write!(f, "<{}>", ws.print(w))
            }
            RatExp::Star(sub) => self.postfix(f, sub, "*"),
            RatExp::Plus(sub) => self.postfix(f, sub, "{+}"),
            RatExp::Maybe(sub) => self.postfix(f, sub, "?"),
            RatExp::Complement(sub) => self.postfix(f, sub, "{c}"),
            RatExp::Transposition(sub) => self.postfix(f, sub, "{T}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        context::Context,
        labelset::Letters,
        ratexp::RatExpSet,
        weightset::{Q, Z},
    };

    #[test_log::test]
    fn prints_what_it_reads() {
        let rs = RatExpSet::new(Context::new(Letters::new("abc"), Z));
        for text in [
            "\\e+(\\e+a)((b+aa)a)*(ab*+b+aa)",
            "<2>a*+<3>b",
            "(a+b)*c",
            "a(<2>b)",
            "(ab){T}{c}&a*:b",
            "a{\\}(b+c)",
            "(<2>a)*",
            "\\z",
        ] {
            let e = rs.parse(text).unwrap();
            assert_eq!(rs.print(&e), text);
            assert_eq!(rs.parse(&rs.print(&e)).unwrap(), e);
        }
        assert_eq!(rs.print(&rs.parse("a.(b.c)").unwrap()), "abc");
        assert_eq!(rs.print(&rs.parse("<1>a+\\z").unwrap()), "a");

        let rs = RatExpSet::new(Context::new(Letters::new("ab"), Q));
        let e = rs.parse("<1/2>a*").unwrap();
        assert_eq!(rs.display(&e).to_string(), "<1/2>a*");
    }
}
