//! Thompson automata: every operator becomes a small fragment glued to its operands by
//! spontaneous transitions.
use tracing::debug;

use super::{ExpOf, RatExpSet, Visitor};
use crate::{
    automaton::{Automaton, StateId},
    labelset::Nullable,
    weightset::{Starable, WeightSet},
    Error, Result,
};

/// A fragment under construction, between `initial` and `fin`.
struct Thompson<L: Nullable, W: WeightSet> {
    res: Automaton<L, W>,
    initial: StateId,
    fin: StateId,
}

impl<L: Nullable, W: WeightSet> Thompson<L, W> {
    fn eps(&mut self, src: StateId, dst: StateId, w: W::Value) {
        let one = self.res.labelset().one();
        self.res.set_transition(src, dst, one, w);
    }

    fn eps1(&mut self, src: StateId, dst: StateId) {
        let w = self.res.weightset().one();
        self.eps(src, dst, w);
    }

    fn fresh(&mut self) -> (StateId, StateId) {
        (self.res.add_state(), self.res.add_state())
    }

    /// Wraps the current fragment into a new pair of states: `i -ε,lw-> initial` and
    /// `fin -ε,rw-> f`.
    fn wrap(&mut self, lw: W::Value, rw: W::Value) {
        let (i, f) = self.fresh();
        self.eps(i, self.initial, lw);
        self.eps(self.fin, f, rw);
        self.initial = i;
        self.fin = f;
    }

    fn iterate(&mut self, sub: &ExpOf<L, W>, skip: bool, back: bool) -> Result<()> {
        sub.accept(self)?;
        let (init, fin) = (self.initial, self.fin);
        let (i, f) = self.fresh();
        self.eps1(i, init);
        self.eps1(fin, f);
        if back {
            self.eps1(fin, init);
        }
        if skip {
            self.eps1(i, f);
        }
        self.initial = i;
        self.fin = f;
        Ok(())
    }
}

impl<L: Nullable, W: WeightSet> Visitor<L::Label, W::Value> for Thompson<L, W> {
    type Output = Result<()>;

    fn unsupported(&mut self, construct: &'static str) -> Self::Output {
        Err(Error::Unsupported {
            operation: "thompson",
            construct,
        })
    }

    fn zero(&mut self) -> Self::Output {
        (self.initial, self.fin) = self.fresh();
        Ok(())
    }

    fn one(&mut self) -> Self::Output {
        (self.initial, self.fin) = self.fresh();
        self.eps1(self.initial, self.fin);
        Ok(())
    }

    fn atom(&mut self, label: &L::Label) -> Self::Output {
        (self.initial, self.fin) = self.fresh();
        self.res.new_transition(self.initial, self.fin, label.clone());
        Ok(())
    }

    fn sum(&mut self, subs: &[ExpOf<L, W>]) -> Self::Output {
        let (i, f) = self.fresh();
        for sub in subs {
            sub.accept(self)?;
            self.eps1(i, self.initial);
            self.eps1(self.fin, f);
        }
        self.initial = i;
        self.fin = f;
        Ok(())
    }

    fn prod(&mut self, subs: &[ExpOf<L, W>]) -> Self::Output {
        let Some((head, tail)) = subs.split_first() else {
            return self.one();
        };
        head.accept(self)?;
        let initial = self.initial;
        for sub in tail {
            let prev = self.fin;
            sub.accept(self)?;
            self.eps1(prev, self.initial);
        }
        self.initial = initial;
        Ok(())
    }

    fn star(&mut self, sub: &ExpOf<L, W>) -> Self::Output {
        self.iterate(sub, true, true)
    }

    fn plus(&mut self, sub: &ExpOf<L, W>) -> Self::Output {
        self.iterate(sub, false, true)
    }

    fn maybe(&mut self, sub: &ExpOf<L, W>) -> Self::Output {
        self.iterate(sub, true, false)
    }

    fn lweight(&mut self, weight: &W::Value, sub: &ExpOf<L, W>) -> Self::Output {
        sub.accept(self)?;
        let one = self.res.weightset().one();
        self.wrap(weight.clone(), one);
        Ok(())
    }

    fn rweight(&mut self, sub: &ExpOf<L, W>, weight: &W::Value) -> Self::Output {
        sub.accept(self)?;
        let one = self.res.weightset().one();
        self.wrap(one, weight.clone());
        Ok(())
    }
}

/// The Thompson automaton of `e`, with one initial and one final state. Its spontaneous
/// transitions may form cycles, so removing them requires the weights on these cycles to
/// be starable.
pub fn thompson<L: Nullable, W: WeightSet>(rs: &RatExpSet<L, W>, e: &ExpOf<L, W>) -> Result<Automaton<L, W>> {
    let mut visitor = Thompson {
        res: Automaton::new(rs.context().clone()),
        initial: StateId(0),
        fin: StateId(0),
    };
    e.accept(&mut visitor)?;
    let Thompson { mut res, initial, fin } = visitor;
    res.set_initial(initial);
    res.set_final(fin);
    debug!(
        "thompson automaton has {} states and {} transitions",
        res.num_states(),
        res.num_transitions()
    );
    Ok(res)
}

/// Builds the fragment of the part of an expression without its constant term, which is
/// kept aside in `cst`. Every path of a fragment reads a letter, so no spontaneous cycle is
/// ever created.
struct WeightedThompson<L: Nullable, W: Starable> {
    inner: Thompson<L, W>,
    cst: W::Value,
}

impl<L: Nullable, W: Starable> Visitor<L::Label, W::Value> for WeightedThompson<L, W> {
    type Output = Result<()>;

    fn unsupported(&mut self, construct: &'static str) -> Self::Output {
        Err(Error::Unsupported {
            operation: "weighted_thompson",
            construct,
        })
    }

    fn zero(&mut self) -> Self::Output {
        self.inner.zero()?;
        self.cst = self.inner.res.weightset().zero();
        Ok(())
    }

    fn one(&mut self) -> Self::Output {
        self.inner.zero()?;
        self.cst = self.inner.res.weightset().one();
        Ok(())
    }

    fn atom(&mut self, label: &L::Label) -> Self::Output {
        self.inner.atom(label)?;
        self.cst = self.inner.res.weightset().zero();
        Ok(())
    }

    fn sum(&mut self, subs: &[ExpOf<L, W>]) -> Self::Output {
        let ws = self.inner.res.weightset().clone();
        let (i, f) = self.inner.fresh();
        let mut cst = ws.zero();
        for sub in subs {
            sub.accept(self)?;
            self.inner.eps1(i, self.inner.initial);
            self.inner.eps1(self.inner.fin, f);
            cst = ws.add(&cst, &self.cst);
        }
        self.inner.initial = i;
        self.inner.fin = f;
        self.cst = cst;
        Ok(())
    }

    fn prod(&mut self, subs: &[ExpOf<L, W>]) -> Self::Output {
        if subs.is_empty() {
            return self.one();
        }
        let ws = self.inner.res.weightset().clone();
        let (i, f) = self.inner.fresh();
        // `current` is reached once the factors so far have been read, at least one letter
        // included; `w` is the constant term of those factors.
        let mut current: Option<StateId> = None;
        let mut w = ws.one();
        for sub in subs {
            sub.accept(self)?;
            let (init, fin) = (self.inner.initial, self.inner.fin);
            self.inner.eps(i, init, w.clone());
            let next = self.inner.res.add_state();
            self.inner.eps1(fin, next);
            if let Some(cur) = current {
                self.inner.eps1(cur, init);
                self.inner.eps(cur, next, self.cst.clone());
            }
            current = Some(next);
            w = ws.mul(&w, &self.cst);
        }
        if let Some(cur) = current {
            self.inner.eps1(cur, f);
        }
        self.inner.initial = i;
        self.inner.fin = f;
        self.cst = w;
        Ok(())
    }

    fn star(&mut self, sub: &ExpOf<L, W>) -> Self::Output {
        sub.accept(self)?;
        let ws = self.inner.res.weightset().clone();
        let w = ws.star(&self.cst)?;
        let (init, fin) = (self.inner.initial, self.inner.fin);
        self.inner.wrap(w.clone(), w.clone());
        self.inner.eps(fin, init, w.clone());
        self.cst = w;
        Ok(())
    }

    fn plus(&mut self, sub: &ExpOf<L, W>) -> Self::Output {
        sub.accept(self)?;
        let ws = self.inner.res.weightset().clone();
        let w = ws.star(&self.cst)?;
        let (init, fin) = (self.inner.initial, self.inner.fin);
        self.inner.wrap(w.clone(), w.clone());
        self.inner.eps(fin, init, w.clone());
        self.cst = ws.mul(&self.cst, &w);
        Ok(())
    }

    fn lweight(&mut self, weight: &W::Value, sub: &ExpOf<L, W>) -> Self::Output {
        sub.accept(self)?;
        let ws = self.inner.res.weightset().clone();
        self.inner.wrap(weight.clone(), ws.one());
        self.cst = ws.mul(weight, &self.cst);
        Ok(())
    }

    fn rweight(&mut self, sub: &ExpOf<L, W>, weight: &W::Value) -> Self::Output {
        sub.accept(self)?;
        let ws = self.inner.res.weightset().clone();
        self.inner.wrap(ws.one(), weight.clone());
        self.cst = ws.mul(&self.cst, weight);
        Ok(())
    }
}

/// A variant of [`thompson`] without spontaneous cycles: constant terms are computed
/// during the construction and carried by shortcut transitions, the constant term of `e`
/// becomes the final weight of the initial state.
pub fn weighted_thompson<L: Nullable, W: Starable>(
    rs: &RatExpSet<L, W>,
    e: &ExpOf<L, W>,
) -> Result<Automaton<L, W>> {
    let mut visitor = WeightedThompson {
        inner: Thompson {
            res: Automaton::new(rs.context().clone()),
            initial: StateId(0),
            fin: StateId(0),
        },
        cst: rs.weightset().zero(),
    };
    e.accept(&mut visitor)?;
    let WeightedThompson {
        inner: Thompson { mut res, initial, fin },
        cst,
    } = visitor;
    res.set_initial(initial);
    res.set_final(fin);
    res.set_final_weight(initial, cst);
    debug!(
        "weighted thompson automaton has {} states and {} transitions",
        res.num_states(),
        res.num_transitions()
    );
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        algos::{eval_str, is_eps_acyclic, is_proper, proper},
        context::Context,
        labelset::NullableLetters,
        options::Direction,
        ratexp::derived_term,
        weightset::{Fraction, B, Q, Z},
    };

    #[test_log::test]
    fn classic_construction() {
        let rs = RatExpSet::new(Context::new(NullableLetters::new("ab"), B));
        let aut = thompson(&rs, &rs.parse("(a+b)*a").unwrap()).unwrap();
        assert_eq!(aut.num_states(), 10);
        assert_eq!(aut.num_transitions(), 12);
        assert!(!is_proper(&aut));
        let aut = proper(&aut, Direction::Backward, true, false).unwrap();
        assert!(eval_str(&aut, "ba").unwrap());
        assert!(!eval_str(&aut, "ab").unwrap());
        assert!(matches!(
            thompson(&rs, &rs.parse("a*&b").unwrap()),
            Err(Error::Unsupported { operation: "thompson", construct: "conjunction" })
        ));
    }

    #[test_log::test]
    fn constants_stay_out_of_cycles() {
        let rs = RatExpSet::new(Context::new(NullableLetters::new("a"), Q));
        let e = rs.parse("(<1/2>\\e+a)*").unwrap();
        let plain = thompson(&rs, &e).unwrap();
        assert!(!is_eps_acyclic(&plain));
        let weighted = weighted_thompson(&rs, &e).unwrap();
        assert!(is_eps_acyclic(&weighted));
        let (initial, _) = weighted.initials().next().unwrap();
        assert_eq!(weighted.final_weight(initial), Fraction::from(2));
        for aut in [plain, weighted] {
            let aut = proper(&aut, Direction::Backward, true, false).unwrap();
            assert_eq!(eval_str(&aut, "").unwrap(), Fraction::from(2));
            assert_eq!(eval_str(&aut, "a").unwrap(), Fraction::from(4));
            assert_eq!(eval_str(&aut, "aa").unwrap(), Fraction::from(8));
        }
    }

    #[test_log::test]
    fn agrees_with_derived_terms() {
        let rs = RatExpSet::new(Context::new(NullableLetters::new("ab"), Z));
        for text in [
            "(<2>a+b)*<3>",
            "a(<2>b+<-1>a)*b",
            "<3>(ab+<-1>b){+}",
            "(a?b)*<2>",
            "<2>(\\e+<3>a)(b+\\e)<5>",
            "\\z+a\\z",
        ] {
            let e = rs.parse(text).unwrap();
            let dt = derived_term(&rs, &e, false, false).unwrap();
            let plain = proper(&thompson(&rs, &e).unwrap(), Direction::Backward, true, false).unwrap();
            let weighted = weighted_thompson(&rs, &e).unwrap();
            assert!(is_eps_acyclic(&weighted));
            let weighted = proper(&weighted, Direction::Forward, true, false).unwrap();
            for word in ["", "a", "b", "ab", "ba", "aba", "abb", "bab", "abab", "aab"] {
                let expected = eval_str(&dt, word).unwrap();
                assert_eq!(eval_str(&plain, word).unwrap(), expected, "{text} on {word:?}");
                assert_eq!(eval_str(&weighted, word).unwrap(), expected, "{text} on {word:?}");
            }
        }
    }
}
