//! Standard automata, and the standard (position, or Glushkov) automaton of an expression.
use std::collections::BTreeSet;

use tracing::debug;

use super::{ExpOf, RatExpSet, Visitor};
use crate::{
    automaton::{Automaton, StateId},
    labelset::LabelSet,
    weightset::{Starable, WeightSet},
    Error, Result,
};

/// The initial state of a standard automaton.
pub(crate) fn standard_initial<L: LabelSet, W: WeightSet>(aut: &Automaton<L, W>) -> Option<StateId> {
    let mut initials = aut.initials();
    match (initials.next(), initials.next()) {
        (Some((s, w)), None) if aut.weightset().is_one(w) && aut.incoming(s).next().is_none() => {
            Some(s)
        }
        _ => None,
    }
}

/// Whether `aut` has a single initial state, with weight one, and no transition into it.
pub fn is_standard<L: LabelSet, W: WeightSet>(aut: &Automaton<L, W>) -> bool {
    standard_initial(aut).is_some()
}

/// Makes `aut` standard and returns its initial state: a fresh initial state receives, for
/// every initial state `i` of weight `w`, copies of the transitions leaving `i` multiplied
/// by `w` on the left. Former initial states without incoming transitions are deleted.
pub fn standard_here<L: LabelSet, W: WeightSet>(aut: &mut Automaton<L, W>) -> StateId {
    if let Some(initial) = standard_initial(aut) {
        return initial;
    }
    let ws = aut.weightset().clone();
    let initials: Vec<(StateId, W::Value)> = aut.initials().map(|(s, w)| (s, w.clone())).collect();
    let ini = aut.add_state();
    for (i, wi) in initials {
        let outs: Vec<_> = aut.out(i).collect();
        for t in outs {
            let (dst, label, w) = (aut.dst_of(t), aut.label_of(t).clone(), aut.weight_of(t).clone());
            aut.set_transition(ini, dst, label, ws.mul(&wi, &w));
        }
        let fin = ws.mul(&wi, &aut.final_weight(i));
        aut.add_final_weight(ini, &fin);
        aut.unset_initial(i);
        if aut.incoming(i).next().is_none() {
            aut.del_state(i);
        }
    }
    aut.set_initial(ini);
    ini
}

struct Standard<L: LabelSet, W: WeightSet> {
    res: Automaton<L, W>,
    initial: StateId,
}

impl<L: LabelSet, W: Starable> Standard<L, W> {
    fn finals(&self) -> BTreeSet<StateId> {
        self.res.final_states().collect()
    }

    /// Moves everything leaving `from`, its final weight included, to `into`, multiplied by
    /// `w` on the left, and deletes `from`.
    fn absorb(&mut self, into: StateId, from: StateId, w: &W::Value) {
        let ws = self.res.weightset().clone();
        let outs: Vec<_> = self.res.out(from).collect();
        for t in outs {
            let (dst, label) = (self.res.dst_of(t), self.res.label_of(t).clone());
            let weight = ws.mul(w, self.res.weight_of(t));
            self.res.set_transition(into, dst, label, weight);
        }
        let fin = ws.mul(w, &self.res.final_weight(from));
        self.res.add_final_weight(into, &fin);
        self.res.del_state(from);
    }
}

impl<L: LabelSet, W: Starable> Visitor<L::Label, W::Value> for Standard<L, W> {
    type Output = Result<()>;

    fn unsupported(&mut self, construct: &'static str) -> Self::Output {
        Err(Error::Unsupported {
            operation: "standard",
            construct,
        })
    }

    fn zero(&mut self) -> Self::Output {
        self.initial = self.res.add_state();
        Ok(())
    }

    fn one(&mut self) -> Self::Output {
        self.initial = self.res.add_state();
        self.res.set_final(self.initial);
        Ok(())
    }

    fn atom(&mut self, label: &L::Label) -> Self::Output {
        let i = self.res.add_state();
        let f = self.res.add_state();
        self.res.new_transition(i, f, label.clone());
        self.res.set_final(f);
        self.initial = i;
        Ok(())
    }

    fn sum(&mut self, subs: &[ExpOf<L, W>]) -> Self::Output {
        let Some((head, tail)) = subs.split_first() else {
            return self.zero();
        };
        head.accept(self)?;
        let initial = self.initial;
        let one = self.res.weightset().one();
        for sub in tail {
            sub.accept(self)?;
            self.absorb(initial, self.initial, &one);
        }
        self.initial = initial;
        Ok(())
    }

    fn prod(&mut self, subs: &[ExpOf<L, W>]) -> Self::Output {
        let Some((head, tail)) = subs.split_first() else {
            return self.one();
        };
        let others = self.finals();
        head.accept(self)?;
        let initial = self.initial;
        for sub in tail {
            let finals: Vec<(StateId, W::Value)> = self
                .res
                .finals()
                .filter(|(s, _)| !others.contains(s))
                .map(|(s, w)| (s, w.clone()))
                .collect();
            sub.accept(self)?;
            let sub_initial = self.initial;
            for (s, w) in finals {
                self.res.unset_final(s);
                let ws = self.res.weightset().clone();
                let outs: Vec<_> = self.res.out(sub_initial).collect();
                for t in outs {
                    let (dst, label) = (self.res.dst_of(t), self.res.label_of(t).clone());
                    let weight = ws.mul(&w, self.res.weight_of(t));
                    self.res.set_transition(s, dst, label, weight);
                }
                let fin = ws.mul(&w, &self.res.final_weight(sub_initial));
                self.res.add_final_weight(s, &fin);
            }
            self.res.del_state(sub_initial);
        }
        self.initial = initial;
        Ok(())
    }

    fn star(&mut self, sub: &ExpOf<L, W>) -> Self::Output {
        let others = self.finals();
        sub.accept(self)?;
        let init = self.initial;
        let ws = self.res.weightset().clone();
        let w = ws.star(&self.res.final_weight(init))?;
        let finals: Vec<(StateId, W::Value)> = self
            .res
            .finals()
            .filter(|(s, _)| *s != init && !others.contains(s))
            .map(|(s, v)| (s, v.clone()))
            .collect();
        let outs: Vec<_> = self.res.out(init).collect();
        for t in outs {
            let Some(t) = self.res.lmul_weight(t, &w) else {
                continue;
            };
            let (dst, label, weight) = (self.res.dst_of(t), self.res.label_of(t).clone(), self.res.weight_of(t).clone());
            for (s, v) in &finals {
                self.res.set_transition(*s, dst, label.clone(), ws.mul(v, &weight));
            }
        }
        for (s, v) in finals {
            self.res.set_final_weight(s, ws.mul(&v, &w));
        }
        self.res.set_final_weight(init, w);
        Ok(())
    }

    fn lweight(&mut self, weight: &W::Value, sub: &ExpOf<L, W>) -> Self::Output {
        sub.accept(self)?;
        let init = self.initial;
        let outs: Vec<_> = self.res.out(init).collect();
        for t in outs {
            self.res.lmul_weight(t, weight);
        }
        let fin = self.res.weightset().mul(weight, &self.res.final_weight(init));
        self.res.set_final_weight(init, fin);
        Ok(())
    }

    fn rweight(&mut self, sub: &ExpOf<L, W>, weight: &W::Value) -> Self::Output {
        let others = self.finals();
        sub.accept(self)?;
        let finals: Vec<(StateId, W::Value)> = self
            .res
            .finals()
            .filter(|(s, _)| !others.contains(s))
            .map(|(s, w)| (s, w.clone()))
            .collect();
        for (s, w) in finals {
            let fin = self.res.weightset().mul(&w, weight);
            self.res.set_final_weight(s, fin);
        }
        Ok(())
    }
}

/// The standard automaton of `e`: one state per atom plus an initial state with no
/// incoming transition. Only the rational operators and weights are supported.
pub fn standard<L: LabelSet, W: Starable>(rs: &RatExpSet<L, W>, e: &ExpOf<L, W>) -> Result<Automaton<L, W>> {
    let mut visitor = Standard {
        res: Automaton::new(rs.context().clone()),
        initial: StateId(0),
    };
    e.accept(&mut visitor)?;
    let Standard { mut res, initial } = visitor;
    res.set_initial(initial);
    debug!("standard automaton has {} states", res.num_states());
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        algos::{eval_str, is_proper},
        context::Context,
        labelset::Letters,
        ratexp::derived_term,
        weightset::{Fraction, B, Q, Z},
    };

    #[test_log::test]
    fn one_state_per_atom() {
        let rs = RatExpSet::new(Context::new(Letters::new("ab"), B));
        let e = rs.parse("(a+b)*a").unwrap();
        let aut = standard(&rs, &e).unwrap();
        assert_eq!(aut.num_states(), 4);
        assert!(is_standard(&aut));
        assert!(eval_str(&aut, "ba").unwrap());
        assert!(!eval_str(&aut, "ab").unwrap());
        assert!(matches!(
            standard(&rs, &rs.parse("a*&b").unwrap()),
            Err(Error::Unsupported { operation: "standard", construct: "conjunction" })
        ));
    }

    #[test_log::test]
    fn weighted_star() {
        let rs = RatExpSet::new(Context::new(Letters::new("a"), Q));
        let e = rs.parse("(<1/2>\\e+a)*").unwrap();
        let aut = standard(&rs, &e).unwrap();
        assert!(is_proper(&aut));
        assert_eq!(eval_str(&aut, "").unwrap(), Fraction::from(2));
        assert_eq!(eval_str(&aut, "a").unwrap(), Fraction::from(4));
        assert_eq!(eval_str(&aut, "aa").unwrap(), Fraction::from(8));
    }

    #[test_log::test]
    fn agrees_with_derived_terms() {
        let rs = RatExpSet::new(Context::new(Letters::new("ab"), Z));
        for text in ["(<2>a+b)*<3>", "a(<2>b+<-1>a)*b", "<3>(ab+<-1>b){+}", "(a?b)*<2>", "\\z+a\\z"] {
            let e = rs.parse(text).unwrap();
            let std = standard(&rs, &e).unwrap();
            let dt = derived_term(&rs, &e, false, false).unwrap();
            for word in ["", "a", "b", "ab", "ba", "aba", "abb", "bab", "abab", "aab"] {
                assert_eq!(
                    eval_str(&std, word).unwrap(),
                    eval_str(&dt, word).unwrap(),
                    "{text} on {word:?}"
                );
            }
        }
    }

    #[test_log::test]
    fn making_automata_standard() {
        let rs = RatExpSet::new(Context::new(Letters::new("ab"), Z));
        let mut aut = standard(&rs, &rs.parse("a*").unwrap()).unwrap();
        aut.set_initial_weight(StateId(0), 3);
        let loop_state = StateId(1);
        aut.set_initial_weight(loop_state, 2);
        assert!(!is_standard(&aut));
        standard_here(&mut aut);
        assert!(is_standard(&aut));
        assert_eq!(eval_str(&aut, "").unwrap(), 5);
        assert_eq!(eval_str(&aut, "aa").unwrap(), 5);
    }
}
