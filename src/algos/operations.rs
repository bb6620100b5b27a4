//! Rational operations on automata: sum, concatenation, star, multiplication by a weight on
//! either side, and bounded repetition.
//!
//! Concatenation and star work on standard automata (see [`crate::ratexp::is_standard`]),
//! and make their argument standard first if it is not. The sum is the disjoint union,
//! unless both operands are standard and the standard sum is asked for, which merges the
//! initial states and keeps the result standard.
use tracing::debug;

use crate::{
    automaton::{Automaton, StateId},
    labelset::LabelSet,
    math::Map,
    ratexp::{standard_here, standard_initial},
    weightset::{Starable, WeightSet},
    Error, Result,
};

fn require_same_labelset<L: LabelSet, W: WeightSet>(lhs: &Automaton<L, W>, rhs: &Automaton<L, W>) -> Result<()> {
    if lhs.labelset() != rhs.labelset() {
        return Err(Error::IncompatibleContexts {
            left: lhs.context().to_string(),
            right: rhs.context().to_string(),
        });
    }
    Ok(())
}

/// Copies the states of `from` other than `skip` into `res`, with the transitions between
/// them. Initial and final weights are left to the caller.
fn import<L: LabelSet, W: WeightSet>(
    res: &mut Automaton<L, W>,
    from: &Automaton<L, W>,
    skip: Option<StateId>,
) -> Map<StateId, StateId> {
    let map: Map<StateId, StateId> = from
        .states()
        .filter(|s| Some(*s) != skip)
        .map(|s| (s, res.add_state()))
        .collect();
    for t in from.transitions() {
        if let (Some(src), Some(dst)) = (map.get(&from.src_of(t)), map.get(&from.dst_of(t))) {
            res.set_transition(*src, *dst, from.label_of(t).clone(), from.weight_of(t).clone());
        }
    }
    map
}

/// Adds `aut` to `res`. The disjoint union if `standard` is false, otherwise the initial
/// state of `aut` is merged into the one of `res`, which fails unless both are standard.
pub fn sum_here<L: LabelSet, W: WeightSet>(
    res: &mut Automaton<L, W>,
    aut: &Automaton<L, W>,
    standard: bool,
) -> Result<()> {
    require_same_labelset(res, aut)?;
    if !standard {
        let map = import(res, aut, None);
        for (s, w) in aut.initials() {
            res.add_initial_weight(map[&s], w);
        }
        for (s, w) in aut.finals() {
            res.add_final_weight(map[&s], w);
        }
        return Ok(());
    }
    let (Some(initial), Some(other)) = (standard_initial(res), standard_initial(aut)) else {
        return Err(Error::invalid("sum: both automata must be standard"));
    };
    let map = import(res, aut, Some(other));
    for t in aut.out(other) {
        res.set_transition(initial, map[&aut.dst_of(t)], aut.label_of(t).clone(), aut.weight_of(t).clone());
    }
    res.add_final_weight(initial, &aut.final_weight(other));
    for (s, w) in aut.finals().filter(|(s, _)| *s != other) {
        res.set_final_weight(map[&s], w.clone());
    }
    Ok(())
}

/// The sum of `lhs` and `rhs`, see [`sum_here`].
pub fn sum<L: LabelSet, W: WeightSet>(
    lhs: &Automaton<L, W>,
    rhs: &Automaton<L, W>,
    standard: bool,
) -> Result<Automaton<L, W>> {
    let mut res = lhs.copy(false);
    sum_here(&mut res, rhs, standard)?;
    debug!("sum has {} states", res.num_states());
    Ok(res)
}

/// Appends `aut` to `res`: every final state `f` of `res` with weight `wf` receives the
/// transitions leaving the initial state of a standard copy of `aut`, multiplied by `wf` on
/// the left, and becomes final only if that initial state is.
pub fn concatenate_here<L: LabelSet, W: WeightSet>(res: &mut Automaton<L, W>, aut: &Automaton<L, W>) -> Result<()> {
    require_same_labelset(res, aut)?;
    let ws = aut.weightset().clone();
    let mut aut = aut.copy(false);
    let initial = standard_here(&mut aut);
    let map = import(res, &aut, Some(initial));
    let finals: Vec<(StateId, W::Value)> = res.finals().map(|(s, w)| (s, w.clone())).collect();
    let skipped = aut.final_weight(initial);
    for (f, wf) in finals {
        res.unset_final(f);
        for t in aut.out(initial) {
            res.set_transition(
                f,
                map[&aut.dst_of(t)],
                aut.label_of(t).clone(),
                ws.mul(&wf, aut.weight_of(t)),
            );
        }
        res.set_final_weight(f, ws.mul(&wf, &skipped));
    }
    for (s, w) in aut.finals().filter(|(s, _)| *s != initial) {
        res.set_final_weight(map[&s], w.clone());
    }
    Ok(())
}

/// The concatenation of `lhs` and `rhs`, see [`concatenate_here`].
pub fn concatenate<L: LabelSet, W: WeightSet>(
    lhs: &Automaton<L, W>,
    rhs: &Automaton<L, W>,
) -> Result<Automaton<L, W>> {
    let mut res = lhs.copy(false);
    concatenate_here(&mut res, rhs)?;
    debug!("concatenation has {} states", res.num_states());
    Ok(res)
}

/// Turns `aut` into a standard automaton of its star. With `s` the star of the final
/// weight of the initial state, the transitions leaving the initial state are multiplied by
/// `s` on the left, every other final state with weight `wf` gets a copy of them multiplied
/// by `wf`, and its final weight becomes `wf·s`.
///
/// Fails with [`Error::NotStarable`] if `s` does not exist.
pub fn star_here<L: LabelSet, W: Starable>(aut: &mut Automaton<L, W>) -> Result<()> {
    let ws = aut.weightset().clone();
    let initial = standard_here(aut);
    let s = ws.star(&aut.final_weight(initial))?;
    let outs: Vec<_> = aut.out(initial).collect();
    for t in outs {
        aut.lmul_weight(t, &s);
    }
    let looping: Vec<(StateId, L::Label, W::Value)> = aut
        .out(initial)
        .map(|t| (aut.dst_of(t), aut.label_of(t).clone(), aut.weight_of(t).clone()))
        .collect();
    let finals: Vec<(StateId, W::Value)> = aut
        .finals()
        .filter(|(f, _)| *f != initial)
        .map(|(f, w)| (f, w.clone()))
        .collect();
    for (f, wf) in finals {
        for (dst, label, w) in &looping {
            aut.set_transition(f, *dst, label.clone(), ws.mul(&wf, w));
        }
        aut.set_final_weight(f, ws.mul(&wf, &s));
    }
    aut.set_final_weight(initial, s);
    Ok(())
}

/// The star of `aut`, see [`star_here`].
pub fn star<L: LabelSet, W: Starable>(aut: &Automaton<L, W>) -> Result<Automaton<L, W>> {
    let mut res = aut.copy(false);
    star_here(&mut res)?;
    Ok(res)
}

/// The automaton with a single initial state and no final state.
fn zero_here<L: LabelSet, W: WeightSet>(aut: &mut Automaton<L, W>) {
    let mut res = aut.new_like();
    let s = res.add_state();
    res.set_initial(s);
    *aut = res;
}

/// Multiplies the series realized by `aut` by `w` on the left. If `standard` is set, `aut`
/// must be standard and stays so: the transitions leaving the initial state and its final
/// weight are multiplied instead of its initial weight.
pub fn left_mult_here<L: LabelSet, W: WeightSet>(
    aut: &mut Automaton<L, W>,
    w: &W::Value,
    standard: bool,
) -> Result<()> {
    let ws = aut.weightset().clone();
    if ws.is_one(w) {
        return Ok(());
    }
    if !standard {
        if ws.is_zero(w) {
            zero_here(aut);
        } else {
            let initials: Vec<(StateId, W::Value)> = aut.initials().map(|(s, v)| (s, v.clone())).collect();
            for (s, v) in initials {
                aut.set_initial_weight(s, ws.mul(w, &v));
            }
        }
        return Ok(());
    }
    let Some(initial) = standard_initial(aut) else {
        return Err(Error::invalid("left_mult: the automaton must be standard"));
    };
    if ws.is_zero(w) {
        let others: Vec<StateId> = aut.states().filter(|s| *s != initial).collect();
        for s in others {
            aut.del_state(s);
        }
        aut.unset_final(initial);
        return Ok(());
    }
    let outs: Vec<_> = aut.out(initial).collect();
    for t in outs {
        aut.lmul_weight(t, w);
    }
    let fin = ws.mul(w, &aut.final_weight(initial));
    aut.set_final_weight(initial, fin);
    Ok(())
}

/// `w` times the series realized by `aut`, see [`left_mult_here`].
pub fn left_mult<L: LabelSet, W: WeightSet>(
    aut: &Automaton<L, W>,
    w: &W::Value,
    standard: bool,
) -> Result<Automaton<L, W>> {
    let mut res = aut.copy(false);
    left_mult_here(&mut res, w, standard)?;
    Ok(res)
}

/// Multiplies the series realized by `aut` by `w` on the right, through the final weights.
pub fn right_mult_here<L: LabelSet, W: WeightSet>(aut: &mut Automaton<L, W>, w: &W::Value) {
    let ws = aut.weightset().clone();
    if ws.is_zero(w) {
        zero_here(aut);
        return;
    }
    let finals: Vec<(StateId, W::Value)> = aut.finals().map(|(s, v)| (s, v.clone())).collect();
    for (s, v) in finals {
        aut.set_final_weight(s, ws.mul(&v, w));
    }
}

/// The series realized by `aut` times `w`.
pub fn right_mult<L: LabelSet, W: WeightSet>(aut: &Automaton<L, W>, w: &W::Value) -> Automaton<L, W> {
    let mut res = aut.copy(false);
    right_mult_here(&mut res, w);
    res
}

/// The sum of the powers of `aut` from `min` to `max`, or of all powers from `min` on if
/// `max` is `None`.
pub fn chain<L: LabelSet, W: Starable>(
    aut: &Automaton<L, W>,
    min: usize,
    max: Option<usize>,
) -> Result<Automaton<L, W>> {
    let mut power = aut.new_like();
    let s = power.add_state();
    power.set_initial(s);
    power.set_final(s);
    for _ in 0..min {
        power = concatenate(&power, aut)?;
    }
    let Some(max) = max else {
        return concatenate(&power, &star(aut)?);
    };
    if max < min {
        return Err(Error::invalid(format!("chain: maximum {max} is below minimum {min}")));
    }
    let mut res = power.copy(false);
    for _ in min..max {
        power = concatenate(&power, aut)?;
        sum_here(&mut res, &power, false)?;
    }
    debug!("chain of {min} to {max} copies has {} states", res.num_states());
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        algos::{are_equivalent, eval_str},
        context::Context,
        labelset::Letters,
        ratexp::{is_standard, standard, RatExpSet},
        weightset::{B, Z},
    };

    fn rs() -> RatExpSet<Letters, Z> {
        RatExpSet::new(Context::new(Letters::new("ab"), Z))
    }

    fn aut(text: &str) -> Automaton<Letters, Z> {
        let rs = rs();
        standard(&rs, &rs.parse(text).unwrap()).unwrap()
    }

    #[test_log::test]
    fn sums() {
        let (lhs, rhs) = (aut("<2>a+b"), aut("a*b"));
        let expected = aut("<2>a+b+a*b");
        let union = sum(&lhs, &rhs, false).unwrap();
        assert_eq!(union.num_states(), lhs.num_states() + rhs.num_states());
        assert!(are_equivalent(&union, &expected).unwrap());
        let merged = sum(&lhs, &rhs, true).unwrap();
        assert!(is_standard(&merged));
        assert_eq!(merged.num_states(), lhs.num_states() + rhs.num_states() - 1);
        assert!(are_equivalent(&merged, &expected).unwrap());
        assert_eq!(eval_str(&merged, "b").unwrap(), 2);

        let mut other = lhs.copy(false);
        let extra = other.add_state();
        other.set_initial(extra);
        assert!(matches!(sum(&other, &rhs, true), Err(Error::InvalidArgument(_))));
    }

    #[test_log::test]
    fn concatenations() {
        let res = concatenate(&aut("<2>a+b"), &aut("a*b")).unwrap();
        assert!(are_equivalent(&res, &aut("(<2>a+b)a*b")).unwrap());
        assert_eq!(eval_str(&res, "aab").unwrap(), 2);
        let with_empty_word = concatenate(&aut("a+<3>\\e"), &aut("<2>\\e+b")).unwrap();
        assert!(are_equivalent(&with_empty_word, &aut("(a+<3>\\e)(<2>\\e+b)")).unwrap());
        assert_eq!(eval_str(&with_empty_word, "").unwrap(), 6);
    }

    #[test_log::test]
    fn stars() {
        let res = star(&aut("<2>a+b")).unwrap();
        assert!(is_standard(&res));
        assert!(are_equivalent(&res, &aut("(<2>a+b)*")).unwrap());
        assert_eq!(eval_str(&res, "aba").unwrap(), 4);
        assert!(are_equivalent(&star(&aut("ab+a")).unwrap(), &aut("(ab+a)*")).unwrap());
        assert!(matches!(star(&aut("\\e+a")), Err(Error::NotStarable { .. })));
    }

    #[test_log::test]
    fn weights_on_both_sides() {
        let base = aut("a*b");
        assert!(are_equivalent(&left_mult(&base, &3, false).unwrap(), &aut("<3>(a*b)")).unwrap());
        let standard = left_mult(&base, &3, true).unwrap();
        assert!(is_standard(&standard));
        assert!(are_equivalent(&standard, &aut("<3>(a*b)")).unwrap());
        assert!(are_equivalent(&right_mult(&base, &-2), &aut("(a*b)<-2>")).unwrap());

        let zero = left_mult(&base, &0, true).unwrap();
        assert_eq!(zero.num_states(), 1);
        assert!(are_equivalent(&zero, &aut("\\z")).unwrap());
        let zero = right_mult(&base, &0);
        assert_eq!((zero.num_states(), zero.num_transitions()), (1, 0));
    }

    #[test_log::test]
    fn bounded_repetitions() {
        let a = aut("a");
        assert!(are_equivalent(&chain(&a, 2, Some(3)).unwrap(), &aut("aa+aaa")).unwrap());
        assert!(are_equivalent(&chain(&a, 0, Some(1)).unwrap(), &aut("\\e+a")).unwrap());
        assert!(are_equivalent(&chain(&a, 2, None).unwrap(), &aut("aaa*")).unwrap());
        assert!(chain(&a, 3, Some(2)).is_err());
    }

    #[test_log::test]
    fn different_alphabets_do_not_mix() {
        let rs = RatExpSet::new(Context::new(Letters::new("abc"), Z));
        let wider = standard(&rs, &rs.parse("c").unwrap()).unwrap();
        assert!(matches!(
            concatenate(&aut("a"), &wider),
            Err(Error::IncompatibleContexts { .. })
        ));
        let rs = RatExpSet::new(Context::new(Letters::new("ab"), B));
        let e = rs.parse("a+b").unwrap();
        let boolean = standard(&rs, &e).unwrap();
        assert!(is_standard(&sum(&boolean, &boolean, true).unwrap()));
    }
}
