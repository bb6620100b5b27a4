//! Families of automata used as benchmarks and test cases. Every factory takes the context
//! to build in and uses the first letters of its generator set.
use std::sync::Arc;

use crate::{
    automaton::{Automaton, StateId},
    context::Context,
    labelset::LabelSet,
    weightset::WeightSet,
    Error, Result,
};

fn letters<L: LabelSet, W: WeightSet>(
    ctx: &Context<L, W>,
    needed: usize,
    factory: &str,
) -> Result<Vec<L::Label>> {
    let letters = ctx.labelset().letter_labels();
    if letters.len() < needed {
        return Err(Error::invalid(format!(
            "{factory}: the alphabet needs at least {needed} letters"
        )));
    }
    Ok(letters)
}

/// The ladybird automaton with `n` states over the letters `a`, `b`, `c` (the first three
/// generators). Its determinization has `2^n - 1` states.
pub fn ladybird<L, W, C>(context: C, n: usize) -> Result<Automaton<L, W>>
where
    L: LabelSet,
    W: WeightSet,
    C: Into<Arc<Context<L, W>>>,
{
    let context = context.into();
    let letters = letters(&context, 3, "ladybird")?;
    if n == 0 {
        return Err(Error::invalid("ladybird: the automaton needs at least one state"));
    }
    let (a, b, c) = (&letters[0], &letters[1], &letters[2]);
    let mut res = Automaton::new(context);
    let p = res.add_state();
    res.set_initial(p);
    res.set_final(p);
    let mut x = p;
    for _ in 1..n {
        let y = res.add_state();
        res.new_transition(x, y, a.clone());
        res.new_transition(y, y, b.clone());
        res.new_transition(y, y, c.clone());
        res.new_transition(y, p, c.clone());
        x = y;
    }
    res.new_transition(x, p, a.clone());
    Ok(res)
}

/// Recognizes the numbers written in base `base` that are divisible by `divisor`. State `i`
/// stands for the remainder `i`, the `l`-th letter is the digit `l`.
pub fn divkbaseb<L, W, C>(context: C, divisor: usize, base: usize) -> Result<Automaton<L, W>>
where
    L: LabelSet,
    W: WeightSet,
    C: Into<Arc<Context<L, W>>>,
{
    let context = context.into();
    if divisor == 0 {
        return Err(Error::invalid("divkbaseb: divisor cannot be 0"));
    }
    if base < 2 {
        return Err(Error::invalid(format!(
            "divkbaseb: base ({base}) must be at least 2"
        )));
    }
    let letters = letters(&context, base, "divkbaseb")?;
    let mut res = Automaton::new(context);
    let states = res.add_states(divisor);
    res.set_initial(states[0]);
    res.set_final(states[0]);
    for (i, s) in states.iter().enumerate() {
        for (digit, letter) in letters.iter().take(base).enumerate() {
            res.new_transition(*s, states[(i * base + digit) % divisor], letter.clone());
        }
    }
    Ok(res)
}

/// Two rings of `n` states running in opposite directions, the first letter goes one way
/// and the second the other way. `finals` lists the positions of the final states.
pub fn double_ring<L, W, C>(context: C, n: usize, finals: &[usize]) -> Result<Automaton<L, W>>
where
    L: LabelSet,
    W: WeightSet,
    C: Into<Arc<Context<L, W>>>,
{
    let context = context.into();
    let letters = letters(&context, 2, "double_ring")?;
    if n == 0 {
        return Err(Error::invalid(
            "double_ring: the automaton needs at least one state",
        ));
    }
    let (a, b) = (&letters[0], &letters[1]);
    let mut res = Automaton::new(context);
    let states = res.add_states(n);
    res.set_initial(states[0]);
    for i in 0..n {
        let next = states[(i + 1) % n];
        res.new_transition(states[i], next, a.clone());
        res.new_transition(next, states[i], b.clone());
    }
    for f in finals {
        let Some(s) = states.get(*f) else {
            return Err(Error::invalid(format!("double_ring: invalid final state {f}")));
        };
        res.set_final(*s);
    }
    Ok(res)
}

/// Recognizes the words whose `n`-th letter from the end is `a`.
pub fn n_ultimate<L, W, C>(context: C, a: &L::Label, n: usize) -> Result<Automaton<L, W>>
where
    L: LabelSet,
    W: WeightSet,
    C: Into<Arc<Context<L, W>>>,
{
    let context = context.into();
    let letters = letters(&context, 2, "n_ultimate")?;
    if n == 0 {
        return Err(Error::invalid("n_ultimate: defined for n > 0"));
    }
    if !letters.contains(a) {
        return Err(Error::invalid(format!(
            "n_ultimate: letter {} not in alphabet",
            context.labelset().print(a)
        )));
    }
    let mut res = Automaton::new(context);
    let init = res.add_state();
    res.set_initial(init);
    for l in &letters {
        res.new_transition(init, init, l.clone());
    }
    let mut prev = res.add_state();
    res.new_transition(init, prev, a.clone());
    for _ in 1..n {
        let next = res.add_state();
        for l in &letters {
            res.new_transition(prev, next, l.clone());
        }
        prev = next;
    }
    res.set_final(prev);
    Ok(res)
}

/// Brzozowski's universal witness with `n` states: `a` rotates the states, `b` swaps the
/// first two, `c` sends the last state to the first. Its minimal automaton and many derived
/// constructions reach the worst case sizes.
pub fn witness<L, W, C>(context: C, n: usize) -> Result<Automaton<L, W>>
where
    L: LabelSet,
    W: WeightSet,
    C: Into<Arc<Context<L, W>>>,
{
    let context = context.into();
    if n < 2 {
        return Err(Error::invalid("witness: n must be at least 2"));
    }
    let letters = letters(&context, 3, "witness")?;
    let (a, b, c) = (&letters[0], &letters[1], &letters[2]);
    let mut res = Automaton::new(context);
    let states: Vec<StateId> = res.add_states(n);
    res.set_initial(states[0]);
    res.set_final(states[n - 1]);
    for i in 0..n {
        res.new_transition(states[i], states[(i + 1) % n], a.clone());
    }
    res.new_transition(states[0], states[1], b.clone());
    res.new_transition(states[1], states[0], b.clone());
    for s in &states[2..] {
        res.new_transition(*s, *s, b.clone());
    }
    for s in &states[..n - 1] {
        res.new_transition(*s, *s, c.clone());
    }
    res.new_transition(states[n - 1], states[0], c.clone());
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        algos::{determinize, is_deterministic},
        labelset::Letters,
        weightset::B,
    };

    fn abc() -> Context<Letters, B> {
        Context::new(Letters::new("abc"), B)
    }

    #[test_log::test]
    fn factories_check_their_arguments() {
        assert!(ladybird(Context::new(Letters::new("ab"), B), 3).is_err());
        assert!(ladybird(abc(), 0).is_err());
        assert!(divkbaseb(abc(), 0, 2).is_err());
        assert!(divkbaseb(abc(), 3, 4).is_err());
        assert!(double_ring(abc(), 3, &[5]).is_err());
        assert!(n_ultimate(abc(), &'d', 2).is_err());
        assert!(witness(abc(), 1).is_err());
    }

    #[test_log::test]
    fn sizes() {
        let lb = ladybird(abc(), 4).unwrap();
        assert_eq!((lb.num_states(), lb.num_transitions()), (4, 13));
        let div = divkbaseb(Context::new(Letters::new("01"), B), 3, 2).unwrap();
        assert_eq!((div.num_states(), div.num_transitions()), (3, 6));
        assert!(is_deterministic(&div));
        let ring = double_ring(abc(), 4, &[0, 2]).unwrap();
        assert_eq!(ring.num_transitions(), 8);
        assert_eq!(ring.final_states().count(), 2);
        let w = witness(abc(), 4).unwrap();
        assert!(is_deterministic(&w));
        assert_eq!(w.num_transitions(), 12);
    }

    #[test_log::test]
    fn n_ultimate_determinizes_exponentially() {
        let aut = n_ultimate(Context::new(Letters::new("ab"), B), &'a', 3).unwrap();
        assert_eq!(aut.num_states(), 4);
        assert_eq!(determinize(&aut, false).unwrap().num_states(), 8);
    }
}
