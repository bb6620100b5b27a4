use std::sync::Arc;

use tracing::debug;

use crate::{
    automaton::{Automaton, StateId},
    context::Context,
    labelset::LabelSet,
    math,
    weightset::WeightSet,
    Error, Result,
};

fn generators<L: LabelSet, W: WeightSet>(context: &Context<L, W>, factory: &str) -> Result<Vec<L::Label>> {
    let letters = context.labelset().letter_labels();
    if letters.is_empty() {
        return Err(Error::invalid(format!("{factory}: the alphabet is empty")));
    }
    Ok(letters)
}

/// Uses a sprout-like algorithm to generate a random deterministic automaton over the letters
/// of `context`. `probability` determines the probability of a back edge to some existing
/// state. The algorithm is as follows:
/// 1. Start with a single initial state.
/// 2. For each letter, go through the existing states in order and with probability
///    `probability` add a transition to that state.
/// 3. If no transition was added, we add one to a new state.
/// 4. Repeat until all states and letters have been treated.
///
/// Every state is accessible and final with probability one half.
pub fn random_sprout<L, W, C>(context: C, probability: f64) -> Result<Automaton<L, W>>
where
    L: LabelSet,
    W: WeightSet,
    C: Into<Arc<Context<L, W>>>,
{
    let context = context.into();
    let letters = generators(&context, "random_sprout")?;
    if !(probability > 0.0 && probability <= 1.0) {
        return Err(Error::invalid(format!(
            "random_sprout: probability {probability} is not in (0, 1]"
        )));
    }
    let mut res = Automaton::new(context);
    let initial = res.add_state();
    res.set_initial(initial);

    let mut current = 0;
    while current < res.state_bound() {
        let src = StateId(current);
        'letters: for letter in &letters {
            for target in 0..=current {
                if fastrand::f64() < probability {
                    res.new_transition(src, StateId(target), letter.clone());
                    continue 'letters;
                }
            }
            let target = res.add_state();
            res.new_transition(src, target, letter.clone());
        }
        if fastrand::bool() {
            res.set_final(src);
        }
        current += 1;
    }
    debug!("sprouted a random automaton with {} states", res.num_states());
    Ok(res)
}

/// Generates a random complete deterministic automaton with `size` states by drawing the
/// target of every transition uniformly. State 0 is initial and every state is final with
/// probability one half, so some states may be unreachable.
pub fn random_dfa<L, W, C>(context: C, size: usize) -> Result<Automaton<L, W>>
where
    L: LabelSet,
    W: WeightSet,
    C: Into<Arc<Context<L, W>>>,
{
    let context = context.into();
    let letters = generators(&context, "random_dfa")?;
    if size == 0 {
        return Err(Error::invalid("random_dfa: the automaton needs at least one state"));
    }
    let mut res = Automaton::new(context);
    let states = res.add_states(size);
    for &q in &states {
        for letter in &letters {
            let target = states[fastrand::usize(..size)];
            res.new_transition(q, target, letter.clone());
        }
        if fastrand::bool() {
            res.set_final(q);
        }
    }
    res.set_initial(states[0]);
    Ok(res)
}

/// Generate a random word over `genset`. The length is drawn uniformly from
/// `min_len..=max_len`.
pub fn random_word<A: Clone>(genset: &[A], min_len: usize, max_len: usize) -> Vec<A> {
    if genset.is_empty() {
        return vec![];
    }
    let length = fastrand::usize(min_len..=max_len);
    (0..length)
        .map(|_| genset[fastrand::usize(..genset.len())].clone())
        .collect()
}

/// Generate `number` distinct random words over `genset`, see [`random_word`]. There must be
/// at least `number` words with lengths in `min_len..=max_len`.
pub fn random_words<A: Clone + Eq + std::hash::Hash>(
    genset: &[A],
    min_len: usize,
    max_len: usize,
    number: usize,
) -> math::Set<Vec<A>> {
    let mut words = math::Set::with_capacity_and_hasher(number, Default::default());
    while words.len() < number {
        words.insert(random_word(genset, min_len, max_len));
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        algos::{
            eval, hopcroft_partition, is_accessible, is_complete, is_deterministic, minimize,
            moore_partition,
        },
        labelset::Letters,
        options::QuotientAlgo,
        weightset::B,
    };

    #[test_log::test]
    fn sprouted_automata_are_accessible() {
        fastrand::seed(7);
        for probability in [0.1, 0.5, 1.0] {
            let aut = random_sprout(Context::new(Letters::new("ab"), B), probability).unwrap();
            assert!(is_deterministic(&aut));
            assert!(is_complete(&aut));
            assert!(is_accessible(&aut));
        }
        assert!(random_sprout(Context::new(Letters::new("ab"), B), 0.0).is_err());
    }

    #[test_log::test]
    fn moore_and_hopcroft_agree() {
        fastrand::seed(42);
        for size in 1..=12 {
            for _ in 0..5 {
                let aut = random_dfa(Context::new(Letters::new("abc"), B), size).unwrap();
                assert_eq!(aut.num_states(), size);
                assert!(is_complete(&aut));
                let moore = moore_partition(&aut);
                let hopcroft = hopcroft_partition(&aut, true);
                assert_eq!(moore, hopcroft);
                let a = minimize(&aut, QuotientAlgo::Moore, false).unwrap();
                let b = minimize(&aut, QuotientAlgo::Hopcroft, false).unwrap();
                assert_eq!(a.num_states(), b.num_states());
                for word in random_words(&['a', 'b', 'c'], 0, 6, 20) {
                    assert_eq!(eval(&a, &word).unwrap(), eval(&aut, &word).unwrap());
                    assert_eq!(eval(&b, &word).unwrap(), eval(&aut, &word).unwrap());
                }
            }
        }
    }

    #[test_log::test]
    fn words() {
        fastrand::seed(1);
        let word = random_word(&['a', 'b'], 2, 4);
        assert!((2..=4).contains(&word.len()));
        assert_eq!(random_words(&['a', 'b'], 1, 10, 20).len(), 20);
        assert!(random_word::<char>(&[], 1, 3).is_empty());
    }
}
