//! Weights of words, and the enumeration of the words an automaton accepts.
use std::collections::BTreeMap;

use tracing::trace;

use super::{accessible::trim, determinize::require_letters};
use crate::{
    automaton::{Automaton, StateId},
    labelset::LabelSet,
    weightset::WeightSet,
    Error, Result,
};

/// Words with their non zero weights, in shortlex order (shorter words first, words of the
/// same length in the order of the alphabet).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordSeries<A, V> {
    entries: Vec<(Vec<A>, V)>,
}

impl<A: PartialEq, V> WordSeries<A, V> {
    /// Number of words.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no word has a non zero weight.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The weight of `word`, if it belongs to the series.
    pub fn get(&self, word: &[A]) -> Option<&V> {
        self.entries
            .iter()
            .find(|(w, _)| w.as_slice() == word)
            .map(|(_, v)| v)
    }

    /// The words with their weights.
    pub fn iter(&self) -> impl Iterator<Item = (&[A], &V)> + '_ {
        self.entries.iter().map(|(w, v)| (w.as_slice(), v))
    }

    /// The words, in shortlex order.
    pub fn words(&self) -> impl Iterator<Item = &[A]> + '_ {
        self.entries.iter().map(|(w, _)| w.as_slice())
    }
}

type Vector<V> = BTreeMap<StateId, V>;

struct Evaluator<'a, L: LabelSet, W: WeightSet> {
    aut: &'a Automaton<L, W>,
}

impl<'a, L: LabelSet, W: WeightSet> Evaluator<'a, L, W> {
    fn initial(&self) -> Vector<W::Value> {
        self.aut.initials().map(|(s, w)| (s, w.clone())).collect()
    }

    fn step(&self, current: &Vector<W::Value>, letter: &L::Letter) -> Vector<W::Value> {
        let ws = self.aut.weightset();
        let label = self.aut.labelset().letter_label(letter);
        let mut next: Vector<W::Value> = BTreeMap::new();
        for (s, w) in current {
            for t in self.aut.out_on(*s, &label) {
                let contribution = ws.mul(w, self.aut.weight_of(t));
                next.entry(self.aut.dst_of(t))
                    .and_modify(|acc| *acc = ws.add(acc, &contribution))
                    .or_insert(contribution);
            }
        }
        next.retain(|_, w| !ws.is_zero(w));
        next
    }

    fn weight(&self, current: &Vector<W::Value>) -> W::Value {
        let ws = self.aut.weightset();
        current.iter().fold(ws.zero(), |acc, (s, w)| {
            ws.add(&acc, &ws.mul(w, &self.aut.final_weight(*s)))
        })
    }

    /// Visits the words whose vector is not zero, length by length, and collects those with
    /// a non zero weight until `enough` says to stop or `max_len` is exceeded.
    fn series(
        &self,
        max_len: Option<usize>,
        enough: impl Fn(usize) -> bool,
    ) -> WordSeries<L::Letter, W::Value> {
        let letters = self.aut.labelset().genset();
        let mut entries = vec![];
        let mut level: Vec<(Vec<L::Letter>, Vector<W::Value>)> = vec![(vec![], self.initial())];
        let mut len = 0;
        while !level.is_empty() {
            for (word, vector) in &level {
                let w = self.weight(vector);
                if !self.aut.weightset().is_zero(&w) {
                    entries.push((word.clone(), w));
                    if enough(entries.len()) {
                        return WordSeries { entries };
                    }
                }
            }
            if max_len.is_some_and(|max| len >= max) {
                break;
            }
            len += 1;
            trace!("{} words of length {len} to extend", level.len());
            level = level
                .iter()
                .flat_map(|(word, vector)| {
                    letters.iter().map(move |l| {
                        let mut longer = word.clone();
                        longer.push(l.clone());
                        (longer, self.step(vector, l))
                    })
                })
                .filter(|(_, vector)| !vector.is_empty())
                .collect();
        }
        WordSeries { entries }
    }
}

/// The weight of `word` in `aut`: the sum over all paths labeled by `word` of the product
/// of their weights. Every transition must be labeled by a letter.
pub fn eval<L: LabelSet, W: WeightSet>(aut: &Automaton<L, W>, word: &[L::Letter]) -> Result<W::Value> {
    require_letters(aut, "eval")?;
    let genset = aut.labelset().genset();
    if let Some(l) = word.iter().find(|l| !genset.contains(l)) {
        return Err(Error::invalid(format!("eval: {l:?} is not a letter")));
    }
    let evaluator = Evaluator { aut };
    let vector = word
        .iter()
        .fold(evaluator.initial(), |v, l| evaluator.step(&v, l));
    Ok(evaluator.weight(&vector))
}

/// [`eval`] on a word written as a string of `char` letters.
pub fn eval_str<L: LabelSet<Letter = char>, W: WeightSet>(aut: &Automaton<L, W>, word: &str) -> Result<W::Value> {
    eval(aut, &word.chars().collect::<Vec<_>>())
}

/// The `num` first words accepted by `aut` in shortlex order, with their weights. Fewer
/// words are returned if the automaton accepts fewer.
///
/// Like weighted determinization this may not terminate when weights of infinitely many
/// words cancel out.
pub fn shortest<L: LabelSet, W: WeightSet>(
    aut: &Automaton<L, W>,
    num: usize,
) -> Result<WordSeries<L::Letter, W::Value>> {
    require_letters(aut, "shortest")?;
    if num == 0 {
        return Ok(WordSeries { entries: vec![] });
    }
    let useful = trim(aut);
    Ok(Evaluator { aut: &useful }.series(None, |found| found >= num))
}

/// All words of length at most `max_len` accepted by `aut`, with their weights.
pub fn enumerate<L: LabelSet, W: WeightSet>(
    aut: &Automaton<L, W>,
    max_len: usize,
) -> Result<WordSeries<L::Letter, W::Value>> {
    require_letters(aut, "enumerate")?;
    let useful = trim(aut);
    Ok(Evaluator { aut: &useful }.series(Some(max_len), |_| false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        context::Context,
        labelset::{Letters, NullableLetters},
        tests::binary,
        weightset::{B, Z},
    };

    #[test_log::test]
    fn binary_numbers() {
        let aut = binary();
        assert_eq!(eval_str(&aut, "1101").unwrap(), 13);
        assert_eq!(eval_str(&aut, "0000").unwrap(), 0);
        assert_eq!(eval_str(&aut, "").unwrap(), 0);
        assert!(eval_str(&aut, "12").is_err());

        let first = shortest(&aut, 4).unwrap();
        assert_eq!(first.len(), 4);
        assert_eq!(first.get(&['1', '1']), Some(&3));
        assert_eq!(
            first.words().collect::<Vec<_>>(),
            vec![&['1'][..], &['0', '1'][..], &['1', '0'][..], &['1', '1'][..]]
        );

        let all = enumerate(&aut, 3).unwrap();
        assert_eq!(all.len(), 11);
        assert_eq!(all.get(&['1', '1', '1']), Some(&7));
        assert_eq!(all.get(&['0', '0', '0']), None);
    }

    #[test_log::test]
    fn finite_languages_run_out() {
        let mut aut = Automaton::new(Context::new(Letters::new("ab"), B));
        let [p, q] = [0, 1].map(|_| aut.add_state());
        aut.new_transition(p, q, 'a');
        aut.set_initial(p);
        aut.set_final(q);
        aut.set_final(p);
        let words = shortest(&aut, 10).unwrap();
        assert_eq!(words.len(), 2);
        assert_eq!(words.get(&[]), Some(&true));
        assert!(Evaluator { aut: &aut }.series(Some(0), |_| false).len() == 1);
        assert_eq!(shortest(&aut, 0).unwrap().len(), 0);
    }

    #[test_log::test]
    fn spontaneous_transitions_are_rejected() {
        let mut aut = Automaton::new(Context::new(NullableLetters::new("a"), Z));
        let [p, q] = [0, 1].map(|_| aut.add_state());
        aut.new_transition(p, q, None);
        assert!(matches!(
            eval_str(&aut, "a"),
            Err(Error::NotFree { operation: "eval", .. })
        ));
    }
}
