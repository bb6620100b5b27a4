//! Strongly connected components, computed with Tarjan's algorithm.
//!
//! Components are returned in the order Tarjan's algorithm completes them, which is a
//! reverse topological order of the condensation: every component only has transitions to
//! components that come before it. Roots are tried in increasing state order and successors
//! in the order of the outgoing transitions, so the recursive and the iterative variant
//! return exactly the same list.
use std::collections::BTreeSet;

use bit_set::BitSet;
use tracing::debug;

use crate::{
    automaton::{Automaton, History, Origin, StateId},
    labelset::LabelSet,
    math::Map,
    weightset::WeightSet,
};

/// The strongly connected components of an automaton.
pub type Components = Vec<BTreeSet<StateId>>;

struct Tarjan<'a, L: LabelSet, W: WeightSet> {
    aut: &'a Automaton<L, W>,
    index: Vec<Option<usize>>,
    low: Vec<usize>,
    on_stack: BitSet,
    stack: Vec<StateId>,
    next: usize,
    components: Components,
}

impl<'a, L: LabelSet, W: WeightSet> Tarjan<'a, L, W> {
    fn new(aut: &'a Automaton<L, W>) -> Self {
        let n = aut.state_bound();
        Self {
            aut,
            index: vec![None; n],
            low: vec![0; n],
            on_stack: BitSet::with_capacity(n),
            stack: vec![],
            next: 0,
            components: vec![],
        }
    }

    fn discover(&mut self, v: StateId) {
        self.index[v.index()] = Some(self.next);
        self.low[v.index()] = self.next;
        self.next += 1;
        self.stack.push(v);
        self.on_stack.insert(v.index());
    }

    fn close(&mut self, v: StateId) {
        if Some(self.low[v.index()]) != self.index[v.index()] {
            return;
        }
        let mut component = BTreeSet::new();
        while let Some(w) = self.stack.pop() {
            self.on_stack.remove(w.index());
            component.insert(w);
            if w == v {
                break;
            }
        }
        self.components.push(component);
    }

    fn visit_recursive(&mut self, v: StateId) {
        self.discover(v);
        let aut = self.aut;
        for w in aut.successors(v) {
            match self.index[w.index()] {
                None => {
                    self.visit_recursive(w);
                    self.low[v.index()] = self.low[v.index()].min(self.low[w.index()]);
                }
                Some(iw) if self.on_stack.contains(w.index()) => {
                    self.low[v.index()] = self.low[v.index()].min(iw);
                }
                Some(_) => {}
            }
        }
        self.close(v);
    }

    fn visit_iterative(&mut self, root: StateId) {
        let aut = self.aut;
        self.discover(root);
        let mut frames: Vec<(StateId, Vec<StateId>, usize)> =
            vec![(root, aut.successors(root).collect(), 0)];
        while let Some((v, succs, pos)) = frames.last_mut() {
            let v = *v;
            if let Some(&w) = succs.get(*pos) {
                *pos += 1;
                match self.index[w.index()] {
                    None => {
                        self.discover(w);
                        frames.push((w, aut.successors(w).collect(), 0));
                    }
                    Some(iw) if self.on_stack.contains(w.index()) => {
                        self.low[v.index()] = self.low[v.index()].min(iw);
                    }
                    Some(_) => {}
                }
            } else {
                frames.pop();
                self.close(v);
                if let Some((parent, _, _)) = frames.last() {
                    let p = parent.index();
                    self.low[p] = self.low[p].min(self.low[v.index()]);
                }
            }
        }
    }
}

/// Strongly connected components, computed by a recursive depth first search.
pub fn scc_recursive<L: LabelSet, W: WeightSet>(aut: &Automaton<L, W>) -> Components {
    let mut tarjan = Tarjan::new(aut);
    for s in aut.states() {
        if tarjan.index[s.index()].is_none() {
            tarjan.visit_recursive(s);
        }
    }
    debug!("found {} components", tarjan.components.len());
    tarjan.components
}

/// Strongly connected components, computed with an explicit stack. Same result as
/// [`scc_recursive`], but safe for automata with very long paths.
pub fn scc<L: LabelSet, W: WeightSet>(aut: &Automaton<L, W>) -> Components {
    let mut tarjan = Tarjan::new(aut);
    for s in aut.states() {
        if tarjan.index[s.index()].is_none() {
            tarjan.visit_iterative(s);
        }
    }
    debug!("found {} components", tarjan.components.len());
    tarjan.components
}

/// Number of strongly connected components.
pub fn num_sccs<L: LabelSet, W: WeightSet>(aut: &Automaton<L, W>) -> usize {
    scc(aut).len()
}

/// The strongly connected component containing `s`.
pub fn scc_of<L: LabelSet, W: WeightSet>(aut: &Automaton<L, W>, s: StateId) -> BTreeSet<StateId> {
    scc(aut)
        .into_iter()
        .find(|c| c.contains(&s))
        .unwrap_or_default()
}

/// Collapses every strongly connected component to a single state. Transitions between
/// different components are kept (merged where they coincide), transitions inside a
/// component are dropped. Initial and final weights of the members are summed up.
pub fn condensation<L: LabelSet, W: WeightSet>(aut: &Automaton<L, W>, keep_history: bool) -> Automaton<L, W> {
    let components = scc(aut);
    let mut res = aut.new_like();
    let mut component_of: Map<StateId, StateId> = Map::default();
    let mut history = History::new();
    for component in components.iter().rev() {
        let q = res.add_state();
        for s in component {
            component_of.insert(*s, q);
        }
        history.add(q, Origin::Set(component.clone()));
    }
    for t in aut.transitions() {
        let tr = aut.transition(t);
        let (src, dst) = (component_of[&tr.src], component_of[&tr.dst]);
        if src != dst {
            res.set_transition(src, dst, tr.label.clone(), tr.weight.clone());
        }
    }
    for (s, w) in aut.initials() {
        res.add_initial_weight(component_of[&s], w);
    }
    for (s, w) in aut.finals() {
        res.add_final_weight(component_of[&s], w);
    }
    if keep_history {
        res.set_history(Some(history));
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{context::Context, labelset::Letters, weightset::B};

    fn two_cycles() -> Automaton<Letters, B> {
        let mut aut = Automaton::new(Context::new(Letters::new("ab"), B));
        let s = aut.add_states(5);
        aut.new_transition(s[0], s[1], 'a');
        aut.new_transition(s[1], s[0], 'b');
        aut.new_transition(s[1], s[2], 'a');
        aut.new_transition(s[2], s[3], 'a');
        aut.new_transition(s[3], s[2], 'b');
        aut.new_transition(s[3], s[4], 'b');
        aut.set_initial(s[0]);
        aut.set_final(s[4]);
        aut
    }

    #[test_log::test]
    fn both_variants_agree() {
        let aut = two_cycles();
        let components = scc(&aut);
        assert_eq!(components, scc_recursive(&aut));
        assert_eq!(
            components,
            vec![
                BTreeSet::from([StateId(4)]),
                BTreeSet::from([StateId(2), StateId(3)]),
                BTreeSet::from([StateId(0), StateId(1)]),
            ]
        );
        assert_eq!(scc_of(&aut, StateId(3)).len(), 2);
    }

    #[test_log::test]
    fn condensation_is_acyclic() {
        let aut = two_cycles();
        let condensed = condensation(&aut, true);
        assert_eq!(condensed.num_states(), 3);
        assert_eq!(condensed.num_transitions(), 2);
        assert_eq!(num_sccs(&condensed), 3);
        assert!(condensed.is_initial(StateId(0)));
        assert!(condensed.is_final(StateId(2)));
        assert_eq!(
            condensed.origin_of(StateId(1)),
            Some(&Origin::Set(BTreeSet::from([StateId(2), StateId(3)])))
        );
    }
}
