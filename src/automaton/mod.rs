//! The mutable weighted automaton.
//!
//! An [`Automaton`] owns its states and transitions and shares its [`Context`] with every
//! other automaton built over the same algebra. States and transitions live in slot vectors
//! indexed by [`StateId`] and [`TransitionId`], deleted entries leave a hole so identifiers
//! stay stable for the lifetime of the automaton. Initial and final weights play the role of
//! the transitions leaving the conceptual *pre* state and entering the conceptual *post*
//! state, a state without such a weight is simply not initial (resp. final).
use std::{collections::BTreeMap, sync::Arc};

use tracing::trace;

use crate::{
    context::Context,
    labelset::{LabelSet, PromoteLabel},
    math::Map,
    weightset::{Promote, WeightSet},
};

mod id;
pub use id::{StateId, TransitionId};

mod history;
pub use history::{History, Origin};

mod display;

/// A transition of an automaton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition<Label, Weight> {
    /// Source state.
    pub src: StateId,
    /// Destination state.
    pub dst: StateId,
    /// The label.
    pub label: Label,
    /// The weight, never zero.
    pub weight: Weight,
}

#[derive(Debug, Clone, Default)]
struct StateData {
    out: Vec<TransitionId>,
    inc: Vec<TransitionId>,
}

/// Label type of an automaton.
pub type LabelOf<L> = <L as LabelSet>::Label;
/// Weight type of an automaton.
pub type WeightOf<W> = <W as WeightSet>::Value;

/// A weighted automaton over the labelset `L` and the weightset `W`.
///
/// There is at most one transition per `(src, label, dst)` triple. Setting a transition that
/// already exists adds the new weight to the old one, and a transition whose weight becomes
/// zero is deleted.
#[derive(Debug, Clone)]
pub struct Automaton<L: LabelSet, W: WeightSet> {
    context: Arc<Context<L, W>>,
    states: Vec<Option<StateData>>,
    transitions: Vec<Option<Transition<L::Label, W::Value>>>,
    index: Map<(StateId, L::Label, StateId), TransitionId>,
    initials: BTreeMap<StateId, W::Value>,
    finals: BTreeMap<StateId, W::Value>,
    history: Option<Arc<History>>,
}

impl<L: LabelSet, W: WeightSet> Automaton<L, W> {
    /// Creates an empty automaton over the given context.
    pub fn new<C: Into<Arc<Context<L, W>>>>(context: C) -> Self {
        Self {
            context: context.into(),
            states: vec![],
            transitions: vec![],
            index: Map::default(),
            initials: BTreeMap::new(),
            finals: BTreeMap::new(),
            history: None,
        }
    }

    /// Creates an empty automaton over the context of `self`.
    pub fn new_like(&self) -> Self {
        Self::new(Arc::clone(&self.context))
    }

    /// The shared context.
    pub fn context(&self) -> &Arc<Context<L, W>> {
        &self.context
    }

    /// The labelset of the context.
    pub fn labelset(&self) -> &L {
        self.context.labelset()
    }

    /// The weightset of the context.
    pub fn weightset(&self) -> &W {
        self.context.weightset()
    }

    /* States */

    /// Adds a fresh state and returns its identifier.
    pub fn add_state(&mut self) -> StateId {
        let id = StateId(self.states.len());
        self.states.push(Some(StateData::default()));
        id
    }

    /// Adds `n` fresh states.
    pub fn add_states(&mut self, n: usize) -> Vec<StateId> {
        (0..n).map(|_| self.add_state()).collect()
    }

    /// Whether `s` is a live state of this automaton.
    pub fn has_state(&self, s: StateId) -> bool {
        matches!(self.states.get(s.index()), Some(Some(_)))
    }

    fn state(&self, s: StateId) -> &StateData {
        match self.states.get(s.index()) {
            Some(Some(data)) => data,
            _ => panic!("state {s:?} does not exist"),
        }
    }

    fn state_mut(&mut self, s: StateId) -> &mut StateData {
        match self.states.get_mut(s.index()) {
            Some(Some(data)) => data,
            _ => panic!("state {s:?} does not exist"),
        }
    }

    /// Deletes `s` together with all its transitions and its initial and final weights.
    ///
    /// # Panics
    /// If `s` does not exist.
    pub fn del_state(&mut self, s: StateId) {
        let data = self.state(s).clone();
        for t in data.out.into_iter().chain(data.inc) {
            if self.has_transition(t) {
                self.del_transition(t);
            }
        }
        self.initials.remove(&s);
        self.finals.remove(&s);
        self.states[s.index()] = None;
    }

    /// All live states, in increasing order.
    pub fn states(&self) -> impl Iterator<Item = StateId> + '_ {
        self.states
            .iter()
            .enumerate()
            .filter(|(_, data)| data.is_some())
            .map(|(i, _)| StateId(i))
    }

    /// Number of live states.
    pub fn num_states(&self) -> usize {
        self.states.iter().filter(|data| data.is_some()).count()
    }

    /// One more than the largest state identifier ever handed out.
    pub fn state_bound(&self) -> usize {
        self.states.len()
    }

    /* Transitions */

    /// Whether `t` is a live transition.
    pub fn has_transition(&self, t: TransitionId) -> bool {
        matches!(self.transitions.get(t.index()), Some(Some(_)))
    }

    /// The transition `t`.
    ///
    /// # Panics
    /// If `t` does not exist.
    pub fn transition(&self, t: TransitionId) -> &Transition<L::Label, W::Value> {
        match self.transitions.get(t.index()) {
            Some(Some(tr)) => tr,
            _ => panic!("transition {t:?} does not exist"),
        }
    }

    fn transition_mut(&mut self, t: TransitionId) -> &mut Transition<L::Label, W::Value> {
        match self.transitions.get_mut(t.index()) {
            Some(Some(tr)) => tr,
            _ => panic!("transition {t:?} does not exist"),
        }
    }

    /// Source of `t`.
    pub fn src_of(&self, t: TransitionId) -> StateId {
        self.transition(t).src
    }

    /// Destination of `t`.
    pub fn dst_of(&self, t: TransitionId) -> StateId {
        self.transition(t).dst
    }

    /// Label of `t`.
    pub fn label_of(&self, t: TransitionId) -> &L::Label {
        &self.transition(t).label
    }

    /// Weight of `t`.
    pub fn weight_of(&self, t: TransitionId) -> &W::Value {
        &self.transition(t).weight
    }

    /// Looks up the transition with the given key.
    pub fn get_transition(&self, src: StateId, label: &L::Label, dst: StateId) -> Option<TransitionId> {
        self.index.get(&(src, label.clone(), dst)).copied()
    }

    /// Adds `weight` to the transition `(src, label, dst)`, creating it if needed. Returns
    /// the transition, or `None` if the resulting weight is zero and the transition was
    /// removed.
    pub fn set_transition(
        &mut self,
        src: StateId,
        dst: StateId,
        label: L::Label,
        weight: W::Value,
    ) -> Option<TransitionId> {
        self.state(src);
        self.state(dst);
        debug_assert!(
            self.labelset().is_valid(&label),
            "label {label:?} does not belong to the labelset"
        );
        if let Some(t) = self.get_transition(src, &label, dst) {
            let merged = self.weightset().add(self.weight_of(t), &weight);
            return self.set_weight(t, merged);
        }
        if self.weightset().is_zero(&weight) {
            return None;
        }
        let t = TransitionId(self.transitions.len());
        self.transitions.push(Some(Transition {
            src,
            dst,
            label: label.clone(),
            weight,
        }));
        self.index.insert((src, label, dst), t);
        self.state_mut(src).out.push(t);
        self.state_mut(dst).inc.push(t);
        Some(t)
    }

    /// Adds the transition `(src, label, dst)` with weight one.
    pub fn new_transition(&mut self, src: StateId, dst: StateId, label: L::Label) -> Option<TransitionId> {
        let one = self.weightset().one();
        self.set_transition(src, dst, label, one)
    }

    /// Overwrites the weight of `t`, deleting it if `weight` is zero.
    pub fn set_weight(&mut self, t: TransitionId, weight: W::Value) -> Option<TransitionId> {
        if self.weightset().is_zero(&weight) {
            self.del_transition(t);
            None
        } else {
            self.transition_mut(t).weight = weight;
            Some(t)
        }
    }

    /// Multiplies the weight of `t` by `w` on the left.
    pub fn lmul_weight(&mut self, t: TransitionId, w: &W::Value) -> Option<TransitionId> {
        let weight = self.weightset().mul(w, self.weight_of(t));
        self.set_weight(t, weight)
    }

    /// Multiplies the weight of `t` by `w` on the right.
    pub fn rmul_weight(&mut self, t: TransitionId, w: &W::Value) -> Option<TransitionId> {
        let weight = self.weightset().mul(self.weight_of(t), w);
        self.set_weight(t, weight)
    }

    /// Deletes `t`.
    ///
    /// # Panics
    /// If `t` does not exist.
    pub fn del_transition(&mut self, t: TransitionId) {
        let Transition { src, dst, label, .. } = self.transition(t).clone();
        self.index.remove(&(src, label, dst));
        self.state_mut(src).out.retain(|u| *u != t);
        self.state_mut(dst).inc.retain(|u| *u != t);
        self.transitions[t.index()] = None;
    }

    /// All live transitions, in creation order.
    pub fn transitions(&self) -> impl Iterator<Item = TransitionId> + '_ {
        self.transitions
            .iter()
            .enumerate()
            .filter(|(_, tr)| tr.is_some())
            .map(|(i, _)| TransitionId(i))
    }

    /// Number of live transitions.
    pub fn num_transitions(&self) -> usize {
        self.index.len()
    }

    /// The transitions leaving `s`.
    pub fn out(&self, s: StateId) -> impl Iterator<Item = TransitionId> + '_ {
        self.state(s).out.iter().copied()
    }

    /// The transitions entering `s`.
    pub fn incoming(&self, s: StateId) -> impl Iterator<Item = TransitionId> + '_ {
        self.state(s).inc.iter().copied()
    }

    /// The transitions leaving `s` with label `label`.
    pub fn out_on<'a>(&'a self, s: StateId, label: &'a L::Label) -> impl Iterator<Item = TransitionId> + 'a {
        self.out(s).filter(move |t| self.label_of(*t) == label)
    }

    /// The successors of `s`, with repetitions.
    pub fn successors(&self, s: StateId) -> impl Iterator<Item = StateId> + '_ {
        self.out(s).map(|t| self.dst_of(t))
    }

    /// The predecessors of `s`, with repetitions.
    pub fn predecessors(&self, s: StateId) -> impl Iterator<Item = StateId> + '_ {
        self.incoming(s).map(|t| self.src_of(t))
    }

    /* Initial and final weights */

    /// Makes `s` initial with weight one.
    pub fn set_initial(&mut self, s: StateId) {
        let one = self.weightset().one();
        self.set_initial_weight(s, one);
    }

    /// Overwrites the initial weight of `s`, zero makes it non initial.
    pub fn set_initial_weight(&mut self, s: StateId, w: W::Value) {
        self.state(s);
        if self.weightset().is_zero(&w) {
            self.initials.remove(&s);
        } else {
            self.initials.insert(s, w);
        }
    }

    /// Adds `w` to the initial weight of `s`.
    pub fn add_initial_weight(&mut self, s: StateId, w: &W::Value) {
        let sum = self.weightset().add(&self.initial_weight(s), w);
        self.set_initial_weight(s, sum);
    }

    /// Makes `s` non initial.
    pub fn unset_initial(&mut self, s: StateId) {
        self.initials.remove(&s);
    }

    /// The initial weight of `s`, zero if it is not initial.
    pub fn initial_weight(&self, s: StateId) -> W::Value {
        self.initials
            .get(&s)
            .cloned()
            .unwrap_or_else(|| self.weightset().zero())
    }

    /// Whether `s` has a non zero initial weight.
    pub fn is_initial(&self, s: StateId) -> bool {
        self.initials.contains_key(&s)
    }

    /// The initial states in increasing order.
    pub fn initial_states(&self) -> impl Iterator<Item = StateId> + '_ {
        self.initials.keys().copied()
    }

    /// The initial states with their weights.
    pub fn initials(&self) -> impl Iterator<Item = (StateId, &W::Value)> + '_ {
        self.initials.iter().map(|(s, w)| (*s, w))
    }

    /// Makes `s` final with weight one.
    pub fn set_final(&mut self, s: StateId) {
        let one = self.weightset().one();
        self.set_final_weight(s, one);
    }

    /// Overwrites the final weight of `s`, zero makes it non final.
    pub fn set_final_weight(&mut self, s: StateId, w: W::Value) {
        self.state(s);
        if self.weightset().is_zero(&w) {
            self.finals.remove(&s);
        } else {
            self.finals.insert(s, w);
        }
    }

    /// Adds `w` to the final weight of `s`.
    pub fn add_final_weight(&mut self, s: StateId, w: &W::Value) {
        let sum = self.weightset().add(&self.final_weight(s), w);
        self.set_final_weight(s, sum);
    }

    /// Makes `s` non final.
    pub fn unset_final(&mut self, s: StateId) {
        self.finals.remove(&s);
    }

    /// The final weight of `s`, zero if it is not final.
    pub fn final_weight(&self, s: StateId) -> W::Value {
        self.finals
            .get(&s)
            .cloned()
            .unwrap_or_else(|| self.weightset().zero())
    }

    /// Whether `s` has a non zero final weight.
    pub fn is_final(&self, s: StateId) -> bool {
        self.finals.contains_key(&s)
    }

    /// The final states in increasing order.
    pub fn final_states(&self) -> impl Iterator<Item = StateId> + '_ {
        self.finals.keys().copied()
    }

    /// The final states with their weights.
    pub fn finals(&self) -> impl Iterator<Item = (StateId, &W::Value)> + '_ {
        self.finals.iter().map(|(s, w)| (*s, w))
    }

    /* History */

    /// The provenance of the states, if recorded.
    pub fn history(&self) -> Option<&Arc<History>> {
        self.history.as_ref()
    }

    /// Attaches a provenance map.
    pub fn set_history(&mut self, history: Option<History>) {
        self.history = history.map(Arc::new);
    }

    /// Shares the provenance map of another automaton.
    pub fn share_history(&mut self, history: Option<Arc<History>>) {
        self.history = history;
    }

    /// The recorded origin of `s`.
    pub fn origin_of(&self, s: StateId) -> Option<&Origin> {
        self.history.as_ref()?.origin_of(s)
    }

    /* Whole automaton */

    /// Copies the automaton, renumbering states compactly in increasing order. With
    /// `keep_history`, every state of the copy records the state it is a copy of.
    pub fn copy(&self, keep_history: bool) -> Self {
        self.copy_with_map(keep_history).0
    }

    /// Like [`Automaton::copy`], but also returns the map from old to new states.
    pub fn copy_with_map(&self, keep_history: bool) -> (Self, Map<StateId, StateId>) {
        let mut res = self.new_like();
        let map: Map<StateId, StateId> = self.states().map(|s| (s, res.add_state())).collect();
        for t in self.transitions() {
            let tr = self.transition(t);
            res.set_transition(map[&tr.src], map[&tr.dst], tr.label.clone(), tr.weight.clone());
        }
        for (s, w) in self.initials() {
            res.set_initial_weight(map[&s], w.clone());
        }
        for (s, w) in self.finals() {
            res.set_final_weight(map[&s], w.clone());
        }
        if keep_history {
            res.set_history(Some(
                map.iter().map(|(old, new)| (*new, Origin::State(*old))).collect(),
            ));
        }
        (res, map)
    }

    /// Mirrors the automaton in place: transitions are reversed and their labels transposed,
    /// initial and final weights are exchanged. State identifiers are kept.
    pub fn transpose_here(&mut self) {
        let ctx = Arc::clone(&self.context);
        self.index.clear();
        for (i, slot) in self.transitions.iter_mut().enumerate() {
            if let Some(tr) = slot {
                std::mem::swap(&mut tr.src, &mut tr.dst);
                tr.label = ctx.labelset().transpose(&tr.label);
                self.index
                    .insert((tr.src, tr.label.clone(), tr.dst), TransitionId(i));
            }
        }
        for data in self.states.iter_mut().flatten() {
            std::mem::swap(&mut data.out, &mut data.inc);
        }
        std::mem::swap(&mut self.initials, &mut self.finals);
        trace!("transposed automaton with {} states", self.num_states());
    }

    /// The mirror image of the automaton, see [`Automaton::transpose_here`].
    pub fn transpose(&self) -> Self {
        let mut res = self.clone();
        res.transpose_here();
        res
    }

    /// Embeds the automaton into a larger context, e.g. the result of a context join.
    pub fn promote<L2, W2>(&self, context: Arc<Context<L2, W2>>) -> Automaton<L2, W2>
    where
        L2: PromoteLabel<L>,
        W2: Promote<W>,
    {
        let mut res = Automaton::new(context);
        let map: Map<StateId, StateId> = self.states().map(|s| (s, res.add_state())).collect();
        let (ls, ws) = (self.labelset(), self.weightset());
        for t in self.transitions() {
            let tr = self.transition(t);
            let label = res.labelset().promote_label(ls, &tr.label);
            let weight = res.weightset().promote(ws, &tr.weight);
            res.set_transition(map[&tr.src], map[&tr.dst], label, weight);
        }
        for (s, w) in self.initials() {
            let w = res.weightset().promote(ws, w);
            res.set_initial_weight(map[&s], w);
        }
        for (s, w) in self.finals() {
            let w = res.weightset().promote(ws, w);
            res.set_final_weight(map[&s], w);
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        context::Join,
        labelset::{Letters, NullableLetters},
        weightset::{Fraction, B, Q, Z},
    };

    fn ab_z() -> Automaton<Letters, Z> {
        Automaton::new(Context::new(Letters::new("ab"), Z))
    }

    #[test_log::test]
    fn transitions_merge_on_insert() {
        let mut aut = ab_z();
        let [p, q] = [aut.add_state(), aut.add_state()];
        let t = aut.set_transition(p, q, 'a', 2).unwrap();
        assert_eq!(aut.set_transition(p, q, 'a', 3), Some(t));
        assert_eq!(*aut.weight_of(t), 5);
        assert_eq!(aut.num_transitions(), 1);
        assert_eq!(aut.set_transition(p, q, 'a', -5), None);
        assert_eq!(aut.num_transitions(), 0);
        assert_eq!(aut.get_transition(p, &'a', q), None);
        assert_eq!(aut.set_transition(p, q, 'b', 0), None);
        assert_eq!(aut.out(p).count(), 0);
    }

    #[test_log::test]
    fn deleting_a_state_removes_incident_transitions() {
        let mut aut = ab_z();
        let states = aut.add_states(3);
        aut.new_transition(states[0], states[1], 'a');
        aut.new_transition(states[1], states[2], 'b');
        aut.new_transition(states[1], states[1], 'a');
        aut.set_initial(states[1]);
        aut.del_state(states[1]);
        assert_eq!(aut.num_states(), 2);
        assert_eq!(aut.num_transitions(), 0);
        assert_eq!(aut.initial_states().count(), 0);
        assert!(!aut.has_state(states[1]));
        assert_eq!(aut.states().collect::<Vec<_>>(), vec![states[0], states[2]]);
        assert_eq!(aut.add_state(), StateId(3));
    }

    #[test_log::test]
    #[should_panic(expected = "does not exist")]
    fn deleted_states_cannot_be_used() {
        let mut aut = ab_z();
        let p = aut.add_state();
        aut.del_state(p);
        aut.set_final(p);
    }

    #[test_log::test]
    fn initial_and_final_weights() {
        let mut aut = ab_z();
        let p = aut.add_state();
        aut.set_initial(p);
        aut.add_initial_weight(p, &2);
        assert_eq!(aut.initial_weight(p), 3);
        aut.set_final_weight(p, 4);
        assert!(aut.is_final(p));
        aut.add_final_weight(p, &-4);
        assert!(!aut.is_final(p));
        assert_eq!(aut.final_weight(p), 0);
    }

    #[test_log::test]
    fn copies_are_compact_and_remember_their_origin() {
        let mut aut = ab_z();
        let states = aut.add_states(3);
        aut.del_state(states[0]);
        aut.set_transition(states[1], states[2], 'a', 7);
        aut.set_initial(states[1]);
        let copy = aut.copy(true);
        assert_eq!(copy.states().collect::<Vec<_>>(), vec![StateId(0), StateId(1)]);
        assert_eq!(copy.origin_of(StateId(0)), Some(&Origin::State(states[1])));
        let t = copy.transitions().next().unwrap();
        assert_eq!(*copy.weight_of(t), 7);
        assert!(copy.is_initial(StateId(0)));
    }

    #[test_log::test]
    fn transposition_swaps_everything() {
        let mut aut = ab_z();
        let [p, q] = [aut.add_state(), aut.add_state()];
        aut.set_transition(p, q, 'a', 2);
        aut.set_initial(p);
        aut.set_final_weight(q, 3);
        let t = aut.transpose();
        assert_eq!(t.initial_weight(q), 3);
        assert!(t.is_final(p));
        let tr = t.get_transition(q, &'a', p).unwrap();
        assert_eq!(*t.weight_of(tr), 2);
        assert_eq!(t.out(q).count(), 1);
        assert_eq!(t.incoming(q).count(), 0);
    }

    #[test_log::test]
    fn promotion_into_a_joined_context() {
        let mut aut = Automaton::new(Context::new(Letters::new("a"), B));
        let p = aut.add_state();
        aut.new_transition(p, p, 'a');
        aut.set_final(p);
        let target = Context::new(Letters::new("a"), B).join(&Context::new(NullableLetters::new("b"), Q));
        let promoted = aut.promote(Arc::new(target));
        let t = promoted.transitions().next().unwrap();
        assert_eq!(*promoted.label_of(t), Some('a'));
        assert_eq!(*promoted.weight_of(t), Fraction::from(1));
        assert_eq!(promoted.final_weight(p), Fraction::from(1));
    }
}
