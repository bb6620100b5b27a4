//! Removal of spontaneous transitions.
//!
//! The backward removal processes, one after the other, the states that have incoming
//! spontaneous transitions. For such a state `s`, a spontaneous loop of weight `w` is
//! replaced by multiplying everything that leaves `s` by `w*`, and every spontaneous
//! transition `p --k--> s` is replaced by copies `p --k·h--> q` of the transitions
//! `s --h--> q` leaving `s` (final weights included). States are processed in the order of
//! a priority queue keyed by their number of outgoing spontaneous transitions, outgoing
//! transitions and incoming spontaneous transitions, which keeps the number of created
//! transitions small.
use std::{cmp::Reverse, collections::BinaryHeap};

use bit_set::BitSet;
use tracing::{debug, trace};

use crate::{
    automaton::{Automaton, StateId, TransitionId},
    labelset::LabelSet,
    math::{Map, Set},
    options::{Direction, Options},
    weightset::{StarStatus, Starable, WeightSet},
    Error, Result,
};

fn is_spontaneous<L: LabelSet, W: WeightSet>(aut: &Automaton<L, W>, t: TransitionId) -> bool {
    aut.labelset().is_one(aut.label_of(t))
}

/// Whether the automaton has no spontaneous transition.
pub fn is_proper<L: LabelSet, W: WeightSet>(aut: &Automaton<L, W>) -> bool {
    aut.transitions().all(|t| !is_spontaneous(aut, t))
}

/// Whether the subgraph of spontaneous transitions has no cycle, loops included.
pub fn is_eps_acyclic<L: LabelSet, W: WeightSet>(aut: &Automaton<L, W>) -> bool {
    let mut done = BitSet::with_capacity(aut.state_bound());
    let mut active = BitSet::with_capacity(aut.state_bound());
    for root in aut.states() {
        if done.contains(root.index()) {
            continue;
        }
        let spontaneous_successors = |s: StateId| -> Vec<StateId> {
            aut.out(s)
                .filter(|t| is_spontaneous(aut, *t))
                .map(|t| aut.dst_of(t))
                .collect()
        };
        active.insert(root.index());
        let mut frames = vec![(root, spontaneous_successors(root), 0usize)];
        while let Some((s, succs, pos)) = frames.last_mut() {
            let s = *s;
            if let Some(&d) = succs.get(*pos) {
                *pos += 1;
                if active.contains(d.index()) {
                    return false;
                }
                if !done.contains(d.index()) {
                    active.insert(d.index());
                    frames.push((d, spontaneous_successors(d), 0));
                }
            } else {
                frames.pop();
                active.remove(s.index());
                done.insert(s.index());
            }
        }
    }
    true
}

type Profile = (usize, usize, usize);

struct Properer<'a, L: LabelSet, W: Starable> {
    aut: &'a mut Automaton<L, W>,
    prune: bool,
    todo: BinaryHeap<Reverse<(Profile, StateId)>>,
    tickets: Map<StateId, Profile>,
}

impl<'a, L: LabelSet, W: Starable> Properer<'a, L, W> {
    fn new(aut: &'a mut Automaton<L, W>, prune: bool) -> Self {
        Self {
            aut,
            prune,
            todo: BinaryHeap::new(),
            tickets: Map::default(),
        }
    }

    fn profile(&self, s: StateId) -> Profile {
        let aut = &*self.aut;
        let out_eps = aut.out(s).filter(|t| is_spontaneous(aut, *t)).count();
        let out = aut.out(s).count() + usize::from(aut.is_final(s));
        let in_eps = aut.incoming(s).filter(|t| is_spontaneous(aut, *t)).count();
        (out_eps, out, in_eps)
    }

    fn build_heap(&mut self) {
        let states: Vec<StateId> = self.aut.states().collect();
        for s in states {
            let profile = self.profile(s);
            if profile.2 > 0 {
                self.tickets.insert(s, profile);
                self.todo.push(Reverse((profile, s)));
            }
        }
    }

    fn update(&mut self, s: StateId) {
        if self.tickets.contains_key(&s) && self.aut.has_state(s) {
            let profile = self.profile(s);
            self.tickets.insert(s, profile);
            self.todo.push(Reverse((profile, s)));
        }
    }

    fn pop(&mut self) -> Option<StateId> {
        while let Some(Reverse((profile, s))) = self.todo.pop() {
            if self.tickets.get(&s) == Some(&profile) {
                self.tickets.remove(&s);
                return Some(s);
            }
        }
        None
    }

    fn remove_incoming_spontaneous(&mut self, s: StateId) -> Result<()> {
        let ws = self.aut.weightset().clone();
        let spontaneous: Vec<_> = self
            .aut
            .incoming(s)
            .filter(|t| is_spontaneous(self.aut, *t))
            .collect();
        let mut star = ws.one();
        let mut closure = vec![];
        for t in spontaneous {
            let (src, weight) = (self.aut.src_of(t), self.aut.weight_of(t).clone());
            if src == s {
                star = ws.star(&weight)?;
            } else {
                closure.push((src, weight));
            }
            self.aut.del_transition(t);
        }
        let outgoing: Vec<_> = self.aut.out(s).collect();
        for t in &outgoing {
            let blow = ws.mul(&star, self.aut.weight_of(*t));
            let (label, dst) = (self.aut.label_of(*t).clone(), self.aut.dst_of(*t));
            self.aut.set_weight(*t, blow.clone());
            for (src, w) in &closure {
                self.aut.set_transition(*src, dst, label.clone(), ws.mul(w, &blow));
            }
        }
        if self.aut.is_final(s) {
            let blow = ws.mul(&star, &self.aut.final_weight(s));
            self.aut.set_final_weight(s, blow.clone());
            for (src, w) in &closure {
                self.aut.add_final_weight(*src, &ws.mul(w, &blow));
            }
        }
        trace!(
            "eliminated spontaneous transitions into {s:?}: {} removed, {} added",
            closure.len(),
            closure.len() * outgoing.len()
        );
        if self.prune && self.aut.incoming(s).next().is_none() && !self.aut.is_initial(s) {
            self.aut.del_state(s);
        }
        Ok(())
    }

    fn run(mut self) -> Result<()> {
        self.build_heap();
        while let Some(s) = self.pop() {
            let neighbors: Set<StateId> = self
                .aut
                .predecessors(s)
                .chain(self.aut.successors(s))
                .filter(|n| *n != s)
                .collect();
            self.remove_incoming_spontaneous(s)?;
            for n in neighbors {
                self.update(n);
            }
        }
        Ok(())
    }
}

fn absval<L: LabelSet, W: WeightSet>(aut: &Automaton<L, W>) -> Automaton<L, W> {
    let mut res = aut.clone();
    let transitions: Vec<_> = res.transitions().collect();
    for t in transitions {
        let w = res.weightset().abs(res.weight_of(t));
        res.set_weight(t, w);
    }
    res
}

fn is_properable<L: LabelSet, W: Starable>(mut aut: Automaton<L, W>) -> bool {
    Properer::new(&mut aut, false).run().is_ok()
}

/// Whether the weights of all paths with the same label sum up to a well defined weight,
/// which is exactly when the spontaneous transitions can be removed.
pub fn is_valid<L: LabelSet, W: Starable>(aut: &Automaton<L, W>) -> bool {
    if is_proper(aut) {
        return true;
    }
    match aut.weightset().star_status() {
        StarStatus::Starable => true,
        StarStatus::NonStarable => is_eps_acyclic(aut),
        StarStatus::Tops => is_eps_acyclic(aut) || is_properable(aut.clone()),
        StarStatus::AbsVal => is_eps_acyclic(aut) || is_properable(absval(aut)),
    }
}

fn invalid(reason: impl std::fmt::Display) -> Error {
    Error::InvalidAutomaton {
        reason: reason.to_string(),
    }
}

fn backward_here<L: LabelSet, W: Starable>(aut: &mut Automaton<L, W>, prune: bool) -> Result<()> {
    if is_proper(aut) {
        return Ok(());
    }
    match aut.weightset().star_status() {
        StarStatus::Starable => {}
        StarStatus::NonStarable | StarStatus::AbsVal => {
            if !is_valid(aut) {
                return Err(invalid("the spontaneous transitions have no well defined weight"));
            }
        }
        StarStatus::Tops => {
            let mut work = aut.clone();
            Properer::new(&mut work, prune).run().map_err(invalid)?;
            *aut = work;
            return Ok(());
        }
    }
    Properer::new(aut, prune).run().map_err(invalid)?;
    debug!("removed spontaneous transitions, {} states left", aut.num_states());
    Ok(())
}

/// Removes the spontaneous transitions of `aut` in place. With `prune`, states that lose
/// all their incoming transitions (and are not initial) are deleted.
///
/// Fails with [`Error::InvalidAutomaton`] if the automaton is not valid, see [`is_valid`];
/// `aut` is left untouched in that case.
pub fn proper_here<L: LabelSet, W: Starable>(
    aut: &mut Automaton<L, W>,
    direction: Direction,
    prune: bool,
) -> Result<()> {
    match direction {
        Direction::Backward => backward_here(aut, prune),
        Direction::Forward => {
            aut.transpose_here();
            let res = backward_here(aut, prune);
            aut.transpose_here();
            res
        }
    }
}

/// A copy of `aut` without spontaneous transitions, see [`proper_here`].
pub fn proper<L: LabelSet, W: Starable>(
    aut: &Automaton<L, W>,
    direction: Direction,
    prune: bool,
    keep_history: bool,
) -> Result<Automaton<L, W>> {
    let mut res = aut.copy(keep_history);
    proper_here(&mut res, direction, prune)?;
    Ok(res)
}

/// Removes the spontaneous transitions, configured by `options`: `direction`, `prune`,
/// `keep_history` and `in_place` are honored. Returns `None` when working in place.
pub fn proper_with<L: LabelSet, W: Starable>(
    aut: &mut Automaton<L, W>,
    options: &Options,
) -> Result<Option<Automaton<L, W>>> {
    if options.in_place {
        proper_here(aut, options.direction, options.prune)?;
        Ok(None)
    } else {
        proper(aut, options.direction, options.prune, options.keep_history).map(Some)
    }
}
