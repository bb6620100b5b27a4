use itertools::Itertools;
use owo_colors::OwoColorize;

use super::{Automaton, StateId};
use crate::{labelset::LabelSet, weightset::WeightSet, Show};

impl Show for StateId {
    fn show(&self) -> String {
        format!("{self:?}")
    }
}

impl<L: LabelSet, W: WeightSet> Automaton<L, W> {
    fn show_weighted(&self, w: &W::Value, what: String) -> String {
        if self.weightset().is_one(w) {
            what
        } else {
            format!("<{}>{what}", self.weightset().print(w))
        }
    }

    /// Returns a transition table with one row per state. Initial states are printed in
    /// bold, final states are underlined, the origin recorded in the history (if any) is
    /// printed next to the state.
    pub fn build_transition_table(&self) -> String {
        let mut builder = tabled::builder::Builder::default();
        builder.push_record(["State", "Initial", "Final", "Transitions"]);
        for q in self.states() {
            let mut name = q.show();
            if let Some(origin) = self.origin_of(q) {
                name = format!("{name} {}", origin.to_string().dimmed());
            }
            if self.is_initial(q) {
                name = name.bold().to_string();
            }
            if self.is_final(q) {
                name = name.underline().to_string();
            }
            let initial = if self.is_initial(q) {
                self.weightset().print(&self.initial_weight(q))
            } else {
                "-".to_string()
            };
            let fin = if self.is_final(q) {
                self.weightset().print(&self.final_weight(q))
            } else {
                "-".to_string()
            };
            let transitions = self
                .out(q)
                .map(|t| {
                    let tr = self.transition(t);
                    self.show_weighted(
                        &tr.weight,
                        format!("{} → {}", self.labelset().print(&tr.label), tr.dst.show().blue()),
                    )
                })
                .join(", ");
            builder.push_record([name, initial, fin, transitions]);
        }
        builder
            .build()
            .with(tabled::settings::Style::rounded())
            .to_string()
    }
}

impl<L: LabelSet, W: WeightSet> Show for Automaton<L, W> {
    fn show(&self) -> String {
        self.build_transition_table()
    }
}

impl<L: LabelSet, W: WeightSet> std::fmt::Display for Automaton<L, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.build_transition_table())
    }
}

#[cfg(test)]
mod tests {
    use crate::{context::Context, labelset::Letters, weightset::Z, Automaton, Show};

    #[test_log::test]
    fn table_lists_weighted_transitions() {
        let mut aut = Automaton::new(Context::new(Letters::new("ab"), Z));
        let [p, q] = [aut.add_state(), aut.add_state()];
        aut.set_transition(p, q, 'a', 3);
        aut.new_transition(q, q, 'b');
        aut.set_initial(p);
        aut.set_final_weight(q, 2);
        let table = aut.show();
        assert!(table.contains("<3>a → "));
        assert!(table.contains("b → "));
        assert!(table.contains("Transitions"));
    }
}
