//! SLR(1) automaton construction.
//!
//! The cheapest of the three strategies: the state shape is the plain LR(0)
//! automaton, and reductions are gated afterwards by the global FOLLOW set
//! of the rule head. Weaker lookahead precision than LALR/CLR — grammars
//! those accept may still conflict here.

use super::{explore_lr0, lr0_closure, Automaton, ItemSet, State};
use crate::{analysis::Analysis, grammar::Grammar, types::Map};

#[tracing::instrument(skip_all)]
pub fn automaton(grammar: &Grammar, analysis: &Analysis) -> Automaton {
    let lr0 = explore_lr0(grammar);

    let mut states = Map::default();
    for (&id, kernel) in &lr0.kernels {
        let mut items = ItemSet::default();
        for item in lr0_closure(grammar, kernel.iter().copied()) {
            let rule = grammar.rule(item.rule);
            let lookaheads = if item.dot as usize == rule.right().len() {
                analysis.follow(rule.left()).clone()
            } else {
                Default::default()
            };
            items.insert(item, lookaheads);
        }
        states.insert(
            id,
            State {
                items,
                transitions: lr0.transitions[&id].clone(),
            },
        );
    }

    tracing::trace!("SLR automaton has {} states", states.len());
    Automaton { states }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::TerminalID;

    #[test]
    fn reduce_lookaheads_are_follow_sets() {
        let g = Grammar::from_rules([
            ("E", vec!["E", "+", "T"]),
            ("E", vec!["T"]),
            ("T", vec!["T", "*", "F"]),
            ("T", vec!["F"]),
            ("F", vec!["(", "E", ")"]),
            ("F", vec!["id"]),
        ])
        .unwrap();
        let analysis = Analysis::new(&g);
        let automaton = automaton(&g, &analysis);
        assert_eq!(automaton.states.len(), 12);

        let f = g.nonterminal_id("F").unwrap();
        let plus = g.terminal_id("+").unwrap();
        let star = g.terminal_id("*").unwrap();
        let rparen = g.terminal_id(")").unwrap();

        // every completed item of F carries FOLLOW(F) = { +, *, ), $eoi }
        let mut seen = 0;
        for (_, state) in automaton.states() {
            for (item, lookaheads) in &state.items {
                let rule = g.rule(item.rule);
                if rule.left() != f || (item.dot as usize) < rule.right().len() {
                    continue;
                }
                seen += 1;
                assert!(lookaheads.contains(plus));
                assert!(lookaheads.contains(star));
                assert!(lookaheads.contains(rparen));
                assert!(lookaheads.contains(TerminalID::EOI));
                assert_eq!(lookaheads.len(), 4);
            }
        }
        assert!(seen > 0);
    }
}
