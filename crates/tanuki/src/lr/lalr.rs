//! LALR(1) automaton construction.
//!
//! The state shape is fixed by the LR(0) automaton first (LALR has exactly
//! as many states as SLR), then LR(1) contexts are propagated along the
//! transition graph until no kernel lookahead set grows: each round takes
//! the LR(1) closure of every state's kernel and merges the dot-advanced
//! items into the successor kernels. Lookahead sets are bounded by the
//! terminal alphabet and only grow, so the iteration converges.

use super::{advance, explore_lr0, lr1_closure, Automaton, Item, ItemSet, State, StateID};
use crate::{
    analysis::Analysis,
    grammar::{Grammar, RuleID, TerminalID},
    types::Map,
};

#[tracing::instrument(skip_all)]
pub fn automaton(grammar: &Grammar, analysis: &Analysis) -> Automaton {
    let lr0 = explore_lr0(grammar);

    let mut kernels: Map<StateID, ItemSet> = lr0
        .kernels
        .iter()
        .map(|(&id, kernel)| {
            (
                id,
                kernel
                    .iter()
                    .map(|&item| (item, Default::default()))
                    .collect(),
            )
        })
        .collect();
    let accept = Item {
        rule: RuleID::ACCEPT,
        dot: 0,
    };
    kernels[&StateID::START][&accept].insert(TerminalID::EOI);

    let mut rounds = 0usize;
    loop {
        rounds += 1;

        // Collect the merges first; applying them mid-round would make the
        // result depend on state iteration order.
        let mut merges = Vec::new();
        for (&id, kernel) in &kernels {
            let closed = lr1_closure(grammar, analysis, kernel);
            for (label, new_kernel) in advance(grammar, &closed) {
                let next = lr0.transitions[&id][&label];
                for (item, lookaheads) in new_kernel {
                    merges.push((next, item, lookaheads));
                }
            }
        }

        let mut changed = false;
        for (next, item, lookaheads) in merges {
            let entry = &mut kernels[&next][&item];
            let before = entry.len();
            entry.union_with(&lookaheads);
            changed |= entry.len() != before;
        }
        if !changed {
            break;
        }
    }
    tracing::trace!("LALR lookaheads converged after {} rounds", rounds);

    let mut states = Map::default();
    for (&id, kernel) in &kernels {
        states.insert(
            id,
            State {
                items: lr1_closure(grammar, analysis, kernel),
                transitions: lr0.transitions[&id].clone(),
            },
        );
    }

    tracing::trace!("LALR automaton has {} states", states.len());
    Automaton { states }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merges_lookahead_contexts_onto_lr0_states() {
        let g = Grammar::from_rules([
            ("S", vec!["C", "C"]),
            ("C", vec!["c", "C"]),
            ("C", vec!["d"]),
        ])
        .unwrap();
        let analysis = Analysis::new(&g);
        let automaton = automaton(&g, &analysis);

        // same state count as LR(0)/SLR
        assert_eq!(automaton.states.len(), 7);

        let c = g.nonterminal_id("C").unwrap();
        let tc = g.terminal_id("c").unwrap();
        let td = g.terminal_id("d").unwrap();

        // the single C -> d . state merges both contexts: { c, d } and
        // { $eoi }
        let rule_d = g
            .rules
            .iter()
            .find(|(_, rule)| rule.left() == c && rule.right().len() == 1)
            .map(|(&id, _)| id)
            .unwrap();
        let completed = Item { rule: rule_d, dot: 1 };

        let mut contexts = vec![];
        for (_, state) in automaton.states() {
            if let Some(lookaheads) = state.items.get(&completed) {
                contexts.push(lookaheads.clone());
            }
        }
        assert_eq!(contexts.len(), 1);
        let lookaheads = &contexts[0];
        assert!(lookaheads.contains(tc));
        assert!(lookaheads.contains(td));
        assert!(lookaheads.contains(TerminalID::EOI));
        assert_eq!(lookaheads.len(), 3);
    }
}
