//! Canonical LR(1) automaton construction.
//!
//! Every item carries its exact lookahead set and two states merge only
//! when their kernels agree on items *and* lookaheads. Most precise, most
//! states.

use super::{advance, lr1_closure, Automaton, Item, ItemSet, State, StateID};
use crate::{
    analysis::Analysis,
    grammar::{Grammar, RuleID, TerminalID},
    types::Map,
};
use std::collections::VecDeque;

// The canonical form of a kernel used for state deduplication: items in
// sorted order, each with its (ordered) lookahead terminals.
type KernelKey = Vec<(Item, Vec<TerminalID>)>;

fn kernel_key(kernel: &ItemSet) -> KernelKey {
    let mut key: KernelKey = kernel
        .iter()
        .map(|(&item, lookaheads)| (item, lookaheads.iter().collect()))
        .collect();
    key.sort();
    key
}

#[tracing::instrument(skip_all)]
pub fn automaton(grammar: &Grammar, analysis: &Analysis) -> Automaton {
    let mut kernel0 = ItemSet::default();
    kernel0.insert(
        Item {
            rule: RuleID::ACCEPT,
            dot: 0,
        },
        [TerminalID::EOI].into_iter().collect(),
    );

    let mut next_id: u16 = 1;
    let mut states = Map::default();
    let mut isocores = Map::<KernelKey, StateID>::default();
    let mut pending = VecDeque::new();
    isocores.insert(kernel_key(&kernel0), StateID::START);
    pending.push_back((StateID::START, kernel0));

    while let Some((id, kernel)) = pending.pop_front() {
        let closed = lr1_closure(grammar, analysis, &kernel);

        let mut edges = Map::default();
        for (label, new_kernel) in advance(grammar, &closed) {
            let mut sorted: Vec<_> = new_kernel.into_iter().collect();
            sorted.sort_by_key(|&(item, _)| item);
            let new_kernel: ItemSet = sorted.into_iter().collect();

            let key = kernel_key(&new_kernel);
            let next = match isocores.get(&key) {
                Some(&next) => next,
                None => {
                    let next = StateID::from_raw(next_id);
                    next_id += 1;
                    isocores.insert(key, next);
                    pending.push_back((next, new_kernel));
                    next
                }
            };
            edges.insert(label, next);
        }

        states.insert(
            id,
            State {
                items: closed,
                transitions: edges,
            },
        );
    }

    tracing::trace!("canonical LR(1) automaton has {} states", states.len());
    Automaton { states }
}
