//! ACTION/GOTO table construction with conflict detection.

use super::{Automaton, StateID};
use crate::{
    grammar::{Grammar, NonterminalID, RuleID, SymbolID, TerminalID},
    types::Map,
    util::display_fn,
};
use std::fmt;

/// The action performed in a state on a particular lookahead terminal.
///
/// There is no precedence/associativity resolution in this design: a slot
/// never holds more than one action, and trying to register a second one is
/// a [`ConstructError`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Action {
    /// Read the lookahead terminal and transition to the specified state.
    Shift(StateID),

    /// Match the specified production rule.
    Reduce(RuleID),

    /// The input is recognized.
    Accept,
}

#[derive(Debug)]
#[non_exhaustive]
pub struct Row {
    pub actions: Map<TerminalID, Action>,
    pub gotos: Map<NonterminalID, StateID>,
}

/// The ACTION/GOTO tables of a conflict-free grammar. Immutable; any number
/// of parses may run over one table concurrently.
#[derive(Debug)]
pub struct ParseTable {
    pub states: Map<StateID, Row>,
}

impl ParseTable {
    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            for (i, (id, row)) in self.states.iter().enumerate() {
                if i > 0 {
                    writeln!(f)?;
                }
                writeln!(f, "#### {:?}", id)?;
                writeln!(f, "## actions")?;
                for (token, action) in &row.actions {
                    let token = &g.terminals[token];
                    match action {
                        Action::Shift(next) => writeln!(f, "- {} => shift({:?})", token, next)?,
                        Action::Reduce(rule) => {
                            writeln!(f, "- {} => reduce({})", token, g.rule(*rule).display(g))?
                        }
                        Action::Accept => writeln!(f, "- {} => accept", token)?,
                    }
                }
                writeln!(f, "## gotos")?;
                for (symbol, next) in &row.gotos {
                    writeln!(f, "- {} => goto({:?})", g.nonterminals[symbol], next)?;
                }
            }
            Ok(())
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConstructError {
    #[error("shift/reduce conflict in state {state:?} on token `{token}' (reduce {rule})")]
    ShiftReduce {
        state: StateID,
        token: String,
        rule: String,
    },

    #[error("reduce/reduce conflict in state {state:?} on token `{token}' ({rules})")]
    ReduceReduce {
        state: StateID,
        token: String,
        rules: String,
    },

    #[error("the grammar is too complex for the available construction strategies")]
    TooComplex,
}

/// Compile an automaton into ACTION/GOTO tables.
///
/// Shift entries come from the terminal transitions, reduce entries from
/// the completed items over their attached lookahead sets, accept from the
/// completed augmenting item on the endmarker. Any collision is fatal:
/// it is the evidence that the grammar is not in the class the automaton
/// was built for, and no partial table is ever returned.
#[tracing::instrument(skip_all)]
pub fn generate(grammar: &Grammar, automaton: &Automaton) -> Result<ParseTable, ConstructError> {
    let mut states = Map::default();

    for (id, state) in automaton.states() {
        let mut actions = Map::<TerminalID, Action>::default();
        let mut gotos = Map::<NonterminalID, StateID>::default();

        for (&symbol, &next) in &state.transitions {
            match symbol {
                SymbolID::T(t) => {
                    actions.insert(t, Action::Shift(next));
                }
                SymbolID::N(n) => {
                    gotos.insert(n, next);
                }
            }
        }

        for (item, lookaheads) in &state.items {
            let rule = grammar.rule(item.rule);
            if (item.dot as usize) < rule.right().len() {
                continue;
            }
            let action = if item.rule == RuleID::ACCEPT {
                Action::Accept
            } else {
                Action::Reduce(item.rule)
            };
            for token in lookaheads.iter() {
                match actions.get(&token) {
                    None => {
                        actions.insert(token, action);
                    }
                    Some(occupied) => {
                        return Err(conflict(grammar, id, token, *occupied, action));
                    }
                }
            }
        }

        states.insert(id, Row { actions, gotos });
    }

    tracing::trace!("generated tables for {} states", states.len());
    Ok(ParseTable { states })
}

// Both actions compete for the same (state, token) slot; the newcomer is
// always a reduction (shifts are registered first, one per terminal).
fn conflict(
    grammar: &Grammar,
    state: StateID,
    token: TerminalID,
    occupied: Action,
    new: Action,
) -> ConstructError {
    let token_name = grammar.terminals[&token].name().to_owned();
    let rule_of = |action: Action| match action {
        Action::Reduce(rule) => grammar.rule(rule).display(grammar).to_string(),
        Action::Accept => grammar.rule(RuleID::ACCEPT).display(grammar).to_string(),
        Action::Shift(_) => String::new(),
    };

    match occupied {
        Action::Shift(_) => ConstructError::ShiftReduce {
            state,
            token: token_name,
            rule: rule_of(new),
        },
        Action::Reduce(_) | Action::Accept => ConstructError::ReduceReduce {
            state,
            token: token_name,
            rules: format!("{}; {}", rule_of(occupied), rule_of(new)),
        },
    }
}
