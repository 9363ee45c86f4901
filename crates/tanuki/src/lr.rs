//! LR automaton construction.
//!
//! The three strategies (SLR, canonical LR(1), LALR(1)) share the item,
//! closure and goto machinery in this module and differ only in how states
//! are deduplicated and where the reduce lookahead sets come from. They all
//! produce the same [`Automaton`] shape, so the table builder in
//! [`table`] does not care which one ran.

pub mod clr;
pub mod lalr;
pub mod slr;
pub mod table;

use crate::{
    analysis::Analysis,
    grammar::{Grammar, RuleID, SymbolID, TerminalSet},
    types::{Map, Queue, Set},
    util::display_fn,
};
use std::{collections::VecDeque, fmt};

pub use table::{Action, ConstructError, ParseTable};

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateID(u16);

impl StateID {
    /// The automaton always starts exploration from the state holding the
    /// augmented start item, which is numbered first.
    pub const START: Self = Self(0);

    const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }
}

impl fmt::Debug for StateID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S#{:03}", self.0)
    }
}

/// An LR(0) item: a production rule with a dot marking parse progress.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Item {
    pub rule: RuleID,
    pub dot: u16,
}

impl Item {
    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            let rule = g.rule(self.rule);
            write!(f, "{} -> [", g.nonterminals[&rule.left()])?;
            for (i, symbol) in rule.right().iter().enumerate() {
                if i == self.dot as usize {
                    f.write_str(" .")?;
                }
                match symbol {
                    SymbolID::T(t) => write!(f, " {}", g.terminals[t])?,
                    SymbolID::N(n) => write!(f, " {}", g.nonterminals[n])?,
                }
            }
            if self.dot as usize == rule.right().len() {
                f.write_str(" .")?;
            }
            f.write_str(" ]")
        })
    }
}

/// An item set mapping each item to its lookahead terminals. LR(0)-only
/// contexts leave the lookahead sets empty.
pub type ItemSet = Map<Item, TerminalSet>;

#[derive(Debug)]
pub struct State {
    /// The closed item set of this state. Completed items carry the reduce
    /// lookaheads appropriate to the strategy that built the automaton.
    pub items: ItemSet,
    pub transitions: Map<SymbolID, StateID>,
}

#[derive(Debug)]
pub struct Automaton {
    pub states: Map<StateID, State>,
}

impl Automaton {
    pub fn states(&self) -> impl Iterator<Item = (StateID, &State)> + '_ {
        self.states.iter().map(|(&id, state)| (id, state))
    }

    pub fn state(&self, id: StateID) -> &State {
        &self.states[&id]
    }

    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            for (i, (id, state)) in self.states().enumerate() {
                if i > 0 {
                    writeln!(f)?;
                }
                writeln!(f, "#### {:?}", id)?;
                writeln!(f, "## items")?;
                for (item, lookaheads) in &state.items {
                    write!(f, "- {}  [", item.display(g))?;
                    for (i, lookahead) in lookaheads.iter().enumerate() {
                        if i > 0 {
                            f.write_str(" ")?;
                        }
                        write!(f, "{}", g.terminals[&lookahead])?;
                    }
                    f.write_str("]\n")?;
                }
                writeln!(f, "## transitions")?;
                for (symbol, next) in &state.transitions {
                    match symbol {
                        SymbolID::T(t) => writeln!(f, "- {} => {:?}", g.terminals[t], next)?,
                        SymbolID::N(n) => writeln!(f, "- {} => {:?}", g.nonterminals[n], next)?,
                    }
                }
            }
            Ok(())
        })
    }
}

/// The construction strategy, in increasing order of lookahead precision
/// (and cost).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Method {
    Slr,
    Lalr,
    Clr,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Slr => f.write_str("SLR"),
            Self::Lalr => f.write_str("LALR"),
            Self::Clr => f.write_str("CLR"),
        }
    }
}

/// Construct SLR ACTION/GOTO tables for the grammar.
pub fn build_slr(grammar: &Grammar) -> Result<ParseTable, ConstructError> {
    let analysis = Analysis::new(grammar);
    table::generate(grammar, &slr::automaton(grammar, &analysis))
}

/// Construct LALR(1) ACTION/GOTO tables for the grammar.
pub fn build_lalr(grammar: &Grammar) -> Result<ParseTable, ConstructError> {
    let analysis = Analysis::new(grammar);
    table::generate(grammar, &lalr::automaton(grammar, &analysis))
}

/// Construct canonical LR(1) ACTION/GOTO tables for the grammar.
pub fn build_clr(grammar: &Grammar) -> Result<ParseTable, ConstructError> {
    let analysis = Analysis::new(grammar);
    table::generate(grammar, &clr::automaton(grammar, &analysis))
}

/// Construct tables with the weakest strategy that accepts the grammar,
/// trying SLR, then LALR(1), then canonical LR(1).
///
/// Conflicts along the way are expected (they only say the grammar is not in
/// that class); if even canonical LR(1) conflicts, the grammar is reported
/// as too complex.
#[tracing::instrument(skip_all)]
pub fn build(grammar: &Grammar) -> Result<(Method, ParseTable), ConstructError> {
    type Build = fn(&Grammar) -> Result<ParseTable, ConstructError>;
    let strategies: [(Method, Build); 3] = [
        (Method::Slr, build_slr),
        (Method::Lalr, build_lalr),
        (Method::Clr, build_clr),
    ];
    for (method, build) in strategies {
        match build(grammar) {
            Ok(table) => return Ok((method, table)),
            Err(err) => tracing::debug!("{} construction failed: {}", method, err),
        }
    }
    Err(ConstructError::TooComplex)
}

// ---- shared closure/goto machinery ----

/// The LR(0) closure of a kernel: every item reachable without consuming
/// input, in kernel-first discovery order.
fn lr0_closure<I>(grammar: &Grammar, kernel: I) -> Set<Item>
where
    I: IntoIterator<Item = Item>,
{
    let mut items = Set::default();
    let mut queue: Queue<Item> = kernel.into_iter().collect();
    while let Some(item) = queue.pop() {
        items.insert(item);
        let rule = grammar.rule(item.rule);
        if let Some(SymbolID::N(n)) = rule.right().get(item.dot as usize) {
            for &next in grammar.rules_for(*n) {
                let new = Item { rule: next, dot: 0 };
                if !items.contains(&new) {
                    queue.push(new);
                }
            }
        }
    }
    items
}

/// The LR(1) closure of a kernel item set: expansion items carry
/// `FIRST(beta lookaheads)` as their lookahead sets. An item is requeued
/// whenever its lookahead set grows, so the result is a fixed point.
fn lr1_closure(grammar: &Grammar, analysis: &Analysis, kernel: &ItemSet) -> ItemSet {
    let mut items = kernel.clone();
    let mut queue: VecDeque<Item> = items.keys().copied().collect();
    while let Some(item) = queue.pop_front() {
        let rule = grammar.rule(item.rule);
        let Some(&SymbolID::N(n)) = rule.right().get(item.dot as usize) else {
            continue;
        };
        let beta = &rule.right()[item.dot as usize + 1..];
        let lookaheads = analysis.first_of(beta, items[&item].iter());

        for &next in grammar.rules_for(n) {
            let new = Item { rule: next, dot: 0 };
            let is_new = !items.contains_key(&new);
            let entry = items.entry(new).or_default();
            let before = entry.len();
            entry.union_with(&lookaheads);
            if is_new || entry.len() != before {
                queue.push_back(new);
            }
        }
    }
    items
}

/// Extract the kernels of the goto targets of a closed item set: for each
/// symbol after a dot, the dot-advanced items (lookaheads carried along).
fn advance(grammar: &Grammar, items: &ItemSet) -> Map<SymbolID, ItemSet> {
    let mut next: Map<SymbolID, ItemSet> = Map::default();
    for (item, lookaheads) in items {
        let rule = grammar.rule(item.rule);
        let Some(&label) = rule.right().get(item.dot as usize) else {
            continue;
        };
        let advanced = Item {
            rule: item.rule,
            dot: item.dot + 1,
        };
        next.entry(label)
            .or_default()
            .entry(advanced)
            .or_default()
            .union_with(lookaheads);
    }
    next
}

/// The LR(0) automaton skeleton: numbered kernels and the transition graph,
/// deduplicated by kernel equality.
struct Lr0Automaton {
    kernels: Map<StateID, Vec<Item>>,
    transitions: Map<StateID, Map<SymbolID, StateID>>,
}

fn explore_lr0(grammar: &Grammar) -> Lr0Automaton {
    let kernel0 = vec![Item {
        rule: RuleID::ACCEPT,
        dot: 0,
    }];

    let mut next_id: u16 = 1;
    let mut kernels = Map::default();
    let mut transitions = Map::default();
    let mut isocores = Map::<Vec<Item>, StateID>::default();
    let mut pending = VecDeque::new();
    isocores.insert(kernel0.clone(), StateID::START);
    pending.push_back((StateID::START, kernel0));

    while let Some((id, kernel)) = pending.pop_front() {
        let closed = lr0_closure(grammar, kernel.iter().copied());

        let mut grouped: Map<SymbolID, Set<Item>> = Map::default();
        for &item in &closed {
            let rule = grammar.rule(item.rule);
            if let Some(&label) = rule.right().get(item.dot as usize) {
                grouped.entry(label).or_default().insert(Item {
                    rule: item.rule,
                    dot: item.dot + 1,
                });
            }
        }

        let mut edges = Map::default();
        for (label, advanced) in grouped {
            let mut new_kernel: Vec<Item> = advanced.into_iter().collect();
            new_kernel.sort();
            let next = match isocores.get(&new_kernel) {
                Some(&next) => next,
                None => {
                    let next = StateID::from_raw(next_id);
                    next_id += 1;
                    isocores.insert(new_kernel.clone(), next);
                    pending.push_back((next, new_kernel));
                    next
                }
            };
            edges.insert(label, next);
        }

        kernels.insert(id, kernel);
        transitions.insert(id, edges);
    }

    Lr0Automaton {
        kernels,
        transitions,
    }
}
