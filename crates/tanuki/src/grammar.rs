//! Grammar types.

use crate::{types::Map, util::display_fn};
use std::fmt;

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TerminalID(u16);

impl TerminalID {
    /// Reserved terminal denoting the end of input.
    ///
    /// It is never part of the declared terminal alphabet: no rule body may
    /// contain it, and token streams never carry it.
    pub const EOI: Self = Self(0);

    const OFFSET: u16 = 1;

    pub(crate) fn index(&self) -> usize {
        self.0.into()
    }

    pub(crate) fn from_index(raw: usize) -> Self {
        Self(raw as u16)
    }
}

impl fmt::Debug for TerminalID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            &Self::EOI => write!(f, "T#End"),
            _ => write!(f, "T#{:03}", self.0),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NonterminalID(u16);

impl NonterminalID {
    /// Reserved sentinel used as the head of the augmenting rule. It is
    /// distinct from every declared nonterminal and unusable in rule bodies.
    pub const START: Self = Self(0);

    const OFFSET: u16 = 1;
}

impl fmt::Debug for NonterminalID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            &Self::START => write!(f, "N#Start"),
            _ => write!(f, "N#{:03}", self.0),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SymbolID {
    T(TerminalID),
    N(NonterminalID),
}

impl fmt::Debug for SymbolID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::T(t) => write!(f, "{:?}", t),
            Self::N(n) => write!(f, "{:?}", n),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleID(u16);

impl RuleID {
    /// Reserved identifier of the synthetic augmenting rule
    /// `$start -> <start symbol>`.
    pub const ACCEPT: Self = Self(0);

    const OFFSET: u16 = 1;
}

impl fmt::Debug for RuleID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            &Self::ACCEPT => write!(f, "R#Accept"),
            _ => write!(f, "R#{:03}", self.0),
        }
    }
}

/// A dense set of terminal symbols, including possibly `TerminalID::EOI`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TerminalSet {
    inner: bit_set::BitSet,
}

impl TerminalSet {
    pub fn contains(&self, id: TerminalID) -> bool {
        self.inner.contains(id.index())
    }

    pub fn insert(&mut self, id: TerminalID) -> bool {
        self.inner.insert(id.index())
    }

    pub fn union_with(&mut self, other: &Self) {
        self.inner.union_with(&other.inner)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = TerminalID> + '_ {
        self.inner.iter().map(TerminalID::from_index)
    }
}

impl FromIterator<TerminalID> for TerminalSet {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = TerminalID>,
    {
        Self {
            inner: iter.into_iter().map(|t| t.index()).collect(),
        }
    }
}

#[derive(Debug)]
pub struct Terminal {
    id: TerminalID,
    name: String,
}

impl Terminal {
    pub fn id(&self) -> TerminalID {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug)]
pub struct Nonterminal {
    id: NonterminalID,
    name: String,
}

impl Nonterminal {
    pub fn id(&self) -> NonterminalID {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Nonterminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A production rule. Immutable once the grammar is built; referred to by
/// `RuleID` everywhere inside the toolkit.
#[derive(Debug, PartialEq, Eq)]
pub struct Rule {
    left: NonterminalID,
    right: Vec<SymbolID>,
}

impl Rule {
    /// Return the left-hand side of this production.
    pub fn left(&self) -> NonterminalID {
        self.left
    }

    /// Return the right-hand side of this production.
    pub fn right(&self) -> &[SymbolID] {
        &self.right[..]
    }

    // `"E -> E + T"`, with an explicit ε for the empty body
    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            write!(f, "{} ->", g.nonterminals[&self.left])?;
            if self.right.is_empty() {
                f.write_str(" ε")?;
            }
            for symbol in &self.right {
                match symbol {
                    SymbolID::T(t) => write!(f, " {}", g.terminals[t])?,
                    SymbolID::N(n) => write!(f, " {}", g.nonterminals[n])?,
                }
            }
            Ok(())
        })
    }
}

/// The grammar definition used to derive the parser tables.
///
/// Immutable after construction; every analysis and automaton construction
/// is a pure function of this value.
#[derive(Debug)]
#[non_exhaustive]
pub struct Grammar {
    pub terminals: Map<TerminalID, Terminal>,
    pub nonterminals: Map<NonterminalID, Nonterminal>,
    pub rules: Map<RuleID, Rule>,
    pub start_symbol: NonterminalID,
    rules_by_left: Map<NonterminalID, Vec<RuleID>>,
}

impl Grammar {
    /// Define a grammar using the specified function.
    pub fn define<F>(f: F) -> Result<Self, GrammarError>
    where
        F: FnOnce(&mut GrammarDef) -> Result<(), GrammarError>,
    {
        let mut def = GrammarDef::default();
        f(&mut def)?;
        def.end()
    }

    /// Build a grammar from `(head, body)` pairs, inferring the alphabets:
    /// every head becomes a nonterminal, the first head is the start symbol,
    /// and any body symbol that is not a head is a terminal. Exact duplicate
    /// rules collapse.
    pub fn from_rules<'a, I>(rules: I) -> Result<Self, GrammarError>
    where
        I: IntoIterator<Item = (&'a str, Vec<&'a str>)>,
    {
        let rules: Vec<_> = rules.into_iter().collect();
        Self::define(|g| {
            let mut nonterminals = Map::<&str, NonterminalID>::default();
            let mut terminals = Map::<&str, TerminalID>::default();

            for &(head, _) in rules.iter() {
                if !nonterminals.contains_key(head) {
                    let id = g.nonterminal(head)?;
                    nonterminals.insert(head, id);
                }
            }
            for (_, body) in &rules {
                for &symbol in body {
                    if !nonterminals.contains_key(symbol) && !terminals.contains_key(symbol) {
                        let id = g.terminal(symbol)?;
                        terminals.insert(symbol, id);
                    }
                }
            }

            if let Some((head, _)) = rules.first() {
                g.start_symbol(nonterminals[head]);
            }

            for (head, body) in &rules {
                let right: Vec<SymbolID> = body
                    .iter()
                    .map(|symbol| match nonterminals.get(symbol) {
                        Some(&n) => SymbolID::N(n),
                        None => SymbolID::T(terminals[symbol]),
                    })
                    .collect();
                g.rule(nonterminals[head], right);
            }

            Ok(())
        })
    }

    pub fn rule(&self, id: RuleID) -> &Rule {
        &self.rules[&id]
    }

    /// The rules with the specified nonterminal on the left-hand side, in
    /// declaration order.
    pub fn rules_for(&self, left: NonterminalID) -> &[RuleID] {
        self.rules_by_left
            .get(&left)
            .map(|rules| &rules[..])
            .unwrap_or(&[])
    }

    /// Look up a declared terminal by name.
    pub fn terminal_id(&self, name: &str) -> Option<TerminalID> {
        self.terminals
            .values()
            .find(|t| t.name == name)
            .map(|t| t.id)
    }

    /// Look up a declared nonterminal by name.
    pub fn nonterminal_id(&self, name: &str) -> Option<NonterminalID> {
        self.nonterminals
            .values()
            .find(|n| n.name == name)
            .map(|n| n.id)
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## terminals:")?;
        for terminal in self.terminals.values() {
            writeln!(f, "{}", terminal)?;
        }

        writeln!(f, "\n## nonterminals:")?;
        for nonterminal in self.nonterminals.values() {
            write!(f, "{}", nonterminal)?;
            if nonterminal.id() == self.start_symbol {
                write!(f, " (start)")?;
            }
            writeln!(f)?;
        }

        writeln!(f, "\n## rules:")?;
        for rule in self.rules.values() {
            writeln!(f, "{}", rule.display(self))?;
        }

        Ok(())
    }
}

/// The contextual values for building a `Grammar`.
#[derive(Debug)]
pub struct GrammarDef {
    terminals: Map<TerminalID, Terminal>,
    nonterminals: Map<NonterminalID, Nonterminal>,
    rules: Map<RuleID, Rule>,
    start: Option<NonterminalID>,
    next_terminal_id: u16,
    next_nonterminal_id: u16,
    next_rule_id: u16,
}

impl Default for GrammarDef {
    fn default() -> Self {
        let mut terminals = Map::default();
        terminals.insert(
            TerminalID::EOI,
            Terminal {
                id: TerminalID::EOI,
                name: "$eoi".to_owned(),
            },
        );

        let mut nonterminals = Map::default();
        nonterminals.insert(
            NonterminalID::START,
            Nonterminal {
                id: NonterminalID::START,
                name: "$start".to_owned(),
            },
        );

        Self {
            terminals,
            nonterminals,
            rules: Map::default(),
            start: None,
            next_terminal_id: TerminalID::OFFSET,
            next_nonterminal_id: NonterminalID::OFFSET,
            next_rule_id: RuleID::OFFSET,
        }
    }
}

impl GrammarDef {
    /// Declare a terminal symbol used in this grammar.
    pub fn terminal(&mut self, name: &str) -> Result<TerminalID, GrammarError> {
        self.verify_name(name)?;

        if self.next_terminal_id == u16::MAX {
            return Err(GrammarError::TooManySymbols);
        }
        let id = TerminalID(self.next_terminal_id);
        self.next_terminal_id += 1;

        self.terminals.insert(
            id,
            Terminal {
                id,
                name: name.to_owned(),
            },
        );

        Ok(id)
    }

    /// Declare a nonterminal symbol used in this grammar.
    pub fn nonterminal(&mut self, name: &str) -> Result<NonterminalID, GrammarError> {
        self.verify_name(name)?;

        if self.next_nonterminal_id == u16::MAX {
            return Err(GrammarError::TooManySymbols);
        }
        let id = NonterminalID(self.next_nonterminal_id);
        self.next_nonterminal_id += 1;

        self.nonterminals.insert(
            id,
            Nonterminal {
                id,
                name: name.to_owned(),
            },
        );

        Ok(id)
    }

    /// Add a production rule to this grammar.
    ///
    /// An exact duplicate of an existing rule collapses into it: the already
    /// assigned identifier is returned and nothing is added.
    pub fn rule<I>(&mut self, left: NonterminalID, right: I) -> RuleID
    where
        I: IntoIterator<Item = SymbolID>,
    {
        let right: Vec<_> = right.into_iter().collect();
        for (&id, rule) in &self.rules {
            if rule.left == left && rule.right == right {
                return id;
            }
        }

        let id = RuleID(self.next_rule_id);
        self.next_rule_id += 1;
        self.rules.insert(id, Rule { left, right });
        id
    }

    /// Specify the start symbol for this grammar.
    ///
    /// Defaults to the first declared nonterminal.
    pub fn start_symbol(&mut self, symbol: NonterminalID) {
        self.start.replace(symbol);
    }

    fn verify_name(&self, name: &str) -> Result<(), GrammarError> {
        if name.is_empty() {
            return Err(GrammarError::InvalidName {
                name: name.to_owned(),
            });
        }
        let declared = self
            .terminals
            .values()
            .any(|t| t.name == name)
            || self.nonterminals.values().any(|n| n.name == name);
        if declared {
            return Err(GrammarError::DuplicateSymbol {
                name: name.to_owned(),
            });
        }
        Ok(())
    }

    fn end(mut self) -> Result<Grammar, GrammarError> {
        let start = match self.start.take() {
            Some(start) => start,
            None => self
                .nonterminals
                .keys()
                .find(|&&id| id != NonterminalID::START)
                .copied()
                .ok_or(GrammarError::MissingStart)?,
        };

        // The augmenting rule, so that acceptance is detected uniformly by
        // every construction strategy.
        self.rules.insert(
            RuleID::ACCEPT,
            Rule {
                left: NonterminalID::START,
                right: vec![SymbolID::N(start)],
            },
        );

        let mut rules_by_left = Map::<NonterminalID, Vec<RuleID>>::default();
        for (&id, rule) in &self.rules {
            rules_by_left.entry(rule.left).or_default().push(id);
        }

        Ok(Grammar {
            terminals: self.terminals,
            nonterminals: self.nonterminals,
            rules: self.rules,
            start_symbol: start,
            rules_by_left,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
    #[error("the symbol `{name}' is already declared")]
    DuplicateSymbol { name: String },

    #[error("invalid symbol name `{name}'")]
    InvalidName { name: String },

    #[error("the grammar has no nonterminal to use as the start symbol")]
    MissingStart,

    #[error("too many symbols")]
    TooManySymbols,
}
