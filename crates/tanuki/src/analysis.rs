//! FIRST/FOLLOW set computation.

use crate::{
    grammar::{Grammar, NonterminalID, SymbolID, TerminalID, TerminalSet},
    types::{Map, Set},
};

/// The FIRST and FOLLOW sets of a grammar, plus the nullable set that stands
/// in for ε-membership of FIRST.
///
/// A pure function of the (immutable) grammar; computed once and owned by
/// the caller for the duration of a construction pass.
#[derive(Debug)]
pub struct Analysis {
    nullables: Set<NonterminalID>,
    first: Map<NonterminalID, TerminalSet>,
    follow: Map<NonterminalID, TerminalSet>,
}

impl Analysis {
    #[tracing::instrument(skip_all)]
    pub fn new(grammar: &Grammar) -> Self {
        let nullables = nullables(grammar);
        let first = first_sets(grammar, &nullables);
        let follow = follow_sets(grammar, &nullables, &first);
        Self {
            nullables,
            first,
            follow,
        }
    }

    /// Whether the nonterminal derives the empty string.
    pub fn nullable(&self, n: NonterminalID) -> bool {
        self.nullables.contains(&n)
    }

    /// The terminals that can begin a derivation of the nonterminal.
    pub fn first(&self, n: NonterminalID) -> &TerminalSet {
        &self.first[&n]
    }

    /// The terminals (or the endmarker) that can immediately follow the
    /// nonterminal in a derivation from the start symbol.
    pub fn follow(&self, n: NonterminalID) -> &TerminalSet {
        &self.follow[&n]
    }

    /// `FIRST(prefix lookaheads)`: the terminals that can begin a derivation
    /// of `prefix`, plus the given lookaheads when the whole prefix derives
    /// the empty string.
    pub fn first_of<L>(&self, prefix: &[SymbolID], lookaheads: L) -> TerminalSet
    where
        L: IntoIterator<Item = TerminalID>,
    {
        let (mut res, nullable) = seq_first(prefix, &self.nullables, &self.first);
        if nullable {
            for l in lookaheads {
                res.insert(l);
            }
        }
        res
    }

    /// Whether every symbol of the sequence derives the empty string.
    pub fn nullable_seq(&self, seq: &[SymbolID]) -> bool {
        seq.iter()
            .all(|symbol| matches!(symbol, SymbolID::N(n) if self.nullables.contains(n)))
    }
}

// FIRST of a symbol sequence against (possibly still growing) tables:
// terminals cut the scan short, nullable nonterminals let it continue.
// The second component is whether the whole sequence is nullable.
fn seq_first(
    seq: &[SymbolID],
    nullables: &Set<NonterminalID>,
    first: &Map<NonterminalID, TerminalSet>,
) -> (TerminalSet, bool) {
    let mut res = TerminalSet::default();
    for symbol in seq {
        match symbol {
            SymbolID::T(t) => {
                res.insert(*t);
                return (res, false);
            }
            SymbolID::N(n) => {
                res.union_with(&first[n]);
                if !nullables.contains(n) {
                    return (res, false);
                }
            }
        }
    }
    (res, true)
}

/// Calculate the set of nullable nonterminals in this grammar.
fn nullables(grammar: &Grammar) -> Set<NonterminalID> {
    let mut nulls: Set<NonterminalID> = grammar
        .rules
        .values()
        .filter_map(|rule| rule.right().is_empty().then(|| rule.left()))
        .collect();

    let mut changed = true;
    while changed {
        changed = false;
        for rule in grammar.rules.values() {
            if nulls.contains(&rule.left()) {
                continue;
            }
            let is_rhs_nullable = rule
                .right()
                .iter()
                .all(|symbol| matches!(symbol, SymbolID::N(n) if nulls.contains(n)));
            if is_rhs_nullable {
                changed = true;
                nulls.insert(rule.left());
            }
        }
    }

    nulls
}

fn first_sets(
    grammar: &Grammar,
    nullables: &Set<NonterminalID>,
) -> Map<NonterminalID, TerminalSet> {
    let mut first: Map<NonterminalID, TerminalSet> = grammar
        .nonterminals
        .keys()
        .map(|&n| (n, TerminalSet::default()))
        .collect();

    // Round-robin over the rule bodies until no set grows. The sets are
    // bounded by the terminal alphabet and only ever grow, so this
    // terminates at the unique fixed point whatever the visit order.
    let mut rounds = 0usize;
    let mut changed = true;
    while changed {
        changed = false;
        rounds += 1;
        for rule in grammar.rules.values() {
            let (firsts, _) = seq_first(rule.right(), nullables, &first);
            let entry = &mut first[&rule.left()];
            let before = entry.len();
            entry.union_with(&firsts);
            changed |= entry.len() != before;
        }
    }
    tracing::trace!("first sets converged after {} rounds", rounds);

    first
}

fn follow_sets(
    grammar: &Grammar,
    nullables: &Set<NonterminalID>,
    first: &Map<NonterminalID, TerminalSet>,
) -> Map<NonterminalID, TerminalSet> {
    let mut follow: Map<NonterminalID, TerminalSet> = grammar
        .nonterminals
        .keys()
        .map(|&n| (n, TerminalSet::default()))
        .collect();

    // Only the endmarker follows the augmenting sentinel; the start symbol
    // inherits it through the accept rule.
    follow[&NonterminalID::START].insert(TerminalID::EOI);

    let mut rounds = 0usize;
    let mut changed = true;
    while changed {
        changed = false;
        rounds += 1;
        for rule in grammar.rules.values() {
            for (i, symbol) in rule.right().iter().enumerate() {
                let SymbolID::N(n) = symbol else { continue };
                let rest = &rule.right()[i + 1..];

                let (mut addition, rest_nullable) = seq_first(rest, nullables, first);
                if rest_nullable {
                    addition.union_with(&follow[&rule.left()]);
                }

                let entry = &mut follow[n];
                let before = entry.len();
                entry.union_with(&addition);
                changed |= entry.len() != before;
            }
        }
    }
    tracing::trace!("follow sets converged after {} rounds", rounds);

    follow
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terminal_names(g: &Grammar, set: &TerminalSet) -> Vec<String> {
        let mut names: Vec<_> = set
            .iter()
            .map(|t| g.terminals[&t].name().to_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn bracket_grammar() {
        let g = Grammar::from_rules([
            ("START", vec!["FIRST", "LAST"]),
            ("FIRST", vec!["(", "?", ")"]),
            ("LAST", vec!["[", "!", "]"]),
            ("LAST", vec!["{", "}"]),
        ])
        .unwrap();
        let analysis = Analysis::new(&g);

        let start = g.nonterminal_id("START").unwrap();
        let first_ = g.nonterminal_id("FIRST").unwrap();
        let last = g.nonterminal_id("LAST").unwrap();

        assert_eq!(terminal_names(&g, analysis.first(start)), ["("]);
        assert_eq!(terminal_names(&g, analysis.first(first_)), ["("]);
        assert_eq!(terminal_names(&g, analysis.first(last)), ["[", "{"]);

        assert_eq!(terminal_names(&g, analysis.follow(first_)), ["[", "{"]);
        assert!(analysis.follow(last).contains(TerminalID::EOI));
        assert!(analysis.follow(start).contains(TerminalID::EOI));
        assert_eq!(analysis.follow(start).len(), 1);
    }

    #[test]
    fn nullable_expression_grammar() {
        // E -> T E', E' -> + T E' | ε, T -> F T', T' -> * F T' | ε,
        // F -> ( E ) | id
        let g = Grammar::from_rules([
            ("E", vec!["T", "E'"]),
            ("E'", vec!["+", "T", "E'"]),
            ("E'", vec![]),
            ("T", vec!["F", "T'"]),
            ("T'", vec!["*", "F", "T'"]),
            ("T'", vec![]),
            ("F", vec!["(", "E", ")"]),
            ("F", vec!["id"]),
        ])
        .unwrap();
        let analysis = Analysis::new(&g);

        let e = g.nonterminal_id("E").unwrap();
        let e1 = g.nonterminal_id("E'").unwrap();
        let t1 = g.nonterminal_id("T'").unwrap();

        assert!(!analysis.nullable(e));
        assert!(analysis.nullable(e1));
        assert!(analysis.nullable(t1));

        assert_eq!(terminal_names(&g, analysis.first(e)), ["(", "id"]);
        assert_eq!(terminal_names(&g, analysis.first(e1)), ["+"]);

        // FOLLOW(E') = FOLLOW(E) = { ), $eoi }
        let follow_e1 = analysis.follow(e1);
        assert!(follow_e1.contains(g.terminal_id(")").unwrap()));
        assert!(follow_e1.contains(TerminalID::EOI));
        assert_eq!(follow_e1.len(), 2);

        // FOLLOW(T') also carries `+' from E' -> + T E'
        let follow_t1 = analysis.follow(t1);
        assert!(follow_t1.contains(g.terminal_id("+").unwrap()));
        assert!(follow_t1.contains(g.terminal_id(")").unwrap()));
        assert!(follow_t1.contains(TerminalID::EOI));
    }

    #[test]
    fn first_is_closed_under_rules() {
        let g = Grammar::from_rules([
            ("S", vec!["C", "C"]),
            ("C", vec!["c", "C"]),
            ("C", vec![]),
        ])
        .unwrap();
        let analysis = Analysis::new(&g);

        for rule in g.rules.values() {
            let body_first = analysis.first_of(rule.right(), std::iter::empty());
            for t in body_first.iter() {
                assert!(
                    analysis.first(rule.left()).contains(t),
                    "FIRST({:?}) must contain FIRST of the body of {}",
                    rule.left(),
                    rule.display(&g),
                );
            }
        }
    }

    #[test]
    fn first_of_appends_lookaheads_only_when_nullable() {
        let g = Grammar::from_rules([("S", vec!["A", "b"]), ("A", vec!["a"]), ("A", vec![])])
            .unwrap();
        let analysis = Analysis::new(&g);

        let a = g.nonterminal_id("A").unwrap();
        let ta = g.terminal_id("a").unwrap();
        let tb = g.terminal_id("b").unwrap();

        let set = analysis.first_of(&[SymbolID::N(a)], [TerminalID::EOI]);
        assert!(set.contains(ta));
        assert!(set.contains(TerminalID::EOI));

        let set = analysis.first_of(&[SymbolID::N(a), SymbolID::T(tb)], [TerminalID::EOI]);
        assert!(set.contains(ta));
        assert!(set.contains(tb));
        assert!(!set.contains(TerminalID::EOI));
    }
}
