//! Driving the runtime engine from in-memory tables.

use crate::{
    grammar::{Grammar, NonterminalID, RuleID, TerminalID},
    lr::{Action, ParseTable, StateID},
    util::display_fn,
};
use std::fmt;
use tanuki_runtime::{ParseAction, ParseError, ParseEvent, ParseItem, Parser, ParserDef, Token};

/// A [`ParserDef`] over an in-memory grammar/table pair.
#[derive(Copy, Clone)]
pub struct TableDef<'g> {
    grammar: &'g Grammar,
    table: &'g ParseTable,
}

impl<'g> TableDef<'g> {
    pub fn new(grammar: &'g Grammar, table: &'g ParseTable) -> Self {
        Self { grammar, table }
    }
}

impl ParserDef for TableDef<'_> {
    type State = StateID;
    type Terminal = TerminalID;
    type Nonterminal = NonterminalID;
    type Rule = RuleID;

    fn initial_state(&self) -> Self::State {
        StateID::START
    }

    fn action(
        &self,
        current: Self::State,
        lookahead: Option<Self::Terminal>,
    ) -> Option<ParseAction<Self::State, Self::Nonterminal, Self::Rule>> {
        let row = self.table.states.get(&current)?;
        let token = lookahead.unwrap_or(TerminalID::EOI);
        row.actions.get(&token).map(|action| match *action {
            Action::Shift(next) => ParseAction::Shift(next),
            Action::Reduce(rule) => {
                let r = self.grammar.rule(rule);
                ParseAction::Reduce(rule, r.left(), r.right().len())
            }
            Action::Accept => ParseAction::Accept,
        })
    }

    fn goto(&self, current: Self::State, symbol: Self::Nonterminal) -> Option<Self::State> {
        self.table.states.get(&current)?.gotos.get(&symbol).copied()
    }
}

/// The reduction seam: how shifted tokens and matched rules turn into
/// synthesized values.
pub trait Reduce<TTok> {
    type Value;

    /// The value of a shifted token.
    fn token(&mut self, token: TTok) -> Self::Value;

    /// The value of a matched rule, given the values of its body in
    /// left-to-right order.
    fn reduce(
        &mut self,
        rule: RuleID,
        head: NonterminalID,
        children: Vec<Self::Value>,
    ) -> Self::Value;
}

/// A generic parse tree: the default synthesized value when no reduction
/// actions are supplied. Nodes are tagged with the head of the matched rule;
/// leaves carry the token values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseTree<V> {
    Leaf(V),
    Node {
        symbol: NonterminalID,
        children: Vec<ParseTree<V>>,
    },
}

impl<V> ParseTree<V> {
    /// The leaf values in left-to-right order; for a tree built from a
    /// successful parse this is exactly the token stream that was consumed.
    pub fn leaves(&self) -> Vec<&V> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a V>) {
        match self {
            Self::Leaf(value) => out.push(value),
            Self::Node { children, .. } => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
        }
    }

    // `"S(C(c, C(d)), C(d))"`
    pub fn display<'a>(&'a self, g: &'a Grammar) -> impl fmt::Display + 'a
    where
        V: fmt::Display,
    {
        display_fn(move |f| self.fmt_with(g, f))
    }

    fn fmt_with(&self, g: &Grammar, f: &mut fmt::Formatter<'_>) -> fmt::Result
    where
        V: fmt::Display,
    {
        match self {
            Self::Leaf(value) => write!(f, "{}", value),
            Self::Node { symbol, children } => {
                write!(f, "{}(", g.nonterminals[symbol])?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    child.fmt_with(g, f)?;
                }
                f.write_str(")")
            }
        }
    }
}

/// The default reduction: build [`ParseTree`] nodes.
#[derive(Debug, Default)]
pub struct TreeBuilder;

impl<V> Reduce<(TerminalID, V)> for TreeBuilder {
    type Value = ParseTree<V>;

    fn token(&mut self, (_, value): (TerminalID, V)) -> Self::Value {
        ParseTree::Leaf(value)
    }

    fn reduce(
        &mut self,
        _rule: RuleID,
        head: NonterminalID,
        children: Vec<Self::Value>,
    ) -> Self::Value {
        ParseTree::Node {
            symbol: head,
            children,
        }
    }
}

/// Parse a token stream into a generic parse tree.
pub fn parse<I, V>(
    grammar: &Grammar,
    table: &ParseTable,
    tokens: I,
) -> Result<ParseTree<V>, ParseError>
where
    I: IntoIterator<Item = (TerminalID, V)>,
{
    parse_with(grammar, table, tokens, &mut TreeBuilder)
}

/// Parse a token stream, synthesizing values through the supplied reducer.
///
/// The engine owns all of its mutable state, so a failed parse never
/// affects a later one over the same tables.
pub fn parse_with<I, R>(
    grammar: &Grammar,
    table: &ParseTable,
    tokens: I,
    reducer: &mut R,
) -> Result<R::Value, ParseError>
where
    I: IntoIterator,
    I::Item: Token<TerminalID>,
    R: Reduce<I::Item>,
{
    let span = tracing::trace_span!("parse");
    let _entered = span.enter();

    let mut parser = Parser::new(TableDef::new(grammar, table));
    let mut tokens = tokens.into_iter();
    let mut args = Vec::new();
    let mut values: Vec<R::Value> = Vec::new();

    loop {
        match parser.next_event(&mut tokens, &mut args)? {
            ParseEvent::Reduce(rule, head) => {
                tracing::trace!("reduce: {}", grammar.rule(rule).display(grammar));
                let mut children = Vec::with_capacity(args.len());
                for item in args.drain(..).rev() {
                    let value = match item {
                        ParseItem::T(token) => reducer.token(token),
                        ParseItem::N(_) => values.pop().ok_or(ParseError::StackUnderflow)?,
                        _ => return Err(ParseError::StackUnderflow),
                    };
                    children.push(value);
                }
                children.reverse();
                values.push(reducer.reduce(rule, head, children));
            }

            ParseEvent::Accept => {
                tracing::trace!("accept");
                return values.pop().ok_or(ParseError::StackUnderflow);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lr::build_clr;

    fn tokens<'a>(
        grammar: &'a Grammar,
        input: &'a str,
    ) -> impl Iterator<Item = (TerminalID, char)> + 'a {
        input
            .chars()
            .map(move |c| (grammar.terminal_id(&c.to_string()).unwrap(), c))
    }

    #[test]
    fn builds_the_default_tree() {
        let g = Grammar::from_rules([
            ("S", vec!["C", "C"]),
            ("C", vec!["c", "C"]),
            ("C", vec!["d"]),
        ])
        .unwrap();
        let table = build_clr(&g).unwrap();

        let tree = parse(&g, &table, tokens(&g, "cdd")).unwrap();
        assert_eq!(tree.display(&g).to_string(), "S(C(c, C(d)), C(d))");
        assert_eq!(tree.leaves(), [&'c', &'d', &'d']);
    }

    #[test]
    fn unexpected_token_aborts() {
        let g = Grammar::from_rules([
            ("S", vec!["C", "C"]),
            ("C", vec!["c", "C"]),
            ("C", vec!["d"]),
        ])
        .unwrap();
        let table = build_clr(&g).unwrap();

        let err = parse(&g, &table, tokens(&g, "cddd")).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { .. }));

        let err = parse(&g, &table, tokens(&g, "cd")).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEndOfInput { .. }));

        // a failed parse leaves the tables untouched
        let tree = parse(&g, &table, tokens(&g, "dd")).unwrap();
        assert_eq!(tree.display(&g).to_string(), "S(C(d), C(d))");
    }

    #[test]
    fn empty_input_on_a_nullable_start() {
        let g = Grammar::from_rules([("S", vec!["S", "x"]), ("S", vec![])]).unwrap();
        let table = build_clr(&g).unwrap();

        let tree = parse(&g, &table, tokens(&g, "")).unwrap();
        assert_eq!(tree.display(&g).to_string(), "S()");

        let tree = parse(&g, &table, tokens(&g, "xx")).unwrap();
        assert_eq!(tree.display(&g).to_string(), "S(S(S(), x), x)");
    }
}
