//! Parser definition.

use std::fmt;

/// The trait for abstracting the shape of an LR parse table.
///
/// The driver never inspects the table representation itself; everything it
/// needs is the initial state, the ACTION lookup and the GOTO lookup.
pub trait ParserDef {
    /// The number to identify the state of the LR automaton.
    type State: Copy + fmt::Debug;

    /// The number to identify terminal symbols.
    type Terminal: Copy + fmt::Debug;

    /// The number to identify nonterminal symbols.
    type Nonterminal: Copy + fmt::Debug;

    /// The number to identify production rules.
    type Rule: Copy + fmt::Debug;

    /// Return the initial state number.
    fn initial_state(&self) -> Self::State;

    /// Return the action registered for the specified state and lookahead
    /// symbol, or `None` if the ACTION slot is empty.
    ///
    /// A lookahead of `None` denotes the end of input.
    fn action(
        &self,
        current: Self::State,
        lookahead: Option<Self::Terminal>,
    ) -> Option<ParseAction<Self::State, Self::Nonterminal, Self::Rule>>;

    /// Return the GOTO transition for the specified state and nonterminal
    /// symbol, or `None` if the slot is empty.
    fn goto(&self, current: Self::State, symbol: Self::Nonterminal) -> Option<Self::State>;
}

impl<T: ?Sized> ParserDef for &T
where
    T: ParserDef,
{
    type State = T::State;
    type Terminal = T::Terminal;
    type Nonterminal = T::Nonterminal;
    type Rule = T::Rule;

    fn initial_state(&self) -> Self::State {
        (**self).initial_state()
    }

    fn action(
        &self,
        current: Self::State,
        lookahead: Option<Self::Terminal>,
    ) -> Option<ParseAction<Self::State, Self::Nonterminal, Self::Rule>> {
        (**self).action(current, lookahead)
    }

    fn goto(&self, current: Self::State, symbol: Self::Nonterminal) -> Option<Self::State> {
        (**self).goto(current, symbol)
    }
}

impl<T: ?Sized> ParserDef for std::rc::Rc<T>
where
    T: ParserDef,
{
    type State = T::State;
    type Terminal = T::Terminal;
    type Nonterminal = T::Nonterminal;
    type Rule = T::Rule;

    fn initial_state(&self) -> Self::State {
        (**self).initial_state()
    }

    fn action(
        &self,
        current: Self::State,
        lookahead: Option<Self::Terminal>,
    ) -> Option<ParseAction<Self::State, Self::Nonterminal, Self::Rule>> {
        (**self).action(current, lookahead)
    }

    fn goto(&self, current: Self::State, symbol: Self::Nonterminal) -> Option<Self::State> {
        (**self).goto(current, symbol)
    }
}

impl<T: ?Sized> ParserDef for std::sync::Arc<T>
where
    T: ParserDef,
{
    type State = T::State;
    type Terminal = T::Terminal;
    type Nonterminal = T::Nonterminal;
    type Rule = T::Rule;

    fn initial_state(&self) -> Self::State {
        (**self).initial_state()
    }

    fn action(
        &self,
        current: Self::State,
        lookahead: Option<Self::Terminal>,
    ) -> Option<ParseAction<Self::State, Self::Nonterminal, Self::Rule>> {
        (**self).action(current, lookahead)
    }

    fn goto(&self, current: Self::State, symbol: Self::Nonterminal) -> Option<Self::State> {
        (**self).goto(current, symbol)
    }
}

/// The action that the LR automaton in a state performs on a particular
/// lookahead symbol.
#[derive(Debug, Copy, Clone)]
#[non_exhaustive]
pub enum ParseAction<TState, TNonterminal, TRule> {
    /// Read the lookahead symbol and transition to the specified state.
    Shift(TState),

    /// Match the specified production rule, popping as many frames as its
    /// body is long.
    Reduce(TRule, TNonterminal, usize),

    /// The input has been recognized.
    Accept,
}
