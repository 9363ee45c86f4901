//! The table-driven shift-reduce driver.

use crate::definition::{ParseAction, ParserDef};

/// A trait for abstracting token symbols.
pub trait Token<TSym> {
    /// Return the terminal symbol index carried by this token.
    fn terminal(&self) -> TSym;
}

impl<TSym: Copy, V> Token<TSym> for (TSym, V) {
    fn terminal(&self) -> TSym {
        self.0
    }
}

/// The parser driven by a parse table, pulling tokens lazily from an
/// iterator. Exhaustion of the iterator is the end-of-input marker; no
/// explicit endmarker token has to appear in the stream.
pub struct Parser<TDef, TTok>
where
    TDef: ParserDef,
    TTok: Token<TDef::Terminal>,
{
    definition: TDef,
    state_stack: Vec<TDef::State>,
    item_stack: Vec<ParseItem<TTok, TDef::Nonterminal>>,
    parser_state: ParserState<TDef::Nonterminal>,
    peeked_token: Option<TTok>,
    reached_eoi: bool,
}

#[derive(Debug)]
enum ParserState<TSym> {
    Reading,
    PendingGoto(TSym),
    Accepted,
}

impl<TDef, TTok> Parser<TDef, TTok>
where
    TDef: ParserDef,
    TTok: Token<TDef::Terminal>,
{
    /// Create an instance of `Parser` using the specified parse table.
    pub fn new(definition: TDef) -> Self {
        let initial_state = definition.initial_state();
        Self {
            definition,
            state_stack: vec![initial_state],
            item_stack: vec![],
            parser_state: ParserState::Reading,
            peeked_token: None,
            reached_eoi: false,
        }
    }

    /// Consume tokens and drive the state machine until a production rule is
    /// matched or the input is accepted.
    ///
    /// On `ParseEvent::Reduce`, `args` holds the popped frames of the matched
    /// rule body in left-to-right order; on `ParseEvent::Accept` it holds the
    /// single remaining frame.
    pub fn next_event<I>(
        &mut self,
        tokens: &mut I,
        args: &mut Vec<ParseItem<TTok, TDef::Nonterminal>>,
    ) -> Result<ParseEvent<TDef>, ParseError>
    where
        I: Iterator<Item = TTok>,
    {
        loop {
            let current = *self
                .state_stack
                .last()
                .ok_or(ParseError::StackUnderflow)?;

            match self.parser_state {
                ParserState::PendingGoto(lhs) => {
                    let next = self.definition.goto(current, lhs).ok_or_else(|| {
                        ParseError::MissingGoto {
                            state: format!("{:?}", current),
                            symbol: format!("{:?}", lhs),
                        }
                    })?;
                    self.parser_state = ParserState::Reading;
                    self.state_stack.push(next);
                    continue;
                }
                ParserState::Accepted => return Err(ParseError::AlreadyAccepted),
                ParserState::Reading => {}
            }

            if self.peeked_token.is_none() && !self.reached_eoi {
                self.peeked_token = tokens.next();
                self.reached_eoi = self.peeked_token.is_none();
            }
            let lookahead = self.peeked_token.as_ref().map(Token::terminal);

            let action = self.definition.action(current, lookahead).ok_or_else(|| {
                let state = format!("{:?}", current);
                match lookahead {
                    Some(t) => ParseError::UnexpectedToken {
                        state,
                        token: format!("{:?}", t),
                    },
                    None => ParseError::UnexpectedEndOfInput { state },
                }
            })?;

            match action {
                ParseAction::Shift(next) => {
                    let token = self.peeked_token.take().ok_or_else(|| {
                        ParseError::UnexpectedEndOfInput {
                            state: format!("{:?}", current),
                        }
                    })?;
                    self.item_stack.push(ParseItem::T(token));
                    self.state_stack.push(next);
                }

                ParseAction::Reduce(rule, lhs, n) => {
                    args.clear();
                    args.resize_with(n, Default::default);
                    for i in 0..n {
                        self.state_stack.pop().ok_or(ParseError::StackUnderflow)?;
                        let arg = self.item_stack.pop().ok_or(ParseError::StackUnderflow)?;
                        args[n - i - 1] = arg;
                    }

                    self.item_stack.push(ParseItem::N(lhs));
                    self.parser_state = ParserState::PendingGoto(lhs);
                    return Ok(ParseEvent::Reduce(rule, lhs));
                }

                ParseAction::Accept => {
                    let arg = self.item_stack.pop().ok_or(ParseError::StackUnderflow)?;
                    args.clear();
                    args.push(arg);
                    self.parser_state = ParserState::Accepted;
                    return Ok(ParseEvent::Accept);
                }
            }
        }
    }
}

/// A frame popped off the parser stack during a reduction.
#[derive(Debug)]
#[non_exhaustive]
pub enum ParseItem<TTok, TSym> {
    /// A shifted token.
    T(TTok),

    /// A marker for an already-reduced nonterminal; the synthesized value
    /// lives with the caller.
    N(TSym),

    #[doc(hidden)]
    __Empty,
}

impl<TTok, TSym> Default for ParseItem<TTok, TSym> {
    fn default() -> Self {
        Self::__Empty
    }
}

#[derive(Debug)]
pub enum ParseEvent<TDef>
where
    TDef: ParserDef,
{
    /// A production rule has been matched.
    Reduce(TDef::Rule, TDef::Nonterminal),

    /// The whole input has been recognized.
    Accept,
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("unexpected token {token} in state {state}")]
    UnexpectedToken { state: String, token: String },

    #[error("unexpected end of input in state {state}")]
    UnexpectedEndOfInput { state: String },

    #[error("no goto transition from state {state} on {symbol}")]
    MissingGoto { state: String, symbol: String },

    #[error("the input has already been accepted")]
    AlreadyAccepted,

    #[error("parser stacks are corrupted")]
    StackUnderflow,
}
