//! Runtime implementation for the `tanuki` parser toolkit.
//!
//! The driver in this crate is agnostic to how the parse table was
//! constructed; SLR, canonical LR(1) and LALR(1) tables all run on the
//! same engine.

pub mod definition;
pub mod parser;

pub use crate::{
    definition::{ParseAction, ParserDef},
    parser::{ParseError, ParseEvent, ParseItem, Parser, Token},
};
