//! `tanuki` is a parser-generator toolkit for context-free grammars: it
//! computes FIRST/FOLLOW sets, constructs SLR, canonical LR(1) and LALR(1)
//! automata, compiles them into ACTION/GOTO tables (any conflict is a hard
//! construction error), and drives the generic shift-reduce engine from
//! `tanuki-runtime` over the result.

pub mod analysis;
pub mod driver;
pub mod grammar;
pub mod lr;
pub mod types;
pub mod util;

pub use crate::{
    analysis::Analysis,
    driver::{parse, parse_with, ParseTree, TableDef},
    grammar::Grammar,
    lr::{build, build_clr, build_lalr, build_slr, Method},
};
