//! Grammar definitions for integration tests.

use tanuki::grammar::Grammar;

/// `S -> C C, C -> c C, C -> d` — in every deterministic class; canonical
/// LR(1) splits its states, LALR does not.
pub fn g_cc() -> Grammar {
    Grammar::from_rules([
        ("S", vec!["C", "C"]),
        ("C", vec!["c", "C"]),
        ("C", vec!["d"]),
    ])
    .unwrap()
}

/// The left-recursive expression grammar; SLR(1).
pub fn g_expr() -> Grammar {
    Grammar::from_rules([
        ("E", vec!["E", "+", "T"]),
        ("E", vec!["T"]),
        ("T", vec!["T", "*", "F"]),
        ("T", vec!["F"]),
        ("F", vec!["(", "E", ")"]),
        ("F", vec!["id"]),
    ])
    .unwrap()
}

/// The ε-heavy right-recursive expression grammar; SLR(1).
pub fn g_expr_ll() -> Grammar {
    Grammar::from_rules([
        ("E", vec!["T", "E'"]),
        ("E'", vec!["+", "T", "E'"]),
        ("E'", vec![]),
        ("T", vec!["F", "T'"]),
        ("T'", vec!["*", "F", "T'"]),
        ("T'", vec![]),
        ("F", vec!["(", "E", ")"]),
        ("F", vec!["id"]),
    ])
    .unwrap()
}

/// Sums and products of numbers; operator precedence comes purely from the
/// grammar shape.
pub fn g_sum_prod() -> Grammar {
    Grammar::from_rules([
        ("sum", vec!["product"]),
        ("sum", vec!["sum", "+", "product"]),
        ("product", vec!["number"]),
        ("product", vec!["product", "*", "number"]),
    ])
    .unwrap()
}

/// Dangling-else-style ambiguity: a genuine shift/reduce conflict in every
/// deterministic class.
pub fn g_dangling() -> Grammar {
    Grammar::from_rules([
        ("S", vec!["if", "S"]),
        ("S", vec!["if", "S", "else", "S"]),
        ("S", vec!["other"]),
    ])
    .unwrap()
}

/// LR(1) (and LALR(1)) but not SLR(1): FOLLOW(A) is too coarse in the state
/// reached on `d' from the start.
pub fn g_slr_gap() -> Grammar {
    Grammar::from_rules([
        ("S", vec!["A", "a"]),
        ("S", vec!["b", "A", "c"]),
        ("S", vec!["d", "c"]),
        ("S", vec!["b", "d", "a"]),
        ("A", vec!["d"]),
    ])
    .unwrap()
}
