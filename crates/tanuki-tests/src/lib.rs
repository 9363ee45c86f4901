//! Shared fixtures for the integration tests and benches.

pub mod grammars;
