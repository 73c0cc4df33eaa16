//! Veritype - type-complexity analysis for TypeScript
//!
//! Scores the structural complexity of type declarations and flags the
//! ones that should carry an explicit runtime-validation annotation.
//! The scoring engine ([`engine`]) consumes a parser-independent
//! type-expression tree ([`ast`]); the bundled front-end ([`parsers`])
//! produces one from TypeScript source via tree-sitter.

pub mod ast;
pub mod cli;
pub mod config;
pub mod engine;
pub mod models;
pub mod parsers;
pub mod reporters;
