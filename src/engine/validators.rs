//! Flat scorer for validator-construction calls
//!
//! A variable that builds a runtime validator (`strictInterface({...})`,
//! `union(a, b)`, ...) is judged by this intentionally shallow scorer
//! rather than the recursive engine: only the outermost call counts,
//! nested builder calls are not recursed into. Precision is traded for
//! bounded cost.

use crate::ast::ValidatorCall;

/// Builders taking an object of property validators
const OBJECT_BUILDERS: &[&str] = &["interface", "strictInterface"];

/// Builders wrapping a single inner validator or class
const WRAPPER_BUILDERS: &[&str] = &["optional", "array", "instanceIsA", "instanceOf"];

/// Key/value collection builders
const KEYED_BUILDERS: &[&str] = &["record", "map"];

/// Builders combining several validators
const COMBINATOR_BUILDERS: &[&str] = &["union", "intersection"];

/// Primitive-kind builders
const PRIMITIVE_BUILDERS: &[&str] = &[
    "string",
    "number",
    "boolean",
    "null",
    "undefined",
    "void",
    "symbol",
    "bigint",
];

/// Whether a callee name constructs a runtime validator. Drives the
/// front-end's structural detection of validator declarations.
pub fn is_validator_builder(name: &str) -> bool {
    OBJECT_BUILDERS.contains(&name)
        || WRAPPER_BUILDERS.contains(&name)
        || KEYED_BUILDERS.contains(&name)
        || COMBINATOR_BUILDERS.contains(&name)
        || PRIMITIVE_BUILDERS.contains(&name)
}

/// Score the outermost validator-construction call.
pub fn flat_score(call: &ValidatorCall) -> f64 {
    let callee = call.callee.as_str();
    if OBJECT_BUILDERS.contains(&callee) {
        10.0 + 3.0 * call.property_count as f64
    } else if WRAPPER_BUILDERS.contains(&callee) {
        2.0
    } else if KEYED_BUILDERS.contains(&callee) {
        3.0
    } else if COMBINATOR_BUILDERS.contains(&callee) {
        2.0 * call.argument_count as f64
    } else {
        // primitive-kind and unrecognized builders both land here
        1.0
    }
}
