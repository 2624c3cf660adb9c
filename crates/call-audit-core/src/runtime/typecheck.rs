// crates/call-audit-core/src/runtime/typecheck.rs
// ============================================================================
// Module: Call Audit Argument Type Checking
// Description: Declared-type matching for supplied argument values.
// Purpose: Map type tags onto JSON value categories deterministically.
// Dependencies: crate::core, serde_json
// ============================================================================

//! ## Overview
//! Type checking maps each declared tag onto the JSON value categories it
//! accepts. The mapping is a closed enumeration: unknown tags match
//! permissively, booleans and integers are disjoint categories, and the
//! only coercion is the forgiving integer-from-string rule applied before
//! the check. Supplied values are untrusted and never interpreted beyond
//! their JSON kind.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;

use crate::core::ParamType;

// ============================================================================
// SECTION: Type Matching
// ============================================================================

/// Checks a supplied value against a declared parameter type.
#[must_use]
pub fn matches_declared_type(declared: &ParamType, value: &Value) -> bool {
    match declared {
        ParamType::String => value.is_string(),
        ParamType::Integer => is_whole_number(value),
        ParamType::Number => value.is_number(),
        ParamType::Boolean => value.is_boolean(),
        ParamType::Array => value.is_array(),
        ParamType::Object => value.is_object(),
        ParamType::Other(_) => true,
    }
}

/// Returns true for whole-number JSON values.
///
/// Booleans are never whole numbers; `serde_json` keeps the categories
/// disjoint and this check must preserve that.
fn is_whole_number(value: &Value) -> bool {
    match value {
        Value::Number(number) => number.is_i64() || number.is_u64(),
        _ => false,
    }
}

/// Names the JSON kind of a value for diagnostics.
#[must_use]
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(number) => {
            if number.is_i64() || number.is_u64() {
                "integer"
            } else {
                "number"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// SECTION: Coercion
// ============================================================================

/// Attempts the forgiving integer-from-string coercion.
///
/// A textual value that parses as a whole number is substituted for the
/// declared-`integer` comparison and all subsequent use. A failed parse
/// returns `None`, leaving the original text in place so the type check
/// fails naturally.
#[must_use]
pub fn coerce_integer_string(value: &Value) -> Option<Value> {
    let Value::String(text) = value else {
        return None;
    };
    text.trim().parse::<i64>().ok().map(Value::from)
}
