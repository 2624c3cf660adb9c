// crates/call-audit-core/src/runtime/declaration.rs
// ============================================================================
// Module: Call Audit Declaration Validation
// Description: Structural well-formedness checks for function declarations.
// Purpose: Reject malformed declarations before any argument validation.
// Dependencies: crate::core, serde_json
// ============================================================================

//! ## Overview
//! Declaration validation checks a resolved function spec for structural
//! well-formedness: name consistency, presence of a parameter schema, and
//! the schema's object shape. Faults accumulate rather than short-circuit,
//! with one exception: once `parameters` is missing or not a mapping, the
//! remaining shape checks are meaningless and are skipped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;

use crate::core::DeclarationFault;
use crate::core::FunctionSpec;

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Placeholder rendered when a declared field is absent.
const UNSET: &str = "<unset>";

/// Validates a function declaration's structural well-formedness.
///
/// `name` is the name the spec was looked up under. The returned fault list
/// is empty iff the declaration is valid.
#[must_use]
pub fn validate_declaration(name: &str, spec: &FunctionSpec) -> Vec<DeclarationFault> {
    let mut faults = Vec::new();

    if spec.name.is_none() {
        faults.push(DeclarationFault::MissingName);
    }
    if spec.name.as_deref() != Some(name) {
        faults.push(DeclarationFault::NameMismatch {
            declared: spec.name.clone().unwrap_or_else(|| UNSET.to_string()),
        });
    }

    let Some(parameters) = &spec.parameters else {
        faults.push(DeclarationFault::MissingParameters);
        return faults;
    };
    let Value::Object(parameters) = parameters else {
        faults.push(DeclarationFault::ParametersNotObject);
        return faults;
    };

    if parameters.get("type").and_then(Value::as_str) != Some("object") {
        faults.push(DeclarationFault::ParametersTypeMismatch {
            found: parameters.get("type").map_or_else(|| UNSET.to_string(), render_tag),
        });
    }
    if !parameters.contains_key("properties") {
        faults.push(DeclarationFault::MissingProperties);
    }

    faults
}

/// Renders a schema type tag for diagnostics.
fn render_tag(tag: &Value) -> String {
    match tag {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
