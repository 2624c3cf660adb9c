// crates/call-audit-core/src/runtime/call.rs
// ============================================================================
// Module: Call Audit Invocation Evaluation
// Description: Per-invocation argument parsing and rule checks.
// Purpose: Produce one binary verdict per invocation with diagnostics.
// Dependencies: crate::core, crate::runtime, serde_json
// ============================================================================

//! ## Overview
//! Call evaluation runs one invocation through the full rule sequence:
//! decode the argument payload, resolve the declaration, validate its
//! shape, check required-argument presence, and type-check each supplied
//! argument. Decode failures, undeclared functions, and malformed
//! declarations are terminal for the invocation; missing-required and
//! type-mismatch faults accumulate within the same pass. Nothing here is
//! terminal for the surrounding turn or entry.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;

use crate::core::CallIssue;
use crate::core::CallVerdict;
use crate::core::ParamType;
use crate::core::ToolCatalog;
use crate::core::ToolInvocation;
use crate::runtime::declaration::validate_declaration;
use crate::runtime::typecheck::coerce_integer_string;
use crate::runtime::typecheck::matches_declared_type;
use crate::runtime::typecheck::value_kind;

// ============================================================================
// SECTION: Call Evaluation
// ============================================================================

/// Evaluates one invocation against the declared catalog.
#[must_use]
pub fn evaluate_call(invocation: &ToolInvocation, catalog: &ToolCatalog) -> CallVerdict {
    let name = invocation.effective_name().to_string();

    let arguments = match parse_arguments(invocation.arguments()) {
        Ok(arguments) => arguments,
        Err(issue) => return CallVerdict::failing(name, issue),
    };

    let Some(spec) = catalog.find(&name) else {
        let issue = CallIssue::UndeclaredFunction {
            name: name.clone(),
        };
        return CallVerdict::failing(name, issue);
    };

    let faults = validate_declaration(&name, spec);
    if !faults.is_empty() {
        let mut verdict = CallVerdict::passing(name);
        for fault in faults {
            verdict.record(CallIssue::Declaration(fault));
        }
        return verdict;
    }

    let mut verdict = CallVerdict::passing(name);
    let Some(Value::Object(parameters)) = &spec.parameters else {
        return verdict;
    };

    check_required(parameters, &arguments, &mut verdict);
    check_argument_types(parameters, &arguments, &mut verdict);

    verdict
}

// ============================================================================
// SECTION: Argument Parsing
// ============================================================================

/// Decodes an invocation's argument payload into a mapping.
///
/// A JSON-encoded string must decode to an object; a blank string denotes
/// no arguments. An already-structured mapping is used directly, and any
/// other structured payload degrades to an empty mapping.
fn parse_arguments(payload: Option<&Value>) -> Result<Map<String, Value>, CallIssue> {
    match payload {
        None => Ok(Map::new()),
        Some(Value::String(raw)) => {
            if raw.trim().is_empty() {
                return Ok(Map::new());
            }
            match serde_json::from_str::<Value>(raw) {
                Ok(Value::Object(map)) => Ok(map),
                Ok(_) => Err(CallIssue::ArgumentsNotObject),
                Err(err) => Err(CallIssue::ArgumentsNotJson {
                    detail: err.to_string(),
                }),
            }
        }
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(_) => Ok(Map::new()),
    }
}

// ============================================================================
// SECTION: Argument Checks
// ============================================================================

/// Records one issue naming every required parameter absent from `arguments`.
///
/// Missing required parameters do not short-circuit type checking; the
/// supplied arguments are still checked afterwards.
fn check_required(
    parameters: &Map<String, Value>,
    arguments: &Map<String, Value>,
    verdict: &mut CallVerdict,
) {
    let Some(Value::Array(required)) = parameters.get("required") else {
        return;
    };

    let missing: Vec<String> = required
        .iter()
        .filter_map(|entry| match entry.as_str() {
            Some(name) if arguments.contains_key(name) => None,
            Some(name) => Some(name.to_string()),
            // A non-string entry can never be an argument key.
            None => Some(entry.to_string()),
        })
        .collect();

    if !missing.is_empty() {
        verdict.record(CallIssue::MissingRequired {
            missing,
        });
    }
}

/// Type-checks every supplied argument that matches a declared property.
///
/// Arguments without a declared property are ignored; extra arguments are
/// never themselves an error.
fn check_argument_types(
    parameters: &Map<String, Value>,
    arguments: &Map<String, Value>,
    verdict: &mut CallVerdict,
) {
    let Some(Value::Object(properties)) = parameters.get("properties") else {
        return;
    };

    for (name, supplied) in arguments {
        let Some(property) = properties.get(name) else {
            continue;
        };
        let Some(tag) = property.get("type").and_then(Value::as_str) else {
            continue;
        };
        let declared = ParamType::from_tag(tag);

        let coerced;
        let mut value = supplied;
        if declared == ParamType::Integer {
            if let Some(parsed) = coerce_integer_string(supplied) {
                coerced = parsed;
                value = &coerced;
            }
        }

        if !matches_declared_type(&declared, value) {
            verdict.record(CallIssue::TypeMismatch {
                parameter: name.clone(),
                expected: declared.tag().to_string(),
                actual: value_kind(value).to_string(),
            });
        }
    }
}
