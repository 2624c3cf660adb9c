// crates/call-audit-core/src/runtime/turn.rs
// ============================================================================
// Module: Call Audit Turn Evaluation
// Description: Batch-level undefined-function check and turn verdicts.
// Purpose: Fold per-invocation outcomes into one turn-level verdict.
// Dependencies: crate::core, crate::runtime
// ============================================================================

//! ## Overview
//! A turn is evaluated in two phases. The undefined-function check runs
//! first over the whole batch; when it fails, per-invocation evaluation is
//! skipped entirely, since declaration lookups for the remaining calls
//! would be unreliable. Otherwise every invocation is evaluated and the
//! results fold into the turn's three criteria.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::CallIssue;
use crate::core::ToolCatalog;
use crate::core::ToolInvocation;
use crate::core::TurnVerdict;
use crate::runtime::call::evaluate_call;

// ============================================================================
// SECTION: Undefined-Function Check
// ============================================================================

/// Flags every invocation naming a function absent from the catalog.
///
/// Invocations without a name are skipped; the returned list is empty iff
/// no invocation references an undefined function.
#[must_use]
pub fn check_hallucinated_calls(
    invocations: &[ToolInvocation],
    catalog: &ToolCatalog,
) -> Vec<CallIssue> {
    let declared = catalog.declared_names();
    invocations
        .iter()
        .filter_map(|invocation| {
            let name = invocation.name()?;
            if name.is_empty() || declared.contains(name) {
                None
            } else {
                Some(CallIssue::UndefinedCall {
                    name: name.to_string(),
                })
            }
        })
        .collect()
}

// ============================================================================
// SECTION: Turn Evaluation
// ============================================================================

/// Evaluates one turn's invocation batch against the catalog.
///
/// An empty batch yields the all-false verdict; the extractor never
/// materializes empty turns, but the evaluator tolerates them.
#[must_use]
pub fn evaluate_turn(invocations: &[ToolInvocation], catalog: &ToolCatalog) -> TurnVerdict {
    let mut verdict = TurnVerdict::unevaluated(invocations.len());
    if invocations.is_empty() {
        return verdict;
    }

    let hallucinations = check_hallucinated_calls(invocations, catalog);
    if !hallucinations.is_empty() {
        verdict.errors.extend(hallucinations.iter().map(ToString::to_string));
        return verdict;
    }
    verdict.no_hallucinated_calls = true;

    let mut all_names_correct = true;
    let mut all_arguments_valid = true;
    for invocation in invocations {
        let call = evaluate_call(invocation, catalog);
        if call.errors.iter().any(CallIssue::affects_function_identity) {
            all_names_correct = false;
        }
        if !call.valid {
            all_arguments_valid = false;
            verdict
                .errors
                .extend(call.errors.iter().map(|issue| format!("[{}] {issue}", call.function_name)));
        }
        verdict.tool_results.push(call);
    }

    verdict.correct_function_name = all_names_correct;
    verdict.valid_arguments = all_arguments_valid;
    verdict.pass =
        verdict.correct_function_name && verdict.valid_arguments && verdict.no_hallucinated_calls;
    verdict
}
