// crates/call-audit-core/src/runtime/entry.rs
// ============================================================================
// Module: Call Audit Entry Evaluation
// Description: Whole-record evaluation across all invocation turns.
// Purpose: Fold turn verdicts into one entry-level verdict.
// Dependencies: crate::core, crate::runtime
// ============================================================================

//! ## Overview
//! Entry evaluation extracts the tool catalog from a record's metadata and
//! the ordered invocation turns from its messages, evaluates each turn, and
//! requires a unanimous pass. Metadata that is missing or unparsable
//! degrades to an empty catalog, which turns every invocation into an
//! undefined-function failure rather than aborting the record.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::ConversationRecord;
use crate::core::EntryVerdict;
use crate::core::ToolCatalog;
use crate::runtime::turn::evaluate_turn;

// ============================================================================
// SECTION: Entry Evaluation
// ============================================================================

/// Diagnostic recorded when a record has no invocation-bearing turn.
pub const NO_INVOCATION_TURNS: &str = "no turn contains a tool invocation";

/// Evaluates a full conversation record.
#[must_use]
pub fn evaluate_entry(record: &ConversationRecord) -> EntryVerdict {
    let catalog = ToolCatalog::from_metadata(record.metadata.as_deref());
    let turns = record.invocation_turns();

    let mut verdict = EntryVerdict::unevaluated(turns.len());
    if turns.is_empty() {
        verdict.errors.push(NO_INVOCATION_TURNS.to_string());
        return verdict;
    }

    let mut all_turns_pass = true;
    for (index, invocations) in turns.iter().enumerate() {
        let turn_number = index.saturating_add(1);
        let mut turn = evaluate_turn(invocations, &catalog);
        turn.turn = Some(turn_number);
        verdict.total_tool_calls = verdict.total_tool_calls.saturating_add(invocations.len());

        if !turn.pass {
            all_turns_pass = false;
            verdict
                .errors
                .extend(turn.errors.iter().map(|err| format!("[turn {turn_number}] {err}")));
        }
        verdict.turn_results.push(turn);
    }

    // Recomputed over the collected turns rather than inherited from the
    // loop accumulator; the two must always agree.
    verdict.correct_function_name =
        verdict.turn_results.iter().all(|turn| turn.correct_function_name);
    verdict.valid_arguments = verdict.turn_results.iter().all(|turn| turn.valid_arguments);
    verdict.no_hallucinated_calls =
        verdict.turn_results.iter().all(|turn| turn.no_hallucinated_calls);
    verdict.pass = all_turns_pass;

    verdict
}
