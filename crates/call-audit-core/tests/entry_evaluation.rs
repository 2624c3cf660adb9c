// crates/call-audit-core/tests/entry_evaluation.rs
// ============================================================================
// Module: Entry Evaluation Tests
// Description: Whole-record aggregation across invocation turns.
// Purpose: Ensure entry verdicts require a unanimous pass and degrade safely.
// Dependencies: call-audit-core, serde_json
// ============================================================================

//! Scenario tests for entry-level aggregation and metadata degradation.

use call_audit_core::ConversationRecord;
use call_audit_core::evaluate_entry;
use serde_json::Value;
use serde_json::json;

/// Metadata string declaring `get_weather(location: string [required])`.
fn weather_metadata() -> Result<String, Box<dyn std::error::Error>> {
    Ok(serde_json::to_string(&json!({
        "tools": [{
            "type": "function",
            "function": {
                "name": "get_weather",
                "parameters": {
                    "type": "object",
                    "properties": {"location": {"type": "string"}},
                    "required": ["location"]
                }
            }
        }]
    }))?)
}

fn assistant_turn(arguments: &str) -> Value {
    json!({
        "role": "assistant",
        "tool_calls": [
            {"function": {"name": "get_weather", "arguments": arguments}}
        ]
    })
}

fn record(
    messages: Value,
    metadata: Option<String>,
) -> Result<ConversationRecord, Box<dyn std::error::Error>> {
    let mut raw = json!({ "messages": messages });
    if let Some(metadata) = metadata {
        raw["metadata"] = Value::String(metadata);
    }
    Ok(serde_json::from_value(raw)?)
}

#[test]
fn mixed_turns_fail_the_entry() -> Result<(), Box<dyn std::error::Error>> {
    let record = record(
        json!([
            assistant_turn("{\"location\": \"Seoul\"}"),
            {"role": "tool", "content": "sunny"},
            assistant_turn("{}"),
        ]),
        Some(weather_metadata()?),
    )?;

    let verdict = evaluate_entry(&record);
    if verdict.pass {
        return Err("expected the failing second turn to fail the entry".into());
    }
    if verdict.num_turns != 2 || verdict.total_tool_calls != 2 {
        return Err(format!(
            "unexpected counts: {} turns, {} calls",
            verdict.num_turns, verdict.total_tool_calls
        )
        .into());
    }
    let turns: Vec<Option<usize>> =
        verdict.turn_results.iter().map(|turn| turn.turn).collect();
    if turns != vec![Some(1), Some(2)] {
        return Err(format!("unexpected turn indices: {turns:?}").into());
    }
    if !verdict.turn_results[0].pass || verdict.turn_results[1].pass {
        return Err("expected [pass, fail] turn verdicts".into());
    }
    let prefixed = verdict.errors.iter().any(|err| err.starts_with("[turn 2] "));
    if !prefixed {
        return Err(format!("expected turn-prefixed errors, got {:?}", verdict.errors).into());
    }
    Ok(())
}

#[test]
fn unanimous_turns_pass_the_entry() -> Result<(), Box<dyn std::error::Error>> {
    let record = record(
        json!([
            assistant_turn("{\"location\": \"Seoul\"}"),
            assistant_turn("{\"location\": \"Busan\"}"),
        ]),
        Some(weather_metadata()?),
    )?;

    let verdict = evaluate_entry(&record);
    if !verdict.pass {
        return Err(format!("expected a passing entry, got errors {:?}", verdict.errors).into());
    }
    if !verdict.correct_function_name
        || !verdict.valid_arguments
        || !verdict.no_hallucinated_calls
    {
        return Err("expected all three criteria to hold".into());
    }
    if !verdict.errors.is_empty() {
        return Err(format!("expected no entry errors, got {:?}", verdict.errors).into());
    }
    Ok(())
}

#[test]
fn record_without_invocations_fails() -> Result<(), Box<dyn std::error::Error>> {
    let record = record(
        json!([
            {"role": "user", "content": "hello"},
            {"role": "assistant", "content": "hi", "tool_calls": []},
        ]),
        Some(weather_metadata()?),
    )?;

    let verdict = evaluate_entry(&record);
    if verdict.pass || verdict.num_turns != 0 {
        return Err("expected an all-false verdict with zero turns".into());
    }
    let annotated =
        verdict.errors.iter().any(|err| err == "no turn contains a tool invocation");
    if !annotated {
        return Err(format!("expected the zero-turn diagnostic, got {:?}", verdict.errors).into());
    }
    Ok(())
}

#[test]
fn non_assistant_tool_calls_never_form_turns() -> Result<(), Box<dyn std::error::Error>> {
    let record = record(
        json!([
            {"role": "tool", "tool_calls": [
                {"function": {"name": "get_weather", "arguments": "{}"}}
            ]},
        ]),
        Some(weather_metadata()?),
    )?;

    let verdict = evaluate_entry(&record);
    if verdict.num_turns != 0 {
        return Err("expected tool-role messages to be excluded".into());
    }
    Ok(())
}

#[test]
fn unparsable_metadata_degrades_to_hallucinations() -> Result<(), Box<dyn std::error::Error>> {
    let record = record(
        json!([assistant_turn("{\"location\": \"Seoul\"}")]),
        Some("{not metadata".to_string()),
    )?;

    let verdict = evaluate_entry(&record);
    if verdict.pass || verdict.no_hallucinated_calls {
        return Err("expected the degraded catalog to fail the turn".into());
    }
    let mentions_undefined =
        verdict.errors.iter().any(|err| err.contains("undefined function call: get_weather"));
    if !mentions_undefined {
        return Err(format!("expected undefined-call errors, got {:?}", verdict.errors).into());
    }
    Ok(())
}

#[test]
fn missing_metadata_degrades_to_hallucinations() -> Result<(), Box<dyn std::error::Error>> {
    let record = record(json!([assistant_turn("{\"location\": \"Seoul\"}")]), None)?;

    let verdict = evaluate_entry(&record);
    if verdict.pass || verdict.no_hallucinated_calls {
        return Err("expected the missing catalog to fail the turn".into());
    }
    Ok(())
}

#[test]
fn entry_criteria_match_turn_conjunctions() -> Result<(), Box<dyn std::error::Error>> {
    let record = record(
        json!([
            assistant_turn("{\"location\": \"Seoul\"}"),
            assistant_turn("{}"),
        ]),
        Some(weather_metadata()?),
    )?;

    let verdict = evaluate_entry(&record);
    let folded_names =
        verdict.turn_results.iter().all(|turn| turn.correct_function_name);
    let folded_arguments = verdict.turn_results.iter().all(|turn| turn.valid_arguments);
    let folded_hallucinations =
        verdict.turn_results.iter().all(|turn| turn.no_hallucinated_calls);

    if verdict.correct_function_name != folded_names
        || verdict.valid_arguments != folded_arguments
        || verdict.no_hallucinated_calls != folded_hallucinations
    {
        return Err("expected entry criteria to equal the folds over turns".into());
    }
    if verdict.pass != verdict.turn_results.iter().all(|turn| turn.pass) {
        return Err("expected entry pass to require every turn to pass".into());
    }
    Ok(())
}

#[test]
fn evaluation_is_idempotent() -> Result<(), Box<dyn std::error::Error>> {
    let record = record(
        json!([
            assistant_turn("{\"location\": \"Seoul\"}"),
            assistant_turn("{\"location\": 5}"),
        ]),
        Some(weather_metadata()?),
    )?;

    let first = evaluate_entry(&record);
    let second = evaluate_entry(&record);
    if first != second {
        return Err("expected identical verdicts across evaluations".into());
    }

    let first_rendered = serde_json::to_string(&first)?;
    let second_rendered = serde_json::to_string(&second)?;
    if first_rendered != second_rendered {
        return Err("expected byte-identical serialized verdicts".into());
    }
    Ok(())
}
