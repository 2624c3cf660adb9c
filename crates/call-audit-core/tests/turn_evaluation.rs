// crates/call-audit-core/tests/turn_evaluation.rs
// ============================================================================
// Module: Turn Evaluation Tests
// Description: Batch-level checks and turn verdict aggregation.
// Purpose: Ensure the undefined-function check gates per-call evaluation.
// Dependencies: call-audit-core, serde_json
// ============================================================================

//! Scenario tests for turn-level evaluation and its short-circuits.

use call_audit_core::InvocationFunction;
use call_audit_core::ToolCatalog;
use call_audit_core::ToolInvocation;
use call_audit_core::check_hallucinated_calls;
use call_audit_core::evaluate_turn;
use serde_json::Value;
use serde_json::json;

fn invocation(name: &str, arguments: Value) -> ToolInvocation {
    ToolInvocation {
        function: Some(InvocationFunction {
            name: Some(name.to_string()),
            arguments: Some(arguments),
        }),
    }
}

fn weather_catalog() -> Result<ToolCatalog, Box<dyn std::error::Error>> {
    let metadata = serde_json::to_string(&json!({
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
    }))?;
    Ok(ToolCatalog::from_metadata(Some(&metadata)))
}

#[test]
fn hallucinated_call_short_circuits_the_turn() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = weather_catalog()?;
    let batch = vec![
        invocation("get_weather", json!("{\"location\": \"Seoul\"}")),
        invocation("get_stock_price", json!("{}")),
    ];

    let verdict = evaluate_turn(&batch, &catalog);
    if verdict.no_hallucinated_calls || verdict.pass {
        return Err("expected the undefined call to fail the turn".into());
    }
    if verdict.correct_function_name || verdict.valid_arguments {
        return Err("expected identity and argument criteria to stay false".into());
    }
    if !verdict.tool_results.is_empty() {
        return Err("expected no per-call evaluation after the batch check failed".into());
    }
    let mentions_undefined = verdict
        .errors
        .iter()
        .any(|err| err.contains("undefined function call: get_stock_price"));
    if !mentions_undefined {
        return Err(format!("expected an undefined-call error, got {:?}", verdict.errors).into());
    }
    Ok(())
}

#[test]
fn empty_batch_never_passes() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = weather_catalog()?;
    let verdict = evaluate_turn(&[], &catalog);

    if verdict.pass || verdict.no_hallucinated_calls {
        return Err("expected the empty batch to stay all-false".into());
    }
    if !verdict.errors.is_empty() || verdict.num_tool_calls != 0 {
        return Err("expected an empty verdict for the empty batch".into());
    }
    Ok(())
}

#[test]
fn conforming_batch_passes() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = weather_catalog()?;
    let batch = vec![
        invocation("get_weather", json!("{\"location\": \"Seoul\"}")),
        invocation("get_weather", json!("{\"location\": \"Busan\"}")),
    ];

    let verdict = evaluate_turn(&batch, &catalog);
    if !verdict.pass {
        return Err(format!("expected a passing turn, got errors {:?}", verdict.errors).into());
    }
    if verdict.tool_results.len() != 2 || verdict.num_tool_calls != 2 {
        return Err("expected one result per invocation".into());
    }
    Ok(())
}

#[test]
fn invalid_arguments_clear_only_the_argument_criterion() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = weather_catalog()?;
    let batch = vec![
        invocation("get_weather", json!("{\"location\": \"Seoul\"}")),
        invocation("get_weather", json!("{}")),
    ];

    let verdict = evaluate_turn(&batch, &catalog);
    if verdict.pass || verdict.valid_arguments {
        return Err("expected the missing required parameter to fail the turn".into());
    }
    if !verdict.correct_function_name || !verdict.no_hallucinated_calls {
        return Err("expected identity and hallucination criteria to hold".into());
    }
    let prefixed = verdict.errors.iter().any(|err| err.starts_with("[get_weather] "));
    if !prefixed {
        return Err(format!("expected name-prefixed errors, got {:?}", verdict.errors).into());
    }
    Ok(())
}

#[test]
fn nameless_invocation_passes_the_batch_check() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = weather_catalog()?;
    let batch = vec![ToolInvocation {
        function: None,
    }];

    let flagged = check_hallucinated_calls(&batch, &catalog);
    if !flagged.is_empty() {
        return Err("expected the nameless invocation to be skipped".into());
    }

    let verdict = evaluate_turn(&batch, &catalog);
    if !verdict.no_hallucinated_calls {
        return Err("expected the batch check to pass".into());
    }
    if verdict.correct_function_name || verdict.valid_arguments || verdict.pass {
        return Err("expected the placeholder lookup to fail the call".into());
    }
    let mentions_unknown =
        verdict.errors.iter().any(|err| err.contains("undeclared function: unknown"));
    if !mentions_unknown {
        return Err(format!("expected a placeholder lookup error, got {:?}", verdict.errors).into());
    }
    Ok(())
}

#[test]
fn empty_catalog_makes_every_call_undefined() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = ToolCatalog::default();
    let batch = vec![invocation("get_weather", json!("{\"location\": \"Seoul\"}"))];

    let flagged = check_hallucinated_calls(&batch, &catalog);
    if flagged.len() != 1 {
        return Err(format!("expected one flagged call, got {flagged:?}").into());
    }

    let verdict = evaluate_turn(&batch, &catalog);
    if verdict.no_hallucinated_calls || verdict.pass {
        return Err("expected the empty catalog to fail the turn".into());
    }
    Ok(())
}
