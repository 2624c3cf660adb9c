// crates/call-audit-core/src/core/verdict.rs
// ============================================================================
// Module: Call Audit Verdicts
// Description: Call, turn, and entry verdicts with structured diagnostics.
// Purpose: Fold rule-check outcomes into binary pass/fail results.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Verdicts are computed at three granularities: per invocation, per turn,
//! and per entry. Every check is binary; `pass` at each level is the
//! conjunction of the three named criteria at that level. Diagnostics are
//! structured enum values rather than bare strings so callers can branch on
//! the issue category; they serialize as their display strings, keeping the
//! persisted `errors` arrays plain string lists.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use serde::Serializer;
use thiserror::Error;

// ============================================================================
// SECTION: Declaration Faults
// ============================================================================

/// Structural fault in a function declaration.
///
/// # Invariants
/// - Variants are stable; display strings double as persisted diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclarationFault {
    /// Declaration has no `name` field.
    #[error("declaration missing 'name' field")]
    MissingName,
    /// Declared name differs from the lookup name.
    #[error("declaration name does not match lookup name: {declared}")]
    NameMismatch {
        /// Name found in the declaration, or a placeholder when unset.
        declared: String,
    },
    /// Declaration has no `parameters` field.
    #[error("declaration missing 'parameters' field")]
    MissingParameters,
    /// Declaration `parameters` is not a structured mapping.
    #[error("declaration 'parameters' is not an object")]
    ParametersNotObject,
    /// Declaration `parameters.type` is not the literal `"object"`.
    #[error("declaration parameters.type is not 'object': {found}")]
    ParametersTypeMismatch {
        /// Type tag found in the schema, or a placeholder when unset.
        found: String,
    },
    /// Declaration `parameters` has no `properties` field.
    #[error("declaration 'parameters' missing 'properties' field")]
    MissingProperties,
}

// ============================================================================
// SECTION: Call Issues
// ============================================================================

/// Diagnostic raised while evaluating a single invocation or turn.
///
/// # Invariants
/// - Variants are stable; display strings double as persisted diagnostics.
/// - [`CallIssue::affects_function_identity`] is the single source of truth
///   for which categories clear a turn's `correct_function_name`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallIssue {
    /// Argument payload string failed to decode as JSON.
    #[error("argument payload is not valid JSON: {detail}")]
    ArgumentsNotJson {
        /// Decoder failure description.
        detail: String,
    },
    /// Argument payload decoded to something other than a JSON object.
    #[error("argument payload is not a JSON object")]
    ArgumentsNotObject,
    /// Invocation names a function with no catalog declaration.
    #[error("undeclared function: {name}")]
    UndeclaredFunction {
        /// Invoked function name.
        name: String,
    },
    /// Declaration resolved for the invocation is structurally malformed.
    #[error(transparent)]
    Declaration(DeclarationFault),
    /// Required parameters absent from the supplied arguments.
    #[error("missing required parameters: [{}]", .missing.join(", "))]
    MissingRequired {
        /// Names of the missing required parameters.
        missing: Vec<String>,
    },
    /// Supplied argument value does not match its declared type.
    #[error("parameter '{parameter}' type error: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Argument name.
        parameter: String,
        /// Declared type tag.
        expected: String,
        /// JSON kind of the supplied value.
        actual: String,
    },
    /// Batch-level check found an invocation of an undefined function.
    #[error("undefined function call: {name}")]
    UndefinedCall {
        /// Invoked function name.
        name: String,
    },
}

impl CallIssue {
    /// Returns true when this issue reflects a wrong or unusable function
    /// identity rather than an argument problem.
    #[must_use]
    pub const fn affects_function_identity(&self) -> bool {
        matches!(self, Self::UndeclaredFunction { .. } | Self::Declaration(_))
    }
}

impl Serialize for CallIssue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

// ============================================================================
// SECTION: Call Verdict
// ============================================================================

/// Verdict for a single invocation.
///
/// # Invariants
/// - `valid` is true iff `errors` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallVerdict {
    /// Name the invocation was evaluated under.
    pub function_name: String,
    /// True when no check recorded an issue.
    pub valid: bool,
    /// Issues recorded by the per-call checks.
    pub errors: Vec<CallIssue>,
}

impl CallVerdict {
    /// Creates a passing verdict with no issues.
    #[must_use]
    pub const fn passing(function_name: String) -> Self {
        Self {
            function_name,
            valid: true,
            errors: Vec::new(),
        }
    }

    /// Creates a failing verdict from a single terminal issue.
    #[must_use]
    pub fn failing(function_name: String, issue: CallIssue) -> Self {
        Self {
            function_name,
            valid: false,
            errors: vec![issue],
        }
    }

    /// Records an issue and clears `valid`.
    pub fn record(&mut self, issue: CallIssue) {
        self.valid = false;
        self.errors.push(issue);
    }
}

// ============================================================================
// SECTION: Turn Verdict
// ============================================================================

/// Verdict for one turn's invocation batch.
///
/// # Invariants
/// - `pass` is the conjunction of the three named criteria.
/// - `tool_results` stays empty when the batch-level undefined-function
///   check fails; per-call evaluation never ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnVerdict {
    /// True when every invocation resolved a well-formed declaration.
    pub correct_function_name: bool,
    /// True when every invocation's arguments passed validation.
    pub valid_arguments: bool,
    /// True when no invocation named an undefined function.
    pub no_hallucinated_calls: bool,
    /// Conjunction of the three criteria.
    pub pass: bool,
    /// Accumulated diagnostics, prefixed with the offending function name.
    pub errors: Vec<String>,
    /// Number of invocations in the batch.
    pub num_tool_calls: usize,
    /// Per-invocation verdicts, in batch order.
    pub tool_results: Vec<CallVerdict>,
    /// One-based turn index, assigned during entry evaluation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turn: Option<usize>,
}

impl TurnVerdict {
    /// Creates the all-false verdict for a batch of `num_tool_calls`.
    #[must_use]
    pub const fn unevaluated(num_tool_calls: usize) -> Self {
        Self {
            correct_function_name: false,
            valid_arguments: false,
            no_hallucinated_calls: false,
            pass: false,
            errors: Vec::new(),
            num_tool_calls,
            tool_results: Vec::new(),
            turn: None,
        }
    }
}

// ============================================================================
// SECTION: Entry Verdict
// ============================================================================

/// Verdict for a full conversation record.
///
/// # Invariants
/// - Each named criterion is the conjunction of that criterion across all
///   turn verdicts; `pass` is true only if every turn individually passed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryVerdict {
    /// Conjunction of `correct_function_name` across all turns.
    pub correct_function_name: bool,
    /// Conjunction of `valid_arguments` across all turns.
    pub valid_arguments: bool,
    /// Conjunction of `no_hallucinated_calls` across all turns.
    pub no_hallucinated_calls: bool,
    /// True only if every turn individually passed.
    pub pass: bool,
    /// Failing turns' diagnostics, prefixed with the one-based turn index.
    pub errors: Vec<String>,
    /// Number of turns carrying at least one invocation.
    pub num_turns: usize,
    /// Total invocation count across all turns.
    pub total_tool_calls: usize,
    /// Per-turn verdicts, in conversation order.
    pub turn_results: Vec<TurnVerdict>,
}

impl EntryVerdict {
    /// Creates the all-false verdict for a record with `num_turns` turns.
    #[must_use]
    pub const fn unevaluated(num_turns: usize) -> Self {
        Self {
            correct_function_name: false,
            valid_arguments: false,
            no_hallucinated_calls: false,
            pass: false,
            errors: Vec::new(),
            num_turns,
            total_tool_calls: 0,
            turn_results: Vec::new(),
        }
    }
}
