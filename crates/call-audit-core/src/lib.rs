// crates/call-audit-core/src/lib.rs
// ============================================================================
// Module: Call Audit Core
// Description: Rule-based conformance evaluation for agent tool invocations.
// Purpose: Judge invocation batches against declared tool catalogs.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! This crate evaluates whether the tool invocations produced by an
//! automated agent conform to the tool catalog declared for the
//! conversation, without a ground-truth answer. Three binary checks are
//! applied per turn and aggregated across the record: correct function
//! identity, valid argument structure, and absence of calls to undefined
//! functions.
//!
//! Conversation records are untrusted input. Parsing is fail-soft by
//! design: unparsable metadata degrades to an empty catalog and unparsable
//! argument payloads degrade to a failing call verdict, never to a record
//! abort. The evaluation core is single-threaded, purely functional, and
//! free of wall-clock dependence.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use self::core::CallIssue;
pub use self::core::CallVerdict;
pub use self::core::ConversationRecord;
pub use self::core::DeclarationFault;
pub use self::core::EntryVerdict;
pub use self::core::FunctionSpec;
pub use self::core::InvocationFunction;
pub use self::core::Message;
pub use self::core::ParamType;
pub use self::core::ToolCatalog;
pub use self::core::ToolDeclaration;
pub use self::core::ToolInvocation;
pub use self::core::TurnVerdict;
pub use self::core::UNNAMED_FUNCTION;
pub use self::runtime::NO_INVOCATION_TURNS;
pub use self::runtime::check_hallucinated_calls;
pub use self::runtime::evaluate_call;
pub use self::runtime::evaluate_entry;
pub use self::runtime::evaluate_turn;
pub use self::runtime::validate_declaration;
