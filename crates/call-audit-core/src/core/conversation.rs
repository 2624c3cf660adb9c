// crates/call-audit-core/src/core/conversation.rs
// ============================================================================
// Module: Call Audit Conversation Records
// Description: Conversation records, messages, and tool invocations.
// Purpose: Carry agent transcripts and expose per-turn invocation batches.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A conversation record is the unit of evaluation: an ordered message list
//! plus a JSON-encoded metadata string naming the declared tool catalog.
//! Records are untrusted input, so every field is optional or defaulted and
//! unknown fields are ignored. A turn is the ordered batch of invocations
//! emitted by a single assistant-authored message; messages without
//! invocations never materialize a turn.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde_json::Value;

// ============================================================================
// SECTION: Invocations
// ============================================================================

/// Message role tag for assistant-authored messages.
const ASSISTANT_ROLE: &str = "assistant";

/// Placeholder name used when an invocation omits its function name.
pub const UNNAMED_FUNCTION: &str = "unknown";

/// One model-issued request to call a named function.
///
/// # Invariants
/// - A missing `function` block yields no name and no arguments; such an
///   invocation is evaluated under [`UNNAMED_FUNCTION`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ToolInvocation {
    /// Invoked function name and argument payload.
    #[serde(default)]
    pub function: Option<InvocationFunction>,
}

impl ToolInvocation {
    /// Returns the invoked function name, if any was supplied.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.function.as_ref().and_then(|function| function.name.as_deref())
    }

    /// Returns the name this invocation is evaluated under.
    ///
    /// Falls back to [`UNNAMED_FUNCTION`] when the name is absent; an empty
    /// supplied name is preserved as-is.
    #[must_use]
    pub fn effective_name(&self) -> &str {
        self.name().unwrap_or(UNNAMED_FUNCTION)
    }

    /// Returns the raw argument payload, if any was supplied.
    #[must_use]
    pub fn arguments(&self) -> Option<&Value> {
        self.function.as_ref().and_then(|function| function.arguments.as_ref())
    }
}

/// Function block of a tool invocation.
///
/// # Invariants
/// - `arguments` is either a JSON-encoded object string or an
///   already-structured mapping; a blank string denotes no arguments.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InvocationFunction {
    /// Invoked function name.
    #[serde(default)]
    pub name: Option<String>,
    /// Argument payload: JSON-encoded object string or structured mapping.
    #[serde(default)]
    pub arguments: Option<Value>,
}

// ============================================================================
// SECTION: Messages
// ============================================================================

/// One message of a conversation transcript.
///
/// # Invariants
/// - Only assistant-authored messages contribute invocation turns.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Message {
    /// Message author role.
    #[serde(default)]
    pub role: Option<String>,
    /// Tool invocations issued within this message.
    #[serde(default)]
    pub tool_calls: Vec<ToolInvocation>,
}

impl Message {
    /// Returns true when this message is assistant-authored.
    #[must_use]
    fn is_assistant(&self) -> bool {
        self.role.as_deref() == Some(ASSISTANT_ROLE)
    }
}

// ============================================================================
// SECTION: Conversation Record
// ============================================================================

/// A full multi-turn conversation record under evaluation.
///
/// # Invariants
/// - `metadata` is a JSON-encoded string containing the declared tool
///   catalog under a `tools` key; absence or decode failure degrades to an
///   empty catalog downstream.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConversationRecord {
    /// Ordered conversation messages.
    #[serde(default)]
    pub messages: Vec<Message>,
    /// JSON-encoded metadata string carrying the tool catalog.
    #[serde(default)]
    pub metadata: Option<String>,
}

impl ConversationRecord {
    /// Extracts the ordered invocation turns of this record.
    ///
    /// A turn is the invocation batch of one assistant-authored message;
    /// messages with no invocations are excluded, so an empty batch is never
    /// returned within the list.
    #[must_use]
    pub fn invocation_turns(&self) -> Vec<&[ToolInvocation]> {
        self.messages
            .iter()
            .filter(|message| message.is_assistant() && !message.tool_calls.is_empty())
            .map(|message| message.tool_calls.as_slice())
            .collect()
    }
}
