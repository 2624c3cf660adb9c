// crates/call-audit-core/src/core/catalog.rs
// ============================================================================
// Module: Call Audit Tool Catalog
// Description: Declared tool catalog, function specs, and parameter types.
// Purpose: Resolve invocation names against the declared function surface.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The tool catalog holds the function declarations available to a
//! conversation. Declarations arrive inside an entry's metadata as a
//! JSON-encoded string and are untrusted: malformed metadata degrades to an
//! empty catalog rather than failing the entry, and individually malformed
//! declaration entries are dropped at decode time. Lookup misses are never
//! errors; callers interpret absence as an undeclared function.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde::Deserialize;
use serde_json::Value;

// ============================================================================
// SECTION: Declarations
// ============================================================================

/// Declaration kind tag for callable functions.
const FUNCTION_KIND: &str = "function";

/// A single tool declaration from conversation metadata.
///
/// # Invariants
/// - Only declarations whose `kind` equals `"function"` participate in
///   lookups and name-set construction.
/// - Fields are optional because declarations are untrusted input.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ToolDeclaration {
    /// Declaration kind tag (`"function"` for callable tools).
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Declared function specification.
    #[serde(default)]
    pub function: Option<FunctionSpec>,
}

impl ToolDeclaration {
    /// Returns the function spec when this declaration is function-kind.
    #[must_use]
    fn function_spec(&self) -> Option<&FunctionSpec> {
        if self.kind.as_deref() == Some(FUNCTION_KIND) {
            self.function.as_ref()
        } else {
            None
        }
    }
}

/// Declared specification for a single callable function.
///
/// # Invariants
/// - `name` must equal the name under which the spec is looked up; the
///   declaration validator reports mismatches.
/// - `parameters` stays an uninterpreted JSON value so malformed shapes
///   survive decoding and are reported by validation instead.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FunctionSpec {
    /// Declared function name.
    #[serde(default)]
    pub name: Option<String>,
    /// Declared parameter schema (expected to be an `"object"` schema).
    #[serde(default)]
    pub parameters: Option<Value>,
}

// ============================================================================
// SECTION: Parameter Types
// ============================================================================

/// Closed enumeration of declared parameter type tags.
///
/// # Invariants
/// - Unknown tags map to [`ParamType::Other`], which matches any value; a
///   declared type outside the enumerated set never fails validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    /// Text values.
    String,
    /// Whole-number values.
    Integer,
    /// Whole-number or decimal values.
    Number,
    /// Truth values.
    Boolean,
    /// Ordered sequences.
    Array,
    /// Structured mappings.
    Object,
    /// Unrecognized type tag, matched permissively.
    Other(String),
}

impl ParamType {
    /// Parses a declared type tag into the closed enumeration.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "string" => Self::String,
            "integer" => Self::Integer,
            "number" => Self::Number,
            "boolean" => Self::Boolean,
            "array" => Self::Array,
            "object" => Self::Object,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the declared tag for diagnostics.
    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
            Self::Other(tag) => tag.as_str(),
        }
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Ordered catalog of tool declarations for one conversation.
///
/// # Invariants
/// - Declaration order is preserved; lookups return the first match.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToolCatalog {
    /// Declarations in metadata order.
    declarations: Vec<ToolDeclaration>,
}

impl ToolCatalog {
    /// Creates a catalog from an ordered declaration list.
    #[must_use]
    pub const fn new(declarations: Vec<ToolDeclaration>) -> Self {
        Self {
            declarations,
        }
    }

    /// Extracts the catalog from a JSON-encoded metadata string.
    ///
    /// Missing or unparsable metadata degrades to an empty catalog. Entries
    /// under `tools` that do not decode as declarations are dropped.
    #[must_use]
    pub fn from_metadata(metadata: Option<&str>) -> Self {
        let Some(raw) = metadata else {
            return Self::default();
        };
        let Ok(parsed) = serde_json::from_str::<Value>(raw) else {
            return Self::default();
        };
        let Some(Value::Array(entries)) = parsed.get("tools") else {
            return Self::default();
        };
        let declarations = entries
            .iter()
            .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
            .collect();
        Self::new(declarations)
    }

    /// Finds the first function-kind declaration matching `name`.
    ///
    /// Returns `None` on a miss; an absent declaration is interpreted by
    /// callers as an undeclared function, never as an error.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&FunctionSpec> {
        self.declarations.iter().find_map(|declaration| {
            declaration
                .function_spec()
                .filter(|spec| spec.name.as_deref() == Some(name))
        })
    }

    /// Collects the set of all declared function names.
    #[must_use]
    pub fn declared_names(&self) -> BTreeSet<&str> {
        self.declarations
            .iter()
            .filter_map(ToolDeclaration::function_spec)
            .filter_map(|spec| spec.name.as_deref())
            .collect()
    }

    /// Returns true when the catalog holds no declarations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}
