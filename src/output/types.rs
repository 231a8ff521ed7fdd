//! Output types for rx-playground
//!
//! Everything the presentation layer renders is serializable so the same
//! values back both the JSON and the text views.

use serde::{Deserialize, Serialize};

use crate::core::Derivation;

/// A single capture group within a match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capture {
    /// Group number (1-indexed for capturing groups)
    pub group: usize,
    /// Named group name (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Captured text
    pub text: String,
    /// Start byte position (0-indexed)
    pub start: usize,
    /// End byte position (exclusive)
    pub end: usize,
}

/// A single match result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    /// Full matched text
    pub text: String,
    /// Start byte position (0-indexed)
    pub start: usize,
    /// End byte position (exclusive)
    pub end: usize,
    /// Capture groups that participated in the match
    pub captures: Vec<Capture>,
}

/// Byte range of a node within the pattern source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// One node of a pattern's syntax tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxNode {
    /// Node kind (literal, repetition, capturing_group, ...)
    pub kind: String,
    /// Pattern source covered by this node
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    /// Human-readable description of the node
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Capturing group number (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    pub fn new(kind: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            text: text.into(),
            span: None,
            detail: None,
            group: None,
            children: Vec::new(),
        }
    }

    pub fn with_span(mut self, start: usize, end: usize) -> Self {
        self.span = Some(Span { start, end });
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_group(mut self, group: usize) -> Self {
        self.group = Some(group);
        self
    }

    pub fn with_children(mut self, children: Vec<SyntaxNode>) -> Self {
        self.children = children;
        self
    }

    /// Depth-first search for the first node of the given kind
    #[cfg(test)]
    pub fn find_kind(&self, kind: &str) -> Option<&SyntaxNode> {
        if self.kind == kind {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_kind(kind))
    }
}

/// Structural decomposition of a compiled pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxTree {
    /// Which engine compiled the pattern (regex or fancy-regex)
    pub engine: String,
    pub root: SyntaxNode,
}

/// Availability of the regex engine, reported out-of-band from the result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStatus {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Documentation links shown next to the result views
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocLinks {
    pub regex: String,
    pub regex_syntax: String,
}

/// Result of `rx-playground eval`
#[derive(Debug, Clone, Serialize)]
pub struct EvalResult {
    /// The pattern that was evaluated
    pub pattern: String,
    /// Selected evaluation mode
    pub mode: String,
    pub engine: EngineStatus,
    pub result: Derivation,
}

/// One line emitted by `rx-playground session` per state change
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    /// Generation of the derivation that produced `result`
    pub generation: u64,
    /// False when the cached derivation was reused
    pub recomputed: bool,
    /// Mode name as held by the store
    pub mode: String,
    pub engine: EngineStatus,
    pub docs: DocLinks,
    pub result: Derivation,
}

/// Result of `rx-playground docs`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocsResult {
    pub package: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub home_url: String,
}

/// Generic error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always true for errors
    pub error: bool,
    /// Error code
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Suggested fix
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: true,
            code: code.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    /// Add suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Error codes used at the process boundary
pub mod error_codes {
    pub const COMMAND_ERROR: &str = "COMMAND_ERROR";
    pub const INVALID_INPUT: &str = "INVALID_INPUT";
}
