//! Result derivation
//!
//! Maps one snapshot of the user's inputs to exactly one [`Derivation`].
//! [`derive`] is pure apart from the provider calls it makes, so calling it
//! twice with the same [`InputState`] yields equal results.

use serde::{Deserialize, Serialize};

use super::engine::{PatternError, RegexProvider};
use super::template::ReplacementError;
use crate::output::{EngineStatus, Match, SyntaxTree};

/// Which computation the user asked for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum EvaluationMode {
    /// Show the pattern's syntax tree
    Syntax,
    /// List every match in the text
    #[default]
    Find,
    /// Substitute every match in the text
    Replace,
}

impl EvaluationMode {
    /// Parse a mode name, ignoring case; `None` for anything else
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "syntax" => Some(EvaluationMode::Syntax),
            "find" => Some(EvaluationMode::Find),
            "replace" => Some(EvaluationMode::Replace),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EvaluationMode::Syntax => "syntax",
            EvaluationMode::Find => "find",
            EvaluationMode::Replace => "replace",
        }
    }
}

impl std::fmt::Display for EvaluationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of everything a derivation pass may read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputState {
    pub pattern: String,
    pub replacement: String,
    pub subject: String,
    /// `None` when the stored mode is not one of the known modes
    pub mode: Option<EvaluationMode>,
    pub engine_available: bool,
    pub engine_load_error: Option<String>,
}

impl InputState {
    pub fn new(pattern: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: String::new(),
            subject: subject.into(),
            mode: Some(EvaluationMode::default()),
            engine_available: true,
            engine_load_error: None,
        }
    }

    pub fn with_mode(mut self, mode: EvaluationMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn with_replacement(mut self, replacement: impl Into<String>) -> Self {
        self.replacement = replacement.into();
        self
    }

    /// Mark the engine as not loaded
    #[allow(dead_code)]
    pub fn unavailable(mut self, error: Option<String>) -> Self {
        self.engine_available = false;
        self.engine_load_error = error;
        self
    }

    pub fn engine_status(&self) -> EngineStatus {
        EngineStatus {
            available: self.engine_available,
            error: self.engine_load_error.clone(),
        }
    }
}

/// Outcome of one derivation pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Derivation {
    Syntax(SyntaxTree),
    Find(Vec<Match>),
    Replace(String),
    PatternError(PatternError),
    ReplacementError(ReplacementError),
    /// Nothing was evaluated (engine unavailable or unknown mode)
    Empty,
}

impl Derivation {
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Derivation::PatternError(_) | Derivation::ReplacementError(_)
        )
    }
}

/// Run one derivation pass
pub fn derive<P: RegexProvider>(provider: &P, state: &InputState) -> Derivation {
    if !state.engine_available {
        return Derivation::Empty;
    }

    // A broken pattern suppresses every mode.
    let compiled = match provider.compile(&state.pattern) {
        Ok(compiled) => compiled,
        Err(err) => return Derivation::PatternError(err),
    };

    let Some(mode) = state.mode else {
        return Derivation::Empty;
    };

    match mode {
        EvaluationMode::Syntax => Derivation::Syntax(provider.syntax_tree(&compiled)),
        EvaluationMode::Find => Derivation::Find(provider.find_all(&compiled, &state.subject)),
        EvaluationMode::Replace => {
            // No template yet: preview the subject untouched.
            if state.replacement.is_empty() {
                return Derivation::Replace(state.subject.clone());
            }
            match provider.replace_all(&compiled, &state.subject, &state.replacement) {
                Ok(text) => Derivation::Replace(text),
                Err(err) => Derivation::ReplacementError(err),
            }
        }
    }
}
