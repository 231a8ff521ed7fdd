//! Application state store
//!
//! Holds the raw user inputs and feature flags, merges partial updates and
//! notifies subscribers once per dispatch. Derivation code never reads the
//! store directly; it works from [`AppState::input`] snapshots.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{trace, warn};

use super::derive::{EvaluationMode, InputState};
use super::docs::Documentation;
use crate::output::{DocLinks, EngineStatus};

/// Engine loading state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Features {
    /// The regex engine is loaded and usable
    pub engine: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_error: Option<String>,
    /// Loading finished, successfully or not
    pub completed: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            engine: true,
            engine_error: None,
            completed: true,
        }
    }
}

/// Crate versions used to build documentation links
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Versions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex_syntax: Option<String>,
}

impl Versions {
    pub fn doc_links(&self) -> DocLinks {
        DocLinks {
            regex: Documentation::from_package("regex", self.regex.as_deref().unwrap_or(""))
                .home_url(),
            regex_syntax: Documentation::from_package(
                "regex-syntax",
                self.regex_syntax.as_deref().unwrap_or(""),
            )
            .home_url(),
        }
    }
}

/// Everything the application keeps between edits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    pub pattern: String,
    pub replacement: String,
    pub text: String,
    /// Raw mode name as last dispatched
    pub method: String,
    pub features: Features,
    pub versions: Versions,
    /// Unrelated UI state (scroll position, theme, ...)
    pub extra: BTreeMap<String, Value>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            pattern: String::new(),
            replacement: String::new(),
            text: String::new(),
            method: EvaluationMode::default().to_string(),
            features: Features::default(),
            versions: Versions::default(),
            extra: BTreeMap::new(),
        }
    }
}

impl AppState {
    /// Capture the snapshot a derivation pass reads
    pub fn input(&self) -> InputState {
        let mode = EvaluationMode::parse(&self.method);
        if mode.is_none() {
            warn!(method = %self.method, "unrecognized evaluation mode");
        }

        InputState {
            pattern: self.pattern.clone(),
            replacement: self.replacement.clone(),
            subject: self.text.clone(),
            mode,
            engine_available: self.features.engine,
            engine_load_error: self.features.engine_error.clone(),
        }
    }

    pub fn engine_status(&self) -> EngineStatus {
        EngineStatus {
            available: self.features.engine,
            error: self.features.engine_error.clone(),
        }
    }

    fn apply(&mut self, patch: Patch) {
        if let Some(pattern) = patch.pattern {
            self.pattern = pattern;
        }
        if let Some(replacement) = patch.replacement {
            self.replacement = replacement;
        }
        if let Some(text) = patch.text {
            self.text = text;
        }
        if let Some(method) = patch.method {
            self.method = method;
        }
        if let Some(features) = patch.features {
            if let Some(engine) = features.engine {
                self.features.engine = engine;
            }
            if let Some(error) = features.engine_error {
                self.features.engine_error = Some(error).filter(|e| !e.is_empty());
            }
            if let Some(completed) = features.completed {
                self.features.completed = completed;
            }
        }
        if let Some(versions) = patch.versions {
            if versions.regex.is_some() {
                self.versions.regex = versions.regex;
            }
            if versions.regex_syntax.is_some() {
                self.versions.regex_syntax = versions.regex_syntax;
            }
        }
        self.extra.extend(patch.extra);
    }
}

/// Partial update of [`Features`]
#[derive(Debug, Default, Deserialize)]
pub struct FeaturesPatch {
    pub engine: Option<bool>,
    /// An empty string clears the error
    pub engine_error: Option<String>,
    pub completed: Option<bool>,
}

/// Partial update of [`AppState`]; absent fields are left alone
#[derive(Debug, Default, Deserialize)]
pub struct Patch {
    #[serde(default, alias = "regex")]
    pub pattern: Option<String>,
    #[serde(default, alias = "replace")]
    pub replacement: Option<String>,
    #[serde(default, alias = "subject")]
    pub text: Option<String>,
    #[serde(default, alias = "mode")]
    pub method: Option<String>,
    #[serde(default)]
    pub features: Option<FeaturesPatch>,
    #[serde(default)]
    pub versions: Option<Versions>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

pub type Listener<'a> = Box<dyn FnMut(&AppState) + 'a>;

/// Process-wide state with change notification
pub struct Store<'a> {
    state: AppState,
    listeners: Vec<Listener<'a>>,
}

impl<'a> Store<'a> {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            listeners: Vec::new(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&AppState) + 'a) {
        self.listeners.push(Box::new(listener));
    }

    /// Merge `patch` and notify every subscriber
    pub fn dispatch(&mut self, patch: Patch) {
        self.state.apply(patch);
        trace!(listeners = self.listeners.len(), "state updated");
        self.notify();
    }

    /// Notify subscribers with the current state without changing it
    pub fn notify(&mut self) {
        for listener in &mut self.listeners {
            listener(&self.state);
        }
    }
}
