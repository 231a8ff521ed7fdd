//! Core regex engine and derivation logic
//!
//! Everything here is independent of how results are printed.

pub mod derive;
pub mod docs;
pub mod engine;
pub mod gate;
pub mod store;
pub mod syntax;
pub mod template;

// Re-export commonly used types
pub use derive::{derive, Derivation, EvaluationMode, InputState};
pub use docs::{resolve, Documentation, ItemKind};
pub use engine::{EngineType, PatternError, RegexProvider, RustRegexProvider};
pub use gate::Gate;
pub use store::{AppState, Patch, Store};
pub use template::ReplacementError;
