//! Output formatting module for rx-playground
//!
//! Provides JSON (default) and text renderings of derivation results.

pub mod json;
pub mod text;
pub mod types;

pub use types::*;
