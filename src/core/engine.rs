//! Regex engine selection, compilation and the provider seam
//!
//! Automatically chooses between `regex` (fast, linear time) and
//! `fancy-regex` (full features, backtracking) based on pattern analysis.
//! The derivation engine only talks to the [`RegexProvider`] trait.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::syntax::syntax_tree;
use super::template::{GroupRef, ReplacementError, Template};
use crate::output::{Capture, Match, SyntaxTree};

static BACKREFERENCE_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"\\[1-9]").expect("BUG: backreference detection pattern is invalid")
});

/// Engine types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineType {
    /// Standard regex crate (linear time guaranteed)
    Regex,
    /// Fancy-regex (supports lookahead, lookbehind, backreferences)
    FancyRegex,
}

impl std::fmt::Display for EngineType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineType::Regex => write!(f, "regex"),
            EngineType::FancyRegex => write!(f, "fancy-regex"),
        }
    }
}

/// Errors raised by the underlying engines while compiling
#[allow(clippy::result_large_err)]
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0}")]
    RegexError(#[from] regex::Error),

    #[error("{0}")]
    FancyRegexError(#[from] fancy_regex::Error),
}

/// A pattern that failed to compile
///
/// `message` is the engine's own, possibly multi-line, text. The first line
/// is a generic header and the remaining lines carry positional detail.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message}")]
pub struct PatternError {
    pub message: String,
    /// Byte offset of the error within the pattern (when known)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
}

impl PatternError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            position: None,
        }
    }

    fn from_engine(pattern: &str, err: &EngineError) -> Self {
        use regex_syntax::ast::parse::Parser as AstParser;

        let position = match err {
            EngineError::RegexError(_) => AstParser::new()
                .parse(pattern)
                .err()
                .map(|e| e.span().start.offset),
            EngineError::FancyRegexError(_) => None,
        };

        Self {
            position,
            ..Self::new(err.to_string())
        }
    }

    /// Text before the first line break
    pub fn header(&self) -> &str {
        self.message
            .split_once('\n')
            .map_or(self.message.as_str(), |(header, _)| header)
    }

    /// Text after the first line break, empty for single-line messages
    pub fn detail(&self) -> &str {
        self.message
            .split_once('\n')
            .map_or("", |(_, detail)| detail)
    }
}

/// Features detected in a pattern that require fancy-regex
#[derive(Debug, Default)]
pub struct FancyFeatures {
    pub lookahead: bool,
    pub lookbehind: bool,
    pub backreference: bool,
    pub atomic_group: bool,
}

impl FancyFeatures {
    /// Returns true if any fancy feature is detected
    pub fn needs_fancy(&self) -> bool {
        self.lookahead || self.lookbehind || self.backreference || self.atomic_group
    }

    /// Get a description of why fancy-regex is needed
    pub fn reason(&self) -> Option<String> {
        let mut reasons = Vec::new();
        if self.lookahead {
            reasons.push("lookahead assertion");
        }
        if self.lookbehind {
            reasons.push("lookbehind assertion");
        }
        if self.backreference {
            reasons.push("backreference");
        }
        if self.atomic_group {
            reasons.push("atomic group");
        }

        if reasons.is_empty() {
            None
        } else {
            Some(format!("Pattern uses {}", reasons.join(", ")))
        }
    }
}

/// Detect which engine features are used in a pattern
pub fn detect_fancy_features(pattern: &str) -> FancyFeatures {
    let mut features = FancyFeatures::default();

    // regex_syntax cannot parse any of these, so detection is string scanning.
    if pattern.contains("(?=") || pattern.contains("(?!") {
        features.lookahead = true;
    }
    if pattern.contains("(?<=") || pattern.contains("(?<!") {
        features.lookbehind = true;
    }
    if pattern.contains("(?>") {
        features.atomic_group = true;
    }
    if BACKREFERENCE_RE.is_match(pattern) {
        features.backreference = true;
    }

    features
}

/// Select the appropriate engine for a pattern
pub fn select_engine(pattern: &str) -> (EngineType, FancyFeatures) {
    let features = detect_fancy_features(pattern);
    let engine = if features.needs_fancy() {
        EngineType::FancyRegex
    } else {
        EngineType::Regex
    };
    (engine, features)
}

/// A compiled regex that can use either engine
#[derive(Debug)]
pub enum CompiledRegex {
    Regex(regex::Regex),
    FancyRegex(fancy_regex::Regex),
}

#[allow(clippy::result_large_err)]
impl CompiledRegex {
    /// Compile a pattern with automatic engine selection
    pub fn new(pattern: &str) -> Result<(Self, EngineType), EngineError> {
        let (engine, _features) = select_engine(pattern);

        match engine {
            EngineType::Regex => match regex::Regex::new(pattern) {
                Ok(re) => Ok((CompiledRegex::Regex(re), EngineType::Regex)),
                // Fall back to fancy-regex, but keep the regex crate's diagnostics
                // when neither engine accepts the pattern.
                Err(regex_err) => match fancy_regex::Regex::new(pattern) {
                    Ok(re) => Ok((CompiledRegex::FancyRegex(re), EngineType::FancyRegex)),
                    Err(_) => Err(EngineError::RegexError(regex_err)),
                },
            },
            EngineType::FancyRegex => {
                let re = fancy_regex::Regex::new(pattern)?;
                Ok((CompiledRegex::FancyRegex(re), EngineType::FancyRegex))
            }
        }
    }

    /// Compile with a specific engine
    pub fn with_engine(pattern: &str, engine: EngineType) -> Result<Self, EngineError> {
        match engine {
            EngineType::Regex => {
                let re = regex::Regex::new(pattern)?;
                Ok(CompiledRegex::Regex(re))
            }
            EngineType::FancyRegex => {
                let re = fancy_regex::Regex::new(pattern)?;
                Ok(CompiledRegex::FancyRegex(re))
            }
        }
    }

    /// Get the engine type
    pub fn engine_type(&self) -> EngineType {
        match self {
            CompiledRegex::Regex(_) => EngineType::Regex,
            CompiledRegex::FancyRegex(_) => EngineType::FancyRegex,
        }
    }

    /// Capture group names indexed by group number (group 0 included)
    pub fn group_names(&self) -> Vec<Option<String>> {
        match self {
            CompiledRegex::Regex(re) => re
                .capture_names()
                .map(|name| name.map(str::to_string))
                .collect(),
            CompiledRegex::FancyRegex(re) => re
                .capture_names()
                .map(|name| name.map(str::to_string))
                .collect(),
        }
    }
}

/// Compiled artifact handed out by [`RustRegexProvider`]
///
/// Lives for a single derivation pass and is dropped afterwards.
#[derive(Debug)]
pub struct CompiledPattern {
    source: String,
    regex: CompiledRegex,
}

impl CompiledPattern {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn engine_type(&self) -> EngineType {
        self.regex.engine_type()
    }
}

/// The regex operations the derivation engine depends on
pub trait RegexProvider {
    type Compiled;

    fn compile(&self, pattern: &str) -> Result<Self::Compiled, PatternError>;

    fn syntax_tree(&self, compiled: &Self::Compiled) -> SyntaxTree;

    /// Every non-overlapping, leftmost-first match in `subject`
    fn find_all(&self, compiled: &Self::Compiled, subject: &str) -> Vec<Match>;

    fn replace_all(
        &self,
        compiled: &Self::Compiled,
        subject: &str,
        template: &str,
    ) -> Result<String, ReplacementError>;
}

/// Provider backed by the `regex` and `fancy-regex` crates
#[derive(Debug, Clone, Copy, Default)]
pub struct RustRegexProvider {
    engine: Option<EngineType>,
}

impl RustRegexProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always compile with `engine` instead of selecting automatically
    pub fn with_engine(engine: EngineType) -> Self {
        Self {
            engine: Some(engine),
        }
    }
}

impl RegexProvider for RustRegexProvider {
    type Compiled = CompiledPattern;

    fn compile(&self, pattern: &str) -> Result<CompiledPattern, PatternError> {
        let compiled = match self.engine {
            Some(engine) => CompiledRegex::with_engine(pattern, engine),
            None => CompiledRegex::new(pattern).map(|(re, _)| re),
        };

        match compiled {
            Ok(regex) => {
                debug!(engine = %regex.engine_type(), "compiled pattern");
                Ok(CompiledPattern {
                    source: pattern.to_string(),
                    regex,
                })
            }
            Err(e) => {
                debug!(error = %e, "pattern rejected");
                Err(PatternError::from_engine(pattern, &e))
            }
        }
    }

    fn syntax_tree(&self, compiled: &CompiledPattern) -> SyntaxTree {
        syntax_tree(compiled.source(), compiled.engine_type())
    }

    fn find_all(&self, compiled: &CompiledPattern, subject: &str) -> Vec<Match> {
        collect_matches(&compiled.regex, subject)
    }

    fn replace_all(
        &self,
        compiled: &CompiledPattern,
        subject: &str,
        template: &str,
    ) -> Result<String, ReplacementError> {
        let template = Template::compile(template, &compiled.regex.group_names())?;
        replace_content(&compiled.regex, subject, &template)
    }
}

/// Collect all matches from text
fn collect_matches(compiled: &CompiledRegex, text: &str) -> Vec<Match> {
    let names = compiled.group_names();
    let group_name = |i: usize| names.get(i).cloned().flatten();
    let mut matches = Vec::new();

    match compiled {
        CompiledRegex::Regex(re) => {
            for caps in re.captures_iter(text) {
                let Some(full_match) = caps.get(0) else {
                    continue;
                };

                // Skip group 0, which is the full match
                let captures = caps
                    .iter()
                    .enumerate()
                    .skip(1)
                    .filter_map(|(i, cap)| {
                        cap.map(|c| Capture {
                            group: i,
                            name: group_name(i),
                            text: c.as_str().to_string(),
                            start: c.start(),
                            end: c.end(),
                        })
                    })
                    .collect();

                matches.push(Match {
                    text: full_match.as_str().to_string(),
                    start: full_match.start(),
                    end: full_match.end(),
                    captures,
                });
            }
        }

        CompiledRegex::FancyRegex(re) => {
            for result in re.captures_iter(text) {
                let caps = match result {
                    Ok(caps) => caps,
                    Err(e) => {
                        warn!(error = %e, found = matches.len(), "match enumeration aborted");
                        break;
                    }
                };
                let Some(full_match) = caps.get(0) else {
                    continue;
                };

                let captures = (1..caps.len())
                    .filter_map(|i| {
                        caps.get(i).map(|c| Capture {
                            group: i,
                            name: group_name(i),
                            text: c.as_str().to_string(),
                            start: c.start(),
                            end: c.end(),
                        })
                    })
                    .collect();

                matches.push(Match {
                    text: full_match.as_str().to_string(),
                    start: full_match.start(),
                    end: full_match.end(),
                    captures,
                });
            }
        }
    }

    matches
}

/// Replace every match in `content` by expanding `template`
fn replace_content(
    compiled: &CompiledRegex,
    content: &str,
    template: &Template,
) -> Result<String, ReplacementError> {
    match compiled {
        CompiledRegex::Regex(re) => {
            let result = re.replace_all(content, |caps: &regex::Captures| {
                let mut expanded = String::new();
                template.expand_into(&mut expanded, |group| match group {
                    GroupRef::Index(i) => caps.get(*i).map(|m| m.as_str()),
                    GroupRef::Name(name) => caps.name(name).map(|m| m.as_str()),
                });
                expanded
            });
            Ok(result.into_owned())
        }
        CompiledRegex::FancyRegex(re) => {
            let mut result = String::with_capacity(content.len());
            let mut last_end = 0;

            for caps in re.captures_iter(content) {
                let caps = caps.map_err(|e| ReplacementError::Runtime {
                    message: e.to_string(),
                })?;
                let Some(full_match) = caps.get(0) else {
                    continue;
                };

                result.push_str(&content[last_end..full_match.start()]);
                template.expand_into(&mut result, |group| match group {
                    GroupRef::Index(i) => caps.get(*i).map(|m| m.as_str()),
                    GroupRef::Name(name) => caps.name(name).map(|m| m.as_str()),
                });
                last_end = full_match.end();
            }

            result.push_str(&content[last_end..]);
            Ok(result)
        }
    }
}
