//! Replacement templates
//!
//! Same surface syntax as the `regex` crate (`$1`, `$name`, `${name}`, `$$`),
//! but references are checked against the pattern's groups up front so a
//! typo surfaces as an error instead of silently expanding to nothing.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A replacement template that cannot be applied
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReplacementError {
    #[error("unclosed '${{' at position {position}")]
    UnclosedBrace { position: usize },

    #[error("empty group name '${{}}' at position {position}")]
    EmptyGroupName { position: usize },

    #[error("group {index} does not exist (highest group is {max})")]
    GroupOutOfRange { index: usize, max: usize },

    #[error("no group named '{name}'")]
    UnknownGroup { name: String },

    #[error("replacement failed: {message}")]
    Runtime { message: String },
}

impl ReplacementError {
    /// Suggested fix for the template, if there is an obvious one
    pub fn suggestion(&self) -> Option<String> {
        match self {
            ReplacementError::UnclosedBrace { .. } => {
                Some("Add a closing '}' or write '$$' for a literal dollar sign".to_string())
            }
            ReplacementError::UnknownGroup { name }
                if name.starts_with(|c: char| c.is_ascii_digit()) =>
            {
                let digits: String = name.chars().take_while(char::is_ascii_digit).collect();
                Some(format!(
                    "Use '${{{}}}{}' to follow a group number with text",
                    digits,
                    &name[digits.len()..]
                ))
            }
            _ => None,
        }
    }
}

/// Reference to a capture group inside a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupRef {
    Index(usize),
    Name(String),
}

impl GroupRef {
    fn parse(name: &str) -> Self {
        match name.parse::<usize>() {
            Ok(index) if name.bytes().all(|b| b.is_ascii_digit()) => GroupRef::Index(index),
            _ => GroupRef::Name(name.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Group(GroupRef),
}

/// A parsed replacement template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pieces: Vec<Piece>,
}

impl Template {
    /// Parse `template` without checking its references
    pub fn parse(template: &str) -> Result<Self, ReplacementError> {
        let mut pieces = Vec::new();
        let mut literal = String::new();
        let mut pos = 0;

        while let Some(offset) = template[pos..].find('$') {
            literal.push_str(&template[pos..pos + offset]);
            let dollar = pos + offset;
            let rest = &template[dollar + 1..];

            if rest.starts_with('$') {
                literal.push('$');
                pos = dollar + 2;
            } else if let Some(braced) = rest.strip_prefix('{') {
                let close = braced
                    .find('}')
                    .ok_or(ReplacementError::UnclosedBrace { position: dollar })?;
                let name = &braced[..close];
                if name.is_empty() {
                    return Err(ReplacementError::EmptyGroupName { position: dollar });
                }
                flush(&mut literal, &mut pieces);
                pieces.push(Piece::Group(GroupRef::parse(name)));
                pos = dollar + 2 + close + 1;
            } else {
                let len = rest
                    .bytes()
                    .take_while(|b| *b == b'_' || b.is_ascii_alphanumeric())
                    .count();
                if len == 0 {
                    literal.push('$');
                } else {
                    flush(&mut literal, &mut pieces);
                    pieces.push(Piece::Group(GroupRef::parse(&rest[..len])));
                }
                pos = dollar + 1 + len;
            }
        }

        literal.push_str(&template[pos..]);
        flush(&mut literal, &mut pieces);
        Ok(Self { pieces })
    }

    /// Parse `template` and check every reference against `groups`
    ///
    /// `groups` holds the optional name of each group, group 0 included.
    pub fn compile(template: &str, groups: &[Option<String>]) -> Result<Self, ReplacementError> {
        let template = Self::parse(template)?;
        template.validate(groups)?;
        Ok(template)
    }

    pub fn validate(&self, groups: &[Option<String>]) -> Result<(), ReplacementError> {
        for piece in &self.pieces {
            match piece {
                Piece::Group(GroupRef::Index(index)) if *index >= groups.len() => {
                    return Err(ReplacementError::GroupOutOfRange {
                        index: *index,
                        max: groups.len().saturating_sub(1),
                    });
                }
                Piece::Group(GroupRef::Name(name))
                    if !groups.iter().any(|g| g.as_deref() == Some(name.as_str())) =>
                {
                    return Err(ReplacementError::UnknownGroup { name: name.clone() });
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Append the expansion for one match; groups that did not participate expand to ""
    pub fn expand_into<'s, F>(&self, out: &mut String, lookup: F)
    where
        F: Fn(&GroupRef) -> Option<&'s str>,
    {
        for piece in &self.pieces {
            match piece {
                Piece::Literal(text) => out.push_str(text),
                Piece::Group(group) => out.push_str(lookup(group).unwrap_or_default()),
            }
        }
    }
}

fn flush(literal: &mut String, pieces: &mut Vec<Piece>) {
    if !literal.is_empty() {
        pieces.push(Piece::Literal(std::mem::take(literal)));
    }
}
