//! Syntax-tree extraction
//!
//! Walks the `regex-syntax` AST of a compiled pattern and turns it into a
//! serializable [`SyntaxTree`]. Patterns that only fancy-regex understands
//! get a flat `backtracking` root listing the features that required it.

use regex_syntax::ast::parse::Parser as AstParser;
use regex_syntax::ast::{self, Ast, ClassPerlKind, ClassUnicodeKind};

use super::engine::{detect_fancy_features, EngineType};
use crate::output::{SyntaxNode, SyntaxTree};

/// Build the syntax tree for a pattern that already compiled with `engine`
pub fn syntax_tree(pattern: &str, engine: EngineType) -> SyntaxTree {
    let root = match AstParser::new().parse(pattern) {
        Ok(ast) => node_for(&ast, pattern),
        Err(_) => backtracking_node(pattern),
    };

    SyntaxTree {
        engine: engine.to_string(),
        root,
    }
}

fn backtracking_node(pattern: &str) -> SyntaxNode {
    let features = detect_fancy_features(pattern);
    let mut children = Vec::new();

    if features.lookahead {
        children.push(
            SyntaxNode::new("lookahead", "(?=...) / (?!...)")
                .with_detail("Checks what follows without consuming characters"),
        );
    }
    if features.lookbehind {
        children.push(
            SyntaxNode::new("lookbehind", "(?<=...) / (?<!...)")
                .with_detail("Checks what precedes without consuming characters"),
        );
    }
    if features.backreference {
        children.push(
            SyntaxNode::new("backreference", r"\1, \2, ...")
                .with_detail("Matches the same text as a previous capturing group"),
        );
    }
    if features.atomic_group {
        children.push(
            SyntaxNode::new("atomic_group", "(?>...)")
                .with_detail("Prevents backtracking into the group once matched"),
        );
    }

    let detail = features
        .reason()
        .unwrap_or_else(|| "Pattern requires the fancy-regex engine".to_string());

    SyntaxNode::new("backtracking", pattern)
        .with_span(0, pattern.len())
        .with_detail(detail)
        .with_children(children)
}

/// Recursively convert an AST node
fn node_for(ast: &Ast, pattern: &str) -> SyntaxNode {
    let span = ast.span();
    let (start, end) = (span.start.offset, span.end.offset);
    let text = pattern
        .get(start..end)
        .map(str::to_string)
        .unwrap_or_else(|| ast.to_string());
    let node = |kind: &str| SyntaxNode::new(kind, text.clone()).with_span(start, end);

    match ast {
        Ast::Empty(_) => node("empty").with_detail("Matches the empty string"),

        Ast::Flags(flags) => node("flags").with_detail(describe_flags(&flags.flags)),

        Ast::Literal(lit) => {
            let c = lit.c;
            let detail = if c.is_ascii_alphanumeric() {
                format!("Literal '{}'", c)
            } else {
                format!("Literal '{}' (U+{:04X})", c, c as u32)
            };
            node("literal").with_detail(detail)
        }

        Ast::Dot(_) => {
            node("any_char").with_detail("Matches any character (except newline by default)")
        }

        Ast::Assertion(assertion) => {
            let detail = match assertion.kind {
                ast::AssertionKind::StartLine => "Start of line/string",
                ast::AssertionKind::EndLine => "End of line/string",
                ast::AssertionKind::StartText => "Start of text (absolute)",
                ast::AssertionKind::EndText => "End of text (absolute)",
                ast::AssertionKind::WordBoundary => "Word boundary",
                ast::AssertionKind::NotWordBoundary => "Non-word boundary",
                ast::AssertionKind::WordBoundaryStart => "Start of word",
                ast::AssertionKind::WordBoundaryEnd => "End of word",
                ast::AssertionKind::WordBoundaryStartAngle => "Start of word",
                ast::AssertionKind::WordBoundaryEndAngle => "End of word",
                ast::AssertionKind::WordBoundaryStartHalf => "Start of word boundary",
                ast::AssertionKind::WordBoundaryEndHalf => "End of word boundary",
            };
            node("assertion").with_detail(detail)
        }

        Ast::ClassUnicode(class) => {
            let detail = match &class.kind {
                ClassUnicodeKind::Named(name) => format!("Unicode property: {}", name),
                ClassUnicodeKind::OneLetter(c) => describe_unicode_class(*c),
                ClassUnicodeKind::NamedValue { name, value, .. } => {
                    format!("Unicode {}={}", name, value)
                }
            };
            let detail = if class.negated {
                format!("Not {}", detail)
            } else {
                detail
            };
            node("unicode_class").with_detail(detail)
        }

        Ast::ClassPerl(class) => {
            let detail = match (class.kind.clone(), class.negated) {
                (ClassPerlKind::Digit, false) => "Digit character [0-9]",
                (ClassPerlKind::Digit, true) => "Non-digit character",
                (ClassPerlKind::Space, false) => "Whitespace character",
                (ClassPerlKind::Space, true) => "Non-whitespace character",
                (ClassPerlKind::Word, false) => "Word character [a-zA-Z0-9_]",
                (ClassPerlKind::Word, true) => "Non-word character",
            };
            node("perl_class").with_detail(detail)
        }

        Ast::ClassBracketed(class) => {
            let negated = if class.negated { "not " } else { "" };
            node("bracketed_class").with_detail(format!(
                "Matches {}one of the specified characters",
                negated
            ))
        }

        Ast::Repetition(rep) => {
            let count = match &rep.op.kind {
                ast::RepetitionKind::ZeroOrOne => "Zero or one".to_string(),
                ast::RepetitionKind::ZeroOrMore => "Zero or more".to_string(),
                ast::RepetitionKind::OneOrMore => "One or more".to_string(),
                ast::RepetitionKind::Range(ast::RepetitionRange::Exactly(n)) => {
                    format!("Exactly {}", n)
                }
                ast::RepetitionKind::Range(ast::RepetitionRange::AtLeast(n)) => {
                    format!("{} or more", n)
                }
                ast::RepetitionKind::Range(ast::RepetitionRange::Bounded(m, n)) => {
                    format!("Between {} and {}", m, n)
                }
            };
            let greedy = if rep.greedy { "" } else { " (non-greedy)" };

            node("repetition")
                .with_detail(format!("{}{}", count, greedy))
                .with_children(vec![node_for(&rep.ast, pattern)])
        }

        Ast::Group(group) => {
            let children = vec![node_for(&group.ast, pattern)];
            match &group.kind {
                ast::GroupKind::CaptureIndex(index) => node("capturing_group")
                    .with_detail("Capturing group")
                    .with_group(*index as usize)
                    .with_children(children),
                ast::GroupKind::CaptureName { name, .. } => node("named_group")
                    .with_detail(format!("Named capture: {}", name.name))
                    .with_group(name.index as usize)
                    .with_children(children),
                ast::GroupKind::NonCapturing(flags) => {
                    let detail = if flags.items.is_empty() {
                        "Non-capturing group".to_string()
                    } else {
                        format!("Non-capturing group; {}", describe_flags(flags))
                    };
                    node("non_capturing_group")
                        .with_detail(detail)
                        .with_children(children)
                }
            }
        }

        Ast::Alternation(alt) => node("alternation")
            .with_detail(format!("Match one of {} alternatives", alt.asts.len()))
            .with_children(alt.asts.iter().map(|a| node_for(a, pattern)).collect()),

        Ast::Concat(concat) => node("concat")
            .with_children(concat.asts.iter().map(|a| node_for(a, pattern)).collect()),
    }
}

/// Describe flags
fn describe_flags(flags: &ast::Flags) -> String {
    let mut enabled = Vec::new();
    let mut disabled = Vec::new();
    let mut negated = false;

    for item in &flags.items {
        match item.kind {
            ast::FlagsItemKind::Negation => negated = true,
            ast::FlagsItemKind::Flag(flag) => {
                let desc = match flag {
                    ast::Flag::CaseInsensitive => "case-insensitive",
                    ast::Flag::MultiLine => "multi-line mode",
                    ast::Flag::DotMatchesNewLine => "dot matches newline",
                    ast::Flag::SwapGreed => "swap greedy/non-greedy",
                    ast::Flag::Unicode => "unicode mode",
                    ast::Flag::IgnoreWhitespace => "ignore whitespace",
                    ast::Flag::CRLF => "CRLF mode",
                };
                if negated {
                    disabled.push(desc);
                } else {
                    enabled.push(desc);
                }
            }
        }
    }

    match (enabled.is_empty(), disabled.is_empty()) {
        (false, true) => format!("Enable {}", enabled.join(", ")),
        (true, false) => format!("Disable {}", disabled.join(", ")),
        (false, false) => format!(
            "Enable {}; disable {}",
            enabled.join(", "),
            disabled.join(", ")
        ),
        (true, true) => "No flags".to_string(),
    }
}

/// Describe unicode class
fn describe_unicode_class(c: char) -> String {
    match c {
        'L' => "Unicode Letter".to_string(),
        'N' => "Unicode Number".to_string(),
        'P' => "Unicode Punctuation".to_string(),
        'S' => "Unicode Symbol".to_string(),
        'Z' => "Unicode Separator".to_string(),
        'C' => "Unicode Other/Control".to_string(),
        'M' => "Unicode Mark".to_string(),
        _ => format!("Unicode category {}", c),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_pattern() {
        let tree = syntax_tree("", EngineType::Regex);
        assert_eq!(tree.engine, "regex");
        assert_eq!(tree.root.kind, "empty");
        assert!(tree.root.children.is_empty());
    }

    #[test]
    fn test_repetition_wraps_child() {
        let tree = syntax_tree("a+", EngineType::Regex);
        assert_eq!(tree.root.kind, "repetition");
        assert_eq!(tree.root.detail.as_deref(), Some("One or more"));
        assert_eq!(tree.root.children[0].kind, "literal");
        assert_eq!(tree.root.children[0].text, "a");
    }

    #[test]
    fn test_groups_and_spans() {
        let tree = syntax_tree(r"(\d+)-(?P<tail>\w)", EngineType::Regex);
        assert_eq!(tree.root.kind, "concat");
        let kinds: Vec<_> = tree.root.children.iter().map(|c| c.kind.as_str()).collect();
        assert_eq!(kinds, ["capturing_group", "literal", "named_group"]);

        let first = &tree.root.children[0];
        assert_eq!(first.group, Some(1));
        assert_eq!(first.text, r"(\d+)");
        assert_eq!(first.span.map(|s| (s.start, s.end)), Some((0, 5)));

        let named = &tree.root.children[2];
        assert_eq!(named.group, Some(2));
        assert_eq!(named.detail.as_deref(), Some("Named capture: tail"));
    }

    #[test]
    fn test_alternation() {
        let tree = syntax_tree("cat|dog", EngineType::Regex);
        assert_eq!(tree.root.kind, "alternation");
        assert_eq!(tree.root.children.len(), 2);
        assert_eq!(tree.root.children[1].text, "dog");
    }

    #[test]
    fn test_flags() {
        let tree = syntax_tree("(?i-s)a", EngineType::Regex);
        let flags = tree.root.find_kind("flags").unwrap();
        assert_eq!(
            flags.detail.as_deref(),
            Some("Enable case-insensitive; disable dot matches newline")
        );
    }

    #[test]
    fn test_fancy_pattern_lists_features() {
        let tree = syntax_tree(r"foo(?=bar)", EngineType::FancyRegex);
        assert_eq!(tree.engine, "fancy-regex");
        assert_eq!(tree.root.kind, "backtracking");
        assert_eq!(tree.root.children[0].kind, "lookahead");
    }
}
