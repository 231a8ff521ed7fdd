//! Human-friendly text output formatting
//!
//! Used when --format text is specified.

use super::types::*;
use crate::core::{Derivation, Documentation, ItemKind};

/// Format EvalResult as human-readable text
pub fn format_eval_result(result: &EvalResult) -> String {
    let mut output = String::new();

    output.push_str(&format!("Pattern: {}\n", result.pattern));
    output.push_str(&format!("Mode:    {}\n", result.mode));
    output.push('\n');
    output.push_str(&format_derivation(&result.result, &result.engine));

    output
}

/// Render one derivation the way the matching result view shows it
pub fn format_derivation(derivation: &Derivation, engine: &EngineStatus) -> String {
    let docs = Documentation::from_package("regex", "");

    match derivation {
        Derivation::Empty if !engine.available => {
            let mut output = String::from("rust-regex could not be loaded\n");
            if let Some(ref error) = engine.error {
                output.push_str(&format!("  {}\n", error));
            }
            output
        }
        Derivation::Empty => "Nothing to evaluate\n".to_string(),
        Derivation::PatternError(error) => {
            let mut output = String::from("regex parse error:\n");
            let detail = error.detail();
            if detail.is_empty() {
                output.push_str(&format!("    {}\n", error.header()));
            } else {
                output.push_str(detail);
                output.push('\n');
            }
            output
        }
        Derivation::ReplacementError(error) => {
            let mut output = format!("replacement error: {}\n", error);
            if let Some(suggestion) = error.suggestion() {
                output.push_str(&format!("\nSuggestion: {}\n", suggestion));
            }
            output.push_str(&format!(
                "\nSee: {}\n",
                docs.item_url(ItemKind::Struct, "Captures")
            ));
            output
        }
        Derivation::Syntax(tree) => format_syntax_tree(tree),
        Derivation::Find(matches) => format_matches(matches),
        Derivation::Replace(text) => format!("{}\n", text),
    }
}

/// Format a syntax tree as an indented outline
pub fn format_syntax_tree(tree: &SyntaxTree) -> String {
    let mut output = String::new();
    output.push_str(&format!("Engine: {}\n\n", tree.engine));

    fn format_node(node: &SyntaxNode, indent: usize, output: &mut String) {
        let indent_str = "  ".repeat(indent);
        let span_str = node
            .span
            .map(|s| format!(" [{}..{}]", s.start, s.end))
            .unwrap_or_default();
        let group_str = node
            .group
            .map(|g| format!(" [group {}]", g))
            .unwrap_or_default();

        output.push_str(&format!(
            "{}• {} `{}`{}{}\n",
            indent_str, node.kind, node.text, span_str, group_str
        ));
        if let Some(ref detail) = node.detail {
            output.push_str(&format!("{}  {}\n", indent_str, detail));
        }

        for child in &node.children {
            format_node(child, indent + 1, output);
        }
    }

    format_node(&tree.root, 0, &mut output);
    output
}

/// Format a match list
pub fn format_matches(matches: &[Match]) -> String {
    let mut output = String::new();

    if matches.is_empty() {
        output.push_str("No matches found\n");
        return output;
    }

    for (i, m) in matches.iter().enumerate() {
        output.push_str(&format!(
            "Match {}: \"{}\" [{}..{}]\n",
            i + 1,
            m.text,
            m.start,
            m.end
        ));

        for cap in &m.captures {
            let name_str = cap
                .name
                .as_ref()
                .map(|n| format!(" ({})", n))
                .unwrap_or_default();
            output.push_str(&format!(
                "  Group {}{}: \"{}\" [{}..{}]\n",
                cap.group, name_str, cap.text, cap.start, cap.end
            ));
        }
    }
    output.push('\n');
    output.push_str(&format!(
        "{} match{} found\n",
        matches.len(),
        if matches.len() == 1 { "" } else { "es" }
    ));

    output
}

/// Format DocsResult as human-readable text
pub fn format_docs_result(result: &DocsResult) -> String {
    format!("{}: {}\n", result.package, result.home_url)
}
