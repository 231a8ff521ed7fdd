//! CLI interface using clap
//!
//! Defines all command-line arguments and subcommands.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use crate::core::{EngineType, EvaluationMode, RustRegexProvider};
use crate::logging::LogFormat;

#[derive(Parser)]
#[command(name = "rx-playground")]
#[command(author, version, about = "Live Rust regex playground: syntax trees, matches and replacements on every edit.", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Log output format (logs go to stderr)
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON output (default)
    Json,
    /// Human-readable text
    Text,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate a pattern once: syntax tree, matches or replacement
    Eval {
        /// The regex pattern
        pattern: String,

        /// Text to match against (use --file for file input, or pipe stdin)
        text: Option<String>,

        /// What to compute
        #[arg(long, short = 'm', value_enum, default_value_t = EvaluationMode::Find)]
        mode: EvaluationMode,

        /// Replacement template for replace mode (supports $1, ${name}, $$)
        #[arg(long, short = 'r')]
        replace: Option<String>,

        /// File to read the text from
        #[arg(long, short = 'F')]
        file: Option<PathBuf>,

        /// Force specific engine (regex or fancy-regex)
        #[arg(long)]
        engine: Option<String>,
    },

    /// Re-evaluate on every JSON state patch read from stdin (one per line)
    Session {
        /// Force specific engine (regex or fancy-regex)
        #[arg(long)]
        engine: Option<String>,
    },

    /// Print the documentation URL for a crate
    Docs {
        /// Crate name, e.g. regex or regex-syntax
        package: String,

        /// Crate version (latest when omitted)
        version: Option<String>,
    },
}

/// Parse CLI arguments
pub fn parse() -> Cli {
    Cli::parse()
}

/// Build the regex provider for an optional `--engine` value
fn provider_for(engine: Option<&str>) -> Result<RustRegexProvider> {
    match engine {
        None => Ok(RustRegexProvider::new()),
        Some("regex") => Ok(RustRegexProvider::with_engine(EngineType::Regex)),
        Some("fancy-regex" | "fancy") => {
            Ok(RustRegexProvider::with_engine(EngineType::FancyRegex))
        }
        Some(e) => bail!(
            "Unknown engine '{}'. Valid options: regex, fancy-regex",
            e
        ),
    }
}

/// Handle the eval command
pub fn handle_eval(
    pattern: &str,
    text: Option<&str>,
    file: Option<&PathBuf>,
    mode: EvaluationMode,
    replace: Option<&str>,
    engine: Option<&str>,
    format: OutputFormat,
) -> Result<String> {
    use crate::core::{derive, InputState};
    use crate::output::json::format_json;
    use crate::output::text::format_eval_result;
    use crate::output::EvalResult;

    let provider = provider_for(engine)?;

    let subject = if let Some(file_path) = file {
        fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read file: {}", file_path.display()))?
    } else if let Some(text) = text {
        text.to_string()
    } else if mode == EvaluationMode::Syntax {
        // The syntax tree never looks at the text
        String::new()
    } else {
        use std::io::{self, IsTerminal, Read};
        // Read from stdin, but warn if it's a terminal (no pipe)
        if io::stdin().is_terminal() {
            eprintln!("rx-playground: reading from stdin (pipe data or press Ctrl-D when done)");
            eprintln!(
                "  hint: rx-playground eval '{}' \"text\" (or) cat file | rx-playground eval '{}'",
                pattern, pattern
            );
        }
        let mut input = String::new();
        io::stdin()
            .read_to_string(&mut input)
            .context("Failed to read stdin")?;
        input
    };

    let state = InputState::new(pattern, subject)
        .with_mode(mode)
        .with_replacement(replace.unwrap_or_default());

    let result = EvalResult {
        pattern: pattern.to_string(),
        mode: mode.to_string(),
        engine: state.engine_status(),
        result: derive(&provider, &state),
    };

    match format {
        OutputFormat::Json => Ok(format_json(&result)),
        OutputFormat::Text => Ok(format_eval_result(&result)),
    }
}

/// Handle the session command
#[cfg(feature = "session")]
pub fn handle_session(engine: Option<&str>) -> Result<()> {
    let provider = provider_for(engine)?;
    crate::session::run_session(provider)
}

/// Handle the docs command
pub fn handle_docs(package: &str, version: Option<&str>, format: OutputFormat) -> Result<String> {
    use crate::core::resolve;
    use crate::output::json::format_json;
    use crate::output::text::format_docs_result;

    if package.trim().is_empty() {
        bail!("Package name must not be empty");
    }

    let result = resolve(package, version.unwrap_or_default());

    match format {
        OutputFormat::Json => Ok(format_json(&result)),
        OutputFormat::Text => Ok(format_docs_result(&result)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_for_known_engines() {
        assert!(provider_for(None).is_ok());
        assert!(provider_for(Some("regex")).is_ok());
        assert!(provider_for(Some("fancy")).is_ok());
    }

    #[test]
    fn test_provider_for_unknown_engine() {
        let err = provider_for(Some("pcre")).unwrap_err();
        assert!(err.to_string().contains("Unknown engine 'pcre'"));
    }

    #[test]
    fn test_eval_replace_json() {
        let output = handle_eval(
            "a",
            Some("banana"),
            None,
            EvaluationMode::Replace,
            Some("X"),
            None,
            OutputFormat::Json,
        )
        .unwrap();
        assert!(output.contains("\"kind\": \"replace\""));
        assert!(output.contains("\"value\": \"bXnXnX\""));
    }

    #[test]
    fn test_eval_syntax_without_text() {
        let output = handle_eval(
            "a+",
            None,
            None,
            EvaluationMode::Syntax,
            None,
            None,
            OutputFormat::Text,
        )
        .unwrap();
        assert!(output.contains("• repetition `a+`"));
    }

    #[test]
    fn test_docs_rejects_empty_package() {
        assert!(handle_docs(" ", None, OutputFormat::Json).is_err());
    }
}
