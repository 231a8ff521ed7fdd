//! rx-playground - live Rust regex playground
//!
//! Type a pattern, a replacement and some text; see the syntax tree, the
//! matches or the substituted text, recomputed on every edit.

mod core;
mod logging;
mod output;

#[cfg(feature = "cli")]
mod cli;

#[cfg(feature = "session")]
mod session;

use std::process::ExitCode;

fn main() -> ExitCode {
    #[cfg(feature = "cli")]
    {
        use cli::{parse, Commands};
        use logging::{init_logging, LogConfig};
        use std::io::IsTerminal;

        let args = parse();

        let log_config = LogConfig::from_verbosity(args.verbose)
            .with_format(args.log_format)
            .with_ansi(std::io::stderr().is_terminal());
        if let Err(e) = init_logging(&log_config) {
            eprintln!("rx-playground: {}", e);
        }

        // If no command, show help
        let Some(command) = args.command else {
            eprintln!("rx-playground: live Rust regex playground");
            eprintln!();
            eprintln!("Usage: rx-playground <COMMAND>");
            eprintln!();
            eprintln!("Commands:");
            eprintln!("  eval     Evaluate a pattern once (syntax, find or replace)");
            eprintln!("  session  Re-evaluate on every JSON state patch read from stdin");
            eprintln!("  docs     Print the documentation URL for a crate");
            eprintln!();
            eprintln!("Options:");
            eprintln!("  -f, --format <FORMAT>  Output format [json|text] (default: json)");
            eprintln!("  -v, --verbose          Increase log verbosity");
            eprintln!("  -h, --help             Print help");
            eprintln!("  -V, --version          Print version");
            return ExitCode::SUCCESS;
        };

        let format = args.format;

        let result = match command {
            Commands::Eval {
                pattern,
                text,
                mode,
                replace,
                file,
                engine,
            } => cli::handle_eval(
                &pattern,
                text.as_deref(),
                file.as_ref(),
                mode,
                replace.as_deref(),
                engine.as_deref(),
                format,
            )
            .map(Some),

            #[cfg(feature = "session")]
            Commands::Session { engine } => cli::handle_session(engine.as_deref()).map(|_| None),

            #[cfg(not(feature = "session"))]
            Commands::Session { .. } => Err(anyhow::anyhow!(
                "Session feature not enabled. Build with --features session"
            )),

            Commands::Docs { package, version } => {
                cli::handle_docs(&package, version.as_deref(), format).map(Some)
            }
        };

        match result {
            Ok(output) => {
                if let Some(output) = output {
                    println!("{}", output);
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                // Output error as structured JSON on stderr
                let error = output::ErrorResponse::new(
                    output::error_codes::COMMAND_ERROR,
                    format!("{:#}", e),
                );
                let error_json = serde_json::to_string(&error)
                    .unwrap_or_else(|_| format!(r#"{{"error":true,"message":"{}"}}"#, e));
                eprintln!("{}", error_json);
                ExitCode::FAILURE
            }
        }
    }

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("CLI feature not enabled. Build with --features cli");
        ExitCode::FAILURE
    }
}
