//! Live session mode
//!
//! Reads one JSON state patch per line from stdin, dispatches it to the
//! store and writes one result frame per line to stdout. The gate keeps
//! edits to unrelated fields from re-running the regex engine.

use std::io::{self, BufRead, Write};
use std::sync::mpsc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::core::{AppState, Gate, Patch, RegexProvider, Store};
use crate::output::json::format_json_compact;
use crate::output::{error_codes, ErrorResponse, Frame};

/// Run a session over stdin/stdout
pub fn run_session<P: RegexProvider>(provider: P) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    run(stdin.lock(), &mut stdout, provider, AppState::default())
}

/// Run a session over arbitrary streams, starting from `initial`
pub fn run<R, W, P>(input: R, output: &mut W, provider: P, initial: AppState) -> Result<()>
where
    R: BufRead,
    W: Write,
    P: RegexProvider,
{
    let (tx, rx) = mpsc::channel::<Frame>();
    let mut gate = Gate::new(provider);
    let mut store = Store::new(initial);

    store.subscribe(move |state: &AppState| {
        let evaluation = gate.get(&state.input());
        let frame = Frame {
            generation: evaluation.generation,
            recomputed: evaluation.recomputed,
            mode: state.method.clone(),
            engine: state.engine_status(),
            docs: state.versions.doc_links(),
            result: evaluation.derivation.clone(),
        };
        // The receiver outlives the store, so sending cannot fail.
        let _ = tx.send(frame);
    });

    info!("session started");
    store.notify();
    write_frames(&rx, output)?;

    let mut lines = 0usize;
    for line in input.lines() {
        let line = line.context("Failed to read session input")?;
        if line.trim().is_empty() {
            continue;
        }
        lines += 1;

        match serde_json::from_str::<Patch>(&line) {
            Ok(patch) => store.dispatch(patch),
            Err(e) => {
                debug!(error = %e, "rejected session input");
                let error =
                    ErrorResponse::new(error_codes::INVALID_INPUT, format!("Parse error: {}", e))
                        .with_suggestion(r#"Send one JSON object per line, e.g. {"pattern": "a+"}"#);
                writeln!(output, "{}", format_json_compact(&error))
                    .context("Failed to write session output")?;
            }
        }

        write_frames(&rx, output)?;
    }

    info!(lines, mode = %store.state().method, "session ended");
    Ok(())
}

fn write_frames<W: Write>(rx: &mpsc::Receiver<Frame>, output: &mut W) -> Result<()> {
    for frame in rx.try_iter() {
        writeln!(output, "{}", format_json_compact(&frame))
            .context("Failed to write session output")?;
    }
    output.flush().context("Failed to flush session output")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RustRegexProvider;
    use serde_json::Value;

    fn session(input: &str) -> Vec<Value> {
        let mut output = Vec::new();
        run(
            input.as_bytes(),
            &mut output,
            RustRegexProvider::new(),
            AppState::default(),
        )
        .unwrap();
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_initial_frame() {
        let frames = session("");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0]["mode"], "find");
        assert_eq!(frames[0]["result"]["kind"], "find");
        assert_eq!(frames[0]["generation"], 1);
    }

    #[test]
    fn test_edits_produce_frames() {
        let frames = session(
            "{\"pattern\": \"a+\"}\n\
             {\"text\": \"baaab\"}\n",
        );
        assert_eq!(frames.len(), 3);
        let last = &frames[2];
        assert_eq!(last["recomputed"], true);
        assert_eq!(last["result"]["value"][0]["start"], 1);
        assert_eq!(last["result"]["value"][0]["end"], 4);
    }

    #[test]
    fn test_unrelated_edit_reuses_result() {
        let frames = session(
            "{\"pattern\": \"a\", \"text\": \"banana\"}\n\
             {\"scroll\": 120}\n\
             {\"versions\": {\"regex\": \"1.10.0\"}}\n",
        );
        assert_eq!(frames.len(), 4);
        assert_eq!(frames[2]["recomputed"], false);
        assert_eq!(frames[3]["recomputed"], false);
        assert_eq!(frames[3]["generation"], frames[1]["generation"]);
        assert_eq!(
            frames[3]["docs"]["regex"],
            "https://docs.rs/regex/1.10.0/regex/"
        );
    }

    #[test]
    fn test_engine_unavailable_frame() {
        let frames = session("{\"features\": {\"engine\": false, \"engine_error\": \"boom\"}}\n");
        let last = &frames[1];
        assert_eq!(last["result"]["kind"], "empty");
        assert_eq!(last["engine"]["available"], false);
        assert_eq!(last["engine"]["error"], "boom");
    }

    #[test]
    fn test_malformed_line_keeps_session_alive() {
        let frames = session(
            "not json\n\
             {\"mode\": \"replace\", \"regex\": \"a\", \"text\": \"banana\", \"replace\": \"X\"}\n",
        );
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[1]["code"], "INVALID_INPUT");
        assert_eq!(frames[2]["result"]["value"], "bXnXnX");
    }

    #[test]
    fn test_pattern_error_frame() {
        let frames = session("{\"pattern\": \"(\", \"mode\": \"syntax\"}\n");
        assert_eq!(frames[1]["result"]["kind"], "pattern_error");
        assert_eq!(frames[1]["result"]["value"]["position"], 0);
    }
}
