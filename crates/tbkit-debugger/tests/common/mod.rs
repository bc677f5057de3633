mod tracer;

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tbkit_debugger::{DEFAULT_PROMPT, DebuggerSession};
use tbkit_report::DiagnosticsContext;
use tbkit_report::colors::{ColorSchemeTable, NO_COLOR};
use tbkit_report::frame::StackEntry;
use tbkit_report::render::{RenderMode, TracebackRenderer};
use tbkit_report::value::{Value, ValueScope};
use tempfile::TempDir;

pub use self::tracer::ScriptedTracer;

pub type TestSession = DebuggerSession<ScriptedTracer, &'static [u8], Vec<u8>>;

/// Writes a source file whose lines read `line 1`, `line 2`, ...
pub fn program(lines: usize) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("app.py");

    let content: String = (1..=lines).map(|i| format!("line {i}\n")).collect();
    std::fs::write(&file, content).expect("write source");

    (dir, file)
}

/// Three-level stack: `main` (line 12) calls `helper(x)` (line 15), which
/// calls `leaf` (line 18).
pub fn stack(file: &Path) -> Vec<StackEntry> {
    vec![
        StackEntry::new(file, 12, "main"),
        StackEntry::new(file, 15, "helper")
            .with_args(["x"])
            .with_locals(Arc::new(
                ValueScope::new()
                    .with("x", Value::new("3"))
                    .with("total", Value::new("42")),
            )),
        StackEntry::new(file, 18, "leaf"),
    ]
}

pub fn session(tracer: ScriptedTracer, input: &'static str) -> TestSession {
    let colors = ColorSchemeTable::new(NO_COLOR).expect("builtin scheme");
    let renderer = TracebackRenderer::new(DiagnosticsContext::new(colors), RenderMode::Context);

    DebuggerSession::with_io(tracer, renderer, input.as_bytes(), Vec::new())
}

pub fn transcript(session: &TestSession) -> String {
    String::from_utf8_lossy(session.output()).into_owned()
}

/// Splits a transcript into the outputs of the successive commands.
pub fn command_outputs(transcript: &str) -> Vec<&str> {
    transcript.split(DEFAULT_PROMPT).skip(1).collect()
}

/// Expected listing of the given lines, `current` having a two-digit line
/// number.
pub fn listing(lines: RangeInclusive<usize>, current: usize) -> String {
    lines
        .map(|i| {
            if i == current {
                format!("---> {i} line {i}\n")
            } else {
                format!("{i:>7} line {i}\n")
            }
        })
        .collect()
}
