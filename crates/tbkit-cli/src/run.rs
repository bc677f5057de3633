use std::ffi::OsStr;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use miette::IntoDiagnostic;
use tbkit_debugger::{DebuggerSession, SessionExit};
use tbkit_report::DiagnosticsContext;
use tbkit_report::colors::{self, ColorSchemeTable};
use tbkit_report::frame::StackEntry;
use tbkit_report::render::{CapturedException, RenderMode, TracebackRenderer};
use tbkit_tracer::Detached;

use crate::{CaptureDocument, ReportConfig};

/// Runs the subcommand printing the report of a captured failure.
pub fn evaluate_render(
    config: Option<String>,
    mode: Option<RenderMode>,
    colors: Option<String>,
    capture: PathBuf,
) -> miette::Result<()> {
    let config = parse_report_config(config)?;
    let (exception, stack) = load_capture(&capture)?;

    let mode = match mode {
        Some(mode) => mode,
        None => config.render_mode().into_diagnostic()?,
    };

    let mut stderr = std::io::stderr();
    let colorless = !stderr.is_terminal();

    let mut renderer = build_renderer(&config, mode, colors, colorless)?;
    renderer
        .write_report(&mut stderr, &exception, &stack)
        .into_diagnostic()
}

/// Runs the subcommand printing the report of a captured failure, then
/// starting a post-mortem session over its call-stack.
///
/// The returned exit code is 0 whether the user quit or resumed the
/// (captured, hence not restartable) program.
pub fn evaluate_post_mortem(
    config: Option<String>,
    colors: Option<String>,
    capture: PathBuf,
) -> miette::Result<i32> {
    let config = parse_report_config(config)?;
    let (exception, stack) = load_capture(&capture)?;

    let mode = config.render_mode().into_diagnostic()?;
    let colorless = !std::io::stdout().is_terminal();

    let renderer = build_renderer(&config, mode, colors, colorless)?;

    let mut session = DebuggerSession::new(Detached::default(), renderer)
        .with_prompt(config.prompt)
        .with_rc_lines(tbkit_debugger::rc::load());

    session.report(&exception, &stack).into_diagnostic()?;

    match session.post_mortem(stack) {
        Ok(SessionExit::Restart) => {
            session
                .message("A captured program can't be restarted, leaving")
                .into_diagnostic()?;
        }
        Ok(exit) => tracing::debug!(?exit, "post mortem session ended"),
        Err(e) if e.is_recoverable() => {
            session.message(&format!("*** {e}")).into_diagnostic()?;
        }
        Err(e) => return Err(e).into_diagnostic(),
    }

    Ok(0)
}

fn build_renderer(
    config: &ReportConfig,
    mode: RenderMode,
    scheme: Option<String>,
    colorless: bool,
) -> miette::Result<TracebackRenderer> {
    let scheme = match scheme {
        Some(scheme) => scheme,
        None if colorless => colors::NO_COLOR.to_owned(),
        None => config.color_scheme.clone(),
    };

    let table = ColorSchemeTable::new(&scheme).into_diagnostic()?;
    tracing::debug!(scheme = table.active_name(), %mode, "renderer configured");

    Ok(TracebackRenderer::new(DiagnosticsContext::new(table), mode)
        .with_options(config.render_options()))
}

/// Reads and decodes the capture at the given path.
pub fn load_capture(path: &Path) -> miette::Result<(CapturedException, Vec<StackEntry>)> {
    let filename = path
        .file_name()
        .and_then(OsStr::to_str)
        .unwrap_or("<capture>");

    let content = std::fs::read_to_string(path).into_diagnostic()?;
    let document: CaptureDocument = knus::parse(filename, &content)?;

    let base = path.parent().unwrap_or(Path::new("."));
    document.into_parts(base).into_diagnostic()
}

fn parse_report_config(config: Option<String>) -> miette::Result<ReportConfig> {
    let Some(config) = config else {
        return Ok(ReportConfig::default());
    };

    let path = Path::new(&config);

    let config = if let Some((filename, "kdl")) = path
        .file_name()
        .and_then(OsStr::to_str)
        .zip(path.extension().and_then(OsStr::to_str))
    {
        let content = std::fs::read_to_string(path).into_diagnostic()?;
        knus::parse(filename, &content)?
    } else {
        knus::parse("<content>", &config)?
    };

    Ok(config)
}
