mod lines;
mod plain;
mod syntax;
mod verbose;

use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;

pub use self::lines::{
    ArgStyle, BreakpointMark, INDENT, NUMBERS_WIDTH, caret_padding, format_call, format_line,
    format_link, format_return_value,
};
use crate::frame::{FrameSnapshot, Introspect};
use crate::value::Value;
use crate::{DiagnosticsContext, Error};

/// Text substituted for an exception value that couldn't be turned into
/// text.
pub const REPORTING_ERROR: &str = "(reporting error)";

/// Verbosity mode of the renderer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RenderMode {
    /// One line per stack entry, plus its source line.
    Plain,

    /// A window of source lines per stack entry.
    #[default]
    Context,

    /// Same as [Context](Self::Context), plus call arguments and the values
    /// of the names appearing on the failing lines.
    Verbose,
}

impl RenderMode {
    /// All the modes, in cycling order.
    pub const ALL: [RenderMode; 3] = [Self::Plain, Self::Context, Self::Verbose];

    /// Returns the mode following this one in the cycle.
    pub fn next(self) -> Self {
        match self {
            Self::Plain => Self::Context,
            Self::Context => Self::Verbose,
            Self::Verbose => Self::Plain,
        }
    }

    /// Returns the name of this mode.
    pub fn name(self) -> &'static str {
        match self {
            Self::Plain => "Plain",
            Self::Context => "Context",
            Self::Verbose => "Verbose",
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RenderMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownMode(s.to_owned()))
    }
}

/// Kind of a captured exception.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExceptionKind {
    /// Structured exception type, given by name.
    Type(String),

    /// Plain text exception marker, shown unmodified.
    Text(String),
}

impl ExceptionKind {
    /// Returns the name of this kind.
    pub fn name(&self) -> &str {
        match self {
            Self::Type(name) | Self::Text(name) => name,
        }
    }
}

impl fmt::Display for ExceptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Location details carried by a syntax error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyntaxErrorInfo {
    /// Error message.
    pub message: String,

    /// File holding the malformed code.
    pub file: PathBuf,

    /// Line (1-based) of the error, if known.
    pub line: Option<usize>,

    /// Column (1-based) of the error, if known.
    pub column: Option<usize>,

    /// Text of the malformed line, if known.
    pub text: Option<String>,
}

/// Captured exception: its kind and value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapturedException {
    /// Kind of the exception.
    pub kind: ExceptionKind,

    /// Value of the exception, if any.
    pub value: Option<Value>,

    /// Location details, for syntax errors.
    pub syntax: Option<SyntaxErrorInfo>,
}

impl CapturedException {
    /// Creates an exception of the given type.
    pub fn new(kind: impl Into<String>, value: Value) -> Self {
        Self {
            kind: ExceptionKind::Type(kind.into()),
            value: Some(value),
            syntax: None,
        }
    }

    /// Creates a plain text exception marker, without value.
    pub fn text(marker: impl Into<String>) -> Self {
        Self {
            kind: ExceptionKind::Text(marker.into()),
            value: None,
            syntax: None,
        }
    }

    /// Creates a syntax error.
    pub fn syntax_error(info: SyntaxErrorInfo) -> Self {
        Self {
            kind: ExceptionKind::Type("SyntaxError".to_owned()),
            value: Some(Value::new(info.message.clone())),
            syntax: Some(info),
        }
    }
}

/// Tunables of the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    /// Number of source lines shown around every frame's line.
    pub context: usize,

    /// Number of outermost frames dropped from the reports.
    pub tb_offset: usize,

    /// Maximum length of the values shown in verbose reports.
    pub max_repr: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            context: 5,
            tb_offset: 0,
            max_repr: 100,
        }
    }
}

/// Formatting engine turning captured exceptions into reports.
#[derive(Debug)]
pub struct TracebackRenderer {
    ctx: DiagnosticsContext,
    mode: RenderMode,
    options: RenderOptions,
}

impl TracebackRenderer {
    /// Creates a renderer with the given context and initial mode.
    pub fn new(ctx: DiagnosticsContext, mode: RenderMode) -> Self {
        Self {
            ctx,
            mode,
            options: RenderOptions::default(),
        }
    }

    /// Sets the tunables of this renderer.
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the current mode.
    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// Switches to the given mode, or to the next one in the cycle if
    /// `mode` is `None`. Returns the new mode.
    pub fn set_mode(&mut self, mode: Option<RenderMode>) -> RenderMode {
        self.mode = mode.unwrap_or_else(|| self.mode.next());
        tracing::debug!(mode = %self.mode, "render mode");
        self.mode
    }

    /// Returns the tunables of this renderer.
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Returns the diagnostics context.
    pub fn context(&self) -> &DiagnosticsContext {
        &self.ctx
    }

    /// Returns the diagnostics context, mutably.
    pub fn context_mut(&mut self) -> &mut DiagnosticsContext {
        &mut self.ctx
    }

    /// Renders a report in the current mode.
    pub fn render<S>(&mut self, exception: &CapturedException, stack: &S) -> String
    where
        S: Introspect + ?Sized,
    {
        self.render_with(exception, stack, None, None)
    }

    /// Renders a report, optionally overriding the current mode and the
    /// frame offset for this call only.
    ///
    /// If the stack frame records can't be obtained, the failure is logged
    /// and an empty report is returned.
    pub fn render_with<S>(
        &mut self,
        exception: &CapturedException,
        stack: &S,
        mode: Option<RenderMode>,
        tb_offset: Option<usize>,
    ) -> String
    where
        S: Introspect + ?Sized,
    {
        let mode = mode.unwrap_or(self.mode);
        let tb_offset = tb_offset.unwrap_or(self.options.tb_offset);

        let _span = tracing::info_span!("render", %mode, exception = %exception.kind).entered();

        let colors = self.ctx.colors().active();
        let interrupt = self.ctx.interrupt().clone();
        let sources = self.ctx.sources_mut();
        sources.invalidate();

        let mut entries = match stack.stack_entries() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!(error = ?e, "failed to render report");
                return String::new();
            }
        };

        if entries.len() > tb_offset {
            entries.drain(..tb_offset);
        }
        let frames = FrameSnapshot::from_entries(entries);

        if let Some(info) = &exception.syntax {
            if mode != RenderMode::Plain {
                if let Some(report) =
                    syntax::render(&colors, sources, info, self.options.context)
                {
                    return report;
                }
            }
            return plain::render(&colors, sources, exception, &frames);
        }

        if mode == RenderMode::Plain || frames.len() < 2 {
            return plain::render(&colors, sources, exception, &frames);
        }

        let options = verbose::Options {
            context: self.options.context,
            max_repr: self.options.max_repr,
            include_vars: mode == RenderMode::Verbose,
        };
        verbose::render(&colors, sources, &interrupt, exception, &frames, options)
    }

    /// Renders a report in the current mode and writes it to `out`.
    pub fn write_report<S>(
        &mut self,
        out: &mut dyn Write,
        exception: &CapturedException,
        stack: &S,
    ) -> std::io::Result<()>
    where
        S: Introspect + ?Sized,
    {
        let report = self.render(exception, stack);
        writeln!(out, "{report}")
    }

    /// Renders a report in the current mode and writes it to the standard
    /// error stream.
    pub fn print_report<S>(&mut self, exception: &CapturedException, stack: &S)
    where
        S: Introspect + ?Sized,
    {
        if let Err(e) = self.write_report(&mut std::io::stderr(), exception, stack) {
            tracing::error!(error = %e, "failed to write report");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RenderMode;

    #[test]
    fn mode_names() {
        for mode in RenderMode::ALL {
            assert_eq!(mode.to_string().parse::<RenderMode>().ok(), Some(mode));
        }

        assert_eq!("verbose".parse::<RenderMode>().ok(), Some(RenderMode::Verbose));
        assert!("Loud".parse::<RenderMode>().is_err());
    }

    #[test]
    fn modes_cycle() {
        let mut mode = RenderMode::Plain;
        for _ in 0..3 {
            mode = mode.next();
        }
        assert_eq!(mode, RenderMode::Plain);
    }
}
