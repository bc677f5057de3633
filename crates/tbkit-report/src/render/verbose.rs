use super::CapturedException;
use super::lines::{ArgStyle, INDENT, format_call, format_line, format_link, format_return_value};
use super::plain::exception_line;
use crate::Interrupt;
use crate::colors::{ColorScheme, Role};
use crate::frame::{FrameSnapshot, NameScope, ResolvedName};
use crate::names::extract_statement;
use crate::source::SourceCache;
use crate::value::{UNDEFINED, UNRECOVERABLE_REPR, shorten};

/// Width of the report header.
const HEADER_WIDTH: usize = 75;

#[derive(Clone, Copy, Debug)]
pub(super) struct Options {
    pub context: usize,
    pub max_repr: usize,
    pub include_vars: bool,
}

/// Formats the header of a report: a separator line, then the exception
/// kind with the title right-justified.
pub(super) fn header(colors: &ColorScheme, kind: &str, title: &str) -> String {
    let width = HEADER_WIDTH.saturating_sub(kind.chars().count());

    format!(
        "{}{}{normal}\n{}{kind}{normal}{title:>width$}",
        colors.get(Role::Topline),
        "-".repeat(HEADER_WIDTH),
        colors.get(Role::ExcName),
        normal = colors.get(Role::Normal),
    )
}

/// Renders the report showing a source window for every frame (and, if
/// enabled, the values of the names found on the failing lines).
pub(super) fn render(
    colors: &ColorScheme,
    sources: &mut SourceCache,
    interrupt: &Interrupt,
    exception: &CapturedException,
    frames: &[FrameSnapshot],
    options: Options,
) -> String {
    let head = header(
        colors,
        exception.kind.name(),
        "Traceback (most recent call last)",
    );

    // code typed at a console has no source file
    let with_source = !frames.first().is_some_and(FrameSnapshot::is_console);

    let blocks: Vec<_> = frames
        .iter()
        .map(|frame| format_frame(colors, sources, interrupt, frame, with_source, options))
        .collect();

    let exception = format_exception(colors, exception, options);

    format!("{head}\n\n{}\n{exception}", blocks.join("\n"))
}

fn format_frame(
    colors: &ColorScheme,
    sources: &mut SourceCache,
    interrupt: &Interrupt,
    frame: &FrameSnapshot,
    with_source: bool,
    options: Options,
) -> String {
    let mut out = String::new();

    if let Some(value) = frame.return_value() {
        out.push_str(&format_return_value(colors, value, options.max_repr));
    }

    let style = if options.include_vars {
        ArgStyle::Values(options.max_repr)
    } else {
        ArgStyle::Names
    };

    out.push_str(&format!(
        "{} {}\n",
        format_link(colors, frame.file()),
        format_call(colors, frame, style)
    ));

    if !with_source {
        return out;
    }

    let window = frame.window(sources, options.context);

    let values = if options.include_vars && window.contains(frame.line()) {
        format_values(colors, sources, interrupt, frame, options.max_repr)
    } else {
        String::new()
    };

    for line in &window {
        let current = line.lineno == frame.line();
        out.push_str(&format_line(colors, line.lineno, &line.text, current, None));

        if current && !values.is_empty() {
            out.push_str(&values);
            out.push('\n');
        }
    }

    out
}

/// Formats the values of the names appearing in the statement being
/// executed by the given frame.
fn format_values(
    colors: &ColorScheme,
    sources: &mut SourceCache,
    interrupt: &Interrupt,
    frame: &FrameSnapshot,
    max_repr: usize,
) -> String {
    let lines = sources.lines(frame.file());
    let Some(statement) = frame.line().checked_sub(1).and_then(|i| lines.get(i..)) else {
        return String::new();
    };

    let names = extract_statement(statement);

    match frame.resolve_names(&names, interrupt) {
        Ok(resolved) if resolved.is_empty() => String::new(),
        Ok(resolved) => {
            let sep = format!("{}\n{INDENT}{}", colors.get(Role::ValEm), colors.get(Role::Normal));

            let values: Vec<_> = resolved
                .iter()
                .map(|name| format_value(colors, name, max_repr))
                .collect();

            format!("{INDENT}{}", values.join(&sep))
        }
        Err(_) => format!(
            "{INDENT}{}(value display interrupted){}",
            colors.get(Role::Em),
            colors.get(Role::Normal)
        ),
    }
}

fn format_value(colors: &ColorScheme, resolved: &ResolvedName, max_repr: usize) -> String {
    let normal = colors.get(Role::Normal);
    let em = colors.get(Role::Em);
    let vname = colors.get(Role::VName);

    let name = match resolved.scope {
        NameScope::Local => format!("{vname}{}{normal}", resolved.name),
        NameScope::Global => format!("{em}global{normal} {vname}{}{normal}", resolved.name),
    };

    let value = match &resolved.value {
        Ok(value) => shorten(value, max_repr),
        Err(e) => {
            tracing::trace!(name = %resolved.name, error = %e, "unresolved name");
            format!("{em}{UNDEFINED}{normal}")
        }
    };

    format!("{name} {}= {value}{normal}", colors.get(Role::ValEm))
}

fn format_exception(
    colors: &ColorScheme,
    exception: &CapturedException,
    options: Options,
) -> String {
    let mut out = exception_line(colors, exception);

    let Some(value) = exception.value.as_ref().filter(|_| options.include_vars) else {
        return out;
    };

    for (name, attr) in value.attrs() {
        let repr = match attr.repr() {
            Ok(repr) => shorten(repr, options.max_repr),
            Err(_) => UNRECOVERABLE_REPR.to_owned(),
        };
        out.push_str(&format!("\n{INDENT}{name} = {repr}"));
    }

    out
}
