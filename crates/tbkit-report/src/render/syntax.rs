use super::SyntaxErrorInfo;
use super::lines::{INDENT, caret_padding, format_line, format_link};
use super::verbose::header;
use crate::colors::{ColorScheme, Role};
use crate::source::SourceCache;

/// Renders the "source of error" report of a syntax error.
///
/// Returns `None` if the error carries no line number, in which case the
/// caller falls back to the plain report.
pub(super) fn render(
    colors: &ColorScheme,
    sources: &mut SourceCache,
    info: &SyntaxErrorInfo,
    context: usize,
) -> Option<String> {
    let lineno = info.line?;
    let normal = colors.get(Role::Normal);

    let head = header(colors, "SyntaxError", "Source of error (context)");

    let mut block = format_link(colors, &info.file);
    block.push('\n');

    // syntax errors have no frame, so the window is padded to always
    // center the failing line
    let window = sources.padded_window(&info.file, lineno, context / 2);

    for line in &window {
        let current = line.lineno == lineno;
        block.push_str(&format_line(colors, line.lineno, &line.text, current, None));

        let Some(column) = info.column.filter(|_| current) else {
            continue;
        };

        let text = info.text.as_deref().unwrap_or(&line.text);
        block.push_str(&format!(
            "{INDENT}{}{}^{normal}\n",
            colors.get(Role::Caret),
            caret_padding(text, column)
        ));
    }

    let exception = format!(
        "{}SyntaxError{normal}: {}",
        colors.get(Role::ExcName),
        info.message
    );

    Some(format!("{head}\n\n{block}\n{exception}"))
}
