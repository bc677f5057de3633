use super::lines::caret_padding;
use super::{CapturedException, ExceptionKind, REPORTING_ERROR};
use crate::colors::{ColorScheme, Role};
use crate::frame::FrameSnapshot;
use crate::source::SourceCache;

/// Renders the compact, one line per frame, report.
pub(super) fn render(
    colors: &ColorScheme,
    sources: &mut SourceCache,
    exception: &CapturedException,
    frames: &[FrameSnapshot],
) -> String {
    let normal = colors.get(Role::Normal);

    let mut out = String::new();

    match frames.split_last() {
        Some((last, others)) => {
            out.push_str(&format!(
                "Traceback {}(most recent call last){normal}:\n",
                colors.get(Role::NormalEm)
            ));

            for frame in others {
                out.push_str(&format_entry(colors, sources, frame));
            }
            out.push_str(&format_last_entry(colors, sources, last));
        }
        None => out.push_str(&format!(
            "{}{}{normal}\n",
            colors.get(Role::Topline),
            "-".repeat(60)
        )),
    }

    let lines = format_exception_only(colors, exception);
    if let Some((last, others)) = lines.split_last() {
        for line in others {
            out.push(' ');
            out.push_str(line);
        }
        out.push_str(last);
    }

    out
}

fn format_entry(colors: &ColorScheme, sources: &mut SourceCache, frame: &FrameSnapshot) -> String {
    let normal = colors.get(Role::Normal);

    let mut item = format!(
        "  File {}\"{}\"{normal}, line {}{}{normal}, in {}{}{normal}\n",
        colors.get(Role::Filename),
        frame.file().display(),
        colors.get(Role::Lineno),
        frame.line(),
        colors.get(Role::Name),
        frame.function(),
    );

    if let Some(line) = frame.source_line(sources).filter(|l| !l.trim().is_empty()) {
        item.push_str(&format!("    {}\n", line.trim()));
    }
    item
}

fn format_last_entry(
    colors: &ColorScheme,
    sources: &mut SourceCache,
    frame: &FrameSnapshot,
) -> String {
    let normal_em = colors.get(Role::NormalEm);
    let normal = colors.get(Role::Normal);

    let mut item = format!(
        "{normal_em}  File {}\"{}\"{normal_em}, line {}{}{normal_em}, in {}{}{normal_em}{normal}\n",
        colors.get(Role::FilenameEm),
        frame.file().display(),
        colors.get(Role::LinenoEm),
        frame.line(),
        colors.get(Role::NameEm),
        frame.function(),
    );

    if let Some(line) = frame.source_line(sources).filter(|l| !l.trim().is_empty()) {
        item.push_str(&format!("{}    {}{normal}\n", colors.get(Role::Line), line.trim()));
    }
    item
}

/// Formats the exception part of a report.
///
/// The last returned line is the `Kind: value` line. Syntax errors come with
/// a few more lines pointing at the malformed code.
pub(super) fn format_exception_only(
    colors: &ColorScheme,
    exception: &CapturedException,
) -> Vec<String> {
    let normal = colors.get(Role::Normal);
    let normal_em = colors.get(Role::NormalEm);

    if exception.value.is_none() {
        return vec![format!("{}\n", kind_text(colors, &exception.kind))];
    }

    let mut lines = Vec::new();

    if let Some(info) = &exception.syntax {
        let file = info.file.display().to_string();
        let file = if file.is_empty() { "<string>" } else { &file };

        let line = match info.line {
            Some(line) => format!(", line {}{line}", colors.get(Role::LinenoEm)),
            None => String::new(),
        };

        lines.push(format!(
            "{normal_em}  File {}\"{file}\"{normal_em}{line}{normal}\n",
            colors.get(Role::FilenameEm),
        ));

        if let Some(text) = &info.text {
            lines.push(format!(
                "{}    {}{normal}\n",
                colors.get(Role::Line),
                text.trim()
            ));

            if let Some(column) = info.column {
                let trimmed = text.trim_start();
                let indent = text[..text.len() - trimmed.len()].chars().count();

                lines.push(format!(
                    "{}    {}^{normal}\n",
                    colors.get(Role::Caret),
                    caret_padding(trimmed, column.saturating_sub(indent))
                ));
            }
        }
    }

    lines.push(exception_line(colors, exception));
    lines
}

/// Formats the `Kind: value` line of an exception.
///
/// If the value can't be turned into text, a fallback notice is shown
/// instead.
pub(super) fn exception_line(colors: &ColorScheme, exception: &CapturedException) -> String {
    let kind = kind_text(colors, &exception.kind);

    let Some(value) = &exception.value else {
        return kind;
    };

    let message = match &exception.syntax {
        Some(info) => Ok(info.message.as_str()),
        None => value.repr(),
    };

    let message = match message {
        Ok("") => return kind,
        Ok(message) => message,
        Err(e) => {
            tracing::debug!(error = %e, "exception value has no text representation");
            REPORTING_ERROR
        }
    };

    format!(
        "{kind}{}:{} {message}",
        colors.get(Role::ExcName),
        colors.get(Role::Normal)
    )
}

fn kind_text(colors: &ColorScheme, kind: &ExceptionKind) -> String {
    match kind {
        ExceptionKind::Type(name) => format!(
            "{}{name}{}",
            colors.get(Role::ExcName),
            colors.get(Role::Normal)
        ),
        ExceptionKind::Text(text) => text.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::{exception_line, format_exception_only};
    use crate::colors::ColorScheme;
    use crate::render::{CapturedException, ExceptionKind, SyntaxErrorInfo};
    use crate::value::Value;

    #[test]
    fn text_kind_is_unmodified() {
        let colors = ColorScheme::linux();

        let exception = CapturedException::text("custom failure marker");
        assert_eq!(
            format_exception_only(&colors, &exception),
            ["custom failure marker\n"]
        );

        let exception = CapturedException {
            kind: ExceptionKind::Text("marker".to_owned()),
            value: Some(Value::new("detail")),
            syntax: None,
        };
        assert!(exception_line(&colors, &exception).starts_with("marker\x1b["));
    }

    #[test]
    fn unprintable_value_falls_back() {
        let colors = ColorScheme::no_color();

        let exception = CapturedException::new("ValueError", Value::unprintable("__str__ raised"));
        assert_eq!(
            exception_line(&colors, &exception),
            "ValueError: (reporting error)"
        );
    }

    #[test]
    fn syntax_error_points_at_column() {
        let colors = ColorScheme::no_color();

        let exception = CapturedException::syntax_error(SyntaxErrorInfo {
            message: "invalid syntax".to_owned(),
            file: "mod.py".into(),
            line: Some(2),
            column: Some(7),
            text: Some("    x = = 1".to_owned()),
        });

        assert_eq!(
            format_exception_only(&colors, &exception),
            [
                "  File \"mod.py\", line 2\n",
                "    x = = 1\n",
                "      ^\n",
                "SyntaxError: invalid syntax",
            ]
        );
    }
}
