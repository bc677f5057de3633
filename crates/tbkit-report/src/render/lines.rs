use std::path::Path;

use crate::colors::{ColorScheme, Role};
use crate::frame::FrameSnapshot;
use crate::value::{EvalError, UNRECOVERABLE_REPR, shorten};

/// Width of the line number gutter (breakpoint mark included).
pub const NUMBERS_WIDTH: usize = 7;

/// Indentation of the lines following a source line (variable values,
/// exception attributes).
pub const INDENT: &str = "        ";

/// Breakpoint hosted by a source line, shown in its gutter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BreakpointMark {
    /// Number of the breakpoint.
    pub number: u32,

    /// Whether the breakpoint is enabled.
    pub enabled: bool,
}

/// How arguments are shown in a call line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArgStyle {
    /// Argument names only.
    Names,

    /// `name=value` pairs, values being shortened to the given length.
    Values(usize),
}

/// Formats one source line with its line number gutter.
///
/// The current line is pointed at by an arrow whose width adapts to the
/// room left in the gutter by the line number and the breakpoint mark. A line
/// number of `0` leaves the gutter blank.
pub fn format_line(
    colors: &ColorScheme,
    lineno: usize,
    text: &str,
    current: bool,
    mark: Option<BreakpointMark>,
) -> String {
    let (bp, bp_len) = match mark {
        Some(mark) => {
            let role = if mark.enabled {
                Role::BreakpointEnabled
            } else {
                Role::BreakpointDisabled
            };
            let number = mark.number.to_string();
            (format!("{}{number}", colors.get(role)), number.len())
        }
        None => (String::new(), 0),
    };

    let width = NUMBERS_WIDTH.saturating_sub(bp_len);
    let num = match lineno {
        0 => String::new(),
        n => n.to_string(),
    };

    if current {
        let marker = match width.saturating_sub(num.len()) {
            0 => String::new(),
            1 => ">".to_owned(),
            2 => "> ".to_owned(),
            pad => format!("{}-> ", "-".repeat(pad - 3)),
        };

        format!(
            "{bp}{}{marker}{num}{} {text}{}\n",
            colors.get(Role::LinenoEm),
            colors.get(Role::Line),
            colors.get(Role::Normal),
        )
    } else {
        format!(
            "{bp}{}{num:>width$}{} {text}\n",
            colors.get(Role::Lineno),
            colors.get(Role::Normal),
        )
    }
}

/// Formats the link to a source file.
pub fn format_link(colors: &ColorScheme, file: &Path) -> String {
    format!(
        "{}{}{}",
        colors.get(Role::FilenameEm),
        file.display(),
        colors.get(Role::Normal)
    )
}

/// Returns the blanks placing a caret under the given column (1-based) of
/// `text`.
///
/// Whitespace characters are kept as is (so tabs still line up), any other
/// character is replaced by a space. Columns past the end of `text` are
/// padded with spaces.
pub fn caret_padding(text: &str, column: usize) -> String {
    text.chars()
        .map(|c| if c.is_whitespace() { c } else { ' ' })
        .chain(std::iter::repeat(' '))
        .take(column.saturating_sub(1))
        .collect()
}

/// Formats the call line of a frame (`in func(a, b)`).
///
/// Module-level frames have no call line. If an argument can't be found
/// in the local scope, the argument list is replaced by a failure notice.
pub fn format_call(colors: &ColorScheme, frame: &FrameSnapshot, style: ArgStyle) -> String {
    if frame.is_module_level() {
        return String::new();
    }

    let params = frame
        .args()
        .iter()
        .map(|name| (String::new(), name.as_str()))
        .chain(frame.varargs().map(|name| ("*".to_owned(), name)))
        .chain(frame.varkw().map(|name| ("**".to_owned(), name)))
        .map(|(stars, name)| match style {
            ArgStyle::Names => Ok(format!("{stars}{name}")),
            ArgStyle::Values(max_repr) => {
                let value = match frame.locals().eval(name) {
                    Ok(value) => shorten(&value, max_repr),
                    Err(EvalError::Repr(_)) => UNRECOVERABLE_REPR.to_owned(),
                    Err(e) => return Err(e),
                };
                Ok(format!("{stars}{name}={value}"))
            }
        })
        .collect::<Result<Vec<_>, _>>();

    let args = match params {
        Ok(params) => format!("({})", params.join(", ")),
        Err(e) => {
            tracing::debug!(function = frame.function(), error = %e, "failed resolving arguments");
            "(***failed resolving arguments***)".to_owned()
        }
    };

    format!(
        "in {}{}{}{args}{}",
        colors.get(Role::VName),
        frame.function(),
        colors.get(Role::ValEm),
        colors.get(Role::Normal)
    )
}

/// Formats the return value of a frame that already returned.
pub fn format_return_value(colors: &ColorScheme, value: &str, max_repr: usize) -> String {
    format!(
        "{}--Return--{} {}\n",
        colors.get(Role::Em),
        colors.get(Role::Normal),
        shorten(value, max_repr)
    )
}
