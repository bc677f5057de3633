//! Captured failures, as KDL documents.
//!
//! A capture lists the exception (or the syntax error) and the stack entries
//! of a failure, outermost caller first:
//!
//! ```kdl
//! exception "ZeroDivisionError" "division by zero" {
//!     attr "args" "('division by zero',)"
//! }
//!
//! frame "app.py" line=10 function="?"
//! frame "app.py" line=3 function="divide" varargs="rest" {
//!     arg "a"
//!     arg "b"
//!     local "a" "1"
//!     local "b" "0"
//!     local "rest" "()"
//!     unbound "result"
//!     global "RATE" "0.2"
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tbkit_report::frame::StackEntry;
use tbkit_report::render::{CapturedException, SyntaxErrorInfo};
use tbkit_report::value::{Value, ValueScope};

/// Document describing a captured failure.
#[derive(Debug, PartialEq, knus::Decode)]
pub struct CaptureDocument {
    /// The raised exception.
    #[knus(child)]
    pub exception: Option<ExceptionNode>,

    /// The syntax error, taking precedence over the exception.
    #[knus(child)]
    pub syntax_error: Option<SyntaxErrorNode>,

    /// The stack entries, outermost caller first.
    #[knus(children(name = "frame"))]
    pub frames: Vec<FrameNode>,
}

/// Captured exception.
#[derive(Debug, PartialEq, knus::Decode)]
pub struct ExceptionNode {
    /// Type name of the exception (or text marker, see `text`).
    #[knus(argument)]
    pub kind: String,

    /// Text representation of the exception value.
    #[knus(argument)]
    pub value: Option<String>,

    /// Whether `kind` is a plain text marker rather than a type name.
    #[knus(property, default)]
    pub text: bool,

    /// Reason why the value has no text representation.
    #[knus(property)]
    pub unprintable: Option<String>,

    /// Attributes of the exception value.
    #[knus(children(name = "attr"))]
    pub attrs: Vec<BindingNode>,
}

/// Captured syntax error.
#[derive(Debug, PartialEq, knus::Decode)]
pub struct SyntaxErrorNode {
    /// Error message.
    #[knus(argument)]
    pub message: String,

    /// File holding the malformed code.
    #[knus(property)]
    pub file: String,

    /// Line (1-based) of the error.
    #[knus(property)]
    pub line: Option<usize>,

    /// Column (1-based) of the error.
    #[knus(property)]
    pub column: Option<usize>,

    /// Text of the malformed line.
    #[knus(property)]
    pub text: Option<String>,
}

/// Captured stack entry.
#[derive(Debug, PartialEq, knus::Decode)]
pub struct FrameNode {
    /// Source file of the entry.
    #[knus(argument)]
    pub file: String,

    /// Line (1-based) being executed.
    #[knus(property)]
    pub line: usize,

    /// Function name (`?` at module level). Missing for anonymous functions.
    #[knus(property)]
    pub function: Option<String>,

    /// Variadic positional parameter name.
    #[knus(property)]
    pub varargs: Option<String>,

    /// Variadic keyword parameter name.
    #[knus(property)]
    pub varkw: Option<String>,

    /// Named parameters, in declaration order.
    #[knus(children(name = "arg"), unwrap(argument))]
    pub args: Vec<String>,

    /// Local bindings.
    #[knus(children(name = "local"))]
    pub locals: Vec<BindingNode>,

    /// Local names declared but not bound yet.
    #[knus(children(name = "unbound"), unwrap(argument))]
    pub unbound: Vec<String>,

    /// Global bindings.
    #[knus(children(name = "global"))]
    pub globals: Vec<BindingNode>,
}

/// Name bound to a captured value.
#[derive(Debug, PartialEq, knus::Decode)]
pub struct BindingNode {
    /// Bound name.
    #[knus(argument)]
    pub name: String,

    /// Text representation of the value.
    #[knus(argument)]
    pub repr: Option<String>,

    /// Reason why the value has no text representation.
    #[knus(property)]
    pub unprintable: Option<String>,

    /// Attributes of the value.
    #[knus(children(name = "attr"))]
    pub attrs: Vec<BindingNode>,
}

/// Error of a capture that decodes but can't be reported.
#[derive(thiserror::Error, Debug)]
pub enum CaptureError {
    /// Neither an exception nor a syntax error was captured.
    #[error("the capture holds neither an exception nor a syntax error")]
    NoFailure,

    /// A stack entry points at line 0.
    #[error("frame {index} ({file}) has no line number")]
    NoLine {
        /// Index of the stack entry.
        index: usize,
        /// Source file of the stack entry.
        file: String,
    },
}

impl CaptureDocument {
    /// Converts the document into the exception and stack entries it
    /// describes.
    ///
    /// Relative source paths are resolved against `base`, the directory
    /// of the capture. Pseudo files (such as `<console>`) are kept as is.
    pub fn into_parts(
        self,
        base: &Path,
    ) -> Result<(CapturedException, Vec<StackEntry>), CaptureError> {
        let exception = match (self.syntax_error, self.exception) {
            (Some(node), _) => CapturedException::syntax_error(SyntaxErrorInfo {
                message: node.message,
                file: source_path(base, &node.file),
                line: node.line,
                column: node.column,
                text: node.text,
            }),
            (None, Some(node)) => node.into_exception(),
            (None, None) => return Err(CaptureError::NoFailure),
        };

        let stack = self
            .frames
            .into_iter()
            .enumerate()
            .map(|(index, frame)| {
                if frame.line == 0 {
                    return Err(CaptureError::NoLine {
                        index,
                        file: frame.file,
                    });
                }
                Ok(frame.into_entry(base))
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(kind = %exception.kind, frames = stack.len(), "capture decoded");

        Ok((exception, stack))
    }
}

impl ExceptionNode {
    fn into_exception(self) -> CapturedException {
        if self.text {
            return CapturedException::text(self.kind);
        }

        let value = binding_value(self.value, self.unprintable, self.attrs);
        CapturedException::new(self.kind, value)
    }
}

impl FrameNode {
    fn into_entry(self, base: &Path) -> StackEntry {
        let locals = self
            .unbound
            .into_iter()
            .fold(scope(self.locals), ValueScope::with_unbound);

        let mut entry = StackEntry::new(source_path(base, &self.file), self.line, None)
            .with_function(self.function)
            .with_args(self.args)
            .with_locals(Arc::new(locals))
            .with_globals(Arc::new(scope(self.globals)));

        if let Some(name) = self.varargs {
            entry = entry.with_varargs(name);
        }
        if let Some(name) = self.varkw {
            entry = entry.with_varkw(name);
        }
        entry
    }
}

fn scope(bindings: Vec<BindingNode>) -> ValueScope {
    bindings.into_iter().fold(ValueScope::new(), |scope, binding| {
        let value = binding_value(binding.repr, binding.unprintable, binding.attrs);
        scope.with(binding.name, value)
    })
}

fn binding_value(
    repr: Option<String>,
    unprintable: Option<String>,
    attrs: Vec<BindingNode>,
) -> Value {
    let value = match (repr, unprintable) {
        (_, Some(reason)) => Value::unprintable(reason),
        (Some(repr), None) => Value::new(repr),
        (None, None) => Value::new(""),
    };

    attrs.into_iter().fold(value, |value, attr| {
        value.with_attr(
            attr.name,
            binding_value(attr.repr, attr.unprintable, attr.attrs),
        )
    })
}

fn source_path(base: &Path, file: &str) -> PathBuf {
    let path = Path::new(file);
    if file.starts_with('<') || path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use tbkit_report::frame::FrameSnapshot;
    use tbkit_report::render::ExceptionKind;

    use super::{CaptureDocument, CaptureError};

    fn parse(content: &str) -> CaptureDocument {
        knus::parse::<CaptureDocument>("<content>", content)
            .map_err(miette::Report::new)
            .expect("parse kdl")
    }

    #[test]
    fn frames_and_scopes() {
        let document = parse(indoc::indoc! {r#"
            exception "ZeroDivisionError" "division by zero" {
                attr "args" "('division by zero',)"
            }

            frame "app.py" line=10 function="?"
            frame "/abs/app.py" line=3 function="divide" varargs="rest" {
                arg "a"
                arg "b"
                local "a" "1"
                local "b" "0"
                local "total" unprintable="__repr__ raised"
                unbound "result"
                global "RATE" "0.2"
            }
        "#});

        let (exception, stack) = document
            .into_parts(Path::new("/captures"))
            .expect("valid capture");

        assert_eq!(exception.kind, ExceptionKind::Type("ZeroDivisionError".to_owned()));
        let value = exception.value.expect("exception value");
        assert_eq!(value.repr().ok(), Some("division by zero"));
        assert_eq!(
            value.attr("args").and_then(|v| v.repr().ok()),
            Some("('division by zero',)")
        );

        let frames = FrameSnapshot::from_entries(stack);
        assert_eq!(frames.len(), 2);

        assert_eq!(frames[0].file(), Path::new("/captures/app.py"));
        assert!(frames[0].is_module_level());

        let frame = &frames[1];
        assert_eq!(frame.file(), Path::new("/abs/app.py"));
        assert_eq!(frame.line(), 3);
        assert_eq!(frame.function(), "divide");
        assert_eq!(frame.args(), ["a", "b"]);
        assert_eq!(frame.varargs(), Some("rest"));
        assert_eq!(frame.varkw(), None);

        assert_eq!(frame.resolve("b").value.ok().as_deref(), Some("0"));
        assert_eq!(frame.resolve("RATE").value.ok().as_deref(), Some("0.2"));
        assert!(frame.resolve("result").value.is_err());
        assert!(frame.resolve("total").value.is_err());
    }

    #[test]
    fn syntax_error_takes_precedence() {
        let document = parse(indoc::indoc! {r#"
            exception "ValueError" "ignored"
            syntax-error "invalid syntax" file="<console>" line=2 column=7 text="x = = 1"
        "#});

        let (exception, stack) = document
            .into_parts(Path::new("/captures"))
            .expect("valid capture");

        assert!(stack.is_empty());

        let info = exception.syntax.expect("syntax error");
        assert_eq!(info.message, "invalid syntax");
        assert_eq!(info.file, Path::new("<console>"));
        assert_eq!((info.line, info.column), (Some(2), Some(7)));
        assert_eq!(info.text.as_deref(), Some("x = = 1"));
    }

    #[test]
    fn text_marker() {
        let document = parse(r#"exception "KeyboardInterrupt received" text=true"#);

        let (exception, _) = document
            .into_parts(Path::new("."))
            .expect("valid capture");

        assert_eq!(
            exception.kind,
            ExceptionKind::Text("KeyboardInterrupt received".to_owned())
        );
        assert!(exception.value.is_none());
    }

    #[test]
    fn missing_failure() {
        let document = parse(r#"frame "app.py" line=1"#);

        assert!(matches!(
            document.into_parts(Path::new(".")),
            Err(CaptureError::NoFailure)
        ));
    }

    #[test]
    fn frame_without_line() {
        let document = parse(indoc::indoc! {r#"
            exception "ValueError" "bad"
            frame "app.py" line=0
        "#});

        assert!(matches!(
            document.into_parts(Path::new(".")),
            Err(CaptureError::NoLine { index: 0, .. })
        ));
    }
}
