// Once clippy takes `clippy.toml` into account (for `tests` targets),
// we can remove these.
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(clippy::print_stdout)]
#![allow(clippy::unwrap_used)]
#![allow(missing_docs)]

use tbkit_report::DiagnosticsContext;
use tbkit_report::colors::{self, ColorSchemeTable};
use tbkit_report::render::{RenderMode, TracebackRenderer};
use test_log::test;

#[test]
fn plain_report_of_capture() {
    let dir = tempfile::tempdir().expect("temp dir");

    std::fs::write(
        dir.path().join("app.py"),
        indoc::indoc! {"
            def divide(a, b):
                return a / b

            divide(1, 0)
        "},
    )
    .expect("write source");

    let capture = dir.path().join("failure.kdl");
    std::fs::write(
        &capture,
        indoc::indoc! {r#"
            exception "ZeroDivisionError" "division by zero"

            frame "app.py" line=4 function="?"
            frame "app.py" line=2 function="divide" {
                arg "a"
                arg "b"
                local "a" "1"
                local "b" "0"
            }
        "#},
    )
    .expect("write capture");

    let (exception, stack) = tbkit_cli::load_capture(&capture).expect("load capture");

    let colors = ColorSchemeTable::new(colors::NO_COLOR).expect("builtin scheme");
    let mut renderer = TracebackRenderer::new(DiagnosticsContext::new(colors), RenderMode::Plain);

    let file = dir.path().join("app.py");
    assert_eq!(
        renderer.render(&exception, &stack),
        indoc::formatdoc! {r#"
            Traceback (most recent call last):
              File "{file}", line 4, in ?
                divide(1, 0)
              File "{file}", line 2, in divide
                return a / b
            ZeroDivisionError: division by zero"#,
            file = file.display()
        }
    );
}

#[test]
fn invalid_capture_is_reported() {
    let dir = tempfile::tempdir().expect("temp dir");
    let capture = dir.path().join("failure.kdl");

    std::fs::write(&capture, "frame \"app.py\" line=1\n").expect("write capture");
    assert!(tbkit_cli::load_capture(&capture).is_err());

    std::fs::write(&capture, "frame \"app.py\"\n").expect("write capture");
    assert!(tbkit_cli::load_capture(&capture).is_err());
}
