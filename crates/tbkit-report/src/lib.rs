//! This crate turns a captured program failure (an exception plus its
//! call-stack) into a human-readable, color-annotated report.
//!
//! The main components are:
//! - A [color scheme table](self::colors::ColorSchemeTable), mapping semantic
//!   roles (file names, line numbers, exception names, ...) to terminal
//!   escape sequences.
//! - A [source cache](self::source::SourceCache), giving memoized access to
//!   the lines of source files.
//! - [Frame snapshots](self::frame::FrameSnapshot), a normalized view of one
//!   call-stack entry.
//! - A [name extractor](self::names), listing the dotted names appearing on
//!   a line of code.
//! - The [traceback renderer](self::render::TracebackRenderer), composing all
//!   of the above into a single report.
//!
//! # Rendering a report
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use tbkit_report::frame::StackEntry;
//! use tbkit_report::render::{CapturedException, RenderMode, TracebackRenderer};
//! use tbkit_report::value::{Value, ValueScope};
//! use tbkit_report::DiagnosticsContext;
//!
//! let mut renderer = TracebackRenderer::new(DiagnosticsContext::default(), RenderMode::Verbose);
//!
//! let stack = vec![
//!     StackEntry::new("app.py", 10, "main"),
//!     StackEntry::new("app.py", 3, "divide")
//!         .with_args(["a", "b"])
//!         .with_locals(Arc::new(
//!             ValueScope::new()
//!                 .with("a", Value::new("1"))
//!                 .with("b", Value::new("0")),
//!         )),
//! ];
//!
//! let exception = CapturedException::new("ZeroDivisionError", Value::new("division by zero"));
//!
//! renderer.print_report(&exception, &stack);
//! ```

/// Module implementing color schemes and the table of registered schemes.
pub mod colors;

mod context;
mod error;

/// Module implementing stack frame snapshots.
pub mod frame;

/// Module implementing the extraction of dotted names from source lines.
pub mod names;

/// Module implementing the traceback renderer.
pub mod render;

/// Module implementing the source file cache.
pub mod source;

/// Module implementing the value and scope model of captured frames.
pub mod value;

pub use self::context::{DiagnosticsContext, Interrupt};
pub use self::error::{Error, Result};
