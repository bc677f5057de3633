//! This crate provides an interactive post-mortem debugger.
//!
//! A [DebuggerSession] runs a line-oriented command loop over the stack of a
//! stopped program: navigating its frames, listing their source, and
//! managing breakpoints. The program itself is driven through a
//! [Tracer](tbkit_tracer::Tracer), whose stop events open the command loop.
//!
//! A session can also be opened on the stack of an already completed
//! failure, with [post_mortem](DebuggerSession::post_mortem):
//!
//! ```no_run
//! use tbkit_debugger::DebuggerSession;
//! use tbkit_report::DiagnosticsContext;
//! use tbkit_report::frame::StackEntry;
//! use tbkit_report::render::{RenderMode, TracebackRenderer};
//! use tbkit_tracer::Detached;
//!
//! # fn main() -> tbkit_debugger::Result<()> {
//! let renderer = TracebackRenderer::new(DiagnosticsContext::default(), RenderMode::Context);
//! let mut session = DebuggerSession::new(Detached::new(), renderer)
//!     .with_rc_lines(tbkit_debugger::rc::load());
//!
//! let stack = vec![
//!     StackEntry::new("app.py", 12, "main"),
//!     StackEntry::new("app.py", 3, "divide").with_args(["a", "b"]),
//! ];
//! session.post_mortem(stack)?;
//! # Ok(())
//! # }
//! ```

mod breakpoint;
mod command;
mod error;
pub mod rc;
mod session;
mod supervisor;

pub use self::breakpoint::{Breakpoint, BreakpointTable, CommandList, HitOutcome};
pub use self::command::Flow;
pub use self::error::{Error, Result};
pub use self::session::{DEFAULT_PROMPT, DebuggerSession, SessionExit, SessionState};
pub use self::supervisor::Supervisor;
