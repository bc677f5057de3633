//! This crate defines the tracer capability driven by the tbkit debugger.
//!
//! A tracer sets and clears breakpoints within a running program, resumes it
//! (continuing, stepping into calls or over them), and reports the events
//! stopping it. The debugger session only configures the tracer and reacts
//! to its events: the actual tracing primitive is provided by the host
//! runtime.
//!
//! # Implementing a tracer
//!
//! ```no_run
//! use tbkit_tracer::{DebugEvent, ResumeMode, Tracer, next_breakpoint_number};
//!
//! struct Recorder {
//!     events: Vec<DebugEvent>,
//! }
//!
//! impl Tracer for Recorder {
//!     type Error = std::io::Error;
//!
//!     fn set_break(
//!         &mut self,
//!         _file: &std::path::Path,
//!         _line: usize,
//!         _condition: Option<&str>,
//!     ) -> tbkit_tracer::Result<u32, Self::Error> {
//!         Ok(next_breakpoint_number())
//!     }
//!
//!     fn clear_break(&mut self, _number: u32) -> tbkit_tracer::Result<(), Self::Error> {
//!         Ok(())
//!     }
//!
//!     fn set_condition(
//!         &mut self,
//!         _number: u32,
//!         _condition: Option<&str>,
//!     ) -> tbkit_tracer::Result<(), Self::Error> {
//!         Ok(())
//!     }
//!
//!     fn resume(&mut self, _mode: ResumeMode) -> tbkit_tracer::Result<(), Self::Error> {
//!         Ok(())
//!     }
//!
//!     fn wait_event(&mut self) -> tbkit_tracer::Result<DebugEvent, Self::Error> {
//!         Ok(self.events.pop().unwrap_or(DebugEvent::Exited { exit_code: 0 }))
//!     }
//!
//!     fn restart(&mut self) -> tbkit_tracer::Result<(), Self::Error> {
//!         Ok(())
//!     }
//! }
//! ```

mod detached;
mod error;
mod tracer;

pub use self::detached::Detached;
pub use self::error::{BackendError, Error, Result};
pub use self::tracer::{DebugEvent, ResumeMode, Tracer, next_breakpoint_number};
