use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};

use tbkit_report::frame::StackEntry;
use tbkit_report::render::CapturedException;

/// Counter of the breakpoint numbers handed out within this process.
static BREAKPOINT_NUMBER: AtomicU32 = AtomicU32::new(1);

/// Returns a new breakpoint number.
///
/// Numbers are process-wide, start at 1, and are never reused (even after a
/// session reset).
pub fn next_breakpoint_number() -> u32 {
    BREAKPOINT_NUMBER.fetch_add(1, Ordering::Relaxed)
}

/// How a stopped program is resumed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResumeMode {
    /// Runs until the next breakpoint.
    Continue,

    /// Stops at the next line executed, entering calls.
    Step,

    /// Stops at the next line of the current function, stepping over calls.
    Next,
}

/// Event stopping (or ending) the traced program.
#[derive(Clone, Debug)]
pub enum DebugEvent {
    /// A breakpoint was hit.
    Breakpoint {
        /// Number of the breakpoint.
        number: u32,

        /// Stack of the program, outermost caller first.
        stack: Vec<StackEntry>,
    },

    /// A step (or next) completed.
    Step {
        /// Stack of the program, outermost caller first.
        stack: Vec<StackEntry>,
    },

    /// An exception escaped the program.
    Exception {
        /// The uncaught exception.
        exception: CapturedException,

        /// Stack of the program at the time of the exception, outermost
        /// caller first.
        stack: Vec<StackEntry>,
    },

    /// The program exited.
    Exited {
        /// Exit code of the program.
        exit_code: i32,
    },
}

/// Breakpoint/step tracing capability of a running program.
///
/// Each operation may fail with a backend error, which the debugger
/// session shows to the user instead of stopping.
pub trait Tracer {
    /// Error returned by the tracer backend.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Sets a breakpoint at the given location, optionally guarded by a
    /// condition. Returns the breakpoint number.
    fn set_break(
        &mut self,
        file: &Path,
        line: usize,
        condition: Option<&str>,
    ) -> crate::Result<u32, Self::Error>;

    /// Clears the breakpoint with the given number.
    fn clear_break(&mut self, number: u32) -> crate::Result<(), Self::Error>;

    /// Changes (or removes) the condition of a breakpoint.
    fn set_condition(
        &mut self,
        number: u32,
        condition: Option<&str>,
    ) -> crate::Result<(), Self::Error>;

    /// Resumes the program.
    fn resume(&mut self, mode: ResumeMode) -> crate::Result<(), Self::Error>;

    /// Blocks until the next event of the program.
    fn wait_event(&mut self) -> crate::Result<DebugEvent, Self::Error>;

    /// Restarts the program from the beginning, keeping the breakpoints.
    fn restart(&mut self) -> crate::Result<(), Self::Error>;
}

impl<T: Tracer + ?Sized> Tracer for &mut T {
    type Error = T::Error;

    fn set_break(
        &mut self,
        file: &Path,
        line: usize,
        condition: Option<&str>,
    ) -> crate::Result<u32, Self::Error> {
        (**self).set_break(file, line, condition)
    }

    fn clear_break(&mut self, number: u32) -> crate::Result<(), Self::Error> {
        (**self).clear_break(number)
    }

    fn set_condition(
        &mut self,
        number: u32,
        condition: Option<&str>,
    ) -> crate::Result<(), Self::Error> {
        (**self).set_condition(number, condition)
    }

    fn resume(&mut self, mode: ResumeMode) -> crate::Result<(), Self::Error> {
        (**self).resume(mode)
    }

    fn wait_event(&mut self) -> crate::Result<DebugEvent, Self::Error> {
        (**self).wait_event()
    }

    fn restart(&mut self) -> crate::Result<(), Self::Error> {
        (**self).restart()
    }
}
