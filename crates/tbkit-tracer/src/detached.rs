use std::collections::BTreeSet;
use std::convert::Infallible;
use std::path::Path;

use crate::{DebugEvent, Error, ResumeMode, Tracer, next_breakpoint_number};

/// Tracer not attached to any running program.
///
/// It backs pure post-mortem sessions: breakpoints can still be managed
/// (so that they are listed in source windows), but the program can't be
/// resumed.
#[derive(Debug, Default)]
pub struct Detached {
    breakpoints: BTreeSet<u32>,
}

impl Detached {
    /// Creates a detached tracer.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tracer for Detached {
    type Error = Infallible;

    fn set_break(
        &mut self,
        file: &Path,
        line: usize,
        _condition: Option<&str>,
    ) -> crate::Result<u32, Self::Error> {
        let number = next_breakpoint_number();
        tracing::debug!(number, file = %file.display(), line, "breakpoint recorded");

        self.breakpoints.insert(number);
        Ok(number)
    }

    fn clear_break(&mut self, number: u32) -> crate::Result<(), Self::Error> {
        if self.breakpoints.remove(&number) {
            Ok(())
        } else {
            Err(Error::UnknownBreakpoint(number))
        }
    }

    fn set_condition(
        &mut self,
        number: u32,
        _condition: Option<&str>,
    ) -> crate::Result<(), Self::Error> {
        if self.breakpoints.contains(&number) {
            Ok(())
        } else {
            Err(Error::UnknownBreakpoint(number))
        }
    }

    fn resume(&mut self, _mode: ResumeMode) -> crate::Result<(), Self::Error> {
        Err(Error::Detached)
    }

    fn wait_event(&mut self) -> crate::Result<DebugEvent, Self::Error> {
        Err(Error::Detached)
    }

    fn restart(&mut self) -> crate::Result<(), Self::Error> {
        Err(Error::Detached)
    }
}
