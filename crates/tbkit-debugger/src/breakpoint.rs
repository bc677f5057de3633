use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tbkit_report::render::BreakpointMark;

use crate::{Error, Result};

/// Breakpoint set by the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Breakpoint {
    /// Number of the breakpoint, as handed out by the tracer.
    pub number: u32,

    /// File hosting the breakpoint.
    pub file: PathBuf,

    /// Line hosting the breakpoint.
    pub line: usize,

    /// Condition guarding the breakpoint, if any.
    pub condition: Option<String>,

    /// Whether the breakpoint is deleted after its first effective hit.
    pub temporary: bool,

    /// Whether the breakpoint stops the program.
    pub enabled: bool,

    /// Number of upcoming hits to ignore.
    pub ignore: u32,

    /// Number of times the breakpoint was hit.
    pub hits: u32,
}

impl Breakpoint {
    /// Creates an enabled breakpoint.
    pub fn new(number: u32, file: impl Into<PathBuf>, line: usize) -> Self {
        Self {
            number,
            file: file.into(),
            line,
            condition: None,
            temporary: false,
            enabled: true,
            ignore: 0,
            hits: 0,
        }
    }

    /// Returns the gutter mark of this breakpoint.
    pub fn mark(&self) -> BreakpointMark {
        BreakpointMark {
            number: self.number,
            enabled: self.enabled,
        }
    }
}

impl fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let disp = if self.temporary { "del " } else { "keep" };
        let enabled = if self.enabled { "yes" } else { "no " };

        write!(
            f,
            "{:<4}breakpoint   {disp} {enabled} at {}:{}",
            self.number,
            self.file.display(),
            self.line
        )?;

        if let Some(condition) = &self.condition {
            write!(f, "\n\tstop only if {condition}")?;
        }
        if self.ignore > 0 {
            write!(f, "\n\tignore next {} hits", self.ignore)?;
        }
        match self.hits {
            0 => Ok(()),
            1 => write!(f, "\n\tbreakpoint already hit 1 time"),
            n => write!(f, "\n\tbreakpoint already hit {n} times"),
        }
    }
}

/// What to do when the program hits a breakpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitOutcome {
    /// Stop the program.
    Stop,

    /// Stop the program, then delete the (temporary) breakpoint.
    StopOnce,

    /// Resume the program silently (disabled or ignored breakpoint).
    Skip,
}

/// Breakpoints of a session, in creation order.
#[derive(Debug, Default)]
pub struct BreakpointTable {
    breakpoints: IndexMap<u32, Breakpoint>,
}

impl BreakpointTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a breakpoint to the table.
    pub fn insert(&mut self, breakpoint: Breakpoint) {
        self.breakpoints.insert(breakpoint.number, breakpoint);
    }

    /// Removes a breakpoint from the table.
    pub fn remove(&mut self, number: u32) -> Result<Breakpoint> {
        self.breakpoints
            .shift_remove(&number)
            .ok_or(Error::NoSuchBreakpoint(number))
    }

    /// Returns the breakpoint with the given number.
    pub fn get(&self, number: u32) -> Option<&Breakpoint> {
        self.breakpoints.get(&number)
    }

    /// Returns the breakpoint with the given number, mutably.
    pub fn get_mut(&mut self, number: u32) -> Result<&mut Breakpoint> {
        self.breakpoints
            .get_mut(&number)
            .ok_or(Error::NoSuchBreakpoint(number))
    }

    /// Returns the most recently created breakpoint.
    pub fn last(&self) -> Option<&Breakpoint> {
        self.breakpoints.values().last()
    }

    /// Iterates over the breakpoints, in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Breakpoint> {
        self.breakpoints.values()
    }

    /// Returns the numbers of the breakpoints hosted by the given location.
    pub fn numbers_at(&self, file: &Path, line: usize) -> Vec<u32> {
        self.iter()
            .filter(|bp| bp.line == line && bp.file == file)
            .map(|bp| bp.number)
            .collect()
    }

    /// Returns the gutter mark of the given line: the most recently created
    /// breakpoint hosted by it, if any.
    pub fn mark_at(&self, file: &Path, line: usize) -> Option<BreakpointMark> {
        self.iter()
            .filter(|bp| bp.line == line && bp.file == file)
            .last()
            .map(Breakpoint::mark)
    }

    /// Returns whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.breakpoints.is_empty()
    }

    /// Records a hit of the given breakpoint and tells whether the program
    /// must stop.
    pub fn hit(&mut self, number: u32) -> Result<HitOutcome> {
        let bp = self.get_mut(number)?;
        bp.hits += 1;

        if !bp.enabled {
            return Ok(HitOutcome::Skip);
        }
        if bp.ignore > 0 {
            bp.ignore -= 1;
            return Ok(HitOutcome::Skip);
        }

        Ok(if bp.temporary {
            HitOutcome::StopOnce
        } else {
            HitOutcome::Stop
        })
    }
}

/// Commands run when a breakpoint stops the program.
///
/// A command resuming the program ends the list: the user is prompted only
/// if the list runs to its end.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandList {
    /// Commands, in order.
    pub commands: Vec<String>,

    /// Whether the stack entry display is suppressed.
    pub silent: bool,
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use test_log::test;

    use super::{Breakpoint, BreakpointTable, HitOutcome};

    #[test]
    fn most_recent_breakpoint_marks_line() {
        let mut table = BreakpointTable::new();
        table.insert(Breakpoint::new(1, "/src/app.py", 4));
        table.insert(Breakpoint {
            enabled: false,
            ..Breakpoint::new(2, "/src/app.py", 4)
        });
        table.insert(Breakpoint::new(3, "/src/lib.py", 4));

        let mark = table.mark_at(Path::new("/src/app.py"), 4).expect("mark");
        assert_eq!(mark.number, 2);
        assert!(!mark.enabled);

        assert_eq!(table.numbers_at(Path::new("/src/app.py"), 4), [1, 2]);
        assert_eq!(table.mark_at(Path::new("/src/app.py"), 5), None);
    }

    #[test]
    fn hits_honor_ignore_counts() {
        let mut table = BreakpointTable::new();
        table.insert(Breakpoint {
            ignore: 1,
            ..Breakpoint::new(7, "/src/app.py", 4)
        });
        table.insert(Breakpoint {
            temporary: true,
            ..Breakpoint::new(8, "/src/app.py", 9)
        });

        assert_eq!(table.hit(7).ok(), Some(HitOutcome::Skip));
        assert_eq!(table.hit(7).ok(), Some(HitOutcome::Stop));
        assert_eq!(table.get(7).map(|bp| bp.hits), Some(2));

        assert_eq!(table.hit(8).ok(), Some(HitOutcome::StopOnce));
        assert!(table.hit(9).is_err());
    }

    #[test]
    fn listing_line() {
        let bp = Breakpoint {
            condition: Some("x > 1".to_owned()),
            hits: 1,
            ..Breakpoint::new(1, "/src/app.py", 4)
        };

        assert_eq!(
            bp.to_string(),
            "1   breakpoint   keep yes at /src/app.py:4\n\tstop only if x > 1\n\tbreakpoint already hit 1 time"
        );
    }
}
