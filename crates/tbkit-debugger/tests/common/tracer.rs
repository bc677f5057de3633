use std::collections::VecDeque;
use std::path::Path;

use tbkit_tracer::{BackendError, DebugEvent, Error, ResumeMode, Tracer};

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ScriptError(pub String);

/// Tracer replaying scripted events, one run after the other.
#[derive(Default)]
pub struct ScriptedTracer {
    events: VecDeque<DebugEvent>,
    runs: VecDeque<Vec<DebugEvent>>,
    next_number: u32,
    working_resumes: Option<usize>,
    pub resumes: Vec<ResumeMode>,
    pub cleared: Vec<u32>,
    pub restarts: usize,
}

impl ScriptedTracer {
    pub fn new(events: impl IntoIterator<Item = DebugEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Adds the events of the run following a restart.
    pub fn then_run(mut self, events: impl IntoIterator<Item = DebugEvent>) -> Self {
        self.runs.push_back(events.into_iter().collect());
        self
    }

    /// Makes every resume fail.
    pub fn broken(self) -> Self {
        self.broken_after(0)
    }

    /// Makes every resume fail once `count` resumes succeeded.
    pub fn broken_after(mut self, count: usize) -> Self {
        self.working_resumes = Some(count);
        self
    }
}

impl Tracer for ScriptedTracer {
    type Error = ScriptError;

    fn set_break(
        &mut self,
        _file: &Path,
        _line: usize,
        _condition: Option<&str>,
    ) -> tbkit_tracer::Result<u32, Self::Error> {
        self.next_number += 1;
        Ok(self.next_number)
    }

    fn clear_break(&mut self, number: u32) -> tbkit_tracer::Result<(), Self::Error> {
        self.cleared.push(number);
        Ok(())
    }

    fn set_condition(
        &mut self,
        _number: u32,
        _condition: Option<&str>,
    ) -> tbkit_tracer::Result<(), Self::Error> {
        Ok(())
    }

    fn resume(&mut self, mode: ResumeMode) -> tbkit_tracer::Result<(), Self::Error> {
        if self
            .working_resumes
            .is_some_and(|count| self.resumes.len() >= count)
        {
            return Err(BackendError(ScriptError("target is gone".to_owned())).into());
        }

        self.resumes.push(mode);
        Ok(())
    }

    fn wait_event(&mut self) -> tbkit_tracer::Result<DebugEvent, Self::Error> {
        self.events.pop_front().ok_or(Error::Detached)
    }

    fn restart(&mut self) -> tbkit_tracer::Result<(), Self::Error> {
        let events = self.runs.pop_front().ok_or(Error::Detached)?;

        self.events = events.into();
        self.restarts += 1;
        Ok(())
    }
}
