use std::io::{BufRead, StdinLock, Stdout, Write};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tbkit_report::frame::{FrameSnapshot, StackEntry};
use tbkit_report::names::extract_names;
use tbkit_report::render::{
    ArgStyle, CapturedException, TracebackRenderer, format_call, format_line, format_link,
};
use tbkit_report::value::{UNDEFINED, shorten};
use tbkit_tracer::{DebugEvent, ResumeMode, Tracer};

use crate::breakpoint::{Breakpoint, BreakpointTable, CommandList, HitOutcome};
use crate::command::{CommandKind, CommandTable, Flow, split_command};
use crate::{Error, Result};

/// Prompt shown by default when reading commands.
pub const DEFAULT_PROMPT: &str = "ipdb> ";

/// Prompt shown while recording a command list.
const COMMANDS_PROMPT: &str = "(com) ";

/// Maximum length of the return values shown in stack entries.
const RETURN_VALUE_WIDTH: usize = 30;

/// Source lines shown around the current line of a stack entry.
const ENTRY_CONTEXT: usize = 3;

/// Source lines shown around the current line of each `where` entry.
const WHERE_CONTEXT: usize = 5;

/// State of a [DebuggerSession].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// The program is executing.
    Running,

    /// The program hit the breakpoint with the given number.
    StoppedAtBreakpoint(u32),

    /// The program completed a step.
    StoppedAtStep,

    /// The session inspects the stack of an already completed failure.
    PostMortem,

    /// The user records the command list of the given breakpoint.
    DefiningCommandList(u32),

    /// The session ended.
    Terminated,
}

/// How a session ended.
#[derive(Debug)]
pub enum SessionExit {
    /// The program ran to completion.
    Completed {
        /// Exit code of the program.
        exit_code: i32,
    },

    /// The user quit.
    Quit,

    /// The user asked for the program to be restarted.
    Restart,

    /// The tracer lost the program.
    Detached {
        /// Why the program can't be traced anymore.
        reason: String,
    },

    /// An exception escaped the program.
    Uncaught {
        /// The uncaught exception.
        exception: CapturedException,

        /// Stack of the program, outermost caller first.
        stack: Vec<StackEntry>,
    },
}

/// Interactive command loop over the stack of a stopped (or failed)
/// program.
///
/// The session owns a [Tracer] to drive the program and a
/// [TracebackRenderer] giving access to colors and sources. Commands are
/// read from `I` and the transcript is written to `O`.
pub struct DebuggerSession<T, I = StdinLock<'static>, O = Stdout> {
    tracer: T,
    renderer: TracebackRenderer,
    input: I,
    output: O,
    prompt: String,
    commands: CommandTable,
    breakpoints: BreakpointTable,
    command_lists: IndexMap<u32, CommandList>,
    rc_lines: Vec<String>,
    stack: Vec<FrameSnapshot>,
    current: usize,
    state: SessionState,
    stop_state: SessionState,
    last_command: Option<String>,
    list_cursor: Option<usize>,
}

impl<T: Tracer> DebuggerSession<T> {
    /// Creates a session reading commands from the standard input stream
    /// and writing to the standard output stream.
    pub fn new(tracer: T, renderer: TracebackRenderer) -> Self {
        Self::with_io(tracer, renderer, std::io::stdin().lock(), std::io::stdout())
    }
}

impl<T, I, O> DebuggerSession<T, I, O>
where
    T: Tracer,
    I: BufRead,
    O: Write,
{
    /// Creates a session over the given streams.
    pub fn with_io(tracer: T, renderer: TracebackRenderer, input: I, output: O) -> Self {
        Self {
            tracer,
            renderer,
            input,
            output,
            prompt: DEFAULT_PROMPT.to_owned(),
            commands: CommandTable::new(),
            breakpoints: BreakpointTable::new(),
            command_lists: IndexMap::new(),
            rc_lines: Vec::new(),
            stack: Vec::new(),
            current: 0,
            state: SessionState::Terminated,
            stop_state: SessionState::Terminated,
            last_command: None,
            list_cursor: None,
        }
    }

    /// Sets the prompt shown when reading commands.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Sets the commands run before the first prompt of the session.
    pub fn with_rc_lines(mut self, lines: Vec<String>) -> Self {
        self.rc_lines = lines;
        self
    }

    /// Returns the state of the session.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns the stack being inspected, outermost caller first.
    pub fn stack(&self) -> &[FrameSnapshot] {
        &self.stack
    }

    /// Returns the index of the current frame within the stack.
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Returns the breakpoints of the session.
    pub fn breakpoints(&self) -> &BreakpointTable {
        &self.breakpoints
    }

    /// Returns the command list of the given breakpoint.
    pub fn command_list(&self, number: u32) -> Option<&CommandList> {
        self.command_lists.get(&number)
    }

    /// Returns the tracer.
    pub fn tracer(&self) -> &T {
        &self.tracer
    }

    /// Returns the tracer, mutably.
    pub fn tracer_mut(&mut self) -> &mut T {
        &mut self.tracer
    }

    /// Returns the renderer.
    pub fn renderer_mut(&mut self) -> &mut TracebackRenderer {
        &mut self.renderer
    }

    /// Returns the transcript sink.
    pub fn output(&self) -> &O {
        &self.output
    }

    /// Returns the command names (and aliases) starting with `prefix`.
    pub fn complete(&self, prefix: &str) -> Vec<&'static str> {
        self.commands.completions(prefix)
    }

    /// Writes a line to the transcript.
    pub fn message(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{text}")?;
        Ok(())
    }

    /// Writes the report of a failure to the transcript.
    pub fn report(&mut self, exception: &CapturedException, stack: &[StackEntry]) -> Result<()> {
        self.renderer
            .write_report(&mut self.output, exception, stack)?;
        Ok(())
    }

    /// Drives the traced program until it ends, prompting the user every
    /// time it stops.
    pub fn run(&mut self) -> Result<SessionExit> {
        let _span = tracing::info_span!("session").entered();
        self.reset();

        loop {
            self.set_state(SessionState::Running);

            let event = match self.tracer.wait_event() {
                Ok(event) => event,
                Err(e) => {
                    let reason = Error::tracer(e).to_string();
                    tracing::warn!(%reason, "program lost");

                    writeln!(self.output, "*** {reason}")?;
                    self.set_state(SessionState::Terminated);
                    return Ok(SessionExit::Detached { reason });
                }
            };

            let flow = match event {
                DebugEvent::Breakpoint { number, stack } => {
                    let commands = self.command_lists.get(&number).cloned();

                    match self.breakpoints.hit(number) {
                        Ok(HitOutcome::Skip) => {
                            tracing::debug!(number, "breakpoint skipped");

                            // stop there if the program can't go on
                            match self.tracer.resume(ResumeMode::Continue) {
                                Ok(()) => continue,
                                Err(e) => writeln!(self.output, "*** {}", Error::tracer(e))?,
                            }
                        }
                        Ok(HitOutcome::StopOnce) => match self.clear_breakpoint(number) {
                            Ok(()) => (),
                            Err(e) if e.is_recoverable() => writeln!(self.output, "*** {e}")?,
                            Err(e) => return Err(e),
                        },
                        Ok(HitOutcome::Stop) => (),
                        Err(e) => tracing::warn!(number, error = %e, "unknown breakpoint hit"),
                    }

                    self.stop_at(stack, SessionState::StoppedAtBreakpoint(number))?;

                    match commands {
                        Some(commands) => self.run_command_list(&commands)?,
                        None => self.interaction()?,
                    }
                }
                DebugEvent::Step { stack } => {
                    self.stop_at(stack, SessionState::StoppedAtStep)?;
                    self.interaction()?
                }
                DebugEvent::Exception { exception, stack } => {
                    tracing::info!(exception = %exception.kind, "uncaught exception");
                    self.set_state(SessionState::Terminated);
                    return Ok(SessionExit::Uncaught { exception, stack });
                }
                DebugEvent::Exited { exit_code } => {
                    tracing::info!(exit_code, "program exited");
                    self.set_state(SessionState::Terminated);
                    return Ok(SessionExit::Completed { exit_code });
                }
            };

            match flow {
                Flow::Stay | Flow::Resume(_) => (),
                Flow::Restart => {
                    self.set_state(SessionState::Terminated);
                    return Ok(SessionExit::Restart);
                }
                Flow::Quit => {
                    self.set_state(SessionState::Terminated);
                    return Ok(SessionExit::Quit);
                }
            }
        }
    }

    /// Inspects the stack of an already completed failure.
    ///
    /// Resuming commands end the session with [SessionExit::Restart].
    pub fn post_mortem(&mut self, stack: Vec<StackEntry>) -> Result<SessionExit> {
        let _span = tracing::info_span!("post_mortem", frames = stack.len()).entered();
        self.reset();

        self.stop_at(stack, SessionState::PostMortem)?;
        let flow = self.interaction()?;

        self.set_state(SessionState::Terminated);

        Ok(match flow {
            Flow::Quit => SessionExit::Quit,
            _ => SessionExit::Restart,
        })
    }

    /// Runs one command line.
    ///
    /// An empty line repeats the last command. Command failures are shown in
    /// the transcript; only transcript I/O failures are returned.
    pub fn onecmd(&mut self, line: &str) -> Result<Flow> {
        if let SessionState::DefiningCommandList(number) = self.state {
            return self.record_command(number, line);
        }

        let line = match (line.trim(), &self.last_command) {
            ("", Some(last)) => last.clone(),
            ("", None) => return Ok(Flow::Stay),
            (line, _) => line.to_owned(),
        };
        self.last_command = Some(line.clone());

        let (name, arg) = split_command(&line);

        let Some(def) = self.commands.lookup(name) else {
            writeln!(self.output, "*** Unknown syntax: {line}")?;
            return Ok(Flow::Stay);
        };

        tracing::debug!(command = def.name, arg, "command");

        match self.dispatch(def.kind, arg) {
            Err(e) if e.is_recoverable() => {
                writeln!(self.output, "*** {e}")?;
                Ok(Flow::Stay)
            }
            result => result,
        }
    }

    fn dispatch(&mut self, kind: CommandKind, arg: &str) -> Result<Flow> {
        match kind {
            CommandKind::Help => self.do_help(arg),
            CommandKind::Where => self.do_where(),
            CommandKind::Up => self.do_up(),
            CommandKind::Down => self.do_down(),
            CommandKind::List => self.do_list(arg),
            CommandKind::Break => self.do_break(arg, false),
            CommandKind::TBreak => self.do_break(arg, true),
            CommandKind::Clear => self.do_clear(arg),
            CommandKind::Enable => self.do_enable(arg, true),
            CommandKind::Disable => self.do_enable(arg, false),
            CommandKind::Condition => self.do_condition(arg),
            CommandKind::Ignore => self.do_ignore(arg),
            CommandKind::Commands => self.do_commands(arg),
            CommandKind::Continue => self.do_resume(ResumeMode::Continue),
            CommandKind::Step => self.do_resume(ResumeMode::Step),
            CommandKind::Next => self.do_resume(ResumeMode::Next),
            CommandKind::Restart => Ok(Flow::Restart),
            CommandKind::Quit => Ok(Flow::Quit),
            CommandKind::Print => self.do_print(arg),
            CommandKind::Args => self.do_args(),
            CommandKind::Retval => self.do_retval(),
        }
    }

    fn set_state(&mut self, state: SessionState) {
        if self.state != state {
            tracing::debug!(from = ?self.state, to = ?state, "session state");
            self.state = state;
        }
    }

    fn reset(&mut self) {
        self.stack.clear();
        self.current = 0;
        self.list_cursor = None;
    }

    fn stop_at(&mut self, stack: Vec<StackEntry>, state: SessionState) -> Result<()> {
        if stack.is_empty() {
            return Err(Error::NoStack);
        }

        self.stack = FrameSnapshot::from_entries(stack);
        self.current = self.stack.len() - 1;
        self.list_cursor = None;
        self.renderer.context_mut().sources_mut().invalidate();

        self.set_state(state);
        Ok(())
    }

    fn interaction(&mut self) -> Result<Flow> {
        for line in std::mem::take(&mut self.rc_lines) {
            let flow = self.onecmd(&line)?;
            if flow != Flow::Stay {
                return Ok(flow);
            }
        }

        self.print_stack_entry(self.current, ENTRY_CONTEXT)?;
        self.cmdloop()
    }

    fn run_command_list(&mut self, commands: &CommandList) -> Result<Flow> {
        let last_command = self.last_command.clone();

        let mut flow = Flow::Stay;
        for line in &commands.commands {
            flow = self.onecmd(line)?;
            if flow != Flow::Stay {
                break;
            }
        }

        self.last_command = last_command;

        if !commands.silent {
            self.print_stack_entry(self.current, ENTRY_CONTEXT)?;
        }

        match flow {
            Flow::Stay => self.cmdloop(),
            flow => Ok(flow),
        }
    }

    fn cmdloop(&mut self) -> Result<Flow> {
        loop {
            let prompt = match self.state {
                SessionState::DefiningCommandList(_) => COMMANDS_PROMPT,
                _ => self.prompt.as_str(),
            };
            write!(self.output, "{prompt}")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                tracing::debug!("end of input");
                writeln!(self.output)?;
                return Ok(Flow::Quit);
            }

            let flow = self.onecmd(line.trim_end_matches(['\r', '\n']))?;
            if flow != Flow::Stay {
                return Ok(flow);
            }
        }
    }

    fn record_command(&mut self, number: u32, line: &str) -> Result<Flow> {
        let line = line.trim();
        let (name, _) = split_command(line);
        let kind = self.commands.lookup(name).map(|def| def.kind);

        let list = self.command_lists.entry(number).or_default();

        match name {
            "" => (),
            "silent" => list.silent = true,
            "end" => self.state = self.stop_state,
            _ => {
                list.commands.push(line.to_owned());

                if kind.is_some_and(CommandKind::is_resuming) {
                    self.state = self.stop_state;
                }
            }
        }

        Ok(Flow::Stay)
    }

    fn frame(&self) -> Result<&FrameSnapshot> {
        self.stack.get(self.current).ok_or(Error::NoStack)
    }

    fn print_stack_entry(&mut self, index: usize, context: usize) -> Result<()> {
        let prefix = if index == self.current { "> " } else { "  " };
        let entry = self.format_stack_entry(index, context)?;

        write!(self.output, "{prefix}{entry}")?;
        Ok(())
    }

    /// Formats one entry of the stack: its return value (if any), its
    /// location and call line, and a window of `context` source lines with
    /// the breakpoint gutter.
    pub fn format_stack_entry(&mut self, index: usize, context: usize) -> Result<String> {
        let frame = self.stack.get(index).ok_or(Error::NoStack)?;
        let colors = self.renderer.context().colors().active();
        let sources = self.renderer.context_mut().sources_mut();

        let mut out = String::new();

        if let Some(value) = frame.return_value() {
            out.push_str(&shorten(value, RETURN_VALUE_WIDTH));
            out.push('\n');
        }

        out.push_str(&format!(
            "{} {}\n",
            format_link(&colors, frame.file()),
            format_call(&colors, frame, ArgStyle::Names)
        ));

        let window = frame.window(sources, context);
        for line in &window {
            let mark = self.breakpoints.mark_at(frame.file(), line.lineno);
            out.push_str(&format_line(
                &colors,
                line.lineno,
                &line.text,
                line.lineno == frame.line(),
                mark,
            ));
        }

        Ok(out)
    }

    fn do_help(&mut self, arg: &str) -> Result<Flow> {
        if !arg.is_empty() {
            match self.commands.lookup(arg) {
                Some(def) => writeln!(self.output, "{}", def.help)?,
                None => writeln!(self.output, "*** No help on {arg}")?,
            }
            return Ok(Flow::Stay);
        }

        let names: Vec<_> = self.commands.names().collect();

        writeln!(self.output)?;
        writeln!(self.output, "Documented commands (type help <topic>):")?;
        writeln!(self.output, "{}", "=".repeat(40))?;
        for row in names.chunks(8) {
            let row: String = row.iter().map(|name| format!("{name:<10}")).collect();
            writeln!(self.output, "{}", row.trim_end())?;
        }
        writeln!(self.output)?;

        Ok(Flow::Stay)
    }

    fn do_where(&mut self) -> Result<Flow> {
        self.frame()?;

        for index in 0..=self.current {
            self.print_stack_entry(index, WHERE_CONTEXT)?;
        }
        Ok(Flow::Stay)
    }

    fn do_up(&mut self) -> Result<Flow> {
        self.frame()?;

        if self.current == 0 {
            return Err(Error::Boundary("Oldest frame"));
        }
        self.select_frame(self.current - 1)
    }

    fn do_down(&mut self) -> Result<Flow> {
        self.frame()?;

        if self.current + 1 >= self.stack.len() {
            return Err(Error::Boundary("Newest frame"));
        }
        self.select_frame(self.current + 1)
    }

    fn select_frame(&mut self, index: usize) -> Result<Flow> {
        self.current = index;
        self.list_cursor = None;

        self.print_stack_entry(index, ENTRY_CONTEXT)?;
        Ok(Flow::Stay)
    }

    fn do_list(&mut self, arg: &str) -> Result<Flow> {
        self.last_command = Some("list".to_owned());

        let (file, current_line) = {
            let frame = self.frame()?;
            (frame.file().to_path_buf(), frame.line())
        };

        let Some((first, last)) = list_range(arg, current_line, self.list_cursor) else {
            writeln!(self.output, "*** Error in argument: '{arg}'")?;
            return Ok(Flow::Stay);
        };

        let colors = self.renderer.context().colors().active();
        let sources = self.renderer.context_mut().sources_mut();

        let mut out = String::new();
        for lineno in first..=last {
            let Some(text) = sources.line(&file, lineno) else {
                break;
            };

            let mark = self.breakpoints.mark_at(&file, lineno);
            out.push_str(&format_line(
                &colors,
                lineno,
                &text,
                lineno == current_line,
                mark,
            ));
            self.list_cursor = Some(lineno);
        }

        write!(self.output, "{out}")?;
        Ok(Flow::Stay)
    }

    fn do_break(&mut self, arg: &str, temporary: bool) -> Result<Flow> {
        if arg.is_empty() {
            if !self.breakpoints.is_empty() {
                writeln!(self.output, "Num Type         Disp Enb   Where")?;
                for bp in self.breakpoints.iter() {
                    writeln!(self.output, "{bp}")?;
                }
            }
            return Ok(Flow::Stay);
        }

        let (location, condition) = match arg.split_once(',') {
            Some((location, condition)) => (location.trim(), Some(condition.trim())),
            None => (arg, None),
        };
        let condition = condition.filter(|c| !c.is_empty());

        let (file, lineno) = match location.rsplit_once(':') {
            Some((file, lineno)) => (absolute(file), lineno),
            None => (self.frame()?.file().to_path_buf(), location),
        };
        let line = parse_lineno(lineno)?;

        if self
            .renderer
            .context_mut()
            .sources_mut()
            .line(&file, line)
            .is_none()
        {
            return Err(Error::InvalidArgument(format!(
                "End of file: {}:{line}",
                file.display()
            )));
        }

        let number = self
            .tracer
            .set_break(&file, line, condition)
            .map_err(Error::tracer)?;

        let bp = Breakpoint {
            condition: condition.map(str::to_owned),
            temporary,
            ..Breakpoint::new(number, file, line)
        };

        let kind = if temporary {
            "Temporary breakpoint"
        } else {
            "Breakpoint"
        };
        writeln!(self.output, "{kind} {number} at {}:{line}", bp.file.display())?;

        self.breakpoints.insert(bp);
        Ok(Flow::Stay)
    }

    fn do_clear(&mut self, arg: &str) -> Result<Flow> {
        let numbers = if arg.is_empty() {
            self.breakpoints.iter().map(|bp| bp.number).collect()
        } else if let Some((file, lineno)) = arg.rsplit_once(':') {
            let file = absolute(file);
            let line = parse_lineno(lineno)?;

            let numbers = self.breakpoints.numbers_at(&file, line);
            if numbers.is_empty() {
                return Err(Error::InvalidArgument(format!(
                    "There is no breakpoint at {}:{line}",
                    file.display()
                )));
            }
            numbers
        } else {
            parse_numbers(arg)?
        };

        for number in numbers {
            self.clear_breakpoint(number)?;
        }
        Ok(Flow::Stay)
    }

    fn clear_breakpoint(&mut self, number: u32) -> Result<()> {
        if self.breakpoints.get(number).is_none() {
            return Err(Error::NoSuchBreakpoint(number));
        }

        self.tracer.clear_break(number).map_err(Error::tracer)?;

        let bp = self.breakpoints.remove(number)?;
        self.command_lists.shift_remove(&number);

        writeln!(
            self.output,
            "Deleted breakpoint {number} at {}:{}",
            bp.file.display(),
            bp.line
        )?;
        Ok(())
    }

    fn do_enable(&mut self, arg: &str, enabled: bool) -> Result<Flow> {
        let verb = if enabled { "Enabled" } else { "Disabled" };

        for number in parse_numbers(arg)? {
            let bp = self.breakpoints.get_mut(number)?;
            bp.enabled = enabled;

            writeln!(
                self.output,
                "{verb} breakpoint {number} at {}:{}",
                bp.file.display(),
                bp.line
            )?;
        }
        Ok(Flow::Stay)
    }

    fn do_condition(&mut self, arg: &str) -> Result<Flow> {
        let (number, condition) = split_command(arg);
        let number = parse_number(number)?;
        let condition = Some(condition).filter(|c| !c.is_empty());

        if self.breakpoints.get(number).is_none() {
            return Err(Error::NoSuchBreakpoint(number));
        }

        self.tracer
            .set_condition(number, condition)
            .map_err(Error::tracer)?;
        self.breakpoints.get_mut(number)?.condition = condition.map(str::to_owned);

        match condition {
            Some(_) => writeln!(self.output, "New condition set for breakpoint {number}.")?,
            None => writeln!(self.output, "Breakpoint {number} is now unconditional.")?,
        }
        Ok(Flow::Stay)
    }

    fn do_ignore(&mut self, arg: &str) -> Result<Flow> {
        let (number, count) = split_command(arg);
        let number = parse_number(number)?;

        let count = match count {
            "" => 0,
            count => count.parse().map_err(|_| {
                Error::InvalidArgument(format!("Invalid ignore count ({count})"))
            })?,
        };

        self.breakpoints.get_mut(number)?.ignore = count;

        match count {
            0 => writeln!(
                self.output,
                "Will stop next time breakpoint {number} is reached."
            )?,
            1 => writeln!(
                self.output,
                "Will ignore next crossing of breakpoint {number}."
            )?,
            count => writeln!(
                self.output,
                "Will ignore next {count} crossings of breakpoint {number}."
            )?,
        }
        Ok(Flow::Stay)
    }

    fn do_commands(&mut self, arg: &str) -> Result<Flow> {
        let number = match arg {
            "" => self
                .breakpoints
                .last()
                .map(|bp| bp.number)
                .ok_or_else(|| Error::InvalidArgument("No breakpoint is set".to_owned()))?,
            arg => parse_number(arg)?,
        };

        if self.breakpoints.get(number).is_none() {
            return Err(Error::NoSuchBreakpoint(number));
        }

        self.command_lists.insert(number, CommandList::default());

        self.stop_state = self.state;
        self.set_state(SessionState::DefiningCommandList(number));
        Ok(Flow::Stay)
    }

    fn do_resume(&mut self, mode: ResumeMode) -> Result<Flow> {
        if self.state == SessionState::PostMortem {
            return Ok(Flow::Restart);
        }

        self.tracer.resume(mode).map_err(Error::tracer)?;

        self.set_state(SessionState::Running);
        Ok(Flow::Resume(mode))
    }

    fn do_print(&mut self, arg: &str) -> Result<Flow> {
        if extract_names(arg) != [arg] {
            return Err(Error::InvalidArgument(format!("Invalid name: '{arg}'")));
        }

        let value = self.frame()?.resolve(arg).value;

        match value {
            Ok(value) => writeln!(self.output, "{value}")?,
            Err(e) => writeln!(self.output, "*** {e}")?,
        }
        Ok(Flow::Stay)
    }

    fn do_args(&mut self) -> Result<Flow> {
        let frame = self.frame()?;

        let lines: Vec<_> = frame
            .args()
            .iter()
            .map(String::as_str)
            .chain(frame.varargs())
            .chain(frame.varkw())
            .map(|name| {
                let value = frame
                    .locals()
                    .eval(name)
                    .unwrap_or_else(|_| UNDEFINED.to_owned());
                format!("{name} = {value}")
            })
            .collect();

        for line in lines {
            writeln!(self.output, "{line}")?;
        }
        Ok(Flow::Stay)
    }

    fn do_retval(&mut self) -> Result<Flow> {
        let value = self
            .frame()?
            .return_value()
            .map(str::to_owned)
            .ok_or_else(|| Error::InvalidArgument("Not yet returned!".to_owned()))?;

        writeln!(self.output, "{value}")?;
        Ok(Flow::Stay)
    }
}

/// Computes the range of lines shown by `list`.
///
/// Without argument, the listing continues after the last listed line (or
/// starts around the current line). A single number centers the listing on
/// it. A `first,last` pair is taken as is, unless `last` is smaller than
/// `first`, in which case it is a line count.
fn list_range(arg: &str, current: usize, cursor: Option<usize>) -> Option<(usize, usize)> {
    let arg = arg.trim();

    let first = if arg.is_empty() {
        match cursor {
            Some(last) => last.checked_add(1)?,
            None => current.saturating_sub(5).max(1),
        }
    } else if let Some((first, last)) = arg.split_once(',') {
        let first: usize = first.trim().parse().ok()?;
        let last: usize = last.trim().parse().ok()?;

        let last = if last < first {
            first.checked_add(last)?
        } else {
            last
        };
        return Some((first, last));
    } else {
        let center: i64 = arg.parse().ok()?;
        usize::try_from(center.saturating_sub(5)).unwrap_or(0).max(1)
    };

    Some((first, first.checked_add(10)?))
}

fn parse_number(arg: &str) -> Result<u32> {
    arg.parse()
        .map_err(|_| Error::InvalidArgument(format!("Non-numeric breakpoint number ({arg})")))
}

fn parse_numbers(arg: &str) -> Result<Vec<u32>> {
    if arg.is_empty() {
        return Err(Error::InvalidArgument(
            "Breakpoint number expected".to_owned(),
        ));
    }
    arg.split_whitespace().map(parse_number).collect()
}

fn parse_lineno(arg: &str) -> Result<usize> {
    match arg.trim().parse() {
        Ok(line) if line > 0 => Ok(line),
        _ => Err(Error::InvalidArgument(format!("Bad lineno: {}", arg.trim()))),
    }
}

fn absolute(file: &str) -> PathBuf {
    let file = Path::new(file.trim());
    std::path::absolute(file).unwrap_or_else(|_| file.to_path_buf())
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::list_range;

    #[test]
    fn list_starts_around_current_line() {
        assert_eq!(list_range("", 12, None), Some((7, 17)));
        assert_eq!(list_range("", 3, None), Some((1, 11)));
        assert_eq!(list_range("", 12, Some(17)), Some((18, 28)));
    }

    #[test]
    fn list_explicit_ranges() {
        assert_eq!(list_range("40", 12, Some(17)), Some((35, 45)));
        assert_eq!(list_range("-3", 12, None), Some((1, 11)));
        assert_eq!(list_range("3, 9", 12, None), Some((3, 9)));
        assert_eq!(list_range("10,3", 12, None), Some((10, 13)));
    }

    #[test]
    fn list_malformed_arguments() {
        assert_eq!(list_range("x", 12, None), None);
        assert_eq!(list_range("3,", 12, None), None);
        assert_eq!(list_range("1,2,3", 12, None), None);
    }

    #[test]
    fn list_out_of_range_numbers() {
        assert_eq!(list_range("18446744073709551615,1", 12, None), None);
        assert_eq!(list_range("", 12, Some(usize::MAX)), None);
        assert_eq!(list_range(&usize::MAX.to_string(), 12, None), None);
    }
}
