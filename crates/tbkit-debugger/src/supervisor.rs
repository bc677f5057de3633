use std::io::{BufRead, StdinLock, Stdout, Write};

use tbkit_tracer::Tracer;

use crate::{DebuggerSession, Error, Result, SessionExit};

/// Driver running a traced program again and again until the user quits.
///
/// Normal completion restarts the program. An uncaught exception is
/// reported, then inspected post-mortem before the program is restarted.
/// Losing the program ends the supervision.
pub struct Supervisor<T, I = StdinLock<'static>, O = Stdout> {
    session: DebuggerSession<T, I, O>,
}

impl<T, I, O> Supervisor<T, I, O>
where
    T: Tracer,
    I: BufRead,
    O: Write,
{
    /// Creates a supervisor driving the given session.
    pub fn new(session: DebuggerSession<T, I, O>) -> Self {
        Self { session }
    }

    /// Returns the supervised session.
    pub fn session(&self) -> &DebuggerSession<T, I, O> {
        &self.session
    }

    /// Runs the program until the user quits.
    pub fn run(&mut self) -> Result<()> {
        loop {
            match self.session.run()? {
                SessionExit::Completed { exit_code: 0 } => {
                    self.session
                        .message("The program finished and will be restarted")?;
                }
                SessionExit::Completed { exit_code } => {
                    self.session
                        .message(&format!("The program exited. Exit status: {exit_code}"))?;
                }
                SessionExit::Quit => return Ok(()),
                SessionExit::Detached { .. } => {
                    self.session.message("The program can't be traced anymore")?;
                    return Ok(());
                }
                SessionExit::Restart => self.session.message("Restarting the program")?,
                SessionExit::Uncaught { exception, stack } => {
                    self.session.report(&exception, &stack)?;
                    self.session
                        .message("Uncaught exception. Entering post mortem debugging")?;
                    self.session
                        .message("Running 'cont' or 'step' will restart the program")?;

                    match self.session.post_mortem(stack) {
                        Ok(SessionExit::Quit) => return Ok(()),
                        Ok(_) => (),
                        Err(e) if e.is_recoverable() => {
                            self.session.message(&format!("*** {e}"))?;
                        }
                        Err(e) => return Err(e),
                    }

                    self.session
                        .message("Post mortem debugger finished. The program will be restarted")?;
                }
            }

            tracing::info!("restarting the program");
            self.session.tracer_mut().restart().map_err(Error::tracer)?;
        }
    }
}
