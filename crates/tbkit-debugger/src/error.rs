/// Error type of this crate.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Stack navigation went past the oldest or newest frame.
    #[error("{0}")]
    Boundary(&'static str),

    /// A command was given a malformed argument.
    #[error("{0}")]
    InvalidArgument(String),

    /// No breakpoint has the given number.
    #[error("No breakpoint numbered {0}")]
    NoSuchBreakpoint(u32),

    /// The tracer failed.
    #[error("{0}")]
    Tracer(String),

    /// Reading commands or writing the transcript failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The session has no stack to inspect.
    #[error("No stack to inspect")]
    NoStack,
}

impl Error {
    pub(crate) fn tracer<E: std::fmt::Display>(e: tbkit_tracer::Error<E>) -> Self {
        Self::Tracer(e.to_string())
    }

    /// Returns whether the command loop can go on after this error.
    ///
    /// Only transcript I/O failures end a session.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Io(_))
    }
}

/// Result type of this crate.
pub type Result<T> = core::result::Result<T, Error>;
