/// Error of a tracer backend.
#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub struct BackendError<E>(pub E);

/// Error type of this crate.
#[derive(thiserror::Error, Debug)]
pub enum Error<E> {
    /// The tracer backend failed.
    #[error(transparent)]
    Backend(#[from] BackendError<E>),

    /// The tracer isn't attached to any running program.
    #[error("No program is being traced")]
    Detached,

    /// The given breakpoint number was never handed out by this tracer.
    #[error("No breakpoint numbered {0}")]
    UnknownBreakpoint(u32),
}

/// Result type of this crate.
pub type Result<T, E> = core::result::Result<T, Error<E>>;
