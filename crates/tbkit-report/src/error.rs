/// Error type of this crate.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The requested color scheme was never registered.
    #[error("Unrecognized color scheme: {0}")]
    UnknownScheme(String),

    /// The requested verbosity mode doesn't exist.
    #[error("Unrecognized mode: <{0}> (valid modes: Plain, Context, Verbose)")]
    UnknownMode(String),

    /// The stack frame records of a failure couldn't be obtained.
    #[error("failed to obtain stack frame records")]
    Introspection(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Result type of this crate.
pub type Result<T> = core::result::Result<T, Error>;
