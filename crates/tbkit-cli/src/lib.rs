//! Crate implementing the CLI commands.

mod capture;
mod cli;
mod config;
mod run;

pub use self::capture::{
    BindingNode, CaptureDocument, CaptureError, ExceptionNode, FrameNode, SyntaxErrorNode,
};
pub use self::cli::{CliAction, CliOpts};
pub use self::config::ReportConfig;
pub use self::run::{evaluate_post_mortem, evaluate_render, load_capture};
