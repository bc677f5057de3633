use std::path::PathBuf;

use tbkit_report::render::RenderMode;

/// The tbkit traceback reporter and post-mortem debugger.
#[derive(clap::Parser)]
pub struct CliOpts {
    /// The command to run.
    #[clap(subcommand)]
    pub action: CliAction,
}

/// The command to run.
#[derive(clap::Subcommand)]
pub enum CliAction {
    /// Command to print the report of a captured failure.
    Render {
        /// Report configuration (KDL format).
        ///
        /// If it ends with `.kdl`, it is treated as a path to a configuration
        /// file. Otherwise it is directly parsed as inline KDL-formatted
        /// configuration.
        #[clap(short, long, value_name = "CONTENT/PATH")]
        config: Option<String>,

        /// Report mode (Plain, Context or Verbose), overriding the
        /// configured one.
        #[clap(short, long, value_name = "MODE")]
        mode: Option<RenderMode>,

        /// Color scheme, overriding the configured one.
        #[clap(long, value_name = "SCHEME")]
        colors: Option<String>,

        /// Path to the capture (KDL format) of the failure.
        capture: PathBuf,
    },

    /// Command to print the report of a captured failure, then inspect its
    /// call-stack interactively.
    PostMortem {
        /// Report and debugger configuration (KDL format).
        ///
        /// If it ends with `.kdl`, it is treated as a path to a configuration
        /// file. Otherwise it is directly parsed as inline KDL-formatted
        /// configuration.
        #[clap(short, long, value_name = "CONTENT/PATH")]
        config: Option<String>,

        /// Color scheme, overriding the configured one.
        #[clap(long, value_name = "SCHEME")]
        colors: Option<String>,

        /// Path to the capture (KDL format) of the failure.
        capture: PathBuf,
    },
}

impl CliOpts {
    /// Parses the command line arguments of the process.
    pub fn parse_from_cmdline() -> Self {
        <Self as clap::Parser>::parse()
    }
}
