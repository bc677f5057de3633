#![allow(missing_docs)]
#![allow(clippy::print_stderr)]

use tbkit_cli::{CliAction, CliOpts};

use tracing_subscriber::EnvFilter;

fn main() {
    let cli = CliOpts::parse_from_cmdline();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::builder()
                .with_env_var("TBKIT_LOG")
                .from_env_lossy(),
        )
        .init();

    let res = match cli.action {
        CliAction::Render {
            config,
            mode,
            colors,
            capture,
        } => tbkit_cli::evaluate_render(config, mode, colors, capture).map(|_| None),
        CliAction::PostMortem {
            config,
            colors,
            capture,
        } => tbkit_cli::evaluate_post_mortem(config, colors, capture).map(Some),
    };

    match res {
        Ok(Some(exit_code)) => std::process::exit(exit_code),
        Ok(None) => (),
        Err(e) => {
            eprintln!("{e:?}");
            std::process::exit(1);
        }
    }
}
