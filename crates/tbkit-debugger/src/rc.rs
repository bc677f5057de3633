//! Run-commands files, whose lines are executed as commands before the
//! first prompt of a session.

use std::path::{Path, PathBuf};

/// Name of the run-commands files.
pub const RC_FILE_NAME: &str = ".tbkitrc";

/// Reads the per-user (`$HOME/.tbkitrc`) then the per-directory
/// (`./.tbkitrc`) run-commands files.
///
/// Missing or unreadable files are treated as empty.
pub fn load() -> Vec<String> {
    let home = std::env::var_os("HOME").map(|home| PathBuf::from(home).join(RC_FILE_NAME));

    home.into_iter()
        .chain(std::iter::once(PathBuf::from(RC_FILE_NAME)))
        .flat_map(|path| read(&path))
        .collect()
}

/// Reads the command lines of a run-commands file.
pub fn read(path: &Path) -> Vec<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let lines = parse(&content);
            tracing::debug!(path = %path.display(), lines = lines.len(), "run-commands file read");
            lines
        }
        Err(e) => {
            tracing::trace!(path = %path.display(), error = %e, "no run-commands file");
            Vec::new()
        }
    }
}

/// Extracts the command lines of run-commands content, skipping blank lines
/// and comments.
pub fn parse(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_owned)
        .collect()
}
