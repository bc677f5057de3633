use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Memoized, line-oriented access to source files.
///
/// Reading never fails: a file that can't be opened or read is treated as
/// empty.
#[derive(Debug, Default)]
pub struct SourceCache {
    files: HashMap<PathBuf, Arc<[String]>>,
}

impl SourceCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the lines of the given file (without line terminators).
    pub fn lines(&mut self, path: &Path) -> Arc<[String]> {
        if let Some(lines) = self.files.get(path) {
            return lines.clone();
        }

        let lines = read_lines(path);
        self.files.insert(path.to_path_buf(), lines.clone());
        lines
    }

    /// Returns the given line (1-based) of a file, if it exists.
    pub fn line(&mut self, path: &Path, lineno: usize) -> Option<String> {
        let index = lineno.checked_sub(1)?;
        self.lines(path).get(index).cloned()
    }

    /// Drops all the cached content.
    ///
    /// This must be called whenever source files may have changed since they
    /// were last read.
    pub fn invalidate(&mut self) {
        self.files.clear();
    }

    /// Returns up to `size` consecutive lines around `center` (1-based).
    ///
    /// The window is clamped to the file boundaries, never padded.
    pub fn window(&mut self, path: &Path, center: usize, size: usize) -> SourceWindow {
        let lines = self.lines(path);

        let start = center
            .saturating_sub(1)
            .saturating_sub(size / 2)
            .min(lines.len().saturating_sub(size));

        let lines = lines
            .iter()
            .enumerate()
            .skip(start)
            .take(size)
            .map(|(i, text)| SourceLine::new(i + 1, text.clone()))
            .collect();

        SourceWindow { lines }
    }

    /// Returns exactly `2 * context + 1` lines centered on `center` (1-based).
    ///
    /// Lines falling outside of the file are blank. Blank lines preceding the
    /// start of the file have a line number of `0`.
    pub fn padded_window(&mut self, path: &Path, center: usize, context: usize) -> SourceWindow {
        let lines = self.lines(path);

        let lines = (0..=context.saturating_mul(2))
            .map(|offset| {
                // lines before the start of the file are blank
                let lineno = center
                    .saturating_add(offset)
                    .checked_sub(context)
                    .filter(|&lineno| lineno > 0);

                match lineno {
                    Some(lineno) => {
                        let text = lines.get(lineno - 1).cloned().unwrap_or_default();
                        SourceLine::new(lineno, text)
                    }
                    None => SourceLine::new(0, String::new()),
                }
            })
            .collect();

        SourceWindow { lines }
    }
}

fn read_lines(path: &Path) -> Arc<[String]> {
    match std::fs::read(path) {
        Ok(content) => String::from_utf8_lossy(&content)
            .lines()
            .map(str::to_owned)
            .collect::<Vec<_>>()
            .into(),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "source unavailable");
            Arc::from(Vec::new())
        }
    }
}

/// One line of a [SourceWindow].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceLine {
    /// Line number (1-based), or `0` for padding before the file start.
    pub lineno: usize,

    /// Raw text of the line, without its terminator.
    pub text: String,
}

impl SourceLine {
    /// Creates a new source line.
    pub fn new(lineno: usize, text: impl Into<String>) -> Self {
        Self {
            lineno,
            text: text.into(),
        }
    }
}

/// Bounded, ordered slice of source lines.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceWindow {
    lines: Vec<SourceLine>,
}

impl SourceWindow {
    /// Returns the lines of this window.
    pub fn lines(&self) -> &[SourceLine] {
        &self.lines
    }

    /// Returns the number of lines in this window.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns whether this window holds no line.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Returns whether the given line number is part of this window.
    pub fn contains(&self, lineno: usize) -> bool {
        lineno > 0 && self.lines.iter().any(|line| line.lineno == lineno)
    }
}

impl<'a> IntoIterator for &'a SourceWindow {
    type Item = &'a SourceLine;
    type IntoIter = std::slice::Iter<'a, SourceLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}
