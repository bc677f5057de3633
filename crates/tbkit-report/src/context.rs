use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::colors::ColorSchemeTable;
use crate::source::SourceCache;

/// Shared flag allowing the user to interrupt value resolution.
///
/// Triggering it while a report is rendered aborts the value display of the
/// frame being processed; the rest of the report is still rendered.
#[derive(Clone, Debug, Default)]
pub struct Interrupt(Arc<AtomicBool>);

impl Interrupt {
    /// Creates a new (untriggered) flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests an interruption.
    pub fn trigger(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Returns whether an interruption is pending, without consuming it.
    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Consumes a pending interruption, returning whether there was one.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }
}

/// State shared by every component needing color or source access.
///
/// It is created once at process start and handed over to the renderer
/// (and through it, to the debugger session).
#[derive(Debug, Default)]
pub struct DiagnosticsContext {
    colors: ColorSchemeTable,
    sources: SourceCache,
    interrupt: Interrupt,
}

impl DiagnosticsContext {
    /// Creates a context using the given color scheme table.
    pub fn new(colors: ColorSchemeTable) -> Self {
        Self {
            colors,
            sources: SourceCache::new(),
            interrupt: Interrupt::new(),
        }
    }

    /// Returns the color scheme table.
    pub fn colors(&self) -> &ColorSchemeTable {
        &self.colors
    }

    /// Returns the color scheme table, mutably.
    pub fn colors_mut(&mut self) -> &mut ColorSchemeTable {
        &mut self.colors
    }

    /// Returns the source cache.
    pub fn sources_mut(&mut self) -> &mut SourceCache {
        &mut self.sources
    }

    /// Returns the interruption flag.
    pub fn interrupt(&self) -> &Interrupt {
        &self.interrupt
    }
}
