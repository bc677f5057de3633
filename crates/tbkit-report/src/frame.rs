use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::Interrupt;
use crate::source::{SourceCache, SourceWindow};
use crate::value::{EvalError, Scope, ValueScope};

/// Reserved local name holding the return value of a frame that already
/// returned.
pub const RETURN_KEY: &str = "__return__";

/// Function name substituted for anonymous functions.
pub const LAMBDA_NAME: &str = "<lambda>";

/// Function name of module-level code.
pub const MODULE_LEVEL: &str = "?";

/// Raw call-stack entry, as handed over by the stack capture collaborator.
#[derive(Clone)]
pub struct StackEntry {
    /// Source file of the entry, as reported by the runtime.
    pub file: PathBuf,

    /// Line (1-based) being executed.
    pub line: usize,

    /// Function name, if any.
    pub function: Option<String>,

    /// Names of the positional arguments, in declaration order.
    pub args: Vec<String>,

    /// Name of the variadic positional argument, if any.
    pub varargs: Option<String>,

    /// Name of the variadic keyword argument, if any.
    pub varkw: Option<String>,

    /// Local scope of the entry.
    pub locals: Arc<dyn Scope>,

    /// Global scope of the entry.
    pub globals: Arc<dyn Scope>,
}

impl StackEntry {
    /// Creates an entry with empty scopes and no argument.
    pub fn new(
        file: impl Into<PathBuf>,
        line: usize,
        function: impl Into<Option<&'static str>>,
    ) -> Self {
        Self {
            file: file.into(),
            line,
            function: function.into().map(str::to_owned),
            args: Vec::new(),
            varargs: None,
            varkw: None,
            locals: Arc::new(ValueScope::new()),
            globals: Arc::new(ValueScope::new()),
        }
    }

    /// Sets the function name of this entry.
    pub fn with_function(mut self, function: Option<String>) -> Self {
        self.function = function;
        self
    }

    /// Sets the positional argument names of this entry.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the variadic positional argument name of this entry.
    pub fn with_varargs(mut self, name: impl Into<String>) -> Self {
        self.varargs = Some(name.into());
        self
    }

    /// Sets the variadic keyword argument name of this entry.
    pub fn with_varkw(mut self, name: impl Into<String>) -> Self {
        self.varkw = Some(name.into());
        self
    }

    /// Sets the local scope of this entry.
    pub fn with_locals(mut self, locals: Arc<dyn Scope>) -> Self {
        self.locals = locals;
        self
    }

    /// Sets the global scope of this entry.
    pub fn with_globals(mut self, globals: Arc<dyn Scope>) -> Self {
        self.globals = globals;
        self
    }
}

impl fmt::Debug for StackEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackEntry")
            .field("file", &self.file)
            .field("line", &self.line)
            .field("function", &self.function)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

/// Collaborator giving access to the stack frame records of a failure.
pub trait Introspect {
    /// Returns the stack entries, outermost caller first.
    fn stack_entries(&self) -> crate::Result<Vec<StackEntry>>;
}

impl Introspect for [StackEntry] {
    fn stack_entries(&self) -> crate::Result<Vec<StackEntry>> {
        Ok(self.to_vec())
    }
}

impl Introspect for Vec<StackEntry> {
    fn stack_entries(&self) -> crate::Result<Vec<StackEntry>> {
        Ok(self.clone())
    }
}

/// Scope a name was resolved against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NameScope {
    /// The local scope of the frame.
    Local,
    /// The global scope of the frame.
    Global,
}

/// Dotted name resolved against the scopes of a frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedName {
    /// Dotted name.
    pub name: String,

    /// Scope the base name belongs to.
    pub scope: NameScope,

    /// Text of the value, or the reason it couldn't be resolved.
    pub value: Result<String, EvalError>,
}

/// Value resolution of a frame was interrupted by the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Interrupted;

/// Normalized, immutable view of one call-stack entry.
#[derive(Clone)]
pub struct FrameSnapshot {
    file: PathBuf,
    line: usize,
    function: String,
    args: Vec<String>,
    varargs: Option<String>,
    varkw: Option<String>,
    return_value: Option<String>,
    locals: Arc<dyn Scope>,
    globals: Arc<dyn Scope>,
}

impl FrameSnapshot {
    /// Builds a snapshot out of a raw stack entry.
    pub fn from_entry(entry: StackEntry) -> Self {
        let return_value = entry
            .locals
            .declares(RETURN_KEY)
            .then(|| entry.locals.eval(RETURN_KEY).ok())
            .flatten();

        let function = match entry.function {
            Some(name) if !name.is_empty() => name,
            _ => LAMBDA_NAME.to_owned(),
        };

        Self {
            file: canonicalize(&entry.file),
            line: entry.line,
            function,
            args: entry.args,
            varargs: entry.varargs,
            varkw: entry.varkw,
            return_value,
            locals: entry.locals,
            globals: entry.globals,
        }
    }

    /// Builds the snapshots of a whole stack, outermost caller first.
    pub fn from_entries(entries: impl IntoIterator<Item = StackEntry>) -> Vec<Self> {
        entries.into_iter().map(Self::from_entry).collect()
    }

    /// Returns the (absolute) file path of this frame.
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Returns the line being executed.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Returns the function name of this frame.
    pub fn function(&self) -> &str {
        &self.function
    }

    /// Returns whether this frame runs module-level code.
    pub fn is_module_level(&self) -> bool {
        self.function == MODULE_LEVEL
    }

    /// Returns whether this frame runs code typed at an interactive console,
    /// for which no source file exists.
    pub fn is_console(&self) -> bool {
        let name = self.file.to_string_lossy();
        name == "<console>" || name == "<ipython console>" || name.ends_with("<string>")
    }

    /// Returns the positional argument names.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Returns the variadic positional argument name.
    pub fn varargs(&self) -> Option<&str> {
        self.varargs.as_deref()
    }

    /// Returns the variadic keyword argument name.
    pub fn varkw(&self) -> Option<&str> {
        self.varkw.as_deref()
    }

    /// Returns the value returned by this frame, if it already returned.
    pub fn return_value(&self) -> Option<&str> {
        self.return_value.as_deref()
    }

    /// Returns the local scope.
    pub fn locals(&self) -> &dyn Scope {
        self.locals.as_ref()
    }

    /// Returns the global scope.
    pub fn globals(&self) -> &dyn Scope {
        self.globals.as_ref()
    }

    /// Returns the source text of the line being executed.
    pub fn source_line(&self, sources: &mut SourceCache) -> Option<String> {
        sources.line(&self.file, self.line)
    }

    /// Returns a window of `size` source lines around the line being
    /// executed.
    pub fn window(&self, sources: &mut SourceCache, size: usize) -> SourceWindow {
        sources.window(&self.file, self.line, size)
    }

    /// Resolves a name against this frame: the local scope if it declares
    /// the base name, the global scope otherwise.
    pub fn resolve(&self, name: &str) -> ResolvedName {
        let base = name.split('.').next().unwrap_or(name);

        let (scope, value) = if self.locals.declares(base) {
            (NameScope::Local, self.locals.eval(name))
        } else if self.globals.declares(base) {
            (NameScope::Global, self.globals.eval(name))
        } else {
            (NameScope::Global, Err(EvalError::Unbound(base.to_owned())))
        };

        ResolvedName {
            name: name.to_owned(),
            scope,
            value,
        }
    }

    /// Resolves every given name against this frame.
    ///
    /// Resolution stops as soon as the user triggers an interruption.
    #[tracing::instrument(level = "trace", skip_all, fields(function = %self.function))]
    pub fn resolve_names(
        &self,
        names: &[String],
        interrupt: &Interrupt,
    ) -> Result<Vec<ResolvedName>, Interrupted> {
        let mut resolved = Vec::with_capacity(names.len());

        for name in names {
            let name = self.resolve(name);

            if interrupt.take() || name.value == Err(EvalError::Interrupted) {
                tracing::debug!(name = %name.name, "value resolution interrupted");
                return Err(Interrupted);
            }

            resolved.push(name);
        }

        Ok(resolved)
    }
}

impl fmt::Debug for FrameSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameSnapshot")
            .field("file", &self.file)
            .field("line", &self.line)
            .field("function", &self.function)
            .field("return_value", &self.return_value)
            .finish_non_exhaustive()
    }
}

/// Makes a file path absolute, leaving pseudo file names (e.g.,
/// `<console>`) untouched.
fn canonicalize(file: &Path) -> PathBuf {
    let name = file.to_string_lossy();

    if name.is_empty() {
        return PathBuf::from(MODULE_LEVEL);
    }
    if name.starts_with('<') {
        return file.to_path_buf();
    }

    std::path::absolute(file).unwrap_or_else(|_| file.to_path_buf())
}
