use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::{Error, Result};

/// Name of the scheme mapping every role to an empty token.
pub const NO_COLOR: &str = "NoColor";

/// Name of the scheme meant for dark terminal backgrounds.
pub const LINUX: &str = "Linux";

/// Name of the scheme meant for light terminal backgrounds.
pub const LIGHT_BG: &str = "LightBG";

/// ANSI escape sequences of the terminal colors used by the builtin schemes.
pub mod term {
    /// Resets all attributes.
    pub const NORMAL: &str = "\x1b[0m";

    #[allow(missing_docs)]
    pub const BLACK: &str = "\x1b[0;30m";
    #[allow(missing_docs)]
    pub const RED: &str = "\x1b[0;31m";
    #[allow(missing_docs)]
    pub const GREEN: &str = "\x1b[0;32m";
    #[allow(missing_docs)]
    pub const BROWN: &str = "\x1b[0;33m";
    #[allow(missing_docs)]
    pub const BLUE: &str = "\x1b[0;34m";
    #[allow(missing_docs)]
    pub const PURPLE: &str = "\x1b[0;35m";
    #[allow(missing_docs)]
    pub const CYAN: &str = "\x1b[0;36m";
    #[allow(missing_docs)]
    pub const LIGHT_GRAY: &str = "\x1b[0;37m";
    #[allow(missing_docs)]
    pub const DARK_GRAY: &str = "\x1b[1;30m";
    #[allow(missing_docs)]
    pub const LIGHT_RED: &str = "\x1b[1;31m";
    #[allow(missing_docs)]
    pub const LIGHT_GREEN: &str = "\x1b[1;32m";
    #[allow(missing_docs)]
    pub const YELLOW: &str = "\x1b[1;33m";
    #[allow(missing_docs)]
    pub const LIGHT_BLUE: &str = "\x1b[1;34m";
    #[allow(missing_docs)]
    pub const LIGHT_PURPLE: &str = "\x1b[1;35m";
    #[allow(missing_docs)]
    pub const LIGHT_CYAN: &str = "\x1b[1;36m";
    #[allow(missing_docs)]
    pub const WHITE: &str = "\x1b[1;37m";
}

/// Semantic role of a piece of text within a report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// Separator line at the top of verbose reports.
    Topline,
    /// File name of a frame.
    Filename,
    /// File name of the emphasized (innermost) frame.
    FilenameEm,
    /// Line number gutter.
    Lineno,
    /// Line number of the line being pointed at.
    LinenoEm,
    /// Text of the line being pointed at.
    Line,
    /// Function name of a frame.
    Name,
    /// Function name of the emphasized frame.
    NameEm,
    /// Variable name.
    VName,
    /// Variable value.
    Val,
    /// Emphasized variable value (and `=` signs).
    ValEm,
    /// Emphasized text (`global`, `undefined`, ...).
    Em,
    /// Emphasized normal text.
    NormalEm,
    /// Exception name.
    ExcName,
    /// Syntax error caret.
    Caret,
    /// Gutter number of an enabled breakpoint.
    BreakpointEnabled,
    /// Gutter number of a disabled breakpoint.
    BreakpointDisabled,
    /// Reset to the terminal defaults.
    Normal,
}

impl Role {
    /// All the roles, in declaration order.
    pub const ALL: [Role; 18] = [
        Role::Topline,
        Role::Filename,
        Role::FilenameEm,
        Role::Lineno,
        Role::LinenoEm,
        Role::Line,
        Role::Name,
        Role::NameEm,
        Role::VName,
        Role::Val,
        Role::ValEm,
        Role::Em,
        Role::NormalEm,
        Role::ExcName,
        Role::Caret,
        Role::BreakpointEnabled,
        Role::BreakpointDisabled,
        Role::Normal,
    ];

    /// Number of roles.
    pub const COUNT: usize = Self::ALL.len();

    /// Returns the tag naming this role.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Topline => "topline",
            Self::Filename => "filename",
            Self::FilenameEm => "filenameEm",
            Self::Lineno => "lineno",
            Self::LinenoEm => "linenoEm",
            Self::Line => "line",
            Self::Name => "name",
            Self::NameEm => "nameEm",
            Self::VName => "vName",
            Self::Val => "val",
            Self::ValEm => "valEm",
            Self::Em => "em",
            Self::NormalEm => "normalEm",
            Self::ExcName => "excName",
            Self::Caret => "caret",
            Self::BreakpointEnabled => "breakpointEnabled",
            Self::BreakpointDisabled => "breakpointDisabled",
            Self::Normal => "Normal",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Named palette mapping every [Role] to a display token.
///
/// A scheme always defines a token for every role, since the tokens are
/// stored in an array indexed by role.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorScheme {
    name: String,
    tokens: [Cow<'static, str>; Role::COUNT],
}

impl ColorScheme {
    /// Creates a scheme by computing the token of every role.
    pub fn from_fn<F>(name: impl Into<String>, mut token: F) -> Self
    where
        F: FnMut(Role) -> Cow<'static, str>,
    {
        Self {
            name: name.into(),
            tokens: Role::ALL.map(&mut token),
        }
    }

    /// Creates the scheme mapping every role to the empty token.
    pub fn no_color() -> Self {
        Self::from_fn(NO_COLOR, |_| Cow::Borrowed(""))
    }

    /// Creates the scheme meant for dark terminal backgrounds.
    pub fn linux() -> Self {
        Self::from_fn(LINUX, |role| {
            Cow::Borrowed(match role {
                Role::Topline => term::LIGHT_RED,
                Role::Filename => term::GREEN,
                Role::FilenameEm => term::LIGHT_GREEN,
                Role::Lineno => term::GREEN,
                Role::LinenoEm => term::LIGHT_GREEN,
                Role::Line => term::YELLOW,
                Role::Name => term::PURPLE,
                Role::NameEm => term::LIGHT_PURPLE,
                Role::VName => term::CYAN,
                Role::Val => term::GREEN,
                Role::ValEm => term::LIGHT_BLUE,
                Role::Em => term::LIGHT_CYAN,
                Role::NormalEm => term::LIGHT_CYAN,
                Role::ExcName => term::LIGHT_RED,
                Role::Caret => term::WHITE,
                Role::BreakpointEnabled => term::LIGHT_RED,
                Role::BreakpointDisabled => term::RED,
                Role::Normal => term::NORMAL,
            })
        })
    }

    /// Creates the scheme meant for light terminal backgrounds.
    pub fn light_bg() -> Self {
        Self::from_fn(LIGHT_BG, |role| {
            Cow::Borrowed(match role {
                Role::Topline => term::RED,
                Role::Filename => term::LIGHT_GREEN,
                Role::FilenameEm => term::GREEN,
                Role::Lineno => term::LIGHT_GREEN,
                Role::LinenoEm => term::GREEN,
                Role::Line => term::RED,
                Role::Name => term::LIGHT_PURPLE,
                Role::NameEm => term::PURPLE,
                Role::VName => term::CYAN,
                Role::Val => term::LIGHT_GREEN,
                Role::ValEm => term::BLUE,
                Role::Em => term::CYAN,
                Role::NormalEm => term::CYAN,
                Role::ExcName => term::RED,
                Role::Caret => term::NORMAL,
                Role::BreakpointEnabled => term::LIGHT_RED,
                Role::BreakpointDisabled => term::RED,
                Role::Normal => term::NORMAL,
            })
        })
    }

    /// Returns the name of this scheme.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the token of the given role.
    pub fn get(&self, role: Role) -> &str {
        &self.tokens[role.index()]
    }

    /// Returns whether every token of this scheme is empty.
    pub fn is_colorless(&self) -> bool {
        self.tokens.iter().all(|token| token.is_empty())
    }
}

/// Table of registered color schemes, with one active scheme.
///
/// Switching the active scheme swaps a single pointer, so readers never
/// observe a half-updated scheme. Components must fetch
/// [active](Self::active) again after a switch.
#[derive(Clone, Debug)]
pub struct ColorSchemeTable {
    /// Registered schemes, keyed by lowercase name.
    schemes: IndexMap<String, Arc<ColorScheme>>,

    /// Currently active scheme.
    active: Arc<ColorScheme>,

    /// Scheme restored when toggling away from [NO_COLOR].
    restore: Arc<ColorScheme>,
}

impl ColorSchemeTable {
    /// Creates a table holding the builtin schemes, with the given one active.
    pub fn new(active: &str) -> Result<Self> {
        let mut table = Self::builtin();
        table.set_active_scheme(active)?;
        table.restore = table.active.clone();
        Ok(table)
    }

    fn builtin() -> Self {
        let light_bg = Arc::new(ColorScheme::light_bg());

        let mut schemes = IndexMap::new();
        for scheme in [
            Arc::new(ColorScheme::no_color()),
            Arc::new(ColorScheme::linux()),
            light_bg.clone(),
        ] {
            schemes.insert(scheme.name().to_ascii_lowercase(), scheme);
        }

        Self {
            schemes,
            active: light_bg.clone(),
            restore: light_bg,
        }
    }

    /// Registers a new scheme.
    ///
    /// A previously registered scheme with the same (case-insensitive) name
    /// is replaced.
    pub fn register(&mut self, scheme: ColorScheme) {
        let key = scheme.name().to_ascii_lowercase();
        let scheme = Arc::new(scheme);

        if self.active.name().eq_ignore_ascii_case(scheme.name()) {
            self.active = scheme.clone();
        }

        self.schemes.insert(key, scheme);
    }

    /// Returns the registered scheme with the given (case-insensitive) name.
    pub fn get(&self, name: &str) -> Option<&Arc<ColorScheme>> {
        self.schemes.get(&name.to_ascii_lowercase())
    }

    /// Returns the names of the registered schemes.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemes.values().map(|scheme| scheme.name())
    }

    /// Makes the scheme with the given name the active one.
    pub fn set_active_scheme(&mut self, name: &str) -> Result<()> {
        let scheme = self
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownScheme(name.to_owned()))?;

        tracing::debug!(scheme = scheme.name(), "active color scheme");

        self.active = scheme;
        Ok(())
    }

    /// Toggles between the active scheme and [NO_COLOR].
    ///
    /// Toggling twice restores the scheme that was active before the first
    /// toggle.
    pub fn toggle_no_color(&mut self) {
        if self.active.name() == NO_COLOR {
            self.active = self.restore.clone();
        } else if let Some(no_color) = self.get(NO_COLOR).cloned() {
            self.restore = std::mem::replace(&mut self.active, no_color);
        }
    }

    /// Returns the active scheme.
    pub fn active(&self) -> Arc<ColorScheme> {
        self.active.clone()
    }

    /// Returns the name of the active scheme.
    pub fn active_name(&self) -> &str {
        self.active.name()
    }
}

impl Default for ColorSchemeTable {
    fn default() -> Self {
        Self::builtin()
    }
}
