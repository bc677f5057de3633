use tbkit_report::render::{RenderMode, RenderOptions};

/// Configuration of reports and debugging sessions.
#[derive(Debug, PartialEq, knus::Decode)]
pub struct ReportConfig {
    /// Report mode (Plain, Context or Verbose).
    #[knus(child, default = RenderMode::Context.name().to_owned(), unwrap(argument))]
    pub mode: String,

    /// Name of the active color scheme.
    #[knus(child, default = tbkit_report::colors::LIGHT_BG.to_owned(), unwrap(argument))]
    pub color_scheme: String,

    /// Number of source lines shown around every frame's line.
    #[knus(child, default = 5, unwrap(argument))]
    pub context: usize,

    /// Number of outermost frames dropped from the reports.
    #[knus(child, default = 0, unwrap(argument))]
    pub tb_offset: usize,

    /// Prompt of the debugger.
    #[knus(child, default = tbkit_debugger::DEFAULT_PROMPT.to_owned(), unwrap(argument))]
    pub prompt: String,

    /// Maximum length of the values shown in verbose reports.
    #[knus(child, default = 100, unwrap(argument))]
    pub max_repr: usize,
}

impl ReportConfig {
    /// Returns the configured report mode.
    pub fn render_mode(&self) -> tbkit_report::Result<RenderMode> {
        self.mode.parse()
    }

    /// Returns the configured renderer tunables.
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            context: self.context,
            tb_offset: self.tb_offset,
            max_repr: self.max_repr,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            mode: RenderMode::Context.name().to_owned(),
            color_scheme: tbkit_report::colors::LIGHT_BG.to_owned(),
            context: 5,
            tb_offset: 0,
            prompt: tbkit_debugger::DEFAULT_PROMPT.to_owned(),
            max_repr: 100,
        }
    }
}
