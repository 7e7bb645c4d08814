//! Visual theme for the human report.

use console::Style;

/// Styles applied to report lines by severity.
#[derive(Debug, Clone)]
pub struct ReportTheme {
    /// Missing and mismatched references (red).
    pub error: Style,
    /// Architecture warnings (orange).
    pub warning: Style,
    /// Skipped files (dim).
    pub dim: Style,
    /// Module header lines (normal).
    pub module: Style,
}

impl Default for ReportTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportTheme {
    /// Create the colored theme.
    pub fn new() -> Self {
        Self {
            error: Style::new().red(),
            warning: Style::new().color256(208),
            dim: Style::new().dim(),
            module: Style::new(),
        }
    }

    /// Create a theme without colors (for non-TTY or --no-color).
    pub fn plain() -> Self {
        Self {
            error: Style::new(),
            warning: Style::new(),
            dim: Style::new(),
            module: Style::new(),
        }
    }

    pub fn format_error(&self, msg: &str) -> String {
        self.error.apply_to(msg).to_string()
    }

    pub fn format_warning(&self, msg: &str) -> String {
        self.warning.apply_to(msg).to_string()
    }

    pub fn format_dim(&self, msg: &str) -> String {
        self.dim.apply_to(msg).to_string()
    }

    pub fn format_module(&self, msg: &str) -> String {
        self.module.apply_to(msg).to_string()
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors() -> bool {
    // Check NO_COLOR env var (https://no-color.org/)
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    console::Term::stdout().is_term()
}
