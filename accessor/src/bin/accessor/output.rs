use colored::Colorize;

use crate::theme::{ICONS, THEME};

/// Global CLI options that affect output
#[derive(Clone, Debug, Default)]
pub struct GlobalOptions {
    pub quiet: bool,
    pub no_color: bool,
}

/// Output manager handles status lines on the terminal
pub struct OutputManager {
    pub options: GlobalOptions,
}

impl OutputManager {
    pub fn new(options: GlobalOptions) -> Self {
        Self { options }
    }

    /// Display a success message with color and icon
    pub fn success(&self, message: &str) {
        if !self.options.quiet {
            let output = if self.options.no_color {
                format!("{} {message}", ICONS.success)
            } else {
                format!(
                    "{} {}",
                    ICONS.success.color(THEME.success),
                    message.color(THEME.success)
                )
            };
            println!("{output}");
        }
    }

    /// Display a warning message
    pub fn warning(&self, message: &str) {
        if !self.options.quiet {
            let output = if self.options.no_color {
                format!("{} {message}", ICONS.warning)
            } else {
                format!(
                    "{} {}",
                    ICONS.warning.color(THEME.warning),
                    message.color(THEME.warning)
                )
            };
            eprintln!("{output}");
        }
    }

    /// Display a fatal error, prefixed with the program name. Never silenced.
    pub fn error(&self, message: &str) {
        let output = if self.options.no_color {
            format!("accessor: {message}")
        } else {
            format!("{} {}", "accessor:".color(THEME.error).bold(), message)
        };
        eprintln!("{output}");
    }

    /// Banner printed before a dry-run file body
    pub fn file_banner(&self, path: &str) {
        let output = if self.options.no_color {
            format!("{} {path}", ICONS.arrow)
        } else {
            format!("{} {}", ICONS.arrow.color(THEME.muted), path.color(THEME.highlight).bold())
        };
        eprintln!("{output}");
    }
}
