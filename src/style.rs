use owo_colors::{OwoColorize, Style};
use std::fmt::Display;
use std::io::IsTerminal;

pub const COLOR_ENV_VAR: &str = "CALLASSERT_COLOR";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    /// Reads `CALLASSERT_COLOR`, falling back to `Auto` for missing or unknown values.
    pub fn from_env() -> Self {
        match std::env::var(COLOR_ENV_VAR) {
            Ok(value) => Self::parse(&value).unwrap_or_default(),
            Err(_) => ColorChoice::Auto,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "auto" => Some(ColorChoice::Auto),
            "always" | "on" | "1" => Some(ColorChoice::Always),
            "never" | "off" | "0" => Some(ColorChoice::Never),
            _ => None,
        }
    }

    /// Whether failure messages, which libtest prints to stderr, get color.
    pub fn enabled(self) -> bool {
        self.enabled_for(&std::io::stderr())
    }

    pub fn enabled_for(self, stream: &impl IsTerminal) -> bool {
        self.resolve(stream.is_terminal())
    }

    /// `Auto` colors a terminal unless `NO_COLOR` is set.
    pub fn resolve(self, is_terminal: bool) -> bool {
        match self {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => std::env::var_os("NO_COLOR").is_none() && is_terminal,
        }
    }
}

/// The fixed palette used by every diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Actual,
    Expected,
    Operator,
    Note,
    FuncName,
    Value,
    Key,
    Paren,
}

impl Tone {
    fn style(self) -> Style {
        match self {
            Tone::Actual => Style::new().yellow(),
            Tone::Expected => Style::new().green(),
            Tone::Operator => Style::new().red().bold(),
            Tone::Note => Style::new().red(),
            Tone::FuncName => Style::new().blue().bold(),
            Tone::Value => Style::new().cyan(),
            Tone::Key => Style::new().bright_blue(),
            Tone::Paren => Style::new().bold(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Styler {
    enabled: bool,
}

impl Default for Styler {
    fn default() -> Self {
        Self::new(ColorChoice::from_env())
    }
}

impl Styler {
    pub fn new(choice: ColorChoice) -> Self {
        Self {
            enabled: choice.enabled(),
        }
    }

    pub fn plain() -> Self {
        Self { enabled: false }
    }

    pub fn colored() -> Self {
        Self { enabled: true }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn paint(&self, text: impl Display, tone: Tone) -> String {
        if self.enabled {
            text.style(tone.style()).to_string()
        } else {
            text.to_string()
        }
    }

    /// Joins already painted fragments and wraps them in styled markers.
    pub fn wrap(&self, inner: &str, prefix: &str, suffix: &str, tone: Tone) -> String {
        format!(
            "{}{}{}",
            self.paint(prefix, tone),
            inner,
            self.paint(suffix, tone)
        )
    }
}

pub fn strip(text: &str) -> String {
    strip_ansi_escapes::strip_str(text)
}
