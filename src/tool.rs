//! `tint`: prints its arguments in a chosen color and style.

use crate::harness::{ArgMap, EntryPoint};
use crate::style::ColorChoice;
use owo_colors::{AnsiColors, DynColors, Effect, OwoColorize, Style, XtermColors};
use serde_json::{json, Value};
use std::io::{self, Write};
use thiserror::Error;

pub const COLOR_NAMES: &[&str] = &[
    "black",
    "red",
    "green",
    "yellow",
    "blue",
    "magenta",
    "cyan",
    "white",
    "bright_black",
    "bright_red",
    "bright_green",
    "bright_yellow",
    "bright_blue",
    "bright_magenta",
    "bright_cyan",
    "bright_white",
    "default",
];

pub const STYLE_NAMES: &[&str] = &[
    "bold",
    "dimmed",
    "italic",
    "underline",
    "blink",
    "reversed",
    "hidden",
    "strikethrough",
    "normal",
];

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Invalid color name: {0}")]
    InvalidColor(String),
    #[error("Invalid style name: {0}")]
    InvalidStyle(String),
    #[error("Failed to write output: {0}")]
    Io(#[from] io::Error),
}

pub fn parse_color(name: &str) -> Result<DynColors, ToolError> {
    let ansi = match name.trim().to_lowercase().as_str() {
        "black" => AnsiColors::Black,
        "red" => AnsiColors::Red,
        "green" => AnsiColors::Green,
        "yellow" => AnsiColors::Yellow,
        "blue" => AnsiColors::Blue,
        "magenta" => AnsiColors::Magenta,
        "cyan" => AnsiColors::Cyan,
        "white" => AnsiColors::White,
        "bright_black" => AnsiColors::BrightBlack,
        "bright_red" => AnsiColors::BrightRed,
        "bright_green" => AnsiColors::BrightGreen,
        "bright_yellow" => AnsiColors::BrightYellow,
        "bright_blue" => AnsiColors::BrightBlue,
        "bright_magenta" => AnsiColors::BrightMagenta,
        "bright_cyan" => AnsiColors::BrightCyan,
        "bright_white" => AnsiColors::BrightWhite,
        "default" => AnsiColors::Default,
        other => {
            // 0-255 picks from the xterm palette
            return other
                .parse::<u8>()
                .map(|code| DynColors::Xterm(XtermColors::from(code)))
                .map_err(|_| ToolError::InvalidColor(name.to_string()));
        }
    };
    Ok(DynColors::Ansi(ansi))
}

/// `None` for `normal`, which applies no effect.
pub fn parse_style(name: &str) -> Result<Option<Effect>, ToolError> {
    let effect = match name.trim().to_lowercase().as_str() {
        "bold" => Effect::Bold,
        "dimmed" => Effect::Dimmed,
        "italic" => Effect::Italic,
        "underline" => Effect::Underline,
        "blink" => Effect::Blink,
        "reversed" => Effect::Reversed,
        "hidden" => Effect::Hidden,
        "strikethrough" => Effect::Strikethrough,
        "normal" => return Ok(None),
        _ => return Err(ToolError::InvalidStyle(name.to_string())),
    };
    Ok(Some(effect))
}

fn arg_str(argd: &ArgMap, key: &str) -> Option<String> {
    match argd.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn arg_flag(argd: &ArgMap, key: &str) -> bool {
    argd.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn arg_words(argd: &ArgMap, key: &str) -> Vec<String> {
    match argd.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        Some(Value::String(s)) => vec![s.clone()],
        _ => Vec::new(),
    }
}

#[derive(Debug, Clone, Default)]
pub struct ColorTool {
    stdout_is_terminal: bool,
}

impl ColorTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// `--color auto` colors the text only when stdout is a terminal.
    pub fn with_terminal(mut self, stdout_is_terminal: bool) -> Self {
        self.stdout_is_terminal = stdout_is_terminal;
        self
    }

    fn build_style(&self, argd: &ArgMap) -> Result<Style, ToolError> {
        let mut style = Style::new();
        if let Some(fore) = arg_str(argd, "--fore") {
            style = style.color(parse_color(&fore)?);
        }
        if let Some(back) = arg_str(argd, "--back") {
            style = style.on_color(parse_color(&back)?);
        }
        if let Some(name) = arg_str(argd, "--style") {
            if let Some(effect) = parse_style(&name)? {
                style = style.effect(effect);
            }
        }
        Ok(style)
    }

    fn write_names(&self, enabled: bool, stdout: &mut dyn Write) -> Result<(), ToolError> {
        writeln!(stdout, "Colors:")?;
        for name in COLOR_NAMES {
            match parse_color(name) {
                Ok(color) if enabled => writeln!(stdout, "  {}", name.color(color))?,
                _ => writeln!(stdout, "  {}", name)?,
            }
        }
        writeln!(stdout, "Styles:")?;
        for name in STYLE_NAMES {
            match parse_style(name) {
                Ok(Some(effect)) if enabled => {
                    writeln!(stdout, "  {}", name.style(Style::new().effect(effect)))?
                }
                _ => writeln!(stdout, "  {}", name)?,
            }
        }
        Ok(())
    }
}

impl EntryPoint for ColorTool {
    type Error = ToolError;

    fn name(&self) -> &str {
        "tint"
    }

    fn make_argd(&self, mut argd: ArgMap) -> ArgMap {
        for key in ["--fore", "--back", "--style"] {
            argd.entry(key.to_string()).or_insert(Value::Null);
        }
        argd.entry("--list".to_string()).or_insert(json!(false));
        argd.entry("--color".to_string()).or_insert(json!("auto"));
        argd.entry("TEXT".to_string()).or_insert(json!([]));
        argd
    }

    fn is_validation_error(&self, err: &ToolError) -> bool {
        matches!(err, ToolError::InvalidColor(_) | ToolError::InvalidStyle(_))
    }

    fn main(
        &self,
        argd: &ArgMap,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Result<i32, ToolError> {
        let choice = arg_str(argd, "--color")
            .and_then(|value| ColorChoice::parse(&value))
            .unwrap_or_default();
        let enabled = choice.resolve(self.stdout_is_terminal);

        if arg_flag(argd, "--list") {
            self.write_names(enabled, stdout)?;
            return Ok(0);
        }

        let style = self.build_style(argd)?;
        let text = arg_words(argd, "TEXT").join(" ");
        if text.is_empty() {
            writeln!(stderr, "usage error: no text to colorize")?;
            return Ok(1);
        }

        tracing::debug!(enabled, "writing {} bytes", text.len());
        if enabled {
            writeln!(stdout, "{}", text.style(style))?;
        } else {
            writeln!(stdout, "{}", text)?;
        }
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assertions::{AssertError, TestCase};
    use crate::harness::MainExpectation;
    use crate::style::{strip, Styler};
    use assert_matches::assert_matches;

    fn case() -> TestCase {
        TestCase::with_styler(Styler::plain())
    }

    fn argd(pairs: &[(&str, Value)]) -> ArgMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_parse_color() {
        assert_matches!(parse_color("red"), Ok(DynColors::Ansi(AnsiColors::Red)));
        assert_matches!(
            parse_color("Bright_Cyan"),
            Ok(DynColors::Ansi(AnsiColors::BrightCyan))
        );
        assert_matches!(parse_color("208"), Ok(DynColors::Xterm(_)));
        assert_matches!(parse_color("256"), Err(ToolError::InvalidColor(ref n)) if n == "256");
        assert_matches!(parse_color("mauve"), Err(ToolError::InvalidColor(_)));
    }

    #[test]
    fn test_parse_style() {
        assert_matches!(parse_style("bold"), Ok(Some(Effect::Bold)));
        assert_matches!(parse_style("normal"), Ok(None));
        assert_matches!(parse_style("loud"), Err(ToolError::InvalidStyle(_)));
    }

    #[test]
    fn test_plain_output() {
        let args = argd(&[
            ("TEXT", json!(["hello", "world"])),
            ("--fore", json!("red")),
            ("--color", json!("never")),
        ]);
        let expect = MainExpectation::new().stdout("hello world\n");
        assert!(case().assert_main(&ColorTool::new(), args, expect).is_ok());
    }

    #[test]
    fn test_colored_output() {
        let args = argd(&[
            ("TEXT", json!(["hi"])),
            ("--fore", json!("green")),
            ("--style", json!("bold")),
            ("--color", json!("always")),
        ]);
        let (code, out, err) = case().run_main_output(&ColorTool::new(), args, false).unwrap();
        assert_eq!(code, 0);
        assert_eq!(err, "");
        assert_ne!(out, "hi\n");
        assert_eq!(strip(&out), "hi\n");
    }

    #[test]
    fn test_auto_color_plain_when_stdout_is_not_a_terminal() {
        let args = argd(&[("TEXT", json!(["hi"])), ("--fore", json!("red"))]);
        let expect = MainExpectation::new().stdout("hi\n");
        assert!(case().assert_main(&ColorTool::new(), args, expect).is_ok());
    }

    #[test]
    fn test_empty_text_is_usage_error() {
        let args = argd(&[("--color", json!("never"))]);
        let (code, out, err) = case().run_main_output(&ColorTool::new(), args, false).unwrap();
        assert_eq!(code, 1);
        assert_eq!(out, "");
        assert_eq!(err, "usage error: no text to colorize\n");
    }

    #[test]
    fn test_invalid_color_fails_test_with_argd() {
        let args = argd(&[("TEXT", json!(["x"])), ("--fore", json!("mauve"))]);
        let err = case().run_main_output(&ColorTool::new(), args, false).unwrap_err();
        assert!(err.is_failure());
        let text = err.to_string();
        assert!(text.starts_with("tint failed to run:\nInvalid color name: mauve\n    argd: {"));
        assert!(text.contains("\"--fore\": \"mauve\""));
    }

    #[test]
    fn test_invalid_style_propagates_when_expected() {
        let args = argd(&[("TEXT", json!(["x"])), ("--style", json!("loud"))]);
        let err = case().run_main_output(&ColorTool::new(), args, true).unwrap_err();
        assert_matches!(err, AssertError::Unexpected(ref e)
            if matches!(e.downcast_ref::<ToolError>(), Some(ToolError::InvalidStyle(_))));
    }

    #[test]
    fn test_list_names() {
        let args = argd(&[("--list", json!(true)), ("--color", json!("never"))]);
        let (code, out, _) = case().run_main_output(&ColorTool::new(), args, false).unwrap();
        assert_eq!(code, 0);
        assert!(out.starts_with("Colors:\n  black\n"));
        assert!(out.contains("Styles:\n  bold\n"));
        assert!(out.ends_with("  normal\n"));
    }

    #[test]
    fn test_numeric_color_argument() {
        let args = argd(&[
            ("TEXT", json!("solo")),
            ("--back", json!(17)),
            ("--color", json!("never")),
        ]);
        let expect = MainExpectation::new().stdout("solo\n");
        assert!(case().assert_main(&ColorTool::new(), args, expect).is_ok());
    }

    #[test]
    fn test_should_fail_on_empty_text() {
        let expect = MainExpectation::new()
            .should_fail()
            .stderr("usage error: no text to colorize\n");
        let err = case()
            .assert_main(&ColorTool::new(), ArgMap::new(), expect)
            .unwrap_err();
        assert!(err.to_string().contains("did not produce any stdout output"));
    }
}
