use callassert::harness::{ArgMap, EntryPoint};
use callassert::style::ColorChoice;
use callassert::tool::ColorTool;
use clap::{Parser, ValueEnum};
use serde_json::json;
use std::io::IsTerminal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "tint")]
#[command(about = "Print text in a chosen terminal color and style")]
#[command(version)]
struct Cli {
    /// Words to print
    #[arg(value_name = "TEXT")]
    text: Vec<String>,

    /// Foreground color (name, or 0-255)
    #[arg(long, short)]
    fore: Option<String>,

    /// Background color (name, or 0-255)
    #[arg(long, short)]
    back: Option<String>,

    /// Text style, e.g. bold or underline
    #[arg(long, short)]
    style: Option<String>,

    /// List the known color and style names
    #[arg(long, short)]
    list: bool,

    /// When to emit color codes [default: $CALLASSERT_COLOR, else auto]
    #[arg(long, value_enum)]
    color: Option<ColorChoice>,
}

impl Cli {
    fn into_argd(self) -> ArgMap {
        let color = self
            .color
            .unwrap_or_else(ColorChoice::from_env)
            .to_possible_value()
            .map(|value| value.get_name().to_string())
            .unwrap_or_else(|| "auto".to_string());

        ArgMap::from([
            ("TEXT".to_string(), json!(self.text)),
            ("--fore".to_string(), json!(self.fore)),
            ("--back".to_string(), json!(self.back)),
            ("--style".to_string(), json!(self.style)),
            ("--list".to_string(), json!(self.list)),
            ("--color".to_string(), json!(color)),
        ])
    }
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let tool = ColorTool::new().with_terminal(std::io::stdout().is_terminal());
    let argd = tool.make_argd(cli.into_argd());

    let code = tool.main(&argd, &mut std::io::stdout(), &mut std::io::stderr())?;
    std::process::exit(code);
}
