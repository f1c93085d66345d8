//! inspectlog CLI - Inspect structured documents and preview log output.
//!
//! Commands:
//! - `inspect` - Describe and format a JSON, YAML or TOML document
//! - `demo` - Log a set of sample values through the console sink

#![forbid(unsafe_code)]

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};

use inspectlog_console::logging::LogBridge;
use inspectlog_console::{ColorName, ConsoleConfig, ConsoleSink, LogLevel, Logger, Tag, template};
use inspectlog_core::markers;
use inspectlog_core::{
    ColorMode, DescribeOptions, InspectError, InspectOptions, InspectResult, IntoValue, ObjectRef,
    Value, inspect,
};

/// inspectlog CLI - Inspect values the way inspectlog logs them.
#[derive(Parser)]
#[command(name = "inspectlog")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect a structured document.
    ///
    /// Reads a JSON, YAML or TOML document and prints its description,
    /// packed onto one line where it fits.
    Inspect {
        /// Input file, or `-` for stdin.
        #[arg(default_value = "-")]
        file: String,

        /// Input format (default: from the file extension, else json).
        #[arg(long, short = 'i')]
        input: Option<InputFormat>,

        /// Output styling.
        #[arg(long, short = 'c', value_enum, default_value = "auto")]
        color: ColorChoice,

        /// Packing width below which collections stay on one line.
        #[arg(long, short = 'w', default_value_t = 50)]
        line_limit: usize,

        /// Arrays longer than this are truncated.
        #[arg(long, short = 'm', default_value_t = 100)]
        max_elements: usize,
    },

    /// Log the demonstration values.
    ///
    /// Sends nested, cyclic, truncated and custom-marked values through a
    /// console logger so the output can be previewed.
    Demo {
        /// Minimum level to show.
        #[arg(long, short = 'l', env = "INSPECTLOG_LEVEL")]
        level: Option<LogLevel>,

        /// Path to a config file (default: the user config location).
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum InputFormat {
    Json,
    Yaml,
    Toml,
}

impl InputFormat {
    fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
    Html,
    HtmlDark,
}

impl ColorChoice {
    fn mode(self) -> ColorMode {
        match self {
            Self::Auto => {
                if ConsoleConfig::from_env().should_use_styling() {
                    ColorMode::Ansi
                } else {
                    ColorMode::Plain
                }
            }
            Self::Always => ColorMode::Ansi,
            Self::Never => ColorMode::Plain,
            Self::Html => ColorMode::HtmlLight,
            Self::HtmlDark => ColorMode::HtmlDark,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Inspect {
            file,
            input,
            color,
            line_limit,
            max_elements,
        } => cmd_inspect(&file, input, color, line_limit, max_elements),
        Commands::Demo { level, config } => cmd_demo(level, config.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

// ============================================================================
// inspect
// ============================================================================

fn cmd_inspect(
    file: &str,
    input: Option<InputFormat>,
    color: ColorChoice,
    line_limit: usize,
    max_elements: usize,
) -> InspectResult<()> {
    if line_limit == 0 {
        return Err(InspectError::invalid_config("--line-limit must be positive"));
    }

    let (text, format) = if file == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        (text, input.unwrap_or(InputFormat::Json))
    } else {
        let path = Path::new(file);
        let text = fs::read_to_string(path)
            .map_err(|e| InspectError::io(format!("cannot read {file}: {e}")))?;
        let format = input
            .or_else(|| InputFormat::from_path(path))
            .unwrap_or(InputFormat::Json);
        (text, format)
    };

    let value = parse_document(&text, format)?;
    let options = InspectOptions::new()
        .with_colors(color.mode())
        .with_line_limit(line_limit)
        .with_describe(split_options(max_elements));
    println!("{}", inspect(&value, &options));
    Ok(())
}

/// Parses a document into a value, going through `serde_json::Value` so every
/// format shares one conversion.
fn parse_document(text: &str, format: InputFormat) -> InspectResult<Value> {
    let json: serde_json::Value = match format {
        InputFormat::Json => serde_json::from_str(text)?,
        InputFormat::Yaml => serde_yaml::from_str(text)
            .map_err(|e| InspectError::decode(format!("YAML error: {e}")))?,
        InputFormat::Toml => {
            let table: toml::Value = toml::from_str(text)
                .map_err(|e| InspectError::decode(format!("TOML error: {e}")))?;
            serde_json::to_value(table)?
        }
    };
    Ok(json.into_value())
}

/// Truncation keeping the first and last halves of `max_elements`.
fn split_options(max_elements: usize) -> DescribeOptions {
    let tail = max_elements / 2;
    DescribeOptions::new()
        .with_max_elements(max_elements)
        .with_split(max_elements - tail, tail)
}

// ============================================================================
// demo
// ============================================================================

fn cmd_demo(level: Option<LogLevel>, config_path: Option<&Path>) -> InspectResult<()> {
    let mut config = match config_path {
        Some(path) => ConsoleConfig::load(path)?.apply_env(),
        None => ConsoleConfig::load_default()?,
    };
    if let Some(level) = level {
        config = config.with_threshold(level);
    }

    let logger = Logger::new(ConsoleSink::from_config(&config))
        .with_threshold(config.threshold_handle())
        .with_describe_options(config.describe_options());

    if LogBridge::builder()
        .level_filter(log::LevelFilter::Debug)
        .with_targets(config.show_targets)
        .init(logger.clone())
        .is_err()
    {
        logger.debug("log bridge not installed: a logger is already set");
    }

    for (level, template) in demo_messages()? {
        logger.log(level, template);
    }

    let db = logger.prefix(Tag::new("db", ColorName::Blue));
    db.conn(template!("connected to {} as {}", "primary", "reader"));
    db.prefix(Tag::new("pool", ColorName::Cyan))
        .debug(template!("{} idle connections", 4));

    log::info!(target: "demo::bridge", "records from the log facade arrive here too");
    log::warn!(target: "demo::bridge", "and keep their level");
    Ok(())
}

fn demo_messages() -> InspectResult<Vec<(LogLevel, inspectlog_console::Template)>> {
    let nested = Value::object([
        ("name", "inspectlog".into_value()),
        ("version", [0, 1, 0].into_value()),
        (
            "features",
            Value::object([
                ("cycles", true.into_value()),
                ("markers", true.into_value()),
                ("limit", 50.into_value()),
            ]),
        ),
    ]);

    let node = ObjectRef::plain();
    node.set("id", 1.into_value());
    node.set("parent", node.to_value());

    let map = Value::map([
        ("alpha".into_value(), 1.into_value()),
        (Value::object([("k", 2.into_value())]), "object key".into_value()),
    ]);

    Ok(vec![
        (LogLevel::Info, template!("nested {}", nested)),
        (
            LogLevel::Info,
            template!("long array {}", (0..150).collect::<Vec<u32>>()),
        ),
        (LogLevel::Info, template!("map {}", map)),
        (
            LogLevel::Info,
            template!("set {}", Value::set(["a", "b", "a"].map(IntoValue::into_value))),
        ),
        (LogLevel::Warn, template!("cycle {}", node.to_value())),
        (
            LogLevel::Debug,
            template!(
                "functions {} {}",
                Value::function("greet", "fn greet(name: &str) -> String"),
                Value::anonymous_function("|x| x + 1")
            ),
        ),
        (
            LogLevel::Info,
            template!(
                "date {} pattern {}",
                Utc::now(),
                Value::regexp("^[a-z]+$", "i")
            ),
        ),
        (
            LogLevel::Error,
            template!(
                "failure {}",
                Value::error(&io::Error::new(io::ErrorKind::NotFound, "config.toml"))
            ),
        ),
        (
            LogLevel::Info,
            template!(
                "custom {} and {}",
                markers::raw_text("status: ok", ColorName::Green),
                markers::ansi_text("\u{1b}[91mred\u{1b}[0m then \u{1b}[94mblue\u{1b}[0m")?
            ),
        ),
        (LogLevel::Crit, template!("{} values logged", 9)),
    ])
}
