//! # TraceReplay - capture inspection CLI
//!
//! Command-line front end for the capture parser and replay reconstructor.
//! Reads a raw capture (a JSON envelope with an `attributes` map) from a file
//! and shows what the library makes of it, without calling any model.
//!
//! ## Usage
//!
//! ```bash
//! tracereplay detect capture.json       # print the detected source format
//! tracereplay parse capture.json        # print the parsed capture as JSON
//! tracereplay preview capture.json      # print the replay messages and a summary
//! tracereplay validate                  # validate configuration
//! tracereplay --config ./replay.toml parse capture.json
//! ```
//!
//! ## Configuration
//!
//! Configuration is layered: built-in defaults, `/etc/tracereplay/config.toml`,
//! the user config file, an explicit `--config` file, then `TRACEREPLAY_*`
//! environment variables. A `.env` file in the working directory is honoured.
//!
//! Authors:
//!   Jaro <yarenty@gmail.com>
//!
//! Copyright (c) 2026 SkyCorp

/* --- uses ------------------------------------------------------------------------------------ */

use std::env;
use std::path::Path;

use serde_json::{Value, json};

use tracereplay::capture::{CaptureParser, validate_format};
use tracereplay::config::loader::ConfigLoader;
use tracereplay::config::{Config, ValidationSeverity};
use tracereplay::error::{ReplayError, Result};
use tracereplay::replay::{ExecutionPreview, ReplayOverrides, ReplayPlan};

/* --- constants ------------------------------------------------------------------------------ */

/** the version as defined in cargo.toml */
const VERSION: &str = env!("CARGO_PKG_VERSION");

/* --- start of code -------------------------------------------------------------------------- */

///
/// Entry point: dispatch the command and turn errors into a non-zero exit code.
fn main() {
    let _ = dotenvy::dotenv();

    let args: Vec<String> = env::args().skip(1).collect();
    handle_info_args(&args);

    match run(args) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            let error_msg = format!("{}", e);
            eprintln!("Error:");
            for line in error_msg.lines() {
                eprintln!("{}", line);
            }
            std::process::exit(1);
        }
    }
}

///
/// Handle `--version` and `--help` before any configuration is loaded.
fn handle_info_args(args: &[String]) {
    match args.first().map(String::as_str) {
        None | Some("--help") | Some("-h") => {
            print_help();
            std::process::exit(0);
        }
        Some("--version") | Some("-V") => {
            println!("tracereplay {}", VERSION);
            std::process::exit(0);
        }
        _ => {}
    }
}

fn run(args: Vec<String>) -> Result<i32> {
    let (config_path, rest) = split_config_arg(args)?;
    let Some((command, operands)) = rest.split_first() else {
        print_help();
        return Ok(1);
    };

    if command == "validate" {
        return Ok(run_validate(config_path.as_deref()));
    }

    let config = load_config(config_path.as_deref(), true)?;
    initialize_logging(&config);

    match command.as_str() {
        "detect" => run_detect(&config, capture_path(command, operands)?),
        "parse" => run_parse(&config, capture_path(command, operands)?),
        "preview" => run_preview(&config, capture_path(command, operands)?),
        other => {
            if other.starts_with('-') {
                eprintln!("Error: Unknown option: {}", other);
            } else {
                eprintln!("Error: Unknown command: {}", other);
            }
            eprintln!();
            eprintln!("Run 'tracereplay --help' for more information.");
            Ok(1)
        }
    }
}

///
/// Print help information for the TraceReplay CLI.
fn print_help() {
    println!("TraceReplay v{}", VERSION);
    println!("Normalizes captured LLM requests and rebuilds replay requests");
    println!();
    println!("USAGE:");
    println!("    tracereplay [--config <FILE>] <COMMAND> [CAPTURE]");
    println!();
    println!("COMMANDS:");
    println!("    detect <CAPTURE>    Print the detected capture format");
    println!("    parse <CAPTURE>     Parse a capture and print the stored split as JSON");
    println!("    preview <CAPTURE>   Print the replay message list and an execution preview");
    println!("    validate            Validate configuration and exit");
    println!();
    println!("OPTIONS:");
    println!("    -c, --config <FILE> Use an explicit configuration file");
    println!("    -h, --help          Print help information");
    println!("    -V, --version       Print version information");
    println!();
    println!("ENVIRONMENT VARIABLES:");
    println!("    TRACEREPLAY_LOG_LEVEL                     trace, debug, info, warn, error (default: info)");
    println!("    TRACEREPLAY_PARSER_GEMINI_FALLBACK_MODEL  Model for Gemini captures without a URL model");
    println!("    TRACEREPLAY_REPLAY_REQUEST_TIMEOUT_MS     Outbound model call timeout (default: 120000)");
    println!("    TRACEREPLAY_AGENT_DEFAULT_MODEL           Agent default model name");
    println!("    TRACEREPLAY_AGENT_DEFAULT_SYSTEM_PROMPT   Agent default system prompt");
    println!("    TRACEREPLAY_EVALUATION_MODEL              Judge model (default: openai:gpt-4o-mini)");
}

///
/// Detect and validate the format of a capture.
///
/// Returns exit code 0 if the capture passes structural validation, 1 otherwise.
fn run_detect(config: &Config, path: &str) -> Result<i32> {
    let raw = read_capture(path)?;
    let format = parser(config).detect(&raw)?;
    println!("{}", format);

    let attrs = raw.get("attributes").and_then(Value::as_object).cloned().unwrap_or_default();
    match validate_format(format, &attrs) {
        Ok(()) => Ok(0),
        Err(e) => {
            eprintln!("[ERROR] {}", e);
            Ok(1)
        }
    }
}

fn run_parse(config: &Config, path: &str) -> Result<i32> {
    let raw = read_capture(path)?;
    let capture = parser(config).parse(&raw)?;
    println!("{}", serde_json::to_string_pretty(&capture)?);
    Ok(0)
}

fn run_preview(config: &Config, path: &str) -> Result<i32> {
    let raw = read_capture(path)?;
    let capture = parser(config).parse(&raw)?;
    let plan = ReplayPlan::resolve(&capture, &ReplayOverrides::default(), &config.agent_defaults())?;

    let output = json!({
        "preview": ExecutionPreview::from_capture(&capture),
        "model_name": plan.model_name,
        "model_settings": plan.model_settings,
        "tools": plan.tools,
        "messages": plan.messages(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(0)
}

///
/// Run the validate command.
///
/// Returns exit code 0 if valid, 1 if invalid.
fn run_validate(config_path: Option<&str>) -> i32 {
    let config = match load_config(config_path, false) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("[ERROR] Configuration error: {}", e);
            return 1;
        }
    };

    let issues = config.issues();
    let errors: Vec<_> = issues.iter().filter(|i| i.severity == ValidationSeverity::Error).collect();

    for issue in issues.iter().filter(|i| i.severity != ValidationSeverity::Error) {
        println!("[{:?}] {}: {}", issue.severity, issue.field, issue.message);
    }

    if errors.is_empty() {
        println!("[OK] Configuration is valid");
        0
    } else {
        eprintln!("[ERROR] Configuration validation failed:");
        for issue in &errors {
            eprintln!("  • {}: {}", issue.field, issue.message);
            if let Some(suggestion) = &issue.suggestion {
                eprintln!("    Suggestion: {}", suggestion);
            }
        }
        1
    }
}

///
/// Load configuration from the standard hierarchy plus an optional explicit file.
///
/// # Arguments
///  * `config_path` - explicit configuration file
///  * `validate` - fail on validation errors
fn load_config(config_path: Option<&str>, validate: bool) -> Result<Config> {
    let mut loader = ConfigLoader::new().with_defaults().with_system_config()?.with_user_config()?;
    if let Some(path) = config_path {
        loader = loader.with_config_file(path)?;
    }
    let loader = loader.with_env_vars()?;

    if validate { loader.build() } else { loader.build_base() }
}

///
/// Initialize logging with the configured level.
///
/// Logs go to stderr so command output on stdout stays machine-readable.
fn initialize_logging(config: &Config) {
    tracing_subscriber::fmt()
        .with_max_level(config.logging.level.to_tracing_level())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn parser(config: &Config) -> CaptureParser {
    CaptureParser::new(&config.parser, config.logging.level)
}

fn read_capture(path: &str) -> Result<Value> {
    let text = std::fs::read_to_string(Path::new(path))
        .map_err(|e| ReplayError::Io(std::io::Error::new(e.kind(), format!("{}: {}", path, e))))?;
    Ok(serde_json::from_str(&text)?)
}

fn capture_path<'a>(command: &str, operands: &'a [String]) -> Result<&'a str> {
    operands
        .first()
        .map(String::as_str)
        .ok_or_else(|| ReplayError::Config(format!("'{}' requires a capture file argument", command)))
}

fn split_config_arg(args: Vec<String>) -> Result<(Option<String>, Vec<String>)> {
    let mut config_path = None;
    let mut rest = Vec::with_capacity(args.len());
    let mut iter = args.into_iter();

    while let Some(arg) = iter.next() {
        if arg == "--config" || arg == "-c" {
            let path = iter
                .next()
                .ok_or_else(|| ReplayError::Config(format!("{} requires a file argument", arg)))?;
            config_path = Some(path);
        } else {
            rest.push(arg);
        }
    }

    Ok((config_path, rest))
}
