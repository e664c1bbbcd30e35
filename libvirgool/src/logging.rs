//! Logging setup for the Virgool binaries
//!
//! Structured logs go to stderr so stdout stays clean for command output.
//! Format and level come from `VIRGOOL_LOG_FORMAT` (`text` or `json`) and
//! `VIRGOOL_LOG_LEVEL`; a verbose flag forces debug.

use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable text output
    Text,
    /// One JSON object per line, for log collectors
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!(
                "Invalid log format: '{}'. Valid options: text, json",
                s
            )),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

/// Initialize the global subscriber with an explicit format and level.
///
/// `RUST_LOG` still wins over `level` when set. Panics if a subscriber was
/// already installed; call once at startup.
pub fn init(format: LogFormat, level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .flatten_event(true)
                .with_target(true)
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true)
                .init();
        }
    }
}

/// Initialize from `VIRGOOL_LOG_FORMAT` / `VIRGOOL_LOG_LEVEL`.
///
/// Unset or unrecognized values fall back to text at warn level;
/// `verbose` overrides the level to debug.
pub fn init_default(verbose: bool) {
    let format = resolve_format(std::env::var("VIRGOOL_LOG_FORMAT").ok().as_deref());
    let level = resolve_level(std::env::var("VIRGOOL_LOG_LEVEL").ok().as_deref(), verbose);
    init(format, &level);
}

fn resolve_format(var: Option<&str>) -> LogFormat {
    var.and_then(|s| s.parse().ok()).unwrap_or(LogFormat::Text)
}

fn resolve_level(var: Option<&str>, verbose: bool) -> String {
    if verbose {
        return "debug".to_string();
    }
    var.unwrap_or("warn").to_string()
}
