//! CLI argument definitions using clap
//!
//! The positional surface is `<action> <alias> [value]`. Actions are kept as
//! plain strings so an unknown action reaches the dispatcher and is reported
//! as `ERROR: Invalid action` rather than as a clap error.

use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "aliastool",
    version,
    about = "Read or update the address of a firewall host alias",
    disable_help_subcommand = true
)]
pub struct Args {
    /// Action to run: get or set
    #[arg(value_name = "ACTION")]
    pub action: Option<String>,

    /// Name of a host alias
    #[arg(value_name = "ALIAS")]
    pub alias: Option<String>,

    /// New IP address or FQDN (set only)
    #[arg(value_name = "IP/FQDN", allow_hyphen_values = true)]
    pub value: Option<String>,

    // =========================================================================
    // CONFIGURATION
    // =========================================================================

    /// Settings file (TOML)
    #[arg(long = "settings", value_name = "FILE", env = "ALIASTOOL_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Firewall configuration document, overriding the settings file
    #[arg(long = "config-xml", value_name = "FILE", env = "ALIASTOOL_CONFIG_XML")]
    pub config_xml: Option<PathBuf>,

    // =========================================================================
    // TROUBLESHOOTING
    // =========================================================================

    /// Verbose logging on stderr. Use -vv for debug output
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Output format for log lines: text (default) or json (JSON Lines)
    #[arg(long = "log-format", value_name = "FORMAT", value_enum)]
    pub log_format: Option<LogFormat>,

    /// Debug mode: debug logging and detailed error output
    #[arg(long = "debug", action = ArgAction::SetTrue)]
    pub debug: bool,
}

impl Args {
    /// Action and alias, when both are present and the action is non-empty
    pub fn command_parts(&self) -> Option<(&str, &str)> {
        let action = self.action.as_deref().filter(|a| !a.is_empty())?;
        let alias = self.alias.as_deref()?;
        Some((action, alias))
    }
}

/// Log format for structured output
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Plain text output (default)
    #[default]
    Text,
    /// JSON Lines format for parsing
    Json,
}
