//! CLI definitions for postback.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use postback_protocols::LengthUnit;

/// postback CLI.
#[derive(Parser)]
#[command(name = "postback")]
#[command(about = "Drive web-forms pages through synchronous and partial postbacks")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (defaults apply when omitted)
    #[arg(short, long, global = true, env = "POSTBACK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Also write logs to daily files in this directory
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Decode a captured delta response and print it as JSON
    Parse {
        /// File holding the response body ("-" reads stdin)
        input: PathBuf,

        /// Unit of the length prefixes (utf16, chars); overrides the configuration
        #[arg(long, value_parser = parse_length_unit)]
        unit: Option<LengthUnit>,

        /// Print the fragments re-encoded as a delta stream instead of JSON
        #[arg(long)]
        reencode: bool,
    },

    /// Load a page, set controls, then submit or post back
    Run {
        /// Page URL
        url: String,

        /// Control assignment, repeatable
        #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
        assignments: Vec<(String, String)>,

        /// Event target of the postback
        #[arg(long, default_value = "")]
        target: String,

        /// Event argument of the postback
        #[arg(long, default_value = "")]
        argument: String,

        /// Partial postback with this script-manager value (e.g. "upMain|btnSearch");
        /// without it the form is submitted as a full navigation
        #[arg(long)]
        scriptmanager: Option<String>,

        /// Id of the submit button clicked in a full navigation
        #[arg(long)]
        button: Option<String>,

        /// Only load the page and apply assignments, do not submit
        #[arg(long)]
        no_submit: bool,

        /// Control to read after the interaction, repeatable
        #[arg(long = "get", value_name = "NAME")]
        reads: Vec<String>,

        /// Write the final page markup to this file
        #[arg(long)]
        save_html: Option<PathBuf>,
    },
}

pub(crate) fn parse_length_unit(value: &str) -> Result<LengthUnit, String> {
    match value.to_ascii_lowercase().as_str() {
        "utf16" | "utf-16" => Ok(LengthUnit::Utf16),
        "chars" | "char" => Ok(LengthUnit::Chars),
        other => Err(format!("unknown length unit: {} (expected utf16 or chars)", other)),
    }
}

pub(crate) fn parse_assignment(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got {:?}", value)),
    }
}
