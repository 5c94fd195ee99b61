//! postback - web-forms page automation
//!
//! Entry point for the postback CLI.

mod cli;
mod cmd_parse;
mod cmd_run;

use std::path::Path;

use anyhow::bail;
use clap::Parser;
use tracing::{info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use postback_config::{Config, ConfigLoader, ConfigValidator};

use cli::{Cli, Commands};
use cmd_parse::handle_parse_command;
use cmd_run::{handle_run_command, RunArgs};

/// Initialize tracing: human-readable output on stderr, plus daily rotated
/// files when a log directory is given.
fn init_tracing(log_dir: Option<&Path>) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let console = fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    let file = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("postback")
                .filename_suffix("log")
                .max_log_files(30)
                .build(dir)?;

            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            // The guard flushes on drop and must outlive the program.
            static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
                std::sync::OnceLock::new();
            let _ = GUARD.set(guard);

            Some(fmt::layer().with_writer(non_blocking).with_ansi(false))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console)
        .with(file)
        .init();

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = ConfigLoader::load_or_default(path)?;

    let result = ConfigValidator::validate(&config)?;
    for warning in &result.warnings {
        warn!("Config {}: {}", warning.path, warning.message);
    }
    if !result.is_valid() {
        for error in &result.errors {
            tracing::error!("Config {}: {}", error.path, error.message);
        }
        bail!("Invalid configuration ({} errors)", result.errors.len());
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.log_dir.as_deref())?;

    let config = load_config(cli.config.as_deref())?;
    info!("postback v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Parse {
            input,
            unit,
            reencode,
        } => handle_parse_command(&input, unit.unwrap_or(config.delta.length_unit), reencode),
        Commands::Run {
            url,
            assignments,
            target,
            argument,
            scriptmanager,
            button,
            no_submit,
            reads,
            save_html,
        } => {
            let args = RunArgs {
                url,
                assignments,
                target,
                argument,
                scriptmanager,
                button,
                no_submit,
                reads,
                save_html,
            };
            handle_run_command(&config, args).await
        }
    }
}
